//! Race standings.

use std::cmp::Ordering;

/// One row of the race ranking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub participant_id: String,
    pub username: String,
    pub progress: u8,
    pub finished_at: Option<i64>,
}

/// Ordering of two standings, higher ranked first.
///
/// Progress descending; at equal progress a recorded finish outranks none
/// and an earlier finish outranks a later one; then username.
pub fn compare_standings(a: &Standing, b: &Standing) -> Ordering {
    b.progress
        .cmp(&a.progress)
        .then_with(|| match (a.finished_at, b.finished_at) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.username.cmp(&b.username))
        .then_with(|| a.participant_id.cmp(&b.participant_id))
}

pub fn rank(mut standings: Vec<Standing>) -> Vec<Standing> {
    standings.sort_by(compare_standings);
    standings
}
