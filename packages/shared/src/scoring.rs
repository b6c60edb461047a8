//! Scoring engine.
//!
//! Pure functions turning typing-session counters into words-per-minute,
//! accuracy and leaderboard points. Solo tests and multiplayer races are
//! scored by the same functions. Inputs are not validated: callers never
//! produce negative counters.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Lower bound for the elapsed time, so a test that just started does not
/// report an absurd WPM.
pub const MIN_ELAPSED_MINUTES: f64 = 0.01;

/// Word pool difficulty, also the points multiplier of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Points multiplier: EASY 1, MEDIUM 1.5, HARD 2.
    pub fn multiplier(self) -> f64 {
        f64::from(self.multiplier_halves()) / 2.0
    }

    /// Multiplier expressed in halves so points can be computed in integers.
    fn multiplier_halves(self) -> u32 {
        match self {
            Difficulty::Easy => 2,
            Difficulty::Medium => 3,
            Difficulty::Hard => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EASY" => Ok(Difficulty::Easy),
            "MEDIUM" => Ok(Difficulty::Medium),
            "HARD" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// Counters of one typing session (solo test or race).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypingCounters {
    pub words_completed: u32,
    pub errors: u32,
    pub total_chars: u32,
    /// Milliseconds elapsed since the first keystroke
    pub elapsed_millis: i64,
}

impl TypingCounters {
    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed_millis as f64 / 60_000.0
    }

    /// Score the counters using their own elapsed time.
    pub fn stats(&self) -> TypingStats {
        compute_stats(self, self.elapsed_minutes())
    }
}

/// Result of [`compute_stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingStats {
    pub wpm: u32,
    /// Percentage in `0..=100`
    pub accuracy: u32,
    pub net_wpm: u32,
}

/// Compute WPM, accuracy and net WPM.
///
/// `elapsed_minutes` is clamped to [`MIN_ELAPSED_MINUTES`]. Accuracy is 100
/// when nothing has been typed yet.
pub fn compute_stats(counters: &TypingCounters, elapsed_minutes: f64) -> TypingStats {
    let minutes = elapsed_minutes.max(MIN_ELAPSED_MINUTES);
    let words = f64::from(counters.words_completed);
    let errors = f64::from(counters.errors);
    let total = f64::from(counters.total_chars);

    let wpm = (words / minutes).round().max(0.0);
    let accuracy = if counters.total_chars == 0 {
        100.0
    } else {
        (((total - errors) / total) * 100.0).round().clamp(0.0, 100.0)
    };
    let net_wpm = ((words - errors) / minutes).round().max(0.0);

    TypingStats {
        wpm: wpm as u32,
        accuracy: accuracy as u32,
        net_wpm: net_wpm as u32,
    }
}

/// Leaderboard points earned by one session:
/// `floor(wpm * multiplier * accuracy / 100)`.
pub fn calculate_points(wpm: u32, accuracy: u32, difficulty: Difficulty) -> u64 {
    // wpm * (halves / 2) * (accuracy / 100), kept exact in integers
    u64::from(wpm) * u64::from(difficulty.multiplier_halves()) * u64::from(accuracy.min(100)) / 200
}

/// Stored leaderboard totals of one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreTotals {
    pub points: u64,
    pub best_wpm: u32,
}

impl ScoreTotals {
    /// Fold one session into the totals and return the points it earned.
    ///
    /// Points accumulate; the best WPM is only replaced by a strictly higher one.
    pub fn record(&mut self, wpm: u32, accuracy: u32, difficulty: Difficulty) -> u64 {
        let earned = calculate_points(wpm, accuracy, difficulty);
        self.points += earned;
        if wpm > self.best_wpm {
            self.best_wpm = wpm;
        }
        earned
    }
}
