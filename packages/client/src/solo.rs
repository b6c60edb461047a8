//! Solo typing test: timed or word-count bound, scored for the leaderboard.

use rand::Rng;
use serde::{Deserialize, Serialize};
use typefast_shared::scoring::{
    Difficulty, MIN_ELAPSED_MINUTES, TypingCounters, TypingStats, compute_stats,
};

use crate::{error::ClientError, words::generate_solo_text};

pub const ALLOWED_DURATIONS_SECS: [u32; 3] = [15, 30, 60];
pub const ALLOWED_WORD_COUNTS: [usize; 3] = [10, 25, 50];
/// Interval between performance samples
pub const SAMPLE_INTERVAL_MILLIS: i64 = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoloPreferences {
    pub time_secs: u32,
    pub words: usize,
    pub difficulty: Difficulty,
}

impl Default for SoloPreferences {
    fn default() -> Self {
        Self {
            time_secs: 30,
            words: 25,
            difficulty: Difficulty::Medium,
        }
    }
}

impl SoloPreferences {
    pub fn new(time_secs: u32, words: usize, difficulty: Difficulty) -> Result<Self, ClientError> {
        if !ALLOWED_DURATIONS_SECS.contains(&time_secs) {
            return Err(ClientError::InvalidInput(format!(
                "time must be one of {:?} seconds",
                ALLOWED_DURATIONS_SECS
            )));
        }
        if !ALLOWED_WORD_COUNTS.contains(&words) {
            return Err(ClientError::InvalidInput(format!(
                "words must be one of {:?}",
                ALLOWED_WORD_COUNTS
            )));
        }
        Ok(Self {
            time_secs,
            words,
            difficulty,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoloStatus {
    Ready,
    Active,
    Finished,
}

/// Live WPM / accuracy at one point of the test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceSample {
    pub at_millis: i64,
    pub wpm: u32,
    pub accuracy: u32,
}

/// What a finished test hands to the leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub user_id: String,
    pub wpm: u32,
    pub accuracy: u32,
    pub difficulty: Difficulty,
}

pub struct SoloTest {
    preferences: SoloPreferences,
    words: Vec<String>,
    word_index: usize,
    buffer: String,
    status: SoloStatus,
    started_at: Option<i64>,
    finished_at: Option<i64>,
    counters: TypingCounters,
    samples: Vec<PerformanceSample>,
    last_sample_at: i64,
}

impl SoloTest {
    pub fn new<R: Rng + ?Sized>(preferences: SoloPreferences, rng: &mut R) -> Self {
        let text = generate_solo_text(preferences.difficulty, preferences.words, rng);
        Self::with_text(preferences, &text)
    }

    pub fn with_text(preferences: SoloPreferences, text: &str) -> Self {
        Self {
            preferences,
            words: text.split_whitespace().map(str::to_string).collect(),
            word_index: 0,
            buffer: String::new(),
            status: SoloStatus::Ready,
            started_at: None,
            finished_at: None,
            counters: TypingCounters::default(),
            samples: Vec::new(),
            last_sample_at: 0,
        }
    }

    pub fn preferences(&self) -> SoloPreferences {
        self.preferences
    }

    pub fn status(&self) -> SoloStatus {
        self.status
    }

    pub fn text(&self) -> String {
        self.words.join(" ")
    }

    pub fn word_index(&self) -> usize {
        self.word_index
    }

    pub fn current_word(&self) -> Option<&str> {
        self.words.get(self.word_index).map(String::as_str)
    }

    pub fn counters(&self) -> TypingCounters {
        self.counters
    }

    pub fn samples(&self) -> &[PerformanceSample] {
        &self.samples
    }

    /// Apply the new content of the input field
    pub fn input(&mut self, value: &str, now_millis: i64) {
        if self.status == SoloStatus::Finished {
            return;
        }
        if self.status == SoloStatus::Ready {
            if value.is_empty() {
                return;
            }
            self.status = SoloStatus::Active;
            self.started_at = Some(now_millis);
            self.last_sample_at = now_millis;
        }

        let grew = value.chars().count() > self.buffer.chars().count();
        if grew {
            self.counters.total_chars += 1;
        }
        self.buffer = value.to_string();
        let current = self.current_word().unwrap_or_default().to_string();

        if value.ends_with(' ') {
            if value.trim() != current {
                self.counters.errors += 1;
            }
            self.word_index += 1;
            self.counters.words_completed += 1;
            self.buffer.clear();
            if self.word_index >= self.preferences.words.min(self.words.len()) {
                self.finish(now_millis);
            }
            return;
        }

        // A mistyped character counts once, when it is typed
        if grew {
            let position = value.chars().count() - 1;
            if let (Some(typed), Some(expected)) =
                (value.chars().nth(position), current.chars().nth(position))
                && typed != expected
            {
                self.counters.errors += 1;
            }
        }
    }

    /// Advance the timer: samples performance and ends the test at timeout
    pub fn tick(&mut self, now_millis: i64) {
        if self.status != SoloStatus::Active {
            return;
        }
        if now_millis - self.last_sample_at >= SAMPLE_INTERVAL_MILLIS {
            self.sample(now_millis);
            self.last_sample_at = now_millis;
        }
        if self.time_left_secs(now_millis) == 0 {
            self.finish(now_millis);
        }
    }

    /// Whole seconds left on the timer
    pub fn time_left_secs(&self, now_millis: i64) -> u32 {
        let limit = i64::from(self.preferences.time_secs) * 1_000;
        let elapsed = match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => end - start,
            (Some(start), None) => now_millis - start,
            _ => 0,
        };
        let left_millis = (limit - elapsed).max(0);
        // Ceiling so the display shows 1 until the very end
        ((left_millis + 999) / 1_000) as u32
    }

    /// Live stats; a test younger than the minimum elapsed time reports 0 WPM
    pub fn live_stats(&self, now_millis: i64) -> TypingStats {
        let Some(started_at) = self.started_at else {
            return compute_stats(&TypingCounters::default(), MIN_ELAPSED_MINUTES);
        };
        let end = self.finished_at.unwrap_or(now_millis);
        let elapsed_minutes = (end - started_at) as f64 / 60_000.0;
        if elapsed_minutes < MIN_ELAPSED_MINUTES {
            let mut stats = compute_stats(&self.counters, MIN_ELAPSED_MINUTES);
            stats.wpm = 0;
            stats.net_wpm = 0;
            return stats;
        }
        compute_stats(&self.counters, elapsed_minutes)
    }

    fn sample(&mut self, now_millis: i64) {
        let stats = self.live_stats(now_millis);
        self.samples.push(PerformanceSample {
            at_millis: now_millis,
            wpm: stats.wpm,
            accuracy: stats.accuracy,
        });
    }

    fn finish(&mut self, now_millis: i64) {
        self.finished_at = Some(now_millis);
        if let Some(started_at) = self.started_at {
            self.counters.elapsed_millis = now_millis - started_at;
        }
        self.sample(now_millis);
        self.status = SoloStatus::Finished;
        tracing::debug!(
            "Solo test finished: {} word(s), {} error(s)",
            self.counters.words_completed,
            self.counters.errors
        );
    }

    /// Final stats, once finished
    pub fn stats(&self) -> Option<TypingStats> {
        let finished_at = self.finished_at?;
        Some(self.live_stats(finished_at))
    }

    pub fn result(&self, user_id: &str) -> Option<GameResult> {
        let stats = self.stats()?;
        Some(GameResult {
            user_id: user_id.to_string(),
            wpm: stats.wpm,
            accuracy: stats.accuracy,
            difficulty: self.preferences.difficulty,
        })
    }
}
