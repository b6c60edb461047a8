//! Race typing engine: keystrokes in, progress percentages out.

use typefast_shared::scoring::{TypingCounters, TypingStats};

use crate::coordinator::ProgressSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceStatus {
    NotStarted,
    Active,
    Finished,
}

/// Local typing state of one participant for one race text
#[derive(Debug, Clone)]
pub struct RaceTyping {
    words: Vec<String>,
    word_index: usize,
    buffer: String,
    status: RaceStatus,
    started_at: Option<i64>,
    finished_at: Option<i64>,
    counters: TypingCounters,
}

impl RaceTyping {
    pub fn new(text: &str) -> Self {
        Self {
            words: text.split_whitespace().map(str::to_string).collect(),
            word_index: 0,
            buffer: String::new(),
            status: RaceStatus::NotStarted,
            started_at: None,
            finished_at: None,
            counters: TypingCounters::default(),
        }
    }

    pub fn status(&self) -> RaceStatus {
        self.status
    }

    pub fn word_index(&self) -> usize {
        self.word_index
    }

    pub fn total_words(&self) -> usize {
        self.words.len()
    }

    pub fn current_word(&self) -> Option<&str> {
        self.words.get(self.word_index).map(String::as_str)
    }

    /// What the input field currently holds
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn counters(&self) -> TypingCounters {
        self.counters
    }

    /// Apply the new content of the input field.
    ///
    /// Returns the progress to report, or `None` when nothing changed for
    /// peers (finished engine, mismatched word submission).
    pub fn input(&mut self, value: &str, now_millis: i64) -> Option<i64> {
        if self.status == RaceStatus::Finished || self.words.is_empty() {
            return None;
        }
        if self.status == RaceStatus::NotStarted {
            if value.is_empty() {
                return None;
            }
            self.status = RaceStatus::Active;
            self.started_at = Some(now_millis);
        }
        if value.chars().count() > self.buffer.chars().count() {
            self.counters.total_chars += 1;
        }
        self.counters.elapsed_millis = now_millis - self.started_at.unwrap_or(now_millis);

        let current = self.words[self.word_index].clone();
        if value.ends_with(' ') {
            if value.trim() == current {
                return Some(self.advance(now_millis));
            }
            // Kept for correction; the submission still counts as an error
            self.counters.errors += 1;
            self.buffer = value.to_string();
            return None;
        }

        self.buffer = value.to_string();
        if self.word_index + 1 == self.words.len() && value == current {
            return Some(self.advance(now_millis));
        }

        let matched = value
            .chars()
            .zip(current.chars())
            .take_while(|(typed, expected)| typed == expected)
            .count();
        let word_len = current.chars().count().max(1);
        let fraction = (self.word_index as f64 + matched as f64 / word_len as f64)
            / self.words.len() as f64;
        Some(percent(fraction))
    }

    /// [`RaceTyping::input`], forwarding the progress to `sink`
    pub fn input_to(&mut self, value: &str, now_millis: i64, sink: &mut dyn ProgressSink) {
        if let Some(progress) = self.input(value, now_millis) {
            sink.send_progress(progress);
        }
    }

    fn advance(&mut self, now_millis: i64) -> i64 {
        self.word_index += 1;
        self.counters.words_completed += 1;
        self.buffer.clear();
        if self.word_index == self.words.len() {
            self.status = RaceStatus::Finished;
            self.finished_at = Some(now_millis);
            tracing::debug!("Race text completed");
        }
        percent(self.word_index as f64 / self.words.len() as f64)
    }

    /// Progress of the completed words only
    pub fn progress(&self) -> i64 {
        if self.words.is_empty() {
            return 0;
        }
        percent(self.word_index as f64 / self.words.len() as f64)
    }

    /// Score of the race so far (or of the whole race once finished)
    pub fn stats(&self, now_millis: i64) -> TypingStats {
        let mut counters = self.counters;
        if let Some(started_at) = self.started_at {
            counters.elapsed_millis = self.finished_at.unwrap_or(now_millis) - started_at;
        }
        counters.stats()
    }
}

fn percent(fraction: f64) -> i64 {
    ((fraction * 100.0).round() as i64).clamp(0, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        sent: Vec<i64>,
    }

    impl ProgressSink for RecordingSink {
        fn send_progress(&mut self, progress: i64) {
            self.sent.push(progress);
        }
    }

    #[test]
    fn test_first_character_starts_the_race() {
        // テスト項目: 最初の文字入力で Active になる
        // given (前提条件):
        let mut engine = RaceTyping::new("the and you that");

        // when (操作):
        let progress = engine.input("t", 1_000);

        // then (期待する結果):
        assert_eq!(engine.status(), RaceStatus::Active);
        // (0 + 1/3) / 4 = 8.33%
        assert_eq!(progress, Some(8));
    }

    #[test]
    fn test_matching_word_advances_and_clears_buffer() {
        // テスト項目: 一致した単語でスペースを押すと次の単語へ進む
        // given (前提条件):
        let mut engine = RaceTyping::new("the and you that");
        engine.input("t", 0);
        engine.input("th", 100);
        engine.input("the", 200);

        // when (操作):
        let progress = engine.input("the ", 300);

        // then (期待する結果):
        assert_eq!(progress, Some(25));
        assert_eq!(engine.word_index(), 1);
        assert_eq!(engine.buffer(), "");
        assert_eq!(engine.current_word(), Some("and"));
    }

    #[test]
    fn test_mismatched_word_is_kept_and_counted() {
        // テスト項目: 不一致の単語は進まず、バッファは残り、エラーとして数えられる
        // given (前提条件):
        let mut engine = RaceTyping::new("the and");
        engine.input("teh", 0);

        // when (操作):
        let progress = engine.input("teh ", 100);

        // then (期待する結果):
        assert_eq!(progress, None);
        assert_eq!(engine.word_index(), 0);
        assert_eq!(engine.buffer(), "teh ");
        assert_eq!(engine.counters().errors, 1);
    }

    #[test]
    fn test_progress_uses_matched_prefix() {
        // テスト項目: 途中経過は一致している接頭辞の長さで計算される
        // given (前提条件):
        let mut engine = RaceTyping::new("that was");

        // when (操作):
        let progress = engine.input("tx", 0);

        // then (期待する結果):
        // (0 + 1/4) / 2 = 12.5% -> 13
        assert_eq!(progress, Some(13));
    }

    #[test]
    fn test_last_word_finishes_without_trailing_space() {
        // テスト項目: 最後の単語は打ち終えた時点で完走になる
        // given (前提条件):
        let mut engine = RaceTyping::new("the and");
        engine.input("the ", 0);
        engine.input("an", 500);

        // when (操作):
        let progress = engine.input("and", 1_000);
        let after_finish = engine.input("and ", 1_100);

        // then (期待する結果):
        assert_eq!(progress, Some(100));
        assert_eq!(engine.status(), RaceStatus::Finished);
        assert_eq!(after_finish, None);
        assert_eq!(engine.counters().words_completed, 2);
    }

    #[test]
    fn test_word_index_never_decreases_on_backspace() {
        // テスト項目: バックスペースで単語位置は戻らない
        // given (前提条件):
        let mut engine = RaceTyping::new("the and you");
        engine.input("the ", 0);
        engine.input("a", 100);

        // when (操作):
        let progress = engine.input("", 200);

        // then (期待する結果):
        assert_eq!(engine.word_index(), 1);
        // 1/3 = 33%
        assert_eq!(progress, Some(33));
    }

    #[test]
    fn test_input_to_forwards_progress_to_sink() {
        // テスト項目: input_to は進捗を ProgressSink に渡す
        // given (前提条件):
        let mut engine = RaceTyping::new("us");
        let mut sink = RecordingSink::default();

        // when (操作):
        engine.input_to("u", 0, &mut sink);
        engine.input_to("us", 60_000, &mut sink);

        // then (期待する結果):
        assert_eq!(sink.sent, vec![50, 100]);
    }

    #[test]
    fn test_stats_after_finish_use_finish_time() {
        // テスト項目: 完走後の成績は完走時刻までの経過時間で計算される
        // given (前提条件):
        let mut engine = RaceTyping::new("the and");
        engine.input("t", 0);
        engine.input("th", 10_000);
        engine.input("the", 20_000);
        engine.input("the ", 30_000);
        engine.input("a", 40_000);
        engine.input("an", 50_000);
        engine.input("and", 60_000);

        // when (操作):
        let stats = engine.stats(600_000);

        // then (期待する結果):
        // 2 words in 1 minute, no errors
        assert_eq!(stats.wpm, 2);
        assert_eq!(stats.accuracy, 100);
    }
}
