//! Word pools and text generation for races and solo tests.

use rand::{Rng, seq::SliceRandom};
use typefast_shared::scoring::Difficulty;

/// Number of words in a race text
pub const RACE_WORD_COUNT: usize = 25;

/// Pool the host samples race texts from
pub const RACE_POOL: &[&str] = EASY_POOL;

const EASY_POOL: &[&str] = &[
    "the", "and", "you", "that", "was", "for", "are", "with", "his", "they", "have", "this",
    "will", "your", "from", "can", "had", "her", "would", "make", "like", "time", "very", "when",
    "come", "may", "way", "work", "life", "only", "over", "think", "also", "back", "after", "use",
    "two", "how", "our", "first", "well", "even", "new", "want", "any", "these", "give", "day",
    "most", "us",
];

const MEDIUM_POOL: &[&str] = &[
    "buy", "too", "frighten", "some", "saw", "offer", "possible", "never", "cheat", "between",
    "through", "because", "different", "important", "example", "government", "without",
    "usually", "business", "something", "during", "world", "school", "state", "family",
    "student", "group", "country", "problem", "hand", "right", "system", "program", "question",
    "company", "number", "fact", "water", "history", "money", "story", "young", "month", "right",
    "study", "book", "eye", "job", "word", "though",
];

const HARD_POOL: &[&str] = &[
    "accommodate", "embarrass", "millennium", "occurrence", "privilege", "rhythm", "separate",
    "tomorrow", "necessary", "definitely", "category", "beginning", "immediate", "environment",
    "maintenance", "restaurant", "guarantee", "independent", "experience", "development",
    "intelligence", "achievement", "explanation", "temperature", "particular", "competition",
    "organization", "understand", "management", "comfortable", "knowledge", "opportunity",
    "technology", "information", "administration", "responsibility", "communication",
    "transportation", "infrastructure", "characteristic", "consciousness", "recommendation",
    "acknowledgment", "disappointment", "representative", "classification", "transformation",
    "establishment", "implementation", "extraordinary",
];

/// Word pool of a solo test difficulty
pub fn pool(difficulty: Difficulty) -> &'static [&'static str] {
    match difficulty {
        Difficulty::Easy => EASY_POOL,
        Difficulty::Medium => MEDIUM_POOL,
        Difficulty::Hard => HARD_POOL,
    }
}

/// Race text: [`RACE_WORD_COUNT`] words sampled uniformly with replacement.
pub fn generate_race_text<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..RACE_WORD_COUNT)
        .filter_map(|_| RACE_POOL.choose(rng).copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Solo text: the pool shuffled once, then cycled up to `word_count` words.
pub fn generate_solo_text<R: Rng + ?Sized>(
    difficulty: Difficulty,
    word_count: usize,
    rng: &mut R,
) -> String {
    let mut shuffled = pool(difficulty).to_vec();
    shuffled.shuffle(rng);
    shuffled
        .iter()
        .cycle()
        .take(word_count)
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_race_text_has_fixed_word_count_from_pool() {
        // テスト項目: レース用テキストは固定プールから 25 語
        // given (前提条件):
        let mut rng = StdRng::seed_from_u64(7);

        // when (操作):
        let text = generate_race_text(&mut rng);

        // then (期待する結果):
        let words: Vec<&str> = text.split(' ').collect();
        assert_eq!(words.len(), RACE_WORD_COUNT);
        assert!(words.iter().all(|w| RACE_POOL.contains(w)));
    }

    #[test]
    fn test_solo_text_cycles_pool_beyond_its_size() {
        // テスト項目: プールより多い語数を要求するとシャッフル順が繰り返される
        // given (前提条件):
        let mut rng = StdRng::seed_from_u64(1);
        let pool_len = pool(Difficulty::Hard).len();

        // when (操作):
        let text = generate_solo_text(Difficulty::Hard, pool_len + 3, &mut rng);

        // then (期待する結果):
        let words: Vec<&str> = text.split(' ').collect();
        assert_eq!(words.len(), pool_len + 3);
        assert_eq!(&words[pool_len..], &words[..3]);
        assert!(words.iter().all(|w| HARD_POOL.contains(w)));
    }

    #[test]
    fn test_solo_text_uses_difficulty_pool() {
        // テスト項目: 難易度ごとのプールから語が選ばれる
        // given (前提条件):
        let mut rng = StdRng::seed_from_u64(3);

        // when (操作):
        let text = generate_solo_text(Difficulty::Easy, 10, &mut rng);

        // then (期待する結果):
        assert!(text.split(' ').all(|w| EASY_POOL.contains(&w)));
    }
}
