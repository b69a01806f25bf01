//! Polarity lexicon for the summary's average score.
//!
//! Complements the trained classifier with a simple word-list polarity in
//! [-1, 1]; the summary reports both so a skewed classifier and a skewed
//! lexicon can be spotted against each other.

use similarity::tokenize;

const POSITIVE_WORDS: &[&str] = &[
    "amazing",
    "awesome",
    "beautiful",
    "best",
    "brilliant",
    "captivating",
    "charming",
    "compelling",
    "delightful",
    "enjoyable",
    "excellent",
    "fantastic",
    "favorite",
    "fun",
    "good",
    "great",
    "gripping",
    "hilarious",
    "incredible",
    "love",
    "loved",
    "masterpiece",
    "memorable",
    "moving",
    "outstanding",
    "perfect",
    "powerful",
    "stunning",
    "superb",
    "touching",
    "wonderful",
];

const NEGATIVE_WORDS: &[&str] = &[
    "awful",
    "bad",
    "boring",
    "cliched",
    "confusing",
    "disappointing",
    "dreadful",
    "dull",
    "flat",
    "forgettable",
    "hate",
    "hated",
    "horrible",
    "lazy",
    "mediocre",
    "mess",
    "painful",
    "pointless",
    "predictable",
    "shallow",
    "slow",
    "terrible",
    "tedious",
    "uninspired",
    "unwatchable",
    "waste",
    "weak",
    "worst",
];

/// Lexicon polarity of a text in [-1, 1].
///
/// (positive hits - negative hits) / total hits; 0.0 when no lexicon word
/// appears at all.
pub fn polarity(text: &str) -> f32 {
    let mut positive = 0i32;
    let mut negative = 0i32;
    for token in tokenize(text) {
        if POSITIVE_WORDS.contains(&token.as_str()) {
            positive += 1;
        } else if NEGATIVE_WORDS.contains(&token.as_str()) {
            negative += 1;
        }
    }

    let matched = positive + negative;
    if matched == 0 {
        0.0
    } else {
        (positive - negative) as f32 / matched as f32
    }
}
