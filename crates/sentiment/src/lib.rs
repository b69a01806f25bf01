//! # Sentiment Crate
//!
//! Review-sentiment enrichment for the serving layer: a bag-of-words
//! Naive Bayes classifier plus a polarity lexicon, summarizing a batch of
//! already-fetched review texts into per-class counts and an average score.
//!
//! Review acquisition (scraping) lives outside this repository, and the
//! recommendation engine never reads sentiment: a failed fetch only means
//! the serving layer has no summary to attach.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sentiment::{BowClassifier, SEED_CORPUS};
//!
//! let classifier = BowClassifier::train(SEED_CORPUS)?;
//! let summary = classifier.summarize(&reviews);
//! println!(
//!     "{} positive / {} negative / {} neutral (avg {:.2})",
//!     summary.positive, summary.negative, summary.neutral, summary.average_score
//! );
//! ```

// Public modules
pub mod classifier;
pub mod lexicon;

// Re-export commonly used types
pub use classifier::{
    BowClassifier, ReviewSummary, Sentiment, SentimentError, CLASSES, SEED_CORPUS,
};
pub use lexicon::polarity;
