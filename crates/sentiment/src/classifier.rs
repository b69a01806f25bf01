//! Bag-of-words review sentiment classifier.
//!
//! A multinomial Naive Bayes model over tokenized review text, trained from
//! labeled examples with Laplace smoothing. Deliberately small: review
//! sentiment is an optional enrichment the serving layer requests on top of
//! recommendations, never an input to the engine.

use crate::lexicon;
use serde::{Deserialize, Serialize};
use similarity::tokenize;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while training the classifier
#[derive(Error, Debug)]
pub enum SentimentError {
    /// No labeled examples were provided
    #[error("no labeled examples to train on")]
    EmptyCorpus,
}

/// Review sentiment classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Neutral,
    Positive,
    Negative,
}

/// Class order for scoring; ties resolve to the earliest entry, with
/// Neutral first so contentless text reads neutral.
pub const CLASSES: [Sentiment; 3] = [Sentiment::Neutral, Sentiment::Positive, Sentiment::Negative];

fn class_index(sentiment: Sentiment) -> usize {
    match sentiment {
        Sentiment::Neutral => 0,
        Sentiment::Positive => 1,
        Sentiment::Negative => 2,
    }
}

/// Built-in seed corpus, used when no labeled review data is on hand
pub const SEED_CORPUS: &[(&str, Sentiment)] = &[
    ("this movie is great", Sentiment::Positive),
    ("awesome film, loved every minute", Sentiment::Positive),
    ("a wonderful and moving story", Sentiment::Positive),
    ("brilliant acting and a gripping plot", Sentiment::Positive),
    ("one of the best films of the year", Sentiment::Positive),
    ("terrible movie", Sentiment::Negative),
    ("boring film, a complete waste of time", Sentiment::Negative),
    ("awful script and worse acting", Sentiment::Negative),
    ("predictable, dull and far too long", Sentiment::Negative),
    ("i hated this mess from start to finish", Sentiment::Negative),
    ("it was okay", Sentiment::Neutral),
    ("not bad, not great either", Sentiment::Neutral),
    ("an average movie overall", Sentiment::Neutral),
    ("watchable but nothing special", Sentiment::Neutral),
    ("fine for a rainy afternoon", Sentiment::Neutral),
];

/// Aggregated sentiment over a batch of reviews
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub total_reviews: usize,
    /// Mean lexicon polarity across the batch, in [-1, 1]
    pub average_score: f32,
}

impl ReviewSummary {
    fn empty() -> Self {
        Self {
            positive: 0,
            negative: 0,
            neutral: 0,
            total_reviews: 0,
            average_score: 0.0,
        }
    }
}

/// Multinomial Naive Bayes over bag-of-words review text.
#[derive(Debug)]
pub struct BowClassifier {
    vocab: HashMap<String, usize>,
    /// Log prior per class, Laplace-smoothed
    log_prior: [f32; 3],
    /// Per vocabulary column, log likelihood per class
    log_likelihood: Vec<[f32; 3]>,
}

impl BowClassifier {
    /// Train from labeled (text, sentiment) examples.
    pub fn train(examples: &[(&str, Sentiment)]) -> Result<Self, SentimentError> {
        if examples.is_empty() {
            return Err(SentimentError::EmptyCorpus);
        }

        let documents: Vec<(Vec<String>, Sentiment)> = examples
            .iter()
            .map(|(text, sentiment)| (tokenize(text), *sentiment))
            .collect();

        // Stable vocabulary columns in sorted term order
        let terms: BTreeSet<&String> = documents.iter().flat_map(|(doc, _)| doc).collect();
        let vocab: HashMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(column, term)| (term.clone(), column))
            .collect();

        // Per-class document and token counts
        let mut doc_counts = [0usize; 3];
        let mut token_totals = [0usize; 3];
        let mut token_counts = vec![[0usize; 3]; vocab.len()];
        for (doc, sentiment) in &documents {
            let class = class_index(*sentiment);
            doc_counts[class] += 1;
            for term in doc {
                if let Some(&column) = vocab.get(term) {
                    token_counts[column][class] += 1;
                    token_totals[class] += 1;
                }
            }
        }

        // Laplace smoothing keeps every log finite, even for classes the
        // corpus never showed
        let total_docs = documents.len();
        let mut log_prior = [0.0f32; 3];
        for class in 0..3 {
            log_prior[class] =
                ((doc_counts[class] + 1) as f32 / (total_docs + CLASSES.len()) as f32).ln();
        }

        let vocab_size = vocab.len();
        let log_likelihood: Vec<[f32; 3]> = token_counts
            .iter()
            .map(|counts| {
                let mut row = [0.0f32; 3];
                for class in 0..3 {
                    row[class] = ((counts[class] + 1) as f32
                        / (token_totals[class] + vocab_size) as f32)
                        .ln();
                }
                row
            })
            .collect();

        debug!(
            "Trained sentiment classifier: {} examples, {} terms",
            total_docs, vocab_size
        );

        Ok(Self {
            vocab,
            log_prior,
            log_likelihood,
        })
    }

    /// Classify one review text.
    ///
    /// Tokens outside the training vocabulary are ignored; a text with no
    /// known tokens falls back to the prior (Neutral on a balanced corpus).
    pub fn classify(&self, text: &str) -> Sentiment {
        let mut scores = self.log_prior;
        for token in tokenize(text) {
            if let Some(&column) = self.vocab.get(&token) {
                for class in 0..3 {
                    scores[class] += self.log_likelihood[column][class];
                }
            }
        }

        let mut best = CLASSES[0];
        let mut best_score = scores[0];
        for (class, sentiment) in CLASSES.iter().enumerate().skip(1) {
            if scores[class] > best_score {
                best = *sentiment;
                best_score = scores[class];
            }
        }
        best
    }

    /// Summarize a batch of reviews: per-class counts plus the mean lexicon
    /// polarity. An empty batch yields an all-zero summary.
    pub fn summarize(&self, reviews: &[String]) -> ReviewSummary {
        if reviews.is_empty() {
            return ReviewSummary::empty();
        }

        let mut summary = ReviewSummary::empty();
        let mut polarity_sum = 0.0f32;
        for review in reviews {
            match self.classify(review) {
                Sentiment::Positive => summary.positive += 1,
                Sentiment::Negative => summary.negative += 1,
                Sentiment::Neutral => summary.neutral += 1,
            }
            polarity_sum += lexicon::polarity(review);
        }

        summary.total_reviews = reviews.len();
        summary.average_score = polarity_sum / reviews.len() as f32;
        summary
    }
}
