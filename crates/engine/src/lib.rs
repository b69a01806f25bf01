//! # Engine Crate
//!
//! The recommendation engine: orchestrates the content similarity index and
//! the latent factor model into three ranked-list strategies, with explicit
//! cold-start and degradation behavior.
//!
//! ## Strategy decision table
//!
//! | Situation | content | collaborative | hybrid |
//! |---|---|---|---|
//! | normal | similarity aggregate | model predictions | 0.5 + 0.5 merge |
//! | user has no ratings | popularity fallback | model baseline | merge as usual |
//! | no trained model | unaffected | empty | content half only |
//! | empty catalog | empty | empty | empty |
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::{RecommendationEngine, Strategy};
//!
//! let engine = RecommendationEngine::new(catalog, ratings, popularity, content, model);
//! let recs = engine.recommend(user_id, Strategy::Hybrid, 10)?;
//! for rec in recs {
//!     println!("{} ({:.2})", rec.title, rec.score);
//! }
//! ```

// Public modules
pub mod error;
pub mod providers;
pub mod recommender;

// Re-export commonly used types
pub use error::EngineError;
pub use providers::{CatalogProvider, PopularityProvider, RatingProvider};
pub use recommender::{
    EngineConfig, ExcludePolicy, RecSource, Recommendation, RecommendationEngine, Strategy,
    COLLABORATIVE_WEIGHT, CONTENT_WEIGHT,
};
