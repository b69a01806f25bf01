//! # Catalog Crate
//!
//! In-memory stores for the movie catalog and the rating log, plus the
//! loaders that fill them from disk.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Movie, Rating, CatalogStore, RatingStore)
//! - **loader**: Parse JSON Lines data files into the stores
//! - **popularity**: Per-movie rating aggregates and the cold-start ranking
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{load_catalog, load_ratings};
//! use std::path::Path;
//!
//! let movies = load_catalog(Path::new("data/movies.jsonl"))?;
//! let ratings = load_ratings(Path::new("data/ratings.jsonl"))?;
//!
//! let movie = movies.get_movie(1).unwrap();
//! let history = ratings.ratings_for_user(42);
//!
//! println!("{} has {} resolved ratings", movie.title, history.len());
//! ```
//!
//! ## Duplicate Policy
//!
//! The rating log is append-only and may hold several observations for the
//! same (user, movie) pair. The store resolves every read view to the
//! latest write, so downstream consumers never deal with duplicates.

// Public modules
pub mod error;
pub mod loader;
pub mod popularity;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use loader::{load_catalog, load_ratings};
pub use popularity::{MovieStats, PopularityRanker};
pub use types::{
    // Type aliases
    MovieId,
    UserId,
    // Core types
    CatalogStore,
    Movie,
    Rating,
    RatingStore,
    // Rating scale bounds
    RATING_MAX,
    RATING_MIN,
};
