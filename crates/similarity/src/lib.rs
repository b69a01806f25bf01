//! # Similarity Crate
//!
//! Content-based similarity for the movie catalog.
//!
//! ## Components
//!
//! ### Tokenizer
//! Normalizes synopsis and genre text into terms: lowercase, split on
//! non-alphanumeric boundaries, drop short tokens and stop-words.
//!
//! ### ContentIndex
//! TF-IDF weighted term vector per movie and a full pairwise cosine
//! similarity matrix, built once per catalog load:
//! - Stable movie id -> row mapping in ascending id order
//! - Duplicate titles resolve to one canonical row (first seen wins)
//! - Movies with no text get a zero vector: similarity 0 to everything
//!   except themselves
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::load_catalog;
//! use similarity::ContentIndex;
//! use std::path::Path;
//!
//! let movies = load_catalog(Path::new("data/movies.jsonl"))?;
//! let index = ContentIndex::build(&movies);
//!
//! // Full similarity row, or just the closest neighbors
//! let row = index.similar_row(1);
//! let neighbors = index.most_similar(1, 10);
//! ```

// Public modules
pub mod index;
pub mod text;

// Re-export commonly used types
pub use index::ContentIndex;
pub use text::{tokenize, Tokenizer, STOP_WORDS};
