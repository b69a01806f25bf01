//! Core domain types for the movie catalog and rating log.
//!
//! This module defines the fundamental data structures used throughout the
//! system: movies with their text content, user ratings, and the two
//! in-memory stores the recommendation pipeline reads from.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================
// These make the domain clearer and prevent mixing up user IDs with movie IDs

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie
pub type MovieId = u32;

// =============================================================================
// Rating Scale
// =============================================================================

/// Lowest score a rating may carry
pub const RATING_MIN: f32 = 1.0;

/// Highest score a rating may carry
pub const RATING_MAX: f32 = 5.0;

// =============================================================================
// Movie
// =============================================================================

/// A movie in the catalog.
///
/// Immutable once loaded; a catalog refresh replaces the whole store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Genre tags, deduplicated on load (e.g. "Crime", "Drama")
    pub genres: Vec<String>,
    /// Plot synopsis; may be empty
    pub synopsis: String,
}

impl Movie {
    /// Concatenated synopsis and genre text used for content vectorization.
    pub fn content_text(&self) -> String {
        let mut text = self.synopsis.clone();
        for genre in &self.genres {
            text.push(' ');
            text.push_str(genre);
        }
        text
    }
}

// =============================================================================
// Rating
// =============================================================================

/// A single rating observation from a user for a movie.
///
/// Observations are append-only; the same (user, movie) pair may appear
/// more than once in the log and is resolved by the `RatingStore`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Score within [`RATING_MIN`]..=[`RATING_MAX`]
    pub score: f32,
    /// Unix timestamp when the rating was made
    pub timestamp: i64,
}

// =============================================================================
// CatalogStore
// =============================================================================

/// In-memory store of all movies, indexed by id.
///
/// All listing methods return movies in ascending id order so that callers
/// iterating the catalog see a deterministic sequence.
#[derive(Debug, Default)]
pub struct CatalogStore {
    movies: HashMap<MovieId, Movie>,
}

impl CatalogStore {
    /// Creates a new, empty store
    pub fn new() -> Self {
        Self {
            movies: HashMap::new(),
        }
    }

    /// Insert a movie into the store.
    ///
    /// A movie with an id already present replaces the previous record;
    /// the loader rejects duplicate ids before they get here.
    pub fn insert_movie(&mut self, movie: Movie) {
        self.movies.insert(movie.id, movie);
    }

    /// Get a movie by id
    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    /// All movie ids in ascending order
    pub fn movie_ids(&self) -> Vec<MovieId> {
        let mut ids: Vec<MovieId> = self.movies.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// All movies in ascending id order
    pub fn list_movies(&self) -> Vec<&Movie> {
        let mut movies: Vec<&Movie> = self.movies.values().collect();
        movies.sort_by_key(|m| m.id);
        movies
    }

    /// Number of movies in the catalog
    pub fn len(&self) -> usize {
        self.movies.len()
    }

    /// Whether the catalog holds no movies
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Case-insensitive title search.
    ///
    /// Exact matches rank ahead of substring matches; within each group
    /// results are in ascending id order.
    pub fn search_title(&self, query: &str) -> Vec<&Movie> {
        let query_lower = query.to_lowercase();
        let mut matches: Vec<(u8, &Movie)> = Vec::new();

        for movie in self.movies.values() {
            let title_lower = movie.title.to_lowercase();
            if title_lower == query_lower {
                matches.push((0, movie));
            } else if title_lower.contains(&query_lower) {
                matches.push((1, movie));
            }
        }

        matches.sort_by_key(|(rank, movie)| (*rank, movie.id));
        matches.into_iter().map(|(_, movie)| movie).collect()
    }
}

// =============================================================================
// RatingStore
// =============================================================================

/// Append-only log of rating observations with per-user lookup.
///
/// The store owns the duplicate policy: when the same (user, movie) pair was
/// rated more than once, every read view resolves to the observation with
/// the latest timestamp (ties fall to the latest append). The engine never
/// sees duplicates.
#[derive(Debug, Default)]
pub struct RatingStore {
    /// Full append-only log, in arrival order
    entries: Vec<Rating>,
    /// Positions into `entries` for each user's observations
    user_index: HashMap<UserId, Vec<usize>>,
}

impl RatingStore {
    /// Creates a new, empty store
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            user_index: HashMap::new(),
        }
    }

    /// Append a rating observation to the log
    pub fn insert_rating(&mut self, rating: Rating) {
        let position = self.entries.len();
        self.entries.push(rating);
        self.user_index
            .entry(rating.user_id)
            .or_default()
            .push(position);
    }

    /// Resolved ratings for one user, in ascending movie id order.
    ///
    /// Returns an empty vector for unknown users.
    pub fn ratings_for_user(&self, user_id: UserId) -> Vec<Rating> {
        let Some(positions) = self.user_index.get(&user_id) else {
            return Vec::new();
        };

        // Last write wins per movie: positions are in append order, so a
        // timestamp >= comparison lets later appends overtake on ties.
        let mut latest: HashMap<MovieId, usize> = HashMap::new();
        for &position in positions {
            let rating = &self.entries[position];
            let newer = match latest.get(&rating.movie_id) {
                Some(&current) => rating.timestamp >= self.entries[current].timestamp,
                None => true,
            };
            if newer {
                latest.insert(rating.movie_id, position);
            }
        }

        let mut resolved: Vec<Rating> = latest.into_values().map(|p| self.entries[p]).collect();
        resolved.sort_by_key(|r| r.movie_id);
        resolved
    }

    /// Resolved snapshot of every (user, movie) observation, for training.
    ///
    /// Sorted by (user id, movie id) so snapshots are deterministic.
    pub fn all_ratings(&self) -> Vec<Rating> {
        let mut latest: HashMap<(UserId, MovieId), usize> = HashMap::new();
        for (position, rating) in self.entries.iter().enumerate() {
            let key = (rating.user_id, rating.movie_id);
            let newer = match latest.get(&key) {
                Some(&current) => rating.timestamp >= self.entries[current].timestamp,
                None => true,
            };
            if newer {
                latest.insert(key, position);
            }
        }

        let mut resolved: Vec<Rating> = latest.into_values().map(|p| self.entries[p]).collect();
        resolved.sort_by_key(|r| (r.user_id, r.movie_id));
        resolved
    }

    /// All user ids with at least one observation, ascending
    pub fn user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.user_index.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Raw log length, counting unresolved duplicates
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no observations
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
