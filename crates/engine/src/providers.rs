//! Collaborator interfaces the engine consumes.
//!
//! The engine only sees these traits; the in-memory stores from the
//! `catalog` crate implement them, and a different persistence layer can
//! slot in without touching ranking logic. Providers return owned values so
//! implementations are free to build results on the fly.

use catalog::{CatalogStore, Movie, MovieId, PopularityRanker, Rating, RatingStore, UserId};

/// Source of movie records
pub trait CatalogProvider: Send + Sync {
    /// Every movie, in ascending id order
    fn list_movies(&self) -> Vec<Movie>;

    /// A single movie by id
    fn get_movie(&self, id: MovieId) -> Option<Movie>;
}

/// Source of rating observations, already resolved of duplicates
pub trait RatingProvider: Send + Sync {
    /// One user's resolved ratings
    fn list_ratings_for_user(&self, user_id: UserId) -> Vec<Rating>;

    /// The full resolved snapshot, for training
    fn list_all_ratings(&self) -> Vec<Rating>;
}

/// Popularity ranking, consulted only on cold start
pub trait PopularityProvider: Send + Sync {
    /// The `n` most popular movies, most popular first
    fn popular_movies(&self, n: usize) -> Vec<Movie>;
}

impl CatalogProvider for CatalogStore {
    fn list_movies(&self) -> Vec<Movie> {
        CatalogStore::list_movies(self).into_iter().cloned().collect()
    }

    fn get_movie(&self, id: MovieId) -> Option<Movie> {
        CatalogStore::get_movie(self, id).cloned()
    }
}

impl RatingProvider for RatingStore {
    fn list_ratings_for_user(&self, user_id: UserId) -> Vec<Rating> {
        self.ratings_for_user(user_id)
    }

    fn list_all_ratings(&self) -> Vec<Rating> {
        self.all_ratings()
    }
}

impl PopularityProvider for PopularityRanker {
    fn popular_movies(&self, n: usize) -> Vec<Movie> {
        PopularityRanker::popular_movies(self, n)
    }
}
