//! Popularity statistics over the rating log.
//!
//! The ranker precomputes per-movie aggregates from the resolved rating
//! snapshot and keeps a deterministic "most popular first" ordering of the
//! catalog. The recommendation engine uses it as the cold-start fallback;
//! the CLI uses the per-movie stats for search output.

use crate::types::{CatalogStore, Movie, MovieId, RatingStore};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

/// Precomputed aggregates for one movie
#[derive(Debug, Clone, Copy)]
pub struct MovieStats {
    pub avg_score: f32,
    pub rating_count: u32,
    /// Mean score dampened by rating volume
    pub popularity: f32,
}

/// Popularity score: average score weighted by log of rating volume, so a
/// 5.0 average from two ratings does not outrank a 4.5 from two hundred.
fn popularity_score(avg_score: f32, rating_count: u32) -> f32 {
    avg_score * ((rating_count + 1) as f32).ln()
}

/// Deterministic popularity ranking over the whole catalog.
///
/// Movies with no ratings rank at the tail (popularity 0.0); ties break by
/// ascending movie id. Built once alongside the other startup indices.
#[derive(Debug, Clone)]
pub struct PopularityRanker {
    catalog: Arc<CatalogStore>,
    stats: HashMap<MovieId, MovieStats>,
    /// Movie ids sorted by (popularity desc, id asc)
    ranked: Vec<MovieId>,
}

impl PopularityRanker {
    /// Compute stats from the resolved rating snapshot and rank the catalog.
    pub fn build(catalog: Arc<CatalogStore>, ratings: &RatingStore) -> Self {
        // Group resolved observations per movie
        let mut sums: HashMap<MovieId, (f32, u32)> = HashMap::new();
        for rating in ratings.all_ratings() {
            let entry = sums.entry(rating.movie_id).or_insert((0.0, 0));
            entry.0 += rating.score;
            entry.1 += 1;
        }

        let stats: HashMap<MovieId, MovieStats> = sums
            .into_par_iter()
            .map(|(movie_id, (total, count))| {
                let avg_score = total / count as f32;
                (
                    movie_id,
                    MovieStats {
                        avg_score,
                        rating_count: count,
                        popularity: popularity_score(avg_score, count),
                    },
                )
            })
            .collect();

        let mut ranked = catalog.movie_ids();
        let popularity_of =
            |id: &MovieId| stats.get(id).map(|s| s.popularity).unwrap_or(0.0);
        ranked.sort_by(|a, b| {
            popularity_of(b)
                .partial_cmp(&popularity_of(a))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.cmp(b))
        });

        Self {
            catalog,
            stats,
            ranked,
        }
    }

    /// Aggregates for a movie, if it has any ratings
    pub fn stats(&self, movie_id: MovieId) -> Option<&MovieStats> {
        self.stats.get(&movie_id)
    }

    /// The `n` most popular movies, most popular first
    pub fn popular_movies(&self, n: usize) -> Vec<Movie> {
        self.ranked
            .iter()
            .take(n)
            .filter_map(|&id| self.catalog.get_movie(id).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rating;

    fn create_test_stores() -> (Arc<CatalogStore>, RatingStore) {
        let mut catalog = CatalogStore::new();
        for (id, title) in [(1, "Widely Loved"), (2, "Niche Gem"), (3, "Unrated")] {
            catalog.insert_movie(Movie {
                id,
                title: title.to_string(),
                genres: vec!["Drama".to_string()],
                synopsis: String::new(),
            });
        }

        let mut ratings = RatingStore::new();
        // Movie 1: many good ratings
        for user_id in 1..=20 {
            ratings.insert_rating(Rating {
                user_id,
                movie_id: 1,
                score: 4.5,
                timestamp: 1_000_000,
            });
        }
        // Movie 2: one perfect rating
        ratings.insert_rating(Rating {
            user_id: 1,
            movie_id: 2,
            score: 5.0,
            timestamp: 1_000_000,
        });

        (Arc::new(catalog), ratings)
    }

    #[test]
    fn test_volume_outranks_single_perfect_score() {
        let (catalog, ratings) = create_test_stores();
        let ranker = PopularityRanker::build(catalog, &ratings);

        let top = ranker.popular_movies(3);
        assert_eq!(top[0].id, 1);
        assert_eq!(top[1].id, 2);
        // Unrated movie still appears, at the tail
        assert_eq!(top[2].id, 3);
    }

    #[test]
    fn test_stats() {
        let (catalog, ratings) = create_test_stores();
        let ranker = PopularityRanker::build(catalog, &ratings);

        let stats = ranker.stats(1).unwrap();
        assert_eq!(stats.rating_count, 20);
        assert!((stats.avg_score - 4.5).abs() < 1e-6);
        assert!(ranker.stats(3).is_none());
    }

    #[test]
    fn test_truncates_to_catalog_size() {
        let (catalog, ratings) = create_test_stores();
        let ranker = PopularityRanker::build(catalog, &ratings);

        assert_eq!(ranker.popular_movies(100).len(), 3);
        assert_eq!(ranker.popular_movies(0).len(), 0);
    }
}
