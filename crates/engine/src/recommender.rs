//! # Recommendation Engine
//!
//! Coordinates the content similarity index and the latent factor model to
//! produce ranked recommendation lists through three strategies:
//!
//! 1. **Content-based**: weighted sum of similarity rows, scaled by the
//!    user's own rating scores; popularity fallback on cold start
//! 2. **Collaborative**: predicted score for every catalog movie from the
//!    latent factor model
//! 3. **Hybrid**: merge of 2n candidates from each, a fixed 0.5
//!    contribution per source list a movie appears in
//!
//! Every ranking sorts by (score desc, movie id asc), so results never
//! depend on map iteration order. Degradation is deliberate: an empty
//! catalog, an unknown user, or a missing model yields an empty result,
//! never an error. Only malformed requests fail, and only at the dispatch
//! boundary.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::error::EngineError;
use crate::providers::{CatalogProvider, PopularityProvider, RatingProvider};
use catalog::{MovieId, UserId};
use factor::ModelHandle;
use similarity::ContentIndex;

/// Fixed hybrid contribution for appearing in the content candidate list
pub const CONTENT_WEIGHT: f32 = 0.5;

/// Fixed hybrid contribution for appearing in the collaborative candidate list
pub const COLLABORATIVE_WEIGHT: f32 = 0.5;

// =============================================================================
// Request types
// =============================================================================

/// Which recommendation strategy to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Content,
    Collaborative,
    Hybrid,
}

impl FromStr for Strategy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, EngineError> {
        match s {
            "content" => Ok(Strategy::Content),
            "collaborative" => Ok(Strategy::Collaborative),
            "hybrid" => Ok(Strategy::Hybrid),
            other => Err(EngineError::InvalidArgument(format!(
                "unknown strategy: {} (expected content, collaborative, or hybrid)",
                other
            ))),
        }
    }
}

/// Whether content-based output may include movies the user already rated.
///
/// Kept by default: re-surfacing a loved movie is harmless and the scores
/// stay comparable across users. Exclusion is one config switch away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExcludePolicy {
    /// Keep already-rated movies in the ranking
    #[default]
    KeepRated,
    /// Drop already-rated movies before ranking
    ExcludeRated,
}

/// Engine-level policy switches
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub exclude_policy: ExcludePolicy,
}

impl EngineConfig {
    /// Configure the already-rated policy (default: keep)
    pub fn with_exclude_policy(mut self, policy: ExcludePolicy) -> Self {
        self.exclude_policy = policy;
        self
    }
}

// =============================================================================
// Result type
// =============================================================================

/// Which list a recommendation came out of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecSource {
    Content,
    Collaborative,
    Hybrid,
    /// Cold-start fallback ranking
    Popularity,
}

/// Final recommendation returned to the serving layer
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub movie_id: MovieId,
    pub title: String,
    pub genres: Vec<String>,
    /// Engine-computed ranking score, for transparency; 0.0 for
    /// popularity-fallback entries whose order comes from the provider
    pub score: f32,
    pub source: RecSource,
}

// =============================================================================
// Engine
// =============================================================================

/// The recommendation engine.
///
/// Holds read-only shared state built at startup: the catalog and rating
/// providers, the content index, and the model handle. Retraining happens
/// elsewhere and publishes through the handle; nothing here mutates.
pub struct RecommendationEngine {
    catalog: Arc<dyn CatalogProvider>,
    ratings: Arc<dyn RatingProvider>,
    popularity: Arc<dyn PopularityProvider>,
    content: Arc<ContentIndex>,
    model: ModelHandle,
    config: EngineConfig,
}

impl RecommendationEngine {
    /// Create an engine over already-built collaborators.
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        ratings: Arc<dyn RatingProvider>,
        popularity: Arc<dyn PopularityProvider>,
        content: Arc<ContentIndex>,
        model: ModelHandle,
    ) -> Self {
        Self {
            catalog,
            ratings,
            popularity,
            content,
            model,
            config: EngineConfig::default(),
        }
    }

    /// Replace the policy config (builder style)
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Handle used to publish retrained models
    pub fn model_handle(&self) -> &ModelHandle {
        &self.model
    }

    /// Dispatch boundary for the serving layer.
    ///
    /// Validates the request before any ranking logic runs: a zero limit is
    /// rejected here (the typed entry points below accept any `n`).
    pub fn recommend(
        &self,
        user_id: UserId,
        strategy: Strategy,
        n: usize,
    ) -> Result<Vec<Recommendation>, EngineError> {
        if n == 0 {
            return Err(EngineError::InvalidArgument(
                "recommendation limit must be positive".to_string(),
            ));
        }

        Ok(match strategy {
            Strategy::Content => self.recommend_content(user_id, n),
            Strategy::Collaborative => self.recommend_collaborative(user_id, n),
            Strategy::Hybrid => self.recommend_hybrid(user_id, n),
        })
    }

    /// Content-based recommendations.
    ///
    /// ## Algorithm
    /// Sum the similarity rows of every movie the user rated, each row
    /// scaled by that rating's score, then rank the aggregate. Rated movies
    /// missing from the index contribute nothing. A user with no ratings
    /// falls back to the popularity ranking.
    #[instrument(skip(self), fields(user_id = user_id))]
    pub fn recommend_content(&self, user_id: UserId, n: usize) -> Vec<Recommendation> {
        let history = self.ratings.list_ratings_for_user(user_id);
        if history.is_empty() {
            debug!("User {} has no ratings, serving popularity fallback", user_id);
            return self.popularity_fallback(n);
        }

        // Every indexed movie starts at zero so the ranking always covers
        // the whole catalog, even when parts of the history are unknown
        let mut aggregate: HashMap<MovieId, f32> = self
            .content
            .movie_ids()
            .iter()
            .map(|&movie_id| (movie_id, 0.0))
            .collect();
        let mut skipped = 0usize;
        for rating in &history {
            match self.content.similar_row(rating.movie_id) {
                Some(row) => {
                    for &(movie_id, sim) in row {
                        *aggregate.entry(movie_id).or_insert(0.0) += rating.score * sim;
                    }
                }
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!(
                "Skipped {} rated movies absent from the content index",
                skipped
            );
        }

        if self.config.exclude_policy == ExcludePolicy::ExcludeRated {
            for rating in &history {
                aggregate.remove(&rating.movie_id);
            }
        }

        let ranked = rank_scores(aggregate, n);
        self.to_recommendations(ranked, RecSource::Content)
    }

    /// Collaborative recommendations.
    ///
    /// ## Algorithm
    /// Ask the latent factor model for a predicted score for every catalog
    /// movie and rank by it. Without a trained model the strategy degrades
    /// to an empty result.
    #[instrument(skip(self), fields(user_id = user_id))]
    pub fn recommend_collaborative(&self, user_id: UserId, n: usize) -> Vec<Recommendation> {
        let Some(model) = self.model.load() else {
            warn!("No trained model available, collaborative result is empty");
            return Vec::new();
        };

        let mut predicted: Vec<(MovieId, f32)> = self
            .catalog
            .list_movies()
            .iter()
            .map(|movie| (movie.id, model.predict(user_id, movie.id)))
            .collect();

        predicted.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        predicted.truncate(n);

        self.to_recommendations(predicted, RecSource::Collaborative)
    }

    /// Hybrid recommendations.
    ///
    /// ## Algorithm
    /// Fetch 2n candidates from each strategy so the pool survives the
    /// merge, then give every candidate a fixed 0.5 per source list it
    /// appears in: present in both lists scores exactly 1.0, one list 0.5.
    /// The final (score desc, movie id asc) sort makes the merge
    /// deterministic regardless of map iteration order.
    #[instrument(skip(self), fields(user_id = user_id))]
    pub fn recommend_hybrid(&self, user_id: UserId, n: usize) -> Vec<Recommendation> {
        let pool = n.saturating_mul(2);
        let content = self.recommend_content(user_id, pool);
        let collaborative = self.recommend_collaborative(user_id, pool);

        let mut combined: HashMap<MovieId, f32> = HashMap::new();
        for rec in &content {
            *combined.entry(rec.movie_id).or_insert(0.0) += CONTENT_WEIGHT;
        }
        for rec in &collaborative {
            *combined.entry(rec.movie_id).or_insert(0.0) += COLLABORATIVE_WEIGHT;
        }

        debug!(
            "Hybrid merge: {} content + {} collaborative -> {} unique candidates",
            content.len(),
            collaborative.len(),
            combined.len()
        );

        let ranked = rank_scores(combined, n);
        self.to_recommendations(ranked, RecSource::Hybrid)
    }

    /// Popularity ranking dressed up as recommendations, for cold start
    fn popularity_fallback(&self, n: usize) -> Vec<Recommendation> {
        self.popularity
            .popular_movies(n)
            .into_iter()
            .map(|movie| Recommendation {
                movie_id: movie.id,
                title: movie.title,
                genres: movie.genres,
                score: 0.0,
                source: RecSource::Popularity,
            })
            .collect()
    }

    /// Enrich ranked (id, score) pairs with catalog metadata.
    ///
    /// Ids missing from the catalog are dropped silently; ranking ids come
    /// from the index or the catalog itself, so this only matters if the
    /// stores drifted apart.
    fn to_recommendations(
        &self,
        ranked: Vec<(MovieId, f32)>,
        source: RecSource,
    ) -> Vec<Recommendation> {
        ranked
            .into_iter()
            .filter_map(|(movie_id, score)| {
                let movie = self.catalog.get_movie(movie_id)?;
                Some(Recommendation {
                    movie_id,
                    title: movie.title,
                    genres: movie.genres,
                    score,
                    source,
                })
            })
            .collect()
    }
}

/// Rank an aggregate score map: (score desc, movie id asc), top n.
fn rank_scores(scores: HashMap<MovieId, f32>, n: usize) -> Vec<(MovieId, f32)> {
    let mut ranked: Vec<(MovieId, f32)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{CatalogStore, Movie, PopularityRanker, Rating, RatingStore};
    use factor::{FactorModel, TrainConfig};

    fn movie(id: MovieId, title: &str, synopsis: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            genres: Vec::new(),
            synopsis: synopsis.to_string(),
        }
    }

    /// Catalog of three movies; user 1 rated the two space movies.
    fn build_test_engine(with_model: bool) -> RecommendationEngine {
        let mut catalog = CatalogStore::new();
        catalog.insert_movie(movie(1, "Star Siege", "space war robots"));
        catalog.insert_movie(movie(2, "Iron Orbit", "robot war in space"));
        catalog.insert_movie(movie(3, "Autumn Hearts", "romantic drama"));
        let catalog = Arc::new(catalog);

        let mut ratings = RatingStore::new();
        ratings.insert_rating(Rating {
            user_id: 1,
            movie_id: 1,
            score: 5.0,
            timestamp: 1,
        });
        ratings.insert_rating(Rating {
            user_id: 1,
            movie_id: 2,
            score: 4.0,
            timestamp: 2,
        });
        ratings.insert_rating(Rating {
            user_id: 2,
            movie_id: 3,
            score: 5.0,
            timestamp: 3,
        });
        let ratings = Arc::new(ratings);

        let content = Arc::new(ContentIndex::build(&catalog));
        let popularity = Arc::new(PopularityRanker::build(catalog.clone(), &ratings));
        let model = if with_model {
            let trained =
                FactorModel::train(&ratings.all_ratings(), &TrainConfig::default()).unwrap();
            ModelHandle::with_model(trained)
        } else {
            ModelHandle::empty()
        };

        RecommendationEngine::new(catalog, ratings, popularity, content, model)
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("content".parse::<Strategy>().unwrap(), Strategy::Content);
        assert_eq!(
            "collaborative".parse::<Strategy>().unwrap(),
            Strategy::Collaborative
        );
        assert_eq!("hybrid".parse::<Strategy>().unwrap(), Strategy::Hybrid);

        let err = "trending".parse::<Strategy>().unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn test_zero_limit_rejected_at_boundary() {
        let engine = build_test_engine(true);
        let result = engine.recommend(1, Strategy::Hybrid, 0);
        assert!(matches!(result, Err(EngineError::InvalidArgument(_))));
    }

    #[test]
    fn test_content_ranks_own_top_rating_first() {
        let engine = build_test_engine(false);
        let recs = engine.recommend_content(1, 1);

        // 5-rated movie 1 aggregates 5.0 self-similarity plus spillover
        // from movie 2, beating everything else
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].movie_id, 1);
        assert_eq!(recs[0].source, RecSource::Content);
    }

    #[test]
    fn test_content_cold_start_equals_popularity_fallback() {
        let engine = build_test_engine(false);

        let recs = engine.recommend_content(42, 3);
        let popular = engine.popularity.popular_movies(3);

        let rec_ids: Vec<MovieId> = recs.iter().map(|r| r.movie_id).collect();
        let popular_ids: Vec<MovieId> = popular.iter().map(|m| m.id).collect();
        assert_eq!(rec_ids, popular_ids);
        assert!(recs.iter().all(|r| r.source == RecSource::Popularity));
    }

    #[test]
    fn test_exclude_policy_drops_rated_movies() {
        let engine = build_test_engine(false)
            .with_config(EngineConfig::default().with_exclude_policy(ExcludePolicy::ExcludeRated));

        let recs = engine.recommend_content(1, 10);
        let ids: Vec<MovieId> = recs.iter().map(|r| r.movie_id).collect();

        assert!(!ids.contains(&1));
        assert!(!ids.contains(&2));
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn test_collaborative_without_model_is_empty() {
        let engine = build_test_engine(false);
        assert!(engine.recommend_collaborative(1, 5).is_empty());
    }

    #[test]
    fn test_hybrid_without_model_degrades_to_content_half() {
        let engine = build_test_engine(false);
        let recs = engine.recommend_hybrid(1, 3);

        assert_eq!(recs.len(), 3);
        for rec in &recs {
            assert_eq!(rec.score, CONTENT_WEIGHT);
        }
    }

    #[test]
    fn test_hybrid_scores_both_sources_as_one() {
        let engine = build_test_engine(true);
        let recs = engine.recommend_hybrid(1, 3);

        // Tiny catalog: every movie shows up in both 2n candidate lists
        assert_eq!(recs.len(), 3);
        for rec in &recs {
            assert_eq!(rec.score, CONTENT_WEIGHT + COLLABORATIVE_WEIGHT);
            assert_eq!(rec.source, RecSource::Hybrid);
        }
        // All tied at 1.0, so order falls back to ascending movie id
        let ids: Vec<MovieId> = recs.iter().map(|r| r.movie_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_catalog_never_errors() {
        let catalog = Arc::new(CatalogStore::new());
        let ratings = Arc::new(RatingStore::new());
        let content = Arc::new(ContentIndex::build(&catalog));
        let popularity = Arc::new(PopularityRanker::build(catalog.clone(), &ratings));
        let engine = RecommendationEngine::new(
            catalog,
            ratings,
            popularity,
            content,
            ModelHandle::empty(),
        );

        assert!(engine.recommend_content(1, 10).is_empty());
        assert!(engine.recommend_collaborative(1, 10).is_empty());
        assert!(engine.recommend_hybrid(1, 10).is_empty());
        assert!(engine.recommend(1, Strategy::Hybrid, 10).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_rated_movie_skipped_silently() {
        let engine = build_test_engine(false);
        // User 3 rates a movie the catalog has never seen plus movie 3
        let mut ratings = RatingStore::new();
        ratings.insert_rating(Rating {
            user_id: 3,
            movie_id: 999,
            score: 5.0,
            timestamp: 1,
        });
        ratings.insert_rating(Rating {
            user_id: 3,
            movie_id: 3,
            score: 4.0,
            timestamp: 2,
        });

        let engine = RecommendationEngine::new(
            engine.catalog.clone(),
            Arc::new(ratings),
            engine.popularity.clone(),
            engine.content.clone(),
            ModelHandle::empty(),
        );

        let recs = engine.recommend_content(3, 3);
        assert_eq!(recs.len(), 3);
        // The phantom 999 contributed nothing; movie 3 leads on its own rating
        assert_eq!(recs[0].movie_id, 3);
    }
}
