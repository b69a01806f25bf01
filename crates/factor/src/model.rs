//! Latent factor rating prediction.
//!
//! Learns low-rank user and item representations from observed
//! (user, movie, score) triples and predicts a score for any pair.
//!
//! ## Algorithm
//! Biased matrix factorization trained by stochastic gradient descent:
//!
//! ```text
//! r_hat(u, i) = mu + b_u + b_i + p_u . q_i
//! ```
//!
//! Each epoch walks the observations in order and applies per-observation
//! updates minimizing squared error with L2 regularization. No shuffling:
//! given a fixed seed and epoch count, training is fully deterministic.

use catalog::{MovieId, Rating, UserId, RATING_MAX, RATING_MIN};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during model training
#[derive(Error, Debug)]
pub enum TrainError {
    /// The rating snapshot was empty; the engine keeps serving
    /// content-based recommendations without a model.
    #[error("no rating observations to train on")]
    NoObservations,

    /// A hyperparameter was outside its valid range
    #[error("invalid hyperparameter {name}: {value}")]
    InvalidConfig { name: &'static str, value: f32 },
}

/// Training hyperparameters
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of latent factors per user/item
    pub factors: usize,
    /// Full passes over the observations
    pub epochs: usize,
    /// SGD step size
    pub learning_rate: f32,
    /// L2 regularization strength
    pub regularization: f32,
    /// Factors initialize uniformly in (-init_scale, init_scale)
    pub init_scale: f32,
    /// RNG seed for factor initialization
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            factors: 32,
            epochs: 20,
            learning_rate: 0.005,
            regularization: 0.02,
            init_scale: 0.1,
            seed: 42,
        }
    }
}

impl TrainConfig {
    /// Configure the number of latent factors (default: 32)
    pub fn with_factors(mut self, factors: usize) -> Self {
        self.factors = factors;
        self
    }

    /// Configure the number of epochs (default: 20)
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Configure the SGD step size (default: 0.005)
    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Configure the regularization strength (default: 0.02)
    pub fn with_regularization(mut self, regularization: f32) -> Self {
        self.regularization = regularization;
        self
    }

    /// Configure the initialization seed (default: 42)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<(), TrainError> {
        if self.factors == 0 {
            return Err(TrainError::InvalidConfig {
                name: "factors",
                value: 0.0,
            });
        }
        if self.learning_rate <= 0.0 {
            return Err(TrainError::InvalidConfig {
                name: "learning_rate",
                value: self.learning_rate,
            });
        }
        if self.regularization < 0.0 {
            return Err(TrainError::InvalidConfig {
                name: "regularization",
                value: self.regularization,
            });
        }
        Ok(())
    }
}

/// Trained latent factor model.
///
/// Immutable after training; retraining builds a new instance which the
/// serving layer publishes through a `ModelHandle`.
#[derive(Debug)]
pub struct FactorModel {
    global_mean: f32,
    factors: usize,
    user_index: HashMap<UserId, usize>,
    item_index: HashMap<MovieId, usize>,
    user_bias: Vec<f32>,
    item_bias: Vec<f32>,
    /// Row-major user factors, `factors` values per user
    user_factors: Vec<f32>,
    /// Row-major item factors, `factors` values per item
    item_factors: Vec<f32>,
}

impl FactorModel {
    /// Train a model on a resolved rating snapshot.
    ///
    /// Users and items are indexed in first-seen observation order, so the
    /// same snapshot and config always produce the same model.
    pub fn train(observations: &[Rating], config: &TrainConfig) -> Result<Self, TrainError> {
        config.validate()?;
        if observations.is_empty() {
            return Err(TrainError::NoObservations);
        }

        // Index users and items, first seen wins
        let mut user_index: HashMap<UserId, usize> = HashMap::new();
        let mut item_index: HashMap<MovieId, usize> = HashMap::new();
        for obs in observations {
            let next = user_index.len();
            user_index.entry(obs.user_id).or_insert(next);
            let next = item_index.len();
            item_index.entry(obs.movie_id).or_insert(next);
        }
        let user_count = user_index.len();
        let item_count = item_index.len();

        let global_mean =
            observations.iter().map(|r| r.score).sum::<f32>() / observations.len() as f32;

        let factors = config.factors;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let scale = config.init_scale;
        let mut init = |count: usize| -> Vec<f32> {
            (0..count * factors)
                .map(|_| {
                    if scale > 0.0 {
                        rng.random_range(-scale..scale)
                    } else {
                        0.0
                    }
                })
                .collect()
        };
        let mut user_factors = init(user_count);
        let mut item_factors = init(item_count);
        let mut user_bias = vec![0.0f32; user_count];
        let mut item_bias = vec![0.0f32; item_count];

        let lr = config.learning_rate;
        let reg = config.regularization;

        for epoch in 0..config.epochs {
            let mut squared_error = 0.0f32;
            for obs in observations {
                let u = user_index[&obs.user_id];
                let i = item_index[&obs.movie_id];
                let (u_row, i_row) = (u * factors, i * factors);

                let mut dot = 0.0f32;
                for f in 0..factors {
                    dot += user_factors[u_row + f] * item_factors[i_row + f];
                }
                let predicted = global_mean + user_bias[u] + item_bias[i] + dot;
                let err = obs.score - predicted;
                squared_error += err * err;

                user_bias[u] += lr * (err - reg * user_bias[u]);
                item_bias[i] += lr * (err - reg * item_bias[i]);
                for f in 0..factors {
                    let p = user_factors[u_row + f];
                    let q = item_factors[i_row + f];
                    user_factors[u_row + f] += lr * (err * q - reg * p);
                    item_factors[i_row + f] += lr * (err * p - reg * q);
                }
            }

            debug!(
                "Epoch {}/{}: rmse {:.4}",
                epoch + 1,
                config.epochs,
                (squared_error / observations.len() as f32).sqrt()
            );
        }

        info!(
            "Trained latent factor model: {} users, {} items, {} factors, {} observations",
            user_count,
            item_count,
            factors,
            observations.len()
        );

        Ok(Self {
            global_mean,
            factors,
            user_index,
            item_index,
            user_bias,
            item_bias,
            user_factors,
            item_factors,
        })
    }

    /// Predict a score for any (user, movie) pair.
    ///
    /// Pairs absent from training are a cold-start case, not an error:
    /// the prediction backs off to the bias baseline, down to the global
    /// mean when both sides are unknown. Results clamp to the rating scale.
    pub fn predict(&self, user_id: UserId, movie_id: MovieId) -> f32 {
        let estimate = match (
            self.user_index.get(&user_id),
            self.item_index.get(&movie_id),
        ) {
            (Some(&u), Some(&i)) => {
                let (u_row, i_row) = (u * self.factors, i * self.factors);
                let mut dot = 0.0f32;
                for f in 0..self.factors {
                    dot += self.user_factors[u_row + f] * self.item_factors[i_row + f];
                }
                self.global_mean + self.user_bias[u] + self.item_bias[i] + dot
            }
            (Some(&u), None) => self.global_mean + self.user_bias[u],
            (None, Some(&i)) => self.global_mean + self.item_bias[i],
            (None, None) => self.global_mean,
        };
        estimate.clamp(RATING_MIN, RATING_MAX)
    }

    /// Mean score over the training snapshot
    pub fn global_mean(&self) -> f32 {
        self.global_mean
    }

    /// Number of users seen in training
    pub fn user_count(&self) -> usize {
        self.user_index.len()
    }

    /// Number of items seen in training
    pub fn item_count(&self) -> usize {
        self.item_index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(user_id: UserId, movie_id: MovieId, score: f32) -> Rating {
        Rating {
            user_id,
            movie_id,
            score,
            timestamp: 1_000_000,
        }
    }

    /// Two taste clusters: users 1-2 love movies 10-11 and pan 20-21,
    /// users 3-4 the other way around.
    fn clustered_observations() -> Vec<Rating> {
        let mut observations = Vec::new();
        for user_id in [1, 2] {
            for movie_id in [10, 11] {
                observations.push(rating(user_id, movie_id, 5.0));
            }
            for movie_id in [20, 21] {
                observations.push(rating(user_id, movie_id, 1.0));
            }
        }
        for user_id in [3, 4] {
            for movie_id in [10, 11] {
                observations.push(rating(user_id, movie_id, 1.0));
            }
            for movie_id in [20, 21] {
                observations.push(rating(user_id, movie_id, 5.0));
            }
        }
        observations
    }

    #[test]
    fn test_learns_taste_clusters() {
        let observations = clustered_observations();
        let config = TrainConfig::default().with_epochs(200).with_seed(7);
        let model = FactorModel::train(&observations, &config).unwrap();

        // Seen pairs should separate clearly after training
        assert!(model.predict(1, 10) > model.predict(1, 20));
        assert!(model.predict(3, 20) > model.predict(3, 10));
        assert!(model.predict(1, 10) > 3.0);
        assert!(model.predict(1, 20) < 3.0);
    }

    #[test]
    fn test_deterministic_given_seed() {
        let observations = clustered_observations();
        let config = TrainConfig::default().with_seed(99);

        let first = FactorModel::train(&observations, &config).unwrap();
        let second = FactorModel::train(&observations, &config).unwrap();

        for user_id in 1..=5 {
            for movie_id in [10, 11, 20, 21, 30] {
                assert_eq!(
                    first.predict(user_id, movie_id),
                    second.predict(user_id, movie_id),
                    "prediction for ({}, {}) diverged across runs",
                    user_id,
                    movie_id
                );
            }
        }
    }

    #[test]
    fn test_cold_start_backs_off_to_baseline() {
        let observations = vec![
            rating(1, 10, 5.0),
            rating(1, 11, 5.0),
            rating(2, 10, 1.0),
        ];
        let model = FactorModel::train(&observations, &TrainConfig::default()).unwrap();
        let mean = model.global_mean();

        // Both sides unknown: exactly the global mean
        assert_eq!(model.predict(99, 999), mean);
        // Known user, unknown item: mean shifted by the user bias
        let user_only = model.predict(1, 999);
        assert!(user_only >= mean, "user 1 rates generously");
        // Known item, unknown user: mean shifted by the item bias
        let item_only = model.predict(99, 11);
        assert!(item_only >= RATING_MIN && item_only <= RATING_MAX);
    }

    #[test]
    fn test_predictions_stay_in_scale() {
        let observations = clustered_observations();
        let config = TrainConfig::default().with_epochs(500);
        let model = FactorModel::train(&observations, &config).unwrap();

        for user_id in 1..=4 {
            for movie_id in [10, 11, 20, 21] {
                let predicted = model.predict(user_id, movie_id);
                assert!((RATING_MIN..=RATING_MAX).contains(&predicted));
            }
        }
    }

    #[test]
    fn test_empty_observations() {
        let result = FactorModel::train(&[], &TrainConfig::default());
        assert!(matches!(result, Err(TrainError::NoObservations)));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let observations = vec![rating(1, 10, 4.0)];

        let zero_factors = TrainConfig::default().with_factors(0);
        assert!(matches!(
            FactorModel::train(&observations, &zero_factors),
            Err(TrainError::InvalidConfig { name: "factors", .. })
        ));

        let bad_lr = TrainConfig::default().with_learning_rate(0.0);
        assert!(matches!(
            FactorModel::train(&observations, &bad_lr),
            Err(TrainError::InvalidConfig {
                name: "learning_rate",
                ..
            })
        ));
    }

    #[test]
    fn test_counts() {
        let observations = clustered_observations();
        let model = FactorModel::train(&observations, &TrainConfig::default()).unwrap();

        assert_eq!(model.user_count(), 4);
        assert_eq!(model.item_count(), 4);
    }
}
