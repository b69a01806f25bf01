//! # Factor Crate
//!
//! Latent factor rating prediction: biased matrix factorization trained by
//! SGD on the resolved rating snapshot, plus the handle that lets the
//! serving layer swap in a retrained model atomically.
//!
//! ## Example Usage
//!
//! ```ignore
//! use factor::{FactorModel, ModelHandle, TrainConfig};
//!
//! let config = TrainConfig::default().with_seed(42);
//! let model = FactorModel::train(&ratings.all_ratings(), &config)?;
//! let handle = ModelHandle::with_model(model);
//!
//! // Serving path
//! if let Some(model) = handle.load() {
//!     let predicted = model.predict(user_id, movie_id);
//! }
//!
//! // Later, off the serving path
//! let retrained = FactorModel::train(&ratings.all_ratings(), &config)?;
//! handle.swap(retrained);
//! ```
//!
//! Training is deterministic for a fixed seed and epoch count; tests must
//! seed their configs.

// Public modules
pub mod handle;
pub mod model;

// Re-export commonly used types
pub use handle::ModelHandle;
pub use model::{FactorModel, TrainConfig, TrainError};
