//! Shared, swappable handle to the trained model.
//!
//! Serving reads take a snapshot (`Arc` clone) and keep it for the whole
//! request; retraining builds a new model off the serving path and
//! publishes it with a single reference store. A reader therefore observes
//! either the old or the new model consistently, never a partial update.

use crate::model::FactorModel;
use std::sync::{Arc, RwLock};

/// Clonable handle sharing one model slot between serving and retraining.
///
/// Starts empty when training has never succeeded; the engine treats an
/// empty handle as "no collaborative signal", not an error.
#[derive(Debug, Clone, Default)]
pub struct ModelHandle {
    inner: Arc<RwLock<Option<Arc<FactorModel>>>>,
}

impl ModelHandle {
    /// A handle with no model yet
    pub fn empty() -> Self {
        Self::default()
    }

    /// A handle holding an already trained model
    pub fn with_model(model: FactorModel) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(Arc::new(model)))),
        }
    }

    /// Snapshot of the current model, if one has been published.
    ///
    /// The returned `Arc` stays valid across concurrent swaps.
    pub fn load(&self) -> Option<Arc<FactorModel>> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Publish a retrained model, returning the one it replaced.
    pub fn swap(&self, model: FactorModel) -> Option<Arc<FactorModel>> {
        let next = Some(Arc::new(model));
        match self.inner.write() {
            Ok(mut guard) => std::mem::replace(&mut *guard, next),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), next),
        }
    }

    /// Whether a model has been published
    pub fn is_trained(&self) -> bool {
        self.load().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrainConfig;
    use catalog::Rating;

    fn trained_model(seed: u64) -> FactorModel {
        let observations = vec![
            Rating {
                user_id: 1,
                movie_id: 10,
                score: 5.0,
                timestamp: 0,
            },
            Rating {
                user_id: 2,
                movie_id: 10,
                score: 3.0,
                timestamp: 0,
            },
        ];
        FactorModel::train(&observations, &TrainConfig::default().with_seed(seed)).unwrap()
    }

    #[test]
    fn test_empty_handle() {
        let handle = ModelHandle::empty();
        assert!(!handle.is_trained());
        assert!(handle.load().is_none());
    }

    #[test]
    fn test_swap_publishes_and_returns_previous() {
        let handle = ModelHandle::empty();

        assert!(handle.swap(trained_model(1)).is_none());
        assert!(handle.is_trained());

        let previous = handle.swap(trained_model(2));
        assert!(previous.is_some());
    }

    #[test]
    fn test_snapshot_survives_swap() {
        let handle = ModelHandle::with_model(trained_model(1));
        let snapshot = handle.load().unwrap();
        let before = snapshot.predict(1, 10);

        handle.swap(trained_model(2));

        // The old snapshot still answers consistently
        assert_eq!(snapshot.predict(1, 10), before);
    }

    #[test]
    fn test_clones_share_the_slot() {
        let handle = ModelHandle::empty();
        let clone = handle.clone();

        handle.swap(trained_model(1));
        assert!(clone.is_trained());
    }
}
