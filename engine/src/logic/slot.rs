//! Model Slot - Atomically Swapped Snapshot
//!
//! The single shared mutable resource: one immutable (Dataset, ClusterModel)
//! pair behind a swappable reference. Readers clone the Arc at call start
//! and finish against that snapshot; a fit installs its result with one
//! write-lock swap. A mismatched Dataset/assignment pair can never be
//! observed because the pair is one value.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::logic::cluster::ClusterModel;
use crate::logic::dataset::Dataset;

/// Immutable fit result installed into the slot
pub struct ModelSnapshot {
    pub dataset: Dataset,
    pub model: ClusterModel,
    pub fitted_at: DateTime<Utc>,
}

impl ModelSnapshot {
    pub fn new(dataset: Dataset, model: ClusterModel) -> Self {
        Self {
            dataset,
            model,
            fitted_at: Utc::now(),
        }
    }
}

/// Process-wide current-model holder
pub struct ModelSlot {
    current: RwLock<Option<Arc<ModelSnapshot>>>,
}

impl ModelSlot {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// Install a fresh snapshot, discarding the previous one
    pub fn install(&self, snapshot: ModelSnapshot) {
        *self.current.write() = Some(Arc::new(snapshot));
    }

    /// Snapshot reference for one read operation; never re-read mid-call
    pub fn snapshot(&self) -> Option<Arc<ModelSnapshot>> {
        self.current.read().clone()
    }

    pub fn is_fitted(&self) -> bool {
        self.current.read().is_some()
    }
}

impl Default for ModelSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::cluster::KMeans;
    use crate::logic::dataset::{AttrValue, RawTable};
    use crate::logic::schema::{AttributeKind, SchemaPolicy};

    fn snapshot(ages: &[f64]) -> ModelSnapshot {
        let policy = SchemaPolicy {
            sensitive: Default::default(),
            features: vec!["age".to_string()],
            queryable: Default::default(),
            kinds: [("age".to_string(), AttributeKind::Numeric)].into(),
            derived: vec![],
        };
        let table = RawTable {
            headers: vec!["age".to_string()],
            rows: ages.iter().map(|&a| vec![AttrValue::Number(a)]).collect(),
        };
        let dataset = Dataset::build(&table, &policy).unwrap();
        let model = ClusterModel::fit(
            &dataset,
            &["age".to_string()],
            Some(2),
            None,
            &KMeans::default(),
        )
        .unwrap();
        ModelSnapshot::new(dataset, model)
    }

    #[test]
    fn test_slot_starts_empty() {
        let slot = ModelSlot::new();
        assert!(!slot.is_fitted());
        assert!(slot.snapshot().is_none());
    }

    #[test]
    fn test_readers_keep_their_snapshot_across_swaps() {
        let slot = ModelSlot::new();
        slot.install(snapshot(&[1.0, 2.0, 50.0, 51.0]));

        let held = slot.snapshot().unwrap();
        assert_eq!(held.dataset.len(), 4);

        // A reload swaps the slot, in-flight readers keep the old pair
        slot.install(snapshot(&[1.0, 2.0, 3.0, 50.0, 51.0, 52.0]));
        assert_eq!(held.dataset.len(), 4);
        assert_eq!(slot.snapshot().unwrap().dataset.len(), 6);
    }
}
