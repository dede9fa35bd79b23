//! Dataset registry serving inspections and column change notifications.
//!
//! Each dataset sits behind its own [`RwLock`]: inspections share a read lock,
//! column changes take the write lock. [`ValidationService::edit_columns`]
//! commits a column model edit and synchronizes the schema under one write
//! guard, so an inspection never sees a column model and a schema that
//! disagree.

use crate::{ServiceError, ValidationInspector};
use cellcheck_core::{ColumnModel, Dataset, InspectOptions, InspectionReport};
use cellcheck_package::{ColumnChange, MetadataStore, SchemaSynchronizer, SyncOutcome};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

type SharedDataset = Arc<RwLock<Dataset>>;

/// Serves validation requests for a set of datasets.
pub struct ValidationService {
    datasets: RwLock<HashMap<String, SharedDataset>>,
    inspector: ValidationInspector,
    synchronizer: SchemaSynchronizer,
    store: Option<Arc<dyn MetadataStore>>,
    concurrent: bool,
}

impl Default for ValidationService {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationService {
    /// Creates a service with the built-in constraints and no metadata store.
    pub fn new() -> Self {
        Self {
            datasets: RwLock::new(HashMap::new()),
            inspector: ValidationInspector::new(),
            synchronizer: SchemaSynchronizer::new(),
            store: None,
            concurrent: false,
        }
    }

    /// Persists metadata through `store` and loads it on registration.
    pub fn with_store(mut self, store: Arc<dyn MetadataStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Uses a custom inspector.
    pub fn with_inspector(mut self, inspector: ValidationInspector) -> Self {
        self.inspector = inspector;
        self
    }

    /// Validates columns concurrently, one task per column.
    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Registers a dataset, replacing any dataset with the same id.
    ///
    /// A dataset without metadata picks up the descriptor stored for its id.
    pub async fn register(&self, mut dataset: Dataset) -> Result<()> {
        if dataset.metadata().is_none() {
            if let Some(store) = &self.store {
                if let Some(metadata) = store.load(dataset.id())? {
                    debug!(dataset = %dataset.id(), "attached stored metadata");
                    dataset.attach_metadata(metadata);
                }
            }
        }

        let id = dataset.id().to_string();
        info!(dataset = %id, columns = dataset.columns.len(), rows = dataset.len(), "registered dataset");
        self.datasets
            .write()
            .await
            .insert(id, Arc::new(RwLock::new(dataset)));
        Ok(())
    }

    /// Removes a dataset and returns it.
    pub async fn remove(&self, dataset_id: &str) -> Option<Dataset> {
        let shared = self.datasets.write().await.remove(dataset_id)?;
        let dataset = shared.read().await.clone();
        Some(dataset)
    }

    /// Returns the ids of the registered datasets, sorted.
    pub async fn dataset_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.datasets.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns a copy of a dataset.
    pub async fn snapshot(&self, dataset_id: &str) -> Result<Dataset> {
        let shared = self.dataset(dataset_id).await?;
        let dataset = shared.read().await.clone();
        Ok(dataset)
    }

    /// Validates the requested columns of a dataset.
    #[instrument(skip(self, options), fields(columns = options.column_names.len()))]
    pub async fn inspect(
        &self,
        dataset_id: &str,
        options: &InspectOptions,
    ) -> Result<InspectionReport> {
        let shared = self.dataset(dataset_id).await?;
        let dataset = shared.read().await;
        let report = if self.concurrent {
            self.inspector.inspect_concurrent(&dataset, options).await
        } else {
            self.inspector.inspect(&dataset, options)
        };
        Ok(report)
    }

    /// Applies a structural column edit and the matching schema change as
    /// one step.
    ///
    /// `edit` runs on the column model under the dataset's write lock; when it
    /// succeeds, `change` is synchronized into the schema before the lock is
    /// released. A rejected edit leaves both untouched.
    #[instrument(skip(self, edit, change), fields(kind = change.kind()))]
    pub async fn edit_columns<F, T>(
        &self,
        dataset_id: &str,
        edit: F,
        change: &ColumnChange,
    ) -> Result<(T, SyncOutcome)>
    where
        F: FnOnce(&mut ColumnModel) -> cellcheck_core::Result<T>,
    {
        let shared = self.dataset(dataset_id).await?;
        let mut dataset = shared.write().await;
        let value = edit(&mut dataset.columns)?;
        let outcome = self.synchronize(&mut dataset, change)?;
        Ok((value, outcome))
    }

    /// Synchronizes a dataset's schema after a committed column change.
    ///
    /// Updated metadata is saved to the store when one is configured.
    #[instrument(skip(self, change), fields(kind = change.kind()))]
    pub async fn apply_column_change(
        &self,
        dataset_id: &str,
        change: &ColumnChange,
    ) -> Result<SyncOutcome> {
        let shared = self.dataset(dataset_id).await?;
        let mut dataset = shared.write().await;
        self.synchronize(&mut dataset, change)
    }

    fn synchronize(&self, dataset: &mut Dataset, change: &ColumnChange) -> Result<SyncOutcome> {
        let outcome = self.synchronizer.on_column_change(dataset, change)?;

        if !matches!(outcome, SyncOutcome::Skipped(_)) {
            if let (Some(store), Some(metadata)) = (&self.store, dataset.metadata()) {
                store.save(dataset.id(), metadata)?;
            }
        }
        Ok(outcome)
    }

    async fn dataset(&self, dataset_id: &str) -> Result<SharedDataset> {
        self.datasets
            .read()
            .await
            .get(dataset_id)
            .cloned()
            .ok_or_else(|| ServiceError::UnknownDataset(dataset_id.to_string()))
    }
}
