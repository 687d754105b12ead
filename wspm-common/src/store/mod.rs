//! Plan persistence
//!
//! [`PlanStore`] loads and saves whole plan records through a
//! [`KeyValueStore`] port, one JSON payload per plan under `planData_{id}`.
//!
//! - Saving is a full replace, never a merge.
//! - Loading an unknown id yields the built-in template.
//! - Loading a corrupt payload is an error; it is never papered over with
//!   the template.
//!
//! There is no conflict detection: two editors saving the same id race and
//! the last write wins.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::plan::{default_template, migrations, PlanRecord};
use crate::{Error, Result};

mod ids;
mod memory;
#[cfg(feature = "sqlx")]
mod sqlite;

pub use ids::{FixedIdGenerator, IdGenerator, MillisIdGenerator};
pub use memory::MemoryKeyValueStore;
#[cfg(feature = "sqlx")]
pub use sqlite::SqliteKeyValueStore;

/// Identifier meaning "allocate a fresh identifier now"
pub const NEW_PLAN_SENTINEL: &str = "new";

/// Prefix of every plan key in the backing store
pub const STORAGE_KEY_PREFIX: &str = "planData_";

/// Backing store key for a plan identifier
pub fn storage_key(id: &str) -> String {
    format!("{}{}", STORAGE_KEY_PREFIX, id)
}

/// String key-value storage scoped to one user/client
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    /// `Error::PersistenceWrite` when the store refuses the write.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value).await
    }
}

/// Where a loaded record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanOrigin {
    /// Deserialized from the backing store
    Stored,
    /// Built-in template (fresh id, or nothing stored yet)
    Template,
}

/// A record together with the identifier it is addressed by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPlan {
    pub id: String,
    pub origin: PlanOrigin,
    pub record: PlanRecord,
}

/// Load/save contract for plan records
pub struct PlanStore<S: KeyValueStore> {
    backend: S,
    ids: Arc<dyn IdGenerator>,
}

impl<S: KeyValueStore> PlanStore<S> {
    /// Create a store that allocates fresh ids from the current time
    pub fn new(backend: S) -> Self {
        Self::with_id_generator(backend, Arc::new(MillisIdGenerator::new()))
    }

    pub fn with_id_generator(backend: S, ids: Arc<dyn IdGenerator>) -> Self {
        Self { backend, ids }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Allocate a fresh plan identifier
    pub fn allocate_id(&self) -> String {
        self.ids.next_id()
    }

    /// Load the plan addressed by `id`.
    ///
    /// The sentinel `"new"` allocates a fresh id and returns the template.
    ///
    /// # Errors
    /// - `Error::Deserialization` if the stored value is not a well-formed plan
    /// - `Error::InvalidPayload` if its layout cannot be migrated
    /// - any read error of the backing store
    pub async fn load(&self, id: &str) -> Result<LoadedPlan> {
        if id == NEW_PLAN_SENTINEL {
            let id = self.allocate_id();
            info!("Allocated new plan id {}", id);
            return Ok(LoadedPlan {
                id,
                origin: PlanOrigin::Template,
                record: default_template(),
            });
        }

        match self.backend.get(&storage_key(id)).await? {
            None => {
                debug!("No stored plan for id {}; using template", id);
                Ok(LoadedPlan {
                    id: id.to_string(),
                    origin: PlanOrigin::Template,
                    record: default_template(),
                })
            }
            Some(serialized) => {
                let record = decode_record(&serialized).map_err(|e| {
                    warn!("Stored plan {} is unreadable: {}", id, e);
                    e
                })?;
                debug!("Loaded plan {}", id);
                Ok(LoadedPlan {
                    id: id.to_string(),
                    origin: PlanOrigin::Stored,
                    record,
                })
            }
        }
    }

    /// Serialize the whole record and write it under `id`.
    ///
    /// # Errors
    /// - `Error::InvalidInput` for the sentinel id or an empty id
    /// - `Error::PersistenceWrite` if the store refuses the write
    pub async fn save(&self, id: &str, record: &PlanRecord) -> Result<()> {
        if id == NEW_PLAN_SENTINEL || id.is_empty() {
            return Err(Error::InvalidInput(format!(
                "cannot save under identifier '{}'; allocate an id first",
                id
            )));
        }

        let serialized = serde_json::to_string(record)?;
        self.backend.set(&storage_key(id), &serialized).await?;
        info!("Saved plan {} ({} bytes)", id, serialized.len());
        Ok(())
    }
}

/// Parse, migrate and deserialize a stored payload
///
/// Service metrics are normalized on every load, whatever the payload
/// version, so a loaded record always satisfies the map invariants.
pub fn decode_record(serialized: &str) -> Result<PlanRecord> {
    let raw: serde_json::Value = serde_json::from_str(serialized)?;
    let migrated = migrations::migrate(raw)?;
    let mut record: PlanRecord = serde_json::from_value(migrated)?;

    let touched = record.services.normalize();
    if touched > 0 {
        warn!("Normalized {} service metric entries in stored plan", touched);
    }
    Ok(record)
}
