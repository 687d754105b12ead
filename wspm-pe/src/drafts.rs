//! Open editing sessions
//!
//! A draft is the authoritative in-memory copy of a plan while it is being
//! edited. Edits replace the draft with the record the edit operation
//! returns; nothing reaches the store until an explicit save.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};
use wspm_common::plan::EditOutcome;
use wspm_common::{PlanOrigin, PlanRecord};

/// One open editing session
#[derive(Debug, Clone)]
pub struct Draft {
    pub record: PlanRecord,
    /// Where the record came from when the draft was opened
    pub origin: PlanOrigin,
    pub opened_at: DateTime<Utc>,
    /// True once the draft differs from what was last loaded or saved
    pub dirty: bool,
}

/// Drafts keyed by plan identifier
#[derive(Debug, Default)]
pub struct DraftRegistry {
    drafts: RwLock<HashMap<String, Draft>>,
}

impl DraftRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the open draft for `id`, if any
    pub async fn get(&self, id: &str) -> Option<Draft> {
        self.drafts.read().await.get(id).cloned()
    }

    /// Open a draft unless one is already open; returns the draft in effect
    pub async fn open(&self, id: &str, origin: PlanOrigin, record: PlanRecord) -> Draft {
        let mut drafts = self.drafts.write().await;
        drafts
            .entry(id.to_string())
            .or_insert_with(|| {
                info!(plan_id = id, origin = ?origin, "Draft opened");
                Draft {
                    record,
                    origin,
                    opened_at: Utc::now(),
                    dirty: false,
                }
            })
            .clone()
    }

    /// Apply an edit to the open draft
    ///
    /// Returns `None` when no draft is open for `id`.
    pub async fn apply<F>(&self, id: &str, edit: F) -> Option<EditOutcome>
    where
        F: FnOnce(&PlanRecord) -> EditOutcome,
    {
        let mut drafts = self.drafts.write().await;
        let draft = drafts.get_mut(id)?;

        let outcome = edit(&draft.record);
        if outcome.record != draft.record {
            draft.record = outcome.record.clone();
            draft.dirty = true;
        }
        debug!(plan_id = id, warnings = outcome.warnings.len(), "Draft edited");
        Some(outcome)
    }

    /// Mark the draft as matching storage, provided it still holds `saved`
    pub async fn mark_saved(&self, id: &str, saved: &PlanRecord) {
        if let Some(draft) = self.drafts.write().await.get_mut(id) {
            if &draft.record == saved {
                draft.dirty = false;
                draft.origin = PlanOrigin::Stored;
            }
        }
    }

    /// Close the draft without saving; returns whether one was open
    pub async fn discard(&self, id: &str) -> bool {
        let removed = self.drafts.write().await.remove(id).is_some();
        if removed {
            info!(plan_id = id, "Draft discarded");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.drafts.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wspm_common::plan::{default_template, set_field, toggle_service_type, FieldPatch};

    #[tokio::test]
    async fn test_open_keeps_existing_draft() {
        let registry = DraftRegistry::new();
        registry.open("1", PlanOrigin::Template, default_template()).await;

        let mut other = default_template();
        other.summary = "別の内容".to_string();
        let draft = registry.open("1", PlanOrigin::Stored, other).await;

        assert_eq!(draft.origin, PlanOrigin::Template);
        assert_eq!(draft.record.summary, "");
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_apply_requires_open_draft() {
        let registry = DraftRegistry::new();
        let result = registry
            .apply("missing", |r| EditOutcome {
                record: r.clone(),
                warnings: Vec::new(),
            })
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_apply_replaces_record_and_marks_dirty() {
        let registry = DraftRegistry::new();
        registry.open("1", PlanOrigin::Template, default_template()).await;

        registry
            .apply("1", |r| EditOutcome {
                record: set_field(r, FieldPatch::Summary("経過".to_string())),
                warnings: Vec::new(),
            })
            .await
            .unwrap();

        let draft = registry.get("1").await.unwrap();
        assert_eq!(draft.record.summary, "経過");
        assert!(draft.dirty);
    }

    #[tokio::test]
    async fn test_noop_edit_stays_clean() {
        let registry = DraftRegistry::new();
        registry.open("1", PlanOrigin::Template, default_template()).await;

        let outcome = registry
            .apply("1", |r| toggle_service_type(r, "居宅介護", true))
            .await
            .unwrap();
        assert!(outcome.warnings.is_empty());
        assert!(!registry.get("1").await.unwrap().dirty);
    }

    #[tokio::test]
    async fn test_mark_saved_and_discard() {
        let registry = DraftRegistry::new();
        registry.open("1", PlanOrigin::Template, default_template()).await;
        let outcome = registry
            .apply("1", |r| EditOutcome {
                record: set_field(r, FieldPatch::LifeHistory("生活歴".to_string())),
                warnings: Vec::new(),
            })
            .await
            .unwrap();

        registry.mark_saved("1", &outcome.record).await;
        let draft = registry.get("1").await.unwrap();
        assert!(!draft.dirty);
        assert_eq!(draft.origin, PlanOrigin::Stored);

        assert!(registry.discard("1").await);
        assert!(!registry.discard("1").await);
        assert!(registry.get("1").await.is_none());
    }
}
