//! Plan record model
//!
//! A [`PlanRecord`] is one client's support plan: identity header, six named
//! subsections and two free-text top-level fields. It serializes to the JSON
//! payload kept in the key-value store (camelCase keys, identity fields at the
//! top level of the payload).
//!
//! Every struct deserializes with `#[serde(default)]`, so a payload missing any
//! scalar comes back with `""` in its place rather than failing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

mod edit;
mod fields;
mod format;
pub mod migrations;
mod template;

pub use edit::{
    set_field, set_service_metric, toggle_service_type, EditOutcome, FieldPatch, MetricKind,
};
pub use fields::{
    BasicInfoField, GoalField, IdentityField, MonitoringField, ServiceField, SituationField,
    SupportSystemField,
};
pub use format::{format_service, format_services};
pub use migrations::CURRENT_SCHEMA_VERSION;
pub use template::{default_template, view_sample};

/// Per-service numeric strings keyed by service-type label
pub type ServiceMetricMap = BTreeMap<String, String>;

/// Complete support plan for one client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanRecord {
    /// Layout version of the stored payload
    pub schema_version: u32,

    #[serde(flatten)]
    pub identity: PlanIdentity,

    pub basic_info: BasicInfo,
    pub current_situation: CurrentSituation,
    pub goals: Goals,
    pub services: Services,
    pub support_system: SupportSystem,
    pub monitoring: Monitoring,

    /// 概要（支援経過・課題）
    pub summary: String,

    /// 生活歴
    pub life_history: String,
}

impl Default for PlanRecord {
    /// Blank record at the current schema version (not the sample template)
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            identity: PlanIdentity::default(),
            basic_info: BasicInfo::default(),
            current_situation: CurrentSituation::default(),
            goals: Goals::default(),
            services: Services::default(),
            support_system: SupportSystem::default(),
            monitoring: Monitoring::default(),
            summary: String::new(),
            life_history: String::new(),
        }
    }
}

/// Document header: who prepared the plan, for which agency, and when
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanIdentity {
    pub created_at: String,
    pub creator: String,
    /// Coordinating agency (相談支援事業者名)
    pub support_coordinator_name: String,
    pub contact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicInfo {
    pub name: String,
    pub birth_date: String,
    pub gender: String,
    pub address: String,
    pub phone: String,
    pub emergency_contact: String,
    pub disability_type: String,
    pub support_level: String,
    pub education: String,
    pub medical_info: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentSituation {
    pub living_situation: String,
    pub physical_condition: String,
    pub mental_condition: String,
    pub social_participation: String,
    pub family_situation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Goals {
    pub short_term: String,
    pub long_term: String,
    pub achievement_indicators: String,
}

/// Selected services and their per-service metrics
///
/// # Invariants
/// - `service_type` holds no duplicates; order is selection order
/// - every key of `frequency_map` and `duration_map` is in `service_type`
/// - metric values are digit-only strings without leading zeros, `""` = unset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Services {
    pub service_type: Vec<String>,
    pub frequency_map: ServiceMetricMap,
    pub duration_map: ServiceMetricMap,
    pub provider: String,
    pub start_date: String,
}

impl Services {
    /// Whether `label` is currently selected
    pub fn is_selected(&self, label: &str) -> bool {
        self.service_type.iter().any(|s| s == label)
    }

    /// Check the map/selection invariant
    pub fn maps_consistent(&self) -> bool {
        self.frequency_map
            .keys()
            .chain(self.duration_map.keys())
            .all(|label| self.is_selected(label))
    }

    /// Restore both map invariants on a record read from storage.
    ///
    /// Entries for unselected services are dropped and the remaining values
    /// go through the same sanitizing as edits. Returns the number of entries
    /// dropped or rewritten.
    pub fn normalize(&mut self) -> usize {
        let selected = &self.service_type;
        let mut touched = 0;
        for map in [&mut self.frequency_map, &mut self.duration_map] {
            map.retain(|label, value| {
                if !selected.iter().any(|s| s == label) {
                    touched += 1;
                    return false;
                }
                let clean = edit::sanitize_metric(value);
                if clean != *value {
                    *value = clean;
                    touched += 1;
                }
                true
            });
        }
        touched
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupportSystem {
    pub support_coordinator: String,
    pub service_providers: String,
    pub related_institutions: String,
    pub informal_support: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Monitoring {
    pub frequency: String,
    pub evaluation_method: String,
    pub review_date: String,
    pub emergency_response: String,
}
