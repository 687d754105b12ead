//! Plan edit operations
//!
//! All operations take the previous record by reference and return a new one.
//! The caller decides whether to replace its copy, so anyone still holding the
//! previous record keeps a consistent snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use super::fields::{
    BasicInfoField, GoalField, IdentityField, MonitoringField, ServiceField, SituationField,
    SupportSystemField,
};
use super::{PlanRecord, ServiceMetricMap};
use crate::catalog;
use crate::{Error, Result, ValidationWarning};

/// One scalar change addressed to exactly one field of a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPatch {
    Identity(IdentityField, String),
    BasicInfo(BasicInfoField, String),
    CurrentSituation(SituationField, String),
    Goals(GoalField, String),
    Services(ServiceField, String),
    SupportSystem(SupportSystemField, String),
    Monitoring(MonitoringField, String),
    Summary(String),
    LifeHistory(String),
}

impl FieldPatch {
    /// Build a patch from the string-addressed form used by edit forms.
    ///
    /// - `section == ""` (or `"identity"`) addresses a top-level field by name
    /// - `section == "summary" | "lifeHistory"` writes that top-level slot and
    ///   ignores `field`
    /// - any other section addresses one field inside that subsection
    ///
    /// # Errors
    /// `Error::InvalidInput` for unknown sections or fields, and for the
    /// service selection list and metric maps, which are not scalars.
    pub fn parse(section: &str, field: &str, value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let unknown = || Error::InvalidInput(format!("unknown field '{}' in section '{}'", field, section));

        let patch = match section {
            "summary" => FieldPatch::Summary(value),
            "lifeHistory" => FieldPatch::LifeHistory(value),
            "" | "identity" => match field {
                "summary" => FieldPatch::Summary(value),
                "lifeHistory" => FieldPatch::LifeHistory(value),
                _ => FieldPatch::Identity(IdentityField::from_name(field).ok_or_else(unknown)?, value),
            },
            "basicInfo" => {
                FieldPatch::BasicInfo(BasicInfoField::from_name(field).ok_or_else(unknown)?, value)
            }
            "currentSituation" => FieldPatch::CurrentSituation(
                SituationField::from_name(field).ok_or_else(unknown)?,
                value,
            ),
            "goals" => FieldPatch::Goals(GoalField::from_name(field).ok_or_else(unknown)?, value),
            "services" => match field {
                "serviceType" | "frequencyMap" | "durationMap" => {
                    return Err(Error::InvalidInput(format!(
                        "services.{} is not a scalar field; use the service selection or metric operations",
                        field
                    )));
                }
                _ => FieldPatch::Services(ServiceField::from_name(field).ok_or_else(unknown)?, value),
            },
            "supportSystem" => FieldPatch::SupportSystem(
                SupportSystemField::from_name(field).ok_or_else(unknown)?,
                value,
            ),
            "monitoring" => {
                FieldPatch::Monitoring(MonitoringField::from_name(field).ok_or_else(unknown)?, value)
            }
            _ => {
                return Err(Error::InvalidInput(format!("unknown section '{}'", section)));
            }
        };
        Ok(patch)
    }
}

/// Result of a selection or metric edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub record: PlanRecord,
    pub warnings: Vec<ValidationWarning>,
}

impl EditOutcome {
    fn clean(record: PlanRecord) -> Self {
        Self {
            record,
            warnings: Vec::new(),
        }
    }
}

/// Which per-service map a metric belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Times per week
    Frequency,
    /// Hours per visit
    Duration,
}

impl MetricKind {
    fn map_mut(self, record: &mut PlanRecord) -> &mut ServiceMetricMap {
        match self {
            MetricKind::Frequency => &mut record.services.frequency_map,
            MetricKind::Duration => &mut record.services.duration_map,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Frequency => f.write_str("frequency"),
            MetricKind::Duration => f.write_str("duration"),
        }
    }
}

impl FromStr for MetricKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "frequency" => Ok(MetricKind::Frequency),
            "duration" => Ok(MetricKind::Duration),
            other => Err(Error::InvalidInput(format!("unknown metric kind '{}'", other))),
        }
    }
}

/// Apply one scalar change, leaving every other field untouched
pub fn set_field(record: &PlanRecord, patch: FieldPatch) -> PlanRecord {
    let mut next = record.clone();
    match patch {
        FieldPatch::Identity(field, value) => *field.slot(&mut next.identity) = value,
        FieldPatch::BasicInfo(field, value) => *field.slot(&mut next.basic_info) = value,
        FieldPatch::CurrentSituation(field, value) => {
            *field.slot(&mut next.current_situation) = value
        }
        FieldPatch::Goals(field, value) => *field.slot(&mut next.goals) = value,
        FieldPatch::Services(field, value) => *field.slot(&mut next.services) = value,
        FieldPatch::SupportSystem(field, value) => *field.slot(&mut next.support_system) = value,
        FieldPatch::Monitoring(field, value) => *field.slot(&mut next.monitoring) = value,
        FieldPatch::Summary(value) => next.summary = value,
        FieldPatch::LifeHistory(value) => next.life_history = value,
    }
    next
}

/// Select or deselect a service, keeping both metric maps in step.
///
/// Deselecting removes the label's entries from the frequency and duration
/// maps. Requesting the current state is a no-op.
pub fn toggle_service_type(record: &PlanRecord, label: &str, selected: bool) -> EditOutcome {
    let currently = record.services.is_selected(label);
    if currently == selected {
        return EditOutcome::clean(record.clone());
    }

    let mut next = record.clone();
    let mut warnings = Vec::new();

    if selected {
        if !catalog::is_known_service_type(label) {
            let warning = ValidationWarning::UnknownServiceType {
                label: label.to_string(),
            };
            warn!("{}", warning);
            warnings.push(warning);
        }
        next.services.service_type.push(label.to_string());
        debug!(label, "Service selected");
    } else {
        next.services.service_type.retain(|s| s != label);
        next.services.frequency_map.remove(label);
        next.services.duration_map.remove(label);
        debug!(label, "Service deselected; metrics cleared");
    }

    EditOutcome {
        record: next,
        warnings,
    }
}

/// Store one per-service metric after sanitizing the raw input.
///
/// Metrics addressed to an unselected service are dropped with a warning.
pub fn set_service_metric(
    record: &PlanRecord,
    kind: MetricKind,
    label: &str,
    raw_input: &str,
) -> EditOutcome {
    if !record.services.is_selected(label) {
        let warning = ValidationWarning::MetricForUnselectedService {
            label: label.to_string(),
        };
        warn!(kind = %kind, "{}", warning);
        return EditOutcome {
            record: record.clone(),
            warnings: vec![warning],
        };
    }

    let mut next = record.clone();
    kind.map_mut(&mut next).insert(label.to_string(), sanitize_metric(raw_input));
    EditOutcome::clean(next)
}

/// Keep ASCII digits only, then drop every leading `'0'`.
///
/// An all-zero input reduces to `""`, the unset value.
pub(crate) fn sanitize_metric(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.trim_start_matches('0').to_string()
}
