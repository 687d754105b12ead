//! Stored plan payload migrations
//!
//! Plans saved by older editors lack fields that were added later. Each step
//! below upgrades a raw JSON payload by one version; [`migrate`] runs every
//! pending step and stamps `schemaVersion`. Steps check before they write, so
//! running them on an already-upgraded payload changes nothing.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing steps** - payloads at every older version must keep loading
//! 2. **Always add a new step** for a layout change and bump [`CURRENT_SCHEMA_VERSION`]
//! 3. **Only fill or reshape** - a step must never drop user-entered text

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::{Error, Result};

/// Current payload layout version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: u32 = 3;

const SCHEMA_VERSION_KEY: &str = "schemaVersion";

/// Top-level string fields introduced after the first release
const V1_IDENTITY_FIELDS: [&str; 4] = ["createdAt", "creator", "supportCoordinatorName", "contact"];

/// Per-service maps introduced after the first release
const V1_SERVICE_MAPS: [&str; 2] = ["frequencyMap", "durationMap"];

/// Read the payload's layout version; payloads without one are version 0
pub fn schema_version(payload: &Value) -> u32 {
    payload
        .get(SCHEMA_VERSION_KEY)
        .and_then(Value::as_u64)
        .map(|v| v.min(u32::MAX as u64) as u32)
        .unwrap_or(0)
}

/// Run all pending migrations on a raw stored payload
///
/// # Errors
/// `Error::InvalidPayload` if the payload (or its `services` member) is not a
/// JSON object.
pub fn migrate(mut payload: Value) -> Result<Value> {
    let current_version = schema_version(&payload);

    if !payload.is_object() {
        return Err(not_an_object());
    }

    if current_version == CURRENT_SCHEMA_VERSION {
        debug!("Plan payload is up to date (v{})", current_version);
        return Ok(payload);
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Plan payload version ({}) is newer than code version ({}); loading as-is",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(payload);
    }

    info!(
        "Migrating plan payload: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    let root = payload
        .as_object_mut()
        .ok_or_else(not_an_object)?;

    if current_version < 1 {
        migrate_v1(root)?;
    }
    if current_version < 2 {
        migrate_v2(root)?;
    }
    if current_version < 3 {
        migrate_v3(root)?;
    }

    root.insert(
        SCHEMA_VERSION_KEY.to_string(),
        Value::from(CURRENT_SCHEMA_VERSION),
    );
    Ok(payload)
}

fn not_an_object() -> Error {
    Error::InvalidPayload("plan payload is not a JSON object".to_string())
}

/// Migration v1: backfill header fields and per-service maps
fn migrate_v1(root: &mut Map<String, Value>) -> Result<()> {
    for key in V1_IDENTITY_FIELDS {
        if !root.contains_key(key) {
            root.insert(key.to_string(), Value::String(String::new()));
            debug!("  v1: backfilled {}", key);
        }
    }

    let services = services_object(root)?;
    for key in V1_SERVICE_MAPS {
        if !services.contains_key(key) {
            services.insert(key.to_string(), Value::Object(Map::new()));
            debug!("  v1: backfilled services.{}", key);
        }
    }
    Ok(())
}

/// Migration v2: single-choice `serviceType` string becomes a selection list
fn migrate_v2(root: &mut Map<String, Value>) -> Result<()> {
    let services = services_object(root)?;
    if let Some(Value::String(label)) = services.get("serviceType") {
        let list = if label.is_empty() {
            Vec::new()
        } else {
            vec![Value::String(label.clone())]
        };
        services.insert("serviceType".to_string(), Value::Array(list));
        debug!("  v2: converted services.serviceType to a list");
    }
    Ok(())
}

/// Migration v3: drop metric entries for services that are not selected
fn migrate_v3(root: &mut Map<String, Value>) -> Result<()> {
    let services = services_object(root)?;
    let selected: Vec<String> = services
        .get("serviceType")
        .and_then(Value::as_array)
        .map(|labels| {
            labels
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    for key in V1_SERVICE_MAPS {
        if let Some(Value::Object(map)) = services.get_mut(key) {
            let before = map.len();
            map.retain(|label, _| selected.iter().any(|s| s == label));
            if map.len() != before {
                warn!(
                    "  v3: removed {} orphaned entries from services.{}",
                    before - map.len(),
                    key
                );
            }
        }
    }
    Ok(())
}

/// Get `services` as an object, creating an empty one when absent
fn services_object(root: &mut Map<String, Value>) -> Result<&mut Map<String, Value>> {
    root.entry("services")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| Error::InvalidPayload("services is not a JSON object".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn legacy_payload() -> Value {
        json!({
            "basicInfo": { "name": "鈴木一郎" },
            "services": {
                "serviceType": ["居宅介護"],
                "provider": "○○介護サービス"
            },
            "summary": "経過",
            "lifeHistory": ""
        })
    }

    #[test]
    fn test_v0_payload_is_backfilled() {
        let migrated = migrate(legacy_payload()).unwrap();

        assert_eq!(migrated["schemaVersion"], CURRENT_SCHEMA_VERSION);
        assert_eq!(migrated["createdAt"], "");
        assert_eq!(migrated["creator"], "");
        assert_eq!(migrated["supportCoordinatorName"], "");
        assert_eq!(migrated["contact"], "");
        assert_eq!(migrated["services"]["frequencyMap"], json!({}));
        assert_eq!(migrated["services"]["durationMap"], json!({}));
        // Untouched
        assert_eq!(migrated["summary"], "経過");
        assert_eq!(migrated["services"]["provider"], "○○介護サービス");
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let once = migrate(legacy_payload()).unwrap();
        let twice = migrate(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_existing_values_are_kept() {
        let payload = json!({
            "creator": "山田相談員",
            "services": { "serviceType": ["居宅介護"], "frequencyMap": { "居宅介護": "3" } }
        });
        let migrated = migrate(payload).unwrap();
        assert_eq!(migrated["creator"], "山田相談員");
        assert_eq!(migrated["services"]["frequencyMap"]["居宅介護"], "3");
    }

    #[test]
    fn test_single_service_string_becomes_list() {
        let migrated = migrate(json!({ "services": { "serviceType": "生活介護" } })).unwrap();
        assert_eq!(migrated["services"]["serviceType"], json!(["生活介護"]));

        let migrated = migrate(json!({ "services": { "serviceType": "" } })).unwrap();
        assert_eq!(migrated["services"]["serviceType"], json!([]));
    }

    #[test]
    fn test_orphaned_metrics_are_pruned() {
        let migrated = migrate(json!({
            "services": {
                "serviceType": ["居宅介護"],
                "frequencyMap": { "居宅介護": "3", "生活介護": "2" },
                "durationMap": { "生活介護": "1" }
            }
        }))
        .unwrap();
        assert_eq!(migrated["services"]["frequencyMap"], json!({ "居宅介護": "3" }));
        assert_eq!(migrated["services"]["durationMap"], json!({}));
    }

    #[test]
    fn test_missing_services_is_created() {
        let migrated = migrate(json!({})).unwrap();
        assert_eq!(migrated["services"]["frequencyMap"], json!({}));
    }

    #[test]
    fn test_current_version_is_left_alone() {
        // Metric cleanup of current payloads happens after deserializing
        let payload = json!({
            "schemaVersion": CURRENT_SCHEMA_VERSION,
            "creator": "山田相談員",
            "services": { "serviceType": ["生活介護"], "frequencyMap": { "生活介護": "2" } }
        });
        assert_eq!(migrate(payload.clone()).unwrap(), payload);
    }

    #[test]
    fn test_non_object_payload_is_rejected() {
        assert!(matches!(migrate(json!([1, 2])), Err(Error::InvalidPayload(_))));
        assert!(matches!(
            migrate(json!({ "services": "none" })),
            Err(Error::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_schema_version_defaults_to_zero() {
        assert_eq!(schema_version(&json!({})), 0);
        assert_eq!(schema_version(&json!({ "schemaVersion": 2 })), 2);
    }
}
