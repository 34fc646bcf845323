//! Versioned snapshot migrations.
//!
//! Every stored snapshot carries a `schemaVersion`. Snapshots written before
//! versioning existed have no tag and count as version 0. On load, the steps
//! below run in order over the raw JSON object, before the object is
//! deserialized into an `AppState`.
//!
//! | Version | Step | Repair |
//! |---------|------|--------|
//! | 1 | Drop `notifications` and `isOnline` persisted by unversioned builds | no |
//! | 1 | Coerce collection fields that are not arrays back to their defaults | yes |
//! | 2 | Backfill `syncStatus` on categories and warehouses | yes |
//! | 3 | Backfill `currentWarehouseId` and item `warehouseId` | yes |
//! | 4 | Backfill user profile fields and `theme` | yes |
//!
//! Upgrade steps run only for snapshots older than their version. Repair
//! steps are idempotent and run on every load, so a damaged collection in an
//! up-to-date snapshot is reset on its own instead of failing the whole load.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::state::{AppState, FALLBACK_WAREHOUSE_ID};

/// Version written by this build.
pub const SCHEMA_VERSION: u32 = 4;

/// Key holding the schema version inside a snapshot.
pub const VERSION_KEY: &str = "schemaVersion";

const COLLECTIONS: [&str; 4] = ["items", "transactions", "categories", "warehouses"];

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Snapshot is not a JSON object")]
    NotAnObject,
    #[error("Failed to build default snapshot: {0}")]
    Defaults(#[from] serde_json::Error),
}

type Object = Map<String, Value>;

struct Migration {
    version: u32,
    description: &'static str,
    apply: fn(&mut Object, &Object),
    repair: bool,
}

impl Migration {
    fn applies_to(&self, from: u32) -> bool {
        self.repair || self.version > from
    }
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "drop ephemeral fields",
        apply: drop_ephemeral_fields,
        repair: false,
    },
    Migration {
        version: 1,
        description: "coerce collections",
        apply: coerce_collections,
        repair: true,
    },
    Migration {
        version: 2,
        description: "backfill sync status",
        apply: backfill_sync_status,
        repair: true,
    },
    Migration {
        version: 3,
        description: "assign warehouses",
        apply: assign_warehouses,
        repair: true,
    },
    Migration {
        version: 4,
        description: "backfill profile and theme",
        apply: backfill_profile_and_theme,
        repair: true,
    },
];

/// Reads the schema version of a raw snapshot. Untagged snapshots are 0.
pub fn stored_version(snapshot: &Value) -> u32 {
    snapshot
        .get(VERSION_KEY)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

/// Adds the current schema version to a serialized state.
pub fn stamp(snapshot: &mut Value) {
    if let Some(object) = snapshot.as_object_mut() {
        object.insert(VERSION_KEY.to_string(), Value::from(SCHEMA_VERSION));
    }
}

/// Upgrades a raw snapshot to the current schema.
///
/// The returned object no longer contains the version key.
pub fn migrate(snapshot: Value) -> Result<Value, MigrationError> {
    let from = stored_version(&snapshot);
    let Value::Object(mut object) = snapshot else {
        return Err(MigrationError::NotAnObject);
    };
    object.remove(VERSION_KEY);

    if from > SCHEMA_VERSION {
        tracing::warn!(
            "Snapshot schema version {} is newer than supported version {}, loading best-effort",
            from,
            SCHEMA_VERSION
        );
    }

    let defaults = match serde_json::to_value(AppState::default())? {
        Value::Object(defaults) => defaults,
        _ => return Err(MigrationError::NotAnObject),
    };

    for migration in MIGRATIONS.iter().filter(|m| m.applies_to(from)) {
        tracing::debug!(
            "Applying snapshot step {} ({})",
            migration.version,
            migration.description
        );
        (migration.apply)(&mut object, &defaults);
    }

    Ok(Value::Object(object))
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

fn drop_ephemeral_fields(object: &mut Object, _defaults: &Object) {
    object.remove("notifications");
    object.remove("isOnline");
}

fn coerce_collections(object: &mut Object, defaults: &Object) {
    for key in COLLECTIONS {
        match object.get_mut(key) {
            None => {}
            Some(Value::Array(entries)) => entries.retain(Value::is_object),
            Some(other) => {
                *other = defaults.get(key).cloned().unwrap_or(Value::Array(Vec::new()));
            }
        }
    }
}

fn backfill_sync_status(object: &mut Object, _defaults: &Object) {
    for key in ["categories", "warehouses"] {
        let Some(Value::Array(entries)) = object.get_mut(key) else {
            continue;
        };
        for entry in entries.iter_mut().filter_map(Value::as_object_mut) {
            if is_blank(entry.get("syncStatus")) {
                entry.insert("syncStatus".to_string(), Value::from("synced"));
            }
        }
    }
}

fn assign_warehouses(object: &mut Object, defaults: &Object) {
    // A missing list is filled from the defaults during deserialization.
    let first_warehouse = object
        .get("warehouses")
        .or_else(|| defaults.get("warehouses"))
        .and_then(Value::as_array)
        .and_then(|warehouses| warehouses.first())
        .and_then(|w| w.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string);

    if is_blank(object.get("currentWarehouseId")) {
        // An explicit null keeps the default selection from coming back.
        let current = first_warehouse.as_deref().map_or(Value::Null, Value::from);
        object.insert("currentWarehouseId".to_string(), current);
    }

    let item_warehouse = first_warehouse.unwrap_or_else(|| FALLBACK_WAREHOUSE_ID.to_string());
    if let Some(Value::Array(items)) = object.get_mut("items") {
        for item in items.iter_mut().filter_map(Value::as_object_mut) {
            if is_blank(item.get("warehouseId")) {
                item.insert("warehouseId".to_string(), Value::from(item_warehouse.as_str()));
            }
        }
    }
}

fn backfill_profile_and_theme(object: &mut Object, defaults: &Object) {
    let default_user = defaults.get("user").cloned().unwrap_or(Value::Null);
    match object.get_mut("user") {
        Some(Value::Object(user)) => {
            if let Value::Object(default_fields) = &default_user {
                for (field, value) in default_fields {
                    if user.get(field).map_or(true, Value::is_null) {
                        user.insert(field.clone(), value.clone());
                    }
                }
            }
        }
        _ => {
            object.insert("user".to_string(), default_user);
        }
    }

    let theme_valid = matches!(
        object.get("theme").and_then(Value::as_str),
        Some("light") | Some("dark")
    );
    if !theme_valid {
        let default_theme = defaults.get("theme").cloned().unwrap_or(Value::from("dark"));
        object.insert("theme".to_string(), default_theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stored_version() {
        assert_eq!(stored_version(&json!({})), 0);
        assert_eq!(stored_version(&json!({"schemaVersion": 3})), 3);
        assert_eq!(stored_version(&json!({"schemaVersion": "x"})), 0);
    }

    #[test]
    fn test_stamp_adds_current_version() {
        let mut snapshot = json!({"items": []});
        stamp(&mut snapshot);
        assert_eq!(stored_version(&snapshot), SCHEMA_VERSION);
    }

    #[test]
    fn test_migrate_rejects_non_object() {
        assert!(matches!(
            migrate(json!([1, 2])),
            Err(MigrationError::NotAnObject)
        ));
    }

    #[test]
    fn test_coerce_non_array_collections() {
        let migrated = migrate(json!({
            "items": "corrupt",
            "transactions": null,
            "categories": {"c1": "Benih"},
            "warehouses": [1, {"id": "w7", "name": "Lumbung"}]
        }))
        .unwrap();

        assert_eq!(migrated["items"], json!([]));
        assert_eq!(migrated["transactions"], json!([]));
        assert_eq!(migrated["categories"].as_array().unwrap().len(), 2);
        let warehouses = migrated["warehouses"].as_array().unwrap();
        assert_eq!(warehouses.len(), 1);
        assert_eq!(warehouses[0]["id"], "w7");
    }

    #[test]
    fn test_backfill_sync_status() {
        let migrated = migrate(json!({
            "categories": [{"id": "c1", "name": "Benih"}, {"id": "c2", "name": "Alat", "syncStatus": "pending"}],
            "warehouses": [{"id": "w1", "name": "Utama", "syncStatus": null}]
        }))
        .unwrap();

        assert_eq!(migrated["categories"][0]["syncStatus"], "synced");
        assert_eq!(migrated["categories"][1]["syncStatus"], "pending");
        assert_eq!(migrated["warehouses"][0]["syncStatus"], "synced");
    }

    #[test]
    fn test_assign_warehouses_from_first() {
        let migrated = migrate(json!({
            "warehouses": [{"id": "w5", "name": "Gudang Lima"}],
            "items": [{"id": "i1", "name": "Benih"}, {"id": "i2", "name": "Alat", "warehouseId": "w9"}]
        }))
        .unwrap();

        assert_eq!(migrated["currentWarehouseId"], "w5");
        assert_eq!(migrated["items"][0]["warehouseId"], "w5");
        assert_eq!(migrated["items"][1]["warehouseId"], "w9");
    }

    #[test]
    fn test_assign_warehouses_without_any() {
        let migrated = migrate(json!({
            "warehouses": [],
            "currentWarehouseId": "",
            "items": [{"id": "i1", "name": "Benih"}]
        }))
        .unwrap();

        assert_eq!(migrated.get("currentWarehouseId"), Some(&Value::Null));
        assert_eq!(migrated["items"][0]["warehouseId"], FALLBACK_WAREHOUSE_ID);
    }

    #[test]
    fn test_assign_warehouses_when_list_missing() {
        let migrated = migrate(json!({"items": [{"id": "i1", "name": "Benih"}]})).unwrap();
        assert_eq!(migrated["currentWarehouseId"], FALLBACK_WAREHOUSE_ID);
        assert_eq!(migrated["items"][0]["warehouseId"], FALLBACK_WAREHOUSE_ID);
    }

    #[test]
    fn test_backfill_profile_and_theme() {
        let migrated = migrate(json!({
            "user": {"name": "Sari"},
            "theme": ""
        }))
        .unwrap();

        assert_eq!(migrated["user"]["name"], "Sari");
        assert_eq!(migrated["user"]["email"], "user@example.com");
        assert_eq!(migrated["user"]["profilePicture"], "");
        assert_eq!(migrated["theme"], "dark");

        let migrated = migrate(json!({"user": "nobody", "theme": "light"})).unwrap();
        assert_eq!(migrated["user"]["position"], "Owner");
        assert_eq!(migrated["theme"], "light");
    }

    #[test]
    fn test_current_version_runs_repairs_only() {
        let migrated = migrate(json!({
            "schemaVersion": SCHEMA_VERSION,
            "transactions": "corrupt",
            "categories": [{"id": "c1", "name": "Benih"}],
            "isOnline": false
        }))
        .unwrap();
        assert_eq!(migrated["transactions"], json!([]));
        assert_eq!(migrated["categories"][0]["syncStatus"], "synced");
        assert_eq!(migrated["isOnline"], false);
        assert!(migrated.get(VERSION_KEY).is_none());
    }

    #[test]
    fn test_unversioned_snapshot_drops_ephemeral_fields() {
        let migrated = migrate(json!({
            "notifications": [{"id": "n1", "message": "old", "type": "info"}],
            "isOnline": false
        }))
        .unwrap();
        assert!(migrated.get("notifications").is_none());
        assert!(migrated.get("isOnline").is_none());
    }

    #[test]
    fn test_newer_version_is_still_repaired() {
        let migrated = migrate(json!({
            "schemaVersion": SCHEMA_VERSION + 1,
            "items": {"broken": true},
            "futureField": 1
        }))
        .unwrap();
        assert_eq!(migrated["items"], json!([]));
        assert_eq!(migrated["futureField"], 1);
    }

    #[test]
    fn test_repairs_keep_stored_values() {
        let migrated = migrate(json!({
            "schemaVersion": 2,
            "categories": [{"id": "c1", "name": "Benih", "syncStatus": "pending"}],
            "warehouses": [{"id": "w2", "name": "Lumbung"}],
            "currentWarehouseId": "w9",
            "theme": "light"
        }))
        .unwrap();
        assert_eq!(migrated["categories"][0]["syncStatus"], "pending");
        assert_eq!(migrated["currentWarehouseId"], "w9");
        assert_eq!(migrated["theme"], "light");
    }
}
