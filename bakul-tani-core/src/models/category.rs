use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::sync_status::SyncStatus;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sync_status: SyncStatus,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            name: name.into(),
            sync_status: SyncStatus::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn is_pending(&self) -> bool {
        self.sync_status == SyncStatus::Pending
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.sync_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_new() {
        let category = Category::new("Pupuk");
        assert_eq!(category.name, "Pupuk");
        assert!(!category.is_pending());
    }

    #[test]
    fn test_missing_sync_status_defaults_to_synced() {
        let category: Category = serde_json::from_str(r#"{"id":"c1","name":"Benih"}"#).unwrap();
        assert_eq!(category.sync_status, SyncStatus::Synced);
    }
}
