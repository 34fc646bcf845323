use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::sync_status::SyncStatus;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub sync_status: SyncStatus,
}

impl Warehouse {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: format!("w{}", Uuid::new_v4().simple()),
            name: name.into(),
            capacity: None,
            sync_status: SyncStatus::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn is_pending(&self) -> bool {
        self.sync_status == SyncStatus::Pending
    }
}

impl fmt::Display for Warehouse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(capacity) = self.capacity {
            write!(f, " [capacity {}]", capacity)?;
        }
        write!(f, " ({})", self.sync_status)
    }
}
