use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Warning,
    Info,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Success => write!(f, "success"),
            NotificationKind::Warning => write!(f, "warning"),
            NotificationKind::Info => write!(f, "info"),
        }
    }
}

/// What a notification refers to. Used to deduplicate alerts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NotificationSubject {
    #[serde(rename_all = "camelCase")]
    LowStock { item_id: String },
}

/// A transient user-facing message. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<NotificationSubject>,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            id: format!("notif_{}", Uuid::new_v4().simple()),
            message: message.into(),
            kind,
            subject: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_subject(mut self, subject: NotificationSubject) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn is_low_stock_for(&self, item_id: &str) -> bool {
        matches!(&self.subject, Some(NotificationSubject::LowStock { item_id: id }) if id == item_id)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_stock_subject_matching() {
        let notification = Notification::warning("Stok rendah").with_subject(
            NotificationSubject::LowStock {
                item_id: "i1".to_string(),
            },
        );
        assert!(notification.is_low_stock_for("i1"));
        assert!(!notification.is_low_stock_for("i10"));
        assert!(!Notification::warning("Stok rendah").is_low_stock_for("i1"));
    }

    #[test]
    fn test_notification_display() {
        let notification = Notification::success("Kategori baru ditambahkan.");
        assert_eq!(
            format!("{}", notification),
            "[success] Kategori baru ditambahkan."
        );
    }

    #[test]
    fn test_notification_json_uses_type_key() {
        let notification = Notification::info("hello").with_id("n1");
        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["type"], "info");
        assert!(json.get("subject").is_none());
    }
}
