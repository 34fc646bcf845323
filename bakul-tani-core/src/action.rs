//! Actions accepted by the reducer.
//!
//! Actions serialize as `{"type": "ADD_ITEM", "payload": {...}}`. Any type the
//! enum does not know deserializes to [`Action::Unknown`], which the reducer
//! treats as a no-op.

use serde::{Deserialize, Serialize};

use crate::models::{Category, Item, Notification, Theme, Transaction, User, Warehouse};
use crate::state::AppState;

/// Partial profile merged onto the current user on login.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl UserPatch {
    /// Returns `user` with every field present in the patch replaced.
    pub fn apply(&self, user: &User) -> User {
        User {
            name: self.name.clone().unwrap_or_else(|| user.name.clone()),
            email: self.email.clone().unwrap_or_else(|| user.email.clone()),
            position: self.position.clone().unwrap_or_else(|| user.position.clone()),
            profile_picture: self
                .profile_picture
                .clone()
                .unwrap_or_else(|| user.profile_picture.clone()),
        }
    }
}

impl From<User> for UserPatch {
    fn from(user: User) -> Self {
        Self {
            name: Some(user.name),
            email: Some(user.email),
            position: Some(user.position),
            profile_picture: Some(user.profile_picture),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// New item together with the transaction that brought it in
    AddItem { item: Item, transaction: Transaction },
    #[serde(rename_all = "camelCase")]
    UpdateStock {
        item_id: String,
        quantity_change: i64,
        transaction: Transaction,
    },
    UpdateItemDetails(Item),
    AddCategory(Category),
    UpdateCategory(Category),
    DeleteCategory { id: String },
    AddWarehouse(Warehouse),
    UpdateWarehouse(Warehouse),
    DeleteWarehouse { id: String },
    SelectWarehouse(String),
    UpdateUser(User),
    ResetData,
    RestoreData(Box<AppState>),
    AddNotification(Notification),
    RemoveNotification { id: String },
    Login(UserPatch),
    Logout,
    SetOnlineStatus(bool),
    SyncData,
    SetTheme(Theme),
    #[serde(other)]
    Unknown,
}

impl Action {
    /// Wire name of the action, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddItem { .. } => "ADD_ITEM",
            Action::UpdateStock { .. } => "UPDATE_STOCK",
            Action::UpdateItemDetails(_) => "UPDATE_ITEM_DETAILS",
            Action::AddCategory(_) => "ADD_CATEGORY",
            Action::UpdateCategory(_) => "UPDATE_CATEGORY",
            Action::DeleteCategory { .. } => "DELETE_CATEGORY",
            Action::AddWarehouse(_) => "ADD_WAREHOUSE",
            Action::UpdateWarehouse(_) => "UPDATE_WAREHOUSE",
            Action::DeleteWarehouse { .. } => "DELETE_WAREHOUSE",
            Action::SelectWarehouse(_) => "SELECT_WAREHOUSE",
            Action::UpdateUser(_) => "UPDATE_USER",
            Action::ResetData => "RESET_DATA",
            Action::RestoreData(_) => "RESTORE_DATA",
            Action::AddNotification(_) => "ADD_NOTIFICATION",
            Action::RemoveNotification { .. } => "REMOVE_NOTIFICATION",
            Action::Login(_) => "LOGIN",
            Action::Logout => "LOGOUT",
            Action::SetOnlineStatus(_) => "SET_ONLINE_STATUS",
            Action::SyncData => "SYNC_DATA",
            Action::SetTheme(_) => "SET_THEME",
            Action::Unknown => "UNKNOWN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;

    #[test]
    fn test_unit_action_json() {
        let json = serde_json::to_value(Action::SyncData).unwrap();
        assert_eq!(json["type"], "SYNC_DATA");

        let parsed: Action = serde_json::from_str(r#"{"type":"LOGOUT"}"#).unwrap();
        assert_eq!(parsed, Action::Logout);
    }

    #[test]
    fn test_update_stock_json() {
        let transaction = Transaction::new("i1", TransactionType::Out, 2).with_id("t1");
        let action = Action::UpdateStock {
            item_id: "i1".to_string(),
            quantity_change: -2,
            transaction,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "UPDATE_STOCK");
        assert_eq!(json["payload"]["itemId"], "i1");
        assert_eq!(json["payload"]["quantityChange"], -2);

        let parsed: Action = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, action);
    }

    #[test]
    fn test_newtype_payloads() {
        let parsed: Action =
            serde_json::from_str(r#"{"type":"SET_ONLINE_STATUS","payload":false}"#).unwrap();
        assert_eq!(parsed, Action::SetOnlineStatus(false));

        let parsed: Action =
            serde_json::from_str(r#"{"type":"DELETE_CATEGORY","payload":{"id":"c1"}}"#).unwrap();
        assert_eq!(
            parsed,
            Action::DeleteCategory {
                id: "c1".to_string()
            }
        );
    }

    #[test]
    fn test_unrecognized_type_is_unknown() {
        let parsed: Action = serde_json::from_str(r#"{"type":"LAUNCH_ROCKET"}"#).unwrap();
        assert_eq!(parsed, Action::Unknown);
        assert_eq!(parsed.name(), "UNKNOWN");
    }

    #[test]
    fn test_user_patch_apply() {
        let user = User::default();
        let patch = UserPatch {
            name: Some("Sari".to_string()),
            ..UserPatch::default()
        };
        let merged = patch.apply(&user);
        assert_eq!(merged.name, "Sari");
        assert_eq!(merged.email, user.email);
    }
}
