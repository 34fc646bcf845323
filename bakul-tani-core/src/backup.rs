//! User-facing backup files.
//!
//! A backup has the same JSON shape as the persisted snapshot, pretty
//! printed. Restoring checks that the core collections are present before
//! anything reaches the reducer; a rejected file leaves the state untouched.

use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;

use crate::action::Action;
use crate::migration;
use crate::persistence::{snapshot_from_value, LoadError};
use crate::state::AppState;

/// Top-level fields a backup must carry to be accepted.
pub const REQUIRED_FIELDS: [&str; 4] = ["items", "transactions", "user", "categories"];

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Invalid backup file: not valid JSON ({0})")]
    Parse(serde_json::Error),
    #[error("Invalid backup file: missing '{0}'")]
    MissingField(&'static str),
    #[error("Invalid backup file: {0}")]
    Invalid(#[from] LoadError),
    #[error("Failed to serialize backup: {0}")]
    Serialize(serde_json::Error),
}

/// Default file name for a backup taken on `date`.
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("bakul_tani_backup_{}.json", date.format("%Y-%m-%d"))
}

/// Pretty-printed, version-tagged backup of the state.
pub fn export_backup(state: &AppState) -> Result<String, BackupError> {
    let mut value = serde_json::to_value(state).map_err(BackupError::Serialize)?;
    migration::stamp(&mut value);
    serde_json::to_string_pretty(&value).map_err(BackupError::Serialize)
}

/// Validates and rehydrates a backup file.
pub fn parse_backup(text: &str, is_online: bool) -> Result<AppState, BackupError> {
    let value: Value = serde_json::from_str(text).map_err(BackupError::Parse)?;

    for field in REQUIRED_FIELDS {
        if value.get(field).map_or(true, Value::is_null) {
            return Err(BackupError::MissingField(field));
        }
    }

    Ok(snapshot_from_value(value, is_online)?)
}

/// Builds the `RESTORE_DATA` action for a backup file.
pub fn restore_action(text: &str, is_online: bool) -> Result<Action, BackupError> {
    parse_backup(text, is_online).map(|state| Action::RestoreData(Box::new(state)))
}
