//! Simulated cloud accounts.
//!
//! Accounts live in a JSON array under [`USERS_KEY`] in the same key-value
//! store as the state snapshot. Emails are matched case-insensitively.
//! Passwords are kept as SHA-256 hex digests; records written by older
//! builds with a clear-text `password` are upgraded on load.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::action::{Action, UserPatch};
use crate::models::{Notification, User};
use crate::storage::{KeyValueStore, StorageError};

/// Storage key of the account list.
pub const USERS_KEY: &str = "bakulTani_users";

/// Position given to accounts registered without one.
pub const DEFAULT_POSITION: &str = "Staff Gudang";

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Account list is corrupt: {0}")]
    Parse(serde_json::Error),
    #[error("Failed to serialize accounts: {0}")]
    Serialize(serde_json::Error),
    #[error("Password is required")]
    MissingPassword,
    #[error("Email is required")]
    MissingEmail,
    #[error("An account for {0} already exists")]
    AlreadyRegistered(String),
    #[error("No account found for {0}")]
    NotFound(String),
    #[error("Wrong password")]
    WrongPassword,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub profile_picture: String,
    #[serde(default)]
    pub password_hash: String,
    #[serde(default, skip_serializing)]
    password: Option<String>,
}

impl Account {
    fn profile(&self) -> User {
        User {
            name: self.name.clone(),
            email: self.email.clone(),
            position: self.position.clone(),
            profile_picture: self.profile_picture.clone(),
        }
    }

    fn matches_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }
}

/// Hex SHA-256 digest of a password.
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Fields collected when registering.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub position: Option<String>,
    pub password: String,
}

pub struct AccountRegistry<S> {
    store: S,
}

impl<S: KeyValueStore> AccountRegistry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All accounts. A missing list is empty.
    pub fn accounts(&self) -> Result<Vec<Account>, AccountError> {
        let Some(text) = self.store.get(USERS_KEY)? else {
            return Ok(Vec::new());
        };
        let mut accounts: Vec<Account> =
            serde_json::from_str(&text).map_err(AccountError::Parse)?;
        for account in &mut accounts {
            if let Some(password) = account.password.take() {
                if account.password_hash.is_empty() {
                    account.password_hash = hash_password(&password);
                }
            }
        }
        Ok(accounts)
    }

    fn save(&self, accounts: &[Account]) -> Result<(), AccountError> {
        let text = serde_json::to_string(accounts).map_err(AccountError::Serialize)?;
        self.store.set(USERS_KEY, &text)?;
        Ok(())
    }

    pub fn find(&self, email: &str) -> Result<Option<Account>, AccountError> {
        Ok(self.accounts()?.into_iter().find(|a| a.matches_email(email)))
    }

    /// Creates an account and signs it in.
    pub fn register(&self, registration: Registration) -> Result<Vec<Action>, AccountError> {
        let email = registration.email.trim().to_string();
        if email.is_empty() {
            return Err(AccountError::MissingEmail);
        }
        if registration.password.is_empty() {
            return Err(AccountError::MissingPassword);
        }

        let mut accounts = self.accounts()?;
        if accounts.iter().any(|a| a.matches_email(&email)) {
            return Err(AccountError::AlreadyRegistered(email));
        }

        let position = registration
            .position
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_POSITION.to_string());
        let account = Account {
            name: registration.name.trim().to_string(),
            email,
            position,
            profile_picture: String::new(),
            password_hash: hash_password(&registration.password),
            password: None,
        };
        let profile = account.profile();
        accounts.push(account);
        self.save(&accounts)?;
        tracing::info!("Registered account {}", profile.email);

        Ok(vec![
            Action::Login(UserPatch::from(profile)),
            Action::AddNotification(Notification::success("Account created.")),
        ])
    }

    /// Signs in an existing account.
    pub fn login(&self, email: &str, password: &str) -> Result<Vec<Action>, AccountError> {
        if password.is_empty() {
            return Err(AccountError::MissingPassword);
        }
        let account = self
            .find(email)?
            .ok_or_else(|| AccountError::NotFound(email.trim().to_string()))?;
        if account.password_hash != hash_password(password) {
            return Err(AccountError::WrongPassword);
        }

        let profile = account.profile();
        let greeting = format!("Welcome back, {}!", profile.name);
        Ok(vec![
            Action::Login(UserPatch::from(profile)),
            Action::AddNotification(Notification::success(greeting)),
        ])
    }

    /// Updates the signed-in profile and mirrors it into its account.
    ///
    /// `current` is the profile before the update; its email locates the
    /// account. Profiles without an account are updated locally only.
    pub fn update_profile(
        &self,
        current: &User,
        patch: UserPatch,
    ) -> Result<Vec<Action>, AccountError> {
        let updated = patch.apply(current);

        let mut accounts = self.accounts()?;
        if let Some(account) = accounts.iter_mut().find(|a| a.email == current.email) {
            account.name = updated.name.clone();
            account.email = updated.email.clone();
            account.position = updated.position.clone();
            account.profile_picture = updated.profile_picture.clone();
            self.save(&accounts)?;
        } else {
            tracing::debug!("No account for {}, updating profile locally", current.email);
        }

        Ok(vec![
            Action::UpdateUser(updated),
            Action::AddNotification(Notification::success("Profile updated.")),
        ])
    }
}
