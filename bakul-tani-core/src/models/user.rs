use serde::{Deserialize, Serialize};
use std::fmt;

/// Profile of the person operating the app.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    pub email: String,
    pub position: String,
    #[serde(default)]
    pub profile_picture: String,
}

impl User {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        position: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            position: position.into(),
            profile_picture: String::new(),
        }
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new("Azam Ganteng", "user@example.com", "Owner")
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> - {}", self.name, self.email, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_default() {
        let user = User::default();
        assert_eq!(user.email, "user@example.com");
        assert_eq!(user.position, "Owner");
        assert!(user.profile_picture.is_empty());
    }

    #[test]
    fn test_user_display() {
        let user = User::new("Sari", "sari@tani.id", "Staff Gudang");
        assert_eq!(format!("{}", user), "Sari <sari@tani.id> - Staff Gudang");
    }
}
