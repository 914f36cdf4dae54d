use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

pub type UserId = u64;

/// Layout of `created_at`/`updated_at`: server-local wall clock, second precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// Build a fresh record; both timestamps share the same instant.
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = now_timestamp();
        Self {
            id,
            name: name.into(),
            email: email.into(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_timestamp();
    }
}

pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Both fields are required on creation.
pub fn validate_new(name: &str, email: &str) -> Result<(), ModelError> {
    if name.is_empty() || email.is_empty() {
        return Err(ModelError::Validation("name and email must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn new_user_has_equal_parseable_timestamps() {
        let u = User::new(7, "Ann", "ann@example.com");
        assert_eq!(u.created_at, u.updated_at);
        assert!(NaiveDateTime::parse_from_str(&u.created_at, TIMESTAMP_FORMAT).is_ok());
        assert_eq!(u.created_at.len(), "2024-01-01 00:00:00".len());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let u = User::new(1, "Ann", "ann@example.com");
        let v = serde_json::to_value(&u).unwrap();
        for key in ["id", "name", "email", "createdAt", "updatedAt"] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
        assert_eq!(v["id"], 1);
    }

    #[test]
    fn validate_new_requires_both_fields() {
        assert!(validate_new("Ann", "ann@example.com").is_ok());
        assert!(matches!(validate_new("", "ann@example.com"), Err(ModelError::Validation(_))));
        assert!(matches!(validate_new("Ann", ""), Err(ModelError::Validation(_))));
    }
}
