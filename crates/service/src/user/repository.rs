use async_trait::async_trait;
use models::user::{User, UserId};

use crate::errors::ServiceError;

/// Partial update input. An empty or absent field keeps the current value,
/// so a field can never be cleared through an update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UpdateUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self { name: Some(name.into()), email: Some(email.into()) }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|s| !s.is_empty())
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|s| !s.is_empty())
    }
}

/// Storage abstraction for user records.
/// Each call must appear atomic to concurrent callers.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users in insertion order.
    async fn list(&self) -> Vec<User>;
    async fn get(&self, id: UserId) -> Result<User, ServiceError>;
    async fn create(&self, name: &str, email: &str) -> Result<User, ServiceError>;
    async fn update(&self, id: UserId, input: UpdateUser) -> Result<User, ServiceError>;
    /// Returns whether a record was removed.
    async fn delete(&self, id: UserId) -> bool;
}
