use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use models::user::{self, User, UserId};

use crate::errors::ServiceError;
use super::repository::{UpdateUser, UserRepository};

/// Records seeded by [`InMemoryUserStore::with_demo_users`].
pub const DEMO_USERS: [(&str, &str); 3] = [
    ("Zhang San", "zhang@example.com"),
    ("Li Si", "li@example.com"),
    ("Wang Wu", "wang@example.com"),
];

struct Inner {
    users: Vec<User>,
    // strictly greater than every id ever issued
    next_id: UserId,
}

impl Inner {
    fn email_exists(&self, email: &str) -> bool {
        self.users.iter().any(|u| u.email == email)
    }

    fn position(&self, id: UserId) -> Option<usize> {
        self.users.iter().position(|u| u.id == id)
    }

    fn insert(&mut self, name: &str, email: &str) -> Result<User, ServiceError> {
        user::validate_new(name, email)?;
        if self.email_exists(email) {
            return Err(ServiceError::email_taken());
        }
        let rec = User::new(self.next_id, name, email);
        self.next_id += 1;
        self.users.push(rec.clone());
        Ok(rec)
    }
}

/// Process-local user store. A single lock guards the list and the id
/// counter, so each operation is observed either fully applied or not at all.
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserStore {
    /// Empty store; the first id handed out is 1.
    pub fn new() -> Self {
        Self { inner: RwLock::new(Inner { users: Vec::new(), next_id: 1 }) }
    }

    /// Store pre-populated with [`DEMO_USERS`] through the regular create path.
    pub fn with_demo_users() -> Self {
        let mut inner = Inner { users: Vec::new(), next_id: 1 };
        for (name, email) in DEMO_USERS {
            // demo emails are distinct and non-empty
            if let Err(e) = inner.insert(name, email) {
                debug!(error = %e, %email, "skipping demo user");
            }
        }
        info!(count = inner.users.len(), "seeded demo users");
        Self { inner: RwLock::new(inner) }
    }

    pub async fn contains(&self, id: UserId) -> bool {
        self.inner.read().await.position(id).is_some()
    }

    pub async fn email_exists(&self, email: &str) -> bool {
        self.inner.read().await.email_exists(email)
    }

    /// Id the next successful create will receive.
    pub async fn next_id(&self) -> UserId {
        self.inner.read().await.next_id
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn list(&self) -> Vec<User> {
        self.inner.read().await.users.clone()
    }

    async fn get(&self, id: UserId) -> Result<User, ServiceError> {
        let inner = self.inner.read().await;
        inner
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("user"))
    }

    async fn create(&self, name: &str, email: &str) -> Result<User, ServiceError> {
        let mut inner = self.inner.write().await;
        let rec = inner.insert(name, email)?;
        info!(user_id = rec.id, email = %rec.email, "user created");
        Ok(rec)
    }

    async fn update(&self, id: UserId, input: UpdateUser) -> Result<User, ServiceError> {
        let mut inner = self.inner.write().await;
        let idx = inner.position(id).ok_or_else(|| ServiceError::not_found("user"))?;

        // Check before touching the record so a conflict leaves it intact.
        if let Some(email) = input.email() {
            if email != inner.users[idx].email && inner.email_exists(email) {
                return Err(ServiceError::email_taken());
            }
        }

        let rec = &mut inner.users[idx];
        if let Some(name) = input.name() {
            rec.name = name.to_string();
        }
        if let Some(email) = input.email() {
            rec.email = email.to_string();
        }
        rec.touch();
        debug!(user_id = id, "user updated");
        Ok(rec.clone())
    }

    async fn delete(&self, id: UserId) -> bool {
        let mut inner = self.inner.write().await;
        match inner.position(id) {
            Some(idx) => {
                inner.users.remove(idx);
                info!(user_id = id, "user deleted");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn assert_unique_emails(users: &[User]) {
        let emails: HashSet<_> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails.len(), users.len(), "duplicate email in {users:?}");
    }

    #[tokio::test]
    async fn crud_scenario_on_fresh_store() {
        let store = InMemoryUserStore::new();

        let a = store.create("A", "a@x.com").await.expect("create A");
        assert_eq!(a.id, 1);
        let b = store.create("B", "b@x.com").await.expect("create B");
        assert_eq!(b.id, 2);

        let dup = store.create("C", "a@x.com").await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));

        let b2 = store.update(2, UpdateUser::new("B2", "")).await.expect("update B");
        assert_eq!(b2.name, "B2");
        assert_eq!(b2.email, "b@x.com");
        assert_eq!(b2.created_at, b.created_at);

        assert!(store.delete(1).await);
        assert!(matches!(store.get(1).await, Err(ServiceError::NotFound(_))));

        let all = store.list().await;
        assert_eq!(all, vec![b2]);
    }

    #[tokio::test]
    async fn create_then_get_returns_equal_record() {
        let store = InMemoryUserStore::new();
        let created = store.create("Ann", "ann@example.com").await.unwrap();
        assert_eq!(store.get(created.id).await.unwrap(), created);
        assert!(store.contains(created.id).await);
        assert!(store.email_exists("ann@example.com").await);
    }

    #[tokio::test]
    async fn create_rejects_empty_fields_without_consuming_id() {
        let store = InMemoryUserStore::new();
        assert!(matches!(store.create("", "x@x.com").await, Err(ServiceError::InvalidArgument(_))));
        assert!(matches!(store.create("X", "").await, Err(ServiceError::InvalidArgument(_))));
        assert_eq!(store.next_id().await, 1);
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_regardless_of_name() {
        let store = InMemoryUserStore::new();
        store.create("Ann", "same@example.com").await.unwrap();
        let err = store.create("Someone Else", "same@example.com").await.unwrap_err();
        assert_eq!(err, ServiceError::Conflict("email already exists".into()));
        assert_eq!(store.next_id().await, 2);
    }

    #[tokio::test]
    async fn emails_are_case_sensitive() {
        let store = InMemoryUserStore::new();
        store.create("Ann", "ann@example.com").await.unwrap();
        assert!(store.create("Ann", "Ann@example.com").await.is_ok());
    }

    #[tokio::test]
    async fn update_with_empty_fields_only_refreshes_timestamp() {
        let store = InMemoryUserStore::new();
        let before = store.create("Ann", "ann@example.com").await.unwrap();
        let after = store.update(before.id, UpdateUser::new("", "")).await.unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.name, before.name);
        assert_eq!(after.email, before.email);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);

        let untouched = store.update(before.id, UpdateUser::default()).await.unwrap();
        assert_eq!(untouched.name, "Ann");
    }

    #[tokio::test]
    async fn update_to_own_email_is_not_a_conflict() {
        let store = InMemoryUserStore::new();
        let u = store.create("Ann", "ann@example.com").await.unwrap();
        let same = store.update(u.id, UpdateUser::new("Anna", "ann@example.com")).await.unwrap();
        assert_eq!(same.name, "Anna");
    }

    #[tokio::test]
    async fn conflicting_update_leaves_record_unchanged() {
        let store = InMemoryUserStore::new();
        store.create("Ann", "ann@example.com").await.unwrap();
        let bob = store.create("Bob", "bob@example.com").await.unwrap();

        let err = store.update(bob.id, UpdateUser::new("Robert", "ann@example.com")).await;
        assert!(matches!(err, Err(ServiceError::Conflict(_))));
        assert_eq!(store.get(bob.id).await.unwrap(), bob);
        assert_unique_emails(&store.list().await);
    }

    #[tokio::test]
    async fn update_and_get_unknown_id_is_not_found() {
        let store = InMemoryUserStore::new();
        assert_eq!(store.get(42).await, Err(ServiceError::NotFound("user not found".into())));
        assert!(matches!(store.update(42, UpdateUser::default()).await, Err(ServiceError::NotFound(_))));
        assert!(!store.delete(42).await);
    }

    #[tokio::test]
    async fn ids_are_never_reused_and_freed_emails_are() {
        let store = InMemoryUserStore::new();
        let a = store.create("A", "a@x.com").await.unwrap();
        assert!(store.delete(a.id).await);
        let again = store.create("A", "a@x.com").await.unwrap();
        assert_eq!(again.id, 2);
        assert!(!store.contains(a.id).await);
    }

    #[tokio::test]
    async fn list_is_insertion_ordered_snapshot() {
        let store = InMemoryUserStore::new();
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            store.create(name, &format!("{name}@x.com")).await.unwrap();
            assert_eq!(store.next_id().await, i as u64 + 2);
        }
        let mut snapshot = store.list().await;
        snapshot[0].name = "mutated".into();
        snapshot.clear();

        let names: Vec<_> = store.list().await.into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn demo_store_has_three_seeded_users() {
        let store = InMemoryUserStore::with_demo_users();
        let users = store.list().await;
        assert_eq!(users.iter().map(|u| u.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(users[0].email, DEMO_USERS[0].1);
        assert_eq!(store.next_id().await, 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_with_same_email_admit_one() {
        let store = Arc::new(InMemoryUserStore::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.create(&format!("user{i}"), "race@example.com").await.is_ok()
            }));
        }
        let mut ok = 0;
        for h in handles {
            if h.await.unwrap() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.list().await.len(), 1);
        assert_eq!(store.next_id().await, 2);
    }

    #[tokio::test]
    async fn mixed_operations_keep_emails_unique() {
        let store = InMemoryUserStore::new();
        let emails = ["a@x.com", "b@x.com", "c@x.com"];
        for round in 0..5u64 {
            for (i, email) in emails.iter().enumerate() {
                let _ = store.create(&format!("u{round}{i}"), email).await;
            }
            let users = store.list().await;
            if let Some(first) = users.first() {
                let _ = store.update(first.id, UpdateUser::new("", emails[(round as usize) % 3])).await;
            }
            if round % 2 == 0 {
                if let Some(last) = users.last() {
                    store.delete(last.id).await;
                }
            }
            assert_unique_emails(&store.list().await);
        }
    }
}
