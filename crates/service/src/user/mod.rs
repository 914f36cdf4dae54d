//! User resource: repository contract plus the in-memory implementation.

pub mod memory;
pub mod repository;

pub use memory::InMemoryUserStore;
pub use repository::{UpdateUser, UserRepository};
