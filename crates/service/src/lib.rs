//! Service layer owning the user records.
//! - Validation and uniqueness rules live here, not in the HTTP layer.
//! - Every failure is reported as a [`errors::ServiceError`] kind.

pub mod errors;
pub mod user;
