//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument and return raw rows.

pub mod alert_repo;
pub mod case_repo;
pub mod outbreak_repo;

pub use alert_repo::AlertRepo;
pub use case_repo::CaseRepo;
pub use outbreak_repo::OutbreakRepo;
