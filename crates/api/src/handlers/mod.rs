//! Request handlers.
//!
//! Each submodule holds the async handler functions for one resource.
//! Handlers talk to the stores in [`crate::state::AppState`] and map errors
//! via [`crate::error::AppError`].

pub mod alert;
pub mod case;
pub mod dashboard;
pub mod outbreak;
