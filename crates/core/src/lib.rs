//! EpiWatch domain layer.
//!
//! Case, outbreak and alert types, the store traits the rest of the system
//! is written against, an in-memory store, and the outbreak detector. No
//! database or HTTP code lives here.

pub mod alert;
pub mod case;
pub mod detection;
pub mod error;
pub mod memory;
pub mod outbreak;
pub mod store;
pub mod types;
