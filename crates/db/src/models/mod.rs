//! Row structs for the surveillance tables.
//!
//! Each submodule contains a `FromRow` struct matching the table row and a
//! `TryFrom` conversion into the corresponding `epiwatch_core` record. Enum
//! columns are stored as text and parsed during conversion.

pub mod alert;
pub mod case;
pub mod outbreak;

use epiwatch_core::error::CoreError;

/// Parse a text enum column, treating an unknown value as corrupt row data.
pub(crate) fn parse_column<T>(column: &'static str, value: &str) -> Result<T, CoreError>
where
    T: std::str::FromStr<Err = CoreError>,
{
    value
        .parse()
        .map_err(|_| CoreError::Internal(format!("unexpected {column} value '{value}' in database")))
}
