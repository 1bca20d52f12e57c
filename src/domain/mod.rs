//! Domain vocabulary of the SLSC web service
//!
//! Resource selectors, property data types and values, and reservation access levels.

pub mod property;
pub mod resources;
