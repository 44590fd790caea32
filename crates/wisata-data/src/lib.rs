//! Wisata Data crate - the four travel datasets.
//!
//! Loads transport schedules, promotions, destination info and hotel
//! availability from CSV, validates their city columns, and offers the
//! case-insensitive city filters, bundle lookup and text rendering used by
//! the dialogue router and the agent tools.

pub mod catalog;
pub mod error;
pub mod table;

pub use catalog::{Bundle, Catalog, Dataset, DatasetKind, ModeDestinations};
pub use error::DataError;
pub use table::Table;
