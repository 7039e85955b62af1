//! Core domain model for identikit.
//!
//! This crate defines the media entities (scenes, galleries) and the
//! entities they relate to (performers, tags, studios), the records returned
//! by external scrapers, the sparse partial-update types applied to
//! entities, the storage collaborator traits, and a SQLite implementation
//! of those traits.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod partial;
pub mod schema;
pub mod scraped;
pub mod store;

pub use error::{Error, Result};
