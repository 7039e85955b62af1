//! SQLite persistence for identikit entities.

pub mod db;
pub mod migrations;

pub use db::{Database, Store};
