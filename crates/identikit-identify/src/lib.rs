//! Metadata reconciliation engine for identikit.
//!
//! Given a stored scene or gallery and an ordered list of scrape sources,
//! the identifiers here pick a scraped candidate, resolve field strategies,
//! reconcile scalar fields and relationships against the stored state, and
//! apply the resulting change set inside a single transaction.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod fixture;
pub mod gallery;
pub mod hooks;
pub mod image;
pub mod options;
pub mod outcome;
pub mod relationships;
pub mod scalar;
pub mod scene;
pub mod source;

pub use config::Config;
pub use error::{IdentifyError, IdentifyResult, ScrapeError};
pub use fixture::FixtureScraper;
pub use gallery::GalleryIdentifier;
pub use hooks::{GalleryUpdatePostHookExecutor, LoggingHookExecutor, SceneUpdatePostHookExecutor};
pub use options::{FieldOptions, FieldStrategies, FieldStrategy, MetadataOptions};
pub use outcome::IdentifyOutcome;
pub use scene::SceneIdentifier;
pub use source::{GalleryScraper, SceneScraper, ScrapeOutcome, ScraperSource};
