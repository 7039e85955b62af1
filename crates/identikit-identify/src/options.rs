//! Identification options and field strategy resolution.
//!
//! Options come from two places: a global default set and an optional
//! per-source set. Flags are merged with the source value taking priority;
//! field strategies are resolved into a [`FieldStrategies`] map where the
//! first definition of a field wins.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Field names understood by the reconcilers.
pub mod fields {
    pub const TITLE: &str = "title";
    pub const DATE: &str = "date";
    pub const DETAILS: &str = "details";
    pub const URL: &str = "url";
    pub const DIRECTOR: &str = "director";
    pub const PHOTOGRAPHER: &str = "photographer";
    pub const CODE: &str = "code";
    pub const STUDIO: &str = "studio";
    pub const PERFORMERS: &str = "performers";
    pub const TAGS: &str = "tags";
    pub const STASH_IDS: &str = "stash_ids";
}

/// How a scraped value combines with the stored one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldStrategy {
    /// Never change the field.
    Ignore,
    /// Only fill the field when it is empty; add to multi-valued fields.
    #[default]
    Merge,
    /// Replace the field whenever a scraped value is present.
    Overwrite,
}

impl FieldStrategy {
    /// Whether a single-valued field should be written.
    #[must_use]
    pub const fn should_set(self, has_existing: bool) -> bool {
        match self {
            Self::Ignore => false,
            Self::Merge => !has_existing,
            Self::Overwrite => true,
        }
    }
}

/// Unknown strategy names fall back to the default rather than failing the
/// whole configuration.
fn lenient_strategy<'de, D>(deserializer: D) -> Result<Option<FieldStrategy>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        match serde_json::from_value(serde_json::Value::String(s.to_uppercase())) {
            Ok(strategy) => Some(strategy),
            Err(_) => {
                log::warn!("Unknown field strategy {s:?}, using MERGE");
                None
            }
        }
    }))
}

/// Per-field configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOptions {
    pub field: String,

    #[serde(default, deserialize_with = "lenient_strategy")]
    pub strategy: Option<FieldStrategy>,

    /// Create performers, studios or tags that only exist at the source.
    #[serde(default)]
    pub create_missing: Option<bool>,
}

impl FieldOptions {
    #[must_use]
    pub fn new(field: impl Into<String>, strategy: FieldStrategy) -> Self {
        Self {
            field: field.into(),
            strategy: Some(strategy),
            create_missing: None,
        }
    }

    #[must_use]
    pub const fn with_create_missing(mut self, create_missing: bool) -> Self {
        self.create_missing = Some(create_missing);
        self
    }
}

/// A full option set, either the global default or one source's overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataOptions {
    pub field_options: Vec<FieldOptions>,
    pub set_cover_image: Option<bool>,
    pub set_organized: Option<bool>,
    pub include_male_performers: Option<bool>,
    pub skip_multiple_matches: Option<bool>,

    /// Stored ID of the tag applied to entities skipped for ambiguity.
    pub skip_multiple_match_tag: Option<String>,
    pub skip_single_name_performers: Option<bool>,

    /// Stored ID of the tag applied when a single-name performer is skipped.
    pub skip_single_name_performer_tag: Option<String>,
}

fn non_empty(tag: Option<&String>) -> Option<&String> {
    tag.filter(|t| !t.is_empty())
}

impl MetadataOptions {
    /// Merge the flags of a source's options over the defaults.
    ///
    /// Field options are not merged here; see [`FieldStrategies::resolve`].
    #[must_use]
    pub fn merged(defaults: Option<&Self>, source: Option<&Self>) -> Self {
        let mut out = defaults.cloned().unwrap_or_default();
        let Some(source) = source else {
            return out;
        };

        if source.set_cover_image.is_some() {
            out.set_cover_image = source.set_cover_image;
        }
        if source.set_organized.is_some() {
            out.set_organized = source.set_organized;
        }
        if source.include_male_performers.is_some() {
            out.include_male_performers = source.include_male_performers;
        }
        if source.skip_multiple_matches.is_some() {
            out.skip_multiple_matches = source.skip_multiple_matches;
        }
        if let Some(tag) = non_empty(source.skip_multiple_match_tag.as_ref()) {
            out.skip_multiple_match_tag = Some(tag.clone());
        }
        if source.skip_single_name_performers.is_some() {
            out.skip_single_name_performers = source.skip_single_name_performers;
        }
        if let Some(tag) = non_empty(source.skip_single_name_performer_tag.as_ref()) {
            out.skip_single_name_performer_tag = Some(tag.clone());
        }
        out
    }

    #[must_use]
    pub fn set_cover_image(&self) -> bool {
        self.set_cover_image.unwrap_or(true)
    }

    #[must_use]
    pub fn set_organized(&self) -> bool {
        self.set_organized.unwrap_or(true)
    }

    #[must_use]
    pub fn include_male_performers(&self) -> bool {
        self.include_male_performers.unwrap_or(true)
    }

    #[must_use]
    pub fn skip_multiple_matches(&self) -> bool {
        self.skip_multiple_matches.unwrap_or(false)
    }

    #[must_use]
    pub fn skip_single_name_performers(&self) -> bool {
        self.skip_single_name_performers.unwrap_or(false)
    }

    #[must_use]
    pub fn skip_multiple_match_tag(&self) -> Option<&str> {
        non_empty(self.skip_multiple_match_tag.as_ref()).map(String::as_str)
    }

    #[must_use]
    pub fn skip_single_name_performer_tag(&self) -> Option<&str> {
        non_empty(self.skip_single_name_performer_tag.as_ref()).map(String::as_str)
    }
}

/// Resolved field options for one run, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldStrategies {
    fields: HashMap<String, FieldOptions>,
}

impl FieldStrategies {
    /// Build the map from option sets ordered most specific first.
    #[must_use]
    pub fn resolve<'a, I>(options: I) -> Self
    where
        I: IntoIterator<Item = &'a MetadataOptions>,
    {
        let mut fields = HashMap::new();
        for set in options {
            for f in &set.field_options {
                fields.entry(f.field.clone()).or_insert_with(|| f.clone());
            }
        }
        Self { fields }
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldOptions> {
        self.fields.get(field)
    }

    /// The effective strategy for a field. Unset means [`FieldStrategy::Merge`].
    #[must_use]
    pub fn strategy(&self, field: &str) -> FieldStrategy {
        self.get(field)
            .and_then(|f| f.strategy)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn create_missing(&self, field: &str) -> bool {
        self.get(field)
            .and_then(|f| f.create_missing)
            .unwrap_or(false)
    }

    #[must_use]
    pub fn should_set(&self, field: &str, has_existing: bool) -> bool {
        self.strategy(field).should_set(has_existing)
    }
}
