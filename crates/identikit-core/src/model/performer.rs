use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::model::date::Date;
use crate::model::ids::PerformerId;
use crate::model::stash_id::StashId;

/// A performer's gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    TransgenderMale,
    TransgenderFemale,
    Intersex,
    NonBinary,
}

impl Gender {
    /// Canonical enum name, as used by scrapers and the API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::TransgenderMale => "TRANSGENDER_MALE",
            Self::TransgenderFemale => "TRANSGENDER_FEMALE",
            Self::Intersex => "INTERSEX",
            Self::NonBinary => "NON_BINARY",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts both the canonical names (`TRANSGENDER_MALE`) and the
/// human-readable forms scrapers emit ("Transgender Male", "Non-Binary").
impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "MALE" => Ok(Self::Male),
            "FEMALE" => Ok(Self::Female),
            "TRANSGENDER_MALE" => Ok(Self::TransgenderMale),
            "TRANSGENDER_FEMALE" => Ok(Self::TransgenderFemale),
            "INTERSEX" => Ok(Self::Intersex),
            "NON_BINARY" => Ok(Self::NonBinary),
            _ => Err(Error::InvalidData(format!("unknown gender: {s:?}"))),
        }
    }
}

/// A performer appearing in scenes and galleries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Performer {
    /// Assigned by the store on creation.
    pub id: Option<PerformerId>,
    pub name: String,
    pub disambiguation: Option<String>,
    pub gender: Option<Gender>,
    pub birthdate: Option<Date>,
    pub death_date: Option<Date>,
    pub ethnicity: Option<String>,
    pub country: Option<String>,
    pub eye_color: Option<String>,
    pub hair_color: Option<String>,

    /// Height in centimetres.
    pub height_cm: Option<i32>,

    /// Weight in kilograms.
    pub weight_kg: Option<i32>,
    pub measurements: Option<String>,
    pub fake_tits: Option<String>,
    pub career_length: Option<String>,
    pub tattoos: Option<String>,
    pub piercings: Option<String>,
    pub aliases: BTreeSet<String>,
    pub urls: Vec<String>,
    pub details: Option<String>,
    pub stash_ids: Vec<StashId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Performer {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name: name.into(),
            disambiguation: None,
            gender: None,
            birthdate: None,
            death_date: None,
            ethnicity: None,
            country: None,
            eye_color: None,
            hair_color: None,
            height_cm: None,
            weight_kg: None,
            measurements: None,
            fake_tits: None,
            career_length: None,
            tattoos: None,
            piercings: None,
            aliases: BTreeSet::new(),
            urls: Vec::new(),
            details: None,
            stash_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
