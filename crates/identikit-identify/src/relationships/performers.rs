use identikit_core::model::{Date, Gender, Performer, PerformerId, StashId};
use identikit_core::scraped::ScrapedPerformer;
use identikit_core::store::PerformerCreator;

use super::{append_unique, assigned_id, parse_stored_id, same_set, Relationships};
use crate::error::{IdentifyError, IdentifyResult};
use crate::options::{fields, FieldStrategy};

/// The outcome of reconciling performers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerformerReconciliation {
    /// The new performer set, or `None` when unchanged.
    pub ids: Option<Vec<PerformerId>>,

    /// A single-name performer was left out and needs disambiguation.
    pub skipped_single_name: bool,
}

fn is_male(p: &ScrapedPerformer) -> bool {
    p.gender
        .as_deref()
        .is_some_and(|g| g.eq_ignore_ascii_case(Gender::Male.as_str()))
}

/// A bare single-word name with nothing to tell it apart from others.
fn needs_disambiguation(p: &ScrapedPerformer, name: &str) -> bool {
    let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
    !name.trim().contains(char::is_whitespace) && blank(&p.disambiguation) && blank(&p.aliases)
}

fn parse_optional_date(field: &str, value: Option<&String>) -> Option<Date> {
    let value = value?;
    match value.parse() {
        Ok(date) => Some(date),
        Err(e) => {
            log::warn!("Ignoring scraped performer {field}: {e}");
            None
        }
    }
}

/// Build a new performer record from everything the scraper supplied.
///
/// Malformed dates, gender and measurements are left unset.
pub fn scraped_to_performer(
    p: &ScrapedPerformer,
    name: &str,
    endpoint: Option<&str>,
) -> Performer {
    let mut performer = Performer::new(name);
    performer.disambiguation.clone_from(&p.disambiguation);
    performer.gender = p.gender.as_deref().and_then(|g| g.parse().ok());
    performer.birthdate = parse_optional_date("birthdate", p.birthdate.as_ref());
    performer.death_date = parse_optional_date("death date", p.death_date.as_ref());
    performer.ethnicity.clone_from(&p.ethnicity);
    performer.country.clone_from(&p.country);
    performer.eye_color.clone_from(&p.eye_color);
    performer.hair_color.clone_from(&p.hair_color);
    performer.height_cm = p.height.as_deref().and_then(|h| h.trim().parse().ok());
    performer.weight_kg = p.weight.as_deref().and_then(|w| w.trim().parse().ok());
    performer.measurements.clone_from(&p.measurements);
    performer.fake_tits.clone_from(&p.fake_tits);
    performer.career_length.clone_from(&p.career_length);
    performer.tattoos.clone_from(&p.tattoos);
    performer.piercings.clone_from(&p.piercings);
    if let Some(aliases) = &p.aliases {
        performer.aliases = aliases
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(String::from)
            .collect();
    }
    performer.urls.clone_from(&p.urls);
    performer.details.clone_from(&p.details);
    if let (Some(endpoint), Some(remote_id)) = (endpoint, &p.remote_site_id) {
        performer
            .stash_ids
            .push(StashId::new(endpoint, remote_id.clone()));
    }
    performer
}

impl<R: PerformerCreator> Relationships<'_, R> {
    /// Resolve scraped performers into a performer set.
    ///
    /// Performers are multi-valued, so only `Ignore` suppresses them; a
    /// stored performer list never blocks a merge.
    pub fn performers(
        &self,
        current: &[PerformerId],
        scraped: &[ScrapedPerformer],
        ignore_male: bool,
    ) -> IdentifyResult<PerformerReconciliation> {
        if scraped.is_empty() || !self.fields.should_set(fields::PERFORMERS, false) {
            return Ok(PerformerReconciliation::default());
        }

        let create_missing = self.fields.create_missing(fields::PERFORMERS);
        let mut ids = match self.fields.strategy(fields::PERFORMERS) {
            FieldStrategy::Merge => current.to_vec(),
            _ => Vec::new(),
        };
        let mut skipped_single_name = false;

        for p in scraped {
            if ignore_male && is_male(p) {
                continue;
            }

            if let Some(stored) = &p.stored_id {
                append_unique(&mut ids, parse_stored_id("performer", stored)?);
                continue;
            }

            let Some(name) = p.name.as_deref().filter(|n| !n.trim().is_empty()) else {
                continue;
            };
            if !create_missing {
                continue;
            }
            if self.skip_single_name_performers && needs_disambiguation(p, name) {
                log::debug!("Skipping single-name performer {name}");
                skipped_single_name = true;
                continue;
            }

            let mut performer = scraped_to_performer(p, name, self.endpoint);
            self.store
                .create_performer(&mut performer)
                .map_err(IdentifyError::create("performer"))?;
            let id = assigned_id("performer", performer.id)?;
            log::debug!("Created performer {} ({})", performer.name, id);
            append_unique(&mut ids, id);
        }

        let ids = (!same_set(current, &ids)).then_some(ids);
        Ok(PerformerReconciliation {
            ids,
            skipped_single_name,
        })
    }
}
