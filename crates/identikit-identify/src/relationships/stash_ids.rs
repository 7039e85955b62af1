use chrono::Utc;
use identikit_core::model::StashId;

use super::Relationships;
use crate::options::{fields, FieldStrategy};

fn same_references(a: &[StashId], b: &[StashId]) -> bool {
    a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| x.same_reference(y)))
}

impl<R> Relationships<'_, R> {
    /// Record the scraped remote ID against the source's endpoint.
    ///
    /// Entries are keyed by endpoint: an existing entry for the endpoint is
    /// updated in place, otherwise a new one is appended. With `touch`, an
    /// unchanged entry is still re-emitted with a fresh timestamp.
    pub fn stash_ids(
        &self,
        current: &[StashId],
        remote_site_id: Option<&str>,
        touch: bool,
    ) -> Option<Vec<StashId>> {
        let endpoint = self.endpoint?;
        let remote_site_id = remote_site_id.filter(|id| !id.is_empty())?;
        if !self.fields.should_set(fields::STASH_IDS, false) {
            return None;
        }

        let mut ids = match self.fields.strategy(fields::STASH_IDS) {
            FieldStrategy::Merge => current.to_vec(),
            _ => Vec::new(),
        };

        match ids.iter_mut().find(|s| s.endpoint == endpoint) {
            Some(existing) if existing.stash_id == remote_site_id => {
                if !touch {
                    return None;
                }
                existing.updated_at = Utc::now();
            }
            Some(existing) => {
                existing.stash_id = remote_site_id.to_string();
                existing.updated_at = Utc::now();
            }
            None => ids.push(StashId::new(endpoint, remote_site_id)),
        }

        if !touch && same_references(current, &ids) {
            return None;
        }
        Some(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{FieldOptions, FieldStrategies, MetadataOptions};
    use chrono::{DateTime, TimeZone};

    const EXISTING: &str = "https://existing.example";
    const NEW: &str = "https://new.example";

    fn strategies(strategy: FieldStrategy) -> FieldStrategies {
        let opts = MetadataOptions {
            field_options: vec![FieldOptions::new(fields::STASH_IDS, strategy)],
            ..Default::default()
        };
        FieldStrategies::resolve([&opts])
    }

    fn long_ago() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    fn existing() -> Vec<StashId> {
        vec![StashId {
            endpoint: EXISTING.to_string(),
            stash_id: "remote".to_string(),
            updated_at: long_ago(),
        }]
    }

    fn rel<'a>(fields: &'a FieldStrategies, endpoint: Option<&'a str>) -> Relationships<'a, ()> {
        Relationships {
            endpoint,
            ..Relationships::for_test(&(), fields)
        }
    }

    #[test]
    fn test_gates() {
        let merge = strategies(FieldStrategy::Merge);
        let ignore = strategies(FieldStrategy::Ignore);
        assert_eq!(rel(&ignore, Some(NEW)).stash_ids(&[], Some("remote"), false), None);
        assert_eq!(rel(&merge, None).stash_ids(&[], Some("remote"), false), None);
        assert_eq!(rel(&merge, Some(NEW)).stash_ids(&[], None, false), None);
    }

    #[test]
    fn test_same_id_is_no_change() {
        let merge = strategies(FieldStrategy::Merge);
        assert_eq!(
            rel(&merge, Some(EXISTING)).stash_ids(&existing(), Some("remote"), false),
            None
        );
    }

    #[test]
    fn test_new_id_replaces_in_place() {
        let merge = strategies(FieldStrategy::Merge);
        let out = rel(&merge, Some(EXISTING))
            .stash_ids(&existing(), Some("remote-2"), false)
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].endpoint, EXISTING);
        assert_eq!(out[0].stash_id, "remote-2");
        assert!(out[0].updated_at > long_ago());
    }

    #[test]
    fn test_merge_appends_new_endpoint() {
        let merge = strategies(FieldStrategy::Merge);
        let out = rel(&merge, Some(NEW))
            .stash_ids(&existing(), Some("remote-2"), false)
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].endpoint, EXISTING);
        assert_eq!(out[1].endpoint, NEW);
    }

    #[test]
    fn test_overwrite_discards_other_endpoints() {
        let overwrite = strategies(FieldStrategy::Overwrite);
        let out = rel(&overwrite, Some(NEW))
            .stash_ids(&existing(), Some("remote-2"), false)
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].endpoint, NEW);

        assert_eq!(
            rel(&overwrite, Some(EXISTING)).stash_ids(&existing(), Some("remote"), false),
            None
        );
    }

    #[test]
    fn test_touch_refreshes_timestamp() {
        let merge = strategies(FieldStrategy::Merge);
        let out = rel(&merge, Some(EXISTING))
            .stash_ids(&existing(), Some("remote"), true)
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].stash_id, "remote");
        assert!(out[0].updated_at > long_ago());
    }
}
