use identikit_core::model::{Tag, TagId};
use identikit_core::scraped::ScrapedTag;
use identikit_core::store::TagFinderCreator;

use super::{append_unique, assigned_id, parse_stored_id, same_set, Relationships};
use crate::error::{IdentifyError, IdentifyResult};
use crate::options::{fields, FieldStrategy};

/// Fold a marker tag into a tag change.
///
/// `computed` is the reconciled tag set (`None` when unchanged). The marker
/// is added to it, or to the current set when tags were otherwise unchanged,
/// unless it is already present.
pub fn with_marker_tag(
    computed: Option<Vec<TagId>>,
    current: &[TagId],
    marker: &str,
) -> IdentifyResult<Option<Vec<TagId>>> {
    let marker: TagId = parse_stored_id("tag", marker)?;
    let mut ids = computed.clone().unwrap_or_else(|| current.to_vec());
    if ids.contains(&marker) {
        return Ok(computed);
    }
    ids.push(marker);
    Ok(Some(ids))
}

impl<R: TagFinderCreator> Relationships<'_, R> {
    /// Resolve scraped tags into a tag set, creating missing tags if allowed.
    pub fn tags(&self, current: &[TagId], scraped: &[ScrapedTag]) -> IdentifyResult<Option<Vec<TagId>>> {
        if scraped.is_empty() || !self.fields.should_set(fields::TAGS, false) {
            return Ok(None);
        }

        let create_missing = self.fields.create_missing(fields::TAGS);
        let mut ids = match self.fields.strategy(fields::TAGS) {
            FieldStrategy::Merge => current.to_vec(),
            _ => Vec::new(),
        };

        for t in scraped {
            if let Some(stored) = &t.stored_id {
                append_unique(&mut ids, parse_stored_id("tag", stored)?);
            } else if create_missing && !t.name.trim().is_empty() {
                let mut tag = Tag::new(t.name.trim());
                self.store
                    .create_tag(&mut tag)
                    .map_err(IdentifyError::create("tag"))?;
                let id = assigned_id("tag", tag.id)?;
                log::debug!("Created tag {} ({})", tag.name, id);
                append_unique(&mut ids, id);
            }
        }

        Ok((!same_set(current, &ids)).then_some(ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{FieldOptions, FieldStrategies, MetadataOptions};
    use identikit_core::schema::Database;

    fn strategies(strategy: FieldStrategy, create_missing: bool) -> FieldStrategies {
        let opts = MetadataOptions {
            field_options: vec![
                FieldOptions::new(fields::TAGS, strategy).with_create_missing(create_missing)
            ],
            ..Default::default()
        };
        FieldStrategies::resolve([&opts])
    }

    fn stored(id: &str) -> ScrapedTag {
        ScrapedTag {
            stored_id: Some(id.to_string()),
            name: "stored".to_string(),
        }
    }

    fn ids(raw: &[i64]) -> Vec<TagId> {
        raw.iter().copied().map(TagId::new).collect()
    }

    #[test]
    fn test_merge_adds_stored_tag() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        let fields = strategies(FieldStrategy::Merge, false);
        let rel = Relationships::for_test(&store, &fields);
        assert_eq!(
            rel.tags(&ids(&[5]), &[stored("7")]).unwrap(),
            Some(ids(&[5, 7]))
        );
    }

    #[test]
    fn test_overwrite_replaces() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        let fields = strategies(FieldStrategy::Overwrite, false);
        let rel = Relationships::for_test(&store, &fields);
        assert_eq!(rel.tags(&ids(&[5]), &[stored("7")]).unwrap(), Some(ids(&[7])));
    }

    #[test]
    fn test_no_change_when_already_present() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        let fields = strategies(FieldStrategy::Merge, false);
        let rel = Relationships::for_test(&store, &fields);
        assert_eq!(rel.tags(&ids(&[5, 7]), &[stored("7")]).unwrap(), None);
    }

    #[test]
    fn test_ignore_and_empty() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        let ignore = strategies(FieldStrategy::Ignore, false);
        let rel = Relationships::for_test(&store, &ignore);
        assert_eq!(rel.tags(&[], &[stored("7")]).unwrap(), None);

        let merge = strategies(FieldStrategy::Merge, false);
        let rel = Relationships::for_test(&store, &merge);
        assert_eq!(rel.tags(&ids(&[1]), &[]).unwrap(), None);
    }

    #[test]
    fn test_invalid_stored_id_fails() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        let fields = strategies(FieldStrategy::Merge, false);
        let rel = Relationships::for_test(&store, &fields);
        let err = rel.tags(&[], &[stored("seven")]).unwrap_err();
        assert!(matches!(err, IdentifyError::ParseId { kind: "tag", .. }));
    }

    #[test]
    fn test_marker_tag_merges_into_current_set() {
        assert_eq!(
            with_marker_tag(None, &ids(&[1, 2]), "9").unwrap(),
            Some(ids(&[1, 2, 9]))
        );
        assert_eq!(
            with_marker_tag(Some(ids(&[3])), &ids(&[1]), "9").unwrap(),
            Some(ids(&[3, 9]))
        );
    }

    #[test]
    fn test_marker_tag_already_present() {
        assert_eq!(with_marker_tag(None, &ids(&[9]), "9").unwrap(), None);
        assert_eq!(
            with_marker_tag(Some(ids(&[9, 4])), &ids(&[9]), "9").unwrap(),
            Some(ids(&[9, 4]))
        );
    }

    #[test]
    fn test_marker_tag_must_be_an_id() {
        let err = with_marker_tag(None, &[], "needs review").unwrap_err();
        assert!(matches!(err, IdentifyError::ParseId { kind: "tag", .. }));
    }

    #[test]
    fn test_create_missing() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        let fields = strategies(FieldStrategy::Merge, true);
        let rel = Relationships::for_test(&store, &fields);
        let scraped = ScrapedTag {
            stored_id: None,
            name: "brand new".to_string(),
        };

        let out = rel.tags(&[], &[scraped]).unwrap().unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(store.find_tag(out[0]).unwrap().unwrap().name, "brand new");
    }

    #[test]
    fn test_create_failure_fails_run() {
        let db = Database::open_in_memory().unwrap();
        let store = db.store();
        store.create_tag(&mut Tag::new("taken")).unwrap();
        let fields = strategies(FieldStrategy::Merge, true);
        let rel = Relationships::for_test(&store, &fields);
        let scraped = ScrapedTag {
            stored_id: None,
            name: "taken".to_string(),
        };

        let err = rel.tags(&[], &[scraped]).unwrap_err();
        assert!(matches!(err, IdentifyError::Create { kind: "tag", .. }));
    }
}
