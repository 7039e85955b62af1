use std::collections::HashSet;

use crate::options::{fields, FieldStrategies, FieldStrategy};

/// Reconcile a scraped URL list against the stored one.
///
/// Merge appends unseen URLs in order and reports a change only when the
/// list grew. Overwrite replaces the list when the two differ as sets.
pub fn reconcile_urls(
    fields: &FieldStrategies,
    current: &[String],
    scraped: &[String],
) -> Option<Vec<String>> {
    if scraped.is_empty() || !fields.should_set(fields::URL, false) {
        return None;
    }

    match fields.strategy(fields::URL) {
        FieldStrategy::Overwrite => {
            let a: HashSet<&String> = current.iter().collect();
            let b: HashSet<&String> = scraped.iter().collect();
            (a != b).then(|| scraped.to_vec())
        }
        _ => {
            let mut urls = current.to_vec();
            for url in scraped {
                super::append_unique(&mut urls, url.clone());
            }
            (urls.len() != current.len()).then_some(urls)
        }
    }
}
