//! Relationship reconcilers.
//!
//! Each reconciler compares a scraped relationship against the stored one
//! and returns `None` when nothing would change. Multi-valued results are
//! compared as sets, so a reordering of the same IDs is not a change.

pub mod cover;
pub mod performers;
pub mod stash_ids;
pub mod studio;
pub mod tags;
pub mod urls;

use std::collections::HashSet;
use std::hash::Hash;
use std::str::FromStr;

use crate::error::{IdentifyError, IdentifyResult};
use crate::options::FieldStrategies;

pub use performers::PerformerReconciliation;

/// Shared context for reconciling one entity's relationships.
#[derive(Debug)]
pub struct Relationships<'a, R> {
    pub store: &'a R,
    pub fields: &'a FieldStrategies,

    /// Endpoint of the source that produced the scraped record.
    pub endpoint: Option<&'a str>,
    pub skip_single_name_performers: bool,
}

#[cfg(test)]
impl<'a, R> Relationships<'a, R> {
    pub(crate) const fn for_test(store: &'a R, fields: &'a FieldStrategies) -> Self {
        Self {
            store,
            fields,
            endpoint: None,
            skip_single_name_performers: false,
        }
    }
}

/// Parse a stored ID carried by a scraped reference.
pub(crate) fn parse_stored_id<T>(kind: &'static str, value: &str) -> IdentifyResult<T>
where
    T: FromStr<Err = std::num::ParseIntError>,
{
    value
        .parse()
        .map_err(|e| IdentifyError::parse_id(kind, value, e))
}

/// The ID a creator assigned, which must be present after a successful create.
pub(crate) fn assigned_id<T>(kind: &'static str, id: Option<T>) -> IdentifyResult<T> {
    id.ok_or_else(|| IdentifyError::Create {
        kind,
        source: identikit_core::Error::InvalidData(format!("created {kind} has no ID")),
    })
}

/// Push `value` unless it is already present.
pub(crate) fn append_unique<T: PartialEq>(list: &mut Vec<T>, value: T) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Whether two lists hold the same values, ignoring order and duplicates.
pub(crate) fn same_set<T: Eq + Hash>(a: &[T], b: &[T]) -> bool {
    let a: HashSet<&T> = a.iter().collect();
    let b: HashSet<&T> = b.iter().collect();
    a == b
}
