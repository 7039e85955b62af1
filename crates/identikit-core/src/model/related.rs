use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A lazily loaded relationship list.
///
/// Entities are read without their relationships; callers load each list
/// from the store once, inside the transaction that will also write the
/// entity, so every diff is computed against a consistent snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Related<T> {
    list: Option<Vec<T>>,
}

impl<T> Default for Related<T> {
    fn default() -> Self {
        Self { list: None }
    }
}

impl<T> Related<T> {
    /// A relationship list that is already known.
    #[must_use]
    pub fn new(list: Vec<T>) -> Self {
        Self { list: Some(list) }
    }

    #[must_use]
    pub const fn loaded(&self) -> bool {
        self.list.is_some()
    }

    /// The loaded list, or an empty slice if nothing has been loaded yet.
    #[must_use]
    pub fn list(&self) -> &[T] {
        self.list.as_deref().unwrap_or_default()
    }

    /// Load the list with `f` unless it has already been loaded.
    pub fn load_with<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce() -> Result<Vec<T>>,
    {
        if self.list.is_none() {
            self.list = Some(f()?);
        }
        Ok(())
    }

    /// Replace the list, e.g. after an update was applied.
    pub fn set(&mut self, list: Vec<T>) {
        self.list = Some(list);
    }
}
