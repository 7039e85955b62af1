//! The result of one identification run.

/// How an identification run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifyOutcome {
    /// No source returned a usable result.
    NotFound,

    /// A source returned several results and was configured to skip them.
    Ambiguous {
        source: String,

        /// Whether the multiple-match tag was newly applied.
        tag_added: bool,
    },

    /// A result was found but nothing needed to change.
    Unchanged { source: String },

    /// The entity was updated; `fields` lists what changed.
    Updated {
        source: String,
        fields: Vec<&'static str>,
    },
}

impl IdentifyOutcome {
    #[must_use]
    pub const fn is_updated(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }
}
