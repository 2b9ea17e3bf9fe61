//! Flux algorithms eligible for aperture correction

use std::collections::BTreeSet;

/// Set of flux algorithm prefixes, e.g. `base_PsfFlux`
///
/// Owned by the caller and handed to [`crate::ApplyApCorrTask::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApCorrNameSet {
    names: BTreeSet<String>,
}

impl ApCorrNameSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns false if the name was already present
    pub fn add(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Names in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
