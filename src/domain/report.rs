use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{Key, Status};

/// The status of every requirement and certification for one person.
///
/// Produced by [`Evaluator::evaluate`](crate::Evaluator::evaluate). Entries
/// are ordered by name, so two reports with the same contents serialise
/// identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatusReport {
    statuses: BTreeMap<Key, Status>,
}

impl StatusReport {
    /// The status of a requirement or certification, if it was evaluated.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Status> {
        self.statuses.get(name).copied()
    }

    /// Iterates over every entry in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, Status)> + '_ {
        self.statuses.iter().map(|(key, status)| (key, *status))
    }

    /// The number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    /// Whether the report has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// The number of entries with the given status.
    #[must_use]
    pub fn count(&self, status: Status) -> usize {
        self.statuses.values().filter(|&&s| s == status).count()
    }
}

impl FromIterator<(Key, Status)> for StatusReport {
    fn from_iter<T: IntoIterator<Item = (Key, Status)>>(iter: T) -> Self {
        Self {
            statuses: iter.into_iter().collect(),
        }
    }
}
