//! Per-person record of achieved competencies.

use std::collections::{BTreeMap, btree_map};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::CompetencyCode;

/// The most recent achievement date of each competency code held by one
/// person.
///
/// A code recorded more than once keeps the latest date. The engine only ever
/// reads a ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: BTreeMap<CompetencyCode, NaiveDate>,
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an observation of `code` achieved on `date`.
    ///
    /// Returns `true` if the stored date changed.
    pub fn record(&mut self, code: CompetencyCode, date: NaiveDate) -> bool {
        match self.entries.entry(code) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(date);
                true
            }
            btree_map::Entry::Occupied(mut entry) if *entry.get() < date => {
                entry.insert(date);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    /// The most recent achievement date of `code`, if held.
    #[must_use]
    pub fn achieved_on(&self, code: &str) -> Option<NaiveDate> {
        self.entries.get(code).copied()
    }

    /// Iterates over held codes and their dates, in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&CompetencyCode, NaiveDate)> + '_ {
        self.entries.iter().map(|(code, date)| (code, *date))
    }

    /// The number of distinct codes held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger holds no codes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(CompetencyCode, NaiveDate)> for Ledger {
    fn from_iter<T: IntoIterator<Item = (CompetencyCode, NaiveDate)>>(iter: T) -> Self {
        let mut ledger = Self::new();
        ledger.extend(iter);
        ledger
    }
}

impl Extend<(CompetencyCode, NaiveDate)> for Ledger {
    fn extend<T: IntoIterator<Item = (CompetencyCode, NaiveDate)>>(&mut self, iter: T) {
        for (code, date) in iter {
            self.record(code, date);
        }
    }
}
