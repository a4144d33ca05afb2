//! Resolution of requirements against a ledger.
//!
//! Each requirement is satisfied by any one of a set of interchangeable
//! competency codes (its aliases), optionally subject to an expiry window.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Months, NaiveDate};

use crate::domain::{CompetencyCode, Key, Ledger, Status, status};

/// A validity window, in whole years, after which evidence lapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    years: u32,
}

impl ExpiryPolicy {
    /// Creates a policy that expires evidence after the given number of years.
    #[must_use]
    pub const fn years(years: u32) -> Self {
        Self { years }
    }

    /// The length of the validity window in years.
    #[must_use]
    pub const fn in_years(self) -> u32 {
        self.years
    }

    /// Whether evidence achieved on `achieved_on` has lapsed at `reference`.
    ///
    /// The anniversary is taken as the start of that day, so evidence lapses
    /// on its anniversary: an anniversary on or before the reference date has
    /// passed. Anniversaries of 29 February fall on 28 February in common
    /// years. An anniversary beyond the representable calendar never lapses.
    #[must_use]
    pub fn has_lapsed(self, achieved_on: NaiveDate, reference: NaiveDate) -> bool {
        12u32
            .checked_mul(self.years)
            .and_then(|months| achieved_on.checked_add_months(Months::new(months)))
            .is_some_and(|anniversary| anniversary <= reference)
    }
}

/// The evidence accepted for one requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equivalency {
    aliases: BTreeSet<CompetencyCode>,
    expiry: Option<ExpiryPolicy>,
}

impl Equivalency {
    /// Creates an equivalency over the given alias codes.
    #[must_use]
    pub fn new(aliases: impl IntoIterator<Item = CompetencyCode>) -> Self {
        Self {
            aliases: aliases.into_iter().collect(),
            expiry: None,
        }
    }

    /// Attaches an expiry policy.
    #[must_use]
    pub const fn with_expiry(mut self, expiry: ExpiryPolicy) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// The alias codes accepted as evidence.
    #[must_use]
    pub const fn aliases(&self) -> &BTreeSet<CompetencyCode> {
        &self.aliases
    }

    /// The expiry policy, if any.
    #[must_use]
    pub const fn expiry(&self) -> Option<ExpiryPolicy> {
        self.expiry
    }

    /// The status of a single alias code.
    fn code_status(&self, code: &CompetencyCode, ledger: &Ledger, reference: NaiveDate) -> Status {
        let Some(achieved_on) = ledger.achieved_on(code) else {
            return Status::None;
        };

        match self.expiry {
            Some(policy) if policy.has_lapsed(achieved_on, reference) => Status::Expired,
            _ => Status::Current,
        }
    }

    /// Resolves this requirement: the OR of the status of every alias.
    #[must_use]
    pub fn resolve(&self, ledger: &Ledger, reference: NaiveDate) -> Status {
        status::or(
            self.aliases
                .iter()
                .map(|code| self.code_status(code, ledger, reference)),
        )
    }
}

/// The table of all requirements, keyed by requirement name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquivalencyTable {
    requirements: BTreeMap<Key, Equivalency>,
}

impl EquivalencyTable {
    /// Registers a requirement, returning the previous entry for the same key.
    pub fn insert(&mut self, key: Key, equivalency: Equivalency) -> Option<Equivalency> {
        self.requirements.insert(key, equivalency)
    }

    /// Looks up a requirement.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Equivalency> {
        self.requirements.get(key)
    }

    /// Whether a requirement with this key is registered.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.requirements.contains_key(key)
    }

    /// Iterates over requirements in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Equivalency)> + '_ {
        self.requirements.iter()
    }

    /// The number of registered requirements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    /// Whether no requirements are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Resolves a requirement against a ledger.
    ///
    /// Returns `None` if `key` is not a registered requirement.
    #[must_use]
    pub fn resolve(&self, key: &str, ledger: &Ledger, reference: NaiveDate) -> Option<Status> {
        self.get(key)
            .map(|equivalency| equivalency.resolve(ledger, reference))
    }

    /// Whether `code` is an alias of at least one requirement.
    #[must_use]
    pub fn recognises(&self, code: &CompetencyCode) -> bool {
        self.requirements
            .values()
            .any(|equivalency| equivalency.aliases.contains(code))
    }

    /// Ledger codes that are not an alias of any requirement.
    ///
    /// These codes never affect evaluation; they are reported for data
    /// quality purposes only.
    pub fn unrecognised_codes<'a>(
        &'a self,
        ledger: &'a Ledger,
    ) -> impl Iterator<Item = &'a CompetencyCode> + 'a {
        ledger
            .iter()
            .map(|(code, _)| code)
            .filter(|code| !self.recognises(code))
    }
}
