//! The three-valued status lattice.
//!
//! Every requirement and certification resolves to one of three states,
//! totally ordered `None < Expired < Current`. Combining statuses with
//! [`and`] takes the minimum, [`or`] takes the maximum. Both are monotonic, so
//! adding evidence to a ledger can never lower a derived status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The status of a requirement or certification for one person.
///
/// Variants are declared in rank order, so the derived [`Ord`] is the
/// lattice order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// No evidence is held.
    #[default]
    None,
    /// Evidence is held, but its validity window has lapsed.
    Expired,
    /// Evidence is held and valid.
    Current,
}

impl Status {
    /// Returns `true` if the status is [`Status::Current`].
    #[must_use]
    pub const fn is_current(self) -> bool {
        matches!(self, Self::Current)
    }

    /// The meet of two statuses.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        self.min(other)
    }

    /// The join of two statuses.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        self.max(other)
    }

    /// Upper-case label, as serialised.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Expired => "EXPIRED",
            Self::Current => "CURRENT",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AND over any number of statuses.
///
/// Returns the lowest-ranked input, or [`Status::Current`] (the identity) if
/// there are none.
pub fn and(statuses: impl IntoIterator<Item = Status>) -> Status {
    statuses.into_iter().fold(Status::Current, Status::and)
}

/// OR over any number of statuses.
///
/// Returns the highest-ranked input, or [`Status::None`] (the identity) if
/// there are none.
pub fn or(statuses: impl IntoIterator<Item = Status>) -> Status {
    statuses.into_iter().fold(Status::None, Status::or)
}
