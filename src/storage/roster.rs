//! YAML rosters of people and their competency observations.
//!
//! A roster is the hand-off point from whatever ingestion process produced
//! the data. Each member lists raw observations; repeated codes are folded
//! into the member's [`Ledger`] keeping the latest date.
//!
//! ```yaml
//! - id: "40123"
//!   name: Jane Citizen
//!   competencies:
//!     - code: BEA002
//!       date: 2023-04-01
//!     - code: hltaid011
//!       date: 2024-02-12
//! ```

use std::{
    collections::BTreeSet,
    io,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::domain::{CompetencyCode, InvalidCodeError, Ledger};

/// One person and their ledger.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawMember")]
pub struct Member {
    /// Identifier assigned by the source system.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Most recent achievement date of each code.
    pub ledger: Ledger,
}

#[derive(Debug, Deserialize)]
struct RawMember {
    id: String,
    name: String,
    #[serde(default)]
    competencies: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    code: String,
    date: NaiveDate,
}

impl TryFrom<RawMember> for Member {
    type Error = InvalidCodeError;

    fn try_from(raw: RawMember) -> Result<Self, Self::Error> {
        let ledger = raw
            .competencies
            .into_iter()
            .map(|observation| {
                CompetencyCode::new(observation.code.to_uppercase())
                    .map(|code| (code, observation.date))
            })
            .collect::<Result<Ledger, _>>()?;

        Ok(Self {
            id: raw.id,
            name: raw.name,
            ledger,
        })
    }
}

/// Errors raised while loading a roster.
#[derive(Debug, Error)]
pub enum RosterError {
    /// The roster file could not be read.
    #[error("failed to read roster '{}': {source}", path.display())]
    Read {
        /// The path that was read.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The roster is not valid YAML or does not match the schema.
    #[error("failed to parse roster: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Two members share an identifier.
    #[error("member '{0}' appears more than once")]
    DuplicateMember(String),
}

/// A list of members, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    members: Vec<Member>,
}

impl Roster {
    /// Loads a roster from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a valid roster, or
    /// lists the same member id twice.
    #[instrument]
    pub fn load(path: &Path) -> Result<Self, RosterError> {
        let content = std::fs::read_to_string(path).map_err(|source| RosterError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let roster = Self::from_yaml_str(&content)?;
        tracing::debug!(members = roster.len(), "loaded roster");
        Ok(roster)
    }

    /// Parses a roster from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid roster or lists the same
    /// member id twice.
    pub fn from_yaml_str(content: &str) -> Result<Self, RosterError> {
        let members: Vec<Member> = serde_yaml::from_str(content)?;

        let mut seen = BTreeSet::new();
        for member in &members {
            if !seen.insert(member.id.as_str()) {
                return Err(RosterError::DuplicateMember(member.id.clone()));
            }
        }

        Ok(Self { members })
    }

    /// The members, in file order.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// The number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the roster has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl FromIterator<Member> for Roster {
    fn from_iter<T: IntoIterator<Item = Member>>(iter: T) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}
