use std::{borrow::Borrow, fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};

/// A competency code issued by a training system.
///
/// Codes are opaque: any non-blank text is accepted, for example `HLTAID011`,
/// `BEA002` or `PUA-30613`. Surrounding whitespace is dropped. Codes are
/// case-sensitive; callers taking user input should normalise to uppercase
/// first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompetencyCode(NonEmptyString);

impl CompetencyCode {
    /// Creates a new `CompetencyCode` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCodeError`] if the string is empty or only whitespace.
    pub fn new(s: String) -> Result<Self, InvalidCodeError> {
        let trimmed = s.trim();
        let s = if trimmed.len() == s.len() {
            s
        } else {
            trimmed.to_owned()
        };

        NonEmptyString::new(s).map(Self).map_err(InvalidCodeError)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Error returned when a competency code is malformed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid competency code '{0}': must not be blank")]
pub struct InvalidCodeError(String);

/// The canonical name of a requirement or a derived certification.
///
/// Requirements and certifications share one namespace. Names are non-empty
/// and may contain ASCII letters, digits, `_` and `-`, for example `firstAid`
/// or `stormGroundOperator`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key(NonEmptyString);

impl Key {
    /// Creates a new `Key` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidKeyError`] if the string is empty or contains
    /// characters other than ASCII letters, digits, `_` and `-`.
    pub fn new(s: String) -> Result<Self, InvalidKeyError> {
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(InvalidKeyError(s));
        }

        NonEmptyString::new(s).map(Self).map_err(InvalidKeyError)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Error returned when a requirement or certification name is malformed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid name '{0}': must be non-empty and contain only ASCII letters, digits, '_' or '-'")]
pub struct InvalidKeyError(String);

macro_rules! string_newtype {
    ($ty:ident, $err:ident) => {
        impl TryFrom<String> for $ty {
            type Error = $err;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $ty {
            type Error = $err;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value.to_string())
            }
        }

        impl FromStr for $ty {
            type Err = $err;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s.to_string())
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0.as_str().to_owned()
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl Borrow<str> for $ty {
            fn borrow(&self) -> &str {
                self.as_str()
            }
        }

        impl Deref for $ty {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_newtype!(CompetencyCode, InvalidCodeError);
string_newtype!(Key, InvalidKeyError);
