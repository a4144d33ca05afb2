use std::{
    io,
    path::{Path, PathBuf},
};

use borsh::BorshSerialize;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::instrument;

use crate::domain::{
    Combinator, CompetencyCode, Equivalency, EquivalencyTable, Evaluator, ExpiryPolicy,
    GraphError, Key, Node,
};

/// The field operator pathway, compiled into the binary.
const BUILTIN: &str = include_str!("../../catalogue/field-operator.toml");

/// The declarative definition of every requirement and certification.
///
/// A catalogue is plain data. [`Catalogue::compile`] validates it and produces
/// an [`Evaluator`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Catalogue {
    requirements: Vec<RequirementDefinition>,
    certifications: Vec<CertificationDefinition>,
}

/// A training requirement and the codes accepted as evidence for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementDefinition {
    /// Canonical name of the requirement.
    pub key: Key,

    /// Human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Competency codes accepted as interchangeable evidence.
    pub aliases: Vec<CompetencyCode>,

    /// Validity window in years. Evidence never lapses if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_years: Option<u32>,
}

/// A derived certification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificationDefinition {
    /// Canonical name of the certification.
    pub name: Key,

    /// Human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// How the inputs combine.
    pub combinator: Combinator,

    /// Names of requirements or other certifications.
    #[serde(default)]
    pub inputs: Vec<Key>,
}

/// Errors raised while loading or compiling a catalogue.
///
/// These are configuration faults and should abort start-up.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The catalogue file could not be read.
    #[error("failed to read catalogue '{}': {source}", path.display())]
    Read {
        /// The path that was read.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The catalogue is not valid TOML or does not match the schema.
    #[error("failed to parse catalogue: {0}")]
    Parse(#[from] toml::de::Error),

    /// Two requirements share a key.
    #[error("requirement '{0}' is defined more than once")]
    DuplicateRequirement(Key),

    /// A requirement lists no alias codes and could never be satisfied.
    #[error("requirement '{0}' has no alias codes")]
    EmptyAliasSet(Key),

    /// The certification graph is malformed.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl Catalogue {
    /// Creates a catalogue from definitions.
    #[must_use]
    pub const fn new(
        requirements: Vec<RequirementDefinition>,
        certifications: Vec<CertificationDefinition>,
    ) -> Self {
        Self {
            requirements,
            certifications,
        }
    }

    /// Loads a catalogue from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid. The catalogue is not compiled.
    #[instrument]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a catalogue from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not a valid catalogue.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// The embedded field operator pathway.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the embedded catalogue is malformed.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_toml_str(BUILTIN)
    }

    /// Requirement definitions, in declaration order.
    #[must_use]
    pub fn requirements(&self) -> &[RequirementDefinition] {
        &self.requirements
    }

    /// Certification definitions, in declaration order.
    #[must_use]
    pub fn certifications(&self) -> &[CertificationDefinition] {
        &self.certifications
    }

    /// Looks up a requirement definition.
    #[must_use]
    pub fn requirement(&self, key: &str) -> Option<&RequirementDefinition> {
        self.requirements.iter().find(|r| r.key.as_str() == key)
    }

    /// Looks up a certification definition.
    #[must_use]
    pub fn certification(&self, name: &str) -> Option<&CertificationDefinition> {
        self.certifications.iter().find(|c| c.name.as_str() == name)
    }

    /// The title of a requirement or certification, falling back to its name.
    #[must_use]
    pub fn title<'a>(&'a self, name: &'a str) -> &'a str {
        self.requirement(name)
            .and_then(|r| r.title.as_deref())
            .or_else(|| self.certification(name).and_then(|c| c.title.as_deref()))
            .unwrap_or(name)
    }

    /// Validates the catalogue and builds an [`Evaluator`].
    ///
    /// # Errors
    ///
    /// Returns an error if a requirement key is duplicated, a requirement has
    /// no aliases, or the certification graph is malformed (duplicate names,
    /// undefined inputs, cycles).
    #[instrument(level = "debug", skip(self))]
    pub fn compile(&self) -> Result<Evaluator, ConfigError> {
        let mut table = EquivalencyTable::default();

        for requirement in &self.requirements {
            if requirement.aliases.is_empty() {
                return Err(ConfigError::EmptyAliasSet(requirement.key.clone()));
            }

            let mut equivalency = Equivalency::new(requirement.aliases.iter().cloned());
            if let Some(years) = requirement.expiry_years {
                equivalency = equivalency.with_expiry(ExpiryPolicy::years(years));
            }

            if table.insert(requirement.key.clone(), equivalency).is_some() {
                return Err(ConfigError::DuplicateRequirement(requirement.key.clone()));
            }
        }

        let nodes = self.certifications.iter().map(|certification| {
            (
                certification.name.clone(),
                Node {
                    combinator: certification.combinator,
                    inputs: certification.inputs.clone(),
                },
            )
        });

        Ok(Evaluator::new(table, nodes)?)
    }

    /// A SHA-256 fingerprint of the catalogue's semantics.
    ///
    /// Titles and declaration order do not contribute, so the fingerprint
    /// changes only when the evaluation rules change. Attach it to reports to
    /// record which version of the rules produced them.
    ///
    /// # Panics
    ///
    /// Panics if borsh serialization fails (which should never happen for this
    /// data structure).
    #[must_use]
    pub fn fingerprint(&self) -> String {
        #[derive(BorshSerialize)]
        struct FingerprintData<'a> {
            requirements: Vec<(&'a str, Vec<&'a str>, Option<u32>)>,
            certifications: Vec<(&'a str, Combinator, Vec<&'a str>)>,
        }

        let mut requirements: Vec<_> = self
            .requirements
            .iter()
            .map(|r| {
                let mut aliases: Vec<_> = r.aliases.iter().map(CompetencyCode::as_str).collect();
                aliases.sort_unstable();
                aliases.dedup();
                (r.key.as_str(), aliases, r.expiry_years)
            })
            .collect();
        requirements.sort_unstable();

        let mut certifications: Vec<_> = self
            .certifications
            .iter()
            .map(|c| {
                (
                    c.name.as_str(),
                    c.combinator,
                    c.inputs.iter().map(Key::as_str).collect(),
                )
            })
            .collect();
        certifications.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let data = FingerprintData {
            requirements,
            certifications,
        };

        let encoded = borsh::to_vec(&data).expect("this should never fail");
        let hash = Sha256::digest(encoded);
        format!("{hash:x}")
    }
}

/// The serialized versions of the catalogue.
///
/// Lets the file format evolve independently of the domain type.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default, rename = "requirement", skip_serializing_if = "Vec::is_empty")]
        requirements: Vec<RequirementDefinition>,

        #[serde(default, rename = "certification", skip_serializing_if = "Vec::is_empty")]
        certifications: Vec<CertificationDefinition>,
    },
}

impl From<Versions> for Catalogue {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                requirements,
                certifications,
            } => Self {
                requirements,
                certifications,
            },
        }
    }
}

impl From<Catalogue> for Versions {
    fn from(catalogue: Catalogue) -> Self {
        Self::V1 {
            requirements: catalogue.requirements,
            certifications: catalogue.certifications,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const STORM: &str = r#"
_version = "1"

[[requirement]]
key = "firstAid"
title = "First Aid"
aliases = ["HLTAID011"]
expiry_years = 3

[[requirement]]
key = "stormGround"
aliases = ["SDC001"]

[[certification]]
name = "stormGroundOperator"
title = "Storm Ground Operator"
combinator = "and"
inputs = ["firstAid", "stormGround"]
"#;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(STORM.as_bytes()).unwrap();

        let catalogue = Catalogue::load(file.path()).unwrap();

        assert_eq!(catalogue.requirements().len(), 2);
        assert_eq!(catalogue.certifications().len(), 1);
        assert_eq!(catalogue.requirement("firstAid").unwrap().expiry_years, Some(3));
        assert_eq!(catalogue.title("stormGroundOperator"), "Storm Ground Operator");
        assert_eq!(catalogue.title("stormGround"), "stormGround");
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Catalogue::load(&missing).unwrap_err();
        assert!(matches!(error, ConfigError::Read { .. }));
        assert!(error.to_string().starts_with("failed to read catalogue"));
    }

    #[test]
    fn parse_rejects_blank_codes() {
        let error = Catalogue::from_toml_str(
            "_version = \"1\"\n[[requirement]]\nkey = \"x\"\naliases = [\"  \"]\n",
        )
        .unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn empty_file_is_empty_catalogue() {
        let catalogue = Catalogue::from_toml_str(r#"_version = "1""#).unwrap();
        assert_eq!(catalogue, Catalogue::default());
    }

    #[test]
    fn compile_rejects_duplicate_requirements() {
        let text = format!("{STORM}\n[[requirement]]\nkey = \"firstAid\"\naliases = [\"SFC001\"]\n");
        let error = Catalogue::from_toml_str(&text).unwrap().compile().unwrap_err();
        assert!(matches!(error, ConfigError::DuplicateRequirement(key) if key.as_str() == "firstAid"));
    }

    #[test]
    fn compile_rejects_empty_alias_set() {
        let text = "_version = \"1\"\n[[requirement]]\nkey = \"nothing\"\naliases = []\n";
        let error = Catalogue::from_toml_str(text).unwrap().compile().unwrap_err();
        assert!(matches!(error, ConfigError::EmptyAliasSet(_)));
    }

    #[test]
    fn compile_rejects_cycles() {
        let text = r#"
_version = "1"

[[certification]]
name = "a"
combinator = "and"
inputs = ["b"]

[[certification]]
name = "b"
combinator = "or"
inputs = ["a"]
"#;
        let error = Catalogue::from_toml_str(text).unwrap().compile().unwrap_err();
        assert!(matches!(error, ConfigError::Graph(GraphError::Cycle(_))));
    }

    #[test]
    fn fingerprint_ignores_titles_and_order() {
        let catalogue = Catalogue::from_toml_str(STORM).unwrap();

        let mut reordered = catalogue.clone();
        reordered.requirements.reverse();
        for requirement in &mut reordered.requirements {
            requirement.title = None;
        }

        assert_eq!(catalogue.fingerprint(), reordered.fingerprint());

        let mut changed = catalogue.clone();
        changed.requirements[0].expiry_years = Some(2);
        assert_ne!(catalogue.fingerprint(), changed.fingerprint());
    }

    #[test]
    fn round_trips_through_toml() {
        let catalogue = Catalogue::from_toml_str(STORM).unwrap();
        let text = toml::to_string_pretty(&catalogue).unwrap();
        assert_eq!(Catalogue::from_toml_str(&text).unwrap(), catalogue);
    }
}
