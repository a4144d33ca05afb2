//! Domain models for certification eligibility.
//!
//! This module contains the status lattice, ledgers, the equivalency table
//! that resolves requirements, the certification graph, and the catalogue
//! from which they are built.

/// The three-valued status lattice and its combinators.
pub mod status;
pub use status::Status;

mod name;
pub use name::{CompetencyCode, InvalidCodeError, InvalidKeyError, Key};

mod ledger;
pub use ledger::Ledger;

pub mod equivalency;
pub use equivalency::{Equivalency, EquivalencyTable, ExpiryPolicy};

pub mod graph;
pub use graph::{CertificationGraph, Combinator, GraphError, Node};

mod report;
pub use report::StatusReport;

pub mod evaluator;
pub use evaluator::Evaluator;

mod catalogue;
pub use catalogue::{CertificationDefinition, Catalogue, ConfigError, RequirementDefinition};
