//! Certification eligibility for field operator training pathways
//!
//! A person's [`Ledger`] of competency codes is resolved against an
//! [`EquivalencyTable`] of requirements, then a [`CertificationGraph`] of
//! derived certifications is evaluated over the result. The catalogue of
//! requirements and certifications is static configuration, loaded once with
//! [`Catalogue`] and compiled into an [`Evaluator`].
//!
//! ```
//! use chrono::NaiveDate;
//! use pathways::{Catalogue, CompetencyCode, Ledger, Status};
//!
//! let evaluator = Catalogue::builtin()?.compile()?;
//!
//! let mut ledger = Ledger::new();
//! ledger.record(
//!     CompetencyCode::try_from("SDC001")?,
//!     NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
//! );
//!
//! let report = evaluator.evaluate(&ledger, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
//! assert_eq!(report.get("stormHeights"), Some(Status::Current));
//! assert_eq!(report.get("stormHeightsOperator"), Some(Status::None));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod domain;
pub use domain::{
    Catalogue, CertificationGraph, Combinator, CompetencyCode, ConfigError, Equivalency,
    EquivalencyTable, Evaluator, ExpiryPolicy, GraphError, Key, Ledger, Node, Status,
    StatusReport,
};

/// Loading people and their ledgers from disk.
pub mod storage;
pub use storage::{Member, Roster, RosterError};
