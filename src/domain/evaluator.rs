//! Per-person evaluation of the full catalogue.
//!
//! An [`Evaluator`] is built once from an [`EquivalencyTable`] and a set of
//! certification definitions. Building it validates the graph and fixes an
//! evaluation plan: one slot per requirement followed by one slot per
//! certification in topological order. Evaluating a ledger fills each slot
//! exactly once, so every certification reads the same memoized value for a
//! shared input.
//!
//! The evaluator holds no interior mutability and may be shared freely across
//! threads.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::instrument;

use crate::domain::{
    CertificationGraph, Combinator, EquivalencyTable, GraphError, Key, Ledger, Node, Status,
    StatusReport,
};

/// One certification in the evaluation plan.
#[derive(Debug, Clone)]
struct Step {
    combinator: Combinator,
    /// Slots of the inputs. Always lower than this step's own slot.
    inputs: Vec<usize>,
}

/// Computes status reports from ledgers.
#[derive(Debug, Clone)]
pub struct Evaluator {
    table: EquivalencyTable,
    graph: CertificationGraph,

    /// Slot names: requirements in key order, then certifications in
    /// evaluation order.
    names: Vec<Key>,
    steps: Vec<Step>,
}

impl Evaluator {
    /// Builds an evaluator over the given requirements and certifications.
    ///
    /// # Errors
    ///
    /// Returns a [`GraphError`] if a certification name is duplicated,
    /// references an undefined input, or takes part in a cycle.
    #[instrument(level = "debug", skip_all, fields(requirements = table.len()))]
    pub fn new(
        table: EquivalencyTable,
        nodes: impl IntoIterator<Item = (Key, Node)>,
    ) -> Result<Self, GraphError> {
        let graph = CertificationGraph::new(table.iter().map(|(key, _)| key.clone()), nodes)?;

        let mut names: Vec<Key> = table.iter().map(|(key, _)| key.clone()).collect();
        let mut slots: BTreeMap<&Key, usize> =
            names.iter().enumerate().map(|(slot, key)| (key, slot)).collect();
        let mut steps = Vec::with_capacity(graph.len());

        for (key, node) in graph.topological_order() {
            let inputs = node
                .inputs
                .iter()
                // The graph guarantees every input is defined and ordered
                // before this node.
                .filter_map(|input| slots.get(input).copied())
                .collect();
            steps.push(Step {
                combinator: node.combinator,
                inputs,
            });
            slots.insert(key, slots.len());
        }

        names.extend(graph.topological_order().map(|(key, _)| key.clone()));

        tracing::debug!(slots = names.len(), "compiled evaluation plan");

        Ok(Self {
            table,
            graph,
            names,
            steps,
        })
    }

    /// The requirements this evaluator resolves.
    #[must_use]
    pub const fn table(&self) -> &EquivalencyTable {
        &self.table
    }

    /// The certification graph this evaluator walks.
    #[must_use]
    pub const fn graph(&self) -> &CertificationGraph {
        &self.graph
    }

    /// Resolves a single requirement, without evaluating certifications.
    ///
    /// Returns `None` if `key` is not a registered requirement.
    #[must_use]
    pub fn resolve(&self, key: &str, ledger: &Ledger, reference: NaiveDate) -> Option<Status> {
        self.table.resolve(key, ledger, reference)
    }

    /// Evaluates every requirement and certification for one ledger.
    ///
    /// `reference` is the date against which expiry windows are measured.
    /// The result depends only on the arguments: equal inputs give equal
    /// reports.
    #[must_use]
    pub fn evaluate(&self, ledger: &Ledger, reference: NaiveDate) -> StatusReport {
        let mut slots: Vec<Status> = Vec::with_capacity(self.names.len());

        slots.extend(
            self.table
                .iter()
                .map(|(_, equivalency)| equivalency.resolve(ledger, reference)),
        );

        for step in &self.steps {
            let status = step.combinator.apply(step.inputs.iter().map(|&slot| slots[slot]));
            slots.push(status);
        }

        tracing::trace!(entries = slots.len(), %reference, "evaluated ledger");

        self.names.iter().cloned().zip(slots).collect()
    }
}
