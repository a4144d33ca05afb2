//! The certification dependency graph.
//!
//! The [`CertificationGraph`] knows nothing about ledgers or dates. It holds
//! the named derived certifications, each an AND or OR over other names, and
//! a topological order fixed when the graph is built.
//!
//! Edges point from an input to the certification that consumes it, so a
//! topological order lists every input before its dependents.

use std::collections::BTreeMap;

use petgraph::{
    Direction,
    algo::{tarjan_scc, toposort},
    graph::{DiGraph, NodeIndex},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::domain::{Key, Status, status};

/// How a certification combines the statuses of its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, borsh::BorshSerialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// All inputs are required; the result is the lowest input status.
    And,
    /// Any input suffices; the result is the highest input status.
    Or,
}

impl Combinator {
    /// Applies the combinator to a sequence of statuses.
    pub fn apply(self, statuses: impl IntoIterator<Item = Status>) -> Status {
        match self {
            Self::And => status::and(statuses),
            Self::Or => status::or(statuses),
        }
    }
}

/// A derived certification: a combinator over named inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// How the inputs combine.
    pub combinator: Combinator,
    /// Names of requirements or other certifications.
    pub inputs: Vec<Key>,
}

impl Node {
    /// An AND over the given inputs.
    #[must_use]
    pub fn and(inputs: impl IntoIterator<Item = Key>) -> Self {
        Self {
            combinator: Combinator::And,
            inputs: inputs.into_iter().collect(),
        }
    }

    /// An OR over the given inputs.
    #[must_use]
    pub fn or(inputs: impl IntoIterator<Item = Key>) -> Self {
        Self {
            combinator: Combinator::Or,
            inputs: inputs.into_iter().collect(),
        }
    }
}

/// Errors detected while building a [`CertificationGraph`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// Two definitions share a name.
    #[error("'{0}' is defined more than once")]
    DuplicateName(Key),
    /// A certification references a name that is not defined.
    #[error("certification '{node}' references undefined input '{input}'")]
    UndefinedInput {
        /// The certification with the dangling reference.
        node: Key,
        /// The undefined input name.
        input: Key,
    },
    /// Certifications depend on each other in a cycle.
    #[error("certifications form a cycle: {}", join(.0))]
    Cycle(Vec<Key>),
}

fn join(keys: &[Key]) -> String {
    keys.iter()
        .map(Key::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// What a vertex of the graph stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Vertex {
    /// A requirement, resolved from a ledger.
    Leaf(Key),
    /// A derived certification.
    Derived(Key, Node),
}

impl Vertex {
    const fn key(&self) -> &Key {
        match self {
            Self::Leaf(key) | Self::Derived(key, _) => key,
        }
    }
}

/// A validated, acyclic graph of derived certifications.
#[derive(Debug, Clone)]
pub struct CertificationGraph {
    graph: DiGraph<Vertex, ()>,

    /// Lookup from name to vertex, for leaves and certifications alike.
    index: BTreeMap<Key, NodeIndex>,

    /// Derived certifications, each listed after all of its inputs.
    order: Vec<NodeIndex>,
}

impl CertificationGraph {
    /// Builds a graph over the given leaf requirements and certifications.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateName`] if a name is defined twice
    /// (including a certification sharing a leaf's name),
    /// [`GraphError::UndefinedInput`] if an input names nothing, or
    /// [`GraphError::Cycle`] if certifications depend on each other
    /// cyclically.
    #[instrument(level = "debug", skip_all)]
    pub fn new(
        leaves: impl IntoIterator<Item = Key>,
        nodes: impl IntoIterator<Item = (Key, Node)>,
    ) -> Result<Self, GraphError> {
        let mut graph = DiGraph::new();
        let mut index = BTreeMap::new();

        for vertex in leaves
            .into_iter()
            .map(Vertex::Leaf)
            .chain(nodes.into_iter().map(|(key, node)| Vertex::Derived(key, node)))
        {
            let key = vertex.key().clone();
            if index.contains_key(&key) {
                return Err(GraphError::DuplicateName(key));
            }
            let idx = graph.add_node(vertex);
            index.insert(key, idx);
        }

        let mut edges = Vec::new();
        for idx in graph.node_indices() {
            if let Vertex::Derived(key, node) = &graph[idx] {
                for input in &node.inputs {
                    let &from = index.get(input).ok_or_else(|| GraphError::UndefinedInput {
                        node: key.clone(),
                        input: input.clone(),
                    })?;
                    edges.push((from, idx));
                }
            }
        }
        for (from, to) in edges {
            graph.add_edge(from, to, ());
        }

        let sorted = toposort(&graph, None).map_err(|_| GraphError::Cycle(cycle(&graph)))?;
        let order: Vec<_> = sorted
            .into_iter()
            .filter(|&idx| matches!(graph[idx], Vertex::Derived(..)))
            .collect();

        tracing::debug!(
            vertices = graph.node_count(),
            certifications = order.len(),
            "built certification graph"
        );

        Ok(Self {
            graph,
            index,
            order,
        })
    }

    /// Whether `name` is a leaf requirement or a certification in this graph.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Looks up a derived certification by name.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&Node> {
        match &self.graph[*self.index.get(name)?] {
            Vertex::Derived(_, node) => Some(node),
            Vertex::Leaf(_) => None,
        }
    }

    /// Whether `name` is a leaf requirement.
    #[must_use]
    pub fn is_leaf(&self, name: &str) -> bool {
        self.index
            .get(name)
            .is_some_and(|&idx| matches!(self.graph[idx], Vertex::Leaf(_)))
    }

    /// Derived certifications in evaluation order: every certification is
    /// preceded by all of its inputs.
    pub fn topological_order(&self) -> impl Iterator<Item = (&Key, &Node)> + '_ {
        self.order.iter().filter_map(|&idx| match &self.graph[idx] {
            Vertex::Derived(key, node) => Some((key, node)),
            Vertex::Leaf(_) => None,
        })
    }

    /// The number of derived certifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the graph has no derived certifications.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Names that take `name` as a direct input, sorted and de-duplicated.
    #[must_use]
    pub fn dependents(&self, name: &str) -> Vec<&Key> {
        let Some(&idx) = self.index.get(name) else {
            return Vec::new();
        };

        let mut dependents: Vec<_> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|dependent| self.graph[dependent].key())
            .collect();
        dependents.sort();
        dependents.dedup();
        dependents
    }

    /// The length of the longest chain of certifications above any leaf.
    ///
    /// A graph with no certifications has depth zero.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depths = vec![0; self.graph.node_count()];

        for &idx in &self.order {
            depths[idx.index()] = 1 + self
                .graph
                .neighbors_directed(idx, Direction::Incoming)
                .map(|input| depths[input.index()])
                .max()
                .unwrap_or(0);
        }

        depths.into_iter().max().unwrap_or(0)
    }
}

/// Finds the members of one cycle, sorted by name.
fn cycle(graph: &DiGraph<Vertex, ()>) -> Vec<Key> {
    for component in tarjan_scc(graph) {
        let cyclic = component.len() > 1
            || component
                .first()
                .is_some_and(|&idx| graph.contains_edge(idx, idx));

        if cyclic {
            let mut keys: Vec<_> = component
                .into_iter()
                .map(|idx| graph[idx].key().clone())
                .collect();
            keys.sort();
            return keys;
        }
    }

    Vec::new()
}
