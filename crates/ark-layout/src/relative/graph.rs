//! Anchor dependency graph of a relative container.
//!
//! Nodes are identified children; an edge `anchor -> dependent` exists for
//! every rule that names a sibling present in the graph. Rules naming the
//! container, or an id that is not a child, are not edges; they only mark
//! the axis as relying on the container size.

use std::collections::VecDeque;

use ark_core::{AlignRules, NodeId};
use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;

/// One identified child.
#[derive(Debug, Clone)]
struct GraphNode {
    node: NodeId,
    rules: AlignRules,
}

/// Dependency graph rebuilt on every measure pass.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Children by id, in child order
    nodes: IndexMap<String, GraphNode>,
    /// anchor id -> ids of the children aligned to it
    relied_on: IndexMap<String, IndexSet<String>>,
    /// Number of distinct sibling anchors per child
    in_degree: IndexMap<String, usize>,
    horizontal_rely_on_container: bool,
    vertical_rely_on_container: bool,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a child. A later child with the same id replaces the
    /// earlier one.
    pub fn insert(&mut self, id: impl Into<String>, node: NodeId, rules: AlignRules) {
        self.nodes.insert(id.into(), GraphNode { node, rules });
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<NodeId> {
        self.nodes.get(id).map(|entry| entry.node)
    }

    pub fn rules(&self, id: &str) -> Option<&AlignRules> {
        self.nodes.get(id).map(|entry| &entry.rules)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Registered ids with their nodes, in child order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.nodes.iter().map(|(id, entry)| (id.as_str(), entry.node))
    }

    /// Ids of the children aligned to `anchor`.
    pub fn dependents(&self, anchor: &str) -> impl Iterator<Item = &str> {
        self.relied_on
            .get(anchor)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn horizontal_rely_on_container(&self) -> bool {
        self.horizontal_rely_on_container
    }

    pub fn vertical_rely_on_container(&self) -> bool {
        self.vertical_rely_on_container
    }

    /// Whether `anchor` resolves to a sibling rather than the container.
    pub fn is_sibling_anchor(&self, anchor: &str) -> bool {
        anchor != ark_core::CONTAINER_ANCHOR && self.contains(anchor)
    }

    /// Build the reverse edges and in-degrees from the registered rules.
    pub fn build_dependencies(&mut self) {
        self.relied_on.clear();
        self.in_degree.clear();
        self.horizontal_rely_on_container = false;
        self.vertical_rely_on_container = false;

        let mut edges: Vec<(String, String)> = Vec::new();
        for (id, entry) in &self.nodes {
            let mut anchors: SmallVec<[&str; 6]> = SmallVec::new();
            for (direction, rule) in &entry.rules {
                if !self.is_sibling_anchor(&rule.anchor) {
                    if direction.is_horizontal() {
                        self.horizontal_rely_on_container = true;
                    } else {
                        self.vertical_rely_on_container = true;
                    }
                    continue;
                }
                edges.push((rule.anchor.clone(), id.clone()));
                if !anchors.contains(&rule.anchor.as_str()) {
                    anchors.push(rule.anchor.as_str());
                }
            }
            self.in_degree.insert(id.clone(), anchors.len());
        }

        for (anchor, dependent) in edges {
            self.relied_on.entry(anchor).or_default().insert(dependent);
        }
    }

    /// Kahn's traversal over a copy of the in-degrees. Returns the visit
    /// order and the ids that never reached in-degree zero.
    fn traverse(&self) -> (Vec<String>, Vec<String>) {
        let mut in_degree = self.in_degree.clone();
        let mut queue: VecDeque<String> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| id.clone())
            .collect();
        let mut order = Vec::with_capacity(in_degree.len());

        while let Some(current) = queue.pop_front() {
            for dependent in self.dependents(&current) {
                let Some(degree) = in_degree.get_mut(dependent) else {
                    continue;
                };
                *degree = degree.saturating_sub(1);
                if *degree == 0 {
                    queue.push_back(dependent.to_string());
                }
            }
            in_degree.shift_remove(&current);
            order.push(current);
        }

        let residual = in_degree.into_keys().collect();
        (order, residual)
    }

    /// `false` if the alignment rules form a cycle.
    pub fn pre_topological_loop_detection(&self) -> bool {
        self.traverse().1.is_empty()
    }

    /// Ids caught in (or downstream of) a cycle.
    pub fn loop_dependent_nodes(&self) -> Vec<String> {
        self.traverse().1
    }

    /// Order in which every anchor precedes its dependents.
    ///
    /// Assumes [`pre_topological_loop_detection`](Self::pre_topological_loop_detection)
    /// passed; nodes in a cycle are left out.
    pub fn topological_sort(&self) -> Vec<String> {
        self.traverse().0
    }
}
