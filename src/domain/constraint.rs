//! Constraint ordering for siblings
//!
//! Records arrive in order and may name one predecessor ("comes after") and
//! one successor ("comes before"). The sorter turns them into a single
//! sequence: strongly connected components are found with Kosaraju's two
//! passes, then the condensation graph is scheduled with a min-heap keyed by
//! each component's earliest insertion index.
//!
//! Sorting never fails. Members of a cycle are emitted together in insertion
//! order, and ids that were only ever referenced (placeholders) are dropped.
//! Both conditions are reported through [`Diagnostics`] for callers that want
//! to surface them.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// Insertion index of a node that was referenced but never inserted
const PLACEHOLDER: i64 = -1;

const UNASSIGNED: usize = usize::MAX;

#[derive(Debug)]
struct Node<T> {
    id: String,
    order: i64,
    payload: Option<T>,
}

impl<T> Node<T> {
    fn is_placeholder(&self) -> bool {
        self.order == PLACEHOLDER
    }
}

/// Ordering links a record declares on its siblings
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Links {
    /// Predecessor id: this record is emitted after it
    pub after: Option<String>,
    /// Successor id: this record is emitted before it
    pub before: Option<String>,
}

impl Links {
    pub fn new(after: Option<String>, before: Option<String>) -> Self {
        Self { after, before }
    }

    /// Returns true if no link is declared
    pub fn is_empty(&self) -> bool {
        self.after.is_none() && self.before.is_none()
    }
}

/// Cycles and dangling references found while sorting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Ids of each cyclic component, in insertion order (placeholders first)
    pub cycles: Vec<Vec<String>>,
    /// Ids referenced by a link but never inserted
    pub dangling: Vec<String>,
}

impl Diagnostics {
    /// Returns true if nothing was degraded
    pub fn is_clean(&self) -> bool {
        self.cycles.is_empty() && self.dangling.is_empty()
    }
}

/// Ordered payloads plus diagnostics
#[derive(Debug)]
pub struct SortReport<'a, T> {
    pub order: Vec<&'a T>,
    pub diagnostics: Diagnostics,
}

/// Reusable traversal buffers
///
/// Each sort needs a few node-sized vectors. Callers sorting many containers
/// can keep one scratch per thread and hand it to `sort_with`.
#[derive(Debug, Default)]
pub struct SortScratch {
    stack: Vec<(NodeIndex, bool)>,
    pending: Vec<NodeIndex>,
    visited: Vec<bool>,
    finish_order: Vec<NodeIndex>,
    component: Vec<usize>,
}

impl SortScratch {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self, nodes: usize) {
        self.stack.clear();
        self.pending.clear();
        self.finish_order.clear();
        self.visited.clear();
        self.visited.resize(nodes, false);
        self.component.clear();
        self.component.resize(nodes, UNASSIGNED);
    }
}

/// Emission order and component layout of one sort
struct Schedule {
    order: Vec<NodeIndex>,
    cycles: Vec<Vec<NodeIndex>>,
}

/// Sorts arrival-ordered records under after/before constraints
#[derive(Debug)]
pub struct ConstraintSorter<T> {
    /// Node arena; edges point from earlier to later
    graph: DiGraph<Node<T>, ()>,

    /// Map from record id to node index
    node_map: HashMap<String, NodeIndex>,

    next_order: i64,
}

impl<T> Default for ConstraintSorter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ConstraintSorter<T> {
    /// Creates an empty sorter
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
            next_order: 0,
        }
    }

    /// Inserts a record
    ///
    /// `predecessor` adds the edge `predecessor -> id`, `successor` adds
    /// `id -> successor`. Inserting an id again replaces its payload and
    /// insertion index but keeps every edge already attached to it.
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        payload: T,
        predecessor: Option<&str>,
        successor: Option<&str>,
    ) {
        let id = id.into();
        let idx = self.node(&id);

        let order = self.next_order;
        self.next_order += 1;

        let node = &mut self.graph[idx];
        node.order = order;
        node.payload = Some(payload);

        if let Some(pred) = predecessor {
            let pred_idx = self.node(pred);
            self.graph.update_edge(pred_idx, idx, ());
        }

        if let Some(succ) = successor {
            let succ_idx = self.node(succ);
            self.graph.update_edge(idx, succ_idx, ());
        }
    }

    /// Inserts a record using its declared links
    pub fn insert_linked(&mut self, id: impl Into<String>, payload: T, links: &Links) {
        self.insert(id, payload, links.after.as_deref(), links.before.as_deref());
    }

    /// Returns the node for `id`, creating a placeholder if needed
    fn node(&mut self, id: &str) -> NodeIndex {
        if let Some(idx) = self.node_map.get(id) {
            return *idx;
        }

        let idx = self.graph.add_node(Node {
            id: id.to_string(),
            order: PLACEHOLDER,
            payload: None,
        });
        self.node_map.insert(id.to_string(), idx);
        idx
    }

    /// Returns the number of inserted (non-placeholder) records
    pub fn len(&self) -> usize {
        self.graph
            .node_weights()
            .filter(|node| !node.is_placeholder())
            .count()
    }

    /// Returns true if nothing has been inserted
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if `id` was inserted with a payload
    pub fn contains(&self, id: &str) -> bool {
        self.node_map
            .get(id)
            .map(|idx| !self.graph[*idx].is_placeholder())
            .unwrap_or(false)
    }

    /// Returns payloads in constraint order
    pub fn sort(&self) -> Vec<&T> {
        self.sort_with(&mut SortScratch::new())
    }

    /// Returns payloads in constraint order, reusing `scratch`
    pub fn sort_with(&self, scratch: &mut SortScratch) -> Vec<&T> {
        self.schedule(scratch)
            .order
            .into_iter()
            .filter_map(|idx| self.graph[idx].payload.as_ref())
            .collect()
    }

    /// Returns payloads in constraint order along with diagnostics
    pub fn sort_report(&self) -> SortReport<'_, T> {
        self.sort_report_with(&mut SortScratch::new())
    }

    /// Like [`sort_report`](Self::sort_report), reusing `scratch`
    pub fn sort_report_with(&self, scratch: &mut SortScratch) -> SortReport<'_, T> {
        let schedule = self.schedule(scratch);

        let order = schedule
            .order
            .iter()
            .filter_map(|idx| self.graph[*idx].payload.as_ref())
            .collect();

        let cycles = schedule
            .cycles
            .iter()
            .map(|members| {
                members
                    .iter()
                    .map(|idx| self.graph[*idx].id.clone())
                    .collect()
            })
            .collect();

        let dangling = self
            .graph
            .node_weights()
            .filter(|node| node.is_placeholder())
            .map(|node| node.id.clone())
            .collect();

        SortReport {
            order,
            diagnostics: Diagnostics { cycles, dangling },
        }
    }

    /// Consumes the sorter and returns owned payloads in constraint order
    pub fn into_sorted(self) -> Vec<T> {
        let order = self.schedule(&mut SortScratch::new()).order;
        let (nodes, _) = self.graph.into_nodes_edges();
        let mut payloads: Vec<Option<T>> = nodes.into_iter().map(|n| n.weight.payload).collect();

        order
            .into_iter()
            .filter_map(|idx| payloads[idx.index()].take())
            .collect()
    }

    fn schedule(&self, scratch: &mut SortScratch) -> Schedule {
        scratch.reset(self.graph.node_count());

        self.forward_pass(scratch);
        let components = self.backward_pass(scratch);

        // Condensation graph: one node per component
        let count = components.len();
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); count];
        let mut in_degree = vec![0usize; count];

        for edge in self.graph.edge_references() {
            let from = scratch.component[edge.source().index()];
            let to = scratch.component[edge.target().index()];
            if from != to {
                successors[from].push(to);
                in_degree[to] += 1;
            }
        }

        // Members are sorted, so the first one holds the smallest index;
        // a placeholder member keys its whole component at -1
        let keys: Vec<i64> = components
            .iter()
            .map(|members| {
                members
                    .first()
                    .map(|idx| self.graph[*idx].order)
                    .unwrap_or(PLACEHOLDER)
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<(i64, usize)>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(c, _)| Reverse((keys[c], c)))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        let mut cycles = Vec::new();

        while let Some(Reverse((_, c))) = ready.pop() {
            let members = &components[c];

            if members.len() > 1 || self.graph.contains_edge(members[0], members[0]) {
                cycles.push(members.clone());
            }

            order.extend(
                members
                    .iter()
                    .copied()
                    .filter(|idx| !self.graph[*idx].is_placeholder()),
            );

            for &next in &successors[c] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse((keys[next], next)));
                }
            }
        }

        Schedule { order, cycles }
    }

    /// Forward DFS from every node, recording post-order
    fn forward_pass(&self, scratch: &mut SortScratch) {
        for start in self.graph.node_indices() {
            if scratch.visited[start.index()] {
                continue;
            }

            scratch.stack.push((start, false));
            while let Some((node, expanded)) = scratch.stack.pop() {
                if expanded {
                    scratch.finish_order.push(node);
                    continue;
                }
                if scratch.visited[node.index()] {
                    continue;
                }

                scratch.visited[node.index()] = true;
                scratch.stack.push((node, true));

                for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
                    if !scratch.visited[next.index()] {
                        scratch.stack.push((next, false));
                    }
                }
            }
        }
    }

    /// Backward DFS in reverse post-order; each root collects one component
    fn backward_pass(&self, scratch: &mut SortScratch) -> Vec<Vec<NodeIndex>> {
        let mut components: Vec<Vec<NodeIndex>> = Vec::new();

        for i in (0..scratch.finish_order.len()).rev() {
            let root = scratch.finish_order[i];
            if scratch.component[root.index()] != UNASSIGNED {
                continue;
            }

            let id = components.len();
            let mut members = Vec::new();

            scratch.component[root.index()] = id;
            scratch.pending.push(root);

            while let Some(node) = scratch.pending.pop() {
                members.push(node);
                for prev in self.graph.neighbors_directed(node, Direction::Incoming) {
                    if scratch.component[prev.index()] == UNASSIGNED {
                        scratch.component[prev.index()] = id;
                        scratch.pending.push(prev);
                    }
                }
            }

            members.sort_by_key(|idx| (self.graph[*idx].order, idx.index()));
            components.push(members);
        }

        components
    }
}

/// Result of arranging a container's children by their links
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arrangement {
    /// Child ids in constraint order
    pub order: Vec<String>,
    pub diagnostics: Diagnostics,
}

/// Runs the sorter over `(id, links)` pairs given in arrival order
///
/// `scope` names the container in log output.
pub(crate) fn arrange<'a>(
    scope: &str,
    records: impl IntoIterator<Item = (&'a str, &'a Links)>,
    scratch: &mut SortScratch,
) -> Arrangement {
    let mut sorter = ConstraintSorter::new();
    for (id, links) in records {
        sorter.insert_linked(id, id, links);
    }

    let report = sorter.sort_report_with(scratch);

    for cycle in &report.diagnostics.cycles {
        tracing::warn!(scope, members = ?cycle, "ordering cycle, members kept in insertion order");
    }
    for id in &report.diagnostics.dangling {
        tracing::warn!(scope, id = %id, "ordering link points at a missing sibling");
    }
    tracing::debug!(scope, records = sorter.len(), "arranged by links");

    Arrangement {
        order: report.order.into_iter().map(|id| id.to_string()).collect(),
        diagnostics: report.diagnostics,
    }
}
