//! Generic directed dependency graph.
//!
//! An edge `a -> b` means "`a` must be ready before `b`". The graph only stores
//! node identities; it never owns or keeps alive the objects behind them.
//!
//! Every iteration order is derived from insertion order (nodes, then each
//! node's outgoing edges), so [`Graph::sort`] is deterministic for the same
//! sequence of mutations.

use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;

/// Nodes that could not be ordered because they sit on, or behind, a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle<N> {
    /// Unordered nodes, in insertion order.
    pub nodes: Vec<N>,
}

/// Directed graph over copyable node identities.
#[derive(Debug, Clone)]
pub struct Graph<N> {
    /// Nodes in insertion order.
    order: Vec<N>,
    /// Outgoing edges per node, in insertion order.
    adjacency: HashMap<N, Vec<N>>,
    edge_count: usize,
}

impl<N> Default for Graph<N> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            adjacency: HashMap::new(),
            edge_count: 0,
        }
    }
}

impl<N: Copy + Eq + Hash> Graph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            order: Vec::with_capacity(capacity),
            adjacency: HashMap::with_capacity(capacity),
            edge_count: 0,
        }
    }

    /// Add a node. Returns `false` if it was already present.
    pub fn add_node(&mut self, node: N) -> bool {
        if self.adjacency.contains_key(&node) {
            return false;
        }
        self.adjacency.insert(node, Vec::new());
        self.order.push(node);
        true
    }

    /// Remove a node together with every edge touching it.
    ///
    /// Returns `false` if the node was not present.
    pub fn remove_node(&mut self, node: &N) -> bool {
        let Some(outgoing) = self.adjacency.remove(node) else {
            return false;
        };
        self.edge_count -= outgoing.len();
        self.order.retain(|n| n != node);

        for targets in self.adjacency.values_mut() {
            let before = targets.len();
            targets.retain(|n| n != node);
            self.edge_count -= before - targets.len();
        }
        true
    }

    pub fn contains(&self, node: &N) -> bool {
        self.adjacency.contains_key(node)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[N] {
        &self.order
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Add the edge `from -> to`.
    ///
    /// Returns `true` only if a new edge was inserted. Self edges, duplicate
    /// edges and edges touching unknown nodes are ignored.
    pub fn connect(&mut self, from: N, to: N) -> bool {
        if from == to || !self.adjacency.contains_key(&to) {
            return false;
        }
        let Some(targets) = self.adjacency.get_mut(&from) else {
            return false;
        };
        if targets.contains(&to) {
            return false;
        }
        targets.push(to);
        self.edge_count += 1;
        true
    }

    /// Remove the edge `from -> to`. Returns `false` if it did not exist.
    pub fn disconnect(&mut self, from: &N, to: &N) -> bool {
        let Some(targets) = self.adjacency.get_mut(from) else {
            return false;
        };
        let Some(position) = targets.iter().position(|n| n == to) else {
            return false;
        };
        targets.remove(position);
        self.edge_count -= 1;
        true
    }

    pub fn has_edge(&self, from: &N, to: &N) -> bool {
        self.adjacency
            .get(from)
            .is_some_and(|targets| targets.contains(to))
    }

    /// Direct dependents of `node`.
    pub fn successors(&self, node: &N) -> &[N] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All edges as `(from, to)` pairs, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (N, N)> + '_ {
        self.order.iter().flat_map(move |from| {
            self.successors(from).iter().map(move |to| (*from, *to))
        })
    }

    /// Drop every edge, keeping the nodes.
    pub fn clear_edges(&mut self) {
        for targets in self.adjacency.values_mut() {
            targets.clear();
        }
        self.edge_count = 0;
    }

    /// A copy of this graph with every edge flipped.
    pub fn reverse(&self) -> Graph<N> {
        let mut reversed = Graph::with_capacity(self.order.len());
        for node in &self.order {
            reversed.add_node(*node);
        }
        for (from, to) in self.edges() {
            reversed.connect(to, from);
        }
        reversed
    }

    /// Every node reachable from `start` by following edges.
    ///
    /// `start` itself is only included when it lies on a cycle.
    pub fn connected(&self, start: &N) -> HashSet<N> {
        let mut visited = HashSet::new();
        let mut queue: VecDeque<N> = self.successors(start).iter().copied().collect();

        while let Some(current) = queue.pop_front() {
            if visited.insert(current) {
                queue.extend(self.successors(&current).iter().copied());
            }
        }
        visited
    }

    /// Topological order of all nodes (Kahn's algorithm).
    ///
    /// Ties are broken by insertion order. Fails with the unordered nodes if
    /// the graph contains a cycle.
    pub fn sort(&self) -> Result<Vec<N>, Cycle<N>> {
        let mut in_degree: HashMap<N, usize> = self.order.iter().map(|n| (*n, 0)).collect();
        for (_, to) in self.edges() {
            if let Some(degree) = in_degree.get_mut(&to) {
                *degree += 1;
            }
        }

        let mut queue: VecDeque<N> = self
            .order
            .iter()
            .copied()
            .filter(|n| in_degree[n] == 0)
            .collect();
        let mut sorted = Vec::with_capacity(self.order.len());

        while let Some(node) = queue.pop_front() {
            sorted.push(node);
            for next in self.successors(&node) {
                if let Some(degree) = in_degree.get_mut(next) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(*next);
                    }
                }
            }
        }

        if sorted.len() != self.order.len() {
            let nodes = self
                .order
                .iter()
                .copied()
                .filter(|n| in_degree[n] > 0)
                .collect();
            return Err(Cycle { nodes });
        }

        Ok(sorted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(len: u32) -> Graph<u32> {
        let mut graph = Graph::new();
        for n in 0..len {
            graph.add_node(n);
        }
        for n in 1..len {
            graph.connect(n - 1, n);
        }
        graph
    }

    fn position(order: &[u32], node: u32) -> usize {
        order.iter().position(|&n| n == node).unwrap()
    }

    #[test]
    fn add_node_is_idempotent() {
        let mut graph = Graph::new();
        assert!(graph.add_node(1));
        assert!(!graph.add_node(1));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn connect_rejects_self_duplicate_and_unknown() {
        let mut graph = chain(2);
        assert!(!graph.connect(0, 0));
        assert!(!graph.connect(0, 1));
        assert!(!graph.connect(0, 7));
        assert!(!graph.connect(7, 0));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn remove_node_drops_incident_edges() {
        let mut graph = chain(3);
        assert!(graph.remove_node(&1));
        assert!(!graph.remove_node(&1));
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.nodes(), &[0, 2]);
        assert!(graph.successors(&0).is_empty());
    }

    #[test]
    fn disconnect_removes_single_edge() {
        let mut graph = chain(3);
        assert!(graph.disconnect(&0, &1));
        assert!(!graph.disconnect(&0, &1));
        assert!(!graph.has_edge(&0, &1));
        assert!(graph.has_edge(&1, &2));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn reverse_flips_every_edge() {
        let graph = chain(3);
        let reversed = graph.reverse();
        assert!(reversed.has_edge(&1, &0));
        assert!(reversed.has_edge(&2, &1));
        assert!(!reversed.has_edge(&0, &1));
        assert_eq!(reversed.edge_count(), graph.edge_count());
        assert_eq!(reversed.nodes(), graph.nodes());
    }

    #[test]
    fn connected_follows_edges_transitively() {
        let mut graph = chain(4);
        graph.add_node(9);
        let reachable = graph.connected(&1);
        assert_eq!(reachable, HashSet::from([2, 3]));
        assert!(graph.connected(&9).is_empty());
    }

    #[test]
    fn connected_includes_start_on_cycle() {
        let mut graph = chain(2);
        graph.connect(1, 0);
        assert_eq!(graph.connected(&0), HashSet::from([0, 1]));
    }

    #[test]
    fn sort_linear_chain() {
        assert_eq!(chain(4).sort().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn sort_diamond() {
        //     0
        //    / \
        //   1   2
        //    \ /
        //     3
        let mut graph = Graph::new();
        for n in 0..4 {
            graph.add_node(n);
        }
        graph.connect(0, 1);
        graph.connect(0, 2);
        graph.connect(1, 3);
        graph.connect(2, 3);

        let order = graph.sort().unwrap();
        assert_eq!(order[0], 0);
        assert_eq!(order[3], 3);
        for (from, to) in graph.edges() {
            assert!(position(&order, from) < position(&order, to));
        }
    }

    #[test]
    fn sort_breaks_ties_by_insertion_order() {
        let mut graph = Graph::new();
        for n in [5, 3, 8, 1] {
            graph.add_node(n);
        }
        graph.connect(1, 3);
        assert_eq!(graph.sort().unwrap(), vec![5, 8, 1, 3]);
        assert_eq!(graph.sort().unwrap(), graph.clone().sort().unwrap());
    }

    #[test]
    fn sort_detects_two_node_cycle() {
        let mut graph = chain(2);
        graph.connect(1, 0);
        assert_eq!(graph.sort(), Err(Cycle { nodes: vec![0, 1] }));
    }

    #[test]
    fn sort_reports_nodes_behind_cycle() {
        // 3 is independent, 0 -> 1 -> 2 -> 0 is a cycle
        let mut graph = chain(3);
        graph.connect(2, 0);
        graph.add_node(3);

        let cycle = graph.sort().unwrap_err();
        assert_eq!(cycle.nodes, vec![0, 1, 2]);
    }

    #[test]
    fn clear_edges_keeps_nodes() {
        let mut graph = chain(3);
        graph.clear_edges();
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.edges().count(), 0);
    }
}
