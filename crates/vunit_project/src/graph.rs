//! File-level dependency graph.
//!
//! An edge `a -> b` means `a` depends on `b`: `b` must be compiled first.
//! Nodes keep their insertion order, which the project chooses to be library
//! order followed by file insertion order; every traversal visits neighbours
//! in that order so results are reproducible.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::source_file::SourceFileId;

/// Files that depend on each other in a loop, in dependency order with the
/// first file repeated at the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// The loop, e.g. `[a, b, a]` for `a` depending on `b` depending on `a`.
    pub chain: Vec<SourceFileId>,
}

/// Directed graph over source files.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<SourceFileId, ()>,
    nodes: HashMap<SourceFileId, NodeIndex>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

impl DependencyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `file` as a node; returns `false` if it was already present.
    pub fn add_node(&mut self, file: SourceFileId) -> bool {
        if self.nodes.contains_key(&file) {
            return false;
        }
        let index = self.graph.add_node(file);
        self.nodes.insert(file, index);
        true
    }

    /// Records that `file` depends on `depends_on`, adding missing nodes.
    ///
    /// Returns `true` if the edge is new. Self-dependencies are ignored.
    pub fn add_dependency(&mut self, file: SourceFileId, depends_on: SourceFileId) -> bool {
        if file == depends_on {
            return false;
        }
        self.add_node(file);
        self.add_node(depends_on);
        let (from, to) = (self.nodes[&file], self.nodes[&depends_on]);
        if self.graph.contains_edge(from, to) {
            return false;
        }
        self.graph.add_edge(from, to, ());
        true
    }

    /// Returns `true` if `file` is a node.
    pub fn contains(&self, file: SourceFileId) -> bool {
        self.nodes.contains_key(&file)
    }

    /// Number of files.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of dependency edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Files in insertion order.
    pub fn files(&self) -> impl Iterator<Item = SourceFileId> + '_ {
        self.graph.node_indices().map(|n| self.graph[n])
    }

    /// Files `file` depends on directly.
    pub fn direct_dependencies(&self, file: SourceFileId) -> Vec<SourceFileId> {
        self.neighbours(file, Direction::Outgoing)
    }

    /// Files that depend on `file` directly.
    pub fn direct_dependents(&self, file: SourceFileId) -> Vec<SourceFileId> {
        self.neighbours(file, Direction::Incoming)
    }

    /// Every file reachable from `files` by following dependencies, excluding
    /// the starting files unless a cycle leads back to them.
    pub fn get_dependencies(&self, files: &[SourceFileId]) -> HashSet<SourceFileId> {
        self.reachable(files, Direction::Outgoing)
    }

    /// Every file that transitively depends on one of `files`, excluding the
    /// starting files unless a cycle leads back to them.
    pub fn get_dependents(&self, files: &[SourceFileId]) -> HashSet<SourceFileId> {
        self.reachable(files, Direction::Incoming)
    }

    /// Orders all files so each comes after everything it depends on.
    ///
    /// Depth-first over nodes in insertion order, visiting dependencies in
    /// insertion order, emitting each file once its dependencies are done.
    pub fn toposort(&self) -> Result<Vec<SourceFileId>, Cycle> {
        let mut marks = vec![Mark::Unvisited; self.graph.node_count()];
        let mut order = Vec::with_capacity(self.graph.node_count());

        for start in self.graph.node_indices() {
            if marks[start.index()] != Mark::Unvisited {
                continue;
            }
            marks[start.index()] = Mark::InProgress;
            let mut stack = vec![(start, self.sorted_neighbours(start, Direction::Outgoing), 0)];

            while let Some((node, deps, next)) = stack.last_mut() {
                let Some(&dep) = deps.get(*next) else {
                    marks[node.index()] = Mark::Done;
                    order.push(self.graph[*node]);
                    stack.pop();
                    continue;
                };
                *next += 1;
                match marks[dep.index()] {
                    Mark::Unvisited => {
                        marks[dep.index()] = Mark::InProgress;
                        stack.push((dep, self.sorted_neighbours(dep, Direction::Outgoing), 0));
                    }
                    Mark::InProgress => {
                        let from = stack.iter().position(|(n, _, _)| *n == dep).unwrap_or(0);
                        let chain = stack[from..]
                            .iter()
                            .map(|(n, _, _)| self.graph[*n])
                            .chain(std::iter::once(self.graph[dep]))
                            .collect();
                        return Err(Cycle { chain });
                    }
                    Mark::Done => {}
                }
            }
        }
        Ok(order)
    }

    fn neighbours(&self, file: SourceFileId, direction: Direction) -> Vec<SourceFileId> {
        self.nodes.get(&file).map_or_else(Vec::new, |&n| {
            self.sorted_neighbours(n, direction)
                .into_iter()
                .map(|m| self.graph[m])
                .collect()
        })
    }

    fn sorted_neighbours(&self, node: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut neighbours: Vec<NodeIndex> =
            self.graph.neighbors_directed(node, direction).collect();
        neighbours.sort();
        neighbours
    }

    fn reachable(&self, files: &[SourceFileId], direction: Direction) -> HashSet<SourceFileId> {
        let mut seen = HashSet::new();
        let mut stack: Vec<NodeIndex> = files
            .iter()
            .filter_map(|f| self.nodes.get(f).copied())
            .collect();
        let mut expanded = HashSet::new();
        while let Some(node) = stack.pop() {
            if !expanded.insert(node) {
                continue;
            }
            for next in self.graph.neighbors_directed(node, direction) {
                if seen.insert(self.graph[next]) {
                    stack.push(next);
                }
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> SourceFileId {
        SourceFileId::from_raw(n)
    }

    fn graph(nodes: u32, edges: &[(u32, u32)]) -> DependencyGraph {
        let mut g = DependencyGraph::new();
        for n in 0..nodes {
            g.add_node(id(n));
        }
        for &(a, b) in edges {
            g.add_dependency(id(a), id(b));
        }
        g
    }

    fn position(order: &[SourceFileId], n: u32) -> usize {
        order.iter().position(|f| *f == id(n)).unwrap()
    }

    #[test]
    fn toposort_places_dependencies_first() {
        // 0 depends on 2, 2 depends on 1, 3 depends on 0.
        let g = graph(4, &[(0, 2), (2, 1), (3, 0)]);
        let order = g.toposort().unwrap();
        assert_eq!(order, vec![id(1), id(2), id(0), id(3)]);
    }

    #[test]
    fn toposort_keeps_insertion_order_for_independent_files() {
        let g = graph(4, &[]);
        assert_eq!(g.toposort().unwrap(), vec![id(0), id(1), id(2), id(3)]);
    }

    #[test]
    fn toposort_is_deterministic() {
        let g = graph(5, &[(4, 0), (4, 3), (1, 3), (2, 0)]);
        let first = g.toposort().unwrap();
        for _ in 0..5 {
            assert_eq!(g.toposort().unwrap(), first);
        }
        assert!(position(&first, 0) < position(&first, 4));
        assert!(position(&first, 3) < position(&first, 4));
        assert!(position(&first, 3) < position(&first, 1));
    }

    #[test]
    fn cycle_reports_chain_in_dependency_order() {
        let g = graph(3, &[(0, 1), (1, 2), (2, 0)]);
        let cycle = g.toposort().unwrap_err();
        assert_eq!(cycle.chain, vec![id(0), id(1), id(2), id(0)]);
    }

    #[test]
    fn cycle_not_through_start_node() {
        let g = graph(3, &[(0, 1), (1, 2), (2, 1)]);
        let cycle = g.toposort().unwrap_err();
        assert_eq!(cycle.chain, vec![id(1), id(2), id(1)]);
    }

    #[test]
    fn self_and_duplicate_edges_are_ignored() {
        let mut g = graph(2, &[]);
        assert!(!g.add_dependency(id(0), id(0)));
        assert!(g.add_dependency(id(0), id(1)));
        assert!(!g.add_dependency(id(0), id(1)));
        assert_eq!(g.edge_count(), 1);
        assert!(g.toposort().is_ok());
    }

    #[test]
    fn transitive_queries() {
        let g = graph(4, &[(1, 0), (2, 1), (3, 0)]);
        let deps = g.get_dependencies(&[id(2)]);
        assert_eq!(deps, HashSet::from([id(0), id(1)]));
        let dependents = g.get_dependents(&[id(0)]);
        assert_eq!(dependents, HashSet::from([id(1), id(2), id(3)]));
        assert_eq!(g.direct_dependencies(id(2)), vec![id(1)]);
        assert_eq!(g.direct_dependents(id(0)), vec![id(1), id(3)]);
        assert!(g.get_dependencies(&[id(9)]).is_empty());
    }
}
