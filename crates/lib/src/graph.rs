//! Dependency graph over the library set.
//!
//! The graph is built once from each library's declared dependencies and
//! sorted once; every build and clean walks the resulting order.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;

use crate::library::Library;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
  #[error("dependency cycle detected")]
  CycleDetected,

  #[error("{library} depends on {dependency}, which is not part of the graph")]
  UnknownDependency { library: Library, dependency: Library },
}

pub struct LibraryGraph {
  /// Edges point from a dependency to its dependent.
  graph: DiGraph<Library, ()>,
  nodes: HashMap<Library, NodeIndex>,
  order: Vec<Library>,
}

impl LibraryGraph {
  /// Graph of every library using the built-in dependency declarations.
  pub fn new() -> Result<Self, GraphError> {
    Self::from_declarations(&Library::ALL, |lib| lib.dependencies().to_vec())
  }

  /// Build a graph over `libraries`, asking `deps` for each one's prerequisites.
  ///
  /// `libraries` order is the tie-break for libraries with no ordering
  /// constraint between them.
  pub fn from_declarations<F>(libraries: &[Library], deps: F) -> Result<Self, GraphError>
  where
    F: Fn(Library) -> Vec<Library>,
  {
    let mut graph = DiGraph::new();
    let mut nodes = HashMap::new();

    for &lib in libraries {
      nodes.entry(lib).or_insert_with(|| graph.add_node(lib));
    }

    for &lib in libraries {
      let dependent = nodes[&lib];
      for dependency in deps(lib) {
        let Some(&dep_idx) = nodes.get(&dependency) else {
          return Err(GraphError::UnknownDependency { library: lib, dependency });
        };
        graph.update_edge(dep_idx, dependent, ());
      }
    }

    toposort(&graph, None).map_err(|_| GraphError::CycleDetected)?;

    let order = Self::stable_order(&graph)?;
    Ok(Self { graph, nodes, order })
  }

  /// Kahn's algorithm, always taking the earliest-declared ready node.
  fn stable_order(graph: &DiGraph<Library, ()>) -> Result<Vec<Library>, GraphError> {
    let mut in_degree: HashMap<NodeIndex, usize> = graph
      .node_indices()
      .map(|idx| (idx, graph.neighbors_directed(idx, Direction::Incoming).count()))
      .collect();

    let mut ready: BinaryHeap<Reverse<NodeIndex>> = in_degree
      .iter()
      .filter(|(_, deg)| **deg == 0)
      .map(|(idx, _)| Reverse(*idx))
      .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(Reverse(idx)) = ready.pop() {
      order.push(graph[idx]);
      for dependent in graph.neighbors_directed(idx, Direction::Outgoing) {
        if let Some(deg) = in_degree.get_mut(&dependent) {
          *deg = deg.saturating_sub(1);
          if *deg == 0 {
            ready.push(Reverse(dependent));
          }
        }
      }
    }

    if order.len() != graph.node_count() {
      return Err(GraphError::CycleDetected);
    }
    Ok(order)
  }

  /// Libraries with every dependency before its dependents.
  pub fn order(&self) -> &[Library] {
    &self.order
  }

  /// Direct prerequisites of `library`, in declaration order.
  pub fn dependencies(&self, library: Library) -> Vec<Library> {
    let Some(&idx) = self.nodes.get(&library) else {
      return Vec::new();
    };
    let mut deps: Vec<Library> = self
      .graph
      .neighbors_directed(idx, Direction::Incoming)
      .map(|dep| self.graph[dep])
      .collect();
    deps.sort_by_key(|lib| self.position(*lib));
    deps
  }

  fn position(&self, library: Library) -> usize {
    self.order.iter().position(|l| *l == library).unwrap_or(usize::MAX)
  }
}
