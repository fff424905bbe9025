//
//  model.rs
//  Butterfly
//
//  Created by hak (tharun)
//

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

use super::types::*;

/// Flattened butterfly: unique nodes plus caller→callee edges.
///
/// Every non-root node hangs off exactly one parent, the node that
/// discovered it during expansion. Edges always point from caller to callee,
/// so a caller-wing pair is stored child→parent.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    graph: DiGraph<FunctionNode, ()>,
    /// Index: identity -> node index.
    index: HashMap<FunctionIdentity, NodeIndex>,
    /// Index: node -> the node that discovered it.
    parents: HashMap<NodeIndex, NodeIndex>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten an expansion tree. Nodes keep pre-order (traversal) order.
    pub fn flatten(root: &FunctionNode) -> Self {
        let mut graph = Self::new();
        graph.insert(root.detached(), None);

        let mut stack: Vec<(&FunctionNode, &FunctionIdentity)> = root
            .children
            .iter()
            .rev()
            .map(|child| (child, &root.identity))
            .collect();

        while let Some((node, parent)) = stack.pop() {
            if graph.insert(node.detached(), Some(parent)) {
                stack.extend(node.children.iter().rev().map(|child| (child, &node.identity)));
            }
        }

        graph
    }

    /// Add `node` below `parent` with an edge oriented by the node's wing.
    ///
    /// Returns false (and adds nothing) when the identity is already present
    /// or the parent is unknown, so every edge endpoint is always a node.
    pub fn insert(&mut self, node: FunctionNode, parent: Option<&FunctionIdentity>) -> bool {
        if self.index.contains_key(&node.identity) {
            return false;
        }
        let parent_idx = match parent {
            Some(p) => match self.index.get(p) {
                Some(&idx) => Some(idx),
                None => return false,
            },
            None => None,
        };

        let direction = node.direction;
        let identity = node.identity.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(identity, idx);

        if let Some(parent_idx) = parent_idx {
            match direction {
                Direction::Caller => self.graph.add_edge(idx, parent_idx, ()),
                Direction::Callee | Direction::Root => self.graph.add_edge(parent_idx, idx, ()),
            };
            self.parents.insert(idx, parent_idx);
        }
        true
    }

    /// The seed function, if the graph is not empty.
    pub fn root(&self) -> Option<&FunctionNode> {
        self.graph.node_weights().find(|n| n.is_root())
    }

    /// Nodes in traversal order.
    pub fn nodes(&self) -> impl Iterator<Item = &FunctionNode> {
        self.graph.node_weights()
    }

    /// Edges in discovery order.
    pub fn edges(&self) -> Vec<CallGraphEdge> {
        self.graph
            .edge_references()
            .map(|e| {
                CallGraphEdge::new(
                    self.graph[e.source()].identity.clone(),
                    self.graph[e.target()].identity.clone(),
                )
            })
            .collect()
    }

    pub fn node(&self, identity: &FunctionIdentity) -> Option<&FunctionNode> {
        self.index.get(identity).map(|&idx| &self.graph[idx])
    }

    pub fn contains(&self, identity: &FunctionIdentity) -> bool {
        self.index.contains_key(identity)
    }

    /// The node that discovered `identity` (None for the root).
    pub fn parent_of(&self, identity: &FunctionIdentity) -> Option<&FunctionNode> {
        let idx = self.index.get(identity)?;
        self.parents.get(idx).map(|&p| &self.graph[p])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, line: u32, direction: Direction, depth: usize) -> FunctionNode {
        FunctionNode::new(FunctionIdentity::new("main.cpp", line, 0), name, None, direction, depth)
    }

    fn edge_names(graph: &Graph) -> Vec<(String, String)> {
        graph
            .edges()
            .iter()
            .map(|e| {
                (
                    graph.node(&e.source).unwrap().raw_name.clone(),
                    graph.node(&e.target).unwrap().raw_name.clone(),
                )
            })
            .collect()
    }

    fn main_tree() -> FunctionNode {
        node("main", 10, Direction::Root, 0).with_children(vec![
            node("setup", 0, Direction::Caller, 1)
                .with_children(vec![node("init", 5, Direction::Caller, 2)]),
            node("helperA", 20, Direction::Callee, 1)
                .with_children(vec![node("log", 40, Direction::Callee, 2)]),
            node("helperB", 30, Direction::Callee, 1),
        ])
    }

    #[test]
    fn test_flatten_counts() {
        let graph = Graph::flatten(&main_tree());
        assert_eq!(graph.node_count(), 6);
        assert_eq!(graph.edge_count(), 5);
        assert_eq!(graph.root().unwrap().raw_name, "main");
    }

    #[test]
    fn test_edges_point_caller_to_callee() {
        let graph = Graph::flatten(&main_tree());
        let edges = edge_names(&graph);
        let pair = |a: &str, b: &str| (a.to_string(), b.to_string());
        assert!(edges.contains(&pair("setup", "main")));
        assert!(edges.contains(&pair("init", "setup")));
        assert!(edges.contains(&pair("main", "helperA")));
        assert!(edges.contains(&pair("helperA", "log")));
        assert!(edges.contains(&pair("main", "helperB")));
    }

    #[test]
    fn test_traversal_order() {
        let graph = Graph::flatten(&main_tree());
        let order: Vec<_> = graph.nodes().map(|n| n.raw_name.as_str()).collect();
        assert_eq!(order, vec!["main", "setup", "init", "helperA", "log", "helperB"]);
    }

    #[test]
    fn test_nodes_are_detached() {
        let graph = Graph::flatten(&main_tree());
        assert!(graph.nodes().all(|n| n.children.is_empty()));
    }

    #[test]
    fn test_parent_of() {
        let graph = Graph::flatten(&main_tree());
        let init = FunctionIdentity::new("main.cpp", 5, 0);
        assert_eq!(graph.parent_of(&init).unwrap().raw_name, "setup");
        let main = FunctionIdentity::new("main.cpp", 10, 0);
        assert!(graph.parent_of(&main).is_none());
    }

    #[test]
    fn test_every_edge_endpoint_is_a_node() {
        let graph = Graph::flatten(&main_tree());
        for e in graph.edges() {
            assert!(graph.contains(&e.source));
            assert!(graph.contains(&e.target));
        }
    }

    #[test]
    fn test_insert_rejects_duplicates_and_orphans() {
        let mut graph = Graph::new();
        assert!(graph.insert(node("main", 10, Direction::Root, 0), None));
        assert!(!graph.insert(node("main", 10, Direction::Callee, 1), None));

        let unknown = FunctionIdentity::new("other.cpp", 1, 0);
        assert!(!graph.insert(node("orphan", 99, Direction::Callee, 2), Some(&unknown)));
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_empty_graph() {
        let graph = Graph::new();
        assert!(graph.is_empty());
        assert!(graph.root().is_none());
        assert!(graph.edges().is_empty());
    }
}
