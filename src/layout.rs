//
//  layout.rs
//  Butterfly
//
//  Created by hak (tharun)
//

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::graph::{CallGraphEdge, Direction, FunctionIdentity, Graph, LayoutOptions, PositionedNode, QUALIFIER};

/// Horizontal distance between depth columns.
pub const X_OFFSET: f64 = 300.0;
/// Vertical distance between siblings in one bucket.
pub const Y_STEP: f64 = 100.0;
/// Longest unqualified label shown before it is cut.
pub const MAX_LABEL_LENGTH: usize = 20;

const ELLIPSIS: &str = "...";

/// Laid-out butterfly: kept nodes in traversal order plus the edges between them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedGraph {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<CallGraphEdge>,
    /// True when at least one bucket overflowed `max_nodes_per_level`.
    pub truncated: bool,
}

/// Places the root at the origin, callers on the left and callees on the right.
#[derive(Debug, Clone, Copy)]
pub struct LayoutEngine {
    x_offset: f64,
    y_step: f64,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self {
            x_offset: X_OFFSET,
            y_step: Y_STEP,
        }
    }
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spacing(x_offset: f64, y_step: f64) -> Self {
        Self { x_offset, y_step }
    }

    /// Position every node of `graph`.
    ///
    /// Buckets are `(direction, depth)` pairs filled in traversal order. A node
    /// past the bucket cap is dropped, and so is everything it discovered,
    /// since a node is only kept when its parent was kept.
    pub fn layout(&self, graph: &Graph, options: &LayoutOptions) -> PositionedGraph {
        let cap = options.max_nodes_per_level.max(1);

        let mut kept: HashSet<&FunctionIdentity> = HashSet::new();
        let mut buckets: HashMap<(Direction, usize), Vec<&FunctionIdentity>> = HashMap::new();
        let mut truncated = false;

        for node in graph.nodes() {
            if node.is_root() {
                kept.insert(&node.identity);
                continue;
            }
            let parent_kept = graph
                .parent_of(&node.identity)
                .map_or(false, |p| kept.contains(&p.identity));
            if !parent_kept {
                continue;
            }
            let bucket = buckets.entry((node.direction, node.depth)).or_default();
            if bucket.len() >= cap {
                truncated = true;
                continue;
            }
            bucket.push(&node.identity);
            kept.insert(&node.identity);
        }

        let mut positions: HashMap<&FunctionIdentity, (f64, f64)> = HashMap::new();
        for ((direction, depth), members) in &buckets {
            let x = self.column(*direction, *depth);
            let center = (members.len() as f64 - 1.0) / 2.0;
            for (i, identity) in members.iter().enumerate() {
                positions.insert(*identity, (x, (i as f64 - center) * self.y_step));
            }
        }

        let nodes: Vec<PositionedNode> = graph
            .nodes()
            .filter(|n| kept.contains(&n.identity))
            .map(|n| {
                let (x, y) = positions.get(&n.identity).copied().unwrap_or((0.0, 0.0));
                PositionedNode {
                    node: n.clone(),
                    x,
                    y,
                }
            })
            .collect();

        let edges: Vec<CallGraphEdge> = graph
            .edges()
            .into_iter()
            .filter(|e| kept.contains(&e.source) && kept.contains(&e.target))
            .collect();

        debug!(nodes = nodes.len(), edges = edges.len(), truncated, "layout complete");

        PositionedGraph {
            nodes,
            edges,
            truncated,
        }
    }

    fn column(&self, direction: Direction, depth: usize) -> f64 {
        let distance = self.x_offset * depth as f64;
        match direction {
            Direction::Caller => -distance,
            Direction::Callee => distance,
            Direction::Root => 0.0,
        }
    }
}

/// Label shown on a node. Qualified names are never cut.
pub fn display_label(display_name: &str) -> String {
    if display_name.contains(QUALIFIER) || display_name.chars().count() <= MAX_LABEL_LENGTH {
        return display_name.to_string();
    }
    let head: String = display_name
        .chars()
        .take(MAX_LABEL_LENGTH - ELLIPSIS.len())
        .collect();
    format!("{}{}", head, ELLIPSIS)
}
