//
//  types.rs
//  Butterfly
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use super::context::display_name;
use super::identity::normalize_path;
use crate::service::Location;

/// Dedup key for a function occurrence: normalized file path + line + column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionIdentity {
    /// File path with `/` as the only separator.
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl FunctionIdentity {
    pub fn new(file: impl AsRef<Path>, line: u32, column: u32) -> Self {
        Self {
            file: normalize_path(file.as_ref()),
            line,
            column,
        }
    }

    /// Location to jump to when this function is activated.
    pub fn to_location(&self) -> Location {
        Location::new(&self.file, self.line, self.column)
    }
}

impl fmt::Display for FunctionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Which wing of the butterfly a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Root,
    Caller,
    Callee,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Root => "root",
            Direction::Caller => "caller",
            Direction::Callee => "callee",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One function occurrence in the expansion tree or the flattened graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionNode {
    pub identity: FunctionIdentity,
    /// Name as reported by the language service.
    pub raw_name: String,
    /// Resolved or inherited enclosing type.
    pub enclosing_type: Option<String>,
    pub display_name: String,
    pub direction: Direction,
    /// Edges from the root along this node's wing. 0 for the root.
    pub depth: usize,
    /// Same-direction descendants. The root holds callers first, then callees.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FunctionNode>,
}

impl FunctionNode {
    pub fn new(
        identity: FunctionIdentity,
        raw_name: impl Into<String>,
        enclosing_type: Option<String>,
        direction: Direction,
        depth: usize,
    ) -> Self {
        let raw_name = raw_name.into();
        let display_name = display_name(&raw_name, enclosing_type.as_deref());
        Self {
            identity,
            raw_name,
            enclosing_type,
            display_name,
            direction,
            depth,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<FunctionNode>) -> Self {
        self.children = children;
        self
    }

    /// Copy of this node without its subtree.
    pub fn detached(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            raw_name: self.raw_name.clone(),
            enclosing_type: self.enclosing_type.clone(),
            display_name: self.display_name.clone(),
            direction: self.direction,
            depth: self.depth,
            children: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.direction == Direction::Root
    }

    pub fn callers(&self) -> impl Iterator<Item = &FunctionNode> {
        self.children
            .iter()
            .filter(|c| c.direction == Direction::Caller)
    }

    pub fn callees(&self) -> impl Iterator<Item = &FunctionNode> {
        self.children
            .iter()
            .filter(|c| c.direction == Direction::Callee)
    }

    /// Pre-order walk of this node and its subtree.
    pub fn descendants(&self) -> Vec<&FunctionNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

/// "source calls target", whichever wing discovered the pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallGraphEdge {
    pub source: FunctionIdentity,
    pub target: FunctionIdentity,
}

impl CallGraphEdge {
    pub fn new(source: FunctionIdentity, target: FunctionIdentity) -> Self {
        Self { source, target }
    }
}

/// Depth limits and bucket cap for one butterfly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutOptions {
    pub caller_levels: usize,
    pub callee_levels: usize,
    /// At least 1. Siblings past the cap are dropped, not collapsed.
    pub max_nodes_per_level: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            caller_levels: 2,
            callee_levels: 2,
            max_nodes_per_level: 10,
        }
    }
}

/// A function node with its layout coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
    #[serde(flatten)]
    pub node: FunctionNode,
    pub x: f64,
    pub y: f64,
}
