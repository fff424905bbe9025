//
//  payload.rs
//  Butterfly
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use super::theme::Palette;
use crate::config::Theme;
use crate::error::Result;
use crate::graph::{Direction, FunctionIdentity, PositionedNode};
use crate::layout::{display_label, PositionedGraph};
use crate::service::Location;

/// One node as the renderer sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    /// `file:line:column`
    pub id: String,
    pub label: String,
    pub display_name: String,
    pub direction: Direction,
    pub depth: usize,
    pub x: f64,
    pub y: f64,
    #[serde(flatten)]
    pub identity: FunctionIdentity,
}

impl From<&PositionedNode> for RenderNode {
    fn from(positioned: &PositionedNode) -> Self {
        let node = &positioned.node;
        Self {
            id: node.identity.to_string(),
            label: display_label(&node.display_name),
            display_name: node.display_name.clone(),
            direction: node.direction,
            depth: node.depth,
            x: positioned.x,
            y: positioned.y,
            identity: node.identity.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderEdge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplaySettings {
    pub theme: Theme,
    pub max_nodes_per_level: usize,
}

/// Everything the renderer needs for one butterfly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPayload {
    pub request_id: Uuid,
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
    pub display: DisplaySettings,
    pub palette: Palette,
    pub truncated: bool,
}

impl RenderPayload {
    pub fn new(request_id: Uuid, layout: &PositionedGraph, display: DisplaySettings) -> Self {
        Self {
            request_id,
            nodes: layout.nodes.iter().map(RenderNode::from).collect(),
            edges: layout
                .edges
                .iter()
                .map(|e| RenderEdge {
                    source: e.source.to_string(),
                    target: e.target.to_string(),
                })
                .collect(),
            display,
            palette: display.theme.palette(),
            truncated: layout.truncated,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn node(&self, id: &str) -> Option<&RenderNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Sent back by the renderer when a node is activated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpEvent {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
}

impl JumpEvent {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn identity(&self) -> FunctionIdentity {
        FunctionIdentity::new(&self.file, self.line, self.column)
    }

    pub fn location(&self) -> Location {
        Location::new(&self.file, self.line, self.column)
    }
}

impl From<&FunctionIdentity> for JumpEvent {
    fn from(identity: &FunctionIdentity) -> Self {
        Self {
            file: PathBuf::from(&identity.file),
            line: identity.line,
            column: identity.column,
        }
    }
}
