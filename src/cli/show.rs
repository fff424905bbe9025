//! show / resolve / jump handlers.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use super::{LocationArgs, OutputFormat};
use crate::config::{ButterflyConfig, Theme};
use crate::graph::Direction;
use crate::render::{render_dot, JumpEvent, RenderNode, RenderPayload};
use crate::service::{CallIndex, Location};
use crate::Butterfly;

/// Command-line values that take precedence over `butterfly.toml`.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub caller_levels: Option<usize>,
    pub callee_levels: Option<usize>,
    pub max_nodes_per_level: Option<usize>,
    pub theme: Option<Theme>,
}

impl Overrides {
    pub fn apply(&self, config: &mut ButterflyConfig) {
        if let Some(levels) = self.caller_levels {
            config.graph.caller_levels = levels;
        }
        if let Some(levels) = self.callee_levels {
            config.graph.callee_levels = levels;
        }
        if let Some(cap) = self.max_nodes_per_level {
            config.graph.max_nodes_per_level = cap;
        }
        if let Some(theme) = self.theme {
            config.display.theme = theme;
        }
    }
}

impl From<&LocationArgs> for Location {
    fn from(args: &LocationArgs) -> Self {
        Location::new(&args.file, args.line, args.column)
    }
}

fn open(config_path: &Path, index_path: &Path, overrides: &Overrides) -> Result<Butterfly> {
    let mut config = ButterflyConfig::load(config_path);
    overrides.apply(&mut config);
    let index = CallIndex::load(index_path)
        .with_context(|| format!("failed to load call index {}", index_path.display()))?;
    Ok(Butterfly::new(Arc::new(index), config)?)
}

/// Print the butterfly around `location`.
pub async fn show(
    config_path: &Path,
    index_path: &Path,
    location: &LocationArgs,
    overrides: &Overrides,
    format: OutputFormat,
) -> Result<()> {
    let butterfly = open(config_path, index_path, overrides)?;
    let Some(payload) = butterfly.show(&Location::from(location)).await? else {
        return Ok(());
    };

    match format {
        OutputFormat::Text => print!("{}", format_text(&payload)),
        OutputFormat::Json => println!("{}", payload.to_json()?),
        OutputFormat::Dot => print!("{}", render_dot(&payload)),
    }
    Ok(())
}

/// Print the function occurrence at `location`.
pub async fn resolve(config_path: &Path, index_path: &Path, location: &LocationArgs) -> Result<()> {
    let butterfly = open(config_path, index_path, &Overrides::default())?;
    let occurrence = butterfly.resolve(&Location::from(location)).await?;
    println!("{} {}", occurrence.name, occurrence.location);
    if let Some(detail) = &occurrence.detail {
        println!("  {}", detail);
    }
    Ok(())
}

/// Decode a renderer jump event and print where to go.
pub fn jump(event: &str) -> Result<()> {
    let event = JumpEvent::from_json(event).context("invalid jump event")?;
    println!("{}", event.identity());
    Ok(())
}

/// Plain-text listing: root first, then each wing by depth.
pub fn format_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    let mut wings: BTreeMap<(u8, usize), Vec<&RenderNode>> = BTreeMap::new();

    for node in &payload.nodes {
        match node.direction {
            Direction::Root => lines.push(node_line(node, "")),
            Direction::Caller => wings.entry((0, node.depth)).or_default().push(node),
            Direction::Callee => wings.entry((1, node.depth)).or_default().push(node),
        }
    }

    let mut current_wing = None;
    for ((wing, depth), nodes) in &wings {
        if current_wing != Some(*wing) {
            let title = if *wing == 0 { "callers" } else { "callees" };
            lines.push(title.to_string());
            current_wing = Some(*wing);
        }
        lines.push(format!("  depth {}", depth));
        for node in nodes {
            lines.push(node_line(node, "    "));
        }
    }

    lines.push(format!(
        "{} nodes, {} edges{}",
        payload.nodes.len(),
        payload.edges.len(),
        if payload.truncated { " (truncated)" } else { "" }
    ));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn node_line(node: &RenderNode, indent: &str) -> String {
    format!("{}{}  {}  @ ({}, {})", indent, node.label, node.id, node.x, node.y)
}
