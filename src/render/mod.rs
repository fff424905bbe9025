//! Output for the rendering collaborator.
//!
//! The renderer receives a [`RenderPayload`] (JSON) and answers with
//! [`JumpEvent`]s when a node is activated. [`render_dot`] gives the same
//! butterfly as Graphviz source.

mod dot;
mod payload;
mod theme;

pub use dot::{quote, render_dot, DotGraph};
pub use payload::{DisplaySettings, JumpEvent, RenderEdge, RenderNode, RenderPayload};
pub use theme::Palette;
