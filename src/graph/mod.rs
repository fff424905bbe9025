//! Call graph module: expansion, dedup and flattening.
//!
//! Expands a bounded caller/callee tree around one seed function and
//! flattens it into a node/edge graph for layout.

pub mod context;
pub mod expander;
pub mod filter;
pub mod identity;
pub mod model;
pub mod types;

pub use context::{display_name, ClassContextResolver, DetailContextResolver, QUALIFIER};
pub use expander::CallGraphExpander;
pub use filter::ExclusionFilter;
pub use identity::{identity_of, normalize_path};
pub use model::Graph;
pub use types::{
    CallGraphEdge, Direction, FunctionIdentity, FunctionNode, LayoutOptions, PositionedNode,
};
