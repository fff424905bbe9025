//! Language Service boundary.
//!
//! Butterfly never reads source text itself. Everything it knows about
//! functions comes through [`LanguageService`]:
//! - resolve a cursor location to a function occurrence
//! - list one level of incoming calls (callers)
//! - list one level of outgoing calls (callees)
//!
//! [`CallIndex`] is a static implementation backed by a JSON document,
//! used by the CLI and by tests.

mod index;
mod types;

pub use index::{CallIndex, IndexedCall, IndexedFunction};
pub use types::{IncomingCall, Location, Occurrence, OutgoingCall, Position, Range};

use async_trait::async_trait;

/// Source-analysis collaborator, typically backed by a language server's
/// call hierarchy.
///
/// Every method is a suspension point. Errors are opaque: callers decide
/// whether a failure is fatal (seed resolution) or recoverable (neighbor
/// lookups).
#[async_trait]
pub trait LanguageService: Send + Sync {
    /// Map a location to the function occurrence containing it, if any.
    async fn resolve_occurrence(&self, location: &Location) -> anyhow::Result<Option<Occurrence>>;

    /// Functions calling `occurrence`.
    async fn incoming_calls(&self, occurrence: &Occurrence) -> anyhow::Result<Vec<IncomingCall>>;

    /// Functions called by `occurrence`.
    async fn outgoing_calls(&self, occurrence: &Occurrence) -> anyhow::Result<Vec<OutgoingCall>>;
}
