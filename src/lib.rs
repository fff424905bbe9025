//! # Butterfly
//!
//! Bounded bidirectional call graphs around a single function.
//!
//! Given a cursor location, Butterfly asks a language service for the
//! function there, walks its callers and callees a configurable number of
//! levels in each direction, and lays the result out as a "butterfly": the
//! seed in the middle, callers fanning out to the left, callees to the right.
//!
//! ## Key Features
//!
//! - **Bounded**: independent depth limits per wing, plus a per-column cap
//! - **Cycle-safe**: each function appears once, at its first encounter
//! - **Deterministic**: same call hierarchy, same positions
//! - **Pluggable**: any [`LanguageService`] can drive it
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use butterfly::{Butterfly, ButterflyConfig, CallIndex, Location};
//!
//! # async fn run() -> butterfly::Result<()> {
//! let index = CallIndex::load("calls.json".as_ref())?;
//! let butterfly = Butterfly::new(Arc::new(index), ButterflyConfig::default())?;
//!
//! if let Some(payload) = butterfly.show(&Location::new("src/main.cpp", 10, 4)).await? {
//!     println!("{}", payload.to_json()?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod language;
pub mod layout;
pub mod render;
pub mod service;
pub mod session;

// Re-exports for convenience
pub use config::{ButterflyConfig, Theme};
pub use error::{ButterflyError, Result};
pub use graph::{
    CallGraphEdge, CallGraphExpander, ClassContextResolver, DetailContextResolver, Direction,
    ExclusionFilter, FunctionIdentity, FunctionNode, Graph, LayoutOptions, PositionedNode,
};
pub use language::SupportedLanguage;
pub use layout::{display_label, LayoutEngine, PositionedGraph};
pub use render::{render_dot, DisplaySettings, JumpEvent, RenderPayload};
pub use service::{CallIndex, LanguageService, Location, Occurrence};
pub use session::{RequestHandle, RequestTracker};

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, warn};

/// The main Butterfly instance.
///
/// Owns the configuration and everything derived from it. One instance can
/// serve many requests; only the latest request's result is kept.
pub struct Butterfly {
    service: Arc<dyn LanguageService>,
    config: ButterflyConfig,
    filter: ExclusionFilter,
    resolver: Box<dyn ClassContextResolver>,
    layout: LayoutEngine,
    requests: RequestTracker,
}

impl Butterfly {
    /// Build an instance from a validated configuration.
    pub fn new(service: Arc<dyn LanguageService>, config: ButterflyConfig) -> Result<Self> {
        config.validate()?;
        let filter = config.exclusion_filter()?;
        Ok(Self {
            service,
            config,
            filter,
            resolver: Box::new(DetailContextResolver::new()),
            layout: LayoutEngine::new(),
            requests: RequestTracker::new(),
        })
    }

    /// Swap in a different class-context strategy.
    pub fn with_resolver(mut self, resolver: impl ClassContextResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn config(&self) -> &ButterflyConfig {
        &self.config
    }

    /// Replace the configuration. Applies to requests started afterwards.
    pub fn set_config(&mut self, config: ButterflyConfig) -> Result<()> {
        config.validate()?;
        self.filter = config.exclusion_filter()?;
        self.config = config;
        Ok(())
    }

    /// Function occurrence at `location`.
    pub async fn resolve(&self, location: &Location) -> Result<Occurrence> {
        language::ensure_supported(&location.file, &self.config.project.languages)?;
        match self.service.resolve_occurrence(location).await {
            Ok(Some(occurrence)) => Ok(occurrence),
            Ok(None) => Err(ButterflyError::NoFunctionAtLocation(location.clone())),
            Err(e) => {
                warn!(error = %e, "seed resolution failed");
                Err(ButterflyError::NoFunctionAtLocation(location.clone()))
            }
        }
    }

    /// Expand and flatten the butterfly around `location`, without layout.
    pub async fn graph(&self, location: &Location) -> Result<Graph> {
        self.build(location, None).await
    }

    /// Full pipeline for one request: expand, flatten, lay out, package.
    ///
    /// Returns `Ok(None)` when a newer request started while this one was
    /// running; its result is discarded.
    pub async fn show(&self, location: &Location) -> Result<Option<RenderPayload>> {
        let request = self.requests.begin();
        let built = self.build(location, Some(request.cancel_flag())).await;

        if !self.requests.finish(&request) {
            debug!(request = %request.id(), "request superseded, result discarded");
            return Ok(None);
        }
        let graph = built?;

        let options = self.config.layout_options();
        let layout = self.layout.layout(&graph, &options);
        let display = DisplaySettings {
            theme: self.config.display.theme,
            max_nodes_per_level: options.max_nodes_per_level,
        };
        Ok(Some(RenderPayload::new(request.id(), &layout, display)))
    }

    /// Cancel whatever request is in flight.
    pub fn cancel(&self) {
        self.requests.cancel_all();
    }

    async fn build(&self, location: &Location, cancel: Option<&AtomicBool>) -> Result<Graph> {
        language::ensure_supported(&location.file, &self.config.project.languages)?;

        let options = self.config.layout_options();
        let mut expander =
            CallGraphExpander::new(self.service.as_ref(), &self.filter, self.resolver.as_ref());
        if let Some(flag) = cancel {
            expander = expander.with_cancel(flag);
        }

        let root = expander
            .expand(location, options.callee_levels, options.caller_levels)
            .await?;
        Ok(Graph::flatten(&root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{IncomingCall, IndexedFunction, OutgoingCall};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    fn main_index() -> CallIndex {
        CallIndex::new()
            .function(IndexedFunction::new("setup", "src/main.cpp", 0, 5).spanning(5))
            .function(IndexedFunction::new("main", "src/main.cpp", 10, 4).spanning(18))
            .function(IndexedFunction::new("helperA", "src/helpers.cpp", 0, 5).spanning(4))
            .function(IndexedFunction::new("helperB", "src/helpers.cpp", 6, 5).spanning(9))
            .call("setup", "main")
            .call("main", "helperA")
            .call("main", "helperB")
    }

    fn one_level() -> ButterflyConfig {
        let mut config = ButterflyConfig::default();
        config.graph.caller_levels = 1;
        config.graph.callee_levels = 1;
        config
    }

    #[tokio::test]
    async fn test_show_main_scenario() {
        let butterfly = Butterfly::new(Arc::new(main_index()), one_level()).unwrap();
        let payload = butterfly
            .show(&Location::new("src/main.cpp", 12, 0))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(payload.nodes.len(), 4);
        assert_eq!(payload.edges.len(), 3);

        let main = payload.node("src/main.cpp:10:4").unwrap();
        assert_eq!((main.x, main.y), (0.0, 0.0));
        let setup = payload.node("src/main.cpp:0:5").unwrap();
        assert_eq!((setup.x, setup.y), (-300.0, 0.0));
        let a = payload.node("src/helpers.cpp:0:5").unwrap();
        let b = payload.node("src/helpers.cpp:6:5").unwrap();
        assert_eq!(a.x, 300.0);
        assert_eq!(b.x, 300.0);
        assert!(a.y != 0.0);
        assert_eq!(a.y, -b.y);

        let edges: Vec<(&str, &str)> = payload
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert!(edges.contains(&("src/main.cpp:0:5", "src/main.cpp:10:4")));
        assert!(edges.contains(&("src/main.cpp:10:4", "src/helpers.cpp:0:5")));
        assert!(edges.contains(&("src/main.cpp:10:4", "src/helpers.cpp:6:5")));
    }

    #[tokio::test]
    async fn test_no_function_at_location() {
        let butterfly = Butterfly::new(Arc::new(main_index()), one_level()).unwrap();
        let err = butterfly
            .show(&Location::new("src/main.cpp", 8, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ButterflyError::NoFunctionAtLocation(_)));
        assert_eq!(err.to_string(), "No function found at src/main.cpp:8:0");
    }

    #[tokio::test]
    async fn test_unsupported_language() {
        let butterfly = Butterfly::new(Arc::new(main_index()), ButterflyConfig::default()).unwrap();
        let err = butterfly.graph(&Location::new("src/main.rs", 1, 0)).await.unwrap_err();
        assert!(matches!(err, ButterflyError::UnsupportedLanguage { .. }));
    }

    #[tokio::test]
    async fn test_set_config_applies_to_next_request() {
        let mut butterfly = Butterfly::new(Arc::new(main_index()), one_level()).unwrap();
        let seed = Location::new("src/main.cpp", 12, 0);
        assert_eq!(butterfly.graph(&seed).await.unwrap().node_count(), 4);

        let mut config = one_level();
        config.graph.callee_levels = 0;
        butterfly.set_config(config).unwrap();
        assert_eq!(butterfly.graph(&seed).await.unwrap().node_count(), 2);

        let mut bad = one_level();
        bad.graph.max_nodes_per_level = 0;
        assert!(butterfly.set_config(bad).is_err());
        assert_eq!(butterfly.config().graph.callee_levels, 0);
    }

    #[tokio::test]
    async fn test_configured_exclusions() {
        let mut config = one_level();
        config.graph.exclude = vec!["^helperB$".to_string()];
        let butterfly = Butterfly::new(Arc::new(main_index()), config).unwrap();
        let graph = butterfly.graph(&Location::new("src/main.cpp", 12, 0)).await.unwrap();
        assert_eq!(graph.node_count(), 3);
        assert!(graph.nodes().all(|n| n.raw_name != "helperB"));
    }

    /// Holds seed resolution on one line until released.
    struct Gated {
        inner: CallIndex,
        slow_line: u32,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl LanguageService for Gated {
        async fn resolve_occurrence(&self, location: &Location) -> anyhow::Result<Option<Occurrence>> {
            if location.line == self.slow_line {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.resolve_occurrence(location).await
        }

        async fn incoming_calls(&self, occurrence: &Occurrence) -> anyhow::Result<Vec<IncomingCall>> {
            self.inner.incoming_calls(occurrence).await
        }

        async fn outgoing_calls(&self, occurrence: &Occurrence) -> anyhow::Result<Vec<OutgoingCall>> {
            self.inner.outgoing_calls(occurrence).await
        }
    }

    #[tokio::test]
    async fn test_superseded_request_is_discarded() {
        let gated = Arc::new(Gated {
            inner: main_index(),
            slow_line: 12,
            entered: Notify::new(),
            release: Notify::new(),
        });
        let service: Arc<dyn LanguageService> = gated.clone();
        let butterfly = Arc::new(Butterfly::new(service, one_level()).unwrap());

        let slow = {
            let butterfly = butterfly.clone();
            tokio::spawn(async move { butterfly.show(&Location::new("src/main.cpp", 12, 0)).await })
        };
        gated.entered.notified().await;

        let fresh = butterfly
            .show(&Location::new("src/helpers.cpp", 1, 0))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fresh.nodes.len(), 2);

        gated.release.notify_one();
        let stale = slow.await.unwrap().unwrap();
        assert!(stale.is_none());
    }

    #[tokio::test]
    async fn test_calculator_demo() {
        let index = CallIndex::from_json_str(include_str!("../demos/calculator.json")).unwrap();
        let butterfly = Butterfly::new(Arc::new(index), ButterflyConfig::default()).unwrap();
        let graph = butterfly
            .graph(&Location::new("src/calculator.cpp", 37, 8))
            .await
            .unwrap();

        let names: Vec<&str> = graph.nodes().map(|n| n.display_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Calculator::calculateExpression",
                "Calculator::add",
                "Calculator::subtract",
                "Calculator::power",
                "Calculator::divide",
            ]
        );
        assert!(graph.nodes().all(|n| !n.raw_name.starts_with("std::")));
    }
}
