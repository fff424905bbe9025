//
//  expander.rs
//  Butterfly
//
//  Created by hak (tharun)
//

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, info_span, trace, warn, Instrument};

use super::context::ClassContextResolver;
use super::filter::ExclusionFilter;
use super::identity::identity_of;
use super::types::{Direction, FunctionIdentity, FunctionNode};
use crate::error::{ButterflyError, Result};
use crate::service::{LanguageService, Location, Occurrence};

type ChildrenFuture<'s> = Pin<Box<dyn Future<Output = Vec<FunctionNode>> + Send + 's>>;

/// Builds the butterfly tree around a seed function.
///
/// Expansion is depth-first with one language-service call in flight at a
/// time. A visited set scoped to one `expand` call is shared by both wings,
/// so every identity appears at most once in the resulting tree: the first
/// encounter wins and later encounters are pruned without being re-expanded.
pub struct CallGraphExpander<'a> {
    service: &'a dyn LanguageService,
    filter: &'a ExclusionFilter,
    resolver: &'a dyn ClassContextResolver,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> CallGraphExpander<'a> {
    pub fn new(
        service: &'a dyn LanguageService,
        filter: &'a ExclusionFilter,
        resolver: &'a dyn ClassContextResolver,
    ) -> Self {
        Self {
            service,
            filter,
            resolver,
            cancel: None,
        }
    }

    /// Stop growing the tree once `flag` is raised. Checked between lookups.
    pub fn with_cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Expand callers up to `caller_levels` and callees up to
    /// `callee_levels` around the function at `seed`.
    ///
    /// Only an unresolvable seed is an error; lookup failures further down
    /// the tree are logged and treated as "no neighbors".
    pub async fn expand(
        &self,
        seed: &Location,
        callee_levels: usize,
        caller_levels: usize,
    ) -> Result<FunctionNode> {
        let span = info_span!("expand", seed = %seed, caller_levels, callee_levels);
        self.expand_from_seed(seed, callee_levels, caller_levels)
            .instrument(span)
            .await
    }

    async fn expand_from_seed(
        &self,
        seed: &Location,
        callee_levels: usize,
        caller_levels: usize,
    ) -> Result<FunctionNode> {
        let occurrence = match self.service.resolve_occurrence(seed).await {
            Ok(Some(occurrence)) => occurrence,
            Ok(None) => return Err(ButterflyError::NoFunctionAtLocation(seed.clone())),
            Err(e) => {
                warn!(error = %e, "seed resolution failed");
                return Err(ButterflyError::NoFunctionAtLocation(seed.clone()));
            }
        };

        let identity = identity_of(&occurrence);
        let context = self.resolver.resolve_context(&occurrence, None);
        debug!(name = %occurrence.name, %identity, "resolved seed");

        let mut visited: HashSet<FunctionIdentity> = HashSet::new();
        visited.insert(identity.clone());

        let mut children = self
            .expand_children(
                &occurrence,
                context.as_deref(),
                Direction::Caller,
                0,
                caller_levels,
                &mut visited,
            )
            .await;
        let callees = self
            .expand_children(
                &occurrence,
                context.as_deref(),
                Direction::Callee,
                0,
                callee_levels,
                &mut visited,
            )
            .await;
        children.extend(callees);

        let root = FunctionNode::new(identity, occurrence.name, context, Direction::Root, 0)
            .with_children(children);

        info!(
            root = %root.display_name,
            callers = root.callers().count(),
            callees = root.callees().count(),
            nodes = visited.len(),
            "expansion complete"
        );
        Ok(root)
    }

    /// Children of `parent` along `direction`, each already expanded.
    fn expand_children<'s>(
        &'s self,
        parent: &'s Occurrence,
        context: Option<&'s str>,
        direction: Direction,
        depth: usize,
        max_depth: usize,
        visited: &'s mut HashSet<FunctionIdentity>,
    ) -> ChildrenFuture<'s> {
        Box::pin(async move {
            if depth >= max_depth || self.is_cancelled() {
                return Vec::new();
            }

            let neighbors = self.neighbors(parent, direction).await;
            let mut children = Vec::with_capacity(neighbors.len());

            for neighbor in neighbors {
                if self.is_cancelled() {
                    debug!(parent = %parent.name, "expansion cancelled");
                    break;
                }

                let identity = identity_of(&neighbor);
                if !visited.insert(identity.clone()) {
                    trace!(name = %neighbor.name, %identity, %direction, "already visited, pruned");
                    continue;
                }

                let child_context = self.resolver.resolve_context(&neighbor, context);
                let grandchildren = self
                    .expand_children(
                        &neighbor,
                        child_context.as_deref(),
                        direction,
                        depth + 1,
                        max_depth,
                        visited,
                    )
                    .await;

                children.push(
                    FunctionNode::new(
                        identity,
                        neighbor.name.clone(),
                        child_context,
                        direction,
                        depth + 1,
                    )
                    .with_children(grandchildren),
                );
            }

            children
        })
    }

    /// One level of neighbors, minus call-less relationships and excluded
    /// names. A failed lookup yields no neighbors.
    async fn neighbors(&self, occurrence: &Occurrence, direction: Direction) -> Vec<Occurrence> {
        let result = match direction {
            Direction::Caller => self.service.incoming_calls(occurrence).await.map(|calls| {
                calls
                    .into_iter()
                    .filter(|call| has_call_sites(&call.from, call.call_sites.len()))
                    .map(|call| call.from)
                    .collect::<Vec<_>>()
            }),
            Direction::Callee => self.service.outgoing_calls(occurrence).await.map(|calls| {
                calls
                    .into_iter()
                    .filter(|call| has_call_sites(&call.to, call.call_sites.len()))
                    .map(|call| call.to)
                    .collect::<Vec<_>>()
            }),
            Direction::Root => Ok(Vec::new()),
        };

        match result {
            Ok(neighbors) => neighbors
                .into_iter()
                .filter(|n| {
                    let excluded = self.filter.is_excluded(&n.name);
                    if excluded {
                        debug!(name = %n.name, "excluded");
                    }
                    !excluded
                })
                .collect(),
            Err(e) => {
                warn!(
                    function = %occurrence.name,
                    %direction,
                    error = %e,
                    "neighbor lookup failed, treating as no neighbors"
                );
                Vec::new()
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

fn has_call_sites(occurrence: &Occurrence, sites: usize) -> bool {
    if sites == 0 {
        trace!(name = %occurrence.name, "relationship without call sites dropped");
    }
    sites > 0
}
