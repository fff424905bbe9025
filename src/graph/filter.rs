//
//  filter.rs
//  Butterfly
//
//  Created by hak (tharun)
//

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{ButterflyError, Result};

/// Built-in noise patterns, checked in order:
/// operator overloads, std-qualified names, dunder specials, destructors.
const BUILTIN_PATTERNS: &[&str] = &[
    r"^operator\b",
    r"^std::",
    r"^__\w+__$",
    r"^~",
];

static BUILTIN: OnceLock<Vec<Regex>> = OnceLock::new();

fn builtin() -> &'static [Regex] {
    BUILTIN.get_or_init(|| {
        BUILTIN_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("invalid built-in exclusion pattern"))
            .collect()
    })
}

/// Rejects noise identifiers before they are expanded.
///
/// An excluded neighbor never becomes a node and never gets an edge.
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    extra: Vec<Regex>,
}

impl ExclusionFilter {
    /// Filter with only the built-in patterns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in patterns plus user-supplied regexes (from `[graph].exclude`).
    pub fn with_patterns(patterns: &[String]) -> Result<Self> {
        let extra = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| ButterflyError::InvalidPattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { extra })
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        builtin()
            .iter()
            .chain(self.extra.iter())
            .any(|re| re.is_match(name))
    }
}
