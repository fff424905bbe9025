//
//  index.rs
//  Butterfly
//
//  Created by hak (tharun)
//

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::types::*;
use super::LanguageService;
use crate::error::{ButterflyError, Result};
use crate::graph::identity::normalize_path;

/// One function known to a [`CallIndex`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedFunction {
    /// Key used by [`IndexedCall`] endpoints.
    pub id: String,
    pub name: String,
    pub file: PathBuf,
    /// Line of the function name (0-based).
    pub line: u32,
    /// Column of the function name (0-based).
    pub column: u32,
    /// Last line of the function body. Defaults to `line`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl IndexedFunction {
    /// A function whose id is its name.
    pub fn new(name: impl Into<String>, file: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            file: file.into(),
            line,
            column,
            end_line: None,
            detail: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn spanning(mut self, end_line: u32) -> Self {
        self.end_line = Some(end_line);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    fn end(&self) -> u32 {
        self.end_line.unwrap_or(self.line).max(self.line)
    }

    fn contains(&self, location: &Location) -> bool {
        normalize_path(&self.file) == normalize_path(&location.file)
            && (self.line..=self.end()).contains(&location.line)
    }

    fn is_at(&self, location: &Location) -> bool {
        self.line == location.line
            && self.column == location.column
            && normalize_path(&self.file) == normalize_path(&location.file)
    }

    fn occurrence(&self) -> Occurrence {
        Occurrence {
            name: self.name.clone(),
            location: Location::new(self.file.clone(), self.line, self.column),
            detail: self.detail.clone(),
        }
    }
}

/// A call relationship between two indexed functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedCall {
    pub from: String,
    pub to: String,
    /// Call-site ranges inside `from`. An empty list is kept as-is; the
    /// expander is responsible for discarding it.
    #[serde(default)]
    pub sites: Vec<Range>,
}

/// Static call hierarchy loaded from JSON (or built in code).
///
/// Answers [`LanguageService`] queries from precomputed data, keeping call
/// order exactly as written in the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallIndex {
    #[serde(default)]
    functions: Vec<IndexedFunction>,
    #[serde(default)]
    calls: Vec<IndexedCall>,
}

impl CallIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate an index document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let index: Self = serde_json::from_str(json)?;
        index.validate()?;
        Ok(index)
    }

    /// Load an index document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let index = Self::from_json_str(&contents)?;
        debug!(
            path = %path.display(),
            functions = index.functions.len(),
            calls = index.calls.len(),
            "loaded call index"
        );
        Ok(index)
    }

    /// Ids must be unique and every call must reference known ids.
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for function in &self.functions {
            if !ids.insert(function.id.as_str()) {
                return Err(ButterflyError::InvalidConfig(format!(
                    "duplicate function id '{}' in call index",
                    function.id
                )));
            }
        }
        for call in &self.calls {
            for endpoint in [&call.from, &call.to] {
                if !ids.contains(endpoint.as_str()) {
                    return Err(ButterflyError::InvalidConfig(format!(
                        "call {} -> {} references unknown function '{}'",
                        call.from, call.to, endpoint
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn function(mut self, function: IndexedFunction) -> Self {
        self.functions.push(function);
        self
    }

    /// Add a call with a single synthetic call site on the caller's line.
    pub fn call(self, from: &str, to: &str) -> Self {
        let line = self.get(from).map(|f| f.line).unwrap_or_default();
        let site = Range::new(Position::new(line, 0), Position::new(line, 1));
        self.call_with_sites(from, to, vec![site])
    }

    pub fn call_with_sites(mut self, from: &str, to: &str, sites: Vec<Range>) -> Self {
        self.calls.push(IndexedCall {
            from: from.to_string(),
            to: to.to_string(),
            sites,
        });
        self
    }

    pub fn functions(&self) -> &[IndexedFunction] {
        &self.functions
    }

    pub fn calls(&self) -> &[IndexedCall] {
        &self.calls
    }

    /// Occurrence for an indexed function id.
    pub fn occurrence(&self, id: &str) -> Option<Occurrence> {
        self.get(id).map(IndexedFunction::occurrence)
    }

    fn get(&self, id: &str) -> Option<&IndexedFunction> {
        self.functions.iter().find(|f| f.id == id)
    }

    /// Innermost function whose span contains `location`.
    fn enclosing(&self, location: &Location) -> Option<&IndexedFunction> {
        self.functions
            .iter()
            .filter(|f| f.contains(location))
            .min_by_key(|f| (f.end() - f.line, Reverse(f.line)))
    }

    fn id_of(&self, occurrence: &Occurrence) -> Option<&str> {
        self.functions
            .iter()
            .find(|f| f.is_at(&occurrence.location))
            .map(|f| f.id.as_str())
    }
}

#[async_trait]
impl LanguageService for CallIndex {
    async fn resolve_occurrence(&self, location: &Location) -> anyhow::Result<Option<Occurrence>> {
        Ok(self.enclosing(location).map(IndexedFunction::occurrence))
    }

    async fn incoming_calls(&self, occurrence: &Occurrence) -> anyhow::Result<Vec<IncomingCall>> {
        let Some(id) = self.id_of(occurrence) else {
            return Ok(Vec::new());
        };
        Ok(self
            .calls
            .iter()
            .filter(|call| call.to == id)
            .filter_map(|call| {
                self.occurrence(&call.from).map(|from| IncomingCall {
                    from,
                    call_sites: call.sites.clone(),
                })
            })
            .collect())
    }

    async fn outgoing_calls(&self, occurrence: &Occurrence) -> anyhow::Result<Vec<OutgoingCall>> {
        let Some(id) = self.id_of(occurrence) else {
            return Ok(Vec::new());
        };
        Ok(self
            .calls
            .iter()
            .filter(|call| call.from == id)
            .filter_map(|call| {
                self.occurrence(&call.to).map(|to| OutgoingCall {
                    to,
                    call_sites: call.sites.clone(),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator() -> CallIndex {
        CallIndex::new()
            .function(IndexedFunction::new("Calculator::add", "src/calculator.cpp", 4, 19).spanning(6))
            .function(
                IndexedFunction::new("calculateExpression", "src/calculator.cpp", 35, 19)
                    .spanning(41)
                    .with_detail("Calculator - double calculateExpression(double a, double b)"),
            )
            .function(IndexedFunction::new("main", "src/main.cpp", 3, 4).spanning(20))
            .call("calculateExpression", "Calculator::add")
            .call("main", "calculateExpression")
    }

    #[tokio::test]
    async fn test_resolve_inside_body() {
        let index = calculator();
        let occ = index
            .resolve_occurrence(&Location::new("src/calculator.cpp", 38, 8))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(occ.name, "calculateExpression");
        assert_eq!(occ.location.line, 35);
        assert!(occ.detail.is_some());
    }

    #[tokio::test]
    async fn test_resolve_outside_any_function() {
        let index = calculator();
        let occ = index
            .resolve_occurrence(&Location::new("src/calculator.cpp", 30, 0))
            .await
            .unwrap();
        assert!(occ.is_none());
    }

    #[tokio::test]
    async fn test_resolve_prefers_innermost() {
        let index = CallIndex::new()
            .function(IndexedFunction::new("outer", "a.py", 0, 4).spanning(20))
            .function(IndexedFunction::new("inner", "a.py", 5, 8).spanning(9));
        let occ = index
            .resolve_occurrence(&Location::new("a.py", 6, 0))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(occ.name, "inner");
    }

    #[tokio::test]
    async fn test_resolve_normalizes_separators() {
        let index = CallIndex::new().function(IndexedFunction::new("main", "src/main.cpp", 3, 4).spanning(20));
        let occ = index
            .resolve_occurrence(&Location::new("src\\main.cpp", 10, 0))
            .await
            .unwrap();
        assert!(occ.is_some());
    }

    #[tokio::test]
    async fn test_incoming_and_outgoing() {
        let index = calculator();
        let expr = index.occurrence("calculateExpression").unwrap();

        let callers = index.incoming_calls(&expr).await.unwrap();
        assert_eq!(callers.len(), 1);
        assert_eq!(callers[0].from.name, "main");
        assert_eq!(callers[0].call_sites.len(), 1);

        let callees = index.outgoing_calls(&expr).await.unwrap();
        assert_eq!(callees.len(), 1);
        assert_eq!(callees[0].to.name, "Calculator::add");
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "functions": [
                {"id": "main", "name": "main", "file": "main.cpp", "line": 3, "column": 4, "end_line": 12},
                {"id": "run", "name": "runTestA", "file": "DebugTest.cpp", "line": 10, "column": 6,
                 "detail": "DebugTestFacade - void runTestA()"}
            ],
            "calls": [
                {"from": "main", "to": "run",
                 "sites": [{"start": {"line": 5, "column": 8}, "end": {"line": 5, "column": 16}}]}
            ]
        }"#;
        let index = CallIndex::from_json_str(json).unwrap();
        assert_eq!(index.functions().len(), 2);
        assert_eq!(index.calls()[0].sites.len(), 1);
        assert_eq!(
            index.occurrence("run").unwrap().detail.as_deref(),
            Some("DebugTestFacade - void runTestA()")
        );
    }

    #[test]
    fn test_rejects_unknown_endpoint() {
        let json = r#"{
            "functions": [{"id": "main", "name": "main", "file": "main.cpp", "line": 3, "column": 4}],
            "calls": [{"from": "main", "to": "missing", "sites": []}]
        }"#;
        let err = CallIndex::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let index = CallIndex::new()
            .function(IndexedFunction::new("main", "a.cpp", 1, 0))
            .function(IndexedFunction::new("main", "b.cpp", 1, 0));
        assert!(index.validate().is_err());
    }
}
