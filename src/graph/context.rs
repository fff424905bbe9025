//
//  context.rs
//  Butterfly
//
//  Created by hak (tharun)
//

use regex::Regex;
use std::sync::OnceLock;

use crate::service::Occurrence;

/// Separator between an enclosing type and a member name.
pub const QUALIFIER: &str = "::";

/// Leading identifier sequence followed by a `" - "` marker,
/// e.g. `"Widget - void paint()"` or `"TestApp.Program - void Main()"`.
const DETAIL_PATTERN: &str = r"^\s*([A-Za-z_]\w*(?:(?:::|\.)[A-Za-z_]\w*)*)\s+-\s";

static DETAIL: OnceLock<Regex> = OnceLock::new();

fn detail_regex() -> &'static Regex {
    DETAIL.get_or_init(|| Regex::new(DETAIL_PATTERN).expect("invalid detail pattern"))
}

/// Works out which type or namespace encloses a function.
///
/// The expander only talks to this trait, so a structured symbol source can
/// replace the detail-string heuristic without touching expansion.
pub trait ClassContextResolver: Send + Sync {
    /// `inherited` is the nearest ancestor's resolved type.
    fn resolve_context(&self, occurrence: &Occurrence, inherited: Option<&str>) -> Option<String>;
}

/// Default resolver. First match wins:
/// 1. prefix of an already-qualified name (`Type::member` -> `Type`)
/// 2. leading identifier of the declaration detail (`"Widget - ..."` -> `Widget`)
/// 3. the inherited context
#[derive(Debug, Clone, Copy, Default)]
pub struct DetailContextResolver;

impl DetailContextResolver {
    pub fn new() -> Self {
        Self
    }
}

impl ClassContextResolver for DetailContextResolver {
    fn resolve_context(&self, occurrence: &Occurrence, inherited: Option<&str>) -> Option<String> {
        if let Some((prefix, _)) = occurrence.name.split_once(QUALIFIER) {
            if !prefix.is_empty() {
                return Some(prefix.to_string());
            }
        }

        if let Some(ty) = occurrence.detail.as_deref().and_then(type_from_detail) {
            return Some(ty);
        }

        inherited.map(str::to_string)
    }
}

/// Type named at the start of a declaration detail, if it has one.
pub fn type_from_detail(detail: &str) -> Option<String> {
    detail_regex()
        .captures(detail)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// `Type::name` when a type is known and the name is not already qualified.
pub fn display_name(raw_name: &str, enclosing_type: Option<&str>) -> String {
    match enclosing_type {
        Some(ty) if !ty.is_empty() && !raw_name.contains(QUALIFIER) => {
            format!("{}{}{}", ty, QUALIFIER, raw_name)
        }
        _ => raw_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::Location;

    fn occ(name: &str, detail: Option<&str>) -> Occurrence {
        let o = Occurrence::new(name, Location::new("widget.cpp", 1, 0));
        match detail {
            Some(d) => o.with_detail(d),
            None => o,
        }
    }

    #[test]
    fn test_qualified_name_wins() {
        let r = DetailContextResolver::new();
        let ctx = r.resolve_context(&occ("Widget::paint", Some("Canvas - void paint()")), Some("Other"));
        assert_eq!(ctx.as_deref(), Some("Widget"));
    }

    #[test]
    fn test_first_separator_only() {
        let r = DetailContextResolver::new();
        let ctx = r.resolve_context(&occ("ui::Widget::paint", None), None);
        assert_eq!(ctx.as_deref(), Some("ui"));
    }

    #[test]
    fn test_detail_extraction() {
        let r = DetailContextResolver::new();
        let ctx = r.resolve_context(&occ("paint", Some("Widget - void paint()")), Some("Other"));
        assert_eq!(ctx.as_deref(), Some("Widget"));

        assert_eq!(type_from_detail("TestApp.Program - void Main()").as_deref(), Some("TestApp.Program"));
        assert_eq!(type_from_detail("ui::Widget - void paint()").as_deref(), Some("ui::Widget"));
    }

    #[test]
    fn test_malformed_detail_falls_back_to_inherited() {
        let r = DetailContextResolver::new();
        let ctx = r.resolve_context(&occ("paint", Some("void paint()")), Some("Widget"));
        assert_eq!(ctx.as_deref(), Some("Widget"));
    }

    #[test]
    fn test_absent_everything() {
        let r = DetailContextResolver::new();
        assert_eq!(r.resolve_context(&occ("main", None), None), None);
        assert_eq!(r.resolve_context(&occ("main", Some("int main()")), None), None);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("paint", Some("Widget")), "Widget::paint");
        assert_eq!(display_name("Widget::paint", Some("Widget")), "Widget::paint");
        assert_eq!(display_name("main", None), "main");
    }
}
