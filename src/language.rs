use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ButterflyError, Result};

/// A language Butterfly will build call graphs for.
///
/// Plain enum, matched on by extension at the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedLanguage {
    C,
    Cpp,
    CSharp,
    Python,
}

impl SupportedLanguage {
    pub const ALL: [SupportedLanguage; 4] = [
        SupportedLanguage::C,
        SupportedLanguage::Cpp,
        SupportedLanguage::CSharp,
        SupportedLanguage::Python,
    ];

    /// Identifier used in `[project].languages`.
    pub fn id(&self) -> &'static str {
        match self {
            SupportedLanguage::C => "c",
            SupportedLanguage::Cpp => "cpp",
            SupportedLanguage::CSharp => "csharp",
            SupportedLanguage::Python => "python",
        }
    }

    pub fn matches_extension(&self, ext: &str) -> bool {
        match self {
            SupportedLanguage::C => matches!(ext, "c" | "h"),
            SupportedLanguage::Cpp => matches!(ext, "cpp" | "cc" | "cxx" | "c++" | "hpp" | "hh" | "hxx"),
            SupportedLanguage::CSharp => ext == "cs",
            SupportedLanguage::Python => matches!(ext, "py" | "pyi"),
        }
    }

    /// Parse a config identifier. Case-insensitive; accepts common aliases
    /// ("c++", "cs", "c#", "py").
    pub fn from_id(s: &str) -> Option<SupportedLanguage> {
        match s.to_lowercase().as_str() {
            "c" => Some(SupportedLanguage::C),
            "cpp" | "c++" => Some(SupportedLanguage::Cpp),
            "csharp" | "cs" | "c#" => Some(SupportedLanguage::CSharp),
            "python" | "py" => Some(SupportedLanguage::Python),
            _ => None,
        }
    }

    /// Language of a source file, by extension.
    pub fn from_path(path: &Path) -> Option<SupportedLanguage> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        Self::ALL.into_iter().find(|lang| lang.matches_extension(&ext))
    }
}

/// Identifiers of every supported language, in declaration order.
pub fn all_language_ids() -> Vec<String> {
    SupportedLanguage::ALL.iter().map(|l| l.id().to_string()).collect()
}

/// Language of `path`, provided it is one of `enabled`.
pub fn ensure_supported(path: &Path, enabled: &[String]) -> Result<SupportedLanguage> {
    let unsupported = || ButterflyError::UnsupportedLanguage {
        language: path
            .extension()
            .and_then(|e| e.to_str())
            .map_or_else(|| "unknown".to_string(), |e| format!(".{}", e)),
        supported: enabled.join(", "),
    };

    let language = SupportedLanguage::from_path(path).ok_or_else(unsupported)?;
    let is_enabled = enabled
        .iter()
        .filter_map(|id| SupportedLanguage::from_id(id))
        .any(|l| l == language);
    if is_enabled {
        Ok(language)
    } else {
        Err(ButterflyError::UnsupportedLanguage {
            language: language.id().to_string(),
            supported: enabled.join(", "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(SupportedLanguage::from_path(Path::new("src/main.cpp")), Some(SupportedLanguage::Cpp));
        assert_eq!(SupportedLanguage::from_path(Path::new("lib/util.c")), Some(SupportedLanguage::C));
        assert_eq!(SupportedLanguage::from_path(Path::new("Program.CS")), Some(SupportedLanguage::CSharp));
        assert_eq!(SupportedLanguage::from_path(Path::new("app/views.py")), Some(SupportedLanguage::Python));
        assert_eq!(SupportedLanguage::from_path(Path::new("main.rs")), None);
        assert_eq!(SupportedLanguage::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_from_id_aliases() {
        assert_eq!(SupportedLanguage::from_id("C++"), Some(SupportedLanguage::Cpp));
        assert_eq!(SupportedLanguage::from_id("cs"), Some(SupportedLanguage::CSharp));
        assert_eq!(SupportedLanguage::from_id("py"), Some(SupportedLanguage::Python));
        assert_eq!(SupportedLanguage::from_id("rust"), None);
    }

    #[test]
    fn test_ensure_supported() {
        let all = all_language_ids();
        assert_eq!(ensure_supported(Path::new("a.cpp"), &all).unwrap(), SupportedLanguage::Cpp);

        let err = ensure_supported(Path::new("a.ts"), &all).unwrap_err();
        assert!(matches!(err, ButterflyError::UnsupportedLanguage { .. }));
        assert!(err.to_string().contains(".ts"));
    }

    #[test]
    fn test_disabled_language_rejected() {
        let only_python = vec!["python".to_string()];
        let err = ensure_supported(Path::new("a.cpp"), &only_python).unwrap_err();
        match err {
            ButterflyError::UnsupportedLanguage { language, supported } => {
                assert_eq!(language, "cpp");
                assert_eq!(supported, "python");
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
