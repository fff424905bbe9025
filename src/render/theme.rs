use serde::Serialize;

use crate::config::Theme;

/// Colours for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub node_background: &'static str,
    pub node_text: &'static str,
    pub edge: &'static str,
}

impl Theme {
    pub fn palette(&self) -> Palette {
        match self {
            Theme::Dark => Palette {
                node_background: "#333",
                node_text: "#fff",
                edge: "#666",
            },
            Theme::Light => Palette {
                node_background: "#f0f0f0",
                node_text: "#000",
                edge: "#999",
            },
            Theme::Default => Palette {
                node_background: "#666",
                node_text: "#fff",
                edge: "#999",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palettes() {
        assert_eq!(Theme::Default.palette().node_background, "#666");
        assert_eq!(Theme::Dark.palette().edge, "#666");
        assert_eq!(Theme::Light.palette().node_text, "#000");
    }
}
