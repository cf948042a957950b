use std::collections::BTreeMap;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

lazy_static! {
    static ref DEFAULT_CONFIG: RenderConfig = RenderConfig::default();
}

/// Fixed markup settings shared by every render call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Command name (without the backslash) to replacement TeX.
    pub macros: BTreeMap<String, String>,
    /// CSS color of the span shown for formulas that fail to typeset.
    pub error_color: String,
    /// Open Markdown links in a new browsing context.
    pub link_target_blank: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let macros = [
            ("RR", "\\mathbb{R}"),
            ("NN", "\\mathbb{N}"),
            ("ZZ", "\\mathbb{Z}"),
            ("QQ", "\\mathbb{Q}"),
            ("CC", "\\mathbb{C}"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            macros,
            error_color: "#cc0000".to_string(),
            link_target_blank: true,
        }
    }
}

impl RenderConfig {
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub(crate) fn shared() -> &'static RenderConfig {
        &DEFAULT_CONFIG
    }
}
