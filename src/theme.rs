use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const BUILTIN_THEMES: &[(&str, &str)] = &[
    ("classic", include_str!("../themes/classic.toml")),
    ("print", include_str!("../themes/print.toml")),
    ("slate", include_str!("../themes/slate.toml")),
];

/// Colours for the diagram chrome.
///
/// Status colours (factor ticks) are fixed per status and live in
/// [`crate::diagram::StatusStyle`]; everything else is themable. Every field
/// has a default, so a theme file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: String,
    pub font_family: String,

    pub spine: String,
    pub tail_fill: String,
    pub head_fill: String,
    pub head_text: String,

    pub bone: String,
    pub category_fill: String,
    pub category_border: String,
    pub category_text: String,

    pub cause_line: String,
    pub cause_text: String,

    pub factor_dot: String,
    pub factor_text: String,
    pub excluded_text: String,
    pub priority_stroke: String,
    pub priority_text: String,

    pub header_text: String,
    pub rule: String,
    pub footer_text: String,
    pub final_stage: String,
    pub draft_stage: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

impl Theme {
    pub fn classic() -> Self {
        Theme {
            background: "#f8fafc".to_string(),
            font_family: "system-ui, sans-serif".to_string(),

            spine: "#475569".to_string(),
            tail_fill: "#3b82f6".to_string(),
            head_fill: "#3b82f6".to_string(),
            head_text: "#ffffff".to_string(),

            bone: "#64748b".to_string(),
            category_fill: "#ffffff".to_string(),
            category_border: "#cbd5e1".to_string(),
            category_text: "#1e293b".to_string(),

            cause_line: "#94a3b8".to_string(),
            cause_text: "#334155".to_string(),

            factor_dot: "#cbd5e1".to_string(),
            factor_text: "#1e293b".to_string(),
            excluded_text: "#cbd5e1".to_string(),
            priority_stroke: "#ea580c".to_string(),
            priority_text: "#c2410c".to_string(),

            header_text: "#1e293b".to_string(),
            rule: "#e2e8f0".to_string(),
            footer_text: "#64748b".to_string(),
            final_stage: "#059669".to_string(),
            draft_stage: "#d97706".to_string(),
        }
    }

    pub fn from_builtin(name: &str) -> Result<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        let content = BUILTIN_THEMES
            .iter()
            .find(|(n, _)| *n == normalized)
            .map(|(_, c)| *c)
            .ok_or_else(|| {
                Error::theme(format!(
                    "unknown built-in theme '{}'. Available: {}",
                    name,
                    Self::list_builtins().join(", ")
                ))
            })?;
        Self::from_toml(content)
    }

    pub fn list_builtins() -> Vec<&'static str> {
        BUILTIN_THEMES.iter().map(|(n, _)| *n).collect()
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::theme(format!("invalid TOML theme: {}", e)))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::theme(format!("invalid YAML theme: {}", e)))
    }

    /// Resolves a `--theme` argument: an existing file path first, then a built-in name.
    ///
    /// Files ending in `.yaml`/`.yml` are parsed as YAML; anything else is
    /// tried as TOML and then YAML.
    pub fn resolve(name_or_path: &str) -> Result<Self> {
        let path = std::path::Path::new(name_or_path);
        if !path.is_file() {
            return Self::from_builtin(name_or_path);
        }

        let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        if is_yaml {
            return Self::from_yaml(&content);
        }

        Self::from_toml(&content).or_else(|toml_err| {
            Self::from_yaml(&content).map_err(|_| {
                Error::theme(format!(
                    "failed to parse {} as TOML or YAML ({})",
                    path.display(),
                    toml_err
                ))
            })
        })
    }

    /// Colour for the "<stage> Ver." footer label.
    pub fn stage_color(&self, stage: &str) -> &str {
        if stage == "Final" {
            &self.final_stage
        } else {
            &self.draft_stage
        }
    }
}
