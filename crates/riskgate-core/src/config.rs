use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RiskgateError;

/// Top-level configuration loaded from `.riskgate.toml`.
///
/// Resolution is layered: CLI flags > local config file > defaults.
///
/// # Examples
///
/// ```
/// use riskgate_core::RiskgateConfig;
///
/// let config = RiskgateConfig::default();
/// assert!(config.classify.is_code_file("src/app.ts"));
/// assert!(config.classify.is_ignored("node_modules/x/index.js"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskgateConfig {
    /// File classification inputs (language-agnostic).
    #[serde(default)]
    pub classify: ClassifyConfig,
    /// Blast-radius search settings.
    #[serde(default)]
    pub blast: BlastConfig,
    /// Deep-mode history analysis settings.
    #[serde(default)]
    pub deep: DeepConfig,
}

impl RiskgateConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RiskgateError::Io`] if the file cannot be read, or
    /// [`RiskgateError::Toml`] if the content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, RiskgateError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`RiskgateError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use riskgate_core::RiskgateConfig;
    ///
    /// let toml = r#"
    /// [deep]
    /// churn_days = 30
    /// "#;
    /// let config = RiskgateConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.deep.churn_days, 30);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, RiskgateError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// File classification inputs: which files count as source code, which
/// path prefixes are ignored everywhere, and which base names are treated
/// as configuration files.
///
/// The lists are configuration inputs by design; the scorers never hardcode
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyConfig {
    /// Extensions (with leading dot) classified as source code.
    #[serde(default = "default_code_extensions")]
    pub code_extensions: Vec<String>,
    /// Path prefixes excluded from all scans (build outputs, vendored code,
    /// VCS metadata).
    #[serde(default = "default_ignore_prefixes")]
    pub ignore_prefixes: Vec<String>,
    /// Base names treated as configuration files for key-removal checks.
    /// Files ending in `.env` are always included.
    #[serde(default = "default_config_files")]
    pub config_files: Vec<String>,
}

fn default_code_extensions() -> Vec<String> {
    [".ts", ".tsx", ".js", ".jsx", ".py", ".go", ".rs"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_ignore_prefixes() -> Vec<String> {
    [
        "node_modules/",
        "vendor/",
        "dist/",
        "build/",
        "out/",
        "target/",
        ".next/",
        ".nuxt/",
        "__pycache__/",
        ".pytest_cache/",
        "venv/",
        ".venv/",
        ".git/",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_config_files() -> Vec<String> {
    ["package.json", "tsconfig.json", ".env", ".env.example"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            code_extensions: default_code_extensions(),
            ignore_prefixes: default_ignore_prefixes(),
            config_files: default_config_files(),
        }
    }
}

impl ClassifyConfig {
    /// Whether `path` is classified as source code by extension.
    pub fn is_code_file(&self, path: &str) -> bool {
        match path.rfind('.') {
            Some(idx) => {
                let ext = &path[idx..];
                self.code_extensions.iter().any(|e| e == ext)
            }
            None => false,
        }
    }

    /// Whether `path` falls under an ignored prefix.
    pub fn is_ignored(&self, path: &str) -> bool {
        self.ignore_prefixes.iter().any(|p| path.starts_with(p))
    }

    /// Whether `path` is a configuration file for key-removal checks.
    pub fn is_config_file(&self, path: &str) -> bool {
        let base = path.rsplit('/').next().unwrap_or(path);
        self.config_files.iter().any(|c| c == base) || path.ends_with(".env")
    }
}

/// Blast-radius search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlastConfig {
    /// Substrings whose presence anywhere in the repository downgrades
    /// confidence to low (dynamic import forms).
    #[serde(default = "default_dynamic_import_markers")]
    pub dynamic_import_markers: Vec<String>,
    /// Marker files at the repository root that indicate a monorepo and
    /// downgrade confidence to medium.
    #[serde(default = "default_monorepo_markers")]
    pub monorepo_markers: Vec<String>,
}

fn default_dynamic_import_markers() -> Vec<String> {
    vec!["import(".to_string()]
}

fn default_monorepo_markers() -> Vec<String> {
    vec!["lerna.json".to_string(), "pnpm-workspace.yaml".to_string()]
}

impl Default for BlastConfig {
    fn default() -> Self {
        Self {
            dynamic_import_markers: default_dynamic_import_markers(),
            monorepo_markers: default_monorepo_markers(),
        }
    }
}

/// Deep-mode history analysis settings.
///
/// # Examples
///
/// ```
/// use riskgate_core::DeepConfig;
///
/// let config = DeepConfig::default();
/// assert_eq!(config.churn_days, 90);
/// assert_eq!(config.max_files, 20);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepConfig {
    /// Churn lookback window in days (default: 90).
    #[serde(default = "default_churn_days")]
    pub churn_days: u64,
    /// Maximum changed files to analyze in deep mode (default: 20).
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Minimum 90-day commit count for a hotspot (default: 10).
    #[serde(default = "default_hotspot_churn")]
    pub hotspot_churn: u32,
    /// Minimum dependent count for a hotspot (default: 5).
    #[serde(default = "default_hotspot_dependents")]
    pub hotspot_dependents: u64,
}

fn default_churn_days() -> u64 {
    90
}

fn default_max_files() -> usize {
    20
}

fn default_hotspot_churn() -> u32 {
    10
}

fn default_hotspot_dependents() -> u64 {
    5
}

impl Default for DeepConfig {
    fn default() -> Self {
        Self {
            churn_days: default_churn_days(),
            max_files: default_max_files(),
            hotspot_churn: default_hotspot_churn(),
            hotspot_dependents: default_hotspot_dependents(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_classification_covers_common_layouts() {
        let config = RiskgateConfig::default();
        assert!(config.classify.is_code_file("src/app.tsx"));
        assert!(config.classify.is_code_file("pkg/handler.go"));
        assert!(!config.classify.is_code_file("README.md"));
        assert!(!config.classify.is_code_file("Makefile"));

        assert!(config.classify.is_ignored("dist/bundle.js"));
        assert!(config.classify.is_ignored(".git/HEAD"));
        assert!(!config.classify.is_ignored("src/dist.ts"));
    }

    #[test]
    fn config_file_detection_uses_base_name() {
        let classify = ClassifyConfig::default();
        assert!(classify.is_config_file("package.json"));
        assert!(classify.is_config_file("apps/web/tsconfig.json"));
        assert!(classify.is_config_file(".env.example"));
        assert!(classify.is_config_file("deploy/production.env"));
        assert!(!classify.is_config_file("src/config.ts"));
    }

    #[test]
    fn parse_minimal_toml() {
        let toml = r#"
[classify]
code_extensions = [".rb"]
"#;
        let config = RiskgateConfig::from_toml(toml).unwrap();
        assert!(config.classify.is_code_file("app.rb"));
        assert!(!config.classify.is_code_file("app.ts"));
        // Unset tables keep defaults
        assert_eq!(config.deep.churn_days, 90);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[classify]
code_extensions = [".ts", ".py"]
ignore_prefixes = ["gen/"]
config_files = ["settings.json"]

[blast]
dynamic_import_markers = ["__import__("]
monorepo_markers = ["workspace.json"]

[deep]
churn_days = 30
max_files = 5
hotspot_churn = 3
hotspot_dependents = 2
"#;
        let config = RiskgateConfig::from_toml(toml).unwrap();
        assert!(config.classify.is_ignored("gen/a.ts"));
        assert!(!config.classify.is_ignored("node_modules/a.ts"));
        assert_eq!(config.blast.dynamic_import_markers, vec!["__import__("]);
        assert_eq!(config.deep.max_files, 5);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = RiskgateConfig::from_toml("").unwrap();
        assert_eq!(config.deep.churn_days, 90);
        assert!(config.classify.is_code_file("a.js"));
    }

    #[test]
    fn invalid_toml_returns_error() {
        assert!(RiskgateConfig::from_toml("{{invalid}}").is_err());
    }
}
