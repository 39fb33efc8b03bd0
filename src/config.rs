use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration file structure for RepoLens.
///
/// Holds endpoints, credentials and limits for every external collaborator
/// of the analysis pipeline. Configuration files are loaded from the current
/// directory, the user config directory, or a specified path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// GitHub REST and raw-content endpoints
    #[serde(default)]
    pub github: GitHubConfig,

    /// Text-generation backend settings
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Local clone settings
    #[serde(default)]
    pub snapshot: SnapshotConfig,

    /// Output format preferences
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitHubConfig {
    /// GitHub personal access token
    pub token: Option<String>,

    /// GitHub REST API base URL
    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    /// Base URL serving raw file contents
    #[serde(default = "default_github_raw_url")]
    pub raw_url: String,

    /// Base URL used to build clone URLs
    #[serde(default = "default_github_web_url")]
    pub web_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_github_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SynthesisConfig {
    /// Gemini API key
    pub api_key: Option<String>,

    /// Gemini API base URL
    #[serde(default = "default_synthesis_url")]
    pub base_url: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_synthesis_timeout")]
    pub timeout_secs: u64,

    /// Number of similarity prompts allowed in flight at once
    #[serde(default = "default_similarity_concurrency")]
    pub similarity_concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SnapshotConfig {
    /// Parent directory for temporary clones (defaults to the OS temp dir)
    pub checkout_parent: Option<PathBuf>,

    /// Git executable used for cloning
    #[serde(default = "default_git_binary")]
    pub git_binary: String,

    /// Clone timeout in seconds
    #[serde(default = "default_clone_timeout")]
    pub clone_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Default output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Summary,
    Json,
    Yaml,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_github_api_url(),
            raw_url: default_github_raw_url(),
            web_url: default_github_web_url(),
            timeout_secs: default_github_timeout(),
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_synthesis_url(),
            model: default_model(),
            timeout_secs: default_synthesis_timeout(),
            similarity_concurrency: default_similarity_concurrency(),
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            checkout_parent: None,
            git_binary: default_git_binary(),
            clone_timeout_secs: default_clone_timeout(),
        }
    }
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_github_raw_url() -> String {
    "https://raw.githubusercontent.com".to_string()
}

fn default_github_web_url() -> String {
    "https://github.com".to_string()
}

fn default_github_timeout() -> u64 {
    30
}

fn default_synthesis_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_synthesis_timeout() -> u64 {
    120
}

fn default_similarity_concurrency() -> usize {
    3
}

fn default_git_binary() -> String {
    "git".to_string()
}

fn default_clone_timeout() -> u64 {
    300
}

impl GitHubConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SynthesisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SnapshotConfig {
    pub fn clone_timeout(&self) -> Duration {
        Duration::from_secs(self.clone_timeout_secs)
    }
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./repolens.toml
    /// 3. ./repolens.json
    /// 4. ./repolens.yaml
    /// 5. ./repolens.yml
    /// 6. `<config dir>/repolens/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if path.exists() {
                return Self::load_from_path(path);
            }
            log::warn!("Config file not found: {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let candidates = [
            "repolens.toml",
            "repolens.json",
            "repolens.yaml",
            "repolens.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        if let Some(user_config) = dirs::config_dir().map(|dir| dir.join("repolens").join("config.toml")) {
            if user_config.exists() {
                return Self::load_from_path(&user_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        let config: Self = match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        };

        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}
