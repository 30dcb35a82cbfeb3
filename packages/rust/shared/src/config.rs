//! Application configuration for schoolscout.
//!
//! User config lives at `~/.schoolscout/schoolscout.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoutError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "schoolscout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".schoolscout";

// ---------------------------------------------------------------------------
// Config structs (matching schoolscout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Search-provider settings.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Draft-generation settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Crawl politeness settings.
    #[serde(default)]
    pub crawl: CrawlPolicyConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default locality for discovery.
    #[serde(default = "default_locality")]
    pub locality: String,

    /// Default maximum discovery results.
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Default search provider name.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Directory for outreach draft files.
    #[serde(default = "default_drafts_dir")]
    pub drafts_dir: String,

    /// Directory for call brief files.
    #[serde(default = "default_briefs_dir")]
    pub briefs_dir: String,

    /// Path of the lead database.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            locality: default_locality(),
            max_results: default_max_results(),
            provider: default_provider(),
            drafts_dir: default_drafts_dir(),
            briefs_dir: default_briefs_dir(),
            db_path: default_db_path(),
        }
    }
}

fn default_locality() -> String {
    "Downey, CA".into()
}
fn default_max_results() -> u32 {
    25
}
fn default_provider() -> String {
    "serpapi".into()
}
fn default_drafts_dir() -> String {
    "outreach_drafts".into()
}
fn default_briefs_dir() -> String {
    "call_briefs".into()
}
fn default_db_path() -> String {
    "~/.schoolscout/leads.db".into()
}

/// `[providers]` section.
///
/// Names of env vars holding provider API keys — never the keys themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Env var holding the SerpAPI key.
    #[serde(default = "default_serpapi_key_env")]
    pub serpapi_key_env: String,

    /// Env var holding the Brave Search key.
    #[serde(default = "default_brave_key_env")]
    pub brave_key_env: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            serpapi_key_env: default_serpapi_key_env(),
            brave_key_env: default_brave_key_env(),
        }
    }
}

fn default_serpapi_key_env() -> String {
    "SERPAPI_API_KEY".into()
}
fn default_brave_key_env() -> String {
    "BRAVE_SEARCH_API_KEY".into()
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Env var holding the API key (never store the key itself).
    #[serde(default = "default_llm_key_env")]
    pub api_key_env: String,

    /// Model used for draft generation.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_llm_key_env(),
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

fn default_llm_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.3
}

/// `[crawl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlPolicyConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Whether to respect robots.txt.
    #[serde(default = "default_true")]
    pub respect_robots_txt: bool,
}

impl Default for CrawlPolicyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            respect_robots_txt: true,
        }
    }
}

fn default_timeout_secs() -> u64 {
    20
}
fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.schoolscout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.schoolscout/schoolscout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ScoutError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ScoutError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Expand a leading `~/` in a configured path to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

/// Read a required API key from the env var named in config.
/// Missing or empty keys are fatal configuration errors.
pub fn require_api_key(var_name: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(ScoutError::config(format!(
            "API key not found. Set the {var_name} environment variable."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("drafts_dir"));
        assert!(toml_str.contains("SERPAPI_API_KEY"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.max_results, 25);
        assert_eq!(parsed.crawl.timeout_secs, 20);
        assert!(parsed.crawl.respect_robots_txt);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
locality = "Pasadena, CA"

[llm]
model = "gpt-4o"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.locality, "Pasadena, CA");
        assert_eq!(config.defaults.provider, "serpapi");
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let result = require_api_key("SCOUT_TEST_NONEXISTENT_KEY_12345");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }

    #[test]
    fn expand_home_passthrough() {
        assert_eq!(expand_home("/tmp/leads.db"), PathBuf::from("/tmp/leads.db"));
        assert_eq!(expand_home("relative/leads.db"), PathBuf::from("relative/leads.db"));
    }
}
