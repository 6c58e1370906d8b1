//! Application configuration for the playground pipeline.
//!
//! User config lives at `~/.playground/playground.toml`.
//! CLI flags override config file values, which override defaults.
//! API keys are never stored in the file, only the names of the
//! environment variables that hold them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PlaygroundError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "playground.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".playground";

/// Browser-like User-Agent sent with document fetches to get past trivial bot blocking.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// ---------------------------------------------------------------------------
// Config structs (matching playground.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generation backend settings.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Document fetch settings shared by URL-based tools.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Per-tool tuning.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Contact form relay.
    #[serde(default)]
    pub contact: ContactConfig,
}

/// `[generation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Name of the env var holding the API key.
    #[serde(default = "default_generation_key_env")]
    pub api_key_env: String,

    /// Model identifier passed to the backend.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the Generative Language API.
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    /// Deadline for a single generation call in seconds. `0` disables it.
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_generation_key_env(),
            model: default_model(),
            base_url: default_generation_base_url(),
            timeout_secs: default_generation_timeout(),
        }
    }
}

fn default_generation_key_env() -> String {
    "GOOGLE_GENERATIVE_AI_API_KEY".into()
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_generation_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn default_generation_timeout() -> u64 {
    60
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header for document fetches.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept header for document fetches.
    #[serde(default = "default_accept")]
    pub accept: String,

    /// Accept-Language header for document fetches.
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Raw bodies shorter than this many characters are rejected.
    #[serde(default = "default_min_body_chars")]
    pub min_body_chars: usize,

    /// Maximum redirects followed per fetch.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Refuse loopback/private/link-local targets.
    #[serde(default = "default_true")]
    pub block_private_hosts: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept: default_accept(),
            accept_language: default_accept_language(),
            min_body_chars: default_min_body_chars(),
            max_redirects: default_max_redirects(),
            block_private_hosts: true,
        }
    }
}

fn default_user_agent() -> String {
    BROWSER_USER_AGENT.into()
}
fn default_accept() -> String {
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".into()
}
fn default_accept_language() -> String {
    "en-US,en;q=0.9".into()
}
fn default_min_body_chars() -> usize {
    100
}
fn default_max_redirects() -> usize {
    5
}
fn default_true() -> bool {
    true
}

/// `[tools]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// `[tools.repurpose]`
    #[serde(default = "default_repurpose")]
    pub repurpose: DocumentToolConfig,

    /// `[tools.scout]`
    #[serde(default = "default_scout")]
    pub scout: DocumentToolConfig,

    /// `[tools.extract]`
    #[serde(default)]
    pub extract: ExtractToolConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            repurpose: default_repurpose(),
            scout: default_scout(),
            extract: ExtractToolConfig::default(),
        }
    }
}

fn default_repurpose() -> DocumentToolConfig {
    DocumentToolConfig {
        max_chars: 5_000,
        fetch_timeout_secs: default_fetch_timeout(),
    }
}
fn default_scout() -> DocumentToolConfig {
    DocumentToolConfig {
        max_chars: 6_000,
        fetch_timeout_secs: default_fetch_timeout(),
    }
}

/// Settings for a tool that fetches a remote document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentToolConfig {
    /// Cap on cleaned document text passed into the prompt, in characters.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Deadline for the document fetch in seconds. `0` disables it.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_max_chars() -> usize {
    5_000
}
fn default_fetch_timeout() -> u64 {
    10
}

/// How the extraction tool obtains structured output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Declare an array-of-records schema and let the backend enforce it.
    #[default]
    Schema,
    /// Free-text generation, then locate and parse the embedded JSON array.
    Text,
}

/// `[tools.extract]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractToolConfig {
    #[serde(default)]
    pub mode: ExtractionMode,
}

/// `[contact]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactConfig {
    /// Name of the env var holding the email API key.
    #[serde(default = "default_contact_key_env")]
    pub api_key_env: String,

    /// Base URL of the email API.
    #[serde(default = "default_contact_base_url")]
    pub base_url: String,

    /// Sender address.
    #[serde(default = "default_contact_from")]
    pub from: String,

    /// Inbox that receives inquiries.
    #[serde(default)]
    pub to: String,

    /// Prefix for the email subject line.
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,

    /// Deadline for the email API call in seconds.
    #[serde(default = "default_contact_timeout")]
    pub timeout_secs: u64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_contact_key_env(),
            base_url: default_contact_base_url(),
            from: default_contact_from(),
            to: String::new(),
            subject_prefix: default_subject_prefix(),
            timeout_secs: default_contact_timeout(),
        }
    }
}

fn default_contact_key_env() -> String {
    "RESEND_API_KEY".into()
}
fn default_contact_base_url() -> String {
    "https://api.resend.com".into()
}
fn default_contact_from() -> String {
    "Contact <onboarding@resend.dev>".into()
}
fn default_subject_prefix() -> String {
    "[Portfolio]".into()
}
fn default_contact_timeout() -> u64 {
    15
}

// ---------------------------------------------------------------------------
// Pipeline config (runtime, derived once from AppConfig)
// ---------------------------------------------------------------------------

/// Runtime limits for one document-based tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentLimits {
    /// Maximum characters of cleaned text kept.
    pub max_chars: usize,
    /// Fetch deadline; `None` means no deadline.
    pub timeout: Option<Duration>,
}

impl From<&DocumentToolConfig> for DocumentLimits {
    fn from(config: &DocumentToolConfig) -> Self {
        Self {
            max_chars: config.max_chars,
            timeout: secs_to_deadline(config.fetch_timeout_secs),
        }
    }
}

/// Runtime pipeline configuration, constructed once at startup and injected.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Document fetch settings.
    pub fetch: FetchConfig,
    /// Limits for the repurpose tool.
    pub repurpose: DocumentLimits,
    /// Limits for the scout tool.
    pub scout: DocumentLimits,
    /// Output strategy for the extraction tool.
    pub extraction_mode: ExtractionMode,
    /// Deadline for each generation call.
    pub generation_timeout: Option<Duration>,
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            fetch: config.fetch.clone(),
            repurpose: DocumentLimits::from(&config.tools.repurpose),
            scout: DocumentLimits::from(&config.tools.scout),
            extraction_mode: config.tools.extract.mode,
            generation_timeout: secs_to_deadline(config.generation.timeout_secs),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// `0` disables a deadline.
fn secs_to_deadline(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.playground/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PlaygroundError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.playground/playground.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| PlaygroundError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        PlaygroundError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PlaygroundError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PlaygroundError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PlaygroundError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read an API key from the named environment variable.
pub fn resolve_api_key(var_name: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(PlaygroundError::config(format!(
            "API key not found. Set the {var_name} environment variable."
        ))),
    }
}
