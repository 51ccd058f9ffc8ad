//! Configuration loading.
//!
//! Settings come from a YAML file; secrets can be overridden by
//! environment variables so tokens never have to live on disk.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::schedule::ScheduleSpec;

/// Default DeepSeek API base URL.
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.deepseek.com";

/// Default summarization model.
pub const DEFAULT_LLM_MODEL: &str = "deepseek-chat";

/// Paths tried when no `--config` is given. The second one is the
/// container mount point.
const DEFAULT_CONFIG_PATHS: &[&str] = &["config.yaml", "/app/config/config.yaml"];

/// Notion connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionConfig {
    /// Integration token.
    #[serde(default)]
    pub token: String,
    /// Database holding the task tracker.
    pub task_database_id: String,
    /// Database that receives published reports.
    pub report_database_id: String,
}

/// Summarization API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key for the completion provider.
    #[serde(default)]
    pub api_key: String,
    /// Base URL for OpenAI-compatible providers.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Model identifier.
    #[serde(default = "default_llm_model")]
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_llm_base_url(),
            model: default_llm_model(),
        }
    }
}

/// When the scheduler fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Weekday name (monday..sunday).
    #[serde(default = "default_schedule_day")]
    pub day: String,
    /// Local time of day, HH:MM.
    #[serde(default = "default_schedule_time")]
    pub time: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            day: default_schedule_day(),
            time: default_schedule_time(),
        }
    }
}

/// Report content settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include in-progress tasks in the report.
    #[serde(default = "default_true")]
    pub include_in_progress: bool,
    /// Include completed tasks in the report.
    #[serde(default = "default_true")]
    pub include_completed: bool,
    /// Publish a no-activity report when the week has no tasks.
    /// When false the run completes without writing to Notion.
    #[serde(default = "default_true")]
    pub publish_when_empty: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_in_progress: true,
            include_completed: true,
            publish_when_empty: true,
        }
    }
}

/// GitHub commit enrichment settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Enable commit lookup for tasks that link a repository.
    #[serde(default)]
    pub enabled: bool,
    /// Personal access token (optional, raises the rate limit).
    #[serde(default)]
    pub token: Option<String>,
}

/// Application settings, loaded once per process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub notion: NotionConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub github: GithubConfig,
}

impl Settings {
    /// Load settings from an explicit path, or discover one of the
    /// default locations.
    pub fn discover(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => DEFAULT_CONFIG_PATHS
                .iter()
                .copied()
                .map(PathBuf::from)
                .find(|p| p.exists())
                .with_context(|| {
                    format!(
                        "no config file found (tried: {})",
                        DEFAULT_CONFIG_PATHS.join(", ")
                    )
                })?,
        };
        Self::load(&path)
    }

    /// Load and validate settings from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let mut settings: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config file: {}", path.display()))?;

        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    /// Environment variables win over file values for secrets.
    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("NOTION_TOKEN") {
            self.notion.token = token;
        }
        if let Ok(key) = std::env::var("DEEPSEEK_API_KEY") {
            self.llm.api_key = key;
        }
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            self.github.token = Some(token);
        }
    }

    /// Reject configurations that cannot possibly run.
    fn validate(&self) -> Result<()> {
        if self.notion.token.trim().is_empty() {
            bail!("notion.token is empty (set it in the config file or via NOTION_TOKEN)");
        }
        if self.notion.task_database_id.trim().is_empty() {
            bail!("notion.task_database_id is empty");
        }
        if self.notion.report_database_id.trim().is_empty() {
            bail!("notion.report_database_id is empty");
        }
        // Fails on an unknown weekday or malformed time
        ScheduleSpec::parse(&self.schedule.day, &self.schedule.time)?;
        Ok(())
    }
}

fn default_llm_base_url() -> String {
    DEFAULT_LLM_BASE_URL.to_string()
}

fn default_llm_model() -> String {
    DEFAULT_LLM_MODEL.to_string()
}

fn default_schedule_day() -> String {
    "friday".to_string()
}

fn default_schedule_time() -> String {
    "16:30".to_string()
}

fn default_true() -> bool {
    true
}
