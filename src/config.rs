use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::sweep::staleness::Thresholds;

const CANDIDATES: [&str; 4] = [
    "stalemate.toml",
    "stalemate.json",
    "stalemate.yaml",
    "stalemate.yml",
];

/// Configuration file structure for stalemate.
///
/// Holds the connection settings for the three services and the sweep
/// thresholds, so a scheduled job only has to pass tokens and `--dry-run`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub gitlab: GitLabConfig,

    #[serde(default)]
    pub jira: JiraConfig,

    #[serde(default)]
    pub slack: SlackConfig,

    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitLabConfig {
    /// GitLab personal access token
    pub token: Option<String>,

    /// GitLab instance base URL
    #[serde(default = "default_gitlab_base_url")]
    pub base_url: String,

    /// Project ID or path (e.g., '42' or 'group/project')
    pub project: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JiraConfig {
    /// Jira personal access token (sent as a bearer token)
    pub token: Option<String>,

    /// Jira instance base URL
    pub base_url: Option<String>,

    /// Status name that makes a linked merge request expire
    #[serde(default = "default_closed_status")]
    pub closed_status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SlackConfig {
    /// Slack bot token
    pub token: Option<String>,

    /// Slack Web API base URL
    #[serde(default = "default_slack_api_url")]
    pub api_url: String,

    /// Channel the summary is posted to
    pub channel_id: Option<String>,

    /// Mail domain of GitLab users (e.g., 'example.com')
    pub email_domain: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Summary,
    Json,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_gitlab_base_url(),
            project: None,
        }
    }
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: None,
            closed_status: default_closed_status(),
        }
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_slack_api_url(),
            channel_id: None,
            email_domain: None,
        }
    }
}

fn default_gitlab_base_url() -> String {
    "https://gitlab.com".to_string()
}

fn default_slack_api_url() -> String {
    "https://slack.com/api".to_string()
}

fn default_closed_status() -> String {
    "Closed".to_string()
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./stalemate.toml, ./stalemate.json, ./stalemate.yaml, ./stalemate.yml
    /// 3. `<user config dir>/stalemate/config.toml`
    ///
    /// Returns default configuration if no file is found. A specified path
    /// that does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        if let Some(path) = Self::find_in(Path::new(".")) {
            return Self::load_from_path(&path);
        }

        if let Some(path) = Self::user_config_path().filter(|p| p.exists()) {
            return Self::load_from_path(&path);
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// First candidate file name that exists in `dir`.
    fn find_in(dir: &Path) -> Option<PathBuf> {
        CANDIDATES
            .iter()
            .map(|candidate| dir.join(candidate))
            .find(|path| path.exists())
    }

    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stalemate").join("config.toml"))
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        log::info!("Loading config from {}", path.display());

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => {
                // Try TOML first, then JSON, then YAML
                toml::from_str(&contents)
                    .or_else(|_| serde_json::from_str(&contents))
                    .or_else(|_| serde_yaml::from_str(&contents))
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))
            }
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("yaml" | "yml") => serde_yaml::to_string(self)?,
            _ => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.gitlab.base_url, "https://gitlab.com");
        assert_eq!(config.slack.api_url, "https://slack.com/api");
        assert_eq!(config.jira.closed_status, "Closed");
        assert_eq!(config.thresholds.stale_mr_months, 2);
        assert_eq!(config.thresholds.expired_mr_months, 3);
        assert_eq!(config.thresholds.stale_branch_months, 6);
        assert_eq!(config.output.format, OutputFormat::Summary);
    }

    #[test]
    fn test_load_toml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r#"
[gitlab]
base-url = "https://gitlab.example.com"
project = "group/app"

[jira]
base-url = "https://jira.example.com"
closed-status = "Done"

[slack]
channel-id = "C0123"
email-domain = "example.com"

[thresholds]
stale-mr-months = 1
expired-mr-months = 4

[output]
format = "json"
pretty = true
"#;
        write!(temp_file, "{toml_content}").unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.gitlab.base_url, "https://gitlab.example.com");
        assert_eq!(config.gitlab.project.as_deref(), Some("group/app"));
        assert_eq!(config.jira.closed_status, "Done");
        assert_eq!(config.slack.channel_id.as_deref(), Some("C0123"));
        assert_eq!(config.slack.api_url, "https://slack.com/api");
        assert_eq!(config.thresholds.stale_mr_months, 1);
        assert_eq!(config.thresholds.expired_mr_months, 4);
        assert_eq!(config.thresholds.stale_branch_months, 6);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_load_json_config() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        let json_content = r#"{
  "gitlab": {
    "token": "glpat-json-token",
    "project": "42"
  },
  "slack": {
    "api-url": "https://slack.internal/api"
  }
}"#;
        write!(temp_file, "{json_content}").unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.gitlab.token.as_deref(), Some("glpat-json-token"));
        assert_eq!(config.gitlab.base_url, "https://gitlab.com");
        assert_eq!(config.slack.api_url, "https://slack.internal/api");
    }

    #[test]
    fn test_load_yaml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".yml").unwrap();
        write!(
            temp_file,
            "jira:\n  base-url: https://jira.example.com\nthresholds:\n  stale-branch-months: 12\n"
        )
        .unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.jira.base_url.as_deref(), Some("https://jira.example.com"));
        assert_eq!(config.thresholds.stale_branch_months, 12);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let err = Config::load(Some(Path::new("does-not-exist/stalemate.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_find_in_prefers_toml_candidate() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("stalemate.yaml"), "{}").unwrap();
        std::fs::write(temp_dir.path().join("stalemate.toml"), "").unwrap();

        let found = Config::find_in(temp_dir.path()).unwrap();
        assert_eq!(found, temp_dir.path().join("stalemate.toml"));
    }

    #[test]
    fn test_find_in_empty_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(Config::find_in(temp_dir.path()).is_none());
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("stalemate.toml");

        let mut config = Config::default();
        config.gitlab.project = Some("group/app".to_string());
        config.slack.email_domain = Some("example.com".to_string());
        config.save(&path).unwrap();

        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(saved.contains("email-domain = \"example.com\""));

        let reloaded = Config::load(Some(&path)).unwrap();
        assert_eq!(reloaded.gitlab.project.as_deref(), Some("group/app"));
        assert_eq!(reloaded.slack.email_domain.as_deref(), Some("example.com"));
    }
}
