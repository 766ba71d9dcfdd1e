use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required setting {0} (set it in the config file or environment)")]
    Missing(&'static str),
}

pub const DEFAULT_CONFIG_PATH: &str = ".backport-tracker.toml";
const DEFAULT_API_URL: &str = "https://api.github.com";

/// Raw on-disk shape of .backport-tracker.toml. Every field is optional in
/// the file; resolution fails only when a required value is absent from both
/// the file and the environment.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    jira: JiraSection,
    #[serde(default)]
    github: GitHubSection,
    downstream_org: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct JiraSection {
    url: Option<String>,
    user: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GitHubSection {
    token: Option<String>,
    api_url: Option<String>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub jira: JiraConfig,
    pub github: GitHubConfig,
    /// Organization holding the downstream forks being audited
    pub downstream_org: String,
}

#[derive(Debug, Clone)]
pub struct JiraConfig {
    pub url: String,
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub token: String,
    pub api_url: String,
}

impl Config {
    /// Load and resolve configuration. An explicit path must be readable; the
    /// default path may be absent when the environment supplies every
    /// required value. Environment fallbacks: JIRA_URL, JIRA_USER,
    /// JIRA_PASSWORD, GITHUB_TOKEN.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let file = match path {
            Some(path) => read_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    read_file(default)?
                } else {
                    ConfigFile::default()
                }
            }
        };
        Config::resolve(file, |name| std::env::var(name).ok())
    }

    fn resolve(
        file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Config, ConfigError> {
        let jira_url = file
            .jira
            .url
            .or_else(|| env("JIRA_URL"))
            .ok_or(ConfigError::Missing("jira.url"))?;
        let jira_user = file
            .jira
            .user
            .or_else(|| env("JIRA_USER"))
            .ok_or(ConfigError::Missing("jira.user"))?;
        let jira_password = file
            .jira
            .password
            .or_else(|| env("JIRA_PASSWORD"))
            .ok_or(ConfigError::Missing("jira.password"))?;
        let github_token = file
            .github
            .token
            .or_else(|| env("GITHUB_TOKEN"))
            .ok_or(ConfigError::Missing("github.token"))?;
        let downstream_org = file
            .downstream_org
            .ok_or(ConfigError::Missing("downstream_org"))?;
        let api_url = file
            .github
            .api_url
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Config {
            jira: JiraConfig {
                url: jira_url.trim_end_matches('/').to_string(),
                user: jira_user,
                password: jira_password,
            },
            github: GitHubConfig {
                token: github_token,
                api_url: api_url.trim_end_matches('/').to_string(),
            },
            downstream_org,
        })
    }
}

fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}
