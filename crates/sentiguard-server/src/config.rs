//! Server configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Server configuration, loaded from YAML with CLI overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the parent dashboard, used in alert emails
    #[serde(default = "default_dashboard_url")]
    pub dashboard_url: String,

    /// JSONL journal path; in-memory only when unset
    #[serde(default)]
    pub journal_path: Option<String>,

    /// Operator file seeding the monitored-account pool
    #[serde(default)]
    pub accounts_file: Option<String>,

    /// Seconds between background sweeps; 0 disables the scheduler
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Alert delivery configuration
    #[serde(default)]
    pub mailer: MailerConfig,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &crate::Cli) -> anyhow::Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        if let Some(journal) = &cli.journal {
            config.journal_path = Some(journal.clone());
        }

        if let Some(accounts) = &cli.accounts {
            config.accounts_file = Some(accounts.clone());
        }

        if let Some(url) = &cli.dashboard_url {
            config.dashboard_url = url.clone();
        }

        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            dashboard_url: default_dashboard_url(),
            journal_path: None,
            accounts_file: None,
            sweep_interval_secs: default_sweep_interval(),
            mailer: MailerConfig::default(),
        }
    }
}

/// Alert delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    /// Delivery mode
    #[serde(default)]
    pub mode: MailerMode,

    /// Mail-provider HTTP endpoint (http mode)
    #[serde(default)]
    pub endpoint: String,

    /// Provider API key (http mode)
    #[serde(default)]
    pub api_key: String,

    /// Sender address
    #[serde(default = "default_from")]
    pub from: String,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            mode: MailerMode::Log,
            endpoint: String::new(),
            api_key: String::new(),
            from: default_from(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MailerMode {
    /// Log messages instead of delivering them
    #[default]
    Log,
    /// POST messages to a mail-provider HTTP endpoint
    Http,
}

fn default_dashboard_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_sweep_interval() -> u64 {
    600
}

fn default_from() -> String {
    "alerts@sentiguard.app".to_string()
}
