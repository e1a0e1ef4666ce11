use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::notify::SmtpAccount;

pub const DEFAULT_URL: &str = "https://www.daysofwonder.com/memoir44/en/mini-campaigns/remembrance";

/// SMTP relay settings (`[smtp]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Account holder; doubles as the `From` address.
    #[serde(default)]
    pub username: String,
    /// Prefer `PDFWATCH_SMTP_PASSWORD` over storing this on disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            username: String::new(),
            password: None,
        }
    }
}

/// Global configuration loaded from `~/.config/pdfwatch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Page that links to the tracked document.
    pub url: String,
    /// Suffix the document link must end with.
    pub link_suffix: String,
    /// Keep running and re-check every `interval_mins`; otherwise run one cycle.
    pub repeat: bool,
    pub interval_mins: u64,
    /// Actually send mail on change (off = log "mail skipped" and still persist).
    pub send: bool,
    #[serde(default)]
    pub recipients: Vec<String>,
    /// Name used in the mail subject and greeting.
    pub label: String,
    /// Where the last fingerprint lives (None = XDG state default).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
    /// Optional directory that keeps a copy of every changed document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_dir: Option<PathBuf>,
    /// Total timeout for each HTTP GET, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub smtp: SmtpConfig,
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            link_suffix: crate::discover::DEFAULT_SUFFIX.to_string(),
            repeat: true,
            interval_mins: 480,
            send: true,
            recipients: Vec::new(),
            label: "Memoir '44".to_string(),
            state_file: None,
            save_dir: None,
            request_timeout_secs: default_request_timeout_secs(),
            smtp: SmtpConfig::default(),
        }
    }
}

impl WatchConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_mins.saturating_mul(60))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn page_url(&self) -> Result<url::Url> {
        url::Url::parse(&self.url).with_context(|| format!("invalid url {:?}", self.url))
    }

    /// Fingerprint file: configured path or `~/.local/state/pdfwatch/last_hash`.
    pub fn state_path(&self) -> Result<PathBuf> {
        match &self.state_file {
            Some(p) => Ok(p.clone()),
            None => crate::state::HashStore::default_path(),
        }
    }

    pub fn smtp_account(&self) -> SmtpAccount {
        SmtpAccount {
            host: self.smtp.host.clone(),
            port: self.smtp.port,
            username: self.smtp.username.clone(),
            password: self.smtp.password.clone().unwrap_or_default(),
        }
    }

    /// Reject settings a cycle could never succeed with.
    /// Settings a single check depends on: page URL, link suffix, timeout.
    pub fn validate_target(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            anyhow::bail!("no url specified");
        }
        self.page_url()?;
        if self.link_suffix.is_empty() {
            anyhow::bail!("link_suffix must not be empty");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be > 0");
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_target()?;
        if self.repeat && self.interval_mins == 0 {
            anyhow::bail!("interval_mins must be > 0 when repeating");
        }
        if self.send {
            if self.recipients.is_empty() {
                anyhow::bail!("sending is enabled but no recipients are configured");
            }
            if self.smtp.username.trim().is_empty() {
                anyhow::bail!("sending is enabled but no smtp account is configured");
            }
        }
        Ok(())
    }
}

/// Split a comma-separated address list; blanks are dropped.
pub fn parse_recipients(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pdfwatch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<WatchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = WatchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit path (must exist).
pub fn load_from_path(path: &Path) -> Result<WatchConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: WatchConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
