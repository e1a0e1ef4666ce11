//! CLI for pdfwatch.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use pdfwatch_core::config::{self, WatchConfig};
use std::path::{Path, PathBuf};

use commands::{run_check, run_checksum, run_reset, run_status, run_watch};

/// Top-level CLI for pdfwatch.
#[derive(Debug, Parser)]
#[command(name = "pdfwatch")]
#[command(
    about = "pdfwatch: mail a linked PDF to a list whenever it changes",
    long_about = None
)]
pub struct Cli {
    /// Config file (default: ~/.config/pdfwatch/config.toml, created on first use).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Where the last fingerprint is stored (overrides `state_file`).
    #[arg(long, global = true, value_name = "PATH")]
    pub state_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Check the page, mail the document if it changed, persist its fingerprint.
    Run {
        #[command(flatten)]
        overrides: RunOverrides,
    },

    /// Report whether the document changed, without mailing or persisting.
    Check {
        /// Page to scan instead of the configured one.
        #[arg(long)]
        url: Option<String>,
    },

    /// Show the stored fingerprint.
    Status,

    /// Forget the stored fingerprint so the next run mails the document again.
    Reset,

    /// Compute SHA-256 of a local file (same digest as the stored fingerprint).
    Checksum {
        /// Path to the file.
        path: String,
    },
}

/// Per-invocation overrides of config.toml for `run`.
#[derive(Debug, Default, Args)]
pub struct RunOverrides {
    /// Page that links to the document.
    #[arg(long)]
    pub url: Option<String>,

    /// Suffix the document link must end with (e.g. ".pdf").
    #[arg(long, value_name = "SUFFIX")]
    pub link_suffix: Option<String>,

    /// Run a single cycle and exit.
    #[arg(long, conflicts_with = "repeat")]
    pub once: bool,

    /// Keep running, one cycle every interval.
    #[arg(long)]
    pub repeat: bool,

    /// Minutes between cycles when repeating.
    #[arg(long, value_name = "MINUTES")]
    pub interval_mins: Option<u64>,

    /// Do not send mail; still persist the new fingerprint.
    #[arg(long)]
    pub no_send: bool,

    /// Comma-separated list of recipient addresses.
    #[arg(long, env = "PDFWATCH_TO", value_name = "ADDRS")]
    pub to: Option<String>,

    /// SMTP account holder (also the From address).
    #[arg(long, env = "PDFWATCH_SMTP_ACCOUNT", value_name = "ADDR")]
    pub from: Option<String>,

    /// SMTP password.
    #[arg(long, env = "PDFWATCH_SMTP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long, value_name = "HOST")]
    pub smtp_host: Option<String>,

    #[arg(long, value_name = "PORT")]
    pub smtp_port: Option<u16>,

    /// Keep a copy of every changed document in this directory.
    #[arg(long, value_name = "DIR")]
    pub save_dir: Option<PathBuf>,
}

impl RunOverrides {
    /// Layer the flags that were given over the loaded config.
    pub fn apply(&self, cfg: &mut WatchConfig) {
        if let Some(url) = &self.url {
            cfg.url = url.clone();
        }
        if let Some(suffix) = &self.link_suffix {
            cfg.link_suffix = suffix.clone();
        }
        if self.once {
            cfg.repeat = false;
        }
        if self.repeat {
            cfg.repeat = true;
        }
        if let Some(mins) = self.interval_mins {
            cfg.interval_mins = mins;
        }
        if self.no_send {
            cfg.send = false;
        }
        if let Some(to) = &self.to {
            cfg.recipients = config::parse_recipients(to);
        }
        if let Some(from) = &self.from {
            cfg.smtp.username = from.clone();
        }
        if let Some(password) = &self.password {
            cfg.smtp.password = Some(password.clone());
        }
        if let Some(host) = &self.smtp_host {
            cfg.smtp.host = host.clone();
        }
        if let Some(port) = self.smtp_port {
            cfg.smtp.port = port;
        }
        if let Some(dir) = &self.save_dir {
            cfg.save_dir = Some(dir.clone());
        }
    }
}

fn load_config(explicit: Option<&Path>) -> Result<WatchConfig> {
    match explicit {
        Some(path) => config::load_from_path(path),
        None => config::load_or_init(),
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // Checksum needs no config.
        if let CliCommand::Checksum { path } = &cli.command {
            return run_checksum(Path::new(path));
        }

        let mut cfg = load_config(cli.config.as_deref())?;
        if let Some(state_file) = cli.state_file {
            cfg.state_file = Some(state_file);
        }

        match cli.command {
            CliCommand::Run { overrides } => {
                overrides.apply(&mut cfg);
                tracing::debug!(
                    url = %cfg.url,
                    repeat = cfg.repeat,
                    send = cfg.send,
                    recipients = cfg.recipients.len(),
                    "effective config"
                );
                run_watch(&cfg)?;
            }
            CliCommand::Check { url } => {
                if let Some(url) = url {
                    cfg.url = url;
                }
                run_check(&cfg)?;
            }
            CliCommand::Status => run_status(&cfg)?,
            CliCommand::Reset => run_reset(&cfg)?,
            CliCommand::Checksum { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
