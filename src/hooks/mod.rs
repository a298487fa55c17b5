//! Item-complete hook and its shell command implementation.
//!
//! After a role's timer is confirmed stopped, an optional hook can run to
//! record the result elsewhere (a club spreadsheet, a chat message, etc.).

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::agenda::AgendaItem;
use crate::timing::{CueRecord, QualificationStatus, RoleCategory, StopOutcome};

/// Environment variable names for role metadata passed to hooks.
pub mod hook_env {
    pub const ITEM_ID: &str = "GAVEL_ITEM_ID";
    pub const ROLE: &str = "GAVEL_ROLE";
    pub const SPEAKER: &str = "GAVEL_SPEAKER";
    pub const ELAPSED_SECONDS: &str = "GAVEL_ELAPSED_SECONDS";
    pub const STATUS: &str = "GAVEL_STATUS";
}

/// A finalized role, as handed to hooks.
#[derive(Debug, Clone, Serialize)]
pub struct ItemResult {
    pub item_id: Uuid,
    pub role_name: String,
    pub speaker_name: String,
    pub category: RoleCategory,
    pub target_seconds: i64,
    pub elapsed_seconds: f64,
    pub status: QualificationStatus,
    pub cue_log: Vec<CueRecord>,
}

impl ItemResult {
    pub fn new(item: &AgendaItem, outcome: &StopOutcome) -> Self {
        Self {
            item_id: item.id,
            role_name: item.role_name.clone(),
            speaker_name: item.speaker_name.clone(),
            category: item.category,
            target_seconds: item.target_seconds(),
            elapsed_seconds: outcome.elapsed_seconds,
            status: outcome.status,
            cue_log: outcome.cue_log.clone(),
        }
    }
}

#[async_trait]
pub trait ItemCompleteHook: Send + Sync {
    async fn execute(&self, result: &ItemResult) -> Result<()>;
}

/// Runs a shell command for each finalized role.
/// - Pipes the result JSON to stdin
/// - Sets environment variables for the role
/// - Kills the process on timeout
/// - Non-zero exit logs a warning but does not fail
pub struct ShellCommandHook {
    command: String,
    timeout: Duration,
}

impl ShellCommandHook {
    pub fn new(command: String, timeout_seconds: u64) -> Self {
        Self {
            command,
            timeout: Duration::from_secs(timeout_seconds),
        }
    }

    /// `None` when no command is configured.
    pub fn from_config(config: &crate::config::HooksConfig) -> Option<Self> {
        let command = config.item_complete_command.trim();
        if command.is_empty() {
            return None;
        }
        Some(Self::new(command.to_string(), config.timeout_seconds))
    }
}

#[async_trait]
impl ItemCompleteHook for ShellCommandHook {
    async fn execute(&self, result: &ItemResult) -> Result<()> {
        info!(
            "Running item-complete hook for '{}': {}",
            result.role_name, self.command
        );

        let payload = serde_json::to_vec(result).context("Failed to serialize item result")?;

        let mut child = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .env(hook_env::ITEM_ID, result.item_id.to_string())
            .env(hook_env::ROLE, &result.role_name)
            .env(hook_env::SPEAKER, &result.speaker_name)
            .env(
                hook_env::ELAPSED_SECONDS,
                format!("{:.0}", result.elapsed_seconds),
            )
            .env(hook_env::STATUS, result.status.as_str())
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .context("Failed to spawn item-complete hook")?;

        if let Some(mut stdin) = child.stdin.take() {
            use tokio::io::AsyncWriteExt;
            let _ = stdin.write_all(&payload).await;
        }

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                if output.status.success() {
                    let stdout = String::from_utf8_lossy(&output.stdout);
                    if !stdout.is_empty() {
                        info!("Item-complete hook stdout: {}", stdout.trim());
                    }
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!(
                        "Item-complete hook exited with status {}: {}",
                        output.status,
                        stderr.trim()
                    );
                }
            }
            Ok(Err(e)) => {
                warn!("Item-complete hook failed to execute: {}", e);
            }
            Err(_) => {
                warn!(
                    "Item-complete hook timed out after {}s (process will be killed)",
                    self.timeout.as_secs()
                );
            }
        }

        Ok(())
    }
}
