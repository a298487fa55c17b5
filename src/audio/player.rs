//! External audio player lookup and playback.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tracing::debug;
use which::which;

/// Players tried in order when none is configured.
const PLAYERS: &[&str] = &["paplay", "aplay", "afplay"];

const PLAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuePlayer {
    program: PathBuf,
}

impl CuePlayer {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    /// Resolve the configured player, or the first known one on PATH.
    pub fn detect(configured: Option<&str>) -> Result<Self> {
        if let Some(name) = configured.map(str::trim).filter(|n| !n.is_empty()) {
            let program =
                which(name).with_context(|| format!("Configured player '{}' not found", name))?;
            return Ok(Self::new(program));
        }

        PLAYERS
            .iter()
            .find_map(|name| which(name).ok())
            .map(Self::new)
            .ok_or_else(|| anyhow!("No audio player found (tried {})", PLAYERS.join(", ")))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub async fn play(&self, file: &Path) -> Result<()> {
        debug!("Playing {:?} with {:?}", file, self.program);

        let mut child = tokio::process::Command::new(&self.program)
            .arg(file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start {:?}", self.program))?;

        let stderr = child.stderr.take();
        let status = tokio::time::timeout(PLAY_TIMEOUT, child.wait())
            .await
            .map_err(|_| anyhow!("Audio player timed out"))??;

        if !status.success() {
            let mut message = String::new();
            if let Some(mut stderr) = stderr {
                use tokio::io::AsyncReadExt;
                let _ = stderr.read_to_string(&mut message).await;
            }
            return Err(anyhow!(
                "Audio player exited with {}: {}",
                status,
                message.trim()
            ));
        }

        Ok(())
    }
}
