//! Where fired cues go.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::player::CuePlayer;
use super::tone::{render_cue, write_wav, SAMPLE_RATE};
use crate::timing::CueEvent;

/// A cue fired for one agenda item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CueNotice {
    pub item_id: Uuid,
    pub role_name: String,
    pub cue: CueEvent,
    pub elapsed_seconds: f64,
}

#[async_trait]
pub trait CueSink: Send + Sync {
    async fn deliver(&self, notice: &CueNotice) -> Result<()>;
}

/// Writes every cue to the log.
pub struct LogCueSink;

#[async_trait]
impl CueSink for LogCueSink {
    async fn deliver(&self, notice: &CueNotice) -> Result<()> {
        info!(
            "{} for '{}' at {:.0}s: {}",
            notice.cue,
            notice.role_name,
            notice.elapsed_seconds,
            notice.cue.zone().instruction()
        );
        Ok(())
    }
}

/// Plays a pre-rendered tone per cue.
pub struct AudioCueSink {
    player: Arc<CuePlayer>,
    tones: Vec<(CueEvent, PathBuf)>,
}

impl AudioCueSink {
    /// Render all cue tones into `dir` and pair them with `player`.
    pub fn prepare(dir: &Path, player: CuePlayer) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let mut tones = Vec::with_capacity(CueEvent::ALL.len());
        for cue in CueEvent::ALL {
            let path = dir.join(format!("{}.wav", cue.zone().as_str()));
            write_wav(&path, &render_cue(cue, SAMPLE_RATE), SAMPLE_RATE)?;
            tones.push((cue, path));
        }
        info!("Cue tones ready in {:?}, playing with {:?}", dir, player.program());
        Ok(Self {
            player: Arc::new(player),
            tones,
        })
    }

    pub fn tone_path(&self, cue: CueEvent) -> Option<&Path> {
        self.tones
            .iter()
            .find(|(c, _)| *c == cue)
            .map(|(_, path)| path.as_path())
    }
}

#[async_trait]
impl CueSink for AudioCueSink {
    /// Playback runs in the background so a slow player never holds up ticks.
    async fn deliver(&self, notice: &CueNotice) -> Result<()> {
        let Some(path) = self.tone_path(notice.cue) else {
            return Ok(());
        };
        let path = path.to_path_buf();
        let player = self.player.clone();
        tokio::spawn(async move {
            if let Err(e) = player.play(&path).await {
                warn!("Cue playback failed: {}", e);
            }
        });
        Ok(())
    }
}

/// Hands each cue to every sink; one failing sink does not stop the rest.
pub async fn dispatch(sinks: &[Arc<dyn CueSink>], notice: &CueNotice) {
    for sink in sinks {
        if let Err(e) = sink.deliver(notice).await {
            warn!("Cue sink failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder(Mutex<Vec<CueEvent>>);

    #[async_trait]
    impl CueSink for Recorder {
        async fn deliver(&self, notice: &CueNotice) -> Result<()> {
            self.0.lock().unwrap().push(notice.cue);
            Ok(())
        }
    }

    struct Broken;

    #[async_trait]
    impl CueSink for Broken {
        async fn deliver(&self, _notice: &CueNotice) -> Result<()> {
            anyhow::bail!("speaker unplugged")
        }
    }

    fn notice(cue: CueEvent) -> CueNotice {
        CueNotice {
            item_id: Uuid::new_v4(),
            role_name: "Speaker 1".into(),
            cue,
            elapsed_seconds: 300.0,
        }
    }

    #[tokio::test]
    async fn test_dispatch_continues_past_failing_sink() {
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let sinks: Vec<Arc<dyn CueSink>> = vec![Arc::new(Broken), Arc::new(LogCueSink), recorder.clone()];
        dispatch(&sinks, &notice(CueEvent::GreenEntered)).await;
        dispatch(&sinks, &notice(CueEvent::BellEntered)).await;
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![CueEvent::GreenEntered, CueEvent::BellEntered]
        );
    }

    #[tokio::test]
    async fn test_prepare_renders_every_tone() {
        let dir = tempfile::tempdir().unwrap();
        let sink = AudioCueSink::prepare(dir.path(), CuePlayer::new(PathBuf::from("true"))).unwrap();
        for cue in CueEvent::ALL {
            let path = sink.tone_path(cue).unwrap();
            assert!(path.exists());
        }
        assert!(dir.path().join("bell.wav").exists());
        assert!(sink.deliver(&notice(CueEvent::RedEntered)).await.is_ok());
    }
}
