mod handle;

pub use handle::MeetingHandle;

use crate::api::ApiServer;
use crate::audio::{AudioCueSink, CuePlayer, CueSink, LogCueSink};
use crate::config::Config;
use crate::controller::MeetingController;
use crate::hooks::{ItemCompleteHook, ShellCommandHook};
use crate::store::SqliteSnapshotStore;
use crate::timing::SystemClock;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

pub async fn run_service() -> Result<()> {
    info!("Starting gavel service");

    let config = Config::load()?;

    let store = SqliteSnapshotStore::open_default(config.history.max_snapshots)?;
    let controller = MeetingController::restore_or_new(
        Box::new(store),
        Arc::new(SystemClock),
        config.meeting_defaults(),
    )?;

    let hook = ShellCommandHook::from_config(&config.hooks)
        .map(|h| Arc::new(h) as Arc<dyn ItemCompleteHook>);
    if hook.is_some() {
        info!("Item-complete hook enabled");
    }

    let handle = MeetingHandle::new(controller)
        .with_sinks(build_sinks(&config))
        .with_hook(hook);

    let api_server = ApiServer::new(handle.clone(), config.server.port);
    tokio::spawn(async move {
        if let Err(e) = api_server.start().await {
            error!("API server failed: {}", e);
        }
    });

    info!("gavel is ready!");
    info!(
        "Try: curl http://127.0.0.1:{}/meeting",
        config.server.port
    );

    let mut ticker = tokio::time::interval(Duration::from_millis(
        config.timer.tick_interval_ms.max(50),
    ));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                handle.tick().await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    if let Err(e) = handle.with(|c| c.save_snapshot()).await {
        warn!("Failed to save meeting on shutdown: {}", e);
    }

    Ok(())
}

fn build_sinks(config: &Config) -> Vec<Arc<dyn CueSink>> {
    let mut sinks: Vec<Arc<dyn CueSink>> = vec![Arc::new(LogCueSink)];

    if !config.timer.audio_cues {
        return sinks;
    }

    let audio = CuePlayer::detect(config.timer.player.as_deref()).and_then(|player| {
        let dir = crate::global::cues_dir()?;
        AudioCueSink::prepare(&dir, player)
    });
    match audio {
        Ok(sink) => sinks.push(Arc::new(sink)),
        Err(e) => warn!("Audio cues disabled: {:#}", e),
    }

    sinks
}
