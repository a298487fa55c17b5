//! Shared handle to the meeting controller plus the side effects of its
//! transitions (cue sinks, item-complete hook).

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use crate::audio::{dispatch, CueNotice, CueSink};
use crate::controller::{ControlError, MeetingController, TimerCommand};
use crate::hooks::{ItemCompleteHook, ItemResult};
use crate::timing::Transition;

#[derive(Clone)]
pub struct MeetingHandle {
    controller: Arc<Mutex<MeetingController>>,
    sinks: Arc<Vec<Arc<dyn CueSink>>>,
    hook: Option<Arc<dyn ItemCompleteHook>>,
}

impl MeetingHandle {
    pub fn new(controller: MeetingController) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            sinks: Arc::new(Vec::new()),
            hook: None,
        }
    }

    pub fn with_sinks(mut self, sinks: Vec<Arc<dyn CueSink>>) -> Self {
        self.sinks = Arc::new(sinks);
        self
    }

    pub fn with_hook(mut self, hook: Option<Arc<dyn ItemCompleteHook>>) -> Self {
        self.hook = hook;
        self
    }

    /// Run `f` under the controller lock.
    pub async fn with<R>(&self, f: impl FnOnce(&mut MeetingController) -> R) -> R {
        let mut controller = self.controller.lock().await;
        f(&mut controller)
    }

    /// Apply a timer command, then deliver whatever it produced outside the lock.
    pub async fn command(
        &self,
        id: Uuid,
        command: TimerCommand,
    ) -> Result<Transition, ControlError> {
        let transition = self.with(|c| c.apply(id, command)).await?;

        for &cue in &transition.cues {
            let notice = CueNotice {
                item_id: transition.item.id,
                role_name: transition.item.role_name.clone(),
                cue,
                elapsed_seconds: transition.item.elapsed_seconds,
            };
            dispatch(&self.sinks, &notice).await;
        }

        if let (Some(outcome), Some(hook)) = (&transition.completed, &self.hook) {
            let result = ItemResult::new(&transition.item, outcome);
            let hook = hook.clone();
            tokio::spawn(async move {
                if let Err(e) = hook.execute(&result).await {
                    warn!("Item-complete hook failed: {}", e);
                }
            });
        }

        Ok(transition)
    }

    /// One tick pass over all running timers. Returns the number of cues fired.
    pub async fn tick(&self) -> usize {
        let events = self.with(|c| c.tick_all()).await;
        let mut fired = 0;
        for event in events {
            for cue in event.cues {
                let notice = CueNotice {
                    item_id: event.item_id,
                    role_name: event.role_name.clone(),
                    cue,
                    elapsed_seconds: event.elapsed_seconds,
                };
                dispatch(&self.sinks, &notice).await;
                fired += 1;
            }
        }
        fired
    }
}
