use thiserror::Error;

use crate::agenda::AgendaError;
use crate::timing::TimingError;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Agenda(#[from] AgendaError),
    #[error(transparent)]
    Timing(#[from] TimingError),
    #[error("'{0}' is already being timed; stop it before starting another role")]
    FocusBusy(String),
    #[error("no snapshot with id {0}")]
    UnknownSnapshot(i64),
    #[error("snapshot store failed: {0:#}")]
    Store(#[from] anyhow::Error),
}
