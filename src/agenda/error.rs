use thiserror::Error;
use uuid::Uuid;

use crate::timing::TimingError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgendaError {
    #[error("no agenda item with id {0}")]
    UnknownItem(Uuid),
    #[error("'{0}' is being timed; stop or reset it first")]
    ItemLive(String),
    #[error("'{0}' is finalized; reopen it before changing its timing")]
    ItemFinalized(String),
    #[error(transparent)]
    Timing(#[from] TimingError),
}
