use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::timing::TimingError;

/// Operator command aimed at one agenda item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "seconds")]
pub enum TimerCommand {
    Start,
    Pause,
    Resume,
    /// Overwrite elapsed time with this many seconds.
    Adjust(f64),
    RequestStop,
    ConfirmStop,
    CancelStop,
    Reset,
    Reopen,
}

impl TimerCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Adjust(_) => "adjust",
            Self::RequestStop => "stop",
            Self::ConfirmStop => "confirm",
            Self::CancelStop => "cancel",
            Self::Reset => "reset",
            Self::Reopen => "reopen",
        }
    }

    /// Needs an operator confirmation before it is sent.
    pub fn is_destructive(&self) -> bool {
        matches!(self, Self::Reset)
    }
}

impl fmt::Display for TimerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the action names used in URLs and on the command line. `adjust`
/// carries a value and is not accepted here.
impl FromStr for TimerCommand {
    type Err = TimingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "start" => Ok(Self::Start),
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "stop" | "request-stop" => Ok(Self::RequestStop),
            "confirm" | "confirm-stop" => Ok(Self::ConfirmStop),
            "cancel" | "cancel-stop" => Ok(Self::CancelStop),
            "reset" => Ok(Self::Reset),
            "reopen" => Ok(Self::Reopen),
            other => Err(TimingError::invalid_input(format!(
                "unknown timer action '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actions() {
        assert_eq!("start".parse::<TimerCommand>().unwrap(), TimerCommand::Start);
        assert_eq!("Stop".parse::<TimerCommand>().unwrap(), TimerCommand::RequestStop);
        assert_eq!(
            "confirm_stop".parse::<TimerCommand>().unwrap(),
            TimerCommand::ConfirmStop
        );
        assert_eq!("cancel".parse::<TimerCommand>().unwrap(), TimerCommand::CancelStop);
        assert!("adjust".parse::<TimerCommand>().is_err());
        assert!("tick".parse::<TimerCommand>().is_err());
    }

    #[test]
    fn test_as_str_round_trips() {
        for cmd in [
            TimerCommand::Start,
            TimerCommand::Pause,
            TimerCommand::Resume,
            TimerCommand::RequestStop,
            TimerCommand::ConfirmStop,
            TimerCommand::CancelStop,
            TimerCommand::Reset,
            TimerCommand::Reopen,
        ] {
            assert_eq!(cmd.as_str().parse::<TimerCommand>().unwrap(), cmd);
        }
    }
}
