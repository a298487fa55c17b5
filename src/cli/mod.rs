pub mod args;
pub mod client;
pub mod history;
pub mod report;
pub mod thresholds;
pub mod timer;

pub use args::{Cli, CliCommand};
pub use client::ServiceClient;
pub use history::handle_history_command;
pub use report::handle_report_command;
pub use thresholds::handle_thresholds_command;
pub use timer::{handle_agenda_command, handle_new_meeting_command, handle_timer_command};
