//! Role timer for Toastmasters-style meetings: signal thresholds, per-role
//! timing, session aggregation and the timer's report.

pub mod agenda;
pub mod api;
pub mod app;
pub mod audio;
pub mod cli;
pub mod config;
pub mod controller;
pub mod global;
pub mod hooks;
pub mod report;
pub mod store;
pub mod timing;
