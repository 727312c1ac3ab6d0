//! `relcurves` library crate.
//!
//! The binary (`relc`) is a thin wrapper around this library so that:
//!
//! - the evaluators and the parameter boundary are testable without spawning processes
//! - the CLI and the TUI share one session and one set of models

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;
