//! abx console - manage experiments of a remote experimentation backend.
//!
//! Provides the typed HTTP client for the experiment endpoints, the
//! configuration layer, the command implementations behind the `abx`
//! binary and the interactive traffic slider editor.

pub mod client;
pub mod commands;
pub mod config;
pub mod context;
pub mod slider_console;

pub use client::{ClientError, ExperimentClient, NdjsonKind};
pub use config::{ConfigError, ConsoleConfig, DisplayConfig, ServerConfig};
pub use context::ConsoleContext;
