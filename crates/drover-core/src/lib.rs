//! Drover Core - configuration resolution for the drover CI plugin
//!
//! This crate turns the plugin's environment into one canonical record:
//! - `Environment`: A snapshot of the process environment with the two setting scopes
//! - `ResolvedConfig`: Every deployment parameter, merged from aliases, settings and environment
//! - `interpolate`: `$NAME` / `${NAME}` secret placeholder expansion
//! - `Sink`: Shared output streams handed to every helm invocation

pub mod config;
pub mod env;
pub mod error;
pub mod interpolate;
pub mod output;
pub mod settings;

pub use config::{REDACTED, ResolvedConfig};
pub use env::{Environment, Scope};
pub use error::{CoreError, Result};
pub use interpolate::{Expansion, expand};
pub use output::{CapturedOutput, Sink};
