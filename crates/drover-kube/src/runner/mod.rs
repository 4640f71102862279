//! Command runners
//!
//! Steps never spawn processes themselves; they hand a prepared [`HelmCommand`] to a
//! [`CommandRunner`]. The plugin uses [`ProcessRunner`]; tests use [`MockRunner`],
//! which records invocations instead of running anything.

mod mock;
mod process;

pub use mock::{Invocation, MockRunner};
pub use process::ProcessRunner;

use crate::command::HelmCommand;
use crate::error::Result;

/// Runs one helm command to completion
pub trait CommandRunner {
    /// Run the command, blocking until it exits
    ///
    /// A non-zero exit is reported as [`crate::KubeError::ExternalToolFailure`].
    fn run(&self, command: &HelmCommand) -> Result<()>;
}
