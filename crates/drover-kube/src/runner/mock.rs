//! Mock runner for testing
//!
//! Records every command it is asked to run, useful for asserting exact argument
//! vectors and for proving that nothing ran at all.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::CommandRunner;
use crate::command::HelmCommand;
use crate::error::{KubeError, Result};

/// One recorded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

/// In-memory runner for testing
#[derive(Clone, Default)]
pub struct MockRunner {
    invocations: Arc<Mutex<Vec<Invocation>>>,
    /// Zero-based invocation that should fail
    fail_at: Option<usize>,
}

impl MockRunner {
    /// A runner where every command succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// A runner whose `index`th invocation exits with status 1
    pub fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }

    /// Everything run so far, in order
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Argument vectors run so far, in order
    pub fn args(&self) -> Vec<Vec<String>> {
        self.invocations().into_iter().map(|i| i.args).collect()
    }

    /// Number of commands run so far
    pub fn invocation_count(&self) -> usize {
        self.invocations
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .len()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, command: &HelmCommand) -> Result<()> {
        let index = {
            let mut invocations = self.invocations.lock().unwrap_or_else(|p| p.into_inner());
            invocations.push(Invocation {
                program: command.program().to_path_buf(),
                args: command.args().to_vec(),
            });
            invocations.len() - 1
        };

        if self.fail_at == Some(index) {
            return Err(KubeError::ExternalToolFailure {
                program: command.program().display().to_string(),
                status: "exit status: 1".to_string(),
            });
        }
        Ok(())
    }
}
