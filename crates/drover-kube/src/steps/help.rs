//! `helm help`, also the fallback for commands the plan does not recognise

use drover_core::ResolvedConfig;

use crate::command::{HelmCommand, StepContext};
use crate::error::{KubeError, Result};
use crate::runner::CommandRunner;
use crate::steps::run_prepared;

#[derive(Debug)]
pub struct Help {
    /// The command the pipeline asked for
    requested: String,
    command: Option<HelmCommand>,
}

impl Help {
    pub fn new(cfg: &ResolvedConfig) -> Self {
        Self {
            requested: cfg.command.clone(),
            command: None,
        }
    }

    pub fn prepare(&mut self, ctx: &StepContext) -> Result<()> {
        let mut args = ctx.global_flags();
        args.push("help".to_string());
        self.command = Some(ctx.command(args));
        Ok(())
    }

    /// Show helm's help; succeed only if help is what was asked for
    pub fn execute(&mut self, runner: &dyn CommandRunner) -> Result<()> {
        run_prepared(self.command(), runner)?;
        if self.requested == "help" {
            Ok(())
        } else {
            Err(KubeError::UnknownCommand(self.requested.clone()))
        }
    }

    pub fn command(&self) -> Option<&HelmCommand> {
        self.command.as_ref()
    }
}
