//! Plan steps
//!
//! Every step follows the same two-phase protocol:
//! - `prepare` validates the step's settings and assembles its helm command line
//!   without running anything
//! - `execute` hands the prepared command to a [`CommandRunner`]
//!
//! The plan executor prepares every step before executing any of them.

mod add_repo;
mod dependency;
mod help;
mod init_kube;
mod lint;
mod uninstall;
mod upgrade;

pub use add_repo::AddRepo;
pub use dependency::{DependencyAction, DependencyUpdate};
pub use help::Help;
pub use init_kube::InitKube;
pub use lint::Lint;
pub use uninstall::Uninstall;
pub use upgrade::Upgrade;

use crate::command::{HelmCommand, StepContext};
use crate::error::{KubeError, Result};
use crate::runner::CommandRunner;

/// One unit of work in a plan
#[derive(Debug)]
pub enum Step {
    InitKube(InitKube),
    AddRepo(AddRepo),
    DependencyUpdate(DependencyUpdate),
    Upgrade(Upgrade),
    Uninstall(Uninstall),
    Lint(Lint),
    Help(Help),
}

impl Step {
    /// Name used in diagnostics and errors
    pub fn name(&self) -> &'static str {
        match self {
            Step::InitKube(_) => "InitKube",
            Step::AddRepo(_) => "AddRepo",
            Step::DependencyUpdate(_) => "DependencyUpdate",
            Step::Upgrade(_) => "Upgrade",
            Step::Uninstall(_) => "Uninstall",
            Step::Lint(_) => "Lint",
            Step::Help(_) => "Help",
        }
    }

    /// Validate settings and assemble the step's work; nothing runs yet
    pub fn prepare(&mut self, ctx: &StepContext) -> Result<()> {
        match self {
            Step::InitKube(step) => step.prepare(ctx),
            Step::AddRepo(step) => step.prepare(ctx),
            Step::DependencyUpdate(step) => step.prepare(ctx),
            Step::Upgrade(step) => step.prepare(ctx),
            Step::Uninstall(step) => step.prepare(ctx),
            Step::Lint(step) => step.prepare(ctx),
            Step::Help(step) => step.prepare(ctx),
        }
    }

    /// Carry out the prepared work
    pub fn execute(&mut self, ctx: &StepContext, runner: &dyn CommandRunner) -> Result<()> {
        match self {
            Step::InitKube(step) => step.execute(ctx),
            Step::AddRepo(step) => run_prepared(step.command(), runner),
            Step::DependencyUpdate(step) => run_prepared(step.command(), runner),
            Step::Upgrade(step) => run_prepared(step.command(), runner),
            Step::Uninstall(step) => run_prepared(step.command(), runner),
            Step::Lint(step) => run_prepared(step.command(), runner),
            Step::Help(step) => step.execute(runner),
        }
    }

    /// The helm command this step will run, once prepared
    ///
    /// `InitKube` writes a file instead and never has one.
    pub fn command(&self) -> Option<&HelmCommand> {
        match self {
            Step::InitKube(_) => None,
            Step::AddRepo(step) => step.command(),
            Step::DependencyUpdate(step) => step.command(),
            Step::Upgrade(step) => step.command(),
            Step::Uninstall(step) => step.command(),
            Step::Lint(step) => step.command(),
            Step::Help(step) => step.command(),
        }
    }
}

pub(crate) fn run_prepared(
    command: Option<&HelmCommand>,
    runner: &dyn CommandRunner,
) -> Result<()> {
    runner.run(command.ok_or(KubeError::NotPrepared)?)
}

macro_rules! impl_from_step {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Step {
                fn from(step: $variant) -> Self {
                    Step::$variant(step)
                }
            }
        )*
    };
}

impl_from_step!(InitKube, AddRepo, DependencyUpdate, Upgrade, Uninstall, Lint, Help);
