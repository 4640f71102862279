//! Plan compilation and execution
//!
//! A [`Plan`] is the ordered list of steps for one plugin run. Compiling picks a
//! [`Family`] from the configured command (or, failing that, the triggering event) and
//! builds its steps. Running a plan is split in two:
//! - [`Plan::prepare`] prepares every step and yields a [`PreparedPlan`]
//! - [`PreparedPlan::execute`] executes them in order
//!
//! A plan that cannot be fully prepared never runs anything.

use std::path::PathBuf;

use drover_core::ResolvedConfig;

use crate::command::{DEFAULT_HELM_BIN, HelmCommand, StepContext};
use crate::error::{KubeError, Phase, PlanError};
use crate::runner::CommandRunner;
use crate::steps::{AddRepo, DependencyUpdate, Help, InitKube, Lint, Step, Uninstall, Upgrade};

/// Where the kubeconfig is written unless told otherwise
pub const DEFAULT_KUBECONFIG: &str = "/root/.kube/config";

/// Drone events that deploy
const DEPLOY_EVENTS: &[&str] = &[
    "push",
    "tag",
    "deployment",
    "pull_request",
    "promote",
    "rollback",
];

/// Filesystem locations a plan works with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOptions {
    pub helm_bin: PathBuf,
    /// Destination of the generated kubeconfig
    pub kubeconfig: PathBuf,
    /// Kubeconfig template; the built-in one when unset
    pub kubeconfig_template: Option<PathBuf>,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            helm_bin: PathBuf::from(DEFAULT_HELM_BIN),
            kubeconfig: PathBuf::from(DEFAULT_KUBECONFIG),
            kubeconfig_template: None,
        }
    }
}

/// The kind of work a run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Upgrade,
    Uninstall,
    Lint,
    Help,
}

impl Family {
    /// An explicit command wins; otherwise the build event decides
    pub fn determine(command: &str, event: &str) -> Self {
        match command {
            "upgrade" => Family::Upgrade,
            "uninstall" | "delete" => Family::Uninstall,
            "lint" => Family::Lint,
            "help" => Family::Help,
            _ if DEPLOY_EVENTS.contains(&event) => Family::Upgrade,
            _ if event == "delete" => Family::Uninstall,
            _ => Family::Help,
        }
    }

    /// Steps for this family, in execution order
    pub fn steps(self, cfg: &ResolvedConfig, options: &PlanOptions) -> Vec<Step> {
        let mut steps = Vec::new();
        match self {
            Family::Upgrade => {
                push_init_kube(&mut steps, cfg, options);
                push_repos(&mut steps, cfg);
                push_dependencies(&mut steps, cfg);
                steps.push(Upgrade::new(cfg).into());
            }
            Family::Uninstall => {
                push_init_kube(&mut steps, cfg, options);
                push_legacy_update(&mut steps, cfg);
                steps.push(Uninstall::new(cfg).into());
            }
            Family::Lint => {
                push_repos(&mut steps, cfg);
                push_legacy_update(&mut steps, cfg);
                steps.push(Lint::new(cfg).into());
            }
            Family::Help => steps.push(Help::new(cfg).into()),
        }
        steps
    }
}

fn push_init_kube(steps: &mut Vec<Step>, cfg: &ResolvedConfig, options: &PlanOptions) {
    if !cfg.kube_init_skip {
        steps.push(
            InitKube::new(cfg, options.kubeconfig_template.clone(), &options.kubeconfig).into(),
        );
    }
}

fn push_repos(steps: &mut Vec<Step>, cfg: &ResolvedConfig) {
    steps.extend(cfg.add_repos.iter().map(|repo| Step::from(AddRepo::new(cfg, repo))));
}

fn push_dependencies(steps: &mut Vec<Step>, cfg: &ResolvedConfig) {
    if DependencyUpdate::requested(cfg) {
        steps.push(DependencyUpdate::new(cfg).into());
    }
}

/// Only upgrades honour `dependencies_action`; the other families update on the legacy flag
fn push_legacy_update(steps: &mut Vec<Step>, cfg: &ResolvedConfig) {
    if cfg.update_dependencies {
        steps.push(DependencyUpdate::update(cfg).into());
    }
}

/// Ordered steps for one run, not yet prepared
#[derive(Debug)]
pub struct Plan {
    family: Family,
    steps: Vec<Step>,
    ctx: StepContext,
}

impl Plan {
    /// Build the plan the configuration asks for
    pub fn compile(cfg: &ResolvedConfig, options: &PlanOptions) -> Result<Self, PlanError> {
        Self::compile_with(cfg, options, |family, cfg| family.steps(cfg, options))
    }

    /// Build a plan with a custom step list for the chosen family
    pub fn compile_with<F>(
        cfg: &ResolvedConfig,
        options: &PlanOptions,
        build: F,
    ) -> Result<Self, PlanError>
    where
        F: FnOnce(Family, &ResolvedConfig) -> Vec<Step>,
    {
        if cfg.update_dependencies && !cfg.dependencies_action.is_empty() {
            return Err(PlanError::Compile(KubeError::ConfigConflict(
                "update_dependencies is deprecated and cannot be provided together with dependencies_action"
                    .to_string(),
            )));
        }

        let family = Family::determine(&cfg.command, &cfg.drone_event);
        let steps = build(family, cfg);
        tracing::debug!(?family, steps = steps.len(), "compiled plan");

        Ok(Self {
            family,
            steps,
            ctx: StepContext::new(cfg, &options.helm_bin),
        })
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Prepare every step, stopping at the first failure
    pub fn prepare(mut self) -> Result<PreparedPlan, PlanError> {
        for (index, step) in self.steps.iter_mut().enumerate() {
            self.ctx.diag(format_args!("calling {}.prepare (step {index})", step.name()));
            step.prepare(&self.ctx).map_err(|source| PlanError::Step {
                phase: Phase::Prepare,
                index,
                step: step.name(),
                source,
            })?;
        }
        Ok(PreparedPlan {
            steps: self.steps,
            ctx: self.ctx,
        })
    }

    /// Prepare everything, then execute everything
    pub fn run(self, runner: &dyn CommandRunner) -> Result<(), PlanError> {
        self.prepare()?.execute(runner)
    }
}

/// A plan whose every step prepared successfully
#[derive(Debug)]
pub struct PreparedPlan {
    steps: Vec<Step>,
    ctx: StepContext,
}

impl PreparedPlan {
    /// The helm commands that will run, in order
    pub fn commands(&self) -> impl Iterator<Item = &HelmCommand> {
        self.steps.iter().filter_map(Step::command)
    }

    /// Execute every step, stopping at the first failure
    pub fn execute(mut self, runner: &dyn CommandRunner) -> Result<(), PlanError> {
        for (index, step) in self.steps.iter_mut().enumerate() {
            self.ctx.diag(format_args!("calling {}.execute (step {index})", step.name()));
            step.execute(&self.ctx, runner).map_err(|source| PlanError::Step {
                phase: Phase::Execute,
                index,
                step: step.name(),
                source,
            })?;
        }
        Ok(())
    }
}
