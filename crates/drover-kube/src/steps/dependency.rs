//! `helm dependency build|update`

use std::fmt;

use drover_core::ResolvedConfig;

use crate::command::{HelmCommand, StepContext};
use crate::error::{KubeError, Result};

/// What to do with a chart's dependencies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyAction {
    /// Rebuild `charts/` from the lock file
    Build,
    /// Re-resolve dependencies and refresh the lock file
    Update,
}

impl DependencyAction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "build" => Some(DependencyAction::Build),
            "update" => Some(DependencyAction::Update),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DependencyAction::Build => "build",
            DependencyAction::Update => "update",
        }
    }
}

impl fmt::Display for DependencyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct DependencyUpdate {
    chart: String,
    action: String,
    command: Option<HelmCommand>,
}

impl DependencyUpdate {
    /// Uses `dependencies_action`, or `update` when only the legacy flag asked for it
    pub fn new(cfg: &ResolvedConfig) -> Self {
        let action = if cfg.dependencies_action.is_empty() {
            DependencyAction::Update.as_str().to_string()
        } else {
            cfg.dependencies_action.clone()
        };
        Self {
            chart: cfg.chart.clone(),
            action,
            command: None,
        }
    }

    /// Always `update`, whatever `dependencies_action` says
    pub fn update(cfg: &ResolvedConfig) -> Self {
        Self {
            chart: cfg.chart.clone(),
            action: DependencyAction::Update.as_str().to_string(),
            command: None,
        }
    }

    /// Whether the config asks for a dependency step before an upgrade
    pub fn requested(cfg: &ResolvedConfig) -> bool {
        cfg.update_dependencies || !cfg.dependencies_action.is_empty()
    }

    pub fn prepare(&mut self, ctx: &StepContext) -> Result<()> {
        if self.chart.is_empty() {
            return Err(KubeError::required("chart"));
        }
        let action = DependencyAction::parse(&self.action).ok_or_else(|| {
            KubeError::invalid("dependencies_action", format!("unknown action '{}'", self.action))
        })?;

        let mut args = ctx.global_flags();
        args.push("dependency".to_string());
        args.push(action.to_string());
        args.push(self.chart.clone());

        self.command = Some(ctx.command(args));
        Ok(())
    }

    pub fn command(&self) -> Option<&HelmCommand> {
        self.command.as_ref()
    }
}
