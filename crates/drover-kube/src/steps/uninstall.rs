//! `helm uninstall`

use drover_core::ResolvedConfig;

use crate::command::{HelmCommand, StepContext};
use crate::error::{KubeError, Result};

#[derive(Debug)]
pub struct Uninstall {
    release: String,
    dry_run: bool,
    keep_history: bool,
    command: Option<HelmCommand>,
}

impl Uninstall {
    pub fn new(cfg: &ResolvedConfig) -> Self {
        Self {
            release: cfg.release.clone(),
            dry_run: cfg.dry_run,
            keep_history: cfg.keep_history,
            command: None,
        }
    }

    pub fn prepare(&mut self, ctx: &StepContext) -> Result<()> {
        if self.release.is_empty() {
            return Err(KubeError::required("release"));
        }

        let mut args = ctx.global_flags();
        args.push("uninstall".to_string());
        if self.dry_run {
            args.push("--dry-run".to_string());
        }
        if self.keep_history {
            args.push("--keep-history".to_string());
        }
        args.push(self.release.clone());

        self.command = Some(ctx.command(args));
        Ok(())
    }

    pub fn command(&self) -> Option<&HelmCommand> {
        self.command.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::test_support::context;

    #[test]
    fn test_uninstall_flags() {
        let mut step = Uninstall::new(&ResolvedConfig {
            release: "maroon_5_memories".to_string(),
            dry_run: true,
            keep_history: true,
            ..Default::default()
        });
        step.prepare(&context()).unwrap();
        assert_eq!(
            step.command().unwrap().args(),
            ["uninstall", "--dry-run", "--keep-history", "maroon_5_memories"]
        );
    }

    #[test]
    fn test_release_required() {
        let mut step = Uninstall::new(&ResolvedConfig::default());
        assert_eq!(
            step.prepare(&context()).unwrap_err().to_string(),
            "release is required"
        );
    }
}
