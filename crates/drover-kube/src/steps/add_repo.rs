//! `helm repo add`

use drover_core::ResolvedConfig;

use crate::certs::RepoCerts;
use crate::command::{HelmCommand, StepContext};
use crate::error::{KubeError, Result};

/// Registers one chart repository from a `name=url` spec
#[derive(Debug)]
pub struct AddRepo {
    repo: String,
    certs: RepoCerts,
    command: Option<HelmCommand>,
}

impl AddRepo {
    pub fn new(cfg: &ResolvedConfig, repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            certs: RepoCerts::new(&cfg.repo_certificate, &cfg.repo_ca_certificate),
            command: None,
        }
    }

    pub fn prepare(&mut self, ctx: &StepContext) -> Result<()> {
        if self.repo.is_empty() {
            return Err(KubeError::required("repo"));
        }
        let (name, url) = self.repo.split_once('=').ok_or_else(|| {
            KubeError::invalid("add_repos", format!("bad repo spec '{}'", self.repo))
        })?;

        self.certs.write(ctx)?;

        let mut args = ctx.global_flags();
        args.extend(["repo".to_string(), "add".to_string()]);
        args.extend(self.certs.flags());
        args.push(name.to_string());
        args.push(url.to_string());

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
    use crate::steps::test_support::{context, debug_context};
    use drover_core::CapturedOutput;

    fn prepared_args(cfg: &ResolvedConfig, repo: &str, ctx: &StepContext) -> Result<Vec<String>> {
        let mut step = AddRepo::new(cfg, repo);
        step.prepare(ctx)?;
        Ok(step.command().unwrap().args().to_vec())
    }

    #[test]
    fn test_add_repo() {
        let args = prepared_args(
            &ResolvedConfig::default(),
            "edeath=https://github.com/n_marks/e-death",
            &context(),
        )
        .unwrap();
        assert_eq!(
            args,
            vec!["repo", "add", "edeath", "https://github.com/n_marks/e-death"]
        );
    }

    #[test]
    fn test_splits_on_first_equals() {
        let args = prepared_args(
            &ResolvedConfig::default(),
            "dwim=https://example.com/?chart=dwim",
            &context(),
        )
        .unwrap();
        assert_eq!(&args[2..], ["dwim", "https://example.com/?chart=dwim"]);
    }

    #[test]
    fn test_global_flags_first() {
        let stderr = CapturedOutput::new();
        let ctx = StepContext {
            namespace: "alliteration".to_string(),
            ..debug_context(&stderr)
        };
        let args = prepared_args(&ResolvedConfig::default(), "a=b", &ctx).unwrap();
        assert_eq!(
            args,
            vec!["--namespace", "alliteration", "--debug", "repo", "add", "a", "b"]
        );
        assert_eq!(
            stderr.lines(),
            vec!["Generated command: '/usr/bin/helm --namespace alliteration --debug repo add a b'"]
        );
    }

    #[test]
    fn test_empty_spec_is_required() {
        let err = prepared_args(&ResolvedConfig::default(), "", &context()).unwrap_err();
        assert_eq!(err.to_string(), "repo is required");
    }

    #[test]
    fn test_bad_spec() {
        let err = prepared_args(&ResolvedConfig::default(), "dwim", &context()).unwrap_err();
        assert!(matches!(err, KubeError::InvalidSetting { setting: "add_repos", .. }));
        assert!(err.to_string().contains("bad repo spec 'dwim'"));
    }

    #[test]
    fn test_cert_flags_precede_name() {
        let cfg = ResolvedConfig {
            repo_certificate: "Y2xpZW50IGNlcnQ=".to_string(),
            ..Default::default()
        };
        let args = prepared_args(&cfg, "private=https://charts.example.com", &context()).unwrap();

        assert_eq!(&args[..3], ["repo", "add", "--cert-file"]);
        assert!(args[3].ends_with(".cert"));
        assert_eq!(&args[4..], ["private", "https://charts.example.com"]);
    }
}
