//! Resolved plugin configuration
//!
//! [`ResolvedConfig::resolve`] merges, in order:
//! 1. legacy alias names (settings scope, then environment scope)
//! 2. canonical names from the settings scope (`PLUGIN_<NAME>`)
//! 3. canonical names from the environment scope (`<NAME>`)
//!
//! A later layer wins whenever its variable is present, even if the value is empty or
//! `false`. After merging, the timeout is normalized, secret placeholders are expanded,
//! deprecated settings are reported and, in debug mode, the final record is dumped.
//!
//! Required fields are not checked here; each step validates what it needs when the
//! plan is prepared.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::env::{Environment, Scope};
use crate::error::Result;
use crate::interpolate;
use crate::output::Sink;
use crate::settings::{self, Layer, SettingAliases};

/// Replacement for the kube token in debug output
pub const REDACTED: &str = "(redacted)";

static JUST_NUMBERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("valid regex"));

/// Every deployment parameter, one authoritative value per field
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolvedConfig {
    /// Helm command to run (`MODE`)
    pub command: String,
    /// Drone event that triggered the build (`DRONE_BUILD_EVENT`)
    pub drone_event: String,
    /// Run `helm dependency update` first (legacy, see `dependencies_action`)
    pub update_dependencies: bool,
    /// `build` or `update`: run `helm dependency <action>` first
    pub dependencies_action: String,
    /// `name=url` repositories to `helm repo add`
    pub add_repos: Vec<String>,
    /// Base64 client certificate for chart repositories
    pub repo_certificate: String,
    /// Base64 CA certificate for chart repositories
    pub repo_ca_certificate: String,
    /// Debug output, and `--debug` on every helm command
    pub debug: bool,
    /// Argument to `--set`
    pub values: String,
    /// Argument to `--set-string`
    pub string_values: String,
    /// Arguments to `--values`
    pub values_files: Vec<String>,
    /// Kubernetes namespace for all helm commands
    pub namespace: String,
    /// Skip writing the kubeconfig
    pub kube_init_skip: bool,
    /// Bearer token for the kubeconfig
    pub kube_token: String,
    /// Put `insecure-skip-tls-verify` in the kubeconfig
    pub skip_tls_verify: bool,
    /// Base64 cluster CA data (`KUBE_CERTIFICATE`)
    pub certificate: String,
    /// Cluster API endpoint (`KUBE_API_SERVER`)
    pub api_server: String,
    /// Account used to connect (`KUBE_SERVICE_ACCOUNT`)
    pub service_account: String,
    /// EKS cluster name, authenticating through aws-iam-authenticator instead of a token
    pub eks_cluster: String,
    /// IAM role to assume for EKS authentication
    pub eks_role_arn: String,
    pub chart_version: String,
    pub dry_run: bool,
    /// `--wait` (`WAIT_FOR_UPGRADE`)
    pub wait: bool,
    pub reuse_values: bool,
    pub keep_history: bool,
    /// Argument to `--timeout`
    pub timeout: String,
    pub chart: String,
    pub release: String,
    /// `--force` (`FORCE_UPGRADE`)
    pub force: bool,
    pub atomic_upgrade: bool,
    /// `--cleanup-on-fail` (`CLEANUP_FAILED_UPGRADE`)
    pub cleanup_on_fail: bool,
    pub lint_strictly: bool,
    pub create_namespace: bool,
    pub skip_crds: bool,
    /// Argument to `--history-max`
    pub history_max: Option<u32>,

    #[serde(skip)]
    pub stdout: Sink,
    #[serde(skip)]
    pub stderr: Sink,
}

impl ResolvedConfig {
    /// Build the configuration from an environment snapshot
    pub fn resolve(env: &Environment, stdout: Sink, stderr: Sink) -> Result<Self> {
        let aliases = SettingAliases::load(env)?;

        let mut cfg = Self::seeded(aliases, stdout, stderr);
        cfg.overlay(Layer::new(env, Scope::Settings))?;
        cfg.overlay(Layer::new(env, Scope::Environment))?;

        cfg.normalize();
        cfg.expand_secrets(env);
        cfg.warn_deprecated(env);

        if cfg.debug {
            cfg.log_debug()?;
        }

        tracing::debug!(command = %cfg.command, event = %cfg.drone_event, "resolved config");
        Ok(cfg)
    }

    fn seeded(aliases: SettingAliases, stdout: Sink, stderr: Sink) -> Self {
        Self {
            command: aliases.command,
            add_repos: aliases.add_repos,
            api_server: aliases.api_server,
            service_account: aliases.service_account,
            wait: aliases.wait,
            force: aliases.force,
            kube_token: aliases.kube_token,
            certificate: aliases.certificate,
            stdout,
            stderr,
            ..Default::default()
        }
    }

    fn overlay(&mut self, layer: Layer<'_>) -> Result<()> {
        layer.string("MODE", &mut self.command);
        layer.string("DRONE_BUILD_EVENT", &mut self.drone_event);
        layer.flag("UPDATE_DEPENDENCIES", &mut self.update_dependencies)?;
        layer.string("DEPENDENCIES_ACTION", &mut self.dependencies_action);
        layer.list("ADD_REPOS", &mut self.add_repos);
        layer.string("REPO_CERTIFICATE", &mut self.repo_certificate);
        layer.string("REPO_CA_CERTIFICATE", &mut self.repo_ca_certificate);
        layer.flag("DEBUG", &mut self.debug)?;
        layer.string("VALUES", &mut self.values);
        layer.string("STRING_VALUES", &mut self.string_values);
        layer.list("VALUES_FILES", &mut self.values_files);
        layer.string("NAMESPACE", &mut self.namespace);
        layer.flag("KUBE_INIT_SKIP", &mut self.kube_init_skip)?;
        layer.string("KUBE_TOKEN", &mut self.kube_token);
        layer.flag("SKIP_TLS_VERIFY", &mut self.skip_tls_verify)?;
        layer.string("KUBE_CERTIFICATE", &mut self.certificate);
        layer.string("KUBE_API_SERVER", &mut self.api_server);
        layer.string("KUBE_SERVICE_ACCOUNT", &mut self.service_account);
        layer.string("EKS_CLUSTER", &mut self.eks_cluster);
        layer.string("EKS_ROLE_ARN", &mut self.eks_role_arn);
        layer.string("CHART_VERSION", &mut self.chart_version);
        layer.flag("DRY_RUN", &mut self.dry_run)?;
        layer.flag("WAIT_FOR_UPGRADE", &mut self.wait)?;
        layer.flag("REUSE_VALUES", &mut self.reuse_values)?;
        layer.flag("KEEP_HISTORY", &mut self.keep_history)?;
        layer.string("TIMEOUT", &mut self.timeout);
        layer.string("CHART", &mut self.chart);
        layer.string("RELEASE", &mut self.release);
        layer.flag("FORCE_UPGRADE", &mut self.force)?;
        layer.flag("ATOMIC_UPGRADE", &mut self.atomic_upgrade)?;
        layer.flag("CLEANUP_FAILED_UPGRADE", &mut self.cleanup_on_fail)?;
        layer.flag("LINT_STRICTLY", &mut self.lint_strictly)?;
        layer.flag("CREATE_NAMESPACE", &mut self.create_namespace)?;
        layer.flag("SKIP_CRDS", &mut self.skip_crds)?;
        layer.count("HISTORY_MAX", &mut self.history_max)?;
        Ok(())
    }

    /// Bare numbers are seconds
    fn normalize(&mut self) {
        if JUST_NUMBERS.is_match(&self.timeout) {
            self.timeout.push('s');
        }
    }

    fn expand_secrets(&mut self, env: &Environment) {
        let lookup = |name: &str| env.get(name).map(str::to_string);
        let debug = self.debug;
        let stderr = self.stderr.clone();

        let expand = |text: &mut String| {
            let expansion = interpolate::expand(text, &lookup);
            if debug {
                for name in &expansion.unresolved {
                    stderr.line(format_args!(
                        "${name} not present in environment, replaced with \"\""
                    ));
                }
            }
            *text = expansion.text;
        };

        expand(&mut self.values);
        expand(&mut self.string_values);
        for repo in &mut self.add_repos {
            expand(repo);
        }
    }

    fn warn_deprecated(&self, env: &Environment) {
        for name in settings::deprecated_present(env) {
            tracing::debug!(setting = name, "deprecated setting ignored");
            self.stderr.line(format_args!(
                "Warning: ignoring deprecated '{}' setting",
                name.to_lowercase()
            ));
        }
    }

    /// Copy of the config that is safe to print
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.kube_token.is_empty() {
            copy.kube_token = REDACTED.to_string();
        }
        copy
    }

    fn log_debug(&self) -> Result<()> {
        let dump = serde_json::to_string(&self.redacted())?;
        self.stderr.line(format_args!("Generated config: {dump}"));
        Ok(())
    }
}
