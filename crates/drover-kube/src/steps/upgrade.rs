//! `helm upgrade --install`

use drover_core::ResolvedConfig;

use crate::certs::RepoCerts;
use crate::command::{HelmCommand, StepContext, push_flag};
use crate::error::{KubeError, Result};

/// Installs the chart, or upgrades the release if it already exists
#[derive(Debug)]
pub struct Upgrade {
    chart: String,
    release: String,
    chart_version: String,
    dry_run: bool,
    wait: bool,
    reuse_values: bool,
    timeout: String,
    force: bool,
    atomic: bool,
    cleanup_on_fail: bool,
    create_namespace: bool,
    skip_crds: bool,
    history_max: Option<u32>,
    values: String,
    string_values: String,
    values_files: Vec<String>,
    certs: RepoCerts,
    command: Option<HelmCommand>,
}

impl Upgrade {
    pub fn new(cfg: &ResolvedConfig) -> Self {
        Self {
            chart: cfg.chart.clone(),
            release: cfg.release.clone(),
            chart_version: cfg.chart_version.clone(),
            dry_run: cfg.dry_run,
            wait: cfg.wait,
            reuse_values: cfg.reuse_values,
            timeout: cfg.timeout.clone(),
            force: cfg.force,
            atomic: cfg.atomic_upgrade,
            cleanup_on_fail: cfg.cleanup_on_fail,
            create_namespace: cfg.create_namespace,
            skip_crds: cfg.skip_crds,
            history_max: cfg.history_max,
            values: cfg.values.clone(),
            string_values: cfg.string_values.clone(),
            values_files: cfg.values_files.clone(),
            certs: RepoCerts::new(&cfg.repo_certificate, &cfg.repo_ca_certificate),
            command: None,
        }
    }

    pub fn prepare(&mut self, ctx: &StepContext) -> Result<()> {
        if self.chart.is_empty() {
            return Err(KubeError::required("chart"));
        }
        if self.release.is_empty() {
            return Err(KubeError::required("release"));
        }

        self.certs.write(ctx)?;

        let mut args = ctx.global_flags();
        args.extend(["upgrade".to_string(), "--install".to_string()]);

        if !self.chart_version.is_empty() {
            push_flag(&mut args, "--version", &self.chart_version);
        }
        let switches = [
            (self.dry_run, "--dry-run"),
            (self.wait, "--wait"),
            (self.reuse_values, "--reuse-values"),
        ];
        args.extend(switches.iter().filter(|(on, _)| *on).map(|(_, f)| f.to_string()));
        if !self.timeout.is_empty() {
            push_flag(&mut args, "--timeout", &self.timeout);
        }
        let switches = [
            (self.force, "--force"),
            (self.atomic, "--atomic"),
            (self.cleanup_on_fail, "--cleanup-on-fail"),
            (self.create_namespace, "--create-namespace"),
            (self.skip_crds, "--skip-crds"),
        ];
        args.extend(switches.iter().filter(|(on, _)| *on).map(|(_, f)| f.to_string()));
        if let Some(max) = self.history_max {
            push_flag(&mut args, "--history-max", max.to_string());
        }
        if !self.values.is_empty() {
            push_flag(&mut args, "--set", &self.values);
        }
        if !self.string_values.is_empty() {
            push_flag(&mut args, "--set-string", &self.string_values);
        }
        for file in &self.values_files {
            push_flag(&mut args, "--values", file);
        }
        args.extend(self.certs.flags());

        args.push(self.release.clone());
        args.push(self.chart.clone());

        self.command = Some(ctx.command(args));
        Ok(())
    }

    pub fn command(&self) -> Option<&HelmCommand> {
        self.command.as_ref()
    }
}
