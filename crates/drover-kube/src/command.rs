//! Helm command lines and the context shared by every step

use std::fmt;
use std::path::{Path, PathBuf};

use drover_core::{ResolvedConfig, Sink};

/// Where helm is installed in the plugin image
pub const DEFAULT_HELM_BIN: &str = "/usr/bin/helm";

/// Configuration shared by all steps of a plan
#[derive(Debug, Clone)]
pub struct StepContext {
    /// Namespace passed to every helm command (omitted when empty)
    pub namespace: String,
    /// Emit diagnostics and pass `--debug` to helm
    pub debug: bool,
    /// helm executable
    pub helm_bin: PathBuf,
    pub stdout: Sink,
    pub stderr: Sink,
}

impl StepContext {
    pub fn new(cfg: &ResolvedConfig, helm_bin: impl Into<PathBuf>) -> Self {
        Self {
            namespace: cfg.namespace.clone(),
            debug: cfg.debug,
            helm_bin: helm_bin.into(),
            stdout: cfg.stdout.clone(),
            stderr: cfg.stderr.clone(),
        }
    }

    /// Flags that come before the subcommand on every invocation
    pub fn global_flags(&self) -> Vec<String> {
        let mut args = Vec::new();
        if !self.namespace.is_empty() {
            args.push("--namespace".to_string());
            args.push(self.namespace.clone());
        }
        if self.debug {
            args.push("--debug".to_string());
        }
        args
    }

    /// Bind an argument vector to this context's helm binary and output streams
    ///
    /// In debug mode the generated command line is echoed to stderr.
    pub fn command(&self, args: Vec<String>) -> HelmCommand {
        let command = HelmCommand {
            program: self.helm_bin.clone(),
            args,
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
        };
        if self.debug {
            self.stderr
                .line(format_args!("Generated command: '{command}'"));
        }
        command
    }

    /// Write a diagnostic line when debugging
    pub fn diag(&self, message: impl fmt::Display) {
        if self.debug {
            self.stderr.line(message);
        }
    }
}

/// One fully assembled helm invocation
#[derive(Debug, Clone)]
pub struct HelmCommand {
    program: PathBuf,
    args: Vec<String>,
    stdout: Sink,
    stderr: Sink,
}

impl HelmCommand {
    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn stdout(&self) -> &Sink {
        &self.stdout
    }

    pub fn stderr(&self) -> &Sink {
        &self.stderr
    }
}

impl fmt::Display for HelmCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Push a flag followed by its value
pub(crate) fn push_flag(args: &mut Vec<String>, flag: &str, value: impl Into<String>) {
    args.push(flag.to_string());
    args.push(value.into());
}
