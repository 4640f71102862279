//! Drover - deploy helm charts from Drone CI pipelines
//!
//! Settings come from the step's environment (`PLUGIN_*` and plain variables). The
//! flags here only relocate the files the plugin works with.

use std::path::PathBuf;

use clap::Parser;
use console::style;
use drover_core::{Environment, ResolvedConfig, Sink};
use drover_kube::{DEFAULT_HELM_BIN, DEFAULT_KUBECONFIG, Plan, PlanOptions, ProcessRunner};
use miette::Diagnostic;
use tracing_subscriber::EnvFilter;

mod error;
mod exit_codes;

use error::{CliError, Result};

#[derive(Parser)]
#[command(name = "drover")]
#[command(version)]
#[command(about = "Deploy helm charts to Kubernetes from Drone CI", long_about = None)]
struct Cli {
    /// helm executable
    #[arg(long, env = "DROVER_HELM_BIN", default_value = DEFAULT_HELM_BIN)]
    helm_bin: PathBuf,

    /// Where to write the generated kubeconfig
    #[arg(long, env = "DROVER_KUBECONFIG", default_value = DEFAULT_KUBECONFIG)]
    kubeconfig: PathBuf,

    /// Kubeconfig template to use instead of the built-in one
    #[arg(long, env = "DROVER_KUBECONFIG_TEMPLATE")]
    kubeconfig_template: Option<PathBuf>,

    /// Log plugin internals (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        report(&err);
        std::process::exit(code);
    }
}

/// One line per error, so CI logs stay greppable
fn report(err: &CliError) {
    eprintln!("{} {}", style("✗").red().bold(), err);
    if let Some(help) = err.help() {
        eprintln!("  {} {}", style("help:").cyan(), help);
    }
    if let Some(code) = err.code() {
        eprintln!("  {}", style(code).dim());
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let env = Environment::from_process();
    let cfg = ResolvedConfig::resolve(&env, Sink::stdout(), Sink::stderr())?;

    let options = PlanOptions {
        helm_bin: cli.helm_bin,
        kubeconfig: cli.kubeconfig,
        kubeconfig_template: cli.kubeconfig_template,
    };
    let plan = Plan::compile(&cfg, &options)?;
    tracing::info!(family = ?plan.family(), steps = plan.steps().len(), "running plan");

    plan.run(&ProcessRunner::new())?;
    Ok(())
}
