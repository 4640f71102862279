//! Drover Kube - helm plans for the drover CI plugin
//!
//! This crate provides:
//! - **Plans**: Pick the steps a run needs and execute them with prepare-all-then-execute semantics
//! - **Steps**: `helm repo add`, `dependency`, `upgrade --install`, `uninstall`, `lint` and `help`
//! - **Kubeconfig**: Template rendering for cluster credentials, including EKS managed identity
//! - **Runners**: Real process execution, plus a recording mock for tests

pub mod certs;
pub mod command;
pub mod error;
pub mod kubeconfig;
pub mod plan;
pub mod runner;
pub mod steps;

pub use certs::RepoCerts;
pub use command::{DEFAULT_HELM_BIN, HelmCommand, StepContext};
pub use error::{KubeError, Phase, PlanError, Result};
pub use kubeconfig::{DEFAULT_TEMPLATE, KubeValues, KubeconfigTemplate};
pub use plan::{DEFAULT_KUBECONFIG, Family, Plan, PlanOptions, PreparedPlan};
pub use runner::{CommandRunner, Invocation, MockRunner, ProcessRunner};
pub use steps::{
    AddRepo, DependencyAction, DependencyUpdate, Help, InitKube, Lint, Step, Uninstall, Upgrade,
};
