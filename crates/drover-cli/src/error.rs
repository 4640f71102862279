//! CLI error types with exit code handling

use drover_core::CoreError;
use drover_kube::{KubeError, PlanError};
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// Everything that can end a plugin run early
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Settings are conflicting, missing or malformed
    #[error("Configuration error: {message}")]
    #[diagnostic(code(drover::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// A step ran and failed
    #[error("{message}")]
    #[diagnostic(code(drover::cli::step))]
    Step {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (kubeconfig, templates, certificates)
    #[error("IO error: {message}")]
    #[diagnostic(code(drover::cli::io))]
    Io { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Step { .. } => exit_codes::STEP_FAILURE,
            CliError::Io { .. } => exit_codes::IO_ERROR,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MalformedValue { .. } => CliError::Config {
                message: err.to_string(),
                help: Some(
                    "booleans accept true/false/1/0; history_max takes a whole number".to_string(),
                ),
            },
            CoreError::JsonSerialize(_) => CliError::Step {
                message: err.to_string(),
                help: None,
            },
        }
    }
}

impl From<PlanError> for CliError {
    fn from(err: PlanError) -> Self {
        let message = err.to_string();
        let cause = err.cause();

        if cause.is_config_error() {
            return CliError::Config {
                message,
                help: config_help(cause),
            };
        }
        match cause {
            KubeError::File { .. } | KubeError::Io(_) => CliError::Io { message },
            KubeError::UnknownCommand(_) => CliError::Step {
                message,
                help: Some("mode must be one of upgrade, uninstall, lint or help".to_string()),
            },
            KubeError::Spawn { .. } => CliError::Step {
                message,
                help: Some(
                    "point --helm-bin (or DROVER_HELM_BIN) at the helm executable".to_string(),
                ),
            },
            _ => CliError::Step {
                message,
                help: None,
            },
        }
    }
}

fn config_help(cause: &KubeError) -> Option<String> {
    match cause {
        KubeError::MissingRequired { field } => {
            let setting = match *field {
                "repo" => "add_repos",
                other => other,
            };
            Some(format!("set `{setting}` in the plugin settings"))
        }
        _ => None,
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
