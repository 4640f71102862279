//! Error types for drover-kube

use std::path::PathBuf;
use thiserror::Error;

/// Result type for drover-kube operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors raised while preparing or executing a single step
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// Mutually exclusive settings were both supplied
    #[error("{0}")]
    ConfigConflict(String),

    /// A setting the step cannot work without is empty
    #[error("{field} is required")]
    MissingRequired { field: &'static str },

    /// A setting has a value the step cannot use
    #[error("invalid {setting}: {reason}")]
    InvalidSetting {
        setting: &'static str,
        reason: String,
    },

    /// helm ran and exited unsuccessfully; its own stderr carries the details
    #[error("{program} exited with {status}")]
    ExternalToolFailure { program: String, status: String },

    /// helm could not be started at all
    #[error("could not run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The plan fell back to `helm help` for a command it does not know
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// Kubeconfig template could not be parsed or rendered
    #[error("kubeconfig template error: {0}")]
    Template(String),

    /// A file the step needs could not be read or written
    #[error("could not {action} {}: {source}", .path.display())]
    File {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Execute was called on a step whose prepare never ran
    #[error("step was executed before it was prepared")]
    NotPrepared,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<minijinja::Error> for KubeError {
    fn from(e: minijinja::Error) -> Self {
        KubeError::Template(e.to_string())
    }
}

impl KubeError {
    pub(crate) fn required(field: &'static str) -> Self {
        KubeError::MissingRequired { field }
    }

    pub(crate) fn invalid(setting: &'static str, reason: impl Into<String>) -> Self {
        KubeError::InvalidSetting {
            setting,
            reason: reason.into(),
        }
    }

    /// Whether the error comes from the pipeline's settings rather than from running helm
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            KubeError::ConfigConflict(_)
                | KubeError::MissingRequired { .. }
                | KubeError::InvalidSetting { .. }
                | KubeError::Template(_)
        )
    }
}

/// Which half of the two-phase step protocol failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Prepare,
    Execute,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Prepare => f.write_str("preparing"),
            Phase::Execute => f.write_str("executing"),
        }
    }
}

/// Errors raised while compiling or running a plan
#[derive(Debug, Error)]
pub enum PlanError {
    /// The configuration cannot be turned into a plan at all
    #[error("could not build plan: {0}")]
    Compile(#[source] KubeError),

    /// A step failed; nothing after it ran
    #[error("while {phase} {step} step (step {index}): {source}")]
    Step {
        phase: Phase,
        index: usize,
        step: &'static str,
        #[source]
        source: KubeError,
    },
}

impl PlanError {
    /// The underlying step or compile error
    pub fn cause(&self) -> &KubeError {
        match self {
            PlanError::Compile(e) => e,
            PlanError::Step { source, .. } => source,
        }
    }

    /// Phase of the failing step, if a step failed
    pub fn phase(&self) -> Option<Phase> {
        match self {
            PlanError::Compile(_) => None,
            PlanError::Step { phase, .. } => Some(*phase),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_error_names_step() {
        let err = PlanError::Step {
            phase: Phase::Prepare,
            index: 2,
            step: "Upgrade",
            source: KubeError::required("chart"),
        };

        assert_eq!(
            err.to_string(),
            "while preparing Upgrade step (step 2): chart is required"
        );
        assert!(err.cause().is_config_error());
        assert_eq!(err.phase(), Some(Phase::Prepare));
    }

    #[test]
    fn test_tool_failure_is_not_config_error() {
        let err = KubeError::ExternalToolFailure {
            program: "/usr/bin/helm".to_string(),
            status: "exit status: 1".to_string(),
        };
        assert!(!err.is_config_error());
        assert!(!KubeError::UnknownCommand("deploy".into()).is_config_error());
    }
}
