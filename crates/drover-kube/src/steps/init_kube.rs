//! Kubeconfig initialization
//!
//! Prepare validates the cluster credentials, parses the template and opens the
//! destination (truncating any previous kubeconfig). Execute renders the template into
//! the open file. The file is closed on every path out of execute and is never removed.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use drover_core::ResolvedConfig;

use crate::command::StepContext;
use crate::error::{KubeError, Result};
use crate::kubeconfig::{KubeValues, KubeconfigTemplate};

/// Default identity in the generated kubeconfig
pub const DEFAULT_SERVICE_ACCOUNT: &str = "helm";

/// Writes the kubeconfig helm uses to reach the cluster
#[derive(Debug)]
pub struct InitKube {
    api_server: String,
    token: String,
    certificate: String,
    skip_tls_verify: bool,
    service_account: String,
    eks_cluster: String,
    eks_role_arn: String,
    /// Template to render; the built-in one when unset
    template_path: Option<PathBuf>,
    config_path: PathBuf,
    prepared: Option<Prepared>,
}

#[derive(Debug)]
struct Prepared {
    template: KubeconfigTemplate,
    values: KubeValues,
    file: File,
}

impl InitKube {
    pub fn new(
        cfg: &ResolvedConfig,
        template_path: Option<PathBuf>,
        config_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            api_server: cfg.api_server.clone(),
            token: cfg.kube_token.clone(),
            certificate: cfg.certificate.clone(),
            skip_tls_verify: cfg.skip_tls_verify,
            service_account: cfg.service_account.clone(),
            eks_cluster: cfg.eks_cluster.clone(),
            eks_role_arn: cfg.eks_role_arn.clone(),
            template_path,
            config_path: config_path.into(),
            prepared: None,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn prepare(&mut self, ctx: &StepContext) -> Result<()> {
        if self.api_server.is_empty() {
            return Err(KubeError::required("kube_api_server"));
        }
        if self.eks_cluster.is_empty() {
            if self.token.is_empty() {
                return Err(KubeError::required("kube_token"));
            }
        } else if !self.token.is_empty() {
            return Err(KubeError::ConfigConflict(
                "eks_cluster and kube_token cannot be used together".to_string(),
            ));
        }

        if self.service_account.is_empty() {
            self.service_account = DEFAULT_SERVICE_ACCOUNT.to_string();
        }

        let template = match &self.template_path {
            Some(path) => {
                ctx.diag(format_args!(
                    "loading kubeconfig template from {}",
                    path.display()
                ));
                KubeconfigTemplate::load(path)?
            }
            None => {
                ctx.diag("using built-in kubeconfig template");
                KubeconfigTemplate::builtin()?
            }
        };

        let values = KubeValues {
            api_server: self.api_server.clone(),
            namespace: ctx.namespace.clone(),
            token: self.token.clone(),
            certificate: self.certificate.clone(),
            skip_tls_verify: self.skip_tls_verify,
            service_account: self.service_account.clone(),
            eks_cluster: self.eks_cluster.clone(),
            eks_role_arn: self.eks_role_arn.clone(),
        };

        let verb = if self.config_path.exists() {
            "truncating"
        } else {
            "creating"
        };
        ctx.diag(format_args!(
            "{verb} kubeconfig file at {}",
            self.config_path.display()
        ));

        if let Some(parent) = self.config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| KubeError::File {
                action: "create directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let file = File::create(&self.config_path).map_err(|source| KubeError::File {
            action: "open kubeconfig file for writing",
            path: self.config_path.clone(),
            source,
        })?;

        self.prepared = Some(Prepared {
            template,
            values,
            file,
        });
        Ok(())
    }

    pub fn execute(&mut self, ctx: &StepContext) -> Result<()> {
        let Prepared {
            template,
            values,
            mut file,
        } = self.prepared.take().ok_or(KubeError::NotPrepared)?;

        ctx.diag(format_args!(
            "writing kubeconfig file to {}",
            self.config_path.display()
        ));
        let rendered = template.render(&values)?;

        let write_error = |source| KubeError::File {
            action: "write kubeconfig file",
            path: self.config_path.clone(),
            source,
        };
        file.write_all(rendered.as_bytes()).map_err(write_error)?;
        file.flush().map_err(write_error)?;
        tracing::debug!(path = %self.config_path.display(), "kubeconfig written");
        Ok(())
    }
}
