//! Chart repository certificates
//!
//! Certificates arrive base64-encoded in the settings. Steps that talk to chart
//! repositories decode them into temporary files and pass the paths to helm. The files
//! are removed when the owning step is dropped.

use std::io::Write;

use base64::Engine as _;
use tempfile::NamedTempFile;

use crate::command::StepContext;
use crate::error::{KubeError, Result};

/// Decoded repository certificates for one step
#[derive(Debug, Default)]
pub struct RepoCerts {
    cert: String,
    ca_cert: String,
    cert_file: Option<NamedTempFile>,
    ca_cert_file: Option<NamedTempFile>,
}

impl RepoCerts {
    pub fn new(cert: impl Into<String>, ca_cert: impl Into<String>) -> Self {
        Self {
            cert: cert.into(),
            ca_cert: ca_cert.into(),
            ..Default::default()
        }
    }

    /// Decode the certificates and write each one to a fresh temporary file
    pub fn write(&mut self, ctx: &StepContext) -> Result<()> {
        if !self.cert.is_empty() {
            let file = materialize(&self.cert, ".cert", "repo_certificate")?;
            ctx.diag(format_args!(
                "writing repo certificate to {}",
                file.path().display()
            ));
            self.cert_file = Some(file);
        }
        if !self.ca_cert.is_empty() {
            let file = materialize(&self.ca_cert, ".ca.cert", "repo_ca_certificate")?;
            ctx.diag(format_args!(
                "writing repo ca certificate to {}",
                file.path().display()
            ));
            self.ca_cert_file = Some(file);
        }
        Ok(())
    }

    /// `--cert-file` / `--ca-file` for whatever was written
    pub fn flags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if let Some(file) = &self.cert_file {
            flags.push("--cert-file".to_string());
            flags.push(file.path().display().to_string());
        }
        if let Some(file) = &self.ca_cert_file {
            flags.push("--ca-file".to_string());
            flags.push(file.path().display().to_string());
        }
        flags
    }
}

fn materialize(encoded: &str, suffix: &str, setting: &'static str) -> Result<NamedTempFile> {
    let raw = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| KubeError::invalid(setting, format!("not valid base64: {e}")))?;

    let mut file = tempfile::Builder::new()
        .prefix("repo")
        .suffix(suffix)
        .tempfile()?;
    file.write_all(&raw)?;
    file.flush()?;
    Ok(file)
}
