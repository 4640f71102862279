//! Setting parsing helpers, legacy aliases and deprecated names

use crate::env::{Environment, Scope};
use crate::error::{CoreError, Result};

/// Settings from older plugin releases that are ignored with a warning
pub const DEPRECATED: &[&str] = &[
    "PURGE",
    "RECREATE_PODS",
    "TILLER_NS",
    "UPGRADE",
    "CANARY_IMAGE",
    "CLIENT_ONLY",
    "STABLE_REPO_URL",
];

/// Deprecated settings present in either scope, in declaration order
pub fn deprecated_present(env: &Environment) -> Vec<&'static str> {
    DEPRECATED
        .iter()
        .copied()
        .filter(|name| env.has_setting(name))
        .collect()
}

/// Parse a boolean the way Drone pipelines spell them
///
/// An empty value reads as `false`; presence alone still overrides earlier layers.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "" | "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        _ => None,
    }
}

/// Split a comma-separated list; blank input is an empty list
pub fn parse_list(value: &str) -> Vec<String> {
    if value.trim().is_empty() {
        return Vec::new();
    }
    value.split(',').map(str::to_string).collect()
}

/// One scope of the environment, read with typed setters
///
/// Each setter only touches its target when the variable is present, so
/// layering is a matter of applying scopes in order.
#[derive(Clone, Copy)]
pub(crate) struct Layer<'a> {
    env: &'a Environment,
    scope: Scope,
}

impl<'a> Layer<'a> {
    pub(crate) fn new(env: &'a Environment, scope: Scope) -> Self {
        Self { env, scope }
    }

    fn raw(&self, key: &str) -> Option<&'a str> {
        self.env.lookup(self.scope, key)
    }

    pub(crate) fn string(&self, key: &str, target: &mut String) {
        if let Some(value) = self.raw(key) {
            *target = value.to_string();
        }
    }

    pub(crate) fn flag(&self, key: &str, target: &mut bool) -> Result<()> {
        if let Some(value) = self.raw(key) {
            *target = parse_bool(value).ok_or_else(|| {
                CoreError::malformed(self.scope.variable(key), value, "expected a boolean")
            })?;
        }
        Ok(())
    }

    pub(crate) fn list(&self, key: &str, target: &mut Vec<String>) {
        if let Some(value) = self.raw(key) {
            *target = parse_list(value);
        }
    }

    pub(crate) fn count(&self, key: &str, target: &mut Option<u32>) -> Result<()> {
        if let Some(value) = self.raw(key) {
            let value = value.trim();
            *target = if value.is_empty() {
                None
            } else {
                Some(value.parse().map_err(|_| {
                    CoreError::malformed(
                        self.scope.variable(key),
                        value,
                        "expected a non-negative integer",
                    )
                })?)
            };
        }
        Ok(())
    }
}

/// Alternate names for a handful of settings
///
/// Some were renamed during the plugin's lifetime, others keep compatibility with the
/// original helm2-era plugin. Alias values only seed the config; the canonical names
/// override them whenever they are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingAliases {
    pub command: String,
    pub add_repos: Vec<String>,
    pub api_server: String,
    pub service_account: String,
    pub wait: bool,
    pub force: bool,
    pub kube_token: String,
    pub certificate: String,
}

impl SettingAliases {
    /// Read aliases from the settings scope, then the environment scope
    pub fn load(env: &Environment) -> Result<Self> {
        let mut aliases = Self::default();
        aliases.overlay(Layer::new(env, Scope::Settings))?;
        aliases.overlay(Layer::new(env, Scope::Environment))?;
        Ok(aliases)
    }

    fn overlay(&mut self, layer: Layer<'_>) -> Result<()> {
        layer.string("HELM_COMMAND", &mut self.command);
        layer.list("HELM_REPOS", &mut self.add_repos);
        layer.string("API_SERVER", &mut self.api_server);
        layer.string("SERVICE_ACCOUNT", &mut self.service_account);
        layer.flag("WAIT", &mut self.wait)?;
        layer.flag("FORCE", &mut self.force)?;
        layer.string("KUBERNETES_TOKEN", &mut self.kube_token);
        layer.string("KUBERNETES_CERTIFICATE", &mut self.certificate);
        Ok(())
    }
}
