//! Environment snapshot
//!
//! Drone delivers the `settings` block of a pipeline step as `PLUGIN_`-prefixed,
//! uppercased environment variables and the `environment` block as plain uppercased
//! variables. The resolver reads both through an [`Environment`] taken once at startup,
//! so tests never have to mutate the real process environment.

use std::collections::BTreeMap;

/// Prefix carried by variables from the `settings` block
pub const SETTINGS_PREFIX: &str = "PLUGIN_";

/// One of the two namespaces a setting can arrive through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// `PLUGIN_<NAME>`, from the `settings` block
    Settings,
    /// `<NAME>`, from the `environment` block
    Environment,
}

impl Scope {
    /// Full variable name for a setting key in this scope
    pub fn variable(self, key: &str) -> String {
        match self {
            Scope::Settings => format!("{SETTINGS_PREFIX}{key}"),
            Scope::Environment => key.to_string(),
        }
    }
}

/// Immutable snapshot of environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Builder-style insert, mostly for tests
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a variable
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Look up a variable by its full name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Whether a variable is present, regardless of its value
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Look up a setting key in the given scope
    pub fn lookup(&self, scope: Scope, key: &str) -> Option<&str> {
        self.get(&scope.variable(key))
    }

    /// Whether a setting key is present in either scope
    pub fn has_setting(&self, key: &str) -> bool {
        self.contains(&Scope::Settings.variable(key))
            || self.contains(&Scope::Environment.variable(key))
    }
}

impl<K, V> FromIterator<(K, V)> for Environment
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
