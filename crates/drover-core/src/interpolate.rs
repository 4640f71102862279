//! Secret placeholder expansion
//!
//! Pipelines keep secrets out of `values` by referencing environment variables
//! (`password=$DB_PASSWORD` or `password=${DB_PASSWORD}`). Expansion happens here as a
//! pure string-to-string step; the caller decides where the values come from and what
//! to do about names that could not be resolved.
//!
//! The braces are matched independently, so `${NAME`, `$NAME}` and `${NAME}` all
//! expand the same way. Existing pipelines rely on that.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{?([A-Za-z0-9_]+)\}?").expect("valid placeholder regex"));

/// Result of expanding placeholders in one string
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Expansion {
    /// Text with every placeholder replaced
    pub text: String,
    /// Names that had no value and were replaced with an empty string, in order of appearance
    pub unresolved: Vec<String>,
}

/// Replace `$NAME` and `${NAME}` tokens using `lookup`
///
/// Missing names expand to the empty string and are reported in
/// [`Expansion::unresolved`].
pub fn expand<F>(text: &str, lookup: F) -> Expansion
where
    F: Fn(&str) -> Option<String>,
{
    let mut unresolved = Vec::new();
    let text = PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| {
            let name = &caps[1];
            match lookup(name) {
                Some(value) => value,
                None => {
                    unresolved.push(name.to_string());
                    String::new()
                }
            }
        })
        .into_owned();

    Expansion { text, unresolved }
}
