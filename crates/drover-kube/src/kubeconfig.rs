//! Kubeconfig rendering
//!
//! The kubeconfig is a MiniJinja template rendered with [`KubeValues`]. Operators may
//! supply their own template file; otherwise [`DEFAULT_TEMPLATE`] is used. Whatever the
//! source, the rendered document must parse as YAML before it is written anywhere.

use std::fmt;
use std::fs;
use std::path::Path;

use minijinja::{Environment, UndefinedBehavior, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::{KubeError, Result};

/// Template shipped with the plugin
pub const DEFAULT_TEMPLATE: &str = include_str!("../assets/kubeconfig.tpl");

/// No extension, so MiniJinja never turns on auto-escaping
const TEMPLATE_NAME: &str = "kubeconfig";

/// Text that YAML reads back as the same string without quoting
static PLAIN_SCALAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_./+=][A-Za-z0-9_./:+=@-]*$").expect("valid regex")
});

/// Text that a YAML parser would resolve to a number or timestamp
static TYPED_SCALAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[-+.]?[0-9][0-9_.eE+:-]*|0[xXoObB].*|[-+]?\.(?:inf|Inf|INF|nan|NaN|NAN))$")
        .expect("valid regex")
});

const KEYWORDS: &[&str] = &[
    "true", "false", "yes", "no", "on", "off", "y", "n", "null", "~",
];

/// Everything the kubeconfig template can refer to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KubeValues {
    pub api_server: String,
    pub namespace: String,
    pub token: String,
    /// Base64 CA data, written verbatim
    pub certificate: String,
    pub skip_tls_verify: bool,
    pub service_account: String,
    pub eks_cluster: String,
    pub eks_role_arn: String,
}

/// A parsed kubeconfig template, ready to render
pub struct KubeconfigTemplate {
    env: Environment<'static>,
}

impl KubeconfigTemplate {
    /// The template shipped with the plugin
    pub fn builtin() -> Result<Self> {
        Self::parse(DEFAULT_TEMPLATE)
    }

    /// Read and parse a template file
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|source| KubeError::File {
            action: "read kubeconfig template",
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source)
    }

    pub fn parse(source: &str) -> Result<Self> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.add_filter("yaml_scalar", yaml_scalar);
        env.add_template_owned(TEMPLATE_NAME, source.to_string())?;
        Ok(Self { env })
    }

    /// Render the kubeconfig and check that it is well-formed YAML
    pub fn render(&self, values: &KubeValues) -> Result<String> {
        let rendered = self.env.get_template(TEMPLATE_NAME)?.render(values)?;
        serde_yaml::from_str::<serde_yaml::Value>(&rendered).map_err(|e| {
            KubeError::Template(format!("rendered kubeconfig is not valid YAML: {e}"))
        })?;
        Ok(rendered)
    }
}

impl fmt::Debug for KubeconfigTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeconfigTemplate").finish_non_exhaustive()
    }
}

/// Emit a value as a YAML scalar that reads back as the same string
///
/// Usage: {{ token | yaml_scalar }}
pub fn yaml_scalar(value: Value) -> String {
    let text = match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    };

    if is_plain(&text) {
        return text;
    }

    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_control() => quoted.push_str(&format!("\\u{:04x}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn is_plain(text: &str) -> bool {
    PLAIN_SCALAR.is_match(text)
        && !text.ends_with(':')
        && !TYPED_SCALAR.is_match(text)
        && !KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn token_values() -> KubeValues {
        KubeValues {
            api_server: "https://kube.example.com:6443".to_string(),
            namespace: "melt".to_string(),
            token: "b2YgbXkgZGVzaXJlcw==".to_string(),
            certificate: "LS0tLS1CRUdJTi==".to_string(),
            skip_tls_verify: false,
            service_account: "helm".to_string(),
            ..Default::default()
        }
    }

    fn parse(rendered: &str) -> serde_yaml::Value {
        serde_yaml::from_str(rendered).unwrap()
    }

    fn skip_verify_values() -> KubeValues {
        KubeValues {
            certificate: String::new(),
            skip_tls_verify: true,
            namespace: String::new(),
            ..token_values()
        }
    }

    fn eks_values() -> KubeValues {
        KubeValues {
            token: String::new(),
            eks_cluster: "production".to_string(),
            eks_role_arn: "arn:aws:iam::123456789012:role/deployer".to_string(),
            ..token_values()
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        for values in [token_values(), skip_verify_values(), eks_values()] {
            let first = KubeconfigTemplate::builtin().unwrap().render(&values).unwrap();
            let second = KubeconfigTemplate::builtin().unwrap().render(&values).unwrap();
            assert_eq!(first, second, "{values:?}");
            parse(&first);
        }
    }

    #[test]
    fn test_render_with_certificate() {
        let rendered = KubeconfigTemplate::builtin()
            .unwrap()
            .render(&token_values())
            .unwrap();
        assert!(rendered.ends_with('\n'));

        assert_snapshot!(rendered, @r"
        apiVersion: v1
        kind: Config
        clusters:
        - cluster:
            server: https://kube.example.com:6443
            certificate-authority-data: LS0tLS1CRUdJTi==
          name: helm
        contexts:
        - context:
            cluster: helm
            namespace: melt
            user: helm
          name: helm
        current-context: helm
        users:
        - name: helm
          user:
            token: b2YgbXkgZGVzaXJlcw==
        ");
    }

    #[test]
    fn test_render_skip_verify_without_certificate() {
        let rendered = KubeconfigTemplate::builtin()
            .unwrap()
            .render(&skip_verify_values())
            .unwrap();

        assert_snapshot!(rendered, @r"
        apiVersion: v1
        kind: Config
        clusters:
        - cluster:
            server: https://kube.example.com:6443
            insecure-skip-tls-verify: true
          name: helm
        contexts:
        - context:
            cluster: helm
            user: helm
          name: helm
        current-context: helm
        users:
        - name: helm
          user:
            token: b2YgbXkgZGVzaXJlcw==
        ");
    }

    #[test]
    fn test_render_without_certificate_or_skip() {
        let values = KubeValues {
            certificate: String::new(),
            ..token_values()
        };
        let doc = parse(&KubeconfigTemplate::builtin().unwrap().render(&values).unwrap());

        let cluster = &doc["clusters"][0]["cluster"];
        assert!(cluster.get("certificate-authority-data").is_none());
        assert!(cluster.get("insecure-skip-tls-verify").is_none());
    }

    #[test]
    fn test_render_eks() {
        let rendered = KubeconfigTemplate::builtin()
            .unwrap()
            .render(&eks_values())
            .unwrap();

        assert_snapshot!(rendered, @r#"
        apiVersion: v1
        kind: Config
        clusters:
        - cluster:
            server: https://kube.example.com:6443
            certificate-authority-data: LS0tLS1CRUdJTi==
          name: helm
        contexts:
        - context:
            cluster: helm
            namespace: melt
            user: helm
          name: helm
        current-context: helm
        users:
        - name: helm
          user:
            exec:
              apiVersion: client.authentication.k8s.io/v1beta1
              command: aws-iam-authenticator
              args:
                - "token"
                - "-i"
                - production
                - "-r"
                - arn:aws:iam::123456789012:role/deployer
        "#);
    }

    #[test]
    fn test_render_eks_without_role() {
        let values = KubeValues {
            token: String::new(),
            eks_cluster: "production".to_string(),
            ..token_values()
        };
        let doc = parse(&KubeconfigTemplate::builtin().unwrap().render(&values).unwrap());

        let args = doc["users"][0]["user"]["exec"]["args"].as_sequence().unwrap();
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_awkward_values_survive() {
        let values = KubeValues {
            token: "true".to_string(),
            namespace: "0755".to_string(),
            service_account: "ci: deployer # main".to_string(),
            ..token_values()
        };
        let doc = parse(&KubeconfigTemplate::builtin().unwrap().render(&values).unwrap());

        assert_eq!(doc["users"][0]["user"]["token"].as_str(), Some("true"));
        assert_eq!(doc["contexts"][0]["context"]["namespace"].as_str(), Some("0755"));
        assert_eq!(doc["users"][0]["name"].as_str(), Some("ci: deployer # main"));
    }

    #[test]
    fn test_yaml_scalar() {
        assert_eq!(yaml_scalar(Value::from("abc123==")), "abc123==");
        assert_eq!(
            yaml_scalar(Value::from("https://k8s:6443")),
            "https://k8s:6443"
        );
        assert_eq!(yaml_scalar(Value::from("")), "\"\"");
        assert_eq!(yaml_scalar(Value::from("null")), "\"null\"");
        assert_eq!(yaml_scalar(Value::from("No")), "\"No\"");
        assert_eq!(yaml_scalar(Value::from("1e3")), "\"1e3\"");
        assert_eq!(yaml_scalar(Value::from("key:")), "\"key:\"");
        assert_eq!(yaml_scalar(Value::from("a\"b\nc")), "\"a\\\"b\\nc\"");
    }

    #[test]
    fn test_custom_template() {
        let template = KubeconfigTemplate::parse("server: {{ api_server }}\n").unwrap();
        assert_eq!(
            template.render(&token_values()).unwrap(),
            "server: https://kube.example.com:6443\n"
        );
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        let template = KubeconfigTemplate::parse("a: [{{ api_server }}\n").unwrap();
        let err = template.render(&token_values()).unwrap_err();
        assert!(matches!(err, KubeError::Template(_)));
    }

    #[test]
    fn test_undefined_variable_is_error() {
        let template = KubeconfigTemplate::parse("server: {{ apiserver }}\n").unwrap();
        assert!(matches!(
            template.render(&token_values()),
            Err(KubeError::Template(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = KubeconfigTemplate::load(Path::new("/nonexistent/kubeconfig.tpl")).unwrap_err();
        assert!(matches!(err, KubeError::File { .. }));
    }
}
