//! Variable namespaces and `#{Namespace.Variable}` references
//!
//! Values are resolved by the pipeline service at execution time. This
//! module only deals with the textual shape of namespaces and references.

use regex::Regex;
use std::sync::OnceLock;

/// Suffix appended to derived namespaces
pub const NAMESPACE_SUFFIX: &str = "NS";

/// Separator between the parts of a derived namespace
pub const NAMESPACE_SEPARATOR: char = '_';

/// Namespace provided by the pipeline service itself
pub const BUILTIN_NAMESPACE: &str = "codepipeline";

/// Default namespace for an action: `{stage}_{action}_NS`
pub fn derive_namespace(stage: &str, action: &str) -> String {
    format!(
        "{stage}{sep}{action}{sep}{suffix}",
        sep = NAMESPACE_SEPARATOR,
        suffix = NAMESPACE_SUFFIX
    )
}

/// Reference token for a variable: `#{namespace.variable}`
pub fn reference(namespace: &str, variable: &str) -> String {
    format!("#{{{}.{}}}", namespace, variable)
}

/// A variable reference found in a configuration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableRef {
    pub namespace: String,
    pub variable: String,
}

impl VariableRef {
    pub fn is_builtin(&self) -> bool {
        self.namespace == BUILTIN_NAMESPACE
    }
}

impl std::fmt::Display for VariableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&reference(&self.namespace, &self.variable))
    }
}

/// Characters allowed in a namespace or variable name inside a token
fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '@' | '_' | '-')
}

/// Whether `namespace` can appear in a `#{namespace.variable}` token
pub fn is_valid_namespace(namespace: &str) -> bool {
    !namespace.is_empty() && namespace.chars().all(is_token_char)
}

fn token_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"#\{([A-Za-z0-9@_-]+)\.([A-Za-z0-9@_-]+)\}").ok())
        .as_ref()
}

/// Find every variable reference in `text`, in order of appearance
pub fn find_references(text: &str) -> Vec<VariableRef> {
    let Some(pattern) = token_pattern() else {
        return Vec::new();
    };

    pattern
        .captures_iter(text)
        .map(|caps| VariableRef {
            namespace: caps[1].to_string(),
            variable: caps[2].to_string(),
        })
        .collect()
}
