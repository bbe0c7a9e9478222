//! `{varname}` substitution over variables derived from a namespace.

use std::collections::HashMap;

use crate::namespace::Namespace;

pub const NAMESPACE_VAR: &str = "namespace";
pub const NAMESPACE_STATIC_VAR: &str = "namespace_static";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    vars: HashMap<String, String>,
}
impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `namespace`, `namespace_static`, both positional indices of
    /// every element (`i` and `i - n`), and the declared name of every
    /// dynamic element.
    pub fn from_namespace(namespace: &Namespace) -> Self {
        let mut vars = Self::new();
        vars.insert(NAMESPACE_VAR, namespace.joined());
        vars.insert(NAMESPACE_STATIC_VAR, namespace.static_joined());
        let n = namespace.len() as isize;
        for (i, element) in namespace.elements().iter().enumerate() {
            let i = i as isize;
            vars.insert(i.to_string(), element.value.clone());
            vars.insert((i - n).to_string(), element.value.clone());
            if let Some(name) = &element.name {
                vars.insert(name.clone(), element.value.clone());
            }
        }
        vars
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

/// Replaces every `{key}` bound in `vars`. Unbound placeholders stay as they
/// are and substituted text is not scanned again.
pub fn substitute(template: &str, vars: &Variables) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after
            .find('}')
            .and_then(|close| vars.get(&after[..close]).map(|v| (v, close)));
        match value {
            Some((v, close)) => {
                out.push_str(v);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
