use serde::{Deserialize, Serialize};

/// One element of a namespace. Elements with a `name` are dynamic: the name
/// is declared up front and the value is bound at collection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceElement {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}
impl NamespaceElement {
    pub fn new_static(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            name: None,
            description: String::new(),
        }
    }
    pub fn new_dynamic(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            value: "*".into(),
            name: Some(name.into()),
            description: description.into(),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.name.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(Vec<NamespaceElement>);
impl Namespace {
    pub fn new<S: AsRef<str>>(values: &[S]) -> Self {
        Self(
            values
                .iter()
                .map(|v| NamespaceElement::new_static(v.as_ref()))
                .collect(),
        )
    }

    pub fn add_static_element(mut self, value: impl Into<String>) -> Self {
        self.0.push(NamespaceElement::new_static(value));
        self
    }
    pub fn add_dynamic_element(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.0.push(NamespaceElement::new_dynamic(name, description));
        self
    }

    pub fn elements(&self) -> &[NamespaceElement] {
        &self.0
    }
    pub fn elements_mut(&mut self) -> &mut [NamespaceElement] {
        &mut self.0
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(|e| e.value.as_str())
    }

    /// All element values joined with `.`.
    pub fn joined(&self) -> String {
        self.values().collect::<Vec<_>>().join(".")
    }
    /// Static element values joined with `.`.
    pub fn static_joined(&self) -> String {
        self.0
            .iter()
            .filter(|e| !e.is_dynamic())
            .map(|e| e.value.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
    /// Fully-joined path form, e.g. `/intel/cpu/load`. Exclusion patterns
    /// match against this.
    pub fn path(&self) -> String {
        self.values().fold(String::new(), |mut path, v| {
            path.push('/');
            path.push_str(v);
            path
        })
    }
}
impl core::fmt::Display for Namespace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.path())
    }
}
impl From<Vec<NamespaceElement>> for Namespace {
    fn from(elements: Vec<NamespaceElement>) -> Self {
        Self(elements)
    }
}
