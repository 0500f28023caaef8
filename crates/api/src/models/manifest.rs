//! Ordered, case-insensitive jar manifest attributes.

use crate::error::{ApiError, ApiResult};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Well-known main-section attribute names.
pub mod attribute {
    pub const MANIFEST_VERSION: &str = "Manifest-Version";
    pub const MAIN_CLASS: &str = "Main-Class";
    pub const TOOL_VERSION: &str = "Jarsmith-Version";
    pub const BUILD_JDK: &str = "Build-Jdk";
    pub const IMPLEMENTATION_TITLE: &str = "Implementation-Title";
    pub const IMPLEMENTATION_VERSION: &str = "Implementation-Version";
}

/// Longest attribute name the jar manifest format accepts.
const MAX_NAME_LEN: usize = 70;

/// Main-section attributes of a jar manifest.
///
/// Names compare ASCII case-insensitively (as the jar format requires) and keep
/// the spelling and position of their first insertion. A name never maps to
/// more than one value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestAttributes {
    entries: IndexMap<String, (String, String)>,
}

impl ManifestAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: &str) -> String {
        name.to_ascii_lowercase()
    }

    /// Sets `name` unconditionally, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.entries.get_mut(&Self::key(&name)) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.insert(Self::key(&name), (name, value));
                None
            }
        }
    }

    /// Sets `name` only when it is absent. Returns whether the value was written.
    pub fn put_if_absent(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.insert(name, value);
        true
    }

    /// Like [`put_if_absent`](Self::put_if_absent), but only evaluates the value
    /// when the attribute is missing.
    pub fn compute_if_absent(&mut self, name: &str, compute: impl FnOnce() -> String) -> &str {
        let key = Self::key(name);
        let (_, value) = self
            .entries
            .entry(key)
            .or_insert_with(|| (name.to_string(), compute()));
        value.as_str()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&Self::key(name)).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&Self::key(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attributes in insertion order, with their original spelling.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Checks names and values against the manifest grammar: names are
    /// `[A-Za-z0-9_-]{1,70}`, values carry no line breaks or NUL.
    pub fn validate(&self) -> ApiResult<()> {
        for (name, value) in self.iter() {
            if name.is_empty() || name.len() > MAX_NAME_LEN {
                return Err(ApiError::InvalidManifest(format!(
                    "attribute name '{}' must be 1-{} bytes",
                    name, MAX_NAME_LEN
                )));
            }
            if !name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
            {
                return Err(ApiError::InvalidManifest(format!(
                    "attribute name '{}' contains illegal characters",
                    name
                )));
            }
            if value.contains(['\r', '\n', '\0']) {
                return Err(ApiError::InvalidManifest(format!(
                    "value of '{}' contains a line break or NUL",
                    name
                )));
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ManifestAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}

impl Serialize for ManifestAttributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for ManifestAttributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, String>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}
