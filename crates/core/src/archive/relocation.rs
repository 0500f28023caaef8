//! Entry path relocation applied while classpath content is copied.
//!
//! "Moving to the archive root" keeps only the file name of the entry, so a
//! relocated path is already at the root and relocating it again is a no-op.

use std::borrow::Cow;

pub const MODULE_DESCRIPTOR: &str = "module-info.class";
pub const META_INF_PREFIX: &str = "META-INF/";

/// A single declarative rewrite over entry paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocationRule {
    /// Any entry whose file name equals `file_name` moves to the root.
    FileNameToRoot { file_name: String },
    /// Entries under `prefix` move to the root unless an exclusion matches.
    PrefixToRoot {
        prefix: String,
        keep_exact: Vec<String>,
        keep_suffixes: Vec<String>,
        keep_prefixes: Vec<String>,
    },
}

impl RelocationRule {
    /// `module-info.class` at any depth goes to the root.
    pub fn module_descriptor() -> Self {
        RelocationRule::FileNameToRoot {
            file_name: MODULE_DESCRIPTOR.to_string(),
        }
    }

    /// `META-INF/**` goes to the root, except `META-INF/aop.xml`, Kotlin
    /// module descriptors and service registrations.
    pub fn meta_inf() -> Self {
        RelocationRule::PrefixToRoot {
            prefix: META_INF_PREFIX.to_string(),
            keep_exact: vec!["META-INF/aop.xml".to_string()],
            keep_suffixes: vec![".kotlin_module".to_string()],
            keep_prefixes: vec!["META-INF/services/".to_string()],
        }
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            RelocationRule::FileNameToRoot { file_name } => file_name_of(path) == file_name,
            RelocationRule::PrefixToRoot {
                prefix,
                keep_exact,
                keep_suffixes,
                keep_prefixes,
            } => {
                path.starts_with(prefix.as_str())
                    && !keep_exact.iter().any(|keep| path == keep)
                    && !keep_suffixes.iter().any(|suffix| path.ends_with(suffix.as_str()))
                    && !keep_prefixes.iter().any(|keep| path.starts_with(keep.as_str()))
            }
        }
    }

    /// Rewrites `path` when the rule applies.
    pub fn apply<'a>(&self, path: &'a str) -> &'a str {
        if self.matches(path) {
            file_name_of(path)
        } else {
            path
        }
    }
}

fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Ordered rule set; every rule sees the output of the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationRules {
    rules: Vec<RelocationRule>,
}

impl RelocationRules {
    pub fn new(rules: Vec<RelocationRule>) -> Self {
        Self { rules }
    }

    /// No rewriting at all.
    pub fn none() -> Self {
        Self { rules: Vec::new() }
    }

    /// Module descriptor first, then `META-INF` content.
    pub fn standard() -> Self {
        Self::new(vec![
            RelocationRule::module_descriptor(),
            RelocationRule::meta_inf(),
        ])
    }

    pub fn relocate<'a>(&self, path: &'a str) -> Cow<'a, str> {
        let mut current = Cow::Borrowed(path);
        for rule in &self.rules {
            let next = rule.apply(&current);
            if next != &*current {
                let next = next.to_string();
                current = Cow::Owned(next);
            }
        }
        current
    }
}

impl Default for RelocationRules {
    fn default() -> Self {
        Self::standard()
    }
}
