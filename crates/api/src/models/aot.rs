//! Input of one ahead-of-time processing run.

use crate::error::{ApiError, ApiResult};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything the AOT processor needs for a single build invocation.
///
/// Built once through [`AotInvocation::builder`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AotInvocation {
    /// Main class of the application being processed.
    pub main_class: String,
    pub classes_output: PathBuf,
    pub sources_output: PathBuf,
    pub resources_output: PathBuf,
    pub group_id: String,
    pub artifact_id: String,
    pub native_build_args: Option<String>,
    /// Requested environment profiles, deduplicated in first-seen order.
    pub env_profiles: IndexSet<String>,
    /// Caller-supplied trailing arguments; `None` slots are dropped when the
    /// argument list is built.
    pub extra_args: Vec<Option<String>>,
}

impl AotInvocation {
    pub fn builder() -> AotInvocationBuilder {
        AotInvocationBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct AotInvocationBuilder {
    main_class: Option<String>,
    classes_output: Option<PathBuf>,
    sources_output: Option<PathBuf>,
    resources_output: Option<PathBuf>,
    group_id: Option<String>,
    artifact_id: Option<String>,
    native_build_args: Option<String>,
    env_profiles: IndexSet<String>,
    extra_args: Vec<Option<String>>,
}

impl AotInvocationBuilder {
    pub fn main_class(mut self, main_class: impl Into<String>) -> Self {
        self.main_class = Some(main_class.into());
        self
    }

    pub fn classes_output(mut self, dir: impl Into<PathBuf>) -> Self {
        self.classes_output = Some(dir.into());
        self
    }

    pub fn sources_output(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sources_output = Some(dir.into());
        self
    }

    pub fn resources_output(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resources_output = Some(dir.into());
        self
    }

    pub fn group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn artifact_id(mut self, artifact_id: impl Into<String>) -> Self {
        self.artifact_id = Some(artifact_id.into());
        self
    }

    pub fn native_build_args(mut self, args: Option<String>) -> Self {
        self.native_build_args = args;
        self
    }

    pub fn env_profiles<I, S>(mut self, profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env_profiles.extend(profiles.into_iter().map(Into::into));
        self
    }

    pub fn extra_args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        self.extra_args.extend(args);
        self
    }

    pub fn build(self) -> ApiResult<AotInvocation> {
        let main_class = self.main_class.ok_or(ApiError::MissingValue("main class"))?;
        if main_class.trim().is_empty() {
            return Err(ApiError::InvalidArgument(
                "main class must not be blank".to_string(),
            ));
        }
        let classes_output = self
            .classes_output
            .ok_or(ApiError::MissingValue("classes output directory"))?;
        let sources_output = self
            .sources_output
            .ok_or(ApiError::MissingValue("sources output directory"))?;
        let resources_output = self
            .resources_output
            .ok_or(ApiError::MissingValue("resources output directory"))?;

        Ok(AotInvocation {
            main_class,
            classes_output,
            sources_output,
            resources_output,
            group_id: self.group_id.ok_or(ApiError::MissingValue("group id"))?,
            artifact_id: self
                .artifact_id
                .ok_or(ApiError::MissingValue("artifact id"))?,
            native_build_args: self.native_build_args,
            env_profiles: self.env_profiles,
            extra_args: self.extra_args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> AotInvocationBuilder {
        AotInvocation::builder()
            .main_class("com.x.App")
            .classes_output("/c")
            .sources_output("/s")
            .resources_output("/r")
            .group_id("g")
            .artifact_id("a")
    }

    #[test]
    fn test_builder_requires_main_class() {
        let err = AotInvocation::builder()
            .classes_output("/c")
            .sources_output("/s")
            .resources_output("/r")
            .group_id("g")
            .artifact_id("a")
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingValue("main class")));
    }

    #[test]
    fn test_env_profiles_are_an_ordered_set() {
        let invocation = base()
            .env_profiles(["dev", "test", "dev"])
            .build()
            .unwrap();
        let profiles: Vec<_> = invocation.env_profiles.iter().cloned().collect();
        assert_eq!(profiles, vec!["dev", "test"]);
    }
}
