//! Build plan: the eagerly resolved description of one build invocation.
//!
//! The host build writes a JSON file; everything the pipeline needs is read
//! from it once. Relative paths are resolved against the plan's directory.

use crate::aot::{AotLayout, DEFAULT_PROCESSOR_MAIN_CLASS};
use crate::archive::ManifestDefaults;
use crate::archive::manifest::UNSPECIFIED_VERSION;
use crate::ledger::ArtifactLedger;
use jarsmith_api::{ApiResult, AotInvocation, ArtifactRecord, ManifestAttributes};
use jarsmith_jvm::{JavaToolchain, ToolchainError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to read build plan {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse build plan {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid build plan: {0}")]
    Invalid(String),
}

/// Explicit value first, then the computed default, otherwise absent.
pub fn layered<T>(explicit: Option<T>, computed: impl FnOnce() -> Option<T>) -> Option<T> {
    explicit.or_else(computed)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    #[serde(default)]
    pub group: String,
    #[serde(default = "unspecified")]
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AotSettings {
    pub processor_main_class: String,
    pub native_build_args: Option<String>,
    pub envs: Vec<String>,
    pub args: Vec<Option<String>>,
    pub jvm_args: Vec<String>,
}

impl Default for AotSettings {
    fn default() -> Self {
        Self {
            processor_main_class: DEFAULT_PROCESSOR_MAIN_CLASS.to_string(),
            native_build_args: None,
            envs: Vec::new(),
            args: Vec::new(),
            jvm_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub jvm_args: Vec<String>,
    pub optimized_launch: bool,
    pub args: Vec<String>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            jvm_args: Vec::new(),
            optimized_launch: true,
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    pub project: ProjectInfo,
    #[serde(default)]
    pub main_class: Option<String>,
    #[serde(default)]
    pub target_jdk: Option<String>,
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,
    pub main_output: PathBuf,
    #[serde(default)]
    pub runtime_classpath: Vec<PathBuf>,
    #[serde(default)]
    pub development_only: Vec<PathBuf>,
    #[serde(default)]
    pub artifacts: Vec<ArtifactRecord>,
    #[serde(default)]
    pub manifest: ManifestAttributes,
    #[serde(default)]
    pub archive: Option<PathBuf>,
    #[serde(default)]
    pub aot: AotSettings,
    #[serde(default)]
    pub run: RunSettings,
    #[serde(default)]
    pub java_home: Option<PathBuf>,
}

fn unspecified() -> String {
    UNSPECIFIED_VERSION.to_string()
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("build")
}

impl BuildPlan {
    pub fn load(path: &Path) -> Result<Self, PlanError> {
        let content = std::fs::read_to_string(path).map_err(|source| PlanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let plan: BuildPlan =
            serde_json::from_str(&content).map_err(|source| PlanError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let base = std::path::absolute(base).map_err(|source| PlanError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let plan = plan.resolved_against(&base);
        plan.validate()?;
        tracing::debug!("Loaded build plan for {}", plan.project.name);
        Ok(plan)
    }

    /// Rewrites every relative path as `base`-relative.
    pub fn resolved_against(mut self, base: &Path) -> Self {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.build_dir);
        resolve(&mut self.main_output);
        self.runtime_classpath.iter_mut().for_each(resolve);
        self.development_only.iter_mut().for_each(resolve);
        self.artifacts.iter_mut().for_each(|a| resolve(&mut a.file));
        self.archive.iter_mut().for_each(resolve);
        self.java_home.iter_mut().for_each(resolve);
        self
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if self.project.name.trim().is_empty() {
            return Err(PlanError::Invalid("project name must not be empty".to_string()));
        }
        if self.main_class.as_deref().is_some_and(|m| m.trim().is_empty()) {
            return Err(PlanError::Invalid("main class must not be blank".to_string()));
        }
        Ok(())
    }

    /// The plan's `java_home`, otherwise a discovered installation.
    pub fn toolchain(&self) -> Result<Option<JavaToolchain>, ToolchainError> {
        let explicit = self
            .java_home
            .as_ref()
            .map(JavaToolchain::from_home)
            .transpose()?;
        Ok(layered(explicit, JavaToolchain::discover))
    }

    /// Launcher of `toolchain`, or `java` from `PATH`.
    pub fn java_executable(toolchain: Option<&JavaToolchain>) -> PathBuf {
        toolchain
            .map(JavaToolchain::java_executable)
            .unwrap_or_else(|| PathBuf::from("java"))
    }

    pub fn target_jdk(&self, toolchain: Option<&JavaToolchain>) -> Option<String> {
        layered(self.target_jdk.clone(), || {
            toolchain.and_then(JavaToolchain::language_version)
        })
    }

    /// `<build_dir>/libs/<name>[-<version>].jar` unless set explicitly.
    pub fn archive_destination(&self) -> PathBuf {
        self.archive.clone().unwrap_or_else(|| {
            let file_name = if self.project.version == UNSPECIFIED_VERSION {
                format!("{}.jar", self.project.name)
            } else {
                format!("{}-{}.jar", self.project.name, self.project.version)
            };
            self.build_dir.join("libs").join(file_name)
        })
    }

    pub fn manifest_defaults(&self, toolchain: Option<&JavaToolchain>) -> ManifestDefaults {
        ManifestDefaults {
            main_class: self.main_class.clone(),
            tool_version: None,
            build_jdk: self.target_jdk(toolchain),
            implementation_title: Some(self.project.name.clone()),
            implementation_version: Some(self.project.version.clone()),
        }
    }

    pub fn ledger(&self) -> ArtifactLedger {
        let mut ledger = ArtifactLedger::new();
        ledger.record(self.artifacts.iter().cloned());
        ledger
    }

    pub fn aot_layout(&self) -> AotLayout {
        AotLayout::under(&self.build_dir)
    }

    pub fn aot_invocation(&self) -> ApiResult<AotInvocation> {
        let layout = self.aot_layout();
        let mut builder = AotInvocation::builder()
            .classes_output(layout.classes_dir)
            .sources_output(layout.sources_dir)
            .resources_output(layout.resources_dir)
            .group_id(self.project.group.clone())
            .artifact_id(self.project.name.clone())
            .env_profiles(self.aot.envs.iter().cloned())
            .native_build_args(self.aot.native_build_args.clone())
            .extra_args(self.aot.args.iter().cloned());
        if let Some(main_class) = &self.main_class {
            builder = builder.main_class(main_class.clone());
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MINIMAL: &str = r#"{
        "project": { "name": "demo", "group": "com.example" },
        "main_class": "com.example.App",
        "main_output": "build/classes",
        "runtime_classpath": ["libs/a.jar", "/abs/b.jar"]
    }"#;

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempdir().unwrap();
        let plan_path = dir.path().join("plan.json");
        std::fs::write(&plan_path, MINIMAL).unwrap();

        let plan = BuildPlan::load(&plan_path).unwrap();
        let base = std::path::absolute(dir.path()).unwrap();
        assert_eq!(plan.main_output, base.join("build/classes"));
        assert_eq!(plan.build_dir, base.join("build"));
        assert_eq!(plan.runtime_classpath[0], base.join("libs/a.jar"));
        assert_eq!(plan.runtime_classpath[1], PathBuf::from("/abs/b.jar"));
        assert_eq!(plan.project.version, UNSPECIFIED_VERSION);
        assert!(plan.run.optimized_launch);
        assert_eq!(plan.aot.processor_main_class, DEFAULT_PROCESSOR_MAIN_CLASS);
    }

    #[test]
    fn test_archive_destination_layers() {
        let mut plan: BuildPlan = serde_json::from_str(MINIMAL).unwrap();
        plan = plan.resolved_against(Path::new("/p"));
        assert_eq!(plan.archive_destination(), PathBuf::from("/p/build/libs/demo.jar"));

        plan.project.version = "1.0.0".to_string();
        assert_eq!(
            plan.archive_destination(),
            PathBuf::from("/p/build/libs/demo-1.0.0.jar")
        );

        plan.archive = Some(PathBuf::from("/out/custom.jar"));
        assert_eq!(plan.archive_destination(), PathBuf::from("/out/custom.jar"));
    }

    #[test]
    fn test_target_jdk_prefers_explicit_value() {
        let mut plan: BuildPlan = serde_json::from_str(MINIMAL).unwrap();
        assert_eq!(plan.target_jdk(None), None);
        plan.target_jdk = Some("21".to_string());
        assert_eq!(plan.target_jdk(None).as_deref(), Some("21"));
        assert_eq!(BuildPlan::java_executable(None), PathBuf::from("java"));
    }

    #[test]
    fn test_aot_invocation_from_plan() {
        let mut plan: BuildPlan = serde_json::from_str(MINIMAL).unwrap();
        plan = plan.resolved_against(Path::new("/p"));
        plan.aot.envs = vec!["prod".to_string()];

        let invocation = plan.aot_invocation().unwrap();
        assert_eq!(invocation.group_id, "com.example");
        assert_eq!(invocation.artifact_id, "demo");
        assert_eq!(
            invocation.classes_output,
            PathBuf::from("/p/build/generated/aotClasses")
        );
        assert!(invocation.env_profiles.contains("prod"));
    }

    #[test]
    fn test_missing_main_class_blocks_aot_only() {
        let json = r#"{ "project": { "name": "lib" }, "main_output": "out" }"#;
        let plan: BuildPlan = serde_json::from_str(json).unwrap();
        assert!(plan.validate().is_ok());
        assert!(plan.aot_invocation().is_err());
        assert_eq!(plan.manifest_defaults(None).main_class, None);
    }

    #[test]
    fn test_malformed_plan_reports_path() {
        let dir = tempdir().unwrap();
        let plan_path = dir.path().join("plan.json");
        std::fs::write(&plan_path, "{ not json").unwrap();
        match BuildPlan::load(&plan_path) {
            Err(PlanError::Parse { path, .. }) => assert_eq!(path, plan_path),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }
}
