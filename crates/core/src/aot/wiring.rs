//! Feeds generated AOT output back into the build's inputs.

use super::GeneratedOutputs;
use indexmap::IndexSet;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where the processor writes, relative to the build directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AotLayout {
    pub sources_dir: PathBuf,
    pub resources_dir: PathBuf,
    pub classes_dir: PathBuf,
}

impl AotLayout {
    pub fn under(build_dir: &Path) -> Self {
        let generated = build_dir.join("generated");
        Self {
            sources_dir: generated.join("aotSources"),
            resources_dir: generated.join("aotResources"),
            classes_dir: generated.join("aotClasses"),
        }
    }
}

/// Classpath the processor runs with: the runtime classpath without
/// development-only entries, followed by the main output.
pub fn aot_processing_classpath(
    runtime_classpath: &[PathBuf],
    development_only: &[PathBuf],
    main_output: &Path,
) -> Vec<PathBuf> {
    let mut classpath: IndexSet<PathBuf> = runtime_classpath
        .iter()
        .filter(|entry| !development_only.contains(entry))
        .cloned()
        .collect();
    classpath.insert(main_output.to_path_buf());
    classpath.into_iter().collect()
}

/// Inputs of the main and aot source sets that generated output extends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceSetInputs {
    pub main_runtime_classpath: Vec<PathBuf>,
    pub aot_compile_classpath: Vec<PathBuf>,
    pub aot_source_roots: Vec<PathBuf>,
    pub aot_resource_roots: Vec<PathBuf>,
}

impl SourceSetInputs {
    pub fn new(main_runtime_classpath: Vec<PathBuf>, aot_compile_classpath: Vec<PathBuf>) -> Self {
        Self {
            main_runtime_classpath,
            aot_compile_classpath,
            ..Default::default()
        }
    }

    /// Generated sources and resources become aot source roots; generated
    /// classes join both classpaths. Wiring the same outputs twice is a no-op.
    pub fn wire(&mut self, outputs: &GeneratedOutputs) {
        push_unique(&mut self.aot_source_roots, outputs.sources_dir());
        push_unique(&mut self.aot_resource_roots, outputs.resources_dir());
        push_unique(&mut self.main_runtime_classpath, outputs.classes_dir());
        push_unique(&mut self.aot_compile_classpath, outputs.classes_dir());
    }
}

fn push_unique(paths: &mut Vec<PathBuf>, path: &Path) {
    if !paths.iter().any(|p| p == path) {
        paths.push(path.to_path_buf());
    }
}
