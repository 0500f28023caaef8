//! Stages of a build invocation driven by a [`BuildPlan`].

use crate::aot::{AotOrchestrator, GeneratedOutputs, SourceSetInputs, aot_processing_classpath};
use crate::archive::{ArchiveAssembler, ArchiveRequest, AssembledArchive};
use crate::error::Result;
use crate::launch::RunLauncher;
use crate::ledger::LedgerFingerprint;
use crate::plan::{BuildPlan, layered};
use crate::process::{ProcessRunner, SystemProcessRunner};
use indexmap::IndexSet;
use std::path::{Path, PathBuf};

/// Overrides for a `run`.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Overrides the plan's `optimized_launch` when set.
    pub optimized: Option<bool>,
    /// Appended after the plan's JVM arguments.
    pub jvm_args: Vec<String>,
    /// Replace the plan's program arguments when non-empty.
    pub args: Vec<String>,
}

/// Result of AOT processing followed by packaging.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub generated: GeneratedOutputs,
    pub inputs: SourceSetInputs,
    pub archive: AssembledArchive,
}

pub struct Pipeline<R: ProcessRunner = SystemProcessRunner> {
    plan: BuildPlan,
    runner: R,
}

impl Pipeline<SystemProcessRunner> {
    pub fn new(plan: BuildPlan) -> Self {
        Self::with_runner(plan, SystemProcessRunner)
    }
}

impl<R: ProcessRunner> Pipeline<R> {
    pub fn with_runner(plan: BuildPlan, runner: R) -> Self {
        Self { plan, runner }
    }

    pub fn plan(&self) -> &BuildPlan {
        &self.plan
    }

    /// Assembles the archive from the main output and the runtime classpath.
    pub fn package(&self, output: Option<&Path>) -> Result<AssembledArchive> {
        self.package_with(output, &self.plan.runtime_classpath, &[])
    }

    fn package_with(
        &self,
        output: Option<&Path>,
        runtime_classpath: &[PathBuf],
        extra: &[PathBuf],
    ) -> Result<AssembledArchive> {
        let toolchain = self.plan.toolchain()?;
        let destination = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.plan.archive_destination());

        let request = ArchiveRequest {
            destination,
            main_output: Some(self.plan.main_output.clone()),
            classpath: self.packaging_classpath(runtime_classpath, extra),
            manifest_seed: self.plan.manifest.clone(),
            defaults: self.plan.manifest_defaults(toolchain.as_ref()),
        };
        Ok(ArchiveAssembler::new().assemble(&request)?)
    }

    /// Runtime classpath, then resolved artifacts not already on it, then
    /// `extra`. The main output is packaged separately and left out.
    pub fn packaging_classpath(&self, runtime_classpath: &[PathBuf], extra: &[PathBuf]) -> Vec<PathBuf> {
        let ledger = self.plan.ledger();
        let mut classpath: IndexSet<PathBuf> = IndexSet::new();
        for path in runtime_classpath.iter().chain(ledger.files()).chain(extra) {
            if path != &self.plan.main_output {
                classpath.insert(path.clone());
            }
        }
        classpath.into_iter().collect()
    }

    /// Runs the AOT processor and wires its output into the source-set inputs.
    pub fn process_aot(&self) -> Result<(GeneratedOutputs, SourceSetInputs)> {
        let invocation = self.plan.aot_invocation()?;
        let toolchain = self.plan.toolchain()?;
        let java = BuildPlan::java_executable(toolchain.as_ref());

        let classpath = aot_processing_classpath(
            &self.plan.runtime_classpath,
            &self.plan.development_only,
            &self.plan.main_output,
        );
        let orchestrator = AotOrchestrator::with_runner(java, &self.runner)
            .processor_main_class(self.plan.aot.processor_main_class.clone())
            .jvm_args(self.plan.aot.jvm_args.clone())
            .classpath(classpath.clone());

        let generated = orchestrator.run(&invocation)?;

        let mut inputs = SourceSetInputs::new(self.plan.runtime_classpath.clone(), classpath);
        inputs.wire(&generated);
        Ok((generated, inputs))
    }

    /// AOT processing, then packaging with the generated classes and
    /// resources on the classpath.
    pub fn build(&self, output: Option<&Path>) -> Result<BuildOutcome> {
        let (generated, inputs) = self.process_aot()?;
        let archive = self.package_with(
            output,
            &inputs.main_runtime_classpath,
            &[generated.resources_dir().to_path_buf()],
        )?;
        Ok(BuildOutcome {
            generated,
            inputs,
            archive,
        })
    }

    /// Runs the application from its runtime classpath.
    pub fn run(&self, options: &RunOptions) -> Result<()> {
        let main_class = self
            .plan
            .main_class
            .clone()
            .ok_or(jarsmith_api::ApiError::MissingValue("main class"))?;
        let toolchain = self.plan.toolchain()?;
        let java = BuildPlan::java_executable(toolchain.as_ref());

        let mut classpath: IndexSet<PathBuf> = IndexSet::new();
        classpath.insert(self.plan.main_output.clone());
        classpath.extend(self.plan.runtime_classpath.iter().cloned());

        let args = if options.args.is_empty() {
            self.plan.run.args.clone()
        } else {
            options.args.clone()
        };
        let mut jvm_args = self.plan.run.jvm_args.clone();
        jvm_args.extend(options.jvm_args.iter().cloned());
        let optimized =
            layered(options.optimized, || Some(self.plan.run.optimized_launch)).unwrap_or(true);

        RunLauncher::with_runner(java, main_class, &self.runner)
            .classpath(classpath.into_iter().collect())
            .args(args)
            .launch(&jvm_args, optimized)?;
        Ok(())
    }

    pub fn fingerprint(&self) -> Result<LedgerFingerprint> {
        Ok(self.plan.ledger().fingerprint()?)
    }
}
