mod aot;
mod build;
mod fingerprint;
mod inspect;
mod package;
mod run;

use clap::{Parser, Subcommand};
use jarsmith_core::plan::BuildPlan;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "jarsmith",
    version,
    about = "Executable jar packaging, AOT processing and launching for JVM applications",
    long_about = "Jarsmith reads a JSON build plan describing a compiled application (main output, \
                  runtime classpath, resolved artifacts) and turns it into a self-contained jar. \
                  It can run the ahead-of-time processor first and launch the application directly."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Assemble the executable jar from the main output and runtime classpath
    Package {
        /// Build plan (JSON)
        #[arg(long, value_name = "PLAN")]
        plan: PathBuf,
        /// Write the jar here instead of <build_dir>/libs/<name>-<version>.jar
        #[arg(short, long, value_name = "JAR")]
        output: Option<PathBuf>,
    },
    /// Run the AOT processor and print the generated source-set roots
    Aot {
        #[arg(long, value_name = "PLAN")]
        plan: PathBuf,
    },
    /// Run the AOT processor, then package with the generated output
    Build {
        #[arg(long, value_name = "PLAN")]
        plan: PathBuf,
        #[arg(short, long, value_name = "JAR")]
        output: Option<PathBuf>,
    },
    /// Launch the application from its runtime classpath
    Run {
        #[arg(long, value_name = "PLAN")]
        plan: PathBuf,
        /// Do not append -XX:TieredStopAtLevel=1
        #[arg(long)]
        no_optimize: bool,
        /// Extra JVM arguments, split with shell quoting rules
        #[arg(long, value_name = "ARGS", allow_hyphen_values = true)]
        jvm_args: Option<String>,
        /// Program arguments, replacing those in the plan
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// List the entries and manifest of a jar
    Inspect {
        #[arg(value_name = "JAR")]
        jar: PathBuf,
    },
    /// Print the content fingerprint of the plan's resolved artifacts
    Fingerprint {
        #[arg(long, value_name = "PLAN")]
        plan: PathBuf,
    },
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _guard = jarsmith_core::logging::init_logging("cli", true);

    match cli.command {
        Commands::Package { plan, output } => package::run(&plan, output.as_deref()),
        Commands::Aot { plan } => aot::run(&plan),
        Commands::Build { plan, output } => build::run(&plan, output.as_deref()),
        Commands::Run {
            plan,
            no_optimize,
            jvm_args,
            args,
        } => run::run(&plan, no_optimize, jvm_args.as_deref(), args),
        Commands::Inspect { jar } => inspect::run(&jar),
        Commands::Fingerprint { plan } => fingerprint::run(&plan),
    }
}

pub(crate) fn load_plan(path: &Path) -> Result<BuildPlan, Box<dyn std::error::Error>> {
    tracing::debug!("Loading build plan {}", path.display());
    Ok(BuildPlan::load(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_splits_trailing_args() {
        let cli = Cli::try_parse_from([
            "jarsmith",
            "run",
            "--plan",
            "plan.json",
            "--no-optimize",
            "--jvm-args",
            "-Xmx1g -Dname='a b'",
            "--",
            "--port=8080",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                plan,
                no_optimize,
                jvm_args,
                args,
            } => {
                assert_eq!(plan, PathBuf::from("plan.json"));
                assert!(no_optimize);
                assert_eq!(jvm_args.as_deref(), Some("-Xmx1g -Dname='a b'"));
                assert_eq!(args, vec!["--port=8080"]);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_package_requires_plan() {
        assert!(Cli::try_parse_from(["jarsmith", "package"]).is_err());
    }
}
