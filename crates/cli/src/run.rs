use jarsmith_core::pipeline::{Pipeline, RunOptions};
use std::path::Path;

pub fn run(
    plan: &Path,
    no_optimize: bool,
    jvm_args: Option<&str>,
    args: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Use shlex to split arguments while respecting quotes
    let jvm_args = match jvm_args {
        Some(line) => shlex::split(line).ok_or("Invalid quoting in --jvm-args")?,
        None => Vec::new(),
    };
    let options = RunOptions {
        optimized: no_optimize.then_some(false),
        jvm_args,
        args,
    };

    Pipeline::new(crate::load_plan(plan)?).run(&options)?;
    Ok(())
}
