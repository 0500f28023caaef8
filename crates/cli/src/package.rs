use jarsmith_core::pipeline::Pipeline;
use std::path::Path;
use tracing::info;

pub fn run(plan: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(crate::load_plan(plan)?);
    let archive = pipeline.package(output)?;

    info!("Packaged {}", archive.path.display());
    info!(
        "Entries: {} ({} duplicate names, {} classpath files skipped)",
        archive.entry_count,
        archive.duplicate_count,
        archive.skipped.len()
    );
    println!("{}", archive.path.display());
    Ok(())
}
