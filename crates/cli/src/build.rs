use jarsmith_core::pipeline::Pipeline;
use std::path::Path;
use tracing::info;

pub fn run(plan: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(crate::load_plan(plan)?);
    let outcome = pipeline.build(output)?;

    info!(
        "AOT classes: {}",
        outcome.generated.classes_dir().display()
    );
    info!(
        "Packaged {} with {} entries",
        outcome.archive.path.display(),
        outcome.archive.entry_count
    );
    println!("{}", outcome.archive.path.display());
    Ok(())
}
