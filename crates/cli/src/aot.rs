use jarsmith_core::pipeline::Pipeline;
use std::path::Path;

pub fn run(plan: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(crate::load_plan(plan)?);
    let (_, inputs) = pipeline.process_aot()?;
    println!("{}", serde_json::to_string_pretty(&inputs)?);
    Ok(())
}
