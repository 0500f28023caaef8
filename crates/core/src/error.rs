use thiserror::Error;

use crate::aot::AotError;
use crate::archive::ArchiveError;
use crate::launch::LaunchError;
use crate::plan::PlanError;

#[derive(Error, Debug)]
pub enum JarsmithError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid input: {0}")]
    Api(#[from] jarsmith_api::ApiError),
    #[error("Toolchain error: {0}")]
    Toolchain(#[from] jarsmith_jvm::ToolchainError),
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
    #[error("AOT processing error: {0}")]
    Aot(#[from] AotError),
    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),
    #[error("Build plan error: {0}")]
    Plan(#[from] PlanError),
}

pub type Result<T> = std::result::Result<T, JarsmithError>;
