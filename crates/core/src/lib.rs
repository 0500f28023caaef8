pub mod error;
pub mod logging;

pub mod aot;
pub mod archive;
pub mod launch;
pub mod ledger;
pub mod pipeline;
pub mod plan;
pub mod process;

pub use error::{JarsmithError, Result};
