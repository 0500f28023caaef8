pub mod aot;
pub mod artifact;
pub mod classpath;
pub mod manifest;

pub use aot::*;
pub use artifact::*;
pub use classpath::*;
pub use manifest::*;
