//! JVM-side plumbing: locating a Java toolchain and describing `java` launches.

pub mod command;
pub mod toolchain;

pub use command::JavaCommand;
pub use toolchain::{JavaToolchain, ToolchainError};
