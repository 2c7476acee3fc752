//! Runtime environment plumbing for the launcher.
//!
//! Callers locate an [`handle::EnvironmentHandle`] once and pass it to every
//! step; nothing here mutates the launcher's own process environment.

pub mod builder;
pub mod error;
pub mod handle;
pub mod installer;
pub mod manifest;
pub mod process;

pub use error::EnvError;
pub use handle::{activate_environment, EnvironmentHandle};
pub use installer::{install_dependencies, InstallOutcome};
pub use manifest::DependencyManifest;
pub use process::{ExitCode, LaunchCommand, ProcessRunner, SystemRunner};
