//! Locate an activated virtualenv and derive the child environment from it.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use g1launch_core::observability::{self, AuditEvent};

use crate::error::EnvError;
use crate::process::LaunchCommand;

/// Script directory names, Unix layout first.
const SCRIPT_DIRS: &[(&str, &str)] = &[("bin", "python"), ("Scripts", "python.exe")];

/// An activated runtime environment.
///
/// Activation is explicit: the handle carries what `source activate` would
/// have exported, and [`EnvironmentHandle::apply`] writes it into a child
/// command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentHandle {
    root: PathBuf,
    scripts_dir: PathBuf,
    activation_script: PathBuf,
    interpreter: PathBuf,
}

impl EnvironmentHandle {
    /// Find the activation artifact under `root`.
    pub fn locate(root: &Path) -> Result<Self, EnvError> {
        for (dir, python) in SCRIPT_DIRS {
            let scripts_dir = root.join(dir);
            let activation_script = scripts_dir.join("activate");
            if activation_script.is_file() {
                return Ok(Self {
                    root: root.to_path_buf(),
                    interpreter: scripts_dir.join(python),
                    scripts_dir,
                    activation_script,
                });
            }
        }
        Err(EnvError::EnvironmentNotFound(expected_artifact(root)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }

    pub fn activation_script(&self) -> &Path {
        &self.activation_script
    }

    /// The environment's Python interpreter. Not checked for existence;
    /// a missing interpreter shows up as a spawn failure.
    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    /// `PATH` for the child: scripts dir first, then `inherited`.
    pub fn child_path(&self, inherited: Option<&OsStr>) -> OsString {
        let mut entries = vec![self.scripts_dir.clone()];
        if let Some(p) = inherited {
            entries.extend(std::env::split_paths(p).filter(|e| *e != self.scripts_dir));
        }
        match std::env::join_paths(&entries) {
            Ok(joined) => joined,
            Err(e) => {
                tracing::warn!("Cannot prepend {} to PATH: {}", self.scripts_dir.display(), e);
                inherited
                    .map(OsStr::to_os_string)
                    .unwrap_or_else(|| self.scripts_dir.clone().into_os_string())
            }
        }
    }

    /// Apply activation to `cmd`: `VIRTUAL_ENV`, `PATH`, and no `PYTHONHOME`.
    pub fn apply(&self, cmd: &mut LaunchCommand) {
        let inherited = std::env::var_os("PATH");
        self.apply_with_path(cmd, inherited.as_deref());
    }

    /// Same as [`apply`](Self::apply) with an explicit inherited `PATH`.
    pub fn apply_with_path(&self, cmd: &mut LaunchCommand, inherited: Option<&OsStr>) {
        cmd.set_env("VIRTUAL_ENV", self.root.as_os_str());
        cmd.set_env("PATH", self.child_path(inherited));
        cmd.remove_env("PYTHONHOME");
    }
}

fn expected_artifact(root: &Path) -> PathBuf {
    if cfg!(windows) {
        root.join("Scripts").join("activate")
    } else {
        root.join("bin").join("activate")
    }
}

/// Activate `<base>/<env_dir>`.
///
/// Fails with [`EnvError::EnvironmentNotFound`] when the activation artifact is
/// missing; callers must not install or start anything in that case.
pub fn activate_environment(base: &Path, env_dir: &str) -> Result<EnvironmentHandle, EnvError> {
    let handle = EnvironmentHandle::locate(&base.join(env_dir))?;
    tracing::info!(env = %handle.root().display(), "Environment activated");
    observability::audit(AuditEvent::EnvironmentActivated {
        env_dir: handle.root().display().to_string(),
    });
    Ok(handle)
}
