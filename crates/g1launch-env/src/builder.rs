//! Create a project virtualenv (`g1launch init`).
//!
//! `run` never calls into this module: a missing environment is fatal there.

use std::path::{Path, PathBuf};

use crate::error::EnvError;
use crate::handle::EnvironmentHandle;
use crate::process::{LaunchCommand, ProcessRunner};

/// First of `python3`, `python` found on `PATH`.
pub fn which_python() -> Result<PathBuf, EnvError> {
    ["python3", "python"]
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or(EnvError::InterpreterNotFound)
}

/// `<python> -m venv <env_root>`
pub fn venv_command(python: &Path, env_root: &Path) -> LaunchCommand {
    LaunchCommand::new(python)
        .args(["-m", "venv"])
        .arg(env_root.display().to_string())
}

/// Ensure `env_root` holds a virtualenv, creating one with `python` if needed.
///
/// An existing environment is returned untouched.
pub fn ensure_virtualenv<R: ProcessRunner + ?Sized>(
    env_root: &Path,
    python: Option<&Path>,
    runner: &mut R,
) -> Result<EnvironmentHandle, EnvError> {
    if let Ok(handle) = EnvironmentHandle::locate(env_root) {
        tracing::info!(env = %env_root.display(), "Environment already exists");
        return Ok(handle);
    }

    let python = match python {
        Some(p) => p.to_path_buf(),
        None => which_python()?,
    };
    if let Some(parent) = env_root.parent() {
        std::fs::create_dir_all(parent).map_err(|source| EnvError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let cmd = venv_command(&python, env_root);
    tracing::info!(command = %cmd.display(), "Creating virtualenv");
    let exit_code = runner.run(&cmd).map_err(|source| EnvError::Spawn {
        program: python.display().to_string(),
        source,
    })?;
    if !exit_code.success() {
        return Err(EnvError::VenvFailed(exit_code.0));
    }
    EnvironmentHandle::locate(env_root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ExitCode;
    use std::fs;
    use std::io;

    /// Pretends to be `python -m venv` by writing the activation script.
    struct FakeVenv {
        calls: usize,
        exit_code: ExitCode,
    }

    impl ProcessRunner for FakeVenv {
        fn run(&mut self, cmd: &LaunchCommand) -> io::Result<ExitCode> {
            self.calls += 1;
            if self.exit_code.success() {
                let bin = PathBuf::from(&cmd.args[2]).join("bin");
                fs::create_dir_all(&bin)?;
                fs::write(bin.join("activate"), "")?;
            }
            Ok(self.exit_code)
        }
    }

    #[test]
    fn test_venv_command() {
        let cmd = venv_command(Path::new("python3"), Path::new("/opt/app/venv"));
        assert_eq!(cmd.display(), "python3 -m venv /opt/app/venv");
    }

    #[test]
    fn test_creates_missing_env() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("venv");
        let mut runner = FakeVenv {
            calls: 0,
            exit_code: ExitCode::SUCCESS,
        };
        let handle = ensure_virtualenv(&root, Some(Path::new("python3")), &mut runner).unwrap();
        assert_eq!(handle.root(), root);
        assert_eq!(runner.calls, 1);
    }

    #[test]
    fn test_existing_env_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("venv");
        fs::create_dir_all(root.join("bin")).unwrap();
        fs::write(root.join("bin").join("activate"), "").unwrap();
        let mut runner = FakeVenv {
            calls: 0,
            exit_code: ExitCode::SUCCESS,
        };
        ensure_virtualenv(&root, Some(Path::new("python3")), &mut runner).unwrap();
        assert_eq!(runner.calls, 0);
    }

    #[test]
    fn test_venv_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let mut runner = FakeVenv {
            calls: 0,
            exit_code: ExitCode(2),
        };
        let err = ensure_virtualenv(&tmp.path().join("venv"), Some(Path::new("python3")), &mut runner)
            .unwrap_err();
        assert!(matches!(err, EnvError::VenvFailed(2)));
    }
}
