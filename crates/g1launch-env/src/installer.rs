//! Install the dependency manifest into an activated environment.

use std::path::Path;

use g1launch_core::observability::{self, AuditEvent};

use crate::error::EnvError;
use crate::handle::EnvironmentHandle;
use crate::manifest::DependencyManifest;
use crate::process::{ExitCode, LaunchCommand, ProcessRunner};

/// What `install_dependencies` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// No manifest at the configured location
    NoManifest,
    /// Manifest unchanged since the last successful install
    Unchanged,
    /// pip ran; `exit_code` is its result
    Ran { exit_code: ExitCode, packages: usize },
    /// pip could not be started
    SpawnFailed(String),
}

impl InstallOutcome {
    /// Deferred failures: the sequence continues, but callers may want to say so
    pub fn is_failure(&self) -> bool {
        match self {
            Self::Ran { exit_code, .. } => !exit_code.success(),
            Self::SpawnFailed(_) => true,
            Self::NoManifest | Self::Unchanged => false,
        }
    }
}

/// `python -m pip install -r <manifest>` using the environment's interpreter.
pub fn pip_install_command(env: &EnvironmentHandle, manifest: &Path, base: &Path) -> LaunchCommand {
    let mut cmd = LaunchCommand::new(env.interpreter())
        .args(["-m", "pip", "install", "-r"])
        .arg(manifest.display().to_string())
        .current_dir(base);
    env.apply(&mut cmd);
    cmd
}

/// Install `<base>/<manifest_name>` into `env` if the manifest exists.
///
/// Every failure is reported through [`InstallOutcome`] so the launch can
/// continue. A manifest the launcher cannot read is still handed to pip,
/// without package count or install stamp.
pub fn install_dependencies<R: ProcessRunner + ?Sized>(
    base: &Path,
    manifest_name: &str,
    env: &EnvironmentHandle,
    runner: &mut R,
    skip_unchanged: bool,
) -> InstallOutcome {
    let path = base.join(manifest_name);
    let manifest = match DependencyManifest::locate(base, manifest_name) {
        Ok(Some(m)) => Some(m),
        Ok(None) => {
            tracing::info!(manifest = %path.display(), "No dependency manifest, skipping install");
            return InstallOutcome::NoManifest;
        }
        Err(e) => {
            tracing::warn!("{}, passing it to pip unchecked", e);
            None
        }
    };
    let packages = manifest.as_ref().map_or(0, |m| m.packages().len());

    if let Some(m) = manifest.as_ref().filter(|m| skip_unchanged && m.is_installed_in(env)) {
        tracing::info!(manifest = %m.path().display(), "Dependencies unchanged, skipping install");
        observability::audit(AuditEvent::DependenciesInstalled {
            manifest: m.path().display().to_string(),
            packages,
            exit_code: 0,
            skipped: true,
        });
        return InstallOutcome::Unchanged;
    }

    let cmd = pip_install_command(env, &path, base);
    tracing::debug!(command = %cmd.display(), packages, "Installing dependencies");
    let outcome = match runner.run(&cmd) {
        Ok(exit_code) => {
            if exit_code.success() {
                if let Some(m) = manifest.as_ref().filter(|_| skip_unchanged) {
                    if let Err(e) = m.mark_installed_in(env) {
                        tracing::warn!("Cannot write install stamp: {}", e);
                    }
                }
            } else {
                tracing::warn!(exit_code = exit_code.0, "pip install failed, continuing");
            }
            InstallOutcome::Ran { exit_code, packages }
        }
        Err(e) => {
            let err = EnvError::Spawn {
                program: cmd.program.display().to_string(),
                source: e,
            };
            tracing::warn!("{}, continuing", err);
            InstallOutcome::SpawnFailed(err.to_string())
        }
    };

    observability::audit(AuditEvent::DependenciesInstalled {
        manifest: path.display().to_string(),
        packages,
        exit_code: match &outcome {
            InstallOutcome::Ran { exit_code, .. } => exit_code.0,
            _ => ExitCode::SPAWN_FAILED.0,
        },
        skipped: false,
    });
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io;
    use std::path::PathBuf;

    struct Recorder {
        calls: Vec<LaunchCommand>,
        result: fn() -> io::Result<ExitCode>,
    }

    impl ProcessRunner for Recorder {
        fn run(&mut self, cmd: &LaunchCommand) -> io::Result<ExitCode> {
            self.calls.push(cmd.clone());
            (self.result)()
        }
    }

    fn recorder(result: fn() -> io::Result<ExitCode>) -> Recorder {
        Recorder {
            calls: Vec::new(),
            result,
        }
    }

    fn fake_project(with_manifest: bool) -> (tempfile::TempDir, EnvironmentHandle) {
        let tmp = tempfile::tempdir().unwrap();
        let bin = tmp.path().join("venv").join("bin");
        fs::create_dir_all(&bin).unwrap();
        fs::write(bin.join("activate"), "").unwrap();
        if with_manifest {
            fs::write(tmp.path().join("requirements.txt"), "flask\nopenai\n").unwrap();
        }
        let env = EnvironmentHandle::locate(&tmp.path().join("venv")).unwrap();
        (tmp, env)
    }

    #[test]
    fn test_no_manifest_is_noop() {
        let (tmp, env) = fake_project(false);
        let mut runner = recorder(|| Ok(ExitCode::SUCCESS));
        let outcome =
            install_dependencies(tmp.path(), "requirements.txt", &env, &mut runner, false);
        assert_eq!(outcome, InstallOutcome::NoManifest);
        assert!(runner.calls.is_empty());
    }

    #[test]
    fn test_runs_pip_with_env_interpreter() {
        let (tmp, env) = fake_project(true);
        let mut runner = recorder(|| Ok(ExitCode::SUCCESS));
        let outcome =
            install_dependencies(tmp.path(), "requirements.txt", &env, &mut runner, false);
        assert_eq!(
            outcome,
            InstallOutcome::Ran {
                exit_code: ExitCode::SUCCESS,
                packages: 2
            }
        );
        assert_eq!(runner.calls.len(), 1);
        let cmd = &runner.calls[0];
        assert_eq!(cmd.program, env.interpreter());
        assert_eq!(&cmd.args[..4], &["-m", "pip", "install", "-r"]);
        assert_eq!(
            PathBuf::from(&cmd.args[4]),
            tmp.path().join("requirements.txt")
        );
        assert_eq!(cmd.cwd.as_deref(), Some(tmp.path()));
        assert_eq!(cmd.env_value("VIRTUAL_ENV"), Some(env.root().as_os_str()));
    }

    #[test]
    fn test_pip_failure_is_deferred() {
        let (tmp, env) = fake_project(true);
        let mut runner = recorder(|| Ok(ExitCode(1)));
        let outcome =
            install_dependencies(tmp.path(), "requirements.txt", &env, &mut runner, true);
        assert!(outcome.is_failure());
        // a failed install leaves no stamp
        let manifest = DependencyManifest::locate(tmp.path(), "requirements.txt").unwrap().unwrap();
        assert!(!manifest.is_installed_in(&env));
    }

    #[test]
    fn test_spawn_failure_is_deferred() {
        let (tmp, env) = fake_project(true);
        let mut runner = recorder(|| Err(io::Error::new(io::ErrorKind::NotFound, "no python")));
        let outcome =
            install_dependencies(tmp.path(), "requirements.txt", &env, &mut runner, false);
        assert!(matches!(outcome, InstallOutcome::SpawnFailed(_)));
    }

    #[test]
    fn test_skip_unchanged_second_run() {
        let (tmp, env) = fake_project(true);
        let mut runner = recorder(|| Ok(ExitCode::SUCCESS));
        install_dependencies(tmp.path(), "requirements.txt", &env, &mut runner, true);
        let second =
            install_dependencies(tmp.path(), "requirements.txt", &env, &mut runner, true);
        assert_eq!(second, InstallOutcome::Unchanged);
        assert_eq!(runner.calls.len(), 1);
    }

    #[test]
    fn test_without_skip_unchanged_always_installs() {
        let (tmp, env) = fake_project(true);
        let mut runner = recorder(|| Ok(ExitCode::SUCCESS));
        install_dependencies(tmp.path(), "requirements.txt", &env, &mut runner, false);
        install_dependencies(tmp.path(), "requirements.txt", &env, &mut runner, false);
        assert_eq!(runner.calls.len(), 2);
    }

    #[test]
    fn test_utf16_manifest_still_runs_pip() {
        let (tmp, env) = fake_project(false);
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "flask\r\nopenai\r\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        fs::write(tmp.path().join("requirements.txt"), bytes).unwrap();
        let mut runner = recorder(|| Ok(ExitCode::SUCCESS));
        let outcome = install_dependencies(tmp.path(), "requirements.txt", &env, &mut runner, true);
        assert_eq!(
            outcome,
            InstallOutcome::Ran {
                exit_code: ExitCode::SUCCESS,
                packages: 2
            }
        );
        assert_eq!(runner.calls.len(), 1);
        assert_eq!(&runner.calls[0].args[..4], &["-m", "pip", "install", "-r"]);
    }
}
