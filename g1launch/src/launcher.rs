//! The bootstrap sequence.
//!
//! resolve → activate → install → run (blocking) → pause on failure. The
//! only fatal condition is a missing activation artifact; install and
//! application failures only shape the exit code.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use g1launch_core::config::{load_dotenv_from_dir, DotenvVars, LaunchConfig, LayoutConfig};
use g1launch_core::observability::{self, AuditEvent};
use g1launch_env::{
    activate_environment, install_dependencies, EnvironmentHandle, ExitCode, InstallOutcome,
    LaunchCommand, ProcessRunner,
};

use crate::error::LaunchError;
use crate::pause::Pause;

pub const PAUSE_PROMPT: &str = "Press any key to exit...";

/// Directory containing the launcher executable, independent of the caller's cwd.
pub fn resolve_base_directory() -> PathBuf {
    resolve_base_directory_with(None)
}

/// Like [`resolve_base_directory`], with an explicit override taking precedence.
pub fn resolve_base_directory_with(override_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = override_dir {
        return absolutize(dir);
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.canonicalize().ok())
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| {
            tracing::warn!("Cannot resolve executable path, using current directory");
            absolutize(Path::new("."))
        })
}

fn absolutize(dir: &Path) -> PathBuf {
    dir.canonicalize().unwrap_or_else(|_| {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(dir))
                .unwrap_or_else(|_| dir.to_path_buf())
        }
    })
}

/// Copy `.env` values into `cmd` unless `is_set` says the launcher already has them.
pub fn apply_dotenv<F>(cmd: &mut LaunchCommand, vars: &DotenvVars, is_set: F)
where
    F: Fn(&str) -> bool,
{
    for (key, value) in vars {
        if !is_set(key) {
            cmd.set_env(key, value);
        }
    }
}

/// Required keys present neither in the environment nor in `.env`.
pub fn missing_required<F>(required: &[String], dotenv: &DotenvVars, is_set: F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    required
        .iter()
        .filter(|key| !is_set(key) && !dotenv.iter().any(|(k, v)| k == *key && !v.is_empty()))
        .cloned()
        .collect()
}

/// Set to a non-empty value in the launcher's environment.
pub(crate) fn env_is_set(key: &str) -> bool {
    std::env::var_os(key).is_some_and(|v| !v.is_empty())
}

/// Present in the launcher's environment, even if empty.
pub(crate) fn env_is_present(key: &str) -> bool {
    std::env::var_os(key).is_some()
}

/// Result of a completed launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    pub install: InstallOutcome,
    pub exit_code: ExitCode,
    /// Number of times the application was started
    pub attempts: u32,
}

/// Owns the bootstrap state for one launch.
pub struct Launcher<R, P> {
    base: PathBuf,
    layout: LayoutConfig,
    launch: LaunchConfig,
    runner: R,
    pause: P,
}

impl<R: ProcessRunner, P: Pause> Launcher<R, P> {
    pub fn new(
        base: PathBuf,
        layout: LayoutConfig,
        launch: LaunchConfig,
        runner: R,
        pause: P,
    ) -> Self {
        Self {
            base,
            layout,
            launch,
            runner,
            pause,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn pause_handle(&self) -> &P {
        &self.pause
    }

    /// Run the whole sequence. `Err` only for the fatal precondition.
    pub fn run(&mut self) -> Result<LaunchReport, LaunchError> {
        let env = self.activate_environment()?;
        let install = self.install_dependencies(&env);

        let dotenv = load_dotenv_from_dir(&self.base).unwrap_or_default();
        for key in missing_required(&self.launch.required_env, &dotenv, env_is_set) {
            tracing::warn!("{} is not set (environment or .env); the assistant may fail", key);
        }

        let cmd = self.application_command(&env, &dotenv);
        let (exit_code, attempts) = if self.launch.exec && cfg!(unix) {
            (self.exec_application(&cmd), 1)
        } else {
            self.run_application(&cmd)
        };

        self.on_failure(exit_code);
        Ok(LaunchReport {
            install,
            exit_code,
            attempts,
        })
    }

    pub fn activate_environment(&self) -> Result<EnvironmentHandle, LaunchError> {
        println!("Activating environment...");
        activate_environment(&self.base, &self.layout.env_dir).map_err(|e| {
            tracing::error!("{}", e);
            LaunchError::Configuration(e)
        })
    }

    /// Install the manifest if present. Failures are logged and deferred.
    pub fn install_dependencies(&mut self, env: &EnvironmentHandle) -> InstallOutcome {
        if self.base.join(&self.layout.manifest).is_file() {
            println!("Installing dependencies...");
        }
        install_dependencies(
            &self.base,
            &self.layout.manifest,
            env,
            &mut self.runner,
            self.launch.skip_unchanged,
        )
    }

    /// The entry-point command: environment interpreter, `.env`, activation vars.
    pub fn application_command(&self, env: &EnvironmentHandle, dotenv: &DotenvVars) -> LaunchCommand {
        let mut cmd = LaunchCommand::new(env.interpreter())
            .args(self.launch.interpreter_args())
            .current_dir(&self.base);
        apply_dotenv(&mut cmd, dotenv, env_is_present);
        env.apply(&mut cmd);
        cmd
    }

    /// Run `cmd` in the foreground, restarting after failures up to `max_restarts`.
    /// Returns the last exit code and the number of starts.
    pub fn run_application(&mut self, cmd: &LaunchCommand) -> (ExitCode, u32) {
        let mut attempt = 0;
        loop {
            let exit_code = self.run_once(cmd, attempt);
            if exit_code.success() || attempt >= self.launch.max_restarts {
                return (exit_code, attempt + 1);
            }
            attempt += 1;
            tracing::warn!(
                "Application exited with code {}, restarting ({}/{})",
                exit_code,
                attempt,
                self.launch.max_restarts
            );
        }
    }

    fn run_once(&mut self, cmd: &LaunchCommand, attempt: u32) -> ExitCode {
        tracing::info!(command = %cmd.display(), attempt, "Starting application");
        observability::audit(AuditEvent::ApplicationStarted {
            program: cmd.program.display().to_string(),
            args: cmd.args.clone(),
            attempt,
        });
        let start = Instant::now();
        let exit_code = match self.runner.run(cmd) {
            Ok(code) => code,
            Err(e) => {
                tracing::error!("Failed to start {}: {}", cmd.program.display(), e);
                ExitCode::SPAWN_FAILED
            }
        };
        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(exit_code = exit_code.0, duration_ms, "Application exited");
        observability::audit(AuditEvent::ApplicationExited {
            exit_code: exit_code.0,
            duration_ms,
            attempt,
        });
        exit_code
    }

    /// Replace this process with the application. Only returns if exec failed.
    fn exec_application(&mut self, cmd: &LaunchCommand) -> ExitCode {
        tracing::info!(command = %cmd.display(), "Exec application");
        let _ = std::io::stdout().flush();
        let err = self.runner.exec(cmd);
        tracing::error!("Failed to exec {}: {}", cmd.program.display(), err);
        ExitCode::SPAWN_FAILED
    }

    /// On a non-zero exit print the failure and wait for one keystroke.
    pub fn on_failure(&mut self, exit_code: ExitCode) {
        if exit_code.success() {
            return;
        }
        println!("Application exited with code {}.", exit_code);
        if let Err(e) = self.pause.pause(PAUSE_PROMPT) {
            tracing::debug!("Pause failed: {}", e);
        }
    }
}
