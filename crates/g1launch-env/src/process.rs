//! Child process description and the runner seam.
//!
//! Every process the launcher starts (pip, venv, the application) is first
//! described as a [`LaunchCommand`]. A [`ProcessRunner`] turns it into a real
//! process; tests substitute a recording runner.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

/// Exit code of a finished child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    /// Fatal precondition failure inside the launcher itself
    pub const FATAL: ExitCode = ExitCode(1);
    /// The program could not be started (same convention as POSIX shells)
    pub const SPAWN_FAILED: ExitCode = ExitCode(127);

    pub fn success(self) -> bool {
        self.0 == 0
    }

    /// Signal-terminated children map to `128 + signal` on Unix.
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitCode(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(sig) = status.signal() {
                return ExitCode(128 + sig);
            }
        }
        ExitCode::FATAL
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Plain-data description of a child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Variables set in the child, applied in order
    pub env_set: Vec<(OsString, OsString)>,
    /// Variables removed from the child before `env_set` is applied
    pub env_remove: Vec<OsString>,
}

impl LaunchCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Set a variable, replacing any earlier value for the same key
    pub fn set_env(&mut self, key: impl Into<OsString>, value: impl Into<OsString>) {
        let key = key.into();
        self.env_set.retain(|(k, _)| *k != key);
        self.env_remove.retain(|k| *k != key);
        self.env_set.push((key, value.into()));
    }

    pub fn remove_env(&mut self, key: impl Into<OsString>) {
        let key = key.into();
        self.env_set.retain(|(k, _)| *k != key);
        if !self.env_remove.contains(&key) {
            self.env_remove.push(key);
        }
    }

    /// Value this command sets for `key`, if any
    pub fn env_value(&self, key: &str) -> Option<&OsStr> {
        self.env_set
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    /// Human readable `program arg arg` for logs
    pub fn display(&self) -> String {
        let mut s = self.program.display().to_string();
        for a in &self.args {
            s.push(' ');
            s.push_str(a);
        }
        s
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref dir) = self.cwd {
            cmd.current_dir(dir);
        }
        for key in &self.env_remove {
            cmd.env_remove(key);
        }
        for (k, v) in &self.env_set {
            cmd.env(k, v);
        }
        cmd
    }
}

/// Runs launch commands in the foreground.
pub trait ProcessRunner {
    /// Run `cmd` to completion with inherited stdio.
    /// `Err` means the program could not be started at all.
    fn run(&mut self, cmd: &LaunchCommand) -> io::Result<ExitCode>;

    /// Replace the current process with `cmd`. Returns only on failure.
    fn exec(&mut self, cmd: &LaunchCommand) -> io::Error {
        let _ = cmd;
        io::Error::new(
            io::ErrorKind::Unsupported,
            "exec is not supported by this runner",
        )
    }
}

/// Runner backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&mut self, cmd: &LaunchCommand) -> io::Result<ExitCode> {
        tracing::debug!(command = %cmd.display(), "Spawning");
        let status = cmd.to_command().status()?;
        Ok(ExitCode::from_status(status))
    }

    #[cfg(unix)]
    fn exec(&mut self, cmd: &LaunchCommand) -> io::Error {
        use std::os::unix::process::CommandExt;
        tracing::debug!(command = %cmd.display(), "Exec");
        cmd.to_command().exec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_env_replaces_and_unremoves() {
        let mut cmd = LaunchCommand::new("python");
        cmd.remove_env("PYTHONHOME");
        cmd.set_env("PATH", "/a");
        cmd.set_env("PATH", "/b");
        cmd.set_env("PYTHONHOME", "/x");
        assert_eq!(cmd.env_value("PATH"), Some(OsStr::new("/b")));
        assert_eq!(cmd.env_set.len(), 2);
        assert!(cmd.env_remove.is_empty());
    }

    #[test]
    fn test_remove_env_drops_set_value() {
        let mut cmd = LaunchCommand::new("python");
        cmd.set_env("PYTHONHOME", "/x");
        cmd.remove_env("PYTHONHOME");
        cmd.remove_env("PYTHONHOME");
        assert_eq!(cmd.env_value("PYTHONHOME"), None);
        assert_eq!(cmd.env_remove, vec![OsString::from("PYTHONHOME")]);
    }

    #[test]
    fn test_display() {
        let cmd = LaunchCommand::new("/opt/app/venv/bin/python").args(["-m", "webui.app"]);
        assert_eq!(cmd.display(), "/opt/app/venv/bin/python -m webui.app");
    }

    #[test]
    fn test_spawn_failure_is_error() {
        let cmd = LaunchCommand::new("/definitely/not/a/real/program-g1launch");
        assert!(SystemRunner.run(&cmd).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_propagates_exit_code() {
        let cmd = LaunchCommand::new("sh").args(["-c", "exit 3"]);
        assert_eq!(SystemRunner.run(&cmd).unwrap(), ExitCode(3));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_applies_env() {
        let mut cmd = LaunchCommand::new("sh").args(["-c", "test \"$G1LAUNCH_PROBE\" = yes"]);
        cmd.set_env("G1LAUNCH_PROBE", "yes");
        assert!(SystemRunner.run(&cmd).unwrap().success());
    }
}
