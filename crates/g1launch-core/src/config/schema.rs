//! Configuration structs grouped by concern.
//!
//! Each struct loads from environment variables with `from_env()`; the CLI
//! layers its flags on top with `with_cli_overrides`.

use super::env_keys::{launch, layout, observability as obv_keys};
use super::loader::{env_bool, env_list, env_optional, env_or};
use std::path::PathBuf;

pub const DEFAULT_ENV_DIR: &str = "venv";
pub const DEFAULT_MANIFEST: &str = "requirements.txt";
pub const DEFAULT_MODULE: &str = "webui.app";
pub const DEFAULT_REQUIRED_ENV: &[&str] = &["OPENAI_API_KEY", "ELEVENLABS_API_KEY"];

/// Where the environment and manifest live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Explicit base directory; `None` means the executable's directory
    pub base_dir: Option<PathBuf>,
    /// Virtualenv directory relative to the base directory
    pub env_dir: String,
    /// Dependency manifest relative to the base directory
    pub manifest: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            env_dir: DEFAULT_ENV_DIR.to_string(),
            manifest: DEFAULT_MANIFEST.to_string(),
        }
    }
}

impl LayoutConfig {
    pub fn from_env() -> Self {
        Self {
            base_dir: env_optional(layout::G1LAUNCH_BASE_DIR, &[]).map(PathBuf::from),
            env_dir: env_or(layout::G1LAUNCH_ENV_DIR, layout::ENV_DIR_ALIASES, || {
                DEFAULT_ENV_DIR.to_string()
            }),
            manifest: env_or(layout::G1LAUNCH_MANIFEST, layout::MANIFEST_ALIASES, || {
                DEFAULT_MANIFEST.to_string()
            }),
        }
    }

    pub fn with_cli_overrides(
        mut self,
        base_dir: Option<PathBuf>,
        env_dir: Option<String>,
        manifest: Option<String>,
    ) -> Self {
        if base_dir.is_some() {
            self.base_dir = base_dir;
        }
        if let Some(d) = env_dir {
            self.env_dir = d;
        }
        if let Some(m) = manifest {
            self.manifest = m;
        }
        self
    }
}

/// What to start and how to react to failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Python module run with `python -m`
    pub module: String,
    /// Arguments replacing `-m <module>` entirely when non-empty
    pub app_args: Vec<String>,
    pub no_pause: bool,
    /// Extra attempts after a non-zero exit before giving up
    pub max_restarts: u32,
    /// Skip pip when the manifest hash matches the last successful install
    pub skip_unchanged: bool,
    /// Replace the launcher process with the application (Unix only)
    pub exec: bool,
    /// Variables the application needs; checked against env and `.env`
    pub required_env: Vec<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            module: DEFAULT_MODULE.to_string(),
            app_args: Vec::new(),
            no_pause: false,
            max_restarts: 0,
            skip_unchanged: false,
            exec: false,
            required_env: DEFAULT_REQUIRED_ENV.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl LaunchConfig {
    pub fn from_env() -> Self {
        let max_restarts = env_optional(launch::G1LAUNCH_MAX_RESTARTS, &[])
            .and_then(|s| match s.parse::<u32>() {
                Ok(n) => Some(n),
                Err(_) => {
                    tracing::warn!("Invalid G1LAUNCH_MAX_RESTARTS: {}, using 0", s);
                    None
                }
            })
            .unwrap_or(0);
        Self {
            module: env_or(launch::G1LAUNCH_MODULE, &[], || DEFAULT_MODULE.to_string()),
            app_args: Vec::new(),
            no_pause: env_bool(launch::G1LAUNCH_NO_PAUSE, launch::NO_PAUSE_ALIASES, false),
            max_restarts,
            skip_unchanged: env_bool(launch::G1LAUNCH_SKIP_UNCHANGED, &[], false),
            exec: false,
            required_env: env_list(launch::G1LAUNCH_REQUIRED_ENV, &[], DEFAULT_REQUIRED_ENV),
        }
    }

    /// Boolean flags only switch behaviour on; unset options keep env values.
    pub fn with_cli_overrides(
        mut self,
        module: Option<String>,
        app_args: Vec<String>,
        no_pause: bool,
        max_restarts: Option<u32>,
        skip_unchanged: bool,
        exec: bool,
    ) -> Self {
        if let Some(m) = module {
            self.module = m;
        }
        if !app_args.is_empty() {
            self.app_args = app_args;
        }
        self.no_pause |= no_pause;
        if let Some(n) = max_restarts {
            self.max_restarts = n;
        }
        self.skip_unchanged |= skip_unchanged;
        self.exec |= exec;
        self
    }

    /// The interpreter arguments: `app_args` if given, else `-m <module>`
    pub fn interpreter_args(&self) -> Vec<String> {
        if self.app_args.is_empty() {
            vec!["-m".to_string(), self.module.clone()]
        } else {
            self.app_args.clone()
        }
    }
}

/// Logging configuration: quiet, log_level, log_json, audit_log
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub log_file: Option<PathBuf>,
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        Self {
            quiet: env_bool(obv_keys::G1LAUNCH_QUIET, &[], false),
            log_level: env_or(obv_keys::G1LAUNCH_LOG_LEVEL, &[], || {
                "g1launch=info".to_string()
            }),
            log_json: env_bool(obv_keys::G1LAUNCH_LOG_JSON, &[], false),
            log_file: None,
            audit_log: env_optional(obv_keys::G1LAUNCH_AUDIT_LOG, &[]),
        }
    }

    /// `--debug` raises every g1launch target to debug
    pub fn with_cli_overrides(mut self, debug: bool, log_file: Option<PathBuf>) -> Self {
        if debug {
            self.quiet = false;
            self.log_level = "g1launch=debug".to_string();
        }
        if log_file.is_some() {
            self.log_file = log_file;
        }
        self
    }
}
