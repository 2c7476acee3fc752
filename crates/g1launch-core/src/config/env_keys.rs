//! Environment variable keys and their aliases.
//!
//! Primary keys are `G1LAUNCH_*`; aliases cover names the assistant's shell
//! scripts used before the launcher existed.

/// Project layout relative to the base directory
pub mod layout {
    pub const G1LAUNCH_BASE_DIR: &str = "G1LAUNCH_BASE_DIR";

    pub const G1LAUNCH_ENV_DIR: &str = "G1LAUNCH_ENV_DIR";
    pub const ENV_DIR_ALIASES: &[&str] = &["VENV_DIR"];

    pub const G1LAUNCH_MANIFEST: &str = "G1LAUNCH_MANIFEST";
    pub const MANIFEST_ALIASES: &[&str] = &["REQUIREMENTS_FILE"];
}

/// Application entry point and launch behaviour
pub mod launch {
    pub const G1LAUNCH_MODULE: &str = "G1LAUNCH_MODULE";

    /// Disable the pause-for-keystroke on failure. `CI=1` implies it.
    pub const G1LAUNCH_NO_PAUSE: &str = "G1LAUNCH_NO_PAUSE";
    pub const NO_PAUSE_ALIASES: &[&str] = &["CI"];

    pub const G1LAUNCH_MAX_RESTARTS: &str = "G1LAUNCH_MAX_RESTARTS";
    pub const G1LAUNCH_SKIP_UNCHANGED: &str = "G1LAUNCH_SKIP_UNCHANGED";

    /// Comma separated, e.g. "OPENAI_API_KEY,ELEVENLABS_API_KEY".
    pub const G1LAUNCH_REQUIRED_ENV: &str = "G1LAUNCH_REQUIRED_ENV";
}

/// Observability and logging
pub mod observability {
    pub const G1LAUNCH_QUIET: &str = "G1LAUNCH_QUIET";

    pub const G1LAUNCH_LOG_LEVEL: &str = "G1LAUNCH_LOG_LEVEL";

    pub const G1LAUNCH_LOG_JSON: &str = "G1LAUNCH_LOG_JSON";

    pub const G1LAUNCH_AUDIT_LOG: &str = "G1LAUNCH_AUDIT_LOG";
}
