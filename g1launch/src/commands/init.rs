//! `g1launch init`: create the virtualenv and install requirements.

use std::path::PathBuf;

use anyhow::{Context, Result};
use g1launch_core::config::LayoutConfig;
use g1launch_env::builder::ensure_virtualenv;
use g1launch_env::{install_dependencies, ExitCode, InstallOutcome, SystemRunner};

use crate::launcher::resolve_base_directory_with;

pub fn cmd_init(layout: LayoutConfig, python: Option<PathBuf>, skip_unchanged: bool) -> Result<ExitCode> {
    let base = resolve_base_directory_with(layout.base_dir.as_deref());
    let env_root = base.join(&layout.env_dir);
    let mut runner = SystemRunner;

    eprintln!("Preparing environment at {}", env_root.display());
    let env = ensure_virtualenv(&env_root, python.as_deref(), &mut runner)
        .with_context(|| format!("Create virtualenv at {}", env_root.display()))?;

    let outcome = install_dependencies(&base, &layout.manifest, &env, &mut runner, skip_unchanged);
    let code = match outcome {
        InstallOutcome::NoManifest => {
            eprintln!("No {} found, nothing to install", layout.manifest);
            ExitCode::SUCCESS
        }
        InstallOutcome::Unchanged => {
            eprintln!("✓ Dependencies already up to date");
            ExitCode::SUCCESS
        }
        InstallOutcome::Ran { exit_code, packages } if exit_code.success() => {
            eprintln!("✓ Installed {} requirement(s)", packages);
            exit_code
        }
        InstallOutcome::Ran { exit_code, .. } => {
            eprintln!("✗ pip install exited with code {}", exit_code);
            exit_code
        }
        InstallOutcome::SpawnFailed(msg) => {
            eprintln!("✗ {}", msg);
            ExitCode::SPAWN_FAILED
        }
    };
    Ok(code)
}
