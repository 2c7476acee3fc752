//! `g1launch run` (also the default with no subcommand).

use anyhow::Result;
use g1launch_core::config::{LaunchConfig, LayoutConfig};
use g1launch_env::{ExitCode, SystemRunner};

use crate::cli::RunArgs;
use crate::launcher::{resolve_base_directory_with, Launcher};
use crate::pause::{NoPause, Pause, TerminalPause};

pub fn cmd_run(layout: LayoutConfig, args: RunArgs) -> Result<ExitCode> {
    let launch = LaunchConfig::from_env().with_cli_overrides(
        args.module,
        args.app_args,
        args.no_pause,
        args.max_restarts,
        args.skip_unchanged,
        args.exec,
    );
    if launch.exec && !cfg!(unix) {
        tracing::warn!("--exec is only supported on Unix, running in the foreground instead");
    }

    let base = resolve_base_directory_with(layout.base_dir.as_deref());
    tracing::debug!(base = %base.display(), "Resolved base directory");

    let pause: Box<dyn Pause> = if launch.no_pause {
        Box::new(NoPause)
    } else {
        Box::new(TerminalPause)
    };
    let mut launcher = Launcher::new(base, layout, launch, SystemRunner, pause);
    let report = launcher.run()?;
    Ok(report.exit_code)
}
