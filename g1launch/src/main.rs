use anyhow::Result;
use clap::Parser;
use g1launch::cli::{Cli, Commands, RunArgs};
use g1launch::commands;
use g1launch_core::config::{LayoutConfig, ObservabilityConfig};
use g1launch_core::observability;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let obs = ObservabilityConfig::from_env()
        .with_cli_overrides(cli.global.debug, cli.global.log_file.clone());
    observability::init_tracing(&obs);

    let layout = LayoutConfig::from_env().with_cli_overrides(
        cli.global.base_dir,
        cli.global.env_dir,
        cli.global.manifest,
    );

    let exit_code = match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => commands::run::cmd_run(layout, args)?,
        Commands::Check { json } => commands::check::cmd_check(layout, json)?,
        Commands::Init {
            python,
            skip_unchanged,
        } => commands::init::cmd_init(layout, python, skip_unchanged)?,
    };

    if !exit_code.success() {
        std::process::exit(exit_code.0);
    }
    Ok(())
}
