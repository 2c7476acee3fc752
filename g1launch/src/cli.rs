use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// g1launch - start the G1 voice assistant inside its virtualenv
#[derive(Parser, Debug)]
#[command(name = "g1launch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Defaults to `run` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Project directory (default: directory of this executable)
    #[arg(long, global = true, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Virtualenv directory relative to the base directory (default: venv)
    #[arg(long, global = true, value_name = "DIR")]
    pub env_dir: Option<String>,

    /// Dependency manifest relative to the base directory (default: requirements.txt)
    #[arg(long, global = true, value_name = "FILE")]
    pub manifest: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Activate the environment, install requirements and run the application
    Run(RunArgs),

    /// Report environment, manifest and required variables without starting anything
    Check {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create the virtualenv if missing and install requirements
    Init {
        /// Python interpreter used to create the virtualenv (default: python3 on PATH)
        #[arg(long, value_name = "PATH")]
        python: Option<PathBuf>,

        /// Skip pip when requirements are unchanged since the last install
        #[arg(long)]
        skip_unchanged: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Python module to run with `python -m` (default: webui.app)
    #[arg(long, value_name = "MODULE")]
    pub module: Option<String>,

    /// Do not wait for a keystroke when the application fails
    #[arg(long)]
    pub no_pause: bool,

    /// Restart the application this many times after a non-zero exit
    #[arg(long, value_name = "N")]
    pub max_restarts: Option<u32>,

    /// Skip pip when requirements are unchanged since the last install
    #[arg(long)]
    pub skip_unchanged: bool,

    /// Replace the launcher process with the application (Unix only; disables pause and restart)
    #[arg(long)]
    pub exec: bool,

    /// Interpreter arguments replacing `-m <module>`, e.g. `-- -m core.cortex`
    #[arg(last = true, value_name = "ARGS")]
    pub app_args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_run() {
        let cli = Cli::try_parse_from(["g1launch"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_run_with_trailing_args() {
        let cli = Cli::try_parse_from([
            "g1launch",
            "run",
            "--no-pause",
            "--max-restarts",
            "2",
            "--",
            "-m",
            "core.cortex",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Run(args)) => {
                assert!(args.no_pause);
                assert_eq!(args.max_restarts, Some(2));
                assert_eq!(args.app_args, vec!["-m", "core.cortex"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let cli = Cli::try_parse_from(["g1launch", "check", "--json", "--base-dir", "/opt/app"])
            .unwrap();
        assert_eq!(cli.global.base_dir, Some(PathBuf::from("/opt/app")));
        assert!(matches!(cli.command, Some(Commands::Check { json: true })));
    }
}
