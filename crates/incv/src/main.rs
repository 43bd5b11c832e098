//! incv CLI
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use incv::console::Console;
use incv::{Cli, bump};
use incv_core::config::ConfigLoader;
use tracing::debug;

mod observability;

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.apply();
    let console = Console::new(cli.quiet);

    match run(&cli, &console) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            console.fatal(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, console: &Console) -> anyhow::Result<()> {
    if let Some(ref dir) = cli.chdir {
        std::env::set_current_dir(dir)
            .with_context(|| format!("failed to change directory to {}", dir.display()))?;
    }

    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| {
        anyhow::anyhow!(
            "current directory is not valid UTF-8: {}",
            e.into_path_buf().display()
        )
    })?;
    let mut loader = ConfigLoader::new().with_project_search(&cwd);
    if let Some(ref config_path) = cli.config {
        let config_path = Utf8PathBuf::try_from(config_path.clone()).map_err(|e| {
            anyhow::anyhow!(
                "config path is not valid UTF-8: {}",
                e.into_path_buf().display()
            )
        })?;
        loader = loader.with_file(&config_path);
    }
    let config = loader.load().context("failed to load configuration")?;

    let obs_config = observability::ObservabilityConfig::with_log_dir(
        config
            .log_dir
            .as_ref()
            .map(|dir| dir.as_std_path().to_path_buf()),
    );
    let env_filter = observability::env_filter(cli.quiet, cli.verbose, config.log_level.as_str());
    let guard = observability::init_observability(&obs_config, env_filter)
        .context("failed to initialize logging")?;

    debug!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        dry_run = cli.dry_run(),
        color = ?cli.color,
        chdir = ?cli.chdir,
        %cwd,
        "CLI initialized"
    );

    let result = bump::cmd_bump(cli, &config, console).map(|_| ());
    // stderr logging would repeat the `fatal:` line
    if let Err(ref err) = result {
        if guard.logs_to_file() {
            tracing::error!(error = %format!("{err:#}"), "fatal error");
        } else {
            debug!(error = %format!("{err:#}"), "fatal error");
        }
    }
    result
}
