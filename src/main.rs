//! main.rs
//! Entry point for gdn

use garden_index::app;
use garden_index::config::Config;
use garden_index::core::{Garden, OsFs};
use garden_index::utils::cli::{CliAction, handle_args};

use std::process::ExitCode;

fn main() -> ExitCode {
    let (command, verbose) = match handle_args() {
        CliAction::Run { command, verbose } => (command, verbose),
        CliAction::Exit { success: true } => return ExitCode::SUCCESS,
        CliAction::Exit { success: false } => return ExitCode::FAILURE,
    };

    let config = Config::load();

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        config.general().log_level()
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();

    let Some(root) = config.general().root_dir() else {
        eprintln!("[gdn] Error: no notes root configured. Set root_dir in garden.toml or GARDEN_LOG_DIR.");
        return ExitCode::FAILURE;
    };
    if !root.is_dir() {
        eprintln!("[gdn] Error: notes root '{}' is not a directory.", root.display());
        return ExitCode::FAILURE;
    }

    let fs = OsFs::with_trash(config.general().move_to_trash());
    let garden = Garden::new(root, fs).with_inbox(config.general().inbox_dir());

    match app::run(&garden, &command, &config) {
        Ok(outcome) => {
            for line in outcome.lines() {
                println!("{}", line);
            }
            if outcome.success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("[gdn] Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
