//! Command-line argument parsing and help for garden-index.
//!
//! This module handles all CLI flag parsing used for config initialization and help, and turns
//! the remaining arguments into a [Command] for [crate::app::run].
//!
//! When invoked with no args (gdn), the usage is printed and the process exits with an error.

use crate::config::Config;

use std::path::PathBuf;

/// One engine action, with directories relative to the garden root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List { dir: PathBuf },
    Validate { dir: PathBuf },
    Index { dir: PathBuf },
    Unindex { dir: PathBuf },
    Repair { dir: PathBuf },
    Up { dir: PathBuf, name: String },
    Down { dir: PathBuf, name: String },
    Move { dir: PathBuf, name: String, index: u32 },
    New { dir: PathBuf, name: Option<String> },
    Mkdir { dir: PathBuf, name: String },
    Rm { dir: PathBuf, name: String },
    Migrate { dir: PathBuf },
}

/// What the arguments ask for, before any side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedArgs {
    Run { command: Command, verbose: bool },
    Help,
    Version,
    Init,
    Invalid(String),
}

pub enum CliAction {
    Run { command: Command, verbose: bool },
    Exit { success: bool },
}

/// Parses the process arguments and handles the flags that never reach the engine.
pub fn handle_args() -> CliAction {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() {
        print_help();
        return CliAction::Exit { success: false };
    }

    match parse_args(&args) {
        ParsedArgs::Run { command, verbose } => CliAction::Run { command, verbose },
        ParsedArgs::Help => {
            print_help();
            CliAction::Exit { success: true }
        }
        ParsedArgs::Version => {
            print_version();
            CliAction::Exit { success: true }
        }
        ParsedArgs::Init => {
            let config_path = Config::default_path();
            match Config::generate_default(&config_path) {
                Ok(()) => CliAction::Exit { success: true },
                Err(e) => {
                    eprintln!("Error: {}", e);
                    CliAction::Exit { success: false }
                }
            }
        }
        ParsedArgs::Invalid(msg) => {
            eprintln!("Error: {}", msg);
            eprintln!("Try --help for available options");
            CliAction::Exit { success: false }
        }
    }
}

/// Parses the arguments following the program name.
pub fn parse_args(args: &[String]) -> ParsedArgs {
    let mut verbose = false;
    let mut rest = args;

    while let Some((first, tail)) = rest.split_first() {
        match first.as_str() {
            "-v" | "--verbose" => verbose = true,
            "-h" | "--help" => return ParsedArgs::Help,
            "--version" => return ParsedArgs::Version,
            "--init" => return ParsedArgs::Init,
            arg if arg.starts_with('-') => {
                return ParsedArgs::Invalid(format!("unknown option: {}", arg));
            }
            _ => break,
        }
        rest = tail;
    }

    let Some((name, operands)) = rest.split_first() else {
        return ParsedArgs::Invalid("missing command".to_string());
    };

    match parse_command(name, operands) {
        Ok(command) => ParsedArgs::Run { command, verbose },
        Err(msg) => ParsedArgs::Invalid(msg),
    }
}

fn parse_command(name: &str, operands: &[String]) -> Result<Command, String> {
    let arg = |i: usize| operands.get(i).map(String::as_str);
    let dir = |i: usize| PathBuf::from(arg(i).unwrap_or(""));
    let required = |i: usize, what: &str| {
        arg(i)
            .map(str::to_string)
            .ok_or_else(|| format!("{} requires {}", name, what))
    };

    let max_operands = match name {
        "list" | "validate" | "index" | "unindex" | "repair" | "migrate" => 1,
        "up" | "down" | "new" | "mkdir" | "rm" => 2,
        "move" => 3,
        _ => return Err(format!("unknown command: {}", name)),
    };
    if operands.len() > max_operands {
        return Err(format!("too many arguments for {}", name));
    }

    let command = match name {
        "list" => Command::List { dir: dir(0) },
        "validate" => Command::Validate { dir: dir(0) },
        "index" => Command::Index { dir: dir(0) },
        "unindex" => Command::Unindex { dir: dir(0) },
        "repair" => Command::Repair { dir: dir(0) },
        "migrate" => Command::Migrate { dir: dir(0) },
        "up" => Command::Up {
            dir: dir(0),
            name: required(1, "DIR NAME")?,
        },
        "down" => Command::Down {
            dir: dir(0),
            name: required(1, "DIR NAME")?,
        },
        "move" => {
            let name = required(1, "DIR NAME INDEX")?;
            let raw = required(2, "DIR NAME INDEX")?;
            let index = raw
                .parse::<u32>()
                .map_err(|_| format!("invalid index: {}", raw))?;
            Command::Move {
                dir: dir(0),
                name,
                index,
            }
        }
        "new" => Command::New {
            dir: dir(0),
            name: arg(1).map(str::to_string),
        },
        "mkdir" => Command::Mkdir {
            dir: dir(0),
            name: required(1, "DIR NAME")?,
        },
        _ => Command::Rm {
            dir: dir(0),
            name: required(1, "DIR NAME")?,
        },
    };
    Ok(command)
}

fn print_version() {
    println!("gdn {}", env!("CARGO_PKG_VERSION"));
}

fn print_help() {
    println!(
        r#"gdn - Numeric ordering for a directory of markdown notes

USAGE:
  gdn [-v] <COMMAND> [ARGS]

COMMANDS:
  list [DIR]              List the entries of DIR
  validate [DIR]          Check the numbering of DIR (exit status 1 when invalid)
  index [DIR]             Number every entry of DIR, directories first
  unindex [DIR]           Strip the numbering from DIR
  repair [DIR]            Renumber an indexed DIR, closing gaps and duplicates
  up DIR NAME             Swap NAME with the entry above it
  down DIR NAME           Swap NAME with the entry below it
  move DIR NAME INDEX     Move NAME to INDEX, shifting the entries in between
  new [DIR] [NAME]        Create a note (root notes go to the inbox, NAME defaults to today)
  mkdir DIR NAME          Create a directory after the last directory of DIR
  rm DIR NAME             Delete NAME and close the gap
  migrate [DIR]           Rename legacy "3 - Name" entries to "03. Name"

DIR is relative to the notes root; use "" or omit it for the root itself.

OPTIONS:
      --init              Generate a default configuration
  -v, --verbose           Log every filesystem change
  -h, --help              Print help information
      --version           Display the current installed version of gdn

ENVIRONMENT:
  GARDEN_CONFIG           Override the default config path
  GARDEN_LOG_DIR          Override the notes root
  RUST_LOG                Override the log level
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_commands_with_defaults() {
        assert_eq!(
            parse_args(&args(&["list"])),
            ParsedArgs::Run {
                command: Command::List { dir: PathBuf::new() },
                verbose: false
            }
        );
        assert_eq!(
            parse_args(&args(&["-v", "new", "01. Inbox"])),
            ParsedArgs::Run {
                command: Command::New {
                    dir: PathBuf::from("01. Inbox"),
                    name: None
                },
                verbose: true
            }
        );
    }

    #[test]
    fn parses_move() {
        assert_eq!(
            parse_args(&args(&["move", "", "03. Todo.md", "2"])),
            ParsedArgs::Run {
                command: Command::Move {
                    dir: PathBuf::new(),
                    name: "03. Todo.md".to_string(),
                    index: 2
                },
                verbose: false
            }
        );
        assert!(matches!(
            parse_args(&args(&["move", "", "03. Todo.md", "two"])),
            ParsedArgs::Invalid(_)
        ));
    }

    #[test]
    fn flags_and_errors() {
        assert_eq!(parse_args(&args(&["--help"])), ParsedArgs::Help);
        assert_eq!(parse_args(&args(&["-v", "--version"])), ParsedArgs::Version);
        assert_eq!(parse_args(&args(&["--init"])), ParsedArgs::Init);
        assert!(matches!(parse_args(&args(&["-x"])), ParsedArgs::Invalid(_)));
        assert!(matches!(parse_args(&args(&["-v"])), ParsedArgs::Invalid(_)));
        assert!(matches!(
            parse_args(&args(&["frobnicate"])),
            ParsedArgs::Invalid(_)
        ));
        assert!(matches!(parse_args(&args(&["up", "dir"])), ParsedArgs::Invalid(_)));
        assert!(matches!(
            parse_args(&args(&["list", "a", "b"])),
            ParsedArgs::Invalid(_)
        ));
    }
}
