//! Debug Console Plus - a terminal debug console
//!
//! This is the binary entry point. All logic lives in the library.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use dcplus_app::InputSource;
use dcplus_core::prelude::*;
use dcplus_core::{CombineMode, LogLevel, QueryRequest, DEFAULT_QUERY_LIMIT, SNAPSHOT_DIR};

/// Debug Console Plus - filter and scroll debug adapter output
#[derive(Parser, Debug)]
#[command(name = "dcplus")]
#[command(about = "A terminal debug console with filtering and virtual scrolling", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Workspace directory (snapshot and config live in its .dcplus/)
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Debug adapter stream to read: a file, or `-` for stdin
    #[arg(long, value_name = "FILE|-")]
    input: Option<String>,

    /// Snapshot file to load before reading the stream, e.g. one saved with `s`.
    /// A new debug session on the stream starts the log over.
    #[arg(long, value_name = "FILE")]
    load: Option<PathBuf>,

    /// Run in headless mode (JSON output, no TUI)
    #[arg(long)]
    headless: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query the persisted log snapshot and print JSON
    Query {
        /// Directory holding logs.json (default: ./.dcplus)
        #[arg(long, value_name = "DIR")]
        logs_dir: Option<PathBuf>,

        /// Levels to include, comma separated (default: all)
        #[arg(long, value_delimiter = ',')]
        levels: Vec<LogLevel>,

        /// Case-insensitive search text
        #[arg(long)]
        search: Option<String>,

        /// Treat --search as a regex
        #[arg(long)]
        regex: bool,

        /// How the level and search tests combine
        #[arg(long, value_enum, default_value_t = Logic::And)]
        logic: Logic,

        /// Oldest first instead of newest first
        #[arg(long)]
        head: bool,

        /// Maximum records returned (0 means the default)
        #[arg(long, default_value_t = DEFAULT_QUERY_LIMIT)]
        limit: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Logic {
    And,
    Or,
}

impl From<Logic> for CombineMode {
    fn from(logic: Logic) -> Self {
        match logic {
            Logic::And => CombineMode::And,
            Logic::Or => CombineMode::Or,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let cwd = || std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    if let Some(Command::Query {
        logs_dir,
        levels,
        search,
        regex,
        logic,
        head,
        limit,
    }) = args.command
    {
        let dir = logs_dir.unwrap_or_else(|| cwd().join(SNAPSHOT_DIR));
        let request = QueryRequest {
            levels: (!levels.is_empty()).then_some(levels),
            search,
            regex,
            logic: logic.into(),
            tail: !head,
            limit,
        };
        return debug_console_plus::run_query_command(&dir, &request);
    }

    let workspace = args.path.unwrap_or_else(cwd);
    // Piped stdin is the stream unless one was named
    let input = match args.input.as_deref() {
        Some(arg) => Some(InputSource::from_arg(arg)),
        None if !std::io::stdin().is_terminal() => Some(InputSource::Stdin),
        None => None,
    };

    if args.headless {
        let input = input.unwrap_or(InputSource::Stdin);
        debug_console_plus::run_headless(&workspace, input, args.load).await
    } else {
        debug_console_plus::run_with_workspace(&workspace, input, args.load).await
    }
}
