mod cli;
mod commands;
mod config;
mod datasource;
mod desired;
mod manifest;
mod reconcile;
mod resource;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command, ConnectionArgs};
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub connection: ConnectionArgs,
    /// Explicit state file, if any
    pub state: Option<String>,
}

fn main() {
    if let Err(e) = run() {
        ui::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        connection: cli.connection,
        state: cli.state,
    };
    log::trace!("Verbosity {}", ctx.verbose);

    match cli.command {
        Command::Refresh => commands::refresh::run(&ctx),
        Command::Plan(args) => commands::plan::plan(&ctx, &args),
        Command::Apply(args) => commands::plan::apply(&ctx, &args),
        Command::Import(args) => commands::import::run(&ctx, &args),
        Command::List { source } => commands::list::run(&ctx, source),
        Command::Completions { shell } => {
            generate(shell, &mut Cli::command(), "shoehorn", &mut io::stdout());
            Ok(())
        }
    }
}
