//! Japan earthquake catalog loader CLI.

use clap::{ColorChoice, Parser};
use quake_cli::logging::{LogConfig, LogFormat, init_logging};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_export, run_fetch, run_load_command, run_query, run_stats};
use quake_cli::summary::{
    print_export, print_fetch, print_load_summary, print_query_run, print_stats,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match &cli.command {
        Command::Load(args) => match run_load_command(args) {
            Ok(result) => {
                print_load_summary(&result);
                i32::from(result.has_errors)
            }
            Err(error) => report(&error),
        },
        Command::Export(args) => match run_export(args) {
            Ok(export) => {
                print_export(&export);
                0
            }
            Err(error) => report(&error),
        },
        Command::Query(args) => match run_query(args) {
            Ok(run) => {
                print_query_run(&run);
                i32::from(run.failed() > 0)
            }
            Err(error) => report(&error),
        },
        Command::Stats(args) => match run_stats(args) {
            Ok(stats) => {
                print_stats(&args.target.table, &stats);
                0
            }
            Err(error) => report(&error),
        },
        Command::Fetch(args) => match run_fetch(args) {
            Ok(fetched) => {
                print_fetch(&fetched);
                0
            }
            Err(error) => report(&error),
        },
    };
    std::process::exit(exit_code);
}

fn report(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");
    1
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level_filter = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    LogConfig::default()
        .with_level(level_filter)
        .with_env_filter(!(cli.verbosity.is_present() || cli.log_level.is_some()))
        .with_format(format)
        .with_ansi(with_ansi)
        .with_timestamps(cli.log_file.is_some())
        .with_log_file(cli.log_file.clone())
}
