//! Clinic core CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use clinic_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use clinic_cli::commands::{run_config, run_filter, run_intake, run_options, run_tally};
use clinic_cli::logging::{LogConfig, LogFormat, init_logging};
use clinic_cli::settings::Settings;
use clinic_cli::summary::{print_config, print_control, print_filter, print_intake, print_tally};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let settings_path = cli.config.clone().unwrap_or_else(Settings::config_path);
    let settings = Settings::load_from(&settings_path);
    let log_config = log_config_from_cli(&cli, &settings);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let result = match &cli.command {
        Command::Filter(args) => run_filter(args, &settings).map(|report| {
            print_filter(&report, &settings.display);
            0
        }),
        Command::Options(args) => run_options(args).map(|control| {
            print_control(&control);
            0
        }),
        Command::Intake(args) => run_intake(args).map(|report| {
            print_intake(&report);
            if report.is_saved() { 0 } else { 1 }
        }),
        Command::Tally(args) => run_tally(args).map(|counts| {
            print_tally(&args.by, &counts);
            0
        }),
        Command::Config(args) => run_config(args, &settings_path).map(|report| {
            print_config(&report);
            0
        }),
    };
    let exit_code = result.unwrap_or_else(|error| {
        tracing::error!(error = %error, "command failed");
        eprintln!("error: {error:#}");
        1
    });
    std::process::exit(exit_code);
}

/// Flags win over settings; settings win over defaults.
fn log_config_from_cli(cli: &Cli, settings: &Settings) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        Some(LogFormatArg::Pretty) => LogFormat::Pretty,
        Some(LogFormatArg::Compact) => LogFormat::Compact,
        Some(LogFormatArg::Json) => LogFormat::Json,
        None => settings.logging.format,
    };
    config.log_data = cli.log_data || settings.logging.log_data;
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
