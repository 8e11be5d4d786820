//! CLI argument definitions for the clinic tools.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use clinic_model::{RecordId, Role};
use clinic_reference::ResolveMode;

#[derive(Parser)]
#[command(
    name = "clinic",
    version,
    about = "Clinic core tools - filter lists, resolve reference controls, run intake",
    long_about = "Exercise the clinic core against JSON exports.\n\n\
                  Records, entity descriptors and reference options are read from JSON files\n\
                  and served through an in-memory backend with the same caching and mutation\n\
                  rules the application uses."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (defaults to the configured format).
    #[arg(long = "log-format", value_enum, global = true)]
    pub log_format: Option<LogFormatArg>,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow patient values in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Settings file to use instead of the platform default.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Narrow a record list by text, dropdown and date constraints.
    Filter(FilterArgs),

    /// Resolve one reference entity into a select or checkbox group.
    Options(OptionsArgs),

    /// Run a patient intake through the wizard and save it.
    Intake(IntakeArgs),

    /// Count records per value of one field.
    Tally(TallyArgs),

    /// Show or initialize the settings file.
    Config(ConfigArgs),
}

#[derive(Parser)]
pub struct FilterArgs {
    /// JSON array of records.
    #[arg(value_name = "RECORDS")]
    pub records: PathBuf,

    /// JSON filter state to start from.
    #[arg(long = "filter", value_name = "FILTER")]
    pub filter: Option<PathBuf>,

    /// Case-insensitive text search across every field.
    #[arg(long = "text", value_name = "TEXT")]
    pub text: Option<String>,

    /// Dropdown constraint as FIELD=VALUE (repeatable).
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub set: Vec<String>,

    /// Earliest date, inclusive.
    #[arg(long = "from", value_name = "YYYY-MM-DD")]
    pub from: Option<NaiveDate>,

    /// Latest date, inclusive.
    #[arg(long = "to", value_name = "YYYY-MM-DD")]
    pub to: Option<NaiveDate>,

    /// Field the date range applies to (default from settings).
    #[arg(long = "date-field", value_name = "FIELD")]
    pub date_field: Option<String>,

    /// Entity name to list the records under (default from settings).
    #[arg(long = "entity", value_name = "NAME")]
    pub entity: Option<String>,
}

#[derive(Parser)]
pub struct OptionsArgs {
    /// JSON array of entity descriptors.
    #[arg(value_name = "ENTITIES")]
    pub entities: PathBuf,

    /// JSON array of reference options.
    #[arg(value_name = "OPTIONS")]
    pub options: PathBuf,

    /// Entity id to resolve.
    #[arg(long = "entity", value_name = "ID")]
    pub entity: RecordId,

    /// How the control is bound.
    #[arg(long = "mode", value_enum, default_value = "control")]
    pub mode: ModeArg,

    /// Current selection: an option id or code, or comma-separated ids in
    /// multi mode.
    #[arg(long = "value", value_name = "VALUE")]
    pub value: Option<String>,
}

#[derive(Parser)]
pub struct IntakeArgs {
    /// JSON patient intake, optionally with a `medications` array.
    #[arg(value_name = "INTAKE")]
    pub input: PathBuf,

    /// Entity descriptors used to show option names in the review.
    #[arg(long = "entities", value_name = "ENTITIES", requires = "options")]
    pub entities: Option<PathBuf>,

    /// Reference options used to show option names in the review.
    #[arg(long = "options", value_name = "OPTIONS", requires = "entities")]
    pub options: Option<PathBuf>,

    /// Reference date for age and birth date checks (default: today).
    #[arg(long = "today", value_name = "YYYY-MM-DD")]
    pub today: Option<NaiveDate>,

    /// Role of the signed-in user.
    #[arg(long = "role", value_enum, default_value = "nurse")]
    pub role: RoleArg,

    /// Id of the signed-in user.
    #[arg(long = "user-id", value_name = "ID", default_value_t = 1)]
    pub user_id: RecordId,
}

#[derive(Parser)]
pub struct TallyArgs {
    /// JSON array of records.
    #[arg(value_name = "RECORDS")]
    pub records: PathBuf,

    /// Field to group by.
    #[arg(long = "by", value_name = "FIELD")]
    pub by: String,
}

#[derive(Parser)]
pub struct ConfigArgs {
    /// Write the default settings file if none exists.
    #[arg(long = "init")]
    pub init: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Filter,
    Control,
    Multi,
}

impl From<ModeArg> for ResolveMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Filter => Self::Filter,
            ModeArg::Control => Self::Control,
            ModeArg::Multi => Self::Multi,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Admin,
    Doctor,
    Nurse,
    Staff,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => Self::Admin,
            RoleArg::Doctor => Self::Doctor,
            RoleArg::Nurse => Self::Nurse,
            RoleArg::Staff => Self::Staff,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
