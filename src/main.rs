//! Purpose: `mkscript` CLI entry point.
//! Role: Binary crate root; parses args, settles paths and overwrite consent, runs the compiler.
//! Invariants: Reports go to stdout; diagnostics and logs go to stderr.
//! Invariants: Errors are human text on stderr, or a JSON envelope with `--json`.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::error::Error as StdError;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod prompt;
mod script_json;

use mkscript::api::{Error, ErrorKind, InputFormat, to_exit_code};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

#[derive(Copy, Clone, Debug)]
struct OutputMode {
    color: ColorMode,
    json: bool,
}

impl Default for OutputMode {
    fn default() -> Self {
        Self {
            color: ColorMode::Auto,
            json: false,
        }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, output)) => {
            emit_error(&err, output);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, OutputMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        OutputMode::default(),
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                let message = clap_error_summary(&err);
                let hint = clap_error_hint(&err);
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(message)
                        .with_hint(hint),
                    OutputMode::default(),
                ));
            }
        },
    };

    let output = OutputMode {
        color: cli.color,
        json: cli.json,
    };

    command_dispatch::dispatch_command(cli.command, output)
        .map_err(add_io_hint)
        .map_err(|err| (err, output))
}

#[derive(Parser)]
#[command(
    name = "mkscript",
    version,
    about = "Compile CSV or JSON event tables into game script data files",
    long_about = None,
    after_help = r#"EXAMPLES
  $ mkscript build level1.csv              # writes level1.sdf
  $ mkscript build events.json out/intro.sdf --yes
  $ mkscript inspect level1.sdf

INPUT
  Every row has six columns: timer, system, to, from, command, arguments.
  CSV files have no header row. JSON files map keys to 6-element arrays.

LOGGING
  Set RUST_LOG (e.g. RUST_LOG=debug) for pipeline diagnostics on stderr."#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,
    #[arg(
        long,
        global = true,
        help = "Emit reports and errors as JSON"
    )]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for InputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => InputFormat::Csv,
            FormatArg::Json => InputFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Compile an event table into a script data file",
        after_help = r#"NOTES
  - OUTPUT defaults to INPUT with its extension replaced by .sdf
  - An existing OUTPUT is only replaced after confirmation (or --yes)"#
    )]
    Build {
        #[arg(help = "Input table (.csv or .json)", value_hint = ValueHint::FilePath)]
        input: PathBuf,
        #[arg(help = "Output script file", value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        #[arg(
            long = "in",
            value_enum,
            help = "Input format; overrides the file extension"
        )]
        input_format: Option<FormatArg>,
        #[arg(short = 'y', long, help = "Overwrite an existing output without asking")]
        yes: bool,
    },
    #[command(about = "Decode a script data file and print its records")]
    Inspect {
        #[arg(help = "Script data file", value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },
    #[command(about = "Generate shell completion scripts")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn add_io_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::Write => err.with_hint(
            "Check that the output directory exists and is writable, and that the disk has space.",
        ),
        ErrorKind::Io => err.with_hint("I/O error. Check the path and file permissions."),
        ErrorKind::NotFound => err.with_hint("Check the input path."),
        _ => err,
    }
}

fn emit_json(value: Value) {
    let pretty = io::stdout().is_terminal();
    let json = if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, output: OutputMode) {
    if output.json {
        let value = error_json(err);
        let json = serde_json::to_string(&value).unwrap_or_else(|_| {
            "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
        });
        eprintln!("{json}");
        return;
    }
    let is_tty = io::stderr().is_terminal();
    eprintln!("{}", error_text(err, output.color.use_color(is_tty)));
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::AlreadyExists => "already exists".to_string(),
        ErrorKind::Format => "unsupported input format".to_string(),
        ErrorKind::Parse => "malformed input".to_string(),
        ErrorKind::RowArity => "incorrect row length".to_string(),
        ErrorKind::FieldType => "invalid field type".to_string(),
        ErrorKind::EmbeddedTerminator => "field contains a NUL byte".to_string(),
        ErrorKind::NoData => "no data generated".to_string(),
        ErrorKind::Write => "write failed".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
        ErrorKind::Corrupt => "corrupt script data".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(err.kind().label()));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(row) = err.row() {
        inner.insert("row".to_string(), json!(row));
    }
    if let Some(field) = err.field() {
        inner.insert("field".to_string(), json!(field));
    }
    if let Some(offset) = err.offset() {
        inner.insert("offset".to_string(), json!(offset));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    let mut headline = error_message(err);
    if let Some(row) = err.row() {
        headline = format!("row {row}: {headline}");
    }
    lines.push(format!(
        "{} {headline}",
        colorize_label("error:", use_color, AnsiColor::Red),
    ));

    if let Some(field) = err.field() {
        lines.push(format!(
            "{} {field}",
            colorize_label("field:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    if let Some(offset) = err.offset() {
        lines.push(format!(
            "{} {offset}",
            colorize_label("offset:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let usage = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .map(str::trim);

    let Some(usage) = usage else {
        return "Try `mkscript --help`.".to_string();
    };

    let tokens: Vec<&str> = usage.split_whitespace().collect();
    let Some(pos) = tokens.iter().position(|t| *t == "mkscript") else {
        return "Try `mkscript --help`.".to_string();
    };

    let mut parts = Vec::new();
    for token in tokens.iter().skip(pos + 1) {
        if token.starts_with('-') || token.starts_with('<') || token.starts_with('[') {
            break;
        }
        parts.push(*token);
    }

    if parts.is_empty() {
        return "Try `mkscript --help`.".to_string();
    }
    format!("Try `mkscript {} --help`.", parts.join(" "))
}
