//! Purpose: Hold top-level CLI command dispatch for `mkscript`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Format, then input existence, then overwrite consent are settled before compiling.
//! Invariants: Human reports and JSON reports carry the same facts.

use bstr::ByteSlice;
use mkscript::api::{CompileConfig, compile, inspect_file};

use super::*;
use crate::prompt::confirm_overwrite;
use crate::script_json::{compile_report_json, header_json, record_json};

pub(super) fn dispatch_command(command: Command, output: OutputMode) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "mkscript", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Build {
            input,
            output: out_path,
            input_format,
            yes,
        } => {
            let mut config = CompileConfig::new(input);
            if let Some(out_path) = out_path {
                config = config.with_output(out_path);
            }
            if let Some(format) = input_format {
                config = config.with_format(format.into());
            }
            config.resolve_format()?;
            if !config.input.exists() {
                return Err(Error::new(ErrorKind::NotFound)
                    .with_message(format!(
                        "input file '{}' does not exist",
                        config.input.display()
                    ))
                    .with_path(&config.input));
            }

            if config.output.exists() && !yes && !confirm_overwrite(&config.output)? {
                return Err(Error::new(ErrorKind::AlreadyExists)
                    .with_message(format!(
                        "output file '{}' already exists",
                        config.output.display()
                    ))
                    .with_path(&config.output)
                    .with_hint("Pass --yes to overwrite, or choose another output path."));
            }

            let report = compile(&config)?;
            if output.json {
                emit_json(compile_report_json(&report));
            } else {
                println!("Wrote data file '{}'", report.output.display());
                println!("{} total commands.", report.records);
                println!("Size: {} bytes.", report.bytes);
            }
            Ok(RunOutcome::ok())
        }
        Command::Inspect { file } => {
            let script = inspect_file(&file)?;
            if output.json {
                let records = script
                    .rows
                    .iter()
                    .enumerate()
                    .map(|(pos, row)| record_json(pos + 1, row))
                    .collect::<Vec<_>>();
                emit_json(json!({
                    "path": file.display().to_string(),
                    "header": header_json(&script.header),
                    "records": records,
                }));
            } else {
                println!(
                    "{} {} ({} records)",
                    file.display(),
                    script.header.version,
                    script.header.record_count
                );
                for (pos, row) in script.rows.iter().enumerate() {
                    println!(
                        "{:>5}  {:>12}  system={} to={} from={} command={} args={}",
                        pos + 1,
                        row.timer,
                        row.system.as_bstr(),
                        row.to.as_bstr(),
                        row.from.as_bstr(),
                        row.command.as_bstr(),
                        row.arguments.as_bstr()
                    );
                }
            }
            Ok(RunOutcome::ok())
        }
    }
}
