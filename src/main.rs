// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context, Result};
use asl_bridge::config::{load_and_validate_config, Config};
use asl_bridge::editor::RecordingSurface;
use asl_bridge::session::{EditorSession, ValidationReport};
use base64::Engine as _;
use serde::Serialize;
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

const USAGE: &str = "\
Usage: asl-bridge [--config FILE] [--artifact FILE] <command> <script>

Commands:
  check                   compile and print diagnostics
  compile [--json]        compile and print the module outline (or a JSON report)
  hover L C               type of the symbol at line L, column C
  definition L C          where the symbol at L:C is defined
  references L C          every reference to the symbol at L:C
  rename L C NAME         edits renaming the symbol at L:C to NAME
  highlight L C           highlights for the symbol at L:C";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Position {
    line: u32,
    column: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Check,
    Compile { json: bool },
    Hover(Position),
    Definition(Position),
    References(Position),
    Rename(Position, String),
    Highlight(Position),
}

#[derive(Debug)]
struct Cli {
    config: Option<PathBuf>,
    artifact: Option<PathBuf>,
    command: Command,
    script: PathBuf,
}

fn parse_number(value: Option<&String>, name: &str) -> Result<u32> {
    let value = value.with_context(|| format!("missing {}", name))?;
    value
        .parse()
        .with_context(|| format!("{} must be a positive integer, got '{}'", name, value))
}

fn parse_position(args: &[String]) -> Result<Position> {
    Ok(Position {
        line: parse_number(args.first(), "line")?,
        column: parse_number(args.get(1), "column")?,
    })
}

fn parse_args(args: &[String]) -> Result<Cli> {
    let mut config = None;
    let mut artifact = None;
    let mut rest = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(iter.next().context("--config needs a file")?)),
            "--artifact" => {
                artifact = Some(PathBuf::from(iter.next().context("--artifact needs a file")?))
            }
            _ => rest.push(arg.clone()),
        }
    }

    // The script is always the last argument.
    let script = match rest.pop() {
        Some(script) if !rest.is_empty() => PathBuf::from(script),
        _ => bail!("expected a command and a script"),
    };
    let (name, params) = rest.split_first().context("missing command")?;

    let command = match name.as_str() {
        "check" => Command::Check,
        "compile" => match params {
            [] => Command::Compile { json: false },
            [flag] if flag == "--json" => Command::Compile { json: true },
            _ => bail!("compile accepts only --json"),
        },
        "hover" => Command::Hover(parse_position(params)?),
        "definition" => Command::Definition(parse_position(params)?),
        "references" => Command::References(parse_position(params)?),
        "rename" => {
            let name = params.get(2).context("missing new name")?;
            Command::Rename(parse_position(params)?, name.clone())
        }
        "highlight" => Command::Highlight(parse_position(params)?),
        other => bail!("unknown command '{}'", other),
    };

    Ok(Cli {
        config,
        artifact,
        command,
        script,
    })
}

/// JSON report printed by `compile --json`.
#[derive(Serialize)]
struct CompileReport<'a> {
    success: bool,
    status: String,
    markers: &'a [asl_bridge::editor::Marker],
    /// Base64 of the compiled module, absent on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    module: Option<String>,
    outline: String,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Validates the script and prints the result; fails on diagnostics.
async fn report(
    session: &EditorSession,
    script: &Path,
    with_outline: bool,
    json: bool,
) -> Result<ExitCode> {
    let (status, markers, module_bytes) = match session.validate().await {
        ValidationReport::Applied {
            status,
            markers,
            module_bytes,
            ..
        } => (status, markers, module_bytes),
        ValidationReport::Superseded { .. } => bail!("validation was superseded"),
    };

    if json {
        print_json(&CompileReport {
            success: status.is_success(),
            status: status.label(),
            markers: &markers,
            module: module_bytes.map(|bytes| base64::engine::general_purpose::STANDARD.encode(bytes)),
            outline: session.output().await,
        })?;
    } else {
        for marker in &markers {
            eprintln!("{}:{}: {}", script.display(), marker.range, marker.message);
        }
        println!("{}", status.label());
        if with_outline && status.is_success() {
            println!("{}", session.output().await);
        }
    }

    Ok(if status.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => load_and_validate_config(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(artifact) = cli.artifact {
        config.artifact = Some(artifact);
    }

    tracing_subscriber::fmt()
        .with_env_filter(config.logging.env_filter())
        .with_writer(std::io::stderr)
        .init();

    let script = tokio::fs::read_to_string(&cli.script)
        .await
        .with_context(|| format!("failed to read script {}", cli.script.display()))?;

    let session = EditorSession::from_config(&config, Arc::new(RecordingSurface::new()));
    session.set_source(script).await;

    match cli.command {
        Command::Check => report(&session, &cli.script, false, false).await,
        Command::Compile { json } => report(&session, &cli.script, true, json).await,
        Command::Hover(at) => {
            print_json(&session.hover(at.line, at.column).await?)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Definition(at) => {
            print_json(&session.definition(at.line, at.column).await?)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::References(at) => {
            print_json(&session.references(at.line, at.column).await?)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Rename(at, name) => {
            print_json(&session.rename_edits(at.line, at.column, &name).await?)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Highlight(at) => {
            print_json(&session.document_highlights(at.line, at.column).await?)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|arg| arg == "--help" || arg == "-h") {
        eprintln!("{}", USAGE);
        return if args.is_empty() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("❌ {:#}\n\n{}", e, USAGE);
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_parse_query_with_options() {
        let cli = parse_args(&args("--artifact lang.wasm rename 3 7 level split.asl")).unwrap();
        assert_eq!(cli.artifact, Some(PathBuf::from("lang.wasm")));
        assert_eq!(cli.config, None);
        assert_eq!(cli.script, PathBuf::from("split.asl"));
        assert_eq!(
            cli.command,
            Command::Rename(Position { line: 3, column: 7 }, "level".into())
        );
    }

    #[test]
    fn test_parse_compile_json() {
        let cli = parse_args(&args("compile --json a.asl")).unwrap();
        assert_eq!(cli.command, Command::Compile { json: true });
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args("a.asl")).is_err());
        assert!(parse_args(&args("hover 1 a.asl")).is_err());
        assert!(parse_args(&args("hover x 2 a.asl")).is_err());
        assert!(parse_args(&args("explode a.asl")).is_err());
        assert!(parse_args(&args("check --config")).is_err());
    }
}
