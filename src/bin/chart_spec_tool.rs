use querychart_rs::api::{ChartEngine, ChartRequest, ChartTypeSummary};
use querychart_rs::render::{ChartRenderer, NullRenderer};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

const USAGE: &str =
    "usage: chart_spec_tool <build|validate|compatible|list> [--input <request.json>] [--output <path>] [--envelope]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandKind {
    Build,
    Validate,
    Compatible,
    List,
}

#[derive(Debug)]
struct CliArgs {
    command: CommandKind,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    envelope: bool,
}

fn main() {
    let _ = querychart_rs::telemetry::init_default_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let engine = ChartEngine::with_builtin_chart_types();

    match args.command {
        CommandKind::Build => {
            let request = read_request(&args)?;
            let spec = engine
                .build_request(&request)
                .map_err(|err| format!("failed to build chart: {err}"))?;
            NullRenderer::default()
                .render(&spec)
                .map_err(|err| format!("chart spec failed validation: {err}"))?;
            let payload = if args.envelope {
                spec.to_json_contract_v1_pretty()
            } else {
                spec.to_json_pretty()
            };
            let payload = payload.map_err(|err| err.to_string())?;
            emit(args.output.as_ref(), &payload)
        }
        CommandKind::Validate => {
            let request = read_request(&args)?;
            let result = engine.validate(&request.config, &request.fields);
            write_json(args.output.as_ref(), &result)
        }
        CommandKind::Compatible => {
            let request = read_request(&args)?;
            let summaries: Vec<ChartTypeSummary> = engine
                .compatible_chart_types(&request.fields)
                .into_iter()
                .map(|definition| definition.summary())
                .collect();
            write_json(args.output.as_ref(), &summaries)
        }
        CommandKind::List => {
            let summaries: Vec<ChartTypeSummary> = engine
                .registry()
                .all()
                .map(|definition| definition.summary())
                .collect();
            write_json(args.output.as_ref(), &summaries)
        }
    }
}

fn read_request(args: &CliArgs) -> Result<ChartRequest, String> {
    let path = args
        .input
        .as_ref()
        .ok_or_else(|| "missing --input".to_owned())?;
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?;
    serde_json::from_str(&raw)
        .map_err(|err| format!("failed to parse request `{}`: {err}", path.display()))
}

fn write_json<T: Serialize>(path: Option<&PathBuf>, value: &T) -> Result<(), String> {
    let payload = serde_json::to_string_pretty(value)
        .map_err(|err| format!("failed to serialize json: {err}"))?;
    emit(path, &payload)
}

fn emit(path: Option<&PathBuf>, payload: &str) -> Result<(), String> {
    match path {
        Some(path) => fs::write(path, payload)
            .map_err(|err| format!("failed to write `{}`: {err}", path.display())),
        None => {
            println!("{payload}");
            Ok(())
        }
    }
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = std::env::args().skip(1);
    let command = match args.next().as_deref() {
        Some("build") => CommandKind::Build,
        Some("validate") => CommandKind::Validate,
        Some("compatible") => CommandKind::Compatible,
        Some("list") => CommandKind::List,
        _ => return Err(USAGE.to_owned()),
    };

    let mut input = None::<PathBuf>;
    let mut output = None::<PathBuf>;
    let mut envelope = false;

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--input" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --input".to_owned())?;
                input = Some(PathBuf::from(value));
            }
            "--output" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --output".to_owned())?;
                output = Some(PathBuf::from(value));
            }
            "--envelope" => envelope = true,
            "--help" | "-h" => return Err(USAGE.to_owned()),
            _ => return Err(format!("unknown argument `{flag}`")),
        }
    }

    Ok(CliArgs {
        command,
        input,
        output,
        envelope,
    })
}
