//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_bar_adapter::CsvBarAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_payload_adapter::JsonPayloadAdapter;
use crate::adapters::json_spec_adapter::JsonSpecAdapter;
use crate::domain::assemble::compile_with_diagnostics;
use crate::domain::diagnostic::Diagnostic;
use crate::domain::error::ChartError;
use crate::domain::options::{build_display_options, DisplayOptions};
use crate::domain::payload::BacktestPayload;
use crate::domain::plot::ChartKind;
use crate::domain::tooltip::{axis_tooltip, marker_tooltip};
use crate::ports::payload_port::PayloadSource;
use crate::ports::spec_port::SpecSink;

#[derive(Parser, Debug)]
#[command(name = "klineplot", about = "Compile backtest results into chart specs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a payload (or a CSV of bars) into a plot spec
    Compile {
        #[arg(short, long, conflicts_with = "bars", required_unless_present = "bars")]
        input: Option<PathBuf>,
        #[arg(short, long)]
        bars: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// kline, equity or pie
        #[arg(short, long, default_value = "kline")]
        kind: ChartKind,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        pretty: bool,
    },
    /// Validate a display options file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the tooltip for one bar of a compiled kline chart
    Tooltip {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        index: usize,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Compile {
            input,
            bars,
            config,
            kind,
            output,
            pretty,
        } => run_compile(
            input.as_deref(),
            bars.as_deref(),
            config.as_deref(),
            kind,
            output.as_deref(),
            pretty,
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Tooltip {
            input,
            index,
            config,
        } => run_tooltip(&input, index, config.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::from(&e)
        }
    }
}

pub fn load_options(path: Option<&Path>) -> Result<DisplayOptions, ChartError> {
    match path {
        None => Ok(DisplayOptions::default()),
        Some(path) => {
            info!(path = %path.display(), "loading display options");
            let adapter = FileConfigAdapter::from_file(path)?;
            build_display_options(&adapter)
        }
    }
}

fn load_payload(input: Option<&Path>, bars: Option<&Path>) -> Result<BacktestPayload, ChartError> {
    let source: Box<dyn PayloadSource> = match (input, bars) {
        (Some(path), _) => {
            info!(path = %path.display(), "loading result payload");
            Box::new(JsonPayloadAdapter::new(path.to_path_buf()))
        }
        (None, Some(path)) => {
            info!(path = %path.display(), "loading bars");
            Box::new(CsvBarAdapter::new(path.to_path_buf()))
        }
        (None, None) => return Ok(BacktestPayload::default()),
    };
    source.load_payload()
}

fn report(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        warn!(%diagnostic, "input problem absorbed");
    }
}

fn run_compile(
    input: Option<&Path>,
    bars: Option<&Path>,
    config: Option<&Path>,
    kind: ChartKind,
    output: Option<&Path>,
    pretty: bool,
) -> Result<ExitCode, ChartError> {
    let options = load_options(config)?;
    let payload = load_payload(input, bars)?;

    let compiled = compile_with_diagnostics(&payload, kind, &options);
    report(&compiled.diagnostics);
    info!(
        kind = %kind,
        bars = compiled.spec.categories.len(),
        panes = compiled.spec.panes.len(),
        markers = compiled.spec.markers.len(),
        placeholder = compiled.spec.placeholder,
        "compiled"
    );

    if let Some(path) = output {
        info!(path = %path.display(), "writing plot spec");
    }
    JsonSpecAdapter::new(pretty).write(&compiled.spec, output)?;
    Ok(ExitCode::SUCCESS)
}

fn run_validate(config: &Path) -> Result<ExitCode, ChartError> {
    let options = load_options(Some(config))?;
    info!(
        number_format = ?options.number_format,
        marker_mode = ?options.marker_mode,
        "display options are valid"
    );
    println!("{}: ok", config.display());
    Ok(ExitCode::SUCCESS)
}

fn run_tooltip(input: &Path, index: usize, config: Option<&Path>) -> Result<ExitCode, ChartError> {
    let options = load_options(config)?;
    let payload = load_payload(Some(input), None)?;
    let compiled = compile_with_diagnostics(&payload, ChartKind::Kline, &options);
    report(&compiled.diagnostics);

    let spec = compiled.spec;
    let Some(text) = axis_tooltip(&spec, index) else {
        error!(index, bars = spec.categories.len(), "index is outside the bar axis");
        return Ok(ExitCode::FAILURE);
    };
    println!("{}", text);

    let category = &spec.categories[index];
    for marker in spec.markers.iter().filter(|m| m.timestamp() == category) {
        println!();
        println!("{}", marker_tooltip(marker));
    }
    Ok(ExitCode::SUCCESS)
}
