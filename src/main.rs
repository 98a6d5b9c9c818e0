use std::fs;
use std::io::{self, Write as _};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use report_title_parser::model::PatternUsageStats;
use report_title_parser::pattern_library::JsonFilePatternSource;
use report_title_parser::{PatternLibrary, Pipeline, PipelineOutput};

#[derive(Parser)]
#[command(name = "parse", about = "Market-research report title parser")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a single title and print its PipelineOutput as pretty JSON.
    Parse {
        #[arg(long)]
        title: String,
        #[arg(long)]
        store: Option<PathBuf>,
        /// Also emit which pattern identifiers fired, per spec.md §10.
        #[arg(long)]
        stats: bool,
    },
    /// Parse one title per line of a file, emitting a JSON array.
    ParseBatch {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

fn store_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os("PATTERN_STORE_URI").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data/patterns.json"))
}

fn load_library(path: &PathBuf) -> Result<PatternLibrary> {
    let source = JsonFilePatternSource::new(path);
    PatternLibrary::load(&source)
        .with_context(|| format!("loading pattern library from {}", path.display()))
}

#[derive(Serialize)]
struct ParseWithStats {
    #[serde(flatten)]
    output: PipelineOutput,
    stats: PatternUsageStats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Parse { title, store, stats } => {
            let path = store_path(store);
            let library = load_library(&path)?;
            let pipeline = Pipeline::new(&library);
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            if stats {
                let (output, stats) = pipeline.run_with_usage(&title);
                serde_json::to_writer_pretty(&mut handle, &ParseWithStats { output, stats })?;
            } else {
                let output = pipeline.run(&title);
                serde_json::to_writer_pretty(&mut handle, &output)?;
            }
            handle.write_all(b"\n")?;
        }
        Command::ParseBatch { input, store } => {
            let path = store_path(store);
            let library = load_library(&path)?;
            let pipeline = Pipeline::new(&library);

            let contents = fs::read_to_string(&input)
                .with_context(|| format!("reading batch input {}", input.display()))?;
            let outputs: Vec<_> = contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| pipeline.run(line))
                .collect();

            let stdout = io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, &outputs)?;
            handle.write_all(b"\n")?;
        }
    }

    Ok(())
}
