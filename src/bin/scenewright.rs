use std::{
    fs::File,
    io::{BufRead as _, BufReader},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "scenewright", version)]
struct Cli {
    /// Pipeline config JSON (limits, stabilizer thresholds, enrichment table).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run raw model output through the pipeline and print the resulting scene update.
    Process(ProcessArgs),
    /// Normalize and validate an envelope without applying it.
    Validate(ValidateArgs),
    /// Feed a JSON-lines transcript of `{utterance, raw}` records through one session.
    Replay(ReplayArgs),
}

#[derive(Parser, Debug)]
struct ProcessArgs {
    /// File holding the raw model output.
    #[arg(long)]
    raw: PathBuf,

    /// The user utterance that produced the output.
    #[arg(long)]
    utterance: String,

    /// Starting scene graph JSON (empty scene when omitted).
    #[arg(long)]
    scene: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Envelope JSON (raw model text is accepted too).
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// JSON-lines transcript.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Deserialize, Debug)]
struct ReplayRecord {
    utterance: String,
    raw: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => scenewright::PipelineConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => scenewright::PipelineConfig::default(),
    };
    match cli.cmd {
        Command::Process(args) => cmd_process(args, config),
        Command::Validate(args) => cmd_validate(args, config),
        Command::Replay(args) => cmd_replay(args, config),
    }
}

fn read_text(path: &Path, what: &str) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read {what} '{}'", path.display()))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value).context("serialize output JSON")?;
    println!("{s}");
    Ok(())
}

fn cmd_process(args: ProcessArgs, config: scenewright::PipelineConfig) -> anyhow::Result<()> {
    let raw = read_text(&args.raw, "model output")?;
    let mut session = match &args.scene {
        Some(path) => {
            let scene = scenewright::parse_scene(&read_text(path, "scene")?)?;
            scenewright::SceneSession::with_scene(config, scene)?
        }
        None => scenewright::SceneSession::new(config),
    };

    let event = session.submit_model_output(&args.utterance, &raw);
    eprintln!(
        "{:?}: {}",
        event.status,
        event.notes.as_deref().unwrap_or("no notes")
    );
    print_json(&session.snapshot())
}

fn cmd_validate(args: ValidateArgs, config: scenewright::PipelineConfig) -> anyhow::Result<()> {
    let raw = read_text(&args.in_path, "envelope")?;
    let value = scenewright::parse_raw_json(&raw).map_err(scenewright::SceneError::parse)?;
    let normalized = scenewright::normalize_envelope(value);
    for repair in &normalized.repairs {
        eprintln!("repaired: {repair}");
    }
    let envelope = scenewright::validate_envelope(&normalized.value, &config.limits)
        .map_err(|e| scenewright::SceneError::validation(e.to_string()))?;
    print_json(&envelope)
}

fn cmd_replay(args: ReplayArgs, config: scenewright::PipelineConfig) -> anyhow::Result<()> {
    let f = File::open(&args.in_path)
        .with_context(|| format!("open transcript '{}'", args.in_path.display()))?;
    let mut session = scenewright::SceneSession::new(config);

    for (n, line) in BufReader::new(f).lines().enumerate() {
        let line = line.with_context(|| format!("read transcript line {}", n + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: ReplayRecord = serde_json::from_str(&line)
            .with_context(|| format!("parse transcript line {}", n + 1))?;
        let event = session.submit_model_output(&record.utterance, &record.raw);
        eprintln!(
            "#{} {:?} {}",
            session.revision(),
            event.status,
            event.diff_summary.as_deref().unwrap_or("-")
        );
    }

    print_json(&session.snapshot())
}
