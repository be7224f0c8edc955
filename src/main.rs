use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use faceindex::{config, persist, Embedding, FaceIndex};
use log::info;

#[derive(Parser)]
#[command(name = "faceindex")]
#[command(
    version,
    about = "Face identity index - register and recognize patient embeddings"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register an embedding under a patient identifier
    Register {
        /// JSON file holding the 512 embedding floats exported by the extractor
        #[arg(short, long)]
        embedding: PathBuf,
        /// Patient record identifier
        #[arg(short, long)]
        patient: i64,
    },
    /// Find the registered patient closest to an embedding
    Recognize {
        /// JSON file holding the 512 embedding floats exported by the extractor
        #[arg(short, long)]
        embedding: PathBuf,
        /// Maximum accepted squared distance (defaults to the configured value)
        #[arg(short, long)]
        threshold: Option<f32>,
    },
    /// Show how many embeddings are registered
    Stats,
    /// Remove the durable index snapshot
    Purge,
    /// Open config file in editor
    Config,
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(None)?;

    match cli.command {
        Commands::Register { embedding, patient } => register(&cfg, &embedding, patient),
        Commands::Recognize {
            embedding,
            threshold,
        } => recognize(&cfg, &embedding, threshold.unwrap_or(cfg.threshold)),
        Commands::Stats => stats(&cfg),
        Commands::Purge => purge(&cfg),
        Commands::Config => open_config(),
    }
}

fn read_embedding(path: &Path) -> Result<Embedding> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading embedding {}", path.display()))?;
    let floats: Vec<f32> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing embedding {}", path.display()))?;
    Ok(Embedding::from_raw(floats)?)
}

fn register(cfg: &config::Config, embedding_path: &Path, patient: i64) -> Result<()> {
    let embedding = read_embedding(embedding_path)?;

    let index = FaceIndex::open(cfg.snapshot_path()).context("Failed to open face index")?;
    let position = index
        .register(embedding, patient)
        .context("Failed to register embedding")?;

    info!("✓ Registered patient {} at position {}", patient, position);
    Ok(())
}

fn recognize(cfg: &config::Config, embedding_path: &Path, threshold: f32) -> Result<()> {
    let embedding = read_embedding(embedding_path)?;

    let index = FaceIndex::open(cfg.snapshot_path()).context("Failed to open face index")?;

    match index.recognize(&embedding, threshold) {
        Some(m) => info!(
            "✓ Match: patient {} (position {}, distance {:.4})",
            m.patient_id, m.position, m.distance
        ),
        None => info!("No match within threshold {:.3}", threshold),
    }
    Ok(())
}

fn stats(cfg: &config::Config) -> Result<()> {
    let index = FaceIndex::open(cfg.snapshot_path()).context("Failed to open face index")?;
    info!("{} registered embedding(s)", index.len());
    Ok(())
}

fn purge(cfg: &config::Config) -> Result<()> {
    persist::purge(&cfg.snapshot_path()).context("Failed to purge index snapshot")?;
    info!("✓ Index snapshot removed");
    Ok(())
}

fn open_config() -> Result<()> {
    let config_path = config::CONFIG_PATH.as_os_str();
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    info!("Opening config file: {:?}", config_path);

    let status = std::process::Command::new(editor)
        .arg(config_path)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        anyhow::bail!("Editor exited with non-zero status");
    }

    Ok(())
}
