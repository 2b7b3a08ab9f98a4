use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use mood_atlas::config::AppConfig;
use mood_atlas::data::{load_observations, read_observations};
use mood_atlas::journal::import_and_sync;
use mood_atlas::sync::MemoryBackend;
use mood_atlas::{filter_by_mood, markers, ClusterParams, MoodCluster, Result, Session};

/// Groups geotagged mood journal entries for a map view
#[derive(Parser)]
#[command(name = "mood-atlas")]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print clusters as JSON
    Cluster(ClusterArgs),
    /// Print map markers as JSON
    Markers(ClusterArgs),
    /// Import entries into a journal, push them through the sync queue and print the report
    Sync(SyncArgs),
}

#[derive(Args)]
struct ClusterArgs {
    /// Observations as a JSON array, or a journal snapshot ending in .bin
    input: PathBuf,

    /// Only cluster observations with this mood
    #[arg(long)]
    mood: Option<String>,

    /// Neighbourhood radius in kilometres
    #[arg(long)]
    radius_km: Option<f64>,

    /// Smallest group reported as a cluster
    #[arg(long)]
    min_members: Option<usize>,
}

#[derive(Args)]
struct SyncArgs {
    /// Observations as a JSON array, or a journal snapshot ending in .bin
    input: PathBuf,

    /// User the entries belong to
    #[arg(long, default_value = "local")]
    user_id: String,

    /// Access token for the backend
    #[arg(long)]
    token: Option<String>,

    /// Write the resulting journal to this snapshot file
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path),
        None => Ok(AppConfig::default()),
    };

    let filter = match (&config, cli.verbose) {
        (_, 1) => "debug".to_string(),
        (_, v) if v >= 2 => "trace".to_string(),
        (Ok(config), _) => config.log_filter.clone(),
        (Err(_), _) => "info".to_string(),
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let outcome = match config {
        Ok(config) => execute(&cli.command, &config).await,
        Err(err) => Err(err),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "mood-atlas failed");
            ExitCode::FAILURE
        }
    }
}

async fn execute(command: &Command, config: &AppConfig) -> Result<()> {
    let output = match command {
        Command::Cluster(args) => serde_json::to_string_pretty(&run_clustering(args, config)?)?,
        Command::Markers(args) => {
            serde_json::to_string_pretty(&markers(&run_clustering(args, config)?))?
        }
        Command::Sync(args) => run_sync(args, config).await?,
    };

    println!("{}", output);
    Ok(())
}

fn run_clustering(args: &ClusterArgs, config: &AppConfig) -> Result<Vec<MoodCluster>> {
    let params = ClusterParams::new(
        args.radius_km.unwrap_or(config.clustering.radius_km),
        args.min_members.unwrap_or(config.clustering.min_members),
    )?;

    let observations = load_observations(&args.input)?;
    filter_by_mood(&observations, args.mood.as_deref(), &params)
}

async fn run_sync(args: &SyncArgs, config: &AppConfig) -> Result<String> {
    let mut session = Session::new(args.user_id.clone());
    if let Some(token) = &args.token {
        session = session.with_access_token(token.clone());
    }

    let observations = read_observations(&args.input)?;
    let backend = Arc::new(MemoryBackend::new());
    let (journal, report) =
        import_and_sync(observations, Arc::new(session), backend, config.sync).await?;

    if let Some(path) = &args.snapshot {
        journal.save_snapshot(path)?;
    }

    Ok(serde_json::to_string_pretty(&report)?)
}
