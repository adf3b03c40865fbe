use anyhow::Context;
use clap::Parser;
use portraitsync::{
    resolve_identifiers, sync_portraits, GcsClient, PortraitError, SyncConfig, DEFAULT_BUCKET,
    DEFAULT_ENDPOINT,
};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "portraitsync")]
#[command(
    about = "Download faculty portraits from Google Cloud Storage and create local thumbnails",
    long_about = None
)]
#[command(version)]
struct Args {
    /// Name of the bucket that stores portraits
    #[arg(long, default_value = DEFAULT_BUCKET)]
    bucket: String,

    /// Faculty identifier (may be specified multiple times)
    #[arg(long = "id", value_name = "IDENTIFIER")]
    ids: Vec<String>,

    /// Newline separated file with faculty identifiers
    #[arg(long)]
    from_file: Option<PathBuf>,

    /// Directory where thumbnails will be stored
    #[arg(long)]
    output: PathBuf,

    /// Storage JSON API base URL
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// OAuth access token for private buckets
    #[arg(long, env = "GOOGLE_OAUTH_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Skip MD5 verification of downloaded portraits
    #[arg(long)]
    skip_verify: bool,

    /// Stop at the first identifier that fails instead of continuing
    #[arg(long)]
    fail_fast: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("portraitsync={}", log_level))
        .init();

    match run(args).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the run finished but some identifiers failed.
async fn run(args: Args) -> anyhow::Result<bool> {
    let identifiers = match resolve_identifiers(&args.ids, args.from_file.as_deref()) {
        Ok(identifiers) => identifiers,
        Err(PortraitError::IoError(e)) => {
            return Err(e).with_context(|| {
                let path = args
                    .from_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                format!("Failed to read identifiers from {}", path)
            });
        }
        Err(e) => return Err(e.into()),
    };

    info!("🚀 PortraitSync - faculty portrait thumbnails");
    info!("Bucket: {}", args.bucket);
    info!("Identifiers: {}", identifiers.len());
    info!("Output directory: {:?}", args.output);

    let config = SyncConfig {
        bucket: args.bucket,
        output_dir: args.output,
        endpoint: args.endpoint,
        access_token: args.access_token,
        skip_verify: args.skip_verify,
        fail_fast: args.fail_fast,
    };

    let store = GcsClient::new(&config).context("Failed to create storage client")?;
    let summary = sync_portraits(&config, &store, &identifiers).await?;

    for (identifier, message) in &summary.failed {
        error!("{}: {}", identifier, message);
    }
    info!(
        "✅ Done: {} processed, {} skipped, {} failed",
        summary.processed,
        summary.skipped,
        summary.failed.len()
    );

    Ok(summary.is_success())
}
