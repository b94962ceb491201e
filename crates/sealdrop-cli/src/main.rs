//! sealdrop: end-to-end encrypted file sharing CLI
//!
//! Commands:
//!   upload <file>         - encrypt, chunk, and upload; registers the share
//!                           and writes the share descriptor JSON
//!   download <descriptor> - stream a share back to disk from its descriptor
//!   config show           - display the merged configuration
//!
//! The share descriptor contains the decryption key and is the only way to
//! recover the file; it never reaches the broker.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use sealdrop_core::config::ShareConfig;
use sealdrop_core::types::{FileReference, SecretFile};
use sealdrop_crypto::{MasterKey, SenderIdentity};
use sealdrop_transfer::{
    download_file, upload_file, BrokerClient, ChunkPlan, ChunkSource, ChunkTransport,
    CreateSecretRequest, FileSource, ProgressFn, RetryPolicy, UploadOptions,
};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "sealdrop",
    version,
    about = "End-to-end encrypted file sharing",
    long_about = "sealdrop: encrypt and chunk files client-side, upload them to \
                  content-addressed storage, and share a descriptor that only the \
                  recipient can use to reassemble them"
)]
struct Cli {
    /// Path to sealdrop.toml configuration file
    #[arg(long, short = 'c', env = "SEALDROP_CONFIG", default_value = "sealdrop.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt and upload a file, registering a new share
    Upload {
        /// Local file to share
        file: PathBuf,
        /// Bucket override (default: from config)
        #[arg(long, short = 'b')]
        bucket: Option<String>,
        /// Alias for the share (default: random)
        #[arg(long)]
        alias: Option<String>,
        /// Where to write the share descriptor (default: <file>.share.json)
        #[arg(long)]
        descriptor: Option<PathBuf>,
    },

    /// Download a share from its descriptor
    Download {
        /// Share descriptor JSON written by `upload`
        descriptor: PathBuf,
        /// Destination path (default: the original file name)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

// ── Entry point ────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    init_tracing(&config.log_level);

    match cli.command {
        Commands::Upload {
            file,
            bucket,
            alias,
            descriptor,
        } => cmd_upload(&config, &file, bucket, alias, descriptor).await,
        Commands::Download { descriptor, output } => {
            cmd_download(&config, &descriptor, output).await
        }
        Commands::Config {
            action: ConfigAction::Show,
        } => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn load_config(path: &Path) -> Result<ShareConfig> {
    if path.exists() {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config: {}", path.display()))
    } else {
        Ok(ShareConfig::default())
    }
}

fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_transport(config: &ShareConfig) -> Result<ChunkTransport> {
    let broker = BrokerClient::new(
        &config.broker.base_url,
        Duration::from_secs(config.broker.timeout_secs),
        RetryPolicy::with_max_attempts(config.broker.max_retries),
    )?;
    Ok(ChunkTransport::new(broker))
}

fn percent_bar() -> Result<ProgressBar> {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
            .context("progress bar template")?,
    );
    Ok(bar)
}

fn bar_sink(bar: &ProgressBar) -> ProgressFn {
    let bar = bar.clone();
    Box::new(move |fraction| bar.set_position((fraction * 100.0).round() as u64))
}

// ── Commands ───────────────────────────────────────────────────────────────────

async fn cmd_upload(
    config: &ShareConfig,
    file: &Path,
    bucket: Option<String>,
    alias: Option<String>,
    descriptor: Option<PathBuf>,
) -> Result<()> {
    let source = FileSource::open(file).await?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("file has no name")?;

    let transport = build_transport(config)?;
    let master_key = MasterKey::generate();
    let identity = SenderIdentity::generate();
    let mut options = UploadOptions::from_config(config);
    if let Some(bucket) = bucket {
        options.bucket = bucket;
    }

    let bar = percent_bar()?;
    bar.set_message(name.clone());
    let chunks = upload_file(
        &transport,
        &source,
        &master_key,
        &identity,
        &options,
        Some(bar_sink(&bar)),
        &CancellationToken::new(),
    )
    .await?;
    bar.finish_with_message("uploaded");

    let plan = ChunkPlan::new(source.len(), options.chunk_size)?;
    let meta = plan.file_meta(&name, "application/octet-stream");
    let reference = FileReference {
        bucket: options.bucket.clone(),
        chunks,
    };
    let alias = alias.unwrap_or_else(|| Uuid::new_v4().simple().to_string());

    transport
        .broker()
        .create_secret(&CreateSecretRequest {
            alias: alias.clone(),
            public_key: identity.public_key_base64(),
            file_meta: serde_json::to_string(&meta)?,
            file_reference: serde_json::to_string(&reference)?,
            file_size: meta.size,
        })
        .await
        .context("registering share record")?;

    let secret = SecretFile {
        meta,
        reference,
        alias: alias.clone(),
        decryption_key: master_key.to_base64(),
    };
    let descriptor = descriptor.unwrap_or_else(|| file.with_extension("share.json"));
    std::fs::write(&descriptor, serde_json::to_string_pretty(&secret)?)
        .with_context(|| format!("writing descriptor: {}", descriptor.display()))?;

    println!("share registered under alias {alias}");
    println!(
        "descriptor written to {} - it holds the decryption key, share it only with the recipient",
        descriptor.display()
    );
    Ok(())
}

async fn cmd_download(
    config: &ShareConfig,
    descriptor: &Path,
    output: Option<PathBuf>,
) -> Result<()> {
    let raw = std::fs::read_to_string(descriptor)
        .with_context(|| format!("reading descriptor: {}", descriptor.display()))?;
    let secret: SecretFile =
        serde_json::from_str(&raw).context("parsing share descriptor")?;

    let destination = output.unwrap_or_else(|| PathBuf::from(&secret.meta.name));
    let transport = build_transport(config)?;

    let bar = percent_bar()?;
    bar.set_message(secret.meta.name.clone());
    let mut stream = download_file(
        transport,
        secret.clone(),
        Some(bar_sink(&bar)),
        CancellationToken::new(),
    );

    let mut file = tokio::fs::File::create(&destination)
        .await
        .with_context(|| format!("creating output file: {}", destination.display()))?;
    while let Some(item) = stream.next().await {
        let bytes = item?;
        file.write_all(&bytes).await?;
    }
    file.flush().await?;
    bar.finish_with_message("done");

    println!(
        "wrote {} ({} bytes)",
        destination.display(),
        secret.meta.size
    );
    Ok(())
}
