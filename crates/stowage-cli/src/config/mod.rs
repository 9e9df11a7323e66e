//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── bucket: BucketConfig            # Namespace, bucket, prefix
//! ├── credentials: CredentialsConfig  # Profile or explicit keys
//! ├── load: LoadConfig                # Cap, metadata keys, error policy
//! ├── output                          # JSONL destination
//! └── log_level                       # Fallback when RUST_LOG is unset
//! ```
//!
//! All configuration can be provided via CLI arguments or environment
//! variables. Use `--help` to see all available options.

mod credentials;

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Args, Parser};
pub use credentials::CredentialsConfig;
use stowage_loader::{LoaderConfig, ObjectErrorPolicy};

use crate::TRACING_TARGET_CONFIG;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "stowage")]
#[command(about = "Load object-storage buckets as documents")]
#[command(version)]
pub struct Cli {
    /// Bucket to load.
    #[clap(flatten)]
    pub bucket: BucketConfig,

    /// Storage credentials.
    #[clap(flatten)]
    pub credentials: CredentialsConfig,

    /// Load limits and policies.
    #[clap(flatten)]
    pub load: LoadConfig,

    /// Write documents to this file instead of stdout.
    #[arg(short, long, env = "STOWAGE_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, env = "STOWAGE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Bucket coordinates and prefix.
#[derive(Debug, Clone, Args)]
pub struct BucketConfig {
    /// Object storage namespace.
    #[arg(long, env = "STOWAGE_NAMESPACE")]
    pub namespace: String,

    /// Bucket name.
    #[arg(long, env = "STOWAGE_BUCKET")]
    pub bucket: String,

    /// Only load objects whose names start with this prefix.
    #[arg(long, env = "STOWAGE_PREFIX", default_value = "")]
    pub prefix: String,
}

/// Load limits and policies.
#[derive(Debug, Clone, Args)]
pub struct LoadConfig {
    /// Stop after this many objects.
    #[arg(long, env = "STOWAGE_MAX_OBJECTS")]
    pub max_objects: Option<usize>,

    /// Object field copied into document metadata (repeatable).
    #[arg(long = "metadata-key", env = "STOWAGE_METADATA_KEYS", value_delimiter = ',')]
    pub metadata_keys: Vec<String>,

    /// Log and skip objects that cannot be fetched or parsed.
    #[arg(long, env = "STOWAGE_SKIP_FAILED")]
    pub skip_failed: bool,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Builds the loader configuration.
    pub fn loader_config(&self) -> anyhow::Result<LoaderConfig> {
        let mut builder = LoaderConfig::builder(&self.bucket.namespace, &self.bucket.bucket)
            .context("invalid bucket configuration")?
            .prefix(&self.bucket.prefix)
            .credentials(self.credentials.to_credentials())
            .metadata_keys(&self.load.metadata_keys);

        if let Some(max_objects) = self.load.max_objects {
            builder = builder.max_objects(max_objects);
        }
        if self.load.skip_failed {
            builder = builder.on_object_error(ObjectErrorPolicy::Skip);
        }

        Ok(builder.build())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            "Build information"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            namespace = %self.bucket.namespace,
            bucket = %self.bucket.bucket,
            prefix = %self.bucket.prefix,
            credentials = self.credentials.source(),
            max_objects = ?self.load.max_objects,
            metadata_keys = ?self.load.metadata_keys,
            skip_failed = self.load.skip_failed,
            output = ?self.output,
            "Loader configuration"
        );
    }
}
