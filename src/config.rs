use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use std::{env, path::PathBuf, str::FromStr};

use crate::services::s3_store::S3Settings;

/// Which object store backs the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// A local directory of image files.
    Local,
    /// An S3-compatible bucket (S3, R2, MinIO, ...).
    S3,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "s3" => Ok(Self::S3),
            other => bail!("unknown backend `{}` (expected `local` or `s3`)", other),
        }
    }
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: Backend,
    pub storage_dir: PathBuf,
    pub static_dir: PathBuf,
    /// Present only when `backend` is `S3`.
    pub s3: Option<S3Settings>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Range-capable disk image catalog server")]
pub struct Args {
    /// Host to bind to (overrides ISO_SHELF_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides ISO_SHELF_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Object store backend (overrides ISO_SHELF_BACKEND)
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// Directory holding images for the local backend (overrides ISO_SHELF_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<PathBuf>,

    /// Directory of static assets served for non-API paths (overrides ISO_SHELF_STATIC_DIR)
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Bucket name for the s3 backend (overrides ISO_SHELF_S3_BUCKET)
    #[arg(long)]
    pub s3_bucket: Option<String>,

    /// Custom S3 endpoint URL (overrides ISO_SHELF_S3_ENDPOINT)
    #[arg(long)]
    pub s3_endpoint: Option<String>,

    /// S3 region (overrides ISO_SHELF_S3_REGION)
    #[arg(long)]
    pub s3_region: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::resolve(Args::parse(), |key| env::var(key).ok())
    }

    /// Merge parsed CLI args over values looked up with `env`, then defaults.
    pub fn resolve(args: Args, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match args.port {
            Some(port) => port,
            None => match env("ISO_SHELF_PORT") {
                Some(value) => value
                    .parse::<u16>()
                    .with_context(|| format!("parsing ISO_SHELF_PORT value `{}`", value))?,
                None => 8787,
            },
        };

        let backend = match args.backend {
            Some(backend) => backend,
            None => match env("ISO_SHELF_BACKEND") {
                Some(value) => value.parse().context("parsing ISO_SHELF_BACKEND")?,
                None => Backend::Local,
            },
        };

        let s3 = match backend {
            Backend::Local => None,
            Backend::S3 => {
                let bucket = args
                    .s3_bucket
                    .or_else(|| env("ISO_SHELF_S3_BUCKET"))
                    .context("the s3 backend requires ISO_SHELF_S3_BUCKET or --s3-bucket")?;
                Some(S3Settings {
                    bucket,
                    endpoint: args.s3_endpoint.or_else(|| env("ISO_SHELF_S3_ENDPOINT")),
                    region: args
                        .s3_region
                        .or_else(|| env("ISO_SHELF_S3_REGION"))
                        .unwrap_or_else(|| "auto".into()),
                })
            }
        };

        Ok(Self {
            host: args
                .host
                .or_else(|| env("ISO_SHELF_HOST"))
                .unwrap_or_else(|| "0.0.0.0".into()),
            port,
            backend,
            storage_dir: args
                .storage_dir
                .or_else(|| env("ISO_SHELF_STORAGE_DIR").map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("./data/isos")),
            static_dir: args
                .static_dir
                .or_else(|| env("ISO_SHELF_STATIC_DIR").map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("./public")),
            s3,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
