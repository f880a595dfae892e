//! Configuration loaded from the environment (and `.env` when present).

use std::env;
use std::path::PathBuf;

use crate::constants::{DEFAULT_MAX_UPLOAD_SIZE_MB, DEFAULT_PORT, DEFAULT_VIDEOS_FILE};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set. Provide it in the environment or in a .env file.")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Listener settings shared by both binaries.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port = parse_var("PORT", DEFAULT_PORT)?;
        let max_upload_mb = parse_var("MAX_UPLOAD_SIZE_MB", DEFAULT_MAX_UPLOAD_SIZE_MB)?;

        Ok(Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            max_upload_bytes: megabytes_to_bytes(max_upload_mb)?,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// Digest used for Cloudinary request signatures
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Sha1,
    #[default]
    Sha256,
}

impl SignatureAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha1 => "sha1",
            SignatureAlgorithm::Sha256 => "sha256",
        }
    }
}

impl std::str::FromStr for SignatureAlgorithm {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" => Ok(SignatureAlgorithm::Sha1),
            "sha256" => Ok(SignatureAlgorithm::Sha256),
            _ => Err(()),
        }
    }
}

/// Cloudinary account credentials
#[derive(Clone, Debug)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub signature_algorithm: SignatureAlgorithm,
}

/// Configuration for the Postgres + Cloudinary deployment.
#[derive(Clone, Debug)]
pub struct CloudConfig {
    pub server: ServerConfig,
    pub database_url: String,
    pub cloudinary: CloudinaryConfig,
    /// Base used for `deleteLink`; derived from the Host header when unset
    pub public_base_url: Option<String>,
}

impl CloudConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let server = ServerConfig::from_env()?;

        Ok(Self {
            server,
            database_url: required("DATABASE_URL")?,
            cloudinary: CloudinaryConfig {
                cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
                api_key: required("CLOUDINARY_API_KEY")?,
                api_secret: required("CLOUDINARY_API_SECRET")?,
                signature_algorithm: parse_var(
                    "CLOUDINARY_SIGNATURE_ALGORITHM",
                    SignatureAlgorithm::default(),
                )?,
            },
            public_base_url: env::var("PUBLIC_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        })
    }
}

/// Configuration for the JSON-file deployment.
#[derive(Clone, Debug)]
pub struct LocalConfig {
    pub server: ServerConfig,
    pub videos_file: PathBuf,
}

impl LocalConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let server = ServerConfig::from_env()?;

        Ok(Self {
            server,
            videos_file: env::var("VIDEOS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_VIDEOS_FILE)),
        })
    }
}

fn megabytes_to_bytes(mb: usize) -> Result<usize, ConfigError> {
    mb.checked_mul(1024 * 1024).ok_or(ConfigError::Invalid {
        name: "MAX_UPLOAD_SIZE_MB",
        value: mb.to_string(),
    })
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
