//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable
//! overrides. The file path defaults to `config.yaml` but can be set via the
//! `-f` flag or `FIGURINE_CONFIG`. Environment variables prefixed with
//! `FIGURINE_` override YAML values; nested fields use double underscores,
//! e.g. `FIGURINE_OUTPUT__BUCKET=models` sets `output.bucket`.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "FIGURINE_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Blob storage backend shared by the input and output buckets
    pub storage: StorageConfig,
    /// Where uploaded images are read from
    pub input: InputConfig,
    /// Where generated models are written to
    pub output: OutputConfig,
    /// Existence poll for freshly uploaded blobs
    pub upload_poll: PollConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            storage: StorageConfig::default(),
            input: InputConfig::default(),
            output: OutputConfig::default(),
            upload_poll: PollConfig::default(),
        }
    }
}

/// Blob storage backend selection.
///
/// Production deployments point at S3-compatible object storage; the
/// filesystem backend exists for local development and tests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StorageConfig {
    /// S3-compatible object storage via the AWS SDK.
    S3 {
        /// Custom endpoint for S3-compatible stores (MinIO, GCS interop).
        /// Omit to use the AWS default resolution.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        endpoint_url: Option<String>,
        /// Region override; omit to use the ambient AWS configuration.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        region: Option<String>,
        /// Use path-style addressing (`endpoint/bucket/key`). Required by
        /// most non-AWS S3 implementations.
        #[serde(default)]
        force_path_style: bool,
    },
    /// Local directory tree, one subdirectory per bucket.
    Filesystem {
        /// Root directory holding the bucket subdirectories.
        root: PathBuf,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            root: PathBuf::from("./data"),
        }
    }
}

/// Input bucket settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Bucket holding client uploads
    pub bucket: String,
    /// Key prefix under which clients upload, without a trailing slash
    pub prefix: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            bucket: "figurine-uploads".to_string(),
            prefix: "uploads".to_string(),
        }
    }
}

impl InputConfig {
    /// Object key for an uploaded image: `{prefix}/{stem}.{extension}`.
    pub fn key(&self, stem: &str, extension: &str) -> String {
        if self.prefix.is_empty() {
            format!("{stem}.{extension}")
        } else {
            format!("{}/{stem}.{extension}", self.prefix)
        }
    }
}

/// Output bucket settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Bucket receiving generated models
    pub bucket: String,
    /// Public base URL under which objects in the output bucket are served,
    /// e.g. "https://storage.example.com/figurine-models"
    pub public_base_url: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            bucket: "figurine-models".to_string(),
            public_base_url: "http://localhost:9000/figurine-models".to_string(),
        }
    }
}

impl OutputConfig {
    /// Public URL for an object key in the output bucket.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), key)
    }
}

/// Bounded existence poll for freshly uploaded blobs (see
/// [`crate::storage::wait_for_blob`]).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollConfig {
    /// Total number of existence checks before giving up
    pub attempts: u32,
    /// Fixed delay between checks
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            attempts: 5,
            interval: Duration::from_secs(2),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(figment::Error::from)?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("FIGURINE_").split("__"))
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), String> {
        if self.input.bucket.is_empty() {
            return Err("Config validation: input.bucket cannot be empty.".to_string());
        }
        if self.output.bucket.is_empty() {
            return Err("Config validation: output.bucket cannot be empty.".to_string());
        }
        if self.upload_poll.attempts == 0 {
            return Err("Config validation: upload_poll.attempts must be at least 1.".to_string());
        }
        if !self.output.public_base_url.starts_with("http://") && !self.output.public_base_url.starts_with("https://") {
            return Err(format!(
                "Config validation: output.public_base_url must be an http(s) URL, got '{}'.",
                self.output.public_base_url
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn args(path: &str) -> Args {
        Args {
            config: path.to_string(),
            validate: false,
        }
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.upload_poll.attempts, 5);
        assert_eq!(config.upload_poll.interval, Duration::from_secs(2));
    }

    #[test]
    fn yaml_and_env_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
                port: 9999
                storage:
                  mode: filesystem
                  root: /var/blobs
                output:
                  bucket: models
                  public_base_url: https://cdn.example.com/models
                upload_poll:
                  attempts: 3
                  interval: 250ms
                "#,
            )?;
            jail.set_env("FIGURINE_PORT", "7777");
            jail.set_env("FIGURINE_INPUT__BUCKET", "incoming");

            let config = Config::load(&args("config.yaml")).expect("config loads");
            assert_eq!(config.port, 7777, "env overrides yaml");
            assert_eq!(config.input.bucket, "incoming");
            assert_eq!(config.output.public_base_url, "https://cdn.example.com/models");
            assert_eq!(config.upload_poll.attempts, 3);
            assert_eq!(config.upload_poll.interval, Duration::from_millis(250));
            match &config.storage {
                StorageConfig::Filesystem { root } => {
                    assert_eq!(root, &PathBuf::from("/var/blobs"));
                }
                other => panic!("expected filesystem storage, got {other:?}"),
            }
            Ok(())
        });
    }

    #[test]
    fn s3_storage_mode_parses() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
                storage:
                  mode: s3
                  endpoint_url: http://minio:9000
                  region: eu-west-2
                  force_path_style: true
                "#,
            )?;

            let config = Config::load(&args("config.yaml")).expect("config loads");
            match &config.storage {
                StorageConfig::S3 {
                    endpoint_url,
                    region,
                    force_path_style,
                } => {
                    assert_eq!(endpoint_url.as_deref(), Some("http://minio:9000"));
                    assert_eq!(region.as_deref(), Some("eu-west-2"));
                    assert!(force_path_style);
                }
                other => panic!("expected s3 storage, got {other:?}"),
            }
            Ok(())
        });
    }

    #[test]
    fn rejects_zero_poll_attempts() {
        let mut config = Config::default();
        config.upload_poll.attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_url_public_base() {
        let mut config = Config::default();
        config.output.public_base_url = "cdn.example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn input_key_joins_prefix() {
        let input = InputConfig::default();
        assert_eq!(input.key("task-1", "png"), "uploads/task-1.png");

        let bare = InputConfig {
            bucket: "b".into(),
            prefix: String::new(),
        };
        assert_eq!(bare.key("task-1", "png"), "task-1.png");
    }

    #[test]
    fn public_url_handles_trailing_slash() {
        let output = OutputConfig {
            bucket: "models".into(),
            public_base_url: "https://cdn.example.com/models/".into(),
        };
        assert_eq!(output.public_url("abc.glb"), "https://cdn.example.com/models/abc.glb");
    }
}
