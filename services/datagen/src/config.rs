use serde::Deserialize;

/// Main configuration for the data generator
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,
    /// Object storage configuration
    pub storage: StorageConfig,
    /// Fake-data API configuration
    #[serde(default)]
    pub api: ApiConfig,
    /// Local generation configuration
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Service name for logging
    #[serde(default = "default_service_name")]
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log output format (json, text)
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

/// MinIO/S3 landing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Endpoint, either `host:port` or a full URL
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    /// Bucket receiving JSON objects
    pub bucket: String,
    /// Bucket receiving Parquet objects
    #[serde(default = "default_columnar_bucket")]
    pub columnar_bucket: String,
    /// Root folder every object key starts with
    #[serde(default = "default_root_folder")]
    pub root_folder: String,
    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,
    /// Force path-style access (required for MinIO)
    #[serde(default = "default_true")]
    pub force_path_style: bool,
}

/// Fake-data API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// Value of the `size` query parameter
    #[serde(default = "default_batch_size")]
    pub size: usize,
}

/// Local record generation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Rows generated per local dataset
    #[serde(default = "default_batch_size")]
    pub rows: usize,
}

/// Storage settings passed explicitly by the caller.
///
/// Any field set here wins over files and environment variables.
#[derive(Debug, Clone, Default)]
pub struct StorageOverrides {
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub bucket: Option<String>,
}

// Default value functions
fn default_service_name() -> String {
    "datagen".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_columnar_bucket() -> String {
    "landing".to_string()
}

fn default_root_folder() -> String {
    "com.owshq.data".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_true() -> bool {
    true
}

fn default_api_base_url() -> String {
    "https://random-data-api.com/api".to_string()
}

fn default_batch_size() -> usize {
    100
}

impl Config {
    /// Load configuration from files and environment
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with(StorageOverrides::default())
    }

    /// Load configuration, letting explicit storage settings win
    pub fn load_with(overrides: StorageOverrides) -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            // Add config file if present
            .add_source(config::File::with_name("config/datagen").required(false))
            .add_source(config::File::with_name("/etc/datagen/datagen").required(false))
            // DATAGEN__STORAGE__BUCKET -> storage.bucket
            .add_source(
                config::Environment::with_prefix("DATAGEN")
                    .separator("__")
                    .try_parsing(true),
            );

        // Plain variables shared with the rest of the landing stack
        let builder = apply_storage_overrides(
            builder,
            StorageOverrides {
                endpoint: std::env::var("ENDPOINT").ok(),
                access_key: std::env::var("ACCESS_KEY").ok(),
                secret_key: std::env::var("SECRET_KEY").ok(),
                bucket: std::env::var("LANDING_BUCKET").ok(),
            },
        )?;
        let builder = apply_storage_overrides(builder, overrides)?;

        builder.build()?.try_deserialize().map_err(Into::into)
    }
}

fn apply_storage_overrides(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    overrides: StorageOverrides,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    builder
        .set_override_option("storage.endpoint", overrides.endpoint)?
        .set_override_option("storage.access_key", overrides.access_key)?
        .set_override_option("storage.secret_key", overrides.secret_key)?
        .set_override_option("storage.bucket", overrides.bucket)
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            size: default_batch_size(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            rows: default_batch_size(),
        }
    }
}
