use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use color_eyre::eyre::{bail, eyre, Context, Result};
use serde::Deserialize;

pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct TomlDatabase {
    path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct TomlStorage {
    backend: Option<String>,
    bucket: Option<String>,
    region: Option<String>,
    public_read: Option<bool>,
    root: Option<String>,
    public_base_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct TomlConfig {
    address: Option<String>,
    port: Option<u16>,
    max_upload_size: Option<String>,
    #[serde(rename = "Database")]
    database: Option<TomlDatabase>,
    #[serde(rename = "Storage")]
    storage: Option<TomlStorage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub public_read: bool,
    pub public_base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStorageConfig {
    pub root: PathBuf,
    pub public_base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    S3(S3Config),
    Local(LocalStorageConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub address: Option<String>,
    pub port: Option<u16>,
    pub max_upload_size: u64,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
}

/// Reads the config file at `path` and applies overrides from the environment.
/// Relative paths in the file are resolved against the file's directory.
pub async fn read_config(path: &Path) -> Result<Config> {
    let toml_str = tokio::fs::read_to_string(path)
        .await
        .context(format!("Error reading config file {}", path))?;
    let config_dir = path.parent().unwrap_or(Path::new("."));
    parse_config(&toml_str, config_dir, |key| std::env::var(key).ok())
}

/// Config built only from environment variables, relative to the working directory.
pub fn config_from_env() -> Result<Config> {
    resolve_config(TomlConfig::default(), Path::new("."), |key| {
        std::env::var(key).ok()
    })
}

pub fn parse_config(
    toml_str: &str,
    config_dir: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Config> {
    let toml_config: TomlConfig = toml::from_str(toml_str).context("Error parsing config file")?;
    resolve_config(toml_config, config_dir, env)
}

fn resolve_path(config_dir: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        config_dir.join(path)
    }
}

fn resolve_config(
    toml_config: TomlConfig,
    config_dir: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Config> {
    let max_upload_size = match &toml_config.max_upload_size {
        Some(size) => parse_size::parse_size(size)
            .map_err(|err| eyre!("invalid max_upload_size '{}': {}", size, err))?,
        None => DEFAULT_MAX_UPLOAD_SIZE,
    };

    let database = {
        let db_path = env("DB_URL")
            .map(|url| url.trim_start_matches("sqlite://").to_owned())
            .or(toml_config.database.and_then(|db| db.path))
            .unwrap_or_else(|| "trackbox.db".to_owned());
        DatabaseConfig {
            path: resolve_path(config_dir, &db_path),
        }
    };

    let toml_storage = toml_config.storage.unwrap_or_default();
    let bucket = env("AWS_BUCKET_NAME").or(toml_storage.bucket);
    let region = env("AWS_REGION").or(toml_storage.region);
    let backend = match toml_storage.backend.as_deref() {
        Some(backend) => backend.to_owned(),
        None if bucket.is_some() => "s3".to_owned(),
        None => "local".to_owned(),
    };
    let storage = match backend.as_str() {
        "s3" => StorageConfig::S3(S3Config {
            bucket: bucket.ok_or(eyre!("S3 storage requires a bucket name"))?,
            region: region.ok_or(eyre!("S3 storage requires a region"))?,
            public_read: toml_storage.public_read.unwrap_or(true),
            public_base_url: toml_storage.public_base_url,
        }),
        "local" => StorageConfig::Local(LocalStorageConfig {
            root: resolve_path(
                config_dir,
                toml_storage.root.as_deref().unwrap_or("uploads"),
            ),
            public_base_url: toml_storage.public_base_url,
        }),
        other => bail!("unknown storage backend '{}'", other),
    };

    Ok(Config {
        address: toml_config.address,
        port: toml_config.port,
        max_upload_size,
        database,
        storage,
    })
}
