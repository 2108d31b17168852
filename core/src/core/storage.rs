use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{primitives::ByteStream, types::ObjectCannedAcl};
use camino::Utf8PathBuf as PathBuf;
use enum_dispatch::enum_dispatch;
use rand::{distr::Alphanumeric, Rng};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, Instrument};

use crate::{
    config::{S3Config, StorageConfig},
    model::Upload,
};

/// Length of the random part of generated object keys
pub const KEY_TOKEN_LEN: usize = 10;

/// Object store for uploaded files.
/// Every object has a `key` used to store and address it, and is reachable
/// by clients under the URL returned by `public_url`.
#[async_trait]
#[enum_dispatch(Storage)]
pub trait StorageProvider: Clone {
    async fn put(&self, key: &str, upload: &Upload) -> Result<(), StorageError>;
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
    fn public_url(&self, key: &str) -> String;
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("error uploading object '{key}'")]
    Upload {
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("error deleting object '{key}'")]
    Delete {
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

/// Random alphanumeric token followed by the extension of `original_name`.
/// A name without a dot is used whole as the extension.
pub fn object_key(original_name: &str) -> String {
    let ext = original_name.rsplit('.').next().unwrap_or(original_name);
    let token: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_TOKEN_LEN)
        .map(char::from)
        .collect();
    format!("{}.{}", token, ext)
}

#[enum_dispatch]
pub enum Storage {
    S3Storage,
    LocalFileStorage,
}

impl Clone for Storage {
    fn clone(&self) -> Self {
        match self {
            Self::S3Storage(a) => Self::S3Storage(a.clone()),
            Self::LocalFileStorage(a) => Self::LocalFileStorage(a.clone()),
        }
    }
}

impl Storage {
    pub async fn from_config(config: &StorageConfig) -> Storage {
        match config {
            StorageConfig::S3(s3) => S3Storage::from_config(s3).await.into(),
            StorageConfig::Local(local) => {
                LocalFileStorage::new(local.root.clone(), local.public_base_url.clone()).into()
            }
        }
    }

    /// Stores `upload` under a freshly generated key. Not retried on failure.
    #[instrument(skip(self), level = "debug")]
    pub async fn upload(&self, upload: &Upload) -> Result<StoredObject, StorageError> {
        let key = object_key(&upload.original_name);
        self.put(&key, upload).in_current_span().await?;
        let url = self.public_url(&key);
        debug!(%key, %url, "stored upload");
        Ok(StoredObject { key, url })
    }
}

#[derive(Debug, Clone)]
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
    public_read: bool,
}

impl S3Storage {
    /// Credentials are picked up by the default AWS provider chain
    /// (`AWS_ACCESS_KEY_ID`/`AWS_SECRET_ACCESS_KEY` and friends).
    pub async fn from_config(config: &S3Config) -> S3Storage {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;
        let client = aws_sdk_s3::Client::new(&sdk_config);
        S3Storage::new(client, config)
    }

    pub fn new(client: aws_sdk_s3::Client, config: &S3Config) -> S3Storage {
        let public_base_url = config.public_base_url.clone().unwrap_or_else(|| {
            format!(
                "https://{}.s3.{}.amazonaws.com",
                config.bucket, config.region
            )
        });
        S3Storage {
            client,
            bucket: config.bucket.clone(),
            public_base_url,
            public_read: config.public_read,
        }
    }
}

#[async_trait]
impl StorageProvider for S3Storage {
    #[instrument(skip(self, upload), level = "debug")]
    async fn put(&self, key: &str, upload: &Upload) -> Result<(), StorageError> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(&upload.mime_type)
            .body(ByteStream::from(upload.bytes.clone()));
        if self.public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }
        request
            .send()
            .in_current_span()
            .await
            .map_err(|err| StorageError::Upload {
                key: key.to_owned(),
                source: err.into(),
            })?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .in_current_span()
            .await
            .map_err(|err| StorageError::Delete {
                key: key.to_owned(),
                source: err.into(),
            })?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        join_url(&self.public_base_url, key)
    }
}

/// Stores objects as files in a local directory.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
    public_base_url: Option<String>,
}

impl LocalFileStorage {
    pub fn new(root: PathBuf, public_base_url: Option<String>) -> LocalFileStorage {
        LocalFileStorage {
            root,
            public_base_url,
        }
    }

    pub fn root(&self) -> &camino::Utf8Path {
        &self.root
    }
}

#[async_trait]
impl StorageProvider for LocalFileStorage {
    #[instrument(skip(self, upload), level = "debug")]
    async fn put(&self, key: &str, upload: &Upload) -> Result<(), StorageError> {
        let path = self.root.join(key);
        let write = async {
            tokio::fs::create_dir_all(&self.root).await?;
            let mut file = tokio::fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&path)
                .await?;
            file.write_all(&upload.bytes).await?;
            file.flush().await
        };
        write
            .in_current_span()
            .await
            .map_err(|err| StorageError::Upload {
                key: key.to_owned(),
                source: err.into(),
            })
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.root.join(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Delete {
                key: key.to_owned(),
                source: err.into(),
            }),
        }
    }

    fn public_url(&self, key: &str) -> String {
        match &self.public_base_url {
            Some(base) => join_url(base, key),
            None => format!("file://{}", self.root.join(key)),
        }
    }
}

fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use claims::assert_ok;
    use pretty_assertions::assert_eq;

    use super::*;

    fn upload(original_name: &str) -> Upload {
        Upload {
            bytes: Bytes::from_static(b"ID3 not really an mp3"),
            original_name: original_name.to_owned(),
            mime_type: "audio/mpeg".to_owned(),
        }
    }

    #[test]
    fn key_keeps_extension() {
        let key = object_key("My Song.final.mp3");
        let (token, ext) = key.split_once('.').unwrap();
        assert_eq!(token.len(), KEY_TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(ext, "mp3");
    }

    #[test]
    fn key_for_name_without_dot() {
        let key = object_key("track");
        assert_eq!(&key[KEY_TOKEN_LEN..], ".track");
    }

    #[test]
    fn keys_are_random() {
        assert_ne!(object_key("a.mp3"), object_key("a.mp3"));
    }

    #[tokio::test]
    async fn local_upload_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let root = PathBuf::from_path_buf(dir.path().join("uploads")).unwrap();
        let storage: Storage =
            LocalFileStorage::new(root.clone(), Some("http://localhost:3000/uploads/".into()))
                .into();
        let stored = assert_ok!(storage.upload(&upload("song.ogg")).await);
        assert!(stored.key.ends_with(".ogg"));
        assert_eq!(
            stored.url,
            format!("http://localhost:3000/uploads/{}", stored.key)
        );
        let contents = tokio::fs::read(root.join(&stored.key)).await.unwrap();
        assert_eq!(contents, b"ID3 not really an mp3");

        assert_ok!(storage.delete(&stored.key).await);
        assert!(!root.join(&stored.key).exists());
        // deleting twice is fine
        assert_ok!(storage.delete(&stored.key).await);
    }

    #[test]
    fn local_url_without_base_is_file_url() {
        let storage = LocalFileStorage::new(PathBuf::from("/srv/uploads"), None);
        assert_eq!(
            storage.public_url("abc.mp3"),
            "file:///srv/uploads/abc.mp3"
        );
    }
}
