use crate::fs::local::LocalFs;
use crate::fs::s3::S3Fs;
use anyhow::{anyhow, ensure};
use async_trait::async_trait;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::Arc;
use url::Url;


pub mod local;
pub mod s3;


pub type FSRef = Arc<dyn Fs + Sync + Send>;


/// Object storage the converted artifacts are uploaded to
#[async_trait]
pub trait Fs {
    async fn upload(&self, local_src: &Path, key: &str) -> anyhow::Result<()>;
}


#[derive(Debug)]
pub struct TransferFailure {
    pub key: String,
    pub reason: anyhow::Error
}


impl Display for TransferFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to upload {}: {:#}", self.key, self.reason)
    }
}


impl std::error::Error for TransferFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let reason: &(dyn std::error::Error + 'static) = self.reason.as_ref();
        Some(reason)
    }
}


/// Creates a storage handle from either an `s3://bucket/prefix` URL or a local directory
pub async fn create_fs(dest: &str) -> anyhow::Result<FSRef> {
    match Url::parse(dest) {
        Ok(u) => {
            ensure!(u.scheme() == "s3", "unsupported protocol - {}", u.scheme());
            ensure!(!u.cannot_be_a_base(), "invalid s3 url - {}", dest);

            let bucket = u.host_str().ok_or_else(|| {
                anyhow!("bucket is missing in {}", dest)
            })?;

            let prefix = u.path().trim_matches('/');

            let mut config_loader = aws_config::from_env();
            if let Ok(s3_endpoint) = std::env::var("AWS_S3_ENDPOINT") {
                config_loader = config_loader.endpoint_url(s3_endpoint);
            }
            let config = config_loader.load().await;

            let s3_client = aws_sdk_s3::Client::new(&config);
            let fs = S3Fs::new(s3_client, bucket.to_string(), prefix.to_string());
            Ok(Arc::new(fs))
        }
        Err(_) => Ok(Arc::new(LocalFs::new(dest)))
    }
}
