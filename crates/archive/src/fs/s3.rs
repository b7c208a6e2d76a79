use crate::fs::Fs;
use anyhow::{ensure, Context};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use std::path::Path;


pub struct S3Fs {
    client: aws_sdk_s3::Client,
    bucket: String,
    prefix: String
}


impl S3Fs {
    pub fn new(
        s3_client: aws_sdk_s3::Client,
        bucket: String,
        prefix: String
    ) -> Self {
        Self {
            client: s3_client,
            bucket,
            prefix
        }
    }

    fn object_key(&self, key: &str) -> anyhow::Result<String> {
        let key = key.trim_start_matches('/');
        ensure!(!key.is_empty(), "object key is empty");
        if self.prefix.is_empty() {
            Ok(key.to_string())
        } else {
            Ok(format!("{}/{}", self.prefix, key))
        }
    }
}


#[async_trait]
impl Fs for S3Fs {
    async fn upload(&self, local_src: &Path, key: &str) -> anyhow::Result<()> {
        let object_key = self.object_key(key)?;
        let byte_stream = ByteStream::from_path(local_src).await.with_context(|| {
            format!("failed to open {}", local_src.display())
        })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .body(byte_stream)
            .key(&object_key)
            .send()
            .await
            .with_context(|| {
                format!("failed to put s3://{}/{}", self.bucket, object_key)
            })?;

        Ok(())
    }
}
