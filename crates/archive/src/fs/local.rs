use crate::fs::Fs;
use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};


/// Directory standing in for a bucket, object keys become relative paths
pub struct LocalFs {
    root: PathBuf,
}


impl LocalFs {
    pub fn new(root: impl Into<PathBuf>) -> LocalFs {
        Self { root: root.into() }
    }
}


#[async_trait]
impl Fs for LocalFs {
    async fn upload(&self, local_src: &Path, key: &str) -> anyhow::Result<()> {
        let dest = self.root.join(key);
        if let Some(dir) = dest.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::copy(local_src, &dest).await.with_context(|| {
            format!("failed to copy {} to {}", local_src.display(), dest.display())
        })?;
        Ok(())
    }
}
