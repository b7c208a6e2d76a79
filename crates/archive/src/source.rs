use anyhow::Context;
use async_trait::async_trait;
use futures::TryStreamExt;
use std::path::Path;
use std::pin::pin;
use std::sync::Arc;
use tlc_dataset::DatasetDescriptor;
use tokio::io::AsyncWriteExt;
use url::Url;


pub const TRIPDATA_BASE_URL: &str = "https://github.com/DataTalksClub/nyc-tlc-data/releases/download/";


#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Fetch {
    Downloaded {
        bytes: u64
    },
    /// The month is not published (yet). Nothing is written to disk.
    Absent {
        status: u16
    }
}


pub type SourceRef = Arc<dyn Source + Sync + Send>;


#[async_trait]
pub trait Source {
    async fn fetch(&self, dataset: &DatasetDescriptor, dest: &Path) -> anyhow::Result<Fetch>;
}


pub struct HttpSource {
    client: reqwest::Client,
    base_url: Url
}


impl HttpSource {
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            client: reqwest::Client::new(),
            base_url
        }
    }

    pub fn url(&self, dataset: &DatasetDescriptor) -> anyhow::Result<Url> {
        let url = self.base_url.join(&dataset.source_path())?;
        Ok(url)
    }
}


#[async_trait]
impl Source for HttpSource {
    async fn fetch(&self, dataset: &DatasetDescriptor, dest: &Path) -> anyhow::Result<Fetch> {
        let url = self.url(dataset)?;
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Ok(Fetch::Absent {
                status: status.as_u16()
            })
        }

        let mut file = tokio::fs::File::create(dest).await.with_context(|| {
            format!("failed to create {}", dest.display())
        })?;

        let mut body = pin!(response.bytes_stream());
        let mut bytes = 0;
        while let Some(data) = body.try_next().await.with_context(|| {
            format!("failed to download {}", url)
        })? {
            file.write_all(&data).await?;
            bytes += data.len() as u64;
        }
        file.flush().await?;

        Ok(Fetch::Downloaded { bytes })
    }
}
