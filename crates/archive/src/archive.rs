use crate::cli::Cli;
use crate::fs::create_fs;
use crate::source::{HttpSource, TRIPDATA_BASE_URL};
use crate::transfer::{Config, Transfer};
use anyhow::{ensure, Context};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tlc_dataset::{DatasetKind, SchemaRegistry};
use url::Url;


pub async fn run(args: &Cli) -> anyhow::Result<()> {
    let chunk_size = usize::try_from(args.chunk_size)
        .ok()
        .and_then(NonZeroUsize::new)
        .context("invalid --chunk-size")?;

    let fs = create_fs(&args.bucket).await?;
    let source = HttpSource::new(Url::parse(TRIPDATA_BASE_URL)?);

    let work_dir = tempfile::Builder::new()
        .prefix("tripdata-")
        .tempdir()
        .context("failed to create work dir")?;

    let config = Config {
        chunk_size,
        work_dir: work_dir.path().to_path_buf()
    };

    let kinds: Vec<DatasetKind> = args.kinds.iter().map(DatasetKind::new).collect();

    let transfer = Transfer::new(
        config,
        Arc::new(SchemaRegistry::default()),
        Arc::new(source),
        fs
    );

    let report = transfer.run(&kinds, &args.years).await?;

    tracing::info!(
        uploaded = report.uploaded(),
        skipped = report.skipped(),
        failed = report.failed(),
        "all done"
    );

    ensure!(
        report.failed() == 0,
        "{} of {} dataset-months failed",
        report.failed(),
        report.outcomes.len()
    );

    Ok(())
}
