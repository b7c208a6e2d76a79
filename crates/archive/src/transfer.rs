use crate::fs::{FSRef, TransferFailure};
use crate::source::{Fetch, SourceRef};
use anyhow::Context;
use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tlc_convert::convert;
use tlc_dataset::{DatasetDescriptor, DatasetKind, SchemaRegistry};
use tracing::{debug, error, info, warn};


pub struct Config {
    /// Rows per decoded batch
    pub chunk_size: NonZeroUsize,
    /// Scratch directory for downloaded inputs and converted artifacts
    pub work_dir: PathBuf
}


#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    Pending,
    Downloaded,
    Converted,
    Uploaded,
    CleanedUp
}


impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Pending => "pending",
            Stage::Downloaded => "downloaded",
            Stage::Converted => "converted",
            Stage::Uploaded => "uploaded",
            Stage::CleanedUp => "cleaned-up"
        };
        f.write_str(name)
    }
}


#[derive(Debug)]
pub enum MonthOutcome {
    Uploaded {
        key: String,
        rows: u64
    },
    Skipped {
        status: u16
    },
    Failed {
        /// Last stage reached before the failure
        stage: Stage,
        error: anyhow::Error
    }
}


#[derive(Debug, Default)]
pub struct Report {
    pub outcomes: Vec<(DatasetDescriptor, MonthOutcome)>
}


impl Report {
    pub fn uploaded(&self) -> usize {
        self.count(|o| matches!(o, MonthOutcome::Uploaded { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, MonthOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, MonthOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&MonthOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}


/// Drives dataset-months through download, conversion, upload and cleanup, one at a time.
pub struct Transfer {
    config: Config,
    registry: Arc<SchemaRegistry>,
    source: SourceRef,
    fs: FSRef
}


impl Transfer {
    pub fn new(
        config: Config,
        registry: Arc<SchemaRegistry>,
        source: SourceRef,
        fs: FSRef
    ) -> Self {
        Self {
            config,
            registry,
            source,
            fs
        }
    }

    /// Processes every month of every requested year for each kind.
    ///
    /// Kinds without a schema declaration abort the whole run before anything is fetched.
    /// Failures of individual months are recorded in the report and don't stop the run.
    pub async fn run(&self, kinds: &[DatasetKind], years: &[u16]) -> anyhow::Result<Report> {
        for kind in kinds {
            self.registry.lookup(kind)?;
        }

        let mut report = Report::default();

        for kind in kinds {
            for &year in years {
                for dataset in DatasetDescriptor::months_of(kind, year) {
                    let outcome = self.process(&dataset).await;
                    log_outcome(&dataset, &outcome);
                    report.outcomes.push((dataset, outcome));
                }
            }
        }

        Ok(report)
    }

    pub async fn process(&self, dataset: &DatasetDescriptor) -> MonthOutcome {
        let input = self.config.work_dir.join(dataset.source_file_name());
        let output = self.config.work_dir.join(dataset.artifact_file_name());

        let _cleanup = scopeguard::guard((input.clone(), output.clone()), |(input, output)| {
            remove_local(&input);
            remove_local(&output);
            debug!(dataset = %dataset, stage = %Stage::CleanedUp, "stage reached");
        });

        let mut stage = Stage::Pending;
        match self.transfer(dataset, &input, &output, &mut stage).await {
            Ok(outcome) => outcome,
            Err(error) => MonthOutcome::Failed { stage, error }
        }
    }

    async fn transfer(
        &self,
        dataset: &DatasetDescriptor,
        input: &Path,
        output: &Path,
        stage: &mut Stage
    ) -> anyhow::Result<MonthOutcome> {
        let declaration = self.registry.lookup(dataset.kind())?.clone();

        let bytes = match self.source.fetch(dataset, input).await? {
            Fetch::Downloaded { bytes } => bytes,
            Fetch::Absent { status } => return Ok(MonthOutcome::Skipped { status })
        };
        advance(dataset, stage, Stage::Downloaded);
        info!(dataset = %dataset, bytes, "downloaded");

        let chunk_size = self.config.chunk_size.get();
        let summary = {
            let input = input.to_path_buf();
            let output = output.to_path_buf();
            tokio::task::spawn_blocking(move || {
                convert(&input, &output, &declaration, chunk_size)
            }).await.context("conversion task panicked")??
        };
        advance(dataset, stage, Stage::Converted);
        info!(
            dataset = %dataset,
            rows = summary.rows,
            row_groups = summary.row_groups,
            bytes = summary.bytes,
            "converted to parquet"
        );

        let key = dataset.object_key();
        self.fs.upload(output, &key).await.map_err(|reason| TransferFailure {
            key: key.clone(),
            reason
        })?;
        advance(dataset, stage, Stage::Uploaded);

        Ok(MonthOutcome::Uploaded {
            key,
            rows: summary.rows
        })
    }
}


fn advance(dataset: &DatasetDescriptor, stage: &mut Stage, next: Stage) {
    *stage = next;
    debug!(dataset = %dataset, stage = %next, "stage reached");
}


fn remove_local(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(_) => {},
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {},
        Err(err) => warn!(path = %path.display(), error = %err, "failed to remove local file")
    }
}


fn log_outcome(dataset: &DatasetDescriptor, outcome: &MonthOutcome) {
    match outcome {
        MonthOutcome::Uploaded { key, rows } => {
            info!(dataset = %dataset, key, rows, "uploaded")
        },
        MonthOutcome::Skipped { status } => {
            info!(dataset = %dataset, status, "source is not available, skipping")
        },
        MonthOutcome::Failed { stage, error } => {
            error!(dataset = %dataset, stage = %stage, error = ?error, "transfer failed")
        }
    }
}
