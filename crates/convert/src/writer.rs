use crate::error::SchemaMismatch;
use anyhow::Context;
use arrow::array::RecordBatch;
use arrow::datatypes::{Schema, SchemaRef};
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::PathBuf;


pub fn default_writer_properties() -> anyhow::Result<WriterProperties> {
    let zstd_level = ZstdLevel::try_new(3)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(zstd_level))
        .set_data_page_size_limit(1024 * 1024)
        .set_max_row_group_size(128 * 1024)
        .build();
    Ok(props)
}


#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArtifactSummary {
    pub rows: u64,
    pub row_groups: usize,
    pub bytes: u64
}


struct OpenWriter {
    writer: ArrowWriter<File>,
    schema: SchemaRef
}


/// Single parquet file fed batch by batch.
///
/// The file is created on the first [`append`](ParquetSink::append),
/// which also binds the artifact schema. Every later batch must match it exactly.
pub struct ParquetSink {
    path: PathBuf,
    props: Option<WriterProperties>,
    writer: Option<OpenWriter>,
    rows: u64
}


impl ParquetSink {
    pub fn new(path: impl Into<PathBuf>, props: WriterProperties) -> Self {
        Self {
            path: path.into(),
            props: Some(props),
            writer: None,
            rows: 0
        }
    }

    pub fn num_rows(&self) -> u64 {
        self.rows
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    pub fn schema(&self) -> Option<&SchemaRef> {
        self.writer.as_ref().map(|w| &w.schema)
    }

    fn open(&mut self, schema: SchemaRef) -> anyhow::Result<&mut OpenWriter> {
        let file = File::create(&self.path).with_context(|| {
            format!("failed to create {}", self.path.display())
        })?;
        let writer = ArrowWriter::try_new(file, schema.clone(), self.props.take())?;
        tracing::debug!(path = %self.path.display(), "opened parquet artifact");
        Ok(self.writer.insert(OpenWriter { writer, schema }))
    }

    pub fn append(&mut self, batch: &RecordBatch) -> anyhow::Result<()> {
        match self.writer.as_mut() {
            Some(open) => {
                check_schema(&open.schema, &batch.schema())?;
                open.writer.write(batch)?;
            },
            None => {
                let open = self.open(batch.schema())?;
                open.writer.write(batch)?;
            }
        }
        self.rows += batch.num_rows() as u64;
        Ok(())
    }

    /// Flushes buffered rows, writes the footer and releases the file.
    ///
    /// A sink that never received a batch has no file and reports an empty summary.
    pub fn close(self) -> anyhow::Result<ArtifactSummary> {
        let Some(open) = self.writer else {
            return Ok(ArtifactSummary::default())
        };
        let metadata = open.writer.close().with_context(|| {
            format!("failed to finalize {}", self.path.display())
        })?;
        let bytes = std::fs::metadata(&self.path)?.len();
        Ok(ArtifactSummary {
            rows: metadata.num_rows as u64,
            row_groups: metadata.row_groups.len(),
            bytes
        })
    }
}


fn check_schema(bound: &Schema, found: &Schema) -> Result<(), SchemaMismatch> {
    if bound.fields() == found.fields() {
        return Ok(())
    }

    if bound.fields().len() != found.fields().len() {
        return Err(SchemaMismatch {
            column: "*".to_string(),
            expected: format!("{} columns", bound.fields().len()),
            found: format!("{} columns", found.fields().len())
        })
    }

    for (expected, actual) in bound.fields().iter().zip(found.fields().iter()) {
        if expected != actual {
            return Err(SchemaMismatch {
                column: expected.name().clone(),
                expected: describe_field(expected),
                found: describe_field(actual)
            })
        }
    }

    unreachable!("field lists differ, but no differing field was found")
}


fn describe_field(field: &arrow::datatypes::Field) -> String {
    format!(
        "{} {}{}",
        field.name(),
        field.data_type(),
        if field.is_nullable() { "" } else { " not null" }
    )
}


#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int64Array};
    use arrow::datatypes::{DataType, Field};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use std::sync::Arc;


    fn int_batch(values: Vec<Option<i64>>) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("passenger_count", DataType::Int64, true)
        ]));
        RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(values))]).unwrap()
    }

    fn float_batch(values: Vec<Option<f64>>) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("passenger_count", DataType::Float64, true)
        ]));
        RecordBatch::try_new(schema, vec![Arc::new(Float64Array::from(values))]).unwrap()
    }

    #[test]
    fn appends_batches_into_one_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.parquet");

        let mut sink = ParquetSink::new(&path, default_writer_properties()?);
        assert!(!path.exists());

        sink.append(&int_batch(vec![Some(1), None]))?;
        assert!(sink.is_open());
        sink.append(&int_batch(vec![None, None, Some(3)]))?;
        let summary = sink.close()?;

        assert_eq!(summary.rows, 5);
        assert!(summary.bytes > 0);

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?.build()?;
        let rows: usize = reader.map(|b| b.map(|b| b.num_rows())).sum::<Result<_, _>>()?;
        assert_eq!(rows, 5);
        Ok(())
    }

    #[test]
    fn rejects_batch_with_different_schema() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.parquet");

        let mut sink = ParquetSink::new(&path, default_writer_properties()?);
        assert!(sink.schema().is_none());
        sink.append(&int_batch(vec![Some(1)]))?;

        let err = sink.append(&float_batch(vec![None])).unwrap_err();
        let mismatch = err.downcast_ref::<SchemaMismatch>().unwrap();
        assert_eq!(mismatch.column, "passenger_count");
        assert_eq!(mismatch.expected, "passenger_count Int64");
        assert_eq!(mismatch.found, "passenger_count Float64");

        let bound = sink.schema().unwrap();
        assert_eq!(bound.field(0).data_type(), &DataType::Int64);

        let summary = sink.close()?;
        assert_eq!(summary.rows, 1);
        Ok(())
    }

    #[test]
    fn closing_unopened_sink_creates_nothing() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.parquet");

        let sink = ParquetSink::new(&path, default_writer_properties()?);
        assert_eq!(sink.close()?, ArtifactSummary::default());
        assert!(!path.exists());
        Ok(())
    }
}
