use crate::reader::read_chunks;
use crate::schema::to_arrow_schema;
use crate::writer::{default_writer_properties, ArtifactSummary, ParquetSink};
use arrow::array::RecordBatch;
use scopeguard::ScopeGuard;
use std::path::Path;
use tlc_dataset::SchemaDeclaration;
use tracing::{debug, warn};


/// Converts a gzipped CSV file into a single parquet artifact at `dest`.
///
/// The artifact schema always equals `declaration`. On any failure the sink is still
/// closed, and the partially written file is removed before returning the error.
pub fn convert(
    src: &Path,
    dest: &Path,
    declaration: &SchemaDeclaration,
    chunk_size: usize
) -> anyhow::Result<ArtifactSummary> {
    let chunks = read_chunks(src, declaration, chunk_size)?;
    write_artifact(chunks, dest, declaration)
}


fn write_artifact(
    chunks: impl IntoIterator<Item = anyhow::Result<RecordBatch>>,
    dest: &Path,
    declaration: &SchemaDeclaration
) -> anyhow::Result<ArtifactSummary> {
    let mut sink = ParquetSink::new(dest, default_writer_properties()?);

    let artifact = scopeguard::guard(dest, |dest| {
        match std::fs::remove_file(dest) {
            Ok(_) => debug!(path = %dest.display(), "removed incomplete artifact"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {},
            Err(err) => warn!(path = %dest.display(), error = %err, "failed to remove incomplete artifact")
        }
    });

    let written = write_chunks(chunks, &mut sink, declaration);
    let closed = sink.close();
    written?;
    let summary = closed?;

    ScopeGuard::into_inner(artifact);
    Ok(summary)
}


fn write_chunks(
    chunks: impl IntoIterator<Item = anyhow::Result<RecordBatch>>,
    sink: &mut ParquetSink,
    declaration: &SchemaDeclaration
) -> anyhow::Result<()> {
    for batch in chunks {
        let batch = batch?;
        debug!(rows = batch.num_rows(), total = sink.num_rows(), "appending batch");
        sink.append(&batch)?;
    }
    if !sink.is_open() {
        sink.append(&RecordBatch::new_empty(to_arrow_schema(declaration)))?;
    }
    Ok(())
}
