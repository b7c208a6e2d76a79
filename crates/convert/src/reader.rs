use crate::error::MalformedRecord;
use crate::schema::to_arrow_schema;
use anyhow::{ensure, Context};
use arrow::array::RecordBatch;
use arrow::csv::ReaderBuilder;
use arrow::error::ArrowError;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tlc_dataset::SchemaDeclaration;


type Decoder = BufReader<MultiGzDecoder<File>>;


/// Lazy sequence of row batches decoded from a gzipped CSV file.
///
/// Decompression and decoding happen on demand, one batch at a time,
/// so at most `chunk_size` rows are held in memory.
pub struct ChunkReader {
    inner: arrow::csv::reader::BufReader<Decoder>,
    next_batch: usize,
    failed: bool
}


impl Iterator for ChunkReader {
    type Item = anyhow::Result<RecordBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None
        }
        let batch = self.next_batch;
        let result = self.inner.next()?;
        self.next_batch += 1;
        Some(result.map_err(|err| {
            self.failed = true;
            classify_error(batch, err)
        }))
    }
}


fn classify_error(batch: usize, err: ArrowError) -> anyhow::Error {
    match err {
        ArrowError::ParseError(reason) | ArrowError::CsvError(reason) => {
            MalformedRecord { batch, reason }.into()
        },
        err => anyhow::Error::new(err).context(format!("failed to read batch {}", batch))
    }
}


pub fn read_chunks(
    path: &Path,
    declaration: &SchemaDeclaration,
    chunk_size: usize
) -> anyhow::Result<ChunkReader> {
    ensure!(chunk_size > 0, "chunk size must be positive");

    let file = File::open(path).with_context(|| {
        format!("failed to open {}", path.display())
    })?;

    let mut decoder = BufReader::new(MultiGzDecoder::new(file));
    check_header(&mut decoder, declaration)?;

    let inner = ReaderBuilder::new(to_arrow_schema(declaration))
        .with_header(false)
        .with_batch_size(chunk_size)
        .build_buffered(decoder)?;

    Ok(ChunkReader {
        inner,
        next_batch: 0,
        failed: false
    })
}


fn check_header(decoder: &mut Decoder, declaration: &SchemaDeclaration) -> anyhow::Result<()> {
    let mut line = String::new();
    decoder.read_line(&mut line).context("failed to read csv header")?;

    let line = line.trim_end_matches(['\r', '\n']);
    let line = line.strip_prefix('\u{feff}').unwrap_or(line);

    if line.is_empty() {
        return Err(MalformedRecord {
            batch: 0,
            reason: "csv header is missing".to_string()
        }.into())
    }

    let found: Vec<&str> = line.split(',')
        .map(|name| name.trim().trim_matches('"'))
        .collect();

    if !found.iter().copied().eq(declaration.names()) {
        return Err(MalformedRecord {
            batch: 0,
            reason: format!(
                "csv header [{}] does not match declared columns [{}]",
                found.join(", "),
                declaration.names().collect::<Vec<_>>().join(", ")
            )
        }.into())
    }

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tlc_dataset::ColumnType::*;


    fn write_gz(path: &Path, text: &str) -> anyhow::Result<()> {
        let mut encoder = GzEncoder::new(File::create(path)?, Compression::default());
        encoder.write_all(text.as_bytes())?;
        encoder.finish()?;
        Ok(())
    }

    fn declaration() -> SchemaDeclaration {
        SchemaDeclaration::new(&[
            ("id", Int64),
            ("fare", Float64)
        ]).unwrap()
    }

    #[test]
    fn batches_are_bounded_by_chunk_size() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("trips.csv.gz");
        let mut text = "id,fare\n".to_string();
        for i in 0..10 {
            text.push_str(&format!("{},{}.5\n", i, i));
        }
        write_gz(&path, &text)?;

        let sizes = read_chunks(&path, &declaration(), 4)?
            .map(|batch| batch.map(|b| b.num_rows()))
            .collect::<anyhow::Result<Vec<_>>>()?;

        assert_eq!(sizes, [4, 4, 2]);
        Ok(())
    }

    #[test]
    fn header_mismatch_is_malformed() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("trips.csv.gz");
        write_gz(&path, "fare,id\n1.0,1\n")?;

        let err = read_chunks(&path, &declaration(), 4).err().unwrap();
        assert!(err.downcast_ref::<MalformedRecord>().is_some());
        Ok(())
    }

    #[test]
    fn coercion_failure_is_reported_per_batch() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("trips.csv.gz");
        write_gz(&path, "id,fare\n1,1.0\n2,2.0\nthree,3.0\n4,4.0\n")?;

        let mut reader = read_chunks(&path, &declaration(), 2)?;
        assert_eq!(reader.next().unwrap()?.num_rows(), 2);

        let err = reader.next().unwrap().unwrap_err();
        let malformed = err.downcast_ref::<MalformedRecord>().unwrap();
        assert_eq!(malformed.batch, 1);

        assert!(reader.next().is_none());
        Ok(())
    }

    #[test]
    fn zero_chunk_size_is_rejected() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("trips.csv.gz");
        write_gz(&path, "id,fare\n")?;
        assert!(read_chunks(&path, &declaration(), 0).is_err());
        Ok(())
    }
}
