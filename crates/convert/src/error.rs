use std::fmt::{Display, Formatter};


/// Source data that can't be decoded against the declared schema
#[derive(Debug)]
pub struct MalformedRecord {
    /// Zero-based index of the batch being decoded
    pub batch: usize,
    pub reason: String
}


impl Display for MalformedRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed record in batch {}: {}", self.batch, self.reason)
    }
}


impl std::error::Error for MalformedRecord {}


/// A batch whose schema differs from the one bound to the output artifact
#[derive(Debug)]
pub struct SchemaMismatch {
    pub column: String,
    pub expected: String,
    pub found: String
}


impl Display for SchemaMismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "batch schema does not match the artifact schema at '{}': expected {}, found {}",
            self.column,
            self.expected,
            self.found
        )
    }
}


impl std::error::Error for SchemaMismatch {}
