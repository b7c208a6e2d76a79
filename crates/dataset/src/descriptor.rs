use std::fmt::{Display, Formatter};


/// Category of trip records, e.g. `yellow` or `green`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetKind(String);


impl DatasetKind {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}


impl Display for DatasetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}


impl From<&str> for DatasetKind {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}


#[derive(Debug)]
pub struct InvalidMonth {
    pub month: u8
}


impl Display for InvalidMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "month {} is out of range 1..=12", self.month)
    }
}


impl std::error::Error for InvalidMonth {}


#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    year: u16,
    month: u8
}


impl Period {
    pub fn new(year: u16, month: u8) -> Result<Self, InvalidMonth> {
        if (1..=12).contains(&month) {
            Ok(Self { year, month })
        } else {
            Err(InvalidMonth { month })
        }
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }
}


impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}


/// One unit of work: a single (kind, year, month) combination.
///
/// Every name derived from a descriptor (remote file, local artifact, object key)
/// is a pure function of its fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DatasetDescriptor {
    kind: DatasetKind,
    period: Period
}


impl DatasetDescriptor {
    pub fn new(kind: DatasetKind, period: Period) -> Self {
        Self { kind, period }
    }

    /// All twelve months of `year` in calendar order
    pub fn months_of(kind: &DatasetKind, year: u16) -> impl Iterator<Item = DatasetDescriptor> + '_ {
        (1..=12).map(move |month| {
            DatasetDescriptor::new(kind.clone(), Period { year, month })
        })
    }

    pub fn kind(&self) -> &DatasetKind {
        &self.kind
    }

    pub fn period(&self) -> Period {
        self.period
    }

    fn stem(&self) -> String {
        format!("{}_tripdata_{}", self.kind, self.period)
    }

    pub fn source_file_name(&self) -> String {
        format!("{}.csv.gz", self.stem())
    }

    /// Path of the source file relative to the archive base URL
    pub fn source_path(&self) -> String {
        format!("{}/{}", self.kind, self.source_file_name())
    }

    pub fn artifact_file_name(&self) -> String {
        format!("{}.parquet", self.stem())
    }

    pub fn object_key(&self) -> String {
        format!("{}/{}", self.kind, self.artifact_file_name())
    }
}


impl Display for DatasetDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.period)
    }
}
