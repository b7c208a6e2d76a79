use std::collections::HashSet;
use std::fmt::{Display, Formatter};


type Name = &'static str;


#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Nullable 64-bit integer
    Int64,
    Float64,
    Utf8
}


impl Display for ColumnType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Int64 => f.write_str("int64"),
            ColumnType::Float64 => f.write_str("float64"),
            ColumnType::Utf8 => f.write_str("utf8")
        }
    }
}


#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDeclaration {
    pub name: Name,
    pub column_type: ColumnType
}


#[derive(Debug)]
pub struct DuplicateColumn {
    pub name: Name
}


impl Display for DuplicateColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "column '{}' is declared more than once", self.name)
    }
}


impl std::error::Error for DuplicateColumn {}


/// Explicit, ordered column types of a source file.
///
/// Column order matches the order of fields in the source CSV header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaDeclaration {
    columns: Vec<ColumnDeclaration>
}


impl SchemaDeclaration {
    pub fn new(columns: &[(Name, ColumnType)]) -> Result<Self, DuplicateColumn> {
        let mut seen = HashSet::with_capacity(columns.len());
        for (name, _) in columns {
            if !seen.insert(*name) {
                return Err(DuplicateColumn { name: *name })
            }
        }
        Ok(Self::new_unchecked(columns))
    }

    pub(crate) fn new_unchecked(columns: &[(Name, ColumnType)]) -> Self {
        Self {
            columns: columns.iter().map(|(name, column_type)| {
                ColumnDeclaration {
                    name: *name,
                    column_type: *column_type
                }
            }).collect()
        }
    }

    pub fn columns(&self) -> &[ColumnDeclaration] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns.iter()
            .find(|c| c.name == name)
            .map(|c| c.column_type)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|c| c.name)
    }
}
