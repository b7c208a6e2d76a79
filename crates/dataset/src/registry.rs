use crate::{ColumnType, DatasetKind, SchemaDeclaration};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use ColumnType::*;


#[derive(Debug)]
pub struct UnknownDatasetKind {
    pub kind: DatasetKind
}


impl Display for UnknownDatasetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "no schema is declared for dataset kind '{}'", self.kind)
    }
}


impl std::error::Error for UnknownDatasetKind {}


/// Maps dataset kinds to their column type declarations.
///
/// Types are never inferred from data. A batch where an integer column happens to be
/// all-null would otherwise come out as float, making the schema drift from batch to batch.
#[derive(Clone, Debug)]
pub struct SchemaRegistry {
    schemas: BTreeMap<DatasetKind, SchemaDeclaration>
}


impl SchemaRegistry {
    pub fn empty() -> Self {
        Self {
            schemas: BTreeMap::new()
        }
    }

    pub fn register(&mut self, kind: DatasetKind, schema: SchemaDeclaration) {
        self.schemas.insert(kind, schema);
    }

    pub fn lookup(&self, kind: &DatasetKind) -> Result<&SchemaDeclaration, UnknownDatasetKind> {
        self.schemas.get(kind).ok_or_else(|| UnknownDatasetKind {
            kind: kind.clone()
        })
    }

    pub fn kinds(&self) -> impl Iterator<Item = &DatasetKind> + '_ {
        self.schemas.keys()
    }
}


impl Default for SchemaRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("yellow".into(), SchemaDeclaration::new_unchecked(YELLOW));
        registry.register("green".into(), SchemaDeclaration::new_unchecked(GREEN));
        registry.register("fhv".into(), SchemaDeclaration::new_unchecked(FHV));
        registry
    }
}


const YELLOW: &[(&str, ColumnType)] = &[
    ("VendorID", Int64),
    ("tpep_pickup_datetime", Utf8),
    ("tpep_dropoff_datetime", Utf8),
    ("passenger_count", Int64),
    ("trip_distance", Float64),
    ("RatecodeID", Int64),
    ("store_and_fwd_flag", Utf8),
    ("PULocationID", Int64),
    ("DOLocationID", Int64),
    ("payment_type", Int64),
    ("fare_amount", Float64),
    ("extra", Float64),
    ("mta_tax", Float64),
    ("tip_amount", Float64),
    ("tolls_amount", Float64),
    ("improvement_surcharge", Float64),
    ("total_amount", Float64),
    ("congestion_surcharge", Float64),
];


const GREEN: &[(&str, ColumnType)] = &[
    ("VendorID", Int64),
    ("lpep_pickup_datetime", Utf8),
    ("lpep_dropoff_datetime", Utf8),
    ("store_and_fwd_flag", Utf8),
    ("RatecodeID", Int64),
    ("PULocationID", Int64),
    ("DOLocationID", Int64),
    ("passenger_count", Int64),
    ("trip_distance", Float64),
    ("fare_amount", Float64),
    ("extra", Float64),
    ("mta_tax", Float64),
    ("tip_amount", Float64),
    ("tolls_amount", Float64),
    ("ehail_fee", Float64),
    ("improvement_surcharge", Float64),
    ("total_amount", Float64),
    ("payment_type", Int64),
    ("trip_type", Int64),
    ("congestion_surcharge", Float64),
];


const FHV: &[(&str, ColumnType)] = &[
    ("dispatching_base_num", Utf8),
    ("pickup_datetime", Utf8),
    ("dropOff_datetime", Utf8),
    ("PUlocationID", Int64),
    ("DOlocationID", Int64),
    ("SR_Flag", Int64),
    ("Affiliated_base_number", Utf8),
];
