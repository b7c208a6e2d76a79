use clap::{value_parser, Parser};


#[derive(Parser, Debug)]
#[command(version, about = "Archives monthly NYC trip data as parquet", long_about = None)]
pub struct Cli {
    /// Target s3 location (s3://bucket[/prefix]) or local dir to upload artifacts to
    #[arg(long, env = "TRIPDATA_BUCKET", value_name = "BUCKET", default_value = "s3://nyc-tlc-warehouse")]
    pub bucket: String,

    /// Number of CSV rows decoded and written per batch
    #[arg(
        long,
        env = "TRIPDATA_CHUNK_SIZE",
        value_name = "N",
        value_parser = value_parser!(u64).range(1..),
        default_value_t = 100_000
    )]
    pub chunk_size: u64,

    /// Dataset kind to archive (can be specified multiple times)
    #[arg(long = "kind", value_name = "KIND", default_value = "yellow")]
    pub kinds: Vec<String>,

    /// Year to archive, all twelve months are processed (can be specified multiple times)
    #[arg(long = "year", value_name = "YEAR", required = true)]
    pub years: Vec<u16>,
}
