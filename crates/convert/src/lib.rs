mod convert;
mod error;
mod reader;
mod schema;
mod writer;


pub use convert::*;
pub use error::*;
pub use reader::*;
pub use schema::*;
pub use writer::*;
