mod descriptor;
mod registry;
mod schema;


pub use descriptor::*;
pub use registry::*;
pub use schema::*;
