mod mapping;
mod table;

pub use mapping::*;
pub use table::*;
