mod factory;
mod types;

pub use factory::*;
pub use types::*;
