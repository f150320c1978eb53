pub mod layer;
pub mod status;

pub use layer::*;
pub use status::*;
