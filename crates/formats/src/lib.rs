pub mod loader;
pub mod polygon_features;

pub use loader::*;
pub use polygon_features::*;
