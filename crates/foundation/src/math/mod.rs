pub mod ecef;
pub mod geodesy;
pub mod vec;

pub use ecef::*;
pub use geodesy::*;
pub use vec::*;
