pub mod collection;
pub mod error;
pub mod overlay;
pub mod resolver;
pub mod style;
pub mod terrain;

pub use collection::*;
pub use error::*;
pub use overlay::*;
pub use resolver::*;
pub use style::*;
pub use terrain::*;
