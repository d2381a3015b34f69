pub mod math;

// Foundation crate: WGS84 geodesy primitives shared by the feature source and
// the overlay resolver. Nothing here knows about GeoJSON or rendering.
pub use math::*;
