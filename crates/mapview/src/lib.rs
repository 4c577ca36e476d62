pub mod controller;
pub mod points;
pub mod viewport;

pub use controller::{MapConfig, MapController, MapPhase, NearbyQuery};
pub use foundation::geo::{LatLon, Region};
pub use points::{GeoPoint, PointSet};
pub use viewport::{DensityLimits, visible_markers};
