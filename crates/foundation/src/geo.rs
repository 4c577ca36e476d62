//! Geographic primitives for the map viewport.
//!
//! Coordinates are WGS84 degrees. A `Region` is the viewport's center plus
//! its degree spans; deltas are inversely related to zoom (a larger delta
//! means more zoomed out).

/// Approximate meters per degree of latitude at the Earth's surface.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LatLon {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLon {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Region {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Region {
    pub fn new(latitude: f64, longitude: f64, latitude_delta: f64, longitude_delta: f64) -> Self {
        Self {
            latitude,
            longitude,
            latitude_delta,
            longitude_delta,
        }
    }

    pub fn centered_on(center: LatLon, latitude_delta: f64, longitude_delta: f64) -> Self {
        Self::new(
            center.latitude,
            center.longitude,
            latitude_delta,
            longitude_delta,
        )
    }

    pub fn center(&self) -> LatLon {
        LatLon::new(self.latitude, self.longitude)
    }

    pub fn min_latitude(&self) -> f64 {
        self.latitude - self.latitude_delta / 2.0
    }

    pub fn max_latitude(&self) -> f64 {
        self.latitude + self.latitude_delta / 2.0
    }

    pub fn min_longitude(&self) -> f64 {
        self.longitude - self.longitude_delta / 2.0
    }

    pub fn max_longitude(&self) -> f64 {
        self.longitude + self.longitude_delta / 2.0
    }

    /// Inclusive containment test on both bounds.
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.min_latitude()
            && latitude <= self.max_latitude()
            && longitude >= self.min_longitude()
            && longitude <= self.max_longitude()
    }

    /// Approximate metric radius covering the viewport, for sizing nearby
    /// queries. Uses the larger half-span at ~111 km per degree.
    pub fn query_radius_m(&self) -> f64 {
        let half_span_deg = (self.latitude_delta / 2.0).max(self.longitude_delta / 2.0);
        half_span_deg.abs() * METERS_PER_DEGREE
    }
}

#[cfg(test)]
mod tests {
    use super::{LatLon, Region};

    #[test]
    fn bounds_are_half_span_around_center() {
        let r = Region::new(10.0, 20.0, 2.0, 4.0);
        assert_eq!(r.min_latitude(), 9.0);
        assert_eq!(r.max_latitude(), 11.0);
        assert_eq!(r.min_longitude(), 18.0);
        assert_eq!(r.max_longitude(), 22.0);
    }

    #[test]
    fn contains_is_inclusive_on_the_boundary() {
        let r = Region::new(0.0, 0.0, 1.0, 1.0);
        assert!(r.contains(0.5, 0.0));
        assert!(r.contains(-0.5, 0.0));
        assert!(r.contains(0.0, 0.5));
        assert!(!r.contains(0.5 + 1e-9, 0.0));
    }

    #[test]
    fn query_radius_uses_larger_span() {
        let r = Region::centered_on(LatLon::new(0.0, 0.0), 0.02, 0.04);
        assert_eq!(r.query_radius_m(), 0.02 * super::METERS_PER_DEGREE);
    }
}
