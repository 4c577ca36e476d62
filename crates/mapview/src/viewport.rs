use foundation::geo::Region;

use crate::points::{GeoPoint, PointSet};

/// Marker density cap as a function of the viewport's latitude span.
///
/// Thresholds are (minimum exclusive delta, cap) pairs checked widest first;
/// `base_cap` applies below the narrowest threshold. The defaults are
/// empirical tuning values, not a contract, but any configuration must keep
/// the monotonic relationship: more zoomed out never yields a higher cap.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityLimits {
    thresholds: Vec<(f64, usize)>,
    base_cap: usize,
}

impl Default for DensityLimits {
    fn default() -> Self {
        Self {
            thresholds: vec![(0.1, 20), (0.05, 50), (0.01, 100)],
            base_cap: 200,
        }
    }
}

impl DensityLimits {
    /// Builds custom limits. Thresholds are sorted widest-delta first and
    /// the invariant "wider delta never caps higher" is enforced.
    pub fn new(mut thresholds: Vec<(f64, usize)>, base_cap: usize) -> Result<Self, String> {
        thresholds.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut prev_cap = 0usize;
        for (delta, cap) in &thresholds {
            if !delta.is_finite() || *delta <= 0.0 {
                return Err(format!("invalid threshold delta: {delta}"));
            }
            if *cap < prev_cap {
                return Err("caps must not decrease as the viewport narrows".to_string());
            }
            prev_cap = *cap;
        }
        if base_cap < prev_cap {
            return Err("base cap must be the largest cap".to_string());
        }

        Ok(Self {
            thresholds,
            base_cap,
        })
    }

    pub fn cap_for_delta(&self, latitude_delta: f64) -> usize {
        for (min_delta, cap) in &self.thresholds {
            if latitude_delta > *min_delta {
                return *cap;
            }
        }
        self.base_cap
    }
}

/// Compute the subset of points to render for the current viewport.
///
/// Pure over its inputs:
/// 1. Inclusive bounds test against the region.
/// 2. Density cap from the latitude span.
/// 3. First `cap` matches in set iteration order (stable id order); no
///    further prioritization is guaranteed.
pub fn visible_markers(points: &PointSet, region: Region, limits: &DensityLimits) -> Vec<GeoPoint> {
    let cap = limits.cap_for_delta(region.latitude_delta);
    let mut out = Vec::new();

    for point in points.iter() {
        if !region.contains(point.latitude, point.longitude) {
            continue;
        }
        out.push(point.clone());
        if out.len() >= cap {
            break;
        }
    }

    out
}
