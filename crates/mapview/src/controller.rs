use foundation::geo::{LatLon, Region};
use foundation::time::TimeMs;
use runtime::metrics::Metrics;
use runtime::throttle::ThrottleGate;

use crate::points::{GeoPoint, PointSet};
use crate::viewport::{DensityLimits, visible_markers};

/// Map screen lifecycle.
///
/// Permission denial is a user-facing dead-end with a manual retry;
/// location-fetch failure is likewise a surfaced phase rather than a silent
/// swallow.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MapPhase {
    RequestingPermission,
    PermissionDenied,
    Locating,
    LocationFailed,
    Active,
}

#[derive(Debug, Clone)]
pub struct MapConfig {
    /// Minimum interval between nearby-query firings.
    pub throttle_window_ms: u64,
    /// Region spans used when centering on a fresh device location.
    pub default_latitude_delta: f64,
    pub default_longitude_delta: f64,
    /// `limit` parameter sent with nearby queries.
    pub fetch_limit: usize,
    pub density: DensityLimits,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            throttle_window_ms: 1000,
            default_latitude_delta: 0.05,
            default_longitude_delta: 0.05,
            fetch_limit: 100,
            density: DensityLimits::default(),
        }
    }
}

/// A request for points near a coordinate, tagged with the monotonic
/// sequence number used to discard out-of-order completions.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub seq: u64,
    pub center: LatLon,
    pub radius_m: f64,
    pub limit: usize,
}

/// Wires viewport events, the throttle gate, and the point set together to
/// keep an always-fresh, bounded marker set.
///
/// The controller is a pure state machine: the host feeds it permission and
/// location outcomes, raw region-change events, and fetched batches, and
/// drives time by calling `poll`. It never performs IO itself; a returned
/// `NearbyQuery` is the host's instruction to fetch.
///
/// Events arriving in a phase that cannot accept them (a drag during
/// teardown, a stale location callback) are dropped, not errors.
#[derive(Debug)]
pub struct MapController {
    config: MapConfig,
    phase: MapPhase,
    region: Option<Region>,
    query_center: Option<LatLon>,
    gate: ThrottleGate<Region>,
    points: PointSet,
    next_seq: u64,
    metrics: Metrics,
}

impl MapController {
    pub fn new(config: MapConfig, now: TimeMs) -> Self {
        let gate = ThrottleGate::new(config.throttle_window_ms, now);
        Self {
            config,
            phase: MapPhase::RequestingPermission,
            region: None,
            query_center: None,
            gate,
            points: PointSet::new(),
            next_seq: 1,
            metrics: Metrics::new(),
        }
    }

    pub fn phase(&self) -> MapPhase {
        self.phase
    }

    pub fn region(&self) -> Option<Region> {
        self.region
    }

    pub fn query_center(&self) -> Option<LatLon> {
        self.query_center
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn permission_granted(&mut self) {
        if matches!(
            self.phase,
            MapPhase::RequestingPermission | MapPhase::PermissionDenied
        ) {
            self.phase = MapPhase::Locating;
        }
    }

    pub fn permission_denied(&mut self) {
        if self.phase == MapPhase::RequestingPermission {
            self.phase = MapPhase::PermissionDenied;
        }
    }

    /// Manual retry from the permission dead-end.
    pub fn retry_permission(&mut self) {
        if self.phase == MapPhase::PermissionDenied {
            self.phase = MapPhase::RequestingPermission;
        }
    }

    /// Device location obtained: center the viewport and issue the initial
    /// query immediately (the gate restarts from here).
    pub fn location_acquired(&mut self, now: TimeMs, position: LatLon) -> Option<NearbyQuery> {
        if self.phase != MapPhase::Locating {
            return None;
        }
        self.phase = MapPhase::Active;
        let region = Region::centered_on(
            position,
            self.config.default_latitude_delta,
            self.config.default_longitude_delta,
        );
        self.region = Some(region);
        self.gate.reset(now);
        Some(self.fire_query(region))
    }

    pub fn location_failed(&mut self) {
        if self.phase == MapPhase::Locating {
            self.phase = MapPhase::LocationFailed;
        }
    }

    pub fn retry_location(&mut self) {
        if self.phase == MapPhase::LocationFailed {
            self.phase = MapPhase::Locating;
        }
    }

    /// Raw viewport-change event from a drag or zoom.
    ///
    /// The current region updates synchronously (local filtering stays
    /// responsive); the query center only moves when the gate fires.
    pub fn region_changed(&mut self, now: TimeMs, region: Region) -> Option<NearbyQuery> {
        if self.phase != MapPhase::Active {
            return None;
        }
        self.region = Some(region);

        match self.gate.update(now, region) {
            Some(fired) => Some(self.fire_query(fired)),
            None => {
                self.metrics.inc_counter("nearby.throttled", 1);
                None
            }
        }
    }

    /// Drive the trailing edge of the throttle window.
    pub fn poll(&mut self, now: TimeMs) -> Option<NearbyQuery> {
        let fired = self.gate.poll(now)?;
        Some(self.fire_query(fired))
    }

    /// When the host loop should next call `poll`, if a value is parked.
    pub fn next_deadline(&self) -> Option<TimeMs> {
        self.gate.next_deadline()
    }

    /// Manual "center on me": re-centers on a fresh location and bypasses
    /// the throttle entirely.
    pub fn recenter(&mut self, now: TimeMs, position: LatLon) -> Option<NearbyQuery> {
        if self.phase != MapPhase::Active {
            return None;
        }
        let current = self.region.unwrap_or(Region::centered_on(
            position,
            self.config.default_latitude_delta,
            self.config.default_longitude_delta,
        ));
        let region = Region::centered_on(position, current.latitude_delta, current.longitude_delta);
        self.region = Some(region);
        self.gate.reset(now);
        self.metrics.inc_counter("nearby.recenters", 1);
        Some(self.fire_query(region))
    }

    /// Merge a completed nearby fetch. Returns whether the batch was
    /// applied; stale completions are dropped and counted.
    pub fn apply_nearby(&mut self, seq: u64, batch: Vec<GeoPoint>) -> bool {
        let applied = self.points.apply(seq, batch);
        if applied {
            self.metrics.inc_counter("nearby.applied", 1);
            self.metrics
                .set_gauge("points.known", self.points.len() as i64);
        } else {
            self.metrics.inc_counter("nearby.stale_dropped", 1);
        }
        applied
    }

    /// Marker subset for the current viewport; empty before centering.
    pub fn visible_markers(&self) -> Vec<GeoPoint> {
        let Some(region) = self.region else {
            return Vec::new();
        };
        visible_markers(&self.points, region, &self.config.density)
    }

    /// Cancel pending timers so nothing fires into a dead context.
    pub fn teardown(&mut self) {
        self.gate.cancel();
    }

    fn fire_query(&mut self, region: Region) -> NearbyQuery {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.query_center = Some(region.center());
        self.metrics.inc_counter("nearby.queries", 1);
        NearbyQuery {
            seq,
            center: region.center(),
            radius_m: region.query_radius_m(),
            limit: self.config.fetch_limit,
        }
    }
}
