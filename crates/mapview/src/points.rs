use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single pin/place marker. Identity is `id`; a point is immutable once
/// fetched within a session (a refetch may replace it wholesale).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub title: String,
}

/// Accumulated points known to the client for the current session.
///
/// Grows by last-write-wins merge whenever a fetch completes and is never
/// proactively evicted (accepted for a session-lived client). Entries are
/// keyed in a `BTreeMap` so iteration order is stable, which in turn makes
/// the viewport filter's truncation deterministic.
///
/// Fetches complete in arbitrary order, so every batch carries a
/// monotonically increasing sequence number; a batch older than the last
/// applied one is discarded whole instead of overwriting fresher data.
#[derive(Debug, Default, Clone)]
pub struct PointSet {
    points: BTreeMap<String, GeoPoint>,
    last_applied_seq: u64,
}

impl PointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&GeoPoint> {
        self.points.get(id)
    }

    pub fn last_applied_seq(&self) -> u64 {
        self.last_applied_seq
    }

    /// Merge a fetched batch tagged with its request sequence number.
    ///
    /// Returns `false` (and changes nothing) if a newer batch has already
    /// been applied.
    pub fn apply(&mut self, seq: u64, batch: Vec<GeoPoint>) -> bool {
        if seq <= self.last_applied_seq {
            return false;
        }
        self.last_applied_seq = seq;
        for point in batch {
            self.points.insert(point.id.clone(), point);
        }
        true
    }

    /// Iterate points in stable id order.
    pub fn iter(&self) -> impl Iterator<Item = &GeoPoint> {
        self.points.values()
    }
}

#[cfg(test)]
pub(crate) fn point(id: &str, latitude: f64, longitude: f64) -> GeoPoint {
    GeoPoint {
        id: id.to_string(),
        latitude,
        longitude,
        color: String::new(),
        icon: String::new(),
        title: String::new(),
    }
}
