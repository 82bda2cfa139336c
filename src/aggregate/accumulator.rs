use std::collections::BTreeMap;

use serde::Serialize;

use super::types::{DailyAggregate, ObservationSample, Position, SectorCounts};

/// Everything folded out of the samples of one file, or of a whole run once
/// per-file results are merged.
///
/// `distances`, `bearings` and `positions` are index-aligned and kept in
/// processing order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Aggregation {
    pub daily: BTreeMap<String, DailyAggregate>,
    pub distances: Vec<f64>,
    pub bearings: Vec<f64>,
    pub positions: Vec<Position>,
    pub sectors: SectorCounts,
}

impl Aggregation {
    pub fn record(&mut self, sample: &ObservationSample) {
        self.daily
            .entry(sample.date.clone())
            .or_default()
            .record(sample);

        self.distances.push(sample.distance_nm);
        self.bearings.push(sample.bearing_deg);
        self.positions.push(sample.position());
        self.sectors.add(sample.bearing_deg);
    }

    /// Appends `other` after everything already held here.
    pub fn merge(&mut self, other: Aggregation) {
        for (date, day) in &other.daily {
            self.daily.entry(date.clone()).or_default().merge(day);
        }
        self.distances.extend(other.distances);
        self.bearings.extend(other.bearings);
        self.positions.extend(other.positions);
        self.sectors.merge(&other.sectors);
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
}
