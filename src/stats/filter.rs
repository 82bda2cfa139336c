use serde::Serialize;

use crate::aggregate::{Aggregation, Position, SectorCounts};

/// Inclusive distance limits in nautical miles. A bound of zero or less is
/// switched off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DistanceBounds {
    pub min_distance: f64,
    pub max_distance: f64,
}

impl DistanceBounds {
    pub fn new(min_distance: f64, max_distance: f64) -> Self {
        Self {
            min_distance,
            max_distance,
        }
    }

    pub fn contains(&self, distance: f64) -> bool {
        (self.min_distance <= 0.0 || distance >= self.min_distance)
            && (self.max_distance <= 0.0 || distance <= self.max_distance)
    }

    pub fn is_active(&self) -> bool {
        self.min_distance > 0.0 || self.max_distance > 0.0
    }
}

/// The subsequence of a completed aggregation that falls inside the distance
/// bounds. Every downstream statistic reads from here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilteredView {
    pub bounds: DistanceBounds,
    pub distances: Vec<f64>,
    pub bearings: Vec<f64>,
    pub positions: Vec<Position>,
    pub sectors: SectorCounts,
}

impl FilteredView {
    /// Selects the indices whose distance is within `bounds`, keeping the
    /// three sequences aligned. Sector counts are rebuilt from the selection
    /// only when a lower bound is set; otherwise the aggregation's own counts
    /// are carried over.
    pub fn apply(aggregation: &Aggregation, bounds: DistanceBounds) -> Self {
        let keep: Vec<usize> = aggregation
            .distances
            .iter()
            .enumerate()
            .filter(|(_, d)| bounds.contains(**d))
            .map(|(i, _)| i)
            .collect();

        let distances: Vec<f64> = keep.iter().map(|&i| aggregation.distances[i]).collect();
        let bearings: Vec<f64> = keep.iter().map(|&i| aggregation.bearings[i]).collect();
        let positions: Vec<Position> = keep.iter().map(|&i| aggregation.positions[i]).collect();

        let sectors = if bounds.min_distance > 0.0 {
            SectorCounts::from_bearings(&bearings)
        } else {
            aggregation.sectors.clone()
        };

        Self {
            bounds,
            distances,
            bearings,
            positions,
            sectors,
        }
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
}
