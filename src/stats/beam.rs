//! Circular statistics over reception bearings.
//!
//! Bearings are angles, so arithmetic means and linear sorts give wrong
//! answers for data that straddles north. The mean and concentration come
//! from averaged unit vectors; the percentile windows fall back to a coarse
//! rotation search when the linear window looks like it wraps.

use serde::Serialize;

use crate::geodesy::normalize_deg;

pub const BEAM_PERCENTILES: [f64; 3] = [0.68, 0.95, 0.99];
pub const ROTATION_STEP_DEG: u32 = 10;
const WRAP_THRESHOLD_DEG: f64 = 180.0;
const FAR_FIELD_FRACTION: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CircularMean {
    pub mean_bearing: f64,
    /// Length of the mean resultant vector: 1 when every bearing is the same,
    /// near 0 when they are spread evenly around the compass.
    pub concentration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentileWindow {
    pub percentile: f64,
    pub min_bearing: f64,
    pub max_bearing: f64,
    pub beam_width: f64,
    pub center_bearing: f64,
}

/// Bearing spread of the farthest receptions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarFieldSpread {
    pub count: usize,
    pub min_bearing: f64,
    pub max_bearing: f64,
    /// `max_bearing - min_bearing`, not corrected for wraparound.
    pub spread: f64,
    /// Ascending.
    pub bearings: Vec<f64>,
    pub avg_distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeamWidthStats {
    pub mean_bearing: f64,
    pub concentration: f64,
    pub percentiles: Vec<PercentileWindow>,
    pub max_distance_analysis: FarFieldSpread,
}

/// Full beam analysis of index-aligned bearings and distances. `None` when
/// there is nothing to analyse.
pub fn beam_width(bearings: &[f64], distances: &[f64]) -> Option<BeamWidthStats> {
    let mean = circular_mean(bearings)?;
    let percentiles = BEAM_PERCENTILES
        .iter()
        .filter_map(|&p| percentile_window(bearings, p))
        .collect();
    let max_distance_analysis = far_field_spread(bearings, distances)?;

    Some(BeamWidthStats {
        mean_bearing: mean.mean_bearing,
        concentration: mean.concentration,
        percentiles,
        max_distance_analysis,
    })
}

pub fn circular_mean(bearings: &[f64]) -> Option<CircularMean> {
    if bearings.is_empty() {
        return None;
    }

    let n = bearings.len() as f64;
    let (sum_x, sum_y) = bearings.iter().fold((0.0, 0.0), |(x, y), b| {
        let rad = b.to_radians();
        (x + rad.cos(), y + rad.sin())
    });
    let mean_x = sum_x / n;
    let mean_y = sum_y / n;

    Some(CircularMean {
        mean_bearing: normalize_deg(mean_y.atan2(mean_x).to_degrees()),
        concentration: (mean_x * mean_x + mean_y * mean_y).sqrt().min(1.0),
    })
}

/// The arc holding the central fraction `p` of the bearings.
///
/// The window is a fixed index range over the sorted bearings. If it spans
/// more than half the compass the data probably wraps through north, so the
/// bearings are rotated in 10° steps, re-sorted, and the rotation giving the
/// narrowest window wins. This is a fixed-resolution approximation of the
/// minimal covering arc.
pub fn percentile_window(bearings: &[f64], p: f64) -> Option<PercentileWindow> {
    if bearings.is_empty() {
        return None;
    }

    let mut sorted = bearings.to_vec();
    sorted.sort_by(f64::total_cmp);
    let (lo, hi) = window_indices(sorted.len(), p);

    let (mut min_bearing, mut max_bearing) = (sorted[lo], sorted[hi]);

    if max_bearing - min_bearing > WRAP_THRESHOLD_DEG {
        let mut best_span = f64::INFINITY;
        for offset in (0..360).step_by(ROTATION_STEP_DEG as usize) {
            let offset = offset as f64;
            let mut rotated: Vec<f64> =
                bearings.iter().map(|b| normalize_deg(b + offset)).collect();
            rotated.sort_by(f64::total_cmp);

            let span = rotated[hi] - rotated[lo];
            if span < best_span {
                best_span = span;
                min_bearing = normalize_deg(rotated[lo] - offset);
                max_bearing = normalize_deg(rotated[hi] - offset);
            }
        }
    }

    let beam_width = if max_bearing > min_bearing {
        max_bearing - min_bearing
    } else {
        (360.0 - min_bearing) + max_bearing
    };

    Some(PercentileWindow {
        percentile: p,
        min_bearing,
        max_bearing,
        beam_width,
        center_bearing: normalize_deg(min_bearing + beam_width / 2.0),
    })
}

/// `[floor((1-p)/2 * n), ceil((1+p)/2 * n) - 1]`, kept inside the slice.
fn window_indices(n: usize, p: f64) -> (usize, usize) {
    let len = n as f64;
    let hi = (((1.0 + p) / 2.0 * len).ceil() as usize)
        .saturating_sub(1)
        .min(n - 1);
    let lo = (((1.0 - p) / 2.0 * len).floor() as usize).min(hi);
    (lo, hi)
}

/// Looks at the farthest 5 % of receptions (at least one) and reports how
/// widely their bearings spread.
pub fn far_field_spread(bearings: &[f64], distances: &[f64]) -> Option<FarFieldSpread> {
    let mut pairs: Vec<(f64, f64)> = bearings
        .iter()
        .copied()
        .zip(distances.iter().copied())
        .collect();
    if pairs.is_empty() {
        return None;
    }

    pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
    let count = ((FAR_FIELD_FRACTION * pairs.len() as f64).ceil() as usize).max(1);
    pairs.truncate(count);

    let avg_distance = pairs.iter().map(|(_, d)| d).sum::<f64>() / count as f64;
    let mut far_bearings: Vec<f64> = pairs.into_iter().map(|(b, _)| b).collect();
    far_bearings.sort_by(f64::total_cmp);

    let min_bearing = far_bearings[0];
    let max_bearing = far_bearings[count - 1];

    Some(FarFieldSpread {
        count,
        min_bearing,
        max_bearing,
        spread: max_bearing - min_bearing,
        bearings: far_bearings,
        avg_distance,
    })
}
