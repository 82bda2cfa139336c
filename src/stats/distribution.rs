use serde::Serialize;

pub const BIN_COUNT: usize = 10;

/// Equal-width histogram of filtered distances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceDistribution {
    pub bins: [u64; BIN_COUNT],
    pub bin_ranges: [(f64, f64); BIN_COUNT],
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl DistanceDistribution {
    /// `None` for an empty input.
    ///
    /// Values are placed by `floor((d - min) / bin_size)` clamped into the
    /// last bin, which is where the maximum lands. When every distance is
    /// identical the bin size is zero and all of them go to the last bin.
    pub fn from_distances(distances: &[f64]) -> Option<Self> {
        if distances.is_empty() {
            return None;
        }

        let mut sorted = distances.to_vec();
        sorted.sort_by(f64::total_cmp);
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let bin_size = (max - min) / BIN_COUNT as f64;

        let mut bins = [0u64; BIN_COUNT];
        for &d in &sorted {
            bins[bin_index(d, min, bin_size)] += 1;
        }

        let bin_ranges = std::array::from_fn(|i| {
            (
                min + i as f64 * bin_size,
                min + (i + 1) as f64 * bin_size,
            )
        });

        Some(Self {
            bins,
            bin_ranges,
            min,
            max,
            count: sorted.len(),
        })
    }
}

fn bin_index(distance: f64, min: f64, bin_size: f64) -> usize {
    let last = BIN_COUNT - 1;
    if bin_size <= 0.0 {
        return last;
    }
    let raw = ((distance - min) / bin_size).floor();
    if raw <= 0.0 {
        0
    } else {
        (raw as usize).min(last)
    }
}
