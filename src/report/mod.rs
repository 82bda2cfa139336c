mod text;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregate::DailyAggregate;
use crate::geodesy::Station;
use crate::ingest::{FarRecord, IngestOutcome, IngestStats};
use crate::stats::{beam_width, BeamWidthStats, DistanceBounds, DistanceDistribution, FilteredView};

pub use text::render_text;

const FAR_RECORD_LIMIT: usize = 10;

/// Everything a run produces, as plain data for the renderers.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub station: Station,
    pub stats: IngestStats,
    pub daily: BTreeMap<String, DailyAggregate>,
    /// Samples before the distance bounds were applied.
    pub unfiltered_count: usize,
    pub filtered: FilteredView,
    pub distribution: Option<DistanceDistribution>,
    pub beam: Option<BeamWidthStats>,
    /// The farthest rejected records, only collected in debug runs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub far_records: Vec<FarRecord>,
}

impl Report {
    pub fn build(station: Station, outcome: IngestOutcome, bounds: DistanceBounds) -> Self {
        let filtered = FilteredView::apply(&outcome.aggregation, bounds);
        let distribution = DistanceDistribution::from_distances(&filtered.distances);
        let beam = beam_width(&filtered.bearings, &filtered.distances);

        let mut far_records = outcome.far_records;
        far_records.sort_by(|a, b| b.distance.total_cmp(&a.distance));
        far_records.truncate(FAR_RECORD_LIMIT);

        Self {
            station,
            stats: outcome.stats,
            unfiltered_count: outcome.aggregation.len(),
            daily: outcome.aggregation.daily,
            filtered,
            distribution,
            beam,
            far_records,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
