mod accumulator;
mod types;

pub use accumulator::Aggregation;
pub use types::{DailyAggregate, ObservationSample, Position, SectorCounts, SECTOR_WIDTH_DEG};
