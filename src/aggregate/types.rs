use std::collections::BTreeMap;

use serde::Serialize;

pub const SECTOR_WIDTH_DEG: f64 = 15.0;
const DAY_START_HOUR: u32 = 8;
const DAY_END_HOUR: u32 = 20;

/// One reception that survived every ingestion filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSample {
    pub distance_nm: f64,
    pub bearing_deg: f64,
    pub mmsi: u64,
    /// `YYYYMMDD`, the first eight characters of the record timestamp.
    pub date: String,
    pub hour: u32,
    pub lat: f64,
    pub lon: f64,
}

impl ObservationSample {
    pub fn is_daytime(&self) -> bool {
        (DAY_START_HOUR..DAY_END_HOUR).contains(&self.hour)
    }

    pub fn position(&self) -> Position {
        Position {
            lat: self.lat,
            lon: self.lon,
            bearing: self.bearing_deg,
            distance: self.distance_nm,
            mmsi: self.mmsi,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
    pub bearing: f64,
    pub distance: f64,
    pub mmsi: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyAggregate {
    pub day_count: u64,
    pub night_count: u64,
    pub total_count: u64,
    pub max_distance: f64,
    pub max_distance_id: Option<u64>,
}

impl DailyAggregate {
    pub fn record(&mut self, sample: &ObservationSample) {
        self.total_count += 1;
        if sample.is_daytime() {
            self.day_count += 1;
        } else {
            self.night_count += 1;
        }
        self.offer_max(sample.distance_nm, Some(sample.mmsi));
    }

    /// Folds `other` in after `self`. On equal distances the value already
    /// held here is kept.
    pub fn merge(&mut self, other: &DailyAggregate) {
        self.day_count += other.day_count;
        self.night_count += other.night_count;
        self.total_count += other.total_count;
        self.offer_max(other.max_distance, other.max_distance_id);
    }

    fn offer_max(&mut self, distance: f64, id: Option<u64>) {
        if distance > self.max_distance {
            self.max_distance = distance;
            self.max_distance_id = id;
        }
    }
}

/// Reception counts per 15° compass sector, keyed by the sector's lower edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SectorCounts(BTreeMap<u16, u64>);

impl SectorCounts {
    pub fn from_bearings(bearings: &[f64]) -> Self {
        let mut counts = Self::default();
        for &bearing in bearings {
            counts.add(bearing);
        }
        counts
    }

    /// Lower edges of all 24 sectors, starting at north.
    pub fn sectors() -> impl Iterator<Item = u16> {
        (0..(360.0 / SECTOR_WIDTH_DEG) as u16).map(|i| i * SECTOR_WIDTH_DEG as u16)
    }

    pub fn sector_of(bearing_deg: f64) -> u16 {
        let sector = (bearing_deg / SECTOR_WIDTH_DEG).floor() * SECTOR_WIDTH_DEG;
        sector.clamp(0.0, 360.0 - SECTOR_WIDTH_DEG) as u16
    }

    pub fn add(&mut self, bearing_deg: f64) {
        *self.0.entry(Self::sector_of(bearing_deg)).or_insert(0) += 1;
    }

    pub fn merge(&mut self, other: &SectorCounts) {
        for (&sector, &count) in &other.0 {
            *self.0.entry(sector).or_insert(0) += count;
        }
    }

    pub fn get(&self, sector: u16) -> u64 {
        self.0.get(&sector).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
