use chrono::{NaiveDateTime, Timelike};
use serde::Deserialize;

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

#[derive(Debug, Deserialize)]
struct TelemetryRecord {
    topic: String,
    timestamp: String,
    payload: Payload,
}

#[derive(Debug, Deserialize)]
struct Payload {
    mmsi: u64,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

/// A record with the expected topic and shape, before any filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub mmsi: u64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub timestamp: String,
    pub date: String,
    pub hour: u32,
}

#[derive(Debug)]
pub enum Decoded {
    Candidate(Candidate),
    /// Blank line, wrong topic, or JSON without the record shape.
    Ignored,
    Malformed(serde_json::Error),
}

pub fn decode_line(line: &str, topic: &str) -> Decoded {
    if line.trim().is_empty() {
        return Decoded::Ignored;
    }

    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => return Decoded::Malformed(e),
    };

    let record: TelemetryRecord = match serde_json::from_value(value) {
        Ok(r) => r,
        Err(_) => return Decoded::Ignored,
    };

    if record.topic != topic {
        return Decoded::Ignored;
    }

    let Some(hour) = timestamp_hour(&record.timestamp) else {
        return Decoded::Ignored;
    };

    Decoded::Candidate(Candidate {
        mmsi: record.payload.mmsi,
        lat: record.payload.lat,
        lon: record.payload.lon,
        date: record.timestamp[..8].to_string(),
        timestamp: record.timestamp,
        hour,
    })
}

fn timestamp_hour(timestamp: &str) -> Option<u32> {
    if timestamp.len() != 14 || !timestamp.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
        .ok()
        .map(|t| t.hour())
}
