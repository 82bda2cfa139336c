use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::aggregate::{Aggregation, ObservationSample};
use crate::geodesy::{bearing_deg, distance_nm, is_valid_position, Station};
use crate::ingest::decompress::RecordReader;
use crate::ingest::error::IngestError;
use crate::ingest::record::{decode_line, Candidate, Decoded};
use crate::ingest::source::{discover, RecordFilePattern};

pub const DEFAULT_SANITY_CEILING_NM: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub topic: String,
    pub pattern: RecordFilePattern,
    pub sanity_ceiling_nm: f64,
    pub exclude: HashSet<u64>,
    /// Keeps records past the sanity ceiling and logs rejected coordinates.
    pub debug: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            topic: "ais".to_string(),
            pattern: RecordFilePattern::new("jsonl"),
            sanity_ceiling_nm: DEFAULT_SANITY_CEILING_NM,
            exclude: HashSet::new(),
            debug: false,
        }
    }
}

/// A record dropped for being implausibly far from the station, kept for
/// inspection in debug runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarRecord {
    pub distance: f64,
    pub bearing: f64,
    pub mmsi: u64,
    pub lat: f64,
    pub lon: f64,
    pub timestamp: String,
    pub raw_line: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub files: u64,
    pub lines: u64,
    pub malformed_lines: u64,
    pub excluded: u64,
    pub missing_position: u64,
    pub invalid_coordinates: u64,
    pub beyond_ceiling: u64,
    pub accepted: u64,
}

impl IngestStats {
    fn merge(&mut self, other: &IngestStats) {
        self.files += other.files;
        self.lines += other.lines;
        self.malformed_lines += other.malformed_lines;
        self.excluded += other.excluded;
        self.missing_position += other.missing_position;
        self.invalid_coordinates += other.invalid_coordinates;
        self.beyond_ceiling += other.beyond_ceiling;
        self.accepted += other.accepted;
    }
}

#[derive(Debug, Clone, Default)]
pub struct IngestOutcome {
    pub aggregation: Aggregation,
    pub stats: IngestStats,
    pub far_records: Vec<FarRecord>,
}

impl IngestOutcome {
    pub fn merge(&mut self, other: IngestOutcome) {
        self.aggregation.merge(other.aggregation);
        self.stats.merge(&other.stats);
        self.far_records.extend(other.far_records);
    }
}

enum Verdict {
    Accepted(ObservationSample),
    Excluded,
    MissingPosition,
    InvalidCoordinates { lat: f64, lon: f64 },
    BeyondCeiling(FarRecord),
}

pub struct Ingestor<'a> {
    station: &'a Station,
    options: &'a IngestOptions,
}

impl<'a> Ingestor<'a> {
    pub fn new(station: &'a Station, options: &'a IngestOptions) -> Self {
        Self { station, options }
    }

    /// Ingests a single file, or every record file below a directory.
    ///
    /// Files are processed one after another. Each one is folded into its own
    /// outcome and only merged once it has been read to the end, so an error
    /// never leaves a partial file behind in the result.
    pub fn ingest_path(&self, path: &Path) -> Result<IngestOutcome, IngestError> {
        let files = discover(path, &self.options.pattern)?;
        if files.is_empty() {
            log::warn!("No record files found under {}", path.display());
        }
        self.ingest_files(&files)
    }

    pub fn ingest_files(&self, files: &[PathBuf]) -> Result<IngestOutcome, IngestError> {
        let mut run = IngestOutcome::default();
        for file in files {
            run.merge(self.ingest_file(file)?);
        }
        Ok(run)
    }

    pub fn ingest_file(&self, path: &Path) -> Result<IngestOutcome, IngestError> {
        log::info!("Processing {}", path.display());

        let mut reader = RecordReader::open(path)?;
        let mut outcome = IngestOutcome::default();
        outcome.stats.files = 1;

        let mut line = String::new();
        while reader.next_line(&mut line)? {
            outcome.stats.lines += 1;
            let line_no = outcome.stats.lines;
            self.process_line(&line, &mut outcome, || {
                format!("{}:{}", reader.file(), line_no)
            });
        }
        reader.finish()?;

        let stats = &outcome.stats;
        if stats.excluded > 0 {
            log::info!("{}: excluded {} records", path.display(), stats.excluded);
        }
        log::info!(
            "{}: {} lines, {} accepted",
            path.display(),
            stats.lines,
            stats.accepted
        );
        Ok(outcome)
    }

    fn process_line(
        &self,
        line: &str,
        outcome: &mut IngestOutcome,
        location: impl Fn() -> String,
    ) {
        let candidate = match decode_line(line, &self.options.topic) {
            Decoded::Candidate(c) => c,
            Decoded::Ignored => return,
            Decoded::Malformed(e) => {
                log::warn!("{}: skipping malformed line: {}", location(), e);
                outcome.stats.malformed_lines += 1;
                return;
            }
        };

        match self.evaluate(candidate, line) {
            Verdict::Accepted(sample) => {
                outcome.stats.accepted += 1;
                outcome.aggregation.record(&sample);
            }
            Verdict::Excluded => outcome.stats.excluded += 1,
            Verdict::MissingPosition => outcome.stats.missing_position += 1,
            Verdict::InvalidCoordinates { lat, lon } => {
                outcome.stats.invalid_coordinates += 1;
                if self.options.debug {
                    log::debug!("{}: invalid coordinates {}, {}", location(), lat, lon);
                }
            }
            Verdict::BeyondCeiling(far) => {
                outcome.stats.beyond_ceiling += 1;
                if self.options.debug {
                    log::debug!(
                        "{}: mmsi {} at {:.1} nm beyond sanity ceiling",
                        location(),
                        far.mmsi,
                        far.distance
                    );
                    outcome.far_records.push(far);
                }
            }
        }
    }

    fn evaluate(&self, candidate: Candidate, raw_line: &str) -> Verdict {
        if self.options.exclude.contains(&candidate.mmsi) {
            return Verdict::Excluded;
        }

        let (Some(lat), Some(lon)) = (candidate.lat, candidate.lon) else {
            return Verdict::MissingPosition;
        };

        if !is_valid_position(lat, lon) {
            return Verdict::InvalidCoordinates { lat, lon };
        }

        let distance = distance_nm(self.station, lat, lon);
        let bearing = bearing_deg(self.station, lat, lon);

        if distance.is_nan() || distance > self.options.sanity_ceiling_nm {
            return Verdict::BeyondCeiling(FarRecord {
                distance,
                bearing,
                mmsi: candidate.mmsi,
                lat,
                lon,
                timestamp: candidate.timestamp,
                raw_line: raw_line.to_string(),
            });
        }

        Verdict::Accepted(ObservationSample {
            distance_nm: distance,
            bearing_deg: bearing,
            mmsi: candidate.mmsi,
            date: candidate.date,
            hour: candidate.hour,
            lat,
            lon,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::process::Command as StdCommand;

    // ~0.1 degree of latitude is six nautical miles
    const STATION_LAT: f64 = 52.0;
    const STATION_LON: f64 = 4.0;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ais-beam-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn line(mmsi: u64, timestamp: &str, lat: f64, lon: f64) -> String {
        format!(
            r#"{{"topic":"ais","timestamp":"{timestamp}","payload":{{"mmsi":{mmsi},"lat":{lat},"lon":{lon}}}}}"#
        )
    }

    fn write_lines(path: &Path, lines: &[String]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, lines.join("\n")).unwrap();
    }

    fn station() -> Station {
        Station::new(STATION_LAT, STATION_LON)
    }

    #[test]
    fn day_and_night_counts_for_one_date() {
        let dir = scratch_dir();
        let file = dir.join("rx.jsonl");
        write_lines(
            &file,
            &[
                line(1, "20240315090000", 52.1, 4.0),
                line(2, "20240315140000", 52.2, 4.1),
                line(3, "20240315220000", 51.9, 3.9),
            ],
        );

        let station = station();
        let options = IngestOptions::default();
        let outcome = Ingestor::new(&station, &options).ingest_path(&file).unwrap();

        let day = &outcome.aggregation.daily["20240315"];
        assert_eq!(day.day_count, 2);
        assert_eq!(day.night_count, 1);
        assert_eq!(day.total_count, 3);
        assert_eq!(day.max_distance_id, Some(2));
        assert_eq!(outcome.stats.accepted, 3);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn excluded_ids_vanish_from_every_output() {
        let dir = scratch_dir();
        let file = dir.join("rx.jsonl");
        write_lines(
            &file,
            &[
                line(123, "20240315090000", 52.3, 4.0),
                line(7, "20240315100000", 52.1, 4.0),
                line(123, "20240316100000", 52.4, 4.0),
                line(123, "20240316110000", 52.0, 4.1),
            ],
        );

        let station = station();
        let options = IngestOptions {
            exclude: HashSet::from([123]),
            ..IngestOptions::default()
        };
        let outcome = Ingestor::new(&station, &options).ingest_path(&file).unwrap();

        assert_eq!(outcome.stats.excluded, 3);
        assert_eq!(outcome.stats.accepted, 1);
        assert!(outcome.aggregation.positions.iter().all(|p| p.mmsi != 123));
        assert_eq!(outcome.aggregation.distances.len(), 1);
        assert!(!outcome.aggregation.daily.contains_key("20240316"));
        assert_eq!(outcome.aggregation.daily["20240315"].max_distance_id, Some(7));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn filters_apply_in_order() {
        let dir = scratch_dir();
        let file = dir.join("rx.jsonl");
        write_lines(
            &file,
            &[
                "{ broken".to_string(),
                r#"{"topic":"ais","timestamp":"20240315090000","payload":{"mmsi":1,"lat":52.0}}"#
                    .to_string(),
                line(2, "20240315090000", 91.0, 4.0),
                line(3, "20240315090000", 52.0, 181.0),
                line(4, "20240315090000", 60.0, 4.0),
                line(5, "20240315090000", 52.05, 4.05),
                r#"{"topic":"status","timestamp":"20240315090000","payload":{"mmsi":6}}"#
                    .to_string(),
            ],
        );

        let station = station();
        let options = IngestOptions::default();
        let outcome = Ingestor::new(&station, &options).ingest_path(&file).unwrap();

        let stats = outcome.stats;
        assert_eq!(stats.lines, 7);
        assert_eq!(stats.malformed_lines, 1);
        assert_eq!(stats.missing_position, 1);
        assert_eq!(stats.invalid_coordinates, 2);
        assert_eq!(stats.beyond_ceiling, 1);
        assert_eq!(stats.accepted, 1);
        assert!(outcome.far_records.is_empty());
        assert_eq!(outcome.aggregation.positions[0].mmsi, 5);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn debug_mode_keeps_far_records() {
        let dir = scratch_dir();
        let file = dir.join("rx.jsonl");
        let far = line(4, "20240315090000", 60.0, 4.0);
        write_lines(&file, &[far.clone()]);

        let station = station();
        let options = IngestOptions {
            debug: true,
            ..IngestOptions::default()
        };
        let outcome = Ingestor::new(&station, &options).ingest_path(&file).unwrap();

        assert!(outcome.aggregation.is_empty());
        assert_eq!(outcome.far_records.len(), 1);
        let record = &outcome.far_records[0];
        assert_eq!(record.mmsi, 4);
        assert_eq!(record.raw_line, far);
        assert_eq!(record.timestamp, "20240315090000");
        // 8 degrees of latitude due north
        assert!((record.distance - 480.3).abs() < 0.5);
        assert!(record.bearing.abs() < 1e-9);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn antipodal_record_is_beyond_the_ceiling() {
        let dir = scratch_dir();
        let file = dir.join("rx.jsonl");
        write_lines(&file, &[line(8, "20240315090000", 79.1189, 11.8733)]);

        let station = Station::new(-79.1189, -168.1267);
        let options = IngestOptions::default();
        let outcome = Ingestor::new(&station, &options).ingest_path(&file).unwrap();

        assert_eq!(outcome.stats.accepted, 0);
        assert_eq!(outcome.stats.beyond_ceiling, 1);
        assert!(outcome.aggregation.distances.is_empty());
        assert!(outcome.aggregation.daily.is_empty());

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn directory_results_merge_in_traversal_order() {
        let dir = scratch_dir();
        write_lines(
            &dir.join("b.jsonl"),
            &[line(20, "20240315100000", 52.1, 4.0)],
        );
        write_lines(
            &dir.join("a/one.jsonl"),
            &[line(10, "20240315100000", 52.1, 4.0)],
        );
        write_lines(&dir.join("a/skip.txt"), &[line(99, "20240315100000", 52.5, 4.0)]);

        let station = station();
        let options = IngestOptions::default();
        let outcome = Ingestor::new(&station, &options).ingest_path(&dir).unwrap();

        assert_eq!(outcome.stats.files, 2);
        let ids: Vec<_> = outcome.aggregation.positions.iter().map(|p| p.mmsi).collect();
        assert_eq!(ids, vec![10, 20]);
        // equal distance: first file wins
        assert_eq!(outcome.aggregation.daily["20240315"].max_distance_id, Some(10));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn failed_decompression_aborts_the_run() {
        let dir = scratch_dir();
        write_lines(
            &dir.join("a.jsonl"),
            &[line(1, "20240315100000", 52.1, 4.0)],
        );
        fs::write(dir.join("b.jsonl.gz"), "garbage").unwrap();

        let station = station();
        let options = IngestOptions::default();
        let err = Ingestor::new(&station, &options)
            .ingest_path(&dir)
            .unwrap_err();
        assert!(matches!(err, IngestError::Decompression { .. }));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn compressed_files_contribute_like_plain_ones() {
        let dir = scratch_dir();
        let plain = dir.join("rx.jsonl");
        write_lines(
            &plain,
            &[
                line(1, "20240315100000", 52.1, 4.0),
                line(2, "20240315230000", 52.2, 4.0),
            ],
        );
        assert!(StdCommand::new("gzip").arg(&plain).status().unwrap().success());

        let station = station();
        let options = IngestOptions::default();
        let outcome = Ingestor::new(&station, &options).ingest_path(&dir).unwrap();
        assert_eq!(outcome.stats.accepted, 2);
        assert_eq!(outcome.aggregation.daily["20240315"].night_count, 1);

        fs::remove_dir_all(dir).unwrap();
    }
}
