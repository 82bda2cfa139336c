use std::fmt::Write;

use super::Report;
use crate::aggregate::{SectorCounts, SECTOR_WIDTH_DEG};
use crate::stats::BeamWidthStats;

const BEARING_LIST_LIMIT: usize = 20;

pub fn render_text(report: &Report) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    write_report(&mut out, report)?;
    Ok(out)
}

fn write_report(out: &mut String, report: &Report) -> std::fmt::Result {
    let station = &report.station;
    writeln!(
        out,
        "Station {}({:.5}, {:.5})",
        station
            .name
            .as_deref()
            .map(|n| format!("{n} "))
            .unwrap_or_default(),
        station.latitude_deg,
        station.longitude_deg
    )?;
    writeln!(out)?;

    write_daily(out, report)?;
    write_counters(out, report)?;
    write_sectors(out, report)?;
    write_distribution(out, report)?;
    match &report.beam {
        Some(beam) => write_beam(out, beam)?,
        None => writeln!(out, "Beam width: no samples")?,
    }
    write_far_records(out, report)
}

fn write_daily(out: &mut String, report: &Report) -> std::fmt::Result {
    writeln!(
        out,
        "{:<10} {:>8} {:>8} {:>8} {:>10} {:>11}",
        "Date", "Day", "Night", "Total", "Max (nm)", "Max MMSI"
    )?;

    let (mut day, mut night, mut total) = (0, 0, 0);
    let mut max_distance = 0.0;
    for (date, agg) in &report.daily {
        writeln!(
            out,
            "{:<10} {:>8} {:>8} {:>8} {:>10.1} {:>11}",
            date,
            agg.day_count,
            agg.night_count,
            agg.total_count,
            agg.max_distance,
            agg.max_distance_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string())
        )?;
        day += agg.day_count;
        night += agg.night_count;
        total += agg.total_count;
        if agg.max_distance > max_distance {
            max_distance = agg.max_distance;
        }
    }
    writeln!(
        out,
        "{:<10} {:>8} {:>8} {:>8} {:>10.1}",
        "Total", day, night, total, max_distance
    )?;
    writeln!(out)
}

fn write_counters(out: &mut String, report: &Report) -> std::fmt::Result {
    let stats = &report.stats;
    writeln!(
        out,
        "Files: {}  Lines: {}  Accepted: {}",
        stats.files, stats.lines, stats.accepted
    )?;
    writeln!(
        out,
        "Skipped: {} excluded, {} malformed, {} without position, {} invalid coordinates, {} beyond sanity range",
        stats.excluded,
        stats.malformed_lines,
        stats.missing_position,
        stats.invalid_coordinates,
        stats.beyond_ceiling
    )?;

    let bounds = report.filtered.bounds;
    if bounds.is_active() {
        writeln!(
            out,
            "Distance filter: min {:.1} nm, max {:.1} nm ({} of {} samples kept)",
            bounds.min_distance,
            bounds.max_distance,
            report.filtered.len(),
            report.unfiltered_count
        )?;
    }
    writeln!(out)
}

fn write_sectors(out: &mut String, report: &Report) -> std::fmt::Result {
    let sectors = &report.filtered.sectors;
    if sectors.is_empty() {
        return Ok(());
    }

    writeln!(out, "Bearing sectors")?;
    let total = sectors.total() as f64;
    for sector in SectorCounts::sectors() {
        let count = sectors.get(sector);
        writeln!(
            out,
            "  {:>3}-{:<3} {:>8} {:>6.1}%",
            sector,
            sector + SECTOR_WIDTH_DEG as u16,
            count,
            count as f64 * 100.0 / total
        )?;
    }
    writeln!(out)
}

fn write_distribution(out: &mut String, report: &Report) -> std::fmt::Result {
    let Some(dist) = &report.distribution else {
        return writeln!(out, "Distance distribution: no samples\n");
    };

    writeln!(
        out,
        "Distance distribution ({} samples, {:.1}-{:.1} nm)",
        dist.count, dist.min, dist.max
    )?;
    for (count, (lo, hi)) in dist.bins.iter().zip(dist.bin_ranges.iter()) {
        let share = *count as f64 * 100.0 / dist.count as f64;
        writeln!(out, "  {:>6.1}-{:<6.1} {:>8} {:>6.1}%", lo, hi, count, share)?;
    }
    writeln!(out)
}

fn write_beam(out: &mut String, beam: &BeamWidthStats) -> std::fmt::Result {
    writeln!(out, "Beam width")?;
    writeln!(
        out,
        "  Mean bearing {:.1}°, concentration {:.3}",
        beam.mean_bearing, beam.concentration
    )?;
    for window in &beam.percentiles {
        writeln!(
            out,
            "  {:>3.0}%: {:>5.1}° to {:>5.1}°, width {:>5.1}°, center {:>5.1}°",
            window.percentile * 100.0,
            window.min_bearing,
            window.max_bearing,
            window.beam_width,
            window.center_bearing
        )?;
    }

    let far = &beam.max_distance_analysis;
    writeln!(
        out,
        "  Farthest {}: avg {:.1} nm, bearings {:.1}° to {:.1}° (spread {:.1}°)",
        far.count, far.avg_distance, far.min_bearing, far.max_bearing, far.spread
    )?;
    if far.count <= BEARING_LIST_LIMIT {
        let list: Vec<String> = far.bearings.iter().map(|b| format!("{b:.1}")).collect();
        writeln!(out, "  Bearings: {}", list.join(", "))?;
    }
    writeln!(out)
}

fn write_far_records(out: &mut String, report: &Report) -> std::fmt::Result {
    if report.far_records.is_empty() {
        return Ok(());
    }

    writeln!(out, "Farthest records beyond sanity range")?;
    for far in &report.far_records {
        writeln!(
            out,
            "  {:>8.1} nm {:>5.1}° mmsi {} at {:.5},{:.5} {}",
            far.distance, far.bearing, far.mmsi, far.lat, far.lon, far.timestamp
        )?;
        writeln!(out, "    {}", far.raw_line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::ObservationSample;
    use crate::geodesy::Station;
    use crate::ingest::IngestOutcome;
    use crate::stats::DistanceBounds;

    fn report(count: usize) -> Report {
        let mut outcome = IngestOutcome::default();
        for i in 0..count {
            outcome.aggregation.record(&ObservationSample {
                distance_nm: 1.0 + i as f64,
                bearing_deg: (i * 3 % 360) as f64,
                mmsi: 200 + i as u64,
                date: format!("2024060{}", 1 + i % 2),
                hour: 9,
                lat: 52.0,
                lon: 4.0,
            });
        }
        let mut station = Station::new(52.0, 4.0);
        station.name = Some("Pier".to_string());
        Report::build(station, outcome, DistanceBounds::default())
    }

    #[test]
    fn renders_every_section() {
        let text = render_text(&report(10)).unwrap();
        assert!(text.starts_with("Station Pier (52.00000, 4.00000)"));
        assert!(text.contains("20240601"));
        assert!(text.contains("20240602"));
        assert!(text.contains("Distance distribution (10 samples"));
        assert!(text.contains("Mean bearing"));
        assert!(text.contains(" 68%"));
        assert!(text.contains("Bearings: 27.0"));
        assert!(!text.contains("Distance filter"));
    }

    #[test]
    fn long_far_field_lists_are_omitted() {
        // 0.05 * 500 = 25 far-field bearings
        let text = render_text(&report(500)).unwrap();
        assert!(text.contains("Farthest 25:"));
        assert!(!text.contains("Bearings:"));
    }

    #[test]
    fn empty_run_still_renders() {
        let text = render_text(&report(0)).unwrap();
        assert!(text.contains("Distance distribution: no samples"));
        assert!(text.contains("Beam width: no samples"));
    }
}
