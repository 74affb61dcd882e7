//! Result files for one delivery day.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};

use courier_core::{FlightMove, RunReport};

/// Paths of the files written for a run.
#[derive(Debug, Clone)]
pub struct OutputFiles {
    pub deliveries: PathBuf,
    pub flightpath: PathBuf,
    pub geojson: PathBuf,
}

impl OutputFiles {
    pub fn for_date(dir: &Path, date: NaiveDate) -> Self {
        Self {
            deliveries: dir.join(format!("deliveries-{}.json", date)),
            flightpath: dir.join(format!("flightpath-{}.json", date)),
            geojson: dir.join(format!("drone-{}.geojson", date.format("%d-%m-%Y"))),
        }
    }
}

/// The drone's track as a FeatureCollection holding one LineString: every
/// move's origin followed by the last move's destination.
pub fn flight_geojson(log: &[FlightMove]) -> Value {
    let mut points: Vec<[f64; 2]> = log
        .iter()
        .map(|step| [step.origin.lng, step.origin.lat])
        .collect();
    if let Some(last) = log.last() {
        points.push([last.destination.lng, last.destination.lat]);
    }

    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "LineString",
                "coordinates": points,
            }
        }]
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialise {}", path.display()))?;
    std::fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write deliveries, flight path and GeoJSON track into `dir`.
pub fn write_outputs(dir: &Path, date: NaiveDate, report: &RunReport) -> Result<OutputFiles> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let files = OutputFiles::for_date(dir, date);
    write_json(&files.deliveries, &report.deliveries)?;
    write_json(&files.flightpath, &report.flight_log)?;
    write_json(&files.geojson, &flight_geojson(&report.flight_log))?;

    tracing::info!(
        "Wrote {} deliveries and {} moves to {}",
        report.deliveries.len(),
        report.flight_log.len(),
        dir.display()
    );
    Ok(files)
}

/// One-line human summary of a run.
pub fn summary_line(date: NaiveDate, report: &RunReport) -> String {
    format!(
        "{}: delivered {}/{} orders, {:.2}% of order value, {} moves used",
        date,
        report.delivered,
        report.attempted,
        report.monetary_percentage(),
        report.flight_log.len()
    )
}
