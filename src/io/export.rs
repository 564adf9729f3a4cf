//! CSV and JSON export for forecasts and schedule results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::model::types::{GridWindow, ScheduleRecord, ScheduleResult};

/// Column header for CSV schedule export.
const SCHEDULE_HEADER: &str = "workload,start_offset_hours,\
                               baseline_avg_price,baseline_avg_carbon,\
                               baseline_cost,baseline_carbon_kg,\
                               optimized_avg_price,optimized_avg_carbon,\
                               optimized_cost,optimized_carbon_kg,\
                               cost_savings,cost_savings_pct,\
                               carbon_savings_kg,carbon_savings_pct";

/// Column header for CSV forecast export.
const FORECAST_HEADER: &str = "hour_offset,price,carbon_intensity,renewable_fraction";

/// Supported export formats, detected from the output file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// Auto-detects the format from a path extension.
    pub fn detect(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            ext if ext.eq_ignore_ascii_case("json") => Some(Self::Json),
            ext if ext.eq_ignore_ascii_case("csv") => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Exports schedule results to the path, picking the format by extension.
///
/// # Errors
///
/// Returns an `io::Error` if the extension is unrecognized or writing
/// fails.
pub fn export_schedules(results: &[ScheduleResult], path: &Path) -> io::Result<()> {
    let format = ExportFormat::detect(path).ok_or_else(|| {
        io::Error::other(format!(
            "cannot detect export format from \"{}\" (expected .json or .csv)",
            path.display()
        ))
    })?;
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    match format {
        ExportFormat::Json => write_schedules_json(results, buf),
        ExportFormat::Csv => write_schedules_csv(results, buf),
    }
}

/// Writes schedule results as JSON (the wire shape of the API).
///
/// # Errors
///
/// Returns an `io::Error` if serialization or writing fails.
pub fn write_schedules_json(results: &[ScheduleResult], writer: impl Write) -> io::Result<()> {
    let records: Vec<ScheduleRecord> = results.iter().map(ScheduleRecord::from).collect();
    serde_json::to_writer_pretty(writer, &records)
        .map_err(|e| io::Error::other(format!("serialize schedules: {e}")))
}

/// Writes schedule results as CSV, one row per workload.
///
/// Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_schedules_csv(results: &[ScheduleResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(SCHEDULE_HEADER.split(',').map(str::trim))?;

    for r in results {
        let s = r.savings();
        wtr.write_record(&[
            r.workload.name.clone(),
            r.start_offset_hours.to_string(),
            format!("{:.4}", r.baseline.avg_price),
            format!("{:.2}", r.baseline.avg_carbon),
            format!("{:.2}", r.baseline.total_cost),
            format!("{:.3}", r.baseline.total_carbon_kg),
            format!("{:.4}", r.optimized.avg_price),
            format!("{:.2}", r.optimized.avg_carbon),
            format!("{:.2}", r.optimized.total_cost),
            format!("{:.3}", r.optimized.total_carbon_kg),
            format!("{:.2}", s.cost_abs),
            format!("{:.1}", s.cost_pct),
            format!("{:.3}", s.carbon_abs),
            format!("{:.1}", s.carbon_pct),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes a forecast as CSV, one row per hourly window.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_forecast_csv(windows: &[GridWindow], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(FORECAST_HEADER.split(','))?;

    for w in windows {
        wtr.write_record(&[
            w.hour_offset.to_string(),
            format!("{:.4}", w.price),
            format!("{:.2}", w.carbon_intensity),
            format!("{:.3}", w.renewable_fraction),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autopilot::Autopilot;
    use crate::grid::{GridOracle, Region, RegionTable};
    use crate::model::types::{OptimizationWeights, Workload};

    fn sample_result() -> ScheduleResult {
        let table = RegionTable::builtin();
        let forecast = GridOracle::new(&table, Region::UsWest)
            .forecast(24)
            .expect("forecast");
        let workload = Workload::new("train", 6.0, 120.0, 24.0).expect("valid workload");
        Autopilot::new(OptimizationWeights::default())
            .optimize(&workload, &forecast)
            .expect("feasible")
    }

    #[test]
    fn format_detection() {
        assert_eq!(
            ExportFormat::detect(Path::new("out.json")),
            Some(ExportFormat::Json)
        );
        assert_eq!(
            ExportFormat::detect(Path::new("out.CSV")),
            Some(ExportFormat::Csv)
        );
        assert_eq!(ExportFormat::detect(Path::new("out.txt")), None);
        assert_eq!(ExportFormat::detect(Path::new("out")), None);
    }

    #[test]
    fn schedule_csv_has_header_and_one_row_per_result() {
        let results = vec![sample_result(), sample_result()];
        let mut buf = Vec::new();
        write_schedules_csv(&results, &mut buf).expect("csv export should succeed");

        let csv = String::from_utf8(buf).expect("valid UTF-8");
        let mut lines = csv.lines();
        let header = lines.next().unwrap_or("");
        assert!(header.starts_with("workload,start_offset_hours"));
        assert!(header.ends_with("carbon_savings_pct"));
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn schedule_csv_is_deterministic() {
        let results = vec![sample_result()];
        let mut a = Vec::new();
        let mut b = Vec::new();
        write_schedules_csv(&results, &mut a).expect("first export");
        write_schedules_csv(&results, &mut b).expect("second export");
        assert_eq!(a, b);
    }

    #[test]
    fn schedule_json_carries_wire_blocks() {
        let results = vec![sample_result()];
        let mut buf = Vec::new();
        write_schedules_json(&results, &mut buf).expect("json export");

        let parsed: Vec<serde_json::Value> =
            serde_json::from_slice(&buf).expect("valid JSON output");
        assert_eq!(parsed.len(), 1);
        let r = &parsed[0];
        assert_eq!(r["workload"], "train");
        assert_eq!(r["baseline"]["start"], 0);
        assert!(r["optimized"]["avg_price"].is_number());
        assert!(r["savings"]["carbon_pct"].is_number());
    }

    #[test]
    fn forecast_csv_has_row_per_window() {
        let table = RegionTable::builtin();
        let forecast = GridOracle::new(&table, Region::Nordic)
            .forecast(12)
            .expect("forecast");
        let mut buf = Vec::new();
        write_forecast_csv(&forecast, &mut buf).expect("csv export");

        let csv = String::from_utf8(buf).expect("valid UTF-8");
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(FORECAST_HEADER));
        assert_eq!(lines.count(), 12);
    }
}
