//! Query helpers for extracting data from drain records.

use std::fmt::Write as _;

use dt_sim::DrainRecord;

use crate::error::{AppError, AppResult};

/// Variables that can be pulled out of a record series.
pub const SERIES_VARIABLES: &[&str] = &[
    "v1", "v2", "height", "volume", "dh", "dv", "friction", "reynolds",
];

/// Summary of a run's time range and data.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub time_range: (f64, f64),
    pub record_count: usize,
    pub level_range: (f64, f64),
    pub peak_outlet_velocity_mps: f64,
}

/// Get run summary from drain records.
pub fn get_run_summary(records: &[DrainRecord]) -> AppResult<RunSummary> {
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return Err(AppError::InvalidInput("No records in run".to_string()));
    };

    let peak = records.iter().map(|r| r.v2).fold(0.0, f64::max);

    Ok(RunSummary {
        time_range: (first.t, last.t),
        record_count: records.len(),
        level_range: (last.height, first.height),
        peak_outlet_velocity_mps: peak,
    })
}

fn value_of(record: &DrainRecord, variable: &str) -> Option<f64> {
    let v = match variable {
        "v1" | "inlet_velocity" => record.v1,
        "v2" | "outlet_velocity" => record.v2,
        "height" | "level" => record.height,
        "volume" => record.volume,
        "dh" => record.dh,
        "dv" => record.dv,
        "friction" | "f" => record.friction,
        "reynolds" | "re" => record.reynolds,
        _ => return None,
    };
    Some(v)
}

/// Extract `(t, value)` pairs for one variable.
pub fn extract_series(records: &[DrainRecord], variable: &str) -> AppResult<Vec<(f64, f64)>> {
    if let Some(first) = records.first() {
        if value_of(first, variable).is_none() {
            return Err(AppError::InvalidInput(format!(
                "Unknown series variable: {}",
                variable
            )));
        }
    }

    Ok(records
        .iter()
        .filter_map(|r| value_of(r, variable).map(|v| (r.t, v)))
        .collect())
}

/// `(t, height)` pairs for plotting.
pub fn height_series(records: &[DrainRecord]) -> Vec<(f64, f64)> {
    records.iter().map(|r| (r.t, r.height)).collect()
}

/// Full record series as CSV with a header row.
pub fn records_to_csv(records: &[DrainRecord]) -> String {
    let mut csv = String::from("t_s,v1_mps,v2_mps,height_m,volume_m3,dh_m,dv_m3,friction,reynolds\n");
    for r in records {
        // Writing into a String cannot fail.
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{},{},{},{}",
            r.t, r.v1, r.v2, r.height, r.volume, r.dh, r.dv, r.friction, r.reynolds
        );
    }
    csv
}
