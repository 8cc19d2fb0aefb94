//! Agreement metrics between predicted and measured drain times.

use dt_core::percent_error;
use dt_sim::TerminalState;
use serde::{Deserialize, Serialize};

use crate::experiment::Measurement;
use crate::run_service::TrialReport;

/// One measured point next to its prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub tube_length_m: f64,
    pub state: TerminalState,
    pub predicted_time_s: Option<f64>,
    pub measured_time_s: f64,
    /// Measured minus predicted (seconds)
    pub difference_s: Option<f64>,
    /// (predicted − measured) / measured × 100
    pub percent_error: Option<f64>,
    /// Why the run gave no prediction, if it failed or was rejected
    pub failure: Option<String>,
}

pub fn comparison_row(measurement: &Measurement, report: &TrialReport) -> ComparisonRow {
    let predicted = report.predicted_time_s;
    ComparisonRow {
        tube_length_m: measurement.tube_length_m,
        state: report.state,
        predicted_time_s: predicted,
        measured_time_s: measurement.measured_time_s,
        difference_s: predicted.map(|p| measurement.measured_time_s - p),
        percent_error: predicted.and_then(|p| percent_error(p, measurement.measured_time_s)),
        failure: report.failure.clone(),
    }
}

/// Aggregate agreement over a comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ComparisonSummary {
    pub points: usize,
    /// Rows with a prediction
    pub predicted: usize,
    pub mean_abs_percent_error: Option<f64>,
    pub max_abs_percent_error: Option<f64>,
    /// Predictions strictly increase with tube length (rows sorted by length)
    pub monotonic_in_length: bool,
}

pub fn summarize(rows: &[ComparisonRow]) -> ComparisonSummary {
    let errors: Vec<f64> = rows
        .iter()
        .filter_map(|r| r.percent_error)
        .map(f64::abs)
        .collect();

    let mut sorted: Vec<&ComparisonRow> = rows.iter().collect();
    sorted.sort_by(|a, b| a.tube_length_m.total_cmp(&b.tube_length_m));
    let predictions: Vec<Option<f64>> = sorted.iter().map(|r| r.predicted_time_s).collect();
    let monotonic_in_length = predictions.windows(2).all(|w| match (w[0], w[1]) {
        (Some(a), Some(b)) => b > a,
        _ => false,
    });

    ComparisonSummary {
        points: rows.len(),
        predicted: rows.iter().filter(|r| r.predicted_time_s.is_some()).count(),
        mean_abs_percent_error: if errors.is_empty() {
            None
        } else {
            Some(errors.iter().sum::<f64>() / errors.len() as f64)
        },
        max_abs_percent_error: errors.iter().copied().reduce(f64::max),
        monotonic_in_length,
    }
}
