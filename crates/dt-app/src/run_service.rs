//! Trial execution: single runs, measured-point comparison and length sweeps.

use std::ops::ControlFlow;
use std::time::Instant;

use dt_hydraulics::DarcyFriction;
use dt_sim::{DrainOutcome, DrainProgress, TerminalState, run_drain, run_drain_with_progress};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::experiment::ExperimentConfig;
use crate::metrics::{self, ComparisonRow};
use crate::progress::{DrainStepProgress, RunProgressEvent, RunStage};

/// Serializable summary of one drain run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialReport {
    pub tube_length_m: f64,
    pub with_t_joint: bool,
    pub state: TerminalState,
    /// Drain time; present only for converged runs
    pub predicted_time_s: Option<f64>,
    pub elapsed_s: f64,
    pub final_level_m: f64,
    pub steps: usize,
    pub mean_outlet_velocity_mps: Option<f64>,
    /// Error message of the failed step, if any
    pub failure: Option<String>,
}

impl TrialReport {
    pub fn from_outcome(tube_length_m: f64, with_t_joint: bool, outcome: &DrainOutcome) -> Self {
        Self {
            tube_length_m,
            with_t_joint,
            state: outcome.state,
            predicted_time_s: outcome.drain_time().ok(),
            elapsed_s: outcome.elapsed_s,
            final_level_m: outcome.final_level_m,
            steps: outcome.records.len(),
            mean_outlet_velocity_mps: outcome.mean_outlet_velocity(),
            failure: outcome.failure.as_ref().map(|f| {
                format!("step {} at t = {:.2} s: {}", f.step, f.time_s, f.error)
            }),
        }
    }

    /// Report for a run that was rejected before its first step.
    pub fn rejected(
        tube_length_m: f64,
        with_t_joint: bool,
        start_level_m: f64,
        error: &AppError,
    ) -> Self {
        Self {
            tube_length_m,
            with_t_joint,
            state: TerminalState::Failed,
            predicted_time_s: None,
            elapsed_s: 0.0,
            final_level_m: start_level_m,
            steps: 0,
            mean_outlet_velocity_mps: None,
            failure: Some(error.to_string()),
        }
    }
}

/// Wall-clock timing of a trial.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub validate_time_s: f64,
    pub drain_time_s: f64,
    pub total_time_s: f64,
    pub steps: usize,
}

/// Report plus the full per-step outcome.
#[derive(Debug, Clone)]
pub struct TrialResponse {
    pub report: TrialReport,
    pub outcome: DrainOutcome,
    pub timing: RunTimingSummary,
}

/// Mean outlet velocity for one tube length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub tube_length_m: f64,
    pub state: TerminalState,
    pub mean_outlet_velocity_mps: Option<f64>,
    pub drain_time_s: Option<f64>,
    pub failure: Option<String>,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    tube_length_m: f64,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            tube_length_m,
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

/// Run one trial at the given tube length.
pub fn run_trial(
    config: &ExperimentConfig,
    tube_length_m: f64,
    with_t_joint: bool,
) -> AppResult<TrialResponse> {
    run_trial_with_progress(config, tube_length_m, with_t_joint, None)
}

/// Run one trial and stream stage and per-step progress events.
///
/// Configuration problems are returned as `Err`. A run that times out or
/// fails mid-way still returns `Ok`; its report carries the terminal state.
pub fn run_trial_with_progress(
    config: &ExperimentConfig,
    tube_length_m: f64,
    with_t_joint: bool,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<TrialResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();

    emit_progress(
        &mut progress_cb,
        tube_length_m,
        RunStage::ValidatingConfig,
        started,
        Some("Validating experiment".to_string()),
    );

    config.validate()?;
    if !(tube_length_m.is_finite() && tube_length_m > 0.0) {
        return Err(AppError::InvalidInput(format!(
            "tube length must be positive, got {tube_length_m}"
        )));
    }
    let geometry = config.geometry(tube_length_m);
    let fluid = config.fluid();
    let losses = config.losses(with_t_joint);
    let options = config.options();
    let friction = DarcyFriction::default();
    timing.validate_time_s = started.elapsed().as_secs_f64();

    emit_progress(
        &mut progress_cb,
        tube_length_m,
        RunStage::Draining,
        started,
        Some(format!("Draining through a {tube_length_m:.2} m tube")),
    );

    let drain_started = Instant::now();
    let observing = progress_cb.is_some();
    let outcome = {
        let mut observer = |p: &DrainProgress| {
            if let Some(cb) = progress_cb.as_deref_mut() {
                cb(RunProgressEvent {
                    tube_length_m,
                    stage: RunStage::Draining,
                    elapsed_wall_s: started.elapsed().as_secs_f64(),
                    message: None,
                    drain: Some(DrainStepProgress::from(p)),
                });
            }
            ControlFlow::Continue(())
        };
        if observing {
            run_drain_with_progress(
                &geometry,
                &fluid,
                &losses,
                &options,
                &friction,
                Some(&mut observer),
            )?
        } else {
            run_drain(&geometry, &fluid, &losses, &options, &friction)?
        }
    };
    timing.drain_time_s = drain_started.elapsed().as_secs_f64();
    timing.steps = outcome.records.len();
    timing.total_time_s = started.elapsed().as_secs_f64();

    let report = TrialReport::from_outcome(tube_length_m, with_t_joint, &outcome);
    debug!(
        tube_length_m,
        with_t_joint,
        state = report.state.label(),
        predicted_time_s = ?report.predicted_time_s,
        wall_s = timing.total_time_s,
        "trial finished"
    );

    emit_progress(
        &mut progress_cb,
        tube_length_m,
        RunStage::Completed,
        started,
        Some(format!("Run {}", report.state.label())),
    );

    Ok(TrialResponse {
        report,
        outcome,
        timing,
    })
}

/// Run one trial inside a batch. A rejected length becomes a `Failed`
/// report so the rest of the batch still runs.
fn batch_trial(config: &ExperimentConfig, tube_length_m: f64, with_t_joint: bool) -> TrialReport {
    match run_trial(config, tube_length_m, with_t_joint) {
        Ok(response) => response.report,
        Err(error) => {
            warn!(tube_length_m, error = %error, "trial rejected");
            TrialReport::rejected(tube_length_m, with_t_joint, config.start_level_m(), &error)
        }
    }
}

/// Predicted vs measured drain time for every measured point.
///
/// A run that does not converge, or is rejected, yields a row without a
/// prediction; the remaining points still run.
pub fn compare_measured(
    config: &ExperimentConfig,
    with_t_joint: bool,
) -> AppResult<Vec<ComparisonRow>> {
    config.validate()?;
    if config.measurements.is_empty() {
        return Err(AppError::InvalidInput(
            "experiment has no measured points".to_string(),
        ));
    }

    let mut rows = Vec::with_capacity(config.measurements.len());
    for measurement in &config.measurements {
        let report = batch_trial(config, measurement.tube_length_m, with_t_joint);
        if report.state != TerminalState::Converged {
            warn!(
                tube_length_m = measurement.tube_length_m,
                state = report.state.label(),
                "no prediction for measured point"
            );
        }
        rows.push(metrics::comparison_row(measurement, &report));
    }

    info!(points = rows.len(), with_t_joint, "comparison finished");
    Ok(rows)
}

/// Evenly spaced tube lengths from `from` to `to` inclusive.
pub fn sweep_lengths(from: f64, to: f64, step: f64) -> AppResult<Vec<f64>> {
    if !(from.is_finite() && from > 0.0) {
        return Err(AppError::InvalidInput(format!(
            "sweep start must be positive, got {from}"
        )));
    }
    if !(step.is_finite() && step > 0.0) {
        return Err(AppError::InvalidInput(format!(
            "sweep step must be positive, got {step}"
        )));
    }
    if !(to.is_finite() && to >= from) {
        return Err(AppError::InvalidInput(format!(
            "sweep end {to} is before start {from}"
        )));
    }

    // Index-based so the end point survives rounding.
    let count = ((to - from) / step + 1e-9).floor() as usize + 1;
    Ok((0..count).map(|i| from + i as f64 * step).collect())
}

/// Mean outlet velocity per tube length, ordered by length.
///
/// Runs are independent and execute in parallel. A rejected length shows up
/// as a `Failed` point carrying the reason.
pub fn sweep_average_velocity(
    config: &ExperimentConfig,
    lengths: &[f64],
    with_t_joint: bool,
) -> AppResult<Vec<SweepPoint>> {
    config.validate()?;

    let mut points = lengths
        .par_iter()
        .map(|&length| {
            let report = batch_trial(config, length, with_t_joint);
            SweepPoint {
                tube_length_m: length,
                state: report.state,
                mean_outlet_velocity_mps: report.mean_outlet_velocity_mps,
                drain_time_s: report.predicted_time_s,
                failure: report.failure,
            }
        })
        .collect::<Vec<_>>();

    points.sort_by(|a, b| a.tube_length_m.total_cmp(&b.tube_length_m));
    debug!(points = points.len(), "sweep finished");
    Ok(points)
}
