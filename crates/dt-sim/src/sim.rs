//! Drain simulator: fixed-step loop, termination and result recording.

use std::ops::ControlFlow;

use dt_hydraulics::{FluidProperties, FrictionModel, Geometry, LossConfig, step_flow};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{SimError, SimResult};
use crate::events;
use crate::state::FlowState;

/// Options for drain runs.
#[derive(Clone, Debug, PartialEq)]
pub struct DrainOptions {
    /// Fixed time step (seconds)
    pub dt_s: f64,
    /// Safety cap on elapsed time (seconds)
    pub time_cap_s: f64,
    /// Friction coefficient assumed before any flow exists
    pub friction_seed: f64,
}

impl Default for DrainOptions {
    fn default() -> Self {
        Self {
            dt_s: 1e-2,
            time_cap_s: 500.0,
            friction_seed: 1.0,
        }
    }
}

impl DrainOptions {
    pub fn validate(&self) -> SimResult<()> {
        if !(self.dt_s.is_finite() && self.dt_s > 0.0) {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        if !(self.time_cap_s.is_finite() && self.time_cap_s >= 0.0) {
            return Err(SimError::InvalidArg {
                what: "time cap must be non-negative",
            });
        }
        if !(self.friction_seed.is_finite() && self.friction_seed > 0.0) {
            return Err(SimError::InvalidArg {
                what: "friction seed must be positive",
            });
        }
        Ok(())
    }
}

/// One completed step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrainRecord {
    /// Elapsed time at the end of the step (s)
    pub t: f64,
    /// Inlet velocity implied by the level drop (m/s)
    pub v1: f64,
    /// Outlet velocity (m/s)
    pub v2: f64,
    /// Reservoir level (m)
    pub height: f64,
    /// Water remaining (m³)
    pub volume: f64,
    /// Level drop during the step (m)
    pub dh: f64,
    /// Volume drained during the step (m³)
    pub dv: f64,
    /// Friction coefficient used for the step
    pub friction: f64,
    /// Reynolds number the friction coefficient was resolved at
    pub reynolds: f64,
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminalState {
    /// Level reached the end level.
    Converged,
    /// Safety time cap reached first.
    TimedOut,
    /// A step could not be computed; the series is partial.
    Failed,
    /// The progress observer asked to stop.
    Cancelled,
}

impl TerminalState {
    pub fn label(self) -> &'static str {
        match self {
            TerminalState::Converged => "converged",
            TerminalState::TimedOut => "timed out",
            TerminalState::Failed => "failed",
            TerminalState::Cancelled => "cancelled",
        }
    }
}

/// Step that ended a run in [`TerminalState::Failed`].
#[derive(Clone, Debug, PartialEq)]
pub struct StepFailure {
    /// 1-based index of the step that failed
    pub step: usize,
    /// Elapsed time before the failed step (s)
    pub time_s: f64,
    pub error: SimError,
}

/// Progress snapshot handed to an observer after each step.
#[derive(Clone, Copy, Debug)]
pub struct DrainProgress {
    pub step: usize,
    pub time_s: f64,
    pub time_cap_s: f64,
    pub level_m: f64,
    pub v2_mps: f64,
    /// Share of the planned level drop already drained, in [0, 1]
    pub fraction_drained: f64,
}

/// Result of one drain run.
#[derive(Clone, Debug)]
pub struct DrainOutcome {
    pub state: TerminalState,
    /// One record per completed step, in time order
    pub records: Vec<DrainRecord>,
    /// Elapsed simulated time at termination (s)
    pub elapsed_s: f64,
    pub time_cap_s: f64,
    /// Level at termination (m)
    pub final_level_m: f64,
    /// Set when `state` is `Failed`
    pub failure: Option<StepFailure>,
}

impl DrainOutcome {
    /// Predicted drain time. Only a converged run yields a prediction.
    pub fn drain_time(&self) -> SimResult<f64> {
        match self.state {
            TerminalState::Converged => Ok(self.elapsed_s),
            TerminalState::TimedOut => Err(SimError::SafetyTimeoutExceeded {
                time_cap_s: self.time_cap_s,
                level_m: self.final_level_m,
            }),
            TerminalState::Failed => Err(self
                .failure
                .as_ref()
                .map(|f| f.error.clone())
                .unwrap_or(SimError::NonPhysical {
                    what: "run failed without a recorded step failure",
                })),
            TerminalState::Cancelled => Err(SimError::Cancelled {
                time_s: self.elapsed_s,
            }),
        }
    }

    /// Mean outlet velocity over all recorded steps.
    pub fn mean_outlet_velocity(&self) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        let sum: f64 = self.records.iter().map(|r| r.v2).sum();
        Some(sum / self.records.len() as f64)
    }
}

/// Observer called after every step; returning `Break` cancels the run.
pub type ProgressObserver<'o> = &'o mut dyn FnMut(&DrainProgress) -> ControlFlow<()>;

/// Owns the state of one drain run from start to termination.
pub struct DrainSimulator<'a, M: FrictionModel> {
    geometry: &'a Geometry,
    fluid: &'a FluidProperties,
    losses: &'a LossConfig,
    options: &'a DrainOptions,
    friction: &'a M,
    state: FlowState,
    records: Vec<DrainRecord>,
    max_steps: usize,
}

impl<'a, M: FrictionModel> DrainSimulator<'a, M> {
    /// Validate the configuration and set up a fresh run.
    pub fn new(
        geometry: &'a Geometry,
        fluid: &'a FluidProperties,
        losses: &'a LossConfig,
        options: &'a DrainOptions,
        friction: &'a M,
    ) -> SimResult<Self> {
        geometry.validate()?;
        fluid.validate()?;
        losses.validate()?;
        options.validate()?;

        let max_steps = events::max_steps(options.dt_s, options.time_cap_s);
        Ok(Self {
            geometry,
            fluid,
            losses,
            options,
            friction,
            state: FlowState::initial(geometry, options.friction_seed),
            records: Vec::with_capacity(max_steps.min(1 << 16)),
            max_steps,
        })
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn records(&self) -> &[DrainRecord] {
        &self.records
    }

    /// Terminal state reached by the current state, if any.
    pub fn check_termination(&self) -> Option<TerminalState> {
        if events::reached_end(self.state.level_m, self.geometry.end_level.value) {
            Some(TerminalState::Converged)
        } else if self.state.step >= self.max_steps {
            Some(TerminalState::TimedOut)
        } else {
            None
        }
    }

    /// Advance one step: friction from the previous outlet velocity, then the
    /// energy balance with that friction, then apply and record.
    ///
    /// Errors once the run has reached the end level or the time cap.
    pub fn step(&mut self) -> SimResult<&DrainRecord> {
        if self.check_termination().is_some() {
            return Err(SimError::InvalidArg {
                what: "drain run already reached a terminal state",
            });
        }
        let dt = self.options.dt_s;

        let friction = self.friction.resolve(
            self.state.v2_mps,
            self.geometry,
            self.fluid,
            self.state.friction,
        )?;
        trace!(
            step = self.state.step + 1,
            reynolds = friction.reynolds,
            f = friction.f,
            regime = ?friction.regime,
            iterations = friction.iterations,
            "friction resolved"
        );

        let update = step_flow(
            self.state.level_m,
            self.state.v1_mps,
            friction.f,
            dt,
            self.geometry,
            self.fluid,
            self.losses,
        )?;
        events::check_drop(update.dh)?;

        self.state.apply(&update, friction.f, dt);
        self.records.push(DrainRecord {
            t: self.state.time_s,
            v1: self.state.v1_mps,
            v2: self.state.v2_mps,
            height: self.state.level_m,
            volume: self.state.volume_m3,
            dh: update.dh,
            dv: update.dv,
            friction: friction.f,
            reynolds: friction.reynolds,
        });
        Ok(&self.records[self.records.len() - 1])
    }

    /// Run to termination.
    pub fn run(self) -> DrainOutcome {
        self.run_with_progress(None)
    }

    /// Run to termination, reporting progress after every step.
    pub fn run_with_progress(mut self, mut observer: Option<ProgressObserver<'_>>) -> DrainOutcome {
        debug!(
            tube_length_m = self.geometry.tube_length.value,
            start_level_m = self.geometry.start_level.value,
            end_level_m = self.geometry.end_level.value,
            dt_s = self.options.dt_s,
            time_cap_s = self.options.time_cap_s,
            "drain run started"
        );

        let start_level = self.geometry.start_level.value;
        let end_level = self.geometry.end_level.value;

        loop {
            if let Some(state) = self.check_termination() {
                return self.finish(state, None);
            }

            let stepped = self.step().map(|_| ());
            if let Err(error) = stepped {
                let failure = StepFailure {
                    step: self.state.step + 1,
                    time_s: self.state.time_s,
                    error,
                };
                return self.finish(TerminalState::Failed, Some(failure));
            }

            if let Some(cb) = observer.as_deref_mut() {
                let progress = DrainProgress {
                    step: self.state.step,
                    time_s: self.state.time_s,
                    time_cap_s: self.options.time_cap_s,
                    level_m: self.state.level_m,
                    v2_mps: self.state.v2_mps,
                    fraction_drained: events::fraction_drained(
                        start_level,
                        self.state.level_m,
                        end_level,
                    ),
                };
                if cb(&progress).is_break() {
                    return self.finish(TerminalState::Cancelled, None);
                }
            }
        }
    }

    fn finish(self, state: TerminalState, failure: Option<StepFailure>) -> DrainOutcome {
        match (&state, &failure) {
            (TerminalState::Failed, Some(f)) => warn!(
                step = f.step,
                time_s = f.time_s,
                error = %f.error,
                "drain run failed"
            ),
            (TerminalState::TimedOut, _) => warn!(
                time_cap_s = self.options.time_cap_s,
                level_m = self.state.level_m,
                "drain run hit the safety time cap"
            ),
            _ => debug!(
                state = state.label(),
                elapsed_s = self.state.time_s,
                steps = self.state.step,
                "drain run finished"
            ),
        }

        DrainOutcome {
            state,
            records: self.records,
            elapsed_s: self.state.time_s,
            time_cap_s: self.options.time_cap_s,
            final_level_m: self.state.level_m,
            failure,
        }
    }
}

/// Simulate one drain run.
///
/// Configuration errors are returned as `Err` before any step is taken.
/// Everything that happens during the run is reported in the outcome.
pub fn run_drain<M: FrictionModel>(
    geometry: &Geometry,
    fluid: &FluidProperties,
    losses: &LossConfig,
    options: &DrainOptions,
    friction: &M,
) -> SimResult<DrainOutcome> {
    run_drain_with_progress(geometry, fluid, losses, options, friction, None)
}

/// Simulate one drain run and stream per-step progress to `observer`.
pub fn run_drain_with_progress<M: FrictionModel>(
    geometry: &Geometry,
    fluid: &FluidProperties,
    losses: &LossConfig,
    options: &DrainOptions,
    friction: &M,
    observer: Option<ProgressObserver<'_>>,
) -> SimResult<DrainOutcome> {
    let sim = DrainSimulator::new(geometry, fluid, losses, options, friction)?;
    Ok(sim.run_with_progress(observer))
}
