//! Mutable flow state owned by one drain run.

use dt_hydraulics::{FlowUpdate, Geometry};

/// Instantaneous state of the draining bin.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowState {
    /// Completed steps
    pub step: usize,
    /// Elapsed time (s)
    pub time_s: f64,
    /// Reservoir level (m)
    pub level_m: f64,
    /// Inlet velocity carried from the previous step (m/s)
    pub v1_mps: f64,
    /// Outlet velocity of the previous step (m/s)
    pub v2_mps: f64,
    /// Water left in reservoir and tube (m³)
    pub volume_m3: f64,
    /// Latest friction coefficient
    pub friction: f64,
}

impl FlowState {
    /// Fresh state at t = 0: still water at the start level and the seed
    /// friction coefficient.
    pub fn initial(geometry: &Geometry, friction_seed: f64) -> Self {
        Self {
            step: 0,
            time_s: 0.0,
            level_m: geometry.start_level.value,
            v1_mps: 0.0,
            v2_mps: 0.0,
            volume_m3: geometry.initial_volume(),
            friction: friction_seed,
        }
    }

    /// Apply one step's decrements. Time is derived from the step count so it
    /// does not drift over long runs.
    pub(crate) fn apply(&mut self, update: &FlowUpdate, friction: f64, dt: f64) {
        self.step += 1;
        self.time_s = self.step as f64 * dt;
        self.level_m -= update.dh;
        self.volume_m3 -= update.dv;
        self.v1_mps = update.v1_next;
        self.v2_mps = update.v2;
        self.friction = friction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dt_core::units::{m, m2};

    fn geometry() -> Geometry {
        Geometry {
            tube_diameter: m(0.01),
            tube_length: m(0.5),
            incline_sin: 0.1,
            roughness: m(0.0),
            reservoir_area: m2(0.1),
            start_level: m(0.2),
            end_level: m(0.05),
        }
    }

    #[test]
    fn initial_state_is_still_water() {
        let g = geometry();
        let state = FlowState::initial(&g, 1.0);
        assert_eq!(state.step, 0);
        assert_eq!(state.time_s, 0.0);
        assert_eq!(state.level_m, 0.2);
        assert_eq!(state.v1_mps, 0.0);
        assert_eq!(state.v2_mps, 0.0);
        assert_eq!(state.friction, 1.0);
        assert!((state.volume_m3 - g.initial_volume()).abs() < 1e-18);
    }

    #[test]
    fn apply_decrements_and_advances_time() {
        let g = geometry();
        let mut state = FlowState::initial(&g, 1.0);
        let update = FlowUpdate {
            v2: 1.0,
            dv: 1e-4,
            dh: 1e-3,
            v1_next: 0.1,
        };
        state.apply(&update, 0.04, 0.01);
        state.apply(&update, 0.04, 0.01);
        assert_eq!(state.step, 2);
        assert_eq!(state.time_s, 0.02);
        assert!((state.level_m - 0.198).abs() < 1e-15);
        assert_eq!(state.v2_mps, 1.0);
        assert_eq!(state.friction, 0.04);
    }
}
