//! Darcy friction coefficient with laminar/turbulent switching.
//!
//! Laminar flow uses the closed form `f = 64 / Re`. Turbulent flow solves the
//! Colebrook-White relation
//!
//! ```text
//! 1/√f + 2·log10( ε/(3.7·D) + 2.51/(Re·√f) ) = 0
//! ```
//!
//! with a damped Newton iteration in `x = 1/√f`, seeded from the previous
//! coefficient. The Reynolds number always uses the tube diameter as its
//! characteristic length.

use crate::common::check_finite;
use crate::error::{HydraulicsError, HydraulicsResult};
use crate::geometry::{FluidProperties, Geometry};

/// Reynolds number at which the turbulent correlation takes over.
pub const LAMINAR_LIMIT_RE: f64 = 2300.0;

/// Seed used when the previous coefficient is unusable.
const FALLBACK_SEED: f64 = 0.02;

/// Flow regime selected from the Reynolds number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowRegime {
    /// No flow yet; the previous coefficient is kept.
    Stagnant,
    Laminar,
    Turbulent,
}

impl FlowRegime {
    pub fn from_reynolds(reynolds: f64) -> Self {
        if reynolds <= 0.0 {
            FlowRegime::Stagnant
        } else if reynolds < LAMINAR_LIMIT_RE {
            FlowRegime::Laminar
        } else {
            FlowRegime::Turbulent
        }
    }
}

/// Pipe-flow Reynolds number `ρ·v·D/μ`.
pub fn reynolds_number(density: f64, velocity: f64, diameter: f64, viscosity: f64) -> f64 {
    density * velocity.abs() * diameter / viscosity
}

/// Hagen-Poiseuille friction coefficient.
pub fn laminar_friction(reynolds: f64) -> f64 {
    64.0 / reynolds
}

/// Colebrook-White residual `1/√f + 2·log10(ε/(3.7D) + 2.51/(Re·√f))`.
pub fn colebrook_residual(f: f64, reynolds: f64, relative_roughness: f64) -> f64 {
    let sqrt_f = f.sqrt();
    1.0 / sqrt_f + 2.0 * (relative_roughness / 3.7 + 2.51 / (reynolds * sqrt_f)).log10()
}

/// Converged Colebrook root.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColebrookSolution {
    pub f: f64,
    pub iterations: usize,
    /// Residual of the Colebrook relation at `f`
    pub residual: f64,
}

/// Bounded Newton solver for the Colebrook-White relation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColebrookSolver {
    /// Maximum Newton iterations
    pub max_iterations: usize,
    /// Absolute tolerance on the `1/√f` update
    pub abs_tol: f64,
    /// Relative tolerance on the `1/√f` update
    pub rel_tol: f64,
    /// Maximum step halvings to keep `1/√f` positive
    pub max_halvings: usize,
}

impl Default for ColebrookSolver {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            abs_tol: 1e-12,
            rel_tol: 1e-12,
            max_halvings: 30,
        }
    }
}

impl ColebrookSolver {
    /// Solve for `f` at the given Reynolds number, starting from `seed`.
    pub fn solve(
        &self,
        reynolds: f64,
        relative_roughness: f64,
        seed: f64,
    ) -> HydraulicsResult<ColebrookSolution> {
        let a = relative_roughness / 3.7;
        let b = 2.51 / reynolds;
        let g = |x: f64| x + 2.0 * (a + b * x).log10();
        let dg = |x: f64| 1.0 + 2.0 / std::f64::consts::LN_10 * b / (a + b * x);

        let seed = if seed.is_finite() && seed > 0.0 {
            seed
        } else {
            FALLBACK_SEED
        };
        let mut x = 1.0 / seed.sqrt();
        let mut gx = g(x);

        let diverged = |iterations: usize, x: f64| HydraulicsError::FrictionSolveDivergence {
            reynolds,
            iterations,
            residual: if x > 0.0 {
                colebrook_residual(1.0 / (x * x), reynolds, relative_roughness)
            } else {
                f64::NAN
            },
        };

        for iter in 1..=self.max_iterations {
            if !gx.is_finite() {
                return Err(diverged(iter - 1, x));
            }

            let mut dx = -gx / dg(x);
            let mut halvings = 0;
            while x + dx <= 0.0 {
                if halvings == self.max_halvings {
                    return Err(diverged(iter, x));
                }
                dx *= 0.5;
                halvings += 1;
            }

            x += dx;
            gx = g(x);

            if dx.abs() <= self.abs_tol + self.rel_tol * x.abs() && gx.is_finite() {
                let f = 1.0 / (x * x);
                return Ok(ColebrookSolution {
                    f,
                    iterations: iter,
                    residual: colebrook_residual(f, reynolds, relative_roughness),
                });
            }
        }

        Err(diverged(self.max_iterations, x))
    }
}

/// Friction coefficient resolved for one flow state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrictionResolution {
    pub f: f64,
    pub reynolds: f64,
    pub regime: FlowRegime,
    /// Root-finder iterations (zero for closed-form regimes)
    pub iterations: usize,
}

/// Maps an instantaneous outlet velocity to a Darcy friction coefficient.
pub trait FrictionModel {
    /// Resolve the coefficient for `velocity`, given the previous step's
    /// coefficient for continuity.
    fn resolve(
        &self,
        velocity: f64,
        geometry: &Geometry,
        fluid: &FluidProperties,
        previous: f64,
    ) -> HydraulicsResult<FrictionResolution>;
}

/// Laminar `64/Re` below [`LAMINAR_LIMIT_RE`], Colebrook-White above.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DarcyFriction {
    pub solver: ColebrookSolver,
}

impl DarcyFriction {
    pub fn new(solver: ColebrookSolver) -> Self {
        Self { solver }
    }
}

impl FrictionModel for DarcyFriction {
    fn resolve(
        &self,
        velocity: f64,
        geometry: &Geometry,
        fluid: &FluidProperties,
        previous: f64,
    ) -> HydraulicsResult<FrictionResolution> {
        let reynolds = reynolds_number(
            fluid.density.value,
            velocity,
            geometry.tube_diameter.value,
            fluid.viscosity.value,
        );
        check_finite(reynolds, "Reynolds number")?;

        let regime = FlowRegime::from_reynolds(reynolds);
        let (f, iterations) = match regime {
            FlowRegime::Stagnant => (previous, 0),
            FlowRegime::Laminar => (laminar_friction(reynolds), 0),
            FlowRegime::Turbulent => {
                let sol = self
                    .solver
                    .solve(reynolds, geometry.relative_roughness(), previous)?;
                (sol.f, sol.iterations)
            }
        };

        if !(f.is_finite() && f > 0.0) {
            return Err(HydraulicsError::NonPhysical {
                what: "friction coefficient",
            });
        }

        Ok(FrictionResolution {
            f,
            reynolds,
            regime,
            iterations,
        })
    }
}

/// Fixed coefficient regardless of flow state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantFriction(pub f64);

impl FrictionModel for ConstantFriction {
    fn resolve(
        &self,
        velocity: f64,
        geometry: &Geometry,
        fluid: &FluidProperties,
        _previous: f64,
    ) -> HydraulicsResult<FrictionResolution> {
        let reynolds = reynolds_number(
            fluid.density.value,
            velocity,
            geometry.tube_diameter.value,
            fluid.viscosity.value,
        );
        Ok(FrictionResolution {
            f: self.0,
            reynolds,
            regime: FlowRegime::from_reynolds(reynolds),
            iterations: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::test_support::{bin_geometry, water};

    #[test]
    fn laminar_closed_form_is_exact() {
        assert_eq!(laminar_friction(1000.0), 0.064);
    }

    #[test]
    fn regime_selection() {
        assert_eq!(FlowRegime::from_reynolds(0.0), FlowRegime::Stagnant);
        assert_eq!(FlowRegime::from_reynolds(2299.9), FlowRegime::Laminar);
        assert_eq!(FlowRegime::from_reynolds(2300.0), FlowRegime::Turbulent);
    }

    #[test]
    fn reynolds_uses_diameter() {
        let re = reynolds_number(998.23, 1.0, 0.00794, 1.0005e-3);
        assert!((re - 998.23 * 0.00794 / 1.0005e-3).abs() < 1e-9);
    }

    #[test]
    fn resolve_laminar_from_velocity() {
        let geometry = bin_geometry(0.2);
        let fluid = water();
        // velocity giving Re = 1000
        let v = 1000.0 * 1.0005e-3 / (998.23 * 0.00794);
        let res = DarcyFriction::default()
            .resolve(v, &geometry, &fluid, 1.0)
            .unwrap();
        assert_eq!(res.regime, FlowRegime::Laminar);
        assert!((res.reynolds - 1000.0).abs() < 1e-9);
        assert!((res.f - 0.064).abs() < 1e-12);
        assert_eq!(res.iterations, 0);
    }

    #[test]
    fn zero_velocity_keeps_previous() {
        let res = DarcyFriction::default()
            .resolve(0.0, &bin_geometry(0.2), &water(), 1.0)
            .unwrap();
        assert_eq!(res.regime, FlowRegime::Stagnant);
        assert_eq!(res.f, 1.0);
        assert_eq!(res.reynolds, 0.0);
    }

    #[test]
    fn colebrook_root_satisfies_relation() {
        let solver = ColebrookSolver::default();
        for &(re, rr) in &[(5_000.0, 1e-5), (1e5, 1e-4), (7_000.0, 0.75), (2_300.0, 0.0)] {
            let sol = solver.solve(re, rr, 0.02).unwrap();
            assert!(sol.f > 0.0);
            assert!(sol.residual.abs() < 1e-9, "Re={re} rr={rr}: {sol:?}");
        }
    }

    #[test]
    fn smooth_pipe_matches_reference_value() {
        // Moody chart: smooth pipe at Re = 1e5 gives f ≈ 0.0180
        let sol = ColebrookSolver::default().solve(1e5, 0.0, 0.02).unwrap();
        assert!((sol.f - 0.0180).abs() < 2e-4, "f = {}", sol.f);
    }

    #[test]
    fn seed_does_not_change_root() {
        let solver = ColebrookSolver::default();
        let a = solver.solve(8_000.0, 0.75, 1.0).unwrap();
        let b = solver.solve(8_000.0, 0.75, 0.001).unwrap();
        assert!((a.f - b.f).abs() < 1e-12);
    }

    #[test]
    fn warm_seed_needs_fewer_iterations() {
        let solver = ColebrookSolver::default();
        let cold = solver.solve(20_000.0, 1e-4, 1.0).unwrap();
        let warm = solver.solve(20_000.0, 1e-4, cold.f).unwrap();
        assert!(warm.iterations <= cold.iterations);
        assert!(warm.iterations <= 2);
    }

    #[test]
    fn iteration_budget_exhaustion_is_reported() {
        let solver = ColebrookSolver {
            max_iterations: 1,
            abs_tol: 0.0,
            rel_tol: 0.0,
            ..ColebrookSolver::default()
        };
        let err = solver.solve(10_000.0, 1e-4, 1.0).unwrap_err();
        match err {
            HydraulicsError::FrictionSolveDivergence {
                reynolds,
                iterations,
                ..
            } => {
                assert_eq!(reynolds, 10_000.0);
                assert_eq!(iterations, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn each_correlation_is_continuous_up_to_the_switch() {
        let solver = ColebrookSolver::default();
        let rr = 1e-4;

        let below = laminar_friction(LAMINAR_LIMIT_RE - 1e-6);
        assert!((below - 64.0 / LAMINAR_LIMIT_RE).abs() < 1e-9);

        let at = solver.solve(LAMINAR_LIMIT_RE, rr, 0.05).unwrap().f;
        let above = solver.solve(LAMINAR_LIMIT_RE + 1e-3, rr, at).unwrap().f;
        assert!((at - above).abs() < 1e-7);

        // The jump at the switch is exactly the gap between the two correlations.
        let geometry = bin_geometry(0.2);
        let fluid = water();
        let v_switch = LAMINAR_LIMIT_RE * 1.0005e-3 / (998.23 * 0.00794);
        let model = DarcyFriction::default();
        let lo = model
            .resolve(v_switch * (1.0 - 1e-9), &geometry, &fluid, 0.05)
            .unwrap();
        let hi = model
            .resolve(v_switch * (1.0 + 1e-9), &geometry, &fluid, 0.05)
            .unwrap();
        assert_eq!(lo.regime, FlowRegime::Laminar);
        assert_eq!(hi.regime, FlowRegime::Turbulent);
        let rough = solver
            .solve(LAMINAR_LIMIT_RE, geometry.relative_roughness(), 0.05)
            .unwrap()
            .f;
        assert!((lo.f - 64.0 / LAMINAR_LIMIT_RE).abs() < 1e-9);
        assert!((hi.f - rough).abs() < 1e-6);
    }

    #[test]
    fn constant_friction_ignores_flow() {
        let res = ConstantFriction(0.3)
            .resolve(2.0, &bin_geometry(0.2), &water(), 1.0)
            .unwrap();
        assert_eq!(res.f, 0.3);
        assert_eq!(res.regime, FlowRegime::Turbulent);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn laminar_branch_is_closed_form(re in 1.0_f64..LAMINAR_LIMIT_RE) {
            let geometry = crate::geometry::test_support::bin_geometry(0.2);
            let fluid = crate::geometry::test_support::water();
            let v = re * fluid.viscosity.value / (fluid.density.value * geometry.tube_diameter.value);
            let res = DarcyFriction::default().resolve(v, &geometry, &fluid, 1.0).unwrap();
            prop_assert_eq!(res.regime, FlowRegime::Laminar);
            prop_assert!((res.f - 64.0 / res.reynolds).abs() <= 1e-12 * res.f);
        }

        #[test]
        fn turbulent_root_is_positive_and_consistent(
            re in LAMINAR_LIMIT_RE..1e7,
            rr in 0.0_f64..1.0,
            seed in 1e-3_f64..2.0,
        ) {
            let sol = ColebrookSolver::default().solve(re, rr, seed).unwrap();
            prop_assert!(sol.f > 0.0 && sol.f.is_finite());
            prop_assert!(sol.residual.abs() < 1e-8);
        }
    }
}
