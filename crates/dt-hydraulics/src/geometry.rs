//! Immutable description of one drain experiment: tube, reservoir, fluid and losses.

use crate::common::{check_dimension, check_finite, check_non_negative, check_positive, circle_area};
use crate::error::{HydraulicsError, HydraulicsResult};
use dt_core::units::{Accel, Area, Density, DynVisc, Length};

/// Tube and reservoir geometry.
///
/// Heights are reservoir water levels. The driving head seen by the tube
/// outlet is the level plus the static head gained over the inclined tube
/// (`sin θ · L`).
#[derive(Clone, Debug)]
pub struct Geometry {
    /// Tube inner diameter
    pub tube_diameter: Length,
    /// Tube length
    pub tube_length: Length,
    /// Sine of the tube inclination below horizontal
    pub incline_sin: f64,
    /// Absolute wall roughness of the tube
    pub roughness: Length,
    /// Reservoir cross-sectional area
    pub reservoir_area: Area,
    /// Reservoir level at the start of a run
    pub start_level: Length,
    /// Reservoir level at which drainage is considered complete
    pub end_level: Length,
}

impl Geometry {
    /// Reject non-physical dimensions before any simulation starts.
    pub fn validate(&self) -> HydraulicsResult<()> {
        check_dimension(self.tube_diameter.value, "tube diameter")?;
        check_dimension(self.tube_length.value, "tube length")?;
        check_dimension(self.reservoir_area.value, "reservoir area")?;

        let sin = check_finite(self.incline_sin, "incline sine")?;
        if !(-1.0..=1.0).contains(&sin) {
            return Err(HydraulicsError::InvalidGeometry {
                what: "incline sine",
                value: sin,
            });
        }

        let roughness = self.roughness.value;
        if !roughness.is_finite() || roughness < 0.0 {
            return Err(HydraulicsError::InvalidGeometry {
                what: "roughness",
                value: roughness,
            });
        }

        let end = self.end_level.value;
        if !end.is_finite() || end < 0.0 {
            return Err(HydraulicsError::InvalidGeometry {
                what: "end level",
                value: end,
            });
        }
        let start = self.start_level.value;
        if !start.is_finite() || start < end {
            return Err(HydraulicsError::InvalidGeometry {
                what: "start level",
                value: start,
            });
        }
        Ok(())
    }

    /// Tube flow area (m²).
    pub fn pipe_area(&self) -> f64 {
        circle_area(self.tube_diameter.value)
    }

    /// Static head added by the incline over the tube length (m).
    pub fn incline_head(&self) -> f64 {
        self.incline_sin * self.tube_length.value
    }

    /// Driving head above the tube outlet for a given reservoir level (m).
    pub fn driving_head(&self, level: f64) -> f64 {
        level + self.incline_head()
    }

    /// Relative roughness ε/D.
    pub fn relative_roughness(&self) -> f64 {
        self.roughness.value / self.tube_diameter.value
    }

    /// Water held in the tube when full (m³).
    pub fn tube_volume(&self) -> f64 {
        self.pipe_area() * self.tube_length.value
    }

    /// Water in the system at the start of a run: reservoir up to the start
    /// level plus a full tube (m³).
    pub fn initial_volume(&self) -> f64 {
        self.reservoir_area.value * self.start_level.value + self.tube_volume()
    }

    /// Copy of this geometry with a different tube length.
    pub fn with_tube_length(&self, tube_length: Length) -> Self {
        Self {
            tube_length,
            ..self.clone()
        }
    }
}

/// Fluid properties, constant for a run.
#[derive(Clone, Debug)]
pub struct FluidProperties {
    pub density: Density,
    pub viscosity: DynVisc,
    pub gravity: Accel,
}

impl FluidProperties {
    pub fn validate(&self) -> HydraulicsResult<()> {
        check_positive(self.density.value, "density")?;
        check_positive(self.viscosity.value, "dynamic viscosity")?;
        check_positive(self.gravity.value, "gravitational acceleration")?;
        Ok(())
    }
}

/// Minor loss coefficients.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LossConfig {
    /// Entrance loss coefficient
    pub k_entry: f64,
    /// T-joint loss coefficient, applied only when `with_t_joint` is set
    pub k_t_joint: f64,
    pub with_t_joint: bool,
}

impl LossConfig {
    pub fn validate(&self) -> HydraulicsResult<()> {
        check_non_negative(self.k_entry, "entrance loss coefficient")?;
        check_non_negative(self.k_t_joint, "T-joint loss coefficient")?;
        Ok(())
    }

    /// Sum of the active loss coefficients.
    pub fn k_total(&self) -> f64 {
        if self.with_t_joint {
            self.k_entry + self.k_t_joint
        } else {
            self.k_entry
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use dt_core::units::{kg_per_m3, m, m2, mps2, pa_s};

    pub fn bin_geometry(length: f64) -> Geometry {
        Geometry {
            tube_diameter: m(0.00794),
            tube_length: m(length),
            incline_sin: 1.0 / 150.0,
            roughness: m(0.75 * 0.00794),
            reservoir_area: m2(0.32 * 0.26),
            start_level: m(0.10),
            end_level: m(0.02),
        }
    }

    pub fn water() -> FluidProperties {
        FluidProperties {
            density: kg_per_m3(998.23),
            viscosity: pa_s(1.0005e-3),
            gravity: mps2(9.81),
        }
    }

    pub fn entry_only() -> LossConfig {
        LossConfig {
            k_entry: 0.5,
            k_t_joint: 1.0,
            with_t_joint: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use dt_core::units::{m, m2};

    #[test]
    fn bin_geometry_is_valid() {
        assert!(bin_geometry(0.2).validate().is_ok());
        assert!(water().validate().is_ok());
        assert!(entry_only().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        let mut g = bin_geometry(0.2);
        g.tube_diameter = m(0.0);
        assert!(matches!(
            g.validate(),
            Err(HydraulicsError::InvalidGeometry {
                what: "tube diameter",
                ..
            })
        ));

        let g = bin_geometry(-0.1);
        assert!(matches!(
            g.validate(),
            Err(HydraulicsError::InvalidGeometry {
                what: "tube length",
                ..
            })
        ));

        let mut g = bin_geometry(0.2);
        g.reservoir_area = m2(0.0);
        assert!(matches!(
            g.validate(),
            Err(HydraulicsError::InvalidGeometry {
                what: "reservoir area",
                ..
            })
        ));
    }

    #[test]
    fn rejects_start_below_end() {
        let mut g = bin_geometry(0.2);
        g.start_level = m(0.01);
        assert!(matches!(
            g.validate(),
            Err(HydraulicsError::InvalidGeometry {
                what: "start level",
                ..
            })
        ));
    }

    #[test]
    fn derived_quantities() {
        let g = bin_geometry(0.3);
        assert!((g.incline_head() - 0.002).abs() < 1e-15);
        assert!((g.driving_head(0.1) - 0.102).abs() < 1e-15);
        assert!((g.relative_roughness() - 0.75).abs() < 1e-12);

        let expected_tube = std::f64::consts::PI * 0.00794_f64.powi(2) / 4.0 * 0.3;
        assert!((g.tube_volume() - expected_tube).abs() < 1e-18);
        assert!((g.initial_volume() - (0.0832 * 0.1 + expected_tube)).abs() < 1e-15);
    }

    #[test]
    fn t_joint_only_counts_when_flagged() {
        let mut losses = entry_only();
        assert_eq!(losses.k_total(), 0.5);
        losses.with_t_joint = true;
        assert_eq!(losses.k_total(), 1.5);
    }

    #[test]
    fn with_tube_length_keeps_everything_else() {
        let g = bin_geometry(0.2).with_tube_length(m(0.6));
        assert_eq!(g.tube_length.value, 0.6);
        assert_eq!(g.tube_diameter.value, 0.00794);
        assert_eq!(g.start_level.value, 0.10);
    }
}
