// ==============================================================================
// magic_formula.rs — PACEJKA-STYLE TIRE FORCE MODEL
// ==============================================================================
// Shape function shared by both branches:
//
//     mf(x) = D sin(C atan(B x − E (B x − atan(B x))))
//
// Lateral branch   (x = slip angle, rad):  Fy = −mf_lat(α) Fz
// Longitudinal     (x = slip ratio):       Fx =  mf_long(κ) Fz
// Aligning moment:                         Mz =  Fy · trail
//
// D is a normalized peak (friction coefficient), so forces scale with load.
// The two branches saturate independently; combined slip is clamped by the
// caller (tire::grip).
// ==============================================================================

use serde::{Deserialize, Serialize};

use crate::math::Real;
use crate::tire::types::TireForces;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagicFormulaCoefficients {
    pub b: Real, // stiffness
    pub c: Real, // shape
    pub d: Real, // peak
    pub e: Real, // curvature
}

impl MagicFormulaCoefficients {
    pub const LATERAL: Self = Self { b: 10.0, c: 1.9, d: 1.0, e: 0.97 };
    pub const LONGITUDINAL: Self = Self { b: 12.0, c: 1.65, d: 1.0, e: 0.97 };

    #[inline]
    pub fn shape(&self, x: Real) -> Real {
        let bx = self.b * x;
        self.d * (self.c * (bx - self.e * (bx - bx.atan())).atan()).sin()
    }
}

pub const DEFAULT_PNEUMATIC_TRAIL: Real = 0.02; // m

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagicFormula {
    pub lateral: MagicFormulaCoefficients,
    pub longitudinal: MagicFormulaCoefficients,
    pub pneumatic_trail: Real,
}

impl Default for MagicFormula {
    fn default() -> Self {
        Self {
            lateral: MagicFormulaCoefficients::LATERAL,
            longitudinal: MagicFormulaCoefficients::LONGITUDINAL,
            pneumatic_trail: DEFAULT_PNEUMATIC_TRAIL,
        }
    }
}

impl MagicFormula {
    pub fn calculate(&self, vertical_load: Real, slip_angle: Real, slip_ratio: Real) -> TireForces {
        if !(vertical_load > 0.0) {
            return TireForces::ZERO;
        }

        // positive slip angle -> restoring force of opposite sign
        let lateral = -self.lateral.shape(slip_angle) * vertical_load;
        let longitudinal = self.longitudinal.shape(slip_ratio) * vertical_load;

        TireForces {
            longitudinal,
            lateral,
            aligning_moment: lateral * self.pneumatic_trail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_slip_zero_force() {
        let f = MagicFormula::default().calculate(4000.0, 0.0, 0.0);
        assert_eq!(f.lateral, 0.0);
        assert_eq!(f.longitudinal, 0.0);
        assert_eq!(f.aligning_moment, 0.0);
    }

    #[test]
    fn lateral_opposes_slip_angle() {
        let mf = MagicFormula::default();
        assert!(mf.calculate(4000.0, 0.05, 0.0).lateral < 0.0);
        assert!(mf.calculate(4000.0, -0.05, 0.0).lateral > 0.0);
    }

    #[test]
    fn longitudinal_follows_slip_ratio() {
        let mf = MagicFormula::default();
        assert!(mf.calculate(4000.0, 0.0, 0.1).longitudinal > 0.0);
        assert!(mf.calculate(4000.0, 0.0, -0.1).longitudinal < 0.0);
    }

    #[test]
    fn peak_bounded_by_d_times_load() {
        let mf = MagicFormula::default();
        for i in 0..200 {
            let alpha = -1.0 + i as Real * 0.01;
            let f = mf.calculate(3000.0, alpha, alpha);
            assert!(f.lateral.abs() <= 3000.0 * mf.lateral.d + 1e-2);
            assert!(f.longitudinal.abs() <= 3000.0 * mf.longitudinal.d + 1e-2);
        }
    }

    #[test]
    fn aligning_moment_uses_trail() {
        let mf = MagicFormula::default();
        let f = mf.calculate(2500.0, 0.08, 0.0);
        assert_relative_eq!(f.aligning_moment, f.lateral * DEFAULT_PNEUMATIC_TRAIL);
    }

    #[test]
    fn load_scales_force_linearly() {
        let mf = MagicFormula::default();
        let a = mf.calculate(1000.0, 0.1, 0.0).lateral;
        let b = mf.calculate(2000.0, 0.1, 0.0).lateral;
        assert_relative_eq!(b, 2.0 * a, epsilon = 1e-3);
    }
}
