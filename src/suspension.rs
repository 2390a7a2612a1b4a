// ==============================================================================
// suspension.rs — PER-CORNER SPRING / DAMPER
// ------------------------------------------------------------------------------
// Compression comes from the vehicle's ground query (rest_length − free length).
// The damper velocity is a raw backward difference of compression over dt,
// deliberately unfiltered.
//
//     F = k x + c (x − x_prev) / dt        for x > 0
//     F = 0                                 otherwise (spring never pulls)
//
// The damper term can make F negative during fast rebound; callers clamp.
// ==============================================================================

use crate::config::SuspensionConfig;
use crate::math::Real;

#[derive(Debug, Clone)]
pub struct Suspension {
    pub stiffness: Real,   // N/m
    pub damping: Real,     // N·s/m
    pub rest_length: Real, // m

    compression: Real,          // m, may be negative (airborne)
    previous_compression: Real, // m
}

impl Suspension {
    pub fn new(cfg: &SuspensionConfig) -> Self {
        Self {
            stiffness: cfg.stiffness,
            damping: cfg.damping,
            rest_length: cfg.rest_length,
            compression: 0.0,
            previous_compression: 0.0,
        }
    }

    pub fn compression(&self) -> Real { self.compression }
    pub fn previous_compression(&self) -> Real { self.previous_compression }

    pub fn update(&mut self, compression: Real, dt: Real) -> Real {
        self.previous_compression = self.compression;
        self.compression = compression;

        if compression <= 0.0 {
            return 0.0;
        }

        let velocity = if dt > 0.0 {
            (self.compression - self.previous_compression) / dt
        } else {
            0.0
        };

        self.stiffness * compression + self.damping * velocity
    }

    pub fn reset(&mut self) {
        self.compression = 0.0;
        self.previous_compression = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spring() -> Suspension {
        Suspension::new(&SuspensionConfig { stiffness: 1000.0, damping: 100.0, rest_length: 0.3 })
    }

    #[test]
    fn airborne_returns_zero() {
        let mut s = spring();
        assert_eq!(s.update(0.0, 0.01), 0.0);
        assert_eq!(s.update(-0.2, 0.01), 0.0);
        // history is still tracked while airborne
        assert_eq!(s.compression(), -0.2);
        assert_eq!(s.previous_compression(), 0.0);
    }

    #[test]
    fn spring_plus_damper() {
        let mut s = spring();
        s.update(0.1, 0.1);
        // steady: damper contributes nothing
        assert_relative_eq!(s.update(0.1, 0.1), 100.0, epsilon = 1e-4);
        // compressing at 1 m/s
        assert_relative_eq!(s.update(0.2, 0.1), 200.0 + 100.0, epsilon = 1e-3);
    }

    #[test]
    fn rebound_can_go_negative() {
        let mut s = spring();
        s.update(0.5, 0.01);
        let f = s.update(0.01, 0.01);
        assert!(f < 0.0, "fast rebound should drive the raw force negative, got {f}");
    }

    #[test]
    fn zero_dt_skips_damper() {
        let mut s = spring();
        s.update(0.05, 0.1);
        assert_relative_eq!(s.update(0.2, 0.0), 200.0, epsilon = 1e-4);
    }
}
