// ==============================================================================
// grip.rs — COMBINED-SLIP CLAMP + SKID ESTIMATE
// ==============================================================================
// The tire model saturates each branch on its own; this is where the total
// horizontal force of one contact is held inside the friction circle:
//
//     |F| = sqrt(Fx² + Fy²) <= Fz · cap
//
// Both components are scaled by the same factor, so the force direction is
// preserved. The excess ratio (|F| / limit − 1) is kept as a provisional skid
// value.
//
// Skid intensity is diagnostic only (audio / particles) and never fed back.
// ==============================================================================

use crate::math::Real;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampedForce {
    pub tractive: Real, // N, along wheel forward
    pub lateral: Real,  // N, along wheel left
    pub excess: Real,   // 0 when inside the circle
}

pub fn combined_clamp(tractive: Real, lateral: Real, load: Real, friction_cap: Real) -> ClampedForce {
    let limit = load * friction_cap;
    let total = (tractive * tractive + lateral * lateral).sqrt();

    if limit > 0.0 && total > limit {
        let scale = limit / total;
        ClampedForce {
            tractive: tractive * scale,
            lateral: lateral * scale,
            excess: total / limit - 1.0,
        }
    } else {
        ClampedForce { tractive, lateral, excess: 0.0 }
    }
}

/// max(clamp excess, slip-angle ramp), in [0, 1].
/// The ramp is 0 at `threshold` and reaches 1 at `threshold + 1/gain`.
pub fn skid_intensity(excess: Real, slip_angle: Real, threshold: Real, gain: Real) -> Real {
    let ramp = (slip_angle.abs() - threshold) * gain;
    excess.max(ramp).clamp(0.0, 1.0)
}
