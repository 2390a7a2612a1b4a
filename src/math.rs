// ==============================================================================
// math.rs — VECTOR / QUATERNION HELPERS (WORLD FRAME, Z-UP)
// ------------------------------------------------------------------------------
// Thin layer over nalgebra. Conventions used everywhere in the crate:
// - world is right-handed, +Z up
// - chassis local frame: +X forward, +Y left, +Z up
// - all quaternions are unit rotations (renormalized after every integration)
//
// Only the operations nalgebra does not already give us with the semantics we
// need live here (zero-safe normalize, closed-form rotate, orientation
// integration).
// ==============================================================================

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

pub type Real = f32;
pub type Vec3 = Vector3<Real>;
pub type Quat = UnitQuaternion<Real>;

/// rad/s -> rev/min
pub const RAD_PER_SEC_TO_RPM: Real = 60.0 / (2.0 * std::f32::consts::PI);

#[inline]
pub fn vec3(v: [Real; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

/// Zero-length input maps to the zero vector instead of NaN.
#[inline]
pub fn safe_normalize(v: Vec3) -> Vec3 {
    let m = v.norm();
    if m > 1e-6 { v / m } else { Vec3::zeros() }
}

/// Hamilton product `a ⊗ b`.
#[inline]
pub fn hamilton(a: &Quaternion<Real>, b: &Quaternion<Real>) -> Quaternion<Real> {
    Quaternion::new(
        a.w * b.w - a.i * b.i - a.j * b.j - a.k * b.k,
        a.w * b.i + a.i * b.w + a.j * b.k - a.k * b.j,
        a.w * b.j - a.i * b.k + a.j * b.w + a.k * b.i,
        a.w * b.k + a.i * b.j - a.j * b.i + a.k * b.w,
    )
}

/// v' = q v q⁻¹, closed form: v + 2w(u × v) + 2u × (u × v)
#[inline]
pub fn rotate(q: &Quat, v: Vec3) -> Vec3 {
    let u = q.imag();
    let w = q.scalar();
    let t = u.cross(&v) * 2.0;
    v + t * w + u.cross(&t)
}

/// Integrate an orientation under world-frame angular velocity `omega` for `dt`.
///
/// q̇ = ½ (0, ω) ⊗ q, then renormalize. A degenerate result (zero norm or
/// non-finite) leaves the orientation untouched.
pub fn integrate_orientation(q: &Quat, omega: Vec3, dt: Real) -> Quat {
    let spin = Quaternion::from_imag(omega);
    let derivative = hamilton(&spin, q.quaternion()) * 0.5;
    let raw = *q.quaternion() + derivative * dt;

    let n = raw.norm();
    if n > 1e-9 && n.is_finite() {
        UnitQuaternion::new_unchecked(raw / n)
    } else {
        *q
    }
}

/// `signum` that returns 0 for exact zero.
#[inline]
pub fn sign(x: Real) -> Real {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
