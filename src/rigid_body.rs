// ==============================================================================
// rigid_body.rs — 6-DOF CHASSIS INTEGRATOR (SEMI-IMPLICIT EULER)
// ------------------------------------------------------------------------------
// Point mass with a diagonal inertia. Forces and torques are accumulated during
// a tick and consumed by integrate():
//
//     v += (F / m) dt
//     x += v dt
//     ω += (I⁻¹ ⊙ τ) dt
//     q  = normalize(q + ½ (0, ω) ⊗ q dt)
//     ω *= angular_damping
//
// Accumulators are always zero after integrate() returns.
// ==============================================================================

use serde::{Deserialize, Serialize};

use crate::math::{Quat, Real, Vec3, integrate_orientation};

/// How the diagonal inertia is applied to the accumulated torque.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InertiaModel {
    /// Elementwise on the world-frame torque (no tensor rotation). Valid for
    /// near-isotropic bodies and small roll/pitch.
    #[default]
    WorldAligned,
    /// Torque rotated into the body frame, scaled, rotated back.
    BodyFrame,
}

#[derive(Debug, Clone)]
pub struct RigidBody {
    pub position: Vec3,         // m
    pub velocity: Vec3,         // m/s
    pub orientation: Quat,
    pub angular_velocity: Vec3, // rad/s, world frame

    mass: Real,             // kg
    inverse_mass: Real,     // 0 => immovable
    inertia: Vec3,          // kg·m², diagonal
    inverse_inertia: Vec3,  // 0 component => locked axis

    force_accum: Vec3,
    torque_accum: Vec3,

    angular_damping: Real, // per-tick multiplier
    inertia_model: InertiaModel,
}

impl RigidBody {
    pub fn new(mass: Real, inertia: Vec3, angular_damping: Real, inertia_model: InertiaModel) -> Self {
        let inverse_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };
        let inverse_inertia = inertia.map(|i| if i > 0.0 { 1.0 / i } else { 0.0 });

        Self {
            position: Vec3::zeros(),
            velocity: Vec3::zeros(),
            orientation: Quat::identity(),
            angular_velocity: Vec3::zeros(),
            mass,
            inverse_mass,
            inertia,
            inverse_inertia,
            force_accum: Vec3::zeros(),
            torque_accum: Vec3::zeros(),
            angular_damping,
            inertia_model,
        }
    }

    pub fn mass(&self) -> Real { self.mass }
    pub fn inverse_mass(&self) -> Real { self.inverse_mass }
    pub fn inertia(&self) -> Vec3 { self.inertia }
    pub fn inverse_inertia(&self) -> Vec3 { self.inverse_inertia }
    pub fn accumulated_force(&self) -> Vec3 { self.force_accum }
    pub fn accumulated_torque(&self) -> Vec3 { self.torque_accum }

    /// Force through the center of mass (no torque).
    pub fn add_force(&mut self, f: Vec3) {
        self.force_accum += f;
    }

    /// Force at a world-space point: τ += (p − x) × f
    pub fn add_force_at_point(&mut self, f: Vec3, p: Vec3) {
        self.force_accum += f;
        self.torque_accum += (p - self.position).cross(&f);
    }

    pub fn add_torque(&mut self, t: Vec3) {
        self.torque_accum += t;
    }

    fn angular_acceleration(&self) -> Vec3 {
        match self.inertia_model {
            InertiaModel::WorldAligned => self.inverse_inertia.component_mul(&self.torque_accum),
            InertiaModel::BodyFrame => {
                let local = self.orientation.inverse_transform_vector(&self.torque_accum);
                self.orientation * self.inverse_inertia.component_mul(&local)
            }
        }
    }

    pub fn integrate(&mut self, dt: Real) {
        if dt > 0.0 && dt.is_finite() {
            // linear
            self.velocity += self.force_accum * (self.inverse_mass * dt);
            self.position += self.velocity * dt;

            // angular
            let angular_accel = self.angular_acceleration();
            self.angular_velocity += angular_accel * dt;
            self.orientation = integrate_orientation(&self.orientation, self.angular_velocity, dt);
            self.angular_velocity *= self.angular_damping;
        }

        self.clear_accumulators();
    }

    pub fn clear_accumulators(&mut self) {
        self.force_accum = Vec3::zeros();
        self.torque_accum = Vec3::zeros();
    }

    /// Teleport: new pose, at rest, empty accumulators.
    pub fn reset(&mut self, position: Vec3, orientation: Quat) {
        self.position = position;
        self.orientation = orientation;
        self.velocity = Vec3::zeros();
        self.angular_velocity = Vec3::zeros();
        self.clear_accumulators();
    }
}
