// ==============================================================================
// environment.rs — GRAVITY + GROUND QUERIES
// ------------------------------------------------------------------------------
// The vehicle asks the world three things per tick: gravity, ground height
// under each wheel mount (x, y), and the ground normal there. The normal is
// queried but not yet used by the force model.
//
// FlatGround:     constant height plane.
// ColliderGround: fixed rapier cuboids (ground slab, ramps, platforms),
//                 queried with a downward raycast along −Z.
// ==============================================================================

use rapier3d::prelude::*;

use crate::math::{Real, Vec3, safe_normalize};

pub const STANDARD_GRAVITY: Real = 9.81; // m/s²

pub trait Environment {
    fn gravity(&self) -> Vec3;
    fn ground_height(&self, x: Real, y: Real) -> Real;
    fn ground_normal(&self, x: Real, y: Real) -> Vec3;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatGround {
    pub height: Real,
    pub gravity: Vec3,
}

impl FlatGround {
    pub fn new(height: Real) -> Self {
        Self { height, gravity: Vec3::new(0.0, 0.0, -STANDARD_GRAVITY) }
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }
}

impl Default for FlatGround {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Environment for FlatGround {
    fn gravity(&self) -> Vec3 { self.gravity }
    fn ground_height(&self, _x: Real, _y: Real) -> Real { self.height }
    fn ground_normal(&self, _x: Real, _y: Real) -> Vec3 { Vec3::z() }
}

// --------------------------------------------------
// Collider-backed ground
// --------------------------------------------------

const NORMAL_SAMPLE: Real = 0.05; // m, central-difference half step

pub struct ColliderGround {
    gravity: Vec3,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    query_pipeline: QueryPipeline,
    probe_height: Real, // rays start here and cast down
    floor: Real,        // reported when a ray misses everything
}

impl ColliderGround {
    pub fn new() -> Self {
        Self {
            gravity: Vec3::new(0.0, 0.0, -STANDARD_GRAVITY),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            query_pipeline: QueryPipeline::new(),
            probe_height: 500.0,
            floor: -1_000.0,
        }
    }

    /// Big static slab whose top surface sits at `height`.
    pub fn with_ground_slab(height: Real) -> Self {
        let mut ground = Self::new();
        ground.add_box([0.0, 0.0, height - 1.0], [500.0, 500.0, 1.0], [0.0, 0.0, 0.0]);
        ground
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_floor(mut self, floor: Real) -> Self {
        self.floor = floor;
        self
    }

    /// Adds a fixed cuboid. `rotation` is a scaled axis (axis · angle, rad).
    pub fn add_box(&mut self, center: [Real; 3], half_extents: [Real; 3], rotation: [Real; 3]) -> &mut Self {
        let rb = RigidBodyBuilder::fixed()
            .translation(vector![center[0], center[1], center[2]])
            .rotation(vector![rotation[0], rotation[1], rotation[2]])
            .build();
        let handle = self.bodies.insert(rb);

        let collider = ColliderBuilder::cuboid(half_extents[0], half_extents[1], half_extents[2])
            .friction(1.0)
            .restitution(0.0)
            .build();
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);

        self.query_pipeline.update(&self.colliders);
        self
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }
}

impl Default for ColliderGround {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for ColliderGround {
    fn gravity(&self) -> Vec3 {
        self.gravity
    }

    fn ground_height(&self, x: Real, y: Real) -> Real {
        let ray = Ray::new(point![x, y, self.probe_height], vector![0.0, 0.0, -1.0]);
        let max_dist = self.probe_height - self.floor;

        match self.query_pipeline.cast_ray(
            &self.bodies,
            &self.colliders,
            &ray,
            max_dist,
            true,
            QueryFilter::default(),
        ) {
            Some((_hit, toi)) => self.probe_height - toi,
            None => self.floor,
        }
    }

    fn ground_normal(&self, x: Real, y: Real) -> Vec3 {
        let h = NORMAL_SAMPLE;
        let dzdx = (self.ground_height(x + h, y) - self.ground_height(x - h, y)) / (2.0 * h);
        let dzdy = (self.ground_height(x, y + h) - self.ground_height(x, y - h)) / (2.0 * h);
        let n = safe_normalize(Vec3::new(-dzdx, -dzdy, 1.0));
        if n == Vec3::zeros() { Vec3::z() } else { n }
    }
}
