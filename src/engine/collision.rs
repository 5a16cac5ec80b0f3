// Circular obstacle proxies for the boat.
//
// Obstacles are ephemeral: the editor rebuilds them from the placed-object
// store on entering game mode and whenever the store changes during play.
// Resolution is purely positional: an overlapping circle is pushed out along
// the separating axis to the minimum non-overlapping distance.

use glam::{Vec2, Vec3};

const EPSILON: f32 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub position: Vec3,
    pub radius: f32,
}

impl Obstacle {
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self { position, radius }
    }

    #[inline]
    pub fn center_xz(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }
}

/// Result of pushing a circle out of an obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Corrected circle center on XZ.
    pub resolved: Vec2,
    /// Unit normal pointing from the obstacle toward the circle.
    pub normal: Vec2,
}

/// Push a circle at `center` with `radius` out of `obstacle`.
///
/// Returns `None` when the two do not overlap. `fallback_dir` is used as the
/// separating axis when the centers coincide (no defined direction).
pub fn resolve_circle(center: Vec2, radius: f32, obstacle: &Obstacle, fallback_dir: Vec2) -> Option<Contact> {
    let rel = center - obstacle.center_xz();
    let min_dist = radius + obstacle.radius;
    let dist_sq = rel.length_squared();
    if dist_sq >= min_dist * min_dist {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > EPSILON {
        rel / dist
    } else if fallback_dir.length_squared() > EPSILON * EPSILON {
        fallback_dir.normalize()
    } else {
        Vec2::X
    };

    Some(Contact {
        resolved: obstacle.center_xz() + normal * min_dist,
        normal,
    })
}

/// Remove the part of `velocity` that points into a surface with `normal`.
pub fn strip_inward(velocity: Vec2, normal: Vec2) -> Vec2 {
    let into = velocity.dot(normal);
    if into < 0.0 {
        velocity - normal * into
    } else {
        velocity
    }
}
