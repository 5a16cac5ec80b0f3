// Player boat: kinematic integrator + buoyancy sampler + obstacle collision.
//
// Motion model:
//   - Scalar forward speed chases `max_speed * forward_input`, accelerating
//     with `acceleration` and bleeding off with `deceleration + drag * |speed|`.
//   - Turning authority scales with speed (no turning in place).
//   - Displacement is integrated in short sub-steps so the boat cannot skip
//     over a one-cell-wide strip of land at any speed or frame time.
//   - Obstacles push the boat out positionally; bounds clamp last.
//
// Heading: rotation θ in degrees about +Y, forward = (sin θ, 0, cos θ).

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::collision::{Obstacle, resolve_circle, strip_inward};
use super::terrain::TerrainGrid;
use super::water::WaterSurface;

const EPSILON: f32 = 1e-5;
/// Upper bound on terrain sub-steps per tick. Distance beyond
/// `MAX_SUBSTEPS * collision_step` in one tick is dropped rather than skipped over.
const MAX_SUBSTEPS: u32 = 256;
/// Passes over the obstacle list when pushes chain into each other.
const MAX_PUSH_ITERATIONS: usize = 4;
/// Speed kept when a blocked step slides along one axis.
const SLIDE_SPEED_FACTOR: f32 = 0.5;

// ============================================================================
// TUNING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoatTuning {
    /// World units per second.
    pub max_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    /// Degrees per second at full authority.
    pub turn_speed: f32,
    /// Speed-proportional water drag.
    pub drag: f32,
    pub length: f32,
    pub width: f32,
    /// Collision radius against obstacles.
    pub radius: f32,
    /// Hull height above the sampled water surface.
    pub draft: f32,
    /// Rate (1/s) of the vertical buoyancy smoothing while driving.
    pub buoyancy_response: f32,
    /// Roll is damped relative to the raw lateral slope.
    pub roll_factor: f32,
    /// Longest terrain sub-step in world units. Keep below half a cell.
    pub collision_step: f32,
}

impl Default for BoatTuning {
    fn default() -> Self {
        Self {
            max_speed: 5.0,
            acceleration: 2.0,
            deceleration: 1.0,
            turn_speed: 60.0,
            drag: 0.5,
            length: 2.0,
            width: 0.8,
            radius: 1.0,
            draft: 0.05,
            buoyancy_response: 8.0,
            roll_factor: 0.5,
            collision_step: 0.2,
        }
    }
}

/// Fraction of the full turn rate available at `speed`.
///
/// `sqrt(|speed| / max_speed)`, clamped to [0, 1]: zero at rest, one half at a
/// quarter of top speed, full authority at top speed.
pub fn turn_authority(speed: f32, max_speed: f32) -> f32 {
    if max_speed <= EPSILON {
        return 0.0;
    }
    (speed.abs() / max_speed).clamp(0.0, 1.0).sqrt()
}

// ============================================================================
// TERRAIN QUERY
// ============================================================================

/// Answers "may the boat's center be at (x, z)?".
pub trait NavigableWater {
    fn is_navigable(&self, x: f32, z: f32) -> bool;
}

impl<F: Fn(f32, f32) -> bool> NavigableWater for F {
    fn is_navigable(&self, x: f32, z: f32) -> bool {
        self(x, z)
    }
}

impl NavigableWater for TerrainGrid {
    fn is_navigable(&self, x: f32, z: f32) -> bool {
        self.is_water_at_world(x, z)
    }
}

// ============================================================================
// BOAT
// ============================================================================

/// Axis-aligned XZ rectangle the boat must stay inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

/// Renderable snapshot of the boat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoatPose {
    pub position: Vec3,
    /// Degrees about +Y.
    pub rotation: f32,
    pub pitch: f32,
    pub roll: f32,
}

#[derive(Debug, Clone)]
pub struct Boat {
    position: Vec3,
    rotation: f32,
    speed: f32,
    angular_velocity: f32,
    pitch: f32,
    roll: f32,
    forward_input: f32,
    turn_input: f32,
    tuning: BoatTuning,
    bounds: Option<Bounds>,
    obstacles: Vec<Obstacle>,
}

impl Boat {
    pub fn new(position: Vec3, rotation: f32) -> Self {
        Self::with_tuning(position, rotation, BoatTuning::default())
    }

    pub fn with_tuning(position: Vec3, rotation: f32, tuning: BoatTuning) -> Self {
        Self {
            position,
            rotation: wrap_degrees(rotation),
            speed: 0.0,
            angular_velocity: 0.0,
            pitch: 0.0,
            roll: 0.0,
            forward_input: 0.0,
            turn_input: 0.0,
            tuning,
            bounds: None,
            obstacles: Vec::new(),
        }
    }

    /// Store control inputs for the next update. Both are clamped to [-1, 1];
    /// non-finite values count as zero.
    pub fn process_input(&mut self, forward: f32, turn: f32) {
        self.forward_input = sanitize_axis(forward);
        self.turn_input = sanitize_axis(turn);
    }

    /// Full simulation tick: motion, terrain, obstacles, bounds, buoyancy.
    pub fn update(&mut self, dt: f32, water: &dyn WaterSurface, time: f32, terrain: &impl NavigableWater) {
        if !(dt > 0.0 && dt.is_finite()) {
            self.update_buoyancy(water, time, None);
            return;
        }
        let before = self.xz();
        self.update_motion(dt, terrain);
        self.handle_obstacles(before, terrain);
        self.apply_bounds();
        self.update_buoyancy(water, time, Some(dt));
    }

    /// Buoyancy only: keeps a parked boat bobbing on the waves without drifting.
    pub fn sync_to_water_surface(&mut self, water: &dyn WaterSurface, time: f32) {
        self.update_buoyancy(water, time, None);
    }

    // ------------------------------------------------------------------------
    // Motion
    // ------------------------------------------------------------------------

    fn update_motion(&mut self, dt: f32, terrain: &impl NavigableWater) {
        let t = self.tuning;

        let target = t.max_speed * self.forward_input;
        let speeding_up = target.abs() > self.speed.abs()
            && (self.speed.abs() <= EPSILON || target.signum() == self.speed.signum());
        let rate = if speeding_up {
            t.acceleration
        } else {
            t.deceleration + t.drag * self.speed.abs()
        };
        self.speed = approach(self.speed, target, rate * dt);

        self.angular_velocity = self.turn_input * t.turn_speed * turn_authority(self.speed, t.max_speed);
        self.rotation = wrap_degrees(self.rotation + self.angular_velocity * dt);

        let distance = self.speed * dt;
        if distance.abs() <= EPSILON {
            return;
        }

        let step_len = t.collision_step.max(0.01);
        let steps = ((distance.abs() / step_len).ceil() as u32).clamp(1, MAX_SUBSTEPS);
        let step = (distance / steps as f32).clamp(-step_len, step_len);
        let mut delta = self.forward_xz() * step;

        // A boat already stranded on land may move freely until it reaches water.
        let stranded = !terrain.is_navigable(self.position.x, self.position.z);

        for _ in 0..steps {
            let pos = Vec2::new(self.position.x, self.position.z);
            let next = pos + delta;
            if stranded || terrain.is_navigable(next.x, next.y) {
                self.set_xz(next);
                continue;
            }

            let slide_x = pos + Vec2::new(delta.x, 0.0);
            let slide_z = pos + Vec2::new(0.0, delta.y);
            if delta.x.abs() > EPSILON && terrain.is_navigable(slide_x.x, slide_x.y) {
                self.set_xz(slide_x);
            } else if delta.y.abs() > EPSILON && terrain.is_navigable(slide_z.x, slide_z.y) {
                self.set_xz(slide_z);
            } else {
                self.speed = 0.0;
                break;
            }
            self.speed *= SLIDE_SPEED_FACTOR;
            delta *= SLIDE_SPEED_FACTOR;
        }
    }

    /// `before` is the XZ position at the start of this tick, used as the
    /// fallback when the push-out would land on unnavigable terrain.
    fn handle_obstacles(&mut self, before: Vec2, terrain: &impl NavigableWater) {
        if self.obstacles.is_empty() {
            return;
        }

        let forward = self.forward_xz();
        let start = Vec2::new(self.position.x, self.position.z);
        let mut center = start;
        let mut velocity = forward * self.speed;

        for _ in 0..MAX_PUSH_ITERATIONS {
            let mut pushed = false;
            for obstacle in &self.obstacles {
                if let Some(contact) = resolve_circle(center, self.tuning.radius, obstacle, -forward) {
                    center = contact.resolved;
                    velocity = strip_inward(velocity, contact.normal);
                    pushed = true;
                }
            }
            if !pushed {
                break;
            }
        }

        if center == start {
            return;
        }
        if terrain.is_navigable(center.x, center.y) || !terrain.is_navigable(start.x, start.y) {
            self.set_xz(center);
            self.speed = velocity.dot(forward);
        } else {
            // Pushed onto land: undo this tick's advance instead.
            self.set_xz(before);
            self.speed = 0.0;
        }
    }

    fn apply_bounds(&mut self) {
        let Some(b) = self.bounds else {
            return;
        };

        let forward = self.forward_xz();
        let mut velocity = forward * self.speed;
        let mut clamped = false;

        if self.position.x < b.min_x {
            self.position.x = b.min_x;
            velocity.x = velocity.x.max(0.0);
            clamped = true;
        } else if self.position.x > b.max_x {
            self.position.x = b.max_x;
            velocity.x = velocity.x.min(0.0);
            clamped = true;
        }

        if self.position.z < b.min_z {
            self.position.z = b.min_z;
            velocity.y = velocity.y.max(0.0);
            clamped = true;
        } else if self.position.z > b.max_z {
            self.position.z = b.max_z;
            velocity.y = velocity.y.min(0.0);
            clamped = true;
        }

        if clamped {
            self.speed = velocity.dot(forward);
        }
    }

    // ------------------------------------------------------------------------
    // Buoyancy
    // ------------------------------------------------------------------------

    /// Sample bow/stern and port/starboard heights; derive pitch, roll and
    /// hull height. `dt = None` snaps the height instead of smoothing it.
    fn update_buoyancy(&mut self, water: &dyn WaterSurface, time: f32, dt: Option<f32>) {
        let t = self.tuning;
        let forward = self.forward_xz();
        let right = Vec2::new(-forward.y, forward.x);
        let p = Vec2::new(self.position.x, self.position.z);

        let half_len = t.length * 0.5;
        let half_width = t.width * 0.5;
        let sample = |q: Vec2| water.sample_height(q.x, q.y, time);

        let bow = sample(p + forward * half_len);
        let stern = sample(p - forward * half_len);
        let port = sample(p - right * half_width);
        let starboard = sample(p + right * half_width);

        self.pitch = if t.length > EPSILON { (bow - stern).atan2(t.length).to_degrees() } else { 0.0 };
        self.roll = if t.width > EPSILON {
            (port - starboard).atan2(t.width).to_degrees() * t.roll_factor
        } else {
            0.0
        };

        let target_y = (bow + stern) * 0.5 + t.draft;
        self.position.y = match dt {
            Some(dt) => {
                let blend = 1.0 - (-t.buoyancy_response * dt).exp();
                self.position.y + (target_y - self.position.y) * blend
            }
            None => target_y,
        };
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Unit heading on the XZ plane.
    pub fn forward_xz(&self) -> Vec2 {
        let r = self.rotation.to_radians();
        Vec2::new(r.sin(), r.cos())
    }

    pub fn forward(&self) -> Vec3 {
        let f = self.forward_xz();
        Vec3::new(f.x, 0.0, f.y)
    }

    fn xz(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }

    fn set_xz(&mut self, xz: Vec2) {
        self.position.x = xz.x;
        self.position.z = xz.y;
    }

    pub fn position(&self) -> Vec3 { self.position }
    pub fn rotation(&self) -> f32 { self.rotation }
    pub fn speed(&self) -> f32 { self.speed }
    pub fn angular_velocity(&self) -> f32 { self.angular_velocity }
    pub fn pitch(&self) -> f32 { self.pitch }
    pub fn roll(&self) -> f32 { self.roll }
    pub fn tuning(&self) -> &BoatTuning { &self.tuning }
    pub fn bounds(&self) -> Option<Bounds> { self.bounds }
    pub fn obstacles(&self) -> &[Obstacle] { &self.obstacles }

    pub fn pose(&self) -> BoatPose {
        BoatPose {
            position: self.position,
            rotation: self.rotation,
            pitch: self.pitch,
            roll: self.roll,
        }
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = wrap_degrees(rotation);
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = if speed.is_finite() { speed } else { 0.0 };
        if self.speed == 0.0 {
            self.angular_velocity = 0.0;
        }
    }

    pub fn set_bounds(&mut self, min_x: f32, max_x: f32, min_z: f32, max_z: f32) {
        self.bounds = Some(Bounds { min_x, max_x, min_z, max_z });
    }

    pub fn add_obstacle(&mut self, position: Vec3, radius: f32) {
        self.obstacles.push(Obstacle::new(position, radius));
    }

    pub fn clear_obstacles(&mut self) {
        self.obstacles.clear();
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn sanitize_axis(v: f32) -> f32 {
    if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 }
}

/// Move `current` toward `target` by at most `max_delta`.
fn approach(current: f32, target: f32, max_delta: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + diff.signum() * max_delta
    }
}

fn wrap_degrees(deg: f32) -> f32 {
    if deg.is_finite() { deg.rem_euclid(360.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::water::WaveField;

    const DT: f32 = 1.0 / 60.0;

    fn open_water(_: f32, _: f32) -> bool {
        true
    }

    struct Slope;
    impl WaterSurface for Slope {
        fn regenerate_mesh(&mut self, _: &[crate::engine::terrain::WaterQuad]) {}
        fn sample_height(&self, x: f32, z: f32, _: f32) -> f32 {
            0.1 * z + 0.05 * x
        }
    }

    #[test]
    fn full_throttle_approaches_but_never_exceeds_max_speed() {
        let water = WaveField::calm(0.0);
        let mut boat = Boat::new(Vec3::ZERO, 0.0);
        boat.process_input(1.0, 0.0);
        let mut last = 0.0;
        for _ in 0..600 {
            boat.update(DT, &water, 0.0, &open_water);
            assert!(boat.speed() >= last - 1e-6);
            assert!(boat.speed() <= boat.tuning().max_speed + 1e-5);
            last = boat.speed();
        }
        assert!((boat.speed() - 5.0).abs() < 1e-4);
        // Heading +Z: all motion along z.
        assert!(boat.position().x.abs() < 1e-4);
        assert!(boat.position().z > 10.0);
    }

    #[test]
    fn releasing_throttle_coasts_to_a_stop() {
        let water = WaveField::calm(0.0);
        let mut boat = Boat::new(Vec3::ZERO, 0.0);
        boat.set_speed(5.0);
        boat.process_input(0.0, 0.0);
        for _ in 0..600 {
            boat.update(DT, &water, 0.0, &open_water);
        }
        assert_eq!(boat.speed(), 0.0);
    }

    #[test]
    fn turn_authority_curve_is_fixed() {
        assert_eq!(turn_authority(0.0, 5.0), 0.0);
        assert!((turn_authority(1.25, 5.0) - 0.5).abs() < 1e-6);
        assert_eq!(turn_authority(5.0, 5.0), 1.0);
        assert_eq!(turn_authority(-5.0, 5.0), 1.0);
        assert_eq!(turn_authority(50.0, 5.0), 1.0);
        assert_eq!(turn_authority(1.0, 0.0), 0.0);
        let mut prev = 0.0;
        for i in 0..=100 {
            let a = turn_authority(i as f32 * 0.05, 5.0);
            assert!(a >= prev);
            prev = a;
        }
    }

    #[test]
    fn no_turning_in_place() {
        let water = WaveField::calm(0.0);
        let mut boat = Boat::new(Vec3::ZERO, 90.0);
        boat.process_input(0.0, 1.0);
        for _ in 0..120 {
            boat.update(DT, &water, 0.0, &open_water);
        }
        assert_eq!(boat.rotation(), 90.0);
        assert_eq!(boat.position().x, 0.0);
    }

    #[test]
    fn stays_inside_bounds_under_any_input() {
        let water = WaveField::new(0.0);
        let mut boat = Boat::new(Vec3::ZERO, 37.0);
        boat.set_bounds(-3.0, 3.0, -2.0, 2.0);
        let inputs = [(1.0, 0.0), (1.0, 1.0), (-1.0, -1.0), (1.0, -0.3), (5.0, 9.0)];
        for tick in 0..3000 {
            let (f, t) = inputs[(tick / 200) % inputs.len()];
            boat.process_input(f, t);
            let dt = if tick % 7 == 0 { 0.25 } else { DT };
            boat.update(dt, &water, tick as f32 * DT, &open_water);
            let p = boat.position();
            assert!((-3.0..=3.0).contains(&p.x), "x = {} at tick {tick}", p.x);
            assert!((-2.0..=2.0).contains(&p.z), "z = {} at tick {tick}", p.z);
        }
    }

    #[test]
    fn thin_land_strip_is_never_crossed() {
        // One cell of land between x = 1.0 and x = 1.5.
        let strip = |x: f32, _z: f32| !(1.0..1.5).contains(&x);
        let water = WaveField::calm(0.0);
        for &dt in &[DT, 0.1, 0.5, 2.0] {
            let mut boat = Boat::new(Vec3::ZERO, 90.0);
            boat.set_speed(5.0);
            boat.process_input(1.0, 0.0);
            for _ in 0..50 {
                boat.update(dt, &water, 0.0, &strip);
                assert!(boat.position().x < 1.0, "dt {dt}: x = {}", boat.position().x);
            }
        }
    }

    #[test]
    fn obstacle_pushes_boat_to_touching_distance() {
        let water = WaveField::calm(0.0);
        let mut boat = Boat::new(Vec3::ZERO, 0.0);
        boat.add_obstacle(Vec3::new(0.0, 0.0, 2.0), 1.5);
        boat.set_speed(5.0);
        boat.process_input(1.0, 0.0);
        boat.update(0.1, &water, 0.0, &open_water);

        let p = boat.position();
        let dist = Vec2::new(p.x, p.z).distance(Vec2::new(0.0, 2.0));
        assert!(dist >= boat.tuning().radius + 1.5 - 1e-4, "dist = {dist}");
        // Head-on contact removes all forward speed.
        assert!(boat.speed().abs() < 1e-4);
    }

    #[test]
    fn obstacle_across_a_narrow_canal_holds_the_boat_back() {
        // Canal too narrow to slip past: every push-out lands on the banks.
        let canal = |x: f32, _z: f32| (-0.5..0.6).contains(&x);
        let water = WaveField::calm(0.0);
        let obstacle = Vec2::new(1.0, 2.0);
        for &dt in &[DT, 0.1, 0.25] {
            let mut boat = Boat::new(Vec3::new(0.2, 0.0, -4.0), 0.0);
            boat.add_obstacle(Vec3::new(obstacle.x, 0.0, obstacle.y), 1.5);
            boat.process_input(1.0, 0.0);
            let touching = boat.tuning().radius + 1.5;
            for tick in 0..200 {
                boat.update(dt, &water, 0.0, &canal);
                let p = boat.position();
                let dist = Vec2::new(p.x, p.z).distance(obstacle);
                assert!(dist >= touching - 1e-3, "dt {dt}, tick {tick}: dist = {dist}");
                assert!(canal(p.x, p.z), "dt {dt}, tick {tick}: x = {}", p.x);
            }
        }
    }

    #[test]
    fn buoyancy_follows_the_surface_slope() {
        let mut boat = Boat::new(Vec3::new(0.0, 3.0, 0.0), 0.0);
        boat.sync_to_water_surface(&Slope, 0.0);
        let t = *boat.tuning();
        let expected_pitch = (0.1f32 * t.length).atan2(t.length).to_degrees();
        assert!((boat.pitch() - expected_pitch).abs() < 1e-4);
        assert!((boat.position().y - t.draft).abs() < 1e-5);
        // Starboard (-X when facing +Z) sits lower than port on this slope.
        assert!(boat.roll() > 0.0);
    }

    #[test]
    fn sync_does_not_move_the_boat() {
        let water = WaveField::new(0.0);
        let mut boat = Boat::new(Vec3::new(1.0, 0.0, -2.0), 45.0);
        boat.process_input(1.0, 1.0);
        for i in 0..100 {
            boat.sync_to_water_surface(&water, i as f32 * 0.1);
        }
        assert_eq!(boat.position().x, 1.0);
        assert_eq!(boat.position().z, -2.0);
        assert_eq!(boat.speed(), 0.0);
    }

    #[test]
    fn garbage_input_is_sanitized() {
        let water = WaveField::calm(0.0);
        let mut boat = Boat::new(Vec3::ZERO, 0.0);
        boat.process_input(f32::NAN, f32::INFINITY);
        boat.update(DT, &water, 0.0, &open_water);
        boat.update(f32::NAN, &water, 0.0, &open_water);
        assert!(boat.position().is_finite());
        assert!(boat.rotation().is_finite());
    }
}
