// Editor camera set.
//
// Camera models:
//   - OrthographicCamera: plan view straight down the Y axis, screen-up = world -Z.
//     Used for terrain painting.
//   - OrbitCamera: spherical (yaw, pitch, distance) around a target point.
//     Used for building placement.
//   - FollowCamera: chases a point behind the boat with frame-rate independent
//     exponential smoothing; right-drag free-look orbits the offset without
//     touching the boat's own heading.
//   - TransitionCamera: scratch look-at matrix written by the mode-switch blend.
//
// `ActiveCamera` is the tagged view over whichever one is live, so renderers
// and picking use one accessor set without dynamic dispatch.
//
// Angles on the public API are degrees; glam wants radians internally.

use glam::{Mat4, Quat, Vec2, Vec3};

const EPSILON: f32 = 1e-6;

/// `look_at_rh` that refuses degenerate input (eye on target, or view
/// direction parallel to `up`) instead of producing NaNs.
pub fn safe_look_at(eye: Vec3, target: Vec3, up: Vec3) -> Option<Mat4> {
    let dir = target - eye;
    if dir.length_squared() <= EPSILON || dir.normalize().cross(up).length_squared() <= EPSILON {
        return None;
    }
    Some(Mat4::look_at_rh(eye, target, up))
}

// ============================================================================
// ORTHOGRAPHIC
// ============================================================================

pub struct OrthographicCamera {
    /// View center on the XZ plane (x, z).
    center: Vec2,
    /// Visible extent in world units. Private: clamped by zoom().
    width: f32,
    height: f32,
    /// Eye height above the ground plane.
    pub camera_height: f32,
    pub near: f32,
    pub far: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Fractional size change per scroll unit.
    pub zoom_step: f32,
}

impl OrthographicCamera {
    pub fn new(center_x: f32, center_z: f32, width: f32, height: f32) -> Self {
        Self {
            center: Vec2::new(center_x, center_z),
            width,
            height,
            camera_height: 20.0,
            near: 0.1,
            far: 500.0,
            min_zoom: 2.0,
            max_zoom: 100.0,
            zoom_step: 0.1,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.position();
        let target = Vec3::new(self.center.x, 0.0, self.center.y);
        Mat4::look_at_rh(eye, target, Vec3::NEG_Z)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let (hw, hh) = (self.width * 0.5, self.height * 0.5);
        Mat4::orthographic_rh(-hw, hw, -hh, hh, self.near, self.far)
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.center.x, self.camera_height, self.center.y)
    }

    pub fn center(&self) -> Vec2 { self.center }
    pub fn view_size(&self) -> Vec2 { Vec2::new(self.width, self.height) }

    pub fn set_center(&mut self, x: f32, z: f32) {
        self.center = Vec2::new(x, z);
    }

    /// Scroll zoom: positive delta zooms in. Width is clamped to the zoom
    /// range and height follows so the aspect is preserved.
    pub fn zoom(&mut self, delta: f32) {
        let scale = (1.0 - delta * self.zoom_step).max(0.01);
        let aspect = self.width / self.height.max(EPSILON);
        self.width = (self.width * scale).clamp(self.min_zoom, self.max_zoom);
        self.height = self.width / aspect;
    }

    pub fn pan(&mut self, dx: f32, dz: f32) {
        self.center += Vec2::new(dx, dz);
    }

    /// Keep the visible width and derive the height from the window aspect.
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if aspect > EPSILON {
            self.height = self.width / aspect;
        }
    }
}

// ============================================================================
// ORBIT
// ============================================================================

pub struct OrbitCamera {
    target: Vec3,
    /// Private: always clamped to [min_distance, max_distance].
    distance: f32,
    /// Degrees, wrapped to [0, 360).
    yaw: f32,
    /// Degrees, clamped to [min_pitch, max_pitch].
    pitch: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    aspect: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
    /// Degrees per unit of mouse delta.
    pub rotate_sensitivity: f32,
}

impl OrbitCamera {
    pub fn new(target: Vec3, distance: f32, fov: f32, aspect: f32) -> Self {
        let mut cam = Self {
            target,
            distance,
            yaw: 45.0,
            pitch: 30.0,
            fov,
            aspect,
            near: 0.1,
            far: 1000.0,
            min_distance: 2.0,
            max_distance: 50.0,
            min_pitch: 5.0,
            max_pitch: 85.0,
            rotate_sensitivity: 0.3,
        };
        cam.distance = cam.distance.clamp(cam.min_distance, cam.max_distance);
        cam
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    /// World-space eye from the spherical coordinates.
    pub fn position(&self) -> Vec3 {
        let (y, p) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.target
            + Vec3::new(
                self.distance * p.cos() * y.cos(),
                self.distance * p.sin(),
                self.distance * p.cos() * y.sin(),
            )
    }

    /// Re-derive yaw/pitch/distance so the eye sits at `position`.
    pub fn set_position(&mut self, position: Vec3) {
        let dir = position - self.target;
        let len = dir.length();
        if len <= EPSILON {
            return;
        }
        let dir = dir / len;
        self.distance = len.clamp(self.min_distance, self.max_distance);
        self.pitch = dir.y.clamp(-1.0, 1.0).asin().to_degrees().clamp(self.min_pitch, self.max_pitch);
        self.yaw = dir.z.atan2(dir.x).to_degrees().rem_euclid(360.0);
    }

    pub fn set_angles(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw.rem_euclid(360.0);
        self.pitch = pitch.clamp(self.min_pitch, self.max_pitch);
    }

    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw = (self.yaw + delta_yaw * self.rotate_sensitivity).rem_euclid(360.0);
        self.pitch = (self.pitch + delta_pitch * self.rotate_sensitivity).clamp(self.min_pitch, self.max_pitch);
    }

    /// Positive delta moves the eye closer.
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta).clamp(self.min_distance, self.max_distance);
    }

    /// Camera-relative horizontal axes derived from yaw only: (right, forward).
    /// `forward` is the viewing direction projected onto XZ.
    pub fn ground_axes(&self) -> (Vec3, Vec3) {
        let y = self.yaw.to_radians();
        let forward = Vec3::new(-y.cos(), 0.0, -y.sin());
        let right = Vec3::new(y.sin(), 0.0, -y.cos());
        (right, forward)
    }

    /// Move the target along camera-right (dx), world-up (dy), camera-forward (dz).
    pub fn pan_target(&mut self, dx: f32, dy: f32, dz: f32) {
        let (right, forward) = self.ground_axes();
        self.target += right * dx + Vec3::Y * dy + forward * dz;
    }

    pub fn target(&self) -> Vec3 { self.target }
    pub fn distance(&self) -> f32 { self.distance }
    pub fn yaw(&self) -> f32 { self.yaw }
    pub fn pitch(&self) -> f32 { self.pitch }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if aspect > EPSILON {
            self.aspect = aspect;
        }
    }
}

// ============================================================================
// FOLLOW
// ============================================================================

pub struct FollowCamera {
    position: Vec3,
    target_position: Vec3,
    /// Followed heading in degrees about +Y.
    target_rotation: f32,
    /// Eye offset in the target's local frame (+Z = bow).
    pub offset: Vec3,
    /// Smoothing rate in 1/s.
    pub smooth_speed: f32,
    /// Free-look angles layered on top of the target heading (degrees).
    look_yaw: f32,
    look_pitch: f32,
    pub look_sensitivity: f32,
    pub min_look_pitch: f32,
    pub max_look_pitch: f32,
    pub fov: f32,
    aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl FollowCamera {
    pub fn new(fov: f32, aspect: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            target_position: Vec3::ZERO,
            target_rotation: 0.0,
            offset: Vec3::new(0.0, 2.5, -5.0),
            smooth_speed: 5.0,
            look_yaw: 0.0,
            look_pitch: 0.0,
            look_sensitivity: 0.3,
            min_look_pitch: -15.0,
            max_look_pitch: 45.0,
            fov,
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn set_target(&mut self, position: Vec3, rotation: f32) {
        self.target_position = position;
        self.target_rotation = rotation;
    }

    /// Where the eye wants to be: target + offset rotated by heading and free-look.
    pub fn desired_position(&self) -> Vec3 {
        let heading = Quat::from_rotation_y((self.target_rotation + self.look_yaw).to_radians());
        let tilt = Quat::from_rotation_x(self.look_pitch.to_radians());
        self.target_position + heading * tilt * self.offset
    }

    /// Exponential chase: `mix(position, desired, 1 - e^(-k dt))`.
    pub fn update(&mut self, dt: f32) {
        if !(dt > 0.0 && dt.is_finite()) {
            return;
        }
        let t = 1.0 - (-self.smooth_speed * dt).exp();
        self.position = self.position.lerp(self.desired_position(), t);
    }

    pub fn snap_to_desired(&mut self) {
        self.position = self.desired_position();
    }

    /// Right-drag free-look. Independent of the boat's own turning.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.look_yaw = (self.look_yaw - dx * self.look_sensitivity).rem_euclid(360.0);
        self.look_pitch =
            (self.look_pitch + dy * self.look_sensitivity).clamp(self.min_look_pitch, self.max_look_pitch);
    }

    pub fn reset_look(&mut self) {
        self.look_yaw = 0.0;
        self.look_pitch = 0.0;
    }

    pub fn view_matrix(&self) -> Mat4 {
        safe_look_at(self.position, self.target_position, Vec3::Y)
            .unwrap_or_else(|| Mat4::from_translation(-self.position))
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn position(&self) -> Vec3 { self.position }
    pub fn target_position(&self) -> Vec3 { self.target_position }
    pub fn target_rotation(&self) -> f32 { self.target_rotation }
    pub fn look_angles(&self) -> (f32, f32) { (self.look_yaw, self.look_pitch) }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if aspect > EPSILON {
            self.aspect = aspect;
        }
    }
}

// ============================================================================
// TRANSITION
// ============================================================================

/// Holds the interpolated view while a mode switch is animating.
pub struct TransitionCamera {
    view: Mat4,
    position: Vec3,
    pub fov: f32,
    aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl TransitionCamera {
    pub fn new(aspect: f32) -> Self {
        Self {
            view: Mat4::IDENTITY,
            position: Vec3::ZERO,
            fov: 45.0,
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Rebuild the view. A degenerate eye/target pair keeps the previous matrix.
    pub fn set_look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        if let Some(view) = safe_look_at(eye, target, up) {
            self.view = view;
            self.position = eye;
        }
    }

    pub fn view_matrix(&self) -> Mat4 { self.view }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn position(&self) -> Vec3 { self.position }

    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if aspect > EPSILON {
            self.aspect = aspect;
        }
    }
}

// ============================================================================
// ACTIVE CAMERA
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraKind {
    Orthographic,
    Orbit,
    Follow,
    Transition,
}

/// Borrowed view of whichever camera currently drives the viewport.
#[derive(Clone, Copy)]
pub enum ActiveCamera<'a> {
    Orthographic(&'a OrthographicCamera),
    Orbit(&'a OrbitCamera),
    Follow(&'a FollowCamera),
    Transition(&'a TransitionCamera),
}

impl ActiveCamera<'_> {
    pub fn kind(&self) -> CameraKind {
        match self {
            ActiveCamera::Orthographic(_) => CameraKind::Orthographic,
            ActiveCamera::Orbit(_) => CameraKind::Orbit,
            ActiveCamera::Follow(_) => CameraKind::Follow,
            ActiveCamera::Transition(_) => CameraKind::Transition,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        match self {
            ActiveCamera::Orthographic(c) => c.view_matrix(),
            ActiveCamera::Orbit(c) => c.view_matrix(),
            ActiveCamera::Follow(c) => c.view_matrix(),
            ActiveCamera::Transition(c) => c.view_matrix(),
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        match self {
            ActiveCamera::Orthographic(c) => c.projection_matrix(),
            ActiveCamera::Orbit(c) => c.projection_matrix(),
            ActiveCamera::Follow(c) => c.projection_matrix(),
            ActiveCamera::Transition(c) => c.projection_matrix(),
        }
    }

    pub fn position(&self) -> Vec3 {
        match self {
            ActiveCamera::Orthographic(c) => c.position(),
            ActiveCamera::Orbit(c) => c.position(),
            ActiveCamera::Follow(c) => c.position(),
            ActiveCamera::Transition(c) => c.position(),
        }
    }

    /// Combined view-projection matrix ready to upload to the GPU.
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
