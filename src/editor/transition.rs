// Animated camera blend used when switching between building and game mode.

use glam::Vec3;

/// Hermite smoothstep on [0, 1]: `t² (3 − 2t)`.
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Eye/look-at pair at one end of a blend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransition {
    from: CameraPose,
    to: CameraPose,
    elapsed: f32,
    duration: f32,
}

impl CameraTransition {
    pub fn new(from: CameraPose, to: CameraPose, duration: f32) -> Self {
        Self { from, to, elapsed: 0.0, duration }
    }

    /// Linear progress in [0, 1]. A non-positive duration is already done.
    pub fn progress(&self) -> f32 {
        if self.duration > 0.0 {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    pub fn advance(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
    }

    /// Eased eye and target at the current progress.
    pub fn pose(&self) -> CameraPose {
        let t = smoothstep(self.progress());
        CameraPose {
            position: self.from.position.lerp(self.to.position, t),
            target: self.from.target.lerp(self.to.target, t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose(x: f32) -> CameraPose {
        CameraPose { position: Vec3::new(x, 10.0, 0.0), target: Vec3::new(x, 0.0, 0.0) }
    }

    #[test]
    fn smoothstep_shape() {
        assert_eq!(smoothstep(-1.0), 0.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(2.0), 1.0);
        assert!(smoothstep(0.25) < 0.25);
    }

    #[test]
    fn blend_eases_between_ends() {
        let mut tr = CameraTransition::new(pose(0.0), pose(10.0), 0.5);
        assert_eq!(tr.pose(), pose(0.0));
        tr.advance(0.25);
        assert!((tr.pose().position.x - 5.0).abs() < 1e-5);
        assert!(!tr.is_finished());
        tr.advance(1.0);
        assert!(tr.is_finished());
        assert_eq!(tr.pose(), pose(10.0));
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let tr = CameraTransition::new(pose(0.0), pose(3.0), 0.0);
        assert!(tr.is_finished());
        assert_eq!(tr.pose(), pose(3.0));
    }
}
