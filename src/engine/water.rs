// Water surface collaborator.
//
// The editor talks to the water through the `WaterSurface` trait: it hands
// over the water-cell footprints whenever they change and asks for the
// surface height when the boat samples buoyancy. `WaveField` is the default
// implementation: a small sum of directional sine waves, evaluated the same
// way for boat physics and for drawing water tiles so the two never disagree.

use glam::Vec2;
use super::terrain::WaterQuad;

/// Resting height of the water plane.
pub const WATER_LEVEL: f32 = 0.0;

pub trait WaterSurface {
    /// Replace the set of water tiles. Called after any terrain change that
    /// involved a water cell.
    fn regenerate_mesh(&mut self, quads: &[WaterQuad]);

    /// Surface height at a world XZ position and simulated time (seconds).
    fn sample_height(&self, x: f32, z: f32, time: f32) -> f32;
}

/// One directional sine wave.
#[derive(Debug, Clone, Copy)]
pub struct Wave {
    /// Unit travel direction on XZ.
    pub direction: Vec2,
    pub amplitude: f32,
    pub wavelength: f32,
    /// Phase speed in world units per second.
    pub speed: f32,
}

impl Wave {
    fn height(&self, p: Vec2, time: f32) -> f32 {
        if self.wavelength <= f32::EPSILON {
            return 0.0;
        }
        let k = std::f32::consts::TAU / self.wavelength;
        let phase = k * (self.direction.dot(p) - self.speed * time);
        self.amplitude * phase.sin()
    }
}

/// Analytic wave field over the water tiles.
pub struct WaveField {
    pub base_height: f32,
    pub waves: Vec<Wave>,
    quads: Vec<WaterQuad>,
    /// Bumped on every `regenerate_mesh`; renderers compare it to decide
    /// whether to rebuild their buffers.
    revision: u64,
}

impl WaveField {
    pub fn new(base_height: f32) -> Self {
        Self {
            base_height,
            waves: vec![
                Wave { direction: Vec2::new(1.0, 0.0), amplitude: 0.04, wavelength: 4.0, speed: 0.8 },
                Wave { direction: Vec2::new(0.6, 0.8), amplitude: 0.025, wavelength: 2.3, speed: 0.6 },
                Wave { direction: Vec2::new(-0.7, 0.7), amplitude: 0.015, wavelength: 1.3, speed: 0.5 },
            ],
            quads: Vec::new(),
            revision: 0,
        }
    }

    /// Perfectly still water; handy for deterministic physics checks.
    pub fn calm(base_height: f32) -> Self {
        Self { waves: Vec::new(), ..Self::new(base_height) }
    }

    pub fn quads(&self) -> &[WaterQuad] {
        &self.quads
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Default for WaveField {
    fn default() -> Self {
        Self::new(WATER_LEVEL)
    }
}

impl WaterSurface for WaveField {
    fn regenerate_mesh(&mut self, quads: &[WaterQuad]) {
        self.quads.clear();
        self.quads.extend_from_slice(quads);
        self.revision += 1;
        log::debug!("water mesh regenerated: {} tiles", self.quads.len());
    }

    fn sample_height(&self, x: f32, z: f32, time: f32) -> f32 {
        let p = Vec2::new(x, z);
        self.base_height + self.waves.iter().map(|w| w.height(p, time)).sum::<f32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calm_water_is_flat() {
        let water = WaveField::calm(0.3);
        assert_eq!(water.sample_height(1.0, -4.0, 12.5), 0.3);
    }

    #[test]
    fn waves_stay_within_total_amplitude() {
        let water = WaveField::new(0.0);
        let bound: f32 = water.waves.iter().map(|w| w.amplitude).sum();
        for i in 0..50 {
            let t = i as f32 * 0.37;
            let h = water.sample_height(i as f32 * 0.21, -(i as f32) * 0.13, t);
            assert!(h.abs() <= bound + 1e-5);
        }
    }

    #[test]
    fn regenerate_bumps_revision() {
        let mut water = WaveField::default();
        water.regenerate_mesh(&[WaterQuad { min: Vec2::ZERO, max: Vec2::ONE }]);
        assert_eq!(water.revision(), 1);
        assert_eq!(water.quads().len(), 1);
    }
}
