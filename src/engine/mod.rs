// Engine module - grid, objects, water, boat physics, cameras, and the
// wgpu/egui plumbing the viewer draws with

pub mod boat;
pub mod camera;
pub mod collision;
pub mod debug_overlay;
pub mod input;
pub mod mesh;
pub mod objects;
pub mod terrain;
pub mod water;
