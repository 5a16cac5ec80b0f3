// Scene editor: the single owner of every piece of mutable scene state.
//
// Layers, bottom-up:
//   1. TerrainGrid + ObjectStore  (data)
//   2. Boat                       (physics, obstacles rebuilt from the store)
//   3. Cameras + transition       (one per mode, blended building <-> game)
//   4. SceneEditor                (mode machine, undo, input routing, I/O)
//
// Renderers and the HUD only read through the query methods at the bottom;
// every mutation goes through an operation here so undo, water-mesh
// invalidation and obstacle rebuilding stay in one place.

use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3, Vec4Swizzles};
use log::{debug, info};

use crate::config::{EditorConfig, EditorSession};
use crate::engine::boat::{Boat, BoatPose};
use crate::engine::camera::{ActiveCamera, FollowCamera, OrbitCamera, OrthographicCamera, TransitionCamera};
use crate::engine::objects::{ObjectStore, ObjectType, PlacedObject};
use crate::engine::terrain::{GRID_SIZE, TerrainCell, TerrainGrid};
use crate::engine::water::{WaterSurface, WaveField};
use crate::error::Result;

use super::history::{History, ObjectAction, TerrainAction};
use super::layout::{RiverLayout, generate_default_layout};
use super::scene_file;
use super::transition::{CameraPose, CameraTransition};

/// Max 3D distance when matching an undo record to a stored object.
const UNDO_MATCH_EPSILON: f32 = 0.01;
/// Rays flatter than this never reach the ground in a useful place.
const MIN_RAY_DIR_Y: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorMode {
    Terrain,
    Building,
    Game,
}

impl EditorMode {
    pub const ALL: [EditorMode; 3] = [EditorMode::Terrain, EditorMode::Building, EditorMode::Game];

    pub fn label(self) -> &'static str {
        match self {
            EditorMode::Terrain => "Terrain",
            EditorMode::Building => "Building",
            EditorMode::Game => "Game",
        }
    }

    /// Only building <-> game is animated; the plan view cuts.
    fn blends_with(self, other: EditorMode) -> bool {
        matches!(
            (self, other),
            (EditorMode::Building, EditorMode::Game) | (EditorMode::Game, EditorMode::Building)
        )
    }
}

pub struct SceneEditor {
    config: EditorConfig,
    mode: EditorMode,

    terrain: TerrainGrid,
    objects: ObjectStore,
    terrain_history: History<TerrainAction>,
    object_history: History<ObjectAction>,
    river: RiverLayout,

    boat: Boat,
    /// Where game mode resumes the boat. Updated on placement and on leaving game.
    boat_placed: bool,
    boat_placed_position: Vec3,
    boat_placed_rotation: f32,

    water: Box<dyn WaterSurface>,
    sim_time: f32,

    ortho_camera: OrthographicCamera,
    orbit_camera: OrbitCamera,
    follow_camera: FollowCamera,
    transition_camera: TransitionCamera,
    transition: Option<CameraTransition>,

    current_terrain: TerrainCell,
    current_object: ObjectType,
}

impl SceneEditor {
    pub fn new(config: EditorConfig, aspect: f32) -> Self {
        Self::with_water_surface(config, aspect, Box::new(WaveField::default()))
    }

    pub fn with_water_surface(config: EditorConfig, aspect: f32, water: Box<dyn WaterSurface>) -> Self {
        let cam = config.camera;
        let aspect = if aspect > 0.0 && aspect.is_finite() { aspect } else { 1.0 };

        let mut ortho_camera =
            OrthographicCamera::new(0.0, 0.0, cam.ortho_view_size, cam.ortho_view_size / aspect);
        ortho_camera.camera_height = cam.ortho_height;
        ortho_camera.min_zoom = cam.ortho_min_zoom;
        ortho_camera.max_zoom = cam.ortho_max_zoom;

        let mut orbit_camera = OrbitCamera::new(Vec3::ZERO, cam.orbit_distance, cam.fov, aspect);
        orbit_camera.set_angles(cam.orbit_yaw, cam.orbit_pitch);
        orbit_camera.rotate_sensitivity = cam.orbit_rotate_sensitivity;

        let mut follow_camera = FollowCamera::new(cam.fov, aspect);
        follow_camera.offset = Vec3::from_array(cam.follow_offset);
        follow_camera.smooth_speed = cam.follow_smoothing;
        follow_camera.look_sensitivity = cam.follow_look_sensitivity;

        let mut transition_camera = TransitionCamera::new(aspect);
        transition_camera.fov = cam.fov;

        let terrain = TerrainGrid::new(GRID_SIZE);
        let mut boat = Boat::with_tuning(Vec3::ZERO, 0.0, config.boat);
        let half = terrain.half_extent();
        boat.set_bounds(-half, half, -half, half);

        let mut editor = Self {
            config,
            mode: EditorMode::Terrain,
            terrain,
            objects: ObjectStore::new(),
            terrain_history: History::new(),
            object_history: History::new(),
            river: RiverLayout { start_column: 0, end_column: 0, boat_position: Vec3::ZERO, boat_rotation: 0.0 },
            boat,
            boat_placed: false,
            boat_placed_position: Vec3::ZERO,
            boat_placed_rotation: 0.0,
            water,
            sim_time: 0.0,
            ortho_camera,
            orbit_camera,
            follow_camera,
            transition_camera,
            transition: None,
            current_terrain: TerrainCell::Grass,
            current_object: ObjectType::House,
        };
        editor.reset_layout();
        info!("scene editor ready: {0}x{0} grid", GRID_SIZE);
        editor
    }

    /// Default river layout, boat in mid-stream, both histories empty.
    fn reset_layout(&mut self) {
        self.river = generate_default_layout(&mut self.terrain);
        self.boat.set_position(self.river.boat_position);
        self.boat.set_rotation(self.river.boat_rotation);
        self.boat.set_speed(0.0);
        self.boat_placed = true;
        self.boat_placed_position = self.river.boat_position;
        self.boat_placed_rotation = self.river.boat_rotation;
        self.terrain_history.clear();
        self.object_history.clear();
        self.regenerate_water_mesh();
        self.boat.sync_to_water_surface(self.water.as_ref(), self.sim_time);
    }

    // ========================================================================
    // MODE STATE MACHINE
    // ========================================================================

    pub fn switch_mode(&mut self, mode: EditorMode) {
        let old = self.mode;
        if old == mode {
            return;
        }

        if old == EditorMode::Game {
            if self.boat_placed {
                self.boat_placed_position = self.boat.position();
                self.boat_placed_rotation = self.boat.rotation();
            }
            self.boat.process_input(0.0, 0.0);
        }
        if mode == EditorMode::Game && self.boat_placed {
            self.boat.set_position(self.boat_placed_position);
            self.boat.set_rotation(self.boat_placed_rotation);
            self.boat.set_speed(0.0);
        }

        // Blend start: wherever the viewer is right now.
        let start = CameraPose {
            position: self.current_camera().position(),
            target: if old == EditorMode::Building {
                self.orbit_camera.target()
            } else {
                self.boat.position()
            },
        };

        self.mode = mode;

        let end = match mode {
            EditorMode::Terrain => {
                self.ortho_camera.set_center(0.0, 0.0);
                None
            }
            EditorMode::Building => {
                if self.boat_placed {
                    self.orbit_camera.set_target(self.boat_placed_position);
                }
                Some(CameraPose { position: self.orbit_camera.position(), target: self.orbit_camera.target() })
            }
            EditorMode::Game => {
                self.follow_camera.set_target(self.boat.position(), self.boat.rotation());
                self.follow_camera.snap_to_desired();
                self.rebuild_obstacles();
                Some(CameraPose { position: self.follow_camera.desired_position(), target: self.boat.position() })
            }
        };

        self.transition = match end {
            Some(end) if old.blends_with(mode) => {
                let tr = CameraTransition::new(start, end, self.config.transition_duration);
                self.transition_camera.set_look_at(start.position, start.target, Vec3::Y);
                Some(tr)
            }
            _ => None,
        };

        self.prune_objects_on_water();
        info!("mode {} -> {}", old.label(), mode.label());
    }

    pub fn current_mode(&self) -> EditorMode {
        self.mode
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    // ========================================================================
    // FRAME UPDATE
    // ========================================================================

    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.sim_time += dt;

        if let Some(tr) = self.transition.as_mut() {
            tr.advance(dt);
            if tr.is_finished() {
                self.transition = None;
            } else {
                let pose = tr.pose();
                self.transition_camera.set_look_at(pose.position, pose.target, Vec3::Y);
            }
        }

        if self.mode == EditorMode::Game {
            self.boat.update(dt, self.water.as_ref(), self.sim_time, &self.terrain);
            self.follow_camera.set_target(self.boat.position(), self.boat.rotation());
            self.follow_camera.update(dt);
        } else {
            self.boat.sync_to_water_surface(self.water.as_ref(), self.sim_time);
        }
    }

    // ========================================================================
    // TERRAIN EDITING
    // ========================================================================

    /// Paint one cell. Returns false for off-grid or unchanged cells.
    pub fn place_terrain(&mut self, grid_x: i32, grid_z: i32, cell: TerrainCell) -> bool {
        if !self.terrain.in_bounds(grid_x, grid_z) {
            return false;
        }
        let old = self.terrain.get(grid_x, grid_z);
        if old == cell {
            return false;
        }

        self.terrain_history.push(TerrainAction { grid_x, grid_z, old, new: cell });
        self.terrain.set(grid_x, grid_z, cell);
        self.after_terrain_change(old, cell);
        debug!("terrain ({grid_x}, {grid_z}) {} -> {}", old.label(), cell.label());
        true
    }

    fn after_terrain_change(&mut self, old: TerrainCell, new: TerrainCell) {
        if old == TerrainCell::Water || new == TerrainCell::Water {
            self.regenerate_water_mesh();
        }
        if new == TerrainCell::Water {
            self.prune_objects_on_water();
        }
    }

    fn regenerate_water_mesh(&mut self) {
        let quads = self.terrain.water_quads();
        self.water.regenerate_mesh(&quads);
    }

    // ========================================================================
    // OBJECT EDITING
    // ========================================================================

    /// Place an object. Returns false (and changes nothing) when the target
    /// cell rejects the kind.
    pub fn place_object(&mut self, kind: ObjectType, position: Vec3) -> bool {
        let on_water = self
            .terrain
            .cell_at_world(position)
            .is_some_and(|(x, z)| self.terrain.is_water(x, z));
        if on_water && !kind.is_water_compatible() {
            debug!("rejected {} on water at ({}, {})", kind.label(), position.x, position.z);
            return false;
        }
        if !on_water && kind.requires_water() {
            debug!("rejected {} off water at ({}, {})", kind.label(), position.x, position.z);
            return false;
        }

        if kind == ObjectType::Boat {
            // Single marker: the old one is removed as its own undoable step.
            if let Some(index) = self.objects.position_of_kind(ObjectType::Boat) {
                if let Some(old) = self.objects.remove_at(index) {
                    self.object_history.push(ObjectAction::removed(old));
                }
            }
            self.boat.set_position(position);
            self.boat.set_speed(0.0);
            self.boat_placed = true;
            self.boat_placed_position = position;
            self.boat_placed_rotation = self.boat.rotation();
        }

        let object = PlacedObject::new(kind, position);
        self.object_history.push(ObjectAction::added(object));
        self.objects.push(object);
        self.objects_changed();
        debug!("placed {} at ({}, {})", kind.label(), position.x, position.z);
        true
    }

    pub fn remove_last_object(&mut self) -> bool {
        let Some(object) = self.objects.remove_last() else {
            return false;
        };
        self.object_history.push(ObjectAction::removed(object));
        self.objects_changed();
        true
    }

    /// Remove the latest object within `radius` (XZ) of `position`.
    pub fn remove_object_near(&mut self, position: Vec3, radius: f32) -> bool {
        let Some(object) = self.objects.remove_near(position, radius) else {
            return false;
        };
        self.object_history.push(ObjectAction::removed(object));
        self.objects_changed();
        debug!("removed {} near ({}, {})", object.kind.label(), position.x, position.z);
        true
    }

    /// Remove every object. Each removal is recorded, newest first, so that
    /// repeated undo restores them in their original order.
    pub fn clear_all_objects(&mut self) {
        let removed = self.objects.clear();
        if removed.is_empty() {
            return;
        }
        self.object_history.extend(removed.iter().rev().copied().map(ObjectAction::removed));
        self.objects_changed();
        info!("cleared {} objects", removed.len());
    }

    /// Objects gone, default terrain back, no history.
    pub fn clear_scene(&mut self) {
        self.objects.clear();
        self.transition = None;
        self.reset_layout();
        if self.mode == EditorMode::Game {
            self.follow_camera.set_target(self.boat.position(), self.boat.rotation());
            self.follow_camera.snap_to_desired();
        }
        self.objects_changed();
        info!("scene reset");
    }

    /// Move the physics boat (and the pose game mode resumes from) onto the
    /// stored Boat marker. Without a marker the last pose is kept.
    fn sync_boat_to_marker(&mut self) {
        let Some(index) = self.objects.position_of_kind(ObjectType::Boat) else {
            return;
        };
        let marker = self.objects.as_slice()[index];
        self.boat.set_position(marker.position);
        self.boat.set_speed(0.0);
        self.boat_placed = true;
        self.boat_placed_position = marker.position;
        self.boat_placed_rotation = self.boat.rotation();
        if self.mode == EditorMode::Game {
            self.follow_camera.set_target(self.boat.position(), self.boat.rotation());
            self.follow_camera.snap_to_desired();
        }
    }

    fn objects_changed(&mut self) {
        if self.mode == EditorMode::Game {
            self.rebuild_obstacles();
        }
    }

    fn rebuild_obstacles(&mut self) {
        self.boat.clear_obstacles();
        for obj in self.objects.iter() {
            if let Some(radius) = obj.kind.obstacle_radius() {
                self.boat.add_obstacle(obj.position, radius);
            }
        }
    }

    /// Drop land-only objects that now sit on water.
    fn prune_objects_on_water(&mut self) {
        let terrain = &self.terrain;
        let removed = self.objects.retain(|obj| {
            obj.kind.is_water_compatible()
                || !terrain.cell_at_world(obj.position).is_some_and(|(x, z)| terrain.is_water(x, z))
        });
        if !removed.is_empty() {
            info!("removed {} objects standing on water", removed.len());
            self.objects_changed();
        }
    }

    // ========================================================================
    // UNDO
    // ========================================================================

    /// Undo within the current mode's category. Game mode has nothing to undo.
    pub fn undo_last_action(&mut self) -> bool {
        match self.mode {
            EditorMode::Building => self.undo_object_action(),
            EditorMode::Terrain => self.undo_terrain_action(),
            EditorMode::Game => false,
        }
    }

    fn undo_object_action(&mut self) -> bool {
        let Some(action) = self.object_history.pop() else {
            return false;
        };
        if action.is_add {
            if self.objects.remove_matching(action.kind, action.position, UNDO_MATCH_EPSILON).is_none() {
                debug!("undo: {} already gone", action.kind.label());
            }
        } else {
            self.objects.push(action.object());
        }
        if action.kind == ObjectType::Boat {
            self.sync_boat_to_marker();
        }
        self.objects_changed();
        true
    }

    fn undo_terrain_action(&mut self) -> bool {
        let Some(action) = self.terrain_history.pop() else {
            return false;
        };
        self.terrain.set(action.grid_x, action.grid_z, action.old);
        self.after_terrain_change(action.new, action.old);
        true
    }

    // ========================================================================
    // SAVE / LOAD
    // ========================================================================

    pub fn save_scene(&self, session: &EditorSession) -> Result<PathBuf> {
        let path = session.scene_path();
        self.save_scene_to(&path)?;
        Ok(path)
    }

    pub fn load_scene(&mut self, session: &EditorSession) -> Result<()> {
        self.load_scene_from(&session.scene_path())
    }

    pub fn save_scene_to(&self, path: &Path) -> Result<()> {
        scene_file::save_to_path(path, &self.terrain, self.objects.as_slice())?;
        info!("saved scene to {}", path.display());
        Ok(())
    }

    /// Replace terrain and objects from `path`. On error nothing changes.
    pub fn load_scene_from(&mut self, path: &Path) -> Result<()> {
        let data = scene_file::load_from_path(path, GRID_SIZE)?;

        self.terrain = data.terrain;
        self.objects = ObjectStore::new();
        for obj in data.objects {
            self.objects.push(obj);
        }
        self.terrain_history.clear();
        self.object_history.clear();
        self.transition = None;

        self.sync_boat_to_marker();
        self.regenerate_water_mesh();
        self.objects_changed();
        info!("loaded scene from {} ({} objects)", path.display(), self.objects.len());
        Ok(())
    }

    // ========================================================================
    // INPUT
    // ========================================================================

    /// Unproject a screen point onto the y = 0 plane and return the grid cell.
    pub fn raycast_to_ground(&self, screen_x: f32, screen_y: f32, width: f32, height: f32) -> Option<(i32, i32)> {
        if !(width > 0.0 && height > 0.0) {
            return None;
        }
        let ndc = Vec2::new(2.0 * screen_x / width - 1.0, 1.0 - 2.0 * screen_y / height);

        let inv_vp = self.current_camera().view_projection().inverse();
        if !inv_vp.is_finite() {
            return None;
        }
        // wgpu depth range: 0 at the near plane, 1 at the far plane.
        let near = inv_vp * ndc.extend(0.0).extend(1.0);
        let far = inv_vp * ndc.extend(1.0).extend(1.0);
        if near.w.abs() <= f32::EPSILON || far.w.abs() <= f32::EPSILON {
            return None;
        }
        let start = near.xyz() / near.w;
        let dir = (far.xyz() / far.w - start).normalize_or_zero();
        if dir == Vec3::ZERO || dir.y.abs() < MIN_RAY_DIR_Y {
            return None;
        }

        let t = -start.y / dir.y;
        if t < 0.0 {
            return None;
        }
        self.terrain.cell_at_world(start + dir * t)
    }

    /// Left click: paint in terrain mode, place (or remove with the modifier)
    /// in building mode. Ignored while driving.
    pub fn handle_mouse_click(&mut self, screen_x: f32, screen_y: f32, width: f32, height: f32, remove: bool) {
        if self.mode == EditorMode::Game {
            return;
        }
        let Some((gx, gz)) = self.raycast_to_ground(screen_x, screen_y, width, height) else {
            return;
        };
        match self.mode {
            EditorMode::Terrain => {
                self.place_terrain(gx, gz, self.current_terrain);
            }
            EditorMode::Building => {
                let center = self.terrain.cell_center(gx, gz);
                if remove {
                    self.remove_object_near(center, self.config.remove_radius);
                } else {
                    self.place_object(self.current_object, center);
                }
            }
            EditorMode::Game => {}
        }
    }

    /// Right-drag, screen-space pixel deltas (y grows downward).
    pub fn handle_mouse_movement(&mut self, dx: f32, dy: f32, right_button: bool) {
        if !right_button {
            return;
        }
        match self.mode {
            EditorMode::Terrain => {
                // Grab-drag: the ground follows the cursor.
                let s = self.config.camera.ortho_pan_speed;
                self.ortho_camera.pan(-dx * s, -dy * s);
            }
            EditorMode::Building => self.orbit_camera.rotate(dx, -dy),
            EditorMode::Game => self.follow_camera.rotate(dx, -dy),
        }
    }

    /// Middle-drag pans the orbit target; building mode only.
    pub fn handle_middle_mouse_movement(&mut self, dx: f32, dy: f32) {
        if self.mode == EditorMode::Building {
            let s = self.config.camera.orbit_pan_speed;
            self.orbit_camera.pan_target(-dx * s, 0.0, dy * s);
        }
    }

    /// Positive delta zooms in.
    pub fn handle_mouse_scroll(&mut self, delta: f32) {
        match self.mode {
            EditorMode::Terrain => self.ortho_camera.zoom(delta),
            EditorMode::Building => self.orbit_camera.zoom(delta * self.config.camera.orbit_zoom_speed),
            EditorMode::Game => {}
        }
    }

    pub fn handle_game_input(&mut self, forward: f32, turn: f32) {
        if self.mode == EditorMode::Game {
            self.boat.process_input(forward, turn);
        }
    }

    pub fn update_aspect_ratio(&mut self, aspect: f32) {
        if !(aspect > 0.0 && aspect.is_finite()) {
            return;
        }
        self.ortho_camera.set_aspect_ratio(aspect);
        self.orbit_camera.set_aspect_ratio(aspect);
        self.follow_camera.set_aspect_ratio(aspect);
        self.transition_camera.set_aspect_ratio(aspect);
    }

    // ========================================================================
    // TOOLS
    // ========================================================================

    pub fn current_terrain_type(&self) -> TerrainCell {
        self.current_terrain
    }

    pub fn set_current_terrain_type(&mut self, cell: TerrainCell) {
        self.current_terrain = cell;
    }

    pub fn current_object_type(&self) -> ObjectType {
        self.current_object
    }

    pub fn set_current_object_type(&mut self, kind: ObjectType) {
        self.current_object = kind;
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn current_camera(&self) -> ActiveCamera<'_> {
        if self.transition.is_some() {
            return ActiveCamera::Transition(&self.transition_camera);
        }
        match self.mode {
            EditorMode::Terrain => ActiveCamera::Orthographic(&self.ortho_camera),
            EditorMode::Building => ActiveCamera::Orbit(&self.orbit_camera),
            EditorMode::Game => ActiveCamera::Follow(&self.follow_camera),
        }
    }

    pub fn terrain(&self) -> &TerrainGrid {
        &self.terrain
    }

    pub fn terrain_at(&self, grid_x: i32, grid_z: i32) -> TerrainCell {
        self.terrain.get(grid_x, grid_z)
    }

    pub fn is_water_at(&self, grid_x: i32, grid_z: i32) -> bool {
        self.terrain.is_water(grid_x, grid_z)
    }

    pub fn terrain_counts(&self) -> [usize; 4] {
        self.terrain.counts()
    }

    pub fn river_columns(&self) -> (i32, i32) {
        (self.river.start_column, self.river.end_column)
    }

    pub fn river_center_world_x(&self) -> f32 {
        self.river.center_world_x(self.terrain.size())
    }

    pub fn placed_objects(&self) -> &[PlacedObject] {
        self.objects.as_slice()
    }

    pub fn boat(&self) -> &Boat {
        &self.boat
    }

    pub fn boat_pose(&self) -> BoatPose {
        self.boat.pose()
    }

    pub fn has_boat_placed(&self) -> bool {
        self.boat_placed
    }

    /// Position and heading game mode will resume from.
    pub fn boat_placed_pose(&self) -> (Vec3, f32) {
        (self.boat_placed_position, self.boat_placed_rotation)
    }

    pub fn water_surface(&self) -> &dyn WaterSurface {
        self.water.as_ref()
    }

    pub fn sim_time(&self) -> f32 {
        self.sim_time
    }

    pub fn terrain_undo_depth(&self) -> usize {
        self.terrain_history.len()
    }

    pub fn object_undo_depth(&self) -> usize {
        self.object_history.len()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> SceneEditor {
        SceneEditor::new(EditorConfig::default(), 16.0 / 9.0)
    }

    /// A grass cell left of the river and a water cell in it.
    const GRASS: (i32, i32) = (5, 5);
    const WATER: (i32, i32) = (25, 5);

    fn center(editor: &SceneEditor, cell: (i32, i32)) -> Vec3 {
        editor.terrain().cell_center(cell.0, cell.1)
    }

    #[test]
    fn starts_in_terrain_mode_with_clean_history() {
        let ed = editor();
        assert_eq!(ed.current_mode(), EditorMode::Terrain);
        assert_eq!(ed.terrain_undo_depth(), 0);
        assert_eq!(ed.object_undo_depth(), 0);
        assert!(ed.has_boat_placed());
        assert!(matches!(ed.current_camera(), ActiveCamera::Orthographic(_)));
    }

    #[test]
    fn self_transition_is_a_no_op() {
        let mut ed = editor();
        ed.switch_mode(EditorMode::Building);
        ed.switch_mode(EditorMode::Building);
        assert!(!ed.is_transitioning());
    }

    #[test]
    fn only_building_and_game_blend() {
        let mut ed = editor();
        ed.switch_mode(EditorMode::Building);
        assert!(!ed.is_transitioning());
        ed.switch_mode(EditorMode::Game);
        assert!(ed.is_transitioning());
        assert!(matches!(ed.current_camera(), ActiveCamera::Transition(_)));
        for _ in 0..40 {
            ed.update(1.0 / 60.0);
        }
        assert!(!ed.is_transitioning());
        assert!(matches!(ed.current_camera(), ActiveCamera::Follow(_)));

        ed.switch_mode(EditorMode::Building);
        assert!(ed.is_transitioning());
        ed.switch_mode(EditorMode::Terrain);
        assert!(!ed.is_transitioning());
    }

    #[test]
    fn place_terrain_records_only_real_changes() {
        let mut ed = editor();
        assert!(!ed.place_terrain(GRASS.0, GRASS.1, TerrainCell::Grass));
        assert!(!ed.place_terrain(-1, 0, TerrainCell::Water));
        assert!(ed.place_terrain(GRASS.0, GRASS.1, TerrainCell::Stone));
        assert_eq!(ed.terrain_undo_depth(), 1);
    }

    #[test]
    fn undo_is_scoped_to_mode() {
        let mut ed = editor();
        ed.place_terrain(GRASS.0, GRASS.1, TerrainCell::Stone);
        ed.switch_mode(EditorMode::Building);
        ed.place_object(ObjectType::Tree, center(&ed, (3, 3)));

        ed.switch_mode(EditorMode::Game);
        assert!(!ed.undo_last_action());
        assert_eq!(ed.placed_objects().len(), 1);

        ed.switch_mode(EditorMode::Terrain);
        assert!(ed.undo_last_action());
        assert_eq!(ed.terrain_at(GRASS.0, GRASS.1), TerrainCell::Grass);
        assert_eq!(ed.placed_objects().len(), 1);
        assert!(!ed.undo_last_action());

        ed.switch_mode(EditorMode::Building);
        assert!(ed.undo_last_action());
        assert!(ed.placed_objects().is_empty());
    }

    #[test]
    fn painting_water_prunes_land_objects() {
        let mut ed = editor();
        let pos = center(&ed, GRASS);
        ed.place_object(ObjectType::House, pos);
        ed.place_object(ObjectType::Pier, pos);
        ed.place_terrain(GRASS.0, GRASS.1, TerrainCell::Water);
        let kinds: Vec<_> = ed.placed_objects().iter().map(|o| o.kind).collect();
        assert_eq!(kinds, vec![ObjectType::Pier]);
    }

    #[test]
    fn boat_marker_is_water_only_and_unique() {
        let mut ed = editor();
        assert!(!ed.place_object(ObjectType::Boat, center(&ed, GRASS)));

        let first = center(&ed, WATER);
        let second = center(&ed, (26, 10));
        assert!(ed.place_object(ObjectType::Boat, first));
        assert!(ed.place_object(ObjectType::Boat, second));
        let boats: Vec<_> = ed.placed_objects().iter().filter(|o| o.kind == ObjectType::Boat).collect();
        assert_eq!(boats.len(), 1);
        assert_eq!(boats[0].position, second);
        assert_eq!(ed.boat_placed_pose().0, second);

        ed.switch_mode(EditorMode::Building);
        ed.undo_last_action();
        ed.undo_last_action();
        assert_eq!(ed.placed_objects()[0].position, first);
        // The physics boat follows the restored marker.
        assert_eq!(ed.boat_placed_pose().0, first);
        assert_eq!((ed.boat().position().x, ed.boat().position().z), (first.x, first.z));

        ed.switch_mode(EditorMode::Game);
        assert_eq!(ed.boat_pose().position, first);
    }

    #[test]
    fn undoing_a_marker_removal_brings_the_boat_back() {
        let mut ed = editor();
        ed.switch_mode(EditorMode::Building);
        let marker = center(&ed, (22, 40));
        assert!(ed.place_object(ObjectType::Boat, marker));
        assert!(ed.remove_last_object());
        // No marker: the boat keeps its last pose.
        assert_eq!(ed.boat_placed_pose().0, marker);

        assert!(ed.place_object(ObjectType::Pier, center(&ed, WATER)));
        assert!(ed.undo_last_action());
        assert!(ed.undo_last_action());
        assert_eq!(ed.placed_objects(), &[PlacedObject::new(ObjectType::Boat, marker)]);
        assert_eq!(ed.boat_placed_pose().0, marker);

        // Undoing the original placement leaves no marker and keeps the pose.
        assert!(ed.undo_last_action());
        assert!(ed.placed_objects().is_empty());
        assert_eq!(ed.boat_placed_pose().0, marker);
    }

    #[test]
    fn destructive_removals_are_undoable() {
        let mut ed = editor();
        ed.switch_mode(EditorMode::Building);
        let a = PlacedObject::new(ObjectType::House, center(&ed, (2, 2)));
        let b = PlacedObject::new(ObjectType::Tree, center(&ed, (4, 2)));
        let c = PlacedObject::new(ObjectType::Wall, center(&ed, (6, 2)));
        for o in [a, b, c] {
            ed.place_object(o.kind, o.position);
        }

        assert!(ed.remove_last_object());
        assert_eq!(ed.placed_objects(), &[a, b]);
        ed.undo_last_action();
        assert_eq!(ed.placed_objects(), &[a, b, c]);

        ed.clear_all_objects();
        assert!(ed.placed_objects().is_empty());
        for _ in 0..3 {
            ed.undo_last_action();
        }
        assert_eq!(ed.placed_objects(), &[a, b, c]);

        assert!(ed.remove_object_near(b.position, 0.1));
        ed.undo_last_action();
        assert_eq!(ed.placed_objects(), &[a, c, b]);
    }

    #[test]
    fn clear_scene_resets_everything() {
        let mut ed = editor();
        ed.place_terrain(GRASS.0, GRASS.1, TerrainCell::Stone);
        ed.place_object(ObjectType::House, center(&ed, (3, 3)));
        ed.clear_scene();
        assert!(ed.placed_objects().is_empty());
        assert_eq!(ed.terrain_at(GRASS.0, GRASS.1), TerrainCell::Grass);
        assert_eq!(ed.terrain_undo_depth(), 0);
        assert_eq!(ed.object_undo_depth(), 0);
    }

    #[test]
    fn game_mode_obstacles_track_the_store() {
        let mut ed = editor();
        ed.place_object(ObjectType::House, center(&ed, (3, 3)));
        ed.place_object(ObjectType::Bridge, center(&ed, WATER));
        assert!(ed.boat().obstacles().is_empty());

        ed.switch_mode(EditorMode::Game);
        assert_eq!(ed.boat().obstacles().len(), 1);
        assert_eq!(ed.boat().obstacles()[0].radius, 1.5);

        ed.place_object(ObjectType::Lantern, center(&ed, (8, 8)));
        assert_eq!(ed.boat().obstacles().len(), 2);
        ed.clear_all_objects();
        assert!(ed.boat().obstacles().is_empty());
    }

    #[test]
    fn game_input_only_applies_in_game_mode() {
        let mut ed = editor();
        ed.handle_game_input(1.0, 0.0);
        for _ in 0..60 {
            ed.update(1.0 / 60.0);
        }
        assert_eq!(ed.boat().speed(), 0.0);

        ed.switch_mode(EditorMode::Game);
        ed.handle_game_input(1.0, 0.0);
        for _ in 0..60 {
            ed.update(1.0 / 60.0);
        }
        assert!(ed.boat().speed() > 0.0);
    }

    #[test]
    fn center_click_in_plan_view_hits_the_middle_cell() {
        let mut ed = editor();
        let hit = ed.raycast_to_ground(800.0, 450.0, 1600.0, 900.0).unwrap();
        // The view is centered on the corner shared by cells 24 and 25.
        assert!((24..=25).contains(&hit.0) && (24..=25).contains(&hit.1), "{hit:?}");

        ed.set_current_terrain_type(TerrainCell::Stone);
        // A quarter of the way across lands to the left of the river.
        ed.handle_mouse_click(400.0, 450.0, 1600.0, 900.0, false);
        let (gx, gz) = ed.raycast_to_ground(400.0, 450.0, 1600.0, 900.0).unwrap();
        assert!(gx < 19);
        assert_eq!(ed.terrain_at(gx, gz), TerrainCell::Stone);
    }

    #[test]
    fn raycast_rejects_degenerate_viewports() {
        let ed = editor();
        assert!(ed.raycast_to_ground(0.0, 0.0, 0.0, 900.0).is_none());
        assert!(ed.raycast_to_ground(0.0, 0.0, 1600.0, -1.0).is_none());
    }

    #[test]
    fn building_click_places_and_ctrl_click_removes() {
        let mut ed = editor();
        ed.switch_mode(EditorMode::Building);
        ed.set_current_object_type(ObjectType::Temple);
        let (gx, gz) = ed.raycast_to_ground(800.0, 450.0, 1600.0, 900.0).unwrap();
        let on_water = ed.is_water_at(gx, gz);

        ed.handle_mouse_click(800.0, 450.0, 1600.0, 900.0, false);
        // The orbit camera looks at the boat in the river: temples are land-only.
        assert_eq!(ed.placed_objects().is_empty(), on_water);

        ed.set_current_object_type(ObjectType::Pier);
        ed.handle_mouse_click(800.0, 450.0, 1600.0, 900.0, false);
        let before = ed.placed_objects().len();
        assert!(before >= 1);
        ed.handle_mouse_click(800.0, 450.0, 1600.0, 900.0, true);
        assert_eq!(ed.placed_objects().len(), before - 1);
    }

    #[test]
    fn aspect_ratio_keeps_plan_view_width() {
        let mut ed = editor();
        let ActiveCamera::Orthographic(cam) = ed.current_camera() else { panic!() };
        let width = cam.view_size().x;
        ed.update_aspect_ratio(2.0);
        let ActiveCamera::Orthographic(cam) = ed.current_camera() else { panic!() };
        assert_eq!(cam.view_size(), Vec2::new(width, width / 2.0));
    }
}
