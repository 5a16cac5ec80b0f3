//! Scene File Tests
//!
//! Tests for:
//! - Save then load reproduces terrain and objects exactly
//! - Saving twice yields identical bytes
//! - A file for a different grid size is rejected without touching the scene
//! - Missing and malformed files surface as errors, never panics

use std::fs;

use glam::Vec3;

use water_town::config::EditorConfig;
use water_town::config::EditorSession;
use water_town::editor::{EditorMode, SceneEditor};
use water_town::engine::objects::ObjectType;
use water_town::engine::terrain::TerrainCell;
use water_town::EditorError;

fn editor() -> SceneEditor {
    SceneEditor::new(EditorConfig::default(), 4.0 / 3.0)
}

/// A scene with every kind of edit: painted cells, land and water objects,
/// and a moved boat marker.
fn decorated_editor() -> SceneEditor {
    let mut ed = editor();
    ed.place_terrain(2, 3, TerrainCell::Stone);
    ed.place_terrain(4, 4, TerrainCell::Water);
    ed.place_terrain(20, 7, TerrainCell::Empty);

    let house = ed.terrain().cell_center(8, 8);
    let pier = ed.terrain().cell_center(4, 4);
    let boat = ed.terrain().cell_center(27, 40);
    assert!(ed.place_object(ObjectType::HouseStyle3, house));
    assert!(ed.place_object(ObjectType::Pier, pier));
    assert!(ed.place_object(ObjectType::Boat, boat));
    assert!(ed.place_object(ObjectType::Lantern, house + Vec3::new(0.1, 0.0, -0.35)));
    ed
}

#[test]
fn save_then_load_restores_the_scene() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("town.scene");

    let original = decorated_editor();
    original.save_scene_to(&path).unwrap();

    let mut loaded = editor();
    loaded.load_scene_from(&path).unwrap();

    assert_eq!(loaded.terrain(), original.terrain());
    assert_eq!(loaded.placed_objects(), original.placed_objects());

    // Loading resets history and puts the boat on its marker.
    assert_eq!(loaded.terrain_undo_depth(), 0);
    assert_eq!(loaded.object_undo_depth(), 0);
    let marker = original
        .placed_objects()
        .iter()
        .find(|o| o.kind == ObjectType::Boat)
        .unwrap();
    assert_eq!(loaded.boat_placed_pose().0, marker.position);
}

#[test]
fn saving_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("a.scene");
    let second = dir.path().join("b.scene");

    let ed = decorated_editor();
    ed.save_scene_to(&first).unwrap();

    let mut reloaded = editor();
    reloaded.load_scene_from(&first).unwrap();
    reloaded.save_scene_to(&second).unwrap();

    assert_eq!(fs::read_to_string(&first).unwrap(), fs::read_to_string(&second).unwrap());
}

#[test]
fn session_writes_into_its_scene_dir() {
    let dir = tempfile::tempdir().unwrap();
    let session = EditorSession::new(dir.path().join("scenes"), "harbour");

    let ed = decorated_editor();
    let written = ed.save_scene(&session).unwrap();
    assert_eq!(written, dir.path().join("scenes").join("harbour.scene"));
    assert!(written.is_file());

    let mut other = editor();
    other.switch_mode(EditorMode::Building);
    other.load_scene(&session).unwrap();
    assert_eq!(other.placed_objects(), ed.placed_objects());
}

#[test]
fn grid_size_mismatch_leaves_scene_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small.scene");
    fs::write(&path, "[TERRAIN]\nGRID_SIZE 2\n1 1\n1 1\n[OBJECTS]\nCOUNT 0\n").unwrap();

    let mut ed = decorated_editor();
    let terrain = ed.terrain().clone();
    let objects = ed.placed_objects().to_vec();
    let undo = ed.terrain_undo_depth();

    let err = ed.load_scene_from(&path).unwrap_err();
    assert!(
        matches!(err, EditorError::GridSizeMismatch { expected: 50, found: 2 }),
        "unexpected error: {err}"
    );
    assert_eq!(ed.terrain(), &terrain);
    assert_eq!(ed.placed_objects(), objects.as_slice());
    assert_eq!(ed.terrain_undo_depth(), undo);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut ed = editor();
    let err = ed.load_scene_from(&dir.path().join("nope.scene")).unwrap_err();
    assert!(matches!(err, EditorError::Io { .. }), "unexpected error: {err}");
}

#[test]
fn truncated_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cut.scene");

    let ed = decorated_editor();
    ed.save_scene_to(&path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let cut: String = text.lines().take(20).collect::<Vec<_>>().join("\n");
    fs::write(&path, cut).unwrap();

    let mut target = editor();
    let err = target.load_scene_from(&path).unwrap_err();
    assert!(matches!(err, EditorError::Malformed { .. }), "unexpected error: {err}");
    assert!(target.placed_objects().is_empty());
}
