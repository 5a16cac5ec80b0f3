// Line-oriented scene file.
//
//   # comment lines anywhere
//   [TERRAIN]
//   GRID_SIZE <N>
//   <N rows, row = z, N space-separated terrain codes, column = x>
//   [OBJECTS]
//   COUNT <M>
//   <M lines: "<object code> <x> <y> <z>">
//
// Codes are the enum ordinals from `TerrainCell::code` / `ObjectType::code`.
// Parsing builds a complete `SceneData` before anything is handed back, so a
// bad file never leaves the editor half-loaded.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::SplitWhitespace;

use glam::Vec3;
use log::debug;

use crate::engine::objects::{ObjectType, PlacedObject};
use crate::engine::terrain::{TerrainCell, TerrainGrid};
use crate::error::{EditorError, Result};

const TERRAIN_SECTION: &str = "[TERRAIN]";
const OBJECTS_SECTION: &str = "[OBJECTS]";
const GRID_SIZE_KEY: &str = "GRID_SIZE";
const COUNT_KEY: &str = "COUNT";

/// Fully parsed file contents.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneData {
    pub terrain: TerrainGrid,
    pub objects: Vec<PlacedObject>,
}

// ============================================================================
// WRITE
// ============================================================================

/// Borrowed scene rendered in the file layout through `Display`.
struct SceneText<'a> {
    terrain: &'a TerrainGrid,
    objects: &'a [PlacedObject],
}

impl fmt::Display for SceneText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.terrain.size();
        writeln!(f, "# Water Town scene")?;
        writeln!(f, "# terrain codes: 0 empty, 1 grass, 2 water, 3 stone")?;
        writeln!(f, "{TERRAIN_SECTION}")?;
        writeln!(f, "{GRID_SIZE_KEY} {size}")?;
        for z in 0..size {
            for x in 0..size {
                let sep = if x == 0 { "" } else { " " };
                write!(f, "{sep}{}", self.terrain.get(x, z).code())?;
            }
            writeln!(f)?;
        }
        writeln!(f, "{OBJECTS_SECTION}")?;
        writeln!(f, "{COUNT_KEY} {}", self.objects.len())?;
        for obj in self.objects {
            let p = obj.position;
            writeln!(f, "{} {} {} {}", obj.kind.code(), p.x, p.y, p.z)?;
        }
        Ok(())
    }
}

pub fn scene_to_string(terrain: &TerrainGrid, objects: &[PlacedObject]) -> String {
    SceneText { terrain, objects }.to_string()
}

pub fn save_to_path(path: &Path, terrain: &TerrainGrid, objects: &[PlacedObject]) -> Result<()> {
    let io_err = |source| EditorError::Io { path: path.to_path_buf(), source };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    fs::write(path, scene_to_string(terrain, objects)).map_err(io_err)?;
    debug!("wrote {} objects to {}", objects.len(), path.display());
    Ok(())
}

// ============================================================================
// READ
// ============================================================================

/// Non-empty, non-comment lines with 1-based line numbers.
struct Records<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
    last_line: usize,
}

impl<'a> Records<'a> {
    fn new(text: &'a str) -> Self {
        Self { inner: text.lines().enumerate(), last_line: 0 }
    }

    fn next_record(&mut self, what: &str) -> Result<(usize, &'a str)> {
        for (i, line) in self.inner.by_ref() {
            let line = line.trim();
            self.last_line = i + 1;
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            return Ok((i + 1, line));
        }
        Err(EditorError::malformed(self.last_line + 1, format!("unexpected end of file, expected {what}")))
    }

    fn expect_exact(&mut self, tag: &str) -> Result<()> {
        let (line, text) = self.next_record(tag)?;
        if text != tag {
            return Err(EditorError::malformed(line, format!("expected {tag}, found {text:?}")));
        }
        Ok(())
    }

    /// `KEY <integer>`
    fn expect_keyed<T: std::str::FromStr>(&mut self, key: &str) -> Result<(usize, T)> {
        let (line, text) = self.next_record(key)?;
        let mut parts = text.split_whitespace();
        if parts.next() != Some(key) {
            return Err(EditorError::malformed(line, format!("expected {key}, found {text:?}")));
        }
        let value = next_field(&mut parts, line, key)?;
        Ok((line, value))
    }
}

fn next_field<T: std::str::FromStr>(parts: &mut SplitWhitespace<'_>, line: usize, what: &str) -> Result<T> {
    let token = parts
        .next()
        .ok_or_else(|| EditorError::malformed(line, format!("missing {what}")))?;
    token
        .parse()
        .map_err(|_| EditorError::malformed(line, format!("bad {what} {token:?}")))
}

/// Parse a scene, requiring its grid to be `expected_size` cells square.
pub fn parse_scene(text: &str, expected_size: i32) -> Result<SceneData> {
    let mut records = Records::new(text);

    records.expect_exact(TERRAIN_SECTION)?;
    let (_, size): (usize, i32) = records.expect_keyed(GRID_SIZE_KEY)?;
    if size != expected_size {
        return Err(EditorError::GridSizeMismatch { expected: expected_size, found: size });
    }

    let mut terrain = TerrainGrid::new(size);
    for z in 0..size {
        let (line, row) = records.next_record("terrain row")?;
        let mut parts = row.split_whitespace();
        for x in 0..size {
            let code: u8 = next_field(&mut parts, line, "terrain code")?;
            let cell = TerrainCell::from_code(code)
                .ok_or_else(|| EditorError::malformed(line, format!("unknown terrain code {code}")))?;
            terrain.set(x, z, cell);
        }
        if parts.next().is_some() {
            return Err(EditorError::malformed(line, format!("row has more than {size} cells")));
        }
    }

    records.expect_exact(OBJECTS_SECTION)?;
    let (_, count): (usize, usize) = records.expect_keyed(COUNT_KEY)?;

    let mut objects = Vec::with_capacity(count.min(4096));
    for _ in 0..count {
        let (line, record) = records.next_record("object record")?;
        let mut parts = record.split_whitespace();
        let code: u8 = next_field(&mut parts, line, "object code")?;
        let kind = ObjectType::from_code(code)
            .ok_or_else(|| EditorError::malformed(line, format!("unknown object code {code}")))?;
        let x: f32 = next_field(&mut parts, line, "x")?;
        let y: f32 = next_field(&mut parts, line, "y")?;
        let z: f32 = next_field(&mut parts, line, "z")?;
        let position = Vec3::new(x, y, z);
        if !position.is_finite() {
            return Err(EditorError::malformed(line, "non-finite object position"));
        }
        objects.push(PlacedObject::new(kind, position));
    }

    Ok(SceneData { terrain, objects })
}

pub fn load_from_path(path: &Path, expected_size: i32) -> Result<SceneData> {
    let text = fs::read_to_string(path).map_err(|source| EditorError::Io { path: path.to_path_buf(), source })?;
    parse_scene(&text, expected_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_scene() -> (TerrainGrid, Vec<PlacedObject>) {
        let mut grid = TerrainGrid::new(3);
        grid.fill(TerrainCell::Grass);
        grid.set(2, 0, TerrainCell::Water);
        grid.set(0, 1, TerrainCell::Stone);
        let objects = vec![
            PlacedObject::new(ObjectType::Pier, Vec3::new(0.25, 0.0, -0.25)),
            PlacedObject::new(ObjectType::Temple, Vec3::new(-0.1, 0.3, 1.0 / 3.0)),
        ];
        (grid, objects)
    }

    #[test]
    fn layout_is_rows_by_z() {
        let (grid, objects) = small_scene();
        let text = scene_to_string(&grid, &objects);
        let lines: Vec<&str> = text.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(lines[0], "[TERRAIN]");
        assert_eq!(lines[1], "GRID_SIZE 3");
        assert_eq!(lines[2], "1 1 2");
        assert_eq!(lines[3], "3 1 1");
        assert_eq!(lines[5], "[OBJECTS]");
        assert_eq!(lines[6], "COUNT 2");
        assert_eq!(lines[7], "12 0.25 0 -0.25");
    }

    #[test]
    fn parse_reads_back_exact_floats() {
        let (grid, objects) = small_scene();
        let data = parse_scene(&scene_to_string(&grid, &objects), 3).unwrap();
        assert_eq!(data.terrain, grid);
        assert_eq!(data.objects, objects);
    }

    #[test]
    fn grid_size_mismatch_is_reported() {
        let (grid, objects) = small_scene();
        let err = parse_scene(&scene_to_string(&grid, &objects), 50).unwrap_err();
        assert!(matches!(err, EditorError::GridSizeMismatch { expected: 50, found: 3 }));
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let text = "# hi\n\n[TERRAIN]\n# mid\nGRID_SIZE 1\n2\n\n[OBJECTS]\nCOUNT 1\n# obj\n3 0 0.2 0\n";
        let data = parse_scene(text, 1).unwrap();
        assert_eq!(data.terrain.get(0, 0), TerrainCell::Water);
        assert_eq!(data.objects[0].kind, ObjectType::Boat);
    }

    #[test]
    fn malformed_records_name_the_line() {
        let cases = [
            ("[OBJECTS]\n", 1),
            ("[TERRAIN]\nGRID_SIZE 1\n9\n", 3),
            ("[TERRAIN]\nGRID_SIZE 1\n1 1\n", 3),
            ("[TERRAIN]\nGRID_SIZE 1\n1\n[OBJECTS]\nCOUNT 2\n0 1 2 3\n", 7),
            ("[TERRAIN]\nGRID_SIZE 1\n1\n[OBJECTS]\nCOUNT 1\n99 1 2 3\n", 6),
            ("[TERRAIN]\nGRID_SIZE 1\n1\n[OBJECTS]\nCOUNT 1\n0 1 nan 3\n", 6),
        ];
        for (text, expected_line) in cases {
            match parse_scene(text, 1) {
                Err(EditorError::Malformed { line, .. }) => assert_eq!(line, expected_line, "{text:?}"),
                other => panic!("{text:?}: {other:?}"),
            }
        }
    }
}
