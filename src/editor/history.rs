// Undo records for the two editing categories.
//
// Terrain and objects each keep their own linear LIFO history. There is no
// redo; undoing pops the record for good.

use glam::Vec3;

use crate::engine::objects::{ObjectType, PlacedObject};
use crate::engine::terrain::TerrainCell;

/// One terrain cell change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainAction {
    pub grid_x: i32,
    pub grid_z: i32,
    pub old: TerrainCell,
    pub new: TerrainCell,
}

/// One object-store change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectAction {
    pub kind: ObjectType,
    pub position: Vec3,
    /// `true`: the object was added, undo deletes it.
    /// `false`: the object was removed, undo re-appends it.
    pub is_add: bool,
}

impl ObjectAction {
    pub fn added(object: PlacedObject) -> Self {
        Self { kind: object.kind, position: object.position, is_add: true }
    }

    pub fn removed(object: PlacedObject) -> Self {
        Self { kind: object.kind, position: object.position, is_add: false }
    }

    pub fn object(&self) -> PlacedObject {
        PlacedObject::new(self.kind, self.position)
    }
}

/// Plain LIFO stack of undo records.
#[derive(Debug, Clone)]
pub struct History<T> {
    actions: Vec<T>,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self { actions: Vec::new() }
    }
}

impl<T> History<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: T) {
        self.actions.push(action);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.actions.pop()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}

impl<T> Extend<T> for History<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.actions.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_reverse_push_order() {
        let mut history = History::new();
        history.push(1);
        history.extend([2, 3]);
        assert_eq!(history.pop(), Some(3));
        assert_eq!(history.pop(), Some(2));
        assert_eq!(history.len(), 1);
        history.clear();
        assert_eq!(history.pop(), None);
    }

    #[test]
    fn object_action_carries_the_instance() {
        let obj = PlacedObject::new(ObjectType::Pier, Vec3::new(1.0, 0.0, 2.0));
        let action = ObjectAction::removed(obj);
        assert!(!action.is_add);
        assert_eq!(action.object(), obj);
    }
}
