// Placed objects: the catalogue of decoration/building kinds and the
// insertion-ordered store the editor mutates.

use glam::Vec3;

/// Kind of a placed object.
///
/// The integer codes are written to scene files; new kinds go at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    House,
    Bridge,
    Tree,
    /// Marker for the player boat. At most one exists.
    Boat,
    HouseStyle1,
    HouseStyle2,
    HouseStyle3,
    HouseStyle4,
    HouseStyle5,
    LongHouse,
    ArchBridge,
    WaterPavilion,
    Pier,
    FishingBoat,
    Bamboo,
    LotusPond,
    Wall,
    Pavilion,
    Paifang,
    Temple,
    Lantern,
    StoneLion,
}

impl ObjectType {
    pub const ALL: [ObjectType; 22] = [
        ObjectType::House,
        ObjectType::Bridge,
        ObjectType::Tree,
        ObjectType::Boat,
        ObjectType::HouseStyle1,
        ObjectType::HouseStyle2,
        ObjectType::HouseStyle3,
        ObjectType::HouseStyle4,
        ObjectType::HouseStyle5,
        ObjectType::LongHouse,
        ObjectType::ArchBridge,
        ObjectType::WaterPavilion,
        ObjectType::Pier,
        ObjectType::FishingBoat,
        ObjectType::Bamboo,
        ObjectType::LotusPond,
        ObjectType::Wall,
        ObjectType::Pavilion,
        ObjectType::Paifang,
        ObjectType::Temple,
        ObjectType::Lantern,
        ObjectType::StoneLion,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Structures allowed to stand on water cells.
    pub fn is_water_compatible(self) -> bool {
        matches!(
            self,
            ObjectType::Bridge
                | ObjectType::ArchBridge
                | ObjectType::WaterPavilion
                | ObjectType::Pier
                | ObjectType::LotusPond
                | ObjectType::FishingBoat
                | ObjectType::Boat
        )
    }

    /// The player boat can only be dropped onto water.
    pub fn requires_water(self) -> bool {
        self == ObjectType::Boat
    }

    /// Collision radius of the obstacle this object contributes in game mode.
    /// `None` = the boat passes through (its own marker, bridges it sails under).
    pub fn obstacle_radius(self) -> Option<f32> {
        match self {
            ObjectType::Boat | ObjectType::Bridge | ObjectType::ArchBridge => None,
            ObjectType::House
            | ObjectType::HouseStyle1
            | ObjectType::HouseStyle2
            | ObjectType::HouseStyle3
            | ObjectType::HouseStyle4
            | ObjectType::HouseStyle5
            | ObjectType::LongHouse
            | ObjectType::Temple
            | ObjectType::Pavilion
            | ObjectType::WaterPavilion => Some(1.5),
            ObjectType::Tree | ObjectType::Bamboo | ObjectType::Lantern | ObjectType::StoneLion => {
                Some(0.6)
            }
            _ => Some(1.0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ObjectType::House => "Basic House",
            ObjectType::Bridge => "Stone Bridge",
            ObjectType::Tree => "Tree",
            ObjectType::Boat => "Player Boat",
            ObjectType::HouseStyle1 => "Jiangnan House",
            ObjectType::HouseStyle2 => "Garden Villa",
            ObjectType::HouseStyle3 => "Ancestral Hall",
            ObjectType::HouseStyle4 => "Modern Villa",
            ObjectType::HouseStyle5 => "Farm House",
            ObjectType::LongHouse => "Long House",
            ObjectType::ArchBridge => "Arch Bridge",
            ObjectType::WaterPavilion => "Water Pavilion",
            ObjectType::Pier => "Wooden Pier",
            ObjectType::FishingBoat => "Fishing Boat",
            ObjectType::Bamboo => "Bamboo",
            ObjectType::LotusPond => "Lotus Pond",
            ObjectType::Wall => "Wall",
            ObjectType::Pavilion => "Pavilion",
            ObjectType::Paifang => "Paifang (Gate)",
            ObjectType::Temple => "Temple",
            ObjectType::Lantern => "Lantern",
            ObjectType::StoneLion => "Stone Lion",
        }
    }
}

/// One placed object: a kind and a world position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedObject {
    pub kind: ObjectType,
    pub position: Vec3,
}

impl PlacedObject {
    pub fn new(kind: ObjectType, position: Vec3) -> Self {
        Self { kind, position }
    }

    /// Distance on the XZ plane; height is ignored for picking.
    pub fn planar_distance(&self, pos: Vec3) -> f32 {
        let dx = self.position.x - pos.x;
        let dz = self.position.z - pos.z;
        (dx * dx + dz * dz).sqrt()
    }
}

/// Insertion-ordered list of placed objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectStore {
    objects: Vec<PlacedObject>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, object: PlacedObject) {
        self.objects.push(object);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn as_slice(&self) -> &[PlacedObject] {
        &self.objects
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlacedObject> {
        self.objects.iter()
    }

    pub fn remove_at(&mut self, index: usize) -> Option<PlacedObject> {
        (index < self.objects.len()).then(|| self.objects.remove(index))
    }

    pub fn remove_last(&mut self) -> Option<PlacedObject> {
        self.objects.pop()
    }

    /// Remove the most recently placed object within `radius` (XZ distance)
    /// of `pos`. Scans from the tail so the latest placement wins ties.
    pub fn remove_near(&mut self, pos: Vec3, radius: f32) -> Option<PlacedObject> {
        let index = self
            .objects
            .iter()
            .rposition(|obj| obj.planar_distance(pos) < radius)?;
        Some(self.objects.remove(index))
    }

    /// Remove the most recent object of `kind` within `epsilon` of `pos`
    /// (full 3D distance). Used to reverse an add.
    pub fn remove_matching(&mut self, kind: ObjectType, pos: Vec3, epsilon: f32) -> Option<PlacedObject> {
        let index = self
            .objects
            .iter()
            .rposition(|obj| obj.kind == kind && obj.position.distance(pos) < epsilon)?;
        Some(self.objects.remove(index))
    }

    pub fn position_of_kind(&self, kind: ObjectType) -> Option<usize> {
        self.objects.iter().rposition(|obj| obj.kind == kind)
    }

    /// Drop every object for which `keep` returns false; returns the removed ones.
    pub fn retain(&mut self, mut keep: impl FnMut(&PlacedObject) -> bool) -> Vec<PlacedObject> {
        let mut removed = Vec::new();
        self.objects.retain(|obj| {
            let k = keep(obj);
            if !k {
                removed.push(*obj);
            }
            k
        });
        removed
    }

    pub fn clear(&mut self) -> Vec<PlacedObject> {
        std::mem::take(&mut self.objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_of(items: &[(ObjectType, f32, f32)]) -> ObjectStore {
        let mut store = ObjectStore::new();
        for &(kind, x, z) in items {
            store.push(PlacedObject::new(kind, Vec3::new(x, 0.0, z)));
        }
        store
    }

    #[test]
    fn remove_near_prefers_latest_on_ties() {
        let mut store = store_of(&[
            (ObjectType::House, 1.0, 0.0),
            (ObjectType::Tree, 1.0, 0.0),
            (ObjectType::Wall, 5.0, 5.0),
        ]);
        let removed = store.remove_near(Vec3::new(1.0, 0.0, 0.0), 0.5).unwrap();
        assert_eq!(removed.kind, ObjectType::Tree);
        assert_eq!(store.len(), 2);
        assert_eq!(store.as_slice()[0].kind, ObjectType::House);
    }

    #[test]
    fn remove_near_ignores_height_and_misses_outside_radius() {
        let mut store = store_of(&[(ObjectType::House, 0.0, 0.0)]);
        assert!(store.remove_near(Vec3::new(2.0, 0.0, 0.0), 1.0).is_none());
        assert!(store.remove_near(Vec3::new(0.5, 9.0, 0.0), 1.0).is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn remove_matching_needs_same_kind() {
        let mut store = store_of(&[(ObjectType::House, 0.0, 0.0)]);
        assert!(store.remove_matching(ObjectType::Tree, Vec3::ZERO, 0.01).is_none());
        assert!(store.remove_matching(ObjectType::House, Vec3::new(0.005, 0.0, 0.0), 0.01).is_some());
    }

    #[test]
    fn retain_reports_removed_in_order() {
        let mut store = store_of(&[
            (ObjectType::House, 0.0, 0.0),
            (ObjectType::Pier, 1.0, 0.0),
            (ObjectType::Tree, 2.0, 0.0),
        ]);
        let removed = store.retain(|o| o.kind.is_water_compatible());
        assert_eq!(removed.iter().map(|o| o.kind).collect::<Vec<_>>(), vec![ObjectType::House, ObjectType::Tree]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn codes_cover_catalogue() {
        for (i, kind) in ObjectType::ALL.iter().enumerate() {
            assert_eq!(kind.code() as usize, i);
            assert_eq!(ObjectType::from_code(i as u8), Some(*kind));
        }
        assert_eq!(ObjectType::from_code(ObjectType::ALL.len() as u8), None);
    }

    #[test]
    fn player_boat_never_an_obstacle() {
        assert!(ObjectType::Boat.is_water_compatible());
        assert_eq!(ObjectType::Boat.obstacle_radius(), None);
        assert_eq!(ObjectType::House.obstacle_radius(), Some(1.5));
    }
}
