use foundation::handles::Handle;
use foundation::ids::Id;

/// A single top-level drawable owned by the renderer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct EntityId(pub Handle);

impl EntityId {
    pub fn index(&self) -> u32 {
        self.0.index()
    }
}

/// A named sub-collection of drawables, removed as a unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CollectionId(pub Handle);

/// A loaded 3D tileset primitive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TilesetId(pub Handle);

/// A rasterized billboard image held by the renderer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ImageId(pub Id);

/// Everything a PoI can own on the renderer side.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DrawableHandle {
    Entity(EntityId),
    Collection(CollectionId),
}
