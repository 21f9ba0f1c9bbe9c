use bevy_ecs::prelude::Component;

/// Non-unique category label used for grouping, grid queries and inventory
/// sharing.
#[derive(Component, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub String);

impl Tag {
    /// Reserved tag: blocks paths and visible moves.
    pub const WALL: &'static str = "wall";
    /// Reserved tag: stops falling sprites.
    pub const OBSTACLE: &'static str = "obstacle";

    pub fn new(tag: impl Into<String>) -> Self {
        Tag(tag.into())
    }

    pub fn wall() -> Self {
        Tag::new(Self::WALL)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Optional display name of an entity.
#[derive(Component, Clone, Debug, PartialEq, Eq)]
pub struct SpriteName(pub String);
