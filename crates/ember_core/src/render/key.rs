//! Render keys: one drawable scheduled for the current frame.

use std::cmp::Ordering;

use crate::ecs::Entity;

/// What kind of drawable a key refers to.
///
/// The declaration order is the tie-break order inside a layer and depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RenderableKind {
    /// Textured quad.
    Sprite,
    /// Filled rectangle.
    SquarePrimitive,
    /// Text label.
    Text,
}

/// Sort key for one drawable.
///
/// Ordered by layer, then depth, then kind, then entity. Depth compares with
/// [`f32::total_cmp`], so the order is total even for NaN. `-0.0` and `0.0`
/// are the same depth.
#[derive(Clone, Copy, Debug)]
pub struct RenderKey {
    /// Coarse back-to-front bucket (background, world, UI).
    pub layer: i32,
    /// Fine ordering inside the layer, usually the world Y position.
    pub depth: f32,
    /// Drawable kind.
    pub kind: RenderableKind,
    /// Owning entity.
    pub entity: Entity,
}

impl RenderKey {
    /// Creates a key.
    #[inline]
    #[must_use]
    pub const fn new(layer: i32, depth: f32, kind: RenderableKind, entity: Entity) -> Self {
        Self {
            layer,
            depth,
            kind,
            entity,
        }
    }
}

/// Folds `-0.0` into `0.0`; every other value is unchanged.
#[inline]
fn unsigned_zero(depth: f32) -> f32 {
    depth + 0.0
}

impl Ord for RenderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.layer
            .cmp(&other.layer)
            .then_with(|| unsigned_zero(self.depth).total_cmp(&unsigned_zero(other.depth)))
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.entity.cmp(&other.entity))
    }
}

impl PartialOrd for RenderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RenderKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RenderKey {}
