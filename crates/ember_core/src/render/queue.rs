//! Per-frame render queue.

use std::slice;

use super::key::{RenderKey, RenderableKind};
use crate::ecs::Entity;

/// Keys reserved up front; normal scenes never reallocate.
pub const DEFAULT_RENDER_QUEUE_CAPACITY: usize = 1024;

/// Collects render keys for one frame and sorts them into draw order.
///
/// The queue only schedules; it never draws. Producers call
/// [`add_key`](Self::add_key) after [`clear`](Self::clear), the driver calls
/// [`sort`](Self::sort), and the renderer walks [`iter`](Self::iter).
///
/// # Example
///
/// ```rust
/// use ember_core::{Entity, RenderQueue, RenderableKind};
///
/// let mut queue = RenderQueue::new();
/// queue.add_key(2, 10.0, RenderableKind::Text, Entity::new(0, 0));
/// queue.add_key(1, 50.0, RenderableKind::Sprite, Entity::new(1, 0));
/// queue.sort();
///
/// let order: Vec<u32> = queue.iter().map(|key| key.entity.id()).collect();
/// assert_eq!(order, vec![1, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct RenderQueue {
    keys: Vec<RenderKey>,
    sorted: bool,
}

impl RenderQueue {
    /// Creates a queue with [`DEFAULT_RENDER_QUEUE_CAPACITY`] reserved.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_RENDER_QUEUE_CAPACITY)
    }

    /// Creates a queue with `capacity` keys reserved.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            sorted: true,
        }
    }

    /// Appends a key for this frame.
    #[inline]
    pub fn add_key(&mut self, layer: i32, depth: f32, kind: RenderableKind, entity: Entity) {
        self.push(RenderKey::new(layer, depth, kind, entity));
    }

    /// Appends a prepared key.
    #[inline]
    pub fn push(&mut self, key: RenderKey) {
        self.keys.push(key);
        self.sorted = false;
    }

    /// Empties the queue, keeping its allocation.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.sorted = true;
    }

    /// Sorts by (layer, depth, kind, entity).
    ///
    /// The order is total, so the result does not depend on insertion order
    /// and is identical every frame for the same keys.
    pub fn sort(&mut self) {
        if !self.sorted {
            self.keys.sort();
            self.sorted = true;
        }
    }

    /// True if no key was added since the last sort or clear.
    #[inline]
    #[must_use]
    pub const fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Keys in their current order.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, RenderKey> {
        self.keys.iter()
    }

    /// Keys in their current order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[RenderKey] {
        &self.keys
    }

    /// Number of keys.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when the queue holds no keys.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Reserved key slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.keys.capacity()
    }
}

impl Default for RenderQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a RenderQueue {
    type Item = &'a RenderKey;
    type IntoIter = slice::Iter<'a, RenderKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(id: u32) -> Entity {
        Entity::new(id, 0)
    }

    #[test]
    fn test_sort_orders_by_layer_depth_kind_entity() {
        let mut queue = RenderQueue::new();
        queue.add_key(1, 20.0, RenderableKind::Sprite, e(4));
        queue.add_key(0, 99.0, RenderableKind::Sprite, e(3));
        queue.add_key(1, 10.0, RenderableKind::Text, e(2));
        queue.add_key(1, 10.0, RenderableKind::Sprite, e(1));
        queue.add_key(1, 10.0, RenderableKind::Sprite, e(0));
        queue.sort();

        let order: Vec<u32> = queue.iter().map(|key| key.entity.id()).collect();
        assert_eq!(order, vec![3, 0, 1, 2, 4]);
    }

    #[test]
    fn test_sort_is_repeatable_across_frames() {
        let inputs = [
            (2, 1.0, RenderableKind::Text, 0),
            (2, 1.0, RenderableKind::Text, 1),
            (0, 5.0, RenderableKind::SquarePrimitive, 2),
            (0, 5.0, RenderableKind::Sprite, 3),
        ];

        let mut queue = RenderQueue::new();
        let mut frames = Vec::new();
        for reversed in [false, true, false] {
            queue.clear();
            let mut batch = inputs.to_vec();
            if reversed {
                batch.reverse();
            }
            for (layer, depth, kind, id) in batch {
                queue.add_key(layer, depth, kind, e(id));
            }
            queue.sort();
            frames.push(queue.as_slice().to_vec());
        }

        assert_eq!(frames[0], frames[1]);
        assert_eq!(frames[1], frames[2]);
    }

    #[test]
    fn test_sorted_flag() {
        let mut queue = RenderQueue::with_capacity(4);
        assert!(queue.is_sorted());
        queue.add_key(0, 0.0, RenderableKind::Sprite, e(0));
        assert!(!queue.is_sorted());
        queue.sort();
        assert!(queue.is_sorted());
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.is_sorted());
    }

    #[test]
    fn test_default_capacity() {
        assert!(RenderQueue::new().capacity() >= DEFAULT_RENDER_QUEUE_CAPACITY);
    }
}
