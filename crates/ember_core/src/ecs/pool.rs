//! # Component Pools
//!
//! Packed storage for a single component type.
//!
//! The pool uses a sparse-set strategy:
//! - Values live in one dense, hole-free array (cache-friendly iteration)
//! - A sparse table maps entity id to dense index
//! - A parallel dense table maps dense index back to entity id
//!
//! Removal swaps the removed slot with the last one and truncates, so insert
//! and remove are O(1). Both maps are index-based, so growing the dense
//! array never invalidates them.

use std::any::Any;

use super::component::{component_name, Component};
use crate::error::{EcsError, EcsResult};

/// Sparse slot value meaning "no component for this id".
const VACANT: u32 = u32::MAX;

/// Dense length is bounded by the number of distinct `u32` ids.
#[allow(clippy::cast_possible_truncation)]
#[inline]
const fn dense_slot(index: usize) -> u32 {
    index as u32
}

/// Default number of pre-reserved dense slots.
pub const DEFAULT_POOL_CAPACITY: usize = 100;

/// Packed storage for one component type.
///
/// # Example
///
/// ```rust
/// use ember_core::{Component, ComponentPool};
///
/// #[derive(Debug, PartialEq)]
/// struct Health(i32);
/// impl Component for Health { const ID: u8 = 4; }
///
/// let mut pool = ComponentPool::new();
/// pool.set(3, Health(100));
/// pool.get_mut(3).unwrap().0 -= 25;
/// assert_eq!(pool.get(3).unwrap(), &Health(75));
/// ```
pub struct ComponentPool<C: Component> {
    /// Component values, no holes.
    dense: Vec<C>,
    /// Entity id owning each dense slot.
    dense_ids: Vec<u32>,
    /// Entity id to dense index, `VACANT` when absent.
    sparse: Vec<u32>,
}

impl<C: Component> ComponentPool<C> {
    /// Creates a pool with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }

    /// Creates a pool with room for `capacity` components before the dense
    /// array has to grow.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dense: Vec::with_capacity(capacity),
            dense_ids: Vec::with_capacity(capacity),
            sparse: vec![VACANT; capacity],
        }
    }

    /// Number of stored components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// True when no component is stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Allocated dense slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.dense.capacity()
    }

    /// Grows the sparse table so ids up to `max_id` resolve without
    /// reallocating on insert.
    pub fn reserve_ids(&mut self, max_id: u32) {
        let needed = max_id as usize + 1;
        if needed > self.sparse.len() {
            let grown = needed.max(self.sparse.len() * 2);
            self.sparse.resize(grown, VACANT);
        }
    }

    #[inline]
    fn dense_index(&self, id: u32) -> Option<usize> {
        match self.sparse.get(id as usize) {
            Some(&slot) if slot != VACANT => Some(slot as usize),
            _ => None,
        }
    }

    /// Checks whether `id` has a component in this pool.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.dense_index(id).is_some()
    }

    /// Inserts the component for `id`, overwriting any previous value.
    ///
    /// Returns the previous value if there was one.
    pub fn set(&mut self, id: u32, value: C) -> Option<C> {
        if let Some(index) = self.dense_index(id) {
            return Some(std::mem::replace(&mut self.dense[index], value));
        }

        self.reserve_ids(id);
        self.sparse[id as usize] = dense_slot(self.dense.len());
        self.dense.push(value);
        self.dense_ids.push(id);
        None
    }

    /// Gets the component for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentNotFound`] if `id` has no component here.
    #[inline]
    pub fn get(&self, id: u32) -> EcsResult<&C> {
        match self.dense_index(id) {
            Some(index) => Ok(&self.dense[index]),
            None => Err(Self::missing(id)),
        }
    }

    /// Gets the component for `id` mutably.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentNotFound`] if `id` has no component here.
    #[inline]
    pub fn get_mut(&mut self, id: u32) -> EcsResult<&mut C> {
        match self.dense_index(id) {
            Some(index) => Ok(&mut self.dense[index]),
            None => Err(Self::missing(id)),
        }
    }

    /// Removes the component for `id`, returning it.
    ///
    /// No-op if `id` has no component. Otherwise the last dense slot is moved
    /// into the hole and its sparse entry patched.
    pub fn remove(&mut self, id: u32) -> Option<C> {
        let index = self.dense_index(id)?;
        let last = self.dense.len() - 1;

        let value = self.dense.swap_remove(index);
        self.dense_ids.swap_remove(index);

        if index != last {
            let moved = self.dense_ids[index] as usize;
            self.sparse[moved] = dense_slot(index);
        }
        self.sparse[id as usize] = VACANT;

        Some(value)
    }

    /// Drops every component, keeping allocations.
    pub fn clear(&mut self) {
        for &id in &self.dense_ids {
            self.sparse[id as usize] = VACANT;
        }
        self.dense.clear();
        self.dense_ids.clear();
    }

    /// Dense component slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[C] {
        &self.dense
    }

    /// Iterates over `(entity id, component)` in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &C)> {
        self.dense_ids.iter().copied().zip(self.dense.iter())
    }

    /// Iterates mutably over `(entity id, component)` in dense order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut C)> {
        self.dense_ids.iter().copied().zip(self.dense.iter_mut())
    }

    fn missing(id: u32) -> EcsError {
        EcsError::ComponentNotFound {
            component: component_name::<C>(),
            entity: id,
        }
    }
}

impl<C: Component> Default for ComponentPool<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a pool.
///
/// The registry keeps one of these per component id so it can purge a
/// destroyed entity from every pool without knowing the component types.
pub trait AnyPool: Any {
    /// Removes the component for `id`, if any. Returns whether one existed.
    fn remove_entity(&mut self, id: u32) -> bool;

    /// Checks whether `id` has a component in this pool.
    fn contains_entity(&self, id: u32) -> bool;

    /// Number of stored components.
    fn len(&self) -> usize;

    /// True when the pool is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every component.
    fn clear(&mut self);

    /// Component type name.
    fn component_name(&self) -> &'static str;

    /// Downcasting support.
    fn as_any(&self) -> &dyn Any;

    /// Downcasting support.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> AnyPool for ComponentPool<C> {
    fn remove_entity(&mut self, id: u32) -> bool {
        self.remove(id).is_some()
    }

    fn contains_entity(&self, id: u32) -> bool {
        self.contains(id)
    }

    fn len(&self) -> usize {
        self.dense.len()
    }

    fn clear(&mut self) {
        ComponentPool::clear(self);
    }

    fn component_name(&self) -> &'static str {
        component_name::<C>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
