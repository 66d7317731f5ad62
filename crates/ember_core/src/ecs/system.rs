//! # System Contract
//!
//! A system declares which components an entity must carry for the system
//! to care about it. The registry keeps, per system type, the list of live
//! entities that match; the system reads that list each tick.

use std::any::{Any, TypeId};

use super::entity::Entity;
use super::signature::Signature;

/// Capability every system exposes to the registry.
///
/// # Example
///
/// ```rust
/// use ember_core::{Component, Signature, System};
///
/// struct Transform;
/// impl Component for Transform { const ID: u8 = 0; }
/// struct RigidBody;
/// impl Component for RigidBody { const ID: u8 = 1; }
///
/// struct MovementSystem;
///
/// impl System for MovementSystem {
///     fn signature(&self) -> Signature {
///         Signature::new().with::<Transform>().with::<RigidBody>()
///     }
/// }
/// ```
pub trait System: 'static {
    /// Components an entity must carry to be matched by this system.
    ///
    /// Read once, when the system is added to the registry.
    fn signature(&self) -> Signature;

    /// Name used in logs and errors.
    fn name(&self) -> &'static str {
        short_type_name::<Self>()
    }
}

pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Registry-side bookkeeping for one system instance.
pub(crate) struct SystemRecord {
    pub(crate) type_id: TypeId,
    pub(crate) name: &'static str,
    pub(crate) signature: Signature,
    /// Matched entities in match order.
    pub(crate) entities: Vec<Entity>,
    /// `None` while the system is lent out by `run_system`.
    pub(crate) instance: Option<Box<dyn Any>>,
}

impl SystemRecord {
    pub(crate) fn new<S: System>(system: S) -> Self {
        Self {
            type_id: TypeId::of::<S>(),
            name: system.name(),
            signature: system.signature(),
            entities: Vec::new(),
            instance: Some(Box::new(system)),
        }
    }

    #[inline]
    pub(crate) fn add_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    #[inline]
    pub(crate) fn remove_entity(&mut self, entity: Entity) {
        self.entities.retain(|&other| other != entity);
    }

    #[inline]
    pub(crate) fn is_interested(&self, entity_signature: Signature) -> bool {
        entity_signature.contains(self.signature)
    }
}
