//! # Registry
//!
//! The central container for entities, component pools, systems and entity
//! metadata (tags and groups).
//!
//! ## Deferred structure, immediate data
//!
//! ```text
//! create_entity / destroy_entity ──> staged (to_add / to_remove)
//!                                        │
//!                  update() ─────────────┘  commit: systems, pools,
//!                                           tags, groups, free ids
//!
//! add_component / remove_component ──> applied now; a live entity joins or
//!                                      leaves system lists immediately
//! ```
//!
//! Systems iterate their entity lists during the update pass while asking for
//! entities to be created or destroyed. Only `update()` restructures those
//! lists for lifecycle changes, so the set a system walks stays stable for
//! the whole pass.

use std::any::TypeId;
use std::collections::BTreeSet;

use super::component::{checked_id, component_name, Component};
use super::entity::Entity;
use super::pool::{AnyPool, ComponentPool};
use super::signature::{Signature, MAX_COMPONENTS};
use super::system::{short_type_name, System, SystemRecord};
use super::tags::{GroupIndex, TagIndex};
use crate::config::RegistryConfig;
use crate::error::{EcsError, EcsResult};

/// Lifecycle stage of an entity slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum SlotState {
    /// Id is in the free list (or never issued).
    #[default]
    Free,
    /// Created, waiting for the next commit.
    Pending,
    /// Committed and visible to systems.
    Live,
}

/// Per-id bookkeeping.
#[derive(Clone, Copy, Debug, Default)]
struct EntitySlot {
    generation: u32,
    signature: Signature,
    state: SlotState,
}

/// Summary of one commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommitStats {
    /// Entities that became visible to systems.
    pub added: usize,
    /// Entities that were destroyed and had their ids freed.
    pub removed: usize,
}

type PoolSlot = Option<Box<dyn AnyPool>>;

/// Owns every entity, component pool and system.
///
/// # Example
///
/// ```rust
/// use ember_core::{Component, Registry, Signature, System};
///
/// #[derive(Debug, PartialEq)]
/// struct Health(i32);
/// impl Component for Health { const ID: u8 = 4; }
///
/// struct HealthSystem;
/// impl System for HealthSystem {
///     fn signature(&self) -> Signature {
///         Signature::new().with::<Health>()
///     }
/// }
///
/// let mut registry = Registry::new();
/// registry.add_system(HealthSystem);
///
/// let tank = registry.create_entity();
/// registry.add_component(tank, Health(100)).unwrap();
/// assert!(registry.system_entities::<HealthSystem>().unwrap().is_empty());
///
/// registry.update();
/// assert_eq!(registry.system_entities::<HealthSystem>().unwrap(), &[tank]);
/// ```
pub struct Registry {
    config: RegistryConfig,
    /// Indexed by entity id.
    slots: Vec<EntitySlot>,
    /// Ids returned by destroyed entities, reused last-in first-out.
    free_ids: Vec<u32>,
    live_count: usize,

    to_add: BTreeSet<Entity>,
    to_remove: BTreeSet<Entity>,

    /// Indexed by component id.
    pools: Vec<PoolSlot>,
    /// In registration order.
    systems: Vec<SystemRecord>,

    tags: TagIndex,
    groups: GroupIndex,
}

impl Registry {
    /// Creates an empty registry with default sizes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Creates an empty registry with the given sizes.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        let mut pools = Vec::with_capacity(MAX_COMPONENTS);
        pools.resize_with(MAX_COMPONENTS, || None);

        Self {
            config,
            slots: Vec::with_capacity(config.initial_entity_capacity),
            free_ids: Vec::new(),
            live_count: 0,
            to_add: BTreeSet::new(),
            to_remove: BTreeSet::new(),
            pools,
            systems: Vec::new(),
            tags: TagIndex::default(),
            groups: GroupIndex::default(),
        }
    }

    /// The configuration this registry was built with.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Allocates an entity and stages it for the next commit.
    ///
    /// Components can be attached right away; systems see the entity only
    /// after [`update`](Self::update).
    pub fn create_entity(&mut self) -> Entity {
        let id = if let Some(id) = self.free_ids.pop() {
            id
        } else {
            let id = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            self.slots.push(EntitySlot::default());
            id
        };

        let slot = &mut self.slots[id as usize];
        slot.state = SlotState::Pending;
        slot.signature.reset();

        let entity = Entity::new(id, slot.generation);
        self.to_add.insert(entity);

        tracing::debug!(entity = id, generation = slot.generation, "created entity");
        entity
    }

    /// Stages `entity` for destruction at the next commit.
    ///
    /// The entity stays fully usable until then; systems keep iterating it
    /// for the rest of the frame. Queuing the same entity twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] if the handle is already dead.
    pub fn destroy_entity(&mut self, entity: Entity) -> EcsResult<()> {
        self.slot(entity)?;
        if self.to_remove.insert(entity) {
            tracing::debug!(entity = entity.id(), "queued entity for destruction");
        }
        Ok(())
    }

    /// Commits staged creations and destructions.
    ///
    /// This is the only place where systems' entity lists change for
    /// lifecycle reasons. Creations are applied before destructions, so an
    /// entity created and destroyed in the same frame is simply gone.
    pub fn update(&mut self) -> CommitStats {
        let mut stats = CommitStats::default();

        for entity in std::mem::take(&mut self.to_add) {
            let slot = &mut self.slots[entity.index()];
            if slot.generation != entity.generation() || slot.state != SlotState::Pending {
                continue;
            }
            slot.state = SlotState::Live;
            self.live_count += 1;
            stats.added += 1;

            let signature = slot.signature;
            for record in &mut self.systems {
                if record.is_interested(signature) {
                    record.add_entity(entity);
                }
            }
        }

        for entity in std::mem::take(&mut self.to_remove) {
            let slot = &mut self.slots[entity.index()];
            if slot.generation != entity.generation() || slot.state == SlotState::Free {
                continue;
            }
            if slot.state == SlotState::Live {
                self.live_count -= 1;
            }

            let signature = slot.signature;
            slot.signature.reset();
            slot.generation = slot.generation.wrapping_add(1);
            slot.state = SlotState::Free;

            for record in &mut self.systems {
                if record.is_interested(signature) {
                    record.remove_entity(entity);
                }
            }
            for pool in self.pools.iter_mut().flatten() {
                pool.remove_entity(entity.id());
            }
            self.tags.remove(entity);
            self.groups.remove_all(entity);
            self.free_ids.push(entity.id());
            stats.removed += 1;

            tracing::debug!(entity = entity.id(), "destroyed entity");
        }

        if stats != CommitStats::default() {
            tracing::trace!(
                added = stats.added,
                removed = stats.removed,
                live = self.live_count,
                tags = self.tags.len(),
                groups = self.groups.group_count(),
                "registry commit"
            );
        }
        stats
    }

    /// True while the handle refers to a created, not yet destroyed entity
    /// (pending or committed).
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.slot(entity).is_ok()
    }

    /// True once the entity has been committed and is visible to systems.
    #[must_use]
    pub fn is_committed(&self, entity: Entity) -> bool {
        self.slot(entity)
            .is_ok_and(|slot| slot.state == SlotState::Live)
    }

    /// True if the entity is queued for destruction at the next commit.
    #[must_use]
    pub fn is_pending_destroy(&self, entity: Entity) -> bool {
        self.to_remove.contains(&entity)
    }

    /// Number of committed entities.
    #[inline]
    #[must_use]
    pub const fn entity_count(&self) -> usize {
        self.live_count
    }

    /// Staged creations and destructions waiting for the next commit.
    #[must_use]
    pub fn pending_counts(&self) -> (usize, usize) {
        (self.to_add.len(), self.to_remove.len())
    }

    /// Committed entities in ascending id order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slots.iter().enumerate().filter_map(|(id, slot)| {
            (slot.state == SlotState::Live)
                .then(|| Entity::new(u32::try_from(id).unwrap_or(u32::MAX), slot.generation))
        })
    }

    /// Component signature of `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] if the handle is dead.
    pub fn signature(&self, entity: Entity) -> EcsResult<Signature> {
        self.slot(entity).map(|slot| slot.signature)
    }

    fn slot(&self, entity: Entity) -> EcsResult<&EntitySlot> {
        match self.slots.get(entity.index()) {
            Some(slot)
                if slot.state != SlotState::Free && slot.generation == entity.generation() =>
            {
                Ok(slot)
            }
            _ => Err(EcsError::StaleEntity(entity)),
        }
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches `value` to `entity`, replacing any existing `C`.
    ///
    /// The pool for `C` is created on first use. If the entity is committed,
    /// system membership is re-evaluated immediately.
    ///
    /// # Errors
    ///
    /// - [`EcsError::StaleEntity`] if the handle is dead
    /// - [`EcsError::ComponentIdOutOfRange`] / [`EcsError::ComponentIdConflict`]
    ///   if `C` declares a bad id
    pub fn add_component<C: Component>(&mut self, entity: Entity, value: C) -> EcsResult<()> {
        let bit = checked_id::<C>()?;
        self.slot(entity)?;

        let capacity = self.config.initial_pool_capacity;
        let pool = self.pools[bit]
            .get_or_insert_with(|| Box::new(ComponentPool::<C>::with_capacity(capacity)));
        downcast_pool_mut::<C>(pool.as_mut())?.set(entity.id(), value);

        let slot = &mut self.slots[entity.index()];
        let before = slot.signature;
        slot.signature.set(bit);
        let after = slot.signature;
        let live = slot.state == SlotState::Live;

        if live && before != after {
            self.refresh_membership(entity, before, after);
        }

        tracing::trace!(
            entity = entity.id(),
            component = component_name::<C>(),
            "added component"
        );
        Ok(())
    }

    /// Detaches `C` from `entity`, returning the value if it was present.
    ///
    /// A committed entity leaves every system that required `C` right away.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] if the handle is dead.
    pub fn remove_component<C: Component>(&mut self, entity: Entity) -> EcsResult<Option<C>> {
        let bit = checked_id::<C>()?;
        self.slot(entity)?;

        let removed = match self.pools[bit].as_mut() {
            Some(pool) => downcast_pool_mut::<C>(pool.as_mut())?.remove(entity.id()),
            None => None,
        };

        let slot = &mut self.slots[entity.index()];
        let before = slot.signature;
        slot.signature.clear(bit);
        let after = slot.signature;
        let live = slot.state == SlotState::Live;

        if live && before != after {
            self.refresh_membership(entity, before, after);
        }

        if removed.is_some() {
            tracing::trace!(
                entity = entity.id(),
                component = component_name::<C>(),
                "removed component"
            );
        }
        Ok(removed)
    }

    /// Checks whether `entity` carries `C`. Dead handles carry nothing.
    #[must_use]
    pub fn has_component<C: Component>(&self, entity: Entity) -> bool {
        self.slot(entity)
            .is_ok_and(|slot| slot.signature.test(usize::from(C::ID)))
    }

    /// Borrows `entity`'s `C`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::ComponentNotFound`] if the entity lacks `C`
    /// - [`EcsError::StaleEntity`] if the handle is dead
    pub fn get_component<C: Component>(&self, entity: Entity) -> EcsResult<&C> {
        let bit = checked_id::<C>()?;
        let slot = self.slot(entity)?;
        if !slot.signature.test(bit) {
            return Err(missing::<C>(entity));
        }
        match self.pools[bit].as_deref() {
            Some(pool) => downcast_pool::<C>(pool)?.get(entity.id()),
            None => Err(missing::<C>(entity)),
        }
    }

    /// Mutably borrows `entity`'s `C`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::ComponentNotFound`] if the entity lacks `C`
    /// - [`EcsError::StaleEntity`] if the handle is dead
    pub fn get_component_mut<C: Component>(&mut self, entity: Entity) -> EcsResult<&mut C> {
        let bit = checked_id::<C>()?;
        let slot = self.slot(entity)?;
        if !slot.signature.test(bit) {
            return Err(missing::<C>(entity));
        }
        match self.pools[bit].as_deref_mut() {
            Some(pool) => downcast_pool_mut::<C>(pool)?.get_mut(entity.id()),
            None => Err(missing::<C>(entity)),
        }
    }

    /// Read access to the whole pool for `C`, if one has been created.
    #[must_use]
    pub fn pool<C: Component>(&self) -> Option<&ComponentPool<C>> {
        let bit = checked_id::<C>().ok()?;
        self.pools[bit]
            .as_deref()
            .and_then(|pool| pool.as_any().downcast_ref::<ComponentPool<C>>())
    }

    fn refresh_membership(&mut self, entity: Entity, before: Signature, after: Signature) {
        for record in &mut self.systems {
            match (record.is_interested(before), record.is_interested(after)) {
                (false, true) => record.add_entity(entity),
                (true, false) => record.remove_entity(entity),
                _ => {}
            }
        }
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// Binds `tag` to `entity`.
    ///
    /// Re-tagging the same entity is a no-op; an entity holds one tag, so a
    /// new tag releases the old one.
    ///
    /// # Errors
    ///
    /// - [`EcsError::DuplicateTag`] if another entity holds `tag`
    /// - [`EcsError::StaleEntity`] if the handle is dead
    pub fn tag_entity(&mut self, entity: Entity, tag: &str) -> EcsResult<()> {
        self.slot(entity)?;
        self.tags.insert(entity, tag)
    }

    /// Checks whether `entity` holds `tag`.
    #[must_use]
    pub fn entity_has_tag(&self, entity: Entity, tag: &str) -> bool {
        self.tags.has(entity, tag)
    }

    /// Entity currently holding `tag`.
    #[must_use]
    pub fn entity_by_tag(&self, tag: &str) -> Option<Entity> {
        self.tags.entity(tag)
    }

    /// Tag held by `entity`.
    #[must_use]
    pub fn tag_of(&self, entity: Entity) -> Option<&str> {
        self.tags.tag(entity)
    }

    /// Releases `entity`'s tag.
    pub fn remove_entity_tag(&mut self, entity: Entity) -> Option<String> {
        self.tags.remove(entity)
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Adds `entity` to `group`. Adding twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] if the handle is dead.
    pub fn group_entity(&mut self, entity: Entity, group: &str) -> EcsResult<()> {
        self.slot(entity)?;
        self.groups.insert(entity, group);
        Ok(())
    }

    /// Checks whether `entity` belongs to `group`.
    #[must_use]
    pub fn entity_in_group(&self, entity: Entity, group: &str) -> bool {
        self.groups.contains(entity, group)
    }

    /// Snapshot of `group`'s members; empty for unknown groups.
    #[must_use]
    pub fn entities_by_group(&self, group: &str) -> Vec<Entity> {
        self.groups.members(group)
    }

    /// Groups `entity` belongs to.
    #[must_use]
    pub fn groups_of(&self, entity: Entity) -> Vec<&str> {
        self.groups.groups(entity)
    }

    /// Removes `entity` from `group`. Returns whether it was a member.
    pub fn remove_entity_group(&mut self, entity: Entity, group: &str) -> bool {
        self.groups.remove(entity, group)
    }

    /// Removes `entity` from all of its groups. Returns how many it left.
    pub fn remove_entity_groups(&mut self, entity: Entity) -> usize {
        self.groups.remove_all(entity)
    }

    // =========================================================================
    // Systems
    // =========================================================================

    /// Registers `system`, replacing any existing instance of the same type.
    ///
    /// Already committed entities are matched against it immediately.
    pub fn add_system<S: System>(&mut self, system: S) {
        let mut record = SystemRecord::new(system);
        for (id, slot) in self.slots.iter().enumerate() {
            if slot.state == SlotState::Live && record.is_interested(slot.signature) {
                let id = u32::try_from(id).unwrap_or(u32::MAX);
                record.add_entity(Entity::new(id, slot.generation));
            }
        }

        tracing::debug!(
            system = record.name,
            matched = record.entities.len(),
            "added system"
        );

        match self.systems.iter_mut().find(|r| r.type_id == record.type_id) {
            Some(existing) => *existing = record,
            None => self.systems.push(record),
        }
    }

    /// Unregisters system `S`, returning it unless it is currently lent out.
    pub fn remove_system<S: System>(&mut self) -> Option<S> {
        let index = self.system_index::<S>().ok()?;
        let record = self.systems.remove(index);
        tracing::debug!(system = record.name, "removed system");
        record
            .instance
            .and_then(|instance| instance.downcast::<S>().ok())
            .map(|system| *system)
    }

    /// Checks whether a system of type `S` is registered.
    #[must_use]
    pub fn has_system<S: System>(&self) -> bool {
        self.system_index::<S>().is_ok()
    }

    /// Borrows the registered `S`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::SystemNotFound`] if no `S` is registered
    /// - [`EcsError::SystemBusy`] while `S` is lent out by `run_system`
    pub fn get_system<S: System>(&self) -> EcsResult<&S> {
        let record = &self.systems[self.system_index::<S>()?];
        record
            .instance
            .as_deref()
            .ok_or(EcsError::SystemBusy(record.name))?
            .downcast_ref::<S>()
            .ok_or(EcsError::SystemNotFound(record.name))
    }

    /// Mutably borrows the registered `S`.
    ///
    /// # Errors
    ///
    /// Same as [`get_system`](Self::get_system).
    pub fn get_system_mut<S: System>(&mut self) -> EcsResult<&mut S> {
        let index = self.system_index::<S>()?;
        let record = &mut self.systems[index];
        let name = record.name;
        record
            .instance
            .as_deref_mut()
            .ok_or(EcsError::SystemBusy(name))?
            .downcast_mut::<S>()
            .ok_or(EcsError::SystemNotFound(name))
    }

    /// Entities currently matched by `S`, in match order.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotFound`] if no `S` is registered.
    pub fn system_entities<S: System>(&self) -> EcsResult<&[Entity]> {
        let index = self.system_index::<S>()?;
        Ok(&self.systems[index].entities)
    }

    /// Signature `S` was registered with.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemNotFound`] if no `S` is registered.
    pub fn system_signature<S: System>(&self) -> EcsResult<Signature> {
        let index = self.system_index::<S>()?;
        Ok(self.systems[index].signature)
    }

    /// Number of registered systems.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Lends system `S` out of the registry for the duration of `run`.
    ///
    /// `run` receives the system, a snapshot of its matched entities, and the
    /// registry itself, so the system can read and write components, create
    /// and destroy entities, and borrow other systems. Membership for `S` is
    /// still maintained while it is lent out; the snapshot does not change.
    ///
    /// # Errors
    ///
    /// - [`EcsError::SystemNotFound`] if no `S` is registered
    /// - [`EcsError::SystemBusy`] if `S` is already lent out
    pub fn run_system<S, R, F>(&mut self, run: F) -> EcsResult<R>
    where
        S: System,
        F: FnOnce(&mut S, &[Entity], &mut Registry) -> R,
    {
        let index = self.system_index::<S>()?;
        let record = &mut self.systems[index];
        let name = record.name;
        let instance = record.instance.take().ok_or(EcsError::SystemBusy(name))?;
        let mut system = match instance.downcast::<S>() {
            Ok(system) => system,
            Err(instance) => {
                record.instance = Some(instance);
                return Err(EcsError::SystemNotFound(name));
            }
        };
        let entities = record.entities.clone();

        let result = run(&mut *system, &entities, self);

        // The system list may have been reshuffled by `run`.
        let type_id = TypeId::of::<S>();
        if let Some(record) = self
            .systems
            .iter_mut()
            .find(|r| r.type_id == type_id && r.instance.is_none())
        {
            record.instance = Some(system as Box<dyn std::any::Any>);
        }
        Ok(result)
    }

    fn system_index<S: System>(&self) -> EcsResult<usize> {
        let type_id = TypeId::of::<S>();
        self.systems
            .iter()
            .position(|record| record.type_id == type_id)
            .ok_or_else(|| EcsError::SystemNotFound(short_type_name::<S>()))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn missing<C: Component>(entity: Entity) -> EcsError {
    EcsError::ComponentNotFound {
        component: component_name::<C>(),
        entity: entity.id(),
    }
}

fn downcast_pool<C: Component>(pool: &dyn AnyPool) -> EcsResult<&ComponentPool<C>> {
    let existing = pool.component_name();
    pool.as_any()
        .downcast_ref::<ComponentPool<C>>()
        .ok_or(EcsError::ComponentIdConflict {
            component: component_name::<C>(),
            id: C::ID,
            existing,
        })
}

fn downcast_pool_mut<C: Component>(pool: &mut dyn AnyPool) -> EcsResult<&mut ComponentPool<C>> {
    let existing = pool.component_name();
    pool.as_any_mut()
        .downcast_mut::<ComponentPool<C>>()
        .ok_or(EcsError::ComponentIdConflict {
            component: component_name::<C>(),
            id: C::ID,
            existing,
        })
}
