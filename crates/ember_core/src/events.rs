//! # Event Bus
//!
//! Synchronous, type-indexed publish/subscribe.
//!
//! ```text
//! emit(ctx, CollisionEvent) ──> [cb 0] ──> [cb 1] ──> ... ──> returns count
//!                               (subscription order, same call stack)
//! ```
//!
//! Nothing is queued: every callback subscribed to the exact event type runs
//! before `emit` returns. Callbacks receive a mutable context (the registry
//! by default) and the event, but never the bus itself, so a handler cannot
//! emit or subscribe while a dispatch is in progress.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;

use crate::ecs::{Entity, Registry, System};

/// Marker for types that can travel on the bus.
pub trait Event: 'static {}

/// Callback with its event type erased.
trait ErasedCallback<C> {
    fn call(&mut self, ctx: &mut C, event: &dyn Any);
}

struct TypedCallback<E, F> {
    callback: F,
    _event: PhantomData<fn(&E)>,
}

impl<C, E, F> ErasedCallback<C> for TypedCallback<E, F>
where
    E: Event,
    F: FnMut(&mut C, &E),
{
    fn call(&mut self, ctx: &mut C, event: &dyn Any) {
        if let Some(event) = event.downcast_ref::<E>() {
            (self.callback)(ctx, event);
        }
    }
}

/// Type-indexed subscriber lists.
///
/// # Example
///
/// ```rust
/// use ember_core::{Event, EventBus};
///
/// struct Scored(u32);
/// impl Event for Scored {}
///
/// let mut bus: EventBus<u32> = EventBus::new();
/// bus.subscribe(|total: &mut u32, event: &Scored| *total += event.0);
///
/// let mut total = 0;
/// assert_eq!(bus.emit(&mut total, Scored(5)), 1);
/// assert_eq!(total, 5);
/// ```
pub struct EventBus<C: 'static = Registry> {
    subscribers: HashMap<TypeId, Vec<Box<dyn ErasedCallback<C>>>>,
}

impl<C: 'static> EventBus<C> {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: HashMap::new(),
        }
    }

    /// Drops every subscription.
    ///
    /// The frame driver calls this once per frame and lets systems
    /// subscribe again.
    pub fn reset(&mut self) {
        let dropped: usize = self.subscribers.values().map(Vec::len).sum();
        self.subscribers.clear();
        tracing::trace!(dropped, "event bus reset");
    }

    /// Appends `callback` to the subscriber list for `E`.
    pub fn subscribe<E, F>(&mut self, callback: F)
    where
        E: Event,
        F: FnMut(&mut C, &E) + 'static,
    {
        self.subscribers
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Box::new(TypedCallback {
                callback,
                _event: PhantomData,
            }));
    }

    /// Delivers `event` to every subscriber of `E`, in subscription order.
    ///
    /// Returns how many callbacks ran. Emitting a type nobody listens to
    /// is a no-op.
    pub fn emit<E: Event>(&mut self, ctx: &mut C, event: E) -> usize {
        let Some(callbacks) = self.subscribers.get_mut(&TypeId::of::<E>()) else {
            return 0;
        };
        for callback in callbacks.iter_mut() {
            callback.call(ctx, &event);
        }
        callbacks.len()
    }

    /// Number of callbacks subscribed to `E`.
    #[must_use]
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.subscribers
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// True when nothing is subscribed to any event.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.values().all(Vec::is_empty)
    }
}

impl EventBus<Registry> {
    /// Subscribes a handler bound to the registered instance of system `S`.
    ///
    /// On dispatch the system is lent out of the registry (see
    /// [`Registry::run_system`]) and `handler` receives it together with its
    /// matched entities, the registry, and the event. If `S` is not
    /// registered when the event arrives, the event is skipped for this
    /// subscriber and a warning is logged.
    pub fn subscribe_system<S, E, F>(&mut self, mut handler: F)
    where
        S: System,
        E: Event,
        F: FnMut(&mut S, &[Entity], &mut Registry, &E) + 'static,
    {
        self.subscribe(move |registry: &mut Registry, event: &E| {
            let result = registry.run_system::<S, _, _>(|system, entities, registry| {
                handler(system, entities, registry, event);
            });
            if let Err(err) = result {
                tracing::warn!(
                    event = std::any::type_name::<E>(),
                    error = %err,
                    "dropped event for system"
                );
            }
        });
    }
}

impl<C: 'static> Default for EventBus<C> {
    fn default() -> Self {
        Self::new()
    }
}
