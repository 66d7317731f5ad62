//! # Ember Core
//!
//! Runtime core of the Ember 2D engine:
//! - Sparse-set component pools, one per component type
//! - A registry that owns entities, pools and systems, with deferred
//!   entity creation and destruction
//! - Signature-matched systems
//! - A synchronous, type-indexed event bus
//! - A deterministic render-ordering queue
//!
//! Everything runs on one thread. [`Registry::update`] is the only point
//! where staged entity changes become visible to systems.
//!
//! ## Example
//!
//! ```rust
//! use ember_core::{Component, Registry, Signature, System};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Position { x: f32, y: f32 }
//! impl Component for Position { const ID: u8 = 0; }
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Velocity { x: f32, y: f32 }
//! impl Component for Velocity { const ID: u8 = 1; }
//!
//! struct MovementSystem;
//! impl System for MovementSystem {
//!     fn signature(&self) -> Signature {
//!         Signature::new().with::<Position>().with::<Velocity>()
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry.add_system(MovementSystem);
//!
//! let ship = registry.create_entity();
//! registry.add_component(ship, Position::default()).unwrap();
//! registry.add_component(ship, Velocity { x: 10.0, y: 0.0 }).unwrap();
//! registry.update();
//!
//! registry
//!     .run_system::<MovementSystem, _, _>(|_, entities, registry| {
//!         for &entity in entities {
//!             let dx = registry.get_component::<Velocity>(entity).unwrap().x;
//!             registry.get_component_mut::<Position>(entity).unwrap().x += dx;
//!         }
//!     })
//!     .unwrap();
//!
//! assert_eq!(registry.get_component::<Position>(ship).unwrap().x, 10.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod events;
pub mod render;

pub use config::RegistryConfig;
pub use ecs::{
    AnyPool, CommitStats, Component, ComponentPool, Entity, Registry, Signature, System,
    MAX_COMPONENTS,
};
pub use error::{EcsError, EcsResult};
pub use events::{Event, EventBus};
pub use render::{RenderKey, RenderQueue, RenderableKind};
