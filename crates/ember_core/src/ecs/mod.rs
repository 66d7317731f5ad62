//! # Entity Component System
//!
//! Sparse-set storage with signature-matched systems.
//!
//! ## Design
//!
//! - One packed pool per component type, created on first use
//! - Every component type owns one bit of a 32-bit [`Signature`]
//! - Systems declare the signature they need; the registry keeps their
//!   entity lists current
//! - Entity creation and destruction are staged and committed together by
//!   [`Registry::update`]

mod component;
mod entity;
mod pool;
mod registry;
mod signature;
mod system;
mod tags;

pub use component::{checked_id, component_name, Component};
pub use entity::Entity;
pub use pool::{AnyPool, ComponentPool, DEFAULT_POOL_CAPACITY};
pub use registry::{CommitStats, Registry};
pub use signature::{Signature, MAX_COMPONENTS};
pub use system::System;
