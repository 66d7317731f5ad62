//! # Ember Shared
//!
//! Plain data used by every consumer of the engine: 2D math, the engine's
//! component types and its event types.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on a window, input or graphics library.
//! Platform layers translate their own types into these.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod components;
pub mod events;
pub mod math;

pub use components::{
    Animation, BoxCollider, CameraFollow, Flip, Health, KeyboardControl, Projectile,
    ProjectileEmitter, RigidBody, Script, ScriptFn, Sprite, SquarePrimitive, TextLabel, Transform,
};
pub use events::{CollisionEvent, Key, KeyInputEvent, Modifiers, MouseButton, MouseInputEvent};
pub use math::{Color, Rect, Vec2};
