//! # Gameplay Systems
//!
//! Every system declares its signature through [`System`](ember_core::System)
//! and exposes an `update` taking its matched entities and the registry. The
//! frame driver lends each system out with
//! [`Registry::run_system`](ember_core::Registry::run_system) in a fixed
//! order; event handlers are bound with
//! [`EventBus::subscribe_system`](ember_core::EventBus::subscribe_system).
//!
//! ```text
//! input events ─> keyboard, projectile emit, script
//! update order: movement, animation, collision ─> (damage, movement bounce),
//!               camera, projectile emit, projectile lifecycle,
//!               health display, script
//! after commit: render sprite, render text, render primitive
//! ```

mod animation;
mod camera_follow;
mod collision;
mod damage;
mod health_display;
mod keyboard;
mod movement;
mod projectile;
mod render;
mod script;

pub use animation::AnimationSystem;
pub use camera_follow::CameraFollowSystem;
pub use collision::CollisionSystem;
pub use damage::DamageSystem;
pub use health_display::{health_color, DisplayHealthSystem};
pub use keyboard::KeyboardControlSystem;
pub use movement::MovementSystem;
pub use projectile::{ProjectileEmitSystem, ProjectileLifecycleSystem};
pub use render::{RenderPrimitiveSystem, RenderSpriteSystem, RenderTextSystem};
pub use script::{position, set_position, set_sprite_src_rect, KeyboardState, ScriptSystem};

/// Tag of the player-controlled entity.
pub const PLAYER_TAG: &str = "player";
/// Group of hostile entities.
pub const ENEMIES_GROUP: &str = "enemies";
/// Group of static blockers enemies bounce off.
pub const OBSTACLES_GROUP: &str = "obstacles";
/// Group every spawned projectile joins.
pub const PROJECTILES_GROUP: &str = "projectiles";
/// Group of tile-map entities.
pub const TILES_GROUP: &str = "tiles";

/// Map and window extents systems clamp and cull against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldBounds {
    /// Map width in world pixels.
    pub map_width: f32,
    /// Map height in world pixels.
    pub map_height: f32,
    /// Window width in screen pixels.
    pub window_width: f32,
    /// Window height in screen pixels.
    pub window_height: f32,
}

impl WorldBounds {
    /// Bounds for a map of the given size seen through a window of the given
    /// size.
    #[must_use]
    pub const fn new(map_width: f32, map_height: f32, window_width: f32, window_height: f32) -> Self {
        Self {
            map_width,
            map_height,
            window_width,
            window_height,
        }
    }
}
