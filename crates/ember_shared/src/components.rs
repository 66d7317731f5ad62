//! Engine component types.
//!
//! Every type owns a fixed signature bit through [`Component::ID`]. Ids are
//! part of the data format: level files and saved signatures depend on them,
//! so never renumber an existing component.
//!
//! | Id | Component          |
//! |----|--------------------|
//! | 0  | [`Transform`]        |
//! | 1  | [`RigidBody`]        |
//! | 2  | [`Sprite`]           |
//! | 3  | [`BoxCollider`]      |
//! | 4  | [`Health`]           |
//! | 5  | [`Animation`]        |
//! | 6  | [`KeyboardControl`]  |
//! | 7  | [`CameraFollow`]     |
//! | 8  | [`ProjectileEmitter`]|
//! | 9  | [`Projectile`]       |
//! | 10 | [`TextLabel`]        |
//! | 11 | [`SquarePrimitive`]  |
//! | 12 | [`Script`]           |

use std::fmt;
use std::rc::Rc;

use ember_core::{Component, Entity, Registry};
use serde::{Deserialize, Serialize};

use crate::math::{Color, Rect, Vec2};

/// Position, scale and rotation in world space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    /// Top-left corner in world pixels.
    pub position: Vec2,
    /// Per-axis scale applied to sprite and collider sizes.
    pub scale: Vec2,
    /// Rotation in degrees, clockwise.
    pub rotation: f32,
}

impl Transform {
    /// Creates a transform.
    #[must_use]
    pub const fn new(position: Vec2, scale: Vec2, rotation: f32) -> Self {
        Self {
            position,
            scale,
            rotation,
        }
    }

    /// Unscaled, unrotated transform at `position`.
    #[must_use]
    pub const fn at(position: Vec2) -> Self {
        Self::new(position, Vec2::ONE, 0.0)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(Vec2::ZERO)
    }
}

impl Component for Transform {
    const ID: u8 = 0;
}

/// Linear velocity in pixels per second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigidBody {
    /// Velocity.
    pub velocity: Vec2,
}

impl RigidBody {
    /// Creates a rigid body.
    #[must_use]
    pub const fn new(velocity: Vec2) -> Self {
        Self { velocity }
    }
}

impl Component for RigidBody {
    const ID: u8 = 1;
}

/// Horizontal and vertical mirroring for a sprite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flip {
    /// Drawn as is.
    #[default]
    None,
    /// Mirrored left to right.
    Horizontal,
    /// Mirrored top to bottom.
    Vertical,
}

impl Flip {
    /// Toggles horizontal mirroring.
    #[must_use]
    pub const fn toggled_horizontal(self) -> Self {
        match self {
            Self::None => Self::Horizontal,
            Self::Horizontal | Self::Vertical => Self::None,
        }
    }
}

/// Textured quad.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sprite {
    /// Texture id resolved by the renderer.
    pub asset_id: String,
    /// Unscaled width in pixels.
    pub width: u32,
    /// Unscaled height in pixels.
    pub height: u32,
    /// Render layer.
    pub layer: i32,
    /// Screen-space (HUD) sprite, unaffected by the camera.
    pub is_fixed: bool,
    /// Region of the texture to draw.
    pub src_rect: Rect,
    /// Mirroring.
    pub flip: Flip,
}

impl Sprite {
    /// Creates a world-space sprite showing the top-left `width`×`height`
    /// region of `asset_id`.
    #[must_use]
    pub fn new(asset_id: impl Into<String>, width: u32, height: u32, layer: i32) -> Self {
        Self {
            asset_id: asset_id.into(),
            width,
            height,
            layer,
            is_fixed: false,
            src_rect: Rect::new(0.0, 0.0, width as f32, height as f32),
            flip: Flip::None,
        }
    }

    /// Marks the sprite as screen-space.
    #[must_use]
    pub fn fixed(mut self) -> Self {
        self.is_fixed = true;
        self
    }

    /// Moves the source rectangle to `(x, y)` in the texture.
    #[must_use]
    pub fn with_src_offset(mut self, x: f32, y: f32) -> Self {
        self.src_rect.x = x;
        self.src_rect.y = y;
        self
    }

    /// Size after applying `scale`.
    #[must_use]
    pub fn scaled_size(&self, scale: Vec2) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32).scaled(scale)
    }
}

impl Component for Sprite {
    const ID: u8 = 2;
}

/// Axis-aligned collision box relative to the transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxCollider {
    /// Unscaled width.
    pub width: u32,
    /// Unscaled height.
    pub height: u32,
    /// Offset from the transform position.
    pub offset: Vec2,
}

impl BoxCollider {
    /// Creates a collider with no offset.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            offset: Vec2::ZERO,
        }
    }

    /// World-space box for an entity at `transform`.
    #[must_use]
    pub fn bounds(&self, transform: &Transform) -> Rect {
        let size = Vec2::new(self.width as f32, self.height as f32).scaled(transform.scale);
        let origin = transform.position + self.offset;
        Rect::new(origin.x, origin.y, size.x, size.y)
    }
}

impl Component for BoxCollider {
    const ID: u8 = 3;
}

/// Hit points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// Remaining hit points.
    pub current: i32,
    /// Full health.
    pub max: i32,
}

impl Health {
    /// Full health.
    #[must_use]
    pub const fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    /// Remaining share of `max`, `0.0` when `max` is not positive.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max <= 0 {
            return 0.0;
        }
        self.current as f32 / self.max as f32
    }

    /// True once hit points reach zero.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.current <= 0
    }
}

impl Component for Health {
    const ID: u8 = 4;
}

/// Sprite-sheet animation along the x axis of the source texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Animation {
    /// Frames in the strip.
    pub num_frames: u32,
    /// Frame shown this tick.
    pub current_frame: u32,
    /// Frames per second.
    pub frame_rate: u32,
    /// Keep cycling after the last frame.
    pub looping: bool,
    /// Clock reading the animation started at.
    pub start_time_ms: u64,
}

impl Animation {
    /// Creates an animation starting at `start_time_ms`.
    #[must_use]
    pub const fn new(num_frames: u32, frame_rate: u32, looping: bool, start_time_ms: u64) -> Self {
        Self {
            num_frames,
            current_frame: 0,
            frame_rate,
            looping,
            start_time_ms,
        }
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::new(1, 1, true, 0)
    }
}

impl Component for Animation {
    const ID: u8 = 5;
}

/// Steered with the arrow keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyboardControl {
    /// Speed in pixels per second.
    pub speed: f32,
}

impl Component for KeyboardControl {
    const ID: u8 = 6;
}

/// The camera centres on this entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraFollow;

impl Component for CameraFollow {
    const ID: u8 = 7;
}

/// Spawns projectiles.
///
/// Hostile emitters fire every `frequency_ms`; friendly emitters fire when
/// the player presses space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileEmitter {
    /// Projectile velocity. Friendly emitters scale it along the emitter's
    /// heading instead.
    pub velocity: Vec2,
    /// Projectile lifetime.
    pub duration_ms: u64,
    /// Delay between hostile shots.
    pub frequency_ms: u64,
    /// Damage per hit.
    pub damage: i32,
    /// Fired by the player's side.
    pub is_friendly: bool,
    /// Clock reading of the last shot.
    pub last_emission_ms: u64,
}

impl Default for ProjectileEmitter {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            duration_ms: 10_000,
            frequency_ms: 1_000,
            damage: 10,
            is_friendly: true,
            last_emission_ms: 0,
        }
    }
}

impl Component for ProjectileEmitter {
    const ID: u8 = 8;
}

/// A live projectile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Projectile {
    /// Damage dealt on hit.
    pub damage: i32,
    /// Clock reading at spawn.
    pub spawn_time_ms: u64,
    /// Lifetime.
    pub duration_ms: u64,
    /// Fired by the player's side.
    pub is_friendly: bool,
}

impl Projectile {
    /// True once the projectile has outlived its duration at `now_ms`.
    #[must_use]
    pub const fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.spawn_time_ms) > self.duration_ms
    }
}

impl Component for Projectile {
    const ID: u8 = 9;
}

/// Text drawn at a position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextLabel {
    /// Top-left corner.
    pub position: Vec2,
    /// Render layer.
    pub layer: i32,
    /// Contents.
    pub text: String,
    /// Font id resolved by the renderer.
    pub font_id: String,
    /// Text colour.
    pub color: Color,
    /// Screen-space label, unaffected by the camera.
    pub is_fixed: bool,
}

impl Default for TextLabel {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            layer: 0,
            text: String::new(),
            font_id: String::new(),
            color: Color::WHITE,
            is_fixed: true,
        }
    }
}

impl Component for TextLabel {
    const ID: u8 = 10;
}

/// Filled rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquarePrimitive {
    /// Top-left corner.
    pub position: Vec2,
    /// Render layer.
    pub layer: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Fill colour.
    pub color: Color,
    /// Screen-space rectangle, unaffected by the camera.
    pub is_fixed: bool,
}

impl Default for SquarePrimitive {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            layer: 0,
            width: 0,
            height: 0,
            color: Color::WHITE,
            is_fixed: true,
        }
    }
}

impl Component for SquarePrimitive {
    const ID: u8 = 11;
}

/// Per-tick script callback: `(registry, entity, delta_seconds, elapsed_ms)`.
pub type ScriptFn = Rc<dyn Fn(&mut Registry, Entity, f64, u64)>;

/// Opaque per-entity behaviour, invoked once per tick.
#[derive(Clone)]
pub struct Script {
    /// The callback.
    pub update: ScriptFn,
}

impl Script {
    /// Wraps a callback.
    pub fn new<F>(update: F) -> Self
    where
        F: Fn(&mut Registry, Entity, f64, u64) + 'static,
    {
        Self {
            update: Rc::new(update),
        }
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Script").finish_non_exhaustive()
    }
}

impl Component for Script {
    const ID: u8 = 12;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_in_range() {
        let ids = [
            Transform::ID,
            RigidBody::ID,
            Sprite::ID,
            BoxCollider::ID,
            Health::ID,
            Animation::ID,
            KeyboardControl::ID,
            CameraFollow::ID,
            ProjectileEmitter::ID,
            Projectile::ID,
            TextLabel::ID,
            SquarePrimitive::ID,
            Script::ID,
        ];
        let mut seen = std::collections::BTreeSet::new();
        for id in ids {
            assert!(usize::from(id) < ember_core::MAX_COMPONENTS);
            assert!(seen.insert(id), "duplicate component id {id}");
        }
    }

    #[test]
    fn test_collider_bounds_use_scale_and_offset() {
        let transform = Transform::new(Vec2::new(10.0, 20.0), Vec2::new(2.0, 3.0), 0.0);
        let collider = BoxCollider {
            width: 8,
            height: 4,
            offset: Vec2::new(1.0, 1.0),
        };
        assert_eq!(collider.bounds(&transform), Rect::new(11.0, 21.0, 16.0, 12.0));
    }

    #[test]
    fn test_health_fraction() {
        let mut health = Health::new(200);
        health.current = 50;
        assert_eq!(health.fraction(), 0.25);
        assert!(!health.is_depleted());
        assert_eq!(Health::default().fraction(), 0.0);
    }

    #[test]
    fn test_projectile_expiry() {
        let projectile = Projectile {
            damage: 10,
            spawn_time_ms: 1_000,
            duration_ms: 500,
            is_friendly: false,
        };
        assert!(!projectile.is_expired(1_500));
        assert!(projectile.is_expired(1_501));
        assert!(!projectile.is_expired(0));
    }

    #[test]
    fn test_sprite_builder() {
        let sprite = Sprite::new("radar-image", 64, 64, 2).fixed().with_src_offset(64.0, 0.0);
        assert!(sprite.is_fixed);
        assert_eq!(sprite.src_rect, Rect::new(64.0, 0.0, 64.0, 64.0));
        assert_eq!(sprite.scaled_size(Vec2::new(2.0, 1.0)), Vec2::new(128.0, 64.0));
    }
}
