//! Velocity integration, map clamping and obstacle bounces.

use ember_core::{Entity, Registry, Signature, System};
use ember_shared::{CollisionEvent, RigidBody, Sprite, Transform, Vec2};

use super::{WorldBounds, ENEMIES_GROUP, OBSTACLES_GROUP, PLAYER_TAG};

/// Moves every entity with a [`Transform`] and a [`RigidBody`].
///
/// - The player is clamped to the map
/// - Anything else that leaves the map is destroyed
/// - Enemies reverse (and mirror) when they touch an obstacle
#[derive(Debug, Default)]
pub struct MovementSystem;

impl System for MovementSystem {
    fn signature(&self) -> Signature {
        Signature::new().with::<Transform>().with::<RigidBody>()
    }
}

impl MovementSystem {
    /// Integrates positions over `delta_seconds`.
    pub fn update(
        &mut self,
        entities: &[Entity],
        registry: &mut Registry,
        delta_seconds: f64,
        bounds: WorldBounds,
    ) {
        let dt = delta_seconds as f32;

        for &entity in entities {
            let Ok(velocity) = registry.get_component::<RigidBody>(entity).map(|rb| rb.velocity)
            else {
                continue;
            };
            let Ok(transform) = registry.get_component::<Transform>(entity).copied() else {
                continue;
            };
            let size = registry
                .get_component::<Sprite>(entity)
                .ok()
                .map(|sprite| sprite.scaled_size(transform.scale));
            let is_player = registry.entity_has_tag(entity, PLAYER_TAG);

            if !is_player && is_outside_map(&transform, size, bounds) {
                tracing::debug!(entity = entity.id(), "entity left the map");
                registry.destroy_entity(entity).ok();
                continue;
            }

            let mut position = transform.position + velocity * dt;
            if is_player {
                position = clamp_to_map(position, size.unwrap_or(Vec2::ZERO), bounds);
            }
            if let Ok(transform) = registry.get_component_mut::<Transform>(entity) {
                transform.position = position;
            }
        }
    }

    /// Bounces an enemy that ran into an obstacle.
    pub fn on_collision(
        &mut self,
        _entities: &[Entity],
        registry: &mut Registry,
        event: &CollisionEvent,
    ) {
        for (enemy, other) in [(event.a, event.b), (event.b, event.a)] {
            if registry.entity_in_group(enemy, ENEMIES_GROUP)
                && registry.entity_in_group(other, OBSTACLES_GROUP)
            {
                bounce(registry, enemy);
            }
        }
    }
}

fn bounce(registry: &mut Registry, enemy: Entity) {
    if let Ok(rigid_body) = registry.get_component_mut::<RigidBody>(enemy) {
        rigid_body.velocity = -rigid_body.velocity;
    }
    if let Ok(sprite) = registry.get_component_mut::<Sprite>(enemy) {
        sprite.flip = sprite.flip.toggled_horizontal();
    }
}

fn is_outside_map(transform: &Transform, size: Option<Vec2>, bounds: WorldBounds) -> bool {
    let position = transform.position;
    if position.x > bounds.map_width || position.y > bounds.map_height {
        return true;
    }
    match size {
        Some(size) => position.x + size.x < 0.0 || position.y + size.y < 0.0,
        None => position.x < 0.0 || position.y < 0.0,
    }
}

fn clamp_to_map(position: Vec2, size: Vec2, bounds: WorldBounds) -> Vec2 {
    let max_x = (bounds.map_width - size.x).max(0.0);
    let max_y = (bounds.map_height - size.y).max(0.0);
    Vec2::new(position.x.clamp(0.0, max_x), position.y.clamp(0.0, max_y))
}
