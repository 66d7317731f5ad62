//! Projectile spawning and expiry.

use ember_core::{Entity, EcsResult, Registry, Signature, System};
use ember_shared::{
    BoxCollider, Key, KeyInputEvent, Projectile, ProjectileEmitter, RigidBody, Sprite, Transform,
    Vec2,
};

use super::PROJECTILES_GROUP;

const PROJECTILE_ASSET: &str = "bullet-image";
const PROJECTILE_SIZE: u32 = 4;
const PROJECTILE_LAYER: i32 = 4;

/// Fires projectiles from [`ProjectileEmitter`]s.
///
/// Hostile emitters fire on their own timer. One space press makes every
/// friendly emitter fire once on the next update, along its current heading.
#[derive(Debug, Default)]
pub struct ProjectileEmitSystem {
    fire_friendly: bool,
}

impl System for ProjectileEmitSystem {
    fn signature(&self) -> Signature {
        Signature::new().with::<Transform>().with::<ProjectileEmitter>()
    }
}

impl ProjectileEmitSystem {
    /// Arms friendly emitters when space goes down.
    pub fn on_key_input(
        &mut self,
        _entities: &[Entity],
        _registry: &mut Registry,
        event: &KeyInputEvent,
    ) {
        if event.pressed && event.key == Key::Space {
            self.fire_friendly = true;
        }
    }

    /// True if friendly emitters will fire on the next update.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.fire_friendly
    }

    /// Spawns this tick's projectiles and returns how many were fired.
    ///
    /// # Errors
    ///
    /// Propagates registry errors from spawning.
    pub fn update(
        &mut self,
        entities: &[Entity],
        registry: &mut Registry,
        elapsed_ms: u64,
    ) -> EcsResult<usize> {
        let mut fired = 0;
        for &entity in entities {
            let Ok(&emitter) = registry.get_component::<ProjectileEmitter>(entity) else {
                continue;
            };
            let velocity = if emitter.is_friendly {
                if !self.fire_friendly {
                    continue;
                }
                let heading = registry
                    .get_component::<RigidBody>(entity)
                    .ok()
                    .and_then(|rb| rb.velocity.normalized());
                match heading {
                    Some(heading) => heading.scaled(emitter.velocity),
                    None => emitter.velocity,
                }
            } else {
                if elapsed_ms.saturating_sub(emitter.last_emission_ms) <= emitter.frequency_ms {
                    continue;
                }
                emitter.velocity
            };

            let origin = muzzle(registry, entity);
            spawn_projectile(registry, origin, velocity, &emitter, elapsed_ms)?;
            if let Ok(emitter) = registry.get_component_mut::<ProjectileEmitter>(entity) {
                emitter.last_emission_ms = elapsed_ms;
            }
            fired += 1;
        }

        self.fire_friendly = false;
        Ok(fired)
    }
}

/// Centre of the emitter's sprite, or its position when it has none.
fn muzzle(registry: &Registry, entity: Entity) -> Vec2 {
    let Ok(transform) = registry.get_component::<Transform>(entity) else {
        return Vec2::ZERO;
    };
    let half = registry
        .get_component::<Sprite>(entity)
        .map_or(Vec2::ZERO, |sprite| sprite.scaled_size(transform.scale) * 0.5);
    transform.position + half
}

fn spawn_projectile(
    registry: &mut Registry,
    position: Vec2,
    velocity: Vec2,
    emitter: &ProjectileEmitter,
    now_ms: u64,
) -> EcsResult<Entity> {
    let projectile = registry.create_entity();
    registry.group_entity(projectile, PROJECTILES_GROUP)?;
    registry.add_component(projectile, Transform::at(position))?;
    registry.add_component(projectile, RigidBody::new(velocity))?;
    registry.add_component(
        projectile,
        Sprite::new(PROJECTILE_ASSET, PROJECTILE_SIZE, PROJECTILE_SIZE, PROJECTILE_LAYER),
    )?;
    registry.add_component(projectile, BoxCollider::new(PROJECTILE_SIZE, PROJECTILE_SIZE))?;
    registry.add_component(
        projectile,
        Projectile {
            damage: emitter.damage,
            spawn_time_ms: now_ms,
            duration_ms: emitter.duration_ms,
            is_friendly: emitter.is_friendly,
        },
    )?;
    tracing::trace!(projectile = projectile.id(), friendly = emitter.is_friendly, "projectile fired");
    Ok(projectile)
}

/// Destroys projectiles that outlived their duration.
#[derive(Debug, Default)]
pub struct ProjectileLifecycleSystem;

impl System for ProjectileLifecycleSystem {
    fn signature(&self) -> Signature {
        Signature::new().with::<Projectile>()
    }
}

impl ProjectileLifecycleSystem {
    /// Expires projectiles at `elapsed_ms` and returns how many.
    pub fn update(&mut self, entities: &[Entity], registry: &mut Registry, elapsed_ms: u64) -> usize {
        let expired: Vec<Entity> = entities
            .iter()
            .copied()
            .filter(|&entity| {
                registry
                    .get_component::<Projectile>(entity)
                    .is_ok_and(|projectile| projectile.is_expired(elapsed_ms))
            })
            .collect();
        for &entity in &expired {
            registry.destroy_entity(entity).ok();
        }
        expired.len()
    }
}
