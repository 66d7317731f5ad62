//! Projectile hits.

use ember_core::{Entity, Registry, Signature, System};
use ember_shared::{BoxCollider, CollisionEvent, Health, Projectile};

use super::{ENEMIES_GROUP, PLAYER_TAG, PROJECTILES_GROUP};

/// Applies projectile damage on collision.
///
/// Hostile projectiles hurt the player, friendly projectiles hurt enemies.
/// The projectile is destroyed on hit; the target is destroyed once its
/// health is depleted.
#[derive(Debug, Default)]
pub struct DamageSystem;

impl System for DamageSystem {
    fn signature(&self) -> Signature {
        Signature::new().with::<BoxCollider>()
    }
}

impl DamageSystem {
    /// Collision handler.
    pub fn on_collision(
        &mut self,
        _entities: &[Entity],
        registry: &mut Registry,
        event: &CollisionEvent,
    ) {
        for (projectile, target) in [(event.a, event.b), (event.b, event.a)] {
            if !registry.entity_in_group(projectile, PROJECTILES_GROUP)
                || registry.is_pending_destroy(projectile)
            {
                continue;
            }
            let Ok(&shot) = registry.get_component::<Projectile>(projectile) else {
                continue;
            };

            let hits_target = if shot.is_friendly {
                registry.entity_in_group(target, ENEMIES_GROUP)
            } else {
                registry.entity_has_tag(target, PLAYER_TAG)
            };
            if hits_target && !registry.is_pending_destroy(target) {
                hit(registry, projectile, shot.damage, target);
            }
        }
    }
}

fn hit(registry: &mut Registry, projectile: Entity, damage: i32, target: Entity) {
    let depleted = match registry.get_component_mut::<Health>(target) {
        Ok(health) => {
            health.current = health.current.saturating_sub(damage);
            tracing::debug!(
                target = target.id(),
                damage,
                remaining = health.current,
                "projectile hit"
            );
            health.is_depleted()
        }
        Err(_) => false,
    };

    registry.destroy_entity(projectile).ok();
    if depleted {
        tracing::info!(target = target.id(), "entity killed");
        registry.destroy_entity(target).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projectile(registry: &mut Registry, damage: i32, is_friendly: bool) -> Entity {
        let entity = registry.create_entity();
        registry.group_entity(entity, PROJECTILES_GROUP).unwrap();
        registry
            .add_component(
                entity,
                Projectile {
                    damage,
                    spawn_time_ms: 0,
                    duration_ms: 1_000,
                    is_friendly,
                },
            )
            .unwrap();
        entity
    }

    fn target(registry: &mut Registry, max: i32) -> Entity {
        let entity = registry.create_entity();
        registry.add_component(entity, Health::new(max)).unwrap();
        entity
    }

    #[test]
    fn test_hostile_projectile_hurts_player() {
        let mut registry = Registry::new();
        let player = target(&mut registry, 100);
        registry.tag_entity(player, PLAYER_TAG).unwrap();
        let shot = projectile(&mut registry, 25, false);

        DamageSystem.on_collision(&[], &mut registry, &CollisionEvent { a: player, b: shot });

        assert_eq!(registry.get_component::<Health>(player).unwrap().current, 75);
        assert!(registry.is_pending_destroy(shot));
        assert!(!registry.is_pending_destroy(player));
    }

    #[test]
    fn test_friendly_projectile_ignores_player() {
        let mut registry = Registry::new();
        let player = target(&mut registry, 100);
        registry.tag_entity(player, PLAYER_TAG).unwrap();
        let shot = projectile(&mut registry, 25, true);

        DamageSystem.on_collision(&[], &mut registry, &CollisionEvent { a: shot, b: player });

        assert_eq!(registry.get_component::<Health>(player).unwrap().current, 100);
        assert!(!registry.is_pending_destroy(shot));
    }

    #[test]
    fn test_enemy_dies_at_zero_health() {
        let mut registry = Registry::new();
        let enemy = target(&mut registry, 20);
        registry.group_entity(enemy, ENEMIES_GROUP).unwrap();
        let first = projectile(&mut registry, 10, true);
        let second = projectile(&mut registry, 10, true);

        DamageSystem.on_collision(&[], &mut registry, &CollisionEvent { a: first, b: enemy });
        assert!(!registry.is_pending_destroy(enemy));
        DamageSystem.on_collision(&[], &mut registry, &CollisionEvent { a: second, b: enemy });
        assert!(registry.is_pending_destroy(enemy));
    }

    #[test]
    fn test_spent_projectile_hits_once() {
        let mut registry = Registry::new();
        let enemy = target(&mut registry, 100);
        registry.group_entity(enemy, ENEMIES_GROUP).unwrap();
        let shot = projectile(&mut registry, 10, true);
        let event = CollisionEvent { a: shot, b: enemy };

        DamageSystem.on_collision(&[], &mut registry, &event);
        DamageSystem.on_collision(&[], &mut registry, &event);

        assert_eq!(registry.get_component::<Health>(enemy).unwrap().current, 90);
    }
}
