//! Arrow-key steering.

use ember_core::{Entity, Registry, Signature, System};
use ember_shared::{Key, KeyInputEvent, KeyboardControl, RigidBody, Sprite, Vec2};

/// Sets the velocity of keyboard-controlled entities from the arrow keys
/// and selects the matching sprite-sheet row (up, right, down, left).
#[derive(Debug, Default)]
pub struct KeyboardControlSystem;

impl System for KeyboardControlSystem {
    fn signature(&self) -> Signature {
        Signature::new()
            .with::<KeyboardControl>()
            .with::<RigidBody>()
            .with::<Sprite>()
    }
}

impl KeyboardControlSystem {
    /// Key handler. Releases and non-arrow keys are ignored.
    pub fn on_key_input(
        &mut self,
        entities: &[Entity],
        registry: &mut Registry,
        event: &KeyInputEvent,
    ) {
        if !event.pressed {
            return;
        }
        let Some((heading, row)) = steering(event.key) else {
            return;
        };

        for &entity in entities {
            let Ok(speed) = registry.get_component::<KeyboardControl>(entity).map(|c| c.speed)
            else {
                continue;
            };
            if let Ok(rigid_body) = registry.get_component_mut::<RigidBody>(entity) {
                rigid_body.velocity = heading * speed;
            }
            if let Ok(sprite) = registry.get_component_mut::<Sprite>(entity) {
                sprite.src_rect.y = (sprite.height * row) as f32;
            }
        }
    }
}

/// Unit heading and sprite-sheet row for an arrow key.
fn steering(key: Key) -> Option<(Vec2, u32)> {
    match key {
        Key::Up => Some((Vec2::new(0.0, -1.0), 0)),
        Key::Right => Some((Vec2::new(1.0, 0.0), 1)),
        Key::Down => Some((Vec2::new(0.0, 1.0), 2)),
        Key::Left => Some((Vec2::new(-1.0, 0.0), 3)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(registry: &mut Registry) -> Entity {
        let entity = registry.create_entity();
        registry.add_component(entity, KeyboardControl { speed: 80.0 }).unwrap();
        registry.add_component(entity, RigidBody::default()).unwrap();
        registry.add_component(entity, Sprite::new("chopper-image", 32, 32, 1)).unwrap();
        entity
    }

    fn press(registry: &mut Registry, event: KeyInputEvent) {
        registry
            .run_system::<KeyboardControlSystem, _, _>(|system, entities, registry| {
                system.on_key_input(entities, registry, &event);
            })
            .unwrap();
    }

    #[test]
    fn test_arrows_steer_and_pick_row() {
        let mut registry = Registry::new();
        registry.add_system(KeyboardControlSystem);
        let entity = player(&mut registry);
        registry.update();

        press(&mut registry, KeyInputEvent::pressed(Key::Down));
        assert_eq!(
            registry.get_component::<RigidBody>(entity).unwrap().velocity,
            Vec2::new(0.0, 80.0)
        );
        assert_eq!(registry.get_component::<Sprite>(entity).unwrap().src_rect.y, 64.0);

        press(&mut registry, KeyInputEvent::pressed(Key::Left));
        assert_eq!(
            registry.get_component::<RigidBody>(entity).unwrap().velocity,
            Vec2::new(-80.0, 0.0)
        );
        assert_eq!(registry.get_component::<Sprite>(entity).unwrap().src_rect.y, 96.0);
    }

    #[test]
    fn test_release_and_other_keys_are_ignored() {
        let mut registry = Registry::new();
        registry.add_system(KeyboardControlSystem);
        let entity = player(&mut registry);
        registry.update();

        press(&mut registry, KeyInputEvent::released(Key::Up));
        press(&mut registry, KeyInputEvent::pressed(Key::Space));
        assert_eq!(
            registry.get_component::<RigidBody>(entity).unwrap().velocity,
            Vec2::ZERO
        );
    }
}
