//! Render-key producers.
//!
//! These run after the commit and only fill the [`RenderQueue`]; sorting and
//! drawing belong to the frame driver and [`crate::draw`].

use ember_core::{Entity, Registry, RenderQueue, RenderableKind, Signature, System};
use ember_shared::{Rect, Sprite, SquarePrimitive, TextLabel, Transform};

use super::WorldBounds;

/// Queues visible sprites, keyed by `(layer, y, Sprite)`.
///
/// World sprites outside the camera are culled; fixed sprites are culled
/// against the window.
#[derive(Debug, Default)]
pub struct RenderSpriteSystem;

impl System for RenderSpriteSystem {
    fn signature(&self) -> Signature {
        Signature::new().with::<Transform>().with::<Sprite>()
    }
}

impl RenderSpriteSystem {
    /// Pushes one key per visible sprite and returns how many were culled.
    pub fn update(
        &mut self,
        entities: &[Entity],
        registry: &Registry,
        queue: &mut RenderQueue,
        camera: Rect,
        bounds: WorldBounds,
    ) -> usize {
        let window = Rect::new(0.0, 0.0, bounds.window_width, bounds.window_height);
        let mut culled = 0;

        for &entity in entities {
            let (Ok(transform), Ok(sprite)) = (
                registry.get_component::<Transform>(entity),
                registry.get_component::<Sprite>(entity),
            ) else {
                continue;
            };
            let size = sprite.scaled_size(transform.scale);
            let footprint = Rect::new(transform.position.x, transform.position.y, size.x, size.y);
            let view = if sprite.is_fixed { window } else { camera };
            if !footprint.intersects(view) {
                culled += 1;
                continue;
            }
            queue.add_key(sprite.layer, transform.position.y, RenderableKind::Sprite, entity);
        }
        culled
    }
}

/// Queues text labels, keyed by `(layer, y, Text)`.
#[derive(Debug, Default)]
pub struct RenderTextSystem;

impl System for RenderTextSystem {
    fn signature(&self) -> Signature {
        Signature::new().with::<TextLabel>()
    }
}

impl RenderTextSystem {
    /// Pushes one key per label.
    pub fn update(&mut self, entities: &[Entity], registry: &Registry, queue: &mut RenderQueue) {
        for &entity in entities {
            if let Ok(label) = registry.get_component::<TextLabel>(entity) {
                queue.add_key(label.layer, label.position.y, RenderableKind::Text, entity);
            }
        }
    }
}

/// Queues filled rectangles, keyed by `(layer, y, SquarePrimitive)`.
#[derive(Debug, Default)]
pub struct RenderPrimitiveSystem;

impl System for RenderPrimitiveSystem {
    fn signature(&self) -> Signature {
        Signature::new().with::<SquarePrimitive>()
    }
}

impl RenderPrimitiveSystem {
    /// Pushes one key per rectangle.
    pub fn update(&mut self, entities: &[Entity], registry: &Registry, queue: &mut RenderQueue) {
        for &entity in entities {
            if let Ok(square) = registry.get_component::<SquarePrimitive>(entity) {
                queue.add_key(
                    square.layer,
                    square.position.y,
                    RenderableKind::SquarePrimitive,
                    entity,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_shared::Vec2;

    const BOUNDS: WorldBounds = WorldBounds::new(2000.0, 2000.0, 800.0, 600.0);

    fn sprite_at(registry: &mut Registry, position: Vec2, sprite: Sprite) -> Entity {
        let entity = registry.create_entity();
        registry.add_component(entity, Transform::at(position)).unwrap();
        registry.add_component(entity, sprite).unwrap();
        entity
    }

    #[test]
    fn test_sprites_outside_camera_are_culled() {
        let mut registry = Registry::new();
        registry.add_system(RenderSpriteSystem);
        let visible = sprite_at(&mut registry, Vec2::new(900.0, 100.0), Sprite::new("tank-image", 32, 32, 1));
        let _hidden = sprite_at(&mut registry, Vec2::new(10.0, 10.0), Sprite::new("tank-image", 32, 32, 1));
        let hud = sprite_at(
            &mut registry,
            Vec2::new(700.0, 10.0),
            Sprite::new("radar-image", 64, 64, 5).fixed(),
        );
        registry.update();

        let camera = Rect::new(800.0, 0.0, 800.0, 600.0);
        let mut queue = RenderQueue::new();
        let culled = registry
            .run_system::<RenderSpriteSystem, _, _>(|system, entities, registry| {
                system.update(entities, registry, &mut queue, camera, BOUNDS)
            })
            .unwrap();
        queue.sort();

        assert_eq!(culled, 1);
        let drawn: Vec<Entity> = queue.iter().map(|key| key.entity).collect();
        assert_eq!(drawn, vec![visible, hud]);
    }

    #[test]
    fn test_tracker_keys_order_bar_before_label() {
        let mut registry = Registry::new();
        registry.add_system(RenderTextSystem);
        registry.add_system(RenderPrimitiveSystem);
        let tracker = registry.create_entity();
        registry
            .add_component(tracker, TextLabel { layer: 3, ..TextLabel::default() })
            .unwrap();
        registry
            .add_component(tracker, SquarePrimitive { layer: 3, ..SquarePrimitive::default() })
            .unwrap();
        registry.update();

        let mut queue = RenderQueue::new();
        registry
            .run_system::<RenderTextSystem, _, _>(|system, entities, registry| {
                system.update(entities, registry, &mut queue);
            })
            .unwrap();
        registry
            .run_system::<RenderPrimitiveSystem, _, _>(|system, entities, registry| {
                system.update(entities, registry, &mut queue);
            })
            .unwrap();
        queue.sort();

        let kinds: Vec<RenderableKind> = queue.iter().map(|key| key.kind).collect();
        assert_eq!(kinds, vec![RenderableKind::SquarePrimitive, RenderableKind::Text]);
    }
}
