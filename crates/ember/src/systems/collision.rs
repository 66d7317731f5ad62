//! Pairwise box-collider overlap detection.

use ember_core::{Entity, EventBus, Registry, Signature, System};
use ember_shared::{BoxCollider, CollisionEvent, Rect, Transform};

/// Tests every pair of colliders once per tick and emits a
/// [`CollisionEvent`] for each overlapping pair.
#[derive(Debug, Default)]
pub struct CollisionSystem;

impl System for CollisionSystem {
    fn signature(&self) -> Signature {
        Signature::new().with::<Transform>().with::<BoxCollider>()
    }
}

impl CollisionSystem {
    /// Emits collisions for this tick and returns how many pairs overlapped.
    ///
    /// Boxes that only touch along an edge collide.
    pub fn update(
        &mut self,
        entities: &[Entity],
        registry: &mut Registry,
        bus: &mut EventBus,
    ) -> usize {
        let boxes: Vec<(Entity, Rect)> = entities
            .iter()
            .filter_map(|&entity| {
                let transform = registry.get_component::<Transform>(entity).ok()?;
                let collider = registry.get_component::<BoxCollider>(entity).ok()?;
                Some((entity, collider.bounds(transform)))
            })
            .collect();

        let mut hits = 0;
        for (i, &(a, a_box)) in boxes.iter().enumerate() {
            for &(b, b_box) in &boxes[i + 1..] {
                if a_box.intersects(b_box) {
                    hits += 1;
                    tracing::trace!(a = a.id(), b = b.id(), "collision");
                    bus.emit(registry, CollisionEvent { a, b });
                }
            }
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_shared::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn boxed(registry: &mut Registry, x: f32, y: f32) -> Entity {
        let entity = registry.create_entity();
        registry.add_component(entity, Transform::at(Vec2::new(x, y))).unwrap();
        registry.add_component(entity, BoxCollider::new(10, 10)).unwrap();
        entity
    }

    #[test]
    fn test_emits_one_event_per_overlapping_pair() {
        let mut registry = Registry::new();
        registry.add_system(CollisionSystem);
        let a = boxed(&mut registry, 0.0, 0.0);
        let b = boxed(&mut registry, 5.0, 5.0);
        let _far = boxed(&mut registry, 100.0, 100.0);
        registry.update();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut bus: EventBus = EventBus::new();
        bus.subscribe(move |_: &mut Registry, event: &CollisionEvent| {
            sink.borrow_mut().push((event.a, event.b));
        });

        let hits = registry
            .run_system::<CollisionSystem, _, _>(|system, entities, registry| {
                system.update(entities, registry, &mut bus)
            })
            .unwrap();

        assert_eq!(hits, 1);
        assert_eq!(*seen.borrow(), vec![(a, b)]);
    }

    #[test]
    fn test_touching_edges_collide() {
        let mut registry = Registry::new();
        registry.add_system(CollisionSystem);
        boxed(&mut registry, 0.0, 0.0);
        boxed(&mut registry, 10.0, 0.0);
        registry.update();

        let mut bus: EventBus = EventBus::new();
        let hits = registry
            .run_system::<CollisionSystem, _, _>(|system, entities, registry| {
                system.update(entities, registry, &mut bus)
            })
            .unwrap();
        assert_eq!(hits, 1);
    }
}
