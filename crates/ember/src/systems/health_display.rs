//! Floating health bars.

use std::collections::HashMap;

use ember_core::{EcsResult, Entity, Registry, Signature, System};
use ember_shared::{Color, Health, Sprite, SquarePrimitive, TextLabel, Transform, Vec2};

const LABEL_FONT: &str = "charriot-font";
const LABEL_OFFSET: f32 = 25.0;
const BAR_OFFSET: f32 = 5.0;
const BAR_HEIGHT: u32 = 5;
const TRACKER_LAYER: i32 = 10;

/// Colour of a health readout: green above 66%, yellow above 33%, red
/// otherwise.
#[must_use]
pub fn health_color(fraction: f32) -> Color {
    if fraction > 0.66 {
        Color::GREEN
    } else if fraction > 0.33 {
        Color::YELLOW
    } else {
        Color::RED
    }
}

/// Keeps one tracker entity per [`Health`] owner: a percentage label and a
/// bar drawn just above the owner.
///
/// Trackers are plain entities with a [`TextLabel`] and a
/// [`SquarePrimitive`]; they are destroyed with their owner, or as soon as
/// the owner stops matching (loses its health or transform).
#[derive(Debug, Default)]
pub struct DisplayHealthSystem {
    trackers: HashMap<Entity, Entity>,
}

impl System for DisplayHealthSystem {
    fn signature(&self) -> Signature {
        Signature::new().with::<Health>().with::<Transform>()
    }
}

impl DisplayHealthSystem {
    /// Tracker entity for `owner`, if one exists.
    #[must_use]
    pub fn tracker_of(&self, owner: Entity) -> Option<Entity> {
        self.trackers.get(&owner).copied()
    }

    /// Number of live trackers.
    #[must_use]
    pub fn tracker_count(&self) -> usize {
        self.trackers.len()
    }

    /// Refreshes every tracker and drops those whose owner is gone or no
    /// longer in `entities`.
    ///
    /// # Errors
    ///
    /// Propagates registry errors from creating or updating trackers.
    pub fn update(&mut self, entities: &[Entity], registry: &mut Registry) -> EcsResult<()> {
        for &owner in entities {
            if registry.is_pending_destroy(owner) {
                continue;
            }
            let Ok(&health) = registry.get_component::<Health>(owner) else {
                continue;
            };
            let Ok(&transform) = registry.get_component::<Transform>(owner) else {
                continue;
            };
            let fraction = health.fraction().clamp(0.0, 1.0);
            let full_width = registry
                .get_component::<Sprite>(owner)
                .map_or(100.0, |sprite| sprite.width as f32 * transform.scale.x);

            let tracker = match self.trackers.get(&owner) {
                Some(&tracker) if registry.is_alive(tracker) => tracker,
                _ => {
                    let tracker = registry.create_entity();
                    tracing::debug!(
                        owner = owner.id(),
                        tracker = tracker.id(),
                        "health tracker created"
                    );
                    self.trackers.insert(owner, tracker);
                    tracker
                }
            };

            let color = health_color(fraction);
            let origin = transform.position;
            registry.add_component(
                tracker,
                TextLabel {
                    position: Vec2::new(origin.x, origin.y - LABEL_OFFSET),
                    layer: TRACKER_LAYER,
                    text: format!("{}%", (fraction * 100.0).round() as u32),
                    font_id: LABEL_FONT.to_owned(),
                    color,
                    is_fixed: false,
                },
            )?;
            registry.add_component(
                tracker,
                SquarePrimitive {
                    position: Vec2::new(origin.x, origin.y - BAR_OFFSET),
                    layer: TRACKER_LAYER,
                    width: (full_width * fraction).round() as u32,
                    height: BAR_HEIGHT,
                    color,
                    is_fixed: false,
                },
            )?;
        }

        let orphaned: Vec<Entity> = self
            .trackers
            .keys()
            .copied()
            .filter(|owner| !entities.contains(owner) || registry.is_pending_destroy(*owner))
            .collect();
        for owner in orphaned {
            if let Some(tracker) = self.trackers.remove(&owner) {
                registry.destroy_entity(tracker).ok();
            }
        }
        Ok(())
    }
}
