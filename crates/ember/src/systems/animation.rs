//! Sprite-sheet animation.

use ember_core::{Entity, Registry, Signature, System};
use ember_shared::{Animation, Sprite};

/// Advances [`Animation`] frames from the engine clock and points the
/// sprite's source rectangle at the current frame.
#[derive(Debug, Default)]
pub struct AnimationSystem;

impl System for AnimationSystem {
    fn signature(&self) -> Signature {
        Signature::new().with::<Sprite>().with::<Animation>()
    }
}

impl AnimationSystem {
    /// Selects frames for the clock reading `elapsed_ms`.
    pub fn update(&mut self, entities: &[Entity], registry: &mut Registry, elapsed_ms: u64) {
        for &entity in entities {
            let Ok(animation) = registry.get_component_mut::<Animation>(entity) else {
                continue;
            };
            let frame = frame_at(animation, elapsed_ms);
            animation.current_frame = frame;

            if let Ok(sprite) = registry.get_component_mut::<Sprite>(entity) {
                sprite.src_rect.x = (frame * sprite.width) as f32;
            }
        }
    }
}

fn frame_at(animation: &Animation, elapsed_ms: u64) -> u32 {
    if animation.num_frames == 0 {
        return 0;
    }
    let running = elapsed_ms.saturating_sub(animation.start_time_ms);
    let ticks = running * u64::from(animation.frame_rate) / 1000;
    let frames = u64::from(animation.num_frames);
    let frame = if animation.looping {
        ticks % frames
    } else {
        ticks.min(frames - 1)
    };
    // `frame < num_frames`, which is a u32.
    u32::try_from(frame).unwrap_or(animation.num_frames - 1)
}
