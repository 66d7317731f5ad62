//! Camera tracking.

use ember_core::{Entity, Registry, Signature, System};
use ember_shared::{CameraFollow, Rect, Transform};

use super::WorldBounds;

/// Centres the camera on the followed entity, kept inside the map.
#[derive(Debug, Default)]
pub struct CameraFollowSystem;

impl System for CameraFollowSystem {
    fn signature(&self) -> Signature {
        Signature::new().with::<CameraFollow>().with::<Transform>()
    }
}

impl CameraFollowSystem {
    /// Moves `camera` to the last followed entity. The camera size is left
    /// as is.
    pub fn update(
        &mut self,
        entities: &[Entity],
        registry: &Registry,
        camera: &mut Rect,
        bounds: WorldBounds,
    ) {
        for &entity in entities {
            let Ok(transform) = registry.get_component::<Transform>(entity) else {
                continue;
            };
            let max_x = (bounds.map_width - camera.w).max(0.0);
            let max_y = (bounds.map_height - camera.h).max(0.0);
            camera.x = (transform.position.x - camera.w / 2.0).clamp(0.0, max_x);
            camera.y = (transform.position.y - camera.h / 2.0).clamp(0.0, max_y);
        }
    }
}
