//! # Draw Planning
//!
//! Turns a sorted [`RenderQueue`] into backend-neutral [`DrawCommand`]s with
//! screen-space rectangles. A windowing backend implements
//! [`RenderBackend`]; the headless runner and tests use
//! [`RecordingBackend`].

use ember_core::{Entity, Registry, RenderQueue, RenderableKind};
use ember_shared::{
    BoxCollider, Color, Flip, Rect, Sprite, SquarePrimitive, TextLabel, Transform, Vec2,
};

/// One primitive for the backend, in screen space.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Textured quad.
    Sprite {
        /// Texture id.
        asset_id: String,
        /// Region of the texture.
        src: Rect,
        /// Destination on screen.
        dst: Rect,
        /// Degrees clockwise.
        rotation: f32,
        /// Mirroring.
        flip: Flip,
    },
    /// Filled rectangle.
    Square {
        /// Destination on screen.
        dst: Rect,
        /// Fill.
        color: Color,
    },
    /// Text with its top-left corner at `position`.
    Text {
        /// Contents.
        text: String,
        /// Font id.
        font_id: String,
        /// Top-left corner on screen.
        position: Vec2,
        /// Colour.
        color: Color,
    },
    /// Debug outline of a collision box.
    ColliderOutline {
        /// Box on screen.
        dst: Rect,
        /// Outline colour.
        color: Color,
    },
}

/// Commands for one frame, in draw order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawPlan {
    commands: Vec<DrawCommand>,
}

impl DrawPlan {
    /// The commands.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True if nothing is drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Hands every command to `backend`, bracketed by begin/end frame.
    pub fn submit(&self, backend: &mut dyn RenderBackend) {
        backend.begin_frame();
        for command in &self.commands {
            backend.draw(command);
        }
        backend.end_frame();
    }
}

/// Seam for a real renderer.
pub trait RenderBackend {
    /// Called before the first command of a frame.
    fn begin_frame(&mut self) {}

    /// Draws one command.
    fn draw(&mut self, command: &DrawCommand);

    /// Called after the last command of a frame.
    fn end_frame(&mut self) {}
}

/// Backend that keeps what it was asked to draw.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    /// Commands of the most recent frame.
    pub commands: Vec<DrawCommand>,
    /// Frames completed.
    pub frames: u64,
}

impl RenderBackend for RecordingBackend {
    fn begin_frame(&mut self) {
        self.commands.clear();
    }

    fn draw(&mut self, command: &DrawCommand) {
        self.commands.push(command.clone());
    }

    fn end_frame(&mut self) {
        self.frames += 1;
    }
}

const COLLIDER_COLOR: Color = Color::RED;

/// Walks `queue` in order and resolves each key against the registry.
///
/// World-space drawables are shifted by the camera; fixed ones are not.
/// Keys whose entity lost the component since queuing are skipped. With
/// `show_colliders`, collider outlines are appended on top.
#[must_use]
pub fn plan_frame(
    queue: &RenderQueue,
    registry: &Registry,
    camera: Rect,
    show_colliders: bool,
) -> DrawPlan {
    if !queue.is_sorted() {
        tracing::warn!(keys = queue.len(), "planning an unsorted render queue");
    }

    let mut commands = Vec::with_capacity(queue.len());
    for key in queue {
        let command = match key.kind {
            RenderableKind::Sprite => plan_sprite(registry, key.entity, camera),
            RenderableKind::SquarePrimitive => plan_square(registry, key.entity, camera),
            RenderableKind::Text => plan_text(registry, key.entity, camera),
        };
        if let Some(command) = command {
            commands.push(command);
        }
    }

    if show_colliders {
        commands.extend(registry.entities().filter_map(|entity| {
            let transform = registry.get_component::<Transform>(entity).ok()?;
            let collider = registry.get_component::<BoxCollider>(entity).ok()?;
            let bounds = collider.bounds(transform);
            Some(DrawCommand::ColliderOutline {
                dst: to_screen(bounds, camera, false),
                color: COLLIDER_COLOR,
            })
        }));
    }

    DrawPlan { commands }
}

fn to_screen(rect: Rect, camera: Rect, is_fixed: bool) -> Rect {
    if is_fixed {
        rect
    } else {
        Rect::new(rect.x - camera.x, rect.y - camera.y, rect.w, rect.h)
    }
}

fn plan_sprite(registry: &Registry, entity: Entity, camera: Rect) -> Option<DrawCommand> {
    let transform = registry.get_component::<Transform>(entity).ok()?;
    let sprite = registry.get_component::<Sprite>(entity).ok()?;
    let size = sprite.scaled_size(transform.scale);
    let world = Rect::new(transform.position.x, transform.position.y, size.x, size.y);
    Some(DrawCommand::Sprite {
        asset_id: sprite.asset_id.clone(),
        src: sprite.src_rect,
        dst: to_screen(world, camera, sprite.is_fixed),
        rotation: transform.rotation,
        flip: sprite.flip,
    })
}

fn plan_square(registry: &Registry, entity: Entity, camera: Rect) -> Option<DrawCommand> {
    let square = registry.get_component::<SquarePrimitive>(entity).ok()?;
    let world = Rect::new(
        square.position.x,
        square.position.y,
        square.width as f32,
        square.height as f32,
    );
    Some(DrawCommand::Square {
        dst: to_screen(world, camera, square.is_fixed),
        color: square.color,
    })
}

fn plan_text(registry: &Registry, entity: Entity, camera: Rect) -> Option<DrawCommand> {
    let label = registry.get_component::<TextLabel>(entity).ok()?;
    let anchor = to_screen(
        Rect::new(label.position.x, label.position.y, 0.0, 0.0),
        camera,
        label.is_fixed,
    );
    Some(DrawCommand::Text {
        text: label.text.clone(),
        font_id: label.font_id.clone(),
        position: Vec2::new(anchor.x, anchor.y),
        color: label.color,
    })
}
