//! Per-entity script callbacks and the keyboard state they read.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use ember_core::{Entity, Registry, Signature, System};
use ember_shared::{Key, KeyInputEvent, Script, Sprite, Transform, Vec2};

#[derive(Debug, Default)]
struct KeySets {
    /// Went down since the last script tick.
    pressed: HashSet<Key>,
    /// Currently down.
    held: HashSet<Key>,
}

/// Shared view of the keyboard for script callbacks.
///
/// Cloning is cheap and every clone sees the same state. Keys are looked up
/// by name (see [`Key::name`]); `"ctrl"`, `"shift"` and `"alt"` match either
/// side.
#[derive(Clone, Debug, Default)]
pub struct KeyboardState {
    keys: Rc<RefCell<KeySets>>,
}

impl KeyboardState {
    /// Whether `name` went down since the last script tick.
    #[must_use]
    pub fn is_pressed(&self, name: &str) -> bool {
        let keys = self.keys.borrow();
        resolve(name).iter().any(|key| keys.pressed.contains(key))
    }

    /// Whether `name` is down right now.
    #[must_use]
    pub fn is_held(&self, name: &str) -> bool {
        let keys = self.keys.borrow();
        resolve(name).iter().any(|key| keys.held.contains(key))
    }

    fn record(&self, event: &KeyInputEvent) {
        let mut keys = self.keys.borrow_mut();
        if event.pressed {
            keys.pressed.insert(event.key);
            keys.held.insert(event.key);
        } else {
            keys.held.remove(&event.key);
        }
    }

    fn end_tick(&self) {
        self.keys.borrow_mut().pressed.clear();
    }
}

fn resolve(name: &str) -> Vec<Key> {
    match name.trim().to_lowercase().as_str() {
        "ctrl" => vec![Key::LeftCtrl, Key::RightCtrl],
        "shift" => vec![Key::LeftShift, Key::RightShift],
        "alt" => vec![Key::LeftAlt, Key::RightAlt],
        other => Key::from_name(other).into_iter().collect(),
    }
}

/// Runs every entity's [`Script`] once per tick.
#[derive(Debug, Default)]
pub struct ScriptSystem {
    keyboard: KeyboardState,
}

impl System for ScriptSystem {
    fn signature(&self) -> Signature {
        Signature::new().with::<Script>()
    }
}

impl ScriptSystem {
    /// Creates a script system reading `keyboard`.
    #[must_use]
    pub fn new(keyboard: KeyboardState) -> Self {
        Self { keyboard }
    }

    /// Handle for script callbacks to capture.
    #[must_use]
    pub fn keyboard(&self) -> KeyboardState {
        self.keyboard.clone()
    }

    /// Key handler.
    pub fn on_key_input(
        &mut self,
        _entities: &[Entity],
        _registry: &mut Registry,
        event: &KeyInputEvent,
    ) {
        self.keyboard.record(event);
    }

    /// Invokes each script with `(registry, entity, delta_seconds,
    /// elapsed_ms)`, then forgets this tick's key presses.
    pub fn update(
        &mut self,
        entities: &[Entity],
        registry: &mut Registry,
        delta_seconds: f64,
        elapsed_ms: u64,
    ) {
        for &entity in entities {
            let Ok(update) = registry
                .get_component::<Script>(entity)
                .map(|script| Rc::clone(&script.update))
            else {
                continue;
            };
            update(registry, entity, delta_seconds, elapsed_ms);
        }
        self.keyboard.end_tick();
    }
}

/// Position of `entity`, logging an error if it has no [`Transform`].
pub fn position(registry: &Registry, entity: Entity) -> Option<Vec2> {
    match registry.get_component::<Transform>(entity) {
        Ok(transform) => Some(transform.position),
        Err(err) => {
            tracing::error!(entity = entity.id(), error = %err, "script read a missing transform");
            None
        }
    }
}

/// Moves `entity`. Returns `false` (and logs) if it has no [`Transform`].
pub fn set_position(registry: &mut Registry, entity: Entity, position: Vec2) -> bool {
    match registry.get_component_mut::<Transform>(entity) {
        Ok(transform) => {
            transform.position = position;
            true
        }
        Err(err) => {
            tracing::error!(entity = entity.id(), error = %err, "script moved a missing transform");
            false
        }
    }
}

/// Points `entity`'s sprite at `(x, y)` in its texture. Returns `false`
/// (and logs) if it has no [`Sprite`].
pub fn set_sprite_src_rect(registry: &mut Registry, entity: Entity, x: f32, y: f32) -> bool {
    match registry.get_component_mut::<Sprite>(entity) {
        Ok(sprite) => {
            sprite.src_rect.x = x;
            sprite.src_rect.y = y;
            true
        }
        Err(err) => {
            tracing::error!(entity = entity.id(), error = %err, "script changed a missing sprite");
            false
        }
    }
}
