//! # Frame Driver
//!
//! One call to [`Game::tick`] runs a whole frame:
//! ```text
//! Frame N:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. EVENT BUS                                                        │
//! │    └─ Reset, then every handler subscribes again                    │
//! │                                                                     │
//! │ 2. INPUT                                                            │
//! │    ├─ Escape quits, F5 toggles collider outlines                    │
//! │    └─ Queued key and mouse events are emitted                       │
//! │                                                                     │
//! │ 3. LOGIC                                                            │
//! │    ├─ Movement, animation                                           │
//! │    ├─ Collision (damage and bounces run as handlers)                │
//! │    ├─ Camera, projectile emit, projectile lifecycle                 │
//! │    └─ Health display, scripts                                       │
//! │                                                                     │
//! │ 4. COMMIT                                                           │
//! │    └─ Registry::update applies this frame's creates and destroys    │
//! │                                                                     │
//! │ 5. RENDER                                                           │
//! │    └─ Sprite, primitive and text keys, then one stable sort         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//! Time is passed in; no system reads a clock. [`Game::draw`] turns the
//! sorted queue into commands for a [`RenderBackend`].

use std::path::Path;
use std::time::Instant;

use ember_core::{EcsResult, EventBus, Registry, RenderQueue};
use ember_shared::{CollisionEvent, Key, KeyInputEvent, MouseInputEvent, Rect};

use crate::config::EngineConfig;
use crate::draw::{plan_frame, DrawPlan, RenderBackend};
use crate::error::GameResult;
use crate::level::{LevelDescription, LevelInfo};
use crate::systems::{
    AnimationSystem, CameraFollowSystem, CollisionSystem, DamageSystem, DisplayHealthSystem,
    KeyboardControlSystem, KeyboardState, MovementSystem, ProjectileEmitSystem,
    ProjectileLifecycleSystem, RenderPrimitiveSystem, RenderSpriteSystem, RenderTextSystem,
    ScriptSystem, WorldBounds,
};

/// What one frame did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame number.
    pub frame: u64,
    /// Wall time of the whole tick in microseconds.
    pub total_us: u64,
    /// Input and logic time in microseconds.
    pub logic_us: u64,
    /// Commit time in microseconds.
    pub commit_us: u64,
    /// Render-key production and sort time in microseconds.
    pub render_us: u64,
    /// Input event deliveries.
    pub events_dispatched: usize,
    /// Overlapping collider pairs.
    pub collisions: usize,
    /// Entities committed this frame.
    pub entities_added: usize,
    /// Entities destroyed this frame.
    pub entities_removed: usize,
    /// Keys in the render queue.
    pub render_keys: usize,
    /// Sprites culled against the camera.
    pub culled: usize,
}

/// Owns the registry, the event bus, the render queue and the camera, and
/// runs systems in a fixed order.
pub struct Game {
    config: EngineConfig,
    registry: Registry,
    bus: EventBus,
    queue: RenderQueue,
    camera: Rect,
    bounds: WorldBounds,
    keyboard: KeyboardState,
    pending_keys: Vec<KeyInputEvent>,
    pending_mouse: Vec<MouseInputEvent>,
    show_colliders: bool,
    running: bool,
    frame_count: u64,
    stats: FrameStatsAccumulator,
}

impl Game {
    /// Creates a game with every system registered and an empty world.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let keyboard = KeyboardState::default();
        let mut registry = Registry::with_config(config.registry);
        registry.add_system(MovementSystem);
        registry.add_system(AnimationSystem);
        registry.add_system(CollisionSystem);
        registry.add_system(DamageSystem);
        registry.add_system(KeyboardControlSystem);
        registry.add_system(CameraFollowSystem);
        registry.add_system(ProjectileEmitSystem::default());
        registry.add_system(ProjectileLifecycleSystem);
        registry.add_system(DisplayHealthSystem::default());
        registry.add_system(ScriptSystem::new(keyboard.clone()));
        registry.add_system(RenderSpriteSystem);
        registry.add_system(RenderTextSystem);
        registry.add_system(RenderPrimitiveSystem);

        let window_width = config.window.width as f32;
        let window_height = config.window.height as f32;
        tracing::info!(
            systems = registry.system_count(),
            width = config.window.width,
            height = config.window.height,
            "game created"
        );

        Self {
            registry,
            bus: EventBus::new(),
            queue: RenderQueue::with_capacity(config.render_queue_capacity),
            camera: Rect::new(0.0, 0.0, window_width, window_height),
            bounds: WorldBounds::new(window_width, window_height, window_width, window_height),
            keyboard,
            pending_keys: Vec::new(),
            pending_mouse: Vec::new(),
            show_colliders: config.debug.show_colliders,
            running: true,
            frame_count: 0,
            stats: FrameStatsAccumulator::new(config.target_fps),
            config,
        }
    }

    /// Spawns `level` and adopts its map size. The entities appear after the
    /// next tick's commit.
    ///
    /// # Errors
    ///
    /// Whatever [`LevelDescription::spawn`] reports; the error is logged.
    /// An invalid description spawns nothing. Entities spawned before a
    /// registry failure stay.
    pub fn load_level(&mut self, level: &LevelDescription, now_ms: u64) -> GameResult<LevelInfo> {
        let info = level.spawn(&mut self.registry, now_ms).inspect_err(|err| {
            tracing::error!(error = %err, "level load aborted");
        })?;
        if let Some(size) = info.map_size {
            self.bounds.map_width = size.x;
            self.bounds.map_height = size.y;
        }
        Ok(info)
    }

    /// Reads, validates and spawns a level file.
    ///
    /// # Errors
    ///
    /// I/O, parse, validation or spawn failure; logged before returning.
    pub fn load_level_file(&mut self, path: impl AsRef<Path>, now_ms: u64) -> GameResult<LevelInfo> {
        let path = path.as_ref();
        let level = LevelDescription::from_file(path).inspect_err(|err| {
            tracing::error!(path = %path.display(), error = %err, "level load aborted");
        })?;
        self.load_level(&level, now_ms)
    }

    /// Queues a key event for the next tick.
    pub fn queue_key(&mut self, event: KeyInputEvent) {
        self.pending_keys.push(event);
    }

    /// Queues a mouse event for the next tick.
    pub fn queue_mouse(&mut self, event: MouseInputEvent) {
        self.pending_mouse.push(event);
    }

    /// Runs one frame. `delta_seconds` drives movement; `elapsed_ms` is the
    /// engine clock for animations, emitters and projectile lifetimes.
    pub fn tick(&mut self, delta_seconds: f64, elapsed_ms: u64) -> FrameStats {
        let frame_start = Instant::now();
        let mut stats = FrameStats {
            frame: self.frame_count,
            ..FrameStats::default()
        };

        self.bus.reset();
        subscribe_handlers(&mut self.bus);
        stats.events_dispatched = self.dispatch_input();

        self.run_logic(delta_seconds, elapsed_ms, &mut stats);
        let logic_done = Instant::now();

        let commit = self.registry.update();
        stats.entities_added = commit.added;
        stats.entities_removed = commit.removed;
        let commit_done = Instant::now();

        self.queue.clear();
        self.produce_render_keys(&mut stats);
        self.queue.sort();
        stats.render_keys = self.queue.len();

        let end = Instant::now();
        stats.logic_us = micros(logic_done - frame_start);
        stats.commit_us = micros(commit_done - logic_done);
        stats.render_us = micros(end - commit_done);
        stats.total_us = micros(end - frame_start);

        self.frame_count += 1;
        self.stats.record(stats);
        tracing::trace!(
            frame = stats.frame,
            entities = self.registry.entity_count(),
            render_keys = stats.render_keys,
            total_us = stats.total_us,
            "frame"
        );
        stats
    }

    fn dispatch_input(&mut self) -> usize {
        let mut delivered = 0;
        for event in std::mem::take(&mut self.pending_keys) {
            if event.pressed {
                match event.key {
                    Key::Escape => {
                        tracing::info!("quit requested");
                        self.running = false;
                    }
                    Key::F5 => {
                        self.show_colliders = !self.show_colliders;
                        tracing::debug!(show_colliders = self.show_colliders, "toggled colliders");
                    }
                    _ => {}
                }
            }
            delivered += self.bus.emit(&mut self.registry, event);
        }
        for event in std::mem::take(&mut self.pending_mouse) {
            delivered += self.bus.emit(&mut self.registry, event);
        }
        delivered
    }

    fn run_logic(&mut self, delta_seconds: f64, elapsed_ms: u64, stats: &mut FrameStats) {
        let bounds = self.bounds;
        let registry = &mut self.registry;

        report(
            "movement",
            registry.run_system::<MovementSystem, _, _>(|system, entities, registry| {
                system.update(entities, registry, delta_seconds, bounds);
            }),
        );
        report(
            "animation",
            registry.run_system::<AnimationSystem, _, _>(|system, entities, registry| {
                system.update(entities, registry, elapsed_ms);
            }),
        );

        let bus = &mut self.bus;
        stats.collisions = report(
            "collision",
            registry.run_system::<CollisionSystem, _, _>(|system, entities, registry| {
                system.update(entities, registry, bus)
            }),
        )
        .unwrap_or(0);

        let camera = &mut self.camera;
        report(
            "camera follow",
            registry.run_system::<CameraFollowSystem, _, _>(|system, entities, registry| {
                system.update(entities, registry, camera, bounds);
            }),
        );
        report(
            "projectile emit",
            registry
                .run_system::<ProjectileEmitSystem, _, _>(|system, entities, registry| {
                    system.update(entities, registry, elapsed_ms)
                })
                .and_then(|fired| fired),
        );
        report(
            "projectile lifecycle",
            registry.run_system::<ProjectileLifecycleSystem, _, _>(|system, entities, registry| {
                system.update(entities, registry, elapsed_ms)
            }),
        );
        report(
            "health display",
            registry
                .run_system::<DisplayHealthSystem, _, _>(|system, entities, registry| {
                    system.update(entities, registry)
                })
                .and_then(|refreshed| refreshed),
        );
        report(
            "script",
            registry.run_system::<ScriptSystem, _, _>(|system, entities, registry| {
                system.update(entities, registry, delta_seconds, elapsed_ms);
            }),
        );
    }

    fn produce_render_keys(&mut self, stats: &mut FrameStats) {
        let (camera, bounds) = (self.camera, self.bounds);
        let queue = &mut self.queue;
        let registry = &mut self.registry;

        stats.culled = report(
            "render sprite",
            registry.run_system::<RenderSpriteSystem, _, _>(|system, entities, registry| {
                system.update(entities, registry, queue, camera, bounds)
            }),
        )
        .unwrap_or(0);
        report(
            "render primitive",
            registry.run_system::<RenderPrimitiveSystem, _, _>(|system, entities, registry| {
                system.update(entities, registry, queue);
            }),
        );
        report(
            "render text",
            registry.run_system::<RenderTextSystem, _, _>(|system, entities, registry| {
                system.update(entities, registry, queue);
            }),
        );
    }

    /// Draw commands for the last ticked frame.
    #[must_use]
    pub fn plan(&self) -> DrawPlan {
        plan_frame(&self.queue, &self.registry, self.camera, self.show_colliders)
    }

    /// Plans the last ticked frame and submits it to `backend`.
    pub fn draw(&self, backend: &mut dyn RenderBackend) {
        self.plan().submit(backend);
    }

    /// Keyboard handle for script callbacks.
    #[must_use]
    pub fn keyboard(&self) -> KeyboardState {
        self.keyboard.clone()
    }

    /// The registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The registry, for spawning from code.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Render keys of the last ticked frame, sorted.
    #[must_use]
    pub fn render_queue(&self) -> &RenderQueue {
        &self.queue
    }

    /// Current camera rectangle in world space.
    #[must_use]
    pub const fn camera(&self) -> Rect {
        self.camera
    }

    /// Map and window extents.
    #[must_use]
    pub const fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// False once Escape was pressed.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Whether collider outlines are planned.
    #[must_use]
    pub const fn show_colliders(&self) -> bool {
        self.show_colliders
    }

    /// Frames ticked so far.
    #[inline]
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Accumulated statistics.
    #[must_use]
    pub const fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats
    }
}

fn subscribe_handlers(bus: &mut EventBus) {
    bus.subscribe_system::<DamageSystem, CollisionEvent, _>(DamageSystem::on_collision);
    bus.subscribe_system::<MovementSystem, CollisionEvent, _>(MovementSystem::on_collision);
    bus.subscribe_system::<KeyboardControlSystem, KeyInputEvent, _>(
        KeyboardControlSystem::on_key_input,
    );
    bus.subscribe_system::<ProjectileEmitSystem, KeyInputEvent, _>(
        ProjectileEmitSystem::on_key_input,
    );
    bus.subscribe_system::<ScriptSystem, KeyInputEvent, _>(ScriptSystem::on_key_input);
}

fn report<T>(stage: &'static str, result: EcsResult<T>) -> Option<T> {
    result
        .inspect_err(|err| tracing::error!(stage, error = %err, "system failed"))
        .ok()
}

fn micros(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// Accumulator for frame statistics.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Frame budget in microseconds.
    pub budget_us: u64,
    /// Total frames recorded.
    pub frames_recorded: u64,
    /// Sum of total frame times.
    pub total_us_sum: u64,
    /// Sum of logic times.
    pub logic_us_sum: u64,
    /// Sum of commit times.
    pub commit_us_sum: u64,
    /// Sum of render times.
    pub render_us_sum: u64,
    /// Min frame time.
    pub min_frame_us: u64,
    /// Max frame time.
    pub max_frame_us: u64,
    /// Frames that exceeded budget.
    pub frames_over_budget: u64,
    /// Collisions seen.
    pub collisions: u64,
}

impl FrameStatsAccumulator {
    /// Creates an accumulator budgeting for `target_fps`.
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        Self {
            budget_us: 1_000_000 / u64::from(target_fps.max(1)),
            frames_recorded: 0,
            total_us_sum: 0,
            logic_us_sum: 0,
            commit_us_sum: 0,
            render_us_sum: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            frames_over_budget: 0,
            collisions: 0,
        }
    }

    /// Records a frame's statistics.
    pub fn record(&mut self, stats: FrameStats) {
        self.frames_recorded += 1;
        self.total_us_sum += stats.total_us;
        self.logic_us_sum += stats.logic_us;
        self.commit_us_sum += stats.commit_us;
        self.render_us_sum += stats.render_us;
        self.min_frame_us = self.min_frame_us.min(stats.total_us);
        self.max_frame_us = self.max_frame_us.max(stats.total_us);
        self.collisions += stats.collisions as u64;

        if stats.total_us > self.budget_us {
            self.frames_over_budget += 1;
        }
    }

    /// Returns average frame time in milliseconds.
    #[must_use]
    pub fn avg_frame_ms(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (self.total_us_sum as f64 / self.frames_recorded as f64) / 1000.0
    }

    /// Returns the FPS the average frame time would sustain.
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        let avg_ms = self.avg_frame_ms();
        if avg_ms <= 0.0 {
            return 0.0;
        }
        1000.0 / avg_ms
    }

    /// Returns the share of frames over budget.
    #[must_use]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }

    /// Logs a summary at info level.
    pub fn log_summary(&self) {
        if self.frames_recorded == 0 {
            tracing::info!("no frames recorded");
            return;
        }
        let frames = self.frames_recorded as f64;
        tracing::info!(
            frames = self.frames_recorded,
            avg_ms = format_args!("{:.3}", self.avg_frame_ms()),
            fps = format_args!("{:.1}", self.avg_fps()),
            min_ms = format_args!("{:.3}", self.min_frame_us as f64 / 1000.0),
            max_ms = format_args!("{:.3}", self.max_frame_us as f64 / 1000.0),
            over_budget = self.frames_over_budget,
            collisions = self.collisions,
            "frame timing"
        );
        tracing::info!(
            logic_ms = format_args!("{:.3}", self.logic_us_sum as f64 / frames / 1000.0),
            commit_ms = format_args!("{:.3}", self.commit_us_sum as f64 / frames / 1000.0),
            render_ms = format_args!("{:.3}", self.render_us_sum as f64 / frames / 1000.0),
            "frame breakdown"
        );
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_shared::{RigidBody, Transform, Vec2};

    #[test]
    fn test_game_creation() {
        let game = Game::new(EngineConfig::default());
        assert_eq!(game.frame_count(), 0);
        assert!(game.is_running());
        assert_eq!(game.registry().system_count(), 13);
        assert_eq!(game.camera(), Rect::new(0.0, 0.0, 1280.0, 720.0));
    }

    #[test]
    fn test_spawned_entity_moves_after_commit() {
        let mut game = Game::new(EngineConfig::default());
        let registry = game.registry_mut();
        let entity = registry.create_entity();
        registry.add_component(entity, Transform::at(Vec2::new(5.0, 5.0))).unwrap();
        registry.add_component(entity, RigidBody::new(Vec2::new(10.0, 0.0))).unwrap();

        let first = game.tick(1.0, 0);
        assert_eq!(first.entities_added, 1);
        assert_eq!(
            game.registry().get_component::<Transform>(entity).unwrap().position,
            Vec2::new(5.0, 5.0)
        );

        game.tick(1.0, 1_000);
        assert_eq!(
            game.registry().get_component::<Transform>(entity).unwrap().position,
            Vec2::new(15.0, 5.0)
        );
        assert_eq!(game.frame_count(), 2);
    }

    #[test]
    fn test_escape_and_f5() {
        let mut game = Game::new(EngineConfig::default());
        game.queue_key(KeyInputEvent::pressed(Key::F5));
        game.tick(0.016, 16);
        assert!(game.show_colliders());
        assert!(game.is_running());

        game.queue_key(KeyInputEvent::pressed(Key::Escape));
        game.tick(0.016, 32);
        assert!(!game.is_running());
    }

    #[test]
    fn test_stats_accumulator() {
        let mut acc = FrameStatsAccumulator::new(60);

        for i in 0..100 {
            acc.record(FrameStats {
                frame: i,
                total_us: 10_000 + (i * 100),
                logic_us: 5_000,
                commit_us: 1_000,
                render_us: 2_000,
                ..FrameStats::default()
            });
        }

        assert_eq!(acc.frames_recorded, 100);
        assert!(acc.avg_fps() > 50.0);
        assert!(acc.avg_fps() < 100.0);
        assert_eq!(acc.frames_over_budget, 33);
    }
}
