//! # Frame Pipeline Tests
//!
//! End-to-end checks through [`Game::tick`]:
//!
//! 1. **Movement**: velocity integrates once the entity is committed
//! 2. **Damage**: a collision reaches the damage handler, which resolves
//!    both entities' components
//! 3. **Order**: input, logic, commit, render, in that order
//! 4. **Levels**: the bundled level loads and renders
//!
//! Run with: cargo test --package ember --test frame_pipeline

use ember::core::{Entity, EventBus, Registry};
use ember::draw::DrawCommand;
use ember::shared::{
    BoxCollider, CollisionEvent, Health, Key, KeyInputEvent, Projectile, RigidBody, Sprite,
    Transform, Vec2,
};
use ember::systems::{DamageSystem, ENEMIES_GROUP, PLAYER_TAG, PROJECTILES_GROUP};
use ember::{EngineConfig, Game, LevelDescription, RecordingBackend, DEFAULT_LEVEL};

// ============================================================================
// FIXTURES
// ============================================================================

fn game() -> Game {
    Game::new(EngineConfig::default())
}

fn spawn_moving(game: &mut Game, position: Vec2, velocity: Vec2) -> Entity {
    let registry = game.registry_mut();
    let entity = registry.create_entity();
    registry.add_component(entity, Transform::at(position)).unwrap();
    registry.add_component(entity, RigidBody::new(velocity)).unwrap();
    entity
}

fn position_of(game: &Game, entity: Entity) -> Vec2 {
    game.registry().get_component::<Transform>(entity).unwrap().position
}

// ============================================================================
// MOVEMENT
// ============================================================================

#[test]
fn verify_movement_end_to_end() {
    let mut game = game();
    let entity = spawn_moving(&mut game, Vec2::ZERO, Vec2::new(10.0, 0.0));
    game.registry_mut().update();

    game.tick(1.0, 1_000);
    assert_eq!(position_of(&game, entity), Vec2::new(10.0, 0.0));
}

#[test]
fn verify_keyboard_steers_player() {
    let mut game = game();
    let player = spawn_moving(&mut game, Vec2::new(100.0, 100.0), Vec2::ZERO);
    let registry = game.registry_mut();
    registry
        .add_component(player, ember::shared::KeyboardControl { speed: 50.0 })
        .unwrap();
    registry.add_component(player, Sprite::new("chopper-image", 32, 32, 1)).unwrap();
    registry.tag_entity(player, PLAYER_TAG).unwrap();
    game.tick(0.0, 0);

    // Input is handled before movement in the same tick.
    game.queue_key(KeyInputEvent::pressed(Key::Right));
    game.tick(1.0, 1_000);
    assert_eq!(position_of(&game, player), Vec2::new(150.0, 100.0));
}

// ============================================================================
// DAMAGE
// ============================================================================

#[test]
fn verify_damage_end_to_end() {
    let mut registry = Registry::new();
    registry.add_system(DamageSystem);

    let player = registry.create_entity();
    registry.tag_entity(player, PLAYER_TAG).unwrap();
    registry.add_component(player, Health::new(100)).unwrap();
    registry.add_component(player, BoxCollider::new(32, 32)).unwrap();

    let enemy = registry.create_entity();
    registry.group_entity(enemy, ENEMIES_GROUP).unwrap();
    registry.add_component(enemy, Health::new(30)).unwrap();
    registry.add_component(enemy, BoxCollider::new(32, 32)).unwrap();

    let shot = registry.create_entity();
    registry.group_entity(shot, PROJECTILES_GROUP).unwrap();
    registry.add_component(shot, BoxCollider::new(4, 4)).unwrap();
    registry
        .add_component(
            shot,
            Projectile {
                damage: 30,
                spawn_time_ms: 0,
                duration_ms: 1_000,
                is_friendly: true,
            },
        )
        .unwrap();
    registry.update();

    let mut bus: EventBus = EventBus::new();
    bus.subscribe_system::<DamageSystem, CollisionEvent, _>(DamageSystem::on_collision);

    // The player and the enemy touching does nothing by itself.
    assert_eq!(bus.emit(&mut registry, CollisionEvent { a: player, b: enemy }), 1);
    assert_eq!(registry.get_component::<Health>(player).unwrap().current, 100);
    assert_eq!(registry.get_component::<Health>(enemy).unwrap().current, 30);

    bus.emit(&mut registry, CollisionEvent { a: enemy, b: shot });
    assert_eq!(registry.get_component::<Health>(enemy).unwrap().current, 0);
    assert!(registry.is_pending_destroy(enemy));
    assert!(registry.is_pending_destroy(shot));

    registry.update();
    assert!(!registry.is_alive(enemy));
    assert!(registry.entities_by_group(ENEMIES_GROUP).is_empty());
    assert!(registry.is_alive(player));
}

#[test]
fn verify_hostile_fire_hits_player_through_tick() {
    let mut game = game();
    let player = spawn_moving(&mut game, Vec2::new(100.0, 100.0), Vec2::ZERO);
    let registry = game.registry_mut();
    registry.tag_entity(player, PLAYER_TAG).unwrap();
    registry.add_component(player, Health::new(100)).unwrap();
    registry.add_component(player, BoxCollider::new(32, 32)).unwrap();

    let shot = spawn_moving(&mut game, Vec2::new(110.0, 110.0), Vec2::ZERO);
    let registry = game.registry_mut();
    registry.group_entity(shot, PROJECTILES_GROUP).unwrap();
    registry.add_component(shot, BoxCollider::new(4, 4)).unwrap();
    registry
        .add_component(
            shot,
            Projectile {
                damage: 15,
                spawn_time_ms: 0,
                duration_ms: 10_000,
                is_friendly: false,
            },
        )
        .unwrap();

    let first = game.tick(0.016, 16);
    assert_eq!(first.collisions, 0, "pending entities do not collide");

    let second = game.tick(0.016, 32);
    assert_eq!(second.collisions, 1);
    assert_eq!(second.entities_removed, 1);
    assert_eq!(game.registry().get_component::<Health>(player).unwrap().current, 85);
    assert!(!game.registry().is_alive(shot));
}

// ============================================================================
// FRAME ORDER
// ============================================================================

#[test]
fn verify_commit_happens_before_render() {
    let mut game = game();
    let entity = game.registry_mut().create_entity();
    let registry = game.registry_mut();
    registry.add_component(entity, Transform::at(Vec2::new(10.0, 10.0))).unwrap();
    registry.add_component(entity, Sprite::new("tank-image", 32, 32, 1)).unwrap();

    let stats = game.tick(0.016, 16);
    assert_eq!(stats.entities_added, 1);
    assert_eq!(stats.render_keys, 1);
    assert!(game.render_queue().is_sorted());
}

#[test]
fn verify_projectile_expires_after_its_lifetime() {
    let mut game = game();
    let shot = game.registry_mut().create_entity();
    game.registry_mut()
        .add_component(
            shot,
            Projectile {
                damage: 1,
                spawn_time_ms: 0,
                duration_ms: 100,
                is_friendly: true,
            },
        )
        .unwrap();

    game.tick(0.016, 50);
    assert!(game.registry().is_alive(shot));
    let stats = game.tick(0.016, 150);
    assert_eq!(stats.entities_removed, 1);
    assert!(!game.registry().is_alive(shot));
}

// ============================================================================
// LEVELS
// ============================================================================

#[test]
fn verify_default_level_runs() {
    let mut game = game();
    let level = LevelDescription::from_toml_str(DEFAULT_LEVEL).unwrap();
    let info = game.load_level(&level, 0).unwrap();
    assert_eq!(info.map_size, Some(Vec2::new(1600.0, 768.0)));
    assert_eq!(game.bounds().map_width, 1600.0);

    let mut backend = RecordingBackend::default();
    for frame in 0..120u64 {
        game.tick(1.0 / 60.0, frame * 1_000 / 60);
        game.draw(&mut backend);
    }

    assert_eq!(backend.frames, 120);
    assert!(game.registry().entity_by_tag(PLAYER_TAG).is_some());
    assert!(backend
        .commands
        .iter()
        .any(|command| matches!(command, DrawCommand::Sprite { asset_id, .. } if asset_id == "chopper-image")));
    assert!(backend
        .commands
        .iter()
        .any(|command| matches!(command, DrawCommand::Text { text, .. } if text == "100%")));
}

#[test]
fn verify_failed_level_load_leaves_game_usable() {
    let mut game = game();
    let result = game.load_level_file("/no/such/level.toml", 0);
    assert!(matches!(result, Err(ember::GameError::Io { .. })));

    game.tick(0.016, 16);
    assert_eq!(game.registry().entity_count(), 0);
}

#[test]
fn verify_invalid_tilemap_is_rejected_by_load_level() {
    let mut game = game();
    let level: LevelDescription = toml::from_str(
        r#"
        [tilemap]
        asset_id = "jungle-tiles"
        tile_size = 32
        texture_columns = 0
        tiles = [[1, 2], [3, 4]]
        "#,
    )
    .unwrap();

    let result = game.load_level(&level, 0);
    assert!(matches!(result, Err(ember::GameError::InvalidLevel(_))));

    let stats = game.tick(0.016, 16);
    assert_eq!(stats.entities_added, 0);
    assert_eq!(game.registry().entity_count(), 0);
    assert!(game.is_running());
}

#[test]
fn verify_duplicate_tag_in_level_is_rejected_by_load_level() {
    let mut game = game();
    let level: LevelDescription = toml::from_str(
        r#"
        [[entities]]
        tag = "player"
        transform = { position = { x = 10.0, y = 10.0 } }

        [[entities]]
        tag = "player"
        transform = { position = { x = 20.0, y = 20.0 } }
        "#,
    )
    .unwrap();

    let result = game.load_level(&level, 0);
    assert!(matches!(result, Err(ember::GameError::InvalidLevel(_))));

    game.tick(0.016, 16);
    assert_eq!(game.registry().entity_count(), 0);
    assert!(game.registry().entity_by_tag(PLAYER_TAG).is_none());
}

#[test]
fn verify_tag_clash_with_loaded_entity_reports_registry_error() {
    let mut game = game();
    let player = game.registry_mut().create_entity();
    game.registry_mut().tag_entity(player, PLAYER_TAG).unwrap();
    game.tick(0.016, 16);

    let level: LevelDescription = toml::from_str(
        r#"
        [[entities]]
        tag = "player"
        "#,
    )
    .unwrap();

    let result = game.load_level(&level, 16);
    assert!(matches!(
        result,
        Err(ember::GameError::Ecs(ember::core::EcsError::DuplicateTag { .. }))
    ));
    assert_eq!(game.registry().entity_by_tag(PLAYER_TAG), Some(player));
    game.tick(0.016, 32);
    assert!(game.registry().is_alive(player));
}

