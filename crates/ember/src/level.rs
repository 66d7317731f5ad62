//! # Level Descriptions
//!
//! A level is a TOML document: an optional map size, an optional tile map,
//! and a list of entities with their tag, groups and components. Spawning
//! goes through the registry's public API only; nothing is visible to
//! systems until the next [`Registry::update`].
//!
//! ```toml
//! [tilemap]
//! asset_id = "jungle-tiles"
//! tile_size = 32
//! scale = 2.0
//! texture_columns = 10
//! tiles = [[0, 1, 2], [10, 11, 12]]
//!
//! [[entities]]
//! tag = "player"
//! keyboard_control = { speed = 100.0 }
//! camera_follow = true
//! transform = { position = { x = 240.0, y = 110.0 } }
//! sprite = { asset_id = "chopper-image", width = 32, height = 32, layer = 1 }
//! health = { max = 100 }
//! ```

use std::collections::HashSet;
use std::path::Path;

use ember_core::{Entity, Registry};
use ember_shared::{
    Animation, BoxCollider, CameraFollow, Health, KeyboardControl, ProjectileEmitter, RigidBody,
    Sprite, SquarePrimitive, TextLabel, Transform, Vec2,
};
use serde::{Deserialize, Serialize};

use crate::error::{read_file, GameError, GameResult};
use crate::systems::TILES_GROUP;

/// Explicit map extents.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapDescription {
    /// Width in world pixels.
    pub width: f32,
    /// Height in world pixels.
    pub height: f32,
}

/// A grid of tiles cut from one texture.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileMapDescription {
    /// Tile-sheet texture.
    pub asset_id: String,
    /// Edge of one square tile in the texture, in pixels.
    pub tile_size: u32,
    /// World scale applied to every tile.
    #[serde(default = "unit_scale")]
    pub scale: f32,
    /// Tiles per row of the texture.
    pub texture_columns: u32,
    /// Tile indices, row by row. Index `i` is texture cell
    /// `(i % texture_columns, i / texture_columns)`.
    pub tiles: Vec<Vec<u32>>,
}

const fn unit_scale() -> f32 {
    1.0
}

impl TileMapDescription {
    /// World size covered by the tiles. Ragged rows use the longest row.
    #[must_use]
    pub fn world_size(&self) -> Vec2 {
        let columns = self.tiles.iter().map(Vec::len).max().unwrap_or(0);
        let edge = self.tile_size as f32 * self.scale;
        Vec2::new(columns as f32 * edge, self.tiles.len() as f32 * edge)
    }
}

/// Hit points; `current` defaults to `max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDescription {
    /// Full health.
    pub max: i32,
    /// Starting health.
    #[serde(default)]
    pub current: Option<i32>,
}

/// One entity and whichever components it starts with.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityDescription {
    /// Unique tag.
    pub tag: Option<String>,
    /// Groups to join.
    pub groups: Vec<String>,
    /// Placement.
    pub transform: Option<Transform>,
    /// Initial velocity.
    pub rigid_body: Option<RigidBody>,
    /// An empty source rectangle means the whole `width`×`height` cell.
    pub sprite: Option<Sprite>,
    /// Collision box.
    pub box_collider: Option<BoxCollider>,
    /// Hit points.
    pub health: Option<HealthDescription>,
    /// The start time is replaced with the spawn time.
    pub animation: Option<Animation>,
    /// Arrow-key steering.
    pub keyboard_control: Option<KeyboardControl>,
    /// Attach [`CameraFollow`].
    pub camera_follow: bool,
    /// The last emission time is replaced with the spawn time.
    pub projectile_emitter: Option<ProjectileEmitter>,
    /// Text.
    pub text_label: Option<TextLabel>,
    /// Filled rectangle.
    pub square: Option<SquarePrimitive>,
}

/// A parsed level.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelDescription {
    /// Explicit map size. Wins over the tile map's size.
    pub map: Option<MapDescription>,
    /// Background tiles.
    pub tilemap: Option<TileMapDescription>,
    /// Entities in spawn order.
    pub entities: Vec<EntityDescription>,
}

/// What [`LevelDescription::spawn`] created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelInfo {
    /// Map size, if the level defines one.
    pub map_size: Option<Vec2>,
    /// Tile entities created.
    pub tiles: usize,
    /// Described entities created.
    pub entities: usize,
}

impl LevelDescription {
    /// Parses and validates a level document.
    ///
    /// # Errors
    ///
    /// [`GameError::Parse`] on malformed TOML, [`GameError::InvalidLevel`] if
    /// [`validate`](Self::validate) rejects it.
    pub fn from_toml_str(source: &str) -> GameResult<Self> {
        let level: Self = toml::from_str(source)?;
        level.validate()?;
        Ok(level)
    }

    /// Reads, parses and validates a level file.
    ///
    /// # Errors
    ///
    /// As [`from_toml_str`](Self::from_toml_str), plus [`GameError::Io`].
    pub fn from_file(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        let level = Self::from_toml_str(&read_file(path)?)?;
        tracing::info!(
            path = %path.display(),
            entities = level.entities.len(),
            "loaded level"
        );
        Ok(level)
    }

    /// Checks what the type system cannot.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidLevel`] naming the first problem found.
    pub fn validate(&self) -> GameResult<()> {
        if let Some(map) = &self.map {
            if !(map.width > 0.0 && map.height > 0.0) {
                return Err(invalid("map size must be positive"));
            }
        }
        if let Some(tilemap) = &self.tilemap {
            if tilemap.tile_size == 0 || tilemap.texture_columns == 0 {
                return Err(invalid("tilemap tile_size and texture_columns must be non-zero"));
            }
            if !(tilemap.scale > 0.0) {
                return Err(invalid("tilemap scale must be positive"));
            }
            let last_row = tilemap.tiles.iter().flatten().max().copied().unwrap_or(0)
                / tilemap.texture_columns;
            if last_row.checked_mul(tilemap.tile_size).is_none() {
                return Err(invalid("tilemap indexes past the end of the tile sheet"));
            }
        }

        let mut tags = HashSet::new();
        for (index, entity) in self.entities.iter().enumerate() {
            if let Some(tag) = &entity.tag {
                if !tags.insert(tag.as_str()) {
                    return Err(invalid(format!("entity {index}: tag {tag:?} is used twice")));
                }
            }
            if let Some(sprite) = &entity.sprite {
                if sprite.asset_id.is_empty() || sprite.width == 0 || sprite.height == 0 {
                    return Err(invalid(format!(
                        "entity {index}: sprite needs an asset_id and a non-zero size"
                    )));
                }
            }
            if let Some(health) = &entity.health {
                if health.max <= 0 {
                    return Err(invalid(format!("entity {index}: health max must be positive")));
                }
            }
            if let Some(animation) = &entity.animation {
                if animation.num_frames == 0 {
                    return Err(invalid(format!("entity {index}: animation has no frames")));
                }
            }
        }
        Ok(())
    }

    /// Creates the level's entities. `now_ms` seeds animation and emitter
    /// clocks.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidLevel`] if the description fails
    /// [`validate`](Self::validate), before anything is created.
    /// [`GameError::Ecs`] if the registry rejects an operation, for example a
    /// tag already held by an entity spawned earlier.
    pub fn spawn(&self, registry: &mut Registry, now_ms: u64) -> GameResult<LevelInfo> {
        self.validate()?;

        let mut tiles = 0;
        let mut map_size = None;
        if let Some(tilemap) = &self.tilemap {
            tiles = spawn_tiles(registry, tilemap)?;
            map_size = Some(tilemap.world_size());
        }
        if let Some(map) = &self.map {
            map_size = Some(Vec2::new(map.width, map.height));
        }

        for description in &self.entities {
            spawn_entity(registry, description, now_ms)?;
        }

        let info = LevelInfo {
            map_size,
            tiles,
            entities: self.entities.len(),
        };
        tracing::info!(tiles, entities = info.entities, "level spawned");
        Ok(info)
    }
}

fn invalid(reason: impl Into<String>) -> GameError {
    GameError::InvalidLevel(reason.into())
}

fn spawn_tiles(registry: &mut Registry, tilemap: &TileMapDescription) -> GameResult<usize> {
    let size = tilemap.tile_size;
    let edge = size as f32 * tilemap.scale;
    let mut count = 0;

    for (row, indices) in tilemap.tiles.iter().enumerate() {
        for (column, &index) in indices.iter().enumerate() {
            let src_x = (index % tilemap.texture_columns).checked_mul(size);
            let src_y = (index / tilemap.texture_columns).checked_mul(size);
            let (Some(src_x), Some(src_y)) = (src_x, src_y) else {
                return Err(invalid(format!(
                    "tile {index} at row {row}, column {column} is outside the tile sheet"
                )));
            };

            let tile = registry.create_entity();
            registry.group_entity(tile, TILES_GROUP)?;
            registry.add_component(
                tile,
                Transform::new(
                    Vec2::new(column as f32 * edge, row as f32 * edge),
                    Vec2::new(tilemap.scale, tilemap.scale),
                    0.0,
                ),
            )?;
            registry.add_component(
                tile,
                Sprite::new(tilemap.asset_id.clone(), size, size, 0)
                    .with_src_offset(src_x as f32, src_y as f32),
            )?;
            count += 1;
        }
    }
    Ok(count)
}

fn spawn_entity(
    registry: &mut Registry,
    description: &EntityDescription,
    now_ms: u64,
) -> GameResult<Entity> {
    let entity = registry.create_entity();

    if let Some(tag) = &description.tag {
        registry.tag_entity(entity, tag)?;
    }
    for group in &description.groups {
        registry.group_entity(entity, group)?;
    }

    if let Some(transform) = description.transform {
        registry.add_component(entity, transform)?;
    }
    if let Some(rigid_body) = description.rigid_body {
        registry.add_component(entity, rigid_body)?;
    }
    if let Some(sprite) = &description.sprite {
        let mut sprite = sprite.clone();
        if sprite.src_rect.w == 0.0 || sprite.src_rect.h == 0.0 {
            sprite.src_rect.w = sprite.width as f32;
            sprite.src_rect.h = sprite.height as f32;
        }
        registry.add_component(entity, sprite)?;
    }
    if let Some(collider) = description.box_collider {
        registry.add_component(entity, collider)?;
    }
    if let Some(health) = description.health {
        registry.add_component(
            entity,
            Health {
                current: health.current.unwrap_or(health.max),
                max: health.max,
            },
        )?;
    }
    if let Some(animation) = description.animation {
        registry.add_component(
            entity,
            Animation {
                start_time_ms: now_ms,
                current_frame: 0,
                ..animation
            },
        )?;
    }
    if let Some(control) = description.keyboard_control {
        registry.add_component(entity, control)?;
    }
    if description.camera_follow {
        registry.add_component(entity, CameraFollow)?;
    }
    if let Some(emitter) = description.projectile_emitter {
        registry.add_component(
            entity,
            ProjectileEmitter {
                last_emission_ms: now_ms,
                ..emitter
            },
        )?;
    }
    if let Some(label) = &description.text_label {
        registry.add_component(entity, label.clone())?;
    }
    if let Some(square) = description.square {
        registry.add_component(entity, square)?;
    }

    tracing::debug!(entity = entity.id(), tag = ?description.tag, "spawned level entity");
    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_shared::Rect;

    const LEVEL: &str = r#"
        [tilemap]
        asset_id = "jungle-tiles"
        tile_size = 32
        scale = 2.0
        texture_columns = 10
        tiles = [[0, 1, 2], [10, 11, 12]]

        [[entities]]
        tag = "player"
        camera_follow = true
        keyboard_control = { speed = 100.0 }
        transform = { position = { x = 240.0, y = 110.0 } }
        sprite = { asset_id = "chopper-image", width = 32, height = 32, layer = 1 }
        animation = { num_frames = 2, frame_rate = 10 }
        health = { max = 100 }

        [[entities]]
        groups = ["enemies"]
        transform = { position = { x = 500.0, y = 300.0 }, scale = { x = 1.5, y = 1.5 } }
        box_collider = { width = 32, height = 32 }
        health = { max = 50, current = 20 }
        projectile_emitter = { velocity = { x = 0.0, y = 100.0 }, is_friendly = false }
    "#;

    #[test]
    fn test_parse_and_spawn() {
        let level = LevelDescription::from_toml_str(LEVEL).unwrap();
        let mut registry = Registry::new();
        let info = level.spawn(&mut registry, 5_000).unwrap();
        registry.update();

        assert_eq!(info.tiles, 6);
        assert_eq!(info.entities, 2);
        assert_eq!(info.map_size, Some(Vec2::new(192.0, 128.0)));
        assert_eq!(registry.entity_count(), 8);

        let player = registry.entity_by_tag("player").unwrap();
        assert!(registry.has_component::<CameraFollow>(player));
        let sprite = registry.get_component::<Sprite>(player).unwrap();
        assert_eq!(sprite.src_rect, Rect::new(0.0, 0.0, 32.0, 32.0));
        assert_eq!(registry.get_component::<Animation>(player).unwrap().start_time_ms, 5_000);
        assert_eq!(registry.get_component::<Health>(player).unwrap().current, 100);

        let enemy = registry.entities_by_group("enemies")[0];
        assert_eq!(registry.get_component::<Health>(enemy).unwrap(), &Health { current: 20, max: 50 });
        assert_eq!(
            registry.get_component::<Transform>(enemy).unwrap().scale,
            Vec2::new(1.5, 1.5)
        );
        let emitter = registry.get_component::<ProjectileEmitter>(enemy).unwrap();
        assert_eq!(emitter.last_emission_ms, 5_000);
        assert_eq!(emitter.frequency_ms, 1_000);
        assert!(!registry.has_component::<Sprite>(enemy));
    }

    #[test]
    fn test_tiles_cut_from_texture() {
        let level = LevelDescription::from_toml_str(LEVEL).unwrap();
        let mut registry = Registry::new();
        level.spawn(&mut registry, 0).unwrap();

        let tiles = registry.entities_by_group(TILES_GROUP);
        let last = *tiles.last().unwrap();
        let sprite = registry.get_component::<Sprite>(last).unwrap();
        assert_eq!((sprite.src_rect.x, sprite.src_rect.y), (64.0, 32.0));
        assert_eq!(
            registry.get_component::<Transform>(last).unwrap().position,
            Vec2::new(128.0, 64.0)
        );
    }

    #[test]
    fn test_explicit_map_wins() {
        let level = LevelDescription::from_toml_str(
            r#"
            [map]
            width = 1000.0
            height = 800.0
            "#,
        )
        .unwrap();
        let info = level.spawn(&mut Registry::new(), 0).unwrap();
        assert_eq!(info.map_size, Some(Vec2::new(1000.0, 800.0)));
        assert_eq!(info.tiles, 0);
    }

    #[test]
    fn test_rejects_invalid_levels() {
        let duplicate = r#"
            [[entities]]
            tag = "player"
            [[entities]]
            tag = "player"
        "#;
        assert!(matches!(
            LevelDescription::from_toml_str(duplicate),
            Err(GameError::InvalidLevel(_))
        ));

        let bad_sprite = r#"
            [[entities]]
            sprite = { asset_id = "", width = 0, height = 0 }
        "#;
        assert!(matches!(
            LevelDescription::from_toml_str(bad_sprite),
            Err(GameError::InvalidLevel(_))
        ));

        assert!(matches!(
            LevelDescription::from_toml_str("entities = 3"),
            Err(GameError::Parse(_))
        ));
    }

    #[test]
    fn test_spawn_checks_descriptions_built_without_validation() {
        let level: LevelDescription = toml::from_str(
            r#"
            [tilemap]
            asset_id = "jungle-tiles"
            tile_size = 32
            texture_columns = 0
            tiles = [[1]]
            "#,
        )
        .unwrap();

        let mut registry = Registry::new();
        assert!(matches!(
            level.spawn(&mut registry, 0),
            Err(GameError::InvalidLevel(_))
        ));
        registry.update();
        assert_eq!(registry.entity_count(), 0);
    }

    #[test]
    fn test_tile_index_past_sheet_is_rejected() {
        let level = LevelDescription {
            tilemap: Some(TileMapDescription {
                asset_id: "jungle-tiles".to_owned(),
                tile_size: 32,
                scale: 1.0,
                texture_columns: 1,
                tiles: vec![vec![0, u32::MAX]],
            }),
            ..LevelDescription::default()
        };

        let mut registry = Registry::new();
        assert!(matches!(
            level.spawn(&mut registry, 0),
            Err(GameError::InvalidLevel(_))
        ));
        registry.update();
        assert_eq!(registry.entity_count(), 0);
    }
}
