//! # Engine Configuration
//!
//! Loaded once at startup from TOML. Every table is optional; missing keys
//! fall back to the defaults below.
//!
//! ```toml
//! target_fps = 60
//! render_queue_capacity = 1024
//!
//! [window]
//! width = 1280
//! height = 720
//!
//! [registry]
//! initial_pool_capacity = 100
//!
//! [debug]
//! show_colliders = false
//! ```

use std::path::Path;

use ember_core::render::DEFAULT_RENDER_QUEUE_CAPACITY;
use ember_core::RegistryConfig;
use serde::{Deserialize, Serialize};

use crate::error::{read_file, GameResult};

/// Window size in pixels. Also the camera size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Debug switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Emit collider outlines in the draw plan. Toggled at runtime with F5.
    pub show_colliders: bool,
}

/// Top-level engine configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window and camera size.
    pub window: WindowConfig,
    /// Frame rate the headless runner simulates.
    pub target_fps: u32,
    /// Render keys reserved per frame.
    pub render_queue_capacity: usize,
    /// Registry pre-allocation.
    pub registry: RegistryConfig,
    /// Debug switches.
    pub debug: DebugConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            target_fps: 60,
            render_queue_capacity: DEFAULT_RENDER_QUEUE_CAPACITY,
            registry: RegistryConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Parse`](crate::GameError::Parse) on malformed TOML.
    pub fn from_toml_str(source: &str) -> GameResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Io`](crate::GameError::Io) if the file cannot be
    /// read, or [`GameError::Parse`](crate::GameError::Parse) on malformed TOML.
    pub fn from_file(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        let config = Self::from_toml_str(&read_file(path)?)?;
        tracing::info!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    /// Seconds per simulated frame.
    #[must_use]
    pub fn frame_seconds(&self) -> f64 {
        1.0 / f64::from(self.target_fps.max(1))
    }
}
