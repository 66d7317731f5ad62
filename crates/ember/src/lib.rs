//! # Ember
//!
//! The game layer on top of [`ember_core`]: concrete systems, TOML level
//! and engine configuration, the frame driver and draw planning.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                               EMBER                                     │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐    │
//! │  │  ember_core     │     │  ember_shared   │     │  ember          │    │
//! │  │                 │────>│                 │────>│                 │    │
//! │  │  • Pools        │     │  • Components   │     │  • Systems      │    │
//! │  │  • Registry     │     │  • Events       │     │  • Levels       │    │
//! │  │  • Event bus    │     │  • Math         │     │  • Frame driver │    │
//! │  │  • Render queue │     │                 │     │  • Draw plans   │    │
//! │  └─────────────────┘     └─────────────────┘     └─────────────────┘    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: engine configuration
//! - `draw`: render queue to backend commands
//! - `game_loop`: frame orchestration and timing
//! - `level`: level descriptions and spawning
//! - `systems`: gameplay and render-key systems

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod draw;
pub mod error;
pub mod game_loop;
pub mod level;
pub mod systems;

// Re-export the lower layers
pub use ember_core as core;
pub use ember_shared as shared;

// Re-export commonly used types
pub use config::{DebugConfig, EngineConfig, WindowConfig};
pub use draw::{plan_frame, DrawCommand, DrawPlan, RecordingBackend, RenderBackend};
pub use error::{GameError, GameResult};
pub use game_loop::{FrameStats, FrameStatsAccumulator, Game};
pub use level::{EntityDescription, LevelDescription, LevelInfo};

/// Level bundled with the engine, used when no level file is given.
pub const DEFAULT_LEVEL: &str = include_str!("../assets/levels/jungle.toml");
