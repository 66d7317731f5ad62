//! # Render Ordering
//!
//! Producers push one [`RenderKey`] per visible drawable; after sorting, the
//! queue is the frame's draw order (painter's algorithm, back to front).

mod key;
mod queue;

pub use key::{RenderKey, RenderableKind};
pub use queue::{RenderQueue, DEFAULT_RENDER_QUEUE_CAPACITY};
