//! Shelfnet Render — turns graph sequences into animation frames.
//!
//! Layout and drawing are left to whatever consumes the frames; this crate
//! only fixes the data each frame carries.

pub mod frames;
pub mod types;

pub use frames::{FrameRenderer, Renderer};
pub use types::*;
