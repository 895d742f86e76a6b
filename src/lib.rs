//! Window-backed pixel canvas with aspect-aware stretch policies.
//!
//! The canvas is packed from interleaved RGB intensities, fitted into the
//! window according to a [`StretchPolicy`], and presented through a software
//! surface. The fit and packing logic lives in [`processing`] and is usable
//! without a window.

pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod processing {
    pub mod color;
    pub mod layout;
    pub mod scale;
}
pub mod render {
    pub mod viewer;
}

pub use buffer::PixelBuffer;
pub use config::Configuration;
pub use engine::{CanvasEngine, Presenter};
pub use error::Error;
pub use processing::layout::{Anchor, FitRect, Size, StretchPolicy, fit, place};
pub use render::viewer::{CanvasApp, CanvasWindow, Display};
