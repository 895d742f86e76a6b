use thiserror::Error;

/// Library error type for canvas and window operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The display subsystem (event loop) could not be initialized.
    #[error("display unavailable: {0}")]
    Display(#[from] winit::error::EventLoopError),

    /// The window could not be created.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    /// Surface acquisition, resize or presentation failed.
    #[error("surface error: {0}")]
    Surface(String),

    /// A canvas or viewport dimension was zero.
    #[error("{what} dimensions must be positive, got {width}x{height}")]
    EmptyDimension {
        what: &'static str,
        width: u32,
        height: u32,
    },

    /// A proportional side does not fit in 32 bits.
    #[error("fit of {canvas_w}x{canvas_h} into {viewport_w}x{viewport_h} overflows")]
    FitOverflow {
        canvas_w: u32,
        canvas_h: u32,
        viewport_w: u32,
        viewport_h: u32,
    },

    /// Fewer channel values were supplied than the canvas needs.
    #[error("expected at least {needed} channel values, got {got}")]
    ChannelUnderflow { needed: usize, got: usize },

    /// A pixel buffer could not be allocated.
    #[error("failed to allocate {pixels} pixels")]
    Allocation { pixels: u64 },

    /// The scaler rejected a source or destination buffer.
    #[error("invalid scaler buffer: {0}")]
    ScaleBuffer(#[from] fast_image_resize::ImageBufferError),

    /// The scaler failed while resampling.
    #[error("scaling failed: {0}")]
    Scale(#[from] fast_image_resize::ResizeError),

    /// Image decoding error.
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

// softbuffer errors may carry raw handles, which are neither Send nor Sync.
impl From<softbuffer::SoftBufferError> for Error {
    fn from(err: softbuffer::SoftBufferError) -> Self {
        Self::Surface(err.to_string())
    }
}
