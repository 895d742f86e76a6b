//! Canvas/screen state machine.
//!
//! [`CanvasEngine`] holds the canvas, a CPU copy of the window surface and the
//! current stretch policy. Every operation leaves the screen copy showing the
//! canvas at the current fit rectangle; getting it onto a real window is the
//! job of a [`Presenter`].

use image::RgbaImage;
use tracing::debug;

use crate::buffer::PixelBuffer;
use crate::error::Error;
use crate::processing::color::{BLACK, Intensity, pack_image, pack_into};
use crate::processing::layout::{Anchor, FitRect, Size, StretchPolicy, fit, place};
use crate::processing::scale::Scaler;

/// Sink for finished frames.
pub trait Presenter {
    fn present(&mut self, frame: &PixelBuffer) -> Result<(), Error>;
}

#[derive(Debug)]
pub struct CanvasEngine {
    canvas: PixelBuffer,
    screen: PixelBuffer,
    policy: StretchPolicy,
    anchor: Anchor,
    fitted: FitRect,
    scaler: Scaler,
}

impl CanvasEngine {
    /// Allocate canvas and screen buffers and draw the (black) canvas.
    ///
    /// # Errors
    /// Fails if either size has a zero side or a buffer cannot be allocated.
    pub fn new(
        canvas: Size,
        viewport: Size,
        policy: StretchPolicy,
        anchor: Anchor,
    ) -> Result<Self, Error> {
        let canvas = PixelBuffer::new(canvas.require_positive("canvas")?)?;
        let screen = PixelBuffer::new(viewport.require_positive("viewport")?)?;
        let fitted = compute_rect(canvas.size(), screen.size(), policy, anchor)?;
        let mut engine = Self {
            canvas,
            screen,
            policy,
            anchor,
            fitted,
            scaler: Scaler::new(),
        };
        engine.copy_canvas()?;
        Ok(engine)
    }

    /// Repack the canvas from interleaved RGB intensities and redraw it.
    ///
    /// # Errors
    /// [`Error::ChannelUnderflow`] if fewer than `3 * width * height` values
    /// are supplied; the canvas is left unchanged in that case.
    pub fn update_canvas<T: Intensity>(&mut self, channels: &[T]) -> Result<(), Error> {
        pack_into(self.canvas.pixels_mut(), channels)?;
        self.copy_canvas()
    }

    /// Replace the canvas with an image, adopting its dimensions.
    pub fn update_canvas_from_image(&mut self, img: &RgbaImage) -> Result<(), Error> {
        let size = Size::new(img.width(), img.height());
        if size != self.canvas.size() {
            let fitted = compute_rect(size, self.screen.size(), self.policy, self.anchor)?;
            self.canvas.reallocate(size)?;
            self.fitted = fitted;
            self.screen.fill(BLACK);
            debug!(width = size.width, height = size.height, "canvas resized to image");
        }
        pack_image(self.canvas.pixels_mut(), img);
        self.copy_canvas()
    }

    /// Switch stretch policy, clearing the screen before redrawing.
    pub fn set_stretch(&mut self, policy: StretchPolicy) -> Result<(), Error> {
        self.fitted = compute_rect(self.canvas.size(), self.screen.size(), policy, self.anchor)?;
        self.policy = policy;
        debug!(?policy, rect = ?self.fitted, "stretch policy changed");
        self.redraw()
    }

    pub fn set_anchor(&mut self, anchor: Anchor) -> Result<(), Error> {
        self.fitted = compute_rect(self.canvas.size(), self.screen.size(), self.policy, anchor)?;
        self.anchor = anchor;
        self.redraw()
    }

    /// Reallocate the canvas at `size`. The new canvas is black.
    pub fn resize_canvas(&mut self, size: Size) -> Result<(), Error> {
        let fitted = compute_rect(size, self.screen.size(), self.policy, self.anchor)?;
        self.canvas.reallocate(size)?;
        self.fitted = fitted;
        debug!(width = size.width, height = size.height, "canvas reallocated");
        self.redraw()
    }

    /// Adopt a new viewport size after the host window was resized.
    pub fn handle_resize(&mut self, viewport: Size) -> Result<(), Error> {
        let viewport = viewport.require_positive("viewport")?;
        let fitted = compute_rect(self.canvas.size(), viewport, self.policy, self.anchor)?;
        if viewport != self.screen.size() {
            self.screen.reallocate(viewport)?;
        }
        self.fitted = fitted;
        debug!(
            width = viewport.width,
            height = viewport.height,
            rect = ?self.fitted,
            "viewport resized",
        );
        self.redraw()
    }

    pub fn present<P: Presenter + ?Sized>(&self, presenter: &mut P) -> Result<(), Error> {
        presenter.present(&self.screen)
    }

    /// Rectangle the canvas currently occupies in the viewport.
    #[must_use]
    pub const fn fitted_rect(&self) -> FitRect {
        self.fitted
    }

    #[must_use]
    pub const fn policy(&self) -> StretchPolicy {
        self.policy
    }

    #[must_use]
    pub const fn anchor(&self) -> Anchor {
        self.anchor
    }

    #[must_use]
    pub const fn canvas(&self) -> &PixelBuffer {
        &self.canvas
    }

    #[must_use]
    pub const fn screen(&self) -> &PixelBuffer {
        &self.screen
    }

    #[must_use]
    pub const fn viewport(&self) -> Size {
        self.screen.size()
    }

    fn redraw(&mut self) -> Result<(), Error> {
        self.screen.fill(BLACK);
        self.copy_canvas()
    }

    fn copy_canvas(&mut self) -> Result<(), Error> {
        self.scaler.blit(
            &self.canvas,
            &mut self.screen,
            self.fitted,
            self.policy.scales(),
        )
    }
}

fn compute_rect(
    canvas: Size,
    viewport: Size,
    policy: StretchPolicy,
    anchor: Anchor,
) -> Result<FitRect, Error> {
    Ok(place(fit(canvas, viewport, policy)?, viewport, anchor))
}
