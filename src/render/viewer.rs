//! Window glue: a `winit` window and `softbuffer` surface around a
//! [`CanvasEngine`].

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use image::RgbaImage;
use softbuffer::{Context as SoftContext, Surface};
use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorGrabMode, Fullscreen, Window, WindowAttributes, WindowId},
};

use crate::buffer::PixelBuffer;
use crate::config::{Configuration, WindowConfig, WindowFlags};
use crate::engine::{CanvasEngine, Presenter};
use crate::error::Error;
use crate::processing::color::{Intensity, to_xrgb};
use crate::processing::layout::{Anchor, FitRect, Size, StretchPolicy};

type WindowHandle = Arc<Window>;
type WindowSurface = Surface<WindowHandle, WindowHandle>;

/// Process-wide handle on the display subsystem.
///
/// Wraps the `winit` event loop, of which a process may create exactly one.
/// Creating it fails if no display is reachable; [`Display::run`] consumes it
/// and returns once the window has closed.
pub struct Display {
    event_loop: EventLoop<()>,
}

impl Display {
    /// # Errors
    /// [`Error::Display`] when the platform display cannot be opened or an
    /// event loop already exists in this process.
    pub fn new() -> Result<Self, Error> {
        let event_loop = EventLoop::new()?;
        Ok(Self { event_loop })
    }

    /// Open the configured window and drive `app` until the window closes.
    ///
    /// # Errors
    /// Window or surface creation failures, and the first error returned by
    /// `app`, stop the loop and are returned here.
    pub fn run<A: CanvasApp>(self, cfg: Configuration, app: A) -> Result<()> {
        let mut viewer = ViewerApp::new(cfg, app);
        self.event_loop
            .run_app(&mut viewer)
            .context("canvas event loop failed")?;
        match viewer.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Per-frame hooks for programs drawing into a [`CanvasWindow`].
pub trait CanvasApp {
    /// Called once after the window is created.
    fn init(&mut self, _window: &mut CanvasWindow) -> Result<()> {
        Ok(())
    }

    /// Called once per frame, before the frame is presented.
    fn update(&mut self, window: &mut CanvasWindow) -> Result<()>;
}

/// A window, its surface and the canvas drawn into it.
///
/// All three are released together when this value is dropped.
pub struct CanvasWindow {
    engine: CanvasEngine,
    surface: WindowSurface,
    _context: SoftContext<WindowHandle>,
    window: WindowHandle,
}

impl CanvasWindow {
    /// Create the window and surface and allocate the canvas.
    ///
    /// # Errors
    /// Fails if the window, the softbuffer context/surface or the canvas
    /// cannot be created; no partially constructed window is returned.
    pub fn create(event_loop: &ActiveEventLoop, cfg: &Configuration) -> Result<Self, Error> {
        let window = event_loop.create_window(window_attributes(&cfg.window))?;
        apply_runtime_flags(&window, cfg.window.flags);
        let window = WindowHandle::new(window);

        let context = SoftContext::new(window.clone())?;
        let mut surface = Surface::new(&context, window.clone())?;
        let viewport = viewport_of(window.inner_size());
        resize_surface(&mut surface, viewport)?;

        let engine = CanvasEngine::new(cfg.canvas, viewport, cfg.stretch, cfg.anchor)?;
        info!(
            title = %cfg.window.title,
            width = viewport.width,
            height = viewport.height,
            canvas_width = cfg.canvas.width,
            canvas_height = cfg.canvas.height,
            stretch = ?cfg.stretch,
            "canvas window created",
        );

        Ok(Self {
            engine,
            surface,
            _context: context,
            window,
        })
    }

    /// Repack the canvas from interleaved RGB intensities and redraw it.
    pub fn update_canvas<T: Intensity>(&mut self, channels: &[T]) -> Result<(), Error> {
        self.engine.update_canvas(channels)?;
        self.window.request_redraw();
        Ok(())
    }

    /// Replace the canvas with a decoded image.
    pub fn update_canvas_from_image(&mut self, img: &RgbaImage) -> Result<(), Error> {
        self.engine.update_canvas_from_image(img)?;
        self.window.request_redraw();
        Ok(())
    }

    pub fn set_stretch(&mut self, policy: StretchPolicy) -> Result<(), Error> {
        self.engine.set_stretch(policy)?;
        self.window.request_redraw();
        Ok(())
    }

    pub fn set_anchor(&mut self, anchor: Anchor) -> Result<(), Error> {
        self.engine.set_anchor(anchor)?;
        self.window.request_redraw();
        Ok(())
    }

    pub fn resize_canvas(&mut self, size: Size) -> Result<(), Error> {
        self.engine.resize_canvas(size)?;
        self.window.request_redraw();
        Ok(())
    }

    /// Re-acquire the surface at the window's new size and redraw.
    pub fn handle_resize(&mut self, size: PhysicalSize<u32>) -> Result<(), Error> {
        let viewport = viewport_of(size);
        self.engine.handle_resize(viewport)?;
        resize_surface(&mut self.surface, viewport)?;
        self.window.request_redraw();
        Ok(())
    }

    /// Copy the current frame to the window.
    pub fn present(&mut self) -> Result<(), Error> {
        self.engine.present(&mut self.surface)
    }

    #[must_use]
    pub const fn fitted_rect(&self) -> FitRect {
        self.engine.fitted_rect()
    }

    #[must_use]
    pub const fn engine(&self) -> &CanvasEngine {
        &self.engine
    }

    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl Presenter for WindowSurface {
    fn present(&mut self, frame: &PixelBuffer) -> Result<(), Error> {
        let mut buffer = self.buffer_mut()?;
        if !copy_frame(&mut buffer, frame) {
            warn!(
                surface = buffer.len(),
                frame = frame.pixels().len(),
                "surface and frame sizes differ; skipping frame",
            );
            return Ok(());
        }
        buffer.present()?;
        Ok(())
    }
}

/// Convert `frame` into the surface format. Returns false, leaving `dst`
/// untouched, when the sizes disagree.
fn copy_frame(dst: &mut [u32], frame: &PixelBuffer) -> bool {
    if dst.len() != frame.pixels().len() {
        return false;
    }
    for (out, px) in dst.iter_mut().zip(frame.pixels()) {
        *out = to_xrgb(*px);
    }
    true
}

fn window_attributes(cfg: &WindowConfig) -> WindowAttributes {
    let flags = cfg.flags;
    let attrs = Window::default_attributes()
        .with_title(cfg.title.clone())
        .with_visible(!flags.hidden)
        .with_decorations(!flags.borderless)
        .with_resizable(flags.resizable)
        .with_maximized(flags.maximized);
    let attrs = if flags.high_dpi {
        attrs.with_inner_size(LogicalSize::new(f64::from(cfg.width), f64::from(cfg.height)))
    } else {
        attrs.with_inner_size(PhysicalSize::new(cfg.width, cfg.height))
    };
    if flags.fullscreen {
        attrs.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attrs
    }
}

// Flags winit only exposes on a live window.
fn apply_runtime_flags(window: &Window, flags: WindowFlags) {
    if flags.minimized {
        window.set_minimized(true);
    }
    if flags.input_grabbed {
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Confined)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
        if let Err(err) = grabbed {
            warn!(error = %err, "cursor grab unavailable on this platform");
        }
    }
    if flags.gpu_surface {
        debug!("gpu-surface requested; presenting through the software surface");
    }
}

fn viewport_of(size: PhysicalSize<u32>) -> Size {
    Size::new(size.width.max(1), size.height.max(1))
}

fn resize_surface(surface: &mut WindowSurface, viewport: Size) -> Result<(), Error> {
    if let (Some(width), Some(height)) = (
        NonZeroU32::new(viewport.width),
        NonZeroU32::new(viewport.height),
    ) {
        surface.resize(width, height)?;
    }
    Ok(())
}

struct ViewerApp<A> {
    cfg: Configuration,
    app: A,
    window: Option<CanvasWindow>,
    failure: Option<anyhow::Error>,
    next_frame: Instant,
}

impl<A: CanvasApp> ViewerApp<A> {
    fn new(cfg: Configuration, app: A) -> Self {
        Self {
            cfg,
            app,
            window: None,
            failure: None,
            next_frame: Instant::now(),
        }
    }

    fn frame_interval(&self) -> Duration {
        self.cfg.frame_interval
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!(error = ?err, "canvas window stopping");
        self.failure.get_or_insert(err);
        event_loop.exit();
    }
}

impl<A: CanvasApp> ApplicationHandler for ViewerApp<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let mut window = match CanvasWindow::create(event_loop, &self.cfg) {
            Ok(window) => window,
            Err(err) => {
                let err = anyhow::Error::new(err).context("failed to open canvas window");
                self.fail(event_loop, err);
                return;
            }
        };
        if let Err(err) = self.app.init(&mut window) {
            self.fail(event_loop, err.context("canvas program init failed"));
            return;
        }
        window.window().request_redraw();
        self.window = Some(window);
        self.next_frame = Instant::now();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.as_mut() else {
            return;
        };
        if window.window().id() != window_id {
            return;
        }

        let result = match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                info!("canvas window close requested");
                event_loop.exit();
                Ok(())
            }
            WindowEvent::Resized(size) => window.handle_resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = window.window().inner_size();
                window.handle_resize(size)
            }
            WindowEvent::RedrawRequested => window.present(),
            _ => Ok(()),
        };
        if let Err(err) = result {
            self.fail(event_loop, err.into());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let interval = self.frame_interval();
        let Some(window) = self.window.as_mut() else {
            return;
        };
        let now = Instant::now();
        if now >= self.next_frame {
            if let Err(err) = self.app.update(window) {
                self.fail(event_loop, err.context("canvas program update failed"));
                return;
            }
            window.window().request_redraw();
            self.next_frame = now + interval;
        }

        if interval.is_zero() {
            event_loop.set_control_flow(ControlFlow::Poll);
        } else {
            event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if self.window.take().is_some() {
            info!("canvas window released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::color::pack_rgb;

    #[test]
    fn frame_is_converted_to_xrgb() {
        let mut frame = PixelBuffer::new(Size::new(2, 1)).unwrap();
        frame.fill(pack_rgb(0x12, 0x34, 0x56));
        let mut dst = [0u32; 2];
        assert!(copy_frame(&mut dst, &frame));
        assert_eq!(dst, [0x0012_3456; 2]);
    }

    #[test]
    fn mismatched_surface_is_left_untouched() {
        let frame = PixelBuffer::new(Size::new(2, 2)).unwrap();
        let mut dst = [7u32; 3];
        assert!(!copy_frame(&mut dst, &frame));
        assert_eq!(dst, [7; 3]);
    }

    #[test]
    fn zero_sized_window_maps_to_unit_viewport() {
        assert_eq!(viewport_of(PhysicalSize::new(0, 0)), Size::new(1, 1));
        assert_eq!(viewport_of(PhysicalSize::new(640, 0)), Size::new(640, 1));
    }
}
