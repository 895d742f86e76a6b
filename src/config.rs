use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::processing::layout::{Anchor, Size, StretchPolicy};

/// Window creation flags. Each one is forwarded to the windowing layer
/// independently of the others.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct WindowFlags {
    /// Borderless fullscreen on the current monitor.
    pub fullscreen: bool,
    /// Create the window invisible.
    pub hidden: bool,
    /// No title bar or frame.
    pub borderless: bool,
    pub resizable: bool,
    pub maximized: bool,
    pub minimized: bool,
    /// Confine the cursor to the window.
    pub input_grabbed: bool,
    /// Treat the configured size as logical pixels scaled by the monitor.
    pub high_dpi: bool,
    /// Request a GPU-backed surface. The software presenter only logs it.
    pub gpu_surface: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub flags: WindowFlags,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "stretch-canvas".to_string(),
            width: 500,
            height: 500,
            flags: WindowFlags::default(),
        }
    }
}

impl WindowConfig {
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Title, size and creation flags of the host window.
    pub window: WindowConfig,
    /// Native resolution of the canvas.
    pub canvas: Size,
    /// How the canvas is stretched into the window.
    pub stretch: StretchPolicy,
    /// Where the stretched canvas sits inside the window.
    pub anchor: Anchor,
    /// Delay between frames; zero redraws continuously.
    #[serde(with = "humantime_serde")]
    pub frame_interval: Duration,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            canvas: Size::new(125, 250),
            stretch: StretchPolicy::default(),
            anchor: Anchor::default(),
            frame_interval: Duration::from_millis(16),
        }
    }
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_yaml_str(&s)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        serde_yaml::from_str(s).context("failed to parse configuration")
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            !self.window.title.trim().is_empty(),
            "window.title must not be empty"
        );
        ensure!(
            !self.window.size().is_empty(),
            "window.width and window.height must be greater than zero"
        );
        ensure!(
            !self.canvas.is_empty(),
            "canvas.width and canvas.height must be greater than zero"
        );
        ensure!(
            !(self.window.flags.maximized && self.window.flags.minimized),
            "window.flags cannot request both maximized and minimized"
        );
        Ok(self)
    }
}
