//! Canvas-to-viewport fit computation.
//!
//! Every stretch policy is a pure function from `(canvas, viewport)` to the
//! size the canvas occupies on screen. Derived sides are truncated, and are
//! never clamped to the viewport: the scaler clips whatever overflows.

use serde::Deserialize;

use crate::error::Error;

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub const fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub(crate) fn require_positive(self, what: &'static str) -> Result<Self, Error> {
        if self.is_empty() {
            return Err(Error::EmptyDimension {
                what,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self)
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// How the canvas aspect ratio interacts with the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StretchPolicy {
    /// Draw at native size; the viewport clips.
    #[default]
    NoStretch,
    /// Fill the viewport, ignoring aspect ratio.
    Full,
    /// Map the canvas's larger side onto the matching viewport side.
    LargerBorder,
    /// Map the canvas's smaller side onto the matching viewport side.
    SmallerBorder,
}

impl StretchPolicy {
    pub const ALL: [Self; 4] = [
        Self::NoStretch,
        Self::Full,
        Self::LargerBorder,
        Self::SmallerBorder,
    ];

    /// Whether the blit resamples the canvas.
    #[must_use]
    pub const fn scales(self) -> bool {
        !matches!(self, Self::NoStretch)
    }

    /// The policy after `self` in [`StretchPolicy::ALL`], wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Where the fitted rectangle sits inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    #[default]
    TopLeft,
    Center,
}

/// Destination rectangle of the canvas inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FitRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FitRect {
    #[must_use]
    pub const fn size(self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Compute the size at which `canvas` is drawn into `viewport`.
///
/// # Errors
/// [`Error::EmptyDimension`] if either size has a zero side, and
/// [`Error::FitOverflow`] if a proportional side exceeds `u32::MAX`.
pub fn fit(canvas: Size, viewport: Size, policy: StretchPolicy) -> Result<Size, Error> {
    canvas.require_positive("canvas")?;
    viewport.require_positive("viewport")?;

    use std::cmp::Ordering::{Equal, Greater, Less};
    match (policy, canvas.width.cmp(&canvas.height)) {
        (StretchPolicy::NoStretch, _) => Ok(canvas),
        (StretchPolicy::Full, _) | (_, Equal) => Ok(viewport),
        (StretchPolicy::SmallerBorder, Less) | (StretchPolicy::LargerBorder, Greater) => {
            width_first(canvas, viewport)
        }
        (StretchPolicy::SmallerBorder, Greater) | (StretchPolicy::LargerBorder, Less) => {
            height_first(canvas, viewport)
        }
    }
}

/// Fill the viewport width and derive the height from the canvas aspect.
fn width_first(canvas: Size, viewport: Size) -> Result<Size, Error> {
    let height = scale_side(viewport.width, canvas.height, canvas.width)
        .ok_or_else(|| overflow(canvas, viewport))?;
    Ok(Size::new(viewport.width, height))
}

/// Fill the viewport height and derive the width from the canvas aspect.
fn height_first(canvas: Size, viewport: Size) -> Result<Size, Error> {
    let width = scale_side(viewport.height, canvas.width, canvas.height)
        .ok_or_else(|| overflow(canvas, viewport))?;
    Ok(Size::new(width, viewport.height))
}

// floor(a * b / c) in 64-bit
fn scale_side(a: u32, b: u32, c: u32) -> Option<u32> {
    let wide = u64::from(a) * u64::from(b) / u64::from(c);
    u32::try_from(wide).ok()
}

fn overflow(canvas: Size, viewport: Size) -> Error {
    Error::FitOverflow {
        canvas_w: canvas.width,
        canvas_h: canvas.height,
        viewport_w: viewport.width,
        viewport_h: viewport.height,
    }
}

/// Position a fitted size inside the viewport.
///
/// A fitted side larger than the viewport is anchored at 0 on that axis.
#[must_use]
pub fn place(size: Size, viewport: Size, anchor: Anchor) -> FitRect {
    let (x, y) = match anchor {
        Anchor::TopLeft => (0, 0),
        Anchor::Center => center_offset(size.width, size.height, viewport.width, viewport.height),
    };
    FitRect {
        x,
        y,
        width: size.width,
        height: size.height,
    }
}

pub fn center_offset(inner_w: u32, inner_h: u32, outer_w: u32, outer_h: u32) -> (u32, u32) {
    let ox = outer_w.saturating_sub(inner_w) / 2;
    let oy = outer_h.saturating_sub(inner_h) / 2;
    (ox, oy)
}
