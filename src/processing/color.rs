//! Packing of floating point channel intensities into 32-bit pixels.
//!
//! A packed word carries red in bits 0..8, green in 8..16, blue in 16..24
//! and a forced-opaque alpha in 24..32. This is a value layout and holds on
//! every host; [`to_xrgb`] converts to the format the window surface takes.

use image::RgbaImage;

use crate::error::Error;

pub const RED_SHIFT: u32 = 0;
pub const GREEN_SHIFT: u32 = 8;
pub const BLUE_SHIFT: u32 = 16;
pub const ALPHA_MASK: u32 = 0xFF00_0000;

/// Opaque black.
pub const BLACK: u32 = ALPHA_MASK;

/// A channel intensity in `0.0..=1.0`.
pub trait Intensity: Copy {
    /// Multiply by 255 and truncate. Out-of-range values saturate and NaN
    /// maps to 0.
    fn to_channel(self) -> u8;
}

impl Intensity for f32 {
    fn to_channel(self) -> u8 {
        (self * 255.0) as u8
    }
}

impl Intensity for f64 {
    fn to_channel(self) -> u8 {
        (self * 255.0) as u8
    }
}

#[must_use]
pub const fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << RED_SHIFT) | ((g as u32) << GREEN_SHIFT) | ((b as u32) << BLUE_SHIFT) | ALPHA_MASK
}

/// Pack pixel `index` of an interleaved RGB channel slice.
///
/// # Errors
/// [`Error::ChannelUnderflow`] if `channels` ends before the pixel's blue
/// component.
pub fn pack_pixel<T: Intensity>(channels: &[T], index: usize) -> Result<u32, Error> {
    let base = index.saturating_mul(3);
    match channels.get(base..base.saturating_add(3)) {
        Some(&[r, g, b]) => Ok(pack_rgb(r.to_channel(), g.to_channel(), b.to_channel())),
        _ => Err(Error::ChannelUnderflow {
            needed: base.saturating_add(3),
            got: channels.len(),
        }),
    }
}

/// Pack `dst.len()` pixels from `channels`.
///
/// The length is checked before any pixel is written, so a short input
/// leaves `dst` untouched. Trailing channels past `3 * dst.len()` are
/// ignored.
pub fn pack_into<T: Intensity>(dst: &mut [u32], channels: &[T]) -> Result<(), Error> {
    let needed = dst.len().saturating_mul(3);
    if channels.len() < needed {
        return Err(Error::ChannelUnderflow {
            needed,
            got: channels.len(),
        });
    }
    for (px, rgb) in dst.iter_mut().zip(channels.chunks_exact(3)) {
        *px = pack_rgb(rgb[0].to_channel(), rgb[1].to_channel(), rgb[2].to_channel());
    }
    Ok(())
}

/// Split a packed word into `[r, g, b, a]`.
#[must_use]
pub const fn unpack(word: u32) -> [u8; 4] {
    [
        (word >> RED_SHIFT) as u8,
        (word >> GREEN_SHIFT) as u8,
        (word >> BLUE_SHIFT) as u8,
        (word >> 24) as u8,
    ]
}

/// Convert a packed word to `0x00RRGGBB`.
#[must_use]
pub const fn to_xrgb(word: u32) -> u32 {
    let [r, g, b, _] = unpack(word);
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Pack an RGBA image row-major into `dst`, discarding its alpha.
///
/// Pixels past the shorter of `dst` and the image are left alone.
pub fn pack_image(dst: &mut [u32], img: &RgbaImage) {
    for (word, px) in dst.iter_mut().zip(img.pixels()) {
        *word = pack_rgb(px[0], px[1], px[2]);
    }
}
