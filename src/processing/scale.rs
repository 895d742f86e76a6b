//! Copying the canvas into the screen buffer at a fit rectangle.

use fast_image_resize as fir;

use crate::buffer::{PixelBuffer, alloc_pixels};
use crate::error::Error;
use crate::processing::layout::FitRect;

/// Nearest-neighbour scaler with a reusable destination scratch buffer.
pub struct Scaler {
    resizer: fir::Resizer,
    scratch: Vec<u32>,
}

impl std::fmt::Debug for Scaler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scaler")
            .field("scratch_len", &self.scratch.len())
            .finish_non_exhaustive()
    }
}

impl Default for Scaler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scaler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            resizer: fir::Resizer::new(),
            scratch: Vec::new(),
        }
    }

    /// Draw `src` into `dst` at `rect`, clipping to `dst`'s bounds.
    ///
    /// When `scaled` is false, or `rect` already matches the source size, the
    /// pixels are copied 1:1 and `rect`'s size only bounds the copy. Scaled
    /// draws resample only the part of `rect` that lands inside `dst`, so the
    /// scratch buffer never outgrows the destination.
    pub fn blit(
        &mut self,
        src: &PixelBuffer,
        dst: &mut PixelBuffer,
        rect: FitRect,
        scaled: bool,
    ) -> Result<(), Error> {
        let visible = visible_rect(rect, dst);
        if visible.width == 0 || visible.height == 0 {
            return Ok(());
        }
        if !scaled || rect.size() == src.size() {
            copy_clipped(src.pixels(), src.width(), rect, dst);
            return Ok(());
        }

        let needed = visible.size().pixel_count();
        if (self.scratch.len() as u64) < needed {
            self.scratch = alloc_pixels(needed, 0)?;
        }
        let scratch = &mut self.scratch[..needed as usize];

        // Source region mapping onto the visible part, at the full rect's scale.
        let crop_w = f64::from(visible.width) * f64::from(src.width()) / f64::from(rect.width);
        let crop_h = f64::from(visible.height) * f64::from(src.height()) / f64::from(rect.height);

        let src_view = fir::images::ImageRef::new(
            src.width(),
            src.height(),
            src.as_bytes(),
            fir::PixelType::U8x4,
        )?;
        let mut dst_view = fir::images::Image::from_slice_u8(
            visible.width,
            visible.height,
            bytemuck::cast_slice_mut(scratch),
            fir::PixelType::U8x4,
        )?;
        let options = fir::ResizeOptions::new()
            .resize_alg(fir::ResizeAlg::Nearest)
            .crop(0.0, 0.0, crop_w, crop_h);
        self.resizer.resize(&src_view, &mut dst_view, Some(&options))?;

        copy_clipped(&self.scratch[..needed as usize], visible.width, visible, dst);
        Ok(())
    }
}

/// The part of `rect` inside `dst`. Its origin is always `rect`'s origin.
fn visible_rect(rect: FitRect, dst: &PixelBuffer) -> FitRect {
    FitRect {
        width: dst.width().saturating_sub(rect.x).min(rect.width),
        height: dst.height().saturating_sub(rect.y).min(rect.height),
        ..rect
    }
}

/// Copy the visible part of a `rect`-sized image with row stride `stride`.
fn copy_clipped(src: &[u32], stride: u32, rect: FitRect, dst: &mut PixelBuffer) {
    let visible = visible_rect(rect, dst);
    let vis_w = visible.width.min(stride) as usize;
    let src_rows = (src.len() / stride.max(1) as usize) as u32;
    let vis_h = visible.height.min(src_rows);
    if vis_w == 0 {
        return;
    }
    for row in 0..vis_h {
        let from = row as usize * stride as usize;
        let line = dst.row_mut(rect.y + row);
        let to = rect.x as usize;
        line[to..to + vis_w].copy_from_slice(&src[from..from + vis_w]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::color::{BLACK, pack_rgb};
    use crate::processing::layout::Size;

    fn checker(size: Size) -> PixelBuffer {
        let mut buf = PixelBuffer::new(size).unwrap();
        for y in 0..size.height {
            for (x, px) in buf.row_mut(y).iter_mut().enumerate() {
                *px = pack_rgb(x as u8, y as u8, 0);
            }
        }
        buf
    }

    fn rect(x: u32, y: u32, width: u32, height: u32) -> FitRect {
        FitRect {
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn native_copy_clips_to_destination() {
        let src = checker(Size::new(4, 4));
        let mut dst = PixelBuffer::new(Size::new(3, 2)).unwrap();
        Scaler::new()
            .blit(&src, &mut dst, rect(0, 0, 4, 4), false)
            .unwrap();
        assert_eq!(dst.row(0), &src.row(0)[..3]);
        assert_eq!(dst.row(1), &src.row(1)[..3]);
    }

    #[test]
    fn offset_copy_leaves_border_untouched() {
        let src = checker(Size::new(2, 2));
        let mut dst = PixelBuffer::new(Size::new(4, 4)).unwrap();
        Scaler::new()
            .blit(&src, &mut dst, rect(1, 1, 2, 2), false)
            .unwrap();
        assert_eq!(dst.get(0, 0), Some(BLACK));
        assert_eq!(dst.get(1, 1), src.get(0, 0));
        assert_eq!(dst.get(2, 2), src.get(1, 1));
        assert_eq!(dst.get(3, 3), Some(BLACK));
    }

    #[test]
    fn integer_upscale_replicates_pixels() {
        let src = checker(Size::new(2, 2));
        let mut dst = PixelBuffer::new(Size::new(4, 4)).unwrap();
        Scaler::new()
            .blit(&src, &mut dst, rect(0, 0, 4, 4), true)
            .unwrap();
        assert_eq!(dst.get(0, 0), src.get(0, 0));
        assert_eq!(dst.get(1, 1), src.get(0, 0));
        assert_eq!(dst.get(3, 0), src.get(1, 0));
        assert_eq!(dst.get(0, 3), src.get(0, 1));
        assert_eq!(dst.get(3, 3), src.get(1, 1));
    }

    #[test]
    fn scaled_overflow_is_clipped() {
        let mut src = PixelBuffer::new(Size::new(1, 2)).unwrap();
        src.fill(pack_rgb(9, 9, 9));
        let mut dst = PixelBuffer::new(Size::new(4, 4)).unwrap();
        Scaler::new()
            .blit(&src, &mut dst, rect(0, 0, 4, 8), true)
            .unwrap();
        assert!(dst.pixels().iter().all(|px| *px == pack_rgb(9, 9, 9)));
    }

    #[test]
    fn scaled_scratch_is_bounded_by_destination() {
        let mut src = PixelBuffer::new(Size::new(1, 3000)).unwrap();
        src.fill(pack_rgb(1, 2, 3));
        let mut dst = PixelBuffer::new(Size::new(30, 30)).unwrap();
        let mut scaler = Scaler::new();
        scaler
            .blit(&src, &mut dst, rect(0, 0, 30, 90_000), true)
            .unwrap();
        assert!(scaler.scratch.len() <= 900);
        assert!(dst.pixels().iter().all(|px| *px == pack_rgb(1, 2, 3)));
    }

    #[test]
    fn clipped_scale_keeps_full_rect_mapping() {
        let src = checker(Size::new(8, 4));
        let mut dst = PixelBuffer::new(Size::new(10, 10)).unwrap();
        Scaler::new()
            .blit(&src, &mut dst, rect(0, 0, 20, 10), true)
            .unwrap();
        // nearest source column of x is floor((x + 0.5) * 8 / 20)
        assert_eq!(dst.get(0, 0), src.get(0, 0));
        assert_eq!(dst.get(4, 0), src.get(1, 0));
        assert_eq!(dst.get(9, 9), src.get(3, 3));
    }
}
