//! Owned packed-pixel buffers used for the canvas and the screen copy.

use crate::error::Error;
use crate::processing::color::BLACK;
use crate::processing::layout::Size;

/// A row-major buffer of packed pixels.
///
/// Replacing the dimensions discards the old contents and reallocates;
/// memory is released when the buffer is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    size: Size,
    pixels: Vec<u32>,
}

impl PixelBuffer {
    /// Allocate an opaque black buffer.
    ///
    /// # Errors
    /// [`Error::EmptyDimension`] for a zero side and [`Error::Allocation`]
    /// if the pixels cannot be reserved.
    pub fn new(size: Size) -> Result<Self, Error> {
        size.require_positive("buffer")?;
        Ok(Self {
            size,
            pixels: alloc_pixels(size.pixel_count(), BLACK)?,
        })
    }

    /// Reallocate at `size`; previous contents are dropped.
    pub fn reallocate(&mut self, size: Size) -> Result<(), Error> {
        *self = Self::new(size)?;
        Ok(())
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.size.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.size.height
    }

    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Raw bytes in host order.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.size.width as usize + x as usize)
            .copied()
    }

    /// Pixels of row `y`.
    ///
    /// # Panics
    /// If `y` is not below [`PixelBuffer::height`]. Use [`PixelBuffer::get`]
    /// for checked access.
    #[must_use]
    pub fn row(&self, y: u32) -> &[u32] {
        let w = self.size.width as usize;
        let start = y as usize * w;
        &self.pixels[start..start + w]
    }

    /// Mutable pixels of row `y`.
    ///
    /// # Panics
    /// If `y` is not below [`PixelBuffer::height`].
    pub fn row_mut(&mut self, y: u32) -> &mut [u32] {
        let w = self.size.width as usize;
        let start = y as usize * w;
        &mut self.pixels[start..start + w]
    }

    pub fn fill(&mut self, value: u32) {
        self.pixels.fill(value);
    }
}

/// Reserve exactly `count` pixels, surfacing allocation failure as an error.
pub(crate) fn alloc_pixels(count: u64, value: u32) -> Result<Vec<u32>, Error> {
    let len = usize::try_from(count).map_err(|_| Error::Allocation { pixels: count })?;
    let mut pixels = Vec::new();
    pixels
        .try_reserve_exact(len)
        .map_err(|_| Error::Allocation { pixels: count })?;
    pixels.resize(len, value);
    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_opaque_black() {
        let buf = PixelBuffer::new(Size::new(3, 2)).unwrap();
        assert_eq!(buf.pixels().len(), 6);
        assert!(buf.pixels().iter().all(|px| *px == BLACK));
    }

    #[test]
    fn reallocate_discards_contents() {
        let mut buf = PixelBuffer::new(Size::new(2, 2)).unwrap();
        buf.fill(0xFFFF_FFFF);
        buf.reallocate(Size::new(4, 1)).unwrap();
        assert_eq!(buf.size(), Size::new(4, 1));
        assert!(buf.pixels().iter().all(|px| *px == BLACK));
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(matches!(
            PixelBuffer::new(Size::new(0, 5)),
            Err(Error::EmptyDimension { .. })
        ));
    }

    #[test]
    fn rows_and_points_agree() {
        let mut buf = PixelBuffer::new(Size::new(3, 2)).unwrap();
        buf.row_mut(1)[2] = 7;
        assert_eq!(buf.get(2, 1), Some(7));
        assert_eq!(buf.get(3, 1), None);
        assert_eq!(buf.as_bytes().len(), 24);
    }

    #[test]
    #[should_panic]
    fn row_past_height_panics() {
        let buf = PixelBuffer::new(Size::new(3, 2)).unwrap();
        let _ = buf.row(2);
    }
}
