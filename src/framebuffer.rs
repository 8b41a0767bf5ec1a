use std::ops::Range;

use crate::render::RenderError;

pub const BYTES_PER_PIXEL: usize = 4;

/// Caller-owned 32-bit pixel buffer.
///
/// Rows start every `pitch` bytes, which may be more than `width * 4` when the
/// owner pads its rows. Pixels are stored as native-endian `0xAARRGGBB`.
pub struct Framebuffer<'a> {
    pixels: &'a mut [u8],
    width: u32,
    height: u32,
    pitch: usize,
}

/// Contiguous run of rows handed to a single worker.
pub struct Band<'a> {
    pub index: usize,
    pub rows: Range<u32>,
    pixels: &'a mut [u8],
    width: u32,
    pitch: usize,
}

impl<'a> Framebuffer<'a> {
    pub fn new(pixels: &'a mut [u8], width: u32, height: u32, pitch: usize) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyImage { width, height });
        }

        let row_bytes = width as usize * BYTES_PER_PIXEL;
        let required = pitch * height as usize;

        if pitch < row_bytes || pixels.len() < required {
            return Err(RenderError::FramebufferTooSmall {
                width,
                height,
                pitch,
                len: pixels.len(),
            });
        }

        Ok(Framebuffer {
            pixels: &mut pixels[..required],
            width,
            height,
            pitch,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        let offset = y as usize * self.pitch + x as usize * BYTES_PER_PIXEL;
        let mut bytes = [0; BYTES_PER_PIXEL];
        bytes.copy_from_slice(&self.pixels[offset..offset + BYTES_PER_PIXEL]);
        u32::from_ne_bytes(bytes)
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: u32) {
        debug_assert!(x < self.width && y < self.height);
        let offset = y as usize * self.pitch + x as usize * BYTES_PER_PIXEL;
        self.pixels[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&pixel.to_ne_bytes());
    }

    /// Splits the rows into `count` equal bands that borrow disjoint memory.
    ///
    /// `count` must divide the height; the dispatcher checks this first.
    pub fn bands_mut(&mut self, count: usize) -> Vec<Band<'_>> {
        debug_assert!(count > 0 && self.height as usize % count == 0);
        let rows_per_band = self.height / count as u32;
        let (width, pitch) = (self.width, self.pitch);

        self.pixels
            .chunks_mut(rows_per_band as usize * pitch)
            .enumerate()
            .map(|(index, pixels)| {
                let first_row = index as u32 * rows_per_band;
                Band {
                    index,
                    rows: first_row..first_row + rows_per_band,
                    pixels,
                    width,
                    pitch,
                }
            })
            .collect()
    }
}

impl Band<'_> {
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Writes a pixel; `y` is an image row inside this band.
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: u32) {
        debug_assert!(x < self.width && self.rows.contains(&y));
        let offset = (y - self.rows.start) as usize * self.pitch + x as usize * BYTES_PER_PIXEL;
        self.pixels[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&pixel.to_ne_bytes());
    }
}
