// pixel grid and rectangle primitives shared by the engine and the encoder.
//
// rects are half-open on both axes: (x1, y1, x2, y2) covers x in [x1, x2), y in [y1, y2).

use serde::{Deserialize, Serialize};

use crate::error::{Img2LogicError, Result};

/// bytes per pixel in a PixelGrid buffer (packed RGB, no alpha)
pub const CHANNELS: usize = 3;

/// flat RGB color, one byte per channel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }
}

/// half-open axis-aligned rectangle in image pixel coordinates.
/// field order matters: the derived Ord compares (x1, y1, x2, y2) lexicographically,
/// which is the tie-break the batch selector relies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Rect {
    #[inline]
    pub const fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Rect { x1, y1, x2, y2 }
    }

    /// rect of the given size with its top-left corner at (x, y)
    #[inline]
    pub const fn from_origin_size(x: u32, y: u32, w: u32, h: u32) -> Self {
        Rect { x1: x, y1: y, x2: x + w, y2: y + h }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    /// pixel count (zero for degenerate rects)
    #[inline]
    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x1 >= self.x2 || self.y1 >= self.y2
    }

    /// non-degenerate and fully inside a width x height grid
    #[inline]
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        !self.is_empty() && self.x2 <= width && self.y2 <= height
    }

    /// open-rectangle intersection: shared edges do not count as overlap
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        rects_overlap(self, other)
    }
}

/// true when the two rects share at least one pixel
#[inline]
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    // one is left of the other
    if a.x2 <= b.x1 || b.x2 <= a.x1 {
        return false;
    }
    // one is above the other
    if a.y2 <= b.y1 || b.y2 <= a.y1 {
        return false;
    }
    true
}

/// one accepted rectangle with its fill color. a RectangleList is an ordered
/// Vec of these: later entries paint over earlier ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaintedRect {
    pub rect: Rect,
    pub color: Color,
}

pub type RectangleList = Vec<PaintedRect>;

/// width x height grid of packed RGB pixels, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelGrid {
    /// all-black grid (the initial canvas)
    pub fn new_black(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width as usize * height as usize * CHANNELS],
        }
    }

    /// wrap a packed RGB buffer; the length must match the dimensions exactly
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 || data.len() != width as usize * height as usize * CHANNELS {
            return Err(Img2LogicError::EmptyImage { width, height });
        }
        Ok(Self { width, height, data })
    }

    /// buffer already known to match the dimensions (internal producers only)
    pub(crate) fn from_raw_parts(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize * CHANNELS);
        Self { width, height, data }
    }

    /// grid filled with a single color
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let mut grid = Self::new_black(width, height);
        for px in grid.data.chunks_exact_mut(CHANNELS) {
            px[0] = color.r;
            px[1] = color.g;
            px[2] = color.b;
        }
        grid
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// the rect covering the whole grid
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let idx = self.index(x, y);
        Color::new(self.data[idx], self.data[idx + 1], self.data[idx + 2])
    }

    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        let idx = self.index(x, y);
        self.data[idx] = color.r;
        self.data[idx + 1] = color.g;
        self.data[idx + 2] = color.b;
    }

    /// packed bytes of row `y` restricted to [x1, x2)
    #[inline]
    pub fn row_span(&self, y: u32, x1: u32, x2: u32) -> &[u8] {
        let start = self.index(x1, y);
        let end = start + (x2 - x1) as usize * CHANNELS;
        &self.data[start..end]
    }

    /// flat fill of `rect` with `color` (overwrite, no blending).
    /// the rect is clipped to the grid so a caller bug never writes out of bounds.
    pub fn fill_rect(&mut self, rect: &Rect, color: Color) {
        profiling::scope!("fill_rect");

        let x2 = rect.x2.min(self.width);
        let y2 = rect.y2.min(self.height);
        if rect.x1 >= x2 || rect.y1 >= y2 {
            return;
        }

        for y in rect.y1..y2 {
            let row_start = self.index(rect.x1, y);
            let row_end = row_start + (x2 - rect.x1) as usize * CHANNELS;
            for px in self.data[row_start..row_end].chunks_exact_mut(CHANNELS) {
                px[0] = color.r;
                px[1] = color.g;
                px[2] = color.b;
            }
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height, "pixel ({x},{y}) outside {}x{}", self.width, self.height);
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }
}
