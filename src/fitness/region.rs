/// per-region color aggregates over a PixelGrid.
/// all three functions are pure and reject zero-area or out-of-bounds rects with
/// `EmptyRegion`, so they are safe to call from parallel scoring workers.
use crate::error::{Img2LogicError, Result};
use crate::grid::{Color, PixelGrid, Rect, CHANNELS};

#[inline]
fn check_region(grid: &PixelGrid, rect: &Rect) -> Result<()> {
    if rect.fits_within(grid.width(), grid.height()) {
        Ok(())
    } else {
        Err(Img2LogicError::EmptyRegion { rect: *rect })
    }
}

/// sum of r+g+b over every pixel in `rect`.
/// when `grid` is a residual image this is the region's current error.
pub fn sum_channels(grid: &PixelGrid, rect: &Rect) -> Result<u64> {
    profiling::scope!("sum_channels");
    check_region(grid, rect)?;

    let mut sum = 0u64;
    for y in rect.y1..rect.y2 {
        sum += grid
            .row_span(y, rect.x1, rect.x2)
            .iter()
            .map(|&c| c as u64)
            .sum::<u64>();
    }
    Ok(sum)
}

/// per-channel mean over `rect`, truncated toward zero
pub fn average_color(grid: &PixelGrid, rect: &Rect) -> Result<Color> {
    profiling::scope!("average_color");
    check_region(grid, rect)?;

    let mut rgb_sum = [0u64; 3];
    for y in rect.y1..rect.y2 {
        for px in grid.row_span(y, rect.x1, rect.x2).chunks_exact(CHANNELS) {
            rgb_sum[0] += px[0] as u64;
            rgb_sum[1] += px[1] as u64;
            rgb_sum[2] += px[2] as u64;
        }
    }

    let count = rect.area();
    Ok(Color::new(
        (rgb_sum[0] / count) as u8,
        (rgb_sum[1] / count) as u8,
        (rgb_sum[2] / count) as u8,
    ))
}

/// sum over `rect` of |pixel - color| on each channel (the error left after
/// painting `rect` flat with `color`)
pub fn sum_absolute_deviation(grid: &PixelGrid, rect: &Rect, color: Color) -> Result<u64> {
    profiling::scope!("sum_absolute_deviation");
    check_region(grid, rect)?;

    let mut sum = 0u64;
    for y in rect.y1..rect.y2 {
        for px in grid.row_span(y, rect.x1, rect.x2).chunks_exact(CHANNELS) {
            sum += px[0].abs_diff(color.r) as u64
                + px[1].abs_diff(color.g) as u64
                + px[2].abs_diff(color.b) as u64;
        }
    }
    Ok(sum)
}
