/// Sum of Absolute Differences (SAD) / Manhattan distance on packed RGB grids.
use rayon::prelude::*;

use crate::grid::PixelGrid;

// rows per rayon task; keeps task overhead low on the small display resolutions
const MIN_ROWS_PER_TASK: usize = 16;

/// per-pixel, per-channel |a - b| as a new grid (the residual image).
/// both grids must have the same dimensions.
pub fn abs_diff_grid(a: &PixelGrid, b: &PixelGrid) -> PixelGrid {
    profiling::scope!("abs_diff_grid");
    debug_assert_eq!(a.width(), b.width());
    debug_assert_eq!(a.height(), b.height());

    let row_bytes = a.width() as usize * crate::grid::CHANNELS;
    let mut out = vec![0u8; a.as_raw().len()];

    out.par_chunks_mut(row_bytes)
        .with_min_len(MIN_ROWS_PER_TASK)
        .zip(a.as_raw().par_chunks(row_bytes))
        .zip(b.as_raw().par_chunks(row_bytes))
        .for_each(|((dst, ra), rb)| {
            for ((d, &x), &y) in dst.iter_mut().zip(ra).zip(rb) {
                *d = x.abs_diff(y);
            }
        });

    PixelGrid::from_raw_parts(a.width(), a.height(), out)
}

/// whole-grid SAD over RGB, parallel over rows
pub fn sad_rgb_parallel(target: &PixelGrid, current: &PixelGrid) -> u64 {
    profiling::scope!("sad_rgb_parallel");
    debug_assert_eq!(target.as_raw().len(), current.as_raw().len());

    let row_bytes = target.width() as usize * crate::grid::CHANNELS;
    target
        .as_raw()
        .par_chunks(row_bytes)
        .with_min_len(MIN_ROWS_PER_TASK)
        .zip(current.as_raw().par_chunks(row_bytes))
        .map(|(t, c)| t.iter().zip(c).map(|(&x, &y)| x.abs_diff(y) as u64).sum::<u64>())
        .sum()
}
