use crate::grid::Rect;

/// Enumerate candidate placements of a `size_w` x `size_h` rectangle over a
/// `width` x `height` image.
///
/// A logical grid of `ceil(iterations * width / size_w)` columns and
/// `ceil(iterations * height / size_h)` rows is laid over the image; cell
/// (cx, cy) puts the rect's top-left at
/// `(min(cx * size_w / iterations, width - size_w - 1), ...)`, truncated.
/// `iterations > 1` samples positions at sub-rect offsets so neighbouring
/// candidates overlap. Duplicates are kept (they only produce duplicate scores).
/// Origins are clamped to >= 0 and any rect that would still be degenerate or
/// leave the image is skipped.
pub fn generate_candidates(width: u32, height: u32, size_w: u32, size_h: u32, iterations: f64) -> Vec<Rect> {
    profiling::scope!("generate_candidates");

    if width == 0 || height == 0 || size_w == 0 || size_h == 0 {
        return Vec::new();
    }

    let iters = if iterations.is_finite() { iterations.max(1.0) } else { 1.0 };
    let (w, h) = (width as f64, height as f64);
    let (sw, sh) = (size_w as f64, size_h as f64);

    let x_slices = (iters * w / sw).ceil() as u64;
    let y_slices = (iters * h / sh).ceil() as u64;

    // right/bottom clamp keeps one pixel of slack
    let x_max = w - sw - 1.0;
    let y_max = h - sh - 1.0;

    let mut rects = Vec::with_capacity((x_slices * y_slices) as usize);
    for cy in 0..y_slices {
        let y1 = origin(cy, sh, iters, y_max);
        for cx in 0..x_slices {
            let x1 = origin(cx, sw, iters, x_max);
            let rect = Rect::from_origin_size(x1, y1, size_w, size_h);
            if rect.fits_within(width, height) {
                rects.push(rect);
            }
        }
    }
    rects
}

#[inline]
fn origin(cell: u64, size: f64, iters: f64, max_origin: f64) -> u32 {
    let pos = (cell as f64 * size / iters).min(max_origin);
    // truncate toward zero, then clamp negative origins (size >= extent) to the edge
    (pos.trunc() as i64).max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_density_tiles_the_image() {
        let rects = generate_candidates(80, 80, 26, 26, 1.0);
        // ceil(80/26) = 4 per axis
        assert_eq!(rects.len(), 16);
        assert_eq!(rects[0], Rect::new(0, 0, 26, 26));
        assert_eq!(rects[1], Rect::new(26, 0, 52, 26));
        // last column clamps to 80 - 26 - 1 = 53
        assert_eq!(rects[3], Rect::new(53, 0, 79, 26));
        assert_eq!(rects[15], Rect::new(53, 53, 79, 79));
    }

    #[test]
    fn test_higher_density_samples_sub_offsets() {
        let rects = generate_candidates(80, 80, 26, 26, 2.0);
        // ceil(2*80/26) = 7 per axis
        assert_eq!(rects.len(), 49);
        assert_eq!(rects[1], Rect::new(13, 0, 39, 26));
    }

    #[test]
    fn test_fractional_density_is_truncated() {
        let rects = generate_candidates(10, 10, 3, 3, 1.5);
        // ceil(1.5 * 10 / 3) = 5 per axis, step 2.0
        assert_eq!(rects.len(), 25);
        let xs: Vec<u32> = rects.iter().take(5).map(|r| r.x1).collect();
        assert_eq!(xs, vec![0, 2, 4, 6, 6]);
    }

    #[test]
    fn test_density_below_one_is_raised_to_one() {
        assert_eq!(generate_candidates(80, 80, 26, 26, 0.2), generate_candidates(80, 80, 26, 26, 1.0));
        assert_eq!(generate_candidates(80, 80, 26, 26, f64::NAN), generate_candidates(80, 80, 26, 26, 1.0));
    }

    #[test]
    fn test_all_candidates_in_bounds() {
        for (w, h) in [(80u32, 80u32), (176, 176), (7, 3), (50, 20)] {
            for size in 1..=w.max(h) + 2 {
                for iters in [1.0, 1.7, 3.0] {
                    for r in generate_candidates(w, h, size, size, iters) {
                        assert!(r.x2 <= w && r.y2 <= h, "{r:?} outside {w}x{h}");
                        assert!(!r.is_empty());
                    }
                }
            }
        }
    }

    #[test]
    fn test_size_equal_to_extent_still_yields_full_rect() {
        // origin clamps from -1 to 0, rect (0,0,10,10) fits exactly
        let rects = generate_candidates(10, 10, 10, 10, 1.0);
        assert_eq!(rects, vec![Rect::new(0, 0, 10, 10)]);
    }

    #[test]
    fn test_size_larger_than_extent_yields_nothing() {
        assert!(generate_candidates(10, 10, 11, 11, 1.0).is_empty());
        // wide image, square size taller than it
        assert!(generate_candidates(176, 20, 58, 58, 1.0).is_empty());
    }
}
