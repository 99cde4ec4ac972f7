/// Progressive detail: candidate rectangles start large (coarse structure) and
/// shrink toward single pixels as the rectangle budget is consumed.

/// Square candidate side for the next batch.
///
/// `t = (rects_so_far / total_budget)^2` eases the shrink (slow at first, fast
/// near the end); the divisor interpolates from 3 (a third of the width) to
/// `width / 1.5` (about one and a half pixels). Never returns less than 1.
pub fn rect_size(rects_so_far: usize, total_budget: usize, width: u32) -> u32 {
    profiling::scope!("rect_size");

    if total_budget == 0 || width == 0 {
        return 1;
    }

    let percent_done = rects_so_far as f64 / total_budget as f64;
    let t = percent_done.powf(2.0);
    let w = width as f64;
    let denom = 3.0 * (1.0 - t) + (w / 1.5) * t;
    let size = (w / denom).floor();

    if size.is_finite() && size >= 1.0 {
        size as u32
    } else {
        1
    }
}
