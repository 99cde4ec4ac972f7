use rayon::prelude::*;

use crate::error::Result;
use crate::fitness::{abs_diff_grid, average_color, sum_absolute_deviation, sum_channels};
use crate::grid::{rects_overlap, Color, PaintedRect, PixelGrid, Rect};

/// one scored placement. field order drives the derived Ord:
/// improvement first, then the rect (x1, y1, x2, y2), then the color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Candidate {
    pub improvement: i64, // current residual minus residual after painting; may be negative
    pub rect: Rect,
    pub color: Color,
}

impl Candidate {
    #[inline]
    pub fn painted(&self) -> PaintedRect {
        PaintedRect { rect: self.rect, color: self.color }
    }
}

/// score one rect: paint it with the ground truth's average over the rect and
/// compare the error before (residual sum) and after (deviation from the average).
pub fn score_candidate(ground_truth: &PixelGrid, residual: &PixelGrid, rect: Rect) -> Result<Candidate> {
    let color = average_color(ground_truth, &rect)?;
    let current_error = sum_channels(residual, &rect)?;
    let painted_error = sum_absolute_deviation(ground_truth, &rect, color)?;
    Ok(Candidate {
        improvement: current_error as i64 - painted_error as i64,
        rect,
        color,
    })
}

/// score every rect in parallel. any metric failure aborts the whole batch.
pub fn score_candidates(ground_truth: &PixelGrid, residual: &PixelGrid, rects: &[Rect]) -> Result<Vec<Candidate>> {
    profiling::scope!("score_candidates");
    rects
        .par_iter()
        .map(|&rect| score_candidate(ground_truth, residual, rect))
        .collect()
}

/// greedy top-`max_rects` pick: sort ascending, pop the largest, keep it unless it
/// shares a pixel with something already kept. does not filter on sign.
pub fn select_non_overlapping(mut candidates: Vec<Candidate>, max_rects: usize) -> Vec<PaintedRect> {
    profiling::scope!("select_non_overlapping");

    candidates.sort_unstable();

    let mut picked: Vec<PaintedRect> = Vec::with_capacity(max_rects.min(candidates.len()));
    while picked.len() < max_rects {
        let Some(best) = candidates.pop() else {
            break;
        };
        if picked.iter().any(|p| rects_overlap(&p.rect, &best.rect)) {
            continue;
        }
        picked.push(best.painted());
    }
    picked
}

/// one full selection round against the current canvas: residual once, score,
/// then greedy pick. pure with respect to its inputs.
pub fn next_best_rects(
    ground_truth: &PixelGrid,
    canvas: &PixelGrid,
    rects: &[Rect],
    max_rects: usize,
) -> Result<Vec<PaintedRect>> {
    profiling::scope!("next_best_rects");
    let residual = abs_diff_grid(ground_truth, canvas);
    let scored = score_candidates(ground_truth, &residual, rects)?;
    Ok(select_non_overlapping(scored, max_rects))
}
