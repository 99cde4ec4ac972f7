// Engine module organization
// Each submodule handles one stage of the batch loop

pub mod candidates;
pub mod metrics;
pub mod progressive;
pub mod selector;

use serde::Serialize;

use crate::error::{Img2LogicError, Result};
use crate::fitness::{sad_rgb_parallel, MetricsSnapshot};
use crate::grid::{PixelGrid, RectangleList};

use candidates::generate_candidates;
use progressive::rect_size;
use selector::next_best_rects;

/// upper bound on rectangles accepted per batch (bounds per-batch search cost)
pub const MAX_BATCH_RECTS: usize = 20;

/// explicit tunables for one approximation run
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ApproxParams {
    pub total_budget: usize,    // rectangles to place in total
    pub iterations: f64,        // candidate placement density, values below 1 act as 1
    pub max_batch_rects: usize, // per-batch cap
}

impl Default for ApproxParams {
    fn default() -> Self {
        Self {
            // rect_budget(1000, 10)
            total_budget: 473,
            iterations: 1.0,
            max_batch_rects: MAX_BATCH_RECTS,
        }
    }
}

/// what one batch did, published to progress listeners
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BatchReport {
    pub batch: usize,
    pub size: u32,
    pub candidates: usize,
    pub accepted: usize,
    pub total_accepted: usize,
    pub total_budget: usize,
    pub fitness_percent: f32,
    pub metrics: MetricsSnapshot,
}

/// terminal state of a finished run
#[derive(Clone, Debug, PartialEq)]
pub struct Approximation {
    pub rects: RectangleList,
    pub canvas: PixelGrid,
    pub metrics: MetricsSnapshot,
    pub batches: usize,
}

/// greedy rectangle approximator.
/// borrows the ground truth for the whole run and exclusively owns the canvas.
pub struct Approximator<'a> {
    pub(self) ground_truth: &'a PixelGrid,
    pub(self) params: ApproxParams,
    pub canvas: PixelGrid,          // black at start, painted in accept order
    pub accepted: RectangleList,    // draw order
    pub current_fitness: u64,       // SAD of canvas vs ground truth
    pub baseline_fitness: u64,      // SAD of the black canvas
    pub last_metrics: MetricsSnapshot,
    pub batches: usize,
    pub width: u32,
    pub height: u32,
    pub(self) size_clamp_warned: bool,
}

impl<'a> Approximator<'a> {
    pub fn new(ground_truth: &'a PixelGrid, params: ApproxParams) -> Result<Self> {
        profiling::scope!("Approximator::new");

        if params.total_budget == 0 {
            return Err(Img2LogicError::InvalidBudget(0));
        }
        if ground_truth.is_empty() {
            return Err(Img2LogicError::EmptyImage {
                width: ground_truth.width(),
                height: ground_truth.height(),
            });
        }

        let (width, height) = (ground_truth.width(), ground_truth.height());
        let canvas = PixelGrid::new_black(width, height);
        let current_fitness = sad_rgb_parallel(ground_truth, &canvas);

        let mut this = Self {
            ground_truth,
            params: ApproxParams {
                max_batch_rects: params.max_batch_rects.max(1),
                ..params
            },
            canvas,
            accepted: Vec::with_capacity(params.total_budget),
            current_fitness,
            baseline_fitness: current_fitness,
            last_metrics: MetricsSnapshot::default(),
            batches: 0,
            width,
            height,
            size_clamp_warned: false,
        };
        this.update_metrics_snapshot();
        Ok(this)
    }

    #[inline]
    pub fn params(&self) -> &ApproxParams {
        &self.params
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.accepted.len() >= self.params.total_budget
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.params.total_budget.saturating_sub(self.accepted.len())
    }

    /// run one batch: schedule a size, enumerate candidates, pick the best
    /// non-overlapping subset and paint it. `None` once the budget is met.
    pub fn step(&mut self) -> Result<Option<BatchReport>> {
        profiling::scope!("Approximator::step");

        if self.is_done() {
            return Ok(None);
        }

        let scheduled = rect_size(self.accepted.len(), self.params.total_budget, self.width);
        // candidates must fit on both axes; clamping keeps at least one placement available
        let size = scheduled.min(self.width).min(self.height);
        if size != scheduled && !self.size_clamp_warned {
            log::warn!(
                "rect size {} exceeds the {}x{} image, clamping to {}",
                scheduled,
                self.width,
                self.height,
                size
            );
            self.size_clamp_warned = true;
        }

        let max_rects = self.params.max_batch_rects.min(self.remaining());
        let rects = generate_candidates(self.width, self.height, size, size, self.params.iterations);
        let unreachable = || Img2LogicError::BudgetUnreachable {
            size,
            accepted: self.accepted.len(),
            budget: self.params.total_budget,
        };
        if rects.is_empty() {
            return Err(unreachable());
        }

        let batch = next_best_rects(self.ground_truth, &self.canvas, &rects, max_rects)?;
        if batch.is_empty() {
            return Err(unreachable());
        }

        {
            profiling::scope!("paint_batch");
            for painted in &batch {
                self.canvas.fill_rect(&painted.rect, painted.color);
            }
        }
        self.accepted.extend_from_slice(&batch);
        self.batches += 1;

        self.current_fitness = sad_rgb_parallel(self.ground_truth, &self.canvas);
        self.update_metrics_snapshot();

        let report = BatchReport {
            batch: self.batches,
            size,
            candidates: rects.len(),
            accepted: batch.len(),
            total_accepted: self.accepted.len(),
            total_budget: self.params.total_budget,
            fitness_percent: self.fitness_percent_normalized(),
            metrics: self.last_metrics,
        };
        log::debug!(
            "batch {}: size {} candidates {} accepted {} ({}/{}) sad/px {:.2}",
            report.batch,
            report.size,
            report.candidates,
            report.accepted,
            report.total_accepted,
            report.total_budget,
            report.metrics.sad_per_px
        );
        Ok(Some(report))
    }

    /// drive batches to completion, calling `on_batch` after each one
    pub fn run_with<F>(mut self, mut on_batch: F) -> Result<Approximation>
    where
        F: FnMut(&BatchReport),
    {
        profiling::scope!("Approximator::run");
        log::info!(
            "approximating {}x{} with {} rects (iterations {})",
            self.width,
            self.height,
            self.params.total_budget,
            self.params.iterations
        );

        while let Some(report) = self.step()? {
            on_batch(&report);
        }

        log::info!(
            "placed {} rects in {} batches, sad/px {:.2}, psnr {:.2} dB",
            self.accepted.len(),
            self.batches,
            self.last_metrics.sad_per_px,
            self.last_metrics.psnr
        );
        Ok(self.finish())
    }

    pub fn run(self) -> Result<Approximation> {
        self.run_with(|_| {})
    }

    /// hand over the accepted list and the terminal canvas
    pub fn finish(self) -> Approximation {
        Approximation {
            rects: self.accepted,
            canvas: self.canvas,
            metrics: self.last_metrics,
            batches: self.batches,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{rects_overlap, Color, Rect};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    fn noise(width: u32, height: u32, seed: u64) -> PixelGrid {
        let mut rng = Pcg32::seed_from_u64(seed);
        let data: Vec<u8> = (0..width * height * 3).map(|_| rng.random()).collect();
        PixelGrid::from_rgb(width, height, data).unwrap()
    }

    fn params(total_budget: usize) -> ApproxParams {
        ApproxParams { total_budget, ..ApproxParams::default() }
    }

    #[test]
    fn test_zero_budget_is_rejected() {
        let gt = PixelGrid::new_black(8, 8);
        let err = Approximator::new(&gt, params(0)).err().unwrap();
        assert!(matches!(err, Img2LogicError::InvalidBudget(0)));
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let gt = PixelGrid::new_black(0, 8);
        let err = Approximator::new(&gt, params(5)).err().unwrap();
        assert!(matches!(err, Img2LogicError::EmptyImage { .. }));
    }

    #[test]
    fn test_uniform_image_single_rect() {
        let color = Color::new(40, 120, 200);
        let gt = PixelGrid::filled(80, 80, color);
        let out = Approximator::new(&gt, params(1)).unwrap().run().unwrap();
        assert_eq!(out.rects.len(), 1);
        assert_eq!(out.rects[0].color, color);
        // first size is floor(80 / 3); ties resolve to the largest rect tuple
        assert_eq!(out.rects[0].rect, Rect::new(53, 53, 79, 79));
        assert_eq!(out.batches, 1);
    }

    #[test]
    fn test_budget_is_met_exactly() {
        let gt = noise(40, 40, 7);
        let out = Approximator::new(&gt, params(57)).unwrap().run().unwrap();
        assert_eq!(out.rects.len(), 57);
        for pr in &out.rects {
            assert!(pr.rect.fits_within(40, 40));
        }
    }

    #[test]
    fn test_batches_are_capped_and_internally_disjoint() {
        let gt = noise(48, 32, 3);
        let mut approx = Approximator::new(&gt, params(90)).unwrap();
        while let Some(report) = approx.step().unwrap() {
            assert!(report.accepted >= 1 && report.accepted <= MAX_BATCH_RECTS);
            let start = report.total_accepted - report.accepted;
            let batch = &approx.accepted[start..report.total_accepted];
            for (i, a) in batch.iter().enumerate() {
                for b in &batch[i + 1..] {
                    assert!(!rects_overlap(&a.rect, &b.rect));
                }
            }
        }
        assert!(approx.is_done());
        assert_eq!(approx.accepted.len(), 90);
    }

    #[test]
    fn test_canvas_matches_replayed_rects() {
        let gt = noise(30, 30, 11);
        let out = Approximator::new(&gt, params(45)).unwrap().run().unwrap();
        let mut replay = PixelGrid::new_black(30, 30);
        for pr in &out.rects {
            replay.fill_rect(&pr.rect, pr.color);
        }
        assert_eq!(replay, out.canvas);
    }

    #[test]
    fn test_error_never_rises_on_first_batch() {
        let gt = noise(64, 64, 5);
        let mut approx = Approximator::new(&gt, params(200)).unwrap();
        let before = approx.current_fitness;
        approx.step().unwrap();
        assert!(approx.current_fitness < before);
        assert!(approx.fitness_percent_normalized() > 0.0);
    }

    #[test]
    fn test_narrow_image_clamps_size_instead_of_stalling() {
        // 176 wide, 4 tall: the schedule starts at 58, far taller than the image
        let gt = noise(176, 4, 9);
        let out = Approximator::new(&gt, params(30)).unwrap().run().unwrap();
        assert_eq!(out.rects.len(), 30);
    }

    #[test]
    fn test_run_is_deterministic() {
        let gt = noise(40, 24, 21);
        let a = Approximator::new(&gt, params(60)).unwrap().run().unwrap();
        let b = Approximator::new(&gt, params(60)).unwrap().run().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_run_with_reports_every_batch() {
        let gt = noise(32, 32, 1);
        let mut seen = Vec::new();
        let out = Approximator::new(&gt, params(50))
            .unwrap()
            .run_with(|r| seen.push(r.total_accepted))
            .unwrap();
        assert_eq!(seen.len(), out.batches);
        assert_eq!(seen.last().copied(), Some(50));
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }
}
