use crate::fitness::MetricsSnapshot;

use super::Approximator;

impl Approximator<'_> {
    /// current fitness as a percentage (0-100, higher is better),
    /// normalized by the error of the initial black canvas.
    pub fn fitness_percent_normalized(&self) -> f32 {
        Self::fitness_percent_from_baseline(self.baseline_fitness, self.current_fitness)
    }

    /// same normalization without needing &self.
    /// baseline and current must come from the same metric.
    #[inline]
    pub fn fitness_percent_from_baseline(baseline: u64, current: u64) -> f32 {
        profiling::scope!("fitness_percent_normalized");
        if baseline == 0 {
            // ground truth is pure black, the blank canvas is already exact
            return 100.0;
        }
        let pct = (1.0 - (current as f64 / baseline as f64)) * 100.0;
        pct.clamp(0.0, 100.0) as f32
    }

    /// refresh the cached metrics snapshot (sad/px, psnr).
    /// call after every change to `current_fitness`.
    pub(super) fn update_metrics_snapshot(&mut self) {
        profiling::scope!("update_metrics_snapshot");
        let num_px = (self.width as usize) * (self.height as usize);
        self.last_metrics = MetricsSnapshot::from_sad(self.current_fitness, num_px);
    }
}
