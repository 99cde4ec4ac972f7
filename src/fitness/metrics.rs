//─────────────────────────────────────────────────────────────────────────────
// resolution-invariant metrics (SAD/px, PSNR) used for progress reporting
//─────────────────────────────────────────────────────────────────────────────

use serde::Serialize;

/// SAD runs over RGB only
pub const FITNESS_CHANNELS_F64: f64 = 3.0;

/// peak value of an 8-bit channel
pub const PSNR_PEAK_8BIT: f64 = 255.0;

/// PSNR (peak signal-to-noise ratio) in decibels.
/// higher PSNR = better quality. typical ranges:
///   - 20 dB = blocky but recognisable
///   - 30 dB = acceptable
#[inline]
pub fn psnr_from_mse(mse: f64, peak: f64) -> f64 {
    let mse = mse.max(1e-12);
    10.0 * ((peak * peak) / mse).log10()
}

/// snapshot of canvas-vs-ground-truth error after a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub sad_per_px: f64,
    pub psnr: f64,
}

impl MetricsSnapshot {
    /// build metrics from raw SAD + pixel count.
    /// treats L1/px/channel as a pseudo-MSE, same convention as the SAD display.
    #[inline]
    pub fn from_sad(sad: u64, num_pixels: usize) -> Self {
        let n = num_pixels.max(1) as f64;
        let sad = sad as f64;
        let sad_per_px = sad / n;
        let pseudo_mse = (sad / (n * FITNESS_CHANNELS_F64)).max(1e-12);
        let psnr = psnr_from_mse(pseudo_mse, PSNR_PEAK_8BIT);
        Self { sad_per_px, psnr }
    }
}
