/// application settings for img2logic
/// persisted as JSON, overridden per run from the command line
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::encoder::{rect_budget, EncoderParams, DEFAULT_DEVICE_TICK_RATE, DEFAULT_FLUSH_TARGET};
use crate::engine::{ApproxParams, MAX_BATCH_RECTS};
use crate::error::Result;

pub const SMALL_DISPLAY_DIMENSIONS: (u32, u32) = (80, 80);
pub const LARGE_DISPLAY_DIMENSIONS: (u32, u32) = (176, 176);

/// target logic display
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayPreset {
    /// 80x80 logic display
    Small,
    /// 176x176 large logic display
    Large,
    Custom { width: u32, height: u32 },
}

impl DisplayPreset {
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            DisplayPreset::Small => SMALL_DISPLAY_DIMENSIONS,
            DisplayPreset::Large => LARGE_DISPLAY_DIMENSIONS,
            DisplayPreset::Custom { width, height } => (width, height),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    // program budget
    /// hard cap on emitted instructions
    pub instruction_limit: usize,
    /// rects between `drawflush` commands (0 = only the final flush)
    pub draws_per_flush: usize,
    /// redraw period of the emitted program (0 = draw once, guarded by a done flag)
    pub redraw_timer_seconds: f64,
    pub flush_target: String,
    pub device_tick_rate: f64,

    // search
    /// candidate placement density (1.0 = one placement per rect width)
    pub iterations: f64,
    pub max_batch_rects: usize,

    // output
    pub display: DisplayPreset,
    /// upscale factor for preview images
    pub preview_scale: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            instruction_limit: 1000,
            draws_per_flush: 10,
            redraw_timer_seconds: 10.0,
            flush_target: DEFAULT_FLUSH_TARGET.to_owned(),
            device_tick_rate: DEFAULT_DEVICE_TICK_RATE,

            iterations: 1.0,
            max_batch_rects: MAX_BATCH_RECTS,

            display: DisplayPreset::Small,
            preview_scale: 4,
        }
    }
}

impl AppSettings {
    /// save settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// load settings from a JSON file, or return defaults if it is missing or broken
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("failed to parse {}: {}. using defaults.", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                // file doesn't exist or can't be read - use defaults
                Self::default()
            }
        }
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.display.dimensions()
    }

    /// rectangle budget that fits the instruction limit
    pub fn rect_budget(&self) -> Result<usize> {
        rect_budget(self.instruction_limit, self.draws_per_flush)
    }

    /// convert to ApproxParams for the approximator
    pub fn approx_params(&self) -> Result<ApproxParams> {
        Ok(ApproxParams {
            total_budget: self.rect_budget()?,
            iterations: self.iterations,
            max_batch_rects: self.max_batch_rects,
        })
    }

    /// convert to EncoderParams for a display `image_height` pixels tall
    pub fn encoder_params(&self, image_height: u32) -> EncoderParams {
        EncoderParams {
            image_height,
            flush_every: self.draws_per_flush,
            redraw_period_seconds: self.redraw_timer_seconds,
            instruction_limit: self.instruction_limit,
            flush_target: self.flush_target.clone(),
            device_tick_rate: self.device_tick_rate,
        }
    }
}
