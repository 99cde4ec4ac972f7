//! Approximate an image with flat rectangles and encode them as a budgeted
//! logic-display draw program.

pub mod app_types;
pub mod encoder;
pub mod engine;
pub mod engine_thread;
pub mod error;
pub mod fitness;
pub mod grid;
pub mod image_source;
pub mod render;
pub mod settings;

pub use encoder::{encode, EncoderParams, Program};
pub use engine::{ApproxParams, Approximation, Approximator, BatchReport};
pub use error::{Img2LogicError, Result};
pub use grid::{Color, PaintedRect, PixelGrid, Rect, RectangleList};
pub use settings::{AppSettings, DisplayPreset};

/// rectangles, terminal canvas and the encoded program of one conversion
#[derive(Clone, Debug, PartialEq)]
pub struct Conversion {
    pub approximation: Approximation,
    pub program: Program,
}

/// run the approximator on the calling thread and encode the result.
/// no partial output on failure.
pub fn convert(ground_truth: &PixelGrid, settings: &AppSettings) -> Result<Conversion> {
    profiling::scope!("convert");
    let approximation = Approximator::new(ground_truth, settings.approx_params()?)?.run()?;
    let program = encode(&approximation.rects, &settings.encoder_params(ground_truth.height()))?;
    Ok(Conversion { approximation, program })
}
