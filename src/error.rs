use crate::grid::Rect;

/// failures surfaced by the approximation core, the encoder and the I/O edges.
/// the pure layers (metrics, candidate generation, selection) only ever return
/// these, they never log-and-continue.
#[derive(Debug, thiserror::Error)]
pub enum Img2LogicError {
    #[error("rectangle budget must be positive (got {0})")]
    InvalidBudget(i64),
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("zero-area or out-of-bounds region {rect:?} reached the color metrics")]
    EmptyRegion { rect: Rect },
    #[error("no usable candidate at size {size} after {accepted} of {budget} rectangles")]
    BudgetUnreachable {
        size: u32,
        accepted: usize,
        budget: usize,
    },
    #[error("program needs {commands} instructions but the limit is {limit}")]
    BudgetExceeded { commands: usize, limit: usize },
    #[error("approximation cancelled after {accepted} rectangles")]
    Cancelled { accepted: usize },
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Img2LogicError>;
