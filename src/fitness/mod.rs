// Fitness module organization
// Each submodule handles a specific aspect of error computation

pub mod metrics;
pub mod region;
pub mod sad;

// Re-export commonly used types and functions
pub use metrics::MetricsSnapshot;
pub use region::{average_color, sum_absolute_deviation, sum_channels};
pub use sad::{abs_diff_grid, sad_rgb_parallel};
