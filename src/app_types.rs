use crate::engine::{Approximation, BatchReport};
use crate::error::Result;

// messages from the caller to the engine thread
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineCommand {
    Start,
    Pause,
    Stop, // checked between batches, the run ends with Cancelled
}

// messages from the engine thread to the caller
#[derive(Debug)]
pub enum EngineUpdate {
    /// sent after every batch
    Progress(BatchReport),
    /// last message of a run
    Finished(Result<Approximation>),
}
