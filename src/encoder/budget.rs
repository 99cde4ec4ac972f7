// instruction accounting shared by budget derivation and encoder validation

use crate::error::{Img2LogicError, Result};

/// fixed lines every program carries besides the per-rect commands:
/// single-shot = guard jump + end + clear + final flush + set done,
/// periodic = clear + final flush + set countdown + op sub + jump.
pub const PROGRAM_OVERHEAD: usize = 5;

/// exact line count of a program with `rects` rectangles flushed every `flush_every`
#[inline]
pub fn program_len(rects: usize, flush_every: usize) -> usize {
    let cadence_flushes = if flush_every > 0 { rects / flush_every } else { 0 };
    2 * rects + cadence_flushes + PROGRAM_OVERHEAD
}

/// how many rectangles fit under `instruction_limit`.
///
/// starts from `(limit - 5) / 2`, then gives back `budget / (2 * flush_every)`
/// for the cadence flushes, then trims any remaining overshoot so the encoded
/// program is guaranteed to fit.
pub fn rect_budget(instruction_limit: usize, flush_every: usize) -> Result<usize> {
    let mut budget = instruction_limit.saturating_sub(PROGRAM_OVERHEAD) / 2;
    if flush_every > 0 {
        budget -= budget / (2 * flush_every);
    }
    while budget > 0 && program_len(budget, flush_every) > instruction_limit {
        budget -= 1;
    }
    if budget == 0 {
        return Err(Img2LogicError::InvalidBudget(instruction_limit as i64));
    }
    Ok(budget)
}
