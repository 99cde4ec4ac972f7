// Encoder module organization
// Turns an ordered rectangle list into a logic-display draw program

pub mod budget;
pub mod command;

use std::fmt;

pub use budget::{program_len, rect_budget, PROGRAM_OVERHEAD};
pub use command::{Command, JumpCondition};

use crate::error::{Img2LogicError, Result};
use crate::grid::{PaintedRect, Rect};

/// processor variable set once the single-shot program has drawn
const DONE_VAR: &str = "done";
/// processor variable counted down by the periodic redraw loop
const COUNTDOWN_VAR: &str = "countdown";

pub const DEFAULT_FLUSH_TARGET: &str = "display1";
/// processor ticks per second the countdown is calibrated against
pub const DEFAULT_DEVICE_TICK_RATE: f64 = 150.0;

#[derive(Clone, Debug, PartialEq)]
pub struct EncoderParams {
    pub image_height: u32,          // for the vertical flip
    pub flush_every: usize,         // 0 = only the final flush
    pub redraw_period_seconds: f64, // 0 = single-shot with a done guard
    pub instruction_limit: usize,
    pub flush_target: String,
    pub device_tick_rate: f64,
}

impl EncoderParams {
    pub fn new(image_height: u32) -> Self {
        Self {
            image_height,
            flush_every: 10,
            redraw_period_seconds: 10.0,
            instruction_limit: 1000,
            flush_target: DEFAULT_FLUSH_TARGET.to_owned(),
            device_tick_rate: DEFAULT_DEVICE_TICK_RATE,
        }
    }

    #[inline]
    pub fn is_periodic(&self) -> bool {
        self.redraw_period_seconds > 0.0
    }

    /// initial value of the redraw countdown (each loop pass takes two ticks)
    pub fn countdown_ticks(&self) -> i64 {
        let ticks = (self.redraw_period_seconds * self.device_tick_rate / 2.0).trunc();
        if ticks.is_finite() && ticks >= 1.0 {
            ticks as i64
        } else {
            1
        }
    }
}

/// finished, immutable instruction stream
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    commands: Vec<Command>,
}

impl Program {
    #[inline]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// one instruction per line with a trailing newline, ready for a file or the clipboard
    pub fn to_text(&self) -> String {
        let mut text = self.to_string();
        text.push('\n');
        text
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cmd) in self.commands.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{cmd}")?;
        }
        Ok(())
    }
}

/// image-space half-open rect to device-space (x, y, width, height).
/// device y grows upward and rects are inclusive on the device, hence the +1s.
#[inline]
pub fn device_rect(rect: &Rect, image_height: u32) -> (i64, i64, i64, i64) {
    let x = rect.x1 as i64;
    let y = (image_height as i64 - 1) - rect.y2 as i64;
    let width = (rect.x2 as i64 - rect.x1 as i64).abs() + 1;
    let height = (rect.y2 as i64 - rect.y1 as i64).abs() + 1;
    (x, y, width, height)
}

/// encode `rects` in order. fails with `BudgetExceeded` before building anything
/// when the program would not fit; it never truncates.
pub fn encode(rects: &[PaintedRect], params: &EncoderParams) -> Result<Program> {
    profiling::scope!("encode");

    let needed = program_len(rects.len(), params.flush_every);
    if needed > params.instruction_limit {
        return Err(Img2LogicError::BudgetExceeded {
            commands: needed,
            limit: params.instruction_limit,
        });
    }

    let mut commands = Vec::with_capacity(needed);
    let periodic = params.is_periodic();

    if !periodic {
        // skip straight to `end` once drawn, re-running the program is a no-op
        commands.push(Command::jump(2, JumpCondition::Equal, DONE_VAR, "false"));
        commands.push(Command::End);
    }
    commands.push(Command::clear_transparent());

    let flush = || Command::DrawFlush { target: params.flush_target.clone() };
    for (i, painted) in rects.iter().enumerate() {
        let (x, y, width, height) = device_rect(&painted.rect, params.image_height);
        commands.push(Command::DrawColor(painted.color));
        commands.push(Command::DrawRect { x, y, width, height });
        if params.flush_every > 0 && (i + 1) % params.flush_every == 0 {
            commands.push(flush());
        }
    }
    // always, even right after a cadence flush
    commands.push(flush());

    if periodic {
        commands.push(Command::set(COUNTDOWN_VAR, params.countdown_ticks()));
        let op_line = commands.len();
        commands.push(Command::OpSub {
            dst: COUNTDOWN_VAR.to_owned(),
            lhs: COUNTDOWN_VAR.to_owned(),
            rhs: 1,
        });
        commands.push(Command::jump(op_line, JumpCondition::NotEqual, COUNTDOWN_VAR, "0"));
    } else {
        commands.push(Command::set(DONE_VAR, "true"));
    }

    debug_assert_eq!(commands.len(), needed);
    log::debug!(
        "encoded {} rects into {} of {} instructions",
        rects.len(),
        commands.len(),
        params.instruction_limit
    );
    Ok(Program { commands })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Color;

    fn rect(x1: u32, y1: u32, x2: u32, y2: u32, c: u8) -> PaintedRect {
        PaintedRect { rect: Rect::new(x1, y1, x2, y2), color: Color::new(c, c, c) }
    }

    fn single_shot(height: u32, flush_every: usize) -> EncoderParams {
        EncoderParams { flush_every, redraw_period_seconds: 0.0, ..EncoderParams::new(height) }
    }

    fn lines(program: &Program) -> Vec<String> {
        program.commands().iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_coordinate_flip() {
        assert_eq!(device_rect(&Rect::new(0, 0, 10, 10), 80), (0, 69, 11, 11));
        // a rect touching the bottom edge lands at device y = -1
        assert_eq!(device_rect(&Rect::new(5, 70, 80, 80), 80), (5, -1, 76, 11));
    }

    #[test]
    fn test_single_shot_program() {
        let program = encode(&[rect(0, 0, 10, 10, 7)], &single_shot(80, 10)).unwrap();
        assert_eq!(
            lines(&program),
            vec![
                "jump 2 equal done false",
                "end",
                "draw clear 0 0 0 0 0 0",
                "draw color 7 7 7 255 0 0",
                "draw rect 0 69 11 11 0 0",
                "drawflush display1",
                "set done true",
            ]
        );
    }

    #[test]
    fn test_periodic_program_tail() {
        let params = EncoderParams { flush_every: 0, ..EncoderParams::new(80) };
        let program = encode(&[rect(0, 0, 2, 2, 1), rect(2, 2, 4, 4, 2)], &params).unwrap();
        let l = lines(&program);
        assert_eq!(l[0], "draw clear 0 0 0 0 0 0");
        assert!(!l.iter().any(|s| s.contains("done")));
        let n = l.len();
        assert_eq!(l[n - 3], "set countdown 750");
        assert_eq!(l[n - 2], "op sub countdown countdown 1");
        // jumps back to the op line
        assert_eq!(l[n - 1], format!("jump {} notEqual countdown 0", n - 2));
        assert_eq!(n, program_len(2, 0));
    }

    #[test]
    fn test_flush_cadence_and_final_flush() {
        let rects: Vec<PaintedRect> = (0..20).map(|i| rect(i, 0, i + 1, 1, i as u8)).collect();
        let program = encode(&rects, &single_shot(1, 10)).unwrap();
        let l = lines(&program);
        let flushes: Vec<usize> = l.iter().enumerate().filter(|(_, s)| s.starts_with("drawflush")).map(|(i, _)| i).collect();
        // after rect 10, after rect 20, and the unconditional final one right behind it
        assert_eq!(flushes.len(), 3);
        assert_eq!(flushes[0], 3 + 2 * 10);
        assert_eq!(flushes[2], flushes[1] + 1);
        assert_eq!(program.len(), program_len(20, 10));
    }

    #[test]
    fn test_no_cadence_flushes_once() {
        let rects: Vec<PaintedRect> = (0..15).map(|i| rect(0, 0, 1, 1, i)).collect();
        let program = encode(&rects, &single_shot(1, 0)).unwrap();
        assert_eq!(lines(&program).iter().filter(|s| s.starts_with("drawflush")).count(), 1);
    }

    #[test]
    fn test_empty_list_still_has_overhead() {
        let program = encode(&[], &single_shot(80, 10)).unwrap();
        assert_eq!(program.len(), PROGRAM_OVERHEAD);
    }

    #[test]
    fn test_over_budget_is_rejected() {
        let rects: Vec<PaintedRect> = (0..10).map(|i| rect(0, 0, 1, 1, i)).collect();
        let params = EncoderParams { instruction_limit: 24, ..single_shot(1, 0) };
        let err = encode(&rects, &params).unwrap_err();
        assert!(matches!(err, Img2LogicError::BudgetExceeded { commands: 25, limit: 24 }));
        let params = EncoderParams { instruction_limit: 25, ..params };
        assert_eq!(encode(&rects, &params).unwrap().len(), 25);
    }

    #[test]
    fn test_encoding_is_idempotent() {
        let rects: Vec<PaintedRect> = (0..33).map(|i| rect(i, i, i + 3, i + 2, (i * 7) as u8)).collect();
        let params = EncoderParams::new(64);
        let a = encode(&rects, &params).unwrap().to_text();
        let b = encode(&rects, &params).unwrap().to_text();
        assert_eq!(a, b);
        assert!(a.ends_with("0\n"));
    }

    #[test]
    fn test_countdown_rounding() {
        let p = |secs| EncoderParams { redraw_period_seconds: secs, ..EncoderParams::new(80) };
        assert_eq!(p(10.0).countdown_ticks(), 750);
        assert_eq!(p(0.5).countdown_ticks(), 37);
        assert_eq!(p(0.001).countdown_ticks(), 1);
        assert!(!p(-3.0).is_periodic());
    }
}
