use std::fmt;

use crate::grid::Color;

/// comparison used by `jump`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpCondition {
    Equal,
    NotEqual,
}

impl fmt::Display for JumpCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JumpCondition::Equal => f.write_str("equal"),
            JumpCondition::NotEqual => f.write_str("notEqual"),
        }
    }
}

/// one line of the logic-processor program.
/// coordinates are device space (origin bottom-left, y up), so they may go negative.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// clear the draw buffer to an RGBA color
    DrawClear { r: u8, g: u8, b: u8, a: u8 },
    /// set the draw color, alpha fixed at 255
    DrawColor(Color),
    DrawRect { x: i64, y: i64, width: i64, height: i64 },
    /// commit buffered draws to a display
    DrawFlush { target: String },
    /// conditional jump to a 0-indexed line
    Jump {
        line: usize,
        cond: JumpCondition,
        a: String,
        b: String,
    },
    End,
    Set { var: String, value: String },
    OpSub { dst: String, lhs: String, rhs: i64 },
}

impl Command {
    pub fn clear_transparent() -> Self {
        Command::DrawClear { r: 0, g: 0, b: 0, a: 0 }
    }

    pub fn jump(line: usize, cond: JumpCondition, a: impl Into<String>, b: impl Into<String>) -> Self {
        Command::Jump { line, cond, a: a.into(), b: b.into() }
    }

    pub fn set(var: impl Into<String>, value: impl ToString) -> Self {
        Command::Set { var: var.into(), value: value.to_string() }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // trailing operands the device ignores are always written as 0
        match self {
            Command::DrawClear { r, g, b, a } => write!(f, "draw clear {r} {g} {b} {a} 0 0"),
            Command::DrawColor(c) => write!(f, "draw color {} {} {} 255 0 0", c.r, c.g, c.b),
            Command::DrawRect { x, y, width, height } => write!(f, "draw rect {x} {y} {width} {height} 0 0"),
            Command::DrawFlush { target } => write!(f, "drawflush {target}"),
            Command::Jump { line, cond, a, b } => write!(f, "jump {line} {cond} {a} {b}"),
            Command::End => f.write_str("end"),
            Command::Set { var, value } => write!(f, "set {var} {value}"),
            Command::OpSub { dst, lhs, rhs } => write!(f, "op sub {dst} {lhs} {rhs}"),
        }
    }
}
