//! Arithmetic operators for [`JsonKv::math`](crate::JsonKv::math).

use crate::error::{Error, ErrorCode, Result};
use std::fmt;
use std::str::FromStr;

/// One of `+ - * / %`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`. Dividing by zero yields an infinity signed like the zero.
    Div,
    /// `%`, with the sign of the dividend.
    Rem,
}

impl MathOp {
    /// The operator's symbol.
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            MathOp::Add => '+',
            MathOp::Sub => '-',
            MathOp::Mul => '*',
            MathOp::Div => '/',
            MathOp::Rem => '%',
        }
    }

    /// Compute `current <op> amount`.
    ///
    /// Division by `+0.0` gives `+inf` and by `-0.0` gives `-inf` whatever the
    /// sign of `current`.
    #[must_use]
    pub fn apply(self, current: f64, amount: f64) -> f64 {
        match self {
            MathOp::Add => current + amount,
            MathOp::Sub => current - amount,
            MathOp::Mul => current * amount,
            MathOp::Div if amount == 0.0 => {
                if amount.is_sign_negative() {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                }
            }
            MathOp::Div => current / amount,
            MathOp::Rem => current % amount,
        }
    }
}

impl fmt::Display for MathOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl TryFrom<char> for MathOp {
    type Error = Error;

    fn try_from(c: char) -> Result<Self> {
        match c {
            '+' => Ok(MathOp::Add),
            '-' => Ok(MathOp::Sub),
            '*' => Ok(MathOp::Mul),
            '/' => Ok(MathOp::Div),
            '%' => Ok(MathOp::Rem),
            other => Err(Error::new(
                format!("invalid operation: {other}"),
                ErrorCode::InvalidOperation,
            )),
        }
    }
}

impl FromStr for MathOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Err(Error::new(
                "the operation is not defined",
                ErrorCode::InvalidOperation,
            )),
            (Some(c), None) => MathOp::try_from(c),
            _ => Err(Error::new(
                format!("invalid operation: {s}"),
                ErrorCode::InvalidOperation,
            )),
        }
    }
}
