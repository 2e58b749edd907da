//! Operators and left-to-right equation evaluation
//!
//! There is no operator precedence: `2 + 3 * 4` is `(2 + 3) * 4 = 20`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, EquationError};

/// Arithmetic operator carried by an operator tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
}

impl Operator {
    pub const ALL: [Operator; 4] = [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div];

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
        }
    }

    /// Parse a configured symbol. Anything outside `+ - * /` is a wiring defect.
    pub fn from_symbol(s: &str) -> Result<Self, ConfigError> {
        match s.trim() {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Sub),
            "*" | "x" | "×" => Ok(Operator::Mul),
            "/" | "÷" => Ok(Operator::Div),
            other => Err(ConfigError::UnknownOperator(other.to_string())),
        }
    }

    /// Apply to two operands.
    ///
    /// Integer division truncates toward zero. Division by zero returns `lhs`
    /// unchanged. Overflow saturates rather than panicking.
    #[inline]
    pub fn apply(&self, lhs: i64, rhs: i64) -> i64 {
        match self {
            Operator::Add => lhs.saturating_add(rhs),
            Operator::Sub => lhs.saturating_sub(rhs),
            Operator::Mul => lhs.saturating_mul(rhs),
            Operator::Div => {
                if rhs == 0 {
                    lhs
                } else {
                    lhs.saturating_div(rhs)
                }
            }
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Evaluate strictly left to right.
///
/// Requires at least one operand and exactly `operands.len() - 1` operators.
pub fn evaluate(operands: &[i64], operators: &[Operator]) -> Result<i64, EquationError> {
    let (&first, rest) = operands.split_first().ok_or(EquationError::Empty)?;
    if operators.len() != rest.len() {
        return Err(EquationError::ArityMismatch {
            operands: operands.len(),
            operators: operators.len(),
        });
    }

    Ok(operators
        .iter()
        .zip(rest)
        .fold(first, |acc, (op, &rhs)| op.apply(acc, rhs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_to_right() {
        let result = evaluate(&[2, 3, 4], &[Operator::Add, Operator::Mul]).unwrap();
        assert_eq!(result, 20);
        assert_ne!(result, 14);
    }

    #[test]
    fn test_single_operand() {
        assert_eq!(evaluate(&[5], &[]), Ok(5));
    }

    #[test]
    fn test_division_by_zero_is_identity() {
        assert_eq!(evaluate(&[7, 0], &[Operator::Div]), Ok(7));
        assert_eq!(evaluate(&[9, 0, 2], &[Operator::Div, Operator::Sub]), Ok(7));
    }

    #[test]
    fn test_integer_division_truncates() {
        assert_eq!(evaluate(&[7, 2], &[Operator::Div]), Ok(3));
        assert_eq!(evaluate(&[-7, 2], &[Operator::Div]), Ok(-3));
    }

    #[test]
    fn test_arity_errors() {
        assert_eq!(evaluate(&[], &[]), Err(EquationError::Empty));
        assert_eq!(
            evaluate(&[1, 2], &[]),
            Err(EquationError::ArityMismatch {
                operands: 2,
                operators: 0
            })
        );
        assert_eq!(
            evaluate(&[1], &[Operator::Add]),
            Err(EquationError::ArityMismatch {
                operands: 1,
                operators: 1
            })
        );
    }

    #[test]
    fn test_from_symbol() {
        assert_eq!(Operator::from_symbol("+"), Ok(Operator::Add));
        assert_eq!(Operator::from_symbol(" / "), Ok(Operator::Div));
        assert_eq!(
            Operator::from_symbol("%"),
            Err(ConfigError::UnknownOperator("%".to_string()))
        );
    }

    #[test]
    fn test_overflow_saturates() {
        assert_eq!(Operator::Mul.apply(i64::MAX, 2), i64::MAX);
        assert_eq!(Operator::Div.apply(i64::MIN, -1), i64::MAX);
    }
}
