//! Equation builder
//!
//! Accumulates the player's tile selections. Short mode is a two-slot rolling
//! buffer of operands with a single operator slot; long mode is an unbounded
//! operand chain that refuses two operators in a row.

use serde::{Deserialize, Serialize};

use super::equation::{Operator, evaluate};

/// Equation construction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EquationMode {
    /// Exactly two operands and one operator
    #[default]
    Short,
    /// Any number of operands joined by operators
    Long,
}

/// Player-selected operands and operators
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquationBuilder {
    mode: EquationMode,
    operands: Vec<i64>,
    operators: Vec<Operator>,
}

impl EquationBuilder {
    /// Maximum operands held in short mode
    pub const SHORT_OPERANDS: usize = 2;

    pub fn new(mode: EquationMode) -> Self {
        Self {
            mode,
            operands: Vec::new(),
            operators: Vec::new(),
        }
    }

    pub fn mode(&self) -> EquationMode {
        self.mode
    }

    pub fn operands(&self) -> &[i64] {
        &self.operands
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn is_empty(&self) -> bool {
        self.operands.is_empty() && self.operators.is_empty()
    }

    /// Switch mode. Always clears the current selection, even if the mode is unchanged.
    pub fn set_mode(&mut self, mode: EquationMode) {
        self.mode = mode;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.operands.clear();
        self.operators.clear();
    }

    pub fn select_number(&mut self, value: i64) {
        match self.mode {
            EquationMode::Short => {
                if self.operands.len() >= Self::SHORT_OPERANDS {
                    self.operands.remove(0);
                }
                self.operands.push(value);
            }
            EquationMode::Long => self.operands.push(value),
        }
        log::debug!("Selected number {} -> {}", value, self.display());
    }

    /// Returns false when the selection was rejected (long mode, no operand to consume it).
    pub fn select_operator(&mut self, op: Operator) -> bool {
        match self.mode {
            EquationMode::Short => {
                self.operators.clear();
                self.operators.push(op);
            }
            EquationMode::Long => {
                if self.operands.len() <= self.operators.len() {
                    log::debug!("Rejected operator {}: needs a number first", op);
                    return false;
                }
                self.operators.push(op);
            }
        }
        log::debug!("Selected operator {} -> {}", op, self.display());
        true
    }

    /// Whether the current selection forms a complete equation
    pub fn is_valid(&self) -> bool {
        match self.mode {
            EquationMode::Short => self.operands.len() == 2 && self.operators.len() == 1,
            EquationMode::Long => {
                self.operands.len() >= 2 && self.operators.len() == self.operands.len() - 1
            }
        }
    }

    /// Result of a complete equation, `None` while incomplete
    pub fn result(&self) -> Option<i64> {
        if !self.is_valid() {
            return None;
        }
        evaluate(&self.operands, &self.operators).ok()
    }

    /// Number of symbols currently selected
    pub fn len(&self) -> usize {
        self.operands.len() + self.operators.len()
    }

    /// Human-readable equation, `_` marking empty slots, ending in `= ?`
    pub fn display(&self) -> String {
        match self.mode {
            EquationMode::Short => {
                let first = self.operands.first().map(|n| n.to_string());
                let second = self.operands.get(1).map(|n| n.to_string());
                let op = self.operators.first().map(|o| o.symbol().to_string());
                format!(
                    "{} {} {} = ?",
                    first.as_deref().unwrap_or("_"),
                    op.as_deref().unwrap_or("_"),
                    second.as_deref().unwrap_or("_"),
                )
            }
            EquationMode::Long => {
                let mut out = String::new();
                for (i, n) in self.operands.iter().enumerate() {
                    out.push_str(&n.to_string());
                    if let Some(op) = self.operators.get(i) {
                        out.push_str(&format!(" {} ", op));
                    } else if i + 1 < self.operands.len() {
                        out.push_str(" _ ");
                    }
                }
                if self.operands.len() <= self.operators.len() {
                    if !out.ends_with(' ') {
                        out.push(' ');
                    }
                    out.push('_');
                }
                out.push_str(" = ?");
                out.trim_start().to_string()
            }
        }
    }
}
