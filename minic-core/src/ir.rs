//! Three-address intermediate code.
//!
//! Straight-line only: there are no labels or jumps. Conditionals and
//! loops contribute the instructions of their sub-expressions and nothing
//! else.

use alloc::string::String;
use core::fmt;

use serde::{Serialize, Serializer};

use crate::ast::BinaryOp;
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Declare,
    Assign,
    Binary(BinaryOp),
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Declare => "DECLARE",
            Opcode::Assign => "ASSIGN",
            Opcode::Binary(op) => op.symbol(),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl Serialize for Opcode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.mnemonic())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    #[serde(rename = "operation")]
    pub opcode: Opcode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operand1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operand2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl Instruction {
    pub fn declare(ty: Type, name: impl Into<String>) -> Self {
        Instruction {
            opcode: Opcode::Declare,
            operand1: Some(ty.to_string()),
            operand2: None,
            result: Some(name.into()),
        }
    }

    pub fn assign(value: Option<String>, target: impl Into<String>) -> Self {
        Instruction {
            opcode: Opcode::Assign,
            operand1: value,
            operand2: None,
            result: Some(target.into()),
        }
    }

    pub fn binary(op: BinaryOp, lhs: String, rhs: String, result: String) -> Self {
        Instruction {
            opcode: Opcode::Binary(op),
            operand1: Some(lhs),
            operand2: Some(rhs),
            result: Some(result),
        }
    }
}

/// Textual three-address form: `DECLARE int x`, `x = t0`, `t0 = a + b`.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operand1 = self.operand1.as_deref().unwrap_or("_");
        let operand2 = self.operand2.as_deref().unwrap_or("_");
        let result = self.result.as_deref().unwrap_or("_");
        match self.opcode {
            Opcode::Declare => write!(f, "DECLARE {operand1} {result}"),
            Opcode::Assign => write!(f, "{result} = {operand1}"),
            Opcode::Binary(op) => write!(f, "{result} = {operand1} {op} {operand2}"),
        }
    }
}
