//! Three-address code generation.
//!
//! A post-order walk over the AST. Expressions return the textual operand
//! that holds their value: identifiers and literals return their own text,
//! binary expressions return a fresh temporary. The generator does not
//! validate anything; semantically broken trees are lowered as-is.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use tracing::debug;

use crate::ast::{Node, NodeKind};
use crate::ir::Instruction;

/// Lower a tree with a fresh generator.
pub fn generate(root: &Node) -> Vec<Instruction> {
    CodeGenerator::new().generate(root)
}

#[derive(Debug, Default)]
pub struct CodeGenerator {
    next_temp: usize,
    instructions: Vec<Instruction>,
}

impl CodeGenerator {
    pub fn new() -> Self {
        CodeGenerator::default()
    }

    /// Lower `root`. Temporaries restart at `t0` on every call.
    pub fn generate(&mut self, root: &Node) -> Vec<Instruction> {
        self.next_temp = 0;
        self.instructions.clear();
        self.lower(root);
        debug!(
            instructions = self.instructions.len(),
            temporaries = self.next_temp,
            "code generation finished"
        );
        core::mem::take(&mut self.instructions)
    }

    fn new_temp(&mut self) -> String {
        let temp = format!("t{}", self.next_temp);
        self.next_temp += 1;
        temp
    }

    /// Emit instructions for `node`, returning its value operand for
    /// expressions and `None` for statements.
    fn lower(&mut self, node: &Node) -> Option<String> {
        match &node.kind {
            NodeKind::Declaration { ty, name, init } => {
                self.instructions
                    .push(Instruction::declare(*ty, name.name.clone()));
                if let Some(init) = init {
                    let value = self.lower(init);
                    self.instructions
                        .push(Instruction::assign(value, name.name.clone()));
                }
                None
            }
            NodeKind::Assignment { target, value } => {
                let value = value.as_deref().and_then(|v| self.lower(v));
                self.instructions
                    .push(Instruction::assign(value, target.name.clone()));
                None
            }
            NodeKind::Binary { op, lhs, rhs } => {
                let left = self.lower(lhs).unwrap_or_default();
                let right = self.lower(rhs).unwrap_or_default();
                let result = self.new_temp();
                self.instructions
                    .push(Instruction::binary(*op, left, right, result.clone()));
                Some(result)
            }
            NodeKind::Identifier(text) | NodeKind::Literal(text) => Some(text.clone()),
            NodeKind::Program { .. }
            | NodeKind::Block { .. }
            | NodeKind::If { .. }
            | NodeKind::While { .. }
            | NodeKind::Return { .. } => {
                for child in node.children() {
                    self.lower(child);
                }
                None
            }
        }
    }
}
