//! Bytecode operation codes.
//!
//! This module defines the instruction set for the Monkey VM.
//! Each opcode is a single byte, with big-endian operands following inline.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Bytecode operation codes.
///
/// The VM is a stack-based machine. Most operations pop operands
/// from the stack and push results back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum OpCode {
    // =========================================================================
    // Constants
    // =========================================================================
    /// Push constant from pool.
    /// Operand: u16 constant index
    Constant = 0,
    /// Push boolean true.
    True,
    /// Push boolean false.
    False,
    /// Push null.
    Null,

    // =========================================================================
    // Stack Operations
    // =========================================================================
    /// Pop top of stack.
    Pop,

    // =========================================================================
    // Arithmetic
    // =========================================================================
    /// Pop b, pop a, push a + b (integers or string concatenation).
    Add,
    /// Pop b, pop a, push a - b.
    Sub,
    /// Pop b, pop a, push a * b.
    Mul,
    /// Pop b, pop a, push a / b.
    Div,

    // =========================================================================
    // Comparison
    // =========================================================================
    /// Pop b, pop a, push a == b.
    Equal,
    /// Pop b, pop a, push a != b.
    NotEqual,
    /// Pop b, pop a, push a > b.
    GreaterThan,
    /// Pop b, pop a, push a < b.
    LessThan,
    /// Pop b, pop a, push a >= b.
    GreaterEqual,
    /// Pop b, pop a, push a <= b.
    LessEqual,

    // =========================================================================
    // Unary
    // =========================================================================
    /// Negate the integer on top of stack.
    Minus,
    /// Logical not of the value on top of stack.
    Bang,

    // =========================================================================
    // Control Flow
    // =========================================================================
    /// Unconditional jump.
    /// Operand: u16 absolute target offset
    Jump,
    /// Pop condition, jump if falsy.
    /// Operand: u16 absolute target offset
    JumpIfFalse,

    // =========================================================================
    // Bindings
    // =========================================================================
    /// Push global.
    /// Operand: u16 global index
    GetGlobal,
    /// Pop into global.
    /// Operand: u16 global index
    SetGlobal,
    /// Push local of the current frame.
    /// Operand: u8 slot
    GetLocal,
    /// Pop into local of the current frame.
    /// Operand: u8 slot
    SetLocal,
    /// Push built-in function.
    /// Operand: u8 built-in index
    GetBuiltin,
    /// Push captured variable of the running closure.
    /// Operand: u8 free-variable index
    GetFree,
    /// Push the running closure itself (recursive self-reference).
    CurrentClosure,

    // =========================================================================
    // Composite Values
    // =========================================================================
    /// Create a closure over the preceding `free` stack values.
    /// Operands: u16 entry offset, u8 parameter count, u8 local count,
    /// u8 free-variable count
    Closure,
    /// Pop N elements, push array.
    /// Operand: u16 element count
    Array,
    /// Pop N key/value pairs (2N values), push hash.
    /// Operand: u16 pair count
    Hash,
    /// Pop index, pop container, push element.
    Index,

    // =========================================================================
    // Functions
    // =========================================================================
    /// Call the callee below N arguments.
    /// Operand: u8 argument count
    Call,
    /// Return top of stack to the caller.
    ReturnValue,
    /// Return null to the caller.
    Return,
}

impl OpCode {
    /// Decode an opcode byte.
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// Width in bytes of each operand, in order.
    pub fn operand_widths(&self) -> &'static [usize] {
        match self {
            OpCode::Constant
            | OpCode::Jump
            | OpCode::JumpIfFalse
            | OpCode::GetGlobal
            | OpCode::SetGlobal
            | OpCode::Array
            | OpCode::Hash => &[2],

            OpCode::GetLocal
            | OpCode::SetLocal
            | OpCode::GetBuiltin
            | OpCode::GetFree
            | OpCode::Call => &[1],

            OpCode::Closure => &[2, 1, 1, 1],

            _ => &[],
        }
    }

    /// Get the size of operands for this opcode in bytes.
    ///
    /// This does NOT include the opcode byte itself.
    pub fn operand_size(&self) -> usize {
        self.operand_widths().iter().sum()
    }

    /// Get the name of this opcode for debugging.
    pub fn name(&self) -> &'static str {
        match self {
            OpCode::Constant => "CONSTANT",
            OpCode::True => "TRUE",
            OpCode::False => "FALSE",
            OpCode::Null => "NULL",
            OpCode::Pop => "POP",
            OpCode::Add => "ADD",
            OpCode::Sub => "SUB",
            OpCode::Mul => "MUL",
            OpCode::Div => "DIV",
            OpCode::Equal => "EQUAL",
            OpCode::NotEqual => "NOT_EQUAL",
            OpCode::GreaterThan => "GREATER_THAN",
            OpCode::LessThan => "LESS_THAN",
            OpCode::GreaterEqual => "GREATER_EQUAL",
            OpCode::LessEqual => "LESS_EQUAL",
            OpCode::Minus => "MINUS",
            OpCode::Bang => "BANG",
            OpCode::Jump => "JUMP",
            OpCode::JumpIfFalse => "JUMP_IF_FALSE",
            OpCode::GetGlobal => "GET_GLOBAL",
            OpCode::SetGlobal => "SET_GLOBAL",
            OpCode::GetLocal => "GET_LOCAL",
            OpCode::SetLocal => "SET_LOCAL",
            OpCode::GetBuiltin => "GET_BUILTIN",
            OpCode::GetFree => "GET_FREE",
            OpCode::CurrentClosure => "CURRENT_CLOSURE",
            OpCode::Closure => "CLOSURE",
            OpCode::Array => "ARRAY",
            OpCode::Hash => "HASH",
            OpCode::Index => "INDEX",
            OpCode::Call => "CALL",
            OpCode::ReturnValue => "RETURN_VALUE",
            OpCode::Return => "RETURN",
        }
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
