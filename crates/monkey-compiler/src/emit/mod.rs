//! Bytecode emitter for the Monkey compiler.
//!
//! The [`BytecodeEmitter`] provides a high-level API for generating bytecode,
//! handling constants, operand range checks and jump patching.
//!
//! # Example
//!
//! ```
//! use monkey_compiler::bytecode::OpCode;
//! use monkey_compiler::emit::BytecodeEmitter;
//!
//! let mut emitter = BytecodeEmitter::new();
//! emitter.set_line(1);
//! emitter.emit_int(42).unwrap();
//! emitter.emit_int(10).unwrap();
//! emitter.emit(OpCode::Add);
//!
//! let program = emitter.finish();
//! program.chunk().assert_opcodes(&[OpCode::Constant, OpCode::Constant, OpCode::Add]);
//! ```

use monkey_core::CompilationError;

use crate::CompiledProgram;
use crate::bytecode::{BytecodeChunk, Constant, ConstantPool, OpCode};

/// A forward jump whose target has not been written yet.
///
/// Holds the offset of the jump's u16 operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a jump label must be patched"]
pub struct JumpLabel(usize);

/// Emits bytecode instructions into a single program-wide chunk.
#[derive(Debug, Default)]
pub struct BytecodeEmitter {
    /// The bytecode chunk being built
    chunk: BytecodeChunk,
    /// Program constant pool (deduplicated)
    constants: ConstantPool,
    /// Current source line for debug info
    current_line: u32,
}

impl BytecodeEmitter {
    /// Create a new bytecode emitter.
    pub fn new() -> Self {
        Self {
            current_line: 1,
            ..Self::default()
        }
    }

    /// Set current source line for debug info.
    ///
    /// All subsequent instructions will be associated with this line number.
    pub fn set_line(&mut self, line: u32) {
        self.current_line = line;
    }

    /// Get current source line.
    pub fn current_line(&self) -> u32 {
        self.current_line
    }

    /// Get current bytecode offset.
    pub fn current_offset(&self) -> usize {
        self.chunk.current_offset()
    }

    /// Finish emission and return the program.
    pub fn finish(self) -> CompiledProgram {
        CompiledProgram::new(self.chunk, self.constants)
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    /// Emit a single opcode with no operands.
    pub fn emit(&mut self, op: OpCode) {
        tracing::trace!(offset = self.current_offset(), op = op.name(), "emit");
        self.chunk.write_op(op, self.current_line);
    }

    /// Emit opcode with 8-bit operand.
    pub fn emit_u8(&mut self, op: OpCode, operand: usize) -> Result<(), CompilationError> {
        let byte = narrow_u8(op, operand)?;
        self.emit(op);
        self.chunk.write_byte(byte, self.current_line);
        Ok(())
    }

    /// Emit opcode with 16-bit operand.
    pub fn emit_u16(&mut self, op: OpCode, operand: usize) -> Result<(), CompilationError> {
        let value = narrow_u16(op, operand)?;
        self.emit(op);
        self.chunk.write_u16(value, self.current_line);
        Ok(())
    }

    // ==========================================================================
    // Constants
    // ==========================================================================

    /// Emit a constant load instruction.
    ///
    /// Constants are added to the pool (deduplicated).
    pub fn emit_constant(&mut self, constant: Constant) -> Result<(), CompilationError> {
        let index = self.constants.add(constant);
        self.emit_u16(OpCode::Constant, index as usize)
    }

    /// Emit an integer constant.
    pub fn emit_int(&mut self, value: i64) -> Result<(), CompilationError> {
        self.emit_constant(Constant::Int(value))
    }

    /// Emit a string constant.
    pub fn emit_string(&mut self, value: &str) -> Result<(), CompilationError> {
        self.emit_constant(Constant::String(value.to_string()))
    }

    /// Emit boolean.
    pub fn emit_bool(&mut self, value: bool) {
        self.emit(if value { OpCode::True } else { OpCode::False });
    }

    /// Emit null.
    pub fn emit_null(&mut self) {
        self.emit(OpCode::Null);
    }

    /// Emit pop (discard top of stack).
    pub fn emit_pop(&mut self) {
        self.emit(OpCode::Pop);
    }

    // ==========================================================================
    // Jumps
    // ==========================================================================

    /// Emit a forward jump (target unknown).
    ///
    /// The operand is initialized to 0xFFFF as a placeholder and must be
    /// patched later with [`patch_jump`](Self::patch_jump).
    pub fn emit_jump(&mut self, op: OpCode) -> JumpLabel {
        self.emit(op);
        let offset = self.chunk.current_offset();
        self.chunk.write_u16(0xFFFF, self.current_line);
        JumpLabel(offset)
    }

    /// Patch a forward jump to target the current position.
    pub fn patch_jump(&mut self, label: JumpLabel) -> Result<(), CompilationError> {
        let target = self.current_offset();
        let target = u16::try_from(target).map_err(|_| {
            CompilationError::internal(format!("jump target {target} exceeds u16::MAX"))
        })?;
        self.chunk.patch_u16(label.0, target);
        Ok(())
    }

    // ==========================================================================
    // Functions
    // ==========================================================================

    /// Emit closure creation for a body starting at `entry`.
    ///
    /// The `free` captured values must already be on the stack.
    pub fn emit_closure(
        &mut self,
        entry: usize,
        params: usize,
        locals: usize,
        free: usize,
    ) -> Result<(), CompilationError> {
        let entry = narrow_u16(OpCode::Closure, entry)?;
        let params = narrow_u8(OpCode::Closure, params)?;
        let locals = narrow_u8(OpCode::Closure, locals)?;
        let free = narrow_u8(OpCode::Closure, free)?;

        self.emit(OpCode::Closure);
        self.chunk.write_u16(entry, self.current_line);
        self.chunk.write_byte(params, self.current_line);
        self.chunk.write_byte(locals, self.current_line);
        self.chunk.write_byte(free, self.current_line);
        Ok(())
    }

    /// Emit function call.
    pub fn emit_call(&mut self, arg_count: usize) -> Result<(), CompilationError> {
        self.emit_u8(OpCode::Call, arg_count)
    }
}

fn narrow_u8(op: OpCode, operand: usize) -> Result<u8, CompilationError> {
    u8::try_from(operand).map_err(|_| {
        CompilationError::internal(format!("{} operand {operand} exceeds u8::MAX", op.name()))
    })
}

fn narrow_u16(op: OpCode, operand: usize) -> Result<u16, CompilationError> {
    u16::try_from(operand).map_err(|_| {
        CompilationError::internal(format!("{} operand {operand} exceeds u16::MAX", op.name()))
    })
}
