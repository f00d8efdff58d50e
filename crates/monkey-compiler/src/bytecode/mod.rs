//! Bytecode types for the Monkey compiler.
//!
//! This module contains the core bytecode types:
//!
//! - [`OpCode`] - The instruction set for the VM
//! - [`BytecodeChunk`] - The flat instruction stream of a program
//! - [`Constant`] and [`ConstantPool`] - Program-level constant storage

mod chunk;
mod constant;
mod opcode;

pub use chunk::BytecodeChunk;
pub use constant::{Constant, ConstantPool};
pub use opcode::OpCode;
