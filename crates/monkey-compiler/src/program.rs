//! Compiled program and its on-disk format.
//!
//! ## Layout
//!
//! ```text
//! magic      4 bytes   "MNKY"
//! version    u8
//! payload    bincode   constant list, then the instruction bytes
//! ```
//!
//! Line information is not persisted.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bytecode::{BytecodeChunk, Constant, ConstantPool, OpCode};

/// File magic of a serialized program.
pub const MAGIC: &[u8; 4] = b"MNKY";

/// Current format version.
pub const FORMAT_VERSION: u8 = 1;

const HEADER_LEN: usize = MAGIC.len() + 1;

/// Errors encoding or decoding a serialized program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    /// The data does not start with [`MAGIC`].
    #[error("not a compiled Monkey program")]
    BadMagic,

    /// The format version is not supported.
    #[error("unsupported program format version {0}")]
    UnsupportedVersion(u8),

    /// The program could not be encoded.
    #[error("failed to encode program: {0}")]
    Encode(String),

    /// The payload is not a valid program.
    #[error("failed to decode program: {0}")]
    Decode(String),
}

/// The output of code generation: instruction stream plus constant pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledProgram {
    constants: ConstantPool,
    chunk: BytecodeChunk,
}

impl CompiledProgram {
    /// Assemble a program from its parts.
    pub fn new(chunk: BytecodeChunk, constants: ConstantPool) -> Self {
        Self { constants, chunk }
    }

    /// The instruction stream.
    pub fn chunk(&self) -> &BytecodeChunk {
        &self.chunk
    }

    /// The raw instruction bytes.
    pub fn code(&self) -> &[u8] {
        self.chunk.code()
    }

    /// The constant pool, in index order.
    pub fn constants(&self) -> &[Constant] {
        self.constants.constants()
    }

    /// Opcodes of the instruction stream, operands skipped.
    pub fn opcodes(&self) -> Vec<OpCode> {
        self.chunk.opcodes()
    }

    /// Serialize to the byte format consumed by the VM.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProgramError> {
        let payload =
            bincode::serialize(self).map_err(|e| ProgramError::Encode(e.to_string()))?;

        let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
        out.extend_from_slice(MAGIC);
        out.push(FORMAT_VERSION);
        out.extend_from_slice(&payload);
        Ok(out)
    }

    /// Decode a serialized program. Line information reads back as 0.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProgramError> {
        let Some((magic, rest)) = bytes.split_first_chunk::<4>() else {
            return Err(ProgramError::BadMagic);
        };
        if magic != MAGIC {
            return Err(ProgramError::BadMagic);
        }

        match rest.split_first() {
            Some((&FORMAT_VERSION, payload)) => {
                bincode::deserialize(payload).map_err(|e| ProgramError::Decode(e.to_string()))
            }
            Some((&version, _)) => Err(ProgramError::UnsupportedVersion(version)),
            None => Err(ProgramError::Decode("missing format version".to_string())),
        }
    }

    /// Render the instruction stream as text, one instruction per line.
    ///
    /// Format: `offset line NAME operands`, with the constant value appended
    /// to `CONSTANT` instructions.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        let mut offset = 0;

        while offset < self.chunk.len() {
            let line = self.chunk.line_at(offset).unwrap_or(0);
            let Some(op) = self.chunk.read_op(offset) else {
                let byte = self.chunk.read_byte(offset).unwrap_or(0);
                let _ = writeln!(out, "{offset:04} {line:>4} <unknown 0x{byte:02x}>");
                offset += 1;
                continue;
            };

            let _ = write!(out, "{offset:04} {line:>4} {}", op.name());
            match self.chunk.read_operands(offset) {
                Some(operands) => {
                    for operand in &operands {
                        let _ = write!(out, " {operand}");
                    }
                    if op == OpCode::Constant
                        && let Some(constant) = operands
                            .first()
                            .and_then(|&i| self.constants.get(i as u32))
                    {
                        let _ = write!(out, " ; {constant}");
                    }
                }
                None => out.push_str(" <truncated>"),
            }
            out.push('\n');

            offset += 1 + op.operand_size();
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::BytecodeEmitter;

    fn sample() -> CompiledProgram {
        let mut emitter = BytecodeEmitter::new();
        emitter.emit_int(-5).unwrap();
        emitter.emit_string("hé").unwrap();
        emitter.emit(OpCode::Add);
        emitter.emit_pop();
        emitter.finish()
    }

    #[test]
    fn header_layout() {
        let program = sample();
        let bytes = program.to_bytes().unwrap();
        assert_eq!(&bytes[..4], b"MNKY");
        assert_eq!(bytes[4], FORMAT_VERSION);
        assert_eq!(&bytes[HEADER_LEN..], bincode::serialize(&program).unwrap());
    }

    #[test]
    fn decodes_what_it_encodes() {
        let program = sample();
        let decoded = CompiledProgram::from_bytes(&program.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.code(), program.code());
        assert_eq!(decoded.constants(), program.constants());
        assert_eq!(decoded.chunk().line_at(0), Some(0));
    }

    #[test]
    fn decoded_pool_still_deduplicates() {
        let decoded = CompiledProgram::from_bytes(&sample().to_bytes().unwrap()).unwrap();
        let mut constants = ConstantPool::from(decoded.constants().to_vec());
        assert_eq!(constants.add_int(-5), 0);
        assert_eq!(constants.add_string("hé"), 1);
    }

    #[test]
    fn rejects_bad_magic() {
        assert_eq!(
            CompiledProgram::from_bytes(b"ELF\x01\x01"),
            Err(ProgramError::BadMagic)
        );
        assert_eq!(CompiledProgram::from_bytes(b"MN"), Err(ProgramError::BadMagic));
    }

    #[test]
    fn rejects_other_versions() {
        assert_eq!(
            CompiledProgram::from_bytes(b"MNKY\x09\x00\x00"),
            Err(ProgramError::UnsupportedVersion(9))
        );
    }

    #[test]
    fn reports_truncated_payload() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes.pop();
        assert!(matches!(
            CompiledProgram::from_bytes(&bytes),
            Err(ProgramError::Decode(_))
        ));
        assert!(matches!(
            CompiledProgram::from_bytes(b"MNKY"),
            Err(ProgramError::Decode(_))
        ));
    }

    #[test]
    fn disassembly_shows_constants() {
        let text = sample().disassemble();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "0000    1 CONSTANT 0 ; -5");
        assert_eq!(lines[1], "0003    1 CONSTANT 1 ; \"hé\"");
        assert_eq!(lines[2], "0006    1 ADD");
        assert_eq!(lines[3], "0007    1 POP");
    }
}
