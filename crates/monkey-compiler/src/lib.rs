//! Monkey Compiler
//!
//! Semantic analysis and bytecode generation for the Monkey language.
//!
//! ## Architecture
//!
//! - **Contextual analysis**: resolve every name against a scoped
//!   identification table and infer the key type of every hash literal
//! - **Code generation**: emit one linear instruction stream and a
//!   deduplicated constant pool for the stack VM
//!
//! Code generation only runs when contextual analysis reports no errors.
//!
//! ## Modules
//!
//! - [`builtins`]: Functions provided by the VM
//! - [`bytecode`]: Bytecode types (OpCode, BytecodeChunk, ConstantPool)
//! - [`codegen`]: Post-order code generator and symbol scopes
//! - [`contextual`]: Contextual visitor and hash key-type tracking
//! - [`emit`]: High-level bytecode emitter
//! - [`identification`]: Identification table and declaration attributes
//! - [`program`]: Compiled program, serialization and disassembly
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use monkey_compiler::{AnalysisOptions, Compiler};
//! use monkey_parser::Parser;
//!
//! let arena = Bump::new();
//! let program = Parser::parse("let x = 1; x + 2", &arena).unwrap();
//!
//! let result = Compiler::new(AnalysisOptions::default()).compile(&program);
//! assert!(result.is_success());
//! assert!(result.program.is_some());
//! ```

pub mod builtins;
pub mod bytecode;
pub mod codegen;
pub mod contextual;
pub mod emit;
pub mod identification;
pub mod program;

pub use codegen::CodeGenerator;
pub use contextual::{Analysis, AnalysisOptions, ContextualVisitor};
pub use emit::{BytecodeEmitter, JumpLabel};
pub use identification::IdentificationTable;
pub use program::{CompiledProgram, ProgramError};

// Re-export CompilationError from core for convenience
pub use monkey_core::CompilationError;

use monkey_parser::Program;
use tracing::debug;

/// Result of compilation.
#[derive(Debug, Clone, Default)]
pub struct CompilationResult {
    /// The compiled program; `None` when any error occurred.
    pub program: Option<CompiledProgram>,
    /// Errors in the order they were found.
    pub errors: Vec<CompilationError>,
    /// Findings that do not stop compilation.
    pub warnings: Vec<CompilationError>,
}

impl CompilationResult {
    /// Check if compilation succeeded (no errors).
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The main compiler entry point.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler {
    options: AnalysisOptions,
}

impl Compiler {
    /// Create a compiler with the given analysis options.
    pub fn new(options: AnalysisOptions) -> Self {
        Self { options }
    }

    /// Analyze a parsed program and, if it is valid, generate its bytecode.
    ///
    /// Every compilation starts from fresh state.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&self, program: &Program<'_>) -> CompilationResult {
        let analysis = ContextualVisitor::new(self.options).run(program);
        if !analysis.is_ok() {
            debug!(
                errors = analysis.errors.len(),
                "skipping code generation after contextual errors"
            );
            return CompilationResult {
                program: None,
                errors: analysis.errors,
                warnings: analysis.warnings,
            };
        }

        match CodeGenerator::new().generate(program) {
            Ok(compiled) => CompilationResult {
                program: Some(compiled),
                errors: Vec::new(),
                warnings: analysis.warnings,
            },
            Err(err) => CompilationResult {
                program: None,
                errors: vec![err],
                warnings: analysis.warnings,
            },
        }
    }
}
