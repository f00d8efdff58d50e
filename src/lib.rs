//! Monkey toolchain facade.
//!
//! Ties the phases together behind two operations:
//!
//! - [`Monkey::compile`]: parse, analyze and generate code for a source
//!   text, saving the program to the configured artifact file
//! - [`Monkey::run`]: execute the saved artifact with the external VM
//!
//! Both return plain serializable responses; failures are reported inside
//! the response rather than as `Err`.
//!
//! # Example
//!
//! ```no_run
//! use monkey::{Monkey, MonkeyConfig};
//!
//! let monkey = Monkey::new(MonkeyConfig::default());
//! let compiled = monkey.compile("let x = 5; puts(x * 2);");
//! if compiled.errors.is_empty() {
//!     println!("{}", monkey.run().result);
//! }
//! ```

pub mod config;
pub mod error;

pub use config::MonkeyConfig;
pub use error::{DriverError, DriverResult};
pub use monkey_compiler::{AnalysisOptions, CompiledProgram, Compiler};
pub use monkey_core::Diagnostics;
pub use monkey_parser::SyntaxTree;

use std::process::Command;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bumpalo::Bump;
use monkey_parser::Parser;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Response to a compile request.
///
/// `errors` and `lines` are index-aligned; both are empty on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileResponse {
    /// Error messages in report order.
    pub errors: Vec<String>,
    /// 1-based source line of each located error.
    pub lines: Vec<u32>,
    /// Debug tree of the parsed program (partial when parsing failed).
    pub tree: SyntaxTree,
    /// Non-fatal findings, such as unused declarations.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl CompileResponse {
    fn new(diagnostics: Diagnostics, tree: SyntaxTree) -> Self {
        let warnings = diagnostics.warnings().to_vec();
        let (errors, lines) = diagnostics.into_parts();
        Self {
            errors,
            lines,
            tree,
            warnings,
        }
    }

    /// Whether the program compiled and was saved.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Response to a run request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResponse {
    /// VM output followed by `...finished`, or the failure reason followed
    /// by `...failed`.
    pub result: String,
}

/// Compile and run Monkey programs against one artifact file.
///
/// Saving and executing the artifact are serialized by one lock, so a run
/// never sees a partially written program.
#[derive(Debug)]
pub struct Monkey {
    config: MonkeyConfig,
    artifact_lock: Mutex<()>,
}

impl Monkey {
    /// Create a facade with the given configuration.
    pub fn new(config: MonkeyConfig) -> Self {
        Self {
            config,
            artifact_lock: Mutex::new(()),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &MonkeyConfig {
        &self.config
    }

    /// Compile a source text and save the result to the artifact file.
    ///
    /// Syntax errors stop before contextual analysis, and contextual errors
    /// stop before code generation. The tree is returned in every case.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&self, source: &str) -> CompileResponse {
        let arena = Bump::new();
        let (program, parse_errors) = Parser::parse_lenient(source, &arena);
        let tree = SyntaxTree::from_program(&program);

        if !parse_errors.is_empty() {
            debug!(errors = parse_errors.len(), "syntax errors");
            return CompileResponse::new(Diagnostics::from(&parse_errors), tree);
        }

        let result = Compiler::new(self.config.analysis).compile(&program);
        let mut diagnostics = Diagnostics::from(result.errors.as_slice());
        for warning in &result.warnings {
            diagnostics.warning(warning.to_string());
        }

        if let Some(compiled) = result.program
            && let Err(err) = self.save(&compiled)
        {
            warn!(error = %err, "failed to save artifact");
            diagnostics.unlocated_error(format!("Failed to save file. {err}"));
        }

        CompileResponse::new(diagnostics, tree)
    }

    /// Write a compiled program to the artifact file.
    pub fn save(&self, program: &CompiledProgram) -> DriverResult<()> {
        let bytes = program.to_bytes()?;
        let path = &self.config.artifact;

        let _guard = self.lock();
        std::fs::write(path, &bytes).map_err(|e| DriverError::io(path, e))?;
        info!(path = %path.display(), bytes = bytes.len(), "artifact saved");
        Ok(())
    }

    /// Execute the artifact with the VM and describe the outcome.
    pub fn run(&self) -> RunResponse {
        let result = match self.execute() {
            Ok(output) => format!("{}\n...finished", output.trim()),
            Err(err @ DriverError::Io { .. }) => format!(
                "Instructions code not found. Must compile first.\n{}\n...failed",
                err.to_string().trim()
            ),
            Err(err) => format!("{}\n...failed", err.to_string().trim()),
        };
        RunResponse { result }
    }

    /// Execute the artifact with the VM, returning its standard output.
    pub fn execute(&self) -> DriverResult<String> {
        let artifact = &self.config.artifact;
        let vm = &self.config.vm;

        let _guard = self.lock();
        std::fs::metadata(artifact).map_err(|e| DriverError::io(artifact, e))?;

        debug!(vm = %vm.display(), artifact = %artifact.display(), "launching vm");
        let output = Command::new(vm)
            .arg(artifact)
            .output()
            .map_err(|source| DriverError::VmLaunch {
                vm: vm.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(DriverError::VmFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.artifact_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Monkey {
    fn default() -> Self {
        Self::new(MonkeyConfig::default())
    }
}
