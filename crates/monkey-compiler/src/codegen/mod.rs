//! Code generation.
//!
//! The [`CodeGenerator`] walks an analyzed program in post-order and emits one
//! linear instruction stream plus a constant pool. It assumes contextual
//! analysis succeeded: names it cannot resolve and operands that do not fit
//! their encoding are reported as [`CompilationError::Internal`].
//!
//! # Layout
//!
//! ```text
//! if:        cond  JUMP_IF_FALSE else  then  JUMP end  else: (else | NULL)  end:
//! function:  JUMP after  body  RETURN_VALUE|RETURN  after: free-loads  CLOSURE
//! ```
//!
//! Jump operands are absolute offsets into the stream. Function bodies are
//! emitted inline and skipped over; `CLOSURE` records where they start.

mod scope;

pub use scope::{Symbol, SymbolKind, SymbolScope};

use monkey_core::CompilationError;
use monkey_parser::Program;
use monkey_parser::ast::{
    BinaryOp, Block, ChainExpr, Expr, FunctionLiteral, IfExpr, LiteralKind, Stmt, UnaryOp,
};
use tracing::debug;

use crate::CompiledProgram;
use crate::bytecode::OpCode;
use crate::emit::BytecodeEmitter;

type Result<T> = std::result::Result<T, CompilationError>;

/// Emits bytecode for a whole program.
pub struct CodeGenerator {
    emitter: BytecodeEmitter,
    scope: SymbolScope,
}

impl CodeGenerator {
    /// Create a generator with a fresh top-level scope.
    pub fn new() -> Self {
        Self {
            emitter: BytecodeEmitter::new(),
            scope: SymbolScope::global(),
        }
    }

    /// Generate code for a program that passed contextual analysis.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn generate(mut self, program: &Program<'_>) -> Result<CompiledProgram> {
        for stmt in program.stmts() {
            self.compile_stmt(stmt)?;
        }

        let program = self.emitter.finish();
        debug!(
            bytes = program.code().len(),
            constants = program.constants().len(),
            globals = self.scope.num_definitions(),
            "code generation finished"
        );
        Ok(program)
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn compile_stmt(&mut self, stmt: &Stmt<'_>) -> Result<()> {
        self.emitter.set_line(stmt.span().line);
        match stmt {
            Stmt::Let(let_stmt) => {
                match let_stmt.value.as_function() {
                    Some(func) => self.compile_function(func, Some(let_stmt.name.name))?,
                    None => self.compile_expr(let_stmt.value)?,
                }
                let symbol = self.scope.define(let_stmt.name.name);
                self.store(&symbol)
            }
            Stmt::Return(ret) => {
                self.compile_expr(ret.value)?;
                self.emitter.emit(OpCode::ReturnValue);
                Ok(())
            }
            Stmt::Expr(expr_stmt) => {
                self.compile_expr(expr_stmt.expr)?;
                self.emitter.emit_pop();
                Ok(())
            }
        }
    }

    /// Compile a block whose value is used: the trailing expression stays on
    /// the stack, otherwise `NULL` is pushed.
    fn compile_value_block(&mut self, block: &Block<'_>) -> Result<()> {
        self.scope.push_scope();
        let result = self.compile_block_body(block);
        self.scope.pop_scope();
        result
    }

    fn compile_block_body(&mut self, block: &Block<'_>) -> Result<()> {
        let Some((last, init)) = block.stmts.split_last() else {
            self.emitter.emit_null();
            return Ok(());
        };

        for stmt in init {
            self.compile_stmt(stmt)?;
        }

        match last {
            Stmt::Expr(tail) => {
                self.emitter.set_line(tail.span.line);
                self.compile_expr(tail.expr)
            }
            other => {
                self.compile_stmt(other)?;
                self.emitter.emit_null();
                Ok(())
            }
        }
    }

    fn store(&mut self, symbol: &Symbol) -> Result<()> {
        match symbol.kind {
            SymbolKind::Global => self.emitter.emit_u16(OpCode::SetGlobal, symbol.index),
            SymbolKind::Local => self.emitter.emit_u8(OpCode::SetLocal, symbol.index),
            kind => Err(CompilationError::internal(format!(
                "cannot assign to {kind:?} symbol '{}'",
                symbol.name
            ))),
        }
    }

    fn load(&mut self, symbol: &Symbol) -> Result<()> {
        match symbol.kind {
            SymbolKind::Global => self.emitter.emit_u16(OpCode::GetGlobal, symbol.index),
            SymbolKind::Local => self.emitter.emit_u8(OpCode::GetLocal, symbol.index),
            SymbolKind::Builtin => self.emitter.emit_u8(OpCode::GetBuiltin, symbol.index),
            SymbolKind::Free => self.emitter.emit_u8(OpCode::GetFree, symbol.index),
            SymbolKind::Function => {
                self.emitter.emit(OpCode::CurrentClosure);
                Ok(())
            }
        }
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    fn compile_expr(&mut self, expr: Expr<'_>) -> Result<()> {
        match expr {
            Expr::Literal(lit) => match lit.kind {
                LiteralKind::Int(value) => self.emitter.emit_int(value),
                LiteralKind::String(value) => self.emitter.emit_string(value),
                LiteralKind::Bool(value) => {
                    self.emitter.emit_bool(value);
                    Ok(())
                }
            },
            Expr::Ident(ident) => {
                let symbol = self.scope.resolve(ident.name).ok_or_else(|| {
                    CompilationError::internal(format!(
                        "unresolved name '{}' at {}",
                        ident.name, ident.span
                    ))
                })?;
                self.load(&symbol)
            }
            Expr::Chain(chain) => self.compile_chain(chain),
            Expr::Unary(unary) => {
                self.compile_expr(unary.operand)?;
                self.emitter.emit(match unary.op {
                    UnaryOp::Neg => OpCode::Minus,
                    UnaryOp::Not => OpCode::Bang,
                });
                Ok(())
            }
            Expr::Call(call) => {
                self.compile_expr(call.callee)?;
                for arg in call.args {
                    self.compile_expr(*arg)?;
                }
                self.emitter.emit_call(call.args.len())
            }
            Expr::Index(index) => {
                self.compile_expr(index.object)?;
                self.compile_expr(index.index)?;
                self.emitter.emit(OpCode::Index);
                Ok(())
            }
            Expr::Array(array) => {
                for element in array.elements {
                    self.compile_expr(*element)?;
                }
                self.emitter.emit_u16(OpCode::Array, array.elements.len())
            }
            Expr::Hash(hash) => {
                for pair in hash.pairs {
                    self.compile_expr(pair.key)?;
                    self.compile_expr(pair.value)?;
                }
                self.emitter.emit_u16(OpCode::Hash, hash.pairs.len())
            }
            Expr::Function(func) => self.compile_function(func, None),
            Expr::If(if_expr) => self.compile_if(if_expr),
            Expr::Paren(paren) => self.compile_expr(paren.expr),
        }
    }

    fn compile_chain(&mut self, chain: &ChainExpr<'_>) -> Result<()> {
        let Some((first, rest)) = chain.operands.split_first() else {
            return Err(CompilationError::internal("operator chain without operands"));
        };
        if rest.len() != chain.ops.len() {
            return Err(CompilationError::internal(format!(
                "operator chain with {} operands and {} operators",
                chain.operands.len(),
                chain.ops.len()
            )));
        }

        self.compile_expr(*first)?;
        for (op, operand) in chain.ops.iter().zip(rest) {
            self.compile_expr(*operand)?;
            self.emitter.emit(binary_opcode(*op));
        }
        Ok(())
    }

    fn compile_if(&mut self, if_expr: &IfExpr<'_>) -> Result<()> {
        self.compile_expr(if_expr.condition)?;
        let else_jump = self.emitter.emit_jump(OpCode::JumpIfFalse);

        self.compile_value_block(&if_expr.then_block)?;
        let end_jump = self.emitter.emit_jump(OpCode::Jump);

        self.emitter.patch_jump(else_jump)?;
        match &if_expr.else_block {
            Some(else_block) => self.compile_value_block(else_block)?,
            None => self.emitter.emit_null(),
        }
        self.emitter.patch_jump(end_jump)
    }

    /// Compile a function literal into an inline body and a `CLOSURE`.
    ///
    /// `name` is the `let` binding the literal is assigned to, which the body
    /// may use to call itself.
    fn compile_function(&mut self, func: &FunctionLiteral<'_>, name: Option<&str>) -> Result<()> {
        let skip = self.emitter.emit_jump(OpCode::Jump);
        let entry = self.emitter.current_offset();

        let parent = std::mem::take(&mut self.scope);
        self.scope = SymbolScope::enclosed(parent);
        if let Some(name) = name {
            self.scope.define_function_name(name);
        }
        for param in func.params {
            self.scope.define(param.name);
        }

        let body = self.compile_function_body(&func.body);

        let parent = self
            .scope
            .take_parent()
            .ok_or_else(|| CompilationError::internal("function scope has no parent"))?;
        let function_scope = std::mem::replace(&mut self.scope, parent);
        body?;

        self.emitter.patch_jump(skip)?;
        self.emitter.set_line(func.span.line);
        for free in function_scope.free_symbols() {
            self.load(free)?;
        }
        self.emitter.emit_closure(
            entry,
            func.params.len(),
            function_scope.num_definitions(),
            function_scope.free_symbols().len(),
        )
    }

    fn compile_function_body(&mut self, body: &Block<'_>) -> Result<()> {
        let Some((last, init)) = body.stmts.split_last() else {
            self.emitter.emit(OpCode::Return);
            return Ok(());
        };

        for stmt in init {
            self.compile_stmt(stmt)?;
        }

        match last {
            Stmt::Expr(tail) => {
                self.emitter.set_line(tail.span.line);
                self.compile_expr(tail.expr)?;
                self.emitter.emit(OpCode::ReturnValue);
            }
            Stmt::Return(_) => self.compile_stmt(last)?,
            Stmt::Let(_) => {
                self.compile_stmt(last)?;
                self.emitter.emit(OpCode::Return);
            }
        }
        Ok(())
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn binary_opcode(op: BinaryOp) -> OpCode {
    match op {
        BinaryOp::Less => OpCode::LessThan,
        BinaryOp::Greater => OpCode::GreaterThan,
        BinaryOp::LessEqual => OpCode::LessEqual,
        BinaryOp::GreaterEqual => OpCode::GreaterEqual,
        BinaryOp::Equal => OpCode::Equal,
        BinaryOp::NotEqual => OpCode::NotEqual,
        BinaryOp::Add => OpCode::Add,
        BinaryOp::Sub => OpCode::Sub,
        BinaryOp::Mul => OpCode::Mul,
        BinaryOp::Div => OpCode::Div,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::Constant;
    use bumpalo::Bump;
    use monkey_parser::Parser;

    fn generate(source: &str) -> CompiledProgram {
        let arena = Bump::new();
        let program = Parser::parse(source, &arena).expect("source should parse");
        CodeGenerator::new()
            .generate(&program)
            .expect("generation should succeed")
    }

    #[test]
    fn chain_is_emitted_left_to_right() {
        let program = generate("1 + 2 + 3");
        program.chunk().assert_opcodes(&[
            OpCode::Constant,
            OpCode::Constant,
            OpCode::Add,
            OpCode::Constant,
            OpCode::Add,
            OpCode::Pop,
        ]);
        assert_eq!(
            program.constants(),
            &[Constant::Int(1), Constant::Int(2), Constant::Int(3)]
        );
    }

    #[test]
    fn mixed_precedence() {
        let program = generate("1 + 2 * 3 < 10");
        program.chunk().assert_opcodes(&[
            OpCode::Constant,
            OpCode::Constant,
            OpCode::Constant,
            OpCode::Mul,
            OpCode::Add,
            OpCode::Constant,
            OpCode::LessThan,
            OpCode::Pop,
        ]);
    }

    #[test]
    fn unary_and_booleans() {
        let program = generate("!true; -5");
        program.chunk().assert_opcodes(&[
            OpCode::True,
            OpCode::Bang,
            OpCode::Pop,
            OpCode::Constant,
            OpCode::Minus,
            OpCode::Pop,
        ]);
    }

    #[test]
    fn global_let_and_reference() {
        let program = generate("let a = 1; let b = a; b");
        program.chunk().assert_opcodes(&[
            OpCode::Constant,
            OpCode::SetGlobal,
            OpCode::GetGlobal,
            OpCode::SetGlobal,
            OpCode::GetGlobal,
            OpCode::Pop,
        ]);
        let chunk = program.chunk();
        assert_eq!(chunk.read_operands(3), Some(vec![0]));
        assert_eq!(chunk.read_operands(9), Some(vec![1]));
    }

    #[test]
    fn repeated_constants_share_a_slot() {
        let program = generate("\"a\" + \"a\"");
        assert_eq!(program.constants(), &[Constant::String("a".into())]);
    }

    #[test]
    fn if_with_else_patches_absolute_targets() {
        let program = generate("if (true) { 10 } else { 20 }");
        // 0 TRUE
        // 1 JUMP_IF_FALSE 10
        // 4 CONSTANT 0
        // 7 JUMP 13
        // 10 CONSTANT 1
        // 13 POP
        let chunk = program.chunk();
        assert_eq!(chunk.read_operands(1), Some(vec![10]));
        assert_eq!(chunk.read_operands(7), Some(vec![13]));
        assert_eq!(chunk.read_op(13), Some(OpCode::Pop));
    }

    #[test]
    fn if_without_else_pushes_null() {
        let program = generate("if (false) { 1 }");
        program.chunk().assert_opcodes(&[
            OpCode::False,
            OpCode::JumpIfFalse,
            OpCode::Constant,
            OpCode::Jump,
            OpCode::Null,
            OpCode::Pop,
        ]);
    }

    #[test]
    fn block_ending_in_let_yields_null() {
        let program = generate("if (true) { let x = 1; }");
        program.chunk().assert_opcodes(&[
            OpCode::True,
            OpCode::JumpIfFalse,
            OpCode::Constant,
            OpCode::SetGlobal,
            OpCode::Null,
            OpCode::Jump,
            OpCode::Null,
            OpCode::Pop,
        ]);
    }

    #[test]
    fn collections_and_index() {
        let program = generate("[1, 2][0]; {\"k\": 1}");
        program.chunk().assert_opcodes(&[
            OpCode::Constant,
            OpCode::Constant,
            OpCode::Array,
            OpCode::Constant,
            OpCode::Index,
            OpCode::Pop,
            OpCode::Constant,
            OpCode::Constant,
            OpCode::Hash,
            OpCode::Pop,
        ]);
        assert_eq!(program.chunk().read_operands(6), Some(vec![2]));
        assert_eq!(program.chunk().read_operands(20), Some(vec![1]));
    }

    #[test]
    fn function_body_is_skipped_and_closed_over() {
        let program = generate("let add = fn(a, b) { a + b };");
        // 0 JUMP 9
        // 3 GET_LOCAL 0
        // 5 GET_LOCAL 1
        // 7 ADD
        // 8 RETURN_VALUE
        // 9 CLOSURE 3 2 2 0
        let chunk = program.chunk();
        assert_eq!(chunk.read_op(0), Some(OpCode::Jump));
        assert_eq!(chunk.read_operands(0), Some(vec![9]));
        assert_eq!(chunk.read_op(9), Some(OpCode::Closure));
        assert_eq!(chunk.read_operands(9), Some(vec![3, 2, 2, 0]));
        program.chunk().assert_opcodes(&[
            OpCode::Jump,
            OpCode::GetLocal,
            OpCode::GetLocal,
            OpCode::Add,
            OpCode::ReturnValue,
            OpCode::Closure,
            OpCode::SetGlobal,
        ]);
    }

    #[test]
    fn empty_function_returns_nothing() {
        let program = generate("fn() { }");
        program.chunk().assert_opcodes(&[
            OpCode::Jump,
            OpCode::Return,
            OpCode::Closure,
            OpCode::Pop,
        ]);
    }

    #[test]
    fn explicit_return_is_not_doubled() {
        let program = generate("fn(x) { return x; }");
        program.chunk().assert_opcodes(&[
            OpCode::Jump,
            OpCode::GetLocal,
            OpCode::ReturnValue,
            OpCode::Closure,
            OpCode::Pop,
        ]);
    }

    #[test]
    fn locals_inside_function() {
        let program = generate("fn() { let x = 5; x }");
        program.chunk().assert_opcodes(&[
            OpCode::Jump,
            OpCode::Constant,
            OpCode::SetLocal,
            OpCode::GetLocal,
            OpCode::ReturnValue,
            OpCode::Closure,
            OpCode::Pop,
        ]);
        // CLOSURE entry=3 params=0 locals=1 free=0
        let closure_at = 3 + 3 + 2 + 2 + 1;
        assert_eq!(
            program.chunk().read_operands(closure_at),
            Some(vec![3, 0, 1, 0])
        );
    }

    #[test]
    fn closures_capture_free_variables() {
        let program = generate("fn(a) { fn(b) { a + b } }");
        program.chunk().assert_opcodes(&[
            OpCode::Jump,
            OpCode::Jump,
            OpCode::GetFree,
            OpCode::GetLocal,
            OpCode::Add,
            OpCode::ReturnValue,
            OpCode::GetLocal,
            OpCode::Closure,
            OpCode::ReturnValue,
            OpCode::Closure,
            OpCode::Pop,
        ]);
    }

    #[test]
    fn recursive_local_function_uses_current_closure() {
        let program = generate("fn() { let loop = fn(n) { loop(n) }; loop(1) }");
        program.chunk().assert_contains_opcodes(&[
            OpCode::CurrentClosure,
            OpCode::GetLocal,
            OpCode::Call,
            OpCode::ReturnValue,
        ]);
    }

    #[test]
    fn builtins_are_loaded_by_index() {
        let program = generate("len(\"abc\")");
        program.chunk().assert_opcodes(&[
            OpCode::GetBuiltin,
            OpCode::Constant,
            OpCode::Call,
            OpCode::Pop,
        ]);
        assert_eq!(program.chunk().read_operands(0), Some(vec![0]));
        assert_eq!(program.chunk().read_operands(5), Some(vec![1]));
    }

    #[test]
    fn unresolved_name_is_internal_error() {
        let arena = Bump::new();
        let program = Parser::parse("missing", &arena).unwrap();
        let err = CodeGenerator::new().generate(&program).unwrap_err();
        assert!(matches!(err, CompilationError::Internal { .. }));
        assert!(err.to_string().contains("unresolved name 'missing'"));
    }

    #[test]
    fn lines_follow_statements() {
        let program = generate("1;\n\n2;");
        let chunk = program.chunk();
        assert_eq!(chunk.line_at(0), Some(1));
        assert_eq!(chunk.line_at(4), Some(3));
    }
}
