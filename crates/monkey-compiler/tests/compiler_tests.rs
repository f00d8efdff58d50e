// tests/compiler_tests.rs
//! End-to-end tests for the Monkey compiler
//!
//! Each test parses a complete program, runs contextual analysis and code
//! generation, and checks the diagnostics or the emitted program.

use bumpalo::Bump;
use monkey_compiler::bytecode::{Constant, OpCode};
use monkey_compiler::{
    AnalysisOptions, CompilationError, CompilationResult, CompiledProgram, Compiler,
};
use monkey_parser::Parser;

fn compile(source: &str) -> CompilationResult {
    compile_with(source, AnalysisOptions::default())
}

fn compile_with(source: &str, options: AnalysisOptions) -> CompilationResult {
    let arena = Bump::new();
    let program = Parser::parse(source, &arena)
        .unwrap_or_else(|errors| panic!("Failed to parse:\n{source}\n{errors}"));
    Compiler::new(options).compile(&program)
}

fn compile_ok(source: &str) -> CompiledProgram {
    let result = compile(source);
    assert!(
        result.is_success(),
        "Expected successful compile, got {:?}",
        result.errors
    );
    result.program.expect("successful compile yields a program")
}

#[test]
fn test_addition_chain() {
    let program = compile_ok("1 + 2 + 3");

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
    // Operands refer to constants 0, 1 and 2 in order.
    assert_eq!(program.chunk().read_operands(0), Some(vec![0]));
    assert_eq!(program.chunk().read_operands(3), Some(vec![1]));
    assert_eq!(program.chunk().read_operands(7), Some(vec![2]));
}

#[test]
fn test_undeclared_skips_code_generation() {
    let result = compile("\n\nx + 1");

    assert!(result.program.is_none());
    assert_eq!(result.errors.len(), 1);
    match &result.errors[0] {
        CompilationError::Undeclared { name, span } => {
            assert_eq!(name, "x");
            assert_eq!(span.line, 3);
        }
        other => panic!("Expected Undeclared, got {other:?}"),
    }
}

#[test]
fn test_mixed_hash_keys() {
    let source = r#"
let ok = {"a": 1, "b": {1: 2, 3: 4}};
let bad = {1: "one", "two": 2};
ok["a"] + bad[1];
"#;
    let result = compile(source);

    assert!(result.program.is_none());
    assert_eq!(
        result.errors,
        vec![CompilationError::InconsistentHashKeyType {
            span: monkey_core::Span::new(3, 11, 1),
        }]
    );
}

#[test]
fn test_nested_invalid_hash_reported_once() {
    let result = compile("let h = {\"a\": {1: 1, \"b\": 2}};\nh;");

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].span().map(|s| s.col), Some(15));
}

#[test]
fn test_closures_and_higher_order_functions() {
    let source = r#"
let newAdder = fn(a) {
    fn(b) { a + b }
};
let addTwo = newAdder(2);
let map = fn(arr, f) {
    let iter = fn(arr, acc) {
        if (len(arr) == 0) {
            acc
        } else {
            iter(rest(arr), push(acc, f(first(arr))))
        }
    };
    iter(arr, [])
};
puts(map([1, 2, 3], addTwo));
"#;
    let program = compile_ok(source);

    let ops = program.opcodes();
    assert!(ops.contains(&OpCode::GetFree));
    assert!(ops.contains(&OpCode::CurrentClosure));
    assert!(ops.contains(&OpCode::GetBuiltin));
    assert_eq!(ops.last(), Some(&OpCode::Pop));
}

#[test]
fn test_recursive_global_function() {
    let source = r#"
let fib = fn(n) {
    if (n < 2) { return n; }
    fib(n - 1) + fib(n - 2)
};
fib(15);
"#;
    let program = compile_ok(source);

    program.chunk().assert_contains_opcodes(&[
        OpCode::Jump,
        OpCode::GetLocal,
        OpCode::LessThan,
        OpCode::JumpIfFalse,
        OpCode::ReturnValue,
        OpCode::CurrentClosure,
        OpCode::Call,
        OpCode::CurrentClosure,
        OpCode::Call,
        OpCode::Add,
        OpCode::ReturnValue,
        OpCode::Closure,
        OpCode::SetGlobal,
        OpCode::GetGlobal,
        OpCode::Constant,
        OpCode::Call,
        OpCode::Pop,
    ]);
}

#[test]
fn test_arity_and_callability() {
    let source = r#"
let pair = fn(a, b) { [a, b] };
let h = {"k": 1};
pair(1);
h("k");
len(1, 2);
"#;
    let result = compile(source);

    let kinds: Vec<&str> = result
        .errors
        .iter()
        .map(|err| match err {
            CompilationError::ArgumentCountMismatch { .. } => "arity",
            CompilationError::NotCallable { .. } => "callable",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["arity", "callable", "arity"]);
    let lines: Vec<u32> = result
        .errors
        .iter()
        .filter_map(CompilationError::span)
        .map(|s| s.line)
        .collect();
    assert_eq!(lines, vec![4, 5, 6]);
}

#[test]
fn test_redeclaration_and_shadowing() {
    let ok = compile("let a = 1; let f = fn() { let a = 2; a }; f() + a;");
    assert!(ok.is_success(), "{:?}", ok.errors);

    let bad = compile("let a = 1;\nlet a = 2;\na;");
    assert!(matches!(
        bad.errors.as_slice(),
        [CompilationError::Redeclared { name, .. }] if name == "a"
    ));
}

#[test]
fn test_unused_declarations() {
    let source = "let unused = 1;\nlet f = fn(x) { 0 };\nf(1);";

    let lenient = compile(source);
    assert!(lenient.is_success());
    assert_eq!(lenient.warnings.len(), 2);

    let strict = compile_with(
        source,
        AnalysisOptions {
            unused_as_error: true,
        },
    );
    assert!(strict.program.is_none());
    let names: Vec<String> = strict
        .errors
        .iter()
        .filter_map(|err| match err {
            CompilationError::UnusedDeclaration { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["unused", "x"]);
}

#[test]
fn test_if_else_value() {
    let program = compile_ok("let v = if (1 < 2) { \"yes\" } else { \"no\" };\nputs(v);");

    program.chunk().assert_opcodes(&[
        OpCode::Constant,
        OpCode::Constant,
        OpCode::LessThan,
        OpCode::JumpIfFalse,
        OpCode::Constant,
        OpCode::Jump,
        OpCode::Constant,
        OpCode::SetGlobal,
        OpCode::GetBuiltin,
        OpCode::GetGlobal,
        OpCode::Call,
        OpCode::Pop,
    ]);
}

#[test]
fn test_serialized_program_round_trip() {
    let program = compile_ok("let greeting = \"hi\"; puts(greeting + \"!\"); -42");

    let bytes = program.to_bytes().expect("program serializes");
    assert_eq!(&bytes[..4], b"MNKY");

    let decoded = CompiledProgram::from_bytes(&bytes).expect("program decodes");
    assert_eq!(decoded.code(), program.code());
    assert_eq!(decoded.constants(), program.constants());
}

#[test]
fn test_disassembly_lists_instructions() {
    let program = compile_ok("let x = 7;\nx * 2;");
    let text = program.disassemble();

    assert!(text.contains("CONSTANT 0 ; 7"), "{text}");
    assert!(text.contains("SET_GLOBAL 0"), "{text}");
    assert!(text.contains("MUL"), "{text}");
    assert_eq!(text.lines().count(), program.opcodes().len());
}

#[test]
fn test_compilations_are_independent() {
    let first = compile_ok("let a = 1; a");
    let second = compile_ok("let a = 1; a");
    assert_eq!(first, second);
}
