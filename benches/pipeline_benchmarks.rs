//! Performance benchmarks for the Monkey compile pipeline.
//!
//! - Phase-specific: parsing, contextual analysis, code generation
//! - Size-based: generated programs from 10 to 2000 statements
//!
//! ## Profiling with Puffin
//!
//! Run with the `profile-with-puffin` feature to collect phase timings:
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use bumpalo::Bump;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use monkey_compiler::{AnalysisOptions, CodeGenerator, Compiler, ContextualVisitor};
use monkey_parser::Parser;
use std::fmt::Write as _;
use std::hint::black_box;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

#[cfg(feature = "profile-with-puffin")]
fn print_profiling_stats() {
    let Some(frame_view) = FRAME_VIEW.get() else {
        return;
    };
    let view = frame_view.lock();
    println!(
        "\n=== Profiling: {} frames recorded ===\n",
        view.recent_frames().count()
    );
}

#[cfg(not(feature = "profile-with-puffin"))]
fn print_profiling_stats() {}

/// A program of `n` groups of bindings, closures, hashes and calls.
fn generate_program(n: usize) -> String {
    let mut source = String::new();
    for i in 0..n {
        let _ = writeln!(source, "let v{i} = {i} * 2 + 1 - {i} / 3;");
        let _ = writeln!(
            source,
            "let f{i} = fn(a, b) {{ if (a < b) {{ a + v{i} }} else {{ b * v{i} }} }};"
        );
        let _ = writeln!(source, "let h{i} = {{\"k{i}\": [v{i}, {i}], \"n\": f{i}(1, 2)}};");
        let _ = writeln!(source, "puts(h{i}[\"n\"] + len(h{i}[\"k{i}\"]));");
    }
    source
}

const CLOSURES: &str = r#"
let newAdder = fn(a) { fn(b) { a + b } };
let map = fn(arr, f) {
    let iter = fn(arr, acc) {
        if (len(arr) == 0) { acc } else { iter(rest(arr), push(acc, f(first(arr)))) }
    };
    iter(arr, [])
};
puts(map([1, 2, 3, 4, 5], newAdder(10)));
"#;

fn phase_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let source = generate_program(100);
    let mut group = c.benchmark_group("pipeline/phases");
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("parse", |b| {
        b.iter(|| {
            let arena = Bump::new();
            let program = Parser::parse(black_box(&source), &arena).unwrap();
            black_box(program.stmts().len())
        });
    });

    group.bench_function("contextual", |b| {
        let arena = Bump::new();
        let program = Parser::parse(&source, &arena).unwrap();
        b.iter(|| {
            let analysis = ContextualVisitor::new(AnalysisOptions::default()).run(&program);
            black_box(analysis.errors.len())
        });
    });

    group.bench_function("codegen", |b| {
        let arena = Bump::new();
        let program = Parser::parse(&source, &arena).unwrap();
        b.iter(|| {
            let compiled = CodeGenerator::new().generate(&program).unwrap();
            black_box(compiled.code().len())
        });
    });

    group.bench_function("closures", |b| {
        b.iter(|| {
            let arena = Bump::new();
            let program = Parser::parse(black_box(CLOSURES), &arena).unwrap();
            let result = Compiler::default().compile(&program);
            black_box(result.is_success())
        });
    });

    group.finish();
}

fn size_based_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let mut group = c.benchmark_group("pipeline/sizes");
    for statements in [10, 100, 500, 2000] {
        let source = generate_program(statements / 4);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(statements),
            &source,
            |b, source| {
                b.iter(|| {
                    let arena = Bump::new();
                    let program = Parser::parse(black_box(source), &arena).unwrap();
                    let result = Compiler::default().compile(&program);
                    end_profiling_frame();
                    black_box(result.program.map(|p| p.code().len()))
                });
            },
        );
    }
    group.finish();

    print_profiling_stats();
}

criterion_group!(benches, phase_benchmarks, size_based_benchmarks);
criterion_main!(benches);
