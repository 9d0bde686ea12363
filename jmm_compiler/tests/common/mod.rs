//! Shared helpers for integration tests
// Consumed selectively by the individual test targets.
#![allow(dead_code)]

use jmm_compiler::{compile_source, Compilation, Config};

/// Compile with default flags, panicking on pipeline errors
pub fn compile(src: &str) -> Compilation {
    compile_source(src, &Config::default()).expect("pipeline failed")
}

/// Compile with the constant optimiser enabled
pub fn compile_optimized(src: &str) -> Compilation {
    let config = Config {
        optimize: true,
        ..Config::default()
    };
    compile_source(src, &config).expect("pipeline failed")
}

/// Compile with a register allocation flag (−1 off, 0 minimise, n ceiling)
pub fn compile_with_registers(src: &str, registers: i32) -> Compilation {
    let config = Config {
        register_allocation: registers,
        ..Config::default()
    };
    compile_source(src, &config).expect("pipeline failed")
}

/// The OLLIR text of a successful compilation
pub fn ollir_of(src: &str) -> String {
    let result = compile(src);
    assert!(
        result.succeeded(),
        "unexpected reports: {:?}",
        result.reports
    );
    result.ollir.expect("no OLLIR artifact")
}

/// The Jasmin text of a successful compilation
pub fn jasmin_of(src: &str) -> String {
    let result = compile(src);
    assert!(
        result.succeeded(),
        "unexpected reports: {:?}",
        result.reports
    );
    result.jasmin.expect("no Jasmin artifact")
}

/// The trimmed lines of one emitted method body, Jasmin or OLLIR
pub fn method_lines<'a>(text: &'a str, header_marker: &str) -> Vec<&'a str> {
    text.lines()
        .skip_while(|line| !line.contains(header_marker))
        .skip(1)
        .take_while(|line| !line.contains(".end method") && !line.trim().eq("}"))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}
