//! End-to-end scenarios: source text in, OLLIR and Jasmin out

mod common;

use common::*;
use jmm_compiler::Stage;

// ==================== Plain arithmetic method ====================

#[test]
fn test_add_method_ollir_shape() {
    let ollir = ollir_of("class A { public int add(int a, int b) { return a + b; } }");
    assert!(ollir.contains(".method public add(a.i32, b.i32).i32"), "{}", ollir);
    assert!(ollir.contains("t1.i32 :=.i32 a.i32 +.i32 b.i32;"), "{}", ollir);
    assert!(ollir.contains("ret.i32 t1.i32;"), "{}", ollir);
}

#[test]
fn test_add_method_jasmin_shape() {
    let jasmin = jasmin_of("class A { public int add(int a, int b) { return a + b; } }");
    let body = method_lines(&jasmin, "add(II)I");
    let start = body.iter().position(|l| *l == "iload_1").expect("iload_1");
    assert_eq!(body[start..start + 4], ["iload_1", "iload_2", "iadd", "ireturn"]);
    assert!(jasmin.contains(".limit stack 2"));
    assert!(jasmin.contains(".limit locals 3"));
}

// ==================== Constant optimisation ====================

#[test]
fn test_folded_assignments_and_return() {
    let result = compile_optimized(
        "class A { public int f() { int x; x = 2; x = x + 3; return x; } }",
    );
    let ollir = result.ollir.expect("no OLLIR");
    assert!(ollir.contains("x.i32 :=.i32 2.i32;"), "{}", ollir);
    assert!(ollir.contains("x.i32 :=.i32 5.i32;"), "{}", ollir);
    assert!(ollir.contains("ret.i32 5.i32;"), "{}", ollir);

    let jasmin = result.jasmin.expect("no Jasmin");
    let body = method_lines(&jasmin, "f()I");
    let start = body.iter().position(|l| *l == "iconst_2").expect("iconst_2");
    assert_eq!(
        body[start..start + 6],
        ["iconst_2", "istore_1", "iconst_5", "istore_1", "iconst_5", "ireturn"]
    );
}

#[test]
fn test_unoptimized_compilation_keeps_the_sum() {
    let result = compile("class A { public int f() { int x; x = 2; x = x + 3; return x; } }");
    let ollir = result.ollir.expect("no OLLIR");
    assert!(ollir.contains("x.i32 :=.i32 x.i32 +.i32 3.i32;"), "{}", ollir);
}

// ==================== Varargs ====================

#[test]
fn test_varargs_call_reifies_an_array() {
    let src = "class A { public int sum(int... xs) { return xs[0]; } \
               public int f() { return this.sum(1, 2, 3); } }";
    let ollir = ollir_of(src);
    assert!(ollir.contains(":=.array.i32 new(array, 3.i32).array.i32;"), "{}", ollir);
    assert!(ollir.contains("[0.i32].i32 :=.i32 1.i32;"), "{}", ollir);
    assert!(ollir.contains("[1.i32].i32 :=.i32 2.i32;"), "{}", ollir);
    assert!(ollir.contains("[2.i32].i32 :=.i32 3.i32;"), "{}", ollir);
    assert!(
        ollir.contains("invokevirtual(this, \"sum\", t1.array.i32).i32"),
        "{}",
        ollir
    );
}

// ==================== Static context ====================

#[test]
fn test_field_use_in_static_method_is_rejected() {
    let src = "class A { int q; public static void main(String[] args) { int x; x = q; } }";
    let result = compile(src);
    assert!(!result.succeeded());
    assert_eq!(result.reports[0].stage, Stage::Semantic);
    assert!(
        result.reports[0].message.contains("static"),
        "got: {}",
        result.reports[0].message
    );
    assert!(result.ollir.is_none());
}

// ==================== Short-circuit && ====================

#[test]
fn test_and_short_circuits_in_ollir() {
    let src = "class A { public boolean p(boolean a, boolean b) { return a && b; } }";
    let ollir = ollir_of(src);
    assert!(ollir.contains("if (!.bool a.bool) goto L_false0;"), "{}", ollir);
    assert!(ollir.contains("t1.bool :=.bool b.bool;"), "{}", ollir);
    assert!(ollir.contains("goto L_end0;"), "{}", ollir);
    assert!(ollir.contains("t1.bool :=.bool 0.bool;"), "{}", ollir);
    assert!(ollir.contains("ret.bool t1.bool;"), "{}", ollir);
}

#[test]
fn test_and_short_circuits_in_jasmin() {
    let src = "class A { public boolean p(boolean a, boolean b) { return a && b; } }";
    let jasmin = jasmin_of(src);
    // The left operand decides whether the right is even loaded
    assert!(jasmin.contains("ifeq L_false0"), "{}", jasmin);
    assert!(jasmin.contains("goto L_end0"), "{}", jasmin);
    assert!(jasmin.contains("L_false0:"), "{}", jasmin);
    assert!(jasmin.contains("L_end0:"), "{}", jasmin);
}

// ==================== Register allocation ceiling ====================

#[test]
fn test_two_register_ceiling_fits() {
    let src = "class A { public int f() { int a; int b; int c; \
               a = 1; b = 2; c = a + b; return c; } }";
    let result = compile_with_registers(src, 2);
    assert!(result.succeeded(), "reports: {:?}", result.reports);
    assert!(result.jasmin.is_some());
}

#[test]
fn test_one_register_ceiling_reports_minimum() {
    let src = "class A { public int f() { int a; int b; int c; \
               a = 1; b = 2; c = a + b; return c; } }";
    let result = compile_with_registers(src, 1);
    assert!(!result.succeeded());
    let report = &result.reports[0];
    assert_eq!(report.stage, Stage::Optimization);
    assert_eq!(report.message, "Need at least 2 registers");
    assert!(result.jasmin.is_none());
}

#[test]
fn test_minimise_shrinks_the_frame() {
    let src = "class A { public int f() { int a; int b; int c; \
               a = 1; b = a + 1; c = b + 1; return c; } }";
    let unallocated = compile_with_registers(src, -1);
    let minimised = compile_with_registers(src, 0);
    let tall = unallocated.jasmin.expect("no Jasmin");
    let slim = minimised.jasmin.expect("no Jasmin");
    assert!(tall.contains(".limit locals 4"), "{}", tall);
    // a, b and c chain: each dies feeding the next, one slot suffices
    assert!(slim.contains(".limit locals 2"), "{}", slim);
}

// ==================== Whole-program smoke ====================

#[test]
fn test_factorial_program_compiles() {
    let src = r#"
        import io;

        class Fac {
            public int compute(int n) {
                int result;
                if (n < 1) {
                    result = 1;
                } else {
                    result = n * this.compute(n - 1);
                }
                return result;
            }

            public static void main(String[] args) {
                io.println(new Fac().compute(10));
            }
        }
    "#;
    let result = compile(src);
    assert!(result.succeeded(), "reports: {:?}", result.reports);
    let ollir = result.ollir.expect("no OLLIR");
    assert!(ollir.contains("import io;"));
    assert!(ollir.contains("Fac extends Object"));
    assert!(ollir.contains("invokevirtual(this, \"compute\""), "{}", ollir);

    let jasmin = result.jasmin.expect("no Jasmin");
    assert!(jasmin.contains(".class public Fac"));
    assert!(jasmin.contains(".method public static main([Ljava/lang/String;)V"));
    assert!(jasmin.contains("invokestatic io/println(I)V"));
    assert!(jasmin.contains("new Fac"));
}

#[test]
fn test_loop_program_compiles() {
    let src = r#"
        class Sum {
            public int upto(int n) {
                int i;
                int total;
                i = 0;
                total = 0;
                while (i < n) {
                    total = total + i;
                    i = i + 1;
                }
                return total;
            }
        }
    "#;
    let result = compile(src);
    assert!(result.succeeded(), "reports: {:?}", result.reports);
    let ollir = result.ollir.expect("no OLLIR");
    assert!(ollir.contains("L_while0:"), "{}", ollir);
    assert!(ollir.contains("if (i.i32 <.i32 n.i32) goto L_body0;"), "{}", ollir);
    assert!(ollir.contains("goto L_endwhile0;"), "{}", ollir);
    let jasmin = result.jasmin.expect("no Jasmin");
    assert!(jasmin.contains("iinc"), "{}", jasmin);
}
