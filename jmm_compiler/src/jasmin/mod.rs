//! Jasmin emission
//!
//! Walks the IR class and prints Jasmin assembly: class header,
//! fields, the canonical constructor, then one `.method` block per
//! method with computed `.limit stack` / `.limit locals`.

pub mod descriptor;
pub mod method;

pub use descriptor::{descriptor as type_descriptor, method_descriptor};
pub use method::MethodWriter;

use crate::ir::ClassUnit;

/// Emit the whole class as Jasmin text
pub fn emit_jasmin(unit: &ClassUnit) -> String {
    let mut out = String::new();
    out.push_str(&format!(".class public {}\n", unit.class_name));
    let super_name = unit
        .super_class
        .as_deref()
        .map(|parent| unit.qualified_name(parent))
        .unwrap_or_else(|| "java/lang/Object".to_string());
    out.push_str(&format!(".super {}\n", super_name));

    for field in &unit.fields {
        out.push_str(&format!(
            ".field public {} {}\n",
            field.name,
            descriptor::descriptor(&field.ty, unit)
        ));
    }

    out.push('\n');
    out.push_str(&constructor_block(&super_name));

    for method in &unit.methods {
        if method.is_constructor {
            continue;
        }
        out.push('\n');
        out.push_str(&MethodWriter::new(unit, method).emit());
    }
    out
}

/// The generated no-argument constructor
fn constructor_block(super_name: &str) -> String {
    let mut out = String::new();
    out.push_str(".method public <init>()V\n");
    out.push_str("    .limit stack 1\n");
    out.push_str("    .limit locals 1\n");
    out.push_str("    aload_0\n");
    out.push_str(&format!("    invokespecial {}/<init>()V\n", super_name));
    out.push_str("    return\n");
    out.push_str(".end method\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::parse_class_unit;

    fn emit(src: &str) -> String {
        emit_jasmin(&parse_class_unit(src).expect("parse failed"))
    }

    const ADD: &str = r#"
Simple extends Object {
    .construct Simple().V {
        invokespecial(this, "<init>").V;
    }
    .method public add(a.i32, b.i32).i32 {
        t1.i32 :=.i32 a.i32 +.i32 b.i32;
        ret.i32 t1.i32;
    }
}
"#;

    #[test]
    fn test_class_header_and_constructor() {
        let jasmin = emit(ADD);
        assert!(jasmin.contains(".class public Simple"));
        assert!(jasmin.contains(".super java/lang/Object"));
        assert!(jasmin.contains(".method public <init>()V"));
        assert!(jasmin.contains("invokespecial java/lang/Object/<init>()V"));
    }

    #[test]
    fn test_add_body_feeds_return_directly() {
        let jasmin = emit(ADD);
        assert!(jasmin.contains(".method public add(II)I"));
        let body: Vec<&str> = jasmin
            .lines()
            .skip_while(|l| !l.contains("add(II)I"))
            .map(str::trim)
            .collect();
        let iload_1 = body.iter().position(|l| *l == "iload_1").unwrap();
        assert_eq!(body[iload_1 + 1], "iload_2");
        assert_eq!(body[iload_1 + 2], "iadd");
        assert_eq!(body[iload_1 + 3], "ireturn");
        assert!(jasmin.contains(".limit stack 2"));
        assert!(jasmin.contains(".limit locals 3"));
    }

    #[test]
    fn test_extends_resolves_super_through_imports() {
        let src = r#"
import a.b.Base;

Child extends Base {
    .construct Child().V {
        invokespecial(this, "<init>").V;
    }
}
"#;
        let jasmin = emit(src);
        assert!(jasmin.contains(".super a/b/Base"));
        assert!(jasmin.contains("invokespecial a/b/Base/<init>()V"));
    }

    #[test]
    fn test_iinc_peephole() {
        let src = r#"
Loop extends Object {
    .construct Loop().V {
        invokespecial(this, "<init>").V;
    }
    .method public f(n.i32).i32 {
        i.i32 :=.i32 0.i32;
        i.i32 :=.i32 i.i32 +.i32 1.i32;
        i.i32 :=.i32 i.i32 -.i32 2.i32;
        x.i32 :=.i32 i.i32 +.i32 200.i32;
        ret.i32 x.i32;
    }
}
"#;
        let jasmin = emit(src);
        assert!(jasmin.contains("iinc 2 1"));
        assert!(jasmin.contains("iinc 2 -2"));
        // 200 does not fit a signed byte: no iinc
        assert!(jasmin.contains("sipush 200"));
    }

    #[test]
    fn test_constant_width_selection() {
        let src = r#"
Consts extends Object {
    .construct Consts().V {
        invokespecial(this, "<init>").V;
    }
    .method public f().i32 {
        a.i32 :=.i32 5.i32;
        b.i32 :=.i32 100.i32;
        c.i32 :=.i32 30000.i32;
        d.i32 :=.i32 100000.i32;
        e.i32 :=.i32 -1.i32;
        ret.i32 a.i32;
    }
}
"#;
        let jasmin = emit(src);
        assert!(jasmin.contains("iconst_5"));
        assert!(jasmin.contains("bipush 100"));
        assert!(jasmin.contains("sipush 30000"));
        assert!(jasmin.contains("ldc 100000"));
        assert!(jasmin.contains("iconst_m1"));
    }

    #[test]
    fn test_new_dup_invokespecial_pairing() {
        let src = r#"
Maker extends Object {
    .construct Maker().V {
        invokespecial(this, "<init>").V;
    }
    .method public make().Maker {
        t1.Maker :=.Maker new(Maker).Maker;
        invokespecial(t1.Maker, "<init>").V;
        ret.Maker t1.Maker;
    }
}
"#;
        let jasmin = emit(src);
        let body: Vec<&str> = jasmin
            .lines()
            .skip_while(|l| !l.contains("make()"))
            .map(str::trim)
            .collect();
        let new_at = body.iter().position(|l| *l == "new Maker").unwrap();
        assert_eq!(body[new_at + 1], "dup");
        assert_eq!(body[new_at + 2], "invokespecial Maker/<init>()V");
        assert_eq!(body[new_at + 3], "astore_1");
        // The standalone constructor call was folded into the idiom
        assert_eq!(
            body.iter()
                .filter(|l| l.starts_with("invokespecial Maker/<init>"))
                .count(),
            1
        );
        assert!(jasmin.contains("areturn"));
    }

    #[test]
    fn test_fields_and_accessors() {
        let src = r#"
Box extends Object {
    .field public value.i32;
    .construct Box().V {
        invokespecial(this, "<init>").V;
    }
    .method public get().i32 {
        t1.i32 :=.i32 getfield(this, value.i32).i32;
        ret.i32 t1.i32;
    }
    .method public set(x.i32).V {
        putfield(this, value.i32, x.i32).V;
        ret.V;
    }
}
"#;
        let jasmin = emit(src);
        assert!(jasmin.contains(".field public value I"));
        assert!(jasmin.contains("getfield Box/value I"));
        assert!(jasmin.contains("putfield Box/value I"));
        assert!(jasmin.contains("return"));
    }

    #[test]
    fn test_static_call_and_discarded_result() {
        let src = r#"
import io;

Caller extends Object {
    .construct Caller().V {
        invokespecial(this, "<init>").V;
    }
    .method public run().i32 {
        invokestatic(io, "println", 7.i32).V;
        invokevirtual(this, "run").i32;
        ret.i32 0.i32;
    }
}
"#;
        let jasmin = emit(src);
        assert!(jasmin.contains("invokestatic io/println(I)V"));
        assert!(jasmin.contains("invokevirtual Caller/run()I"));
        // The discarded int result is popped
        let body: Vec<&str> = jasmin
            .lines()
            .skip_while(|l| !l.contains("run()I {") && !l.contains(".method public run"))
            .map(str::trim)
            .collect();
        let call_at = body
            .iter()
            .position(|l| *l == "invokevirtual Caller/run()I")
            .unwrap();
        assert_eq!(body[call_at + 1], "pop");
    }

    #[test]
    fn test_comparison_lowering_and_branches() {
        let src = r#"
Cmp extends Object {
    .construct Cmp().V {
        invokespecial(this, "<init>").V;
    }
    .method public f(a.i32, b.i32).i32 {
        if (a.i32 <.i32 b.i32) goto L_then0;
        goto L_endif0;
        L_then0:
        L_endif0:
        ret.i32 0.i32;
    }
}
"#;
        let jasmin = emit(src);
        assert!(jasmin.contains("isub"));
        assert!(jasmin.contains("iflt CmpTrue0"));
        assert!(jasmin.contains("ifne L_then0"));
        assert!(jasmin.contains("goto L_endif0"));
        assert!(jasmin.contains("L_then0:"));
    }

    #[test]
    fn test_negation_branches_on_ifeq() {
        let src = r#"
Neg extends Object {
    .construct Neg().V {
        invokespecial(this, "<init>").V;
    }
    .method public f(b.bool).i32 {
        if (!.bool b.bool) goto L_false0;
        goto L_end0;
        L_false0:
        L_end0:
        ret.i32 0.i32;
    }
}
"#;
        let jasmin = emit(src);
        assert!(jasmin.contains("ifeq L_false0"));
    }

    #[test]
    fn test_arrays_and_length() {
        let src = r#"
Arr extends Object {
    .construct Arr().V {
        invokespecial(this, "<init>").V;
    }
    .method public f().i32 {
        t1.array.i32 :=.array.i32 new(array, 3.i32).array.i32;
        t1[0.i32].i32 :=.i32 9.i32;
        t2.i32 :=.i32 t1[0.i32].i32;
        t3.i32 :=.i32 arraylength(t1.array.i32).i32;
        ret.i32 t3.i32;
    }
}
"#;
        let jasmin = emit(src);
        assert!(jasmin.contains("newarray int"));
        assert!(jasmin.contains("iastore"));
        assert!(jasmin.contains("iaload"));
        assert!(jasmin.contains("arraylength"));
        assert!(jasmin.contains("astore_1"));
    }

    #[test]
    fn test_stack_limit_covers_peak_depth() {
        let src = r#"
Deep extends Object {
    .construct Deep().V {
        invokespecial(this, "<init>").V;
    }
    .method public f(a.i32, b.i32, c.i32).i32 {
        t1.i32 :=.i32 a.i32 +.i32 b.i32;
        t2.i32 :=.i32 t1.i32 +.i32 c.i32;
        ret.i32 t2.i32;
    }
}
"#;
        let jasmin = emit(src);
        assert!(jasmin.contains(".limit stack 2"));
        assert!(jasmin.contains(".limit locals 5"));
    }
}
