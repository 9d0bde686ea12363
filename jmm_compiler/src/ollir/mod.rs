//! OLLIR emission
//!
//! Lowers the (already validated and rewritten) AST into the textual
//! three-address IR. Expressions linearise into a `(computation, code)`
//! pair: `computation` is the prelude that must run first, `code` the
//! operand usable in the enclosing context. Statements produce plain
//! strings.

mod expr;

use crate::semantic::symbol_table::{SymbolTable, VarLocation};
use crate::types::{BaseType, Type};
use jmm_parser::ast::{BinaryOp, Expr, MethodDecl, Program, Stmt};
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// OLLIR keywords; a source identifier that collides with one is
/// emitted in quotes so the text stays parseable.
static RESERVED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "array",
        "arraylength",
        "bool",
        "construct",
        "extends",
        "field",
        "getfield",
        "goto",
        "i32",
        "if",
        "import",
        "invokespecial",
        "invokestatic",
        "invokevirtual",
        "method",
        "new",
        "public",
        "putfield",
        "ret",
        "static",
        "this",
    ]
    .into_iter()
    .collect()
});

/// Render an operand name, quoting it when it collides with a keyword
pub(crate) fn escape_name(name: &str) -> String {
    if RESERVED.contains(name) {
        format!("\"{}\"", name)
    } else {
        name.to_string()
    }
}

/// The OLLIR spelling of a semantic type (without the leading dot)
pub fn ollir_type(ty: &Type) -> String {
    let base = match &ty.base {
        BaseType::Int => "i32",
        BaseType::Boolean => "bool",
        BaseType::Void | BaseType::Any => "V",
        BaseType::String => "String",
        BaseType::Class(name) => name.as_str(),
    };
    if ty.is_array {
        format!("array.{}", base)
    } else {
        base.to_string()
    }
}

/// A linearised expression: prelude statements plus the resulting operand
#[derive(Debug, Clone)]
pub(crate) struct Lowered {
    /// Statements that must run before the operand is valid; each line
    /// ends in a newline
    pub computation: String,
    /// The operand, with its type suffix
    pub code: String,
    pub ty: Type,
}

impl Lowered {
    pub(crate) fn operand(code: String, ty: Type) -> Self {
        Self {
            computation: String::new(),
            code,
            ty,
        }
    }

    /// The bare name of the operand, without its type suffix
    pub(crate) fn name(&self) -> &str {
        self.code.split('.').next().unwrap_or(&self.code)
    }
}

/// AST to OLLIR text
#[derive(Debug)]
pub struct OllirEmitter<'a> {
    pub(crate) table: &'a SymbolTable,
    pub(crate) current_method: String,
    temp_counter: usize,
    label_counter: usize,
}

impl<'a> OllirEmitter<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        Self {
            table,
            current_method: String::new(),
            temp_counter: 0,
            label_counter: 0,
        }
    }

    /// Fresh temporary name; `t1` comes first
    pub(crate) fn next_temp(&mut self) -> String {
        self.temp_counter += 1;
        format!("t{}", self.temp_counter)
    }

    /// Fresh label number shared by the labels of one construct
    pub(crate) fn next_label(&mut self) -> usize {
        let n = self.label_counter;
        self.label_counter += 1;
        n
    }

    // ==================== Program & class ====================

    pub fn emit_program(&mut self, program: &Program) -> String {
        let mut out = String::new();
        for import in &program.imports {
            out.push_str(&format!("import {};\n", import.dotted()));
        }
        if !program.imports.is_empty() {
            out.push('\n');
        }

        let class_name = self.table.class_name().to_string();
        let parent = self.table.super_class().unwrap_or("Object").to_string();
        out.push_str(&format!("{} extends {} {{\n", class_name, parent));

        for field in self.table.fields() {
            out.push_str(&format!(
                "    .field public {}.{};\n",
                escape_name(&field.name),
                ollir_type(&field.ty)
            ));
        }
        out.push('\n');
        out.push_str(&format!("    .construct {}().V {{\n", class_name));
        out.push_str("        invokespecial(this, \"<init>\").V;\n");
        out.push_str("    }\n");

        for method in &program.class.methods {
            out.push('\n');
            out.push_str(&self.emit_method(method));
        }
        out.push_str("}\n");
        out
    }

    fn emit_method(&mut self, method: &MethodDecl) -> String {
        self.current_method = method.name.clone();
        let signature = self
            .table
            .method(&method.name)
            .expect("symbol table covers every method");
        let params: Vec<String> = signature
            .params
            .iter()
            .map(|p| format!("{}.{}", escape_name(&p.name), ollir_type(&p.ty)))
            .collect();
        let mut mods = String::new();
        if method.is_public {
            mods.push_str("public ");
        }
        if method.is_static {
            mods.push_str("static ");
        }
        let return_type = signature.return_type.clone();

        let mut body = String::new();
        for stmt in &method.body {
            body.push_str(&self.emit_stmt(stmt));
        }
        if return_type.is_void() {
            body.push_str("ret.V;\n");
        }

        let mut out = String::new();
        out.push_str(&format!(
            "    .method {}{}({}).{} {{\n",
            mods,
            escape_name(&method.name),
            params.join(", "),
            ollir_type(&return_type)
        ));
        for line in body.lines() {
            out.push_str("        ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("    }\n");
        out
    }

    // ==================== Statements ====================

    pub(crate) fn emit_stmt(&mut self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Block { stmts, .. } => stmts.iter().map(|s| self.emit_stmt(s)).collect(),
            Stmt::Assign { name, value, .. } => self.emit_assign(name, value),
            Stmt::ArrayAssign {
                name,
                index,
                value,
                ..
            } => self.emit_array_assign(name, index, value),
            Stmt::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => self.emit_if(cond, then_branch, else_branch),
            Stmt::While { cond, body, .. } => self.emit_while(cond, body),
            Stmt::Return { value, .. } => {
                let expected = self
                    .table
                    .return_type_of(&self.current_method)
                    .cloned()
                    .unwrap_or(Type::void());
                let value = self.lower_expr(value, Some(&expected));
                format!(
                    "{}ret.{} {};\n",
                    value.computation,
                    ollir_type(&expected),
                    value.code
                )
            }
            Stmt::Expr { expr, .. } => self.emit_expr_stmt(expr),
        }
    }

    fn emit_assign(&mut self, name: &str, value: &Expr) -> String {
        let (location, lhs_ty) = match self.table.resolve_var(&self.current_method, name) {
            Some((location, ty)) => (location, ty.clone()),
            None => (VarLocation::Local, Type::any()),
        };

        if location == VarLocation::Field {
            let value = self.lower_expr(value, Some(&lhs_ty));
            return format!(
                "{}putfield(this, {}.{}, {}).V;\n",
                value.computation,
                escape_name(name),
                ollir_type(&lhs_ty),
                value.code
            );
        }

        let suffix = ollir_type(&lhs_ty);
        let target = format!("{}.{}", escape_name(name), suffix);

        // A binary of two plain operands assigns without a temporary
        if let Expr::Binary { op, lhs, rhs, .. } = value.unwrap_parens() {
            if *op != BinaryOp::And
                && self.is_simple_operand(lhs.unwrap_parens())
                && self.is_simple_operand(rhs.unwrap_parens())
            {
                let lhs = self.lower_expr(lhs, None);
                let rhs = self.lower_expr(rhs, None);
                let op_suffix = self.binary_op_suffix(*op, &lhs.ty);
                return format!(
                    "{}.{} :=.{} {} {}.{} {};\n",
                    escape_name(name),
                    suffix,
                    suffix,
                    lhs.code,
                    op.symbol(),
                    op_suffix,
                    rhs.code
                );
            }
        }

        let value = self.lower_expr(value, Some(&lhs_ty));
        format!(
            "{}{} :=.{} {};\n",
            value.computation, target, suffix, value.code
        )
    }

    fn emit_array_assign(&mut self, name: &str, index: &Expr, value: &Expr) -> String {
        let element_ty = Type::int();
        let index = self.lower_expr(index, Some(&element_ty));
        let value = self.lower_expr(value, Some(&element_ty));

        let mut out = String::new();
        out.push_str(&index.computation);
        out.push_str(&value.computation);

        let array_name = match self.table.resolve_var(&self.current_method, name) {
            Some((VarLocation::Field, ty)) => {
                let ty = ty.clone();
                let temp = self.next_temp();
                let suffix = ollir_type(&ty);
                out.push_str(&format!(
                    "{}.{} :=.{} getfield(this, {}.{}).{};\n",
                    temp,
                    suffix,
                    suffix,
                    escape_name(name),
                    suffix,
                    suffix
                ));
                temp
            }
            _ => escape_name(name),
        };
        out.push_str(&format!(
            "{}[{}].{} :=.{} {};\n",
            array_name,
            index.code,
            ollir_type(&element_ty),
            ollir_type(&element_ty),
            value.code
        ));
        out
    }

    fn emit_if(&mut self, cond: &Expr, then_branch: &Stmt, else_branch: &Stmt) -> String {
        let n = self.next_label();
        let (computation, cond_text) = self.lower_condition(cond);
        let then_code = self.emit_stmt(then_branch);
        let else_code = self.emit_stmt(else_branch);

        let mut out = String::new();
        out.push_str(&computation);
        out.push_str(&format!("if ({}) goto L_then{};\n", cond_text, n));
        out.push_str(&else_code);
        out.push_str(&format!("goto L_endif{};\n", n));
        out.push_str(&format!("L_then{}:\n", n));
        out.push_str(&then_code);
        out.push_str(&format!("L_endif{}:\n", n));
        out
    }

    fn emit_while(&mut self, cond: &Expr, body: &Stmt) -> String {
        let n = self.next_label();
        let (computation, cond_text) = self.lower_condition(cond);
        let body_code = self.emit_stmt(body);

        let mut out = String::new();
        out.push_str(&format!("L_while{}:\n", n));
        out.push_str(&computation);
        out.push_str(&format!("if ({}) goto L_body{};\n", cond_text, n));
        out.push_str(&format!("goto L_endwhile{};\n", n));
        out.push_str(&format!("L_body{}:\n", n));
        out.push_str(&body_code);
        out.push_str(&format!("goto L_while{};\n", n));
        out.push_str(&format!("L_endwhile{}:\n", n));
        out
    }

    fn emit_expr_stmt(&mut self, expr: &Expr) -> String {
        let expr = expr.unwrap_parens();
        if let Expr::Call { .. } = expr {
            // A call in statement position stands alone, no binding
            let (computation, call_text, _) = self.lower_call(expr, None);
            return format!("{}{};\n", computation, call_text);
        }
        self.lower_expr(expr, None).computation
    }
}

/// Convenience wrapper building an emitter for one compilation
pub fn emit_ollir(program: &Program, table: &SymbolTable) -> String {
    OllirEmitter::new(table).emit_program(program)
}
