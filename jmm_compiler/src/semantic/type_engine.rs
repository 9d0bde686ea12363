//! Expression typing and assignability
//!
//! Derives the semantic type of any expression given the symbol table,
//! and defines when one type may be assigned to another.

use crate::semantic::symbol_table::SymbolTable;
use crate::types::{BaseType, Type};
use jmm_parser::ast::{BinaryOp, Expr};

/// Type queries over expressions of one compilation unit
#[derive(Debug, Clone, Copy)]
pub struct TypeEngine<'a> {
    table: &'a SymbolTable,
}

impl<'a> TypeEngine<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        Self { table }
    }

    /// The semantic type of `expr` inside `method`, or `None` when a
    /// name does not resolve at all.
    pub fn type_of(&self, expr: &Expr, method: &str) -> Option<Type> {
        match expr {
            Expr::IntLiteral { .. } => Some(Type::int()),
            Expr::BoolLiteral { .. } => Some(Type::boolean()),
            Expr::ArrayAccess { .. } => Some(Type::int()),
            Expr::ArrayLiteral { .. } | Expr::NewArray { .. } => Some(Type::int_array()),
            Expr::NewObject { class, .. } => Some(Type::class(class)),
            Expr::This { .. } => Some(Type::class(self.table.class_name())),
            Expr::Paren { expr, .. } => self.type_of(expr, method),
            Expr::Not { .. } => Some(Type::boolean()),
            Expr::Identifier { name, .. } => {
                if let Some((_, ty)) = self.table.resolve_var(method, name) {
                    Some(ty.clone())
                } else if self.table.is_imported(name) {
                    Some(Type::class(name))
                } else {
                    None
                }
            }
            Expr::Binary { op, .. } => {
                if op.is_arithmetic() {
                    Some(Type::int())
                } else {
                    Some(Type::boolean())
                }
            }
            Expr::Call { method: name, .. } => match self.table.return_type_of(name) {
                Some(ty) => Some(ty.clone()),
                None => Some(Type::any()),
            },
            // `.length` is the only member in the language
            Expr::Member { field, .. } => {
                if field == "length" {
                    Some(Type::int())
                } else {
                    Some(Type::any())
                }
            }
        }
    }

    /// Whether a value of type `src` may be assigned to a slot of type
    /// `dst`.
    pub fn assignable(&self, src: &Type, dst: &Type) -> bool {
        if src.is_any() || dst.is_any() {
            return true;
        }
        if src == dst {
            return true;
        }
        if src.is_array != dst.is_array {
            return false;
        }
        match (&src.base, &dst.base) {
            (BaseType::Class(s), BaseType::Class(d)) => {
                // Upcast to the declared superclass
                if s == self.table.class_name() && self.table.super_class() == Some(d.as_str()) {
                    return true;
                }
                // Both imported: assumed related
                self.table.is_imported(s) && self.table.is_imported(d)
            }
            _ => false,
        }
    }

    /// Shared binary-operand check used by the type-checking pass:
    /// arithmetic and comparisons take ints, logical ops take booleans,
    /// arrays never appear in binary expressions.
    pub fn binary_operand_ok(&self, op: BinaryOp, operand: &Type) -> bool {
        if operand.is_array {
            return false;
        }
        if operand.is_any() {
            return true;
        }
        if op.is_logical() {
            operand.is_boolean()
        } else {
            operand.is_int()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jmm_parser::ast::Stmt;
    use jmm_parser::parse_program;

    fn engine_fixture(src: &str) -> (SymbolTable, jmm_parser::ast::Program) {
        let program = parse_program(src).expect("parse failed");
        let table = SymbolTable::build(&program);
        (table, program)
    }

    /// Type of the expression returned by the first method
    fn return_type(src: &str) -> Option<Type> {
        let (table, program) = engine_fixture(src);
        let engine = TypeEngine::new(&table);
        let method = &program.class.methods[0];
        let Stmt::Return { value, .. } = method.body.last().unwrap() else {
            panic!("fixture must end in return");
        };
        engine.type_of(value, &method.name)
    }

    #[test]
    fn test_literal_types() {
        assert_eq!(
            return_type("class A { public int f() { return 1; } }"),
            Some(Type::int())
        );
        assert_eq!(
            return_type("class A { public boolean f() { return true; } }"),
            Some(Type::boolean())
        );
    }

    #[test]
    fn test_binary_types() {
        assert_eq!(
            return_type("class A { public int f(int a) { return a + 1; } }"),
            Some(Type::int())
        );
        assert_eq!(
            return_type("class A { public boolean f(int a) { return a < 1; } }"),
            Some(Type::boolean())
        );
    }

    #[test]
    fn test_this_and_new() {
        assert_eq!(
            return_type("class A { public A f() { return this; } }"),
            Some(Type::class("A"))
        );
        assert_eq!(
            return_type("class A { public A f() { return new A(); } }"),
            Some(Type::class("A"))
        );
    }

    #[test]
    fn test_identifier_lookup_and_import() {
        assert_eq!(
            return_type("class A { public int f(int x) { return x; } }"),
            Some(Type::int())
        );
        // An identifier naming an import types as that class
        let (table, _) = engine_fixture("import io; class A { }");
        let engine = TypeEngine::new(&table);
        let expr = Expr::Identifier {
            name: "io".to_string(),
            span: jmm_parser::Span::empty(),
        };
        assert_eq!(engine.type_of(&expr, "f"), Some(Type::class("io")));
    }

    #[test]
    fn test_unresolved_identifier_is_none() {
        let (table, _) = engine_fixture("class A { }");
        let engine = TypeEngine::new(&table);
        let expr = Expr::Identifier {
            name: "ghost".to_string(),
            span: jmm_parser::Span::empty(),
        };
        assert_eq!(engine.type_of(&expr, "f"), None);
    }

    #[test]
    fn test_unknown_call_types_as_any() {
        assert_eq!(
            return_type(
                "import Other; class A { public int f(Other o) { return o.compute(); } }"
            ),
            Some(Type::any())
        );
    }

    #[test]
    fn test_assignable_reflexive_and_any() {
        let (table, _) = engine_fixture("class A { }");
        let engine = TypeEngine::new(&table);
        for ty in [Type::int(), Type::boolean(), Type::int_array(), Type::class("A")] {
            assert!(engine.assignable(&ty, &ty));
            assert!(engine.assignable(&Type::any(), &ty));
            assert!(engine.assignable(&ty, &Type::any()));
        }
        assert!(!engine.assignable(&Type::int(), &Type::boolean()));
        assert!(!engine.assignable(&Type::int(), &Type::int_array()));
    }

    #[test]
    fn test_assignable_superclass_and_imports() {
        let (table, _) =
            engine_fixture("import Base; import Helper; class A extends Base { }");
        let engine = TypeEngine::new(&table);
        assert!(engine.assignable(&Type::class("A"), &Type::class("Base")));
        assert!(!engine.assignable(&Type::class("Base"), &Type::class("A")));
        assert!(engine.assignable(&Type::class("Helper"), &Type::class("Base")));
        assert!(!engine.assignable(&Type::class("Unknown"), &Type::class("Base")));
    }
}
