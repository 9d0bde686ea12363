//! AST-to-AST rewrites
//!
//! The constant optimiser (propagation + folding to a fixed point) runs
//! only under `--optimize`; the varargs lowering always runs before
//! code generation.

pub mod fold;
pub mod propagate;
pub mod varargs;

pub use fold::{fold_expr, fold_program};
pub use propagate::propagate_program;
pub use varargs::lower_varargs;

use jmm_parser::ast::Program;

/// Iterated constant propagation and folding
#[derive(Debug, Default)]
pub struct ConstantOptimiser {
    iterations: usize,
}

impl ConstantOptimiser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of iterations the last run took to converge
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Rewrite the program until neither propagation nor folding makes
    /// progress; returns the total number of rewrites.
    pub fn optimise(&mut self, program: &mut Program) -> usize {
        let mut total = 0;
        self.iterations = 0;
        loop {
            let round = propagate_program(program) + fold_program(program);
            self.iterations += 1;
            if round == 0 {
                break;
            }
            total += round;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jmm_parser::ast::{Expr, Stmt};
    use jmm_parser::parse_program;

    fn optimise(src: &str) -> Program {
        let mut program = parse_program(src).expect("parse failed");
        ConstantOptimiser::new().optimise(&mut program);
        program
    }

    #[test]
    fn test_propagation_feeds_folding_to_fixpoint() {
        let program =
            optimise("class A { public int f() { int x; x = 2; x = x + 3; return x; } }");
        let body = &program.class.methods[0].body;
        // x = 2; x = 5; return 5;
        assert!(matches!(
            &body[1],
            Stmt::Assign {
                value: Expr::IntLiteral { value: 5, .. },
                ..
            }
        ));
        assert!(matches!(
            &body[2],
            Stmt::Return {
                value: Expr::IntLiteral { value: 5, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_chained_constants_converge() {
        let program = optimise(
            "class A { public int f() { int a; int b; int c; \
             a = 1; b = a + 1; c = b + 1; return c; } }",
        );
        let body = &program.class.methods[0].body;
        assert!(matches!(
            body.last().unwrap(),
            Stmt::Return {
                value: Expr::IntLiteral { value: 3, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_loop_counter_not_constant_folded() {
        let program = optimise(
            "class A { public int f() { int i; i = 0; \
             while (i < 10) { i = i + 1; } return i; } }",
        );
        let body = &program.class.methods[0].body;
        assert!(matches!(
            body.last().unwrap(),
            Stmt::Return {
                value: Expr::Identifier { .. },
                ..
            }
        ));
    }
}
