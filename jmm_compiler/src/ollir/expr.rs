//! Expression linearisation
//!
//! Every helper returns a [`Lowered`]: the prelude statements to run
//! plus the operand that stands for the expression's value.

use super::{escape_name, ollir_type, Lowered, OllirEmitter};
use crate::semantic::symbol_table::VarLocation;
use crate::types::Type;
use jmm_parser::ast::{BinaryOp, Expr};

impl<'a> OllirEmitter<'a> {
    pub(crate) fn lower_expr(&mut self, expr: &Expr, expected: Option<&Type>) -> Lowered {
        match expr {
            Expr::IntLiteral { value, .. } => {
                Lowered::operand(format!("{}.i32", value), Type::int())
            }
            Expr::BoolLiteral { value, .. } => Lowered::operand(
                format!("{}.bool", if *value { 1 } else { 0 }),
                Type::boolean(),
            ),
            Expr::This { .. } => {
                Lowered::operand("this".to_string(), Type::class(self.table.class_name()))
            }
            Expr::Paren { expr, .. } => self.lower_expr(expr, expected),
            Expr::Identifier { name, .. } => self.lower_identifier(name),
            Expr::Not { expr: inner, .. } => {
                let inner = self.lower_expr(inner, Some(&Type::boolean()));
                let temp = self.next_temp();
                let computation = format!(
                    "{}{}.bool :=.bool !.bool {};\n",
                    inner.computation, temp, inner.code
                );
                Lowered {
                    computation,
                    code: format!("{}.bool", temp),
                    ty: Type::boolean(),
                }
            }
            Expr::Binary { op, lhs, rhs, .. } => self.lower_binary(*op, lhs, rhs),
            Expr::Call { .. } => {
                let (mut computation, call_text, ty) = self.lower_call(expr, expected);
                let temp = self.next_temp();
                let suffix = ollir_type(&ty);
                computation.push_str(&format!(
                    "{}.{} :=.{} {};\n",
                    temp, suffix, suffix, call_text
                ));
                Lowered {
                    computation,
                    code: format!("{}.{}", temp, suffix),
                    ty,
                }
            }
            Expr::Member { object, field, .. } => self.lower_member(object, field),
            Expr::ArrayAccess { array, index, .. } => {
                let array = self.lower_expr(array, None);
                let index = self.lower_expr(index, Some(&Type::int()));
                let temp = self.next_temp();
                let computation = format!(
                    "{}{}{}.i32 :=.i32 {}[{}].i32;\n",
                    array.computation,
                    index.computation,
                    temp,
                    array.name(),
                    index.code
                );
                Lowered {
                    computation,
                    code: format!("{}.i32", temp),
                    ty: Type::int(),
                }
            }
            Expr::ArrayLiteral { elements, .. } => self.lower_array_literal(elements),
            Expr::NewArray { size, .. } => {
                let size = self.lower_expr(size, Some(&Type::int()));
                let temp = self.next_temp();
                let computation = format!(
                    "{}{}.array.i32 :=.array.i32 new(array, {}).array.i32;\n",
                    size.computation, temp, size.code
                );
                Lowered {
                    computation,
                    code: format!("{}.array.i32", temp),
                    ty: Type::int_array(),
                }
            }
            Expr::NewObject { class, .. } => {
                let temp = self.next_temp();
                let computation = format!(
                    "{}.{} :=.{} new({}).{};\ninvokespecial({}.{}, \"<init>\").V;\n",
                    temp, class, class, class, class, temp, class
                );
                Lowered {
                    computation,
                    code: format!("{}.{}", temp, class),
                    ty: Type::class(class),
                }
            }
        }
    }

    /// Locals and parameters are named operands; a field read goes
    /// through a `getfield` temporary; an import name stays bare (it
    /// only ever appears as a static-call receiver).
    fn lower_identifier(&mut self, name: &str) -> Lowered {
        match self.table.resolve_var(&self.current_method, name) {
            Some((VarLocation::Field, ty)) => {
                let ty = ty.clone();
                self.lower_field_read(name, &ty)
            }
            Some((_, ty)) => {
                let ty = ty.clone();
                Lowered::operand(format!("{}.{}", escape_name(name), ollir_type(&ty)), ty)
            }
            None => Lowered::operand(escape_name(name), Type::class(name)),
        }
    }

    pub(crate) fn lower_field_read(&mut self, name: &str, ty: &Type) -> Lowered {
        let temp = self.next_temp();
        let suffix = ollir_type(ty);
        let computation = format!(
            "{}.{} :=.{} getfield(this, {}.{}).{};\n",
            temp,
            suffix,
            suffix,
            escape_name(name),
            suffix,
            suffix
        );
        Lowered {
            computation,
            code: format!("{}.{}", temp, suffix),
            ty: ty.clone(),
        }
    }

    fn lower_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Lowered {
        if op == BinaryOp::And {
            return self.lower_short_circuit_and(lhs, rhs);
        }
        let operand_expected = if op.is_logical() {
            Type::boolean()
        } else {
            Type::int()
        };
        let lhs = self.lower_expr(lhs, Some(&operand_expected));
        let rhs = self.lower_expr(rhs, Some(&operand_expected));
        let result_ty = if op.is_arithmetic() {
            Type::int()
        } else {
            Type::boolean()
        };
        let op_suffix = self.binary_op_suffix(op, &lhs.ty);
        let result_suffix = ollir_type(&result_ty);
        let temp = self.next_temp();
        let computation = format!(
            "{}{}{}.{} :=.{} {} {}.{} {};\n",
            lhs.computation,
            rhs.computation,
            temp,
            result_suffix,
            result_suffix,
            lhs.code,
            op.symbol(),
            op_suffix,
            rhs.code
        );
        Lowered {
            computation,
            code: format!("{}.{}", temp, result_suffix),
            ty: result_ty,
        }
    }

    /// `&&` evaluates its right side only when the left is true
    fn lower_short_circuit_and(&mut self, lhs: &Expr, rhs: &Expr) -> Lowered {
        let lhs = self.lower_expr(lhs, Some(&Type::boolean()));
        let temp = self.next_temp();
        let n = self.next_label();
        let rhs = self.lower_expr(rhs, Some(&Type::boolean()));

        let mut computation = String::new();
        computation.push_str(&lhs.computation);
        computation.push_str(&format!("if (!.bool {}) goto L_false{};\n", lhs.code, n));
        computation.push_str(&rhs.computation);
        computation.push_str(&format!("{}.bool :=.bool {};\n", temp, rhs.code));
        computation.push_str(&format!("goto L_end{};\n", n));
        computation.push_str(&format!("L_false{}:\n", n));
        computation.push_str(&format!("{}.bool :=.bool 0.bool;\n", temp));
        computation.push_str(&format!("L_end{}:\n", n));
        Lowered {
            computation,
            code: format!("{}.bool", temp),
            ty: Type::boolean(),
        }
    }

    /// `array.length` and field member reads
    fn lower_member(&mut self, object: &Expr, field: &str) -> Lowered {
        // `this.name` reads an instance field directly
        if matches!(object.unwrap_parens(), Expr::This { .. }) {
            if let Some(symbol) = self.table.field(field) {
                let ty = symbol.ty.clone();
                return self.lower_field_read(field, &ty);
            }
        }
        let object = self.lower_expr(object, None);
        let temp = self.next_temp();
        let computation = format!(
            "{}{}.i32 :=.i32 arraylength({}).i32;\n",
            object.computation, temp, object.code
        );
        Lowered {
            computation,
            code: format!("{}.i32", temp),
            ty: Type::int(),
        }
    }

    fn lower_array_literal(&mut self, elements: &[Expr]) -> Lowered {
        let temp = self.next_temp();
        let mut computation = format!(
            "{}.array.i32 :=.array.i32 new(array, {}.i32).array.i32;\n",
            temp,
            elements.len()
        );
        for (i, element) in elements.iter().enumerate() {
            let element = self.lower_expr(element, Some(&Type::int()));
            computation.push_str(&element.computation);
            computation.push_str(&format!(
                "{}[{}.i32].i32 :=.i32 {};\n",
                temp, i, element.code
            ));
        }
        Lowered {
            computation,
            code: format!("{}.array.i32", temp),
            ty: Type::int_array(),
        }
    }

    /// Lower a call expression to its invocation text. Used both for
    /// value contexts (the caller binds a temporary) and statement
    /// contexts (the text stands alone).
    pub(crate) fn lower_call(
        &mut self,
        expr: &Expr,
        expected: Option<&Type>,
    ) -> (String, String, Type) {
        let Expr::Call {
            receiver,
            method,
            args,
            ..
        } = expr
        else {
            unreachable!("lower_call takes a call expression");
        };

        let mut computation = String::new();
        let param_types: Vec<Type> = self
            .table
            .params_of(method)
            .map(|params| params.iter().map(|p| p.ty.clone()).collect())
            .unwrap_or_default();
        let mut arg_codes = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            let expected_arg = param_types.get(i);
            let lowered = self.lower_expr(arg, expected_arg);
            computation.push_str(&lowered.computation);
            arg_codes.push(lowered.code);
        }

        let receiver_expr = receiver.unwrap_parens();
        let (kind, caller) = match receiver_expr {
            Expr::This { .. } => ("invokevirtual", "this".to_string()),
            Expr::Identifier { name, .. }
                if self.table.resolve_var(&self.current_method, name).is_none()
                    && self.table.is_imported(name) =>
            {
                ("invokestatic", name.clone())
            }
            _ => {
                let receiver = self.lower_expr(receiver_expr, None);
                computation.push_str(&receiver.computation);
                ("invokevirtual", receiver.code)
            }
        };

        // Return type: surrounding context first, then the declared
        // signature, then void
        let return_ty = expected
            .filter(|ty| !ty.is_any())
            .cloned()
            .or_else(|| self.table.return_type_of(method).cloned())
            .unwrap_or(Type::void());

        let mut call_text = format!("{}({}, \"{}\"", kind, caller, method);
        for code in &arg_codes {
            call_text.push_str(", ");
            call_text.push_str(code);
        }
        call_text.push_str(&format!(").{}", ollir_type(&return_ty)));
        (computation, call_text, return_ty)
    }

    /// A branch condition: comparisons and negations stay structural so
    /// the bytecode emitter can pick the matching branch instruction.
    pub(crate) fn lower_condition(&mut self, cond: &Expr) -> (String, String) {
        match cond.unwrap_parens() {
            Expr::Binary { op, lhs, rhs, .. } if op.is_comparison() => {
                let lhs = self.lower_expr(lhs, Some(&Type::int()));
                let rhs = self.lower_expr(rhs, Some(&Type::int()));
                let op_suffix = self.binary_op_suffix(*op, &lhs.ty);
                let computation = format!("{}{}", lhs.computation, rhs.computation);
                let text = format!("{} {}.{} {}", lhs.code, op.symbol(), op_suffix, rhs.code);
                (computation, text)
            }
            Expr::Not { expr: inner, .. } => {
                let inner = self.lower_expr(inner, Some(&Type::boolean()));
                let text = format!("!.bool {}", inner.code);
                (inner.computation, text)
            }
            other => {
                let lowered = self.lower_expr(other, Some(&Type::boolean()));
                (lowered.computation, lowered.code)
            }
        }
    }

    /// Literal or a plain local/parameter reference: an operand that
    /// needs no prelude
    pub(crate) fn is_simple_operand(&self, expr: &Expr) -> bool {
        match expr {
            Expr::IntLiteral { .. } | Expr::BoolLiteral { .. } => true,
            Expr::Identifier { name, .. } => matches!(
                self.table.resolve_var(&self.current_method, name),
                Some((VarLocation::Local | VarLocation::Param, _))
            ),
            _ => false,
        }
    }

    /// Operator suffix: comparisons carry their operand type, logic is
    /// boolean, arithmetic is i32
    pub(crate) fn binary_op_suffix(&self, op: BinaryOp, operand_ty: &Type) -> String {
        if op.is_logical() {
            "bool".to_string()
        } else if op.is_comparison() {
            ollir_type(operand_ty)
        } else {
            "i32".to_string()
        }
    }
}
