//! Symbol table construction
//!
//! One pass over a parsed `Program` produces the indexed facts every
//! later stage works from: class name, superclass, imports, fields and
//! per-method signatures. Source order is preserved everywhere; on
//! duplicate names the first occurrence wins (the duplicate-element pass
//! reports the clash).

use crate::types::Type;
use jmm_parser::ast::{MethodDecl, Program};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named, typed entity (field, parameter or local)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub ty: Type,
    pub name: String,
}

impl Symbol {
    pub fn new(ty: Type, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }
}

/// Everything the compiler knows about one declared method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    pub is_public: bool,
    pub is_static: bool,
    pub return_type: Type,
    pub params: Vec<Symbol>,
    pub locals: Vec<Symbol>,
    /// Whether the last parameter was declared `int...`
    pub is_varargs: bool,
}

/// Indexed facts extracted once from the AST
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolTable {
    class_name: String,
    super_class: Option<String>,
    imports: Vec<String>,
    fields: Vec<Symbol>,
    method_order: Vec<String>,
    methods: HashMap<String, MethodSignature>,
}

impl SymbolTable {
    /// Build the table from a validated program AST
    pub fn build(program: &Program) -> Self {
        let class = &program.class;
        let imports = program.imports.iter().map(|i| i.dotted()).collect();

        let mut fields: Vec<Symbol> = Vec::new();
        for field in &class.fields {
            if fields.iter().all(|f| f.name != field.name) {
                fields.push(Symbol::new(Type::from_node(&field.ty), &field.name));
            }
        }

        let mut method_order = Vec::new();
        let mut methods = HashMap::new();
        for method in &class.methods {
            if methods.contains_key(&method.name) {
                continue;
            }
            method_order.push(method.name.clone());
            methods.insert(method.name.clone(), Self::signature_of(method));
        }

        Self {
            class_name: class.name.clone(),
            super_class: class.extends.clone(),
            imports,
            fields,
            method_order,
            methods,
        }
    }

    fn signature_of(method: &MethodDecl) -> MethodSignature {
        let params: Vec<Symbol> = method
            .params
            .iter()
            .map(|p| Symbol::new(Type::from_node(&p.ty), &p.name))
            .collect();
        let locals: Vec<Symbol> = method
            .locals
            .iter()
            .map(|v| Symbol::new(Type::from_node(&v.ty), &v.name))
            .collect();
        let is_varargs = method
            .params
            .last()
            .map(|p| p.ty.is_varargs)
            .unwrap_or(false);
        MethodSignature {
            name: method.name.clone(),
            is_public: method.is_public,
            is_static: method.is_static,
            return_type: Type::from_node(&method.return_type),
            params,
            locals,
            is_varargs,
        }
    }

    // ==================== Views ====================

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn super_class(&self) -> Option<&str> {
        self.super_class.as_deref()
    }

    /// Imports as dotted names, in source order
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /// Fields in source order
    pub fn fields(&self) -> &[Symbol] {
        &self.fields
    }

    /// Method names in source order
    pub fn methods(&self) -> &[String] {
        &self.method_order
    }

    pub fn method(&self, name: &str) -> Option<&MethodSignature> {
        self.methods.get(name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn return_type_of(&self, method: &str) -> Option<&Type> {
        self.methods.get(method).map(|m| &m.return_type)
    }

    pub fn params_of(&self, method: &str) -> Option<&[Symbol]> {
        self.methods.get(method).map(|m| m.params.as_slice())
    }

    pub fn locals_of(&self, method: &str) -> Option<&[Symbol]> {
        self.methods.get(method).map(|m| m.locals.as_slice())
    }

    pub fn field(&self, name: &str) -> Option<&Symbol> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether `name` matches an import, by its last path segment
    pub fn is_imported(&self, name: &str) -> bool {
        self.imports
            .iter()
            .any(|import| import.rsplit('.').next() == Some(name))
    }

    /// Where a name in a method body resolves to
    pub fn resolve_var(&self, method: &str, name: &str) -> Option<(VarLocation, &Type)> {
        if let Some(sig) = self.methods.get(method) {
            if let Some(local) = sig.locals.iter().find(|l| l.name == name) {
                return Some((VarLocation::Local, &local.ty));
            }
            if let Some(param) = sig.params.iter().find(|p| p.name == name) {
                return Some((VarLocation::Param, &param.ty));
            }
        }
        self.field(name).map(|f| (VarLocation::Field, &f.ty))
    }
}

/// Scope a variable reference resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarLocation {
    Local,
    Param,
    Field,
}
