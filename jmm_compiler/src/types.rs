//! Semantic types
//!
//! The type of every Jmm expression is a base type plus an array flag.
//! `void` never combines with the array flag.

use jmm_parser::ast::TypeNode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base type names
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseType {
    Int,
    Boolean,
    Void,
    /// Synthetic top type for unresolved identifiers from imports;
    /// assignable to and from everything.
    Any,
    String,
    Class(String),
}

/// A semantic type: base plus array flag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Type {
    pub base: BaseType,
    pub is_array: bool,
}

impl Type {
    pub fn new(base: BaseType, is_array: bool) -> Self {
        Self { base, is_array }
    }

    pub fn int() -> Self {
        Self::new(BaseType::Int, false)
    }

    pub fn boolean() -> Self {
        Self::new(BaseType::Boolean, false)
    }

    pub fn void() -> Self {
        Self::new(BaseType::Void, false)
    }

    pub fn any() -> Self {
        Self::new(BaseType::Any, false)
    }

    pub fn int_array() -> Self {
        Self::new(BaseType::Int, true)
    }

    pub fn string_array() -> Self {
        Self::new(BaseType::String, true)
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(BaseType::Class(name.into()), false)
    }

    /// Resolve a source-level annotation into a semantic type
    pub fn from_node(node: &TypeNode) -> Self {
        let base = match node.name.as_str() {
            "int" => BaseType::Int,
            "boolean" => BaseType::Boolean,
            "void" => BaseType::Void,
            "String" => BaseType::String,
            other => BaseType::Class(other.to_string()),
        };
        Self::new(base, node.is_array)
    }

    pub fn is_int(&self) -> bool {
        self.base == BaseType::Int && !self.is_array
    }

    pub fn is_boolean(&self) -> bool {
        self.base == BaseType::Boolean && !self.is_array
    }

    pub fn is_void(&self) -> bool {
        self.base == BaseType::Void
    }

    pub fn is_any(&self) -> bool {
        self.base == BaseType::Any
    }

    /// Element type of an array type
    pub fn element(&self) -> Type {
        Type::new(self.base.clone(), false)
    }

    /// The array type with this base
    pub fn to_array(&self) -> Type {
        Type::new(self.base.clone(), true)
    }

    /// Class name if this is a non-array class type
    pub fn class_name(&self) -> Option<&str> {
        match &self.base {
            BaseType::Class(name) if !self.is_array => Some(name),
            _ => None,
        }
    }

    /// Whether values of this type live in a reference slot on the JVM
    pub fn is_reference(&self) -> bool {
        self.is_array
            || matches!(
                self.base,
                BaseType::String | BaseType::Class(_) | BaseType::Any
            )
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match &self.base {
            BaseType::Int => "int",
            BaseType::Boolean => "boolean",
            BaseType::Void => "void",
            BaseType::Any => "any",
            BaseType::String => "String",
            BaseType::Class(name) => name.as_str(),
        };
        if self.is_array {
            write!(f, "{}[]", name)
        } else {
            write!(f, "{}", name)
        }
    }
}
