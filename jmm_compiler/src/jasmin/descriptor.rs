//! JVM type descriptors

use crate::ir::ClassUnit;
use crate::types::{BaseType, Type};

/// The descriptor of one type, with class names qualified through the
/// unit's import map
pub fn descriptor(ty: &Type, unit: &ClassUnit) -> String {
    if ty.is_array {
        return format!("[{}", descriptor(&ty.element(), unit));
    }
    match &ty.base {
        BaseType::Int => "I".to_string(),
        BaseType::Boolean => "Z".to_string(),
        BaseType::Void => "V".to_string(),
        BaseType::String => "Ljava/lang/String;".to_string(),
        BaseType::Any => "Ljava/lang/Object;".to_string(),
        BaseType::Class(name) => format!("L{};", unit.qualified_name(name)),
    }
}

/// `(argdescs)retdesc` for a call or method signature
pub fn method_descriptor(args: &[Type], return_type: &Type, unit: &ClassUnit) -> String {
    let mut out = String::from("(");
    for arg in args {
        out.push_str(&descriptor(arg, unit));
    }
    out.push(')');
    out.push_str(&descriptor(return_type, unit));
    out
}
