//! Live-variable analysis
//!
//! Classic backwards dataflow over the per-method CFG:
//! `in[i] = use[i] ∪ (out[i] − def[i])`, `out[i] = ∪ in[s]` over the
//! successors, iterated to a fixed point.

use crate::ir::{Call, CallKind, Cond, Element, InstrKind, Method, Rhs};
use std::collections::HashSet;

/// Per-instruction def/use and the dataflow solution
#[derive(Debug, Clone)]
pub struct Liveness {
    pub defs: Vec<HashSet<String>>,
    pub uses: Vec<HashSet<String>>,
    pub live_in: Vec<HashSet<String>>,
    pub live_out: Vec<HashSet<String>>,
}

/// Solve liveness for one method
pub fn analyse(method: &Method) -> Liveness {
    let n = method.instructions.len();
    let mut defs = vec![HashSet::new(); n];
    let mut uses = vec![HashSet::new(); n];
    for (i, instr) in method.instructions.iter().enumerate() {
        def_use(&instr.kind, &mut defs[i], &mut uses[i]);
    }

    let mut live_in = vec![HashSet::new(); n];
    let mut live_out = vec![HashSet::new(); n];
    loop {
        let mut changed = false;
        for i in (0..n).rev() {
            let mut out = HashSet::new();
            for succ in method.successors(i) {
                out.extend(live_in[succ].iter().cloned());
            }
            let mut inn = uses[i].clone();
            inn.extend(out.difference(&defs[i]).cloned());
            if out != live_out[i] || inn != live_in[i] {
                changed = true;
                live_out[i] = out;
                live_in[i] = inn;
            }
        }
        if !changed {
            break;
        }
    }

    Liveness {
        defs,
        uses,
        live_in,
        live_out,
    }
}

fn def_use(kind: &InstrKind, defs: &mut HashSet<String>, uses: &mut HashSet<String>) {
    match kind {
        InstrKind::Assign { dest, rhs } => {
            match dest {
                Element::Operand { name, .. } => {
                    defs.insert(name.clone());
                }
                // Storing into an element reads the array and the index
                Element::ArrayAccess { .. } => element_uses(dest, uses),
                Element::Literal { .. } => {}
            }
            match rhs {
                Rhs::Simple(element) | Rhs::Unary { operand: element } => {
                    element_uses(element, uses)
                }
                Rhs::Binary { lhs, rhs, .. } => {
                    element_uses(lhs, uses);
                    element_uses(rhs, uses);
                }
                Rhs::Call(call) => call_uses(call, uses),
                Rhs::GetField { field, .. } => {
                    uses.insert(field.clone());
                }
            }
        }
        InstrKind::Call(call) => call_uses(call, uses),
        // The written field counts as a definition on this convention
        InstrKind::PutField { field, value, .. } => {
            defs.insert(field.clone());
            element_uses(value, uses);
        }
        InstrKind::Return { value, .. } => {
            if let Some(element) = value {
                element_uses(element, uses);
            }
        }
        InstrKind::CondBranch { cond, .. } => match cond {
            Cond::Single(element) | Cond::Not(element) => element_uses(element, uses),
            Cond::Compare { lhs, rhs, .. } => {
                element_uses(lhs, uses);
                element_uses(rhs, uses);
            }
        },
        InstrKind::Goto { .. } => {}
    }
}

fn element_uses(element: &Element, uses: &mut HashSet<String>) {
    match element {
        Element::Literal { .. } => {}
        Element::Operand { name, ty } => {
            if ty.class_name() != Some(name.as_str()) {
                uses.insert(name.clone());
            }
        }
        Element::ArrayAccess { name, index, .. } => {
            uses.insert(name.clone());
            element_uses(index, uses);
        }
    }
}

fn call_uses(call: &Call, uses: &mut HashSet<String>) {
    if !matches!(call.kind, CallKind::Static | CallKind::New | CallKind::Ldc) {
        element_uses(&call.caller, uses);
    }
    for arg in &call.args {
        element_uses(arg, uses);
    }
}
