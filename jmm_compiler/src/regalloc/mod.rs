//! Register allocation
//!
//! Per method: build liveness over the CFG, build the interference
//! graph over the non-parameter locals, colour it Chaitin-style, and
//! write the chosen registers back into the method's var table. A
//! requested ceiling that the colouring cannot meet produces an
//! optimization-stage diagnostic naming the minimum required count.

pub mod coloring;
pub mod interference;
pub mod liveness;

pub use coloring::{colour, Colouring};
pub use interference::{build as build_interference, InterferenceGraph};
pub use liveness::{analyse as analyse_liveness, Liveness};

use crate::ir::{ClassUnit, Method};
use crate::report::Report;

/// Requested allocation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationMode {
    /// Keep the sequential frame layout
    Disabled,
    /// Allocate with as few registers as possible
    Minimise,
    /// Allocate and fail if more than `n` local registers are needed
    Ceiling(usize),
}

impl AllocationMode {
    /// Decode the driver's `registerAllocation` flag: −1 disables,
    /// 0 minimises, n > 0 sets the ceiling.
    pub fn from_flag(flag: i32) -> Self {
        match flag {
            f if f < 0 => AllocationMode::Disabled,
            0 => AllocationMode::Minimise,
            n => AllocationMode::Ceiling(n as usize),
        }
    }
}

/// Allocate registers for every method of the class. On success the
/// methods' register tables are rewritten in place; reports are
/// returned when a ceiling cannot be met.
pub fn allocate_registers(unit: &mut ClassUnit, mode: AllocationMode) -> Vec<Report> {
    if mode == AllocationMode::Disabled {
        return Vec::new();
    }
    let mut reports = Vec::new();
    for method in &mut unit.methods {
        if method.is_constructor || method.vars.is_empty() {
            continue;
        }
        let needed = allocate_method(method);
        if let AllocationMode::Ceiling(limit) = mode {
            if needed > limit {
                reports.push(Report::optimization(format!(
                    "Need at least {} registers",
                    needed
                )));
            }
        }
    }
    reports
}

/// Colour one method and write the assignment into its var table;
/// returns how many local registers the colouring used.
fn allocate_method(method: &mut Method) -> usize {
    let liveness = liveness::analyse(method);
    let graph = interference::build(method, &liveness);
    let colouring = coloring::colour(&graph, method.first_local_slot());
    for (name, slot) in &colouring.registers {
        method.registers.insert(name.clone(), *slot);
    }
    colouring.colours_used
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::parse_class_unit;

    const THREE_LOCALS: &str = r#"
A extends Object {
    .construct A().V {
        invokespecial(this, "<init>").V;
    }
    .method public f().i32 {
        a.i32 :=.i32 1.i32;
        b.i32 :=.i32 2.i32;
        c.i32 :=.i32 a.i32 +.i32 b.i32;
        ret.i32 c.i32;
    }
}
"#;

    #[test]
    fn test_minimise_reuses_dead_slots() {
        let mut unit = parse_class_unit(THREE_LOCALS).expect("parse failed");
        let reports = allocate_registers(&mut unit, AllocationMode::Minimise);
        assert!(reports.is_empty());
        let f = &unit.methods[1];
        // a and b overlap; c only begins once both die
        assert_ne!(f.registers["a"], f.registers["b"]);
        assert!(f.registers.values().all(|&r| r >= 1));
    }

    #[test]
    fn test_ceiling_met() {
        let mut unit = parse_class_unit(THREE_LOCALS).expect("parse failed");
        let reports = allocate_registers(&mut unit, AllocationMode::Ceiling(2));
        assert!(reports.is_empty(), "unexpected: {:?}", reports);
    }

    #[test]
    fn test_ceiling_violated_names_minimum() {
        // a, b and c all live across the return: a 3-clique
        let src = r#"
A extends Object {
    .construct A().V {
        invokespecial(this, "<init>").V;
    }
    .method public f().i32 {
        a.i32 :=.i32 1.i32;
        b.i32 :=.i32 2.i32;
        c.i32 :=.i32 3.i32;
        t1.i32 :=.i32 a.i32 +.i32 b.i32;
        t2.i32 :=.i32 t1.i32 +.i32 c.i32;
        t3.i32 :=.i32 t2.i32 +.i32 a.i32;
        ret.i32 t3.i32;
    }
}
"#;
        let mut unit = parse_class_unit(src).expect("parse failed");
        let reports = allocate_registers(&mut unit, AllocationMode::Ceiling(2));
        assert_eq!(reports.len(), 1);
        assert!(
            reports[0].message.starts_with("Need at least"),
            "got: {}",
            reports[0].message
        );
    }

    #[test]
    fn test_disabled_keeps_sequential_layout() {
        let mut unit = parse_class_unit(THREE_LOCALS).expect("parse failed");
        let before = unit.methods[1].registers.clone();
        let reports = allocate_registers(&mut unit, AllocationMode::Disabled);
        assert!(reports.is_empty());
        assert_eq!(unit.methods[1].registers, before);
    }

    #[test]
    fn test_shared_registers_never_simultaneously_live() {
        let mut unit = parse_class_unit(THREE_LOCALS).expect("parse failed");
        allocate_registers(&mut unit, AllocationMode::Minimise);
        let f = &unit.methods[1];
        let live = liveness::analyse(f);
        for i in 0..f.instructions.len() {
            let alive: Vec<&String> = live.live_out[i]
                .iter()
                .filter(|name| f.registers.contains_key(*name))
                .collect();
            for (x_idx, x) in alive.iter().enumerate() {
                for y in alive.iter().skip(x_idx + 1) {
                    assert_ne!(
                        f.registers[*x], f.registers[*y],
                        "{} and {} share a register while both live",
                        x, y
                    );
                }
            }
        }
    }
}

