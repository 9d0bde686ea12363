//! Interference graph construction
//!
//! One node per allocatable variable (everything in the method's var
//! list: locals and temporaries, never parameters or the receiver).
//! For each instruction, all pairs drawn from `def ∪ live-out` conflict.

use super::liveness::Liveness;
use crate::ir::Method;
use std::collections::{HashMap, HashSet};

/// Undirected conflict graph over allocatable variable names
#[derive(Debug, Clone)]
pub struct InterferenceGraph {
    /// Node names in first-appearance order (drives deterministic
    /// colouring)
    pub nodes: Vec<String>,
    pub edges: HashMap<String, HashSet<String>>,
}

impl InterferenceGraph {
    pub fn degree(&self, node: &str) -> usize {
        self.edges.get(node).map(|e| e.len()).unwrap_or(0)
    }

    pub fn neighbours(&self, node: &str) -> impl Iterator<Item = &String> {
        self.edges.get(node).into_iter().flatten()
    }
}

/// Build the interference graph from the liveness solution
pub fn build(method: &Method, liveness: &Liveness) -> InterferenceGraph {
    let nodes: Vec<String> = method.vars.iter().map(|v| v.name.clone()).collect();
    let node_set: HashSet<&String> = nodes.iter().collect();
    let mut edges: HashMap<String, HashSet<String>> = nodes
        .iter()
        .map(|name| (name.clone(), HashSet::new()))
        .collect();

    for i in 0..method.instructions.len() {
        let mut alive: Vec<&String> = liveness.defs[i]
            .union(&liveness.live_out[i])
            .filter(|name| node_set.contains(name))
            .collect();
        alive.sort();
        for (a_idx, a) in alive.iter().enumerate() {
            for b in alive.iter().skip(a_idx + 1) {
                if let Some(set) = edges.get_mut(a.as_str()) {
                    set.insert((*b).clone());
                }
                if let Some(set) = edges.get_mut(b.as_str()) {
                    set.insert((*a).clone());
                }
            }
        }
    }

    InterferenceGraph { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::super::liveness;
    use super::*;
    use crate::ir::parse_class_unit;

    fn graph(src: &str) -> InterferenceGraph {
        let unit = parse_class_unit(src).expect("parse failed");
        let method = &unit.methods[1];
        let live = liveness::analyse(method);
        build(method, &live)
    }

    #[test]
    fn test_overlapping_lifetimes_interfere() {
        let g = graph(
            r#"
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
"#,
        );
        assert_eq!(g.nodes, ["a", "b", "c"]);
        assert!(g.edges["a"].contains("b"));
        assert!(g.edges["b"].contains("a"));
    }

    #[test]
    fn test_disjoint_lifetimes_do_not_interfere() {
        let g = graph(
            r#"
A extends Object {
    .construct A().V {
        invokespecial(this, "<init>").V;
    }
    .method public f().i32 {
        a.i32 :=.i32 1.i32;
        b.i32 :=.i32 a.i32 +.i32 1.i32;
        c.i32 :=.i32 b.i32 +.i32 1.i32;
        ret.i32 c.i32;
    }
}
"#,
        );
        // a dies feeding b; they never coexist
        assert!(!g.edges["a"].contains("c"));
    }

    #[test]
    fn test_parameters_are_not_nodes() {
        let g = graph(
            r#"
A extends Object {
    .construct A().V {
        invokespecial(this, "<init>").V;
    }
    .method public f(n.i32).i32 {
        x.i32 :=.i32 n.i32 +.i32 1.i32;
        ret.i32 x.i32;
    }
}
"#,
        );
        assert_eq!(g.nodes, ["x"]);
    }
}
