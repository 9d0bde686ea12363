//! Chaitin-style graph colouring
//!
//! Simplify: repeatedly remove a node of degree < k (raising k when
//! stuck) onto a stack. Assign: pop nodes and give each the smallest
//! register at or above the method's first free slot not taken by an
//! already-coloured neighbour of the original graph.

use super::interference::InterferenceGraph;
use std::collections::{HashMap, HashSet};

/// The computed assignment for one method's locals
#[derive(Debug, Clone)]
pub struct Colouring {
    /// Register per variable name
    pub registers: HashMap<String, usize>,
    /// How many distinct registers the locals needed
    pub colours_used: usize,
}

/// Colour the graph; registers start at `first_slot`
pub fn colour(graph: &InterferenceGraph, first_slot: usize) -> Colouring {
    // Working copy of the adjacency that simplification strips down
    let mut degree: HashMap<&str, usize> = graph
        .nodes
        .iter()
        .map(|n| (n.as_str(), graph.degree(n)))
        .collect();
    let mut removed: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = Vec::new();

    let mut k = 1;
    while stack.len() < graph.nodes.len() {
        // First node in appearance order keeps the result deterministic
        let candidate = graph
            .nodes
            .iter()
            .find(|n| !removed.contains(n.as_str()) && degree[n.as_str()] < k);
        match candidate {
            Some(node) => {
                removed.insert(node.as_str());
                stack.push(node.as_str());
                for neighbour in graph.neighbours(node) {
                    if let Some(d) = degree.get_mut(neighbour.as_str()) {
                        *d = d.saturating_sub(1);
                    }
                }
            }
            None => k += 1,
        }
    }

    let mut registers: HashMap<String, usize> = HashMap::new();
    while let Some(node) = stack.pop() {
        let taken: HashSet<usize> = graph
            .neighbours(node)
            .filter_map(|n| registers.get(n.as_str()).copied())
            .collect();
        let mut slot = first_slot;
        while taken.contains(&slot) {
            slot += 1;
        }
        registers.insert(node.to_string(), slot);
    }

    let colours_used = registers
        .values()
        .collect::<HashSet<_>>()
        .len();
    Colouring {
        registers,
        colours_used,
    }
}
