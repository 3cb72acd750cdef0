//! Deadlock prediction over the lock-order graph.
//!
//! The graph is built from textual nesting only: acquiring `L` while a set
//! of locks is already held adds one edge per held lock. This does not
//! model interleavings across separately spawned workers — a known,
//! intentional limitation of the heuristic.

use crate::language::ast::{Program, Statement};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;

/// Directed graph over lock names; an edge A -> B means some syntactic path
/// acquires B while already holding A.
pub type LockGraph = BTreeMap<String, BTreeSet<String>>;

#[derive(Clone, Debug, Error)]
#[error("deadlock possible: lock acquisition order contains a cycle")]
pub struct DeadlockWarning {
    pub graph: LockGraph,
}

pub fn check(program: &Program) -> Vec<DeadlockWarning> {
    let graph = build_lock_graph(program);
    if has_cycle(&graph) {
        vec![DeadlockWarning { graph }]
    } else {
        Vec::new()
    }
}

pub fn build_lock_graph(program: &Program) -> LockGraph {
    let mut edges = LockGraph::new();
    scan_block(&program.statements, &[], &mut edges);
    edges
}

fn scan_block(statements: &[Statement], held: &[String], edges: &mut LockGraph) {
    let mut i = 0;
    while i < statements.len() {
        match &statements[i] {
            Statement::Lock { name, .. } => {
                for holder in held {
                    edges.entry(holder.clone()).or_default().insert(name.clone());
                }

                // The lock's region runs until the first matching unlock,
                // or to the end of the sequence if none is found.
                let mut j = i + 1;
                while j < statements.len() {
                    if let Statement::Unlock { name: released, .. } = &statements[j] {
                        if released == name {
                            break;
                        }
                    }
                    j += 1;
                }

                let mut inner_held = held.to_vec();
                inner_held.push(name.clone());
                scan_block(&statements[i + 1..j], &inner_held, edges);
                i = j + 1;
            }
            Statement::Parallel { body, .. } | Statement::Atomic { body, .. } => {
                scan_block(body, held, edges);
                i += 1;
            }
            _ => i += 1,
        }
    }
}

/// Three-color depth-first cycle detection.
pub fn has_cycle(graph: &LockGraph) -> bool {
    #[derive(Clone, Copy, PartialEq)]
    enum Color {
        Gray,
        Black,
    }

    fn visit(node: &str, graph: &LockGraph, colors: &mut HashMap<String, Color>) -> bool {
        match colors.get(node) {
            Some(Color::Gray) => return true,
            Some(Color::Black) => return false,
            None => {}
        }
        colors.insert(node.to_string(), Color::Gray);
        if let Some(successors) = graph.get(node) {
            for next in successors {
                if visit(next, graph, colors) {
                    return true;
                }
            }
        }
        colors.insert(node.to_string(), Color::Black);
        false
    }

    let mut colors = HashMap::new();
    for node in graph.keys() {
        if !colors.contains_key(node.as_str()) && visit(node, graph, &mut colors) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::parser::parse_source;

    #[test]
    fn opposite_nesting_orders_form_a_cycle() {
        let source = "\
lock(a);
lock(b);
unlock(b);
unlock(a);
lock(b);
lock(a);
unlock(a);
unlock(b);
";
        let program = parse_source(source).unwrap();
        let graph = build_lock_graph(&program);

        assert!(graph["a"].contains("b"));
        assert!(graph["b"].contains("a"));
        assert!(has_cycle(&graph));
        assert_eq!(check(&program).len(), 1);
    }

    #[test]
    fn consistent_order_is_acyclic() {
        let source = "\
lock(a);
lock(b);
unlock(b);
unlock(a);
lock(a);
lock(b);
unlock(b);
unlock(a);
";
        let program = parse_source(source).unwrap();
        let graph = build_lock_graph(&program);

        assert_eq!(graph["a"], BTreeSet::from(["b".to_string()]));
        assert!(!graph.contains_key("b"));
        assert!(!has_cycle(&graph));
        assert!(check(&program).is_empty());
    }

    #[test]
    fn scans_through_parallel_and_atomic_blocks() {
        let source = "\
lock(a);
parallel {
  lock(b);
  unlock(b);
}
unlock(a);
atomic {
  lock(b);
  lock(a);
  unlock(a);
  unlock(b);
}
";
        let program = parse_source(source).unwrap();
        let graph = build_lock_graph(&program);

        assert!(graph["a"].contains("b"));
        assert!(graph["b"].contains("a"));
        assert!(has_cycle(&graph));
    }

    #[test]
    fn unmatched_unlock_extends_region_to_end() {
        // no unlock(a): everything after lock(a) is scanned while holding a
        let source = "lock(a);\nlock(b);\nunlock(b);\n";
        let program = parse_source(source).unwrap();
        let graph = build_lock_graph(&program);
        assert!(graph["a"].contains("b"));
    }

    #[test]
    fn no_locks_means_no_edges() {
        let program = parse_source("int x = 1;\nx = 2;\n").unwrap();
        assert!(build_lock_graph(&program).is_empty());
    }
}
