//! Race detection over the lexical statement tree.
//!
//! Purely syntactic and non-flow-sensitive: the shared set deliberately
//! over-approximates (any write target anywhere counts), and protection is
//! judged by lexical enclosure in lock/atomic regions only. False positives
//! and negatives inherent to the heuristic are part of its contract.

use crate::language::ast::{Program, Statement};
use crate::language::span::Span;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Clone, Debug, Error)]
#[error("possible race: write to shared `{name}` outside lock/atomic")]
pub struct RaceWarning {
    pub name: String,
    pub span: Span,
}

/// Every top-level declared variable, plus every name that is ever a write
/// target (assignment or receive) anywhere in the program.
pub fn shared_variables(program: &Program) -> BTreeSet<String> {
    let mut shared = BTreeSet::new();
    for statement in &program.statements {
        if let Statement::VarDecl { name, .. } = statement {
            shared.insert(name.clone());
        }
    }
    collect_write_targets(&program.statements, &mut shared);
    shared
}

fn collect_write_targets(statements: &[Statement], shared: &mut BTreeSet<String>) {
    for statement in statements {
        match statement {
            Statement::Assign { target, .. } => {
                shared.insert(target.clone());
            }
            Statement::Recv { target, .. } => {
                shared.insert(target.clone());
            }
            Statement::Parallel { body, .. } | Statement::Atomic { body, .. } => {
                collect_write_targets(body, shared);
            }
            _ => {}
        }
    }
}

pub fn unprotected_writes(program: &Program) -> Vec<RaceWarning> {
    let shared = shared_variables(program);
    let mut warnings = Vec::new();
    walk(&program.statements, &shared, false, false, &mut warnings);
    warnings
}

fn walk(
    statements: &[Statement],
    shared: &BTreeSet<String>,
    mut locked: bool,
    in_atomic: bool,
    warnings: &mut Vec<RaceWarning>,
) {
    for statement in statements {
        match statement {
            Statement::Lock { .. } => locked = true,
            Statement::Unlock { .. } => locked = false,
            Statement::Atomic { body, .. } => {
                // an atomic body is fully protected
                walk(body, shared, true, true, warnings);
            }
            Statement::Parallel { body, .. } => {
                // a new worker starts with no inherited protection
                walk(body, shared, false, false, warnings);
            }
            Statement::Assign { target, .. } => {
                if shared.contains(target) && !(locked || in_atomic) {
                    warnings.push(RaceWarning {
                        name: target.clone(),
                        span: statement.span(),
                    });
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::parser::parse_source;

    #[test]
    fn shared_set_over_approximates() {
        let source = "\
int x = 0;
parallel {
  y = 1;
  z = recv(c);
}
";
        let program = parse_source(source).unwrap();
        let shared = shared_variables(&program);
        assert_eq!(
            shared,
            BTreeSet::from(["x".to_string(), "y".to_string(), "z".to_string()])
        );
    }

    #[test]
    fn unprotected_write_warns_exactly_once_per_write() {
        let source = "\
int x = 0;
parallel {
  x = 1;
  x = 2;
}
";
        let program = parse_source(source).unwrap();
        let warnings = unprotected_writes(&program);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.name == "x"));
    }

    #[test]
    fn atomic_block_suppresses_warnings() {
        let source = "\
int x = 0;
parallel {
  atomic {
    x = 1;
  }
}
";
        let program = parse_source(source).unwrap();
        assert!(unprotected_writes(&program).is_empty());
    }

    #[test]
    fn lock_protects_until_unlock() {
        let source = "\
int x = 0;
parallel {
  lock(m);
  x = 1;
  unlock(m);
  x = 2;
}
";
        let program = parse_source(source).unwrap();
        let warnings = unprotected_writes(&program);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn parallel_body_resets_protection() {
        // the lock is held by the spawning context, not the new workers
        let source = "\
int x = 0;
lock(m);
parallel {
  x = 1;
}
unlock(m);
";
        let program = parse_source(source).unwrap();
        let warnings = unprotected_writes(&program);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].name, "x");
    }

    #[test]
    fn declarations_are_not_writes() {
        let program = parse_source("int x = 42;").unwrap();
        assert!(unprotected_writes(&program).is_empty());
    }
}
