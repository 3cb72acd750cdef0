use crate::language::ast::{Program, Statement, TypeName};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Channel,
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub ty: TypeName,
    pub shared: bool,
}

/// Scoped mapping from declared names to declaration metadata. Declaration
/// writes to the innermost scope (last write wins, no shadowing checks);
/// lookup searches innermost to outermost and returns `None` when absent —
/// callers decide whether that is an error.
pub struct SymbolTable {
    scopes: Vec<HashMap<String, Symbol>>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
        if self.scopes.is_empty() {
            self.scopes.push(HashMap::new());
        }
    }

    pub fn declare(&mut self, name: &str, symbol: Symbol) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), symbol);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        for scope in self.scopes.iter().rev() {
            if let Some(symbol) = scope.get(name) {
                return Some(symbol);
            }
        }
        None
    }

    /// Names declared in the outermost scope, sorted for stable output.
    pub fn top_level_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.scopes[0].keys().cloned().collect();
        names.sort();
        names
    }
}

/// Collect declarations into a scoped table. Block bodies are walked under
/// a pushed scope; the analysis never mutates the AST and produces nothing
/// beyond the returned table.
pub fn analyze(program: &Program) -> SymbolTable {
    let mut table = SymbolTable::new();
    collect(&program.statements, &mut table);
    table
}

fn collect(statements: &[Statement], table: &mut SymbolTable) {
    for statement in statements {
        match statement {
            Statement::VarDecl {
                name, ty, shared, ..
            } => table.declare(
                name,
                Symbol {
                    kind: SymbolKind::Variable,
                    ty: *ty,
                    shared: *shared,
                },
            ),
            Statement::ChannelDecl { name, ty, .. } => table.declare(
                name,
                Symbol {
                    kind: SymbolKind::Channel,
                    ty: *ty,
                    shared: false,
                },
            ),
            Statement::Parallel { body, .. } | Statement::Atomic { body, .. } => {
                table.push_scope();
                collect(body, table);
                table.pop_scope();
            }
            _ => {}
        }
    }
}
