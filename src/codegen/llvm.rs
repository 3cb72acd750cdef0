//! Textual LLVM IR lowering.
//!
//! Explicitly a non-functional stub: parallel blocks and spawns are lowered
//! to helper functions that `@main` calls sequentially, standing in for
//! real parallel codegen. Channel, lock, and atomic operations become calls
//! to declared runtime intrinsics. The output is inspectable IR, not a
//! working compilation pipeline.

use crate::language::ast::{Expr, Program, Statement};
use std::collections::BTreeSet;

const RUNTIME_DECLS: &[&str] = &[
    "declare void @chan_send(i64* %chan, i64 %val)",
    "declare i64 @chan_recv(i64* %chan)",
    "declare void @lock_acquire(i8* %lock)",
    "declare void @lock_release(i8* %lock)",
    "declare void @atomic_enter()",
    "declare void @atomic_exit()",
];

pub fn emit_module(program: &Program) -> String {
    Emitter::default().lower_program(program)
}

#[derive(Default)]
struct Emitter {
    globals: Vec<String>,
    seen_globals: BTreeSet<String>,
    helpers: Vec<String>,
    parallel_count: usize,
    spawn_count: usize,
    tmp_count: usize,
}

// LLVM global identifiers tolerate more, but keep names conservative.
fn llvm_ident(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

impl Emitter {
    fn lower_program(mut self, program: &Program) -> String {
        self.collect_globals(&program.statements);

        let mut body = Vec::new();
        for statement in &program.statements {
            self.lower_statement(statement, &mut body);
        }

        let mut out = String::new();
        out.push_str("; ModuleID = 'concurrent_module'\n");
        out.push_str("source_filename = \"concurrentlang\"\n\n");
        for decl in RUNTIME_DECLS {
            out.push_str(decl);
            out.push('\n');
        }
        out.push('\n');
        for global in &self.globals {
            out.push_str(global);
            out.push('\n');
        }
        out.push('\n');
        out.push_str("define i32 @main() {\nentry:\n");
        for line in &body {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("  ret i32 0\n}\n");
        for helper in &self.helpers {
            out.push('\n');
            out.push_str(helper);
        }
        out
    }

    // Every variable, channel, and lock name becomes a module-level global,
    // including names that are only ever written, never declared.
    fn collect_globals(&mut self, statements: &[Statement]) {
        for statement in statements {
            match statement {
                Statement::VarDecl { name, init, .. } => {
                    self.global_var(name);
                    if let Some(expr) = init {
                        self.global_expr(expr);
                    }
                }
                Statement::ChannelDecl { name, .. } => self.global_channel(name),
                Statement::Assign { target, value, .. } => {
                    self.global_var(target);
                    self.global_expr(value);
                }
                Statement::Recv { target, chan, .. } => {
                    self.global_var(target);
                    self.global_channel(chan);
                }
                Statement::Send { chan, value, .. } => {
                    self.global_channel(chan);
                    self.global_expr(value);
                }
                Statement::Spawn { expr, .. } => self.global_expr(expr),
                Statement::Lock { name, .. } | Statement::Unlock { name, .. } => {
                    self.global_lock(name)
                }
                Statement::Parallel { body, .. } | Statement::Atomic { body, .. } => {
                    self.collect_globals(body)
                }
            }
        }
    }

    fn global_var(&mut self, name: &str) {
        let name = llvm_ident(name);
        if self.seen_globals.insert(name.clone()) {
            self.globals.push(format!("@{name} = global i64 0"));
        }
    }

    fn global_channel(&mut self, name: &str) {
        let name = format!("chan_{}", llvm_ident(name));
        if self.seen_globals.insert(name.clone()) {
            self.globals
                .push(format!("@{name} = global i64* null ; channel placeholder"));
        }
    }

    fn global_lock(&mut self, name: &str) {
        let name = format!("lock_{}", llvm_ident(name));
        if self.seen_globals.insert(name.clone()) {
            self.globals.push(format!("@{name} = global i8 0"));
        }
    }

    fn global_expr(&mut self, expr: &Expr) {
        if let Expr::Identifier { name } = expr {
            self.global_var(name);
        }
    }

    fn lower_statement(&mut self, statement: &Statement, out: &mut Vec<String>) {
        match statement {
            Statement::VarDecl { name, init, .. } => {
                if let Some(expr) = init {
                    let operand = self.operand(expr, out);
                    out.push(format!("store i64 {operand}, i64* @{}", llvm_ident(name)));
                }
            }
            Statement::Assign { target, value, .. } => {
                let operand = self.operand(value, out);
                out.push(format!("store i64 {operand}, i64* @{}", llvm_ident(target)));
            }
            Statement::ChannelDecl { name, .. } => {
                out.push(format!("; channel decl {name}"));
            }
            Statement::Send { chan, value, .. } => {
                let operand = self.operand(value, out);
                out.push(format!(
                    "call void @chan_send(i64* @chan_{}, i64 {operand})",
                    llvm_ident(chan)
                ));
            }
            Statement::Recv { target, chan, .. } => {
                let tmp = self.fresh_tmp();
                out.push(format!(
                    "%{tmp} = call i64 @chan_recv(i64* @chan_{})",
                    llvm_ident(chan)
                ));
                out.push(format!("store i64 %{tmp}, i64* @{}", llvm_ident(target)));
            }
            Statement::Parallel { body, .. } => {
                self.parallel_count += 1;
                let fname = format!("parallel_block_{}", self.parallel_count);
                out.push("; parallel block lowered to a sequential call".to_string());
                out.push(format!("call void @{fname}()"));
                self.emit_helper(&fname, body);
            }
            Statement::Spawn { expr, .. } => {
                self.spawn_count += 1;
                let fname = format!("spawned_fn_{}", self.spawn_count);
                out.push("; spawn lowered to a sequential call".to_string());
                out.push(format!("call void @{fname}()"));

                let mut helper_body = Vec::new();
                let operand = self.operand(expr, &mut helper_body);
                helper_body.push(format!("; spawned expression result {operand} discarded"));
                self.push_helper(&fname, &helper_body);
            }
            Statement::Lock { name, .. } => {
                out.push(format!(
                    "call void @lock_acquire(i8* @lock_{})",
                    llvm_ident(name)
                ));
            }
            Statement::Unlock { name, .. } => {
                out.push(format!(
                    "call void @lock_release(i8* @lock_{})",
                    llvm_ident(name)
                ));
            }
            Statement::Atomic { body, .. } => {
                out.push("call void @atomic_enter()".to_string());
                for inner in body {
                    self.lower_statement(inner, out);
                }
                out.push("call void @atomic_exit()".to_string());
            }
        }
    }

    fn emit_helper(&mut self, fname: &str, body: &[Statement]) {
        let mut lines = Vec::new();
        for statement in body {
            self.lower_statement(statement, &mut lines);
        }
        self.push_helper(fname, &lines);
    }

    fn push_helper(&mut self, fname: &str, lines: &[String]) {
        let mut text = format!("define void @{fname}() {{\nentry:\n");
        for line in lines {
            text.push_str("  ");
            text.push_str(line);
            text.push('\n');
        }
        text.push_str("  ret void\n}\n");
        self.helpers.push(text);
    }

    // Lower an expression to an operand, loading identifiers into a fresh
    // register first.
    fn operand(&mut self, expr: &Expr, out: &mut Vec<String>) -> String {
        match expr {
            Expr::Literal { value } => value.to_string(),
            Expr::Identifier { name } => {
                let tmp = self.fresh_tmp();
                out.push(format!("%{tmp} = load i64, i64* @{}", llvm_ident(name)));
                format!("%{tmp}")
            }
        }
    }

    fn fresh_tmp(&mut self) -> String {
        self.tmp_count += 1;
        format!("t{}", self.tmp_count)
    }
}
