use crate::language::ast::{Expr, Program, Statement};
use crate::runtime::{
    channel::Channel,
    environment::Globals,
    error::{RuntimeError, RuntimeResult},
    sync::{LockTable, ReentrantLock},
    value::Value,
    worker::WorkerRegistry,
};
use std::sync::Arc;
use std::time::Duration;

/// Tree-walking evaluator executing the AST over real OS threads.
///
/// All state is `Arc`-backed, so cloning produces another handle onto the
/// same run: the global environment, the named-lock table, the process-wide
/// atomic exclusion, and the worker registry are shared by every worker.
///
/// Error handling is asymmetric on purpose: a failure on the main execution
/// path is fatal to the run, while a failure inside a spawned worker is
/// caught, logged, and recorded in the registry — the run completes as if
/// that worker succeeded.
#[derive(Clone, Default)]
pub struct Interpreter {
    globals: Globals,
    locks: LockTable,
    atomic: Arc<ReentrantLock>,
    workers: WorkerRegistry,
    recv_timeout: Option<Duration>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a deadline to every blocking receive. Without one, receives
    /// block until a value arrives.
    pub fn with_recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = Some(timeout);
        self
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    pub fn workers(&self) -> &WorkerRegistry {
        &self.workers
    }

    /// Execute the top-level statement sequence, then block until every
    /// worker ever spawned (transitively) has terminated. The final join is
    /// the only synchronization barrier; it has no timeout.
    pub fn run(&self, program: &Program) -> RuntimeResult<()> {
        for statement in &program.statements {
            self.exec_statement(statement)?;
        }
        self.workers.join_all();
        Ok(())
    }

    pub fn exec_statement(&self, statement: &Statement) -> RuntimeResult<()> {
        match statement {
            Statement::VarDecl { name, init, .. } => {
                let value = match init {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Int(0),
                };
                self.globals.set(name, value);
                Ok(())
            }
            Statement::ChannelDecl { name, .. } => {
                // element type is erased at runtime; channels are unbounded
                self.globals.set(name, Value::Chan(Channel::unbounded(name)));
                Ok(())
            }
            Statement::Assign { target, value, .. } => {
                let value = self.eval_expr(value)?;
                self.globals.set(target, value);
                Ok(())
            }
            Statement::Send { chan, value, .. } => {
                let channel = self.globals.channel(chan)?;
                let value = self.eval_expr(value)?;
                channel.send(value)
            }
            Statement::Recv { target, chan, .. } => {
                let channel = self.globals.channel(chan)?;
                let value = channel.recv(self.recv_timeout)?;
                self.globals.set(target, value);
                Ok(())
            }
            Statement::Parallel { body, .. } => {
                // one worker per immediate child; no join at block end
                for child in body {
                    let interpreter = self.clone();
                    let statement = child.clone();
                    self.workers
                        .spawn(move || interpreter.exec_statement(&statement));
                }
                Ok(())
            }
            Statement::Spawn { expr, .. } => {
                let interpreter = self.clone();
                let expr = expr.clone();
                self.workers
                    .spawn(move || interpreter.eval_expr(&expr).map(|_| ()));
                Ok(())
            }
            Statement::Lock { name, .. } => {
                self.locks.get(name).acquire();
                Ok(())
            }
            Statement::Unlock { name, .. } => {
                if self.locks.get(name).release() {
                    Ok(())
                } else {
                    Err(RuntimeError::UnlockWithoutOwnership {
                        name: name.clone(),
                    })
                }
            }
            Statement::Atomic { body, .. } => {
                self.atomic.acquire();
                let result = body
                    .iter()
                    .try_for_each(|statement| self.exec_statement(statement));
                // released on every exit path; inner failures propagate after
                self.atomic.release();
                result
            }
        }
    }

    fn eval_expr(&self, expr: &Expr) -> RuntimeResult<Value> {
        match expr {
            Expr::Literal { value } => Ok(Value::Int(*value)),
            Expr::Identifier { name } => Ok(self.globals.read_or_zero(name)),
        }
    }
}
