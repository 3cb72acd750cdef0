use crate::language::span::Span;
use serde::Serialize;

/// Ordered sequence of top-level statements; the unit of execution and
/// analysis. Serialized as a generic tag + fields object per node, with
/// the tag in a `"node"` field.
#[derive(Clone, Debug, Serialize)]
pub struct Program {
    pub statements: Vec<Statement>,
}

/// The single primitive numeric type. `bool` is reserved in the lexer but
/// not yet accepted in type position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeName {
    Int,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "node")]
pub enum Statement {
    VarDecl {
        name: String,
        ty: TypeName,
        init: Option<Expr>,
        shared: bool,
        #[serde(skip)]
        span: Span,
    },
    ChannelDecl {
        name: String,
        ty: TypeName,
        #[serde(skip)]
        span: Span,
    },
    /// Each immediate child statement runs concurrently as its own worker.
    /// There is no implicit join at the end of the block.
    Parallel {
        body: Vec<Statement>,
        #[serde(skip)]
        span: Span,
    },
    Spawn {
        expr: Expr,
        #[serde(skip)]
        span: Span,
    },
    Lock {
        name: String,
        #[serde(skip)]
        span: Span,
    },
    Unlock {
        name: String,
        #[serde(skip)]
        span: Span,
    },
    /// Body executes sequentially under the process-wide atomic exclusion,
    /// which is independent of named locks.
    Atomic {
        body: Vec<Statement>,
        #[serde(skip)]
        span: Span,
    },
    Send {
        chan: String,
        value: Expr,
        #[serde(skip)]
        span: Span,
    },
    Recv {
        target: String,
        chan: String,
        #[serde(skip)]
        span: Span,
    },
    Assign {
        target: String,
        value: Expr,
        #[serde(skip)]
        span: Span,
    },
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::VarDecl { span, .. }
            | Statement::ChannelDecl { span, .. }
            | Statement::Parallel { span, .. }
            | Statement::Spawn { span, .. }
            | Statement::Lock { span, .. }
            | Statement::Unlock { span, .. }
            | Statement::Atomic { span, .. }
            | Statement::Send { span, .. }
            | Statement::Recv { span, .. }
            | Statement::Assign { span, .. } => *span,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "node")]
pub enum Expr {
    Literal { value: i64 },
    Identifier { name: String },
}
