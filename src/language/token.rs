use crate::language::span::Span;

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    Integer(i64),

    Parallel,
    Spawn,
    Lock,
    Unlock,
    Chan,
    Send,
    Recv,
    Atomic,
    Int,
    Bool,

    Eq,
    Lt,
    Gt,
    Semi,
    Comma,

    LParen,
    RParen,
    LBrace,
    RBrace,

    Eof,
}

impl TokenKind {
    /// Display name used in parser error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Identifier(name) => format!("identifier `{name}`"),
            TokenKind::Integer(value) => format!("integer `{value}`"),
            TokenKind::Parallel => "`parallel`".into(),
            TokenKind::Spawn => "`spawn`".into(),
            TokenKind::Lock => "`lock`".into(),
            TokenKind::Unlock => "`unlock`".into(),
            TokenKind::Chan => "`chan`".into(),
            TokenKind::Send => "`send`".into(),
            TokenKind::Recv => "`recv`".into(),
            TokenKind::Atomic => "`atomic`".into(),
            TokenKind::Int => "`int`".into(),
            TokenKind::Bool => "`bool`".into(),
            TokenKind::Eq => "`=`".into(),
            TokenKind::Lt => "`<`".into(),
            TokenKind::Gt => "`>`".into(),
            TokenKind::Semi => "`;`".into(),
            TokenKind::Comma => "`,`".into(),
            TokenKind::LParen => "`(`".into(),
            TokenKind::RParen => "`)`".into(),
            TokenKind::LBrace => "`{`".into(),
            TokenKind::RBrace => "`}`".into(),
            TokenKind::Eof => "end of input".into(),
        }
    }
}
