use crate::language::{
    ast::{Expr, Program, Statement, TypeName},
    errors::{SyntaxError, SyntaxErrors},
    lexer::lex,
    span::Span,
    token::{Token, TokenKind},
};

pub fn parse_source(source: &str) -> Result<Program, SyntaxErrors> {
    let tokens = match lex(source) {
        Ok(tokens) => tokens,
        Err(errors) => {
            let errs = errors
                .into_iter()
                .map(|err| SyntaxError::new(err.message, err.span))
                .collect();
            return Err(SyntaxErrors::new(errs));
        }
    };
    Parser::new(tokens).parse()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: SyntaxErrors,
    last_span: Span,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: SyntaxErrors::default(),
            last_span: Span::default(),
        }
    }

    fn parse(mut self) -> Result<Program, SyntaxErrors> {
        let mut statements = Vec::new();

        while !self.is_eof() {
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(err) => {
                    self.report(err);
                    self.synchronize(false);
                }
            }
        }

        self.errors.into_result(Program { statements })
    }

    fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        match self.current_kind().clone() {
            TokenKind::Int => self.parse_var_decl(),
            TokenKind::Chan => self.parse_channel_decl(),
            TokenKind::Parallel => {
                let start = self.advance().span;
                let body = self.parse_block()?;
                Ok(Statement::Parallel {
                    body,
                    span: start.to(self.last_span),
                })
            }
            TokenKind::Atomic => {
                let start = self.advance().span;
                let body = self.parse_block()?;
                Ok(Statement::Atomic {
                    body,
                    span: start.to(self.last_span),
                })
            }
            TokenKind::Spawn => {
                let start = self.advance().span;
                self.expect(TokenKind::LParen, "Expected `(` after `spawn`")?;
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "Expected `)` after spawn expression")?;
                self.expect(TokenKind::Semi, "Expected `;` after spawn statement")?;
                Ok(Statement::Spawn {
                    expr,
                    span: start.to(self.last_span),
                })
            }
            TokenKind::Lock => {
                let start = self.advance().span;
                let name = self.parse_parenthesized_name("lock")?;
                Ok(Statement::Lock {
                    name,
                    span: start.to(self.last_span),
                })
            }
            TokenKind::Unlock => {
                let start = self.advance().span;
                let name = self.parse_parenthesized_name("unlock")?;
                Ok(Statement::Unlock {
                    name,
                    span: start.to(self.last_span),
                })
            }
            TokenKind::Send => {
                let start = self.advance().span;
                self.expect(TokenKind::LParen, "Expected `(` after `send`")?;
                let (chan, _) = self.expect_identifier("Expected channel name")?;
                self.expect(TokenKind::Comma, "Expected `,` after channel name")?;
                let value = self.parse_expression()?;
                self.expect(TokenKind::RParen, "Expected `)` after send value")?;
                self.expect(TokenKind::Semi, "Expected `;` after send statement")?;
                Ok(Statement::Send {
                    chan,
                    value,
                    span: start.to(self.last_span),
                })
            }
            TokenKind::Identifier(_) => self.parse_assign_or_recv(),
            _ => Err(self.error_here("Expected statement")),
        }
    }

    // <type> <id> (= <expr>)? ;
    fn parse_var_decl(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.advance().span;
        let (name, _) = self.expect_identifier("Expected variable name")?;
        let init = if self.matches(TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(TokenKind::Semi, "Expected `;` after variable declaration")?;
        Ok(Statement::VarDecl {
            name,
            ty: TypeName::Int,
            init,
            shared: false,
            span: start.to(self.last_span),
        })
    }

    // chan<<type>> <id> ;
    fn parse_channel_decl(&mut self) -> Result<Statement, SyntaxError> {
        let start = self.advance().span;
        self.expect(TokenKind::Lt, "Expected `<` after `chan`")?;
        let ty = self.parse_type()?;
        self.expect(TokenKind::Gt, "Expected `>` after element type")?;
        let (name, _) = self.expect_identifier("Expected channel name")?;
        self.expect(TokenKind::Semi, "Expected `;` after channel declaration")?;
        Ok(Statement::ChannelDecl {
            name,
            ty,
            span: start.to(self.last_span),
        })
    }

    // <id> = recv(<id>); | <id> = <expr>;
    fn parse_assign_or_recv(&mut self) -> Result<Statement, SyntaxError> {
        let (target, target_span) = self.expect_identifier("Expected identifier")?;
        self.expect(TokenKind::Eq, "Expected `=` after identifier")?;

        if self.matches(TokenKind::Recv) {
            self.expect(TokenKind::LParen, "Expected `(` after `recv`")?;
            let (chan, _) = self.expect_identifier("Expected channel name")?;
            self.expect(TokenKind::RParen, "Expected `)` after channel name")?;
            self.expect(TokenKind::Semi, "Expected `;` after receive statement")?;
            return Ok(Statement::Recv {
                target,
                chan,
                span: target_span.to(self.last_span),
            });
        }

        let value = self.parse_expression()?;
        self.expect(TokenKind::Semi, "Expected `;` after assignment")?;
        Ok(Statement::Assign {
            target,
            value,
            span: target_span.to(self.last_span),
        })
    }

    fn parse_block(&mut self) -> Result<Vec<Statement>, SyntaxError> {
        self.expect(TokenKind::LBrace, "Expected `{`")?;
        let mut body = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.is_eof() {
            match self.parse_statement() {
                Ok(statement) => body.push(statement),
                Err(err) => {
                    self.report(err);
                    self.synchronize(true);
                }
            }
        }

        self.expect(TokenKind::RBrace, "Expected `}` to close block")?;
        Ok(body)
    }

    fn parse_parenthesized_name(&mut self, keyword: &str) -> Result<String, SyntaxError> {
        self.expect(TokenKind::LParen, format!("Expected `(` after `{keyword}`"))?;
        let (name, _) = self.expect_identifier("Expected lock name")?;
        self.expect(TokenKind::RParen, "Expected `)` after lock name")?;
        self.expect(
            TokenKind::Semi,
            format!("Expected `;` after {keyword} statement"),
        )?;
        Ok(name)
    }

    fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        match self.current_kind().clone() {
            TokenKind::Integer(value) => {
                self.advance();
                Ok(Expr::Literal { value })
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expr::Identifier { name })
            }
            _ => Err(self.error_here("Expected expression")),
        }
    }

    fn parse_type(&mut self) -> Result<TypeName, SyntaxError> {
        if self.matches(TokenKind::Int) {
            Ok(TypeName::Int)
        } else {
            Err(self
                .error_here("Expected element type")
                .with_help("only `int` is supported"))
        }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn is_eof(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_eof() {
            self.pos += 1;
        }
        self.last_span = token.span;
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        *self.current_kind() == kind
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(
        &mut self,
        kind: TokenKind,
        message: impl Into<String>,
    ) -> Result<Token, SyntaxError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(message))
        }
    }

    fn expect_identifier(
        &mut self,
        message: impl Into<String>,
    ) -> Result<(String, Span), SyntaxError> {
        if let TokenKind::Identifier(name) = self.current_kind().clone() {
            let token = self.advance();
            Ok((name, token.span))
        } else {
            Err(self.error_here(message))
        }
    }

    fn error_here(&self, message: impl Into<String>) -> SyntaxError {
        let current = self.current();
        let message = format!("{}, found {}", message.into(), current.kind.describe());
        SyntaxError::new(message, current.span)
    }

    fn report(&mut self, err: SyntaxError) {
        self.errors.push(err);
    }

    // Skip to just past the next `;`. Inside a block, stop before a `}` so
    // the block can close cleanly; at top level a stray `}` is consumed.
    fn synchronize(&mut self, stop_at_rbrace: bool) {
        while !self.is_eof() {
            if stop_at_rbrace && self.check(TokenKind::RBrace) {
                return;
            }
            if self.matches(TokenKind::Semi) {
                return;
            }
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        parse_source(source).expect("parse failed")
    }

    #[test]
    fn parses_variable_declaration() {
        let program = parse("int x = 42;");
        assert_eq!(program.statements.len(), 1);
        match &program.statements[0] {
            Statement::VarDecl { name, ty, init, .. } => {
                assert_eq!(name, "x");
                assert_eq!(*ty, TypeName::Int);
                assert_eq!(init.as_ref(), Some(&Expr::Literal { value: 42 }));
            }
            other => panic!("expected VarDecl, got {other:?}"),
        }
    }

    #[test]
    fn parses_uninitialized_variable() {
        let program = parse("int x;");
        match &program.statements[0] {
            Statement::VarDecl { init, .. } => assert!(init.is_none()),
            other => panic!("expected VarDecl, got {other:?}"),
        }
    }

    #[test]
    fn parses_channel_declaration() {
        let program = parse("chan<int> c;");
        assert_eq!(program.statements.len(), 1);
        match &program.statements[0] {
            Statement::ChannelDecl { name, ty, .. } => {
                assert_eq!(name, "c");
                assert_eq!(*ty, TypeName::Int);
            }
            other => panic!("expected ChannelDecl, got {other:?}"),
        }
    }

    #[test]
    fn parses_parallel_block() {
        let program = parse("int x = 0;\nparallel {\n  int y = 1;\n}\n");
        assert_eq!(program.statements.len(), 2);
        match &program.statements[1] {
            Statement::Parallel { body, .. } => assert_eq!(body.len(), 1),
            other => panic!("expected Parallel, got {other:?}"),
        }
    }

    #[test]
    fn parses_send_and_receive() {
        let program = parse("chan<int> c;\nint x = 0;\nsend(c, 42);\nx = recv(c);\n");
        assert_eq!(program.statements.len(), 4);
        assert!(matches!(&program.statements[0], Statement::ChannelDecl { .. }));
        assert!(matches!(&program.statements[1], Statement::VarDecl { .. }));
        match &program.statements[2] {
            Statement::Send { chan, value, .. } => {
                assert_eq!(chan, "c");
                assert_eq!(*value, Expr::Literal { value: 42 });
            }
            other => panic!("expected Send, got {other:?}"),
        }
        match &program.statements[3] {
            Statement::Recv { target, chan, .. } => {
                assert_eq!(target, "x");
                assert_eq!(chan, "c");
            }
            other => panic!("expected Recv, got {other:?}"),
        }
    }

    #[test]
    fn parses_atomic_block() {
        let program = parse("atomic {\n  int x = 0;\n}\n");
        assert_eq!(program.statements.len(), 1);
        match &program.statements[0] {
            Statement::Atomic { body, .. } => assert_eq!(body.len(), 1),
            other => panic!("expected Atomic, got {other:?}"),
        }
    }

    #[test]
    fn parses_lock_and_unlock() {
        let program = parse("lock(m);\nunlock(m);\n");
        assert!(matches!(&program.statements[0], Statement::Lock { name, .. } if name == "m"));
        assert!(matches!(&program.statements[1], Statement::Unlock { name, .. } if name == "m"));
    }

    #[test]
    fn parses_spawn_statement() {
        let program = parse("spawn(x);");
        match &program.statements[0] {
            Statement::Spawn { expr, .. } => {
                assert_eq!(*expr, Expr::Identifier { name: "x".into() });
            }
            other => panic!("expected Spawn, got {other:?}"),
        }
    }

    #[test]
    fn statement_spans_cover_the_full_statement_text() {
        let source = "int x = 42;\nparallel {\n  send(c, 1);\n}\n";
        let program = parse(source);

        let decl = program.statements[0].span();
        assert_eq!(&source[decl.start..decl.end], "int x = 42;");

        let block = program.statements[1].span();
        assert_eq!(&source[block.start..block.end], "parallel {\n  send(c, 1);\n}");
    }

    #[test]
    fn recovers_after_malformed_statement() {
        let err = parse_source("int = 1;\nint y = 2;\nsend(;\n").unwrap_err();
        assert_eq!(err.errors.len(), 2);
    }

    #[test]
    fn rejects_non_int_channel_type() {
        let err = parse_source("chan<bool> c;").unwrap_err();
        assert!(err.errors[0].message.contains("Expected element type"));
    }
}
