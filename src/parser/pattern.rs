//! Pattern grammar (spec §4.2.6 "Patterns").

use super::Parser;
use crate::ast::{Node, NodeKind};
use crate::token::TokenKind;

impl<'src> Parser<'src> {
    pub(super) fn parse_pattern(&mut self) -> Result<Node, ()> {
        let loc = self.loc();
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) if name == "_" => {
                self.advance();
                Ok(Node::new(NodeKind::WildcardPattern, loc))
            }
            TokenKind::IntegerLiteral(v) => {
                self.advance();
                Ok(Node::new(
                    NodeKind::LiteralPattern(Node::new(NodeKind::IntegerLiteral(v), loc.clone()).boxed()),
                    loc,
                ))
            }
            TokenKind::StringLiteral(s) => {
                self.advance();
                Ok(Node::new(
                    NodeKind::LiteralPattern(Node::new(NodeKind::StringLiteral(s), loc.clone()).boxed()),
                    loc,
                ))
            }
            TokenKind::CharLiteral(c) => {
                self.advance();
                Ok(Node::new(
                    NodeKind::LiteralPattern(Node::new(NodeKind::CharLiteral(c), loc.clone()).boxed()),
                    loc,
                ))
            }
            TokenKind::True => {
                self.advance();
                Ok(Node::new(
                    NodeKind::LiteralPattern(Node::new(NodeKind::BoolLiteral(true), loc.clone()).boxed()),
                    loc,
                ))
            }
            TokenKind::False => {
                self.advance();
                Ok(Node::new(
                    NodeKind::LiteralPattern(Node::new(NodeKind::BoolLiteral(false), loc.clone()).boxed()),
                    loc,
                ))
            }
            TokenKind::LParen => {
                self.advance();
                let mut elements = vec![self.parse_pattern()?];
                while self.at(&TokenKind::Comma) {
                    self.advance();
                    if self.at(&TokenKind::RParen) {
                        break;
                    }
                    elements.push(self.parse_pattern()?);
                }
                self.expect(TokenKind::RParen, "')'", "expected-rparen")?;
                if elements.len() < 2 {
                    self.fatal("tuple-pattern-arity-one-rejected", "a tuple pattern requires at least two elements");
                    return Err(());
                }
                Ok(Node::new(NodeKind::TuplePattern(elements), loc))
            }
            TokenKind::ColonColon => {
                self.fatal("double-colon-in-pattern", "'::' cannot be used in a pattern; use '.' for enum variants");
                Err(())
            }
            TokenKind::Identifier(name) => {
                self.advance();
                if self.at(&TokenKind::LBrace) {
                    return self.parse_struct_pattern(name, loc);
                }
                if self.at(&TokenKind::Dot) {
                    return self.parse_enum_pattern(name, loc);
                }
                Ok(Node::new(NodeKind::IdentifierPattern(name), loc))
            }
            other => {
                self.fatal("expected-pattern", format!("expected a pattern, found {other:?}"));
                Err(())
            }
        }
    }

    fn parse_struct_pattern(&mut self, name: String, loc: crate::source::SourceLocation) -> Result<Node, ()> {
        self.advance(); // '{'
        let mut fields = Vec::new();
        if !self.at(&TokenKind::RBrace) {
            loop {
                let field_loc = self.loc();
                let field_name = self.expect_identifier("a field name")?;
                self.expect(TokenKind::Colon, "':'", "expected-colon")?;
                let pattern = self.parse_pattern()?;
                fields.push(Node::new(
                    NodeKind::FieldPattern { name: field_name, pattern: pattern.boxed() },
                    field_loc,
                ));
                if self.at(&TokenKind::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RBrace, "'}'", "expected-rbrace")?;
        Ok(Node::new(NodeKind::StructPattern { name, fields }, loc))
    }

    fn parse_enum_pattern(&mut self, enum_name: String, loc: crate::source::SourceLocation) -> Result<Node, ()> {
        self.advance(); // '.'
        let variant = self.expect_identifier("a variant name")?;
        let args = if self.at(&TokenKind::LParen) {
            self.advance();
            let mut args = Vec::new();
            if !self.at(&TokenKind::RParen) {
                loop {
                    args.push(self.parse_pattern()?);
                    if self.at(&TokenKind::Comma) {
                        self.advance();
                        continue;
                    }
                    break;
                }
            }
            self.expect(TokenKind::RParen, "')'", "expected-rparen")?;
            args
        } else {
            Vec::new()
        };
        if self.at(&TokenKind::ColonColon) {
            self.fatal("double-colon-in-pattern", "'::' cannot be used in a pattern; use '.' for enum variants");
            return Err(());
        }
        Ok(Node::new(NodeKind::EnumPattern { enum_name, variant, args }, loc))
    }
}
