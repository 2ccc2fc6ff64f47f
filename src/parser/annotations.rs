//! `#[name]` / `#[name(arg, …)]` annotation lists (spec §4.2.7).

use super::Parser;
use crate::ast::{Node, NodeKind, TransferAnnotation};
use crate::token::TokenKind;

impl<'src> Parser<'src> {
    /// Zero-or-more annotations preceding a declaration. Unknown names
    /// parse successfully and are preserved verbatim; only semantic
    /// analysis judges whether a given name is meaningful.
    pub(super) fn parse_annotations(&mut self) -> Result<Vec<Node>, ()> {
        let mut out = Vec::new();
        while self.at(&TokenKind::Hash) {
            out.push(self.parse_one_annotation()?);
        }
        Ok(out)
    }

    fn parse_one_annotation(&mut self) -> Result<Node, ()> {
        let loc = self.loc();
        self.advance(); // '#'
        self.expect(TokenKind::LBracket, "'['", "expected-lbracket")?;
        let name = self.expect_identifier("an annotation name")?;
        let mut args = Vec::new();
        if self.at(&TokenKind::LParen) {
            self.advance();
            if !self.at(&TokenKind::RParen) {
                loop {
                    args.push(self.parse_expr(0)?);
                    if self.at(&TokenKind::Comma) {
                        self.advance();
                        continue;
                    }
                    break;
                }
            }
            self.expect(TokenKind::RParen, "')'", "expected-rparen")?;
        }
        self.expect(TokenKind::RBracket, "']'", "expected-rbracket")?;
        Ok(Node::new(NodeKind::Annotation { name, args }, loc))
    }

    /// A single `#[transfer_full|transfer_none|borrowed]` tag in an
    /// extern parameter or return position (spec §4.2.4). Two tags
    /// stacked on the same position is a fatal conflicting-annotation
    /// error, not a list.
    pub(super) fn try_parse_transfer_annotation(&mut self) -> Result<Option<TransferAnnotation>, ()> {
        if !self.at(&TokenKind::Hash) {
            return Ok(None);
        }
        self.advance();
        self.expect(TokenKind::LBracket, "'['", "expected-lbracket")?;
        let name = self.expect_identifier("an ownership transfer annotation")?;
        self.expect(TokenKind::RBracket, "']'", "expected-rbracket")?;
        let transfer = match name.as_str() {
            "transfer_full" => TransferAnnotation::TransferFull,
            "transfer_none" => TransferAnnotation::TransferNone,
            "borrowed" => TransferAnnotation::Borrowed,
            _ => {
                self.constraint_error(
                    "invalid-transfer-annotation",
                    format!("'{name}' is not a recognised ownership transfer annotation"),
                );
                return Err(());
            }
        };
        if self.at(&TokenKind::Hash) {
            self.constraint_error(
                "conflicting-ffi-annotation",
                "only one ownership transfer annotation is permitted per position",
            );
            return Err(());
        }
        Ok(Some(transfer))
    }
}
