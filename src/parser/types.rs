//! Type grammar (spec §4.2.5, §6: "Array declaration is `[size]Type`,
//! slice is `[]Type`, pointer is `*const T` or `*mut T`").

use super::Parser;
use crate::ast::{Node, NodeKind};
use crate::token::TokenKind;

fn base_type_name(kind: &TokenKind) -> Option<&'static str> {
    use TokenKind::*;
    Some(match kind {
        TyInt => "int",
        TyFloat => "float",
        TyBool => "bool",
        TyString => "string",
        TyVoid => "void",
        TyUsize => "usize",
        TyIsize => "isize",
        TyU8 => "u8",
        TyU16 => "u16",
        TyU32 => "u32",
        TyU64 => "u64",
        TyI8 => "i8",
        TyI16 => "i16",
        TyI32 => "i32",
        TyI64 => "i64",
        TyU128 => "u128",
        TyI128 => "i128",
        TyF32 => "f32",
        TyF64 => "f64",
        TyNever => "Never",
        _ => return None,
    })
}

impl<'src> Parser<'src> {
    pub(super) fn parse_type(&mut self) -> Result<Node, ()> {
        let loc = self.loc();
        if let Some(name) = base_type_name(self.peek_kind()) {
            self.advance();
            return Ok(Node::new(NodeKind::BaseType(name.to_string()), loc));
        }
        match self.peek_kind().clone() {
            TokenKind::TyNone => {
                self.fatal("none-misuse", "'none' is only valid as a structural absence marker, not a type");
                Err(())
            }
            TokenKind::LBracket => {
                self.advance();
                if self.at(&TokenKind::RBracket) {
                    self.advance();
                    let element = self.parse_type()?;
                    Ok(Node::new(NodeKind::SliceType { element: element.boxed() }, loc))
                } else {
                    let size = self.parse_expr(0)?;
                    let size_loc = size.location.clone();
                    self.expect(TokenKind::RBracket, "']'", "expected-rbracket")?;
                    let element = self.parse_type()?;
                    Ok(Node::new(
                        NodeKind::ArrayType {
                            size: Node::new(NodeKind::ConstExpr { inner: size.boxed() }, size_loc).boxed(),
                            element: element.boxed(),
                        },
                        loc,
                    ))
                }
            }
            TokenKind::Star => {
                self.advance();
                let mutable = match self.peek_kind().clone() {
                    TokenKind::Const => {
                        self.advance();
                        false
                    }
                    TokenKind::Mut => {
                        self.advance();
                        true
                    }
                    other => {
                        self.fatal("expected-pointer-qualifier", format!("expected 'const' or 'mut' after '*', found {other:?}"));
                        return Err(());
                    }
                };
                let pointee = self.parse_type()?;
                Ok(Node::new(NodeKind::PtrType { mutable, pointee: pointee.boxed() }, loc))
            }
            TokenKind::LParen => {
                self.advance();
                let mut elements = Vec::new();
                if !self.at(&TokenKind::RParen) {
                    loop {
                        elements.push(self.parse_type()?);
                        if self.at(&TokenKind::Comma) {
                            self.advance();
                            continue;
                        }
                        break;
                    }
                }
                self.expect(TokenKind::RParen, "')'", "expected-rparen")?;
                match elements.len() {
                    0 => {
                        self.fatal("empty-tuple-type", "an empty tuple type has no valid spelling; use 'void'");
                        Err(())
                    }
                    1 => Ok(elements.into_iter().next().unwrap()),
                    _ => Ok(Node::new(NodeKind::TupleType { elements }, loc)),
                }
            }
            TokenKind::TyResult => {
                self.advance();
                self.expect(TokenKind::Lt, "'<'", "expected-lt")?;
                let ok = self.parse_type()?;
                self.expect(TokenKind::Comma, "','", "expected-comma")?;
                let err = self.parse_type()?;
                self.expect(TokenKind::Gt, "'>'", "expected-gt")?;
                Ok(Node::new(NodeKind::ResultType { ok: ok.boxed(), err: err.boxed() }, loc))
            }
            TokenKind::TyOption => {
                self.advance();
                self.expect(TokenKind::Lt, "'<'", "expected-lt")?;
                let value = self.parse_type()?;
                self.expect(TokenKind::Gt, "'>'", "expected-gt")?;
                Ok(Node::new(NodeKind::OptionType { value: value.boxed() }, loc))
            }
            TokenKind::TyTaskHandle => {
                self.advance();
                self.expect(TokenKind::Lt, "'<'", "expected-lt")?;
                let value = self.parse_type()?;
                self.expect(TokenKind::Gt, "'>'", "expected-gt")?;
                Ok(Node::new(NodeKind::TaskHandleType { value: value.boxed() }, loc))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                let type_args = self.parse_optional_type_arg_list()?;
                Ok(Node::new(NodeKind::StructType { name, type_args }, loc))
            }
            other => {
                self.fatal("expected-type", format!("expected a type, found {other:?}"));
                Err(())
            }
        }
    }

    /// Type-argument lists in *type* position are unambiguous (unlike
    /// the expression-position case in `expr.rs`), so no backtracking
    /// checkpoint is needed here: `<` always starts a type-arg list.
    fn parse_optional_type_arg_list(&mut self) -> Result<Vec<Node>, ()> {
        if !self.at(&TokenKind::Lt) {
            return Ok(Vec::new());
        }
        self.advance();
        let mut args = Vec::new();
        loop {
            args.push(self.parse_type()?);
            if self.at(&TokenKind::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        self.expect(TokenKind::Gt, "'>'", "expected-gt")?;
        Ok(args)
    }

    pub(super) fn parse_type_params(&mut self) -> Result<Vec<String>, ()> {
        if !self.at(&TokenKind::Lt) {
            return Ok(Vec::new());
        }
        self.advance();
        let mut names = Vec::new();
        loop {
            names.push(self.expect_identifier("a type parameter name")?);
            if self.at(&TokenKind::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        self.expect(TokenKind::Gt, "'>'", "expected-gt")?;
        Ok(names)
    }
}
