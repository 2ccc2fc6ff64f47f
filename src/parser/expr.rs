//! Expression grammar: Pratt-style precedence climbing (spec §4.2.5).
//!
//! The twelve-level table in the spec is encoded as `binary_precedence`
//! (levels 1-10, binary, left-assoc), `parse_unary` (level 11, prefix,
//! right-assoc), and `parse_postfix` (level 12, left-assoc).

use super::{Parser, ParserCheckpoint};
use crate::ast::{ArrayLiteralKind, BinaryOp, FieldInit, Node, NodeKind, UnaryOp};
use crate::source::SourceLocation;
use crate::token::TokenKind;

fn binary_precedence(kind: &TokenKind) -> Option<(u8, BinaryOp)> {
    use BinaryOp::*;
    use TokenKind::*;
    Some(match kind {
        PipePipe => (1, Or),
        AmpAmp => (2, And),
        Pipe => (3, BitOr),
        Caret => (4, BitXor),
        Amp => (5, BitAnd),
        EqEq => (6, Eq),
        BangEq => (6, Ne),
        Lt => (7, BinaryOp::Lt),
        LtEq => (7, Le),
        Gt => (7, BinaryOp::Gt),
        GtEq => (7, Ge),
        LtLt => (8, Shl),
        GtGt => (8, Shr),
        Plus => (9, Add),
        Minus => (9, Sub),
        Star => (10, Mul),
        Slash => (10, Div),
        Percent => (10, Rem),
        _ => return None,
    })
}

/// The type name an expression node names, if it could plausibly
/// prefix `.Variant` or `::assoc_fn` (an identifier, or the generic
/// named-type form produced by [`Parser::try_parse_generic_args`]).
fn type_name_of(node: &Node) -> Option<String> {
    match &node.kind {
        NodeKind::Identifier(name) => Some(name.clone()),
        NodeKind::StructType { name, .. } => Some(name.clone()),
        _ => None,
    }
}

impl<'src> Parser<'src> {
    pub(super) fn parse_expr(&mut self, min_prec: u8) -> Result<Node, ()> {
        let mut lhs = self.parse_unary()?;
        loop {
            let Some((prec, op)) = binary_precedence(self.peek_kind()) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            let loc = lhs.location.clone();
            self.advance();
            let rhs = self.parse_expr(prec + 1)?;
            lhs = Node::new(
                NodeKind::BinaryExpr {
                    op,
                    lhs: lhs.boxed(),
                    rhs: rhs.boxed(),
                },
                loc,
            );
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Node, ()> {
        let loc = self.loc();
        let op = match self.peek_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::BitNot,
            TokenKind::Star => UnaryOp::Deref,
            TokenKind::Amp => UnaryOp::Ref,
            TokenKind::Sizeof => {
                self.advance();
                self.expect(TokenKind::LParen, "'('", "expected-lparen")?;
                let ty = self.parse_type()?;
                self.expect(TokenKind::RParen, "')'", "expected-rparen")?;
                return Ok(Node::new(NodeKind::SizeofExpr { ty: ty.boxed() }, loc));
            }
            TokenKind::Await => {
                self.advance();
                let handle = self.parse_postfix()?;
                return Ok(Node::new(NodeKind::AwaitExpr { handle: handle.boxed() }, loc));
            }
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Node::new(
            NodeKind::UnaryExpr { op, operand: operand.boxed() },
            loc,
        ))
    }

    fn parse_postfix(&mut self) -> Result<Node, ()> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind().clone() {
                TokenKind::LParen => {
                    let loc = expr.location.clone();
                    self.advance();
                    let args = self.parse_call_args()?;
                    self.expect(TokenKind::RParen, "')'", "expected-rparen")?;
                    expr = Node::new(NodeKind::CallExpr { callee: expr.boxed(), args }, loc);
                }
                TokenKind::LBracket => {
                    let loc = expr.location.clone();
                    self.advance();
                    expr = self.parse_index_or_slice(expr, loc)?;
                }
                TokenKind::Dot => {
                    let loc = expr.location.clone();
                    self.advance();
                    expr = self.parse_dot_suffix(expr, loc)?;
                }
                TokenKind::ColonColon => {
                    let loc = expr.location.clone();
                    self.advance();
                    let func_name = self.expect_identifier("an associated function name")?;
                    if !self.at(&TokenKind::LParen) {
                        // `Type::Name` with no call parens: either a
                        // missing argument list, or (more often) enum
                        // variant access mistakenly spelled with '::'
                        // instead of '.' (spec §4.2.5, §6).
                        self.fatal(
                            "invalid-double-colon-usage",
                            "Invalid postfix '::' usage: associated-function calls require '(' ')'; use '.' for enum variants",
                        );
                        return Err(());
                    }
                    self.advance(); // '('
                    let args = self.parse_call_args()?;
                    self.expect(TokenKind::RParen, "')'", "expected-rparen")?;
                    let Some(type_name) = type_name_of(&expr) else {
                        self.fatal("invalid-associated-call", "associated-function calls require a type name before '::'");
                        return Err(());
                    };
                    expr = Node::new(NodeKind::AssociatedFuncCall { type_name, func_name, args }, loc);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Disambiguates `.Variant`, `.len`, `.field`, and `.method(...)`
    /// by the case of the identifier after `.` (spec §4.2.5
    /// "Enum-vs-field disambiguation" — a local heuristic, no
    /// backtracking).
    fn parse_dot_suffix(&mut self, base: Node, loc: SourceLocation) -> Result<Node, ()> {
        let TokenKind::Identifier(name) = self.peek_kind().clone() else {
            self.fatal(
                "expected-identifier-after-dot",
                format!("expected a field or variant name after '.', found {:?}", self.peek_kind()),
            );
            return Err(());
        };
        let starts_uppercase = name.chars().next().map_or(false, |c| c.is_ascii_uppercase());
        if starts_uppercase {
            self.advance();
            let Some(enum_name) = type_name_of(&base) else {
                self.fatal("invalid-enum-construction", "enum construction requires 'EnumName.Variant'");
                return Err(());
            };
            let args = if self.at(&TokenKind::LParen) {
                self.advance();
                let args = self.parse_call_args()?;
                self.expect(TokenKind::RParen, "')'", "expected-rparen")?;
                args
            } else {
                Vec::new()
            };
            return Ok(Node::new(
                NodeKind::EnumVariantExpr { enum_name, variant_name: name, args },
                loc,
            ));
        }
        self.advance();
        if name == "len" {
            return Ok(Node::new(NodeKind::SliceLengthAccess { base: base.boxed() }, loc));
        }
        if self.at(&TokenKind::LParen) {
            // `TypeName.fn_name(...)` is the same capitalization signal as
            // the enum-construction branch above, read off `base` instead
            // of the suffix (spec §4.2.2).
            let base_is_type_name = type_name_of(&base)
                .filter(|n| n.chars().next().is_some_and(|c| c.is_ascii_uppercase()));
            if let Some(type_name) = base_is_type_name {
                self.fatal(
                    "type-dot-call-rejected",
                    format!(
                        "'{type_name}.{name}(...)' is not valid; use '{type_name}::{name}(...)' for associated functions"
                    ),
                );
                return Err(());
            }
            self.advance();
            let args = self.parse_call_args()?;
            self.expect(TokenKind::RParen, "')'", "expected-rparen")?;
            let field = Node::new(NodeKind::FieldAccess { base: base.boxed(), field: name }, loc.clone());
            return Ok(Node::new(NodeKind::CallExpr { callee: field.boxed(), args }, loc));
        }
        Ok(Node::new(NodeKind::FieldAccess { base: base.boxed(), field: name }, loc))
    }

    fn parse_index_or_slice(&mut self, base: Node, loc: SourceLocation) -> Result<Node, ()> {
        self.with_struct_literal_allowed(true, |p| {
            if p.at(&TokenKind::Colon) {
                p.advance();
                if p.at(&TokenKind::RBracket) {
                    p.advance();
                    return Ok(Node::new(NodeKind::SliceExpr { base: base.boxed(), start: None, end: None }, loc));
                }
                let end = p.parse_expr(0)?;
                p.expect(TokenKind::RBracket, "']'", "expected-rbracket")?;
                return Ok(Node::new(
                    NodeKind::SliceExpr { base: base.boxed(), start: None, end: Some(end.boxed()) },
                    loc,
                ));
            }
            let first = p.parse_expr(0)?;
            if p.at(&TokenKind::Colon) {
                p.advance();
                if p.at(&TokenKind::RBracket) {
                    p.advance();
                    return Ok(Node::new(
                        NodeKind::SliceExpr { base: base.boxed(), start: Some(first.boxed()), end: None },
                        loc,
                    ));
                }
                let end = p.parse_expr(0)?;
                p.expect(TokenKind::RBracket, "']'", "expected-rbracket")?;
                return Ok(Node::new(
                    NodeKind::SliceExpr { base: base.boxed(), start: Some(first.boxed()), end: Some(end.boxed()) },
                    loc,
                ));
            }
            p.expect(TokenKind::RBracket, "']'", "expected-rbracket")?;
            Ok(Node::new(NodeKind::IndexAccess { base: base.boxed(), index: first.boxed() }, loc))
        })
    }

    pub(super) fn parse_call_args(&mut self) -> Result<Vec<Node>, ()> {
        self.with_struct_literal_allowed(true, |p| {
            let mut args = Vec::new();
            if p.at(&TokenKind::RParen) {
                return Ok(args);
            }
            loop {
                args.push(p.parse_expr(0)?);
                if p.at(&TokenKind::Comma) {
                    p.advance();
                    continue;
                }
                break;
            }
            Ok(args)
        })
    }

    fn parse_primary(&mut self) -> Result<Node, ()> {
        let loc = self.loc();
        match self.peek_kind().clone() {
            TokenKind::IntegerLiteral(v) => {
                self.advance();
                Ok(Node::new(NodeKind::IntegerLiteral(v), loc))
            }
            TokenKind::FloatLiteral(v) => {
                self.advance();
                Ok(Node::new(NodeKind::FloatLiteral(v), loc))
            }
            TokenKind::StringLiteral(s) => {
                self.advance();
                Ok(Node::new(NodeKind::StringLiteral(s), loc))
            }
            TokenKind::CharLiteral(c) => {
                self.advance();
                Ok(Node::new(NodeKind::CharLiteral(c), loc))
            }
            TokenKind::True => {
                self.advance();
                Ok(Node::new(NodeKind::BoolLiteral(true), loc))
            }
            TokenKind::False => {
                self.advance();
                Ok(Node::new(NodeKind::BoolLiteral(false), loc))
            }
            TokenKind::KwSelf => {
                self.advance();
                Ok(Node::new(NodeKind::Identifier("self".to_string()), loc))
            }
            TokenKind::Unsafe => {
                self.advance();
                let body = self.parse_block()?;
                Ok(Node::new(NodeKind::UnsafeExpr { body: body.boxed() }, loc))
            }
            TokenKind::LBracket => self.parse_array_literal(loc),
            TokenKind::LParen => self.parse_paren_or_tuple(loc),
            TokenKind::Identifier(name) => {
                self.advance();
                self.parse_identifier_or_struct_literal(name, loc)
            }
            TokenKind::TyOption => {
                self.advance();
                self.parse_identifier_or_struct_literal("Option".to_string(), loc)
            }
            TokenKind::TyResult => {
                self.advance();
                self.parse_identifier_or_struct_literal("Result".to_string(), loc)
            }
            TokenKind::TyTaskHandle => {
                self.advance();
                self.parse_identifier_or_struct_literal("TaskHandle".to_string(), loc)
            }
            other => {
                self.fatal("expected-expression", format!("expected an expression, found {other:?}"));
                Err(())
            }
        }
    }

    fn primary_for_type_like_name(&mut self, name: String, loc: SourceLocation) -> Node {
        if self.at(&TokenKind::Lt) {
            if let Some(node) = self.try_parse_generic_args(name.clone(), loc.clone()) {
                return node;
            }
        }
        Node::new(NodeKind::Identifier(name), loc)
    }

    /// A bare identifier, optionally followed by a generic-argument list
    /// and/or a `{ field: value, … }` struct literal body. The struct
    /// literal body is suppressed while parsing an `if`/`match`/`for`
    /// head, where a bare `{` instead opens the following block.
    fn parse_identifier_or_struct_literal(&mut self, name: String, loc: SourceLocation) -> Result<Node, ()> {
        let base = self.primary_for_type_like_name(name, loc.clone());
        if self.struct_literal_allowed && self.at(&TokenKind::LBrace) {
            let Some(type_name) = type_name_of(&base) else {
                return Ok(base);
            };
            return self.parse_struct_literal_fields(type_name, loc);
        }
        Ok(base)
    }

    fn parse_struct_literal_fields(&mut self, type_name: String, loc: SourceLocation) -> Result<Node, ()> {
        self.advance(); // '{'
        let mut fields = Vec::new();
        if !self.at(&TokenKind::RBrace) {
            loop {
                let field_name = self.expect_identifier("a field name")?;
                self.expect(TokenKind::Colon, "':'", "expected-colon")?;
                let value = self.with_struct_literal_allowed(true, |p| p.parse_expr(0))?;
                fields.push(FieldInit { name: field_name, value });
                if self.at(&TokenKind::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RBrace, "'}'", "expected-rbrace")?;
        Ok(Node::new(NodeKind::StructLiteral { type_name, fields }, loc))
    }

    /// The parser's sole backtracking point (spec §4.2.5 "Generic type
    /// ambiguity", §9). On failure the lexer and diagnostics sink are
    /// restored to exactly their pre-attempt state, so the caller's `<`
    /// is free to be reinterpreted as the less-than operator.
    fn try_parse_generic_args(&mut self, name: String, loc: SourceLocation) -> Option<Node> {
        let checkpoint: ParserCheckpoint = self.checkpoint();
        let sink_len = self.sink.len();
        self.advance(); // consume '<'
        let result = self.parse_generic_arg_list();
        match result {
            Ok(type_args) => Some(Node::new(NodeKind::StructType { name, type_args }, loc)),
            Err(()) => {
                self.sink.truncate(sink_len);
                self.restore(checkpoint);
                None
            }
        }
    }

    fn parse_generic_arg_list(&mut self) -> Result<Vec<Node>, ()> {
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

    fn parse_array_literal(&mut self, loc: SourceLocation) -> Result<Node, ()> {
        self.advance(); // '['
        self.with_struct_literal_allowed(true, |p| {
            if p.at(&TokenKind::TyNone) {
                p.advance();
                p.expect(TokenKind::RBracket, "']'", "expected-rbracket")?;
                return Ok(Node::new(NodeKind::ArrayLiteral { kind: ArrayLiteralKind::Empty }, loc));
            }
            if p.at(&TokenKind::RBracket) {
                p.fatal(
                    "empty-array-literal-ambiguous",
                    "bare '[]' is ambiguous here; use '[none]' for an explicit empty array literal",
                );
                return Err(());
            }
            let first = p.parse_expr(0)?;
            if p.at(&TokenKind::Semicolon) {
                p.advance();
                let count = p.parse_expr(0)?;
                p.expect(TokenKind::RBracket, "']'", "expected-rbracket")?;
                let value_loc = first.location.clone();
                let count_loc = count.location.clone();
                return Ok(Node::new(
                    NodeKind::ArrayLiteral {
                        kind: ArrayLiteralKind::Repeated {
                            value: Node::new(NodeKind::ConstExpr { inner: first.boxed() }, value_loc).boxed(),
                            count: Node::new(NodeKind::ConstExpr { inner: count.boxed() }, count_loc).boxed(),
                        },
                    },
                    loc,
                ));
            }
            let mut elements = vec![first];
            while p.at(&TokenKind::Comma) {
                p.advance();
                if p.at(&TokenKind::RBracket) {
                    break;
                }
                elements.push(p.parse_expr(0)?);
            }
            p.expect(TokenKind::RBracket, "']'", "expected-rbracket")?;
            Ok(Node::new(NodeKind::ArrayLiteral { kind: ArrayLiteralKind::Elements(elements) }, loc))
        })
    }

    fn parse_paren_or_tuple(&mut self, loc: SourceLocation) -> Result<Node, ()> {
        self.advance(); // '('
        self.with_struct_literal_allowed(true, |p| {
            if p.at(&TokenKind::RParen) {
                p.advance();
                return Ok(Node::new(NodeKind::UnitLiteral, loc));
            }
            let first = p.parse_expr(0)?;
            if p.at(&TokenKind::Comma) {
                let mut elements = vec![first];
                while p.at(&TokenKind::Comma) {
                    p.advance();
                    if p.at(&TokenKind::RParen) {
                        break;
                    }
                    elements.push(p.parse_expr(0)?);
                }
                p.expect(TokenKind::RParen, "')'", "expected-rparen")?;
                if elements.len() < 2 {
                    p.fatal("tuple-arity-one-rejected", "a parenthesised tuple requires at least two elements");
                    return Err(());
                }
                return Ok(Node::new(NodeKind::TupleLiteral { elements }, loc));
            }
            p.expect(TokenKind::RParen, "')'", "expected-rparen")?;
            Ok(first)
        })
    }
}
