//! Statement and control-flow grammar (spec §4.2.6).

use super::Parser;
use crate::ast::{Node, NodeKind};
use crate::token::TokenKind;

impl<'src> Parser<'src> {
    pub(super) fn parse_block(&mut self) -> Result<Node, ()> {
        let loc = self.loc();
        self.expect(TokenKind::LBrace, "'{'", "expected-lbrace")?;
        let mut statements = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
            statements.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RBrace, "'}'", "expected-rbrace")?;
        Ok(Node::new(NodeKind::Block { statements }, loc))
    }

    fn parse_statement(&mut self) -> Result<Node, ()> {
        match self.peek_kind() {
            TokenKind::Let => self.parse_let_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::Match => self.parse_match_stmt(),
            TokenKind::Break => {
                let loc = self.loc();
                self.advance();
                self.expect(TokenKind::Semicolon, "';'", "expected-semicolon")?;
                Ok(Node::new(NodeKind::BreakStmt, loc))
            }
            TokenKind::Continue => {
                let loc = self.loc();
                self.advance();
                self.expect(TokenKind::Semicolon, "';'", "expected-semicolon")?;
                Ok(Node::new(NodeKind::ContinueStmt, loc))
            }
            TokenKind::Spawn => self.parse_spawn_stmt(),
            TokenKind::SpawnWithHandle => self.parse_spawn_with_handle_stmt(),
            TokenKind::Unsafe => {
                let loc = self.loc();
                self.advance();
                let body = self.parse_block()?;
                Ok(Node::new(NodeKind::UnsafeBlock { body: body.boxed() }, loc))
            }
            TokenKind::LBrace => self.parse_block(),
            _ => self.parse_expr_or_assignment_stmt(),
        }
    }

    fn parse_let_stmt(&mut self) -> Result<Node, ()> {
        let loc = self.loc();
        self.advance(); // 'let'
        let is_mut = if self.at(&TokenKind::Mut) {
            self.advance();
            true
        } else {
            false
        };
        let name = self.expect_identifier("a binding name")?;
        self.expect(TokenKind::Colon, "a type annotation (':' Type)", "missing-type-annotation")?;
        let ty = self.parse_type()?;
        let init = if self.at(&TokenKind::Eq) {
            self.advance();
            Some(self.parse_expr(0)?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, "';'", "expected-semicolon")?;
        Ok(Node::new(
            NodeKind::LetStmt { is_mut, name, ty: ty.boxed(), init: init.map(Node::boxed) },
            loc,
        ))
    }

    fn parse_return_stmt(&mut self) -> Result<Node, ()> {
        let loc = self.loc();
        self.advance(); // 'return'
        let value = if self.at(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr(0)?)
        };
        self.expect(TokenKind::Semicolon, "';'", "expected-semicolon")?;
        Ok(Node::new(NodeKind::ReturnStmt { value: value.map(Node::boxed) }, loc))
    }

    fn parse_if_stmt(&mut self) -> Result<Node, ()> {
        let loc = self.loc();
        self.advance(); // 'if'
        if self.at(&TokenKind::Let) {
            self.advance();
            let pattern = self.parse_pattern()?;
            self.expect(TokenKind::Eq, "'='", "expected-eq")?;
            let expr = self.with_struct_literal_allowed(false, |p| p.parse_expr(0))?;
            let then_block = self.parse_block()?;
            let else_block = if self.at(&TokenKind::Else) {
                self.advance();
                Some(self.parse_block()?)
            } else {
                None
            };
            return Ok(Node::new(
                NodeKind::IfLetStmt {
                    pattern: pattern.boxed(),
                    expr: expr.boxed(),
                    then_block: then_block.boxed(),
                    else_block: else_block.map(Node::boxed),
                },
                loc,
            ));
        }
        let condition = self.with_struct_literal_allowed(false, |p| p.parse_expr(0))?;
        let then_block = self.parse_block()?;
        let else_branch = if self.at(&TokenKind::Else) {
            self.advance();
            if self.at(&TokenKind::If) {
                Some(self.parse_if_stmt()?)
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok(Node::new(
            NodeKind::IfStmt {
                condition: condition.boxed(),
                then_block: then_block.boxed(),
                else_branch: else_branch.map(Node::boxed),
            },
            loc,
        ))
    }

    fn parse_for_stmt(&mut self) -> Result<Node, ()> {
        let loc = self.loc();
        self.advance(); // 'for'
        let binding = self.expect_identifier("a loop variable")?;
        self.expect(TokenKind::In, "'in'", "expected-in")?;
        let iterable = self.with_struct_literal_allowed(false, |p| p.parse_expr(0))?;
        let body = self.parse_block()?;
        Ok(Node::new(NodeKind::ForStmt { binding, iterable: iterable.boxed(), body: body.boxed() }, loc))
    }

    fn parse_match_stmt(&mut self) -> Result<Node, ()> {
        let loc = self.loc();
        self.advance(); // 'match'
        let scrutinee = self.with_struct_literal_allowed(false, |p| p.parse_expr(0))?;
        self.expect(TokenKind::LBrace, "'{'", "expected-lbrace")?;
        let mut arms = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
            let arm_loc = self.loc();
            let pattern = self.parse_pattern()?;
            self.expect(TokenKind::FatArrow, "'=>'", "expected-fat-arrow")?;
            let body = self.parse_block()?;
            arms.push(Node::new(NodeKind::MatchArm { pattern: pattern.boxed(), body: body.boxed() }, arm_loc));
        }
        self.expect(TokenKind::RBrace, "'}'", "expected-rbrace")?;
        Ok(Node::new(NodeKind::MatchStmt { scrutinee: scrutinee.boxed(), arms }, loc))
    }

    fn parse_spawn_stmt(&mut self) -> Result<Node, ()> {
        let loc = self.loc();
        self.advance(); // 'spawn'
        let call = self.parse_expr(0)?;
        self.expect(TokenKind::Semicolon, "';'", "expected-semicolon")?;
        Ok(Node::new(NodeKind::SpawnStmt { call: call.boxed() }, loc))
    }

    fn parse_spawn_with_handle_stmt(&mut self) -> Result<Node, ()> {
        let loc = self.loc();
        self.advance(); // 'spawn_with_handle'
        let handle_name = self.expect_identifier("a handle name")?;
        self.expect(TokenKind::Eq, "'='", "expected-eq")?;
        let call = self.parse_expr(0)?;
        self.expect(TokenKind::Semicolon, "';'", "expected-semicolon")?;
        Ok(Node::new(NodeKind::SpawnWithHandleStmt { handle_name, call: call.boxed() }, loc))
    }

    fn parse_expr_or_assignment_stmt(&mut self) -> Result<Node, ()> {
        let loc = self.loc();
        let expr = self.parse_expr(0)?;
        if self.at(&TokenKind::Eq) {
            self.advance();
            let value = self.parse_expr(0)?;
            self.expect(TokenKind::Semicolon, "';'", "expected-semicolon")?;
            return Ok(Node::new(NodeKind::Assignment { target: expr.boxed(), value: value.boxed() }, loc));
        }
        self.expect(TokenKind::Semicolon, "';'", "expected-semicolon")?;
        Ok(Node::new(NodeKind::ExprStmt { expr: expr.boxed() }, loc))
    }
}
