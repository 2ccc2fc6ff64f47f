//! Top-level declarations: package/import, functions, structs, enums,
//! externs, impl blocks, and consts (spec §4.2.1-§4.2.4).

use super::Parser;
use crate::ast::{Members, Node, NodeKind, Visibility};
use crate::token::TokenKind;

/// Reject a path containing the `internal/` segment anywhere (spec
/// §4.2.1, §6 "invalid-import-path:internal-access-denied").
fn touches_internal(path: &str) -> bool {
    path.starts_with("internal/") || path.contains("/internal/")
}

/// `stdlib/…`, `./…`, `../…`, or a fully qualified `host/user/repo/…`
/// form (at least three non-empty segments, the first containing a
/// `.`, e.g. `github.com/user/repo`).
fn is_fully_qualified(path: &str) -> bool {
    let segments: Vec<&str> = path.split('/').collect();
    segments.len() >= 3 && segments.iter().all(|s| !s.is_empty()) && segments[0].contains('.')
}

fn validate_import_path(path: &str) -> Result<(), &'static str> {
    if path.is_empty() {
        return Err("an import path must not be empty");
    }
    if path.chars().any(char::is_whitespace) {
        return Err("an import path must not contain whitespace");
    }
    if touches_internal(path) {
        return Err("import path denies access under 'internal/'");
    }
    let recognised = path.starts_with("stdlib/")
        || path.starts_with("./")
        || path.starts_with("../")
        || is_fully_qualified(path);
    if !recognised {
        return Err("import path does not match 'stdlib/…', './…', '../…', or a fully qualified 'host/user/repo/…' form");
    }
    Ok(())
}

impl<'src> Parser<'src> {
    /// `package IDENT ;`, the mandatory first line of every program.
    pub(super) fn parse_package_decl(&mut self) -> Result<Node, ()> {
        let loc = self.loc();
        self.expect(TokenKind::Package, "'package'", "expected-package")?;
        let name = self.expect_identifier("a package name")?;
        self.expect(TokenKind::Semicolon, "';'", "expected-semicolon")?;
        Ok(Node::new(NodeKind::PackageDecl { name }, loc))
    }

    /// `import STRING (as IDENT)? ;`, validated against the recognised
    /// path shapes before the node is built.
    pub(super) fn parse_import_decl(&mut self) -> Result<Node, ()> {
        let loc = self.loc();
        self.advance(); // 'import'
        let path = match self.peek_kind().clone() {
            TokenKind::StringLiteral(s) => {
                self.advance();
                s
            }
            other => {
                self.fatal("expected-import-path", format!("expected a quoted import path, found {other:?}"));
                return Err(());
            }
        };
        if let Err(reason) = validate_import_path(&path) {
            self.constraint_error("invalid-import-path:internal-access-denied", format!("{reason}: \"{path}\""));
            return Err(());
        }
        let alias = if self.at(&TokenKind::As) {
            self.advance();
            Some(self.expect_identifier("an import alias")?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, "';'", "expected-semicolon")?;
        Ok(Node::new(NodeKind::ImportDecl { path, alias }, loc))
    }

    fn parse_visibility(&mut self) -> Result<Visibility, ()> {
        match self.peek_kind() {
            TokenKind::Pub => {
                self.advance();
                Ok(Visibility::Pub)
            }
            TokenKind::Priv => {
                self.advance();
                Ok(Visibility::Priv)
            }
            other => {
                self.fatal(
                    "expected-visibility",
                    format!("expected visibility modifier ('pub' or 'priv'), found {other:?}"),
                );
                Err(())
            }
        }
    }

    /// Dispatches a single top-level declaration. `impl` is the sole
    /// exception to the mandatory-visibility rule (spec §4.2.1).
    pub(super) fn parse_top_level_decl(&mut self) -> Result<Node, ()> {
        let annotations = self.parse_annotations()?;
        if self.at(&TokenKind::Impl) {
            return self.parse_impl_block(annotations);
        }
        if self.at(&TokenKind::Type) {
            self.fatal(
                "type-alias-not-yet-implemented",
                "type aliases are not yet implemented",
            );
            return Err(());
        }
        let visibility = self.parse_visibility()?;
        if self.at(&TokenKind::Type) {
            self.fatal(
                "type-alias-not-yet-implemented",
                "type aliases are not yet implemented",
            );
            return Err(());
        }
        match self.peek_kind() {
            TokenKind::Fn => self.parse_function_decl(visibility, annotations),
            TokenKind::Struct => self.parse_struct_decl(visibility, annotations),
            TokenKind::Enum => self.parse_enum_decl(visibility, annotations),
            TokenKind::Extern => self.parse_extern_decl(visibility, annotations),
            TokenKind::Const => self.parse_const_decl(visibility),
            other => {
                self.fatal(
                    "expected-top-level-form",
                    format!("expected 'fn', 'struct', 'enum', 'extern', 'const', or 'impl', found {other:?}"),
                );
                Err(())
            }
        }
    }

    fn parse_function_decl(&mut self, visibility: Visibility, annotations: Vec<Node>) -> Result<Node, ()> {
        let loc = self.loc();
        self.advance(); // 'fn'
        let name = self.expect_identifier("a function name")?;
        self.expect(TokenKind::LParen, "'('", "expected-lparen")?;
        let params = self.parse_param_list(false)?;
        self.expect(TokenKind::RParen, "')'", "expected-rparen")?;
        self.expect(TokenKind::Arrow, "'->'", "expected-arrow")?;
        let return_type = self.parse_type()?;
        let body = self.parse_block()?;
        Ok(Node::new(
            NodeKind::FunctionDecl {
                visibility,
                name,
                params,
                return_type: return_type.boxed(),
                body: body.boxed(),
                annotations,
            },
            loc,
        ))
    }

    /// `none`, or one-or-more `IDENT : Type` separated by commas.
    /// `allow_transfer` gates the `#[transfer_*]` tags valid only on
    /// extern parameters (spec §4.2.4).
    fn parse_param_list(&mut self, allow_transfer: bool) -> Result<Members<Node>, ()> {
        if self.at(&TokenKind::TyNone) {
            self.advance();
            return Ok(Members::Absent);
        }
        if self.at(&TokenKind::RParen) {
            self.constraint_error(
                "empty-parameter-list-without-none",
                "an empty parameter list must be written as 'none', not left blank",
            );
            return Err(());
        }
        let mut params = Vec::new();
        loop {
            params.push(self.parse_one_param(allow_transfer)?);
            if self.at(&TokenKind::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        Ok(Members::Items(params))
    }

    fn parse_one_param(&mut self, allow_transfer: bool) -> Result<Node, ()> {
        let loc = self.loc();
        let transfer = if allow_transfer { self.try_parse_transfer_annotation()? } else { None };
        if self.at(&TokenKind::KwSelf) {
            self.advance();
            return Ok(Node::new(NodeKind::SelfParam, loc));
        }
        if self.at(&TokenKind::Mut) {
            self.constraint_error("mut-param-rejected", "parameters are never mutable; 'mut' is not permitted here");
            return Err(());
        }
        let name = self.expect_identifier("a parameter name")?;
        self.expect(TokenKind::Colon, "':'", "expected-colon")?;
        let ty = self.parse_type()?;
        Ok(Node::new(NodeKind::ParamDecl { name, ty: ty.boxed(), transfer }, loc))
    }

    fn parse_struct_decl(&mut self, visibility: Visibility, annotations: Vec<Node>) -> Result<Node, ()> {
        let loc = self.loc();
        self.advance(); // 'struct'
        let name = self.expect_declarable_name("a struct name")?;
        let type_params = self.parse_type_params()?;
        self.expect(TokenKind::LBrace, "'{'", "expected-lbrace")?;
        let fields = self.parse_field_list()?;
        self.expect(TokenKind::RBrace, "'}'", "expected-rbrace")?;
        Ok(Node::new(
            NodeKind::StructDecl { visibility, name, type_params, fields, annotations },
            loc,
        ))
    }

    fn parse_field_list(&mut self) -> Result<Members<Node>, ()> {
        if self.at(&TokenKind::TyNone) {
            self.advance();
            return Ok(Members::Absent);
        }
        if self.at(&TokenKind::RBrace) {
            self.constraint_error(
                "empty-struct-without-none",
                "an empty struct body must be written as '{ none }', not left blank",
            );
            return Err(());
        }
        let mut fields = Vec::new();
        loop {
            let field_loc = self.loc();
            // Unlike top-level declarations, field visibility is optional
            // (spec §4.2.3: "Visibility? IDENT : Type"); an absent
            // modifier defaults to 'priv'.
            let visibility = match self.peek_kind() {
                TokenKind::Pub => {
                    self.advance();
                    Visibility::Pub
                }
                TokenKind::Priv => {
                    self.advance();
                    Visibility::Priv
                }
                _ => Visibility::Priv,
            };
            let name = self.expect_identifier("a field name")?;
            self.expect(TokenKind::Colon, "':'", "expected-colon")?;
            let ty = self.parse_type()?;
            fields.push(Node::new(NodeKind::StructField { visibility, name, ty: ty.boxed() }, field_loc));
            if self.at(&TokenKind::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        if self.at(&TokenKind::Semicolon) {
            self.fatal("semicolon-between-fields", "struct fields are separated by ',', not ';'");
            return Err(());
        }
        Ok(Members::Items(fields))
    }

    fn parse_enum_decl(&mut self, visibility: Visibility, annotations: Vec<Node>) -> Result<Node, ()> {
        let loc = self.loc();
        self.advance(); // 'enum'
        let name = self.expect_declarable_name("an enum name")?;
        let type_params = self.parse_type_params()?;
        self.expect(TokenKind::LBrace, "'{'", "expected-lbrace")?;
        let variants = if self.at(&TokenKind::TyNone) {
            self.advance();
            Members::Absent
        } else if self.at(&TokenKind::RBrace) {
            self.constraint_error(
                "empty-enum-without-none",
                "an empty enum body must be written as '{ none }', not left blank",
            );
            return Err(());
        } else {
            let mut variants = Vec::new();
            loop {
                variants.push(self.parse_enum_variant()?);
                if self.at(&TokenKind::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
            Members::Items(variants)
        };
        self.expect(TokenKind::RBrace, "'}'", "expected-rbrace")?;
        Ok(Node::new(
            NodeKind::EnumDecl { visibility, name, type_params, variants, annotations },
            loc,
        ))
    }

    fn parse_enum_variant(&mut self) -> Result<Node, ()> {
        let loc = self.loc();
        let name = self.expect_identifier("a variant name")?;
        let payload = if self.at(&TokenKind::LParen) {
            self.advance();
            let mut payload = Vec::new();
            loop {
                payload.push(self.parse_type()?);
                if self.at(&TokenKind::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
            self.expect(TokenKind::RParen, "')'", "expected-rparen")?;
            payload
        } else {
            Vec::new()
        };
        Ok(Node::new(NodeKind::EnumVariantDecl { name, payload }, loc))
    }

    fn parse_extern_decl(&mut self, visibility: Visibility, annotations: Vec<Node>) -> Result<Node, ()> {
        let loc = self.loc();
        self.advance(); // 'extern'
        let lib = if let TokenKind::StringLiteral(s) = self.peek_kind().clone() {
            self.advance();
            Some(s)
        } else {
            None
        };
        self.expect(TokenKind::Fn, "'fn'", "expected-fn")?;
        let name = self.expect_identifier("a function name")?;
        self.expect(TokenKind::LParen, "'('", "expected-lparen")?;
        let params = self.parse_param_list(true)?;
        self.expect(TokenKind::RParen, "')'", "expected-rparen")?;
        self.expect(TokenKind::Arrow, "'->'", "expected-arrow")?;
        let return_transfer = self.try_parse_transfer_annotation()?;
        let return_type = self.parse_type()?;
        self.expect(TokenKind::Semicolon, "';'", "expected-semicolon")?;
        Ok(Node::new(
            NodeKind::ExternDecl {
                visibility,
                lib,
                name,
                params,
                return_type: return_type.boxed(),
                return_transfer,
                annotations,
            },
            loc,
        ))
    }

    fn parse_impl_block(&mut self, annotations: Vec<Node>) -> Result<Node, ()> {
        let loc = self.loc();
        self.advance(); // 'impl'
        let type_name = self.expect_identifier("a type name")?;
        self.expect(TokenKind::LBrace, "'{'", "expected-lbrace")?;
        let mut methods = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
            methods.push(self.parse_method_decl()?);
        }
        self.expect(TokenKind::RBrace, "'}'", "expected-rbrace")?;
        Ok(Node::new(NodeKind::ImplBlock { type_name, methods, annotations }, loc))
    }

    /// A method is an *instance* method exactly when its first
    /// parameter is the bare `self` (spec §4.2.2); otherwise it is an
    /// associated function.
    fn parse_method_decl(&mut self) -> Result<Node, ()> {
        let loc = self.loc();
        let visibility = self.parse_visibility()?;
        self.expect(TokenKind::Fn, "'fn'", "expected-fn")?;
        let name = self.expect_identifier("a method name")?;
        self.expect(TokenKind::LParen, "'('", "expected-lparen")?;
        let params = self.parse_param_list(false)?;
        self.expect(TokenKind::RParen, "')'", "expected-rparen")?;
        self.expect(TokenKind::Arrow, "'->'", "expected-arrow")?;
        let return_type = self.parse_type()?;
        let body = self.parse_block()?;
        let is_instance = matches!(params.as_slice().first().map(|p| &p.kind), Some(NodeKind::SelfParam));
        Ok(Node::new(
            NodeKind::MethodDecl {
                visibility,
                name,
                is_instance,
                params,
                return_type: return_type.boxed(),
                body: body.boxed(),
            },
            loc,
        ))
    }

    fn parse_const_decl(&mut self, visibility: Visibility) -> Result<Node, ()> {
        let loc = self.loc();
        self.advance(); // 'const'
        let name = self.expect_identifier("a constant name")?;
        self.expect(TokenKind::Colon, "a type annotation (':' Type)", "missing-type-annotation")?;
        let ty = self.parse_type()?;
        self.expect(TokenKind::Eq, "'='", "expected-eq")?;
        let value_loc = self.loc();
        let inner = self.parse_expr(0)?;
        self.expect(TokenKind::Semicolon, "';'", "expected-semicolon")?;
        let value = Node::new(NodeKind::ConstExpr { inner: inner.boxed() }, value_loc);
        Ok(Node::new(NodeKind::ConstDecl { visibility, name, ty: ty.boxed(), value: value.boxed() }, loc))
    }
}
