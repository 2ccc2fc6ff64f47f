//! The AST node model: a tagged union of node kinds, each carrying a
//! source location and kind-specific payload (spec §3.3-§3.5, §4.3).
//!
//! Nodes are plain Rust values. A parent's `Box<Node>`/`Vec<Node>`
//! fields *are* the ownership edges the spec describes in prose
//! ("destroying a node recursively destroys its children"); `Drop` does
//! that automatically, so there is no hand-written destructor anywhere
//! in this module (see design note in `DESIGN.md`: "sum types with
//! automatic drop"). `#[derive(Clone)]` gives deep clone for the same
//! reason — every owned field clones its own subtree.

mod print;

use crate::source::SourceLocation;
use std::cell::RefCell;
use std::rc::Rc;

/// Opaque, shareable slot for a later type-checking pass to decorate a
/// node with type information. The parser never writes to it. Cloning a
/// node clones the `Rc`, so clone and original observe the same slot
/// (spec §4.3: "share/clone-opaque").
#[derive(Debug, Clone, Default)]
pub struct TypeInfoSlot(Rc<RefCell<Option<TypeInfo>>>);

impl TypeInfoSlot {
    pub fn get(&self) -> Option<TypeInfo> {
        self.0.borrow().clone()
    }

    pub fn set(&self, info: TypeInfo) {
        *self.0.borrow_mut() = Some(info);
    }
}

/// Placeholder for whatever a downstream semantic pass wants to attach.
/// The parser/AST layer treats this as fully opaque.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub description: String,
}

/// Distinguishes the four grammar positions where `none` denotes
/// structural absence from an ordinary (possibly multi-element) list
/// (spec §3.4, §3.5, §8 boundary behaviours). `Items` is never empty
/// when produced by the parser — an empty list is always `Absent`.
#[derive(Debug, Clone)]
pub enum Members<T> {
    Absent,
    Items(Vec<T>),
}

impl<T> Members<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Members::Absent)
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            Members::Absent => &[],
            Members::Items(items) => items,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Pub,
    Priv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferAnnotation {
    TransferFull,
    TransferNone,
    Borrowed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Shl,
    Shr,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
    Deref,
    Ref,
}

/// One `name: value` pair inside a struct literal.
#[derive(Debug, Clone)]
pub struct FieldInit {
    pub name: String,
    pub value: Node,
}

#[derive(Debug, Clone)]
pub enum ArrayLiteralKind {
    /// `[none]`
    Empty,
    /// `[ e, e, ... ]`
    Elements(Vec<Node>),
    /// `[ value ; count ]`
    Repeated { value: Box<Node>, count: Box<Node> },
}

/// A tagged node kind together with its payload (spec §3.3). Variant
/// names track the node-kind list in spec §3.3 one-to-one, except where
/// noted in `DESIGN.md` (visibility and FFI/semantic annotations are
/// modelled as plain data on their owning declaration rather than as
/// separate child nodes, since they carry no recursive structure of
/// their own).
#[derive(Debug, Clone)]
pub enum NodeKind {
    Program {
        package: Box<Node>,
        imports: Vec<Node>,
        declarations: Vec<Node>,
    },
    PackageDecl {
        name: String,
    },
    ImportDecl {
        path: String,
        alias: Option<String>,
    },

    FunctionDecl {
        visibility: Visibility,
        name: String,
        params: Members<Node>,
        return_type: Box<Node>,
        body: Box<Node>,
        annotations: Vec<Node>,
    },
    ParamDecl {
        name: String,
        ty: Box<Node>,
        transfer: Option<TransferAnnotation>,
    },
    /// The bare `self` first parameter of an instance method. Carries no
    /// type node; `MethodDecl::is_instance` is true exactly when a
    /// method's first parameter has this kind.
    SelfParam,
    StructDecl {
        visibility: Visibility,
        name: String,
        type_params: Vec<String>,
        fields: Members<Node>,
        annotations: Vec<Node>,
    },
    StructField {
        visibility: Visibility,
        name: String,
        ty: Box<Node>,
    },
    EnumDecl {
        visibility: Visibility,
        name: String,
        type_params: Vec<String>,
        variants: Members<Node>,
        annotations: Vec<Node>,
    },
    EnumVariantDecl {
        name: String,
        payload: Vec<Node>,
    },
    ExternDecl {
        visibility: Visibility,
        lib: Option<String>,
        name: String,
        params: Members<Node>,
        return_type: Box<Node>,
        return_transfer: Option<TransferAnnotation>,
        annotations: Vec<Node>,
    },
    ImplBlock {
        type_name: String,
        methods: Vec<Node>,
        annotations: Vec<Node>,
    },
    MethodDecl {
        visibility: Visibility,
        name: String,
        is_instance: bool,
        params: Members<Node>,
        return_type: Box<Node>,
        body: Box<Node>,
    },
    ConstDecl {
        visibility: Visibility,
        name: String,
        ty: Box<Node>,
        value: Box<Node>,
    },

    Block {
        statements: Vec<Node>,
    },
    ExprStmt {
        expr: Box<Node>,
    },
    LetStmt {
        is_mut: bool,
        name: String,
        ty: Box<Node>,
        init: Option<Box<Node>>,
    },
    ReturnStmt {
        value: Option<Box<Node>>,
    },
    IfStmt {
        condition: Box<Node>,
        then_block: Box<Node>,
        else_branch: Option<Box<Node>>,
    },
    IfLetStmt {
        pattern: Box<Node>,
        expr: Box<Node>,
        then_block: Box<Node>,
        else_block: Option<Box<Node>>,
    },
    ForStmt {
        binding: String,
        iterable: Box<Node>,
        body: Box<Node>,
    },
    MatchStmt {
        scrutinee: Box<Node>,
        arms: Vec<Node>,
    },
    MatchArm {
        pattern: Box<Node>,
        body: Box<Node>,
    },
    SpawnStmt {
        call: Box<Node>,
    },
    SpawnWithHandleStmt {
        handle_name: String,
        call: Box<Node>,
    },
    BreakStmt,
    ContinueStmt,
    UnsafeBlock {
        body: Box<Node>,
    },
    Assignment {
        target: Box<Node>,
        value: Box<Node>,
    },

    BinaryExpr {
        op: BinaryOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    UnaryExpr {
        op: UnaryOp,
        operand: Box<Node>,
    },
    SizeofExpr {
        ty: Box<Node>,
    },
    CallExpr {
        callee: Box<Node>,
        args: Vec<Node>,
    },
    AssociatedFuncCall {
        type_name: String,
        func_name: String,
        args: Vec<Node>,
    },
    FieldAccess {
        base: Box<Node>,
        field: String,
    },
    IndexAccess {
        base: Box<Node>,
        index: Box<Node>,
    },
    SliceExpr {
        base: Box<Node>,
        start: Option<Box<Node>>,
        end: Option<Box<Node>>,
    },
    SliceLengthAccess {
        base: Box<Node>,
    },
    AwaitExpr {
        handle: Box<Node>,
    },
    StructLiteral {
        type_name: String,
        fields: Vec<FieldInit>,
    },
    ArrayLiteral {
        kind: ArrayLiteralKind,
    },
    TupleLiteral {
        elements: Vec<Node>,
    },
    EnumVariantExpr {
        enum_name: String,
        variant_name: String,
        args: Vec<Node>,
    },
    ConstExpr {
        inner: Box<Node>,
    },
    UnsafeExpr {
        body: Box<Node>,
    },

    IntegerLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    BoolLiteral(bool),
    CharLiteral(char),
    UnitLiteral,
    Identifier(String),

    BaseType(String),
    SliceType {
        element: Box<Node>,
    },
    ArrayType {
        size: Box<Node>,
        element: Box<Node>,
    },
    PtrType {
        mutable: bool,
        pointee: Box<Node>,
    },
    StructType {
        name: String,
        type_args: Vec<Node>,
    },
    TupleType {
        elements: Vec<Node>,
    },
    ResultType {
        ok: Box<Node>,
        err: Box<Node>,
    },
    OptionType {
        value: Box<Node>,
    },
    TaskHandleType {
        value: Box<Node>,
    },

    WildcardPattern,
    IdentifierPattern(String),
    LiteralPattern(Box<Node>),
    TuplePattern(Vec<Node>),
    StructPattern {
        name: String,
        fields: Vec<Node>,
    },
    FieldPattern {
        name: String,
        pattern: Box<Node>,
    },
    EnumPattern {
        enum_name: String,
        variant: String,
        args: Vec<Node>,
    },

    Annotation {
        name: String,
        args: Vec<Node>,
    },
}

/// A node's kind, location, and opaque type-info slot (spec §3.3).
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub location: SourceLocation,
    pub type_info: TypeInfoSlot,
}

impl Node {
    pub fn new(kind: NodeKind, location: SourceLocation) -> Self {
        Self {
            kind,
            location,
            type_info: TypeInfoSlot::default(),
        }
    }

    pub fn boxed(self) -> Box<Node> {
        Box::new(self)
    }

    /// Uniform, kind-aware direct-children iteration in source order
    /// (spec §4.3 "Iterate children").
    pub fn children(&self) -> Vec<&Node> {
        use NodeKind::*;
        match &self.kind {
            Program {
                package,
                imports,
                declarations,
            } => {
                let mut out = vec![package.as_ref()];
                out.extend(imports.iter());
                out.extend(declarations.iter());
                out
            }
            PackageDecl { .. } | ImportDecl { .. } => vec![],
            FunctionDecl {
                params,
                return_type,
                body,
                annotations,
                ..
            } => {
                let mut out: Vec<&Node> = annotations.iter().collect();
                out.extend(params.as_slice());
                out.push(return_type.as_ref());
                out.push(body.as_ref());
                out
            }
            ParamDecl { ty, .. } => vec![ty.as_ref()],
            SelfParam => vec![],
            StructDecl {
                fields, annotations, ..
            } => {
                let mut out: Vec<&Node> = annotations.iter().collect();
                out.extend(fields.as_slice());
                out
            }
            StructField { ty, .. } => vec![ty.as_ref()],
            EnumDecl {
                variants,
                annotations,
                ..
            } => {
                let mut out: Vec<&Node> = annotations.iter().collect();
                out.extend(variants.as_slice());
                out
            }
            EnumVariantDecl { payload, .. } => payload.iter().collect(),
            ExternDecl {
                params,
                return_type,
                annotations,
                ..
            } => {
                let mut out: Vec<&Node> = annotations.iter().collect();
                out.extend(params.as_slice());
                out.push(return_type.as_ref());
                out
            }
            ImplBlock {
                methods, annotations, ..
            } => {
                let mut out: Vec<&Node> = annotations.iter().collect();
                out.extend(methods.iter());
                out
            }
            MethodDecl {
                params,
                return_type,
                body,
                ..
            } => {
                let mut out: Vec<&Node> = params.as_slice().iter().collect();
                out.push(return_type.as_ref());
                out.push(body.as_ref());
                out
            }
            ConstDecl { ty, value, .. } => vec![ty.as_ref(), value.as_ref()],

            Block { statements } => statements.iter().collect(),
            ExprStmt { expr } => vec![expr.as_ref()],
            LetStmt { ty, init, .. } => {
                let mut out = vec![ty.as_ref()];
                if let Some(init) = init {
                    out.push(init.as_ref());
                }
                out
            }
            ReturnStmt { value } => value.iter().map(Box::as_ref).collect(),
            IfStmt {
                condition,
                then_block,
                else_branch,
            } => {
                let mut out = vec![condition.as_ref(), then_block.as_ref()];
                if let Some(e) = else_branch {
                    out.push(e.as_ref());
                }
                out
            }
            IfLetStmt {
                pattern,
                expr,
                then_block,
                else_block,
            } => {
                let mut out = vec![pattern.as_ref(), expr.as_ref(), then_block.as_ref()];
                if let Some(e) = else_block {
                    out.push(e.as_ref());
                }
                out
            }
            ForStmt { iterable, body, .. } => vec![iterable.as_ref(), body.as_ref()],
            MatchStmt { scrutinee, arms } => {
                let mut out = vec![scrutinee.as_ref()];
                out.extend(arms.iter());
                out
            }
            MatchArm { pattern, body } => vec![pattern.as_ref(), body.as_ref()],
            SpawnStmt { call } => vec![call.as_ref()],
            SpawnWithHandleStmt { call, .. } => vec![call.as_ref()],
            BreakStmt | ContinueStmt => vec![],
            UnsafeBlock { body } => vec![body.as_ref()],
            Assignment { target, value } => vec![target.as_ref(), value.as_ref()],

            BinaryExpr { lhs, rhs, .. } => vec![lhs.as_ref(), rhs.as_ref()],
            UnaryExpr { operand, .. } => vec![operand.as_ref()],
            SizeofExpr { ty } => vec![ty.as_ref()],
            CallExpr { callee, args } => {
                let mut out = vec![callee.as_ref()];
                out.extend(args.iter());
                out
            }
            AssociatedFuncCall { args, .. } => args.iter().collect(),
            FieldAccess { base, .. } => vec![base.as_ref()],
            IndexAccess { base, index } => vec![base.as_ref(), index.as_ref()],
            SliceExpr { base, start, end } => {
                let mut out = vec![base.as_ref()];
                if let Some(s) = start {
                    out.push(s.as_ref());
                }
                if let Some(e) = end {
                    out.push(e.as_ref());
                }
                out
            }
            SliceLengthAccess { base } => vec![base.as_ref()],
            AwaitExpr { handle } => vec![handle.as_ref()],
            StructLiteral { fields, .. } => fields.iter().map(|f| &f.value).collect(),
            ArrayLiteral { kind } => match kind {
                ArrayLiteralKind::Empty => vec![],
                ArrayLiteralKind::Elements(elems) => elems.iter().collect(),
                ArrayLiteralKind::Repeated { value, count } => vec![value.as_ref(), count.as_ref()],
            },
            TupleLiteral { elements } => elements.iter().collect(),
            EnumVariantExpr { args, .. } => args.iter().collect(),
            ConstExpr { inner } => vec![inner.as_ref()],
            UnsafeExpr { body } => vec![body.as_ref()],

            IntegerLiteral(_)
            | FloatLiteral(_)
            | StringLiteral(_)
            | BoolLiteral(_)
            | CharLiteral(_)
            | UnitLiteral
            | Identifier(_) => vec![],

            BaseType(_) => vec![],
            SliceType { element } => vec![element.as_ref()],
            ArrayType { size, element } => vec![size.as_ref(), element.as_ref()],
            PtrType { pointee, .. } => vec![pointee.as_ref()],
            StructType { type_args, .. } => type_args.iter().collect(),
            TupleType { elements } => elements.iter().collect(),
            ResultType { ok, err } => vec![ok.as_ref(), err.as_ref()],
            OptionType { value } => vec![value.as_ref()],
            TaskHandleType { value } => vec![value.as_ref()],

            WildcardPattern | IdentifierPattern(_) => vec![],
            LiteralPattern(inner) => vec![inner.as_ref()],
            TuplePattern(elements) => elements.iter().collect(),
            StructPattern { fields, .. } => fields.iter().collect(),
            FieldPattern { pattern, .. } => vec![pattern.as_ref()],
            EnumPattern { args, .. } => args.iter().collect(),

            Annotation { args, .. } => args.iter().collect(),
        }
    }

    /// The name carried by this node's kind, for kinds that have one.
    /// Used by [`Node::find_by_kind_and_name`].
    pub fn name(&self) -> Option<&str> {
        use NodeKind::*;
        match &self.kind {
            PackageDecl { name } => Some(name),
            FunctionDecl { name, .. } => Some(name),
            ParamDecl { name, .. } => Some(name),
            StructDecl { name, .. } => Some(name),
            StructField { name, .. } => Some(name),
            EnumDecl { name, .. } => Some(name),
            EnumVariantDecl { name, .. } => Some(name),
            ExternDecl { name, .. } => Some(name),
            ImplBlock { type_name, .. } => Some(type_name),
            MethodDecl { name, .. } => Some(name),
            ConstDecl { name, .. } => Some(name),
            LetStmt { name, .. } => Some(name),
            ForStmt { binding, .. } => Some(binding),
            SpawnWithHandleStmt { handle_name, .. } => Some(handle_name),
            Identifier(name) => Some(name),
            StructType { name, .. } => Some(name),
            IdentifierPattern(name) => Some(name),
            StructPattern { name, .. } => Some(name),
            FieldPattern { name, .. } => Some(name),
            Annotation { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The discriminant of `kind`, as a stable string, for kind-equality
    /// checks in [`Node::find_by_kind_and_name`] and tests.
    pub fn kind_name(&self) -> &'static str {
        use NodeKind::*;
        match &self.kind {
            Program { .. } => "program",
            PackageDecl { .. } => "package-decl",
            ImportDecl { .. } => "import-decl",
            FunctionDecl { .. } => "function-decl",
            ParamDecl { .. } => "param-decl",
            SelfParam => "self-param",
            StructDecl { .. } => "struct-decl",
            StructField { .. } => "struct-field",
            EnumDecl { .. } => "enum-decl",
            EnumVariantDecl { .. } => "enum-variant-decl",
            ExternDecl { .. } => "extern-decl",
            ImplBlock { .. } => "impl-block",
            MethodDecl { .. } => "method-decl",
            ConstDecl { .. } => "const-decl",
            Block { .. } => "block",
            ExprStmt { .. } => "expr-stmt",
            LetStmt { .. } => "let-stmt",
            ReturnStmt { .. } => "return-stmt",
            IfStmt { .. } => "if-stmt",
            IfLetStmt { .. } => "if-let-stmt",
            ForStmt { .. } => "for-stmt",
            MatchStmt { .. } => "match-stmt",
            MatchArm { .. } => "match-arm",
            SpawnStmt { .. } => "spawn-stmt",
            SpawnWithHandleStmt { .. } => "spawn-with-handle-stmt",
            BreakStmt => "break-stmt",
            ContinueStmt => "continue-stmt",
            UnsafeBlock { .. } => "unsafe-block",
            Assignment { .. } => "assignment",
            BinaryExpr { .. } => "binary-expr",
            UnaryExpr { .. } => "unary-expr",
            SizeofExpr { .. } => "sizeof-expr",
            CallExpr { .. } => "call-expr",
            AssociatedFuncCall { .. } => "associated-func-call",
            FieldAccess { .. } => "field-access",
            IndexAccess { .. } => "index-access",
            SliceExpr { .. } => "slice-expr",
            SliceLengthAccess { .. } => "slice-length-access",
            AwaitExpr { .. } => "await-expr",
            StructLiteral { .. } => "struct-literal",
            ArrayLiteral { .. } => "array-literal",
            TupleLiteral { .. } => "tuple-literal",
            EnumVariantExpr { .. } => "enum-variant",
            ConstExpr { .. } => "const-expr",
            UnsafeExpr { .. } => "unsafe-expr",
            IntegerLiteral(_) => "integer",
            FloatLiteral(_) => "float",
            StringLiteral(_) => "string",
            BoolLiteral(_) => "bool",
            CharLiteral(_) => "char",
            UnitLiteral => "unit",
            Identifier(_) => "identifier",
            BaseType(_) => "base-type",
            SliceType { .. } => "slice-type",
            ArrayType { .. } => "array-type",
            PtrType { .. } => "ptr-type",
            StructType { .. } => "struct-type",
            TupleType { .. } => "tuple-type",
            ResultType { .. } => "result-type",
            OptionType { .. } => "option-type",
            TaskHandleType { .. } => "task-handle-type",
            WildcardPattern => "wildcard-pattern",
            IdentifierPattern(_) => "identifier-pattern",
            LiteralPattern(_) => "literal-pattern",
            TuplePattern(_) => "tuple-pattern",
            StructPattern { .. } => "struct-pattern",
            FieldPattern { .. } => "field-pattern",
            EnumPattern { .. } => "enum-pattern",
            Annotation { .. } => "annotation",
        }
    }

    /// In-order traversal returning the first descendant (self included)
    /// whose kind and name both match (spec §4.3 "Find-by-kind-and-name").
    pub fn find_by_kind_and_name(&self, kind_name: &str, name: &str) -> Option<&Node> {
        if self.kind_name() == kind_name && self.name() == Some(name) {
            return Some(self);
        }
        for child in self.children() {
            if let Some(found) = child.find_by_kind_and_name(kind_name, name) {
                return Some(found);
            }
        }
        None
    }

    /// Deterministic indented rendering, primarily for tests (spec §4.3
    /// "Pretty-print"). Independent of terminal width/colour detection.
    pub fn pretty_print(&self) -> String {
        print::render(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceId;

    fn loc(offset: usize) -> SourceLocation {
        SourceLocation::new(SourceId::new("t.asthra"), 1, offset + 1, offset)
    }

    fn ident(name: &str, offset: usize) -> Node {
        Node::new(NodeKind::Identifier(name.to_string()), loc(offset))
    }

    fn sample_program() -> Node {
        let package = Node::new(
            NodeKind::PackageDecl {
                name: "main".to_string(),
            },
            loc(0),
        );
        let func = Node::new(
            NodeKind::FunctionDecl {
                visibility: Visibility::Pub,
                name: "entry".to_string(),
                params: Members::Absent,
                return_type: Node::new(NodeKind::BaseType("void".to_string()), loc(10)).boxed(),
                body: Node::new(NodeKind::Block { statements: vec![] }, loc(20)).boxed(),
                annotations: vec![],
            },
            loc(5),
        );
        Node::new(
            NodeKind::Program {
                package: package.boxed(),
                imports: vec![],
                declarations: vec![func],
            },
            loc(0),
        )
    }

    #[test]
    fn children_visit_in_source_order() {
        let program = sample_program();
        let kinds: Vec<&'static str> = program.children().iter().map(|c| c.kind_name()).collect();
        assert_eq!(kinds, vec!["package-decl", "function-decl"]);
    }

    #[test]
    fn find_by_kind_and_name_locates_nested_declaration() {
        let program = sample_program();
        let found = program
            .find_by_kind_and_name("function-decl", "entry")
            .expect("function should be found");
        assert_eq!(found.kind_name(), "function-decl");

        assert!(program.find_by_kind_and_name("function-decl", "missing").is_none());
    }

    #[test]
    fn members_absent_has_no_items() {
        let absent: Members<Node> = Members::Absent;
        assert!(absent.is_absent());
        assert!(absent.as_slice().is_empty());

        let items = Members::Items(vec![ident("x", 0)]);
        assert!(!items.is_absent());
        assert_eq!(items.as_slice().len(), 1);
    }

    #[test]
    fn clone_produces_an_independent_subtree() {
        let program = sample_program();
        let mut cloned = program.clone();
        if let NodeKind::Program { declarations, .. } = &mut cloned.kind {
            declarations.clear();
        }
        if let NodeKind::Program { declarations, .. } = &program.kind {
            assert_eq!(declarations.len(), 1, "original must be unaffected by clone mutation");
        } else {
            unreachable!();
        }
    }

    #[test]
    fn clone_shares_the_type_info_slot() {
        let program = sample_program();
        let cloned = program.clone();
        cloned.type_info.set(TypeInfo {
            description: "resolved".to_string(),
        });
        assert_eq!(
            program.type_info.get().map(|t| t.description),
            Some("resolved".to_string())
        );
    }

    #[test]
    fn pretty_print_mentions_each_declaration() {
        let program = sample_program();
        let rendered = program.pretty_print();
        assert!(rendered.contains("package-decl"));
        assert!(rendered.contains("function-decl"));
    }
}
