//! The abstract syntax tree the external effect parser produces.
//!
//! The effect DSL is a thin declarative layer over a shading-language file:
//! `technique` blocks contain `pass` blocks, and a pass body is a sequence of
//! statements — either assignments (`VertexShader = CompileShader(vs_5_0,
//! VSMain());`, `BlendColor = float4(0, 0, 0, 1);`) or bare method calls
//! (`SetVertexShader(...)`). Everything outside technique blocks is plain
//! shading-language code; the parser strips the technique blocks and hands
//! the remaining preprocessed text over as [`Shader::body`].
//!
//! The expression grammar is closed: a handful of tagged variants dispatched
//! by exhaustive match. Adding a new expression shape is a compile-time
//! checked change, not a runtime type probe.
//!
//! Lexing, parsing, and include resolution live outside this workspace; this
//! module is the contract those collaborators must satisfy.

use crate::foundation::Span;
use serde::{Deserialize, Serialize};

/// Root node: one parsed effect source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shader {
    /// Preprocessed shading-language text with technique blocks removed.
    ///
    /// This is the source handed to the shader backend for every stage
    /// compiled from this file.
    pub body: String,
    /// Technique blocks in source order.
    pub techniques: Vec<Technique>,
    pub span: Span,
}

/// A `technique <name> { ... }` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technique {
    pub name: Ident,
    pub passes: Vec<Pass>,
    pub span: Span,
}

/// A `pass <name> { ... }` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pass {
    pub name: Ident,
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// One statement inside a pass body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// `Name = expression;`
    Assignment {
        name: Ident,
        value: Expression,
        span: Span,
    },
    /// `Name(args...);`
    Call(MethodCall),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Assignment { span, .. } => *span,
            Statement::Call(call) => call.span,
        }
    }
}

/// A named identifier with its location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// The closed expression grammar of pass statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Literal(Literal, Span),
    Identifier(Ident),
    /// `{ e0, e1, ... }`
    ArrayInitializer(Vec<Expression>, Span),
    MethodCall(MethodCall),
    /// `Compile(profile, Entry())` / `CompileShader(profile, Entry())`
    /// when the parser recognizes the form directly.
    Compile(CompileExpr),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Literal(_, span) => *span,
            Expression::Identifier(ident) => ident.span,
            Expression::ArrayInitializer(_, span) => *span,
            Expression::MethodCall(call) => call.span,
            Expression::Compile(compile) => compile.span,
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Number(f64),
    String(String),
    Bool(bool),
    Null,
}

/// `name(arg0, arg1, ...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub name: Ident,
    pub args: Vec<Expression>,
    pub span: Span,
}

/// A recognized compile expression: target profile plus entry-point call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileExpr {
    /// Target profile identifier (`vs_5_0`, ...). Recorded for tooling;
    /// stage compilation uses the effect-level `Profile`.
    pub profile: Ident,
    /// The entry-point call. Must take zero arguments.
    pub entry: MethodCall,
    pub span: Span,
}
