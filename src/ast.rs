// AST definitions for the teaching-language interpreter.
//
// The textual grammar and parser are external; this module is the contract
// they produce.  Every sentence and expression carries the source line it
// came from, which error reporting threads through diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which basic shape a literal token has.  The raw text is parsed into a
/// runtime value only when the literal is evaluated, so a malformed literal
/// is an evaluation-time error rather than a construction-time panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiteralKind {
    Int,
    Real,
    Bool,
    Char,
    Null,
    /// A bare enum constant name, e.g. `blue`.
    EnumConstant,
}

/// A literal as it appeared in source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub kind: LiteralKind,
    pub raw: String,
    pub line: usize,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    Neg, // -x
    Pos, // +x
    Not, // !x
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Logical
    And,
    Or,
    // Equality
    Eq,
    Ne,
    // Ordering
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
        };
        write!(f, "{}", symbol)
    }
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            UnOp::Neg => "-",
            UnOp::Pos => "+",
            UnOp::Not => "!",
        };
        write!(f, "{}", symbol)
    }
}

/// One step of a variable access path: `*v`, `v[i, j]`, `v.field`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AccessStep {
    Dereference,
    Index(Vec<Expr>),
    Field(String),
}

/// A variable reference: a root name plus an ordered access path that is
/// walked step by step to reach a concrete memory cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub path: Vec<AccessStep>,
    pub line: usize,
}

impl Variable {
    /// A plain reference with no access path.
    pub fn plain(name: impl Into<String>, line: usize) -> Self {
        Variable {
            name: name.into(),
            path: Vec::new(),
            line,
        }
    }
}

/// Expression nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal),
    Variable(Variable),
    UnaryOp {
        op: UnOp,
        operand: Box<Expr>,
        line: usize,
    },
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        line: usize,
    },
}

impl Expr {
    /// Get the source line of this expression
    pub fn line(&self) -> usize {
        match self {
            Expr::Literal(lit) => lit.line,
            Expr::Variable(var) => var.line,
            Expr::UnaryOp { line, .. } => *line,
            Expr::BinaryOp { line, .. } => *line,
        }
    }
}

/// A syntactic type expression, resolved against the
/// [`TypeRegistry`](crate::types::registry::TypeRegistry) when the
/// declaration or typedef carrying it is processed.  Array bounds stay
/// unevaluated expressions until declaration time so they may reference
/// earlier program variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeSpec {
    /// A builtin (`int`, `bool`, `real`, `char`) or previously registered name.
    Named(String),
    PointerOf(Box<TypeSpec>),
    ArrayOf {
        of: Box<TypeSpec>,
        /// `(from, to)` bound expressions, one pair per axis.
        axes: Vec<(Expr, Expr)>,
    },
    Tuple {
        fields: Vec<(String, TypeSpec)>,
    },
    Enum {
        constants: Vec<String>,
    },
}

/// A `type name = ...` declaration from the typedef section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    pub spec: TypeSpec,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunProcKind {
    Function,
    Procedure,
}

/// Function/procedure declarations are carried in the AST and indexed by
/// name, but their bodies are never evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunProcDef {
    pub name: String,
    pub kind: FunProcKind,
    pub line: usize,
}

/// A `var name : type` declaration from the body's declaration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDeclaration {
    pub name: String,
    pub spec: TypeSpec,
    pub line: usize,
}

/// Statement nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Sentence {
    Skip {
        line: usize,
    },
    VarDeclaration(VarDeclaration),
    Assignment {
        dest: Variable,
        expr: Expr,
        line: usize,
    },
    /// `alloc(v)` / `free(v)`
    BuiltinCall {
        name: String,
        args: Vec<Expr>,
        line: usize,
    },
    If {
        guard: Expr,
        then_body: Vec<Sentence>,
        else_body: Vec<Sentence>,
        line: usize,
    },
    While {
        guard: Expr,
        body: Vec<Sentence>,
        line: usize,
    },
}

impl Sentence {
    /// Get the source line of this sentence
    pub fn line(&self) -> usize {
        match self {
            Sentence::Skip { line } => *line,
            Sentence::VarDeclaration(decl) => decl.line,
            Sentence::Assignment { line, .. } => *line,
            Sentence::BuiltinCall { line, .. } => *line,
            Sentence::If { line, .. } => *line,
            Sentence::While { line, .. } => *line,
        }
    }
}

/// The body of a program: declarations first, then the executable sentences.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Body {
    pub declarations: Vec<VarDeclaration>,
    pub sentences: Vec<Sentence>,
}

/// Top-level program structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub typedefs: Vec<TypeDef>,
    pub funprocdefs: Vec<FunProcDef>,
    pub body: Body,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }
}
