// Shared AST factories for the integration tests.  The textual parser lives
// outside this crate, so tests build programs directly.

#![allow(dead_code)]

use tiza::ast::{
    AccessStep, BinOp, Body, Expr, Literal, LiteralKind, Program, Sentence, TypeDef, TypeSpec,
    VarDeclaration, Variable,
};
use tiza::interpreter::engine::Interpreter;
use tiza::interpreter::errors::RuntimeError;
use tiza::interpreter::state::State;

pub fn int_lit(n: i64, line: usize) -> Expr {
    Expr::Literal(Literal {
        kind: LiteralKind::Int,
        raw: n.to_string(),
        line,
    })
}

pub fn real_lit(raw: &str, line: usize) -> Expr {
    Expr::Literal(Literal {
        kind: LiteralKind::Real,
        raw: raw.to_string(),
        line,
    })
}

pub fn bool_lit(b: bool, line: usize) -> Expr {
    Expr::Literal(Literal {
        kind: LiteralKind::Bool,
        raw: b.to_string(),
        line,
    })
}

pub fn null_lit(line: usize) -> Expr {
    Expr::Literal(Literal {
        kind: LiteralKind::Null,
        raw: "null".to_string(),
        line,
    })
}

pub fn enum_lit(name: &str, line: usize) -> Expr {
    Expr::Literal(Literal {
        kind: LiteralKind::EnumConstant,
        raw: name.to_string(),
        line,
    })
}

pub fn var_expr(name: &str, line: usize) -> Expr {
    Expr::Variable(Variable::plain(name, line))
}

pub fn deref(name: &str, line: usize) -> Variable {
    Variable {
        name: name.to_string(),
        path: vec![AccessStep::Dereference],
        line,
    }
}

pub fn indexed(name: &str, indices: Vec<Expr>, line: usize) -> Variable {
    Variable {
        name: name.to_string(),
        path: vec![AccessStep::Index(indices)],
        line,
    }
}

pub fn field(name: &str, field: &str, line: usize) -> Variable {
    Variable {
        name: name.to_string(),
        path: vec![AccessStep::Field(field.to_string())],
        line,
    }
}

pub fn binop(op: BinOp, left: Expr, right: Expr, line: usize) -> Expr {
    Expr::BinaryOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
        line,
    }
}

pub fn named(name: &str) -> TypeSpec {
    TypeSpec::Named(name.to_string())
}

pub fn pointer_of(of: TypeSpec) -> TypeSpec {
    TypeSpec::PointerOf(Box::new(of))
}

/// Array spec with literal integer bounds.
pub fn array_of(of: TypeSpec, axes: &[(i64, i64)]) -> TypeSpec {
    TypeSpec::ArrayOf {
        of: Box::new(of),
        axes: axes
            .iter()
            .map(|&(from, to)| (int_lit(from, 1), int_lit(to, 1)))
            .collect(),
    }
}

pub fn decl(name: &str, spec: TypeSpec, line: usize) -> VarDeclaration {
    VarDeclaration {
        name: name.to_string(),
        spec,
        line,
    }
}

pub fn typedef(name: &str, spec: TypeSpec, line: usize) -> TypeDef {
    TypeDef {
        name: name.to_string(),
        spec,
        line,
    }
}

pub fn assign(name: &str, expr: Expr, line: usize) -> Sentence {
    Sentence::Assignment {
        dest: Variable::plain(name, line),
        expr,
        line,
    }
}

pub fn assign_to(dest: Variable, expr: Expr, line: usize) -> Sentence {
    Sentence::Assignment { dest, expr, line }
}

pub fn builtin(name: &str, var: Variable, line: usize) -> Sentence {
    Sentence::BuiltinCall {
        name: name.to_string(),
        args: vec![Expr::Variable(var)],
        line,
    }
}

pub fn program(declarations: Vec<VarDeclaration>, sentences: Vec<Sentence>) -> Program {
    Program {
        typedefs: Vec::new(),
        funprocdefs: Vec::new(),
        body: Body {
            declarations,
            sentences,
        },
    }
}

pub fn program_with_typedefs(
    typedefs: Vec<TypeDef>,
    declarations: Vec<VarDeclaration>,
    sentences: Vec<Sentence>,
) -> Program {
    Program {
        typedefs,
        funprocdefs: Vec::new(),
        body: Body {
            declarations,
            sentences,
        },
    }
}

pub fn run(program: Program) -> Result<State, RuntimeError> {
    Interpreter::new(program).run()
}
