//! Sentence evaluation
//!
//! One sentence in, zero or more sentences out: evaluating a sentence applies
//! its effect to the [`State`](crate::interpreter::state::State) and returns
//! the sentences it injects for the driver to run next.  Control flow never
//! recurses — `if` returns the chosen branch and `while` returns its body
//! followed by itself, so a loop's guard is re-evaluated fresh each
//! iteration by the flat driver queue.

use crate::ast::{Expr, Sentence, VarDeclaration};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{type_mismatch, ErrorKind, RuntimeError};
use crate::interpreter::state::State;

impl Interpreter {
    pub(crate) fn eval_sentence(
        &self,
        sentence: &Sentence,
        state: &mut State,
    ) -> Result<Vec<Sentence>, RuntimeError> {
        match sentence {
            Sentence::Skip { .. } => Ok(Vec::new()),
            Sentence::VarDeclaration(decl) => {
                self.execute_var_declaration(decl, state)?;
                Ok(Vec::new())
            }
            Sentence::Assignment { dest, expr, .. } => {
                let value = self.evaluator.eval(expr, state)?;
                state.set_variable_value(dest, value, &self.evaluator)?;
                Ok(Vec::new())
            }
            Sentence::BuiltinCall { name, args, .. } => {
                self.execute_builtin(name, args, state)?;
                Ok(Vec::new())
            }
            Sentence::If {
                guard,
                then_body,
                else_body,
                ..
            } => {
                if self.eval_guard(guard, state)? {
                    Ok(then_body.clone())
                } else {
                    Ok(else_body.clone())
                }
            }
            Sentence::While { guard, body, .. } => {
                if self.eval_guard(guard, state)? {
                    let mut next = body.clone();
                    next.push(sentence.clone());
                    Ok(next)
                } else {
                    Ok(Vec::new())
                }
            }
        }
    }

    /// Guards must evaluate to a `bool`; anything else is a type mismatch,
    /// not a truthiness coercion.
    fn eval_guard(&self, guard: &Expr, state: &State) -> Result<bool, RuntimeError> {
        let value = self.evaluator.eval(guard, state)?;
        value
            .as_bool()
            .ok_or_else(|| type_mismatch("bool guard", value.kind_name()).at(guard.line()))
    }

    pub(crate) fn execute_var_declaration(
        &self,
        decl: &VarDeclaration,
        state: &mut State,
    ) -> Result<(), RuntimeError> {
        let mut ty = self.registry.resolve_spec(&decl.spec)?;
        ty.eval_axes(&self.evaluator, state)?;
        self.limiter.check_type_sizing(&ty)?;
        state.declare_static_variable(&decl.name, ty)?;
        self.limiter.check_memory(state)
    }

    fn execute_builtin(
        &self,
        name: &str,
        args: &[Expr],
        state: &mut State,
    ) -> Result<(), RuntimeError> {
        let var = match args {
            [Expr::Variable(var)] => var,
            _ => {
                return Err(ErrorKind::Evaluation(format!(
                    "{} expects a single variable reference",
                    name
                ))
                .into())
            }
        };
        match name {
            "alloc" => {
                state.alloc(var, &self.evaluator)?;
                self.limiter.check_memory(state)
            }
            "free" => state.free(var, &self.evaluator).map(|_| ()),
            other => Err(ErrorKind::Evaluation(format!("unknown builtin '{}'", other)).into()),
        }
    }
}
