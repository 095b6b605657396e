//! The execution driver
//!
//! [`Interpreter`] owns everything a run needs: the program, the type
//! registry, the limiter, and the observer hooks.  Execution is a flat work
//! queue of sentences — no recursion, no call stack.  Each step pops the
//! front sentence, evaluates it, and pushes whatever sentences it injected
//! back onto the front in order.  `while` re-enqueues itself after its body,
//! which is the whole looping mechanism.
//!
//! # Observer hooks
//!
//! Pre-hooks fire before each sentence with the previously executed sentence
//! (if any), the current state, and the sentence about to run.  Post-hooks
//! fire after with the executed sentence and the updated state.  Hooks
//! observe; they cannot veto or rewrite execution.

use crate::ast::{FunProcDef, Program, Sentence};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::expressions::ExpressionEvaluator;
use crate::interpreter::limits::{Limiter, Limits};
use crate::interpreter::state::State;
use crate::types::registry::TypeRegistry;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Called before a sentence runs: previously executed sentence, current
/// state, next sentence.
pub type PreHook = Box<dyn FnMut(Option<&Sentence>, &State, &Sentence)>;

/// Called after a sentence ran: the sentence and the updated state.
pub type PostHook = Box<dyn FnMut(&Sentence, &State)>;

pub struct Interpreter {
    program: Program,
    pub(crate) registry: TypeRegistry,
    pub(crate) limiter: Limiter,
    pub(crate) evaluator: ExpressionEvaluator,
    funprocs: FxHashMap<String, FunProcDef>,
    pre_hooks: Vec<PreHook>,
    post_hooks: Vec<PostHook>,
    execution_counter: u64,
}

impl Interpreter {
    pub fn new(program: Program) -> Self {
        Self::with_limits(program, Limits::default())
    }

    /// Like [`new`](Self::new), but layering `limits.toml` and
    /// `TIZA_LIMITS_FILE` over the default limits.
    pub fn with_discovered_limits(program: Program) -> Result<Self, RuntimeError> {
        Ok(Self::with_limits(program, Limits::discover()?))
    }

    pub fn with_limits(program: Program, limits: Limits) -> Self {
        Interpreter {
            program,
            registry: TypeRegistry::new(),
            limiter: Limiter::new(limits),
            evaluator: ExpressionEvaluator::new(),
            funprocs: FxHashMap::default(),
            pre_hooks: Vec::new(),
            post_hooks: Vec::new(),
            execution_counter: 0,
        }
    }

    pub fn add_pre_hook(&mut self, hook: PreHook) {
        self.pre_hooks.push(hook);
    }

    pub fn add_post_hook(&mut self, hook: PostHook) {
        self.post_hooks.push(hook);
    }

    /// The registry for this interpreter, populated during [`run`](Self::run).
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Sentences executed by the latest run, loop iterations included.
    pub fn steps_executed(&self) -> u64 {
        self.execution_counter
    }

    /// Execute the program from a fresh state and return the final state.
    ///
    /// The registry is reset first, so repeated runs of one interpreter are
    /// independent.  Any error aborts the run with the offending line
    /// attached.
    pub fn run(&mut self) -> Result<State, RuntimeError> {
        self.registry.reset();
        self.funprocs.clear();
        self.execution_counter = 0;

        let typedefs = self.program.typedefs.clone();
        for typedef in &typedefs {
            self.registry
                .register_typedef(&typedef.name, &typedef.spec)
                .map_err(|e| e.at(typedef.line))?;
            let ty = self.registry.lookup(&typedef.name)?.clone();
            self.limiter
                .check_type_sizing(&ty)
                .map_err(|e| e.at(typedef.line))?;
        }
        for def in &self.program.funprocdefs {
            self.funprocs.insert(def.name.clone(), def.clone());
        }
        debug!(
            typedefs = typedefs.len(),
            declarations = self.program.body.declarations.len(),
            sentences = self.program.body.sentences.len(),
            "starting run"
        );

        let mut state = State::new();
        let mut queue: VecDeque<Sentence> = self
            .program
            .body
            .declarations
            .iter()
            .cloned()
            .map(Sentence::VarDeclaration)
            .chain(self.program.body.sentences.iter().cloned())
            .collect();
        let mut previous: Option<Sentence> = None;

        while let Some(sentence) = queue.pop_front() {
            self.execution_counter += 1;
            self.limiter
                .check_execution_steps(self.execution_counter)
                .map_err(|e| e.at(sentence.line()))?;
            for hook in &mut self.pre_hooks {
                hook(previous.as_ref(), &state, &sentence);
            }
            trace!(step = self.execution_counter, line = sentence.line(), "executing sentence");
            let injected = self
                .eval_sentence(&sentence, &mut state)
                .map_err(|e| e.at(sentence.line()))?;
            for next in injected.into_iter().rev() {
                queue.push_front(next);
            }
            for hook in &mut self.post_hooks {
                hook(&sentence, &state);
            }
            previous = Some(sentence);
        }
        debug!(steps = self.execution_counter, "run finished");
        Ok(state)
    }
}
