//! `rox`: a tree-walking interpreter for the Lox language.
//!
//! Source text flows through four stages:
//!
//! ```text
//! scanner ─▶ parser ─▶ resolver ─▶ interpreter
//!  tokens     AST      hop table    effects
//! ```
//!
//! [`Lox`] drives the whole pipeline and keeps interpreter state alive
//! between runs, which is what the REPL relies on.

pub mod ast;
pub mod ast_printer;
pub mod class;
pub mod environment;
pub mod error;
pub mod function;
pub mod instance;
pub mod interpreter;
pub mod native;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod value;

use std::io::{BufRead, Write};

use log::{debug, info};

use crate::ast::{ExprIds, Stmt};
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;

pub use crate::error::LoxError;
pub use crate::value::Value;

/// Pipeline driver owning a persistent interpreter.
pub struct Lox {
    ids: ExprIds,
    interpreter: Interpreter,
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lox {
    /// Driver printing to stdout and reading from stdin.
    pub fn new() -> Self {
        Self {
            ids: ExprIds::new(),
            interpreter: Interpreter::new(),
        }
    }

    /// Driver with a custom output sink and input source.
    pub fn with_io(output: Box<dyn Write>, input: Box<dyn BufRead>) -> Self {
        Self {
            ids: ExprIds::new(),
            interpreter: Interpreter::with_io(output, input),
        }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Scan and parse `source`.  All scan and parse errors are reported
    /// together; the statements come back only if there were none.
    pub fn parse(&mut self, source: &str) -> Result<Vec<Stmt>, Vec<LoxError>> {
        let (tokens, mut errors) = scanner::scan_tokens(source);

        debug!(
            "Scanned {} token(s) with {} error(s)",
            tokens.len(),
            errors.len()
        );

        let mut parser = Parser::new(&tokens, &mut self.ids);
        let statements: Vec<Stmt> = parser.parse();
        errors.extend(parser.take_errors());

        if errors.is_empty() {
            Ok(statements)
        } else {
            info!("Static analysis failed with {} error(s)", errors.len());

            Err(errors)
        }
    }

    /// Run `source` to completion.  Static errors are all returned and
    /// nothing executes; a runtime error stops execution and is returned
    /// alone.
    pub fn run(&mut self, source: &str) -> Result<(), Vec<LoxError>> {
        let statements: Vec<Stmt> = self.parse(source)?;

        let locals = Resolver::new().resolve(&statements)?;
        self.interpreter.resolve(locals);

        self.interpreter.interpret(&statements).map_err(|e| vec![e])
    }
}
