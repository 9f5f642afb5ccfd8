pub mod ast;
pub mod automaton;
pub mod class;
pub mod emit;
pub mod lexer;
pub mod nfa;
pub mod parser;
pub mod sim;
pub mod symbols;
pub mod tokens;

use self::nfa::Program;
use self::parser::ParsedSpec;
use crate::errors::BuildError;

/// Aggregates the products of compiling one specification source.
#[derive(Debug, Clone)]
pub struct BuildArtifacts {
    /// The parsed rule definitions and top-level expression.
    pub spec: ParsedSpec,
    /// The compiled automaton program.
    pub program: Program,
}

/// Runs the whole pipeline: lex, parse, and compile a specification.
///
/// # Errors
///
/// Returns a [`BuildError`] from whichever stage fails first.
pub fn build(source: &str) -> Result<BuildArtifacts, BuildError> {
    let spec = ParsedSpec::build(source)?;
    let program = nfa::compile(&spec)?;
    Ok(BuildArtifacts { spec, program })
}
