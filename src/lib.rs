//! Compiler from a small rule-specification language to standalone
//! matchers.
//!
//! A specification is a list of named rule definitions followed by one
//! match expression: regex-like syntax with literals, `%xHHHH;` unicode
//! escapes, character classes, grouping, alternation, repetition, the
//! byte wildcard `.`, `${name}` substitution, and top-level conjunction
//! (`&`) and negation (`!`). The compiler builds a Thompson-style NFA
//! per top-level sub-expression and either runs it in memory over an
//! input buffer or emits a self-contained Rust program that prints
//! `ACCEPTS` or `REJECTS` for an input file.

pub mod core;
pub mod errors;

pub use crate::core::nfa::Program;
pub use crate::core::{build, BuildArtifacts};
pub use crate::errors::BuildError;
