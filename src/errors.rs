use thiserror::Error;

/// 1-indexed byte offset into the specification source.
pub type Offset = usize;

/// Failure while scanning source text into tokens. Each variant records
/// the offset of the construct that never finished.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// A `\` with nothing after it.
    #[error("dangling escape at offset {0}")]
    DanglingEscape(Offset),
    /// A `%x` escape with no closing `;` on its line.
    #[error("unterminated unicode escape at offset {0}")]
    OpenUnicodeEscape(Offset),
    /// A `${` substitution with no closing `}` on its line.
    #[error("unterminated substitution at offset {0}")]
    OpenSubstitution(Offset),
    /// A character class interrupted by a line break.
    #[error("character class broken by a line break at offset {0}")]
    BrokenClass(Offset),
}

/// Failure while shaping tokens into a syntax tree, anchored to the
/// offset of the token that derailed the parse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The source stopped where more expression was required.
    #[error("input ended in the middle of an expression at offset {0}")]
    EarlyEnd(Offset),
    /// A token that cannot appear where it did.
    #[error("stray {token} at offset {at}")]
    Stray { at: Offset, token: String },
    /// A `(` whose `)` never arrived.
    #[error("unclosed group at offset {0}")]
    UnclosedGroup(Offset),
    /// A `[` whose `]` never arrived.
    #[error("unclosed character class at offset {0}")]
    UnclosedClass(Offset),
    /// A `*`, `+` or `?` with nothing in front of it to repeat.
    #[error("postfix operator with nothing to repeat at offset {0}")]
    DanglingPostfix(Offset),
    /// An alternative or whole expression with no atoms in it.
    #[error("expression expected at offset {0}")]
    MissingExpression(Offset),
}

/// Anything that can stop a specification from becoming a matcher.
#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("unknown rule name {0:?}")]
    UnknownRule(String),
    #[error("too many top-level automata (limit {0})")]
    CapacityExceeded(usize),
    #[error("malformed unicode escape {0:?}")]
    BadUnicodeEscape(String),
}
