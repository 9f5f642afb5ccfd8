use std::iter::Peekable;
use std::str::CharIndices;

use crate::core::tokens::{Token, TokenKind};
use crate::errors::ScanError;

/// Lexical analysis over a specification source, producing a token stream.
///
/// Unescaped spaces and tabs outside character classes are insignificant;
/// inside a class every character other than `]`, `-`, `\` and `%x…;`
/// escapes is taken literally. Line breaks separate rule definitions.
///
/// # Errors
///
/// Returns a [`ScanError`] for dangling escapes, for `%x…;` and `${…}`
/// constructs left open, and for classes broken by a line break.
pub fn lex(input: &str) -> Result<Vec<Token>, ScanError> {
    let mut tokens = Vec::new();
    let mut iter = input.char_indices().peekable();
    let mut in_class = false;

    while let Some((idx, ch)) = iter.next() {
        let pos = idx + 1;
        if in_class {
            let kind = match ch {
                ']' => {
                    in_class = false;
                    TokenKind::RBracket
                }
                '-' => TokenKind::Minus,
                '\\' => escaped(pos, &mut iter)?,
                '%' => unicode_or_char(pos, &mut iter)?,
                '\n' => return Err(ScanError::BrokenClass(pos)),
                _ => TokenKind::Char(ch),
            };
            tokens.push(Token::new(kind, pos));
            continue;
        }

        let kind = match ch {
            ' ' | '\t' | '\r' => continue,
            '\n' => TokenKind::Newline,
            '\\' => escaped(pos, &mut iter)?,
            '|' => TokenKind::Or,
            '&' => TokenKind::Amp,
            '!' => TokenKind::Bang,
            '*' => TokenKind::Star,
            '+' => TokenKind::Plus,
            '?' => TokenKind::QMark,
            '.' => TokenKind::Dot,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '=' => TokenKind::Equals,
            ']' => TokenKind::RBracket,
            '[' => {
                in_class = true;
                if iter.next_if(|&(_, c)| c == '^').is_some() {
                    TokenKind::NegLBracket
                } else {
                    TokenKind::LBracket
                }
            }
            '$' => substitution_or_char(pos, &mut iter)?,
            '%' => unicode_or_char(pos, &mut iter)?,
            _ => TokenKind::Char(ch),
        };
        tokens.push(Token::new(kind, pos));
    }

    // A class left open at the end of the source surfaces as a parse
    // error on the end-of-stream marker.
    tokens.push(Token::new(TokenKind::Eos, input.len() + 1));
    Ok(tokens)
}

/// Resolves a backslash escape to the literal character that follows it.
fn escaped(pos: usize, iter: &mut Peekable<CharIndices<'_>>) -> Result<TokenKind, ScanError> {
    let (_, next) = iter.next().ok_or(ScanError::DanglingEscape(pos))?;
    Ok(TokenKind::Char(next))
}

/// Scans `%xHHHH;` into a raw [`TokenKind::Unicode`] token. A `%` not
/// introducing an escape is a plain character.
fn unicode_or_char(pos: usize, iter: &mut Peekable<CharIndices<'_>>) -> Result<TokenKind, ScanError> {
    if iter.next_if(|&(_, c)| c == 'x' || c == 'X').is_none() {
        return Ok(TokenKind::Char('%'));
    }
    let mut text = String::from("%x");
    for (_, c) in iter.by_ref() {
        if c == ';' {
            text.push(';');
            return Ok(TokenKind::Unicode(text));
        }
        if c == '\n' {
            break;
        }
        text.push(c);
    }
    Err(ScanError::OpenUnicodeEscape(pos))
}

/// Scans `${name}` into a [`TokenKind::Subst`] token. A `$` not followed
/// by `{` is a plain character.
fn substitution_or_char(
    pos: usize,
    iter: &mut Peekable<CharIndices<'_>>,
) -> Result<TokenKind, ScanError> {
    if iter.next_if(|&(_, c)| c == '{').is_none() {
        return Ok(TokenKind::Char('$'));
    }
    let mut name = String::new();
    for (_, c) in iter.by_ref() {
        if c == '}' {
            return Ok(TokenKind::Subst(name));
        }
        if c == '\n' {
            break;
        }
        name.push(c);
    }
    Err(ScanError::OpenSubstitution(pos))
}
