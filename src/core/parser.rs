use crate::core::ast::Node;
use crate::core::lexer;
use crate::core::symbols::SymbolTable;
use crate::core::tokens::{Token, TokenKind};
use crate::errors::{BuildError, ParseError};

/// A parsed specification: the named rule definitions and the top-level
/// match expression, wrapped in a root node.
#[derive(Debug, Clone)]
pub struct ParsedSpec {
    pub symbols: SymbolTable,
    pub root: Node,
}

impl ParsedSpec {
    /// Lexes and parses a specification source in one call.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] wrapping the underlying lex or parse error.
    pub fn build(source: &str) -> Result<ParsedSpec, BuildError> {
        let tokens = lexer::lex(source)?;
        Ok(parse(&tokens)?)
    }
}

/// Converts a token stream into a [`ParsedSpec`] using recursive descent.
///
/// Each leading `name = expression` line defines a rule; the final line
/// is the top-level expression. Conjunction (`&`) binds loosest, then
/// negation (`!`), then alternation (`|`), then sequencing, with the
/// postfix operators tightest.
pub fn parse(tokens: &[Token]) -> Result<ParsedSpec, ParseError> {
    let mut parser = Parser::new(tokens);
    let mut symbols = SymbolTable::new();

    loop {
        parser.skip_newlines();
        match parser.take_definition_name() {
            Some(name) => {
                // Rule bodies stop at alternation level: conjunction and
                // negation only compose at the top of a specification.
                let body = parser.parse_alt()?;
                parser.expect_line_end()?;
                symbols.define(name, body);
            }
            None => break,
        }
    }

    let expr = parser.parse_clause()?;
    parser.skip_newlines();
    parser.expect_eos()?;
    Ok(ParsedSpec {
        symbols,
        root: Node::root(expr),
    })
}

/// Stateful parser over a token slice.
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Consumes a leading `name =` when the current line is a definition.
    fn take_definition_name(&mut self) -> Option<String> {
        let mut lookahead = self.pos;
        let mut name = String::new();
        while let Some(token) = self.tokens.get(lookahead) {
            match token.kind {
                TokenKind::Char(c) if c.is_alphanumeric() || c == '_' => {
                    name.push(c);
                    lookahead += 1;
                }
                _ => break,
            }
        }
        if name.is_empty() || !matches!(self.tokens.get(lookahead).map(|t| &t.kind), Some(TokenKind::Equals)) {
            return None;
        }
        self.pos = lookahead + 1;
        Some(name)
    }

    /// Parses a conjunction (`lhs & rhs`), the loosest binding level.
    fn parse_clause(&mut self) -> Result<Node, ParseError> {
        let mut node = self.parse_term()?;
        while self.eat(&TokenKind::Amp) {
            let rhs = self.parse_term()?;
            node = Node::and(node, rhs);
        }
        Ok(node)
    }

    /// Parses an optionally negated alternation.
    fn parse_term(&mut self) -> Result<Node, ParseError> {
        if self.eat(&TokenKind::Bang) {
            let inner = self.parse_alt()?;
            return Ok(Node::not(inner));
        }
        self.parse_alt()
    }

    /// Parses an alternation (`lhs | rhs`).
    fn parse_alt(&mut self) -> Result<Node, ParseError> {
        let mut node = self.parse_seq()?;
        while self.eat(&TokenKind::Or) {
            let rhs = self.parse_seq()?;
            node = Node::alt(node, rhs);
        }
        Ok(node)
    }

    /// Parses implicit sequencing of atoms. Adjacent literal units chain
    /// as pairs; anything else sequences.
    fn parse_seq(&mut self) -> Result<Node, ParseError> {
        let mut nodes = Vec::new();
        while self.can_start_atom() {
            nodes.push(self.parse_repeat()?);
        }
        match nodes.len() {
            0 => {
                if self.peek_is_postfix() {
                    Err(ParseError::DanglingPostfix(self.offset_here()))
                } else {
                    Err(ParseError::MissingExpression(self.offset_here()))
                }
            }
            _ => Ok(chain_sequence(nodes)),
        }
    }

    /// Parses unary postfix operators (`*`, `+`, `?`).
    ///
    /// A postfix operator binds to the preceding atom only; a
    /// multi-character literal run contributes just its final character,
    /// so `ab*` reads as `a` then `b*`.
    fn parse_repeat(&mut self) -> Result<Node, ParseError> {
        let mut node = self.parse_atom()?;
        let mut prefix = None;
        if self.peek_is_postfix() {
            if let Some((head, tail)) = split_literal_run(&node) {
                prefix = Some(head);
                node = tail;
            }
        }
        while let Some(op) = self.next_repetition() {
            node = Node::repeat(op, node);
        }
        Ok(match prefix {
            Some(head) => Node::seq(head, node),
            None => node,
        })
    }

    /// Determines whether the current token may begin an atom.
    fn can_start_atom(&self) -> bool {
        matches!(
            self.peek_kind(),
            Some(
                TokenKind::Char(_)
                    | TokenKind::Unicode(_)
                    | TokenKind::Subst(_)
                    | TokenKind::Dot
                    | TokenKind::LParen
                    | TokenKind::LBracket
                    | TokenKind::NegLBracket
            )
        )
    }

    /// Parses a single atom.
    fn parse_atom(&mut self) -> Result<Node, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Char(_)) => Ok(Node::leaf(self.take_char_run())),
            Some(TokenKind::Unicode(text)) => {
                let text = text.clone();
                self.advance();
                Ok(Node::unicode(text))
            }
            Some(TokenKind::Subst(name)) => {
                let name = name.clone();
                self.advance();
                Ok(Node::subst(name))
            }
            Some(TokenKind::Dot) => {
                self.advance();
                Ok(Node::wild())
            }
            Some(TokenKind::LParen) => {
                self.advance();
                let node = self.parse_alt()?;
                if !self.eat(&TokenKind::RParen) {
                    return Err(ParseError::UnclosedGroup(self.offset_here()));
                }
                Ok(Node::group(node))
            }
            Some(TokenKind::LBracket) => {
                self.advance();
                Ok(Node::class(self.parse_class_list()?))
            }
            Some(TokenKind::NegLBracket) => {
                self.advance();
                Ok(Node::neg_class(self.parse_class_list()?))
            }
            Some(TokenKind::Eos) | None => Err(ParseError::EarlyEnd(self.offset_here())),
            Some(_) => Err(self.stray_here()),
        }
    }

    /// Parses class elements up to the closing bracket into a left-leaning
    /// range list; an immediately closed class yields `None`.
    fn parse_class_list(&mut self) -> Result<Option<Node>, ParseError> {
        let mut list: Option<Node> = None;
        loop {
            let element = match self.peek_kind() {
                Some(TokenKind::RBracket) => {
                    self.advance();
                    return Ok(list);
                }
                Some(TokenKind::Minus) => {
                    self.advance();
                    Node::range_minus()
                }
                Some(TokenKind::Unicode(text)) => {
                    let text = text.clone();
                    self.advance();
                    Node::unicode(text)
                }
                Some(TokenKind::Char(_)) => Node::leaf(self.take_char_run()),
                Some(TokenKind::Eos) | None => {
                    return Err(ParseError::UnclosedClass(self.offset_here()));
                }
                Some(_) => return Err(self.stray_here()),
            };
            list = Some(match list {
                Some(earlier) => Node::range_list(earlier, element),
                None => element,
            });
        }
    }

    /// Collects a maximal run of consecutive literal characters.
    fn take_char_run(&mut self) -> String {
        let mut run = String::new();
        while let Some(TokenKind::Char(c)) = self.peek_kind() {
            run.push(*c);
            self.advance();
        }
        run
    }

    fn peek_is_postfix(&self) -> bool {
        matches!(
            self.peek_kind(),
            Some(TokenKind::Star | TokenKind::Plus | TokenKind::QMark)
        )
    }

    /// Returns and consumes the next repetition operator, if any.
    fn next_repetition(&mut self) -> Option<char> {
        let op = match self.peek_kind() {
            Some(TokenKind::Star) => '*',
            Some(TokenKind::Plus) => '+',
            Some(TokenKind::QMark) => '?',
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    fn skip_newlines(&mut self) {
        while self.eat(&TokenKind::Newline) {}
    }

    /// Consumes the end of a definition line.
    fn expect_line_end(&mut self) -> Result<(), ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Newline) => {
                self.advance();
                Ok(())
            }
            // Leave the marker in place; the missing top-level
            // expression is reported by the caller.
            Some(TokenKind::Eos) => Ok(()),
            _ => Err(self.stray_here()),
        }
    }

    fn expect_eos(&mut self) -> Result<(), ParseError> {
        if matches!(self.peek_kind(), Some(TokenKind::Eos)) {
            self.advance();
            Ok(())
        } else {
            Err(self.stray_here())
        }
    }

    /// Consumes the next token if it equals the provided kind.
    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// A stray-token error for whatever sits at the cursor.
    fn stray_here(&self) -> ParseError {
        match self.peek() {
            Some(tok) => ParseError::Stray {
                at: tok.pos,
                token: tok.kind.to_string(),
            },
            None => ParseError::EarlyEnd(self.offset_here()),
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&'a TokenKind> {
        self.peek().map(|tok| &tok.kind)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// The offset of the cursor token, or of the stream's very end.
    fn offset_here(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|tok| tok.pos)
            .unwrap_or_default()
    }
}

/// Folds a sequence of atoms left to right, chaining adjacent literal
/// units into pairs and everything else into sequence nodes.
fn chain_sequence(nodes: Vec<Node>) -> Node {
    let mut it = nodes.into_iter();
    let mut acc = it.next().expect("chain_sequence requires a non-empty vector");
    for node in it {
        acc = if acc.is_literal_unit() && node.is_literal_unit() {
            Node::pair(acc, node)
        } else {
            Node::seq(acc, node)
        };
    }
    acc
}

/// Splits a multi-character literal leaf into its head run and final
/// character; returns `None` when there is nothing to split.
fn split_literal_run(node: &Node) -> Option<(Node, Node)> {
    if node.kind != crate::core::ast::NodeKind::Leaf {
        return None;
    }
    let value = node.value.as_deref()?;
    let mut chars = value.chars();
    let last = chars.next_back()?;
    let head = chars.as_str();
    if head.is_empty() {
        return None;
    }
    Some((Node::leaf(head), Node::leaf(last.to_string())))
}
