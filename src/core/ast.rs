use std::fmt::{self, Display, Formatter};

use crate::errors::BuildError;

/// The construct a [`Node`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Wrapper around the top-level expression of a specification.
    Root,
    /// Alternation of the two children.
    Alt,
    /// Sequencing of the two children.
    Seq,
    /// Repetition of the left child; the value holds `*`, `+` or `?`.
    Repeat,
    /// Parenthesised group around the left child.
    Group,
    /// Character class; the left child is the range list, if any.
    Class,
    /// Negated character class; the left child is the range list, if any.
    NegClass,
    /// Interior node of a range list: earlier elements left, next element right.
    RangeList,
    /// Marker promoting the preceding class element to a range low end.
    RangeMinus,
    /// Unicode code-point escape; the value holds the literal `%xHHHH;` form.
    Unicode,
    /// Named-rule substitution; the left child is the rule-name leaf.
    Subst,
    /// Rule-name leaf under a substitution.
    Name,
    /// Single-byte wildcard.
    Wild,
    /// Adjacent literal units chained into one expression.
    Pair,
    /// Conjunction: both children must independently match the input.
    And,
    /// Negation: the input must not match the child.
    Not,
    /// Leaf literal; the value holds the raw character run.
    Leaf,
}

/// A node of the binary specification syntax tree.
///
/// Only `kind` is always meaningful; which children and which value a
/// node uses depends on the kind. Trees are immutable after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub value: Option<String>,
    pub left: Option<Box<Node>>,
    pub right: Option<Box<Node>>,
}

impl Node {
    #[must_use]
    pub fn branch(kind: NodeKind, left: Node, right: Node) -> Node {
        Node {
            kind,
            value: None,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    #[must_use]
    pub fn unary(kind: NodeKind, left: Node) -> Node {
        Node {
            kind,
            value: None,
            left: Some(Box::new(left)),
            right: None,
        }
    }

    /// Creates a leaf literal holding a character run.
    #[must_use]
    pub fn leaf(value: impl Into<String>) -> Node {
        Node {
            kind: NodeKind::Leaf,
            value: Some(value.into()),
            left: None,
            right: None,
        }
    }

    /// Wraps the top-level expression; the child sits on the right.
    #[must_use]
    pub fn root(expr: Node) -> Node {
        Node {
            kind: NodeKind::Root,
            value: None,
            left: None,
            right: Some(Box::new(expr)),
        }
    }

    #[must_use]
    pub fn alt(lhs: Node, rhs: Node) -> Node {
        Node::branch(NodeKind::Alt, lhs, rhs)
    }

    #[must_use]
    pub fn seq(lhs: Node, rhs: Node) -> Node {
        Node::branch(NodeKind::Seq, lhs, rhs)
    }

    #[must_use]
    pub fn pair(lhs: Node, rhs: Node) -> Node {
        Node::branch(NodeKind::Pair, lhs, rhs)
    }

    #[must_use]
    pub fn and(lhs: Node, rhs: Node) -> Node {
        Node::branch(NodeKind::And, lhs, rhs)
    }

    #[must_use]
    pub fn not(inner: Node) -> Node {
        Node::unary(NodeKind::Not, inner)
    }

    #[must_use]
    pub fn group(inner: Node) -> Node {
        Node::unary(NodeKind::Group, inner)
    }

    /// Creates a repetition node; `op` is one of `*`, `+` or `?`.
    #[must_use]
    pub fn repeat(op: char, inner: Node) -> Node {
        Node {
            kind: NodeKind::Repeat,
            value: Some(op.to_string()),
            left: Some(Box::new(inner)),
            right: None,
        }
    }

    #[must_use]
    pub fn wild() -> Node {
        Node {
            kind: NodeKind::Wild,
            value: None,
            left: None,
            right: None,
        }
    }

    /// Creates a unicode-escape leaf from its literal `%xHHHH;` form.
    #[must_use]
    pub fn unicode(text: impl Into<String>) -> Node {
        Node {
            kind: NodeKind::Unicode,
            value: Some(text.into()),
            left: None,
            right: None,
        }
    }

    /// Creates a substitution of the named rule.
    #[must_use]
    pub fn subst(name: impl Into<String>) -> Node {
        let name_leaf = Node {
            kind: NodeKind::Name,
            value: Some(name.into()),
            left: None,
            right: None,
        };
        Node::unary(NodeKind::Subst, name_leaf)
    }

    /// Creates a character class from an optional range list.
    #[must_use]
    pub fn class(list: Option<Node>) -> Node {
        Node {
            kind: NodeKind::Class,
            value: None,
            left: list.map(Box::new),
            right: None,
        }
    }

    /// Creates a negated character class from an optional range list.
    #[must_use]
    pub fn neg_class(list: Option<Node>) -> Node {
        Node {
            kind: NodeKind::NegClass,
            value: None,
            left: list.map(Box::new),
            right: None,
        }
    }

    #[must_use]
    pub fn range_list(earlier: Node, next: Node) -> Node {
        Node::branch(NodeKind::RangeList, earlier, next)
    }

    #[must_use]
    pub fn range_minus() -> Node {
        Node {
            kind: NodeKind::RangeMinus,
            value: None,
            left: None,
            right: None,
        }
    }

    /// Whether this node is a literal unit that chains via [`NodeKind::Pair`].
    #[must_use]
    pub fn is_literal_unit(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Leaf | NodeKind::Unicode | NodeKind::Pair
        )
    }
}

/// Parses the scalar out of a `%xHHHH;` escape, case-insensitively.
///
/// # Errors
///
/// Returns [`BuildError::BadUnicodeEscape`] when the text is not of that
/// shape or the digits do not parse as hex.
pub fn unicode_scalar(text: &str) -> Result<u32, BuildError> {
    let digits = text
        .strip_prefix("%x")
        .or_else(|| text.strip_prefix("%X"))
        .and_then(|rest| rest.strip_suffix(';'))
        .ok_or_else(|| BuildError::BadUnicodeEscape(text.to_string()))?;
    if digits.is_empty() {
        return Err(BuildError::BadUnicodeEscape(text.to_string()));
    }
    u32::from_str_radix(digits, 16).map_err(|_| BuildError::BadUnicodeEscape(text.to_string()))
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fn render(node: &Node, depth: usize, f: &mut Formatter<'_>) -> fmt::Result {
            for _ in 0..depth {
                write!(f, "  ")?;
            }
            write!(f, "|-{:?}", node.kind)?;
            if let Some(value) = &node.value {
                write!(f, " -{}", value)?;
            }
            writeln!(f)?;
            if let Some(left) = &node.left {
                render(left, depth + 1, f)?;
            }
            if let Some(right) = &node.right {
                render(right, depth + 1, f)?;
            }
            Ok(())
        }
        render(self, 0, f)
    }
}
