use crate::core::ast::{unicode_scalar, Node, NodeKind};
use crate::core::automaton::{Arena, EdgeLabel, StateId};
use crate::errors::BuildError;

/// Emits a character class's range list as labeled transitions
/// `from -> to`, including any residual carry and trailing `-`.
pub fn compile_positive(
    arena: &mut Arena,
    list: Option<&Node>,
    from: StateId,
    to: StateId,
) -> Result<(), BuildError> {
    let mut compiler = RangeCompiler::new(arena, from, to);
    let carry = match list {
        Some(node) => compiler.walk(node)?,
        None => Carry::None,
    };
    compiler.flush(carry);
    Ok(())
}

/// Emits a negated class: the range list lands in the dead `sink`, then
/// a single wildcard edge to `to` is appended after every sink edge so
/// that in-class bytes are captured before the wildcard can fire.
pub fn compile_negated(
    arena: &mut Arena,
    list: Option<&Node>,
    from: StateId,
    sink: StateId,
    to: StateId,
) -> Result<(), BuildError> {
    compile_positive(arena, list, from, sink)?;
    arena.push_edge(from, to, EdgeLabel::Wild);
    Ok(())
}

/// The rightmost uncommitted character of the walk so far: a candidate
/// range low end should the next sibling be a `-` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Carry {
    None,
    Byte(char),
    Scalar(u32),
}

struct RangeCompiler<'a> {
    arena: &'a mut Arena,
    from: StateId,
    to: StateId,
    minus_pending: bool,
}

impl<'a> RangeCompiler<'a> {
    fn new(arena: &'a mut Arena, from: StateId, to: StateId) -> Self {
        Self {
            arena,
            from,
            to,
            minus_pending: false,
        }
    }

    /// Left-biased walk over the range list, returning the live carry.
    fn walk(&mut self, node: &Node) -> Result<Carry, BuildError> {
        if node.kind == NodeKind::RangeList {
            let left = node.left.as_deref().map_or(Ok(Carry::None), |n| self.walk(n))?;
            let carry = match node.right.as_deref() {
                Some(right) => self.element(right, left)?,
                None => left,
            };
            return Ok(carry);
        }
        self.head(node)
    }

    /// Visits an element with no live predecessor.
    fn head(&mut self, node: &Node) -> Result<Carry, BuildError> {
        match node.kind {
            NodeKind::RangeMinus => {
                self.minus_pending = true;
                Ok(Carry::None)
            }
            NodeKind::Unicode => Ok(Carry::Scalar(unicode_scalar(value_of(node))?)),
            _ => Ok(self.open_run(node)),
        }
    }

    /// Visits the next sibling given the carry from everything before it.
    fn element(&mut self, node: &Node, carry: Carry) -> Result<Carry, BuildError> {
        if node.kind == NodeKind::RangeMinus {
            self.minus_pending = true;
            return Ok(carry);
        }
        if self.minus_pending {
            if carry == Carry::None {
                // A dangling minus stays a literal; it is committed at
                // the class boundary, and this element lists plainly.
                self.emit_all(node)?;
                return Ok(Carry::None);
            }
            self.minus_pending = false;
            return self.interval(carry, node);
        }
        self.commit(carry);
        self.head(node)
    }

    /// Expands the closed interval from the carry up to this element's
    /// first character, then lists the element's remaining characters.
    fn interval(&mut self, low: Carry, node: &Node) -> Result<Carry, BuildError> {
        let low_value = match low {
            Carry::Byte(c) => c as u32,
            Carry::Scalar(v) => v,
            Carry::None => unreachable!("interval requires a live carry"),
        };

        if node.kind == NodeKind::Unicode {
            let high = unicode_scalar(value_of(node))?;
            self.expand_scalar(low_value, high);
            return Ok(Carry::None);
        }

        let chars: Vec<char> = value_of(node).chars().collect();
        let Some(&high) = chars.first() else {
            return Ok(Carry::None);
        };
        let ascii_only = matches!(low, Carry::Byte(c) if c.is_ascii()) && high.is_ascii();
        if ascii_only {
            for code in low_value..=high as u32 {
                if let Some(c) = char::from_u32(code) {
                    self.emit_char(c);
                }
            }
            for &c in middle(&chars) {
                self.emit_char(c);
            }
            // A one-character high end doubles as the next carry.
            Ok(Carry::Byte(chars[chars.len() - 1]))
        } else {
            // An interval touching a unicode scalar is expanded with the
            // scalar tag throughout, matching the compiled semantics of
            // the one-byte runtime comparison.
            self.expand_scalar(low_value, high as u32);
            for &c in middle(&chars) {
                self.emit_scalar(c as u32);
            }
            if chars.len() > 1 {
                Ok(Carry::Byte(chars[chars.len() - 1]))
            } else {
                Ok(Carry::None)
            }
        }
    }

    /// Lists a run's characters except the last, which becomes the carry.
    fn open_run(&mut self, node: &Node) -> Carry {
        let chars: Vec<char> = value_of(node).chars().collect();
        match chars.split_last() {
            Some((last, rest)) => {
                for &c in rest {
                    self.emit_char(c);
                }
                Carry::Byte(*last)
            }
            None => Carry::None,
        }
    }

    /// Lists an element in full, leaving no carry.
    fn emit_all(&mut self, node: &Node) -> Result<(), BuildError> {
        if node.kind == NodeKind::Unicode {
            let value = unicode_scalar(value_of(node))?;
            self.emit_scalar(value);
            return Ok(());
        }
        for c in value_of(node).to_string().chars() {
            self.emit_char(c);
        }
        Ok(())
    }

    /// Commits a live carry as a single transition.
    fn commit(&mut self, carry: Carry) {
        match carry {
            Carry::None => {}
            Carry::Byte(c) => self.emit_char(c),
            Carry::Scalar(v) => self.emit_scalar(v),
        }
    }

    /// Commits the residue at the class boundary: the final carry, and a
    /// literal `-` when a trailing minus never found its high end.
    fn flush(&mut self, carry: Carry) {
        self.commit(carry);
        if self.minus_pending {
            self.emit_char('-');
            self.minus_pending = false;
        }
    }

    fn expand_scalar(&mut self, low: u32, high: u32) {
        for value in low..=high {
            self.emit_scalar(value);
        }
    }

    fn emit_char(&mut self, c: char) {
        self.arena
            .push_edge(self.from, self.to, EdgeLabel::Lit(c.to_string()));
    }

    fn emit_scalar(&mut self, value: u32) {
        self.arena
            .push_edge(self.from, self.to, EdgeLabel::Scalar(value));
    }

}

fn value_of(node: &Node) -> &str {
    node.value.as_deref().unwrap_or_default()
}

/// The characters of a run between its first and last.
fn middle(chars: &[char]) -> &[char] {
    if chars.len() > 2 {
        &chars[1..chars.len() - 1]
    } else {
        &[]
    }
}
