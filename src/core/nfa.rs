use tracing::debug;

use crate::core::ast::{unicode_scalar, Node, NodeKind};
use crate::core::automaton::{Arena, EdgeLabel, StateId};
use crate::core::parser::ParsedSpec;
use crate::core::symbols::SymbolTable;
use crate::errors::BuildError;

/// Upper bound on the number of registered top-level sub-automata.
pub const MAX_AUTOMATA: usize = 100;

/// A registered top-level sub-automaton: its entry state and whether its
/// verdict is inverted before folding into the overall result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub start: StateId,
    pub invert: bool,
}

/// A compiled specification: the state arena plus the ordered list of
/// top-level sub-automata. The input is accepted when every entry's own
/// verdict, xored with its invert flag, is true.
#[derive(Debug, Clone)]
pub struct Program {
    pub arena: Arena,
    pub entries: Vec<Entry>,
}

impl Program {
    /// Runs the compiled matcher over a whole input buffer.
    #[must_use]
    pub fn accepts(&self, input: &[u8]) -> bool {
        crate::core::sim::accepts(self, input)
    }
}

/// Compiles a parsed specification into a [`Program`].
///
/// # Errors
///
/// Returns [`BuildError`] for unknown rule names, malformed unicode
/// escapes, and top-level registrations beyond [`MAX_AUTOMATA`].
pub fn compile(spec: &ParsedSpec) -> Result<Program, BuildError> {
    let mut builder = Builder::new(&spec.symbols);
    let fragment = builder.build_top(&spec.root)?;
    if builder.entries.is_empty() {
        if let Some(fragment) = fragment {
            builder.register(fragment, false)?;
        }
    }
    debug!(
        states = builder.arena.len(),
        entries = builder.entries.len(),
        "specification compiled"
    );
    Ok(Program {
        arena: builder.arena,
        entries: builder.entries,
    })
}

/// An NFA fragment under construction: one entry, one exit, partners of
/// each other in the arena.
#[derive(Debug, Clone, Copy)]
struct Fragment {
    start: StateId,
    end: StateId,
}

/// A wildcard repetition noticed by an inner sequence, waiting for the
/// outermost sequence to wire the literal shortcut around it.
#[derive(Debug, Clone, Copy)]
struct LoopShortcut {
    wild_start: StateId,
    wild_end: StateId,
    op: char,
}

/// Recursive Thompson-style construction over the syntax tree.
struct Builder<'a> {
    arena: Arena,
    symbols: &'a SymbolTable,
    entries: Vec<Entry>,
    top_seq: Option<StateId>,
    pending_shortcut: Option<LoopShortcut>,
}

impl<'a> Builder<'a> {
    fn new(symbols: &'a SymbolTable) -> Self {
        Self {
            arena: Arena::new(),
            symbols,
            entries: Vec::new(),
            top_seq: None,
            pending_shortcut: None,
        }
    }

    /// Builds a node that may compose at the top level. Conjunction and
    /// negation register their pieces and yield no fragment of their own.
    fn build_top(&mut self, node: &Node) -> Result<Option<Fragment>, BuildError> {
        match node.kind {
            NodeKind::Root => match node.right.as_deref() {
                Some(expr) => {
                    let Some(inner) = self.build_top(expr)? else {
                        return Ok(None);
                    };
                    let (start, end) = self.arena.alloc_pair();
                    self.arena.push_edge(start, inner.start, EdgeLabel::Eps);
                    self.arena.push_edge(inner.end, end, EdgeLabel::Eps);
                    Ok(Some(Fragment { start, end }))
                }
                None => Ok(None),
            },
            NodeKind::And => {
                for child in [node.left.as_deref(), node.right.as_deref()] {
                    let Some(child) = child else { continue };
                    if let Some(fragment) = self.build_top(child)? {
                        self.register(fragment, false)?;
                    }
                }
                Ok(None)
            }
            NodeKind::Not => {
                let Some(inner) = node.left.as_deref() else {
                    return Ok(None);
                };
                let fragment = self.build_expr(inner)?;
                self.register(fragment, true)?;
                Ok(None)
            }
            _ => Ok(Some(self.build_expr(node)?)),
        }
    }

    /// Builds one expression fragment. Every arm allocates a fresh
    /// entry/exit pair and returns the entry.
    fn build_expr(&mut self, node: &Node) -> Result<Fragment, BuildError> {
        match node.kind {
            NodeKind::Alt => {
                let a = self.build_child(node.left.as_deref())?;
                let b = self.build_child(node.right.as_deref())?;
                let (start, end) = self.arena.alloc_pair();
                self.arena.push_edge(start, a.start, EdgeLabel::Eps);
                self.arena.push_edge(start, b.start, EdgeLabel::Eps);
                self.arena.push_edge(a.end, end, EdgeLabel::Eps);
                self.arena.push_edge(b.end, end, EdgeLabel::Eps);
                Ok(Fragment { start, end })
            }
            NodeKind::Seq => self.build_seq(node),
            NodeKind::Pair => {
                // Chained literal units wire exactly like a sequence but
                // never take part in the wildcard-shortcut bookkeeping.
                let a = self.build_child(node.left.as_deref())?;
                let b = self.build_child(node.right.as_deref())?;
                let (start, end) = self.arena.alloc_pair();
                self.arena.push_edge(start, a.start, EdgeLabel::Eps);
                self.arena.push_edge(a.end, b.start, EdgeLabel::Eps);
                self.arena.push_edge(b.end, end, EdgeLabel::Eps);
                Ok(Fragment { start, end })
            }
            NodeKind::Repeat => {
                // Exit edges go in before loop entries: the frontier is
                // ordered, so whatever follows the loop must be tried
                // before another iteration is started.
                let inner = self.build_child(node.left.as_deref())?;
                let (start, end) = self.arena.alloc_pair();
                match repeat_op(node) {
                    '*' => {
                        self.arena.push_edge(start, end, EdgeLabel::Eps);
                        self.arena.push_edge(start, inner.start, EdgeLabel::Eps);
                        self.arena.push_edge(inner.end, end, EdgeLabel::Eps);
                        self.arena.push_edge(inner.end, inner.start, EdgeLabel::Eps);
                    }
                    '+' => {
                        self.arena.push_edge(start, inner.start, EdgeLabel::Eps);
                        self.arena.push_edge(inner.end, end, EdgeLabel::Eps);
                        self.arena.push_edge(inner.end, inner.start, EdgeLabel::Eps);
                    }
                    _ => {
                        self.arena.push_edge(start, end, EdgeLabel::Eps);
                        self.arena.push_edge(start, inner.start, EdgeLabel::Eps);
                        self.arena.push_edge(inner.end, end, EdgeLabel::Eps);
                    }
                }
                Ok(Fragment { start, end })
            }
            NodeKind::Group => {
                let inner = self.build_child(node.left.as_deref())?;
                let (start, end) = self.arena.alloc_pair();
                self.arena.push_edge(start, inner.start, EdgeLabel::Eps);
                self.arena.push_edge(inner.end, end, EdgeLabel::Eps);
                Ok(Fragment { start, end })
            }
            NodeKind::Class => {
                let (start, end) = self.arena.alloc_pair();
                crate::core::class::compile_positive(
                    &mut self.arena,
                    node.left.as_deref(),
                    start,
                    end,
                )?;
                Ok(Fragment { start, end })
            }
            NodeKind::NegClass => {
                let (start, end) = self.arena.alloc_pair();
                let sink = self.arena.alloc();
                crate::core::class::compile_negated(
                    &mut self.arena,
                    node.left.as_deref(),
                    start,
                    sink,
                    end,
                )?;
                Ok(Fragment { start, end })
            }
            NodeKind::Subst => {
                let name = node
                    .left
                    .as_deref()
                    .and_then(|leaf| leaf.value.as_deref())
                    .unwrap_or_default();
                let symbols = self.symbols;
                let body = symbols
                    .get(name)
                    .ok_or_else(|| BuildError::UnknownRule(name.to_string()))?;
                let inner = self.build_expr(body)?;
                let (start, end) = self.arena.alloc_pair();
                self.arena.push_edge(start, inner.start, EdgeLabel::Eps);
                self.arena.push_edge(inner.end, end, EdgeLabel::Eps);
                Ok(Fragment { start, end })
            }
            NodeKind::Wild => {
                let (start, end) = self.arena.alloc_pair();
                self.arena.push_edge(start, end, EdgeLabel::Wild);
                Ok(Fragment { start, end })
            }
            NodeKind::Unicode => {
                let scalar = unicode_scalar(node.value.as_deref().unwrap_or_default())?;
                let (start, end) = self.arena.alloc_pair();
                self.arena.push_edge(start, end, EdgeLabel::Scalar(scalar));
                Ok(Fragment { start, end })
            }
            NodeKind::Root | NodeKind::And | NodeKind::Not => {
                unreachable!("composed at the top level")
            }
            _ => {
                // Any remaining leaf matches its raw value verbatim.
                let value = node.value.clone().unwrap_or_default();
                let (start, end) = self.arena.alloc_pair();
                self.arena.push_edge(start, end, EdgeLabel::Lit(value));
                Ok(Fragment { start, end })
            }
        }
    }

    /// Sequencing, including the shortcut wiring that lets a greedy
    /// wildcard repetition hand over to a following literal without
    /// backtracking.
    fn build_seq(&mut self, node: &Node) -> Result<Fragment, BuildError> {
        let (start, end) = self.arena.alloc_pair();
        let is_top = self.top_seq.is_none();
        if is_top {
            self.top_seq = Some(start);
        }

        let left = self.build_child(node.left.as_deref())?;
        let right = self.build_child(node.right.as_deref())?;
        self.arena.push_edge(start, left.start, EdgeLabel::Eps);
        self.arena.push_edge(left.end, right.start, EdgeLabel::Eps);
        self.arena.push_edge(right.end, end, EdgeLabel::Eps);

        self.note_wildcard_repeat(node, left, right);

        if is_top {
            self.top_seq = None;
            if let Some(shortcut) = self.pending_shortcut.take() {
                self.install_shortcut(shortcut, right);
            }
        }
        Ok(Fragment { start, end })
    }

    /// Detects a wildcard repetition adjacent to this sequence. In the
    /// left position the shortcut is installed immediately; in the right
    /// position it is recorded for the outermost sequence, which knows
    /// the expression that follows.
    fn note_wildcard_repeat(&mut self, node: &Node, left: Fragment, right: Fragment) {
        if let Some(left_node) = node.left.as_deref() {
            if left_node.kind == NodeKind::Repeat {
                if is_wild_body(left_node) {
                    if let Some(shortcut) = self.loop_of(left, repeat_op(left_node)) {
                        self.install_shortcut(shortcut, right);
                    }
                }
                return;
            }
        }
        if let Some(right_node) = node.right.as_deref() {
            if right_node.kind == NodeKind::Repeat && is_wild_body(right_node) {
                self.pending_shortcut = self.loop_of(right, repeat_op(right_node));
            }
        }
    }

    /// Resolves a repetition fragment to its inner wildcard loop. The
    /// repetition entry's last transition always leads into the body.
    fn loop_of(&self, fragment: Fragment, op: char) -> Option<LoopShortcut> {
        let body = self.arena.state(fragment.start).transitions.last()?.to;
        let wild_end = self.arena.partner(body)?;
        Some(LoopShortcut {
            wild_start: body,
            wild_end,
            op,
        })
    }

    /// Wires the literal shortcut around a wildcard loop: matching the
    /// following literal leaves the loop instead of being swallowed one
    /// byte at a time. The shortcut edges go in front of the wildcard
    /// edges so the single-pass matcher tries them first.
    fn install_shortcut(&mut self, shortcut: LoopShortcut, following: Fragment) {
        let label = self
            .arena
            .state(following.start)
            .transitions
            .iter()
            .find_map(|t| match &t.label {
                EdgeLabel::Lit(text) => Some(text.clone()),
                _ => None,
            });
        let Some(label) = label else { return };
        match shortcut.op {
            '*' => {
                self.arena.push_edge_front(
                    shortcut.wild_end,
                    following.end,
                    EdgeLabel::Lit(label.clone()),
                );
                self.arena
                    .push_edge_front(shortcut.wild_start, following.end, EdgeLabel::Lit(label));
            }
            '+' => {
                self.arena
                    .push_edge_front(shortcut.wild_end, following.end, EdgeLabel::Lit(label));
            }
            _ => {}
        }
    }

    fn build_child(&mut self, node: Option<&Node>) -> Result<Fragment, BuildError> {
        match node {
            Some(node) => self.build_expr(node),
            // An absent child matches the empty string.
            None => {
                let (start, end) = self.arena.alloc_pair();
                self.arena.push_edge(start, end, EdgeLabel::Eps);
                Ok(Fragment { start, end })
            }
        }
    }

    /// Registers a top-level sub-automaton and marks its exit accepting.
    fn register(&mut self, fragment: Fragment, invert: bool) -> Result<(), BuildError> {
        if self.entries.len() >= MAX_AUTOMATA {
            return Err(BuildError::CapacityExceeded(MAX_AUTOMATA));
        }
        self.arena.state_mut(fragment.end).is_accept = true;
        self.entries.push(Entry {
            start: fragment.start,
            invert,
        });
        debug!(start = fragment.start, invert, "registered sub-automaton");
        Ok(())
    }
}

fn repeat_op(node: &Node) -> char {
    node.value
        .as_deref()
        .and_then(|v| v.chars().next())
        .unwrap_or('?')
}

fn is_wild_body(repeat: &Node) -> bool {
    matches!(repeat.left.as_deref(), Some(body) if body.kind == NodeKind::Wild)
}
