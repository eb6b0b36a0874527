//! The engine driver: node sequencing, whitespace exemptions, and the two
//! entry points every schema adapter calls.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::errors::ScriptError;
use crate::script::scan;
use crate::script::{Bindings, Node};

/// Characters next to which whitespace is cosmetic rather than structural.
const NARROW_PUNCTUATION: &[char] = &['(', ')', '[', ']', ',', '.', '-', '+'];

/// An ordered sequence of grammar nodes describing one kind of script.
///
/// The same grammar value drives both directions: [`Grammar::generate`]
/// emits canonical script text from bound values, [`Grammar::parse`]
/// recovers bound values from script text. A grammar holds no parse state,
/// so one instance may serve any number of concurrent calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    nodes: Vec<Node>,
}

impl Grammar {
    /// Wrap a node sequence.
    #[must_use]
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Emit the canonical script for `vars`.
    ///
    /// Generation walks the nodes in declared order with no backtracking,
    /// so the output formatting is always canonical no matter how a
    /// previously parsed script was laid out.
    ///
    /// # Errors
    /// [`ScriptError::UnknownVariable`] when a node needs a variable that
    /// is not bound, [`ScriptError::InvalidValue`] when a bound value is
    /// outside a keyword node's candidate set, [`ScriptError::KindMismatch`]
    /// and [`ScriptError::EmptyList`] for unusable list values.
    pub fn generate(&self, vars: &Bindings) -> Result<String, ScriptError> {
        let mut out = String::new();
        for node in &self.nodes {
            node.generate(vars, &mut out)?;
        }
        Ok(out)
    }

    /// Recover bindings from `script`, which must match in full.
    ///
    /// Whitespace and comments before the first node and after the last are
    /// tolerated; any other leftover text fails the parse.
    ///
    /// # Errors
    /// [`ScriptError::GrammarMismatch`] when a mandatory node fails to
    /// match, [`ScriptError::BindingConflict`] when one variable is bound
    /// to disagreeing values, [`ScriptError::TrailingText`] when
    /// non-whitespace input remains past the last node.
    pub fn parse(&self, script: &str) -> Result<Bindings, ScriptError> {
        let (vars, rest) = self.parse_prefix(script)?;
        let trailing = &rest[scan::whitespace_run(rest)..];
        if trailing.is_empty() {
            Ok(vars)
        } else {
            Err(ScriptError::TrailingText(String::from(trailing)))
        }
    }

    /// Recover bindings from the front of `script`, returning the
    /// unconsumed remainder instead of insisting on full consumption.
    ///
    /// # Errors
    /// As [`Grammar::parse`], minus the trailing-text check.
    pub fn parse_prefix<'a>(&self, script: &'a str) -> Result<(Bindings, &'a str), ScriptError> {
        let mut vars = Bindings::new();
        let body = &script[scan::whitespace_run(script)..];
        match consume_sequence(&self.nodes, body, &mut vars)? {
            SeqOutcome::Matched(rest) => Ok((vars, rest)),
            SeqOutcome::Mismatch {
                expected,
                remaining,
            } => Err(ScriptError::GrammarMismatch {
                expected: expected.to_string(),
                remaining: String::from(remaining),
            }),
        }
    }
}

/// Outcome of matching a node sequence against input.
#[derive(Debug, Clone, Copy)]
pub(crate) enum SeqOutcome<'n, 'a> {
    /// Every node matched; holds the unconsumed remainder.
    Matched(&'a str),
    /// A mandatory node failed to match.
    Mismatch {
        /// The node that failed.
        expected: &'n Node,
        /// What was left of the input at that point.
        remaining: &'a str,
    },
}

/// Match `nodes` in order at the front of `input`, binding into `vars`.
///
/// Whitespace nodes get special treatment. Identifier nodes consume the
/// whitespace around themselves, so a whitespace node directly before or
/// after an identifier node is skipped outright, as is one following
/// another whitespace node. A whitespace node that finds no whitespace
/// still passes zero-width at either edge of the sequence and beside
/// narrow punctuation.
///
/// Mismatches come back as [`SeqOutcome::Mismatch`] so optional callers
/// can treat them as "clause absent"; binding conflicts are hard errors.
pub(crate) fn consume_sequence<'n, 'a>(
    nodes: &'n [Node],
    input: &'a str,
    vars: &mut Bindings,
) -> Result<SeqOutcome<'n, 'a>, ScriptError> {
    let mut rest = input;
    for (position, node) in nodes.iter().enumerate() {
        if !matches!(node, Node::Whitespace { .. }) {
            match node.consume(rest, vars)? {
                Some(after) => rest = after,
                None => {
                    return Ok(SeqOutcome::Mismatch {
                        expected: node,
                        remaining: rest,
                    });
                }
            }
            continue;
        }
        let prev = position.checked_sub(1).map(|previous| &nodes[previous]);
        let next = nodes.get(position + 1);
        if prev.is_some_and(|part| matches!(part, Node::Identifier(_) | Node::Whitespace { .. }))
            || next.is_some_and(|part| matches!(part, Node::Identifier(_)))
        {
            continue;
        }
        match node.consume(rest, vars)? {
            Some(after) => rest = after,
            None => {
                let at_edge = position == 0 || position + 1 == nodes.len();
                if !(at_edge || beside_narrow_punctuation(prev, next)) {
                    return Ok(SeqOutcome::Mismatch {
                        expected: node,
                        remaining: rest,
                    });
                }
            }
        }
    }
    Ok(SeqOutcome::Matched(rest))
}

/// Whether the neighboring literals put this position against narrow
/// punctuation.
fn beside_narrow_punctuation(prev: Option<&Node>, next: Option<&Node>) -> bool {
    let before = prev.is_some_and(|part| match part {
        Node::Literal(text) => text.ends_with(NARROW_PUNCTUATION),
        _ => false,
    });
    let after = next.is_some_and(|part| match part {
        Node::Literal(text) => text.starts_with(NARROW_PUNCTUATION),
        _ => false,
    });
    before || after
}
