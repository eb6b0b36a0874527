//! The grammar node kinds and their generate/consume behavior.

use alloc::string::String;
use alloc::vec::Vec;

use crate::errors::ScriptError;
use crate::script::{Bindings, SeqOutcome, consume_sequence, scan};

/// One primitive of a script grammar.
///
/// A grammar is an ordered sequence of nodes, each of which knows how to
/// emit itself from [`Bindings`] (generate) and how to recognize itself at
/// the front of an input string (consume). Nodes never hold parse state, so
/// one node tree serves any number of concurrent calls.
///
/// Build nodes through the associated functions rather than the variants;
/// [`Node::from_text`] turns a literal run of script text into the
/// equivalent literal and whitespace nodes in one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Fixed text, matched ignoring ASCII case and emitted verbatim.
    Literal(String),
    /// A run of whitespace and SQL comments.
    ///
    /// Consuming takes the longest run present, whatever the preference
    /// says; generating emits the preferred character the preferred number
    /// of times. That asymmetry is what normalizes formatting on a round
    /// trip.
    Whitespace {
        /// The character to emit when generating.
        ch: char,
        /// How many times to emit it.
        count: usize,
    },
    /// One SQL identifier, bound to the named variable.
    ///
    /// Consuming accepts `[bracketed]`, `"quoted"`, or regular identifiers
    /// and strips the delimiters; generating always emits the bracketed
    /// form.
    Identifier(String),
    /// One keyword out of a closed candidate set, bound to the named
    /// variable with the casing found in the source.
    Keyword {
        /// The variable the matched keyword is bound to.
        name: String,
        /// The candidate keywords. Longer candidates win over shorter ones.
        values: Vec<String>,
    },
    /// A separated, ordered list of identifiers bound as one list value.
    IdentifierList {
        /// The variable the list is bound to.
        name: String,
        /// The separator between elements, usually `,` or `.`.
        separator: String,
    },
    /// A clause that may be absent from the script.
    ///
    /// Generating consults the named variable: when its value is one of the
    /// skip values (ignoring ASCII case) the clause is omitted, otherwise
    /// the body is emitted in full. Consuming always just tries the body;
    /// a failed try leaves the input position and the caller's bindings
    /// untouched.
    Optional {
        /// The variable that decides skipping on generate.
        name: String,
        /// Values of `name` for which generate emits nothing.
        skip_values: Vec<String>,
        /// The clause body.
        nodes: Vec<Node>,
    },
    /// Sub-clauses that the source may order freely.
    ///
    /// Consuming repeatedly offers the remaining sub-clauses to the input
    /// until a full pass consumes nothing; the group matches if every
    /// sub-clause left over is optional. Generating always emits the
    /// declared order.
    AnyOrder(Vec<Node>),
}

impl Node {
    /// Fixed literal text.
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        debug_assert!(!text.is_empty(), "a literal node needs text");
        Node::Literal(text)
    }

    /// A whitespace separator generated as `count` repetitions of `ch`.
    #[must_use]
    pub fn whitespace(ch: char, count: usize) -> Self {
        debug_assert!(ch.is_whitespace(), "whitespace nodes emit whitespace");
        debug_assert!(count >= 1, "whitespace nodes emit at least one character");
        Node::Whitespace { ch, count }
    }

    /// An identifier bound to `name`.
    #[must_use]
    pub fn identifier(name: impl Into<String>) -> Self {
        Node::Identifier(name.into())
    }

    /// A closed-set keyword bound to `name`.
    #[must_use]
    pub fn keyword(name: impl Into<String>, values: &[&str]) -> Self {
        debug_assert!(!values.is_empty(), "a keyword node needs candidates");
        Node::Keyword {
            name: name.into(),
            values: values.iter().map(|value| String::from(*value)).collect(),
        }
    }

    /// A `separator`-separated identifier list bound to `name`.
    #[must_use]
    pub fn identifier_list(name: impl Into<String>, separator: impl Into<String>) -> Self {
        Node::IdentifierList {
            name: name.into(),
            separator: separator.into(),
        }
    }

    /// An optional clause controlled by the variable `name`.
    #[must_use]
    pub fn optional(name: impl Into<String>, skip_values: &[&str], nodes: Vec<Node>) -> Self {
        Node::Optional {
            name: name.into(),
            skip_values: skip_values.iter().map(|value| String::from(*value)).collect(),
            nodes,
        }
    }

    /// An order-independent group of sub-clauses.
    #[must_use]
    pub fn any_order(nodes: Vec<Node>) -> Self {
        Node::AnyOrder(nodes)
    }

    /// Split literal script text into its literal and whitespace nodes.
    ///
    /// Runs of one whitespace character collapse into a single whitespace
    /// node preferring that character; CRLF line endings are normalized to
    /// a bare newline first.
    #[must_use]
    pub fn from_text(text: &str) -> Vec<Node> {
        fn flush(literal: &mut String, nodes: &mut Vec<Node>) {
            if !literal.is_empty() {
                nodes.push(Node::Literal(core::mem::take(literal)));
            }
        }

        let normalized = text.replace("\r\n", "\n");
        let mut nodes = Vec::new();
        let mut literal = String::new();
        for c in normalized.chars() {
            if c.is_whitespace() {
                flush(&mut literal, &mut nodes);
                match nodes.last_mut() {
                    Some(Node::Whitespace { ch, count }) if *ch == c => *count += 1,
                    _ => nodes.push(Node::Whitespace { ch: c, count: 1 }),
                }
            } else {
                literal.push(c);
            }
        }
        flush(&mut literal, &mut nodes);
        nodes
    }

    /// Emit this node into `out` from the bound values.
    pub(crate) fn generate(&self, vars: &Bindings, out: &mut String) -> Result<(), ScriptError> {
        match self {
            Node::Literal(text) => {
                out.push_str(text);
                Ok(())
            }
            Node::Whitespace { ch, count } => {
                for _ in 0..*count {
                    out.push(*ch);
                }
                Ok(())
            }
            Node::Identifier(name) => {
                let value = vars.require_text(name)?;
                out.push('[');
                out.push_str(value);
                out.push(']');
                Ok(())
            }
            Node::Keyword { name, values } => generate_keyword(name, values, vars, out),
            Node::IdentifierList { name, separator } => {
                generate_list(name, separator, vars, out)
            }
            Node::Optional {
                name,
                skip_values,
                nodes,
            } => {
                let value = vars.require_text(name)?;
                if skip_values.iter().any(|skip| skip.eq_ignore_ascii_case(value)) {
                    return Ok(());
                }
                for node in nodes {
                    node.generate(vars, out)?;
                }
                Ok(())
            }
            Node::AnyOrder(nodes) => {
                for node in nodes {
                    node.generate(vars, out)?;
                }
                Ok(())
            }
        }
    }

    /// Try to recognize this node at the front of `input`.
    ///
    /// `Ok(Some(rest))` is a match leaving `rest`, `Ok(None)` a recoverable
    /// mismatch that has not touched `vars`, and `Err` an unrecoverable
    /// problem such as a binding conflict.
    pub(crate) fn consume<'a>(
        &self,
        input: &'a str,
        vars: &mut Bindings,
    ) -> Result<Option<&'a str>, ScriptError> {
        match self {
            Node::Literal(text) => {
                Ok(scan::starts_with_ignore_ascii_case(input, text)
                    .then(|| &input[text.len()..]))
            }
            Node::Whitespace { .. } => Ok(match scan::whitespace_run(input) {
                0 => None,
                len => Some(&input[len..]),
            }),
            Node::Identifier(name) => match scan::identifier_token(input) {
                Some(token) => {
                    vars.set(name, token.name)?;
                    Ok(Some(&input[token.len..]))
                }
                None => Ok(None),
            },
            Node::Keyword { name, values } => consume_keyword(name, values, input, vars),
            Node::IdentifierList { name, separator } => {
                consume_list(name, separator, input, vars)
            }
            Node::Optional { nodes, .. } => consume_optional(nodes, input, vars),
            Node::AnyOrder(nodes) => consume_any_order(nodes, input, vars),
        }
    }
}

fn generate_keyword(
    name: &str,
    values: &[String],
    vars: &Bindings,
    out: &mut String,
) -> Result<(), ScriptError> {
    let value = vars.require_text(name)?;
    if !values.iter().any(|candidate| candidate.eq_ignore_ascii_case(value)) {
        return Err(ScriptError::InvalidValue {
            name: String::from(name),
            value: String::from(value),
            allowed: values.to_vec(),
        });
    }
    out.push_str(value);
    Ok(())
}

fn generate_list(
    name: &str,
    separator: &str,
    vars: &Bindings,
    out: &mut String,
) -> Result<(), ScriptError> {
    let items = vars.require_list(name)?;
    if items.is_empty() {
        return Err(ScriptError::EmptyList(String::from(name)));
    }
    for (position, item) in items.iter().enumerate() {
        if position > 0 {
            out.push_str(separator);
            // A qualifier dot binds tightly; other separators read better
            // with a space after them.
            if separator != "." {
                out.push(' ');
            }
        }
        out.push('[');
        out.push_str(item);
        out.push(']');
    }
    Ok(())
}

fn consume_keyword<'a>(
    name: &str,
    values: &[String],
    input: &'a str,
    vars: &mut Bindings,
) -> Result<Option<&'a str>, ScriptError> {
    // Longest candidate first, so SET DEFAULT is never truncated to a
    // shorter candidate that happens to share a prefix.
    let matched = values
        .iter()
        .filter(|candidate| scan::starts_with_ignore_ascii_case(input, candidate))
        .max_by_key(|candidate| candidate.len());
    match matched {
        Some(candidate) => {
            let found = &input[..candidate.len()];
            vars.set(name, found)?;
            Ok(Some(&input[candidate.len()..]))
        }
        None => Ok(None),
    }
}

fn consume_list<'a>(
    name: &str,
    separator: &str,
    input: &'a str,
    vars: &mut Bindings,
) -> Result<Option<&'a str>, ScriptError> {
    let Some(first) = scan::identifier_token(input) else {
        return Ok(None);
    };
    let mut items = Vec::new();
    items.push(String::from(first.name));
    let mut rest = &input[first.len..];
    while let Some(after_separator) = rest.strip_prefix(separator) {
        // The separator only belongs to the list if another identifier
        // follows; otherwise it is left for the rest of the grammar.
        let Some(token) = scan::identifier_token(after_separator) else {
            break;
        };
        items.push(String::from(token.name));
        rest = &after_separator[token.len..];
    }
    vars.set(name, items)?;
    Ok(Some(rest))
}

fn consume_optional<'a>(
    nodes: &[Node],
    input: &'a str,
    vars: &mut Bindings,
) -> Result<Option<&'a str>, ScriptError> {
    let mut attempt = Bindings::new();
    match consume_sequence(nodes, input, &mut attempt)? {
        SeqOutcome::Matched(rest) => {
            vars.merge(attempt)?;
            Ok(Some(rest))
        }
        // The clause is absent. The attempt bindings are dropped here and
        // the input position stays put.
        SeqOutcome::Mismatch { .. } => Ok(Some(input)),
    }
}

fn consume_any_order<'a>(
    nodes: &[Node],
    input: &'a str,
    vars: &mut Bindings,
) -> Result<Option<&'a str>, ScriptError> {
    let mut attempt = Bindings::new();
    let mut remaining: Vec<&Node> = nodes.iter().collect();
    let mut rest = input;
    loop {
        let mut advanced = false;
        for position in 0..remaining.len() {
            if let Some(after) = remaining[position].consume(rest, &mut attempt)? {
                if after.len() != rest.len() {
                    rest = after;
                    remaining.remove(position);
                    advanced = true;
                    break;
                }
            }
        }
        if !advanced {
            break;
        }
    }
    // Whatever could not be consumed must be allowed to be absent.
    if remaining
        .iter()
        .all(|node| matches!(node, Node::Optional { .. }))
    {
        vars.merge(attempt)?;
        Ok(Some(rest))
    } else {
        Ok(None)
    }
}

impl core::fmt::Display for Node {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Node::Literal(text) => write!(f, "literal {text:?}"),
            Node::Whitespace { .. } => write!(f, "whitespace"),
            Node::Identifier(name) => write!(f, "identifier bound to {name:?}"),
            Node::Keyword { name, values } => {
                write!(f, "one of {values:?} bound to {name:?}")
            }
            Node::IdentifierList { name, separator } => {
                write!(f, "{separator:?}-separated identifiers bound to {name:?}")
            }
            Node::Optional { name, .. } => write!(f, "optional clause on {name:?}"),
            Node::AnyOrder(nodes) => write!(f, "any-order group of {} clauses", nodes.len()),
        }
    }
}
