//! Submodule defining the errors used across the crate.

use alloc::string::String;
use alloc::vec::Vec;

use crate::script::{Value, ValueKind};

/// Errors that can occur while generating a script from bindings or while
/// consuming a script back into bindings.
///
/// A grammar node that merely fails to match reports that softly to the
/// driver, which may skip or backtrack; only unrecoverable situations
/// surface as one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    /// The script stopped matching the grammar at a mandatory node.
    #[error("script does not match: expected {expected} at {remaining:?}")]
    GrammarMismatch {
        /// Description of the node that failed to match.
        expected: String,
        /// The unconsumed text at the point of failure.
        remaining: String,
    },
    /// A variable was bound twice with disagreeing values.
    #[error("variable {name:?} is already bound to {existing}, cannot rebind to {incoming}")]
    BindingConflict {
        /// The variable name.
        name: String,
        /// The value already bound.
        existing: Value,
        /// The disagreeing value.
        incoming: Value,
    },
    /// The whole grammar matched but non-whitespace text was left over.
    #[error("unexpected text after end of script: {0:?}")]
    TrailingText(String),
    /// Generation needed a variable that the bindings do not contain.
    #[error("no value bound for variable {0:?}")]
    UnknownVariable(String),
    /// A bound value is not one of the values its keyword node allows.
    #[error("value {value:?} for variable {name:?} is not one of {allowed:?}")]
    InvalidValue {
        /// The variable name.
        name: String,
        /// The offending value.
        value: String,
        /// The values the node accepts.
        allowed: Vec<String>,
    },
    /// A variable holds text where a list was needed, or the other way
    /// around.
    #[error("variable {name:?} is not bound to {expected}")]
    KindMismatch {
        /// The variable name.
        name: String,
        /// The kind the operation needed.
        expected: ValueKind,
    },
    /// A separated identifier list cannot be generated from zero elements.
    #[error("variable {0:?} holds an empty identifier list")]
    EmptyList(String),
}
