//! Variable bindings exchanged between schema objects and their grammars.

use alloc::string::String;
use alloc::vec::Vec;

use indexmap::IndexMap as IndexMapRaw;

use crate::errors::ScriptError;

/// Insertion-ordered map with a hasher available under `no_std`.
type IndexMap<K, V> = IndexMapRaw<K, V, hashbrown::DefaultHashBuilder>;

/// A value bound to a grammar variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A single piece of text: an identifier, a keyword, free text.
    Text(String),
    /// An ordered list of identifiers, as bound by a separated list node.
    List(Vec<String>),
}

impl Value {
    /// The kind of this value, for diagnostics.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Text(_) => ValueKind::Text,
            Value::List(_) => ValueKind::List,
        }
    }

    /// Whether a later binding agrees with this one.
    ///
    /// Text disagreements in casing only are tolerated, since T-SQL scripts
    /// spell the same identifier in whatever case they like. Lists must
    /// match exactly, element for element, order included.
    fn agrees_with(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a.eq_ignore_ascii_case(b),
            (Value::List(a), Value::List(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(String::from(text))
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Text(text) => write!(f, "{text:?}"),
            Value::List(items) => write!(f, "{items:?}"),
        }
    }
}

/// The two kinds of [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// [`Value::Text`].
    Text,
    /// [`Value::List`].
    List,
}

impl core::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ValueKind::Text => write!(f, "text"),
            ValueKind::List => write!(f, "identifier list"),
        }
    }
}

/// The variable environment a grammar reads from when generating and writes
/// into when consuming.
///
/// Equality between two sets of bindings ignores insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: IndexMap<String, Value>,
}

impl Bindings {
    /// Create an empty set of bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no variable is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Whether a variable is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Bind `name` to `value`, keeping any agreeing existing value.
    ///
    /// The first value bound wins; a later binding of the same variable is
    /// only checked for agreement (see [`Value`] for the comparison rules)
    /// and never overwrites, so the casing a script used first is the casing
    /// that survives a round trip.
    ///
    /// # Errors
    /// [`ScriptError::BindingConflict`] when the values disagree.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ScriptError> {
        let value = value.into();
        match self.values.get(name) {
            None => {
                self.values.insert(String::from(name), value);
                Ok(())
            }
            Some(existing) if existing.agrees_with(&value) => Ok(()),
            Some(existing) => Err(ScriptError::BindingConflict {
                name: String::from(name),
                existing: existing.clone(),
                incoming: value,
            }),
        }
    }

    /// Commit every binding of `other` into `self`, in insertion order.
    ///
    /// Grammar nodes that may fail halfway collect their bindings in a local
    /// map first and merge it on success, so a failed attempt never leaves
    /// partial bindings behind.
    ///
    /// # Errors
    /// [`ScriptError::BindingConflict`] on the first disagreeing variable.
    pub fn merge(&mut self, other: Bindings) -> Result<(), ScriptError> {
        for (name, value) in other.values {
            self.set(&name, value)?;
        }
        Ok(())
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Text value of `name`.
    ///
    /// # Errors
    /// [`ScriptError::UnknownVariable`] when unbound,
    /// [`ScriptError::KindMismatch`] when bound to a list.
    pub fn require_text(&self, name: &str) -> Result<&str, ScriptError> {
        match self.values.get(name) {
            Some(Value::Text(text)) => Ok(text),
            Some(Value::List(_)) => Err(ScriptError::KindMismatch {
                name: String::from(name),
                expected: ValueKind::Text,
            }),
            None => Err(ScriptError::UnknownVariable(String::from(name))),
        }
    }

    /// List value of `name`.
    ///
    /// # Errors
    /// [`ScriptError::UnknownVariable`] when unbound,
    /// [`ScriptError::KindMismatch`] when bound to text.
    pub fn require_list(&self, name: &str) -> Result<&[String], ScriptError> {
        match self.values.get(name) {
            Some(Value::List(items)) => Ok(items),
            Some(Value::Text(_)) => Err(ScriptError::KindMismatch {
                name: String::from(name),
                expected: ValueKind::List,
            }),
            None => Err(ScriptError::UnknownVariable(String::from(name))),
        }
    }
}
