//! Schema objects that script themselves to T-SQL and rebuild themselves
//! from scripts.
//!
//! Each object type owns a [`Grammar`](crate::Grammar) describing its
//! canonical DDL and drives that grammar in both directions: `script_create`
//! marshals fields into bindings and generates text, `from_script` parses
//! text back into bindings, unmarshals them, and registers the object with a
//! [`Database`].

mod database;
mod foreign_key;
mod routine;
mod synonym;
mod table;
mod trigger;

pub use database::{Database, DbProp};
pub use foreign_key::ForeignKey;
pub use routine::{Routine, RoutineKind};
pub use synonym::Synonym;
pub use table::Table;
pub use trigger::TriggerState;

use alloc::string::String;

use crate::errors::ScriptError;

/// Error returned when a schema object cannot be scripted or rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The underlying grammar failed to generate or parse a script.
    #[error(transparent)]
    Script(#[from] ScriptError),
    /// An object with the same qualified name is already registered.
    #[error("the database model already contains {kind} [{owner}].[{name}]")]
    DuplicateObject {
        /// What kind of object collided, such as `routine` or `synonym`.
        kind: &'static str,
        /// Schema of the colliding object.
        owner: String,
        /// Name of the colliding object.
        name: String,
    },
    /// A script handed to the trigger loader turned out to create a routine
    /// of a different kind.
    #[error("routine [{owner}].[{name}] in script is a {kind}, not a trigger")]
    NotATrigger {
        /// Schema of the routine found in the script.
        owner: String,
        /// Name of the routine found in the script.
        name: String,
        /// The kind the script actually creates.
        kind: RoutineKind,
    },
    /// The routine cannot be rewritten as an `ALTER` statement.
    #[error("unable to script {kind} [{owner}].[{name}] as ALTER")]
    CannotAlter {
        /// Kind of the routine.
        kind: RoutineKind,
        /// Schema of the routine.
        owner: String,
        /// Name of the routine.
        name: String,
    },
    /// The script contained no batches after splitting on `GO` separators.
    #[error("the script contains no batches")]
    EmptyScript,
}

/// Objects addressed by a schema-qualified name.
///
/// Lookups through this trait compare both parts case-insensitively, the way
/// SQL Server resolves names under its default collations.
pub trait Named {
    /// Schema (owner) part of the qualified name.
    fn owner(&self) -> &str;
    /// Object name within the schema.
    fn name(&self) -> &str;
}

pub(crate) fn find_named<'a, T: Named>(items: &'a [T], owner: &str, name: &str) -> Option<&'a T> {
    items.iter().find(|item| {
        item.owner().eq_ignore_ascii_case(owner) && item.name().eq_ignore_ascii_case(name)
    })
}
