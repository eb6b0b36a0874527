//! Tables as targets of foreign keys and triggers.

use alloc::string::String;

use crate::schema::Named;

/// A table referenced by schema and name.
///
/// Column and constraint details live with the introspection layer; scripts
/// in this crate only ever need the qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// The schema (owner) the table belongs to.
    pub owner: String,
    /// The table name.
    pub name: String,
}

impl Table {
    /// A table called `name` in the `owner` schema.
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl Named for Table {
    fn owner(&self) -> &str {
        &self.owner
    }

    fn name(&self) -> &str {
        &self.name
    }
}
