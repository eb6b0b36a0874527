//! The in-memory database model that scripted objects register with.

use alloc::string::String;
use alloc::vec::Vec;

use crate::schema::{ForeignKey, Routine, Synonym, Table, find_named};

/// A database-level option captured as a name/value pair.
///
/// The values that matter to scripting are `QUOTED_IDENTIFIER` and
/// `ANSI_NULLS`, whose settings decide which `SET` batches wrap a routine
/// definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbProp {
    /// Option name, such as `QUOTED_IDENTIFIER`.
    pub name: String,
    /// Option value, conventionally `ON` or `OFF`.
    pub value: String,
}

impl DbProp {
    /// A property `name` set to `value`.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The collection of schema objects recovered from scripts or about to be
/// scripted out.
///
/// Loading an object through one of the `from_script` constructors registers
/// it here, so that later scripts can resolve references and duplicate names
/// are rejected. All name lookups ignore ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Database {
    /// Database-level `SET` options.
    pub props: Vec<DbProp>,
    /// Tables known to the model, including placeholders registered on
    /// behalf of foreign keys that referenced them first.
    pub tables: Vec<Table>,
    /// Stored routines of every kind, triggers included.
    pub routines: Vec<Routine>,
    /// Synonyms.
    pub synonyms: Vec<Synonym>,
    /// Foreign keys.
    pub foreign_keys: Vec<ForeignKey>,
}

impl Database {
    /// An empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The property called `name`, if set.
    #[must_use]
    pub fn find_prop(&self, name: &str) -> Option<&DbProp> {
        self.props
            .iter()
            .find(|prop| prop.name.eq_ignore_ascii_case(name))
    }

    /// The value of the property called `name`, or `""` when unset.
    #[must_use]
    pub fn prop_value(&self, name: &str) -> &str {
        self.find_prop(name).map_or("", |prop| prop.value.as_str())
    }

    /// The table `owner.name`, if registered.
    #[must_use]
    pub fn find_table(&self, owner: &str, name: &str) -> Option<&Table> {
        find_named(&self.tables, owner, name)
    }

    /// The routine `owner.name`, if registered.
    #[must_use]
    pub fn find_routine(&self, owner: &str, name: &str) -> Option<&Routine> {
        find_named(&self.routines, owner, name)
    }

    /// The synonym `owner.name`, if registered.
    #[must_use]
    pub fn find_synonym(&self, owner: &str, name: &str) -> Option<&Synonym> {
        find_named(&self.synonyms, owner, name)
    }

    /// The foreign key called `name`, if registered.
    ///
    /// Constraint names are unique per database, so no owner is needed.
    #[must_use]
    pub fn find_foreign_key(&self, name: &str) -> Option<&ForeignKey> {
        self.foreign_keys
            .iter()
            .find(|key| key.name.eq_ignore_ascii_case(name))
    }

    /// The table `owner.name`, registered as a placeholder first if the
    /// model has not seen it yet.
    ///
    /// Scripts routinely reference tables whose own definitions load later
    /// or never, so an unknown name is not an error.
    pub fn table_or_placeholder(&mut self, owner: &str, name: &str) -> Table {
        if let Some(table) = self.find_table(owner, name) {
            return table.clone();
        }
        let table = Table::new(owner, name);
        self.tables.push(table.clone());
        table
    }
}
