//! Stored routines: procedures, functions, triggers, views, and XML schema
//! collections.
//!
//! A routine's definition is opaque text, but the batches around it are
//! grammar-driven: `SET QUOTED_IDENTIFIER` / `SET ANSI_NULLS` prologues are
//! absorbed into session flags on parse and regenerated on scripting, with a
//! matching epilogue restoring the database-level values afterwards.

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::batch::split_batches;
use crate::errors::ScriptError;
use crate::schema::{Database, Named, SchemaError, TriggerState};
use crate::script::{Bindings, Grammar, Node, scan};

/// Keyword spellings accepted after `CREATE`.
const KIND_KEYWORDS: [&str; 6] = [
    "PROCEDURE",
    "PROC",
    "FUNCTION",
    "TRIGGER",
    "VIEW",
    "XML SCHEMA COLLECTION",
];

/// The kinds of schema object SQL Server stores as scripted definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineKind {
    /// A stored procedure.
    Procedure,
    /// A scalar or table-valued function.
    Function,
    /// A DML or DDL trigger.
    Trigger,
    /// A view.
    View,
    /// An XML schema collection.
    XmlSchemaCollection,
}

impl RoutineKind {
    /// The keyword this kind is created and dropped with.
    #[must_use]
    pub fn sql_type(self) -> &'static str {
        match self {
            RoutineKind::Procedure => "PROCEDURE",
            RoutineKind::Function => "FUNCTION",
            RoutineKind::Trigger => "TRIGGER",
            RoutineKind::View => "VIEW",
            RoutineKind::XmlSchemaCollection => "XML SCHEMA COLLECTION",
        }
    }

    /// The kind named by a `CREATE` keyword, accepting the `PROC`
    /// shorthand. Multi-word keywords are recognized by their first word.
    fn from_keyword(keyword: &str) -> Option<Self> {
        let first = keyword.split(' ').next().unwrap_or(keyword);
        if first.eq_ignore_ascii_case("PROCEDURE") || first.eq_ignore_ascii_case("PROC") {
            Some(RoutineKind::Procedure)
        } else if first.eq_ignore_ascii_case("FUNCTION") {
            Some(RoutineKind::Function)
        } else if first.eq_ignore_ascii_case("TRIGGER") {
            Some(RoutineKind::Trigger)
        } else if first.eq_ignore_ascii_case("VIEW") {
            Some(RoutineKind::View)
        } else if first.eq_ignore_ascii_case("XML") {
            Some(RoutineKind::XmlSchemaCollection)
        } else {
            None
        }
    }
}

impl core::fmt::Display for RoutineKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.sql_type())
    }
}

/// A stored routine and the session options its definition was created
/// under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routine {
    /// Schema the routine belongs to.
    pub owner: String,
    /// Routine name.
    pub name: String,
    /// What kind of object the definition creates.
    pub kind: RoutineKind,
    /// The `CREATE` batch as stored; empty when the definition could not
    /// be retrieved.
    pub text: String,
    /// Whether the definition was created with `QUOTED_IDENTIFIER ON`.
    pub quoted_id: bool,
    /// Whether the definition was created with `ANSI_NULLS ON`.
    pub ansi_null: bool,
    /// Enable state and target table, for triggers that script one.
    pub trigger: Option<TriggerState>,
}

/// What the loader recovers from a script before deciding what to build.
pub(crate) struct ParsedRoutine<'a> {
    pub(crate) owner: String,
    pub(crate) name: String,
    pub(crate) kind: RoutineKind,
    pub(crate) text: &'a str,
    pub(crate) quoted_id: String,
    pub(crate) ansi_nulls: String,
    pub(crate) extra_batches: Vec<&'a str>,
}

impl Routine {
    /// A routine shell with no definition text, taking its session flags
    /// from the options currently set on `db`.
    #[must_use]
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        kind: RoutineKind,
        db: &Database,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            kind,
            text: String::new(),
            quoted_id: db.prop_value("QUOTED_IDENTIFIER") == "ON",
            ansi_null: db.prop_value("ANSI_NULLS") == "ON",
            trigger: None,
        }
    }

    /// The grammar for the `SET` option batches around a definition.
    ///
    /// `db_quoted_id` and `db_ansi_nulls` are the database-level values; a
    /// clause is omitted on generation when its setting already matches, so
    /// scripts only carry the options that actually deviate.
    #[must_use]
    pub fn props_grammar(db_quoted_id: &str, db_ansi_nulls: &str) -> Grammar {
        Grammar::new(vec![Node::any_order(vec![
            set_option_clause("QuotedId", "QUOTED_IDENTIFIER", db_quoted_id),
            set_option_clause("AnsiNulls", "ANSI_NULLS", db_ansi_nulls),
        ])])
    }

    /// The statement pattern a definition is expected to start with. The
    /// schema-qualified form is tried first; `schema_qualified = false`
    /// accepts a bare name.
    fn head_grammar(schema_qualified: bool) -> Grammar {
        let mut nodes = Node::from_text("CREATE ");
        nodes.push(Node::keyword("RoutineKind", &KIND_KEYWORDS));
        if schema_qualified {
            nodes.push(Node::identifier("Owner"));
            nodes.push(Node::literal("."));
        }
        nodes.push(Node::identifier("Name"));
        Grammar::new(nodes)
    }

    /// Script the definition wrapped in its `SET` option batches.
    ///
    /// # Errors
    ///
    /// Returns an error when one of the surrounding grammars rejects its
    /// bindings, which only happens with session flag values outside
    /// `ON` / `OFF`.
    pub fn script_create(&self, db: &Database) -> Result<String, ScriptError> {
        self.script_base(&self.text, db)
    }

    fn script_base(&self, definition: &str, db: &Database) -> Result<String, ScriptError> {
        let db_quoted_id = db.prop_value("QUOTED_IDENTIFIER");
        let db_ansi_nulls = db.prop_value("ANSI_NULLS");
        let quoted_id = if self.quoted_id { "ON" } else { "OFF" };
        let ansi_nulls = if self.ansi_null { "ON" } else { "OFF" };

        let mut session = Bindings::new();
        session.set("QuotedId", quoted_id)?;
        session.set("AnsiNulls", ansi_nulls)?;
        let before = Self::props_grammar(db_quoted_id, db_ansi_nulls).generate(&session)?;

        // The restore batches swap roles: the routine's own settings become
        // the ones to skip, the database values the ones to emit.
        let mut restore = Bindings::new();
        restore.set("QuotedId", db_quoted_id)?;
        restore.set("AnsiNulls", db_ansi_nulls)?;
        let after = Self::props_grammar(quoted_id, ansi_nulls).generate(&restore)?;

        let mut body = match &self.trigger {
            Some(state) => {
                let mut vars = Bindings::new();
                vars.set("State", if state.disabled { "DISABLE" } else { "ENABLE" })?;
                vars.set("Owner", self.owner.as_str())?;
                vars.set("Name", self.name.as_str())?;
                vars.set("Table.Owner", state.table_owner.as_str())?;
                vars.set("Table.Name", state.table_name.as_str())?;
                format!(
                    "{definition}\nGO\n{}",
                    TriggerState::grammar().generate(&vars)?
                )
            }
            None => String::from(definition),
        };
        if body.is_empty() {
            body = format!(
                "/* missing definition for {} [{}].[{}] */",
                self.kind, self.owner, self.name
            );
        }

        let mut script = before;
        script.push_str(&body);
        if !after.is_empty() {
            script.push_str("\nGO\n");
            script.push_str(&after);
        }
        Ok(script)
    }

    /// Script the definition with its leading `CREATE` rewritten to
    /// `ALTER`, preserving any comments before it.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::CannotAlter`] for XML schema collections,
    /// which SQL Server cannot alter in place, and for definitions that do
    /// not start with `CREATE`.
    pub fn script_alter(&self, db: &Database) -> Result<String, SchemaError> {
        if self.kind != RoutineKind::XmlSchemaCollection {
            let lead = scan::whitespace_run(&self.text);
            let rest = &self.text[lead..];
            if scan::starts_with_ignore_ascii_case(rest, "CREATE") {
                let tail = &rest["CREATE".len()..];
                if scan::whitespace_run(tail) > 0 {
                    let altered = format!("{}ALTER{tail}", &self.text[..lead]);
                    return Ok(self.script_base(&altered, db)?);
                }
            }
        }
        Err(SchemaError::CannotAlter {
            kind: self.kind,
            owner: self.owner.clone(),
            name: self.name.clone(),
        })
    }

    /// Script the statement that drops this routine.
    #[must_use]
    pub fn script_drop(&self) -> String {
        format!("DROP {} [{}].[{}]", self.kind.sql_type(), self.owner, self.name)
    }

    /// Problems worth surfacing before this routine is scripted into a
    /// migration, such as a definition whose name disagrees with the
    /// catalog.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.text.is_empty() {
            warnings.push(String::from("Script definition could not be retrieved."));
            return warnings;
        }
        let parsed = Self::head_grammar(true)
            .parse_prefix(&self.text)
            .or_else(|_| Self::head_grammar(false).parse_prefix(&self.text));
        if let Ok((vars, _)) = parsed {
            let kind = vars
                .require_text("RoutineKind")
                .ok()
                .and_then(RoutineKind::from_keyword);
            let name = vars.require_text("Name").ok();
            if let (Some(kind), Some(name)) = (kind, name) {
                if kind == self.kind && !name.eq_ignore_ascii_case(&self.name) {
                    warnings.push(format!(
                        "Name from script definition '{name}' does not match expected name '{}'",
                        self.name
                    ));
                }
            }
        }
        warnings
    }

    /// Rebuild a routine from its creation script and register it with
    /// `db`.
    ///
    /// Leading `SET QUOTED_IDENTIFIER` / `SET ANSI_NULLS` batches become
    /// session flags rather than part of the stored text. Definitions whose
    /// head names no schema default to `dbo`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyScript`] when no batch is left to parse,
    /// [`SchemaError::Script`] when the definition head does not match, and
    /// [`SchemaError::DuplicateObject`] when the routine is already
    /// registered.
    pub fn from_script(script: &str, db: &mut Database) -> Result<Self, SchemaError> {
        let parsed = Self::extract(script, db)?;
        if db.find_routine(&parsed.owner, &parsed.name).is_some() {
            return Err(SchemaError::DuplicateObject {
                kind: "routine",
                owner: parsed.owner,
                name: parsed.name,
            });
        }
        let routine = Self {
            quoted_id: parsed.quoted_id == "ON",
            ansi_null: parsed.ansi_nulls == "ON",
            owner: parsed.owner,
            name: parsed.name,
            kind: parsed.kind,
            text: String::from(parsed.text),
            trigger: None,
        };
        db.routines.push(routine.clone());
        Ok(routine)
    }

    /// Split `script` into batches, absorb `SET` option batches, and parse
    /// the definition head.
    pub(crate) fn extract<'a>(
        script: &'a str,
        db: &Database,
    ) -> Result<ParsedRoutine<'a>, SchemaError> {
        let mut batches = split_batches(script);
        if batches.is_empty() {
            return Err(SchemaError::EmptyScript);
        }
        let db_quoted_id = db.prop_value("QUOTED_IDENTIFIER");
        let db_ansi_nulls = db.prop_value("ANSI_NULLS");

        // Only the first two batches can be SET option batches; anything
        // later belongs to the object itself.
        let mut options = Bindings::new();
        if batches.len() > 1 {
            let props = Self::props_grammar(db_quoted_id, db_ansi_nulls);
            let mut index = 0;
            let mut examined = 0;
            while index < batches.len() && examined < 2 {
                examined += 1;
                match props.parse(&format!("{}\nGO\n", batches[index])) {
                    Ok(bound) => {
                        options.merge(bound)?;
                        batches.remove(index);
                    }
                    Err(_) => index += 1,
                }
            }
        }
        if batches.is_empty() {
            return Err(SchemaError::EmptyScript);
        }
        let head = batches[0];

        let (vars, _) = Self::head_grammar(true)
            .parse_prefix(head)
            .or_else(|_| Self::head_grammar(false).parse_prefix(head))?;
        let owner = if vars.contains("Owner") {
            String::from(vars.require_text("Owner")?)
        } else {
            String::from("dbo")
        };
        let name = String::from(vars.require_text("Name")?);
        let keyword = vars.require_text("RoutineKind")?;
        let kind = RoutineKind::from_keyword(keyword).ok_or_else(|| ScriptError::InvalidValue {
            name: String::from("RoutineKind"),
            value: String::from(keyword),
            allowed: KIND_KEYWORDS.iter().map(|v| String::from(*v)).collect(),
        })?;

        let quoted_id = if options.contains("QuotedId") {
            String::from(options.require_text("QuotedId")?)
        } else {
            String::from(db_quoted_id)
        };
        let ansi_nulls = if options.contains("AnsiNulls") {
            String::from(options.require_text("AnsiNulls")?)
        } else {
            String::from(db_ansi_nulls)
        };

        Ok(ParsedRoutine {
            owner,
            name,
            kind,
            text: head,
            quoted_id,
            ansi_nulls,
            extra_batches: batches[1..].to_vec(),
        })
    }
}

impl Named for Routine {
    fn owner(&self) -> &str {
        &self.owner
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn set_option_clause(variable: &str, option: &str, db_value: &str) -> Node {
    let mut body = Node::from_text(&format!("SET {option} "));
    body.push(Node::keyword(variable, &["ON", "OFF"]));
    body.push(Node::whitespace('\n', 1));
    body.push(Node::literal("GO"));
    body.push(Node::whitespace('\n', 1));
    Node::optional(variable, &[db_value, ""], body)
}
