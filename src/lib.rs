#![doc = include_str!("../README.md")]
#![no_std]
#![deny(clippy::mod_module_files)]

extern crate alloc;

pub mod batch;
pub mod errors;
pub mod schema;
pub mod script;

// Re-export main types
pub use batch::split_batches;
pub use errors::ScriptError;
pub use schema::{
    Database, DbProp, ForeignKey, Named, Routine, RoutineKind, SchemaError, Synonym, Table,
    TriggerState,
};
pub use script::{Bindings, Grammar, Node, Value, ValueKind};
