//! The bidirectional grammar engine: node primitives, variable bindings,
//! and the driver that interprets one grammar in both directions.
//!
//! A schema adapter builds a [`Grammar`] out of [`Node`] values, then either
//! calls [`Grammar::generate`] with pre-filled [`Bindings`] to emit script
//! text, or [`Grammar::parse`] on script text to get the bindings back.

mod bindings;
mod driver;
mod node;
pub(crate) mod scan;

pub use bindings::{Bindings, Value, ValueKind};
pub use driver::Grammar;
pub(crate) use driver::{SeqOutcome, consume_sequence};
pub use node::Node;
