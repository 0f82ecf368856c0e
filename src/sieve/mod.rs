/// Sieve scripts as editable, lossless documents.
pub mod capabilities;
pub mod catalog;
pub mod cursor;
pub mod document;
pub mod edit;
pub mod element;
pub mod error;
pub mod grammar;
pub mod node;
pub mod schema;

pub use capabilities::{Capabilities, Requirement};
pub use document::{Document, Outline};
pub use error::{Result, SchemaError, SieveError};
pub use grammar::{Grammar, GrammarBuilder};
pub use node::{NodeData, NodeId};
