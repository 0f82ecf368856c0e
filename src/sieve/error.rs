use crate::sieve::cursor::Mismatch;
use crate::sieve::node::NodeId;

/// Errors raised while parsing, serializing or editing a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SieveError {
    #[error("Syntax error in {schema}: expected {expected} but found \"{snippet}\"")]
    Syntax {
        schema: String,
        expected: String,
        snippet: String,
    },
    #[error("Unknown capability string \"{name}\"")]
    Capability { name: String },
    #[error("Inconsistent line endings: {cr} CR vs {lf} LF")]
    LineEndings { cr: usize, lf: usize },
    #[error("Node {0} no longer exists")]
    StaleNode(NodeId),
    #[error("Node {node} has no element \"{element}\"")]
    NoSuchElement { node: NodeId, element: String },
    #[error("Unknown or unavailable element \"{schema}\"")]
    Unsupported { schema: String },
    #[error("Node {node} is not a {expected}")]
    UnexpectedNode { node: NodeId, expected: &'static str },
    #[error("Removing node {0} would leave an empty list")]
    EmptyList(NodeId),
    #[error("Document was discarded after a failed parse")]
    Discarded,
}

impl SieveError {
    pub fn syntax(schema: &str, mismatch: Mismatch) -> Self {
        Self::Syntax {
            schema: schema.to_string(),
            expected: mismatch.expected,
            snippet: mismatch.snippet,
        }
    }
}

/// Inconsistencies detected while building a grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Schema \"{0}\" is registered twice")]
    Duplicate(String),
    #[error("Schema name \"{0}\" is reserved")]
    Reserved(String),
    #[error("Schema \"{0}\" has no token")]
    MissingToken(String),
    #[error("Cannot extend unknown schema \"{0}\"")]
    UnknownTarget(String),
    #[error("Schema \"{schema}\" references unknown \"{reference}\"")]
    UnknownReference { schema: String, reference: String },
    #[error("Default \"{default}\" of group \"{group}\" matches none of its alternatives")]
    InvalidDefault { group: String, default: String },
}

pub type Result<T> = std::result::Result<T, SieveError>;
