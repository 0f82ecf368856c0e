/// Node arena with generational ids.
///
/// Every node of a document lives in one [`Arena`]. Ids carry a generation
/// drawn from a process-wide counter, so an id is never reused: looking up a
/// removed node fails instead of returning whatever took its slot.
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

// Built-in node kinds. Their names never match a grammar schema.
pub const WHITESPACE: &str = "atom/whitespace";
pub const STRING: &str = "atom/string";
pub const STRING_LIST: &str = "atom/stringlist";
pub const NUMBER: &str = "atom/number";
pub const BLOCK: &str = "block/block";
pub const BODY: &str = "block/body";
pub const IMPORTS: &str = "block/imports";
pub const ROOT: &str = "block/root";
pub const CONDITION: &str = "condition";
pub const BRANCH: &str = "condition/branch";
pub const TEST_LIST: &str = "operator/testlist";

/// Names a grammar may not register.
pub const BUILTINS: &[&str] = &[
    WHITESPACE, STRING, STRING_LIST, NUMBER, BLOCK, BODY, IMPORTS, ROOT, CONDITION, BRANCH,
    TEST_LIST, "test",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId {
    index: u32,
    generation: u64,
}

impl NodeId {
    /// The process-unique number of this node.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.generation)
    }
}

/// One piece of whitespace or comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeadCode {
    Blank(String),
    LineBreak,
    /// `#` comment; unterminated only at the very end of a script.
    HashComment { text: String, terminated: bool },
    BracketComment(String),
}

impl DeadCode {
    pub fn write(&self, out: &mut String) {
        match self {
            Self::Blank(text) => out.push_str(text),
            Self::LineBreak => out.push_str("\r\n"),
            Self::HashComment { text, terminated } => {
                out.push('#');
                out.push_str(text);
                if *terminated {
                    out.push_str("\r\n");
                }
            }
            Self::BracketComment(text) => {
                out.push_str("/*");
                out.push_str(text);
                out.push_str("*/");
            }
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Self::HashComment { .. } | Self::BracketComment(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringForm {
    /// Body between the quotes, escapes as written.
    Quoted(String),
    MultiLine {
        keyword: String,
        header: String,
        body: String,
        terminator: String,
    },
    Literal {
        length: String,
        plus: bool,
        text: String,
    },
}

/// An element of a comma separated list with the dead code around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListItem {
    pub leading: NodeId,
    pub value: NodeId,
    pub trailing: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagEntry {
    pub id: &'static str,
    pub whitespace: NodeId,
    pub element: NodeId,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamEntry {
    pub id: &'static str,
    pub whitespace: NodeId,
    pub value: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Whitespace(Vec<DeadCode>),
    String(StringForm),
    StringList {
        bracketed: bool,
        items: Vec<ListItem>,
    },
    Number {
        digits: String,
        unit: Option<char>,
    },
    /// Schema-driven construct: token, tags in source order, parameters in
    /// schema order and, for commands, the dead code before `;`.
    Structure {
        token: String,
        tags: Vec<TagEntry>,
        params: Vec<ParamEntry>,
        terminator: Option<NodeId>,
    },
    Group {
        current: NodeId,
        /// Default alternative, left out when serializing.
        implicit: bool,
    },
    Block(Vec<NodeId>),
    Body(Vec<NodeId>),
    Imports(Vec<NodeId>),
    Root {
        imports: NodeId,
        body: NodeId,
    },
    Condition(Vec<NodeId>),
    Branch {
        leading: Option<NodeId>,
        keyword: String,
        test: Option<(NodeId, NodeId)>,
        block_whitespace: NodeId,
        block: NodeId,
    },
    TestList(Vec<ListItem>),
}

impl NodeData {
    /// Direct children in serialization order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Self::Whitespace(_) | Self::String(_) | Self::Number { .. } => Vec::new(),
            Self::StringList { items, .. } | Self::TestList(items) => items
                .iter()
                .flat_map(|item| [item.leading, item.value, item.trailing])
                .collect(),
            Self::Structure {
                tags,
                params,
                terminator,
                ..
            } => tags
                .iter()
                .flat_map(|tag| [tag.whitespace, tag.element])
                .chain(params.iter().flat_map(|p| [p.whitespace, p.value]))
                .chain(*terminator)
                .collect(),
            Self::Group { current, .. } => vec![*current],
            Self::Block(children)
            | Self::Body(children)
            | Self::Imports(children)
            | Self::Condition(children) => children.clone(),
            Self::Root { imports, body } => vec![*imports, *body],
            Self::Branch {
                leading,
                test,
                block_whitespace,
                block,
                ..
            } => leading
                .iter()
                .copied()
                .chain(test.iter().flat_map(|(ws, test)| [*ws, *test]))
                .chain([*block_whitespace, *block])
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub schema: &'static str,
    pub parent: Option<NodeId>,
    pub data: NodeData,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    node: Option<Node>,
}

#[derive(Debug, Default)]
pub struct Arena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a node and points its children back at it.
    pub fn insert(&mut self, schema: &'static str, data: NodeData) -> NodeId {
        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        let children = data.children();
        let node = Node {
            schema,
            parent: None,
            data,
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize] = Slot {
                    generation,
                    node: Some(node),
                };
                index
            }
            None => {
                self.slots.push(Slot {
                    generation,
                    node: Some(node),
                });
                (self.slots.len() - 1) as u32
            }
        };
        let id = NodeId { index, generation };
        for child in children {
            self.set_parent(child, Some(id));
        }
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(node) = self.get_mut(id) {
            node.parent = parent;
        }
    }

    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?;
        let node = slot.node.take()?;
        self.free.push(id.index);
        Some(node)
    }

    /// Ids of all live nodes.
    pub fn ids(&self) -> Vec<NodeId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.node.is_some())
            .map(|(index, slot)| NodeId {
                index: index as u32,
                generation: slot.generation,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
