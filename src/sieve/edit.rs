/// Generic accessors the editor uses to change a document in place.
///
/// Every edit goes through node ids. New nodes are created detached; they
/// become part of the script once appended, and are reclaimed by
/// [`Document::compact`] if they never are (unless pinned).
use std::sync::Arc;

use crate::sieve::cursor::{self, Cursor};
use crate::sieve::document::{normalize_line_endings, Document};
use crate::sieve::element;
use crate::sieve::error::{Result, SieveError};
use crate::sieve::node::*;
use crate::sieve::schema::{Schema, ACTION, TESTS};

fn builtin_snippet(name: &str) -> Option<&'static str> {
    Some(match name {
        WHITESPACE => "\r\n",
        STRING => "\"\"",
        STRING_LIST => "\"\"",
        NUMBER => "0",
        BLOCK => "{\r\n}",
        CONDITION => "if true {\r\n}",
        BRANCH => "elsif true {\r\n}",
        TEST_LIST => "(true)",
        _ => return None,
    })
}

fn multiplier(unit: Option<char>) -> u64 {
    match unit.map(|u| u.to_ascii_uppercase()) {
        Some('K') => 1 << 10,
        Some('M') => 1 << 20,
        Some('G') => 1 << 30,
        _ => 1,
    }
}

impl Document {
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.id(id)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.root()?;
        self.arena.get_mut(id).ok_or(SieveError::StaleNode(id))
    }

    fn unexpected<T>(id: NodeId, expected: &'static str) -> Result<T> {
        Err(SieveError::UnexpectedNode { node: id, expected })
    }

    /// Grammar schema of a command, test or tag node; `None` for anything else.
    fn structure_schema(&self, id: NodeId) -> Result<Option<&Schema>> {
        let node = self.node(id)?;
        Ok(match node.data {
            NodeData::Structure { .. } => self.grammar.schema(node.schema),
            _ => None,
        })
    }

    /// Tag or parameter `element` of a command, test or tag.
    pub fn get_element(&self, id: NodeId, element: &str) -> Result<NodeId> {
        match &self.node(id)?.data {
            NodeData::Structure { tags, params, .. } => tags
                .iter()
                .find(|tag| tag.id == element)
                .map(|tag| tag.element)
                .or_else(|| params.iter().find(|p| p.id == element).map(|p| p.value))
                .ok_or_else(|| SieveError::NoSuchElement {
                    node: id,
                    element: element.to_string(),
                }),
            NodeData::Group { current, .. } => self.get_element(*current, element),
            _ => Self::unexpected(id, "structure"),
        }
    }

    /// Whether a tag is written out: present, enabled and not an implicit default.
    pub fn is_enabled(&self, id: NodeId, tag: &str) -> Result<bool> {
        let NodeData::Structure { tags, .. } = &self.node(id)?.data else {
            return Self::unexpected(id, "structure");
        };
        Ok(tags.iter().any(|entry| {
            entry.id == tag
                && entry.enabled
                && !matches!(
                    self.arena.get(entry.element).map(|n| &n.data),
                    Some(NodeData::Group { implicit: true, .. })
                )
        }))
    }

    /// Switches an optional tag on or off, creating it from its defaults when
    /// it was absent.
    pub fn enable(&mut self, id: NodeId, tag: &str, enabled: bool) -> Result<()> {
        let grammar = Arc::clone(&self.grammar);
        let schema = match self.node(id)?.data {
            NodeData::Structure { .. } => grammar.schema(self.node(id)?.schema),
            _ => None,
        }
        .ok_or(SieveError::UnexpectedNode {
            node: id,
            expected: "structure",
        })?;
        let no_such = || SieveError::NoSuchElement {
            node: id,
            element: tag.to_string(),
        };
        let slot = schema
            .tag_slot(tag)
            .filter(|slot| self.capabilities.is_capable(&slot.requires))
            .ok_or_else(no_such)?;
        if grammar.visible(slot.element, &self.capabilities).is_none() {
            return Err(SieveError::Unsupported {
                schema: slot.element.to_string(),
            });
        }

        let existing = match &self.node(id)?.data {
            NodeData::Structure { tags, .. } => tags
                .iter()
                .position(|entry| entry.id == tag)
                .map(|index| (index, tags[index].element)),
            _ => return Self::unexpected(id, "structure"),
        };
        match existing {
            Some((index, element)) => {
                if let NodeData::Structure { tags, .. } = &mut self.node_mut(id)?.data {
                    tags[index].enabled = enabled;
                }
                if let Some(NodeData::Group { implicit, .. }) =
                    self.arena.get_mut(element).map(|n| &mut n.data)
                {
                    if enabled {
                        *implicit = false;
                    }
                }
            }
            None if enabled => {
                let element = self.create(slot.element)?;
                let whitespace = self.parser().spacing(" ");
                if let NodeData::Structure { tags, .. } = &mut self.node_mut(id)?.data {
                    tags.push(TagEntry {
                        id: slot.id,
                        whitespace,
                        element,
                        enabled: true,
                    });
                }
                self.arena.set_parent(element, Some(id));
                self.arena.set_parent(whitespace, Some(id));
            }
            None => {}
        }
        Ok(())
    }

    /// Schema name of the alternative a group currently holds.
    pub fn group_value(&self, id: NodeId) -> Result<&'static str> {
        match &self.node(id)?.data {
            NodeData::Group { current, .. } => Ok(self.node(*current)?.schema),
            _ => Self::unexpected(id, "group"),
        }
    }

    /// Replaces a group's alternative with a fresh instance of `alternative`.
    pub fn set_group_value(&mut self, id: NodeId, alternative: &str) -> Result<()> {
        let grammar = Arc::clone(&self.grammar);
        let (group, previous) = match &self.node(id)?.data {
            NodeData::Group { current, .. } => (grammar.schema(self.node(id)?.schema), *current),
            _ => return Self::unexpected(id, "group"),
        };
        let group = group.ok_or_else(|| SieveError::UnexpectedNode { node: id, expected: "group" })?;
        let unsupported = || SieveError::Unsupported {
            schema: alternative.to_string(),
        };
        let spec = group.group.as_ref().ok_or_else(unsupported)?;
        let schema = grammar
            .visible(alternative, &self.capabilities)
            .filter(|schema| spec.items.contains(&schema.category))
            .ok_or_else(unsupported)?;
        let text = grammar.snippet(schema.name).ok_or_else(unsupported)?;

        let current = self.parser().structure(schema, &mut Cursor::new(&text))?;
        let implicit = grammar
            .default_alternative(group, &self.capabilities)
            .is_some_and(|default| default.name == schema.name);
        self.node_mut(id)?.data = NodeData::Group { current, implicit };
        self.arena.set_parent(current, Some(id));
        self.arena.set_parent(previous, None);
        Ok(())
    }

    pub fn string_value(&self, id: NodeId) -> Result<String> {
        self.node(id)?;
        element::string_value(&self.arena, id)
    }

    /// Sets the text of a string node. Literals stay literals; otherwise text
    /// with line breaks becomes a multi-line string and anything else a quoted one.
    pub fn set_string_value(&mut self, id: NodeId, value: &str) -> Result<()> {
        let value = normalize_line_endings(value)?.into_owned();
        let NodeData::String(form) = &mut self.node_mut(id)?.data else {
            return Self::unexpected(id, STRING);
        };
        let next = match &mut *form {
            StringForm::Literal { plus, .. } => StringForm::Literal {
                length: value.len().to_string(),
                plus: *plus,
                text: value,
            },
            StringForm::MultiLine {
                keyword,
                header,
                terminator,
                ..
            } if value.contains("\r\n") => StringForm::MultiLine {
                keyword: std::mem::take(keyword),
                header: std::mem::take(header),
                body: cursor::stuff(&value),
                terminator: std::mem::take(terminator),
            },
            _ if value.contains("\r\n") => StringForm::MultiLine {
                keyword: "text:".to_string(),
                header: "\r\n".to_string(),
                body: cursor::stuff(&value),
                terminator: ".\r\n".to_string(),
            },
            _ => StringForm::Quoted(cursor::escape(&value)),
        };
        *form = next;
        Ok(())
    }

    /// Value of a number node with its K/M/G suffix applied.
    pub fn number_value(&self, id: NodeId) -> Result<u64> {
        match &self.node(id)?.data {
            NodeData::Number { digits, unit } => Ok(digits
                .parse::<u64>()
                .unwrap_or(u64::MAX)
                .saturating_mul(multiplier(*unit))),
            _ => Self::unexpected(id, NUMBER),
        }
    }

    pub fn set_number(&mut self, id: NodeId, value: u64, unit: Option<char>) -> Result<()> {
        let unit = unit
            .map(|u| u.to_ascii_uppercase())
            .filter(|u| matches!(u, 'K' | 'M' | 'G'));
        match &mut self.node_mut(id)?.data {
            NodeData::Number { digits, unit: current } => {
                *digits = value.to_string();
                *current = unit;
                Ok(())
            }
            _ => Self::unexpected(id, NUMBER),
        }
    }

    fn list_items(&self, id: NodeId) -> Result<&[ListItem]> {
        match &self.node(id)?.data {
            NodeData::StringList { items, .. } => Ok(items),
            _ => Self::unexpected(id, STRING_LIST),
        }
    }

    pub fn list_values(&self, id: NodeId) -> Result<Vec<String>> {
        self.list_items(id)?;
        element::list_values(&self.arena, id)
    }

    /// String node at `index` of a string list.
    pub fn list_item(&self, id: NodeId, index: usize) -> Result<NodeId> {
        self.list_items(id)?
            .get(index)
            .map(|item| item.value)
            .ok_or_else(|| SieveError::NoSuchElement {
                node: id,
                element: index.to_string(),
            })
    }

    pub fn list_contains(&self, id: NodeId, value: &str) -> Result<bool> {
        Ok(self.list_values(id)?.iter().any(|v| v == value))
    }

    pub fn list_set_item(&mut self, id: NodeId, index: usize, value: &str) -> Result<()> {
        let item = self.list_item(id, index)?;
        self.set_string_value(item, value)
    }

    /// Appends a string, turning a lone string into a bracketed list.
    pub fn list_append(&mut self, id: NodeId, value: &str) -> Result<NodeId> {
        let separator = if self.list_items(id)?.is_empty() { "" } else { " " };
        let mut parser = self.parser();
        let leading = parser.spacing(separator);
        let string = parser.string(&mut Cursor::new("\"\""))?;
        let trailing = parser.spacing("");
        self.set_string_value(string, value)?;

        if let NodeData::StringList { bracketed, items } = &mut self.node_mut(id)?.data {
            *bracketed = true;
            items.push(ListItem {
                leading,
                value: string,
                trailing,
            });
        }
        for child in [leading, string, trailing] {
            self.arena.set_parent(child, Some(id));
        }
        Ok(string)
    }

    /// Removes the first item equal to `value`. A list keeps at least one item.
    pub fn list_remove(&mut self, id: NodeId, value: &str) -> Result<bool> {
        let Some(index) = self.list_values(id)?.iter().position(|v| v == value) else {
            return Ok(false);
        };
        let removed = match &mut self.node_mut(id)?.data {
            NodeData::StringList { items, .. } if items.len() == 1 => {
                return Err(SieveError::EmptyList(id))
            }
            NodeData::StringList { items, .. } => items.remove(index),
            _ => return Self::unexpected(id, STRING_LIST),
        };
        for child in [removed.leading, removed.value, removed.trailing] {
            self.arena.set_parent(child, None);
        }
        Ok(true)
    }

    /// Detached instance of `name` built from its default source text.
    pub fn create(&mut self, name: &str) -> Result<NodeId> {
        let text = match builtin_snippet(name) {
            Some(text) => text.to_string(),
            None => self
                .grammar
                .snippet(name)
                .ok_or_else(|| SieveError::Unsupported {
                    schema: name.to_string(),
                })?,
        };
        self.create_from(name, &text)
    }

    /// Detached instance of `name` parsed from `text`, which must hold
    /// exactly one such element.
    pub fn create_from(&mut self, name: &str, text: &str) -> Result<NodeId> {
        self.root()?;
        let text = normalize_line_endings(text)?;
        let mut cursor = Cursor::new(&text);
        let id = self.parser().named(name, &mut cursor)?;
        if !cursor.is_empty() {
            return Err(SieveError::syntax(name, cursor.mismatch("end of input")));
        }
        Ok(id)
    }

    fn is_test(&self, id: NodeId) -> Result<bool> {
        Ok(self
            .structure_schema(id)?
            .is_some_and(|s| TESTS.contains(&s.category)))
    }

    fn is_command(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.schema == CONDITION
            || self.structure_schema(id)?.is_some_and(|s| s.category == ACTION))
    }

    /// Whether `ancestor` is `id` itself or one of its parents.
    fn is_within(&self, id: NodeId, ancestor: NodeId) -> Result<bool> {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return Ok(true);
            }
            current = self.node(node)?.parent;
        }
        Ok(false)
    }

    /// Appends a node to a body, block, test list or condition, taking it
    /// out of wherever it was before.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let container = self.node(parent)?.schema;
        let valid = match container {
            BODY | BLOCK => self.is_command(child)?,
            TEST_LIST => self.is_test(child)?,
            CONDITION => self.node(child)?.schema == BRANCH,
            _ => return Self::unexpected(parent, "container"),
        };
        if !valid {
            return Self::unexpected(child, "element for this container");
        }
        if self.is_within(parent, child)? {
            return Self::unexpected(child, "node outside the target's subtree");
        }
        self.detach(child)?;

        let mut owners = vec![(child, parent)];
        match container {
            BODY | BLOCK => {
                let line_break = self.parser().spacing("\r\n");
                owners.push((line_break, parent));
                if let NodeData::Body(children) | NodeData::Block(children) =
                    &mut self.node_mut(parent)?.data
                {
                    children.extend([child, line_break]);
                }
            }
            TEST_LIST => {
                let empty = matches!(&self.node(parent)?.data, NodeData::TestList(items) if items.is_empty());
                let mut parser = self.parser();
                let leading = parser.spacing(if empty { "" } else { " " });
                let trailing = parser.spacing("");
                owners.extend([(leading, parent), (trailing, parent)]);
                if let NodeData::TestList(items) = &mut self.node_mut(parent)?.data {
                    items.push(ListItem {
                        leading,
                        value: child,
                        trailing,
                    });
                }
            }
            _ => {
                let spacing = self.parser().spacing(" ");
                if let NodeData::Branch { leading, .. } = &mut self.node_mut(child)?.data {
                    if leading.is_none() {
                        *leading = Some(spacing);
                        owners.push((spacing, child));
                    }
                }
                if let NodeData::Condition(branches) = &mut self.node_mut(parent)?.data {
                    branches.push(child);
                }
            }
        }
        for (id, owner) in owners {
            self.arena.set_parent(id, Some(owner));
        }
        Ok(())
    }

    /// Unlinks a node from its parent. Only members of a body, block, import
    /// list, condition, string list or test list can be detached, and the
    /// last item of a list stays put.
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(());
        };
        let removed = match &mut self.node_mut(parent)?.data {
            NodeData::Body(children)
            | NodeData::Block(children)
            | NodeData::Imports(children)
            | NodeData::Condition(children) => {
                children.retain(|child| *child != id);
                vec![id]
            }
            NodeData::StringList { items, .. } | NodeData::TestList(items) => {
                match items.iter().position(|item| item.value == id) {
                    Some(_) if items.len() == 1 => return Err(SieveError::EmptyList(parent)),
                    Some(index) => {
                        let item = items.remove(index);
                        vec![item.leading, item.value, item.trailing]
                    }
                    None => Vec::new(),
                }
            }
            _ => return Self::unexpected(parent, "container"),
        };
        for child in removed {
            self.arena.set_parent(child, None);
        }
        Ok(())
    }

    /// Branches of a condition, `if` first.
    pub fn branches(&self, condition: NodeId) -> Result<Vec<NodeId>> {
        match &self.node(condition)?.data {
            NodeData::Condition(branches) => Ok(branches.clone()),
            _ => Self::unexpected(condition, CONDITION),
        }
    }

    /// True for `if`/`elsif` branches, false for the trailing `else`.
    pub fn has_condition(&self, branch: NodeId) -> Result<bool> {
        Ok(self.test_of(branch)?.is_some())
    }

    pub fn test_of(&self, branch: NodeId) -> Result<Option<NodeId>> {
        match &self.node(branch)?.data {
            NodeData::Branch { test, .. } => Ok(test.map(|(_, test)| test)),
            _ => Self::unexpected(branch, BRANCH),
        }
    }

    pub fn block_of(&self, branch: NodeId) -> Result<NodeId> {
        match &self.node(branch)?.data {
            NodeData::Branch { block, .. } => Ok(*block),
            _ => Self::unexpected(branch, BRANCH),
        }
    }

    /// Commands and conditions of a body or block, without the dead code.
    pub fn commands(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let children = match &self.node(id)?.data {
            NodeData::Body(children) | NodeData::Block(children) => children,
            _ => return Self::unexpected(id, BLOCK),
        };
        Ok(children
            .iter()
            .copied()
            .filter(|child| self.arena.get(*child).is_some_and(|n| n.schema != WHITESPACE))
            .collect())
    }

    /// Nodes of schema `name` reachable from the root, in document order.
    pub fn query(&self, name: &str) -> Result<Vec<NodeId>> {
        let mut found = Vec::new();
        let mut stack = vec![self.root()?];
        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            if node.schema == name {
                found.push(id);
            }
            stack.extend(node.data.children().into_iter().rev());
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sieve::capabilities::Capabilities;
    use crate::sieve::grammar::Grammar;
    use pretty_assertions::assert_eq;

    fn parse(caps: &[&str], text: &str) -> Document {
        Document::parse(Grammar::standard(), Capabilities::new(caps), text).unwrap()
    }

    #[test]
    fn test_enable_tag() {
        let mut doc = parse(&["fileinto", "copy"], "fileinto \"X\";");
        let fileinto = doc.query("fileinto").unwrap()[0];
        assert!(!doc.is_enabled(fileinto, "copy").unwrap());

        doc.enable(fileinto, "copy", true).unwrap();
        assert!(doc.is_enabled(fileinto, "copy").unwrap());
        assert_eq!(doc.serialize(fileinto).unwrap(), "fileinto :copy \"X\";");

        doc.enable(fileinto, "copy", false).unwrap();
        assert_eq!(doc.serialize(fileinto).unwrap(), "fileinto \"X\";");
    }

    #[test]
    fn test_enable_unavailable_tag() {
        let mut doc = parse(&["fileinto"], "fileinto \"X\";");
        let fileinto = doc.query("fileinto").unwrap()[0];
        assert!(matches!(
            doc.enable(fileinto, "copy", true),
            Err(SieveError::NoSuchElement { .. })
        ));
    }

    #[test]
    fn test_set_group_value() {
        let mut doc = parse(&[], "if header \"Subject\" \"x\" { keep; }");
        let header = doc.query("header").unwrap()[0];
        let match_type = doc.get_element(header, "match-type").unwrap();
        assert_eq!(doc.group_value(match_type).unwrap(), "match-type/is");
        assert!(!doc.is_enabled(header, "match-type").unwrap());

        doc.set_group_value(match_type, "match-type/contains").unwrap();
        assert_eq!(
            doc.serialize(header).unwrap(),
            "header :contains \"Subject\" \"x\""
        );

        doc.set_group_value(match_type, "match-type/is").unwrap();
        assert_eq!(doc.serialize(header).unwrap(), "header \"Subject\" \"x\"");
        assert!(doc.set_group_value(match_type, "match-type/regex").is_err());
    }

    #[test]
    fn test_string_forms() {
        let mut doc = parse(&["fileinto"], "fileinto \"X\";");
        let fileinto = doc.query("fileinto").unwrap()[0];
        let path = doc.get_element(fileinto, "path").unwrap();

        doc.set_string_value(path, "a \"b\"").unwrap();
        assert_eq!(doc.serialize(path).unwrap(), "\"a \\\"b\\\"\"");
        assert_eq!(doc.string_value(path).unwrap(), "a \"b\"");

        doc.set_string_value(path, "one\n.two").unwrap();
        assert_eq!(doc.serialize(path).unwrap(), "text:\r\none\r\n..two\r\n.\r\n");
        assert_eq!(doc.string_value(path).unwrap(), "one\r\n.two");
    }

    #[test]
    fn test_literal_stays_literal() {
        let mut doc = parse(&["fileinto"], "fileinto {2}\r\nab;");
        let path = doc.get_element(doc.query("fileinto").unwrap()[0], "path").unwrap();
        doc.set_string_value(path, "xyz").unwrap();
        assert_eq!(doc.serialize(path).unwrap(), "{3}\r\nxyz");
    }

    #[test]
    fn test_number_value() {
        let mut doc = parse(&[], "if size :over 10K { stop; }");
        let size = doc.query("size").unwrap()[0];
        let limit = doc.get_element(size, "limit").unwrap();
        assert_eq!(doc.number_value(limit).unwrap(), 10 * 1024);
        doc.set_number(limit, 2, Some('m')).unwrap();
        assert_eq!(doc.serialize(size).unwrap(), "size :over 2M");
    }

    #[test]
    fn test_string_list_editing() {
        let mut doc = parse(&[], "if header \"Subject\" \"a\" { keep; }");
        let header = doc.query("header").unwrap()[0];
        let keys = doc.get_element(header, "keys").unwrap();

        doc.list_append(keys, "b").unwrap();
        assert_eq!(doc.serialize(keys).unwrap(), "[\"a\", \"b\"]");
        assert!(doc.list_contains(keys, "b").unwrap());

        doc.list_set_item(keys, 0, "c").unwrap();
        assert!(doc.list_remove(keys, "b").unwrap());
        assert!(!doc.list_remove(keys, "zzz").unwrap());
        assert_eq!(doc.list_values(keys).unwrap(), vec!["c"]);
        assert_eq!(doc.serialize(keys).unwrap(), "[\"c\"]");
    }

    #[test]
    fn test_append_action_to_block() {
        let mut doc = parse(&[], "if true {\r\n}\r\n");
        let condition = doc.query(CONDITION).unwrap()[0];
        let branch = doc.branches(condition).unwrap()[0];
        let block = doc.block_of(branch).unwrap();

        let stop = doc.create("stop").unwrap();
        doc.append_child(block, stop).unwrap();
        assert_eq!(doc.to_script().unwrap(), "if true {\r\nstop;\r\n}\r\n");
        assert_eq!(doc.node(stop).unwrap().parent, Some(block));
    }

    #[test]
    fn test_append_branch() {
        let mut doc = parse(&[], "if false { stop; }");
        let condition = doc.query(CONDITION).unwrap()[0];
        let branch = doc.create_from(BRANCH, "else { keep; }").unwrap();
        doc.append_child(condition, branch).unwrap();
        assert_eq!(doc.to_script().unwrap(), "if false { stop; } else { keep; }");
        assert!(!doc.has_condition(branch).unwrap());
    }

    #[test]
    fn test_append_test_to_list() {
        let mut doc = parse(&[], "if anyof (true) { stop; }");
        let anyof = doc.query("anyof").unwrap()[0];
        let tests = doc.get_element(anyof, "tests").unwrap();
        let exists = doc.create("exists").unwrap();
        doc.append_child(tests, exists).unwrap();
        assert_eq!(doc.serialize(anyof).unwrap(), "anyof (true, exists \"From\")");

        let keep = doc.create("keep").unwrap();
        assert!(doc.append_child(tests, keep).is_err());
    }

    #[test]
    fn test_create_rejects_trailing_input() {
        let mut doc = parse(&[], "");
        assert!(doc.create_from("keep", "keep; stop;").is_err());
        assert!(matches!(
            doc.create("fileinto"),
            Err(SieveError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_commands_skip_whitespace() {
        let doc = parse(&[], "keep;\r\n# x\r\nstop;\r\n");
        let body = doc.body().unwrap();
        let names: Vec<_> = doc
            .commands(body)
            .unwrap()
            .into_iter()
            .map(|id| doc.node(id).unwrap().schema)
            .collect();
        assert_eq!(names, vec!["keep", "stop"]);
    }

    #[test]
    fn test_append_into_own_subtree_is_rejected() {
        let text = "if true {\r\n  if false {\r\n  }\r\n}\r\n";
        let mut doc = parse(&[], text);
        let conditions = doc.query(CONDITION).unwrap();
        let (outer, inner) = (conditions[0], conditions[1]);
        let inner_block = doc.block_of(doc.branches(inner).unwrap()[0]).unwrap();

        assert_eq!(
            doc.append_child(inner_block, outer),
            Err(SieveError::UnexpectedNode {
                node: outer,
                expected: "node outside the target's subtree",
            })
        );
        let outer_block = doc.block_of(doc.branches(outer).unwrap()[0]).unwrap();
        assert!(doc.append_child(outer_block, outer).is_err());
        assert_eq!(doc.to_script().unwrap(), text);
    }

    #[test]
    fn test_last_list_item_stays() {
        let text = "if header \"Subject\" \"a\" { keep; }";
        let mut doc = parse(&[], text);
        let keys = doc.get_element(doc.query("header").unwrap()[0], "keys").unwrap();
        assert_eq!(doc.list_remove(keys, "a"), Err(SieveError::EmptyList(keys)));
        let only = doc.list_item(keys, 0).unwrap();
        assert_eq!(doc.detach(only), Err(SieveError::EmptyList(keys)));
        assert_eq!(doc.to_script().unwrap(), text);

        let text = "if anyof (true) { stop; }";
        let mut doc = parse(&[], text);
        let tests = doc.get_element(doc.query("anyof").unwrap()[0], "tests").unwrap();
        let only = doc.query("true").unwrap()[0];
        assert_eq!(doc.detach(only), Err(SieveError::EmptyList(tests)));
        assert_eq!(doc.to_script().unwrap(), text);
    }

    #[test]
    fn test_string_test_is_a_test() {
        let mut doc = parse(&["variables"], "if anyof (true) { stop; }");
        let tests = doc.get_element(doc.query("anyof").unwrap()[0], "tests").unwrap();
        let string = doc.create("string").unwrap();
        doc.append_child(tests, string).unwrap();
        assert_eq!(doc.node(string).unwrap().parent, Some(tests));

        let atom = doc.create(STRING).unwrap();
        assert!(doc.append_child(tests, atom).is_err());
    }
}
