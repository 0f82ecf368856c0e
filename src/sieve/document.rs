/// A SIEVE script as a lossless, mutable node tree.
///
/// The document owns its capability set and node arena. The schema registry
/// is shared and read-only.
use std::borrow::Cow;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::sieve::capabilities::Capabilities;
use crate::sieve::cursor::{escape, Cursor};
use crate::sieve::element::{self, Parser};
use crate::sieve::error::{Result, SieveError};
use crate::sieve::grammar::Grammar;
use crate::sieve::node::*;

const REQUIRE: &str = "require";

/// Serializable view of a subtree, whitespace left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outline {
    pub id: NodeId,
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Outline>,
}

#[derive(Debug)]
pub struct Document {
    pub(crate) grammar: Arc<Grammar>,
    pub(crate) capabilities: Capabilities,
    pub(crate) arena: Arena,
    /// `None` once a parse failed.
    pub(crate) root: Option<NodeId>,
    pub(crate) pinned: BTreeSet<NodeId>,
}

/// Converts every line ending, CRLF, bare CR or bare LF, to CRLF.
pub fn normalize_line_endings(text: &str) -> Result<Cow<'_, str>> {
    let cr = text.matches('\r').count();
    let lf = text.matches('\n').count();
    if cr == lf && text.matches("\r\n").count() == cr {
        return Ok(Cow::Borrowed(text));
    }

    let mut out = String::with_capacity(text.len() + cr.max(lf));
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\r\n");
            }
            '\n' => out.push_str("\r\n"),
            c => out.push(c),
        }
    }
    let (cr, lf) = (out.matches('\r').count(), out.matches('\n').count());
    if cr != lf {
        return Err(SieveError::LineEndings { cr, lf });
    }
    Ok(Cow::Owned(out))
}

impl Document {
    /// An empty script.
    pub fn new(grammar: Arc<Grammar>, capabilities: Capabilities) -> Self {
        let mut arena = Arena::new();
        let imports = arena.insert(IMPORTS, NodeData::Imports(Vec::new()));
        let body = arena.insert(BODY, NodeData::Body(Vec::new()));
        let root = arena.insert(ROOT, NodeData::Root { imports, body });
        Self {
            grammar,
            capabilities,
            arena,
            root: Some(root),
            pinned: BTreeSet::new(),
        }
    }

    pub fn parse(grammar: Arc<Grammar>, capabilities: Capabilities, text: &str) -> Result<Self> {
        let mut document = Self::new(grammar, capabilities);
        document.set_script(text)?;
        Ok(document)
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Replaces the capability set; applies to subsequent parses and edits.
    pub fn set_capabilities(&mut self, capabilities: Capabilities) {
        self.capabilities = capabilities;
    }

    pub fn is_discarded(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Result<NodeId> {
        self.root.ok_or(SieveError::Discarded)
    }

    pub fn imports(&self) -> Result<NodeId> {
        match &self.id(self.root()?)?.data {
            NodeData::Root { imports, .. } => Ok(*imports),
            _ => Err(SieveError::Discarded),
        }
    }

    pub fn body(&self) -> Result<NodeId> {
        match &self.id(self.root()?)?.data {
            NodeData::Root { body, .. } => Ok(*body),
            _ => Err(SieveError::Discarded),
        }
    }

    /// Looks a node up by id. Ids of removed nodes fail with `StaleNode`.
    pub fn id(&self, id: NodeId) -> Result<&Node> {
        self.root()?;
        self.arena.get(id).ok_or(SieveError::StaleNode(id))
    }

    pub(crate) fn parser(&mut self) -> Parser<'_> {
        Parser::new(&self.grammar, &self.capabilities, &mut self.arena)
    }

    /// Replaces the tree with the parse of `text`. On failure the document is
    /// discarded and every later call fails with `Discarded`.
    #[instrument(skip_all, fields(bytes = text.len()))]
    pub fn set_script(&mut self, text: &str) -> Result<NodeId> {
        self.root()?;
        let parsed = normalize_line_endings(text).and_then(|text| {
            let mut arena = Arena::new();
            let root = Parser::new(&self.grammar, &self.capabilities, &mut arena)
                .root(&mut Cursor::new(&text))?;
            Ok((arena, root))
        });

        self.pinned.clear();
        match parsed {
            Ok((arena, root)) => {
                self.arena = arena;
                self.root = Some(root);
                info!(nodes = self.arena.len(), "script parsed");
                Ok(root)
            }
            Err(err) => {
                warn!(%err, "parse failed, discarding document");
                self.arena = Arena::new();
                self.root = None;
                Err(err)
            }
        }
    }

    /// Parses `text` when given one; either way returns the serialized script.
    pub fn script(&mut self, text: Option<&str>) -> Result<String> {
        if let Some(text) = text {
            self.set_script(text)?;
        }
        self.to_script()
    }

    /// Brings the imports in line with what the body uses, then serializes.
    #[instrument(skip_all)]
    pub fn to_script(&mut self) -> Result<String> {
        for name in self.collect_requirements()? {
            self.import_capability(name)?;
        }
        self.serialize(self.root()?)
    }

    /// Text of any subtree, exactly as it would appear in the script.
    pub fn serialize(&self, id: NodeId) -> Result<String> {
        self.id(id)?;
        let mut out = String::new();
        element::write(&self.arena, id, &mut out)?;
        Ok(out)
    }

    /// Capabilities the body needs, whether imported or not.
    pub fn collect_requirements(&self) -> Result<BTreeSet<&'static str>> {
        let mut out = BTreeSet::new();
        element::collect_requirements(
            &self.grammar,
            &self.capabilities,
            &self.arena,
            self.body()?,
            &mut out,
        )?;
        Ok(out)
    }

    fn import_children(&self) -> Result<Vec<NodeId>> {
        let imports = self.imports()?;
        match &self.id(imports)?.data {
            NodeData::Imports(children) => Ok(children.clone()),
            _ => Err(SieveError::UnexpectedNode {
                node: imports,
                expected: IMPORTS,
            }),
        }
    }

    /// Names listed by the `require` statements.
    pub fn imported(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for child in self.import_children()? {
            if self.id(child)?.schema == REQUIRE {
                names.extend(element::imported_names(&self.arena, child)?);
            }
        }
        Ok(names)
    }

    /// Makes sure `name` is imported: extends the last bracketed `require`
    /// list, or adds a statement after the last `require`.
    #[instrument(skip(self))]
    pub fn import_capability(&mut self, name: &str) -> Result<()> {
        if self.imported()?.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            return Ok(());
        }
        let imports = self.imports()?;
        let children = self.import_children()?;
        let last = children
            .iter()
            .rposition(|&child| self.arena.get(child).is_some_and(|n| n.schema == REQUIRE));

        if let Some(position) = last {
            let list = self.get_element(children[position], "capabilities")?;
            if matches!(
                self.id(list)?.data,
                NodeData::StringList { bracketed: true, .. }
            ) {
                self.list_append(list, name)?;
                debug!(name, "extended require list");
                return Ok(());
            }
        }

        let text = format!("require \"{}\";", escape(name));
        let mut parser = self.parser();
        let statement = parser.named(REQUIRE, &mut Cursor::new(&text))?;
        let line_break = parser.spacing("\r\n");
        let inserted = match last {
            Some(_) => [line_break, statement],
            None => [statement, line_break],
        };

        if let Some(NodeData::Imports(list)) = self.arena.get_mut(imports).map(|n| &mut n.data) {
            let at = last.map_or(list.len(), |position| position + 1);
            for (offset, id) in inserted.into_iter().enumerate() {
                list.insert(at + offset, id);
            }
        }
        for id in inserted {
            self.arena.set_parent(id, Some(imports));
        }
        debug!(name, "added require statement");
        Ok(())
    }

    /// Drops every node that is neither reachable from the root nor pinned.
    #[instrument(skip_all)]
    pub fn compact(&mut self) -> Result<usize> {
        let root = self.root()?;
        let mut reachable = HashSet::new();
        let mut stack = vec![root];
        stack.extend(self.pinned.iter().copied());
        while let Some(id) = stack.pop() {
            let Some(node) = self.arena.get(id) else {
                continue;
            };
            if reachable.insert(id) {
                stack.extend(node.data.children());
            }
        }

        let mut removed = 0;
        for id in self.arena.ids() {
            if !reachable.contains(&id) {
                self.arena.remove(id);
                removed += 1;
            }
        }
        self.pinned.retain(|id| reachable.contains(id));
        debug!(removed, live = self.arena.len(), "compacted");
        Ok(removed)
    }

    /// Keeps a detached node (and its subtree) alive across [`Document::compact`].
    pub fn pin(&mut self, id: NodeId) -> Result<()> {
        self.id(id)?;
        self.pinned.insert(id);
        Ok(())
    }

    pub fn unpin(&mut self, id: NodeId) {
        self.pinned.remove(&id);
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn outline(&self, id: NodeId) -> Result<Outline> {
        let node = self.id(id)?;
        let value = match &node.data {
            NodeData::String(_) => Some(element::string_value(&self.arena, id)?),
            NodeData::Number { digits, unit } => Some(format!("{digits}{}", unit.map(String::from).unwrap_or_default())),
            NodeData::Branch { keyword, .. } => Some(keyword.to_ascii_lowercase()),
            _ => None,
        };
        let children = node
            .data
            .children()
            .into_iter()
            .filter(|child| self.arena.get(*child).is_some_and(|n| n.schema != WHITESPACE))
            .map(|child| self.outline(child))
            .collect::<Result<Vec<_>>>()?;
        Ok(Outline {
            id,
            name: node.schema,
            value,
            children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn document(caps: &[&str]) -> Document {
        Document::new(Grammar::standard(), Capabilities::new(caps))
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("keep;\n").unwrap(), "keep;\r\n");
        assert_eq!(normalize_line_endings("keep;\r").unwrap(), "keep;\r\n");
        assert!(matches!(
            normalize_line_endings("keep;\r\n").unwrap(),
            Cow::Borrowed(_)
        ));
        assert_eq!(normalize_line_endings("a\r\nb\n").unwrap(), "a\r\nb\r\n");
        assert_eq!(normalize_line_endings("a\rb\r\nc\n").unwrap(), "a\r\nb\r\nc\r\n");
        assert_eq!(normalize_line_endings("\n\r").unwrap(), "\r\n\r\n");
    }

    #[test]
    fn test_empty_document() {
        let mut doc = document(&[]);
        assert_eq!(doc.to_script().unwrap(), "");
        assert_eq!(doc.set_script("").unwrap(), doc.root().unwrap());
    }

    #[test]
    fn test_failed_parse_discards() {
        let mut doc = document(&[]);
        assert!(doc.set_script("frobnicate;").is_err());
        assert!(doc.is_discarded());
        assert_eq!(doc.to_script(), Err(SieveError::Discarded));
        assert_eq!(doc.set_script("keep;"), Err(SieveError::Discarded));
    }

    #[test]
    fn test_require_inserted_before_body() {
        let mut doc = document(&["fileinto"]);
        doc.set_script("fileinto \"X\";\r\n").unwrap();
        assert_eq!(
            doc.to_script().unwrap(),
            "require \"fileinto\";\r\nfileinto \"X\";\r\n"
        );
    }

    #[test]
    fn test_require_added_after_last_require() {
        let mut doc = document(&["fileinto", "envelope"]);
        doc.set_script("require \"envelope\";\r\n# note\r\nif envelope \"to\" \"x\" { fileinto \"X\"; }\r\n")
            .unwrap();
        assert_eq!(
            doc.to_script().unwrap(),
            "require \"envelope\";\r\nrequire \"fileinto\";\r\n# note\r\nif envelope \"to\" \"x\" { fileinto \"X\"; }\r\n"
        );
    }

    #[test]
    fn test_require_list_extended() {
        let mut doc = document(&["fileinto", "envelope", "copy"]);
        doc.set_script("require [\"envelope\"];\r\nfileinto :copy \"X\";\r\n")
            .unwrap();
        assert_eq!(
            doc.to_script().unwrap(),
            "require [\"envelope\", \"copy\", \"fileinto\"];\r\nfileinto :copy \"X\";\r\n"
        );
    }

    #[test]
    fn test_unused_require_is_kept() {
        let mut doc = document(&["fileinto"]);
        doc.set_script("require \"fileinto\";\r\nkeep;\r\n").unwrap();
        assert_eq!(doc.to_script().unwrap(), "require \"fileinto\";\r\nkeep;\r\n");
    }

    #[test]
    fn test_compact_reclaims_detached_nodes() {
        let mut doc = document(&[]);
        doc.set_script("keep;\r\nstop;\r\n").unwrap();
        let stop = doc.query("stop").unwrap()[0];
        doc.detach(stop).unwrap();
        assert!(doc.compact().unwrap() > 0);
        assert_eq!(doc.id(stop).unwrap_err(), SieveError::StaleNode(stop));
        assert_eq!(doc.to_script().unwrap(), "keep;\r\n\r\n");
    }

    #[test]
    fn test_pinned_node_survives_compact() {
        let mut doc = document(&[]);
        doc.set_script("keep;\r\n").unwrap();
        let stop = doc.create("stop").unwrap();
        doc.pin(stop).unwrap();
        doc.compact().unwrap();
        assert!(doc.id(stop).is_ok());
        doc.unpin(stop);
        doc.compact().unwrap();
        assert!(doc.id(stop).is_err());
    }

    #[test]
    fn test_outline_skips_whitespace() {
        let mut doc = document(&[]);
        doc.set_script("keep;\r\n").unwrap();
        let outline = doc.outline(doc.body().unwrap()).unwrap();
        assert_eq!(outline.name, BODY);
        assert_eq!(outline.children.len(), 1);
        assert_eq!(outline.children[0].name, "keep");
        let json = serde_json::to_value(&outline).unwrap();
        assert_eq!(json["children"][0]["name"], "keep");
    }
}
