/// Generic parse/serialize engine.
///
/// One routine handles every schema-driven construct: token, tags in any
/// order, positional parameters in schema order, terminator. Dead code is kept
/// as whitespace nodes between the semantic children so that writing a tree
/// back reproduces its source byte for byte.
use std::collections::BTreeSet;

use tracing::trace;

use crate::sieve::capabilities::Capabilities;
use crate::sieve::cursor::{self, Cursor, Mismatch};
use crate::sieve::error::{Result, SieveError};
use crate::sieve::grammar::Grammar;
use crate::sieve::node::*;
use crate::sieve::schema::{ParamSlot, Schema, TagSlot, Value, ACTION, IMPORT, TESTS};

trait SyntaxContext<T> {
    fn in_schema(self, schema: &str) -> Result<T>;
}

impl<T> SyntaxContext<T> for std::result::Result<T, Mismatch> {
    fn in_schema(self, schema: &str) -> Result<T> {
        self.map_err(|mismatch| SieveError::syntax(schema, mismatch))
    }
}

/// Builds nodes from a cursor into an arena.
pub struct Parser<'d> {
    grammar: &'d Grammar,
    capabilities: &'d Capabilities,
    arena: &'d mut Arena,
}

impl<'d> Parser<'d> {
    pub fn new(grammar: &'d Grammar, capabilities: &'d Capabilities, arena: &'d mut Arena) -> Self {
        Self {
            grammar,
            capabilities,
            arena,
        }
    }

    fn insert(&mut self, schema: &'static str, data: NodeData) -> NodeId {
        self.arena.insert(schema, data)
    }

    /// Whitespace node made of blanks and line breaks only.
    pub fn spacing(&mut self, text: &str) -> NodeId {
        let mut pieces = Vec::new();
        for (i, line) in text.split("\r\n").enumerate() {
            if i > 0 {
                pieces.push(DeadCode::LineBreak);
            }
            if !line.is_empty() {
                pieces.push(DeadCode::Blank(line.to_string()));
            }
        }
        self.insert(WHITESPACE, NodeData::Whitespace(pieces))
    }

    /// Consumes any run of dead code, possibly empty.
    pub fn whitespace(&mut self, cursor: &mut Cursor) -> Result<NodeId> {
        let mut pieces = Vec::new();
        loop {
            if cursor.is_char(' ') || cursor.is_char('\t') {
                let blank = cursor.extract_while(|c| c == ' ' || c == '\t');
                pieces.push(DeadCode::Blank(blank.to_string()));
            } else if cursor.starts_with("\r\n") {
                cursor.extract("\r\n").in_schema(WHITESPACE)?;
                pieces.push(DeadCode::LineBreak);
            } else if cursor.is_char('#') {
                cursor.extract_char('#').in_schema(WHITESPACE)?;
                let (text, terminated) = match cursor.extract_until("\r\n") {
                    Ok(text) => (text, true),
                    Err(_) => (cursor.extract_while(|_| true), false),
                };
                pieces.push(DeadCode::HashComment {
                    text: text.to_string(),
                    terminated,
                });
            } else if cursor.starts_with("/*") {
                cursor.extract("/*").in_schema(WHITESPACE)?;
                let text = cursor.extract_until("*/").in_schema(WHITESPACE)?;
                pieces.push(DeadCode::BracketComment(text.to_string()));
            } else {
                break;
            }
        }
        Ok(self.insert(WHITESPACE, NodeData::Whitespace(pieces)))
    }

    pub fn string(&mut self, cursor: &mut Cursor) -> Result<NodeId> {
        let form = if cursor.is_char('"') {
            StringForm::Quoted(cursor.extract_quoted().in_schema(STRING)?.to_string())
        } else if cursor.is_char('{') {
            let literal = cursor.extract_literal().in_schema(STRING)?;
            StringForm::Literal {
                length: literal.length.to_string(),
                plus: literal.plus,
                text: literal.text.to_string(),
            }
        } else if cursor.starts_with("text:") {
            let parts = cursor.extract_multiline().in_schema(STRING)?;
            StringForm::MultiLine {
                keyword: parts.keyword.to_string(),
                header: parts.header.to_string(),
                body: parts.body.to_string(),
                terminator: parts.terminator.to_string(),
            }
        } else {
            return Err(SieveError::syntax(STRING, cursor.mismatch("string")));
        };
        Ok(self.insert(STRING, NodeData::String(form)))
    }

    /// A single string or `[ string *("," string) ]`.
    pub fn string_list(&mut self, cursor: &mut Cursor) -> Result<NodeId> {
        if !cursor.is_char('[') {
            let leading = self.spacing("");
            let value = self.string(cursor)?;
            let trailing = self.spacing("");
            let items = vec![ListItem {
                leading,
                value,
                trailing,
            }];
            return Ok(self.insert(
                STRING_LIST,
                NodeData::StringList {
                    bracketed: false,
                    items,
                },
            ));
        }

        cursor.extract_char('[').in_schema(STRING_LIST)?;
        let mut items = Vec::new();
        loop {
            let leading = self.whitespace(cursor)?;
            let value = self.string(cursor)?;
            let trailing = self.whitespace(cursor)?;
            items.push(ListItem {
                leading,
                value,
                trailing,
            });
            if cursor.extract_char(',').is_ok() {
                continue;
            }
            cursor
                .extract_char(']')
                .map_err(|_| SieveError::syntax(STRING_LIST, cursor.mismatch("',' or ']'")))?;
            break;
        }
        Ok(self.insert(
            STRING_LIST,
            NodeData::StringList {
                bracketed: true,
                items,
            },
        ))
    }

    pub fn number(&mut self, cursor: &mut Cursor) -> Result<NodeId> {
        let (digits, unit) = cursor.extract_number().in_schema(NUMBER)?;
        Ok(self.insert(
            NUMBER,
            NodeData::Number {
                digits: digits.to_string(),
                unit,
            },
        ))
    }

    /// Any visible test or operator.
    pub fn test(&mut self, cursor: &mut Cursor) -> Result<NodeId> {
        let grammar = self.grammar;
        let schema = grammar
            .probe_class(TESTS, self.capabilities, cursor)
            .ok_or_else(|| SieveError::syntax("test", cursor.mismatch("test")))?;
        self.element(schema, cursor)
    }

    pub fn test_list(&mut self, cursor: &mut Cursor) -> Result<NodeId> {
        cursor.extract_char('(').in_schema(TEST_LIST)?;
        let mut items = Vec::new();
        loop {
            let leading = self.whitespace(cursor)?;
            let value = self.test(cursor)?;
            let trailing = self.whitespace(cursor)?;
            items.push(ListItem {
                leading,
                value,
                trailing,
            });
            if cursor.extract_char(',').is_ok() {
                continue;
            }
            cursor
                .extract_char(')')
                .map_err(|_| SieveError::syntax(TEST_LIST, cursor.mismatch("',' or ')'")))?;
            break;
        }
        Ok(self.insert(TEST_LIST, NodeData::TestList(items)))
    }

    fn value(&mut self, value: Value, cursor: &mut Cursor) -> Result<NodeId> {
        match value {
            Value::String => self.string(cursor),
            Value::StringList => self.string_list(cursor),
            Value::Number => self.number(cursor),
            Value::Test => self.test(cursor),
            Value::TestList => self.test_list(cursor),
            Value::Schema(name) => {
                let grammar = self.grammar;
                let schema = grammar
                    .visible(name, self.capabilities)
                    .ok_or_else(|| SieveError::Unsupported {
                        schema: name.to_string(),
                    })?;
                self.element(schema, cursor)
            }
        }
    }

    pub fn element(&mut self, schema: &'d Schema, cursor: &mut Cursor) -> Result<NodeId> {
        if schema.is_group() {
            self.group(schema, cursor)
        } else {
            self.structure(schema, cursor)
        }
    }

    pub fn group(&mut self, schema: &'d Schema, cursor: &mut Cursor) -> Result<NodeId> {
        let grammar = self.grammar;
        let (alternative, _) = grammar
            .resolve(schema, self.capabilities, cursor)
            .ok_or_else(|| SieveError::syntax(schema.name, cursor.mismatch(schema.name)))?;
        let current = self.structure(alternative, cursor)?;
        Ok(self.insert(
            schema.name,
            NodeData::Group {
                current,
                implicit: false,
            },
        ))
    }

    pub fn structure(&mut self, schema: &'d Schema, cursor: &mut Cursor) -> Result<NodeId> {
        trace!(schema = schema.name, at = cursor.position(), "structure");
        let token = match schema.token {
            Some(token) => cursor.extract_keyword(token).in_schema(schema.name)?.to_string(),
            None => String::new(),
        };
        let tags = self.tags(schema, cursor)?;
        let params = self.params(schema, cursor)?;
        let terminator = if schema.terminated {
            let whitespace = self.whitespace(cursor)?;
            cursor.extract_char(';').in_schema(schema.name)?;
            Some(whitespace)
        } else {
            None
        };
        Ok(self.insert(
            schema.name,
            NodeData::Structure {
                token,
                tags,
                params,
                terminator,
            },
        ))
    }

    fn tags(&mut self, schema: &'d Schema, cursor: &mut Cursor) -> Result<Vec<TagEntry>> {
        let grammar = self.grammar;
        let capabilities = self.capabilities;
        let slots: Vec<(&TagSlot, &Schema)> = schema
            .tags
            .iter()
            .filter(|slot| capabilities.is_capable(&slot.requires))
            .filter_map(|slot| {
                grammar
                    .visible(slot.element, capabilities)
                    .map(|element| (slot, element))
            })
            .collect();

        let mut consumed = vec![false; slots.len()];
        let mut entries = Vec::new();
        loop {
            let mut look = *cursor;
            look.skip_dead_code();
            let mut best: Option<(usize, usize)> = None;
            for (i, (_, element)) in slots.iter().enumerate() {
                if consumed[i] {
                    continue;
                }
                let Some((_, len)) = grammar.resolve(element, capabilities, &look) else {
                    continue;
                };
                match best {
                    Some((_, best_len)) if best_len >= len => {}
                    _ => best = Some((i, len)),
                }
            }
            let Some((i, _)) = best else {
                break;
            };

            consumed[i] = true;
            let (slot, element) = slots[i];
            let whitespace = self.whitespace(cursor)?;
            let node = self.element(element, cursor)?;
            if element.is_group() {
                self.mark_explicit_default(element, node, whitespace);
            }
            entries.push(TagEntry {
                id: slot.id,
                whitespace,
                element: node,
                enabled: true,
            });
        }

        for (i, &(slot, element)) in slots.iter().enumerate() {
            let Some(group) = element.group.as_ref().filter(|_| !consumed[i]) else {
                continue;
            };
            if group.mandatory {
                return Err(SieveError::syntax(
                    schema.name,
                    cursor.mismatch(format!("{} tag", slot.id)),
                ));
            }
            if let Some(entry) = self.implicit_entry(slot, element)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Tag entry holding a group's default alternative, omitted on output.
    pub fn implicit_entry(&mut self, slot: &TagSlot, group: &'d Schema) -> Result<Option<TagEntry>> {
        let Some(default) = group.group.as_ref().and_then(|g| g.default) else {
            return Ok(None);
        };
        let whitespace = self.spacing(" ");
        let element = self.group(group, &mut Cursor::new(default))?;
        if let Some(NodeData::Group { implicit, .. }) = self.arena.get_mut(element).map(|n| &mut n.data) {
            *implicit = true;
        }
        Ok(Some(TagEntry {
            id: slot.id,
            whitespace,
            element,
            enabled: true,
        }))
    }

    /// A default written out in the source is treated like an absent one,
    /// unless comments precede it.
    fn mark_explicit_default(&mut self, group: &Schema, node: NodeId, whitespace: NodeId) {
        let Some(default) = self.grammar.default_alternative(group, self.capabilities) else {
            return;
        };
        let plain = matches!(
            self.arena.get(whitespace).map(|n| &n.data),
            Some(NodeData::Whitespace(pieces)) if !pieces.iter().any(DeadCode::is_comment)
        );
        let current = match self.arena.get(node).map(|n| &n.data) {
            Some(NodeData::Group { current, .. }) => *current,
            _ => return,
        };
        let is_default = self
            .arena
            .get(current)
            .is_some_and(|n| n.schema == default.name);
        if !(plain && is_default) {
            return;
        }
        if let Some(NodeData::Group { implicit, .. }) = self.arena.get_mut(node).map(|n| &mut n.data) {
            *implicit = true;
        }
    }

    fn params(&mut self, schema: &'d Schema, cursor: &mut Cursor) -> Result<Vec<ParamEntry>> {
        let capabilities = self.capabilities;
        let slots: Vec<&ParamSlot> = schema
            .params
            .iter()
            .filter(|slot| capabilities.is_capable(&slot.requires))
            .collect();

        let mut entries = Vec::new();
        for (i, slot) in slots.iter().enumerate() {
            if slot.optional {
                let required_after = slots[i + 1..].iter().filter(|s| !s.optional).count();
                if count_values(cursor) <= required_after {
                    continue;
                }
            }
            let whitespace = self.whitespace(cursor)?;
            let value = self.value(slot.value, cursor)?;
            entries.push(ParamEntry {
                id: slot.id,
                whitespace,
                value,
            });
        }
        Ok(entries)
    }

    pub fn block(&mut self, cursor: &mut Cursor) -> Result<NodeId> {
        cursor.extract_char('{').in_schema(BLOCK)?;
        let children = self.commands(cursor)?;
        cursor
            .extract_char('}')
            .map_err(|_| SieveError::syntax(BLOCK, cursor.mismatch("action, condition or '}'")))?;
        Ok(self.insert(BLOCK, NodeData::Block(children)))
    }

    fn commands(&mut self, cursor: &mut Cursor) -> Result<Vec<NodeId>> {
        let grammar = self.grammar;
        let mut children = Vec::new();
        loop {
            if cursor.is_dead_code() {
                children.push(self.whitespace(cursor)?);
            } else if cursor.starts_with_keyword("if") {
                children.push(self.condition(cursor)?);
            } else if let Some(schema) = grammar.probe_class(&[ACTION], self.capabilities, cursor) {
                children.push(self.structure(schema, cursor)?);
            } else {
                return Ok(children);
            }
        }
    }

    pub fn body(&mut self, cursor: &mut Cursor) -> Result<NodeId> {
        let children = self.commands(cursor)?;
        Ok(self.insert(BODY, NodeData::Body(children)))
    }

    /// `if` branch, any number of `elsif` branches, at most one `else`.
    pub fn condition(&mut self, cursor: &mut Cursor) -> Result<NodeId> {
        let mut branches = vec![self.branch(None, "if", cursor)?];
        loop {
            let mut look = *cursor;
            look.skip_dead_code();
            let keyword = if look.starts_with_keyword("elsif") {
                "elsif"
            } else if look.starts_with_keyword("else") {
                "else"
            } else {
                break;
            };
            let leading = self.whitespace(cursor)?;
            branches.push(self.branch(Some(leading), keyword, cursor)?);
            if keyword == "else" {
                break;
            }
        }
        Ok(self.insert(CONDITION, NodeData::Condition(branches)))
    }

    fn branch(&mut self, leading: Option<NodeId>, keyword: &str, cursor: &mut Cursor) -> Result<NodeId> {
        let keyword = cursor.extract_keyword(keyword).in_schema(CONDITION)?.to_string();
        let test = if keyword.eq_ignore_ascii_case("else") {
            None
        } else {
            let whitespace = self.whitespace(cursor)?;
            Some((whitespace, self.test(cursor)?))
        };
        let block_whitespace = self.whitespace(cursor)?;
        let block = self.block(cursor)?;
        Ok(self.insert(
            BRANCH,
            NodeData::Branch {
                leading,
                keyword,
                test,
                block_whitespace,
                block,
            },
        ))
    }

    /// Leading `require` statements and the dead code around them. Every
    /// imported name must be in the capability set.
    pub fn imports(&mut self, cursor: &mut Cursor) -> Result<NodeId> {
        let grammar = self.grammar;
        let mut children = Vec::new();
        loop {
            if cursor.is_dead_code() {
                children.push(self.whitespace(cursor)?);
                continue;
            }
            let Some(schema) = grammar.probe_class(&[IMPORT], self.capabilities, cursor) else {
                break;
            };
            let node = self.structure(schema, cursor)?;
            for name in imported_names(self.arena, node)? {
                if !self.capabilities.is_enabled(&name) {
                    return Err(SieveError::Capability { name });
                }
            }
            children.push(node);
        }
        Ok(self.insert(IMPORTS, NodeData::Imports(children)))
    }

    pub fn root(&mut self, cursor: &mut Cursor) -> Result<NodeId> {
        let imports = self.imports(cursor)?;
        let body = self.body(cursor)?;
        if !cursor.is_empty() {
            return Err(SieveError::syntax(ROOT, cursor.mismatch("action or condition")));
        }
        Ok(self.insert(ROOT, NodeData::Root { imports, body }))
    }

    /// Parses one element by schema or built-in name.
    pub fn named(&mut self, name: &str, cursor: &mut Cursor) -> Result<NodeId> {
        match name {
            WHITESPACE => self.whitespace(cursor),
            STRING => self.string(cursor),
            STRING_LIST => self.string_list(cursor),
            NUMBER => self.number(cursor),
            BLOCK => self.block(cursor),
            CONDITION => self.condition(cursor),
            BRANCH => {
                let keyword = ["elsif", "else"]
                    .into_iter()
                    .find(|keyword| cursor.starts_with_keyword(keyword))
                    .unwrap_or("if");
                self.branch(None, keyword, cursor)
            }
            TEST_LIST => self.test_list(cursor),
            "test" => self.test(cursor),
            _ => {
                let grammar = self.grammar;
                let schema = grammar
                    .visible(name, self.capabilities)
                    .ok_or_else(|| SieveError::Unsupported {
                        schema: name.to_string(),
                    })?;
                self.element(schema, cursor)
            }
        }
    }
}

/// Number of strings, string lists or numbers directly ahead.
fn count_values(cursor: &Cursor) -> usize {
    let mut look = *cursor;
    let mut count = 0;
    loop {
        look.skip_dead_code();
        if !look.skip_value() {
            return count;
        }
        count += 1;
    }
}

fn node(arena: &Arena, id: NodeId) -> Result<&Node> {
    arena.get(id).ok_or(SieveError::StaleNode(id))
}

/// Decoded text of a string node.
pub fn string_value(arena: &Arena, id: NodeId) -> Result<String> {
    match &node(arena, id)?.data {
        NodeData::String(StringForm::Quoted(raw)) => Ok(cursor::unescape(raw)),
        NodeData::String(StringForm::MultiLine { body, .. }) => Ok(cursor::unstuff(body)),
        NodeData::String(StringForm::Literal { text, .. }) => Ok(text.clone()),
        _ => Err(SieveError::UnexpectedNode {
            node: id,
            expected: STRING,
        }),
    }
}

/// Decoded items of a string list (or of a lone string).
pub fn list_values(arena: &Arena, id: NodeId) -> Result<Vec<String>> {
    match &node(arena, id)?.data {
        NodeData::StringList { items, .. } => items
            .iter()
            .map(|item| string_value(arena, item.value))
            .collect(),
        NodeData::String(_) => Ok(vec![string_value(arena, id)?]),
        _ => Err(SieveError::UnexpectedNode {
            node: id,
            expected: STRING_LIST,
        }),
    }
}

/// Capability names listed by a `require` statement.
pub fn imported_names(arena: &Arena, id: NodeId) -> Result<Vec<String>> {
    let NodeData::Structure { params, .. } = &node(arena, id)?.data else {
        return Ok(Vec::new());
    };
    let mut names = Vec::new();
    for param in params {
        names.extend(list_values(arena, param.value)?);
    }
    Ok(names)
}

fn is_implicit(arena: &Arena, id: NodeId) -> bool {
    matches!(
        arena.get(id).map(|n| &n.data),
        Some(NodeData::Group { implicit: true, .. })
    )
}

/// Keyword a branch is written with: the source spelling while it still
/// fits the branch's position, the canonical one otherwise.
fn branch_keyword<'a>(arena: &Arena, id: NodeId, node: &Node, keyword: &'a str, has_test: bool) -> &'a str {
    let first = node
        .parent
        .and_then(|parent| arena.get(parent))
        .and_then(|parent| match &parent.data {
            NodeData::Condition(branches) => branches.first().copied(),
            _ => None,
        })
        .map_or(true, |first| first == id);
    let role = match (has_test, first) {
        (false, _) => "else",
        (true, true) => "if",
        (true, false) => "elsif",
    };
    if keyword.eq_ignore_ascii_case(role) {
        keyword
    } else {
        role
    }
}

fn write_items(arena: &Arena, items: &[ListItem], out: &mut String) -> Result<()> {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write(arena, item.leading, out)?;
        write(arena, item.value, out)?;
        write(arena, item.trailing, out)?;
    }
    Ok(())
}

/// Serializes the subtree at `id`.
pub fn write(arena: &Arena, id: NodeId, out: &mut String) -> Result<()> {
    let node = node(arena, id)?;
    match &node.data {
        NodeData::Whitespace(pieces) => pieces.iter().for_each(|piece| piece.write(out)),
        NodeData::String(StringForm::Quoted(raw)) => {
            out.push('"');
            out.push_str(raw);
            out.push('"');
        }
        NodeData::String(StringForm::MultiLine {
            keyword,
            header,
            body,
            terminator,
        }) => {
            out.push_str(keyword);
            out.push_str(header);
            out.push_str(body);
            out.push_str(terminator);
        }
        NodeData::String(StringForm::Literal { length, plus, text }) => {
            out.push('{');
            out.push_str(length);
            if *plus {
                out.push('+');
            }
            out.push_str("}\r\n");
            out.push_str(text);
        }
        NodeData::StringList { bracketed, items } => {
            if *bracketed {
                out.push('[');
            }
            write_items(arena, items, out)?;
            if *bracketed {
                out.push(']');
            }
        }
        NodeData::Number { digits, unit } => {
            out.push_str(digits);
            if let Some(unit) = unit {
                out.push(*unit);
            }
        }
        NodeData::Structure {
            token,
            tags,
            params,
            terminator,
        } => {
            out.push_str(token);
            for tag in tags {
                if !tag.enabled || is_implicit(arena, tag.element) {
                    continue;
                }
                write(arena, tag.whitespace, out)?;
                write(arena, tag.element, out)?;
            }
            for param in params {
                write(arena, param.whitespace, out)?;
                write(arena, param.value, out)?;
            }
            if let Some(whitespace) = terminator {
                write(arena, *whitespace, out)?;
                out.push(';');
            }
        }
        NodeData::Group { current, .. } => write(arena, *current, out)?,
        NodeData::Block(children) => {
            out.push('{');
            for child in children {
                write(arena, *child, out)?;
            }
            out.push('}');
        }
        NodeData::Body(children) | NodeData::Imports(children) | NodeData::Condition(children) => {
            for child in children {
                write(arena, *child, out)?;
            }
        }
        NodeData::Root { imports, body } => {
            write(arena, *imports, out)?;
            write(arena, *body, out)?;
        }
        NodeData::Branch {
            leading,
            keyword,
            test,
            block_whitespace,
            block,
        } => {
            if let Some(leading) = leading {
                write(arena, *leading, out)?;
            }
            out.push_str(branch_keyword(arena, id, node, keyword, test.is_some()));
            if let Some((whitespace, test)) = test {
                write(arena, *whitespace, out)?;
                write(arena, *test, out)?;
            }
            write(arena, *block_whitespace, out)?;
            write(arena, *block, out)?;
        }
        NodeData::TestList(items) => {
            out.push('(');
            write_items(arena, items, out)?;
            out.push(')');
        }
    }
    Ok(())
}

/// Adds every capability the subtree at `id` needs to `out`.
pub fn collect_requirements(
    grammar: &Grammar,
    capabilities: &Capabilities,
    arena: &Arena,
    id: NodeId,
    out: &mut BTreeSet<&'static str>,
) -> Result<()> {
    let node = node(arena, id)?;
    let schema = match node.data {
        NodeData::Structure { .. } | NodeData::Group { .. } => grammar.schema(node.schema),
        _ => None,
    };
    if let Some(schema) = schema {
        schema.requires.collect(capabilities, out);
    }
    match &node.data {
        NodeData::Structure { tags, params, .. } => {
            for tag in tags.iter().filter(|tag| tag.enabled) {
                if let Some(slot) = schema.and_then(|s| s.tag_slot(tag.id)) {
                    slot.requires.collect(capabilities, out);
                }
                collect_requirements(grammar, capabilities, arena, tag.element, out)?;
            }
            for param in params {
                if let Some(slot) = schema.and_then(|s| s.param_slot(param.id)) {
                    slot.requires.collect(capabilities, out);
                }
                collect_requirements(grammar, capabilities, arena, param.value, out)?;
            }
        }
        data => {
            for child in data.children() {
                collect_requirements(grammar, capabilities, arena, child, out)?;
            }
        }
    }
    Ok(())
}
