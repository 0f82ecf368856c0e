/// Schema registry and grammar compiler.
///
/// Schemas are registered through a [`GrammarBuilder`], validated once, and
/// frozen into an immutable [`Grammar`] shared by every document.
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{debug, info};

use crate::sieve::capabilities::Capabilities;
use crate::sieve::catalog;
use crate::sieve::cursor::Cursor;
use crate::sieve::error::SchemaError;
use crate::sieve::node;
use crate::sieve::schema::{GroupSpec, Schema, TagSlot, Value, ACTION, GROUP, OPERATOR, TAG, TEST};

static STANDARD: Lazy<Arc<Grammar>> = Lazy::new(|| {
    let mut builder = GrammarBuilder::new();
    match catalog::register_standard_grammar(&mut builder).and_then(|()| builder.build()) {
        Ok(grammar) => Arc::new(grammar),
        Err(err) => panic!("built-in grammar is inconsistent: {err}"),
    }
});

#[derive(Debug)]
pub struct Grammar {
    schemas: Vec<Schema>,
    index: HashMap<&'static str, usize>,
}

impl Grammar {
    /// The base language plus every bundled extension.
    pub fn standard() -> Arc<Grammar> {
        Arc::clone(&STANDARD)
    }

    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.index.get(name).map(|&i| &self.schemas[i])
    }

    /// The schema, if it exists and the capability set allows it.
    pub fn visible(&self, name: &str, capabilities: &Capabilities) -> Option<&Schema> {
        self.schema(name)
            .filter(|schema| capabilities.is_capable(&schema.requires))
    }

    /// All schemas in registration order.
    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn alternatives<'a>(&'a self, group: &GroupSpec) -> impl Iterator<Item = &'a Schema> + 'a {
        let items = group.items.clone();
        self.schemas
            .iter()
            .filter(move |schema| items.contains(&schema.category))
    }

    /// Longest match wins; on equal length the earlier registration wins.
    fn best<'a>(
        candidates: impl Iterator<Item = &'a Schema>,
        capabilities: &Capabilities,
        cursor: &Cursor,
    ) -> Option<(&'a Schema, usize)> {
        let mut best: Option<(&Schema, usize)> = None;
        for schema in candidates.filter(|s| capabilities.is_capable(&s.requires)) {
            let Some(len) = schema.probe(cursor) else {
                continue;
            };
            match best {
                Some((_, best_len)) if best_len >= len => {}
                _ => best = Some((schema, len)),
            }
        }
        best
    }

    /// Finds the visible schema of one of `categories` that starts at `cursor`.
    pub fn probe_class(
        &self,
        categories: &[&str],
        capabilities: &Capabilities,
        cursor: &Cursor,
    ) -> Option<&Schema> {
        let candidates = self
            .schemas
            .iter()
            .filter(|schema| categories.contains(&schema.category));
        Self::best(candidates, capabilities, cursor).map(|(schema, _)| schema)
    }

    /// Resolves what `schema` would parse at `cursor`: the schema itself, or
    /// for a group the alternative that matches.
    pub fn resolve<'a>(
        &'a self,
        schema: &'a Schema,
        capabilities: &Capabilities,
        cursor: &Cursor,
    ) -> Option<(&'a Schema, usize)> {
        if !capabilities.is_capable(&schema.requires) {
            return None;
        }
        match &schema.group {
            Some(group) => Self::best(self.alternatives(group), capabilities, cursor),
            None => schema.probe(cursor).map(|len| (schema, len)),
        }
    }

    /// The alternative a group falls back to when absent from the source.
    pub fn default_alternative(&self, group: &Schema, capabilities: &Capabilities) -> Option<&Schema> {
        let spec = group.group.as_ref()?;
        let default = spec.default?;
        Self::best(self.alternatives(spec), capabilities, &Cursor::new(default))
            .map(|(schema, _)| schema)
    }

    /// Every capability name any schema, tag or parameter refers to.
    pub fn capability_names(&self) -> BTreeSet<&'static str> {
        let mut names = BTreeSet::new();
        for schema in &self.schemas {
            names.extend(schema.requires.names());
            for slot in &schema.tags {
                names.extend(slot.requires.names());
            }
            for slot in &schema.params {
                names.extend(slot.requires.names());
            }
        }
        names
    }

    /// Source text for a fresh instance of `name`, built from its defaults.
    pub fn snippet(&self, name: &str) -> Option<String> {
        let schema = self.schema(name)?;
        if let Some(text) = schema.snippet {
            return Some(text.to_string());
        }
        if let Some(group) = &schema.group {
            if let Some(default) = group.default {
                return Some(default.to_string());
            }
            let first = self.alternatives(group).next()?;
            return self.snippet(first.name);
        }

        let mut text = schema.token?.to_string();
        for slot in &schema.tags {
            let element = self.schema(slot.element)?;
            if element.group.as_ref().is_some_and(|g| g.mandatory) {
                text.push(' ');
                text.push_str(&self.snippet(element.name)?);
            }
        }
        for slot in schema.params.iter().filter(|slot| !slot.optional) {
            let value = match (slot.value, slot.default.is_empty()) {
                (Value::Schema(name), true) => self.snippet(name)?,
                (value, true) => value.default_snippet().to_string(),
                (_, false) => slot.default.to_string(),
            };
            text.push(' ');
            text.push_str(&value);
        }
        if schema.terminated {
            text.push(';');
        }
        Some(text)
    }
}

#[derive(Debug, Default)]
pub struct GrammarBuilder {
    schemas: Vec<Schema>,
    index: HashMap<&'static str, usize>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_generic(&mut self, schema: Schema) -> Result<(), SchemaError> {
        if node::BUILTINS.contains(&schema.name) {
            return Err(SchemaError::Reserved(schema.name.to_string()));
        }
        if self.index.contains_key(schema.name) {
            return Err(SchemaError::Duplicate(schema.name.to_string()));
        }
        if schema.group.is_none() && schema.token.is_none() {
            return Err(SchemaError::MissingToken(schema.name.to_string()));
        }
        debug!(schema = schema.name, category = schema.category, "register");
        self.index.insert(schema.name, self.schemas.len());
        self.schemas.push(schema);
        Ok(())
    }

    /// Registers a command; actions always end in `;`.
    pub fn add_action(&mut self, schema: Schema) -> Result<(), SchemaError> {
        self.add_generic(schema.category(ACTION).terminated())
    }

    pub fn add_test(&mut self, schema: Schema) -> Result<(), SchemaError> {
        self.add_generic(schema.category(TEST))
    }

    pub fn add_operator(&mut self, schema: Schema) -> Result<(), SchemaError> {
        self.add_generic(schema.category(OPERATOR))
    }

    /// Registers a tag. Tags that are group alternatives keep their own category.
    pub fn add_tag(&mut self, schema: Schema) -> Result<(), SchemaError> {
        if schema.category.is_empty() {
            self.add_generic(schema.category(TAG))
        } else {
            self.add_generic(schema)
        }
    }

    pub fn add_group(&mut self, schema: Schema) -> Result<(), SchemaError> {
        if schema.group.is_none() {
            return Err(SchemaError::MissingToken(schema.name.to_string()));
        }
        self.add_generic(schema.category(GROUP))
    }

    /// Appends an optional tag slot to a registered action.
    pub fn extend_action(&mut self, name: &str, slot: TagSlot) -> Result<(), SchemaError> {
        self.extend(ACTION, name, slot)
    }

    pub fn extend_test(&mut self, name: &str, slot: TagSlot) -> Result<(), SchemaError> {
        self.extend(TEST, name, slot)
    }

    fn extend(&mut self, category: &str, name: &str, slot: TagSlot) -> Result<(), SchemaError> {
        let schema = self
            .index
            .get(name)
            .map(|&i| &mut self.schemas[i])
            .filter(|schema| schema.category == category)
            .ok_or_else(|| SchemaError::UnknownTarget(name.to_string()))?;
        if schema.tag_slot(slot.id).is_some() {
            return Err(SchemaError::Duplicate(format!("{name}:{}", slot.id)));
        }
        schema.tags.push(slot);
        Ok(())
    }

    /// Checks every cross reference and freezes the registry.
    pub fn build(self) -> Result<Grammar, SchemaError> {
        let grammar = Grammar {
            schemas: self.schemas,
            index: self.index,
        };
        let everything = Capabilities::new(grammar.capability_names());

        for schema in &grammar.schemas {
            let unknown = |reference: &str| SchemaError::UnknownReference {
                schema: schema.name.to_string(),
                reference: reference.to_string(),
            };
            for slot in &schema.tags {
                if grammar.schema(slot.element).is_none() {
                    return Err(unknown(slot.element));
                }
            }
            for slot in &schema.params {
                if let Value::Schema(name) = slot.value {
                    if grammar.schema(name).is_none() {
                        return Err(unknown(name));
                    }
                }
            }
            if let Some(group) = &schema.group {
                for item in &group.items {
                    if !grammar.schemas.iter().any(|s| s.category == *item) {
                        return Err(unknown(item));
                    }
                }
                if let Some(default) = group.default {
                    if grammar.default_alternative(schema, &everything).is_none() {
                        return Err(SchemaError::InvalidDefault {
                            group: schema.name.to_string(),
                            default: default.to_string(),
                        });
                    }
                }
            }
        }

        info!(schemas = grammar.schemas.len(), "grammar built");
        Ok(grammar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_registration_fails() {
        let mut builder = GrammarBuilder::new();
        builder.add_action(Schema::keyword("keep")).unwrap();
        assert_eq!(
            builder.add_action(Schema::keyword("keep")),
            Err(SchemaError::Duplicate("keep".into()))
        );
    }

    #[test]
    fn test_missing_token_fails() {
        let mut builder = GrammarBuilder::new();
        assert_eq!(
            builder.add_test(Schema::new("nameless")),
            Err(SchemaError::MissingToken("nameless".into()))
        );
    }

    #[test]
    fn test_extend_unknown_target() {
        let mut builder = GrammarBuilder::new();
        builder.add_test(Schema::keyword("true")).unwrap();
        assert_eq!(
            builder.extend_action("true", TagSlot::new("copy", "copy")),
            Err(SchemaError::UnknownTarget("true".into()))
        );
    }

    #[test]
    fn test_unknown_reference_detected_at_build() {
        let mut builder = GrammarBuilder::new();
        builder
            .add_action(Schema::keyword("fileinto").tag("copy", "copy"))
            .unwrap();
        assert!(matches!(
            builder.build(),
            Err(SchemaError::UnknownReference { .. })
        ));
    }

    #[test]
    fn test_invalid_group_default() {
        let mut builder = GrammarBuilder::new();
        builder
            .add_tag(Schema::new("match-type/is").category("match-type/").token(":is"))
            .unwrap();
        builder
            .add_group(Schema::new("match-type").group(&["match-type/"], Some(":nope")))
            .unwrap();
        assert!(matches!(
            builder.build(),
            Err(SchemaError::InvalidDefault { .. })
        ));
    }

    #[test]
    fn test_longest_token_wins() {
        let mut builder = GrammarBuilder::new();
        builder.add_action(Schema::keyword("set")).unwrap();
        builder.add_action(Schema::new("set-long").token("set :x")).unwrap();
        let grammar = builder.build().unwrap();
        let caps = Capabilities::default();
        let found = grammar
            .probe_class(&[ACTION], &caps, &Cursor::new("set :x \"a\";"))
            .unwrap();
        assert_eq!(found.name, "set-long");
    }

    #[test]
    fn test_earlier_registration_wins_ties() {
        let mut builder = GrammarBuilder::new();
        builder.add_action(Schema::keyword("keep")).unwrap();
        builder.add_action(Schema::new("keep-2").token("keep")).unwrap();
        let grammar = builder.build().unwrap();
        let found = grammar
            .probe_class(&[ACTION], &Capabilities::default(), &Cursor::new("keep;"))
            .unwrap();
        assert_eq!(found.name, "keep");
    }

    #[test]
    fn test_invisible_schema_is_not_probed() {
        let grammar = Grammar::standard();
        let cursor = Cursor::new("fileinto \"x\";");
        assert!(grammar
            .probe_class(&[ACTION], &Capabilities::default(), &cursor)
            .is_none());
        assert!(grammar
            .probe_class(&[ACTION], &Capabilities::new(["fileinto"]), &cursor)
            .is_some());
    }

    #[test]
    fn test_standard_grammar_snippets() {
        let grammar = Grammar::standard();
        assert_eq!(grammar.snippet("keep").as_deref(), Some("keep;"));
        assert_eq!(
            grammar.snippet("header").as_deref(),
            Some("header \"Subject\" \"Example\"")
        );
        assert_eq!(grammar.snippet("size").as_deref(), Some("size :over 100K"));
        assert_eq!(grammar.snippet("match-type").as_deref(), Some(":is"));
    }

    #[test]
    fn test_capability_names_cover_extensions() {
        let names = Grammar::standard().capability_names();
        for name in ["fileinto", "envelope", "variables", "imap4flags", "comparator-i;ascii-numeric"] {
            assert!(names.contains(name), "{name}");
        }
    }

    #[test]
    fn test_builtin_names_are_reserved() {
        let mut builder = GrammarBuilder::new();
        assert_eq!(
            builder.add_test(Schema::keyword(node::BODY)),
            Err(SchemaError::Reserved(node::BODY.to_string()))
        );
        // The `string` and `body` tests are ordinary schemas.
        let grammar = Grammar::standard();
        assert_eq!(grammar.schema("string").map(|s| s.category), Some(TEST));
        assert_eq!(grammar.schema("body").map(|s| s.category), Some(TEST));
        assert!(grammar.schema(node::STRING).is_none());
        assert!(grammar.schema(node::BODY).is_none());
    }

    #[test]
    fn test_action_and_test_share_a_token() {
        let grammar = Grammar::standard();
        let capabilities = Capabilities::new(["vnd.dovecot.filter"]);
        let cursor = Cursor::new("filter \"sort\";");
        let action = grammar.probe_class(&[ACTION], &capabilities, &cursor).unwrap();
        let test = grammar.probe_class(&[TEST], &capabilities, &cursor).unwrap();
        assert_eq!((action.name, test.name), ("filter", "filter/test"));
    }
}
