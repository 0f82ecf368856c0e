/// Declarative node definitions.
///
/// A schema describes one construct of the language: its fixed token, the
/// optional tags it accepts, its positional parameters and the capability it
/// needs. Groups (match-type, comparator, ...) list alternative schemas by
/// category instead of carrying a token of their own.
use crate::sieve::capabilities::Requirement;
use crate::sieve::cursor::Cursor;

/// Extra predicate evaluated after the token matched.
pub type Matcher = fn(&Cursor) -> bool;

pub const ACTION: &str = "action";
pub const TEST: &str = "test";
pub const OPERATOR: &str = "operator";
pub const IMPORT: &str = "import";
pub const TAG: &str = "tag";
pub const GROUP: &str = "group";

/// Categories a branch test or operator argument may come from.
pub const TESTS: &[&str] = &[TEST, OPERATOR];

/// Kind of value a positional parameter holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    String,
    StringList,
    Number,
    /// Any visible test or operator.
    Test,
    /// A parenthesized, comma separated list of tests.
    TestList,
    /// A named structure or group schema.
    Schema(&'static str),
}

impl Value {
    pub fn default_snippet(&self) -> &'static str {
        match self {
            Self::String | Self::StringList => "\"\"",
            Self::Number => "0",
            Self::Test => "true",
            Self::TestList => "(true)",
            Self::Schema(_) => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSlot {
    pub id: &'static str,
    pub element: &'static str,
    pub requires: Requirement,
}

impl TagSlot {
    pub fn new(id: &'static str, element: &'static str) -> Self {
        Self {
            id,
            element,
            requires: Requirement::None,
        }
    }

    pub fn requiring(mut self, requires: impl Into<Requirement>) -> Self {
        self.requires = requires.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSlot {
    pub id: &'static str,
    pub value: Value,
    pub default: &'static str,
    /// Present only when more values follow than the remaining required
    /// parameters consume.
    pub optional: bool,
    pub requires: Requirement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    /// Categories whose schemas are alternatives of this group.
    pub items: Vec<&'static str>,
    /// Source text of the alternative used when the group is absent.
    pub default: Option<&'static str>,
    /// Absence is a syntax error.
    pub mandatory: bool,
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub name: &'static str,
    pub category: &'static str,
    pub token: Option<&'static str>,
    pub matcher: Option<Matcher>,
    pub requires: Requirement,
    pub tags: Vec<TagSlot>,
    pub params: Vec<ParamSlot>,
    pub terminated: bool,
    pub group: Option<GroupSpec>,
    pub snippet: Option<&'static str>,
}

impl Schema {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            category: "",
            token: None,
            matcher: None,
            requires: Requirement::None,
            tags: Vec::new(),
            params: Vec::new(),
            terminated: false,
            group: None,
            snippet: None,
        }
    }

    /// Shorthand for a schema whose token is its own name.
    pub fn keyword(name: &'static str) -> Self {
        Self::new(name).token(name)
    }

    pub fn category(mut self, category: &'static str) -> Self {
        self.category = category;
        self
    }

    pub fn token(mut self, token: &'static str) -> Self {
        self.token = Some(token);
        self
    }

    pub fn matcher(mut self, matcher: Matcher) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn requires(mut self, requirement: impl Into<Requirement>) -> Self {
        self.requires = requirement.into();
        self
    }

    pub fn tag(self, id: &'static str, element: &'static str) -> Self {
        self.tag_requiring(id, element, Requirement::None)
    }

    pub fn tag_requiring(
        mut self,
        id: &'static str,
        element: &'static str,
        requires: impl Into<Requirement>,
    ) -> Self {
        self.tags.push(TagSlot::new(id, element).requiring(requires));
        self
    }

    /// The usual comparator and match-type pair of string tests.
    pub fn matching(self) -> Self {
        self.tag("comparator", "comparator")
            .tag("match-type", "match-type")
    }

    pub fn param(mut self, id: &'static str, value: Value, default: &'static str) -> Self {
        self.params.push(ParamSlot {
            id,
            value,
            default,
            optional: false,
            requires: Requirement::None,
        });
        self
    }

    pub fn optional_param(
        mut self,
        id: &'static str,
        value: Value,
        default: &'static str,
        requires: impl Into<Requirement>,
    ) -> Self {
        self.params.push(ParamSlot {
            id,
            value,
            default,
            optional: true,
            requires: requires.into(),
        });
        self
    }

    pub fn group(mut self, items: &[&'static str], default: Option<&'static str>) -> Self {
        self.group = Some(GroupSpec {
            items: items.to_vec(),
            default,
            mandatory: false,
        });
        self
    }

    pub fn mandatory(mut self) -> Self {
        if let Some(group) = self.group.as_mut() {
            group.mandatory = true;
        }
        self
    }

    pub fn terminated(mut self) -> Self {
        self.terminated = true;
        self
    }

    /// Source text used when an instance is created programmatically.
    pub fn snippet(mut self, text: &'static str) -> Self {
        self.snippet = Some(text);
        self
    }

    pub fn is_group(&self) -> bool {
        self.group.is_some()
    }

    pub fn tag_slot(&self, id: &str) -> Option<&TagSlot> {
        self.tags.iter().find(|slot| slot.id == id)
    }

    pub fn param_slot(&self, id: &str) -> Option<&ParamSlot> {
        self.params.iter().find(|slot| slot.id == id)
    }

    /// Length of the match at `cursor`, if the token and matcher accept it.
    pub fn probe(&self, cursor: &Cursor) -> Option<usize> {
        let token = self.token?;
        if !cursor.starts_with_keyword(token) {
            return None;
        }
        match self.matcher {
            Some(matcher) if !matcher(cursor) => None,
            _ => Some(token.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_octet(cursor: &Cursor) -> bool {
        cursor.rest().contains("i;octet")
    }

    #[test]
    fn test_probe_token() {
        let schema = Schema::keyword("keep");
        assert_eq!(schema.probe(&Cursor::new("KEEP;")), Some(4));
        assert_eq!(schema.probe(&Cursor::new("keeper;")), None);
        assert_eq!(Schema::new("group").probe(&Cursor::new("keep")), None);
    }

    #[test]
    fn test_probe_matcher() {
        let schema = Schema::new("comparator/i;octet")
            .token(":comparator")
            .matcher(is_octet);
        assert!(schema.probe(&Cursor::new(":comparator \"i;octet\"")).is_some());
        assert!(schema.probe(&Cursor::new(":comparator \"x\"")).is_none());
    }

    #[test]
    fn test_builder_slots() {
        let schema = Schema::keyword("setflag")
            .optional_param("variablename", Value::String, "\"\"", "variables")
            .param("flags", Value::StringList, "\"\\\\Seen\"")
            .terminated();
        assert!(schema.param_slot("variablename").is_some_and(|p| p.optional));
        assert!(schema.param_slot("flags").is_some_and(|p| !p.optional));
        assert!(schema.terminated);
        assert!(schema.tag_slot("flags").is_none());
    }
}
