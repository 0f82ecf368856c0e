/// RFC 5229: the set action with its modifiers and the string test.
use crate::sieve::error::SchemaError;
use crate::sieve::grammar::GrammarBuilder;
use crate::sieve::schema::{Schema, Value};

/// Modifiers by precedence; each precedence level may be used once.
const MODIFIERS: &[(&str, &str, &str)] = &[
    ("modifier/40/lower", "modifier/40/", ":lower"),
    ("modifier/40/upper", "modifier/40/", ":upper"),
    ("modifier/30/lowerfirst", "modifier/30/", ":lowerfirst"),
    ("modifier/30/upperfirst", "modifier/30/", ":upperfirst"),
    ("modifier/20/quotewildcard", "modifier/20/", ":quotewildcard"),
    ("modifier/10/length", "modifier/10/", ":length"),
];

pub fn register(b: &mut GrammarBuilder) -> Result<(), SchemaError> {
    for &(name, category, token) in MODIFIERS {
        b.add_tag(Schema::new(name).category(category).token(token).requires("variables"))?;
    }
    b.add_group(Schema::new("modifier/40").group(&["modifier/40/"], None))?;
    b.add_group(Schema::new("modifier/30").group(&["modifier/30/"], None))?;
    b.add_group(Schema::new("modifier/20").group(&["modifier/20/"], None))?;
    b.add_group(Schema::new("modifier/10").group(&["modifier/10/"], None))?;

    b.add_action(
        Schema::keyword("set")
            .requires("variables")
            .tag("modifier/40", "modifier/40")
            .tag("modifier/30", "modifier/30")
            .tag("modifier/20", "modifier/20")
            .tag("modifier/10", "modifier/10")
            .param("name", Value::String, "\"variable\"")
            .param("value", Value::String, "\"\""),
    )?;

    b.add_test(
        Schema::keyword("string")
            .requires("variables")
            .matching()
            .param("source", Value::StringList, "\"${variable}\"")
            .param("keys", Value::StringList, "\"Example\""),
    )
}
