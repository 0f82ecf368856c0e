/// RFC 7352: the duplicate test.
use crate::sieve::error::SchemaError;
use crate::sieve::grammar::GrammarBuilder;
use crate::sieve::schema::{Schema, Value};

pub fn register(b: &mut GrammarBuilder) -> Result<(), SchemaError> {
    b.add_tag(
        Schema::new("duplicate/source/header")
            .category("duplicate/source/")
            .token(":header")
            .param("header", Value::String, "\"Message-ID\""),
    )?;
    b.add_tag(
        Schema::new("duplicate/source/uniqueid")
            .category("duplicate/source/")
            .token(":uniqueid")
            .param("value", Value::String, "\"\""),
    )?;
    b.add_group(Schema::new("duplicate/source").group(&["duplicate/source/"], None))?;
    b.add_tag(Schema::new("duplicate/handle").token(":handle").param("handle", Value::String, "\"\""))?;
    b.add_tag(
        Schema::new("duplicate/seconds")
            .token(":seconds")
            .param("seconds", Value::Number, "3600"),
    )?;
    b.add_tag(Schema::new("duplicate/last").token(":last"))?;

    b.add_test(
        Schema::keyword("duplicate")
            .requires("duplicate")
            .tag("handle", "duplicate/handle")
            .tag("source", "duplicate/source")
            .tag("seconds", "duplicate/seconds")
            .tag("last", "duplicate/last"),
    )
}
