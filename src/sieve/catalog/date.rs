/// RFC 5260: date and currentdate.
use crate::sieve::error::SchemaError;
use crate::sieve::grammar::GrammarBuilder;
use crate::sieve::schema::{Schema, Value};

pub fn register(b: &mut GrammarBuilder) -> Result<(), SchemaError> {
    b.add_tag(
        Schema::new("zone/zone")
            .category("zone/")
            .token(":zone")
            .param("offset", Value::String, "\"+0100\""),
    )?;
    b.add_tag(Schema::new("zone/originalzone").category("zone/").token(":originalzone"))?;
    b.add_group(Schema::new("zone").group(&["zone/"], None))?;

    b.add_test(
        Schema::keyword("date")
            .requires("date")
            .tag("zone", "zone")
            .matching()
            .param("header", Value::String, "\"date\"")
            .param("date-part", Value::String, "\"date\"")
            .param("keys", Value::StringList, "\"2024-01-01\""),
    )?;
    b.add_test(
        Schema::keyword("currentdate")
            .requires("date")
            .tag("zone", "zone")
            .matching()
            .param("date-part", Value::String, "\"date\"")
            .param("keys", Value::StringList, "\"2024-01-01\""),
    )
}
