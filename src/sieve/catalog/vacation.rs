/// RFC 5230 vacation, plus RFC 6131 `:seconds`.
use crate::sieve::error::SchemaError;
use crate::sieve::grammar::GrammarBuilder;
use crate::sieve::schema::{Schema, Value};

pub fn register(b: &mut GrammarBuilder) -> Result<(), SchemaError> {
    b.add_tag(
        Schema::new("vacation/period/days")
            .category("vacation/period/")
            .token(":days")
            .requires("vacation")
            .param("days", Value::Number, "7"),
    )?;
    b.add_tag(
        Schema::new("vacation/period/seconds")
            .category("vacation/period/")
            .token(":seconds")
            .requires("vacation-seconds")
            .param("seconds", Value::Number, "3600"),
    )?;
    b.add_group(Schema::new("vacation/period").group(&["vacation/period/"], None))?;

    b.add_tag(Schema::new("vacation/subject").token(":subject").param("subject", Value::String, "\"\""))?;
    b.add_tag(Schema::new("vacation/from").token(":from").param("from", Value::String, "\"\""))?;
    b.add_tag(
        Schema::new("vacation/addresses")
            .token(":addresses")
            .param("addresses", Value::StringList, "\"\""),
    )?;
    b.add_tag(Schema::new("vacation/mime").token(":mime"))?;
    b.add_tag(Schema::new("vacation/handle").token(":handle").param("handle", Value::String, "\"\""))?;

    b.add_action(
        Schema::keyword("vacation")
            .requires("vacation")
            .tag("period", "vacation/period")
            .tag("subject", "vacation/subject")
            .tag("from", "vacation/from")
            .tag("addresses", "vacation/addresses")
            .tag("mime", "vacation/mime")
            .tag("handle", "vacation/handle")
            .param("reason", Value::String, "text:\r\nI am away.\r\n.\r\n"),
    )
}
