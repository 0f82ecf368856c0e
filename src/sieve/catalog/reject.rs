/// RFC 5429: reject and ereject.
use crate::sieve::error::SchemaError;
use crate::sieve::grammar::GrammarBuilder;
use crate::sieve::schema::{Schema, Value};

pub fn register(b: &mut GrammarBuilder) -> Result<(), SchemaError> {
    b.add_action(
        Schema::keyword("reject")
            .requires("reject")
            .param("reason", Value::String, "text:\r\nMessage rejected\r\n.\r\n"),
    )?;
    b.add_action(
        Schema::keyword("ereject")
            .requires("ereject")
            .param("reason", Value::String, "\"Message rejected\""),
    )
}
