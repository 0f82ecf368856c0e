/// RFC 5231: `:value` and `:count` match types.
use crate::sieve::error::SchemaError;
use crate::sieve::grammar::GrammarBuilder;
use crate::sieve::schema::{Schema, Value};

pub fn register(b: &mut GrammarBuilder) -> Result<(), SchemaError> {
    for (name, token) in [("match-type/value", ":value"), ("match-type/count", ":count")] {
        b.add_tag(
            Schema::new(name)
                .category("match-type/")
                .token(token)
                .requires("relational")
                .param("relation", Value::String, "\"eq\""),
        )?;
    }
    Ok(())
}
