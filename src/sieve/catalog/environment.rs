use crate::sieve::error::SchemaError;
use crate::sieve::grammar::GrammarBuilder;
use crate::sieve::schema::{Schema, Value};

pub fn register(b: &mut GrammarBuilder) -> Result<(), SchemaError> {
    b.add_test(
        Schema::keyword("environment")
            .requires("environment")
            .matching()
            .param("name", Value::String, "\"domain\"")
            .param("keys", Value::StringList, "\"example.com\""),
    )
}
