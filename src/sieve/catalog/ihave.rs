/// RFC 5463: the ihave test and the error action.
use crate::sieve::error::SchemaError;
use crate::sieve::grammar::GrammarBuilder;
use crate::sieve::schema::{Schema, Value};

pub fn register(b: &mut GrammarBuilder) -> Result<(), SchemaError> {
    b.add_test(
        Schema::keyword("ihave")
            .requires("ihave")
            .param("capabilities", Value::StringList, "\"fileinto\""),
    )?;
    b.add_action(
        Schema::keyword("error")
            .requires("ihave")
            .param("message", Value::String, "\"\""),
    )
}
