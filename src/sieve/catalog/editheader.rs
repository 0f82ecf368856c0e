/// RFC 5293: addheader and deleteheader.
use crate::sieve::capabilities::Requirement;
use crate::sieve::error::SchemaError;
use crate::sieve::grammar::GrammarBuilder;
use crate::sieve::schema::{Schema, Value};

pub fn register(b: &mut GrammarBuilder) -> Result<(), SchemaError> {
    b.add_tag(Schema::new("editheader/last").token(":last"))?;
    b.add_tag(
        Schema::new("editheader/index")
            .token(":index")
            .param("index", Value::Number, "1"),
    )?;

    b.add_action(
        Schema::keyword("addheader")
            .requires("editheader")
            .tag("last", "editheader/last")
            .param("field-name", Value::String, "\"X-Sieve\"")
            .param("value", Value::String, "\"\""),
    )?;
    b.add_action(
        Schema::keyword("deleteheader")
            .requires("editheader")
            .tag("index", "editheader/index")
            .tag("last", "editheader/last")
            .matching()
            .param("field-name", Value::String, "\"X-Sieve\"")
            .optional_param("value-patterns", Value::StringList, "\"\"", Requirement::None),
    )
}
