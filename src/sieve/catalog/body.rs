/// RFC 5173: the body test and its transforms.
use crate::sieve::error::SchemaError;
use crate::sieve::grammar::GrammarBuilder;
use crate::sieve::schema::{Schema, Value};

pub fn register(b: &mut GrammarBuilder) -> Result<(), SchemaError> {
    b.add_tag(Schema::new("body-transform/raw").category("body-transform/").token(":raw"))?;
    b.add_tag(
        Schema::new("body-transform/content")
            .category("body-transform/")
            .token(":content")
            .param("content-types", Value::StringList, "\"text\""),
    )?;
    b.add_tag(Schema::new("body-transform/text").category("body-transform/").token(":text"))?;
    b.add_group(Schema::new("body-transform").group(&["body-transform/"], Some(":text")))?;

    b.add_test(
        Schema::keyword("body")
            .requires("body")
            .tag("transform", "body-transform")
            .matching()
            .param("keys", Value::StringList, "\"Example\""),
    )
}
