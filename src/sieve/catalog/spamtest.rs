/// RFC 5235: spamtest, with `:percent` from spamtestplus.
use crate::sieve::capabilities::Requirement;
use crate::sieve::error::SchemaError;
use crate::sieve::grammar::GrammarBuilder;
use crate::sieve::schema::{Schema, Value};

pub fn register(b: &mut GrammarBuilder) -> Result<(), SchemaError> {
    b.add_tag(Schema::new("spamtest/percent").token(":percent").requires("spamtestplus"))?;

    b.add_test(
        Schema::keyword("spamtest")
            .requires(Requirement::any(&["spamtest", "spamtestplus"]))
            .tag_requiring("percent", "spamtest/percent", "spamtestplus")
            .matching()
            .param("value", Value::String, "\"5\""),
    )
}
