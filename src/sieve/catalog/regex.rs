use crate::sieve::error::SchemaError;
use crate::sieve::grammar::GrammarBuilder;
use crate::sieve::schema::Schema;

pub fn register(b: &mut GrammarBuilder) -> Result<(), SchemaError> {
    b.add_tag(
        Schema::new("match-type/regex")
            .category("match-type/")
            .token(":regex")
            .requires("regex"),
    )
}
