use crate::sieve::error::SchemaError;
use crate::sieve::grammar::GrammarBuilder;
use crate::sieve::schema::Schema;

pub fn register(b: &mut GrammarBuilder) -> Result<(), SchemaError> {
    b.add_tag(
        Schema::new("address-part/user")
            .category("address-part/")
            .token(":user")
            .requires("subaddress"),
    )?;
    b.add_tag(
        Schema::new("address-part/detail")
            .category("address-part/")
            .token(":detail")
            .requires("subaddress"),
    )
}
