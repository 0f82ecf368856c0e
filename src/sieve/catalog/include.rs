/// RFC 6609: include, return and global.
use crate::sieve::capabilities::Requirement;
use crate::sieve::error::SchemaError;
use crate::sieve::grammar::GrammarBuilder;
use crate::sieve::schema::{Schema, Value};

pub fn register(b: &mut GrammarBuilder) -> Result<(), SchemaError> {
    b.add_tag(Schema::new("include/location/personal").category("include/location/").token(":personal"))?;
    b.add_tag(Schema::new("include/location/global").category("include/location/").token(":global"))?;
    b.add_group(Schema::new("include/location").group(&["include/location/"], Some(":personal")))?;
    b.add_tag(Schema::new("include/once").token(":once"))?;
    b.add_tag(Schema::new("include/optional").token(":optional"))?;

    b.add_action(
        Schema::keyword("include")
            .requires("include")
            .tag("location", "include/location")
            .tag("once", "include/once")
            .tag("optional", "include/optional")
            .param("script", Value::String, "\"script\""),
    )?;
    b.add_action(Schema::keyword("return").requires("include"))?;
    b.add_action(
        Schema::keyword("global")
            .requires(Requirement::all(&["include", "variables"]))
            .param("names", Value::StringList, "\"variable\""),
    )
}
