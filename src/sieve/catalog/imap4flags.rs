/// RFC 5232: flag actions, the hasflag test and `:flags` on fileinto/keep.
///
/// The variable name in front of the flag list is only there with the
/// variables extension, and only when two values follow.
use crate::sieve::error::SchemaError;
use crate::sieve::grammar::GrammarBuilder;
use crate::sieve::schema::{Schema, TagSlot, Value};

pub fn register(b: &mut GrammarBuilder) -> Result<(), SchemaError> {
    for name in ["setflag", "addflag", "removeflag"] {
        b.add_action(
            Schema::keyword(name)
                .requires("imap4flags")
                .optional_param("variablename", Value::String, "\"\"", "variables")
                .param("flags", Value::StringList, "\"\\\\Seen\""),
        )?;
    }

    b.add_test(
        Schema::keyword("hasflag")
            .requires("imap4flags")
            .matching()
            .optional_param("variablelist", Value::StringList, "\"\"", "variables")
            .param("flags", Value::StringList, "\"\\\\Seen\""),
    )?;

    b.add_tag(
        Schema::new("imap4flags/flags")
            .token(":flags")
            .requires("imap4flags")
            .param("flags", Value::StringList, "\"\\\\Seen\""),
    )?;
    b.extend_action("fileinto", TagSlot::new("flags", "imap4flags/flags").requiring("imap4flags"))?;
    b.extend_action("keep", TagSlot::new("flags", "imap4flags/flags").requiring("imap4flags"))
}
