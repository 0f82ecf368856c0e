/// RFC 5490: `:create` for fileinto, mailboxexists and the metadata tests.
use crate::sieve::error::SchemaError;
use crate::sieve::grammar::GrammarBuilder;
use crate::sieve::schema::{Schema, TagSlot, Value};

pub fn register(b: &mut GrammarBuilder) -> Result<(), SchemaError> {
    b.add_tag(Schema::new("mailbox/create").token(":create").requires("mailbox"))?;
    b.extend_action("fileinto", TagSlot::new("create", "mailbox/create").requiring("mailbox"))?;

    b.add_test(
        Schema::keyword("mailboxexists")
            .requires("mailbox")
            .param("mailboxes", Value::StringList, "\"INBOX\""),
    )?;

    b.add_test(
        Schema::keyword("metadataexists")
            .requires("mboxmetadata")
            .param("mailbox", Value::String, "\"INBOX\"")
            .param("annotations", Value::StringList, "\"\""),
    )?;
    b.add_test(
        Schema::keyword("metadata")
            .requires("mboxmetadata")
            .matching()
            .param("mailbox", Value::String, "\"INBOX\"")
            .param("annotation", Value::String, "\"\"")
            .param("keys", Value::StringList, "\"\""),
    )?;

    b.add_test(
        Schema::keyword("servermetadataexists")
            .requires("servermetadata")
            .param("annotations", Value::StringList, "\"\""),
    )?;
    b.add_test(
        Schema::keyword("servermetadata")
            .requires("servermetadata")
            .matching()
            .param("annotation", Value::String, "\"\"")
            .param("keys", Value::StringList, "\"\""),
    )
}
