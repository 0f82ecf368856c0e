/// RFC 5435: notify, the two notification tests and `:encodeurl` on set.
use crate::sieve::capabilities::Requirement;
use crate::sieve::error::SchemaError;
use crate::sieve::grammar::GrammarBuilder;
use crate::sieve::schema::{Schema, TagSlot, Value};

pub fn register(b: &mut GrammarBuilder) -> Result<(), SchemaError> {
    b.add_tag(Schema::new("notify/from").token(":from").param("from", Value::String, "\"\""))?;
    b.add_tag(
        Schema::new("notify/importance")
            .token(":importance")
            .param("importance", Value::String, "\"2\""),
    )?;
    b.add_tag(
        Schema::new("notify/options")
            .token(":options")
            .param("options", Value::StringList, "\"\""),
    )?;
    b.add_tag(Schema::new("notify/message").token(":message").param("message", Value::String, "\"\""))?;

    b.add_action(
        Schema::keyword("notify")
            .requires("enotify")
            .tag("from", "notify/from")
            .tag("importance", "notify/importance")
            .tag("options", "notify/options")
            .tag("message", "notify/message")
            .param("method", Value::String, "\"mailto:me@example.com\""),
    )?;
    b.add_test(
        Schema::keyword("valid_notify_method")
            .requires("enotify")
            .param("uris", Value::StringList, "\"mailto:\""),
    )?;
    b.add_test(
        Schema::keyword("notify_method_capability")
            .requires("enotify")
            .matching()
            .param("uri", Value::String, "\"mailto:\"")
            .param("capability", Value::String, "\"online\"")
            .param("keys", Value::StringList, "\"yes\""),
    )?;

    b.add_tag(
        Schema::new("modifier/15/encodeurl")
            .category("modifier/15/")
            .token(":encodeurl")
            .requires(Requirement::all(&["enotify", "variables"])),
    )?;
    b.add_group(Schema::new("modifier/15").group(&["modifier/15/"], None))?;
    b.extend_action("set", TagSlot::new("modifier/15", "modifier/15"))
}
