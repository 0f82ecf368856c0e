/// RFC 5228: the base language.
use crate::sieve::cursor::{unescape, Cursor};
use crate::sieve::error::SchemaError;
use crate::sieve::grammar::GrammarBuilder;
use crate::sieve::schema::{Schema, Value, IMPORT};

/// Lowercased name of the comparator starting at `cursor`.
fn comparator_name(cursor: &Cursor) -> Option<String> {
    let mut look = *cursor;
    look.extract(":comparator").ok()?;
    look.skip_dead_code();
    look.extract_quoted()
        .ok()
        .map(|raw| unescape(raw).to_ascii_lowercase())
}

fn is_octet(cursor: &Cursor) -> bool {
    comparator_name(cursor).as_deref() == Some("i;octet")
}

fn is_ascii_casemap(cursor: &Cursor) -> bool {
    comparator_name(cursor).as_deref() == Some("i;ascii-casemap")
}

fn is_ascii_numeric(cursor: &Cursor) -> bool {
    comparator_name(cursor).as_deref() == Some("i;ascii-numeric")
}

fn is_other_comparator(cursor: &Cursor) -> bool {
    !matches!(
        comparator_name(cursor).as_deref(),
        Some("i;octet" | "i;ascii-casemap" | "i;ascii-numeric")
    )
}

fn tag(name: &'static str, category: &'static str, token: &'static str) -> Schema {
    Schema::new(name).category(category).token(token)
}

pub fn register(b: &mut GrammarBuilder) -> Result<(), SchemaError> {
    b.add_generic(
        Schema::keyword("require")
            .category(IMPORT)
            .param("capabilities", Value::StringList, "\"fileinto\"")
            .terminated(),
    )?;

    b.add_action(Schema::keyword("keep"))?;
    b.add_action(Schema::keyword("discard"))?;
    b.add_action(Schema::keyword("stop"))?;
    b.add_action(Schema::keyword("redirect").param("address", Value::String, "\"me@example.com\""))?;
    b.add_action(
        Schema::keyword("fileinto")
            .requires("fileinto")
            .param("path", Value::String, "\"INBOX\""),
    )?;

    b.add_tag(tag("match-type/is", "match-type/", ":is"))?;
    b.add_tag(tag("match-type/contains", "match-type/", ":contains"))?;
    b.add_tag(tag("match-type/matches", "match-type/", ":matches"))?;
    b.add_group(Schema::new("match-type").group(&["match-type/"], Some(":is")))?;

    b.add_tag(
        tag("comparator/i;octet", "comparator/", ":comparator")
            .matcher(is_octet)
            .param("name", Value::String, "\"i;octet\""),
    )?;
    b.add_tag(
        tag("comparator/i;ascii-casemap", "comparator/", ":comparator")
            .matcher(is_ascii_casemap)
            .param("name", Value::String, "\"i;ascii-casemap\""),
    )?;
    b.add_tag(
        tag("comparator/i;ascii-numeric", "comparator/", ":comparator")
            .requires("comparator-i;ascii-numeric")
            .matcher(is_ascii_numeric)
            .param("name", Value::String, "\"i;ascii-numeric\""),
    )?;
    // Registered collations we know nothing about.
    b.add_tag(
        tag("comparator/other", "comparator/", ":comparator")
            .matcher(is_other_comparator)
            .param("name", Value::String, "\"x-unknown\""),
    )?;
    b.add_group(
        Schema::new("comparator").group(&["comparator/"], Some(":comparator \"i;ascii-casemap\"")),
    )?;

    b.add_tag(tag("address-part/all", "address-part/", ":all"))?;
    b.add_tag(tag("address-part/localpart", "address-part/", ":localpart"))?;
    b.add_tag(tag("address-part/domain", "address-part/", ":domain"))?;
    b.add_group(Schema::new("address-part").group(&["address-part/"], Some(":all")))?;

    b.add_tag(tag("size-type/over", "size-type/", ":over"))?;
    b.add_tag(tag("size-type/under", "size-type/", ":under"))?;
    b.add_group(Schema::new("size-type").group(&["size-type/"], None).mandatory())?;

    b.add_test(
        Schema::keyword("address")
            .tag("address-part", "address-part")
            .matching()
            .param("header", Value::StringList, "\"To\"")
            .param("keys", Value::StringList, "\"me@example.com\""),
    )?;
    b.add_test(
        Schema::keyword("envelope")
            .requires("envelope")
            .tag("address-part", "address-part")
            .matching()
            .param("envelope-part", Value::StringList, "\"To\"")
            .param("keys", Value::StringList, "\"me@example.com\""),
    )?;
    b.add_test(
        Schema::keyword("header")
            .matching()
            .param("header", Value::StringList, "\"Subject\"")
            .param("keys", Value::StringList, "\"Example\""),
    )?;
    b.add_test(Schema::keyword("exists").param("headers", Value::StringList, "\"From\""))?;
    b.add_test(
        Schema::keyword("size")
            .tag("size-type", "size-type")
            .param("limit", Value::Number, "100K"),
    )?;
    b.add_test(Schema::keyword("true"))?;
    b.add_test(Schema::keyword("false"))?;

    b.add_operator(Schema::keyword("not").param("test", Value::Test, "true"))?;
    b.add_operator(Schema::keyword("anyof").param("tests", Value::TestList, "(true)"))?;
    b.add_operator(Schema::keyword("allof").param("tests", Value::TestList, "(true)"))?;
    Ok(())
}
