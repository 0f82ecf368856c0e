/// Dovecot extprograms: `pipe`, and `filter`/`execute` as action and as test.
use crate::sieve::capabilities::Requirement;
use crate::sieve::error::SchemaError;
use crate::sieve::grammar::GrammarBuilder;
use crate::sieve::schema::{Schema, Value};

/// Program name plus its optional argument list.
fn program(schema: Schema) -> Schema {
    schema
        .param("program", Value::String, "\"example\"")
        .optional_param("arguments", Value::StringList, "\"\"", Requirement::None)
}

fn execute(schema: Schema) -> Schema {
    program(
        schema
            .requires("vnd.dovecot.execute")
            .tag("input", "execute/input")
            .tag_requiring("output", "execute/output", "variables"),
    )
}

pub fn register(b: &mut GrammarBuilder) -> Result<(), SchemaError> {
    b.add_tag(Schema::new("pipe/try").token(":try"))?;
    b.add_action(program(
        Schema::keyword("pipe")
            .requires("vnd.dovecot.pipe")
            .tag_requiring("copy", "copy", "copy")
            .tag("try", "pipe/try"),
    ))?;

    b.add_action(program(Schema::keyword("filter").requires("vnd.dovecot.filter")))?;
    b.add_test(program(
        Schema::new("filter/test")
            .token("filter")
            .requires("vnd.dovecot.filter"),
    ))?;

    b.add_tag(
        Schema::new("execute/input/pipe")
            .category("execute/input/")
            .token(":pipe"),
    )?;
    b.add_tag(
        Schema::new("execute/input/input")
            .category("execute/input/")
            .token(":input")
            .param("data", Value::String, "\"\""),
    )?;
    b.add_group(Schema::new("execute/input").group(&["execute/input/"], None))?;
    b.add_tag(
        Schema::new("execute/output")
            .token(":output")
            .requires("variables")
            .param("name", Value::String, "\"\""),
    )?;

    b.add_action(execute(Schema::keyword("execute")))?;
    b.add_test(execute(Schema::new("execute/test").token("execute")))
}
