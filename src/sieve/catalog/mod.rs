/// Bundled grammar: the base language followed by every extension, registered
/// in a fixed order so that extensions can extend what came before them.
use crate::sieve::error::SchemaError;
use crate::sieve::grammar::GrammarBuilder;

mod body;
mod copy;
mod date;
mod duplicate;
mod editheader;
mod enotify;
mod environment;
mod ihave;
mod imap4flags;
mod include;
mod mailbox;
mod pipe;
mod regex;
mod reject;
mod relational;
mod rfc5228;
mod spamtest;
mod subaddress;
mod vacation;
mod variables;

type Register = fn(&mut GrammarBuilder) -> Result<(), SchemaError>;

const EXTENSIONS: &[(&str, Register)] = &[
    ("reject", reject::register),
    ("regex", regex::register),
    ("relational", relational::register),
    ("subaddress", subaddress::register),
    ("copy", copy::register),
    ("body", body::register),
    ("mailbox", mailbox::register),
    ("imap4flags", imap4flags::register),
    ("variables", variables::register),
    ("vacation", vacation::register),
    ("date", date::register),
    ("include", include::register),
    ("environment", environment::register),
    ("spamtest", spamtest::register),
    ("editheader", editheader::register),
    ("duplicate", duplicate::register),
    ("enotify", enotify::register),
    ("ihave", ihave::register),
    ("pipe", pipe::register),
];

pub fn register_core_grammar(builder: &mut GrammarBuilder) -> Result<(), SchemaError> {
    rfc5228::register(builder)
}

pub fn register_standard_grammar(builder: &mut GrammarBuilder) -> Result<(), SchemaError> {
    register_core_grammar(builder)?;
    for (name, register) in EXTENSIONS {
        tracing::debug!(extension = name, "loading grammar extension");
        register(builder)?;
    }
    Ok(())
}

/// Names of the bundled extension modules in load order.
pub fn extension_names() -> impl Iterator<Item = &'static str> {
    EXTENSIONS.iter().map(|(name, _)| *name)
}
