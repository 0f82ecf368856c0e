/// RFC 3894: `:copy` on fileinto and redirect.
use crate::sieve::error::SchemaError;
use crate::sieve::grammar::GrammarBuilder;
use crate::sieve::schema::{Schema, TagSlot};

pub fn register(b: &mut GrammarBuilder) -> Result<(), SchemaError> {
    b.add_tag(Schema::new("copy").token(":copy").requires("copy"))?;
    b.extend_action("fileinto", TagSlot::new("copy", "copy").requiring("copy"))?;
    b.extend_action("redirect", TagSlot::new("copy", "copy").requiring("copy"))
}
