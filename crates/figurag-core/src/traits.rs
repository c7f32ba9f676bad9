use std::borrow::Cow;

use crate::error::Result;

/// Text to vector capability. Implementations return vectors of `dim()`
/// length for every input, in input order.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `openai:text-embedding-ada-002`).
    fn id(&self) -> &str;
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| crate::Error::MalformedResponse("empty embedding batch".into()))
    }
}

/// Opaque chat completion capability.
pub trait Completer: Send + Sync {
    fn model(&self) -> &str;
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// Anything the relevance scorer can rank: catalog entries and document chunks.
///
/// Every accessor must be total; a malformed item simply exposes empty
/// fields and scores zero.
pub trait Scorable {
    fn item_id(&self) -> &str;
    fn title(&self) -> &str;
    /// Identifiers that count as title hits (module names for catalog entries).
    fn names(&self) -> &[String] {
        &[]
    }
    fn body(&self) -> Cow<'_, str>;
    fn methods(&self) -> &[String];
    fn input_types(&self) -> &[String];
    fn output_types(&self) -> &[String];
    fn domain_tags(&self) -> &[String];
}
