pub mod gemini;

pub use gemini::GeminiClient;

use std::future::Future;

use anyhow::Result;

/// Something that turns a user prompt into assistant text.
///
/// Any failure (transport, HTTP status, authentication, malformed body) is
/// reported as an error; callers decide what the user sees.
pub trait ReplyGenerator {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}
