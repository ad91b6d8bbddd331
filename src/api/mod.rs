pub mod openai;

pub use openai::{CompletionError, CompletionService, OpenAiClient};
