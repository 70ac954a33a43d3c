pub mod client;
pub mod config;
pub mod errors;

pub use client::{LlmClient, OpenAiApi};
pub use errors::LlmError;
