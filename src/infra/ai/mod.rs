pub mod openai_client;

pub use openai_client::{OpenAiClient, OPENAI_CHAT_COMPLETIONS_URL};
