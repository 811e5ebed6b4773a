pub mod answer;
pub mod ask;
pub mod embeddings;
pub mod introspect;
pub mod llm;
pub mod openai;
pub mod prompt;
pub mod query;
pub mod retrieve;
pub mod snippet;
pub mod store;
