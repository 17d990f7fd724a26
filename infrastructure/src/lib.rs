pub mod chunker;
pub mod config;
pub mod corpus_store;
pub mod embedder;
pub mod html;
pub mod ollama_client;
pub mod openai_client;
pub mod search;
pub mod sentence;
