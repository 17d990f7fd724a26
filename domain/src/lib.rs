pub mod corpus;
pub mod errors;
pub mod models;
pub mod ports;
pub mod prompts;
pub mod scope_policy;
