// Resume screening pipeline.
// Per-file flow: validate → encode → LLM extract → parse literal → ResultRow.
// All LLM calls go through llm_client::ModelGateway.

pub mod batch;
pub mod handlers;
pub mod literal;
pub mod parser;
pub mod processor;
pub mod prompts;
