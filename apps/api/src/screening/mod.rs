// Candidate screening: validators, skill classification, question generation,
// and the conversation state machine that ties them together.
// All LLM calls go through llm_client — question generation is the only caller.

pub mod conversation;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod questions;
pub mod skills;
pub mod store;
pub mod validators;
