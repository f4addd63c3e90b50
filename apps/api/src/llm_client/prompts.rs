// Shared prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains the cross-cutting chat framing.

/// Frames a system instruction and a single user turn for a plain text-generation
/// model that has no native chat template.
pub fn format_chat_prompt(system: &str, user: &str) -> String {
    format!("{}\n\nUser: {}\nAssistant:", system.trim(), user.trim())
}
