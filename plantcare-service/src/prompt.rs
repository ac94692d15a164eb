//! Prompt construction for the plant care assistant.

/// Persona and task scope prepended to every user message.
pub const INSTRUCTIONS: &str = "You are a helpful plant care assistant. You help users with:
1. Plant disease identification and treatment
2. Plant care tips and advice
3. Gardening best practices
4. Plant selection recommendations";

/// Build the prompt sent upstream.
///
/// The user's message is appended verbatim after the instruction block.
pub fn compose(user_message: &str) -> String {
    format!("{}\n\nUser query: {}", INSTRUCTIONS, user_message)
}
