//! Prompt rendering for contextual mode.
//!
//! The backend takes one flat string, so the transcript is rolled up as
//! `"{role}: {content}"` lines under the system instruction, ending with the
//! new user turn.

use courier_core::types::Turn;

/// Render the contextual prompt for a new user message.
pub fn render(system_instruction: &str, transcript: &[Turn], user_text: &str) -> String {
    let mut lines = Vec::with_capacity(transcript.len() + 2);
    if !system_instruction.is_empty() {
        lines.push(system_instruction.to_string());
    }
    for turn in transcript {
        lines.push(format!("{}: {}", turn.role, turn.content));
    }
    lines.push(format!("user: {user_text}"));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::types::Turn;

    #[test]
    fn renders_turns_in_order_with_roles() {
        let transcript = vec![Turn::user("hi"), Turn::assistant("hello")];
        let prompt = render("Be brief.", &transcript, "how are you?");
        assert_eq!(
            prompt,
            "Be brief.\nuser: hi\nassistant: hello\nuser: how are you?"
        );
    }

    #[test]
    fn empty_transcript_is_instruction_plus_turn() {
        let prompt = render("Be brief.", &[], "ping");
        assert_eq!(prompt, "Be brief.\nuser: ping");
    }

    #[test]
    fn empty_instruction_is_omitted() {
        let prompt = render("", &[], "ping");
        assert_eq!(prompt, "user: ping");
    }
}
