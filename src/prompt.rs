//! Instruction template for the conversation-partner persona
//!
//! The user's transcript is never sent to the upstream API bare: it is
//! embedded in a fixed template that frames the assistant's persona and
//! constrains reply length, so the tone stays consistent regardless of
//! how the user phrases things.

/// Wrap a user transcript in the conversation-partner instruction template
#[must_use]
pub fn conversation_prompt(user_text: &str) -> String {
    format!(
        "You are a helpful English conversation partner. The user said: \"{user_text}\". \
         Please respond naturally and help them practice English. \
         Keep your response conversational and concise (2-3 sentences maximum)."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_embeds_user_text_verbatim() {
        let prompt = conversation_prompt("Hello, how are you?");
        assert!(prompt.contains("\"Hello, how are you?\""));
    }

    #[test]
    fn template_constrains_reply_length() {
        let prompt = conversation_prompt("anything");
        assert!(prompt.contains("2-3 sentences maximum"));
        assert!(prompt.starts_with("You are a helpful English conversation partner."));
    }
}
