use crate::io_struct::ChatMessage;

/// Number of trailing history entries forwarded upstream.
pub const MAX_HISTORY_MESSAGES: usize = 4;

const SYSTEM_PROMPT_HEADER: &str = "You are an expert in email marketing and \
HTML/CSS email development with access to a component library.";

const SYSTEM_PROMPT_RULES: &str = "\
IMPORTANT INSTRUCTIONS:
- ALWAYS use components from the library when relevant
- Reference components by their exact name and ID
- Adapt component code when necessary
- Explain the best practices specific to each component
- Mention email client compatibility
- Be concise but precise (max 300 words)
- Keep a professional but approachable tone
- When you use a component, mention its ID in brackets [ID]

AREAS OF EXPERTISE:
- Email marketing best practices
- Multi-client compatibility (Outlook, Gmail, Apple Mail, etc.)
- Email accessibility (WCAG 2.1)
- HTML/CSS optimization for email
- VML techniques for Outlook
- Responsive design for email
- Testing and debugging
- Using the component library";

/// Build the system prompt with the caller-supplied component context
/// embedded verbatim between the persona and the rules.
pub fn system_prompt(context: &str) -> String {
    format!("{SYSTEM_PROMPT_HEADER}\n\n{context}\n\n{SYSTEM_PROMPT_RULES}")
}

/// Compose the message sequence sent upstream: system prompt, then the last
/// `MAX_HISTORY_MESSAGES` history entries in their original order, then the
/// user message.
pub fn compose_messages(message: &str, context: &str, history: &[ChatMessage]) -> Vec<ChatMessage> {
    let tail_start = history.len().saturating_sub(MAX_HISTORY_MESSAGES);
    let mut messages = Vec::with_capacity(2 + history.len() - tail_start);
    messages.push(ChatMessage::new("system", system_prompt(context)));
    messages.extend(history[tail_start..].iter().cloned());
    messages.push(ChatMessage::new("user", message));
    messages
}
