//! One chat session: the conversation plus the generator that answers it.

use tracing::{info, warn};

use crate::ai::ReplyGenerator;
use crate::state::{ChatMessage, Conversation};

/// Shown in place of a reply whenever generation fails for any reason
pub const FALLBACK_REPLY: &str = "Sorry, there was an error generating a response. Please try again.";

pub struct ChatSession<G> {
    generator: G,
    conversation: Conversation,
}

impl<G: ReplyGenerator> ChatSession<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            conversation: Conversation::new(),
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Run one turn and return the assistant message it appended.
    ///
    /// Blank input is ignored and returns `None` without calling the
    /// generator. The question is sent as typed, without history.
    pub async fn send(&mut self, question: &str) -> Option<&ChatMessage> {
        if question.trim().is_empty() {
            return None;
        }

        self.conversation.push(ChatMessage::user(question));

        let reply = match self.generator.generate(question).await {
            Ok(text) => {
                info!(reply_len = text.len(), "reply received");
                text
            }
            Err(e) => {
                warn!(error = %e, "error generating response");
                FALLBACK_REPLY.to_string()
            }
        };

        self.conversation.push(ChatMessage::assistant(reply));
        self.conversation.last()
    }

    /// Drop the history and start over
    pub fn new_chat(&mut self) {
        self.conversation.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ChatRole;
    use anyhow::{anyhow, Result};
    use std::sync::Mutex;

    struct ScriptedGenerator {
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl ReplyGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().ok_or_else(|| anyhow!("401 Unauthorized"))
        }
    }

    #[tokio::test]
    async fn test_successful_turn_appends_both_messages() {
        let mut session = ChatSession::new(ScriptedGenerator::replying("**hi** there"));

        let reply = session.send("hello").await.cloned();
        assert_eq!(reply, Some(ChatMessage::assistant("**hi** there")));

        let messages = session.conversation().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ChatMessage::user("hello"));
        assert_eq!(messages[1].role, ChatRole::Assistant);
    }

    #[tokio::test]
    async fn test_failure_appends_fallback() {
        let mut session = ChatSession::new(ScriptedGenerator::failing());

        let reply = session.send("hello").await.cloned();
        assert_eq!(reply, Some(ChatMessage::assistant(FALLBACK_REPLY)));
        assert_eq!(session.conversation().len(), 2);
    }

    #[tokio::test]
    async fn test_blank_input_ignored() {
        let mut session = ChatSession::new(ScriptedGenerator::replying("unused"));

        assert!(session.send("").await.is_none());
        assert!(session.send("   \n\t").await.is_none());
        assert!(session.conversation().is_empty());
        assert!(session.generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_question_sent_untrimmed_without_history() {
        let mut session = ChatSession::new(ScriptedGenerator::replying("ok"));

        session.send("first").await;
        session.send("  second  ").await;

        assert_eq!(session.generator.prompts(), vec!["first", "  second  "]);
        assert_eq!(session.conversation().messages()[2], ChatMessage::user("  second  "));
        assert_eq!(session.conversation().len(), 4);
    }

    #[tokio::test]
    async fn test_new_chat_clears_history() {
        let mut session = ChatSession::new(ScriptedGenerator::replying("ok"));
        session.send("hello").await;

        session.new_chat();
        assert!(session.conversation().is_empty());
    }
}
