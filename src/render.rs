//! HTML rendering of messages and whole transcripts.
//!
//! Display settings are passed in explicitly through [`RenderOptions`]; nothing
//! here reads or stores ambient state.

use crate::formatter::{escape_html, format_message};
use crate::state::{ChatMessage, ASSISTANT_NAME};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

const WELCOME_TEXT: &str = "Your smart, sassy AI buddy is here — ready to drop facts, \
crack jokes, and solve anything you throw at me. Pick a trending vibe or hit me with something fresh!";

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub title: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            title: ASSISTANT_NAME.to_string(),
        }
    }
}

/// Render a single message with its author line and formatted body
pub fn render_message(message: &ChatMessage) -> String {
    format!(
        concat!(
            r#"<div class="message {role}">"#,
            r#"<div class="message-content"><div class="message-body">"#,
            r#"<div class="message-author">{author}</div>"#,
            r#"<div class="message-text">{text}</div>"#,
            "</div></div></div>"
        ),
        role = message.role.as_str(),
        author = message.role.author(),
        text = format_message(&message.content),
    )
}

/// Render a standalone HTML document for a conversation
pub fn render_transcript(messages: &[ChatMessage], options: &RenderOptions) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n");
    if options.theme == Theme::Dark {
        html.push_str("<html class=\"dark\">\n");
    } else {
        html.push_str("<html>\n");
    }
    html.push_str("<head><meta charset=\"utf-8\">");
    html.push_str(&format!("<title>{}</title></head>\n", escape_html(&options.title)));
    html.push_str("<body>\n<div class=\"messages-container\">\n");

    if messages.is_empty() {
        html.push_str(&format!(
            "<div class=\"empty-state\"><h2>🤖 Welcome to {}!</h2><p>{}</p></div>\n",
            ASSISTANT_NAME, WELCOME_TEXT
        ));
    }

    for message in messages {
        html.push_str(&render_message(message));
        html.push('\n');
    }

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_parse_and_toggle() {
        assert_eq!(Theme::from_str("DARK"), Some(Theme::Dark));
        assert_eq!(Theme::from_str("light"), Some(Theme::Light));
        assert_eq!(Theme::from_str("sepia"), None);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().as_str(), "light");
    }

    #[test]
    fn test_render_user_message() {
        let html = render_message(&ChatMessage::user("**hey**"));
        assert!(html.starts_with(r#"<div class="message user">"#));
        assert!(html.contains(r#"<div class="message-author">You</div>"#));
        assert!(html.contains(r#"<div class="message-text"><strong>hey</strong></div>"#));
    }

    #[test]
    fn test_render_assistant_message() {
        let html = render_message(&ChatMessage::assistant("a\nb"));
        assert!(html.starts_with(r#"<div class="message assistant">"#));
        assert!(html.contains("Chal P👀ch"));
        assert!(html.contains("a<br>b"));
    }

    #[test]
    fn test_transcript_theme_class() {
        let options = RenderOptions {
            theme: Theme::Dark,
            ..RenderOptions::default()
        };
        let html = render_transcript(&[ChatMessage::user("hi")], &options);
        assert!(html.contains(r#"<html class="dark">"#));
        assert!(!html.contains("empty-state"));

        let html = render_transcript(&[ChatMessage::user("hi")], &RenderOptions::default());
        assert!(html.contains("<html>"));
    }

    #[test]
    fn test_empty_transcript_shows_welcome() {
        let html = render_transcript(&[], &RenderOptions::default());
        assert!(html.contains("empty-state"));
        assert!(html.contains("<h2>🤖 Welcome to Chal P👀ch!</h2>"));
        assert!(html.contains("<p>Your smart, sassy AI buddy is here"));
        assert!(!html.contains(r#"class="message "#));
    }

    #[test]
    fn test_transcript_keeps_message_order() {
        let messages = vec![ChatMessage::user("one"), ChatMessage::assistant("two")];
        let html = render_transcript(&messages, &RenderOptions::default());
        let first = html.find("one").unwrap();
        let second = html.find("two").unwrap();
        assert!(first < second);
    }
}
