pub mod ai;
pub mod config;
pub mod formatter;
pub mod render;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use ai::{GeminiClient, ReplyGenerator};
pub use config::Config;
pub use formatter::format_message;
pub use render::{render_message, render_transcript, RenderOptions, Theme};
pub use session::{ChatSession, FALLBACK_REPLY};
pub use state::{ChatMessage, ChatRole, Conversation};
