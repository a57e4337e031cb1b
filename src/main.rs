use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::*;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use chalpooch::{
    format_message, render_transcript, ChatSession, Config, GeminiClient, RenderOptions, Theme,
};

#[derive(Parser)]
#[command(name = "chalpooch")]
#[command(about = "Chat with Gemini and render replies as HTML")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format markdown-like text as HTML
    Format {
        /// Input file (reads stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Ask a single question
    Ask {
        /// Your question
        prompt: String,
        /// Print the reply text instead of HTML
        #[arg(long)]
        raw: bool,
    },
    /// Interactive chat over stdin (/new starts over, /theme toggles, /quit exits)
    Chat {
        /// Starting theme for the saved transcript (light or dark)
        #[arg(short, long, default_value = "light")]
        theme: String,
        /// Write an HTML transcript here on exit
        #[arg(long)]
        transcript: Option<PathBuf>,
    },
    /// List known Gemini models
    Models,
    /// Update the saved configuration
    Config {
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        base_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Format { file } => format_input(file).await?,
        Commands::Ask { prompt, raw } => ask(&prompt, raw).await?,
        Commands::Chat { theme, transcript } => {
            let theme = Theme::from_str(&theme)
                .ok_or_else(|| anyhow!("Unknown theme '{}', expected light or dark", theme))?;
            chat(theme, transcript).await?
        }
        Commands::Models => list_models(),
        Commands::Config { api_key, model, base_url } => {
            update_config(&Config::get_config_path()?, api_key, model, base_url)?
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout only carries HTML
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_client() -> Result<GeminiClient> {
    let config = Config::load().context("Failed to load configuration")?;

    let api_key = config.resolve_api_key().ok_or_else(|| {
        anyhow!(
            "No Gemini API key configured. Set {} or run: chalpooch config --api-key <KEY>",
            chalpooch::config::API_KEY_ENV
        )
    })?;

    let client = GeminiClient::new(&api_key)
        .with_model(&config.resolve_model())
        .with_base_url(&config.resolve_base_url());

    info!(model = client.model(), "Gemini client ready");
    Ok(client)
}

async fn format_input(file: Option<PathBuf>) -> Result<()> {
    let text = match file {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };

    println!("{}", format_message(&text));
    Ok(())
}

async fn ask(prompt: &str, raw: bool) -> Result<()> {
    let mut session = ChatSession::new(build_client()?);

    eprintln!("🤖 Asking {}...", session.generator().model().magenta());

    if let Some(reply) = session.send(prompt).await {
        if raw {
            println!("{}", reply.content);
        } else {
            println!("{}", format_message(&reply.content));
        }
    } else {
        eprintln!("{}", "Nothing to ask: the prompt is empty".yellow());
    }

    Ok(())
}

/// A line typed into the chat prompt
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Quit,
    NewChat,
    ToggleTheme,
    Message(&'a str),
}

impl<'a> ChatInput<'a> {
    fn parse(line: &'a str) -> Self {
        match line.trim() {
            "/quit" | "/exit" => ChatInput::Quit,
            "/new" => ChatInput::NewChat,
            "/theme" => ChatInput::ToggleTheme,
            _ => ChatInput::Message(line),
        }
    }
}

async fn chat(mut theme: Theme, transcript: Option<PathBuf>) -> Result<()> {
    let mut session = ChatSession::new(build_client()?);

    eprintln!("{}", "🤖 Welcome to Chal P👀ch!".bold().blue());
    eprintln!(
        "{}",
        "Type a message and press Enter. /new starts over, /theme toggles light/dark, /quit exits."
            .dimmed()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match ChatInput::parse(&line) {
            ChatInput::Quit => break,
            ChatInput::NewChat => {
                session.new_chat();
                eprintln!("{}", "Started a new chat".green());
            }
            ChatInput::ToggleTheme => {
                theme = theme.toggled();
                eprintln!("Switched to {} mode", theme.as_str().bold());
            }
            ChatInput::Message(text) => {
                if let Some(reply) = session.send(text).await {
                    println!("{}", format_message(&reply.content));
                }
            }
        }
    }

    if let Some(path) = transcript {
        let options = RenderOptions {
            theme,
            ..RenderOptions::default()
        };
        let html = render_transcript(session.conversation().messages(), &options);
        tokio::fs::write(&path, html)
            .await
            .with_context(|| format!("Failed to write transcript {}", path.display()))?;
        eprintln!("📜 Transcript saved to {}", path.display().to_string().bold());
    }

    Ok(())
}

fn list_models() {
    println!("\n{}", "🤖 Known Gemini Models".bold().blue());
    println!("{}", "=".repeat(30).dimmed());

    for model in GeminiClient::list_models() {
        println!("  • {}", model.green());
    }
}

fn update_config(
    path: &Path,
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
) -> Result<()> {
    let mut config = Config::load_from(path).context("Failed to load configuration")?;

    if api_key.is_none() && model.is_none() && base_url.is_none() {
        println!("{} {}", "Config file:".bold(), path.display());
        println!("  model:    {}", config.resolve_model());
        println!("  base_url: {}", config.resolve_base_url());
        println!(
            "  api_key:  {}",
            if config.resolve_api_key().is_some() { "set" } else { "not set" }
        );
        return Ok(());
    }

    if api_key.is_some() {
        config.api_key = api_key;
    }
    if model.is_some() {
        config.model = model;
    }
    if base_url.is_some() {
        config.base_url = base_url;
    }

    config.save_to(path)?;
    println!("{}", "Configuration saved".green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_commands() {
        assert_eq!(ChatInput::parse("/quit"), ChatInput::Quit);
        assert_eq!(ChatInput::parse(" /exit "), ChatInput::Quit);
        assert_eq!(ChatInput::parse("/new"), ChatInput::NewChat);
        assert_eq!(ChatInput::parse("/theme"), ChatInput::ToggleTheme);
    }

    #[test]
    fn test_chat_message_kept_as_typed() {
        assert_eq!(ChatInput::parse("  hello  "), ChatInput::Message("  hello  "));
        assert_eq!(ChatInput::parse("/themes"), ChatInput::Message("/themes"));
    }

    #[test]
    fn test_update_config_keeps_other_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "api_key": "secret", "model": "gemini-1.5-pro" }"#).unwrap();

        update_config(&path, None, Some("gemini-2.0-flash".to_string()), None).unwrap();

        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.api_key.as_deref(), Some("secret"));
        assert_eq!(saved.model.as_deref(), Some("gemini-2.0-flash"));
    }

    #[test]
    fn test_update_config_refuses_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(update_config(&path, Some("new-key".to_string()), None, None).is_err());
        assert!(update_config(&path, None, None, None).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_theme_toggle_reaches_transcript() {
        let mut theme = Theme::Light;
        if ChatInput::parse("/theme") == ChatInput::ToggleTheme {
            theme = theme.toggled();
        }
        let options = RenderOptions {
            theme,
            ..RenderOptions::default()
        };
        let html = render_transcript(&[], &options);
        assert!(html.contains(r#"<html class="dark">"#));
    }
}
