//! Markdown-subset to HTML formatter for chat messages.
//!
//! Each rule is a global regex substitution applied to the output of the
//! previous one, so order matters: images must be rewritten before the
//! generic link rule, and bold before italic.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").expect("image regex pattern is valid"));

static CODE_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```([a-z]*)\n([\s\S]*?)\n```").expect("code block regex pattern is valid")
});

static RENDERED_IMAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<img src="(.*?)" alt="(.*?)" class="message-image" loading="lazy">"#)
        .expect("rendered image regex pattern is valid")
});

static INLINE_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`]+)`").expect("inline code regex pattern is valid"));

static BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("bold regex pattern is valid"));

static ITALIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^*]+)\*").expect("italic regex pattern is valid"));

// CRLF mode: `.` and `$` stop before `\r`
static LIST_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mR)^- (.+)$").expect("list item regex pattern is valid"));

static LIST_GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(<li>.+</li>\n?)+").expect("list group regex pattern is valid"));

static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(.*?)\]\((.*?)\)").expect("link regex pattern is valid"));

/// Convert a chat message into an HTML fragment.
///
/// Never fails. Unmatched delimiters are left as literal text. The result is
/// meant for direct injection into a document node, so the caller owns any
/// sandboxing. Fenced code block contents are escaped, with any image
/// syntax the first rule already rewrote restored to its source form.
pub fn format_message(message: &str) -> String {
    let formatted = IMAGE_RE.replace_all(
        message,
        r#"<img src="$2" alt="$1" class="message-image" loading="lazy">"#,
    );

    let formatted = CODE_BLOCK_RE.replace_all(&formatted, |caps: &Captures| {
        format!(
            r#"<pre class="code-block"><code>{}</code></pre>"#,
            escape_code(&RENDERED_IMAGE_RE.replace_all(&caps[2], "![$2]($1)"))
        )
    });

    let formatted = INLINE_CODE_RE.replace_all(&formatted, r#"<code class="inline-code">$1</code>"#);
    let formatted = BOLD_RE.replace_all(&formatted, "<strong>$1</strong>");
    let formatted = ITALIC_RE.replace_all(&formatted, "<em>$1</em>");

    let formatted = LIST_ITEM_RE.replace_all(&formatted, "<li>$1</li>");
    let formatted = LIST_GROUP_RE.replace_all(&formatted, "<ul>$0</ul>");

    let formatted = LINK_RE.replace_all(
        &formatted,
        r#"<a href="$2" target="_blank" rel="noopener noreferrer">$1</a>"#,
    );

    formatted.replace('\n', "<br>")
}

/// Escape fenced code so neither the browser nor the link rule reads it.
fn escape_code(code: &str) -> String {
    escape_html(code).replace('[', "&#91;")
}

/// Escape the characters that would otherwise be read as markup.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
