//! HTML export of a conversation

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::chat::{escape_html, format_message, Message, Role};

pub fn render_message(message: &Message) -> String {
    let icon = match message.role {
        Role::User => "fa-user",
        Role::Assistant => "fa-robot",
    };
    let content_class = if message.is_error {
        "message-content error-message"
    } else {
        "message-content"
    };

    format!(
        "<div class=\"message {role}-message\" id=\"{id}\">\
<div class=\"message-icon\"><i class=\"fas {icon}\"></i></div>\
<div class=\"{content_class}\">{body}</div></div>\n",
        role = message.role.as_str(),
        id = escape_html(&message.id),
        body = format_message(&message.text),
    )
}

pub fn render_html<'a>(title: &str, messages: impl IntoIterator<Item = &'a Message>) -> String {
    let mut html = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n<div id=\"messages\">\n",
        escape_html(title)
    );
    for message in messages {
        html.push_str(&render_message(message));
    }
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

pub fn write_html<'a>(
    path: &Path,
    title: &str,
    messages: impl IntoIterator<Item = &'a Message>,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, render_html(title, messages))
        .with_context(|| format!("writing transcript to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_markup() {
        let html = render_message(&Message::new(Role::User, "first\n\nsecond"));
        assert!(html.starts_with("<div class=\"message user-message\""));
        assert!(html.contains("fa-user"));
        assert!(html.contains("<p>first</p><p>second</p>"));
        assert!(!html.contains("error-message"));
    }

    #[test]
    fn test_error_message_flagged() {
        let html = render_message(&Message::error("HTTP 502: Bad Gateway"));
        assert!(html.contains("assistant-message"));
        assert!(html.contains("message-content error-message"));
    }

    #[test]
    fn test_transcript_escapes_content() {
        let messages = vec![Message::new(Role::Assistant, "<img src=x onerror=alert(1)>")];
        let html = render_html("a <b> title", &messages);
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
        assert!(html.contains("<title>a &lt;b&gt; title</title>"));
    }

    #[test]
    fn test_write_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("chat.html");
        let messages = vec![Message::new(Role::User, "hello")];

        write_html(&path, "Chat", &messages).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("<p>hello</p>"));
    }
}
