/// Non-blank lines of `text`, in order. Shared by the terminal renderer and
/// [`format_message`] so both show the same paragraphs.
pub fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
}

/// Render message text as HTML: one `<p>` per non-blank line, all content
/// escaped.
pub fn format_message(text: &str) -> String {
    paragraphs(text)
        .map(|p| format!("<p>{}</p>", escape_html(p)))
        .collect()
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
