//! HTML rendering helpers shared by both apps

use pulldown_cmark::{html, Event, Options, Parser};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 760px; margin: 2rem auto; padding: 0 1rem; color: #262730; }
h1 { margin-bottom: 0.25rem; }
nav a { margin-right: 1rem; }
nav a.active { font-weight: bold; }
.notice { background: #e8f4ea; border-radius: 6px; padding: 0.75rem 1rem; margin: 1rem 0; }
.info { background: #e8f0fb; border-radius: 6px; padding: 0.75rem 1rem; margin: 1rem 0; }
.error { background: #fdecea; color: #8a1c13; border-radius: 6px; padding: 0.75rem 1rem; margin: 1rem 0; }
.msg { border-radius: 8px; padding: 0.5rem 1rem; margin: 0.5rem 0; }
.msg.user { background: #f0f2f6; }
.msg.assistant { background: #fafafa; border: 1px solid #eee; }
.msg .role { font-size: 0.8rem; color: #888; }
.post { border-bottom: 1px solid #ddd; padding: 0.5rem 0; }
input[type=text], textarea, select { width: 100%; box-sizing: border-box; padding: 0.5rem; background-color: #f0f2f6; border: 1px solid #ddd; border-radius: 4px; }
textarea { min-height: 8rem; }
button { width: 100%; padding: 0.5rem; margin-top: 0.5rem; }
#thinking { display: none; color: #888; }
"#;

/// Escape text for use in HTML element content or attribute values
pub fn escape(text: &str) -> String {
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

/// Render Markdown to HTML with raw HTML shown as text
pub fn markdown(text: &str) -> String {
    let parser = Parser::new_ext(text, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Wrap a body fragment in a complete page
pub fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        STYLE,
        body
    )
}

/// A message box with the given CSS class
pub fn banner(class: &str, text: &str) -> String {
    format!("<div class=\"{}\">{}</div>", class, escape(text))
}
