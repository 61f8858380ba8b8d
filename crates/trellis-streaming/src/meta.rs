//! Head markup from page metadata.

use trellis_data::PageMeta;

/// Render metadata to head markup. Every value is escaped.
pub fn render_meta(meta: Option<&PageMeta>) -> String {
    let Some(meta) = meta else {
        return String::new();
    };

    let mut html = String::new();

    if let Some(title) = &meta.title {
        html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    }

    if let Some(description) = &meta.description {
        html.push_str(&format!(
            "<meta name=\"description\" content=\"{}\">\n",
            escape_html(description)
        ));
    }

    for tag in &meta.tags {
        html.push_str(&format!(
            "<meta name=\"{}\" content=\"{}\">\n",
            escape_html(&tag.name),
            escape_html(&tag.content)
        ));
    }

    for link in &meta.links {
        html.push_str(&format!(
            "<link rel=\"{}\" href=\"{}\">\n",
            escape_html(&link.rel),
            escape_html(&link.href)
        ));
    }

    html
}

/// Escape text for element content and quoted attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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
