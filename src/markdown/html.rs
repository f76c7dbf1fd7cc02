use super::{Block, Document, Inline};

/// Render a document to an HTML fragment. All text is escaped; list items
/// are re-nested from their depths.
pub fn to_html(document: &Document) -> String {
    let mut out = String::new();
    // One entry per open list: whether it is ordered.
    let mut open_lists: Vec<bool> = Vec::new();

    for block in &document.blocks {
        match block {
            Block::ListItem { depth, ordinal, content } => {
                open_item(&mut out, &mut open_lists, *depth, *ordinal);
                out.push_str("<li>");
                render_inlines(&mut out, content);
            }
            Block::Checkbox { depth, checked, content } => {
                open_item(&mut out, &mut open_lists, *depth, None);
                out.push_str("<li class=\"task\"><input type=\"checkbox\" disabled");
                if *checked {
                    out.push_str(" checked");
                }
                out.push_str("> ");
                render_inlines(&mut out, content);
            }
            other => {
                close_lists(&mut out, &mut open_lists, 0);
                render_block(&mut out, other);
            }
        }
    }
    close_lists(&mut out, &mut open_lists, 0);
    out
}

fn open_item(out: &mut String, open_lists: &mut Vec<bool>, depth: usize, ordinal: Option<u64>) {
    let ordered = ordinal.is_some();
    close_lists(out, open_lists, depth + 1);
    if open_lists.len() == depth + 1 {
        if open_lists.last() == Some(&ordered) {
            out.push_str("</li>\n");
        } else {
            close_lists(out, open_lists, depth);
        }
    }
    while open_lists.len() < depth + 1 {
        let innermost = open_lists.len() == depth;
        match ordinal {
            Some(start) if innermost && start != 1 => out.push_str(&format!("<ol start=\"{}\">\n", start)),
            Some(_) if innermost => out.push_str("<ol>\n"),
            _ => out.push_str("<ul>\n"),
        }
        open_lists.push(innermost && ordered);
    }
}

fn close_lists(out: &mut String, open_lists: &mut Vec<bool>, keep: usize) {
    while open_lists.len() > keep {
        let ordered = open_lists.pop().unwrap_or(false);
        out.push_str(if ordered { "</li>\n</ol>\n" } else { "</li>\n</ul>\n" });
    }
}

fn render_block(out: &mut String, block: &Block) {
    match block {
        Block::Heading { level, content } => {
            let level = (*level).clamp(1, 6);
            out.push_str(&format!("<h{}>", level));
            render_inlines(out, content);
            out.push_str(&format!("</h{}>\n", level));
        }
        Block::Paragraph(content) => {
            out.push_str("<p>");
            render_inlines(out, content);
            out.push_str("</p>\n");
        }
        Block::Quote(content) => {
            out.push_str("<blockquote><p>");
            render_inlines(out, content);
            out.push_str("</p></blockquote>\n");
        }
        Block::Code { lang, text } => {
            match lang {
                Some(lang) => out.push_str(&format!("<pre><code class=\"language-{}\">", escape(lang))),
                None => out.push_str("<pre><code>"),
            }
            out.push_str(&escape(text));
            out.push_str("</code></pre>\n");
        }
        Block::Rule => out.push_str("<hr>\n"),
        Block::ListItem { .. } | Block::Checkbox { .. } => {}
    }
}

fn render_inlines(out: &mut String, inlines: &[Inline]) {
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(&escape(text)),
            Inline::Strong(children) => wrap(out, "strong", children),
            Inline::Emphasis(children) => wrap(out, "em", children),
            Inline::Strikethrough(children) => wrap(out, "del", children),
            Inline::Code(code) => {
                out.push_str("<code>");
                out.push_str(&escape(code));
                out.push_str("</code>");
            }
            Inline::Link { url, children } => {
                out.push_str(&format!("<a href=\"{}\">", escape(safe_url(url))));
                render_inlines(out, children);
                out.push_str("</a>");
            }
            Inline::WikiLink(title) => {
                let title = escape(title);
                out.push_str(&format!("<a class=\"wiki-link\" data-note=\"{}\">{}</a>", title, title));
            }
            Inline::LineBreak => out.push_str("<br>\n"),
        }
    }
}

fn wrap(out: &mut String, tag: &str, children: &[Inline]) {
    out.push_str(&format!("<{}>", tag));
    render_inlines(out, children);
    out.push_str(&format!("</{}>", tag));
}

fn safe_url(url: &str) -> &str {
    let lower = url.trim_start().to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("data:") || lower.starts_with("vbscript:") {
        "#"
    } else {
        url
    }
}

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

#[cfg(test)]
mod tests {
    use super::*;

    fn render(source: &str) -> String {
        to_html(&Document::parse(source))
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(render("a < b & \"c\""), "<p>a &lt; b &amp; &quot;c&quot;</p>\n");
    }

    #[test]
    fn raw_html_is_escaped_not_passed_through() {
        let html = render("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn inline_html_survives_as_text() {
        assert_eq!(render("a <b>bold</b> text"), "<p>a &lt;b&gt;bold&lt;/b&gt; text</p>\n");
    }

    #[test]
    fn nested_checkbox_list() {
        let html = render("- parent\n  - [x] done\n");
        assert_eq!(
            html,
            "<ul>\n<li>parent<ul>\n<li class=\"task\"><input type=\"checkbox\" disabled checked> done</li>\n</ul>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn ordered_list_start() {
        let html = render("2. two\n3. three\n");
        assert_eq!(html, "<ol start=\"2\">\n<li>two</li>\n<li>three</li>\n</ol>\n");
    }

    #[test]
    fn wiki_link_and_heading() {
        let html = render("# **Big** [[Home]]");
        assert_eq!(
            html,
            "<h1><strong>Big</strong> <a class=\"wiki-link\" data-note=\"Home\">Home</a></h1>\n"
        );
    }

    #[test]
    fn script_urls_are_neutralised() {
        let html = render("[x](javascript:alert(1))");
        assert!(html.contains("href=\"#\""));
    }
}
