//! Note markdown, parsed once into a typed tree and rendered separately.
//!
//! Parsing goes through pulldown-cmark so nesting (a checkbox inside a list,
//! bold text inside a heading) is resolved by a real parser. The tree is flat
//! at the block level: list items carry their nesting depth instead of owning
//! child lists, which is all the renderers need.

pub mod html;
pub mod terminal;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Code(String),
    Link { url: String, children: Vec<Inline> },
    /// `[[Note Title]]`
    WikiLink(String),
    LineBreak,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, content: Vec<Inline> },
    Paragraph(Vec<Inline>),
    ListItem { depth: usize, ordinal: Option<u64>, content: Vec<Inline> },
    Checkbox { depth: usize, checked: bool, content: Vec<Inline> },
    Quote(Vec<Inline>),
    Code { lang: Option<String>, text: String },
    Rule,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Inline {
    pub fn plain_text(&self) -> String {
        match self {
            Inline::Text(text) | Inline::Code(text) | Inline::WikiLink(text) => text.clone(),
            Inline::Strong(children)
            | Inline::Emphasis(children)
            | Inline::Strikethrough(children)
            | Inline::Link { children, .. } => plain_text(children),
            Inline::LineBreak => "\n".to_string(),
        }
    }
}

pub fn plain_text(inlines: &[Inline]) -> String {
    inlines.iter().map(Inline::plain_text).collect()
}

impl Block {
    pub fn plain_text(&self) -> String {
        match self {
            Block::Heading { content, .. }
            | Block::Paragraph(content)
            | Block::ListItem { content, .. }
            | Block::Checkbox { content, .. }
            | Block::Quote(content) => plain_text(content),
            Block::Code { text, .. } => text.trim_end().to_string(),
            Block::Rule => String::new(),
        }
    }

    pub fn inlines(&self) -> &[Inline] {
        match self {
            Block::Heading { content, .. }
            | Block::Paragraph(content)
            | Block::ListItem { content, .. }
            | Block::Checkbox { content, .. }
            | Block::Quote(content) => content,
            Block::Code { .. } | Block::Rule => &[],
        }
    }
}

impl Document {
    pub fn parse(source: &str) -> Self {
        let mut builder = Builder::default();
        for event in Parser::new_ext(source, Options::ENABLE_TASKLISTS | Options::ENABLE_STRIKETHROUGH) {
            builder.event(event);
        }
        builder.finish()
    }

    /// Titles referenced with `[[...]]`, in order of appearance, without repeats.
    pub fn wiki_links(&self) -> Vec<&str> {
        fn collect<'a>(inlines: &'a [Inline], out: &mut Vec<&'a str>) {
            for inline in inlines {
                match inline {
                    Inline::WikiLink(title) => {
                        if !out.contains(&title.as_str()) {
                            out.push(title);
                        }
                    }
                    Inline::Strong(children)
                    | Inline::Emphasis(children)
                    | Inline::Strikethrough(children)
                    | Inline::Link { children, .. } => collect(children, out),
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        for block in &self.blocks {
            collect(block.inlines(), &mut out);
        }
        out
    }

    /// `(checked, total)` checkbox counts.
    pub fn checklist_progress(&self) -> (usize, usize) {
        self.blocks.iter().fold((0, 0), |(done, total), block| match block {
            Block::Checkbox { checked, .. } => (done + usize::from(*checked), total + 1),
            _ => (done, total),
        })
    }
}

/// Short preview of a note: the text after a leading heading, cut at
/// `max_chars` characters with `...` appended when something was dropped.
pub fn excerpt(source: &str, max_chars: usize) -> String {
    let document = Document::parse(source);
    let mut blocks = document.blocks.iter().peekable();
    if let Some(Block::Heading { .. }) = blocks.peek() {
        blocks.next();
    }
    let text = blocks
        .map(Block::plain_text)
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if text.chars().count() <= max_chars {
        return text;
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

#[derive(Debug, Clone, Copy)]
enum Pending {
    Heading(u8),
    Paragraph,
    Quote,
    Item { depth: usize, ordinal: Option<u64> },
    Checkbox { depth: usize, checked: bool },
}

enum Frame {
    Strong,
    Emphasis,
    Strikethrough,
    Link(String),
}

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    current: Option<Pending>,
    content: Vec<Inline>,
    frames: Vec<(Frame, Vec<Inline>)>,
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    code: Option<(Option<String>, String)>,
}

impl Builder {
    fn event(&mut self, event: Event<'_>) {
        if let Some((_, text)) = self.code.as_mut() {
            match event {
                Event::Text(t) => text.push_str(&t),
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, text)) = self.code.take() {
                        self.blocks.push(Block::Code { lang, text });
                    }
                }
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => self.push_text(&text),
            Event::Code(code) => self.push_inline(Inline::Code(code.to_string())),
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.push_inline(Inline::LineBreak),
            Event::Rule => {
                self.flush();
                self.blocks.push(Block::Rule);
            }
            Event::TaskListMarker(checked) => {
                if let Some(Pending::Item { depth, .. }) = self.current {
                    self.current = Some(Pending::Checkbox { depth, checked });
                }
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => self.begin(Pending::Heading(level as u8)),
            Tag::Paragraph => {
                let fresh_item = matches!(
                    self.current,
                    Some(Pending::Item { .. } | Pending::Checkbox { .. })
                ) && self.content.is_empty();
                if !fresh_item {
                    self.begin(self.paragraph_kind());
                }
            }
            Tag::BlockQuote => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                };
                self.code = Some((lang, String::new()));
            }
            Tag::List(first) => {
                self.flush();
                self.lists.push(first);
            }
            Tag::Item => {
                let depth = self.lists.len().saturating_sub(1);
                let ordinal = match self.lists.last_mut() {
                    Some(Some(next)) => {
                        let ordinal = *next;
                        *next += 1;
                        Some(ordinal)
                    }
                    _ => None,
                };
                self.begin(Pending::Item { depth, ordinal });
            }
            Tag::Emphasis => self.frames.push((Frame::Emphasis, Vec::new())),
            Tag::Strong => self.frames.push((Frame::Strong, Vec::new())),
            Tag::Strikethrough => self.frames.push((Frame::Strikethrough, Vec::new())),
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                self.frames.push((Frame::Link(dest_url.to_string()), Vec::new()))
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) | TagEnd::Paragraph | TagEnd::Item => self.flush(),
            TagEnd::BlockQuote => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link | TagEnd::Image => {
                if let Some((frame, children)) = self.frames.pop() {
                    let inline = match frame {
                        Frame::Strong => Inline::Strong(children),
                        Frame::Emphasis => Inline::Emphasis(children),
                        Frame::Strikethrough => Inline::Strikethrough(children),
                        Frame::Link(url) => Inline::Link { url, children },
                    };
                    self.push_inline(inline);
                }
            }
            _ => {}
        }
    }

    fn paragraph_kind(&self) -> Pending {
        if self.quote_depth > 0 {
            Pending::Quote
        } else {
            Pending::Paragraph
        }
    }

    fn begin(&mut self, kind: Pending) {
        self.flush();
        self.current = Some(kind);
    }

    fn target(&mut self) -> &mut Vec<Inline> {
        if self.current.is_none() {
            self.current = Some(self.paragraph_kind());
        }
        match self.frames.last_mut() {
            Some((_, children)) => children,
            None => &mut self.content,
        }
    }

    fn push_text(&mut self, text: &str) {
        let target = self.target();
        if let Some(Inline::Text(last)) = target.last_mut() {
            last.push_str(text);
        } else {
            target.push(Inline::Text(text.to_string()));
        }
    }

    fn push_inline(&mut self, inline: Inline) {
        self.target().push(inline);
    }

    fn flush(&mut self) {
        // Close frames left open by malformed input, keeping their text.
        while let Some((_, children)) = self.frames.pop() {
            match self.frames.last_mut() {
                Some((_, parent)) => parent.extend(children),
                None => self.content.extend(children),
            }
        }
        let Some(kind) = self.current.take() else {
            return;
        };
        let content = split_wiki_links(std::mem::take(&mut self.content));
        let block = match kind {
            Pending::Heading(level) => Block::Heading { level, content },
            Pending::Paragraph => Block::Paragraph(content),
            Pending::Quote => Block::Quote(content),
            Pending::Item { depth, ordinal } => Block::ListItem { depth, ordinal, content },
            Pending::Checkbox { depth, checked } => Block::Checkbox { depth, checked, content },
        };
        self.blocks.push(block);
    }

    fn finish(mut self) -> Document {
        self.flush();
        if let Some((lang, text)) = self.code.take() {
            self.blocks.push(Block::Code { lang, text });
        }
        Document { blocks: self.blocks }
    }
}

/// Split `[[Title]]` out of text runs into wiki link nodes. Link text and
/// inline code are left alone.
fn split_wiki_links(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut out = Vec::with_capacity(inlines.len());
    for inline in inlines {
        match inline {
            Inline::Text(text) => split_text(&text, &mut out),
            Inline::Strong(children) => out.push(Inline::Strong(split_wiki_links(children))),
            Inline::Emphasis(children) => out.push(Inline::Emphasis(split_wiki_links(children))),
            Inline::Strikethrough(children) => {
                out.push(Inline::Strikethrough(split_wiki_links(children)))
            }
            other => out.push(other),
        }
    }
    out
}

fn split_text(text: &str, out: &mut Vec<Inline>) {
    let mut rest = text;
    while let Some(open) = rest.find("[[") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("]]") else {
            break;
        };
        let title = after[..close].trim();
        if title.is_empty() || title.contains('[') {
            out.push(Inline::Text(rest[..open + 2].to_string()));
            rest = after;
            continue;
        }
        if open > 0 {
            out.push(Inline::Text(rest[..open].to_string()));
        }
        out.push(Inline::WikiLink(title.to_string()));
        rest = &after[close + 2..];
    }
    if !rest.is_empty() {
        out.push(Inline::Text(rest.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn heading_with_bold() {
        let doc = Document::parse("## Plan **now**");
        assert_eq!(
            doc.blocks,
            vec![Block::Heading {
                level: 2,
                content: vec![text("Plan "), Inline::Strong(vec![text("now")])],
            }]
        );
    }

    #[test]
    fn inline_tags_stay_in_the_text() {
        let doc = Document::parse("a <b>bold</b> text");
        assert_eq!(doc.blocks, vec![Block::Paragraph(vec![text("a <b>bold</b> text")])]);
    }

    #[test]
    fn checkbox_nested_in_list() {
        let doc = Document::parse("- parent\n  - [x] done\n  - [ ] todo\n");
        assert_eq!(
            doc.blocks,
            vec![
                Block::ListItem { depth: 0, ordinal: None, content: vec![text("parent")] },
                Block::Checkbox { depth: 1, checked: true, content: vec![text("done")] },
                Block::Checkbox { depth: 1, checked: false, content: vec![text("todo")] },
            ]
        );
        assert_eq!(doc.checklist_progress(), (1, 2));
    }

    #[test]
    fn ordered_list_numbers() {
        let doc = Document::parse("3. a\n4. b\n");
        let ordinals: Vec<_> = doc
            .blocks
            .iter()
            .map(|b| match b {
                Block::ListItem { ordinal, .. } => *ordinal,
                _ => None,
            })
            .collect();
        assert_eq!(ordinals, [Some(3), Some(4)]);
    }

    #[test]
    fn wiki_links_are_parsed() {
        let doc = Document::parse("See [[Project Plan]] and [[Budget]].");
        assert_eq!(
            doc.blocks,
            vec![Block::Paragraph(vec![
                text("See "),
                Inline::WikiLink("Project Plan".into()),
                text(" and "),
                Inline::WikiLink("Budget".into()),
                text("."),
            ])]
        );
        assert_eq!(doc.wiki_links(), ["Project Plan", "Budget"]);
    }

    #[test]
    fn unterminated_wiki_link_stays_text() {
        let doc = Document::parse("broken [[link");
        assert_eq!(doc.blocks, vec![Block::Paragraph(vec![text("broken [[link")])]);
    }

    #[test]
    fn code_block_keeps_raw_text() {
        let doc = Document::parse("```rust\nlet x = [[a]];\n```\n");
        assert_eq!(
            doc.blocks,
            vec![Block::Code { lang: Some("rust".into()), text: "let x = [[a]];\n".into() }]
        );
    }

    #[test]
    fn quote_and_rule() {
        let doc = Document::parse("> quoted\n\n---\n");
        assert_eq!(doc.blocks, vec![Block::Quote(vec![text("quoted")]), Block::Rule]);
    }

    #[test]
    fn excerpt_skips_leading_heading() {
        assert_eq!(excerpt("# Title\n\nBody text", 120), "Body text");
        assert_eq!(excerpt("Just text", 120), "Just text");
    }

    #[test]
    fn excerpt_truncates_on_char_boundary() {
        let body = "é".repeat(10);
        assert_eq!(excerpt(&body, 4), "éééé...");
        assert_eq!(excerpt("", 10), "");
    }
}
