//! Styled ratatui lines for the note pane.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use super::{Block, Document, Inline};

const RULE_WIDTH: usize = 24;

/// Render a document as lines. `accent` colors headings, checkboxes, code
/// and wiki links. Blocks are separated by a blank line, except consecutive
/// list entries.
pub fn to_lines(document: &Document, accent: Color) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut previous_was_item = false;

    for block in &document.blocks {
        let is_item = matches!(block, Block::ListItem { .. } | Block::Checkbox { .. });
        if !lines.is_empty() && !(is_item && previous_was_item) {
            lines.push(Line::default());
        }
        previous_was_item = is_item;

        match block {
            Block::Heading { level, content } => {
                let mut style = Style::default().add_modifier(Modifier::BOLD);
                if *level == 1 {
                    style = style.fg(accent).add_modifier(Modifier::UNDERLINED);
                }
                let marker = format!("{} ", "#".repeat(*level as usize));
                lines.extend(inline_lines(Span::styled(marker, style), content, style, accent));
            }
            Block::Paragraph(content) => {
                lines.extend(inline_lines(Span::raw(""), content, Style::default(), accent));
            }
            Block::ListItem { depth, ordinal, content } => {
                let marker = match ordinal {
                    Some(n) => format!("{}{}. ", indent(*depth), n),
                    None => format!("{}• ", indent(*depth)),
                };
                lines.extend(inline_lines(Span::raw(marker), content, Style::default(), accent));
            }
            Block::Checkbox { depth, checked, content } => {
                let (marker, style) = if *checked {
                    ("[x] ", Style::default().add_modifier(Modifier::CROSSED_OUT))
                } else {
                    ("[ ] ", Style::default())
                };
                let marker = Span::styled(format!("{}{}", indent(*depth), marker), Style::default().fg(accent));
                lines.extend(inline_lines(marker, content, style, accent));
            }
            Block::Quote(content) => {
                let bar = Span::styled("│ ", Style::default().fg(accent));
                lines.extend(inline_lines(bar, content, Style::default().add_modifier(Modifier::ITALIC), accent));
            }
            Block::Code { text, .. } => {
                for line in text.trim_end_matches('\n').lines() {
                    lines.push(Line::from(vec![
                        Span::raw("    "),
                        Span::styled(line.to_string(), Style::default().fg(accent)),
                    ]));
                }
            }
            Block::Rule => lines.push(Line::from("─".repeat(RULE_WIDTH))),
        }
    }

    lines
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// One block's inlines, split at hard breaks. Continuation lines are padded
/// to the width of `marker` (or repeat it, for quote bars).
fn inline_lines(marker: Span<'static>, content: &[Inline], style: Style, accent: Color) -> Vec<Line<'static>> {
    let mut rows: Vec<Vec<Span<'static>>> = vec![Vec::new()];
    push_inlines(content, style, accent, &mut rows);

    let continuation = if marker.content.trim() == "│" {
        marker.clone()
    } else {
        Span::raw(" ".repeat(marker.content.chars().count()))
    };

    rows.into_iter()
        .enumerate()
        .map(|(i, mut spans)| {
            let lead = if i == 0 { marker.clone() } else { continuation.clone() };
            if !lead.content.is_empty() {
                spans.insert(0, lead);
            }
            Line::from(spans)
        })
        .collect()
}

fn push_inlines(content: &[Inline], style: Style, accent: Color, rows: &mut Vec<Vec<Span<'static>>>) {
    for inline in content {
        match inline {
            Inline::Text(text) => push_span(rows, Span::styled(text.clone(), style)),
            Inline::Strong(children) => push_inlines(children, style.add_modifier(Modifier::BOLD), accent, rows),
            Inline::Emphasis(children) => push_inlines(children, style.add_modifier(Modifier::ITALIC), accent, rows),
            Inline::Strikethrough(children) => {
                push_inlines(children, style.add_modifier(Modifier::CROSSED_OUT), accent, rows)
            }
            Inline::Code(code) => push_span(rows, Span::styled(code.clone(), style.fg(accent))),
            Inline::Link { children, .. } => {
                push_inlines(children, style.add_modifier(Modifier::UNDERLINED), accent, rows)
            }
            Inline::WikiLink(title) => push_span(
                rows,
                Span::styled(format!("[[{}]]", title), style.fg(accent).add_modifier(Modifier::UNDERLINED)),
            ),
            Inline::LineBreak => rows.push(Vec::new()),
        }
    }
}

fn push_span(rows: &mut Vec<Vec<Span<'static>>>, span: Span<'static>) {
    if let Some(row) = rows.last_mut() {
        row.push(span);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    fn render(source: &str) -> Vec<String> {
        to_lines(&Document::parse(source), Color::Cyan).iter().map(text_of).collect()
    }

    #[test]
    fn checkbox_inside_list_keeps_its_marker() {
        let lines = render("- plain\n- [x] done\n  - [ ] nested");
        assert_eq!(lines, vec!["• plain", "[x] done", "  [ ] nested"]);
    }

    #[test]
    fn blocks_are_separated_by_blank_lines() {
        let lines = render("# Title\n\nSome **bold** text\n\n---");
        assert_eq!(lines, vec!["# Title", "", "Some bold text", "", "─".repeat(RULE_WIDTH).as_str()]);
    }

    #[test]
    fn bold_inside_heading_is_bold() {
        let lines = to_lines(&Document::parse("## a **b**"), Color::Cyan);
        let bold = lines[0].spans.iter().find(|span| span.content == "b").unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn wiki_links_are_highlighted() {
        let lines = to_lines(&Document::parse("see [[Groceries]]"), Color::Cyan);
        let link = lines[0].spans.iter().find(|span| span.content == "[[Groceries]]").unwrap();
        assert_eq!(link.style.fg, Some(Color::Cyan));
    }

    #[test]
    fn code_block_lines_are_indented() {
        let lines = render("```\nlet a = 1;\nlet b = 2;\n```");
        assert_eq!(lines, vec!["    let a = 1;", "    let b = 2;"]);
    }
}
