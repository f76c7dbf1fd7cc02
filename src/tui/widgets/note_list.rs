use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::text::Line;

use crate::markdown::Document;
use crate::models::Note;
use crate::tui::widgets::task_list::truncate_spans;

/// One list row for a note: title, checklist progress and tags.
pub fn note_line(note: &Note, max_width: usize) -> Line<'static> {
    let mut spans = vec![Span::raw(note.title.clone())];
    let (done, total) = Document::parse(&note.content).checklist_progress();
    if total > 0 {
        spans.push(Span::styled(
            format!(" [{}/{}]", done, total),
            Style::default().add_modifier(Modifier::DIM),
        ));
    }
    if !note.tags.is_empty() {
        spans.push(Span::styled(
            format!(" {}", note.tags.format_hashes()),
            Style::default().add_modifier(Modifier::DIM),
        ));
    }
    truncate_spans(spans, max_width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shows_checklist_progress() {
        let note = Note::new("u1", "Packing".into(), "- [x] socks\n- [ ] tent".into());
        let line = note_line(&note, 80);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "Packing [1/2]");
    }
}
