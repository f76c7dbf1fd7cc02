use std::cmp;

const MAX_UNDO: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    lines: Vec<String>,
    cursor_line: usize,
    cursor_col: usize,
}

/// Text buffer behind form fields and one-line prompts. Columns count chars,
/// not bytes.
#[derive(Debug, Clone)]
pub struct Editor {
    pub lines: Vec<String>,
    pub cursor_line: usize,
    pub cursor_col: usize,
    /// First visible line.
    pub scroll_offset: usize,
    single_line: bool,
    undo_stack: Vec<Snapshot>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_line: 0,
            cursor_col: 0,
            scroll_offset: 0,
            single_line: false,
            undo_stack: Vec::new(),
        }
    }

    /// An editor that ignores newlines (titles, dates, tags).
    pub fn single_line() -> Self {
        Self {
            single_line: true,
            ..Self::new()
        }
    }

    /// Load `content` with the cursor at its end.
    pub fn from_string(content: &str) -> Self {
        let mut editor = Self::new();
        editor.set_text(content);
        editor
    }

    pub fn single_line_from(content: &str) -> Self {
        let mut editor = Self::single_line();
        editor.set_text(&content.replace('\n', " "));
        editor
    }

    fn set_text(&mut self, content: &str) {
        self.lines = content.split('\n').map(str::to_string).collect();
        self.cursor_line = self.lines.len() - 1;
        self.cursor_col = self.line_len(self.cursor_line);
    }

    pub fn is_single_line(&self) -> bool {
        self.single_line
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.is_empty())
    }

    pub fn clear(&mut self) {
        self.remember();
        self.lines = vec![String::new()];
        self.cursor_line = 0;
        self.cursor_col = 0;
        self.scroll_offset = 0;
    }

    fn line_len(&self, line: usize) -> usize {
        self.lines.get(line).map(|l| l.chars().count()).unwrap_or(0)
    }

    fn byte_index(line: &str, col: usize) -> usize {
        line.char_indices().nth(col).map(|(i, _)| i).unwrap_or(line.len())
    }

    fn remember(&mut self) {
        if self.undo_stack.len() == MAX_UNDO {
            self.undo_stack.remove(0);
        }
        self.undo_stack.push(Snapshot {
            lines: self.lines.clone(),
            cursor_line: self.cursor_line,
            cursor_col: self.cursor_col,
        });
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' {
            self.insert_newline();
            return;
        }
        self.remember();
        let col = cmp::min(self.cursor_col, self.line_len(self.cursor_line));
        if let Some(line) = self.lines.get_mut(self.cursor_line) {
            let at = Self::byte_index(line, col);
            line.insert(at, ch);
            self.cursor_col = col + 1;
        }
    }

    pub fn insert_newline(&mut self) {
        if self.single_line {
            return;
        }
        self.remember();
        let col = cmp::min(self.cursor_col, self.line_len(self.cursor_line));
        let Some(line) = self.lines.get_mut(self.cursor_line) else {
            return;
        };
        let at = Self::byte_index(line, col);
        let rest = line.split_off(at);
        self.lines.insert(self.cursor_line + 1, rest);
        self.cursor_line += 1;
        self.cursor_col = 0;
    }

    /// Backspace: remove the char before the cursor, joining lines at column 0.
    pub fn delete_char(&mut self) {
        let col = cmp::min(self.cursor_col, self.line_len(self.cursor_line));
        if col > 0 {
            self.remember();
            if let Some(line) = self.lines.get_mut(self.cursor_line) {
                let at = Self::byte_index(line, col - 1);
                line.remove(at);
            }
            self.cursor_col = col - 1;
        } else if self.cursor_line > 0 {
            self.remember();
            let current = self.lines.remove(self.cursor_line);
            self.cursor_line -= 1;
            self.cursor_col = self.line_len(self.cursor_line);
            if let Some(previous) = self.lines.get_mut(self.cursor_line) {
                previous.push_str(&current);
            }
        }
    }

    /// Delete key: remove the char under the cursor, joining the next line at
    /// the end of this one.
    pub fn delete_forward(&mut self) {
        let len = self.line_len(self.cursor_line);
        let col = cmp::min(self.cursor_col, len);
        if col < len {
            self.remember();
            if let Some(line) = self.lines.get_mut(self.cursor_line) {
                let at = Self::byte_index(line, col);
                line.remove(at);
            }
        } else if self.cursor_line + 1 < self.lines.len() {
            self.remember();
            let next = self.lines.remove(self.cursor_line + 1);
            if let Some(line) = self.lines.get_mut(self.cursor_line) {
                line.push_str(&next);
            }
        }
    }

    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(snapshot) => {
                self.lines = snapshot.lines;
                self.cursor_line = snapshot.cursor_line;
                self.cursor_col = snapshot.cursor_col;
                true
            }
            None => false,
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col = cmp::min(self.cursor_col, self.line_len(self.cursor_line)) - 1;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.line_len(self.cursor_line);
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_col < self.line_len(self.cursor_line) {
            self.cursor_col += 1;
        } else if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = 0;
        }
    }

    pub fn move_cursor_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = cmp::min(self.cursor_col, self.line_len(self.cursor_line));
        }
    }

    pub fn move_cursor_down(&mut self) {
        if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = cmp::min(self.cursor_col, self.line_len(self.cursor_line));
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_col = self.line_len(self.cursor_line);
    }

    /// Keep the cursor line inside a viewport of `viewport_height` lines.
    pub fn update_scroll(&mut self, viewport_height: usize) {
        let height = viewport_height.max(1);
        if self.cursor_line < self.scroll_offset {
            self.scroll_offset = self.cursor_line;
        } else if self.cursor_line >= self.scroll_offset + height {
            self.scroll_offset = self.cursor_line + 1 - height;
        }
    }

    /// Lines from the scroll offset, at most `viewport_height` of them.
    pub fn visible_lines(&self, viewport_height: usize) -> &[String] {
        let start = cmp::min(self.scroll_offset, self.lines.len());
        let end = cmp::min(start + viewport_height, self.lines.len());
        &self.lines[start..end]
    }

    /// Cursor position relative to the top-left of the visible text, or
    /// `None` when the cursor line is scrolled out of view.
    pub fn cursor_offset(&self, viewport_height: usize) -> Option<(u16, u16)> {
        let row = self.cursor_line.checked_sub(self.scroll_offset)?;
        if row >= viewport_height {
            return None;
        }
        let col = cmp::min(self.cursor_col, self.line_len(self.cursor_line));
        Some((col as u16, row as u16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(editor: &mut Editor, s: &str) {
        for ch in s.chars() {
            editor.insert_char(ch);
        }
    }

    #[test]
    fn typing_and_newlines() {
        let mut editor = Editor::new();
        type_str(&mut editor, "héllo\nworld");
        assert_eq!(editor.text(), "héllo\nworld");
        assert_eq!((editor.cursor_line, editor.cursor_col), (1, 5));
    }

    #[test]
    fn single_line_ignores_newline() {
        let mut editor = Editor::single_line();
        type_str(&mut editor, "a\nb");
        assert_eq!(editor.text(), "ab");
        assert_eq!(Editor::single_line_from("x\ny").text(), "x y");
    }

    #[test]
    fn backspace_joins_lines() {
        let mut editor = Editor::from_string("ab\ncd");
        editor.move_cursor_home();
        editor.delete_char();
        assert_eq!(editor.text(), "abcd");
        assert_eq!((editor.cursor_line, editor.cursor_col), (0, 2));
    }

    #[test]
    fn delete_forward_on_multibyte() {
        let mut editor = Editor::from_string("añb");
        editor.move_cursor_home();
        editor.move_cursor_right();
        editor.delete_forward();
        assert_eq!(editor.text(), "ab");
    }

    #[test]
    fn undo_restores_previous_text() {
        let mut editor = Editor::from_string("abc");
        editor.delete_char();
        editor.insert_char('x');
        assert!(editor.undo());
        assert!(editor.undo());
        assert_eq!(editor.text(), "abc");
        assert!(!editor.undo());
    }

    #[test]
    fn vertical_moves_clamp_column() {
        let mut editor = Editor::from_string("long line\nab");
        editor.move_cursor_up();
        editor.move_cursor_end();
        editor.move_cursor_down();
        assert_eq!((editor.cursor_line, editor.cursor_col), (1, 2));
    }

    #[test]
    fn scrolling_follows_cursor() {
        let mut editor = Editor::from_string("1\n2\n3\n4\n5");
        editor.update_scroll(2);
        assert_eq!(editor.scroll_offset, 3);
        assert_eq!(editor.visible_lines(2), ["4".to_string(), "5".to_string()]);
        assert_eq!(editor.cursor_offset(2), Some((1, 1)));
    }
}
