//! Command input line with cursor editing and history recall.

/// History entries kept for Up/Down recall.
const HISTORY_LIMIT: usize = 200;


/// Single-line editor backing the `Command Input` box.
///
/// Text is held as `char`s so the cursor moves by character, not byte.
#[derive(Debug, Default)]
pub struct InputLine {
    chars: Vec<char>,
    cursor: usize,
    history: Vec<String>,
    /// Index into `history` while recalling, `None` while editing.
    recall: Option<usize>,
    /// The line being edited before recall started.
    draft: String,
}


impl InputLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert(&mut self, ch: char) {
        self.chars.insert(self.cursor, ch);
        self.cursor += 1;
        self.recall = None;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.chars.len());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.chars.len();
    }

    /// Drop everything left of the cursor (Ctrl-U).
    pub fn kill_to_start(&mut self) {
        self.chars.drain(..self.cursor);
        self.cursor = 0;
    }

    /// Take the trimmed line. Blank lines return `None` and are not
    /// remembered; the buffer is cleared either way.
    pub fn submit(&mut self) -> Option<String> {
        let line = self.text().trim().to_string();
        self.chars.clear();
        self.cursor = 0;
        self.recall = None;
        self.draft.clear();
        if line.is_empty() {
            return None;
        }
        if self.history.last() != Some(&line) {
            self.history.push(line.clone());
            if self.history.len() > HISTORY_LIMIT {
                self.history.remove(0);
            }
        }
        Some(line)
    }

    /// Recall the previous history entry (Up).
    pub fn recall_older(&mut self) {
        let index = match self.recall {
            None if self.history.is_empty() => return,
            None => {
                self.draft = self.text();
                self.history.len() - 1
            }
            Some(0) => return,
            Some(i) => i - 1,
        };
        self.recall = Some(index);
        let entry = self.history[index].clone();
        self.replace(&entry);
    }

    /// Move toward the present (Down); past the newest entry restores the
    /// draft.
    pub fn recall_newer(&mut self) {
        let Some(i) = self.recall else {
            return;
        };
        if i + 1 < self.history.len() {
            self.recall = Some(i + 1);
            let entry = self.history[i + 1].clone();
            self.replace(&entry);
        } else {
            self.recall = None;
            let draft = std::mem::take(&mut self.draft);
            self.replace(&draft);
        }
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// The slice of text visible in `width` columns, scrolled so the cursor
    /// stays in view, and the cursor column within it.
    pub fn visible(&self, width: usize) -> (String, usize) {
        if width == 0 {
            return (String::new(), 0);
        }
        let start = (self.cursor + 1).saturating_sub(width);
        let end = (start + width).min(self.chars.len());
        (self.chars[start..end].iter().collect(), self.cursor - start)
    }

    fn replace(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.cursor = self.chars.len();
    }
}
