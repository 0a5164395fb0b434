//! Single-line text input state for the search and command bars.

/// Cursor-addressed single-line input buffer.
///
/// The cursor is a char index; edits convert to byte offsets internally so
/// multi-byte input stays intact.
pub struct InputState {
    pub cursor: usize,
    text: String,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            text: String::new(),
        }
    }

    pub fn with_text(text: String) -> Self {
        let cursor = text.chars().count();

        Self { cursor, text }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn take_text(&mut self) -> String {
        self.cursor = 0;

        std::mem::take(&mut self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replaces the buffer, moving the cursor to the end.
    pub fn set_text(&mut self, text: String) {
        self.cursor = text.chars().count();
        self.text = text;
    }

    pub fn insert_char(&mut self, ch: char) {
        let byte_offset = self.byte_offset();
        self.text.insert(byte_offset, ch);
        self.cursor += 1;
    }

    pub fn delete_backward(&mut self) {
        if self.cursor == 0 {
            return;
        }

        let start = self.byte_offset_at(self.cursor - 1);
        let end = self.byte_offset();
        self.text.replace_range(start..end, "");
        self.cursor -= 1;
    }

    pub fn delete_forward(&mut self) {
        let char_count = self.text.chars().count();
        if self.cursor >= char_count {
            return;
        }

        let start = self.byte_offset();
        let end = self.byte_offset_at(self.cursor + 1);
        self.text.replace_range(start..end, "");
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        let char_count = self.text.chars().count();
        if self.cursor < char_count {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    fn byte_offset(&self) -> usize {
        self.byte_offset_at(self.cursor)
    }

    fn byte_offset_at(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(offset, _)| offset)
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_delete_respect_cursor() {
        // Arrange
        let mut input = InputState::new();

        // Act
        input.insert_char('s');
        input.insert_char('y');
        input.insert_char('c');
        input.move_left();
        input.insert_char('n');
        input.move_end();
        input.delete_backward();

        // Assert
        assert_eq!(input.text(), "syn");
        assert_eq!(input.cursor, 3);
    }

    #[test]
    fn test_multibyte_input_keeps_byte_offsets_valid() {
        // Arrange
        let mut input = InputState::with_text("héllo".to_string());

        // Act
        input.move_home();
        input.move_right();
        input.delete_forward();

        // Assert
        assert_eq!(input.text(), "hllo");
        assert_eq!(input.cursor, 1);
    }

    #[test]
    fn test_take_text_resets_state() {
        // Arrange
        let mut input = InputState::with_text("sync guestbook".to_string());

        // Act
        let taken = input.take_text();

        // Assert
        assert_eq!(taken, "sync guestbook");
        assert!(input.is_empty());
        assert_eq!(input.cursor, 0);
    }
}
