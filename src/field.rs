//! Single-line prompt fields edited by the front-end.
//!
//! A field owns its text plus a cursor and an optional selection anchor, both
//! counted in characters. Tag edits go through [`crate::splice`] and the field
//! takes over the returned text and cursor.

use tracing::debug;

use crate::splice::{self, Removal, Target, char_to_byte_idx};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PromptField {
    text: String,
    cursor: usize,
    anchor: Option<usize>,
}

impl PromptField {
    /// A field holding `text` with the cursor at its end.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self {
            text,
            cursor,
            anchor: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Ordered `[start, end)` of the selection; collapsed at the cursor when
    /// nothing is selected.
    pub fn selection(&self) -> (usize, usize) {
        match self.anchor {
            Some(anchor) if anchor < self.cursor => (anchor, self.cursor),
            Some(anchor) => (self.cursor, anchor),
            None => (self.cursor, self.cursor),
        }
    }

    pub fn has_selection(&self) -> bool {
        let (start, end) = self.selection();
        start != end
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.cursor.min(self.len());
        self.anchor = None;
    }

    fn prepare_selection(&mut self, extend: bool) {
        if extend {
            if self.anchor.is_none() {
                self.anchor = Some(self.cursor);
            }
        } else {
            self.anchor = None;
        }
    }

    pub fn move_left(&mut self, extend: bool) -> bool {
        self.prepare_selection(extend);
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn move_right(&mut self, extend: bool) -> bool {
        self.prepare_selection(extend);
        if self.cursor >= self.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn move_home(&mut self, extend: bool) -> bool {
        self.prepare_selection(extend);
        let moved = self.cursor != 0;
        self.cursor = 0;
        moved
    }

    pub fn move_end(&mut self, extend: bool) -> bool {
        self.prepare_selection(extend);
        let len = self.len();
        let moved = self.cursor != len;
        self.cursor = len;
        moved
    }

    pub fn select_all(&mut self) {
        self.anchor = Some(0);
        self.cursor = self.len();
    }

    pub fn insert_char(&mut self, ch: char) {
        self.delete_selection();
        let byte_idx = char_to_byte_idx(&self.text, self.cursor);
        self.text.insert(byte_idx, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        if self.cursor == 0 {
            return false;
        }
        self.remove_char_at(self.cursor - 1);
        self.cursor -= 1;
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        if self.cursor >= self.len() {
            return false;
        }
        self.remove_char_at(self.cursor);
        true
    }

    fn delete_selection(&mut self) -> bool {
        let (start, end) = self.selection();
        self.anchor = None;
        if start == end {
            return false;
        }
        let start_byte = char_to_byte_idx(&self.text, start);
        let end_byte = char_to_byte_idx(&self.text, end);
        self.text.drain(start_byte..end_byte);
        self.cursor = start;
        true
    }

    fn remove_char_at(&mut self, offset: usize) {
        let start = char_to_byte_idx(&self.text, offset);
        let end = char_to_byte_idx(&self.text, offset + 1);
        if start < end {
            self.text.drain(start..end);
        }
    }

    /// Splices `snippet` over the current selection and moves the cursor past it.
    pub fn insert_tag(&mut self, snippet: &str) {
        let (start, end) = self.selection();
        let splice = splice::insert(&self.text, start, end, snippet, true);
        debug!(snippet, start, end, cursor = splice.cursor, "inserted tag");
        self.text = splice.buffer;
        self.cursor = splice.cursor;
        self.anchor = None;
    }

    pub fn remove_tag(&mut self, snippet: &str) -> Removal {
        let (text, removal) = splice::remove_with_outcome(&self.text, snippet);
        debug!(snippet, ?removal, "removed tag");
        if removal != Removal::Absent {
            self.set_text(text);
        }
        removal
    }
}

/// The two prompt fields a tag can be routed to.
#[derive(Clone, Debug, Default)]
pub struct PromptFields {
    pub primary: PromptField,
    pub secondary: PromptField,
}

impl PromptFields {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: PromptField::new(primary),
            secondary: PromptField::new(secondary),
        }
    }

    pub fn get(&self, target: Target) -> &PromptField {
        match target {
            Target::Primary => &self.primary,
            Target::Secondary => &self.secondary,
        }
    }

    pub fn get_mut(&mut self, target: Target) -> &mut PromptField {
        match target {
            Target::Primary => &mut self.primary,
            Target::Secondary => &mut self.secondary,
        }
    }
}

#[cfg(test)]
#[path = "field_tests.rs"]
mod field_tests;
