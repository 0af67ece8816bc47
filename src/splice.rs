//! Inserting and removing snippets in a prompt buffer.
//!
//! Everything here works on a snapshot: the caller passes the buffer text and
//! a selection in character offsets and gets new text back. Which buffer the
//! edit applies to is decided by the caller, see [`Target::route`].

/// Separator placed between tags.
pub const SEPARATOR: &str = ", ";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Target {
    #[default]
    Primary,
    Secondary,
}

impl Target {
    /// The secondary buffer is targeted when its toggle is on or a modifier
    /// is held at activation time.
    pub fn route(secondary_toggle: bool, modifier_held: bool) -> Self {
        if secondary_toggle || modifier_held {
            Target::Secondary
        } else {
            Target::Primary
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Splice {
    pub buffer: String,
    /// Cursor position after the inserted text, in characters.
    pub cursor: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    /// The buffer started with the snippet.
    Leading,
    /// A `", snippet"` occurrence was cut out.
    Inline,
    /// Nothing matched; the buffer is unchanged.
    Absent,
}

/// Inserts `snippet` over the selection `[sel_start, sel_end)`.
///
/// The selected range is always replaced; hosts that want to keep a selection
/// pass a collapsed range. A `", "` separator is added before the snippet
/// unless it follows a space, a comma or the start of the buffer, and after it
/// unless it precedes a space or a comma. A blank snippet never gets a
/// trailing separator. An empty or blank buffer that is selected as a whole
/// receives the bare snippet.
///
/// Offsets past the end of the buffer are clamped.
pub fn insert(
    buffer: &str,
    sel_start: usize,
    sel_end: usize,
    snippet: &str,
    _replace_selection: bool,
) -> Splice {
    let len = buffer.chars().count();
    let end = sel_end.min(len);
    let start = sel_start.min(end);

    let before = &buffer[..char_to_byte_idx(buffer, start)];
    let after = &buffer[char_to_byte_idx(buffer, end)..];

    let mut adjusted = String::with_capacity(snippet.len() + 2 * SEPARATOR.len());
    if before.is_empty() && after.is_empty() && buffer.trim().is_empty() {
        adjusted.push_str(snippet);
    } else {
        if before.chars().next_back().is_some_and(|ch| !is_separator(ch)) {
            adjusted.push_str(SEPARATOR);
        }
        adjusted.push_str(snippet);
        let trailing = after.chars().next().is_none_or(|ch| !is_separator(ch));
        if trailing && !snippet.trim().is_empty() {
            adjusted.push_str(SEPARATOR);
        }
    }

    let cursor = start + adjusted.chars().count();
    let mut text = String::with_capacity(before.len() + adjusted.len() + after.len());
    text.push_str(before);
    text.push_str(&adjusted);
    text.push_str(after);

    Splice {
        buffer: text,
        cursor,
    }
}

/// Removes `snippet` from `buffer`; a missing snippet leaves it unchanged.
pub fn remove(buffer: &str, snippet: &str) -> String {
    remove_with_outcome(buffer, snippet).0
}

/// Like [`remove`], also reporting which rule applied.
///
/// A buffer starting with the snippet (ignoring leading whitespace) loses it
/// together with any commas right after it. Otherwise the first `", snippet"`
/// is cut out. Only one occurrence is removed per call. The snippet is always
/// matched literally, so an empty snippet only strips leading commas.
pub fn remove_with_outcome(buffer: &str, snippet: &str) -> (String, Removal) {
    let trimmed = buffer.trim_start();
    if let Some(rest) = trimmed.strip_prefix(snippet) {
        let rest = rest.trim_start_matches(',').trim_start();
        return (rest.to_string(), Removal::Leading);
    }

    let needle = format!("{SEPARATOR}{snippet}");
    if let Some(pos) = buffer.find(&needle) {
        let mut text = String::with_capacity(buffer.len() - needle.len());
        text.push_str(&buffer[..pos]);
        text.push_str(&buffer[pos + needle.len()..]);
        return (text, Removal::Inline);
    }

    (buffer.to_string(), Removal::Absent)
}

fn is_separator(ch: char) -> bool {
    ch == ' ' || ch == ','
}

pub(crate) fn char_to_byte_idx(text: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }
    text.char_indices()
        .nth(char_idx)
        .map(|(byte_idx, _)| byte_idx)
        .unwrap_or(text.len())
}

#[cfg(test)]
#[path = "splice_tests.rs"]
mod splice_tests;
