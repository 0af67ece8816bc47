use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthChar;

use crate::catalog::{EntryKind, RenderEntry};
use crate::theme::Theme;

const INDENT: &str = "  ";

#[derive(Clone, Debug)]
pub struct FieldView {
    pub line: Line<'static>,
    pub cursor_column: u16,
}

/// Renders a single-line field into `width` columns, scrolled horizontally so
/// the cursor stays visible. `selection` is a character range.
pub fn render_field(
    text: &str,
    cursor: usize,
    selection: (usize, usize),
    width: usize,
    theme: &Theme,
) -> FieldView {
    let width = width.max(1);
    let chars: Vec<(char, usize)> = text
        .chars()
        .map(|ch| (ch, UnicodeWidthChar::width(ch).unwrap_or(0)))
        .collect();
    let cursor = cursor.min(chars.len());

    let mut first = 0;
    let mut before_cursor: usize = chars[..cursor].iter().map(|(_, w)| w).sum();
    while before_cursor >= width && first < cursor {
        before_cursor -= chars[first].1;
        first += 1;
    }

    let mut spans = Vec::new();
    let mut run = String::new();
    let mut run_selected = false;
    let mut used = 0;
    for (idx, (ch, char_width)) in chars.iter().enumerate().skip(first) {
        if used + char_width > width {
            break;
        }
        let selected = idx >= selection.0 && idx < selection.1;
        if selected != run_selected && !run.is_empty() {
            spans.push(field_span(std::mem::take(&mut run), run_selected, theme));
        }
        run_selected = selected;
        run.push(*ch);
        used += char_width;
    }
    if !run.is_empty() {
        spans.push(field_span(run, run_selected, theme));
    }

    FieldView {
        line: Line::from(spans),
        cursor_column: before_cursor.min(u16::MAX as usize) as u16,
    }
}

fn field_span(text: String, selected: bool, theme: &Theme) -> Span<'static> {
    if selected {
        Span::styled(text, theme.selected_style())
    } else {
        Span::raw(text)
    }
}

/// One row of the tag list: indented by depth, placeholders marked with a
/// trailing `/`, literals whose value differs from the label show the value.
pub fn entry_line(entry: &RenderEntry, theme: &Theme) -> Line<'static> {
    let indent = INDENT.repeat(entry.depth);
    match entry.kind {
        EntryKind::Placeholder => Line::from(vec![
            Span::raw(indent),
            Span::styled(format!("{}/", entry.label), theme.placeholder_style()),
        ]),
        EntryKind::Literal if entry.label == entry.value => Line::from(vec![
            Span::raw(indent),
            Span::styled(entry.label.clone(), theme.literal_style()),
        ]),
        EntryKind::Literal => Line::from(vec![
            Span::raw(indent),
            Span::styled(entry.label.clone(), theme.literal_style()),
            Span::styled(
                format!(" = {}", entry.value),
                Style::default().add_modifier(Modifier::DIM),
            ),
        ]),
    }
}
