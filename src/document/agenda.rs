//! Auto-numbering for the agenda text area.
//!
//! Pressing Enter after `2. foo` continues the list with `3. `. Offsets are
//! UTF-16 code units because that is what the browser's selection API uses.

use serde::Serialize;

/// Result of a line-break keystroke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgendaEdit {
    pub value: String,
    pub inserted: String,
    /// Caret position after the edit, in UTF-16 code units.
    pub cursor: usize,
}

/// Number of the last numbered line in `text`, if any. A numbered line
/// starts with ASCII digits, a dot and a whitespace character. When that
/// line's number does not fit a `u64` there is nothing to continue from.
pub fn last_item_number(text: &str) -> Option<u64> {
    text.split('\n').rev().find_map(item_number)?.ok()
}

/// `None` for an unnumbered line; `Some(Err(_))` for a numbered line whose
/// number overflows.
fn item_number(line: &str) -> Option<Result<u64, std::num::ParseIntError>> {
    let digits_end = line
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    if digits_end == 0 {
        return None;
    }
    let mut rest = line[digits_end..].chars();
    match (rest.next(), rest.next()) {
        (Some('.'), Some(c)) if c.is_whitespace() => Some(line[..digits_end].parse()),
        _ => None,
    }
}

/// What a plain Enter inserts given the text before the caret.
pub fn line_break_insertion(text_before: &str) -> String {
    match last_item_number(text_before).and_then(|n| n.checked_add(1)) {
        Some(next) => format!("\n{next}. "),
        None => "\n".to_string(),
    }
}

/// Replaces the selection with a line break, numbered unless `shift` is held.
pub fn line_break(value: &str, selection_start: usize, selection_end: usize, shift: bool) -> AgendaEdit {
    let (lo, hi) = if selection_start <= selection_end {
        (selection_start, selection_end)
    } else {
        (selection_end, selection_start)
    };
    let start = byte_offset(value, lo);
    let end = byte_offset(value, hi);

    let before = &value[..start];
    let after = &value[end..];
    let inserted = if shift {
        "\n".to_string()
    } else {
        line_break_insertion(before)
    };

    let cursor = utf16_len(before) + utf16_len(&inserted);
    AgendaEdit {
        value: format!("{before}{inserted}{after}"),
        inserted,
        cursor,
    }
}

/// Byte offset of the character boundary at `units` UTF-16 code units,
/// clamped to the end of the text.
fn byte_offset(text: &str, units: usize) -> usize {
    let mut seen = 0;
    for (idx, ch) in text.char_indices() {
        if seen >= units {
            return idx;
        }
        seen += ch.len_utf16();
    }
    text.len()
}

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}
