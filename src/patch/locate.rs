use std::ops::Range;

use super::ApplyEditError;
use crate::edit_id::EditId;

/// How far past the recorded position the original text may have drifted
const FORWARD_WINDOW: usize = 1024;

/// Find the byte range of `original_text` for `edit_id` in `content`.
///
/// The recorded column points at the element's `<`, so its text can only sit
/// at or after it. The first occurrence within [`FORWARD_WINDOW`] bytes of the
/// recorded position is used.
pub(super) fn locate(
    content: &str,
    edit_id: &EditId,
    original_text: &str,
) -> Result<Range<usize>, ApplyEditError> {
    let line = line_range(content, edit_id.line_index()).ok_or(ApplyEditError::LineNotFound {
        line: edit_id.line(),
    })?;

    let line_text = &content[line.clone()];
    let position = line.start + byte_column(line_text, edit_id.column());

    let window_end = floor_char_boundary(content, position.saturating_add(FORWARD_WINDOW));

    content[position..window_end]
        .find(original_text)
        .map(|offset| position + offset..position + offset + original_text.len())
        .ok_or(ApplyEditError::TextNotFound {
            line: edit_id.line(),
            column: edit_id.column(),
        })
}

/// Byte range of a zero-based line, excluding its `\n`
fn line_range(content: &str, index: usize) -> Option<Range<usize>> {
    let mut start = 0;
    for _ in 0..index {
        start += content[start..].find('\n')? + 1;
    }
    let end = content[start..]
        .find('\n')
        .map_or(content.len(), |offset| start + offset);
    Some(start..end)
}

/// Byte offset of a char column within a line, clamped to the line's end
fn byte_column(line: &str, column: usize) -> usize {
    line.char_indices()
        .nth(column)
        .map_or(line.len(), |(offset, _)| offset)
}

fn floor_char_boundary(content: &str, mut index: usize) -> usize {
    if index >= content.len() {
        return content.len();
    }
    while !content.is_char_boundary(index) {
        index -= 1;
    }
    index
}
