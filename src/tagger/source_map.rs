use anyhow::Result;
use sourcemap::SourceMapBuilder;

use super::Insertion;

/// Build a v3 source map for a tagged file.
///
/// Lines are never added or removed, so every generated line maps to the same
/// original line. Within a line, positions after an inserted attribute are
/// shifted right by the attribute's length. Columns are UTF-16 code units, as
/// source map consumers expect.
pub(super) fn build(relative_path: &str, source: &str, insertions: &[Insertion]) -> Result<String> {
    let mut builder = SourceMapBuilder::new(Some(relative_path));
    let source_id = builder.add_source(relative_path);
    builder.set_source_contents(source_id, Some(source));

    let mut insertions = insertions.iter().peekable();

    for (row, line_text) in source.split('\n').enumerate() {
        let line = row as u32;
        builder.add_raw(line, 0, line, 0, Some(source_id), None, false);

        let mut shift = 0;
        while let Some(insertion) = insertions.next_if(|insertion| insertion.row == row) {
            let original_column = utf16_column(line_text, insertion.column);
            builder.add_raw(
                line,
                original_column + shift,
                line,
                original_column,
                Some(source_id),
                None,
                false,
            );
            shift += insertion.text.encode_utf16().count() as u32;
            builder.add_raw(
                line,
                original_column + shift,
                line,
                original_column,
                Some(source_id),
                None,
                false,
            );
        }
    }

    let mut json = vec![];
    builder.into_sourcemap().to_writer(&mut json)?;
    Ok(String::from_utf8(json)?)
}

/// UTF-16 offset of a char column within a line
fn utf16_column(line: &str, char_column: usize) -> u32 {
    line.chars()
        .take(char_column)
        .map(char::len_utf16)
        .sum::<usize>() as u32
}
