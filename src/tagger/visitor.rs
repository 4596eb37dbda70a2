use tree_sitter::{Node, Tree};

use crate::{config::TaggerConfig, edit_id::EDIT_ID_ATTRIBUTE};

/// An element that qualifies for an edit identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct EditableElement {
    /// Zero-based row of the element's `<`
    pub(super) row: usize,
    /// Column of the element's `<`, in chars
    pub(super) column: usize,
    /// Byte offset of the opening tag's closing `>`
    pub(super) insert_at: usize,
    /// Zero-based row of the opening tag's closing `>`
    pub(super) insert_row: usize,
    /// Column of the opening tag's closing `>`, in chars
    pub(super) insert_column: usize,
    pub(super) tag_name: String,
    pub(super) text: String,
}

/// Walks every JSX element of a tree and collects those that should be tagged.
///
/// The tree is never mutated here; the caller turns the collected elements
/// into text insertions.
pub(super) struct EditableElementVisitor<'a> {
    config: &'a TaggerConfig,
    source: &'a str,
    found: Vec<EditableElement>,
}

impl<'a> EditableElementVisitor<'a> {
    pub(super) fn new(config: &'a TaggerConfig, source: &'a str) -> Self {
        Self {
            config,
            source,
            found: vec![],
        }
    }

    /// Visit the whole tree, returning the qualifying elements in source order
    pub(super) fn visit(mut self, tree: &Tree) -> Vec<EditableElement> {
        let mut cursor = tree.walk();
        loop {
            let node = cursor.node();
            if node.kind() == "jsx_element" {
                self.visit_element(node);
            }

            if cursor.goto_first_child() {
                continue;
            }

            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return self.found;
                }
            }
        }
    }

    fn visit_element(&mut self, element: Node<'_>) {
        let Some(open_tag) = element.child_by_field_name("open_tag") else {
            return;
        };

        if self.has_edit_id(open_tag) {
            return;
        }

        // fragments have no name
        let Some(name) = open_tag
            .child_by_field_name("name")
            .and_then(|name| self.text_of(name))
        else {
            return;
        };

        let tag_name = final_segment(name);
        if !self.config.is_editable(tag_name) {
            return;
        }

        let text = self.literal_text(element);
        if text.is_empty() {
            return;
        }

        let start = open_tag.start_position();
        let column = self.char_column(open_tag.start_byte(), start.column);

        let end = open_tag.end_position();
        let insert_at = open_tag.end_byte().saturating_sub(1);
        let insert_column = self.char_column(insert_at, end.column.saturating_sub(1));

        self.found.push(EditableElement {
            row: start.row,
            column,
            insert_at,
            insert_row: end.row,
            insert_column,
            tag_name: tag_name.to_string(),
            text,
        });
    }

    fn has_edit_id(&self, open_tag: Node<'_>) -> bool {
        let mut cursor = open_tag.walk();
        let found = open_tag
            .children_by_field_name("attribute", &mut cursor)
            .filter(|attribute| attribute.kind() == "jsx_attribute")
            .any(|attribute| {
                let mut cursor = attribute.walk();
                let name = attribute.named_children(&mut cursor).next();
                name.and_then(|name| self.text_of(name)) == Some(EDIT_ID_ATTRIBUTE)
            });
        found
    }

    /// Trimmed literal text among the element's direct children, joined by a space
    fn literal_text(&self, element: Node<'_>) -> String {
        let mut cursor = element.walk();
        let pieces = element
            .named_children(&mut cursor)
            .filter(|child| matches!(child.kind(), "jsx_text" | "html_character_reference"))
            .filter_map(|child| self.text_of(child))
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>();
        pieces.join(" ")
    }

    /// Convert a tree-sitter byte column into a char column
    fn char_column(&self, byte_offset: usize, byte_column: usize) -> usize {
        let line_start = byte_offset - byte_column;
        self.source
            .get(line_start..byte_offset)
            .map_or(byte_column, |prefix| prefix.chars().count())
    }

    fn text_of(&self, node: Node<'_>) -> Option<&'a str> {
        self.source.get(node.start_byte()..node.end_byte())
    }
}

/// `motion.h1` → `h1`, `svg:text` → `text`, `p` → `p`
pub(super) fn final_segment(name: &str) -> &str {
    name.rsplit(['.', ':']).next().unwrap_or(name).trim()
}
