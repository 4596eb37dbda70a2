use std::collections::BTreeSet;
use tree_sitter::{Node, Tree};

/// Collect every error or missing node in the tree
pub fn collect_errors(tree: &Tree) -> Vec<Node<'_>> {
    let mut errors = vec![];
    let mut cursor = tree.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            errors.push(node);
        } else if node.has_error() && cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return errors;
            }
        }
    }
}

/// One-based line numbers that contain syntax errors
pub fn error_lines(tree: &Tree) -> Vec<usize> {
    collect_errors(tree)
        .into_iter()
        .map(|node| node.start_position().row + 1)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
