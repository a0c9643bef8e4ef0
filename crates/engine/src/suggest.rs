use crate::syntax::{descendants, node_text};
use tree_sitter::Node;

/// Identifiers worth logging on a given 0-based line.
///
/// Collects declared names, assignment targets, returned identifiers and
/// identifier call arguments of every node that starts on `line`, without
/// duplicates and in source order.
pub fn suggest_at_line(root: Node<'_>, source: &str, line: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |node: Node<'_>| {
        if node.kind() == "identifier" {
            let name = node_text(node, source);
            if !out.iter().any(|seen| seen == name) {
                out.push(name.to_string());
            }
        }
    };

    let on_line = descendants(root).filter(|node| node.start_position().row == line);
    for node in on_line {
        match node.kind() {
            "variable_declarator" => {
                if let Some(name) = node.child_by_field_name("name") {
                    push(name);
                }
            }
            "assignment_expression" | "augmented_assignment_expression" => {
                if let Some(left) = node.child_by_field_name("left") {
                    push(left);
                }
            }
            "return_statement" => {
                if let Some(argument) = node.named_child(0) {
                    push(argument);
                }
            }
            "call_expression" => {
                if let Some(arguments) = node.child_by_field_name("arguments") {
                    let mut cursor = arguments.walk();
                    for argument in arguments.named_children(&mut cursor) {
                        push(argument);
                    }
                }
            }
            _ => {}
        }
    }
    out
}
