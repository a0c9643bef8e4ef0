//! Binding-pattern flattening.

use tree_sitter::Node;

/// Ordered names bound by an identifier or destructuring pattern
pub fn extract_bound_names(pattern: Node<'_>, source: &str) -> Vec<String> {
    binding_identifiers(pattern)
        .into_iter()
        .filter_map(|node| node.utf8_text(source.as_bytes()).ok())
        .map(str::to_string)
        .collect()
}

/// Identifier nodes introduced by a binding pattern, in source order
pub fn binding_identifiers(pattern: Node<'_>) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    collect(pattern, &mut out);
    out
}

/// Whether a declarator binding is a shape the classifier understands
pub fn is_binding_pattern(node: Node<'_>) -> bool {
    matches!(node.kind(), "identifier" | "object_pattern" | "array_pattern")
}

/// First element of an array pattern; `None` for a hole or an empty pattern
pub fn first_array_element(pattern: Node<'_>) -> Option<Node<'_>> {
    if pattern.kind() != "array_pattern" {
        return None;
    }
    let mut cursor = pattern.walk();
    let first = pattern
        .children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .nth(1)?;
    first.is_named().then_some(first)
}

fn collect<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    match node.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => out.push(node),
        "assignment_pattern" | "object_assignment_pattern" => {
            if let Some(left) = node.child_by_field_name("left") {
                collect(left, out);
            }
        }
        "pair_pattern" => {
            if let Some(value) = node.child_by_field_name("value") {
                collect(value, out);
            }
        }
        "required_parameter" | "optional_parameter" => {
            if let Some(pattern) = node.child_by_field_name("pattern") {
                collect(pattern, out);
            }
        }
        "object_pattern" | "array_pattern" | "rest_pattern" | "formal_parameters" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                collect(child, out);
            }
        }
        // member targets, `this` parameters and type annotations bind nothing
        _ => {}
    }
}
