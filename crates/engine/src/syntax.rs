//! Closed set of node tags the engine reacts to, and an enter/exit walker.

use tree_sitter::{Node, TreeCursor};

/// Tag of a syntax node as seen by the scope walker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    FunctionDeclaration,
    FunctionExpression,
    ArrowFunction,
    /// Method defined directly in a class body
    ClassMethod,
    VariableDeclarator,
    CallExpression,
    /// JSX element, self-closing element or fragment
    Markup,
    Other,
}

impl SyntaxKind {
    pub fn of(node: Node<'_>) -> Self {
        match node.kind() {
            "function_declaration" | "generator_function_declaration" => {
                SyntaxKind::FunctionDeclaration
            }
            "function_expression" | "function" | "generator_function" => {
                SyntaxKind::FunctionExpression
            }
            "arrow_function" => SyntaxKind::ArrowFunction,
            "method_definition" => match node.parent().map(|p| p.kind()) {
                Some("class_body") => SyntaxKind::ClassMethod,
                _ => SyntaxKind::Other,
            },
            "variable_declarator" => SyntaxKind::VariableDeclarator,
            "call_expression" => SyntaxKind::CallExpression,
            "jsx_element" | "jsx_self_closing_element" | "jsx_fragment" => SyntaxKind::Markup,
            _ => SyntaxKind::Other,
        }
    }

    /// Function-like scopes (class methods included)
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            SyntaxKind::FunctionDeclaration
                | SyntaxKind::FunctionExpression
                | SyntaxKind::ArrowFunction
                | SyntaxKind::ClassMethod
        )
    }
}

/// Any node kind that introduces a function scope, including object methods
pub fn is_function_node(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        "function_declaration"
            | "generator_function_declaration"
            | "function_expression"
            | "function"
            | "generator_function"
            | "arrow_function"
            | "method_definition"
    )
}

/// Callbacks for [`walk`]
pub trait Visitor<'t> {
    fn enter(&mut self, node: Node<'t>, kind: SyntaxKind);

    fn exit(&mut self, _node: Node<'t>, _kind: SyntaxKind) {}
}

fn is_visible(node: Node<'_>) -> bool {
    node.is_named() && !node.is_missing()
}

/// Depth-first traversal with paired enter/exit events.
///
/// Anonymous tokens and missing nodes produce no events.
pub fn walk<'t, V: Visitor<'t>>(root: Node<'t>, visitor: &mut V) {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        let kind = SyntaxKind::of(node);
        let visible = is_visible(node);
        if visible {
            visitor.enter(node, kind);
        }
        if cursor.goto_first_child() {
            continue;
        }
        if visible {
            visitor.exit(node, kind);
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
            let parent = cursor.node();
            if is_visible(parent) {
                visitor.exit(parent, SyntaxKind::of(parent));
            }
        }
    }
}

/// Pre-order iterator over a node and all of its descendants
pub struct Descendants<'t> {
    cursor: TreeCursor<'t>,
    done: bool,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let node = self.cursor.node();
        if !self.cursor.goto_first_child() {
            loop {
                if self.cursor.goto_next_sibling() {
                    break;
                }
                if !self.cursor.goto_parent() {
                    self.done = true;
                    break;
                }
            }
        }
        Some(node)
    }
}

pub fn descendants(node: Node<'_>) -> Descendants<'_> {
    Descendants {
        cursor: node.walk(),
        done: false,
    }
}

/// Whether any node in the subtree is markup
pub fn contains_markup(node: Node<'_>) -> bool {
    descendants(node).any(|n| SyntaxKind::of(n) == SyntaxKind::Markup)
}

/// Top-level statements of a block, comments excluded
pub fn block_statements(block: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = block.walk();
    block
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

pub fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse_tsx(source: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TSX.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        depth: usize,
        max_depth: usize,
    }

    impl<'t> Visitor<'t> for Recorder {
        fn enter(&mut self, _node: Node<'t>, kind: SyntaxKind) {
            self.depth += 1;
            self.max_depth = self.max_depth.max(self.depth);
            if kind != SyntaxKind::Other {
                self.events.push(format!("enter {kind:?}"));
            }
        }

        fn exit(&mut self, _node: Node<'t>, kind: SyntaxKind) {
            self.depth -= 1;
            if kind != SyntaxKind::Other {
                self.events.push(format!("exit {kind:?}"));
            }
        }
    }

    #[test]
    fn test_walk_pairs_events() {
        let tree = parse_tsx("function outer() { const f = () => <div />; }");
        let mut recorder = Recorder::default();
        walk(tree.root_node(), &mut recorder);
        assert_eq!(recorder.depth, 0);
        assert_eq!(
            recorder.events,
            vec![
                "enter FunctionDeclaration",
                "enter VariableDeclarator",
                "enter ArrowFunction",
                "enter Markup",
                "exit Markup",
                "exit ArrowFunction",
                "exit VariableDeclarator",
                "exit FunctionDeclaration",
            ]
        );
    }

    #[test]
    fn test_class_and_object_methods() {
        let tree = parse_tsx("class A { run() {} }\nconst o = { run() {} };");
        let kinds: Vec<_> = descendants(tree.root_node())
            .filter(|n| n.kind() == "method_definition")
            .map(SyntaxKind::of)
            .collect();
        assert_eq!(kinds, vec![SyntaxKind::ClassMethod, SyntaxKind::Other]);
    }

    #[test]
    fn test_contains_markup() {
        let tree = parse_tsx("const a = () => <></>;\nconst b = () => 1;");
        let arrows: Vec<_> = descendants(tree.root_node())
            .filter(|n| n.kind() == "arrow_function")
            .collect();
        assert!(contains_markup(arrows[0]));
        assert!(!contains_markup(arrows[1]));
    }
}
