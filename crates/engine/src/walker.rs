//! Scope walker: one traversal that turns a syntax tree into [`CodeContext`]s.
//!
//! The walker keeps a stack of the loggable scopes currently open. Each scope
//! is fully built (classified, positioned, filtered) on entry, so nested
//! scopes always come after their parents in the result list. A final pass
//! re-links parents by insertion line.

use crate::classifier::{ScopeDraft, VariableClassifier};
use crate::config::LogConfig;
use crate::filters::{filter_sensitive, filter_unused};
use crate::patterns::extract_bound_names;
use crate::position::{compute_insert_position, contains_position, Position, SourceSpan};
use crate::syntax::{block_statements, contains_markup, node_text, walk, SyntaxKind, Visitor};
use crate::types::{Bucket, CodeContext, ContextId, ContextKind, ContextSet};
use tree_sitter::Node;

/// Name used for scopes without a resolvable identifier
pub const ANONYMOUS: &str = "anonymous";

/// Result of one traversal
#[derive(Debug, Clone)]
pub struct WalkOutput {
    pub contexts: ContextSet,
    /// Innermost scope containing the requested cursor
    pub cursor_match: Option<ContextId>,
}

pub struct ScopeWalker<'c, 's> {
    config: &'c LogConfig,
    classifier: VariableClassifier<'c>,
    source: &'s str,
    cursor: Option<Position>,
    contexts: Vec<CodeContext>,
    stack: Vec<ContextId>,
    cursor_match: Option<ContextId>,
}

impl<'c, 's> ScopeWalker<'c, 's> {
    pub fn new(config: &'c LogConfig, source: &'s str, cursor: Option<Position>) -> Self {
        Self {
            config,
            classifier: VariableClassifier::new(config),
            source,
            cursor,
            contexts: Vec::new(),
            stack: Vec::new(),
            cursor_match: None,
        }
    }

    /// Walk the tree rooted at `root` and collect every loggable scope
    pub fn run(mut self, root: Node<'_>) -> WalkOutput {
        walk(root, &mut self);
        debug_assert!(self.stack.is_empty(), "unbalanced scope stack");

        relink_parents(&mut self.contexts);
        log::debug!(
            "collected {} scopes (cursor match: {:?})",
            self.contexts.len(),
            self.cursor_match
        );

        WalkOutput {
            contexts: ContextSet::new(self.contexts),
            cursor_match: self.cursor_match,
        }
    }

    fn is_loggable(&self, kind: SyntaxKind) -> bool {
        match kind {
            SyntaxKind::ClassMethod => self.config.enable_class_method_logging,
            kind => kind.is_function_like(),
        }
    }

    fn build_context(&self, node: Node<'_>, kind: SyntaxKind) -> CodeContext {
        let source = self.source;
        let span = SourceSpan::of(node);
        let name = resolve_name(node, source);
        let context_kind = if contains_markup(node) {
            ContextKind::Component
        } else {
            ContextKind::Function
        };

        let mut args = node
            .child_by_field_name("parameters")
            .or_else(|| node.child_by_field_name("parameter"))
            .map(|params| extract_bound_names(params, source))
            .unwrap_or_default();

        let mut draft = ScopeDraft::default();
        if context_kind == ContextKind::Component {
            draft.variables.extend(Bucket::Props, args.iter().cloned());
        }

        if kind == SyntaxKind::ClassMethod {
            self.classifier.scan_instance_members(node, source, &mut draft);
        }

        let statements = node
            .child_by_field_name("body")
            .filter(|body| body.kind() == "statement_block")
            .map(block_statements)
            .unwrap_or_default();

        for statement in &statements {
            if matches!(
                statement.kind(),
                "lexical_declaration" | "variable_declaration"
            ) {
                self.classifier
                    .classify_declaration(*statement, source, &mut draft);
            }
        }

        let insert_position = draft
            .hook_body_end_position
            .unwrap_or_else(|| compute_insert_position(&statements, span.end));

        let mut variables = draft.variables;
        if self.config.filter_unused_variables {
            filter_unused(&mut variables, node, source);
        }
        filter_sensitive(&mut variables, &mut args, self.config);

        CodeContext {
            id: ContextId(self.contexts.len()),
            kind: context_kind,
            name,
            args,
            variables,
            span,
            insert_position,
            hook_body_end_position: draft.hook_body_end_position,
            parent: self.stack.last().copied(),
        }
    }
}

impl<'t> Visitor<'t> for ScopeWalker<'_, '_> {
    fn enter(&mut self, node: Node<'t>, kind: SyntaxKind) {
        if !self.is_loggable(kind) {
            return;
        }

        let context = self.build_context(node, kind);
        let id = context.id;

        if let Some(cursor) = self.cursor {
            if contains_position(&context.span, cursor) {
                self.cursor_match = Some(id);
            }
        }

        self.contexts.push(context);
        self.stack.push(id);
    }

    fn exit(&mut self, _node: Node<'t>, kind: SyntaxKind) {
        if self.is_loggable(kind) {
            self.stack.pop();
        }
    }
}

/// Declared name, then the declarator it is assigned to, then the method key
fn resolve_name(node: Node<'_>, source: &str) -> String {
    let declared = node
        .child_by_field_name("name")
        .filter(|name| node.kind() != "method_definition" && name.kind() == "identifier");
    if let Some(name) = declared {
        return node_text(name, source).to_string();
    }

    let declarator = node
        .parent()
        .filter(|parent| parent.kind() == "variable_declarator")
        .filter(|parent| {
            parent
                .child_by_field_name("value")
                .is_some_and(|value| value.id() == node.id())
        })
        .and_then(|parent| parent.child_by_field_name("name"))
        .filter(|name| name.kind() == "identifier");
    if let Some(name) = declarator {
        return node_text(name, source).to_string();
    }

    if node.kind() == "method_definition" {
        let key = node.child_by_field_name("name").filter(|key| {
            matches!(
                key.kind(),
                "property_identifier" | "private_property_identifier" | "identifier"
            )
        });
        if let Some(key) = key {
            return node_text(key, source).to_string();
        }
    }

    ANONYMOUS.to_string()
}

/// Point each context at the nearest earlier context whose insertion line is
/// strictly above its own; contexts with no such predecessor keep the parent
/// from the scope stack.
fn relink_parents(contexts: &mut [CodeContext]) {
    for index in 1..contexts.len() {
        let line = contexts[index].insert_position.line;
        let candidate = (0..index)
            .rev()
            .find(|&earlier| contexts[earlier].insert_position.line < line);
        if let Some(parent) = candidate {
            contexts[index].parent = Some(ContextId(parent));
        }
    }
}
