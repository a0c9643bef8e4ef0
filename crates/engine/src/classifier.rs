//! Bucket classification for local declarations.
//!
//! Recognition is purely name-based: the callee of an initializer call is
//! matched against a fixed table of hook names. Aliased imports and wrapped
//! calls are not recognized.

use crate::config::LogConfig;
use crate::patterns::{extract_bound_names, first_array_element, is_binding_pattern};
use crate::position::Position;
use crate::syntax::{descendants, is_function_node, node_text};
use crate::types::{Bucket, VariableBuckets};
use tree_sitter::Node;

/// What a recognized hook call contributes to a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookRole {
    /// `useState`: the value slot is state
    State,
    /// `useRef`
    Ref,
    /// `useContext`
    Context,
    /// `useReducer`: the state slot is logged, dispatch is not
    Reducer,
    /// `useSelector`
    Selector,
    /// `useEffect`, `useMemo`, `useCallback`
    Effect,
}

impl HookRole {
    pub fn from_callee(name: &str) -> Option<Self> {
        match name {
            "useState" => Some(HookRole::State),
            "useRef" => Some(HookRole::Ref),
            "useContext" => Some(HookRole::Context),
            "useReducer" => Some(HookRole::Reducer),
            "useSelector" => Some(HookRole::Selector),
            "useEffect" | "useMemo" | "useCallback" => Some(HookRole::Effect),
            _ => None,
        }
    }
}

/// Per-scope state the classifier writes into
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeDraft {
    pub variables: VariableBuckets,
    pub hook_body_end_position: Option<Position>,
}

/// Classifies declarators of one scope under a fixed configuration
pub struct VariableClassifier<'c> {
    config: &'c LogConfig,
}

impl<'c> VariableClassifier<'c> {
    pub fn new(config: &'c LogConfig) -> Self {
        Self { config }
    }

    /// Classify every declarator of a `const`/`let`/`var` statement
    pub fn classify_declaration(
        &self,
        declaration: Node<'_>,
        source: &str,
        draft: &mut ScopeDraft,
    ) {
        let mut cursor = declaration.walk();
        for declarator in declaration.named_children(&mut cursor) {
            if declarator.kind() == "variable_declarator" {
                self.classify_declarator(declarator, source, draft);
            }
        }
    }

    /// Classify one `name = value` declarator
    pub fn classify_declarator(&self, declarator: Node<'_>, source: &str, draft: &mut ScopeDraft) {
        let Some(pattern) = declarator.child_by_field_name("name") else {
            return;
        };
        if !is_binding_pattern(pattern) {
            log::debug!(
                "skipping declarator with {} binding at line {}",
                pattern.kind(),
                pattern.start_position().row + 1
            );
            return;
        }

        match declarator.child_by_field_name("value") {
            Some(value) if value.kind() == "call_expression" => {
                match callee_name(value, source).and_then(HookRole::from_callee) {
                    Some(role) => self.apply_hook(role, pattern, value, source, draft),
                    None => draft
                        .variables
                        .extend(Bucket::Locals, extract_bound_names(pattern, source)),
                }
            }
            // nested functions are scopes of their own
            Some(value) if is_function_node(value) => {}
            _ => draft
                .variables
                .extend(Bucket::Locals, extract_bound_names(pattern, source)),
        }
    }

    fn apply_hook(
        &self,
        role: HookRole,
        pattern: Node<'_>,
        call: Node<'_>,
        source: &str,
        draft: &mut ScopeDraft,
    ) {
        let vars = &mut draft.variables;
        match role {
            HookRole::State => {
                if let Some(name) = first_slot(pattern, source) {
                    vars.push(Bucket::State, name);
                }
            }
            HookRole::Ref => vars.extend(Bucket::Refs, extract_bound_names(pattern, source)),
            HookRole::Context => {
                let bucket = if self.config.enable_context_logging {
                    Bucket::Context
                } else {
                    Bucket::Locals
                };
                vars.extend(bucket, extract_bound_names(pattern, source));
            }
            HookRole::Reducer => {
                if let Some(name) = first_slot(pattern, source) {
                    vars.push(Bucket::Reducers, name);
                }
            }
            HookRole::Selector => {
                let bucket = if self.config.enable_redux_context_logging {
                    Bucket::ReduxContext
                } else {
                    Bucket::Locals
                };
                vars.extend(bucket, extract_bound_names(pattern, source));
            }
            HookRole::Effect => self.record_effect(call, source, draft),
        }
    }

    fn record_effect(&self, call: Node<'_>, source: &str, draft: &mut ScopeDraft) {
        if !self.config.enable_hook_logging {
            return;
        }
        let arguments = call_arguments(call);

        if let Some(body) = arguments
            .first()
            .filter(|callback| {
                matches!(
                    callback.kind(),
                    "arrow_function" | "function_expression" | "function"
                )
            })
            .and_then(|callback| callback.child_by_field_name("body"))
        {
            draft.hook_body_end_position = Some(body.end_position().into());
        }

        if let Some(deps) = arguments.get(1).filter(|arg| arg.kind() == "array") {
            let mut cursor = deps.walk();
            for element in deps.named_children(&mut cursor) {
                if element.kind() == "identifier" {
                    draft.variables.push(Bucket::Locals, node_text(element, source));
                }
            }
        }
    }

    /// `this.props` / `this.state` accesses inside a class method
    pub fn scan_instance_members(&self, method: Node<'_>, source: &str, draft: &mut ScopeDraft) {
        if !self.config.enable_class_method_logging {
            return;
        }
        for node in descendants(method).filter(|n| n.kind() == "member_expression") {
            let on_this = node
                .child_by_field_name("object")
                .is_some_and(|object| object.kind() == "this");
            if !on_this {
                continue;
            }
            let property = node
                .child_by_field_name("property")
                .map(|p| node_text(p, source));
            match property {
                Some("props") => draft.variables.push(Bucket::Props, "this.props"),
                Some("state") => draft.variables.push(Bucket::State, "this.state"),
                _ => {}
            }
        }
    }
}

/// Name of the called function: `useState` for both `useState()` and `React.useState()`
pub fn callee_name<'s>(call: Node<'_>, source: &'s str) -> Option<&'s str> {
    let callee = call.child_by_field_name("function")?;
    match callee.kind() {
        "identifier" => Some(node_text(callee, source)),
        "member_expression" => callee
            .child_by_field_name("property")
            .map(|property| node_text(property, source)),
        _ => None,
    }
}

fn call_arguments(call: Node<'_>) -> Vec<Node<'_>> {
    let Some(arguments) = call.child_by_field_name("arguments") else {
        return Vec::new();
    };
    let mut cursor = arguments.walk();
    arguments
        .named_children(&mut cursor)
        .filter(|arg| arg.kind() != "comment")
        .collect()
}

/// Value slot of a `[value, setter]` pattern
fn first_slot(pattern: Node<'_>, source: &str) -> Option<String> {
    if pattern.kind() != "array_pattern" {
        return None;
    }
    let first = first_array_element(pattern)?;
    extract_bound_names(first, source).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tree_sitter::Parser;

    fn classify(source: &str, config: &LogConfig) -> ScopeDraft {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TSX.into())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();
        let classifier = VariableClassifier::new(config);
        let mut draft = ScopeDraft::default();
        let root = tree.root_node();
        let mut cursor = root.walk();
        for statement in root.named_children(&mut cursor) {
            if matches!(
                statement.kind(),
                "lexical_declaration" | "variable_declaration"
            ) {
                classifier.classify_declaration(statement, source, &mut draft);
            }
        }
        draft
    }

    #[test]
    fn test_state_takes_value_slot_only() {
        let draft = classify(
            "const [count, setCount] = useState(0);\nconst [, setOnly] = useState(1);",
            &LogConfig::default(),
        );
        assert_eq!(draft.variables.state, vec!["count"]);
        assert!(draft.variables.locals.is_empty());
    }

    #[test]
    fn test_member_callee_is_recognized() {
        let draft = classify("const inputRef = React.useRef(null);", &LogConfig::default());
        assert_eq!(draft.variables.refs, vec!["inputRef"]);
    }

    #[test]
    fn test_reducer_logs_state_slot() {
        let draft = classify(
            "const [todos, dispatch] = useReducer(reducer, []);",
            &LogConfig::default(),
        );
        assert_eq!(draft.variables.reducers, vec!["todos"]);
        assert!(draft.variables.locals.is_empty());
    }

    #[test]
    fn test_context_and_selector_flags() {
        let source = "const theme = useContext(Theme);\nconst user = useSelector(selectUser);";
        let draft = classify(source, &LogConfig::default());
        assert_eq!(draft.variables.context, vec!["theme"]);
        assert_eq!(draft.variables.locals, vec!["user"]);

        let config = LogConfig {
            enable_context_logging: false,
            enable_redux_context_logging: true,
            ..LogConfig::default()
        };
        let draft = classify(source, &config);
        assert_eq!(draft.variables.locals, vec!["theme"]);
        assert_eq!(draft.variables.redux_context, vec!["user"]);
    }

    #[test]
    fn test_effect_hooks_need_flag() {
        let source = "const total = useMemo(() => {\n  return a + b;\n}, [a, b, c.d]);";
        let draft = classify(source, &LogConfig::default());
        assert_eq!(draft, ScopeDraft::default());

        let config = LogConfig {
            enable_hook_logging: true,
            ..LogConfig::default()
        };
        let draft = classify(source, &config);
        assert_eq!(draft.variables.locals, vec!["a", "b"]);
        assert_eq!(draft.hook_body_end_position, Some(Position::new(2, 1)));
    }

    #[test]
    fn test_bare_effect_statement_is_ignored() {
        let config = LogConfig {
            enable_hook_logging: true,
            ..LogConfig::default()
        };
        let draft = classify("useEffect(() => {\n  load(id);\n}, [id]);", &config);
        assert_eq!(draft, ScopeDraft::default());
    }

    #[test]
    fn test_state_hooks_need_array_pattern() {
        let draft = classify(
            "const s = useState(0);\nconst r = useReducer(f, 0);\nconst { current } = useRef(null);",
            &LogConfig::default(),
        );
        assert!(draft.variables.state.is_empty());
        assert!(draft.variables.reducers.is_empty());
        assert!(draft.variables.locals.is_empty());
        assert_eq!(draft.variables.refs, vec!["current"]);
    }

    #[test]
    fn test_plain_initializers_are_locals() {
        let draft = classify(
            "let a = 1, { b, c: [d] } = obj;\nvar e;\nconst f = () => 1;\nconst g = function () {};\nconst h = compute();",
            &LogConfig::default(),
        );
        assert_eq!(draft.variables.locals, vec!["a", "b", "d", "e", "h"]);
    }
}
