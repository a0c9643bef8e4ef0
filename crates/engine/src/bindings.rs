//! Lexical binding lookup used by the liveness filter.
//!
//! A name resolves to the nearest enclosing scope that declares it. The
//! binding is live when at least one read of the name occurs inside that
//! scope, outside nested scopes that redeclare it.

use crate::patterns::binding_identifiers;
use crate::syntax::{descendants, is_function_node, node_text};
use std::collections::{HashMap, HashSet};
use tree_sitter::Node;

/// Declaration sites of a name in one scope
#[derive(Debug, Clone)]
pub struct Binding<'t> {
    pub scope: Node<'t>,
    pub sites: Vec<Node<'t>>,
}

/// Resolves names visible from a starting scope.
///
/// Declarations are collected once per scope node and reused by every
/// lookup made through the same resolver.
pub struct BindingResolver<'t, 's> {
    origin: Node<'t>,
    source: &'s str,
    declared: HashMap<usize, Vec<Node<'t>>>,
}

/// Names resolved to one binding scope, with their declaration sites
struct Tracked<'n> {
    index: HashMap<&'n str, usize>,
    sites: Vec<HashSet<usize>>,
}

enum Visit<'t> {
    Enter(Node<'t>),
    Leave(Vec<usize>),
}

impl<'t, 's> BindingResolver<'t, 's> {
    pub fn new(origin: Node<'t>, source: &'s str) -> Self {
        Self {
            origin,
            source,
            declared: HashMap::new(),
        }
    }

    fn declared_in(&mut self, scope: Node<'t>) -> &[Node<'t>] {
        self.declared
            .entry(scope.id())
            .or_insert_with(|| scope_declarations(scope))
    }

    /// Walk outwards from the origin to the first scope declaring `name`
    pub fn resolve(&mut self, name: &str) -> Option<Binding<'t>> {
        let source = self.source;
        let mut scope = Some(self.origin);
        while let Some(current) = scope {
            let sites: Vec<Node<'t>> = self
                .declared_in(current)
                .iter()
                .copied()
                .filter(|site| node_text(*site, source) == name)
                .collect();
            if !sites.is_empty() {
                return Some(Binding {
                    scope: current,
                    sites,
                });
            }
            scope = enclosing_scope(current);
        }
        None
    }

    /// Reads of every resolvable name, one walk per binding scope.
    ///
    /// Names without a binding are left out of the result.
    pub fn reference_counts<'n>(&mut self, names: &[&'n str]) -> HashMap<&'n str, usize> {
        let mut groups: Vec<(Node<'t>, Tracked<'n>)> = Vec::new();
        let mut seen = HashSet::new();

        for &name in names {
            if !seen.insert(name) {
                continue;
            }
            let Some(binding) = self.resolve(name) else {
                continue;
            };
            let group = match groups
                .iter()
                .position(|(scope, _)| scope.id() == binding.scope.id())
            {
                Some(position) => position,
                None => {
                    groups.push((
                        binding.scope,
                        Tracked {
                            index: HashMap::new(),
                            sites: Vec::new(),
                        },
                    ));
                    groups.len() - 1
                }
            };
            let tracked = &mut groups[group].1;
            tracked.index.insert(name, tracked.sites.len());
            tracked
                .sites
                .push(binding.sites.iter().map(|site| site.id()).collect());
        }

        let mut counts = HashMap::new();
        for (scope, tracked) in &groups {
            let reads = self.count_reads(*scope, tracked);
            for (name, slot) in &tracked.index {
                counts.insert(*name, reads[*slot]);
            }
        }
        counts
    }

    fn count_reads(&mut self, scope: Node<'t>, tracked: &Tracked<'_>) -> Vec<usize> {
        let source = self.source;
        let mut reads = vec![0; tracked.sites.len()];
        // nesting depth of scopes that redeclare each name
        let mut shadowed = vec![0usize; tracked.sites.len()];
        let mut stack = vec![Visit::Enter(scope)];

        while let Some(visit) = stack.pop() {
            let node = match visit {
                Visit::Enter(node) => node,
                Visit::Leave(hidden) => {
                    for slot in hidden {
                        shadowed[slot] -= 1;
                    }
                    continue;
                }
            };

            if node.id() != scope.id() && is_scope_boundary(node) {
                let mut hidden: Vec<usize> = self
                    .declared_in(node)
                    .iter()
                    .filter_map(|site| tracked.index.get(node_text(*site, source)).copied())
                    .collect();
                hidden.sort_unstable();
                hidden.dedup();
                if !hidden.is_empty() {
                    for &slot in &hidden {
                        shadowed[slot] += 1;
                    }
                    if shadowed.iter().all(|depth| *depth > 0) {
                        for slot in hidden {
                            shadowed[slot] -= 1;
                        }
                        continue;
                    }
                    stack.push(Visit::Leave(hidden));
                }
            }

            if matches!(node.kind(), "identifier" | "shorthand_property_identifier") {
                let name = node_text(node, source);
                if let Some(&slot) = tracked.index.get(name) {
                    if shadowed[slot] == 0
                        && !tracked.sites[slot].contains(&node.id())
                        && is_read(node, name)
                    {
                        reads[slot] += 1;
                    }
                }
            }

            let mut cursor = node.walk();
            stack.extend(node.children(&mut cursor).map(Visit::Enter));
        }
        reads
    }

    /// Names among `names` that resolve to a binding nobody reads
    pub fn unused<'n>(&mut self, names: &[&'n str]) -> HashSet<&'n str> {
        self.reference_counts(names)
            .into_iter()
            .filter(|(_, reads)| *reads == 0)
            .map(|(name, _)| name)
            .collect()
    }

    /// True when `name` resolves to a binding nobody reads.
    ///
    /// Unresolvable names count as used.
    pub fn is_unused(&mut self, name: &str) -> bool {
        !self.unused(&[name]).is_empty()
    }
}

fn is_scope(node: Node<'_>) -> bool {
    is_function_node(node)
        || matches!(
            node.kind(),
            "statement_block"
                | "program"
                | "for_statement"
                | "for_in_statement"
                | "catch_clause"
                | "switch_body"
                | "class_static_block"
        )
}

/// A function body block belongs to its function's scope
fn is_scope_boundary(node: Node<'_>) -> bool {
    let is_function_body =
        node.kind() == "statement_block" && node.parent().is_some_and(is_function_node);
    is_scope(node) && !is_function_body
}

fn enclosing_scope(node: Node<'_>) -> Option<Node<'_>> {
    let mut current = node.parent();
    while let Some(candidate) = current {
        if is_scope_boundary(candidate) {
            return Some(candidate);
        }
        current = candidate.parent();
    }
    None
}

/// Every identifier bound directly by `scope`
fn scope_declarations(scope: Node<'_>) -> Vec<Node<'_>> {
    let mut bound = Vec::new();

    if is_function_node(scope) {
        if let Some(params) = scope
            .child_by_field_name("parameters")
            .or_else(|| scope.child_by_field_name("parameter"))
        {
            bound.extend(binding_identifiers(params));
        }
        if let Some(body) = scope
            .child_by_field_name("body")
            .filter(|body| body.kind() == "statement_block")
        {
            collect_block_declarations(body, &mut bound);
            collect_hoisted_vars(body, &mut bound);
        }
    } else {
        match scope.kind() {
            "program" => {
                collect_block_declarations(scope, &mut bound);
                collect_hoisted_vars(scope, &mut bound);
            }
            "statement_block" | "switch_body" | "class_static_block" => {
                collect_block_declarations(scope, &mut bound);
            }
            "for_statement" => {
                if let Some(init) = scope.child_by_field_name("initializer") {
                    collect_declaration(init, &mut bound);
                }
            }
            "for_in_statement" => {
                if scope.child_by_field_name("kind").is_some() {
                    if let Some(left) = scope.child_by_field_name("left") {
                        bound.extend(binding_identifiers(left));
                    }
                }
            }
            "catch_clause" => {
                if let Some(param) = scope.child_by_field_name("parameter") {
                    bound.extend(binding_identifiers(param));
                }
            }
            _ => {}
        }
    }

    bound
}

fn collect_declaration<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    if !matches!(node.kind(), "lexical_declaration" | "variable_declaration") {
        return;
    }
    let mut cursor = node.walk();
    for declarator in node.named_children(&mut cursor) {
        if let Some(pattern) = declarator.child_by_field_name("name") {
            out.extend(binding_identifiers(pattern));
        }
    }
}

fn collect_block_declarations<'t>(block: Node<'t>, out: &mut Vec<Node<'t>>) {
    let mut cursor = block.walk();
    for statement in block.named_children(&mut cursor) {
        match statement.kind() {
            "lexical_declaration" => collect_declaration(statement, out),
            "function_declaration" | "generator_function_declaration" | "class_declaration" => {
                out.extend(statement.child_by_field_name("name"));
            }
            "import_statement" => {
                out.extend(
                    descendants(statement).filter(|n| {
                        n.kind() == "identifier"
                            && n.parent().is_some_and(|p| {
                                matches!(
                                    p.kind(),
                                    "import_clause" | "namespace_import" | "import_specifier"
                                )
                            })
                            && is_import_local_name(*n)
                    }),
                );
            }
            "export_statement" => {
                if let Some(declaration) = statement.child_by_field_name("declaration") {
                    match declaration.kind() {
                        "lexical_declaration" | "variable_declaration" => {
                            collect_declaration(declaration, out)
                        }
                        _ => out.extend(declaration.child_by_field_name("name")),
                    }
                }
            }
            _ => {}
        }
    }
}

/// Local name of an import: `b` in `import { a as b }`, `a` in `import { a }`
fn is_import_local_name(node: Node<'_>) -> bool {
    match node.parent() {
        Some(parent) if parent.kind() == "import_specifier" => {
            match parent.child_by_field_name("alias") {
                Some(alias) => alias.id() == node.id(),
                None => true,
            }
        }
        _ => true,
    }
}

/// `var` declarations anywhere in a function body, outside nested functions
fn collect_hoisted_vars<'t>(body: Node<'t>, out: &mut Vec<Node<'t>>) {
    let mut cursor = body.walk();
    'walk: loop {
        let node = cursor.node();
        let nested_function = node.id() != body.id() && is_function_node(node);
        if !nested_function {
            if node.kind() == "variable_declaration" {
                collect_declaration(node, out);
            }
            if cursor.goto_first_child() {
                continue;
            }
        }
        loop {
            if cursor.goto_next_sibling() {
                continue 'walk;
            }
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }
}

fn is_read(node: Node<'_>, name: &str) -> bool {
    let Some(parent) = node.parent() else {
        return true;
    };
    match parent.kind() {
        "update_expression" => false,
        "jsx_opening_element" | "jsx_closing_element" | "jsx_self_closing_element" => {
            name.starts_with(|c: char| c.is_ascii_uppercase())
        }
        _ => !is_assignment_target(node),
    }
}

/// `b` in `b = 1`, `[b] = pair` or `({ key: b } = obj)`
fn is_assignment_target(node: Node<'_>) -> bool {
    let mut child = node;
    while let Some(parent) = child.parent() {
        let within_target = match parent.kind() {
            "assignment_expression" | "augmented_assignment_expression" => {
                return is_field(parent, "left", child);
            }
            "array_pattern" | "object_pattern" | "rest_pattern" | "parenthesized_expression" => {
                true
            }
            "pair_pattern" => is_field(parent, "value", child),
            "assignment_pattern" | "object_assignment_pattern" => is_field(parent, "left", child),
            _ => false,
        };
        if !within_target {
            return false;
        }
        child = parent;
    }
    false
}

fn is_field(parent: Node<'_>, field: &str, child: Node<'_>) -> bool {
    parent
        .child_by_field_name(field)
        .is_some_and(|node| node.id() == child.id())
}
