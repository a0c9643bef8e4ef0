//! Log statement rendering.
//!
//! Turns a [`CodeContext`] into a single statement such as
//!
//! ```text
//! console.log('[App.tsx > App]', { props: { title }, refs: { input: input.current } });
//! ```

use crate::config::{LogConfig, ARGS_LABEL};
use crate::types::{Bucket, CodeContext, ContextKind, CursorMatch};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

/// Opening line of the guard added by `wrap_in_dev_check`
pub(crate) const DEV_CHECK_OPEN: &str = "if (process.env.NODE_ENV !== 'production') {";

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{(\w+)\}").expect("placeholder regex"));

/// Label prefix of candidates taken from enclosing scopes
static SCOPE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Parent \([^)]*\): ").expect("scope prefix regex"));

/// A group in the rendered object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LogGroup {
    Args,
    Bucket(Bucket),
}

impl LogGroup {
    /// Groups in the order they are rendered
    pub fn ordered() -> impl Iterator<Item = LogGroup> {
        std::iter::once(LogGroup::Args).chain(Bucket::ALL.into_iter().map(LogGroup::Bucket))
    }

    pub fn from_label(label: &str) -> Option<Self> {
        if label.trim().eq_ignore_ascii_case(ARGS_LABEL) {
            return Some(LogGroup::Args);
        }
        Bucket::from_label(label).map(LogGroup::Bucket)
    }

    /// Label used in selection strings
    pub fn as_str(self) -> &'static str {
        match self {
            LogGroup::Args => ARGS_LABEL,
            LogGroup::Bucket(bucket) => bucket.as_str(),
        }
    }

    /// Key used in the rendered object
    fn object_key(self) -> &'static str {
        match self {
            LogGroup::Bucket(Bucket::Reducers) => "reducer",
            other => other.as_str(),
        }
    }

    fn render_entry(self, name: &str) -> String {
        match self {
            LogGroup::Bucket(Bucket::Refs) => format!("{name}: {name}.current"),
            _ => name.to_string(),
        }
    }
}

/// Selected names per group, in rendering order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    groups: Vec<(LogGroup, Vec<String>)>,
}

impl Selection {
    fn push(&mut self, group: LogGroup, name: String) {
        match self.groups.iter_mut().find(|(g, _)| *g == group) {
            Some((_, names)) => names.push(name),
            None => self.groups.push((group, vec![name])),
        }
    }

    fn sort(&mut self) {
        let order: Vec<LogGroup> = LogGroup::ordered().collect();
        self.groups
            .sort_by_key(|(group, _)| order.iter().position(|g| g == group));
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|(_, names)| names.is_empty())
    }

    /// `{ args: { a }, refs: { r: r.current } }`, or `None` when nothing is selected
    pub fn to_object_literal(&self) -> Option<String> {
        let parts: Vec<String> = self
            .groups
            .iter()
            .filter(|(_, names)| !names.is_empty())
            .map(|(group, names)| {
                let entries: Vec<String> =
                    names.iter().map(|name| group.render_entry(name)).collect();
                format!("{}: {{ {} }}", group.object_key(), entries.join(", "))
            })
            .collect();
        (!parts.is_empty()).then(|| format!("{{ {} }}", parts.join(", ")))
    }
}

/// An entry offered for interactive selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionCandidate {
    /// Display label, prefixed with `Parent (<scope>): ` for enclosing scopes
    pub label: String,
    /// `bucket: name` string accepted by [`LogRenderer::render`]
    pub selection: String,
    pub group: LogGroup,
    pub scope: String,
    pub depth: usize,
}

/// Selectable names of the matched scope followed by those of its ancestors
pub fn selection_candidates(cursor: &CursorMatch) -> Vec<SelectionCandidate> {
    let mut out = Vec::new();
    let scopes = std::iter::once(cursor.context()).chain(cursor.ancestors());
    for (depth, ctx) in scopes.enumerate() {
        let prefix = if depth == 0 {
            String::new()
        } else {
            format!("Parent ({}): ", ctx.name)
        };
        for group in LogGroup::ordered() {
            let names: &[String] = match group {
                LogGroup::Args if ctx.kind == ContextKind::Function => &ctx.args,
                LogGroup::Args => &[],
                LogGroup::Bucket(bucket) => ctx.variables.get(bucket),
            };
            for name in names {
                let selection = format!("{}: {name}", group.as_str());
                out.push(SelectionCandidate {
                    label: format!("{prefix}{selection}"),
                    selection,
                    group,
                    scope: ctx.name.clone(),
                    depth,
                });
            }
        }
    }
    out
}

/// Renders log statements under a fixed configuration
pub struct LogRenderer<'c> {
    config: &'c LogConfig,
}

impl<'c> LogRenderer<'c> {
    pub fn new(config: &'c LogConfig) -> Self {
        Self { config }
    }

    /// Template with placeholders substituted; unknown placeholders stay verbatim
    pub fn prefix(&self, ctx: &CodeContext, file_name: &str) -> String {
        let line_number = ctx.insert_position.line + 1;
        let template = &self.config.log_template;
        let mut prefix = PLACEHOLDER
            .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
                "fileName" => file_name.to_string(),
                "functionName" => ctx.name.clone(),
                "lineNumber" => line_number.to_string(),
                _ => caps[0].to_string(),
            })
            .into_owned();

        if self.config.include_line_number && !template.contains("${lineNumber}") {
            prefix.push_str(&format!(" (line {line_number})"));
        }
        prefix
    }

    /// Resolve what to log: an explicit `bucket: name` list, or the configured default items
    pub fn selection(&self, ctx: &CodeContext, selected: Option<&[String]>) -> Selection {
        let mut selection = Selection::default();
        match selected {
            Some(items) => {
                for item in items {
                    let item = SCOPE_PREFIX.replace(item, "");
                    let (label, name) = match item.split_once(": ") {
                        Some((label, name)) => (label, name),
                        None => (Bucket::Locals.as_str(), &*item),
                    };
                    match LogGroup::from_label(label) {
                        Some(LogGroup::Args) if ctx.kind != ContextKind::Function => {}
                        Some(group) => selection.push(group, name.trim().to_string()),
                        None => log::debug!("ignoring selection with unknown group `{label}`"),
                    }
                }
            }
            None => {
                for group in LogGroup::ordered() {
                    if !self.config.logs_item(group.as_str()) {
                        continue;
                    }
                    let names: &[String] = match group {
                        LogGroup::Args if ctx.kind == ContextKind::Function => &ctx.args,
                        LogGroup::Args => &[],
                        LogGroup::Bucket(bucket) => ctx.variables.get(bucket),
                    };
                    for name in names {
                        selection.push(group, name.clone());
                    }
                }
            }
        }
        selection.sort();
        selection
    }

    /// The full statement for `ctx`
    pub fn render(
        &self,
        ctx: &CodeContext,
        file_name: &str,
        selected: Option<&[String]>,
    ) -> String {
        let prefix = escape_single_quoted(&self.prefix(ctx, file_name));
        let object = self.selection(ctx, selected).to_object_literal();
        self.finish(match object {
            Some(object) => format!("{}('{prefix}', {object});", self.callee()),
            None => format!("{}('{prefix}');", self.callee()),
        })
    }

    /// `console.log({ expr });` for a selected expression
    pub fn wrap_selection(&self, text: &str) -> String {
        self.finish(format!("{}({{ {} }});", self.callee(), text.trim()))
    }

    fn callee(&self) -> String {
        format!(
            "{}.{}",
            self.config.log_function,
            self.config.log_level.as_str()
        )
    }

    fn finish(&self, mut line: String) -> String {
        if self.config.wrap_in_dev_check {
            line = format!("{DEV_CHECK_OPEN}\n  {line}\n}}");
        }
        if !self.config.log_tag.is_empty() {
            line = format!("{line} {}", self.config.log_tag);
        }
        if self.config.add_debugger {
            line = format!("debugger;\n{line}");
        }
        line
    }
}

fn escape_single_quoted(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}
