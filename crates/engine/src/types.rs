use crate::position::{Position, SourceSpan};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Semantic category of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Bucket {
    Props,
    State,
    Refs,
    Context,
    Reducers,
    Locals,
    ReduxContext,
}

impl Bucket {
    /// All buckets in rendering order
    pub const ALL: [Bucket; 7] = [
        Bucket::Props,
        Bucket::State,
        Bucket::Refs,
        Bucket::Context,
        Bucket::Reducers,
        Bucket::Locals,
        Bucket::ReduxContext,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Props => "props",
            Bucket::State => "state",
            Bucket::Refs => "refs",
            Bucket::Context => "context",
            Bucket::Reducers => "reducers",
            Bucket::Locals => "locals",
            Bucket::ReduxContext => "reduxContext",
        }
    }

    /// Parse a bucket label, ignoring ASCII case
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.as_str().eq_ignore_ascii_case(label.trim()))
    }

    /// Whether pushes into this bucket skip names already present
    pub fn deduplicates(self) -> bool {
        matches!(
            self,
            Bucket::Props | Bucket::State | Bucket::Refs | Bucket::Context
        )
    }
}

/// Variable names grouped by bucket, in discovery order.
///
/// Every bucket is always present, so the serialized form carries all seven
/// keys even when they are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableBuckets {
    pub props: Vec<String>,
    pub state: Vec<String>,
    pub refs: Vec<String>,
    pub context: Vec<String>,
    pub reducers: Vec<String>,
    pub locals: Vec<String>,
    pub redux_context: Vec<String>,
}

impl VariableBuckets {
    pub fn get(&self, bucket: Bucket) -> &[String] {
        match bucket {
            Bucket::Props => &self.props,
            Bucket::State => &self.state,
            Bucket::Refs => &self.refs,
            Bucket::Context => &self.context,
            Bucket::Reducers => &self.reducers,
            Bucket::Locals => &self.locals,
            Bucket::ReduxContext => &self.redux_context,
        }
    }

    fn get_mut(&mut self, bucket: Bucket) -> &mut Vec<String> {
        match bucket {
            Bucket::Props => &mut self.props,
            Bucket::State => &mut self.state,
            Bucket::Refs => &mut self.refs,
            Bucket::Context => &mut self.context,
            Bucket::Reducers => &mut self.reducers,
            Bucket::Locals => &mut self.locals,
            Bucket::ReduxContext => &mut self.redux_context,
        }
    }

    pub fn push(&mut self, bucket: Bucket, name: impl Into<String>) {
        let name = name.into();
        let names = self.get_mut(bucket);
        if bucket.deduplicates() && names.contains(&name) {
            return;
        }
        names.push(name);
    }

    pub fn extend<I, S>(&mut self, bucket: Bucket, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.push(bucket, name);
        }
    }

    /// Keep only names for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(Bucket, &str) -> bool) {
        for bucket in Bucket::ALL {
            self.get_mut(bucket).retain(|name| keep(bucket, name));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &[String])> + '_ {
        Bucket::ALL.into_iter().map(move |bucket| (bucket, self.get(bucket)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, names)| names.is_empty())
    }
}

/// Whether a scope renders markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    Function,
    Component,
}

impl ContextKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContextKind::Function => "function",
            ContextKind::Component => "component",
        }
    }
}

/// Index of a context within its [`ContextSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(pub usize);

impl ContextId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One loggable scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeContext {
    pub id: ContextId,
    pub kind: ContextKind,
    pub name: String,
    pub args: Vec<String>,
    pub variables: VariableBuckets,
    pub span: SourceSpan,
    pub insert_position: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hook_body_end_position: Option<Position>,
    /// Back-link into the owning [`ContextSet`]
    pub parent: Option<ContextId>,
}

impl CodeContext {
    pub fn is_component(&self) -> bool {
        self.kind == ContextKind::Component
    }
}

/// Contexts discovered by one query, in traversal order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContextSet {
    contexts: Vec<CodeContext>,
}

impl ContextSet {
    pub(crate) fn new(contexts: Vec<CodeContext>) -> Self {
        Self { contexts }
    }

    pub fn get(&self, id: ContextId) -> Option<&CodeContext> {
        self.contexts.get(id.index())
    }

    pub fn parent(&self, context: &CodeContext) -> Option<&CodeContext> {
        context.parent.and_then(|id| self.get(id))
    }

    /// Parent chain from the nearest enclosing scope outwards
    pub fn ancestors<'a>(
        &'a self,
        context: &'a CodeContext,
    ) -> impl Iterator<Item = &'a CodeContext> + 'a {
        std::iter::successors(self.parent(context), move |ctx| self.parent(ctx))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CodeContext> {
        self.contexts.iter()
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn into_vec(self) -> Vec<CodeContext> {
        self.contexts
    }
}

impl Index<ContextId> for ContextSet {
    type Output = CodeContext;

    fn index(&self, id: ContextId) -> &Self::Output {
        &self.contexts[id.index()]
    }
}

impl Index<usize> for ContextSet {
    type Output = CodeContext;

    fn index(&self, index: usize) -> &Self::Output {
        &self.contexts[index]
    }
}

impl<'a> IntoIterator for &'a ContextSet {
    type Item = &'a CodeContext;
    type IntoIter = std::slice::Iter<'a, CodeContext>;

    fn into_iter(self) -> Self::IntoIter {
        self.contexts.iter()
    }
}

/// Innermost scope enclosing a cursor, with the rest of the file's scopes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CursorMatch {
    pub contexts: ContextSet,
    pub matched: ContextId,
}

impl CursorMatch {
    pub fn context(&self) -> &CodeContext {
        &self.contexts[self.matched]
    }

    pub fn parent(&self) -> Option<&CodeContext> {
        self.contexts.parent(self.context())
    }

    pub fn ancestors(&self) -> impl Iterator<Item = &CodeContext> + '_ {
        self.contexts.ancestors(self.context())
    }

    pub fn into_context(self) -> CodeContext {
        let index = self.matched.index();
        self.contexts.into_vec().swap_remove(index)
    }
}
