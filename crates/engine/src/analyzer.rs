use crate::config::LogConfig;
use crate::error::{EngineError, Result};
use crate::language::Language;
use crate::position::Position;
use crate::suggest::suggest_at_line;
use crate::syntax::descendants;
use crate::types::{ContextSet, CursorMatch};
use crate::walker::{ScopeWalker, WalkOutput};
use std::path::Path;
use tree_sitter::{Parser, Tree};

/// Parses source text and runs the scope walker over it.
///
/// Every query parses fresh; nothing is cached between calls.
pub struct ContextAnalyzer {
    config: LogConfig,
    parser: Parser,
    language: Language,
}

impl ContextAnalyzer {
    /// Create new analyzer for a language
    pub fn new(config: LogConfig, language: Language) -> Result<Self> {
        config.validate().map_err(EngineError::invalid_config)?;

        let mut parser = Parser::new();
        parser
            .set_language(&language.tree_sitter_language())
            .map_err(|e| EngineError::tree_sitter(format!("Failed to set language: {e}")))?;

        Ok(Self {
            config,
            parser,
            language,
        })
    }

    /// Create an analyzer with the grammar matching a file path
    pub fn for_path(config: LogConfig, path: impl AsRef<Path>) -> Result<Self> {
        Self::new(config, Language::from_path(path))
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Innermost loggable scope containing `cursor`, if any
    pub fn context_at_cursor(
        &mut self,
        source: &str,
        cursor: Position,
    ) -> Result<Option<CursorMatch>> {
        let output = self.run(source, Some(cursor))?;
        Ok(output.cursor_match.map(|matched| CursorMatch {
            contexts: output.contexts,
            matched,
        }))
    }

    /// Every loggable scope, in source order
    pub fn all_contexts_in_file(&mut self, source: &str) -> Result<ContextSet> {
        Ok(self.run(source, None)?.contexts)
    }

    /// Identifiers worth logging on a 0-based line
    pub fn suggestions_at_line(&mut self, source: &str, line: usize) -> Result<Vec<String>> {
        if source.trim().is_empty() {
            return Ok(Vec::new());
        }
        let tree = self.parse(source)?;
        Ok(suggest_at_line(tree.root_node(), source, line))
    }

    /// Parse without walking; fails on any syntax error
    pub fn parse(&mut self, source: &str) -> Result<Tree> {
        // drop state left by an earlier parse
        self.parser.reset();
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| EngineError::tree_sitter("Parser returned no tree"))?;

        let root = tree.root_node();
        if root.has_error() {
            let location = descendants(root)
                .find(|node| node.is_error() || node.is_missing())
                .unwrap_or(root);
            let point = location.start_position();
            let message = if location.is_missing() {
                format!("missing `{}`", location.kind())
            } else {
                "unexpected token".to_string()
            };
            return Err(EngineError::parse(point.row, point.column, message));
        }

        Ok(tree)
    }

    fn run(&mut self, source: &str, cursor: Option<Position>) -> Result<WalkOutput> {
        if source.trim().is_empty() {
            return Ok(WalkOutput {
                contexts: ContextSet::default(),
                cursor_match: None,
            });
        }

        let tree = self.parse(source)?;
        Ok(ScopeWalker::new(&self.config, source, cursor).run(tree.root_node()))
    }
}

/// Innermost loggable scope at `cursor`, parsing `source` as TSX
pub fn context_at_cursor(
    source: &str,
    cursor: Position,
    config: &LogConfig,
) -> Result<Option<CursorMatch>> {
    ContextAnalyzer::new(config.clone(), Language::default())?.context_at_cursor(source, cursor)
}

/// Every loggable scope in `source`, parsing it as TSX
pub fn all_contexts_in_file(source: &str, config: &LogConfig) -> Result<ContextSet> {
    ContextAnalyzer::new(config.clone(), Language::default())?.all_contexts_in_file(source)
}
