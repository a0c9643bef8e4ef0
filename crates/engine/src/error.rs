use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while extracting log contexts
#[derive(Error, Debug)]
pub enum EngineError {
    /// The source text could not be parsed; no partial results are produced
    #[error("Parse error at {line}:{column}: {message}")]
    Parse {
        /// 1-based line of the first syntax error
        line: usize,
        /// 1-based column of the first syntax error
        column: usize,
        message: String,
    },

    /// Unsupported language
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A position outside the source text
    #[error("Invalid position: line {line}, column {column}")]
    InvalidPosition { line: usize, column: usize },

    /// Tree-sitter error
    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Create a parse error from a 0-based location
    pub fn parse(row: usize, column: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            line: row + 1,
            column: column + 1,
            message: msg.into(),
        }
    }

    /// Create an unsupported language error
    pub fn unsupported_language(lang: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(lang.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitter(msg.into())
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
