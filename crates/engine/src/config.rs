use crate::error::{EngineError, Result};
use crate::types::Bucket;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Label accepted in `log_items` and selections for function parameters
pub const ARGS_LABEL: &str = "args";

/// Configuration for context extraction and log rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct LogConfig {
    /// Prefix template; supports `${fileName}`, `${functionName}` and `${lineNumber}`
    pub log_template: String,

    /// Method called on `log_function`
    pub log_level: LogLevel,

    /// Buckets rendered when no explicit selection is made
    pub log_items: Vec<String>,

    /// Emit a `debugger;` statement before the log line
    pub add_debugger: bool,

    /// Logging object, e.g. `console` or `logger`
    pub log_function: String,

    /// Treat class methods as loggable scopes and track `this.props`/`this.state`
    pub enable_class_method_logging: bool,

    /// Use effect/memo callbacks as insertion anchors and log their dependencies
    pub enable_hook_logging: bool,

    /// Classify `useContext` results into the `context` bucket
    pub enable_context_logging: bool,

    /// Classify `useSelector` results into the `reduxContext` bucket
    pub enable_redux_context_logging: bool,

    /// Drop declared-but-unreferenced names
    pub filter_unused_variables: bool,

    /// Names never logged
    pub sensitive_keys: Vec<String>,

    /// Append the insertion line to the prefix
    pub include_line_number: bool,

    /// Guard the statement with a `NODE_ENV !== 'production'` check
    pub wrap_in_dev_check: bool,

    /// Trailing marker appended after the statement, e.g. `// @ctxlog`.
    /// Lines carrying it are removed again by `strip_tagged_lines`.
    pub log_tag: String,

    /// Import added at the top of a file receiving statements, unless already present
    pub custom_logger_import_statement: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_template: "[${fileName} > ${functionName}]".to_string(),
            log_level: LogLevel::Log,
            log_items: ["props", "state", "refs", "context", "reducers", "locals"]
                .iter()
                .map(|item| (*item).to_string())
                .collect(),
            add_debugger: false,
            log_function: "console".to_string(),
            enable_class_method_logging: false,
            enable_hook_logging: false,
            enable_context_logging: true,
            enable_redux_context_logging: false,
            filter_unused_variables: true,
            sensitive_keys: ["password", "token", "secret", "apiKey"]
                .iter()
                .map(|key| (*key).to_string())
                .collect(),
            include_line_number: false,
            wrap_in_dev_check: false,
            log_tag: String::new(),
            custom_logger_import_statement: String::new(),
        }
    }
}

impl LogConfig {
    /// Every React-oriented feature switched on
    pub fn react() -> Self {
        Self {
            enable_class_method_logging: true,
            enable_hook_logging: true,
            enable_context_logging: true,
            enable_redux_context_logging: true,
            log_items: ["props", "state", "refs", "context", "reducers", "locals", "reduxContext"]
                .iter()
                .map(|item| (*item).to_string())
                .collect(),
            ..Default::default()
        }
    }

    /// Plain functions only: parameters and locals
    pub fn minimal() -> Self {
        Self {
            enable_context_logging: false,
            log_items: vec![ARGS_LABEL.to_string(), "locals".to_string()],
            ..Default::default()
        }
    }

    /// Parse a JSON or TOML document; missing keys take their defaults
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value = match serde_json::from_slice(bytes) {
            Ok(value) => value,
            Err(json_err) => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|err| EngineError::invalid_config(format!("{json_err}; {err}")))?;
                let toml_value: toml::Value = toml::from_str(text).map_err(|toml_err| {
                    EngineError::invalid_config(format!(
                        "config is not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}"
                    ))
                })?;
                serde_json::to_value(toml_value).map_err(|err| {
                    EngineError::invalid_config(format!("failed to convert TOML config: {err}"))
                })?
            }
        };

        let config: Self = serde_json::from_value(value)
            .map_err(|err| EngineError::invalid_config(err.to_string()))?;
        config.validate().map_err(EngineError::invalid_config)?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_slice(&bytes)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.log_function.trim().is_empty() {
            return Err("logFunction must not be empty".to_string());
        }

        let valid_path = self.log_function.split('.').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_' || c == '$')
                && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        });
        if !valid_path {
            return Err(format!(
                "logFunction ({}) must be an identifier or dotted path",
                self.log_function
            ));
        }

        for item in &self.log_items {
            if item != ARGS_LABEL && Bucket::from_label(item).is_none() {
                return Err(format!("unknown logItems entry: {item}"));
            }
        }

        Ok(())
    }

    /// Whether `label` (a bucket label or `args`) is rendered by default
    pub fn logs_item(&self, label: &str) -> bool {
        self.log_items
            .iter()
            .any(|item| item.eq_ignore_ascii_case(label))
    }

    pub fn is_sensitive(&self, name: &str) -> bool {
        self.sensitive_keys.iter().any(|key| key == name)
    }

    /// The configured import, when set and not yet part of `text`
    pub fn missing_import(&self, text: &str) -> Option<&str> {
        let import = self.custom_logger_import_statement.trim();
        (!import.is_empty() && !text.contains(import)).then_some(import)
    }
}

/// Method invoked on the logging object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Log,
    Info,
    Warn,
    Error,
    Debug,
    Table,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Log => "log",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Debug => "debug",
            LogLevel::Table => "table",
        }
    }
}
