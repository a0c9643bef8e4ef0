use crate::command::RequestError;
use ctxlog_engine::EngineError;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize, Clone)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Body printed to stdout in `--json` mode
#[derive(Debug, Serialize, Clone)]
pub struct CommandResponse {
    pub status: CommandStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
    #[serde(default)]
    pub data: Value,
}

impl CommandResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            status: CommandStatus::Ok,
            error: None,
            data,
        }
    }

    pub fn error(err: &anyhow::Error) -> Self {
        Self {
            status: CommandStatus::Error,
            error: Some(classify_error(err)),
            data: Value::Null,
        }
    }
}

/// Map a failure onto a stable error code with an optional remediation hint
pub fn classify_error(err: &anyhow::Error) -> ErrorEnvelope {
    let message = format!("{err:#}");
    let (code, hint) = if let Some(engine) = err.downcast_ref::<EngineError>() {
        match engine {
            EngineError::Parse { .. } => (
                "parse_error",
                Some("Fix the syntax error; no statements are produced for unparsable files."),
            ),
            EngineError::InvalidConfig(_) => (
                "invalid_config",
                Some("Check the config keys against the documented camelCase names."),
            ),
            EngineError::InvalidPosition { .. } => ("invalid_request", None),
            EngineError::Io(_) => ("io_error", None),
            EngineError::UnsupportedLanguage(_) => (
                "invalid_request",
                Some("Supported languages: javascript, jsx, typescript, tsx."),
            ),
            EngineError::TreeSitter(_) => ("internal", None),
        }
    } else if let Some(request) = err.downcast_ref::<RequestError>() {
        match request {
            RequestError::NoContext { .. } => (
                "no_context",
                Some("Place the cursor inside a function, arrow function or component body."),
            ),
            RequestError::NotADirectory(_) => ("invalid_request", None),
            RequestError::MissingLogTag => (
                "invalid_config",
                Some("Set logTag so inserted statements carry a marker clean can find."),
            ),
        }
    } else if err.chain().any(|cause| cause.is::<std::io::Error>()) {
        ("io_error", None)
    } else {
        ("internal", None)
    };

    ErrorEnvelope {
        code: code.to_string(),
        message,
        hint: hint.map(str::to_string),
    }
}
