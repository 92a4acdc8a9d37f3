use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VividError {
    #[error("Type error: {0}")]
    Type(String),
    #[error("Malformed literal '{literal}': {message}")]
    Malformed { message: String, literal: String },
    #[error("Cardinality error: {0}")]
    Cardinality(String),
    #[error("Domain error: {0}")]
    Domain(String),
    #[error("Lookup error: {0}")]
    Lookup(String),
    #[error("Index {index} out of bounds (max: {max})")]
    Bounds { index: usize, max: usize },
    #[error("Input mismatch: {0}")]
    InputMismatch(String),
    #[error("Evaluation error: {0}")]
    Evaluation(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("JSON error: {0}")]
    Json(String),
}

pub type Result<T> = std::result::Result<T, VividError>;

impl VividError {
    pub fn malformed(message: impl Into<String>, literal: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
            literal: literal.into(),
        }
    }
}

// Helper conversions
impl From<config::ConfigError> for VividError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<serde_json::Error> for VividError {
    fn from(e: serde_json::Error) -> Self { Self::Json(e.to_string()) }
}
impl From<std::io::Error> for VividError {
    fn from(e: std::io::Error) -> Self { Self::Io(e.to_string()) }
}
