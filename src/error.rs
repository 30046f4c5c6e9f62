use rmcp::model::ErrorData;

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("GitHub API error: {0}")]
    GitHub(#[from] octocrab::Error),

    #[error("Missing required environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl ActionError {
    pub fn to_mcp_error(&self) -> ErrorData {
        match self {
            ActionError::MissingEnv(_) | ActionError::InvalidParam(_) => {
                ErrorData::invalid_params(self.to_string(), None)
            }
            ActionError::GitHub(_)
            | ActionError::Io(_)
            | ActionError::Json(_)
            | ActionError::Other(_) => ErrorData::internal_error(self.to_string(), None),
        }
    }
}

pub type Result<T> = std::result::Result<T, ActionError>;
