use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChecklistError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("no saved checklist under key '{0}'")]
    NotFound(String),

    #[error("step not found at index {0}")]
    StepNotFound(usize),

    #[error("run not found at index {run} on step {step}")]
    RunNotFound { step: usize, run: usize },

    #[error("enhancement not found at index {0}")]
    EnhancementNotFound(usize),

    #[error("corrupt checklist state: {0}")]
    CorruptState(String),

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChecklistError>;
