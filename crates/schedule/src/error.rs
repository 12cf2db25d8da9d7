use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("failed to parse schedule content: {0}")]
    Parse(String),
    #[error("schedule content is inconsistent: {0}")]
    Inconsistent(String),
}
