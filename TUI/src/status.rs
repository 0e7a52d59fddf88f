use std::fmt;
use std::path::PathBuf;

use crate::error::GenerationError;

pub const IN_PROGRESS_MESSAGE: &str = "Generating - this may take up to 30 seconds...";

/// The single status indicator for the most recent generation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    InProgress,
    Success { path: PathBuf },
    Error(String),
}

impl Status {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Status::InProgress)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Success { .. } | Status::Error(_))
    }

    /// Short label for the sidebar and logs
    pub fn label(&self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::InProgress => "generating",
            Status::Success { .. } => "done",
            Status::Error(_) => "error",
        }
    }
}

impl From<Result<PathBuf, GenerationError>> for Status {
    fn from(outcome: Result<PathBuf, GenerationError>) -> Self {
        match outcome {
            Ok(path) => Status::Success { path },
            Err(e) => Status::Error(e.to_string()),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => Ok(()),
            Status::InProgress => write!(f, "{}", IN_PROGRESS_MESSAGE),
            Status::Success { path } => {
                write!(f, "Done! Saved {} - try another idea.", path.display())
            }
            Status::Error(detail) => write!(f, "{}", detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_renders_empty() {
        assert_eq!(Status::Idle.to_string(), "");
        assert!(!Status::Idle.is_terminal());
    }

    #[test]
    fn test_outcome_conversion() {
        let ok: Status = Ok(PathBuf::from("out/myapp.zip")).into();
        assert_eq!(ok, Status::Success { path: PathBuf::from("out/myapp.zip") });
        assert!(ok.to_string().contains("myapp.zip"));

        let err: Status = Err(GenerationError::Service("invalid prompt".into())).into();
        assert_eq!(err.to_string(), "Error: invalid prompt");
        assert_eq!(err.label(), "error");
    }
}
