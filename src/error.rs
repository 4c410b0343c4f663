//! Error types for tasktide
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (unknown task, bad date, bad argument)
//! - 4: Operation failed (I/O, corrupt data file)

use thiserror::Error;

pub mod exit_codes {
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Task {0} not found")]
    TaskNotFound(String),

    #[error("Invalid due date '{0}'. Use YYYY-MM-DD, YYYY-MM-DDTHH:MM:SS or RFC 3339")]
    InvalidDate(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::TaskNotFound(_) | Error::InvalidDate(_) | Error::InvalidArgument(_) => {
                exit_codes::USER_ERROR
            }
            Error::Io(_) | Error::Json(_) => exit_codes::OPERATION_FAILED,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_errors_map_to_exit_code_2() {
        assert_eq!(Error::TaskNotFound("x".into()).exit_code(), exit_codes::USER_ERROR);
        assert_eq!(Error::InvalidDate("soon".into()).exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn io_errors_map_to_exit_code_4() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
    }
}
