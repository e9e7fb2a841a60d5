//! Application error type.
//!
//! All fallible operations return `AppError`, which carries a process exit
//! code alongside the message. The codes follow a fixed convention so shell
//! scripts can tell failure classes apart:
//!
//! - `2` — parse/I-O/configuration (bad input file, bad flag values)
//! - `3` — data/usage (empty dataset, non-positive uncertainties)
//! - `4` — fit (guess length mismatch, non-convergence, singular covariance)
//! - `5` — render (invalid axis data)

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
