//! Application error type.
//!
//! A single error struct keeps `?`-propagation simple across the crate while
//! the kind taxonomy stays matchable in tests and callers:
//!
//! - `Config` — bad flags, paths, or settings; the user must fix the invocation
//! - `MalformedInput` — supplied data violates its required shape; the whole
//!   batch is rejected, never partially consumed
//! - `InsufficientData` — too few usable rows to split and fit
//! - `DataUnavailable` — no price/volatility observations in range
//! - `NotFit` — predict called on an unfit model (programmer error)

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    MalformedInput,
    InsufficientData,
    DataUnavailable,
    NotFit,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Config | ErrorKind::MalformedInput => 2,
            ErrorKind::InsufficientData => 3,
            ErrorKind::DataUnavailable => 4,
            ErrorKind::NotFit => 5,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn malformed_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedInput, message)
    }

    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsufficientData, message)
    }

    pub fn data_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataUnavailable, message)
    }

    pub fn not_fit(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFit, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
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
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
