use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AtmospecResult<T> = Result<T, AtmospecError>;
pub type ComputeResult<T> = AtmospecResult<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtmospecErrorCategory {
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl AtmospecErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }
}

/// Failure of a single analysis recompute.
///
/// The `placeholder` is a stable dotted identifier (for example
/// `INPUT.EMPTY_TRANSITIONS`) that callers and tests can match on without
/// parsing the human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtmospecError {
    category: AtmospecErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl AtmospecError {
    pub fn new(
        category: AtmospecErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            AtmospecErrorCategory::InputValidationError,
            placeholder,
            message,
        )
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(AtmospecErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn computation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(AtmospecErrorCategory::ComputationError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(AtmospecErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> AtmospecErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

impl Display for AtmospecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for AtmospecError {}
