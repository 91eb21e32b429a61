use std::fmt;

#[derive(Debug)]
pub enum CoreError {
    InvalidConfig(String),
    InvalidParameter(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CoreError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            CoreError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
        }
    }
}

impl std::error::Error for CoreError {}

pub type Result<T> = std::result::Result<T, CoreError>;
