use thiserror::Error;

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParserError>;

/// Errors that can occur while extracting fragments from source files
#[derive(Error, Debug)]
pub enum ParserError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Source file is not valid UTF-8
    #[error("File is not valid UTF-8: {0}")]
    InvalidEncoding(String),
}
