use crate::lexer::LexError;
use std::path::PathBuf;
use thiserror::Error;

/// Reasons a whole file yields no [`ast::SourceUnit`]
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("{}: {source}", file.display())]
    Unparseable {
        file: PathBuf,
        #[source]
        source: LexError,
    },

    #[error("file not found: {}", file.display())]
    FileNotFound { file: PathBuf },

    #[error("{} is not valid UTF-8", file.display())]
    InvalidUtf8 { file: PathBuf },

    #[error("failed to read {}: {error}", file.display())]
    IoError { file: PathBuf, error: String },

    #[error("{} is {size} bytes, over the {limit} byte limit", file.display())]
    TooLarge { file: PathBuf, size: u64, limit: u64 },
}

impl ParseError {
    pub fn file(&self) -> &PathBuf {
        match self {
            ParseError::Unparseable { file, .. }
            | ParseError::FileNotFound { file }
            | ParseError::InvalidUtf8 { file }
            | ParseError::IoError { file, .. }
            | ParseError::TooLarge { file, .. } => file,
        }
    }

    /// Line of the offending construct, when the failure was lexical
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Unparseable { source, .. } => Some(source.line()),
            _ => None,
        }
    }

    /// True when the file was read but its text could not be tokenized
    pub fn is_unparseable(&self) -> bool {
        matches!(self, ParseError::Unparseable { .. })
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
