//! Lightweight Solidity front end
//!
//! Recovers contract interfaces from raw source text in two passes: the
//! [`lexer`] strips comments and literals while annotating nesting depth,
//! and the [`extractor`] matches declarations against those depths. No
//! expression grammar is involved, so unsupported syntax inside function
//! bodies never affects the declarations around it.

pub mod error;
pub mod extractor;
pub mod lexer;
pub mod types;

use ast::SourceUnit;
use std::fs;
use std::path::Path;

pub use error::{ParseError, ParseResult};
pub use extractor::Extractor;
pub use lexer::{LexError, Lexer, Token, TokenKind};

/// Parser for Solidity source files
#[derive(Debug, Clone)]
pub struct Parser {
    max_file_size: Option<u64>,
}

impl Parser {
    pub fn new() -> Self {
        Self { max_file_size: None }
    }

    /// Refuse files larger than `bytes`
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = Some(bytes);
        self
    }

    /// Parse Solidity source code from a string
    pub fn parse(&self, source: &str, file_path: impl AsRef<Path>) -> ParseResult<SourceUnit> {
        let path = file_path.as_ref();
        let tokens = Lexer::tokenize(source).map_err(|source| ParseError::Unparseable {
            file: path.to_path_buf(),
            source,
        })?;
        Ok(Extractor::new(source, &tokens, path).extract())
    }

    /// Parse Solidity source code from a file
    pub fn parse_file(&self, file_path: impl AsRef<Path>) -> ParseResult<SourceUnit> {
        let path = file_path.as_ref();

        if let Some(limit) = self.max_file_size {
            let size = fs::metadata(path).map_err(|err| io_error(path, err))?.len();
            if size > limit {
                return Err(ParseError::TooLarge {
                    file: path.to_path_buf(),
                    size,
                    limit,
                });
            }
        }

        let source = fs::read_to_string(path).map_err(|err| io_error(path, err))?;
        self.parse(&source, path)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

fn io_error(path: &Path, err: std::io::Error) -> ParseError {
    match err.kind() {
        std::io::ErrorKind::NotFound => ParseError::FileNotFound {
            file: path.to_path_buf(),
        },
        std::io::ErrorKind::InvalidData => ParseError::InvalidUtf8 {
            file: path.to_path_buf(),
        },
        _ => ParseError::IoError {
            file: path.to_path_buf(),
            error: err.to_string(),
        },
    }
}

/// Parse one file, returning `None` when it cannot be read or tokenized
pub fn parse_file(path: impl AsRef<Path>) -> Option<SourceUnit> {
    match Parser::new().parse_file(path) {
        Ok(unit) => Some(unit),
        Err(err) => {
            tracing::warn!("{}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_simple_contract_parsing() {
        let source = r#"
            pragma solidity ^0.8.0;
            contract SimpleTest {
                uint256 public value;
                function setValue(uint256 _value) public {
                    value = _value;
                }
            }
        "#;

        let unit = Parser::new().parse(source, "test.sol").unwrap();
        assert_eq!(unit.contracts.len(), 1);
        assert_eq!(unit.contracts[0].name, "SimpleTest");
        assert_eq!(unit.contracts[0].functions[0].name, "setValue");
        assert_eq!(unit.solidity_version(), Some("^0.8.0"));
    }

    #[test]
    fn test_unterminated_comment_is_unparseable() {
        let err = Parser::new()
            .parse("contract A {}\n/* open", "broken.sol")
            .unwrap_err();
        assert!(err.is_unparseable());
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_parse_file_returns_none_for_missing_or_broken_files() {
        let temp = TempDir::new().unwrap();
        assert!(parse_file(temp.path().join("missing.sol")).is_none());

        let broken = temp.path().join("Broken.sol");
        std::fs::write(&broken, "contract A { string s = \"never closed; }").unwrap();
        assert!(parse_file(&broken).is_none());

        let good = temp.path().join("Good.sol");
        std::fs::write(&good, "contract Good { function f() external {} }").unwrap();
        let unit = parse_file(&good).unwrap();
        assert_eq!(unit.path, good);
    }

    #[test]
    fn test_max_file_size() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Big.sol");
        std::fs::write(&path, "contract Big {}".repeat(10)).unwrap();

        let err = Parser::new().with_max_file_size(16).parse_file(&path).unwrap_err();
        assert!(matches!(err, ParseError::TooLarge { .. }));
        assert!(Parser::new().with_max_file_size(1024).parse_file(&path).is_ok());
    }
}
