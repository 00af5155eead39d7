//! First pass: turn source text into structural tokens
//!
//! Comments are dropped and literal contents are folded into a single
//! [`TokenKind::StringLit`] token, so nothing inside them can be mistaken for
//! a keyword or delimiter. Every token carries the brace and paren depth it
//! sits at; an opening delimiter and its matching closer report the same
//! depth, and everything between them is one level deeper.

use ast::Position;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword
    Ident,
    /// Numeric literal, including hex and scientific forms
    Number,
    /// String, hex or unicode literal; `text` holds the raw content
    StringLit,
    /// `=>`
    Arrow,
    /// Any other single character
    Punct(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
    pub line: usize,
    pub column: usize,
    pub brace_depth: u32,
    pub paren_depth: u32,
}

impl<'src> Token<'src> {
    pub fn is_punct(&self, ch: char) -> bool {
        self.kind == TokenKind::Punct(ch)
    }

    pub fn is_ident(&self) -> bool {
        self.kind == TokenKind::Ident
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == word
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column, self.start)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated block comment starting at line {line}")]
    UnterminatedComment { line: usize },

    #[error("unterminated string literal starting at line {line}")]
    UnterminatedString { line: usize },
}

impl LexError {
    pub fn line(&self) -> usize {
        match self {
            LexError::UnterminatedComment { line } | LexError::UnterminatedString { line } => *line,
        }
    }
}

/// Character-level scanner producing depth-annotated tokens
pub struct Lexer<'src> {
    source: &'src str,
    chars: Vec<(usize, char)>,
    index: usize,
    line: usize,
    column: usize,
    brace_depth: u32,
    paren_depth: u32,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().collect(),
            index: 0,
            line: 1,
            column: 1,
            brace_depth: 0,
            paren_depth: 0,
        }
    }

    /// Tokenize a whole source file
    pub fn tokenize(source: &'src str) -> Result<Vec<Token<'src>>, LexError> {
        Lexer::new(source).run()
    }

    fn run(mut self) -> Result<Vec<Token<'src>>, LexError> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.bump();
                continue;
            }

            if ch == '/' && self.peek_at(1) == Some('/') {
                self.skip_line_comment();
                continue;
            }

            if ch == '/' && self.peek_at(1) == Some('*') {
                self.skip_block_comment()?;
                continue;
            }

            let token = if ch == '"' || ch == '\'' {
                self.lex_string(ch)?
            } else if is_ident_start(ch) {
                self.lex_while(TokenKind::Ident, is_ident_continue)
            } else if ch.is_ascii_digit() {
                self.lex_number()
            } else if ch == '=' && self.peek_at(1) == Some('>') {
                self.lex_fixed(TokenKind::Arrow, 2)
            } else {
                self.lex_punct(ch)
            };
            tokens.push(token);
        }

        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.index + ahead).map(|(_, ch)| *ch)
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.index)
            .map(|(offset, _)| *offset)
            .unwrap_or(self.source.len())
    }

    fn bump(&mut self) -> Option<char> {
        let (_, ch) = *self.chars.get(self.index)?;
        self.index += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.bump();
        }
    }

    /// Block comments do not nest: the first `*/` closes
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let line = self.line;
        self.bump();
        self.bump();
        loop {
            match self.bump() {
                Some('*') if self.peek() == Some('/') => {
                    self.bump();
                    return Ok(());
                }
                Some(_) => {}
                None => return Err(LexError::UnterminatedComment { line }),
            }
        }
    }

    fn make_token(&self, kind: TokenKind, start: usize, end: usize, line: usize, column: usize) -> Token<'src> {
        Token {
            kind,
            text: &self.source[start..end],
            start,
            end,
            line,
            column,
            brace_depth: self.brace_depth,
            paren_depth: self.paren_depth,
        }
    }

    fn lex_string(&mut self, quote: char) -> Result<Token<'src>, LexError> {
        let (line, column) = (self.line, self.column);
        let start = self.offset();
        self.bump();
        let content_start = self.offset();
        loop {
            match self.bump() {
                Some('\\') => {
                    // The escaped character never terminates the literal
                    if self.bump().is_none() {
                        return Err(LexError::UnterminatedString { line });
                    }
                }
                Some(ch) if ch == quote => break,
                Some(_) => {}
                None => return Err(LexError::UnterminatedString { line }),
            }
        }
        let content_end = self.offset() - quote.len_utf8();
        let mut token = self.make_token(TokenKind::StringLit, start, self.offset(), line, column);
        token.text = &self.source[content_start..content_end];
        Ok(token)
    }

    fn lex_while(&mut self, kind: TokenKind, accept: fn(char) -> bool) -> Token<'src> {
        let (line, column) = (self.line, self.column);
        let start = self.offset();
        while let Some(ch) = self.peek() {
            if !accept(ch) {
                break;
            }
            self.bump();
        }
        self.make_token(kind, start, self.offset(), line, column)
    }

    fn lex_number(&mut self) -> Token<'src> {
        let (line, column) = (self.line, self.column);
        let start = self.offset();
        while let Some(ch) = self.peek() {
            let exponent_sign = (ch == '-' || ch == '+')
                && matches!(self.chars.get(self.index.wrapping_sub(1)), Some((_, 'e' | 'E')))
                && !self.source[start..self.offset()].starts_with("0x");
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || exponent_sign {
                self.bump();
            } else {
                break;
            }
        }
        self.make_token(TokenKind::Number, start, self.offset(), line, column)
    }

    fn lex_fixed(&mut self, kind: TokenKind, len: usize) -> Token<'src> {
        let (line, column) = (self.line, self.column);
        let start = self.offset();
        for _ in 0..len {
            self.bump();
        }
        self.make_token(kind, start, self.offset(), line, column)
    }

    fn lex_punct(&mut self, ch: char) -> Token<'src> {
        // Closers are annotated after the decrement so they match their opener
        match ch {
            '}' => self.brace_depth = self.brace_depth.saturating_sub(1),
            ')' => self.paren_depth = self.paren_depth.saturating_sub(1),
            _ => {}
        }
        let token = self.lex_fixed(TokenKind::Punct(ch), 1);
        match ch {
            '{' => self.brace_depth += 1,
            '(' => self.paren_depth += 1,
            _ => {}
        }
        token
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}

/// Parse an integer literal such as `32`, `1_000`, `0x20` or `1e3`
pub fn parse_integer_literal(text: &str) -> Option<u64> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    if let Some(hex) = cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).ok();
    }
    if let Some((mantissa, exponent)) = cleaned.split_once(['e', 'E']) {
        let mantissa: u64 = mantissa.parse().ok()?;
        let exponent: u32 = exponent.parse().ok()?;
        return 10u64.checked_pow(exponent)?.checked_mul(mantissa);
    }
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<String> {
        Lexer::tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.text.to_string())
            .collect()
    }

    #[test]
    fn test_comments_are_dropped() {
        let source = r#"
            // function hidden() public {}
            /* event Hidden(uint a); */
            contract A {}
        "#;
        assert_eq!(texts(source), vec!["contract", "A", "{", "}"]);
    }

    #[test]
    fn test_block_comments_do_not_nest() {
        let source = "/* outer /* inner */ contract B {}";
        assert_eq!(texts(source), vec!["contract", "B", "{", "}"]);
    }

    #[test]
    fn test_string_contents_are_one_token() {
        let tokens = Lexer::tokenize(r#"x = "a { b } // c \" d";"#).unwrap();
        let lit = tokens.iter().find(|t| t.kind == TokenKind::StringLit).unwrap();
        assert_eq!(lit.text, r#"a { b } // c \" d"#);
        assert!(tokens.iter().all(|t| !t.is_punct('{')));
        assert!(tokens.last().unwrap().is_punct(';'));
    }

    #[test]
    fn test_single_quoted_and_hex_literals() {
        let tokens = Lexer::tokenize(r#"bytes b = hex'00ff'; string s = 'it\'s';"#).unwrap();
        let literals: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::StringLit)
            .map(|t| t.text)
            .collect();
        assert_eq!(literals, vec!["00ff", r"it\'s"]);
    }

    #[test]
    fn test_depth_annotations() {
        let tokens = Lexer::tokenize("contract A { function f(uint a) {} }").unwrap();
        let open = &tokens[2];
        let close = tokens.last().unwrap();
        assert!(open.is_punct('{') && close.is_punct('}'));
        assert_eq!(open.brace_depth, 0);
        assert_eq!(close.brace_depth, 0);

        let f = tokens.iter().find(|t| t.is_keyword("f")).unwrap();
        assert_eq!(f.brace_depth, 1);
        let param = tokens.iter().find(|t| t.is_keyword("a")).unwrap();
        assert_eq!(param.paren_depth, 1);
    }

    #[test]
    fn test_arrow_and_numbers() {
        assert_eq!(
            texts("mapping(address => uint256) x = 1e18;"),
            vec!["mapping", "(", "address", "=>", "uint256", ")", "x", "=", "1e18", ";"]
        );
        assert_eq!(texts("0x1F_ff 2.5e-3"), vec!["0x1F_ff", "2.5e-3"]);
    }

    #[test]
    fn test_line_tracking() {
        let tokens = Lexer::tokenize("a\n/* x\n y */\n  b").unwrap();
        assert_eq!(tokens[1].line, 4);
        assert_eq!(tokens[1].column, 3);
    }

    #[test]
    fn test_unterminated_comment() {
        let err = Lexer::tokenize("contract A {}\n/* never closed").unwrap_err();
        assert_eq!(err, LexError::UnterminatedComment { line: 2 });
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::tokenize("string s = \"oops;\n").unwrap_err();
        assert_eq!(err, LexError::UnterminatedString { line: 1 });

        let err = Lexer::tokenize("string s = \"trailing escape\\").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString { .. }));
    }

    #[test]
    fn test_stray_closers_clamp_at_zero() {
        let tokens = Lexer::tokenize("} ) contract A {}").unwrap();
        assert_eq!(tokens[0].brace_depth, 0);
        assert_eq!(tokens[1].paren_depth, 0);
        assert_eq!(tokens[4].brace_depth, 0);
    }

    #[test]
    fn test_parse_integer_literal() {
        assert_eq!(parse_integer_literal("32"), Some(32));
        assert_eq!(parse_integer_literal("1_000"), Some(1000));
        assert_eq!(parse_integer_literal("0x20"), Some(32));
        assert_eq!(parse_integer_literal("2e3"), Some(2000));
        assert_eq!(parse_integer_literal("1.5"), None);
    }
}
