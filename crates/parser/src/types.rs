//! Type expressions as written in parameter lists, struct fields and state
//! variables

use crate::lexer::{parse_integer_literal, Token, TokenKind};
use ast::{ArrayLength, ElementaryType, TypeRef};

/// Function type attributes that may follow `function (...)`
const FUNCTION_TYPE_ATTRIBUTES: &[&str] = &["internal", "external", "pure", "view", "payable"];

/// Cursor over a bounded slice of tokens
pub struct TypeParser<'t, 'src> {
    tokens: &'t [Token<'src>],
    pos: usize,
}

impl<'t, 'src> TypeParser<'t, 'src> {
    pub fn new(tokens: &'t [Token<'src>]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Index of the first token not consumed yet
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> &'t [Token<'src>] {
        &self.tokens[self.pos.min(self.tokens.len())..]
    }

    fn peek(&self) -> Option<&'t Token<'src>> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'t Token<'src>> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect_punct(&mut self, ch: char) -> Result<(), String> {
        match self.next() {
            Some(token) if token.is_punct(ch) => Ok(()),
            Some(token) => Err(format!("expected '{}', found '{}'", ch, token.text)),
            None => Err(format!("expected '{}', found end of input", ch)),
        }
    }

    /// Parse one type expression including any array suffixes
    pub fn parse_type(&mut self) -> Result<TypeRef, String> {
        let token = self.next().ok_or_else(|| "expected a type".to_string())?;
        if !token.is_ident() {
            return Err(format!("expected a type, found '{}'", token.text));
        }

        let base = match token.text {
            "mapping" => self.parse_mapping()?,
            "function" => self.parse_function_type()?,
            word => match ElementaryType::from_keyword(word) {
                Some(ElementaryType::Address) => {
                    if self.peek().is_some_and(|t| t.is_keyword("payable")) {
                        self.pos += 1;
                    }
                    TypeRef::Elementary(ElementaryType::Address)
                }
                Some(elementary) => TypeRef::Elementary(elementary),
                None => TypeRef::UserDefined(self.parse_path(word)?),
            },
        };

        self.parse_array_suffixes(base)
    }

    /// `Name` or `Lib.Name`
    fn parse_path(&mut self, first: &str) -> Result<String, String> {
        let mut path = first.to_string();
        while self.peek().is_some_and(|t| t.is_punct('.')) {
            self.pos += 1;
            match self.next() {
                Some(segment) if segment.is_ident() => {
                    path.push('.');
                    path.push_str(segment.text);
                }
                _ => return Err(format!("incomplete qualified type name '{}.'", path)),
            }
        }
        Ok(path)
    }

    fn parse_mapping(&mut self) -> Result<TypeRef, String> {
        self.expect_punct('(')?;
        let key = self.parse_type()?;
        self.skip_optional_name();
        match self.next() {
            Some(token) if token.kind == TokenKind::Arrow => {}
            _ => return Err("expected '=>' in mapping type".to_string()),
        }
        let value = self.parse_type()?;
        self.skip_optional_name();
        self.expect_punct(')')?;
        Ok(TypeRef::Mapping {
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    /// Named mapping keys and values (`mapping(address owner => uint256 balance)`)
    fn skip_optional_name(&mut self) {
        if self.peek().is_some_and(|t| t.is_ident()) {
            self.pos += 1;
        }
    }

    fn parse_function_type(&mut self) -> Result<TypeRef, String> {
        self.skip_parens()?;
        let mut external = false;
        while let Some(token) = self.peek() {
            if token.is_keyword("returns") {
                self.pos += 1;
                self.skip_parens()?;
            } else if token.is_ident() && FUNCTION_TYPE_ATTRIBUTES.contains(&token.text) {
                external |= token.text == "external";
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(TypeRef::Function { external })
    }

    fn skip_parens(&mut self) -> Result<(), String> {
        let open = match self.next() {
            Some(token) if token.is_punct('(') => token,
            _ => return Err("expected '(' in function type".to_string()),
        };
        while let Some(token) = self.next() {
            if token.is_punct(')') && token.paren_depth == open.paren_depth {
                return Ok(());
            }
        }
        Err("unbalanced parentheses in function type".to_string())
    }

    fn parse_array_suffixes(&mut self, mut ty: TypeRef) -> Result<TypeRef, String> {
        while self.peek().is_some_and(|t| t.is_punct('[')) {
            self.pos += 1;
            let length = match self.next() {
                Some(token) if token.is_punct(']') => {
                    ty = TypeRef::Array {
                        base: Box::new(ty),
                        length: None,
                    };
                    continue;
                }
                Some(token) if token.kind == TokenKind::Number => {
                    let value = parse_integer_literal(token.text)
                        .ok_or_else(|| format!("invalid array length '{}'", token.text))?;
                    ArrayLength::Literal(value)
                }
                Some(token) if token.is_ident() => ArrayLength::Constant(self.parse_path(token.text)?),
                Some(token) => return Err(format!("unsupported array length '{}'", token.text)),
                None => return Err("unterminated array suffix".to_string()),
            };
            self.expect_punct(']')?;
            ty = TypeRef::Array {
                base: Box::new(ty),
                length: Some(length),
            };
        }
        Ok(ty)
    }
}
