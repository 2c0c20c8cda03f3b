use crate::tag::TagError;

///
/// Token
/// One `key` or `key:"value"` item from raw tag text, borrowed from the input.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Token<'a> {
    pub key: &'a str,
    pub value: Option<&'a str>,
}

///
/// Lexer
///
/// Quote-aware scanner over whitespace-separated tag tokens.
/// A value runs from the opening quote to the next double quote, so it may
/// contain whitespace and colons; escapes are not recognised.
///

pub struct Lexer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub const fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    // Rest of the current token, used to quote the offending text in errors.
    fn rest_of_token(&self, from: usize) -> &'a str {
        let rest = &self.text[from..];
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());

        &rest[..end]
    }

    fn key(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == ':' || c == '"' {
                break;
            }
            self.pos += c.len_utf8();
        }

        &self.text[start..self.pos]
    }

    fn quoted_value(&mut self, key: &str) -> Result<&'a str, TagError> {
        let token_start = self.pos;

        if self.peek() != Some('"') {
            return Err(TagError::InvalidValue {
                key: key.to_string(),
                value: self.rest_of_token(token_start).to_string(),
            });
        }
        self.pos += 1;

        let body = &self.text[self.pos..];
        let Some(close) = body.find('"') else {
            return Err(TagError::UnterminatedValue {
                key: key.to_string(),
            });
        };
        let value = &body[..close];
        self.pos += close + 1;

        // the closing quote must end the token
        match self.peek() {
            Some(c) if !c.is_whitespace() => Err(TagError::InvalidValue {
                key: key.to_string(),
                value: self.rest_of_token(token_start).to_string(),
            }),
            _ => Ok(value.trim()),
        }
    }

    fn token(&mut self) -> Result<Token<'a>, TagError> {
        let start = self.pos;
        let key = self.key();

        match self.peek() {
            Some(':' | '"') if key.is_empty() => Err(TagError::MissingKey {
                token: self.rest_of_token(start).to_string(),
            }),
            Some(':') => {
                self.pos += 1;
                let value = self.quoted_value(key)?;

                Ok(Token {
                    key,
                    value: Some(value),
                })
            }
            Some('"') => Err(TagError::InvalidValue {
                key: key.to_string(),
                value: self.rest_of_token(start + key.len()).to_string(),
            }),
            _ => Ok(Token { key, value: None }),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, TagError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        if self.pos >= self.text.len() {
            return None;
        }

        let item = self.token();
        if item.is_err() {
            // stop scanning after the first malformed token
            self.pos = self.text.len();
        }

        Some(item)
    }
}

///
/// TESTS
///
