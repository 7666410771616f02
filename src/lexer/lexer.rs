use tracing::{debug, trace};

use crate::error::{CompileError, CompileResult};

use super::token::{Token, TokenKind, KEYWORDS, ONE_SYMBOL_TOKENS, TWO_SYMBOLS_TOKENS};

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

#[derive(Debug)]
pub struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    index: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: vec![],
            index: 0,
        }
    }

    fn new_token(&mut self, kind: TokenKind, len: usize) {
        self.tokens.push(Token {
            kind,
            offset: self.index,
            len,
        });
        self.index += len;
    }

    fn take_while(&self, predicate: impl Fn(u8) -> bool) -> &'a str {
        let rest = &self.source[self.index..];
        let len = rest.bytes().take_while(|&c| predicate(c)).count();
        &rest[..len]
    }

    fn parse_number(&mut self) -> CompileResult<()> {
        let s = self.take_while(|c| c.is_ascii_digit());
        let value = s
            .parse()
            .map_err(|_| CompileError::at(self.index, "number is out of range"))?;
        self.new_token(TokenKind::Num(value), s.len());
        Ok(())
    }

    fn parse_identifier(&mut self) {
        let s = self.take_while(is_ident_char);

        if let Some(kind) = KEYWORDS.get(s) {
            self.new_token(kind.clone(), s.len());
        } else {
            self.new_token(TokenKind::Ident(s.to_string()), s.len());
        }
    }

    fn _tokenize(&mut self) -> CompileResult<()> {
        let bytes = self.source.as_bytes();

        while self.index < bytes.len() {
            let c = bytes[self.index];

            if c.is_ascii_whitespace() {
                self.index += 1;
            } else if c.is_ascii_digit() {
                self.parse_number()?;
            } else if is_ident_start(c) {
                self.parse_identifier();
            } else if let Some(kind) = self
                .source
                .get(self.index..self.index + 2)
                .and_then(|c2| TWO_SYMBOLS_TOKENS.get(c2))
            {
                self.new_token(kind.clone(), 2);
            } else if let Some(kind) = ONE_SYMBOL_TOKENS.get(&(c as char)) {
                self.new_token(kind.clone(), 1);
            } else {
                return Err(CompileError::at(self.index, "can't tokenize"));
            }
        }

        self.tokens.push(Token {
            kind: TokenKind::Eof,
            offset: self.source.len(),
            len: 0,
        });
        Ok(())
    }

    /// Splits `source` into tokens, always terminated by a single `Eof`.
    pub fn tokenize(source: &'a str) -> CompileResult<Vec<Token>> {
        let mut lexer = Lexer::new(source);
        lexer._tokenize()?;

        debug!(count = lexer.tokens.len(), "tokenized source");
        for token in &lexer.tokens {
            trace!(kind = ?token.kind, offset = token.offset, "token");
        }

        Ok(lexer.tokens)
    }
}
