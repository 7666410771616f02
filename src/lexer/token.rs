use std::fmt;

use phf::phf_map;

pub static KEYWORDS: phf::Map<&str, TokenKind> = phf_map! {
    "return" => TokenKind::Return,
    "if" => TokenKind::If,
    "else" => TokenKind::Else,
    "while" => TokenKind::While,
    "for" => TokenKind::For,
    "sizeof" => TokenKind::Sizeof,
    "int" => TokenKind::Int,
    "char" => TokenKind::Char,
};

pub static TWO_SYMBOLS_TOKENS: phf::Map<&str, TokenKind> = phf_map! {
    "==" => TokenKind::DoubleEqual,
    "!=" => TokenKind::NotEqual,
    "<=" => TokenKind::LessEqual,
    ">=" => TokenKind::GreaterEqual,
};

pub static ONE_SYMBOL_TOKENS: phf::Map<char, TokenKind> = phf_map! {
    '+' => TokenKind::Plus,
    '-' => TokenKind::Minus,
    '*' => TokenKind::Star,
    '/' => TokenKind::Slash,
    '&' => TokenKind::Ampersand,
    '(' => TokenKind::OpenParen,
    ')' => TokenKind::CloseParen,
    '{' => TokenKind::OpenCurlyBrace,
    '}' => TokenKind::CloseCurlyBrace,
    '[' => TokenKind::OpenSquareBrace,
    ']' => TokenKind::CloseSquareBrace,
    ';' => TokenKind::SemiColon,
    ',' => TokenKind::Comma,
    '=' => TokenKind::Equal,
    '<' => TokenKind::LessThan,
    '>' => TokenKind::GreaterThan,
};

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Num(i64),
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    Ampersand,

    OpenParen,
    CloseParen,
    OpenCurlyBrace,
    CloseCurlyBrace,
    OpenSquareBrace,
    CloseSquareBrace,
    SemiColon,
    Comma,

    Equal,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    DoubleEqual,
    NotEqual,

    Return,
    If,
    Else,
    While,
    For,
    Sizeof,
    Int,
    Char,

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Num(n) => return write!(f, "{n}"),
            TokenKind::Ident(name) => return write!(f, "{name}"),
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Ampersand => "&",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::OpenCurlyBrace => "{",
            TokenKind::CloseCurlyBrace => "}",
            TokenKind::OpenSquareBrace => "[",
            TokenKind::CloseSquareBrace => "]",
            TokenKind::SemiColon => ";",
            TokenKind::Comma => ",",
            TokenKind::Equal => "=",
            TokenKind::LessThan => "<",
            TokenKind::LessEqual => "<=",
            TokenKind::GreaterThan => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::DoubleEqual => "==",
            TokenKind::NotEqual => "!=",
            TokenKind::Return => "return",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::For => "for",
            TokenKind::Sizeof => "sizeof",
            TokenKind::Int => "int",
            TokenKind::Char => "char",
            TokenKind::Eof => "end of input",
        };
        f.write_str(s)
    }
}

/// A token together with the span of source text it was read from.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
    pub len: usize,
}
