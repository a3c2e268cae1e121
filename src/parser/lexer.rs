//! Tokenizer for policy text.

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Ident(String),
    Str(String),
    Long(i64),
    Star,
    ColonColon,
    Dot,
    Comma,
    Semi,
    At,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    EqEq,
    NotEq,
    AndAnd,
}

impl Token {
    /// How the token reads in an error message.
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("`{s}`"),
            Token::Str(s) => format!("string \"{s}\""),
            Token::Long(n) => format!("number {n}"),
            Token::Star => "`*`".into(),
            Token::ColonColon => "`::`".into(),
            Token::Dot => "`.`".into(),
            Token::Comma => "`,`".into(),
            Token::Semi => "`;`".into(),
            Token::At => "`@`".into(),
            Token::LParen => "`(`".into(),
            Token::RParen => "`)`".into(),
            Token::LBrace => "`{`".into(),
            Token::RBrace => "`}`".into(),
            Token::LBracket => "`[`".into(),
            Token::RBracket => "`]`".into(),
            Token::EqEq => "`==`".into(),
            Token::NotEq => "`!=`".into(),
            Token::AndAnd => "`&&`".into(),
        }
    }
}

/// A token and the 1-based position where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

/// True for names that can be written without quotes.
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

struct Lexer<'a> {
    text: &'a str,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>, line: usize, column: usize) -> ParseError {
        ParseError::new(message, self.text, line, column)
    }

    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_next()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => return,
            }
        }
    }

    fn string(&mut self, line: usize, column: usize) -> Result<Token, ParseError> {
        self.bump(); // opening quote
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string literal", line, column)),
                Some('"') => return Ok(Token::Str(out)),
                Some('\\') => {
                    let (el, ec) = (self.line, self.column);
                    let escaped = match self.bump() {
                        Some('"') => '"',
                        Some('\'') => '\'',
                        Some('\\') => '\\',
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('0') => '\0',
                        Some(other) => {
                            return Err(self.error(
                                format!("unknown escape sequence `\\{other}`"),
                                el,
                                ec - 1,
                            ));
                        }
                        None => return Err(self.error("unterminated string literal", line, column)),
                    };
                    out.push(escaped);
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn number(&mut self, line: usize, column: usize) -> Result<Token, ParseError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse::<i64>()
            .map(Token::Long)
            .map_err(|_| self.error(format!("invalid integer `{literal}`"), line, column))
    }

    fn ident(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.bump();
        }
        Token::Ident(self.chars[start..self.pos].iter().collect())
    }

    fn next_token(&mut self) -> Result<Option<Spanned>, ParseError> {
        self.skip_trivia();
        let (line, column) = (self.line, self.column);
        let Some(c) = self.peek() else {
            return Ok(None);
        };

        let two = |lexer: &mut Self, token: Token| {
            lexer.bump();
            lexer.bump();
            token
        };
        let one = |lexer: &mut Self, token: Token| {
            lexer.bump();
            token
        };

        let token = match (c, self.peek_next()) {
            (':', Some(':')) => two(self, Token::ColonColon),
            ('=', Some('=')) => two(self, Token::EqEq),
            ('!', Some('=')) => two(self, Token::NotEq),
            ('&', Some('&')) => two(self, Token::AndAnd),
            ('-', Some(d)) if d.is_ascii_digit() => self.number(line, column)?,
            ('*', _) => one(self, Token::Star),
            ('.', _) => one(self, Token::Dot),
            (',', _) => one(self, Token::Comma),
            (';', _) => one(self, Token::Semi),
            ('@', _) => one(self, Token::At),
            ('(', _) => one(self, Token::LParen),
            (')', _) => one(self, Token::RParen),
            ('{', _) => one(self, Token::LBrace),
            ('}', _) => one(self, Token::RBrace),
            ('[', _) => one(self, Token::LBracket),
            (']', _) => one(self, Token::RBracket),
            ('"', _) => self.string(line, column)?,
            (d, _) if d.is_ascii_digit() => self.number(line, column)?,
            (a, _) if a.is_ascii_alphabetic() || a == '_' => self.ident(),
            ('=', _) => {
                return Err(self.error(
                    "unexpected `=`; use `==` for comparison",
                    line,
                    column,
                ));
            }
            (other, _) => {
                return Err(self.error(format!("unexpected character `{other}`"), line, column));
            }
        };

        Ok(Some(Spanned {
            token,
            line,
            column,
        }))
    }
}

/// Split `text` into tokens. Also returns the position just past the last
/// character, used for "unexpected end of input" errors.
pub(crate) fn tokenize(text: &str) -> Result<(Vec<Spanned>, (usize, usize)), ParseError> {
    let mut lexer = Lexer {
        text,
        chars: text.chars().collect(),
        pos: 0,
        line: 1,
        column: 1,
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok((tokens, (lexer.line, lexer.column)))
}
