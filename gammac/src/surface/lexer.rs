use std::fmt;
use std::str::Chars;

use crate::files::FileId;
use crate::reporting::LexerMessage;
use crate::source::{ByteRange, BytePos, FileRange, Position};

/// Reserved words, and the token kinds they lex to.
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("enum", TokenKind::KeywordEnum),
    ("struct", TokenKind::KeywordStruct),
    ("union", TokenKind::KeywordUnion),
];

/// Look up the keyword kind of `word`, if it is reserved.
pub fn keyword(word: &str) -> Option<TokenKind> {
    KEYWORDS
        .iter()
        .find(|(keyword, _)| word == *keyword)
        .map(|(_, kind)| *kind)
}

/// The kinds of token in the surface language.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Identifier,
    StringLiteral,

    KeywordEnum,
    KeywordStruct,
    KeywordUnion,

    Colon,
    Comma,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
}

impl TokenKind {
    pub fn description(self) -> &'static str {
        match self {
            TokenKind::Eof => "end of file",
            TokenKind::Identifier => "identifier",
            TokenKind::StringLiteral => "string literal",
            TokenKind::KeywordEnum => "`enum`",
            TokenKind::KeywordStruct => "`struct`",
            TokenKind::KeywordUnion => "`union`",
            TokenKind::Colon => "`:`",
            TokenKind::Comma => "`,`",
            TokenKind::OpenBrace => "`{`",
            TokenKind::CloseBrace => "`}`",
            TokenKind::OpenBracket => "`[`",
            TokenKind::CloseBracket => "`]`",
            TokenKind::OpenParen => "`(`",
            TokenKind::CloseParen => "`)`",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A token, tagged with where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Position of the first character of the token.
    pub position: Position,
    pub range: FileRange,
    /// The matched text. Empty at the end of the file, and without the quotes
    /// for string literals.
    pub lexeme: String,
}

impl Token {
    /// Describe the token for use in diagnostics, eg. ``identifier `Foo` ``.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Identifier => format!("identifier `{}`", self.lexeme),
            TokenKind::StringLiteral => format!("string literal \"{}\"", self.lexeme),
            kind => kind.description().to_owned(),
        }
    }
}

/// A lexer for the surface language.
pub struct Lexer<'source> {
    file_id: FileId,
    /// An iterator of unicode characters to consume.
    chars: Chars<'source>,
    /// One character of lookahead.
    peeked: Option<char>,
    /// The position of the lookahead character.
    position: Position,
    /// The byte offset of the lookahead character.
    offset: BytePos,
}

impl<'source> Lexer<'source> {
    /// Create a new lexer over the `source` of the given file.
    pub fn new(file_id: FileId, source: &'source str) -> Lexer<'source> {
        assert!(
            source.len() <= u32::MAX as usize,
            "`source` must be less than 4GiB in length"
        );

        let mut chars = source.chars();
        let peeked = chars.next();

        Lexer {
            file_id,
            chars,
            peeked,
            position: Position::START,
            offset: 0,
        }
    }

    /// Peek at the current lookahead character.
    fn peek(&self) -> Option<char> {
        self.peeked
    }

    /// Consume the current character and load the next one. Return the old character.
    fn advance(&mut self) -> Option<char> {
        let current = std::mem::replace(&mut self.peeked, self.chars.next());
        if let Some(ch) = current {
            self.position = self.position.advance(ch);
            self.offset += ch.len_utf8() as BytePos;
        }
        current
    }

    /// The range from `start` up to the current offset.
    fn range_from(&self, start: BytePos) -> FileRange {
        FileRange::new(self.file_id, ByteRange::new(start, self.offset))
    }

    fn token(&self, kind: TokenKind, position: Position, start: BytePos, lexeme: String) -> Token {
        Token {
            kind,
            position,
            range: self.range_from(start),
            lexeme,
        }
    }

    /// Skip whitespace and `#` line comments.
    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                '#' => {
                    while !matches!(self.advance(), Some('\n') | None) {}
                }
                _ => break,
            }
        }
    }

    /// Produce the next token. Once the input is exhausted this keeps
    /// returning end of file tokens.
    pub fn next_token(&mut self) -> Result<Token, LexerMessage> {
        self.skip_trivia();

        let start = self.offset;
        let position = self.position;
        let ch = match self.advance() {
            Some(ch) => ch,
            None => return Ok(self.token(TokenKind::Eof, position, start, String::new())),
        };

        let kind = match ch {
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            '[' => TokenKind::OpenBracket,
            ']' => TokenKind::CloseBracket,
            '{' => TokenKind::OpenBrace,
            '}' => TokenKind::CloseBrace,
            '"' => return self.string_literal(position, start),
            ch if is_letter(ch) => return Ok(self.name(ch, position, start)),
            found => {
                return Err(LexerMessage::UnexpectedChar {
                    range: self.range_from(start),
                    position,
                    found,
                })
            }
        };

        Ok(self.token(kind, position, start, ch.to_string()))
    }

    /// Consume the rest of a string literal, after its opening quote.
    fn string_literal(&mut self, position: Position, start: BytePos) -> Result<Token, LexerMessage> {
        let mut text = String::new();
        loop {
            match self.advance() {
                Some('"') => return Ok(self.token(TokenKind::StringLiteral, position, start, text)),
                Some(ch) => text.push(ch),
                None => {
                    return Err(LexerMessage::UnterminatedString {
                        range: self.range_from(start),
                        position,
                    })
                }
            }
        }
    }

    /// Consume the rest of a name, which is either a keyword or an identifier.
    fn name(&mut self, first: char, position: Position, start: BytePos) -> Token {
        let mut name = String::new();
        name.push(first);
        while let Some(ch) = self.peek().filter(|ch| is_letter(*ch)) {
            name.push(ch);
            self.advance();
        }

        let kind = keyword(&name).unwrap_or(TokenKind::Identifier);
        self.token(kind, position, start, name)
    }
}

fn is_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}
