//! A recursive descent parser for the surface language.
//!
//! The parser keeps two tokens of lookahead in a circular buffer. Grammar
//! decisions only ever look at the first one; the second is used to recognise
//! misspelled declaration keywords.

use crate::reporting::{closest_name, LexerMessage, Message, ParseMessage};
use crate::surface::lexer::{Lexer, Token, TokenKind};
use crate::surface::{
    Argument, EnumBody, EnumDecl, EnumField, Identifier, SourceFile, StringLiteral, StructBody,
    StructDecl, TraitList, TypeDecl, TypeRef, UnionBody, UnionDecl, UnionField,
};

/// Number of tokens of lookahead.
const LOOKAHEAD: usize = 2;

/// Keywords that can start a type declaration.
const DECLARATION_KEYWORDS: &[&str] = &["enum", "union", "struct"];

pub struct Parser<'source> {
    lexer: Lexer<'source>,
    /// Circular buffer of lookahead tokens.
    lookahead: [Token; LOOKAHEAD],
    /// Index of the next token in `lookahead`.
    next: usize,
}

impl<'source> Parser<'source> {
    /// Create a parser, filling the lookahead buffer from `lexer`.
    pub fn new(mut lexer: Lexer<'source>) -> Result<Parser<'source>, LexerMessage> {
        let first = lexer.next_token()?;
        let second = lexer.next_token()?;

        Ok(Parser {
            lexer,
            lookahead: [first, second],
            next: 0,
        })
    }

    /// Peek at the `n`th token of lookahead, starting from 1.
    fn peek(&self, n: usize) -> &Token {
        debug_assert!((1..=LOOKAHEAD).contains(&n), "lookahead out of range");
        &self.lookahead[(self.next + n - 1) % LOOKAHEAD]
    }

    fn peek_kind(&self, n: usize) -> TokenKind {
        self.peek(n).kind
    }

    /// Consume the next token, refilling the lookahead buffer from the lexer.
    fn advance(&mut self) -> Result<Token, LexerMessage> {
        let token = self.lexer.next_token()?;
        let token = std::mem::replace(&mut self.lookahead[self.next], token);
        self.next = (self.next + 1) % LOOKAHEAD;
        Ok(token)
    }

    /// Consume the next token if it has the given kind.
    fn match_kind(&mut self, kind: TokenKind) -> Result<Token, Message> {
        let token = self.peek(1);
        if token.kind != kind {
            return Err(Message::from(ParseMessage::UnexpectedToken {
                range: token.range,
                position: token.position,
                expected: kind,
                found: token.describe(),
            }));
        }
        Ok(self.advance()?)
    }

    /// Consume a separating comma if there is one. Returns `true` if the list
    /// continues, which means the comma is not trailing before `close`.
    fn list_continues(&mut self, close: TokenKind) -> Result<bool, Message> {
        if self.peek_kind(1) != TokenKind::Comma {
            return Ok(false);
        }
        self.advance()?;
        Ok(self.peek_kind(1) != close)
    }

    /// ```text
    /// SourceFile := TypeDecl* Eof
    /// ```
    pub fn parse_source_file(&mut self) -> Result<SourceFile, Message> {
        let mut type_decls = Vec::new();
        while self.peek_kind(1) != TokenKind::Eof {
            type_decls.push(self.parse_type_decl()?);
        }
        Ok(SourceFile { type_decls })
    }

    /// ```text
    /// TypeDecl := EnumDecl | UnionDecl | StructDecl
    /// ```
    fn parse_type_decl(&mut self) -> Result<TypeDecl, Message> {
        match self.peek_kind(1) {
            TokenKind::KeywordEnum => Ok(TypeDecl::Enum(self.parse_enum_decl()?)),
            TokenKind::KeywordUnion => Ok(TypeDecl::Union(self.parse_union_decl()?)),
            TokenKind::KeywordStruct => Ok(TypeDecl::Struct(self.parse_struct_decl()?)),
            TokenKind::Identifier if self.peek_kind(2) == TokenKind::Identifier => {
                let token = self.peek(1);
                Err(Message::from(ParseMessage::UnknownDeclarationKeyword {
                    range: token.range,
                    position: token.position,
                    keyword: token.lexeme.clone(),
                    suggestion: closest_name(&token.lexeme, DECLARATION_KEYWORDS),
                }))
            }
            _ => {
                let token = self.peek(1);
                Err(Message::from(ParseMessage::ExpectedTypeDeclaration {
                    range: token.range,
                    position: token.position,
                    found: token.describe(),
                }))
            }
        }
    }

    /// ```text
    /// EnumDecl := 'enum' Id TraitSuffix? '{' EnumField (',' EnumField)* ','? '}'
    /// ```
    fn parse_enum_decl(&mut self) -> Result<EnumDecl, Message> {
        let keyword = self.match_kind(TokenKind::KeywordEnum)?;
        let name = self.parse_identifier()?;
        let traits = self.parse_trait_suffix()?;

        self.match_kind(TokenKind::OpenBrace)?;
        let mut fields = Vec::new();
        loop {
            fields.push(self.parse_enum_field()?);
            if !self.list_continues(TokenKind::CloseBrace)? {
                break;
            }
        }
        self.match_kind(TokenKind::CloseBrace)?;

        Ok(EnumDecl {
            keyword,
            name,
            traits,
            body: EnumBody { fields },
        })
    }

    /// ```text
    /// EnumField := Id String?
    /// ```
    fn parse_enum_field(&mut self) -> Result<EnumField, Message> {
        let name = self.parse_identifier()?;
        let display_format = self.parse_display_format()?;

        Ok(EnumField {
            name,
            display_format,
        })
    }

    /// ```text
    /// UnionDecl := 'union' Id TraitSuffix? '{' UnionField (',' UnionField)* ','? '}'
    /// ```
    fn parse_union_decl(&mut self) -> Result<UnionDecl, Message> {
        let keyword = self.match_kind(TokenKind::KeywordUnion)?;
        let name = self.parse_identifier()?;
        let traits = self.parse_trait_suffix()?;

        self.match_kind(TokenKind::OpenBrace)?;
        let mut fields = Vec::new();
        loop {
            fields.push(self.parse_union_field()?);
            if !self.list_continues(TokenKind::CloseBrace)? {
                break;
            }
        }
        self.match_kind(TokenKind::CloseBrace)?;

        Ok(UnionDecl {
            keyword,
            name,
            traits,
            body: UnionBody { fields },
        })
    }

    /// ```text
    /// UnionField := Id ('(' Arg (',' Arg)* ','? ')')? String?
    /// ```
    fn parse_union_field(&mut self) -> Result<UnionField, Message> {
        let name = self.parse_identifier()?;

        let mut arguments = Vec::new();
        if self.peek_kind(1) == TokenKind::OpenParen {
            self.advance()?;
            loop {
                arguments.push(self.parse_argument()?);
                if !self.list_continues(TokenKind::CloseParen)? {
                    break;
                }
            }
            self.match_kind(TokenKind::CloseParen)?;
        }

        let display_format = self.parse_display_format()?;

        Ok(UnionField {
            name,
            arguments,
            display_format,
        })
    }

    /// ```text
    /// StructDecl := 'struct' Id TraitSuffix? '{' (Arg (',' Arg)* ','?)? '}'
    /// ```
    fn parse_struct_decl(&mut self) -> Result<StructDecl, Message> {
        let keyword = self.match_kind(TokenKind::KeywordStruct)?;
        let name = self.parse_identifier()?;
        let traits = self.parse_trait_suffix()?;

        self.match_kind(TokenKind::OpenBrace)?;
        let mut members = Vec::new();
        if self.peek_kind(1) != TokenKind::CloseBrace {
            loop {
                members.push(self.parse_argument()?);
                if !self.list_continues(TokenKind::CloseBrace)? {
                    break;
                }
            }
        }
        self.match_kind(TokenKind::CloseBrace)?;

        Ok(StructDecl {
            keyword,
            name,
            traits,
            body: StructBody { members },
        })
    }

    /// ```text
    /// Arg := Id ':' Id
    /// ```
    fn parse_argument(&mut self) -> Result<Argument, Message> {
        let name = self.parse_identifier()?;
        self.match_kind(TokenKind::Colon)?;
        let type_ref = TypeRef::new(self.match_kind(TokenKind::Identifier)?);

        Ok(Argument { name, type_ref })
    }

    /// ```text
    /// TraitSuffix := '[' Id (',' Id)* ','? ']'
    /// ```
    fn parse_trait_suffix(&mut self) -> Result<TraitList, Message> {
        let mut traits = Vec::new();
        if self.peek_kind(1) == TokenKind::OpenBracket {
            self.advance()?;
            loop {
                traits.push(self.parse_identifier()?);
                if !self.list_continues(TokenKind::CloseBracket)? {
                    break;
                }
            }
            self.match_kind(TokenKind::CloseBracket)?;
        }
        Ok(TraitList { traits })
    }

    fn parse_display_format(&mut self) -> Result<Option<StringLiteral>, Message> {
        match self.peek_kind(1) {
            TokenKind::StringLiteral => Ok(Some(StringLiteral::new(self.advance()?))),
            _ => Ok(None),
        }
    }

    fn parse_identifier(&mut self) -> Result<Identifier, Message> {
        Ok(Identifier::new(self.match_kind(TokenKind::Identifier)?))
    }
}
