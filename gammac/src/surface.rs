//! Surface language.
//!
//! A source file is a flat list of type declarations:
//!
//! ```text
//! enum Direction [In, Out] { N, E, S, W }
//! union Action [Eq, Out] { Move(dir: Direction) "MOVE {dir}", Wait "WAIT" }
//! struct Coord [Eq] { x: int, y: int }
//! ```

use crate::files::FileId;
use crate::reporting::Message;
use crate::source::{FileRange, Position};

pub mod lexer;
pub mod parser;

use self::lexer::{Lexer, Token};
use self::parser::Parser;

/// A name, eg. of a declaration, field or trait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    token: Token,
}

impl Identifier {
    pub fn new(token: Token) -> Identifier {
        Identifier { token }
    }

    pub fn text(&self) -> &str {
        &self.token.lexeme
    }

    pub fn range(&self) -> FileRange {
        self.token.range
    }

    pub fn position(&self) -> Position {
        self.token.position
    }
}

/// A quoted string, with its quotes removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    token: Token,
}

impl StringLiteral {
    pub fn new(token: Token) -> StringLiteral {
        StringLiteral { token }
    }

    pub fn text(&self) -> &str {
        &self.token.lexeme
    }

    pub fn range(&self) -> FileRange {
        self.token.range
    }

    pub fn position(&self) -> Position {
        self.token.position
    }
}

/// A reference to a type, copied verbatim into the generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    token: Token,
}

impl TypeRef {
    pub fn new(token: Token) -> TypeRef {
        TypeRef { token }
    }

    pub fn text(&self) -> &str {
        &self.token.lexeme
    }
}

/// The traits requested for a declaration, eg. `[Eq, Out]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraitList {
    pub traits: Vec<Identifier>,
}

/// Type declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDecl {
    /// Enumerations, eg. `enum Direction { N, E, S, W }`.
    Enum(EnumDecl),
    /// Tagged unions, eg. `union Action { Move(dir: Direction), Wait }`.
    Union(UnionDecl),
    /// Plain records, eg. `struct Coord { x: int, y: int }`.
    Struct(StructDecl),
}

impl TypeDecl {
    pub fn name(&self) -> &Identifier {
        match self {
            TypeDecl::Enum(decl) => &decl.name,
            TypeDecl::Union(decl) => &decl.name,
            TypeDecl::Struct(decl) => &decl.name,
        }
    }

    pub fn traits(&self) -> &TraitList {
        match self {
            TypeDecl::Enum(decl) => &decl.traits,
            TypeDecl::Union(decl) => &decl.traits,
            TypeDecl::Struct(decl) => &decl.traits,
        }
    }

    /// The range from the declaration keyword up to the declaration name.
    pub fn head_range(&self) -> FileRange {
        let keyword = match self {
            TypeDecl::Enum(decl) => &decl.keyword,
            TypeDecl::Union(decl) => &decl.keyword,
            TypeDecl::Struct(decl) => &decl.keyword,
        };
        let name = self.name().range();
        FileRange::new(
            name.file_id(),
            keyword.range.byte_range().merge(name.byte_range()),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    pub keyword: Token,
    pub name: Identifier,
    pub traits: TraitList,
    pub body: EnumBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumBody {
    pub fields: Vec<EnumField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumField {
    pub name: Identifier,
    pub display_format: Option<StringLiteral>,
}

impl EnumField {
    /// The display format if one was given, otherwise the field name.
    pub fn display_text(&self) -> &str {
        display_text(&self.name, &self.display_format)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionDecl {
    pub keyword: Token,
    pub name: Identifier,
    pub traits: TraitList,
    pub body: UnionBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionBody {
    pub fields: Vec<UnionField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionField {
    pub name: Identifier,
    pub arguments: Vec<Argument>,
    pub display_format: Option<StringLiteral>,
}

impl UnionField {
    /// The display format if one was given, otherwise the field name.
    pub fn display_text(&self) -> &str {
        display_text(&self.name, &self.display_format)
    }
}

/// A named and typed value, eg. `dir: Direction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: Identifier,
    pub type_ref: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDecl {
    pub keyword: Token,
    pub name: Identifier,
    pub traits: TraitList,
    pub body: StructBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructBody {
    pub members: Vec<Argument>,
}

fn display_text<'a>(name: &'a Identifier, display_format: &'a Option<StringLiteral>) -> &'a str {
    match display_format {
        Some(format) => format.text(),
        None => name.text(),
    }
}

/// A parsed source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub type_decls: Vec<TypeDecl>,
}

impl SourceFile {
    /// Parse a source file, stopping at the first error.
    pub fn parse(file_id: FileId, source: &str) -> Result<SourceFile, Message> {
        let mut parser = Parser::new(Lexer::new(file_id, source))?;
        parser.parse_source_file()
    }
}
