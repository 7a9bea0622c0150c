//! Generate C++ headers and sources from surface declarations.
//!
//! Each declaration produces a type definition in the header. The traits
//! listed after the declaration name add operators: declarations of them go
//! in the header, and definitions in the source file.

use itertools::Itertools;
use std::fmt::{self, Write};

use crate::cpp::{string_literal, BlockId, CppBlock, CppFile, StdHeader};
use crate::reporting::{closest_name, CodegenMessage, FormatError};
use crate::surface::{EnumDecl, SourceFile, StructDecl, TypeDecl, UnionDecl, UnionField};

/// The finalized contents of a generated header and source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub header: String,
    pub source: String,
}

/// Generate the header `<file_stem>.hpp` and source `<file_stem>.cpp` for a
/// source file.
pub fn generate(source_file: &SourceFile, file_stem: &str) -> Result<Artifacts, CodegenMessage> {
    let mut context = Context::new(file_stem);
    context.compile_source_file(source_file)?;
    Ok(context.finish())
}

/// The include guard of the header generated for `file_stem`.
pub fn include_guard(file_stem: &str) -> String {
    let mut guard = file_stem
        .chars()
        .map(|ch| if ch.is_ascii_alphabetic() { ch } else { '_' })
        .collect::<String>();
    guard.push_str("__");
    guard
}

/// Traits that can be requested for a kind of declaration.
trait DeclTrait: Copy + PartialEq + Sized {
    const NAMES: &'static [&'static str];

    fn from_name(name: &str) -> Option<Self>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum EnumTrait {
    In,
    Out,
}

impl DeclTrait for EnumTrait {
    const NAMES: &'static [&'static str] = &["In", "Out"];

    fn from_name(name: &str) -> Option<EnumTrait> {
        match name {
            "In" => Some(EnumTrait::In),
            "Out" => Some(EnumTrait::Out),
            _ => None,
        }
    }
}

/// Traits of unions and structs.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum RecordTrait {
    Eq,
    Out,
}

impl DeclTrait for RecordTrait {
    const NAMES: &'static [&'static str] = &["Eq", "Out"];

    fn from_name(name: &str) -> Option<RecordTrait> {
        match name {
            "Eq" => Some(RecordTrait::Eq),
            "Out" => Some(RecordTrait::Out),
            _ => None,
        }
    }
}

/// Look up the traits requested by a declaration, in order.
fn resolve_traits<T: DeclTrait>(
    decl: &TypeDecl,
    decl_kind: &'static str,
) -> Result<Vec<T>, CodegenMessage> {
    let names = &decl.traits().traits;
    let mut resolved = Vec::with_capacity(names.len());

    // `resolved[i]` is the trait named by `names[i]`
    for name in names {
        let r#trait = T::from_name(name.text()).ok_or_else(|| CodegenMessage::InvalidTrait {
            range: name.range(),
            position: name.position(),
            trait_name: name.text().to_owned(),
            decl_kind,
            decl_name: decl.name().text().to_owned(),
            decl_range: decl.head_range(),
            valid_traits: T::NAMES,
            suggestion: closest_name(name.text(), T::NAMES),
        })?;

        if let Some(first) = resolved.iter().position(|other| *other == r#trait) {
            return Err(CodegenMessage::DuplicateTrait {
                range: name.range(),
                position: name.position(),
                first_range: names[first].range(),
                trait_name: name.text().to_owned(),
            });
        }

        resolved.push(r#trait);
    }

    Ok(resolved)
}

/// Render text with `write!`.
fn render(f: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut text = String::new();
    f(&mut text).expect("writing to a `String` cannot fail");
    text
}

/// A `struct` in the header, whose body can be appended to.
#[derive(Copy, Clone)]
struct Record {
    block: BlockId,
    body: usize,
}

pub struct Context {
    file_stem: String,
    header: CppFile,
    source: CppFile,
}

impl Context {
    pub fn new(file_stem: &str) -> Context {
        Context {
            file_stem: file_stem.to_owned(),
            header: CppFile::new(),
            source: CppFile::new(),
        }
    }

    pub fn compile_source_file(&mut self, source_file: &SourceFile) -> Result<(), CodegenMessage> {
        let include = format!("#include \"{}.hpp\"\n\n", self.file_stem);
        self.source.add_block(CppBlock::new(include));

        for decl in &source_file.type_decls {
            self.compile_type_decl(decl)?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Artifacts {
        self.header.set_include_guard(include_guard(&self.file_stem));

        Artifacts {
            header: self.header.finalize(),
            source: self.source.finalize(),
        }
    }

    fn compile_type_decl(&mut self, decl: &TypeDecl) -> Result<(), CodegenMessage> {
        match decl {
            TypeDecl::Enum(enum_decl) => {
                let traits = resolve_traits(decl, "enum")?;
                self.compile_enum(enum_decl, &traits);
                Ok(())
            }
            TypeDecl::Union(union_decl) => {
                let traits = resolve_traits(decl, "union")?;
                self.compile_union(union_decl, &traits)
            }
            TypeDecl::Struct(struct_decl) => {
                let traits = resolve_traits(decl, "struct")?;
                self.compile_struct(struct_decl, &traits);
                Ok(())
            }
        }
    }

    /// Add a `struct` definition to the header.
    fn add_record(&mut self, name: &str, body: String) -> Record {
        let mut block = CppBlock::new(format!("struct {name} {{\n"));
        let body = block.add_child(CppBlock::new(body));
        block.add_child(CppBlock::new("};\n\n"));

        Record {
            block: self.header.add_block(block),
            body,
        }
    }

    fn declare_eq(&mut self, record: Record, name: &str) {
        let declaration = format!("  bool operator==(const {name} &other) const;\n");
        let block = self.header.block_mut(record.block);
        block.child_mut(record.body).push_str(&declaration);
    }

    fn declare_out(&mut self, name: &str) {
        self.header.add_include(StdHeader::Ostream);
        self.header.add_block(CppBlock::new(format!(
            "std::ostream &operator<<(std::ostream &os, const {name} &obj);\n\n"
        )));
    }

    fn compile_enum(&mut self, decl: &EnumDecl, traits: &[EnumTrait]) {
        let name = decl.name.text();

        self.header.add_block(CppBlock::new(render(|out| {
            writeln!(out, "enum class {name} {{")?;
            for field in &decl.body.fields {
                writeln!(out, "  {},", field.name.text())?;
            }
            writeln!(out, "}};")?;
            writeln!(out)
        })));

        for r#trait in traits {
            match r#trait {
                EnumTrait::In => self.compile_enum_in(decl),
                EnumTrait::Out => self.compile_enum_out(decl),
            }
        }
    }

    /// Parse enum values from their display text.
    fn compile_enum_in(&mut self, decl: &EnumDecl) {
        let name = decl.name.text();
        let table = format!("kStrTo{name}");

        self.header.add_include(StdHeader::Istream);
        self.header.add_block(CppBlock::new(format!(
            "std::istream &operator>>(std::istream &is, {name} &obj);\n\n"
        )));

        self.source.add_include(StdHeader::Map);
        self.source.add_include(StdHeader::String);
        self.source.add_block(CppBlock::new(render(|out| {
            writeln!(out, "static const std::map<std::string, {name}> {table} = {{")?;
            for field in &decl.body.fields {
                let text = string_literal(field.display_text());
                writeln!(out, "  {{{text}, {name}::{}}},", field.name.text())?;
            }
            writeln!(out, "}};")?;
            writeln!(out)?;
            writeln!(out, "std::istream &operator>>(std::istream &is, {name} &obj) {{")?;
            writeln!(out, "  std::string str;")?;
            writeln!(out, "  is >> str;")?;
            writeln!(out, "  obj = {table}.at(str);")?;
            writeln!(out, "  return is;")?;
            writeln!(out, "}}")?;
            writeln!(out)
        })));
    }

    /// Print enum values as their display text.
    fn compile_enum_out(&mut self, decl: &EnumDecl) {
        let name = decl.name.text();
        let table = format!("k{name}ToStr");

        self.declare_out(name);

        self.source.add_include(StdHeader::Cstddef);
        self.source.add_include(StdHeader::String);
        self.source.add_block(CppBlock::new(render(|out| {
            writeln!(out, "static const std::string {table}[] = {{")?;
            for field in &decl.body.fields {
                writeln!(out, "  {},", string_literal(field.display_text()))?;
            }
            writeln!(out, "}};")?;
            writeln!(out)?;
            writeln!(out, "std::ostream &operator<<(std::ostream &os, const {name} &obj) {{")?;
            writeln!(out, "  os << {table}[static_cast<std::size_t>(obj)];")?;
            writeln!(out, "  return os;")?;
            writeln!(out, "}}")?;
            writeln!(out)
        })));
    }

    fn compile_union(
        &mut self,
        decl: &UnionDecl,
        traits: &[RecordTrait],
    ) -> Result<(), CodegenMessage> {
        let name = decl.name.text();
        let fields = &decl.body.fields;

        let body = render(|out| {
            writeln!(out, "  enum Type {{")?;
            writeln!(out, "    Undef,")?;
            for field in fields {
                writeln!(out, "    {}_t,", field.name.text())?;
            }
            writeln!(out, "  }} type;")?;

            for field in fields.iter().filter(|field| !field.arguments.is_empty()) {
                writeln!(out, "  struct {}_d {{", field.name.text())?;
                for arg in &field.arguments {
                    writeln!(out, "    {} {};", arg.type_ref.text(), arg.name.text())?;
                }
                writeln!(out, "  }};")?;
            }

            writeln!(out, "  union {{")?;
            for field in fields.iter().filter(|field| !field.arguments.is_empty()) {
                let field_name = field.name.text();
                writeln!(out, "    {field_name}_d {field_name};")?;
            }
            writeln!(out, "  }} data;")?;

            writeln!(out, "  {name}(Type type = Undef): type(type) {{}}")?;
            for field in fields {
                let field_name = field.name.text();
                let params = field
                    .arguments
                    .iter()
                    .map(|arg| format!("{} {}", arg.type_ref.text(), arg.name.text()))
                    .join(", ");

                writeln!(out, "  static {name} {field_name}({params}) {{")?;
                writeln!(out, "    {name} obj({field_name}_t);")?;
                for arg in &field.arguments {
                    let arg_name = arg.name.text();
                    writeln!(out, "    obj.data.{field_name}.{arg_name} = {arg_name};")?;
                }
                writeln!(out, "    return obj;")?;
                writeln!(out, "  }}")?;
            }
            Ok(())
        });
        let record = self.add_record(name, body);

        for r#trait in traits {
            match r#trait {
                RecordTrait::Eq => self.compile_union_eq(decl, record),
                RecordTrait::Out => self.compile_union_out(decl)?,
            }
        }
        Ok(())
    }

    /// Compare tags, then the arguments of the active field.
    fn compile_union_eq(&mut self, decl: &UnionDecl, record: Record) {
        let name = decl.name.text();

        self.declare_eq(record, name);
        self.source.add_block(CppBlock::new(render(|out| {
            writeln!(out, "bool {name}::operator==(const {name} &other) const {{")?;
            writeln!(out, "  if (type != other.type) return false;")?;
            writeln!(out, "  switch (type) {{")?;
            for field in decl.body.fields.iter().filter(|f| !f.arguments.is_empty()) {
                let field_name = field.name.text();
                let comparisons = field.arguments.iter().map(|arg| {
                    let arg_name = arg.name.text();
                    format!("data.{field_name}.{arg_name} == other.data.{field_name}.{arg_name}")
                });
                writeln!(out, "  case {name}::{field_name}_t:")?;
                writeln!(out, "    return {};", comparisons.format("\n      && "))?;
            }
            writeln!(out, "  default:")?;
            writeln!(out, "    return true;")?;
            writeln!(out, "  }}")?;
            writeln!(out, "}}")?;
            writeln!(out)
        })));
    }

    /// Print the display text of the active field, with its arguments
    /// interpolated.
    fn compile_union_out(&mut self, decl: &UnionDecl) -> Result<(), CodegenMessage> {
        let name = decl.name.text();

        let mut branches = Vec::with_capacity(decl.body.fields.len());
        for field in &decl.body.fields {
            let operands = expand_format(field).map_err(|error| {
                let (range, position) = match &field.display_format {
                    Some(format) => (format.range(), format.position()),
                    None => (field.name.range(), field.name.position()),
                };
                CodegenMessage::InvalidFormat {
                    range,
                    position,
                    field_name: field.name.text().to_owned(),
                    error,
                }
            })?;
            branches.push((field.name.text(), operands));
        }

        self.declare_out(name);
        self.source.add_block(CppBlock::new(render(|out| {
            writeln!(out, "std::ostream &operator<<(std::ostream &os, const {name} &obj) {{")?;
            writeln!(out, "  switch (obj.type) {{")?;
            for (field_name, operands) in &branches {
                writeln!(out, "  case {name}::{field_name}_t:")?;
                writeln!(out, "    os << {operands};")?;
                writeln!(out, "    break;")?;
            }
            writeln!(out, "  default:")?;
            writeln!(out, "    break;")?;
            writeln!(out, "  }}")?;
            writeln!(out, "  return os;")?;
            writeln!(out, "}}")?;
            writeln!(out)
        })));

        Ok(())
    }

    fn compile_struct(&mut self, decl: &StructDecl, traits: &[RecordTrait]) {
        let name = decl.name.text();
        let members = &decl.body.members;

        let body = render(|out| {
            writeln!(out, "  {name}() = default;")?;
            if !members.is_empty() {
                let params = members
                    .iter()
                    .map(|member| format!("{} {}", member.type_ref.text(), member.name.text()));
                let inits = members.iter().map(|member| {
                    let member_name = member.name.text();
                    format!("{member_name}({member_name})")
                });
                writeln!(
                    out,
                    "  {name}({}): {} {{}}",
                    params.format(", "),
                    inits.format(", "),
                )?;
            }
            for member in members {
                writeln!(out, "  {} {};", member.type_ref.text(), member.name.text())?;
            }
            Ok(())
        });
        let record = self.add_record(name, body);

        for r#trait in traits {
            match r#trait {
                RecordTrait::Eq => self.compile_struct_eq(decl, record),
                RecordTrait::Out => self.compile_struct_out(decl),
            }
        }
    }

    fn compile_struct_eq(&mut self, decl: &StructDecl, record: Record) {
        let name = decl.name.text();
        let members = &decl.body.members;

        self.declare_eq(record, name);
        self.source.add_block(CppBlock::new(render(|out| {
            writeln!(out, "bool {name}::operator==(const {name} &other) const {{")?;
            if members.is_empty() {
                writeln!(out, "  return true;")?;
            } else {
                let comparisons = members.iter().map(|member| {
                    let member_name = member.name.text();
                    format!("{member_name} == other.{member_name}")
                });
                writeln!(out, "  return {};", comparisons.format("\n      && "))?;
            }
            writeln!(out, "}}")?;
            writeln!(out)
        })));
    }

    fn compile_struct_out(&mut self, decl: &StructDecl) {
        let name = decl.name.text();
        let members = &decl.body.members;

        self.declare_out(name);
        self.source.add_block(CppBlock::new(render(|out| {
            writeln!(out, "std::ostream &operator<<(std::ostream &os, const {name} &obj) {{")?;
            writeln!(out, "  os << \"{{ \";")?;
            for (index, member) in members.iter().enumerate() {
                let member_name = member.name.text();
                let separator = if index + 1 < members.len() { " << \", \"" } else { "" };
                writeln!(out, "  os << \"{member_name}: \" << obj.{member_name}{separator};")?;
            }
            writeln!(out, "  os << \" }}\";")?;
            writeln!(out, "  return os;")?;
            writeln!(out, "}}")?;
            writeln!(out)
        })));
    }
}

/// Expand the display text of a union field into the operands of a C++
/// `<<` chain.
///
/// The text between each pair of braces is ignored: the `n`th interpolation
/// renders the `n`th argument of the field.
fn expand_format(field: &UnionField) -> Result<String, FormatError> {
    let field_name = field.name.text();
    let mut operands = Vec::new();
    let mut literal = String::new();
    let mut in_interpolation = false;
    let mut arguments = field.arguments.iter();

    for ch in field.display_text().chars() {
        match (ch, in_interpolation) {
            ('{', false) => {
                if !literal.is_empty() {
                    operands.push(string_literal(&std::mem::take(&mut literal)));
                }
                in_interpolation = true;
            }
            ('{', true) => return Err(FormatError::NestedInterpolation),
            ('}', true) => {
                let arg = arguments.next().ok_or(FormatError::TooManyInterpolations {
                    arguments: field.arguments.len(),
                })?;
                operands.push(format!("obj.data.{field_name}.{}", arg.name.text()));
                in_interpolation = false;
            }
            ('}', false) => return Err(FormatError::UnopenedInterpolation),
            (_, true) => {}
            (ch, false) => literal.push(ch),
        }
    }

    if in_interpolation {
        return Err(FormatError::UnclosedInterpolation);
    }
    if !literal.is_empty() || operands.is_empty() {
        operands.push(string_literal(&literal));
    }

    Ok(operands.join(" << "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::FileId;
    use crate::reporting::Message;

    fn parse(source: &str) -> SourceFile {
        SourceFile::parse(FileId::try_from(1).unwrap(), source).unwrap()
    }

    fn compile(source: &str) -> Result<Artifacts, CodegenMessage> {
        generate(&parse(source), "game")
    }

    fn union_field(source: &str) -> UnionField {
        let file = parse(&format!("union U {{ {source} }}"));
        match file.type_decls.into_iter().next() {
            Some(TypeDecl::Union(decl)) => decl.body.fields.into_iter().next().unwrap(),
            decl => panic!("expected a union, found {decl:?}"),
        }
    }

    #[test]
    fn include_guards() {
        assert_eq!(include_guard("game"), "game__");
        assert_eq!(include_guard("tests/game-2.v1"), "tests_game___v___");
    }

    #[test]
    fn empty_source_file() {
        let artifacts = compile("").unwrap();
        assert_eq!(artifacts.header, "#ifndef game__\n#define game__\n\n\n#endif\n");
        assert_eq!(artifacts.source, "#include \"game.hpp\"\n\n");
    }

    #[test]
    fn enum_without_traits() {
        let artifacts = compile("enum Direction { N, E, S, W }").unwrap();
        assert_eq!(
            artifacts.header,
            "#ifndef game__\n#define game__\n\n\
             enum class Direction {\n  N,\n  E,\n  S,\n  W,\n};\n\n\
             \n#endif\n",
        );
        assert_eq!(artifacts.source, "#include \"game.hpp\"\n\n");
    }

    #[test]
    fn enum_out() {
        let artifacts = compile("enum Direction [Out] { N, E, S, W }").unwrap();

        assert!(artifacts.header.contains("#include <ostream>\n"));
        assert!(artifacts.header.contains(
            "std::ostream &operator<<(std::ostream &os, const Direction &obj);\n"
        ));
        assert_eq!(
            artifacts.source,
            "#include <cstddef>\n#include <string>\n\n\
             #include \"game.hpp\"\n\n\
             static const std::string kDirectionToStr[] = {\n  \"N\",\n  \"E\",\n  \"S\",\n  \"W\",\n};\n\n\
             std::ostream &operator<<(std::ostream &os, const Direction &obj) {\n\
             \x20 os << kDirectionToStr[static_cast<std::size_t>(obj)];\n\
             \x20 return os;\n\
             }\n\n",
        );
    }

    #[test]
    fn enum_in_and_out_tables_agree() {
        let artifacts =
            compile(r#"enum Direction [In, Out] { N "north", E "east", S, W }"#).unwrap();

        assert!(artifacts.header.contains("#include <istream>\n#include <ostream>\n"));
        assert!(artifacts
            .header
            .contains("std::istream &operator>>(std::istream &is, Direction &obj);\n"));
        assert!(artifacts.source.contains(
            "static const std::map<std::string, Direction> kStrToDirection = {\n\
             \x20 {\"north\", Direction::N},\n\
             \x20 {\"east\", Direction::E},\n\
             \x20 {\"S\", Direction::S},\n\
             \x20 {\"W\", Direction::W},\n\
             };\n"
        ));
        assert!(artifacts
            .source
            .contains("  \"north\",\n  \"east\",\n  \"S\",\n  \"W\",\n"));
        assert!(artifacts.source.contains("  obj = kStrToDirection.at(str);\n"));
        assert!(artifacts
            .source
            .contains("#include <cstddef>\n#include <map>\n#include <string>\n"));
    }

    #[test]
    fn union_shape() {
        let artifacts = compile(
            "union Action { Move(dir: Direction), Shoot(dir: Direction, strength: int), Wait }",
        )
        .unwrap();

        assert!(artifacts.header.contains(
            "struct Action {\n\
             \x20 enum Type {\n    Undef,\n    Move_t,\n    Shoot_t,\n    Wait_t,\n  } type;\n\
             \x20 struct Move_d {\n    Direction dir;\n  };\n\
             \x20 struct Shoot_d {\n    Direction dir;\n    int strength;\n  };\n\
             \x20 union {\n    Move_d Move;\n    Shoot_d Shoot;\n  } data;\n\
             \x20 Action(Type type = Undef): type(type) {}\n"
        ));
        assert!(artifacts.header.contains(
            "  static Action Shoot(Direction dir, int strength) {\n\
             \x20   Action obj(Shoot_t);\n\
             \x20   obj.data.Shoot.dir = dir;\n\
             \x20   obj.data.Shoot.strength = strength;\n\
             \x20   return obj;\n\
             \x20 }\n"
        ));
        assert!(artifacts.header.contains(
            "  static Action Wait() {\n    Action obj(Wait_t);\n    return obj;\n  }\n};\n"
        ));
        assert!(!artifacts.header.contains("Wait_d"));
    }

    #[test]
    fn union_out() {
        let artifacts =
            compile(r#"union Action [Out] { Move(dir: Direction) "MOVE {}", Wait "WAIT" }"#)
                .unwrap();

        assert!(artifacts
            .header
            .contains("std::ostream &operator<<(std::ostream &os, const Action &obj);\n"));
        assert!(artifacts.source.contains(
            "std::ostream &operator<<(std::ostream &os, const Action &obj) {\n\
             \x20 switch (obj.type) {\n\
             \x20 case Action::Move_t:\n\
             \x20   os << \"MOVE \" << obj.data.Move.dir;\n\
             \x20   break;\n\
             \x20 case Action::Wait_t:\n\
             \x20   os << \"WAIT\";\n\
             \x20   break;\n\
             \x20 default:\n\
             \x20   break;\n\
             \x20 }\n\
             \x20 return os;\n\
             }\n"
        ));
    }

    #[test]
    fn union_eq() {
        let artifacts = compile(
            "union Action [Eq] { Move(dir: Direction), Shoot(dir: Direction, strength: int), Wait }",
        )
        .unwrap();

        assert!(artifacts
            .header
            .contains("  bool operator==(const Action &other) const;\n};\n"));
        assert_eq!(
            artifacts.source,
            "#include \"game.hpp\"\n\n\
             bool Action::operator==(const Action &other) const {\n\
             \x20 if (type != other.type) return false;\n\
             \x20 switch (type) {\n\
             \x20 case Action::Move_t:\n\
             \x20   return data.Move.dir == other.data.Move.dir;\n\
             \x20 case Action::Shoot_t:\n\
             \x20   return data.Shoot.dir == other.data.Shoot.dir\n\
             \x20     && data.Shoot.strength == other.data.Shoot.strength;\n\
             \x20 default:\n\
             \x20   return true;\n\
             \x20 }\n\
             }\n\n",
        );
    }

    #[test]
    fn eq_is_declared_inside_the_struct_after_out() {
        let artifacts = compile("union Action [Out, Eq] { Wait }").unwrap();
        let eq = artifacts.header.find("bool operator==").unwrap();
        let close = artifacts.header.find("};\n").unwrap();
        let out = artifacts.header.find("std::ostream &operator<<").unwrap();
        assert!(eq < close && close < out);
    }

    #[test]
    fn struct_shape_and_traits() {
        let artifacts = compile("struct Coord [Eq, Out] { x: int, y: int }").unwrap();

        assert!(artifacts.header.contains(
            "struct Coord {\n\
             \x20 Coord() = default;\n\
             \x20 Coord(int x, int y): x(x), y(y) {}\n\
             \x20 int x;\n\
             \x20 int y;\n\
             \x20 bool operator==(const Coord &other) const;\n\
             };\n"
        ));
        assert!(artifacts.source.contains(
            "bool Coord::operator==(const Coord &other) const {\n\
             \x20 return x == other.x\n\
             \x20     && y == other.y;\n\
             }\n"
        ));
        assert!(artifacts.source.contains(
            "  os << \"{ \";\n\
             \x20 os << \"x: \" << obj.x << \", \";\n\
             \x20 os << \"y: \" << obj.y;\n\
             \x20 os << \" }\";\n"
        ));
    }

    #[test]
    fn empty_struct() {
        let artifacts = compile("struct Unit [Eq] {}").unwrap();
        assert!(artifacts
            .header
            .contains("struct Unit {\n  Unit() = default;\n  bool operator==(const Unit &other) const;\n};\n"));
        assert!(artifacts.source.contains("  return true;\n"));
    }

    #[test]
    fn invalid_trait_names_the_trait() {
        match compile("enum Direction [Out, Bogus] { N }") {
            Err(error @ CodegenMessage::InvalidTrait { .. }) => {
                assert!(error.to_string().contains("Bogus"));
                let diagnostic = Message::from(error).to_diagnostic();
                assert!(diagnostic.message.contains("Bogus"));
            }
            result => panic!("expected an invalid trait error, found {result:?}"),
        }
    }

    #[test]
    fn invalid_trait_suggestions() {
        match compile("union Action [Eg] { Wait }") {
            Err(CodegenMessage::InvalidTrait {
                suggestion,
                valid_traits,
                ..
            }) => {
                assert_eq!(suggestion, Some("Eq"));
                assert_eq!(valid_traits, ["Eq", "Out"]);
            }
            result => panic!("expected an invalid trait error, found {result:?}"),
        }
        // `Eq` is not an enum trait
        assert!(matches!(
            compile("enum Direction [Eq] { N }"),
            Err(CodegenMessage::InvalidTrait { decl_kind: "enum", .. })
        ));
        assert!(matches!(
            compile("struct Coord [In] { x: int }"),
            Err(CodegenMessage::InvalidTrait { decl_kind: "struct", .. })
        ));
    }

    #[test]
    fn duplicate_traits_are_rejected() {
        match compile("enum Direction [Out, In, Out] { N }") {
            Err(CodegenMessage::DuplicateTrait {
                trait_name,
                range,
                first_range,
                ..
            }) => {
                assert_eq!(trait_name, "Out");
                assert!(first_range.start() < range.start());
            }
            result => panic!("expected a duplicate trait error, found {result:?}"),
        }
    }

    #[test]
    fn format_without_braces_is_literal() {
        let field = union_field(r#"Move(dir: Direction) "MOVE""#);
        assert_eq!(expand_format(&field), Ok("\"MOVE\"".to_owned()));

        let field = union_field("Wait");
        assert_eq!(expand_format(&field), Ok("\"Wait\"".to_owned()));

        let field = union_field(r#"Wait """#);
        assert_eq!(expand_format(&field), Ok("\"\"".to_owned()));
    }

    #[test]
    fn interpolation_contents_are_ignored() {
        for format in ["{}", "{dir}", "{anything at all}"] {
            let field = union_field(&format!(r#"Move(dir: Direction) "MOVE {format}!""#));
            assert_eq!(
                expand_format(&field),
                Ok("\"MOVE \" << obj.data.Move.dir << \"!\"".to_owned()),
            );
        }
    }

    #[test]
    fn interpolations_are_positional() {
        let field = union_field(r#"Shoot(dir: Direction, strength: int) "{b} {a}""#);
        assert_eq!(
            expand_format(&field),
            Ok("obj.data.Shoot.dir << \" \" << obj.data.Shoot.strength".to_owned()),
        );

        // Unused arguments are allowed
        let field = union_field(r#"Shoot(dir: Direction, strength: int) "SHOOT {}""#);
        assert_eq!(
            expand_format(&field),
            Ok("\"SHOOT \" << obj.data.Shoot.dir".to_owned()),
        );
    }

    #[test]
    fn enum_display_texts_are_escaped() {
        let artifacts =
            compile("enum Path [In, Out] { Win \"C:\\dir\\\", Tab \"a\\tb\", Lines \"a\nb\" }")
                .unwrap();

        assert!(artifacts.source.contains("  \"C:\\\\dir\\\\\",\n"));
        assert!(artifacts.source.contains("  \"a\\\\tb\",\n"));
        assert!(artifacts.source.contains("  \"a\\nb\",\n"));
        assert!(artifacts.source.contains("  {\"C:\\\\dir\\\\\", Path::Win},\n"));
        assert!(artifacts.source.contains("  {\"a\\nb\", Path::Lines},\n"));
        assert!(!artifacts.source.contains("a\nb"));
    }

    #[test]
    fn union_format_literals_are_escaped() {
        let field = union_field("Cd(dir: Path) \"cd C:\\{}\\\"");
        assert_eq!(
            expand_format(&field),
            Ok("\"cd C:\\\\\" << obj.data.Cd.dir << \"\\\\\"".to_owned()),
        );

        let field = union_field("Wait \"WAIT\n\"");
        assert_eq!(expand_format(&field), Ok("\"WAIT\\n\"".to_owned()));
    }

    #[test]
    fn malformed_formats() {
        let cases = [
            (r#"Move(dir: Direction) "MOVE {dir""#, FormatError::UnclosedInterpolation),
            (r#"Move(dir: Direction) "MOVE }""#, FormatError::UnopenedInterpolation),
            (r#"Move(dir: Direction) "{{dir}}""#, FormatError::NestedInterpolation),
            (
                r#"Move(dir: Direction) "{} {}""#,
                FormatError::TooManyInterpolations { arguments: 1 },
            ),
            (r#"Wait "WAIT {}""#, FormatError::TooManyInterpolations { arguments: 0 }),
        ];

        for (source, expected) in cases {
            assert_eq!(expand_format(&union_field(source)), Err(expected), "{source}");
        }
    }

    #[test]
    fn malformed_formats_are_reported_for_out() {
        match compile(r#"union Action [Out] { Move(dir: Direction) "MOVE {dir" }"#) {
            Err(CodegenMessage::InvalidFormat {
                field_name, error, ..
            }) => {
                assert_eq!(field_name, "Move");
                assert_eq!(error, FormatError::UnclosedInterpolation);
            }
            result => panic!("expected an invalid format error, found {result:?}"),
        }

        // Formats are only expanded for `Out`
        assert!(compile(r#"union Action [Eq] { Move(dir: Direction) "MOVE {dir" }"#).is_ok());
    }
}
