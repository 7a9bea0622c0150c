//! C++ files under construction.
//!
//! Generated code is accumulated as an ordered list of text blocks, along
//! with the standard library headers it depends on. Blocks stay addressable
//! after they are added, so that later passes can append to them.

use std::collections::BTreeSet;
use std::fmt;

/// Standard library headers that generated code may depend on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StdHeader {
    Cstddef,
    Istream,
    Map,
    Ostream,
    String,
}

impl StdHeader {
    pub fn name(self) -> &'static str {
        match self {
            StdHeader::Cstddef => "cstddef",
            StdHeader::Istream => "istream",
            StdHeader::Map => "map",
            StdHeader::Ostream => "ostream",
            StdHeader::String => "string",
        }
    }
}

impl fmt::Display for StdHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Quote `text` as a C++ string literal that evaluates to exactly `text`.
pub fn string_literal(text: &str) -> String {
    let mut literal = String::with_capacity(text.len() + 2);
    literal.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => literal.push_str("\\\\"),
            '"' => literal.push_str("\\\""),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            // Octal escapes end after three digits, hex escapes do not
            ch if ch.is_ascii_control() => literal.push_str(&format!("\\{:03o}", ch as u32)),
            ch => literal.push(ch),
        }
    }
    literal.push('"');
    literal
}

/// A chunk of generated text, followed by its children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CppBlock {
    text: String,
    children: Vec<CppBlock>,
}

impl CppBlock {
    pub fn new(text: impl Into<String>) -> CppBlock {
        CppBlock {
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Append text to this block, before any of its children.
    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Append a child block, returning its index.
    pub fn add_child(&mut self, child: CppBlock) -> usize {
        self.children.push(child);
        self.children.len() - 1
    }

    /// # Panics
    ///
    /// If `index` was not returned by [`CppBlock::add_child`] on this block.
    pub fn child_mut(&mut self, index: usize) -> &mut CppBlock {
        &mut self.children[index]
    }

    fn render(&self, output: &mut String) {
        output.push_str(&self.text);
        for child in &self.children {
            child.render(output);
        }
    }
}

impl fmt::Display for CppBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut output = String::new();
        self.render(&mut output);
        f.write_str(&output)
    }
}

/// The index of a block in a [`CppFile`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BlockId(usize);

/// A header or source file being generated.
#[derive(Debug, Clone, Default)]
pub struct CppFile {
    include_guard: Option<String>,
    includes: BTreeSet<StdHeader>,
    blocks: Vec<CppBlock>,
}

impl CppFile {
    pub fn new() -> CppFile {
        CppFile::default()
    }

    pub fn add_block(&mut self, block: CppBlock) -> BlockId {
        self.blocks.push(block);
        BlockId(self.blocks.len() - 1)
    }

    /// # Panics
    ///
    /// If `id` was returned by a different file.
    pub fn block_mut(&mut self, id: BlockId) -> &mut CppBlock {
        &mut self.blocks[id.0]
    }

    pub fn add_include(&mut self, header: StdHeader) {
        self.includes.insert(header);
    }

    pub fn set_include_guard(&mut self, guard: impl Into<String>) {
        self.include_guard = Some(guard.into());
    }

    /// Render the file: include guard, includes, then blocks in the order
    /// they were added.
    pub fn finalize(&self) -> String {
        let mut output = String::new();

        if let Some(guard) = &self.include_guard {
            output.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n"));
        }
        for header in &self.includes {
            output.push_str(&format!("#include <{header}>\n"));
        }
        if !self.includes.is_empty() {
            output.push('\n');
        }
        for block in &self.blocks {
            block.render(&mut output);
        }
        if self.include_guard.is_some() {
            output.push_str("\n#endif\n");
        }

        output
    }
}
