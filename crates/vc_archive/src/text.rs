use core::fmt::{self, Write};

use crate::node::{ArchiveNode, NodeId};
use crate::tree::ArchiveTree;

// -----------------------------------------------------------------------------
// TextStyle

/// Layout options of the [`TextWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    /// Spaces per nesting level.
    pub indent_width: usize,
    /// Children of a node nested deeper than this are written on one line.
    pub inline_depth: usize,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            indent_width: 2,
            inline_depth: 2,
        }
    }
}

// -----------------------------------------------------------------------------
// TextWriter

/// Writes an [`ArchiveTree`] in its reference text form, a JSON document
/// shaped as `{ "root": <value> }`.
///
/// # Examples
///
/// ```
/// use vc_archive::{ArchiveTree, TextWriter};
///
/// let mut tree = ArchiveTree::new();
/// let root = tree.root();
/// let name = tree.key_mut(root, "name");
/// tree.set(name, "a \"quoted\" word");
///
/// let mut text = String::new();
/// TextWriter::new(&tree).write_document(&mut text).unwrap();
/// assert_eq!(text, "{ \"root\": {\n    \"name\": \"a \\\"quoted\\\" word\"\n  }\n}\n");
/// ```
pub struct TextWriter<'a> {
    tree: &'a ArchiveTree,
    style: TextStyle,
}

impl<'a> TextWriter<'a> {
    #[inline]
    pub fn new(tree: &'a ArchiveTree) -> Self {
        Self {
            tree,
            style: TextStyle::default(),
        }
    }

    #[inline]
    pub fn with_style(tree: &'a ArchiveTree, style: TextStyle) -> Self {
        Self { tree, style }
    }

    /// Writes the whole document, root wrapper included.
    pub fn write_document<W: Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        out.write_str("{ \"root\": ")?;
        self.write_node(out, self.tree.root(), false, 1)?;
        out.write_str("\n}\n")
    }

    /// Writes one value. `depth` is the nesting level of `id` itself.
    pub fn write_node<W: Write + ?Sized>(
        &self,
        out: &mut W,
        id: NodeId,
        inline: bool,
        depth: usize,
    ) -> fmt::Result {
        let inline_children = inline || depth > self.style.inline_depth;
        match self.tree.node(id) {
            ArchiveNode::Empty => out.write_str("null"),
            ArchiveNode::Integer(v) => write!(out, "{v}"),
            ArchiveNode::Float(v) if v.is_finite() => write!(out, "{v:?}"),
            ArchiveNode::Float(_) => out.write_str("null"),
            ArchiveNode::String(s) => write_escaped(out, s),
            ArchiveNode::Array(items) if items.is_empty() => out.write_str("[]"),
            ArchiveNode::Map(entries) if entries.is_empty() => out.write_str("{}"),
            ArchiveNode::Array(items) => {
                out.write_char('[')?;
                for (index, item) in items.iter().enumerate() {
                    self.separator(out, index, inline, depth)?;
                    self.write_node(out, *item, inline_children, depth + 1)?;
                }
                self.close(out, ']', inline, depth)
            }
            ArchiveNode::Map(entries) => {
                out.write_char('{')?;
                for (index, (key, item)) in entries.iter().enumerate() {
                    self.separator(out, index, inline, depth)?;
                    write_escaped(out, key)?;
                    out.write_str(": ")?;
                    self.write_node(out, *item, inline_children, depth + 1)?;
                }
                self.close(out, '}', inline, depth)
            }
        }
    }

    fn separator<W: Write + ?Sized>(
        &self,
        out: &mut W,
        index: usize,
        inline: bool,
        depth: usize,
    ) -> fmt::Result {
        if index > 0 {
            out.write_char(',')?;
        }
        if inline {
            if index > 0 {
                out.write_char(' ')?;
            }
            Ok(())
        } else {
            out.write_char('\n')?;
            self.indent(out, depth + 1)
        }
    }

    fn close<W: Write + ?Sized>(
        &self,
        out: &mut W,
        bracket: char,
        inline: bool,
        depth: usize,
    ) -> fmt::Result {
        if !inline {
            out.write_char('\n')?;
            self.indent(out, depth)?;
        }
        out.write_char(bracket)
    }

    fn indent<W: Write + ?Sized>(&self, out: &mut W, level: usize) -> fmt::Result {
        for _ in 0..level * self.style.indent_width {
            out.write_char(' ')?;
        }
        Ok(())
    }
}

fn write_escaped<W: Write + ?Sized>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for ch in s.chars() {
        match ch {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            '\u{08}' => out.write_str("\\b")?,
            '\u{0C}' => out.write_str("\\f")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

// -----------------------------------------------------------------------------
// Tests
