//! Arena-backed XML tree.
//!
//! Nodes live in a single `Vec` owned by the [`Document`] and are addressed by
//! [`NodeId`]. Index 0 is the document node; its only element child is the
//! root element. Detached nodes stay in the arena until the document is
//! dropped, which keeps ids stable and makes cloning the whole tree (used to
//! stage mutations) a plain `Vec` copy.
//!
//! Only elements and text are modelled. Attributes, comments, processing
//! instructions and namespace declarations are dropped on parse, and
//! whitespace-only text between elements is not preserved.

use std::io;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::{partial_escape, unescape};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{ParseError, PathError};
use crate::path::PathExpr;

/// Handle to a node inside one [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(String),
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The `<?xml ...?>` declaration of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl Declaration {
    pub fn new(version: impl Into<String>, encoding: Option<&str>) -> Self {
        Self {
            version: version.into(),
            encoding: encoding.map(str::to_string),
            standalone: None,
        }
    }
}

/// A mutable in-memory XML document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    declaration: Option<Declaration>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document with no declaration and no root element.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            declaration: None,
        }
    }

    /// Parses a complete document with exactly one root element.
    pub fn parse(xml: &str) -> Result<Self, ParseError> {
        let mut document = Document::new();
        let (declaration, top_level) = document.parse_nodes(xml)?;

        let mut root = None;
        for id in top_level {
            match &document.nodes[id.0].kind {
                NodeKind::Element(_) if root.is_none() => root = Some(id),
                NodeKind::Element(_) => return Err(ParseError::MultipleRoots),
                _ => return Err(ParseError::TextOutsideRoot),
            }
        }
        let root = root.ok_or(ParseError::NoRoot)?;

        let document_node = document.document_node();
        document.append_child(document_node, root);
        document.declaration = declaration;
        Ok(document)
    }

    pub fn document_node(&self) -> NodeId {
        NodeId(0)
    }

    pub fn root_element(&self) -> Option<NodeId> {
        self.nodes[0]
            .children
            .iter()
            .copied()
            .find(|id| self.is_element(*id))
    }

    pub fn declaration(&self) -> Option<&Declaration> {
        self.declaration.as_ref()
    }

    pub fn set_declaration(&mut self, declaration: Declaration) {
        self.declaration = Some(declaration);
    }

    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node { document: self, id }
    }

    pub fn root(&self) -> Option<Node<'_>> {
        self.root_element().map(|id| self.node(id))
    }

    /// Element name, or `None` for text and the document node.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Element(_))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// All nodes below `id`, in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        self.push(NodeKind::Element(name.into()))
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    /// Appends `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old_parent) = self.nodes[child.0].parent {
            self.nodes[old_parent.0].children.retain(|id| *id != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Detaches `child` from `parent`. Returns false if it was not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let children = &mut self.nodes[parent.0].children;
        let Some(position) = children.iter().position(|id| *id == child) else {
            return false;
        };
        children.remove(position);
        self.nodes[child.0].parent = None;
        true
    }

    /// Replaces the content of `id` with the parsed fragment.
    pub fn set_inner_xml(&mut self, id: NodeId, fragment: &str) -> Result<(), ParseError> {
        let (_, nodes) = self.parse_nodes(fragment)?;
        for child in std::mem::take(&mut self.nodes[id.0].children) {
            self.nodes[child.0].parent = None;
        }
        for node in nodes {
            self.append_child(id, node);
        }
        Ok(())
    }

    /// Appends the parsed fragment after the existing content of `id`.
    pub fn append_inner_xml(&mut self, id: NodeId, fragment: &str) -> Result<(), ParseError> {
        let (_, nodes) = self.parse_nodes(fragment)?;
        for node in nodes {
            self.append_child(id, node);
        }
        Ok(())
    }

    /// Concatenated text of all descendants.
    pub fn inner_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => out.push_str(text),
            _ => {
                for child in &self.nodes[id.0].children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Markup of the node's children.
    pub fn inner_xml(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in &self.nodes[id.0].children {
            self.write_markup(*child, &mut out);
        }
        out
    }

    /// Markup of the node itself, including its own tags.
    pub fn outer_xml(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(id, &mut out);
        out
    }

    fn write_markup(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id.0];
        match &node.kind {
            NodeKind::Document => {
                for child in &node.children {
                    self.write_markup(*child, out);
                }
            }
            NodeKind::Text(text) => out.push_str(&partial_escape(text.as_str())),
            NodeKind::Element(name) if node.children.is_empty() => {
                out.push('<');
                out.push_str(name);
                out.push_str("/>");
            }
            NodeKind::Element(name) => {
                out.push('<');
                out.push_str(name);
                out.push('>');
                for child in &node.children {
                    self.write_markup(*child, out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
    }

    /// Serializes the whole document, declaration included, indented.
    pub fn to_xml_bytes(&self) -> io::Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        if let Some(declaration) = &self.declaration {
            writer
                .write_event(Event::Decl(BytesDecl::new(
                    &declaration.version,
                    declaration.encoding.as_deref(),
                    declaration.standalone.as_deref(),
                )))
                .map_err(io::Error::other)?;
        }
        for child in self.children(self.document_node()) {
            self.write_events(*child, &mut writer)?;
        }
        Ok(writer.into_inner())
    }

    pub fn to_xml_string(&self) -> io::Result<String> {
        let bytes = self.to_xml_bytes()?;
        String::from_utf8(bytes).map_err(io::Error::other)
    }

    fn write_events(&self, id: NodeId, writer: &mut Writer<Vec<u8>>) -> io::Result<()> {
        let node = &self.nodes[id.0];
        match &node.kind {
            NodeKind::Document => {}
            NodeKind::Text(text) => {
                writer
                    .write_event(Event::Text(BytesText::from_escaped(partial_escape(text.as_str()))))
                    .map_err(io::Error::other)?;
            }
            NodeKind::Element(name) if node.children.is_empty() => {
                writer
                    .write_event(Event::Empty(BytesStart::new(name.as_str())))
                    .map_err(io::Error::other)?;
            }
            NodeKind::Element(name) => {
                writer
                    .write_event(Event::Start(BytesStart::new(name.as_str())))
                    .map_err(io::Error::other)?;
                for child in &node.children {
                    self.write_events(*child, writer)?;
                }
                writer
                    .write_event(Event::End(BytesEnd::new(name.as_str())))
                    .map_err(io::Error::other)?;
            }
        }
        Ok(())
    }

    /// Parses `xml` into detached nodes owned by this document.
    ///
    /// Returns the declaration, if one was present, and the top-level nodes in
    /// order. Multiple top-level elements and top-level text are allowed here;
    /// [`Document::parse`] enforces the single-root rule.
    fn parse_nodes(&mut self, xml: &str) -> Result<(Option<Declaration>, Vec<NodeId>), ParseError> {
        let mut reader = Reader::from_str(xml);
        let mut declaration = None;
        let mut top_level: Vec<NodeId> = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| ParseError::Syntax {
                position: reader.buffer_position() as u64,
                message: e.to_string(),
            })?;
            match event {
                Event::Start(start) => {
                    let name = element_name(start.name().as_ref())?;
                    let id = self.create_element(name);
                    self.attach(id, &stack, &mut top_level);
                    stack.push(id);
                }
                Event::Empty(start) => {
                    let name = element_name(start.name().as_ref())?;
                    let id = self.create_element(name);
                    self.attach(id, &stack, &mut top_level);
                }
                Event::End(end) => {
                    let name = element_name(end.name().as_ref())?;
                    match stack.pop() {
                        Some(open) if self.name(open) == Some(name.as_str()) => {
                            self.prune_whitespace(open);
                        }
                        _ => return Err(ParseError::UnexpectedEnd(name)),
                    }
                }
                Event::Text(text) => {
                    let raw = String::from_utf8_lossy(&text);
                    let resolved = unescape(&raw).map_err(|e| ParseError::Syntax {
                        position: reader.buffer_position() as u64,
                        message: e.to_string(),
                    })?;
                    self.append_text(&resolved, &stack, &mut top_level);
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data).into_owned();
                    self.append_text(&text, &stack, &mut top_level);
                }
                Event::GeneralRef(reference) => {
                    let name = String::from_utf8_lossy(&reference).into_owned();
                    let resolved = resolve_reference(&name).ok_or(ParseError::UnknownEntity(name))?;
                    self.append_text(&resolved, &stack, &mut top_level);
                }
                Event::Decl(decl) => {
                    let version = decl
                        .version()
                        .map(|v| String::from_utf8_lossy(&v).into_owned())
                        .unwrap_or_else(|_| "1.0".to_string());
                    let encoding = decl
                        .encoding()
                        .and_then(|e| e.ok())
                        .map(|e| String::from_utf8_lossy(&e).into_owned());
                    let standalone = decl
                        .standalone()
                        .and_then(|s| s.ok())
                        .map(|s| String::from_utf8_lossy(&s).into_owned());
                    declaration = Some(Declaration {
                        version,
                        encoding,
                        standalone,
                    });
                }
                Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if let Some(open) = stack.pop() {
            let name = self.name(open).unwrap_or_default().to_string();
            return Err(ParseError::Unclosed(name));
        }

        top_level.retain(|id| !self.is_blank_text(*id));
        Ok((declaration, top_level))
    }

    fn attach(&mut self, id: NodeId, stack: &[NodeId], top_level: &mut Vec<NodeId>) {
        match stack.last() {
            Some(parent) => self.append_child(*parent, id),
            None => top_level.push(id),
        }
    }

    /// Appends text, merging it into a directly preceding text node.
    fn append_text(&mut self, text: &str, stack: &[NodeId], top_level: &mut Vec<NodeId>) {
        if text.is_empty() {
            return;
        }
        let previous = match stack.last() {
            Some(parent) => self.nodes[parent.0].children.last().copied(),
            None => top_level.last().copied(),
        };
        if let Some(previous) = previous {
            if let NodeKind::Text(existing) = &mut self.nodes[previous.0].kind {
                existing.push_str(text);
                return;
            }
        }
        let id = self.create_text(text);
        self.attach(id, stack, top_level);
    }

    fn is_blank_text(&self, id: NodeId) -> bool {
        matches!(&self.nodes[id.0].kind, NodeKind::Text(text) if text.trim().is_empty())
    }

    fn prune_whitespace(&mut self, id: NodeId) {
        let blank: Vec<NodeId> = self.nodes[id.0]
            .children
            .iter()
            .copied()
            .filter(|child| self.is_blank_text(*child))
            .collect();
        for child in blank {
            self.remove_child(id, child);
        }
    }

    /// Evaluates `expr` from the document node and returns every match.
    pub fn select(&self, expr: &str) -> Result<Vec<Node<'_>>, PathError> {
        self.node(self.document_node()).select(expr)
    }

    /// Evaluates `expr` from the document node and returns the first match.
    pub fn select_single(&self, expr: &str) -> Result<Option<Node<'_>>, PathError> {
        self.node(self.document_node()).select_single(expr)
    }
}

fn element_name(raw: &[u8]) -> Result<String, ParseError> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|_| ParseError::InvalidName(String::from_utf8_lossy(raw).into_owned()))
}

/// Whether `name` can be used as an element name.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

/// Resolves a predefined entity or character reference by name.
fn resolve_reference(name: &str) -> Option<String> {
    let resolved = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)?
        }
    };
    Some(resolved.to_string())
}

/// Borrowed view of one node.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    document: &'a Document,
    id: NodeId,
}

impl<'a> Node<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Element name; empty for text and the document node.
    pub fn name(&self) -> &'a str {
        self.document.name(self.id).unwrap_or_default()
    }

    pub fn children(&self) -> Vec<Node<'a>> {
        self.document
            .children(self.id)
            .iter()
            .map(|id| self.document.node(*id))
            .collect()
    }

    pub fn element_children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let document = self.document;
        document
            .children(self.id)
            .iter()
            .filter(move |id| document.is_element(**id))
            .map(move |id| document.node(*id))
    }

    pub fn inner_text(&self) -> String {
        self.document.inner_text(self.id)
    }

    pub fn inner_xml(&self) -> String {
        self.document.inner_xml(self.id)
    }

    pub fn outer_xml(&self) -> String {
        self.document.outer_xml(self.id)
    }

    pub fn select(&self, expr: &str) -> Result<Vec<Node<'a>>, PathError> {
        let path = PathExpr::parse(expr)?;
        Ok(path
            .evaluate(self.document, self.id)
            .into_iter()
            .map(|id| self.document.node(id))
            .collect())
    }

    pub fn select_single(&self, expr: &str) -> Result<Option<Node<'a>>, PathError> {
        Ok(self.select(expr)?.into_iter().next())
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("xml", &self.outer_xml())
            .finish()
    }
}
