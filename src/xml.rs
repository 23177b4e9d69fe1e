//! Namespace-aware XML tree for part markup surgery.
//!
//! WordprocessingML parts need more than event streaming: resolving tracked
//! changes detaches and renames elements in place, then writes the part back
//! out. This module parses a part into an arena-backed tree whose nodes carry
//! parent links and both forms of an element's name: the raw qualified name
//! as written (for byte-faithful serialization) and the resolved
//! (namespace URI, local name) pair (for queries that must not care which
//! prefix the document chose).

use crate::error::{Error, Result};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use quick_xml::writer::Writer;

/// Handle to a node in an [`XmlTree`].
///
/// Ids are minted by the tree that owns the node and are only meaningful
/// against that tree. Detaching a subtree leaves its ids valid but
/// unreachable from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A single element attribute, key kept as written.
#[derive(Debug, Clone)]
struct Attribute {
    raw_key: String,
    value: String,
}

#[derive(Debug, Clone)]
struct ElementData {
    raw_name: String,
    namespace: Option<String>,
    local_name: String,
    attributes: Vec<Attribute>,
    self_closing: bool,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element(ElementData),
    Text(String),
    CData(String),
    Comment(String),
    Pi(String),
    DocType(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An in-memory XML tree for one package part.
///
/// Created per parse call, mutated in place by the revision resolver, and
/// serialized back to bytes. Namespace prefix bindings declared on the
/// document element are captured so qualified queries and retags resolve
/// regardless of prefix choice.
#[derive(Debug, Clone)]
pub struct XmlTree {
    nodes: Vec<NodeData>,
    /// Top-level nodes in document order: the document element plus any
    /// surrounding comments, processing instructions, or whitespace.
    document: Vec<NodeId>,
    root: NodeId,
    /// Raw content of the XML declaration, between `<?` and `?>`.
    decl: Option<String>,
    default_ns: Option<String>,
    prefixes: Vec<(String, String)>,
}

impl XmlTree {
    /// Parse a decoded XML string into a tree.
    ///
    /// Fails with [`Error::MalformedMarkup`] on non-well-formed input and
    /// [`Error::UnboundNamespace`] when an element uses an undeclared prefix.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = NsReader::from_str(xml);

        let mut nodes: Vec<NodeData> = Vec::new();
        let mut document: Vec<NodeId> = Vec::new();
        let mut root: Option<NodeId> = None;
        let mut decl: Option<String> = None;
        let mut stack: Vec<NodeId> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let element = read_element(&reader, &e, false)?;
                    let id = attach(
                        &mut nodes,
                        &mut document,
                        &stack,
                        NodeKind::Element(element),
                    );
                    if stack.is_empty() && root.is_none() {
                        root = Some(id);
                    }
                    stack.push(id);
                }
                Event::Empty(e) => {
                    let element = read_element(&reader, &e, true)?;
                    let id = attach(
                        &mut nodes,
                        &mut document,
                        &stack,
                        NodeKind::Element(element),
                    );
                    if stack.is_empty() && root.is_none() {
                        root = Some(id);
                    }
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(e) => {
                    let text = e.unescape()?.into_owned();
                    attach(&mut nodes, &mut document, &stack, NodeKind::Text(text));
                }
                Event::CData(e) => {
                    let raw = String::from_utf8_lossy(&e).into_owned();
                    attach(&mut nodes, &mut document, &stack, NodeKind::CData(raw));
                }
                Event::Comment(e) => {
                    let raw = String::from_utf8_lossy(&e).into_owned();
                    attach(&mut nodes, &mut document, &stack, NodeKind::Comment(raw));
                }
                Event::PI(e) => {
                    let raw = String::from_utf8_lossy(&e).into_owned();
                    attach(&mut nodes, &mut document, &stack, NodeKind::Pi(raw));
                }
                Event::DocType(e) => {
                    let raw = String::from_utf8_lossy(&e).into_owned();
                    attach(&mut nodes, &mut document, &stack, NodeKind::DocType(raw));
                }
                Event::Decl(e) => {
                    decl = Some(String::from_utf8_lossy(&e).into_owned());
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(Error::MalformedMarkup(
                "unexpected end of input inside an open element".to_string(),
            ));
        }
        let root =
            root.ok_or_else(|| Error::MalformedMarkup("missing document element".to_string()))?;

        let mut tree = Self {
            nodes,
            document,
            root,
            decl,
            default_ns: None,
            prefixes: Vec::new(),
        };
        tree.collect_root_bindings();
        Ok(tree)
    }

    /// Decode part bytes (UTF-8 with or without BOM, BOM-tagged UTF-16) and
    /// parse the result.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self> {
        let content = decode_part_bytes(bytes)?;
        Self::parse(&content)
    }

    /// The document element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Ordered child nodes of `node`.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Local name of `node`, if it is an element.
    pub fn local_name(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element(el) => Some(&el.local_name),
            _ => None,
        }
    }

    /// Resolved namespace URI of `node`, if it is an element in a namespace.
    pub fn namespace(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element(el) => el.namespace.as_deref(),
            _ => None,
        }
    }

    /// All descendant elements of `node` matching the qualified name, in
    /// document order. `node` itself is never included; no match is an empty
    /// list, not an error.
    pub fn find_all(&self, node: NodeId, namespace: &str, local: &str) -> Vec<NodeId> {
        let mut matches = Vec::new();
        self.collect_matches(node, namespace, local, &mut matches);
        matches
    }

    fn collect_matches(&self, node: NodeId, namespace: &str, local: &str, out: &mut Vec<NodeId>) {
        for &child in &self.nodes[node.0].children {
            if let NodeKind::Element(el) = &self.nodes[child.0].kind {
                if el.namespace.as_deref() == Some(namespace) && el.local_name == local {
                    out.push(child);
                }
            }
            self.collect_matches(child, namespace, local, out);
        }
    }

    /// Concatenation of all text content in the subtree of `node`, in
    /// document order, ignoring element boundaries.
    pub fn text_of(&self, node: NodeId) -> String {
        let mut text = String::new();
        self.collect_text(node, &mut text);
        text
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Text(t) | NodeKind::CData(t) => out.push_str(t),
            _ => {}
        }
        for &child in &self.nodes[node.0].children {
            self.collect_text(child, out);
        }
    }

    /// Value of a namespaced attribute on `node`. Per XML rules an
    /// unprefixed attribute has no namespace, so pass `None` for those.
    pub fn attribute(&self, node: NodeId, namespace: Option<&str>, local: &str) -> Option<&str> {
        let NodeKind::Element(el) = &self.nodes[node.0].kind else {
            return None;
        };
        el.attributes.iter().find_map(|attr| {
            let (prefix, name) = match attr.raw_key.split_once(':') {
                Some((p, n)) => (Some(p), n),
                None => (None, attr.raw_key.as_str()),
            };
            if prefix == Some("xmlns") || attr.raw_key == "xmlns" {
                return None;
            }
            let attr_ns = prefix.and_then(|p| {
                self.prefixes
                    .iter()
                    .find(|(bound, _)| bound == p)
                    .map(|(_, uri)| uri.as_str())
            });
            (name == local && attr_ns == namespace).then_some(attr.value.as_str())
        })
    }

    /// Detach `node` and its subtree from its parent.
    ///
    /// Fails with [`Error::NoParent`] when `node` is the tree root (or has
    /// already been detached).
    pub fn remove(&mut self, node: NodeId) -> Result<()> {
        let parent = self.nodes[node.0].parent.ok_or(Error::NoParent)?;
        self.nodes[parent.0].children.retain(|&child| child != node);
        self.nodes[node.0].parent = None;
        Ok(())
    }

    /// Rename an element in place, leaving children and attributes unchanged.
    ///
    /// The serialized prefix is resolved from the bindings declared on the
    /// document element; [`Error::UnboundNamespace`] when the target
    /// namespace is not bound there.
    pub fn retag(&mut self, node: NodeId, namespace: &str, local: &str) -> Result<()> {
        let raw_name = self.qualified_name(namespace, local)?;
        match &mut self.nodes[node.0].kind {
            NodeKind::Element(el) => {
                el.raw_name = raw_name;
                el.namespace = Some(namespace.to_string());
                el.local_name = local.to_string();
                Ok(())
            }
            _ => Err(Error::InvalidData(
                "retag target is not an element".to_string(),
            )),
        }
    }

    /// Render the tree back to XML bytes.
    ///
    /// The original XML declaration is reproduced verbatim and no byte-order
    /// mark is emitted.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        if let Some(decl) = &self.decl {
            let start = BytesStart::from_content(decl.clone(), 3);
            writer.write_event(Event::Decl(BytesDecl::from_start(start)))?;
        }
        for &node in &self.document {
            self.write_node(&mut writer, node)?;
        }
        Ok(writer.into_inner())
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, node: NodeId) -> Result<()> {
        let data = &self.nodes[node.0];
        match &data.kind {
            NodeKind::Element(el) => {
                let mut start = BytesStart::new(el.raw_name.as_str());
                for attr in &el.attributes {
                    start.push_attribute((attr.raw_key.as_str(), attr.value.as_str()));
                }
                if el.self_closing && data.children.is_empty() {
                    writer.write_event(Event::Empty(start))?;
                } else {
                    writer.write_event(Event::Start(start))?;
                    for &child in &data.children {
                        self.write_node(writer, child)?;
                    }
                    writer.write_event(Event::End(BytesEnd::new(el.raw_name.as_str())))?;
                }
            }
            NodeKind::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
            NodeKind::CData(t) => writer.write_event(Event::CData(BytesCData::new(t.as_str())))?,
            NodeKind::Comment(t) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(t.as_str())))?
            }
            NodeKind::Pi(t) => writer.write_event(Event::PI(BytesPI::new(t.as_str())))?,
            NodeKind::DocType(t) => {
                writer.write_event(Event::DocType(BytesText::from_escaped(t.as_str())))?
            }
        }
        Ok(())
    }

    fn qualified_name(&self, namespace: &str, local: &str) -> Result<String> {
        if let Some((prefix, _)) = self.prefixes.iter().find(|(_, uri)| uri == namespace) {
            return Ok(format!("{prefix}:{local}"));
        }
        if self.default_ns.as_deref() == Some(namespace) {
            return Ok(local.to_string());
        }
        Err(Error::UnboundNamespace(namespace.to_string()))
    }

    fn collect_root_bindings(&mut self) {
        if let NodeKind::Element(el) = &self.nodes[self.root.0].kind {
            for attr in &el.attributes {
                if attr.raw_key == "xmlns" {
                    self.default_ns = Some(attr.value.clone());
                } else if let Some(prefix) = attr.raw_key.strip_prefix("xmlns:") {
                    self.prefixes
                        .push((prefix.to_string(), attr.value.clone()));
                }
            }
        }
    }
}

fn attach(
    nodes: &mut Vec<NodeData>,
    document: &mut Vec<NodeId>,
    stack: &[NodeId],
    kind: NodeKind,
) -> NodeId {
    let id = NodeId(nodes.len());
    let parent = stack.last().copied();
    nodes.push(NodeData {
        kind,
        parent,
        children: Vec::new(),
    });
    match parent {
        Some(parent) => nodes[parent.0].children.push(id),
        None => document.push(id),
    }
    id
}

fn read_element(
    reader: &NsReader<&[u8]>,
    start: &BytesStart<'_>,
    self_closing: bool,
) -> Result<ElementData> {
    let (resolved, local) = reader.resolve_element(start.name());
    let namespace = match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.into_inner()).into_owned()),
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) => {
            return Err(Error::UnboundNamespace(
                String::from_utf8_lossy(&prefix).into_owned(),
            ))
        }
    };

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::MalformedMarkup(e.to_string()))?;
        attributes.push(Attribute {
            raw_key: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            value: attr.unescape_value()?.into_owned(),
        });
    }

    Ok(ElementData {
        raw_name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        namespace,
        local_name: String::from_utf8_lossy(local.as_ref()).into_owned(),
        attributes,
        self_closing,
    })
}

/// Decode part bytes to a string, handling UTF-8 (with or without BOM) and
/// BOM-tagged UTF-16 LE/BE.
///
/// UTF-16 input is transcoded, so the declaration's encoding token is patched
/// to UTF-8 to keep the decoded markup self-consistent.
pub fn decode_part_bytes(bytes: &[u8]) -> Result<String> {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8(rest.to_vec()).map_err(|e| Error::Encoding(e.to_string()));
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return Ok(patch_declared_encoding(&decode_utf16(
            rest,
            u16::from_le_bytes,
        )?));
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return Ok(patch_declared_encoding(&decode_utf16(
            rest,
            u16::from_be_bytes,
        )?));
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Ok(s),
        Err(_) => {
            // BOM-less UTF-16 shows up in the wild; ASCII markup puts null
            // bytes in alternating positions.
            if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 {
                Ok(patch_declared_encoding(&decode_utf16(
                    bytes,
                    u16::from_le_bytes,
                )?))
            } else if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 {
                Ok(patch_declared_encoding(&decode_utf16(
                    bytes,
                    u16::from_be_bytes,
                )?))
            } else {
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

fn decode_utf16(bytes: &[u8], combine: fn([u8; 2]) -> u16) -> Result<String> {
    let even = bytes.len() & !1;
    let units = (0..even)
        .step_by(2)
        .map(|i| combine([bytes[i], bytes[i + 1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Encoding(e.to_string()))
}

/// Rewrite `encoding="UTF-16"` to `encoding="UTF-8"` inside the XML
/// declaration after transcoding, leaving the rest of the content alone.
fn patch_declared_encoding(content: &str) -> String {
    if content.starts_with("<?xml") {
        if let Some(end) = content.find("?>") {
            let (decl, rest) = content.split_at(end + 2);
            let patched = decl
                .replace("encoding=\"UTF-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='UTF-16'", "encoding='UTF-8'")
                .replace("encoding=\"utf-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='utf-16'", "encoding='UTF-8'");
            return format!("{patched}{rest}");
        }
    }
    content.to_string()
}
