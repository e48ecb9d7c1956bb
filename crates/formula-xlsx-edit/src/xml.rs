//! Owned SpreadsheetML element tree.
//!
//! Parsing goes through `roxmltree`, so element and attribute names are stored with their
//! resolved namespace URI rather than the source prefix. Serialization assigns prefixes again:
//! the root element's namespace becomes the default namespace, well-known OOXML namespaces get
//! their conventional prefixes and anything else is numbered (`ns1`, `ns2`, ...). Elements that
//! leave the default namespace redeclare it locally. Whitespace-only text is dropped only where
//! it sits between element siblings.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use quick_xml::escape::escape;
use roxmltree::{Document, Node, NodeType};
use thiserror::Error;

pub const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
pub const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_XML: &str = "http://www.w3.org/XML/1998/namespace";
const NS_XMLNS: &str = "http://www.w3.org/2000/xmlns/";

const WELL_KNOWN_PREFIXES: &[(&str, &str)] = &[
    (NS_REL, "r"),
    (
        "http://schemas.openxmlformats.org/markup-compatibility/2006",
        "mc",
    ),
    (
        "http://schemas.microsoft.com/office/spreadsheetml/2009/9/ac",
        "x14ac",
    ),
    (
        "http://schemas.microsoft.com/office/spreadsheetml/2009/9/main",
        "x14",
    ),
    ("http://schemas.microsoft.com/office/excel/2006/main", "xm"),
    (
        "http://schemas.microsoft.com/office/spreadsheetml/2014/revision",
        "xr",
    ),
];

#[derive(Debug, Error)]
pub enum XmlDomError {
    #[error("xml is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("xml parse error: {0}")]
    Parse(#[from] roxmltree::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QName {
    pub ns: Option<String>,
    pub local: String,
}

impl QName {
    /// A name in the SpreadsheetML main namespace.
    pub fn main(local: &str) -> Self {
        Self {
            ns: Some(NS_MAIN.to_string()),
            local: local.to_string(),
        }
    }

    /// A name with no namespace (the usual case for attributes).
    pub fn local(local: &str) -> Self {
        Self {
            ns: None,
            local: local.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: QName,
    pub attrs: BTreeMap<QName, String>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// An empty element in the SpreadsheetML main namespace.
    pub fn new(local: &str) -> Self {
        Self {
            name: QName::main(local),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, XmlDomError> {
        let text = std::str::from_utf8(bytes)?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let doc = Document::parse(text)?;
        Ok(build_element(doc.root_element(), false))
    }

    pub fn with_attr(mut self, local: &str, value: impl Into<String>) -> Self {
        self.set_attr(local, value);
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Value of the un-namespaced attribute `local`.
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(name, _)| name.ns.is_none() && name.local == local)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, local: &str, value: impl Into<String>) {
        self.attrs.insert(QName::local(local), value.into());
    }

    pub fn remove_attr(&mut self, local: &str) -> Option<String> {
        self.attrs.remove(&QName::local(local))
    }

    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.element_children().find(|el| el.name.local == local)
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut XmlElement> {
        self.children.iter_mut().find_map(|node| match node {
            XmlNode::Element(el) if el.name.local == local => Some(el),
            _ => None,
        })
    }

    pub fn children_by_local<'a>(
        &'a self,
        local: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.element_children()
            .filter(move |el| el.name.local == local)
    }

    pub fn element_children(&self) -> impl Iterator<Item = &XmlElement> + '_ {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    /// Index into `children` of the first element child satisfying `pred`.
    pub fn position_of(&self, mut pred: impl FnMut(&XmlElement) -> bool) -> Option<usize> {
        self.children
            .iter()
            .position(|node| matches!(node, XmlNode::Element(el) if pred(el)))
    }

    /// Index into `children` of the first element child named `local`.
    pub fn position_of_local(&self, local: &str) -> Option<usize> {
        self.position_of(|el| el.name.local == local)
    }

    /// Concatenated text of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Serialize as a standalone XML document.
    pub fn to_xml_string(&self) -> String {
        let prefixes = Prefixes::collect(self);
        let mut out = String::new();
        out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        out.push('\n');
        write_element(&mut out, self, &prefixes, None, true);
        out
    }
}

fn build_element(node: Node<'_, '_>, preserve_space: bool) -> XmlElement {
    let name = QName {
        ns: node.tag_name().namespace().map(|s| s.to_string()),
        local: node.tag_name().name().to_string(),
    };

    let mut attrs = BTreeMap::new();
    let mut xml_space_preserve = preserve_space;
    for attr in node.attributes() {
        if attr.name() == "xmlns" || attr.namespace() == Some(NS_XMLNS) {
            continue;
        }
        if attr.namespace() == Some(NS_XML) && attr.name() == "space" {
            xml_space_preserve = attr.value() == "preserve";
        }
        attrs.insert(
            QName {
                ns: attr.namespace().map(|s| s.to_string()),
                local: attr.name().to_string(),
            },
            attr.value().to_string(),
        );
    }

    let has_element_children = node.children().any(|child| child.is_element());
    let children = node
        .children()
        .filter_map(|child| match child.node_type() {
            NodeType::Element => Some(XmlNode::Element(build_element(
                child,
                xml_space_preserve,
            ))),
            NodeType::Text => {
                let text = child.text().unwrap_or_default();
                // Indentation between elements is not content; whitespace-only values are.
                if !xml_space_preserve && has_element_children && text.trim().is_empty() {
                    None
                } else {
                    Some(XmlNode::Text(text.to_string()))
                }
            }
            _ => None,
        })
        .collect();

    XmlElement {
        name,
        attrs,
        children,
    }
}

struct Prefixes {
    default_ns: Option<String>,
    prefixed: Vec<(String, String)>,
}

impl Prefixes {
    fn collect(root: &XmlElement) -> Self {
        let mut prefixes = Self {
            default_ns: root.name.ns.clone(),
            prefixed: Vec::new(),
        };
        prefixes.visit(root);
        prefixes
    }

    fn visit(&mut self, el: &XmlElement) {
        if let Some(ns) = &el.name.ns {
            if self.default_ns.as_deref() != Some(ns.as_str()) {
                self.bind(ns);
            }
        }
        for name in el.attrs.keys() {
            if let Some(ns) = &name.ns {
                if ns != NS_XML {
                    self.bind(ns);
                }
            }
        }
        for child in el.element_children() {
            self.visit(child);
        }
    }

    fn bind(&mut self, ns: &str) {
        if self.prefix_for(ns).is_some() {
            return;
        }
        let prefix = WELL_KNOWN_PREFIXES
            .iter()
            .find(|(uri, _)| *uri == ns)
            .map(|(_, prefix)| prefix.to_string())
            .filter(|prefix| !self.prefixed.iter().any(|(p, _)| p == prefix))
            .unwrap_or_else(|| format!("ns{}", self.prefixed.len() + 1));
        self.prefixed.push((prefix, ns.to_string()));
    }

    fn prefix_for(&self, ns: &str) -> Option<&str> {
        if ns == NS_XML {
            return Some("xml");
        }
        self.prefixed
            .iter()
            .find(|(_, uri)| uri == ns)
            .map(|(prefix, _)| prefix.as_str())
    }

    fn attr_name(&self, name: &QName) -> String {
        match name.ns.as_deref().and_then(|ns| self.prefix_for(ns)) {
            Some(prefix) => format!("{prefix}:{}", name.local),
            None => name.local.clone(),
        }
    }
}

/// Write `el` given the default namespace currently in scope.
///
/// An element whose namespace is neither the in-scope default nor bound to a prefix redeclares
/// the default namespace (`xmlns=""` for un-namespaced elements), and that declaration becomes
/// the scope for its descendants.
fn write_element<'a>(
    out: &mut String,
    el: &'a XmlElement,
    prefixes: &'a Prefixes,
    scope: Option<&'a str>,
    is_root: bool,
) {
    let mut child_scope = scope;
    let mut redeclare = None;
    let tag = match el.name.ns.as_deref() {
        Some(ns) if scope == Some(ns) => el.name.local.clone(),
        Some(ns) => match prefixes.prefix_for(ns) {
            Some(prefix) => format!("{prefix}:{}", el.name.local),
            None => {
                redeclare = Some(ns);
                child_scope = Some(ns);
                el.name.local.clone()
            }
        },
        None => {
            if scope.is_some() {
                redeclare = Some("");
                child_scope = None;
            }
            el.name.local.clone()
        }
    };

    out.push('<');
    out.push_str(&tag);
    if let Some(ns) = redeclare {
        let _ = write!(out, r#" xmlns="{}""#, escape(ns));
    }
    if is_root {
        for (prefix, ns) in &prefixes.prefixed {
            let _ = write!(out, r#" xmlns:{prefix}="{}""#, escape(ns.as_str()));
        }
    }

    for (name, value) in &el.attrs {
        let _ = write!(
            out,
            r#" {}="{}""#,
            prefixes.attr_name(name),
            escape(value.as_str())
        );
    }

    if el.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &el.children {
        match child {
            XmlNode::Element(child) => write_element(out, child, prefixes, child_scope, false),
            XmlNode::Text(text) => out.push_str(&escape(text.as_str())),
        }
    }
    let _ = write!(out, "</{tag}>");
}
