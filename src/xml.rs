//! Read-only XML element trees for raw OAI-PMH records.
//!
//! Records arrive as fragments of a larger OAI-PMH response and are handed to
//! record transformers as [`XmlElement`] trees. The tree keeps qualified element
//! names exactly as written (`dc:title`, `gmd:fileIdentifier`) so that
//! dialect-specific selectors can address them without a namespace resolver.
//!
//! # Selectors
//!
//! [`XmlElement::select`] accepts a whitespace-separated list of qualified names
//! with descendant semantics, similar to a CSS descendant combinator:
//!
//! ```
//! use oai_harvest::xml::XmlElement;
//!
//! let record = XmlElement::parse("<record><header><identifier>x</identifier></header></record>")?;
//! let ids = record.select("header identifier");
//! assert_eq!(ids[0].text(), "x");
//! # Ok::<(), oai_harvest::HarvestError>(())
//! ```
//!
//! Matches are returned in document order and never contain duplicates, even
//! when the same element name is nested within itself.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{HarvestError, Result};

/// A child of an [`XmlElement`]: either a nested element or a run of text.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    /// Nested element.
    Element(XmlElement),
    /// Unescaped character data (text or CDATA).
    Text(String),
}

/// An owned, immutable XML element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    /// Parse the root element of an XML document.
    ///
    /// Declarations, comments and processing instructions are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Xml`] if the input is not well-formed or has no
    /// root element.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        // Open elements, innermost last
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(Self::from_start(&start)?),
                Event::Empty(start) => {
                    let element = Self::from_start(&start)?;
                    Self::attach(&mut stack, &mut root, element);
                },
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| HarvestError::Xml("Unbalanced end tag".to_string()))?;
                    Self::attach(&mut stack, &mut root, element);
                },
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        let value = text.unescape()?;
                        parent.children.push(XmlNode::Text(value.into_owned()));
                    }
                },
                Event::CData(cdata) => {
                    if let Some(parent) = stack.last_mut() {
                        let value = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                        parent.children.push(XmlNode::Text(value));
                    }
                },
                Event::Eof => break,
                _ => {},
            }
        }

        if !stack.is_empty() {
            return Err(HarvestError::Xml(format!(
                "Unclosed element <{}>",
                stack.last().map_or("", |e| e.name.as_str())
            )));
        }
        root.ok_or_else(|| HarvestError::Xml("Document has no root element".to_string()))
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| HarvestError::Xml(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(XmlElement {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(XmlNode::Element(element)),
            None => {
                if root.is_none() {
                    *root = Some(element);
                }
            },
        }
    }

    /// Build an element programmatically.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add an attribute, builder style.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Add a child element, builder style.
    #[must_use]
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Add a text node, builder style.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Qualified element name, e.g. `gmd:MD_Metadata`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element name without its namespace prefix.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Value of the attribute with the given qualified name.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All child nodes in document order.
    #[must_use]
    pub fn nodes(&self) -> &[XmlNode] {
        &self.children
    }

    /// Child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// Consumes the element, yielding its child elements in document order.
    pub fn into_children(self) -> impl Iterator<Item = XmlElement> {
        self.children.into_iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// First direct child element with the given local name, ignoring prefixes.
    #[must_use]
    pub fn child_local(&self, local_name: &str) -> Option<&XmlElement> {
        self.children().find(|e| e.local_name() == local_name)
    }

    /// First direct child element with the given qualified name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children().find(|e| e.name == name)
    }

    /// Whitespace-normalized text of this element and all its descendants.
    #[must_use]
    pub fn text(&self) -> String {
        let mut raw = String::new();
        self.collect_text(&mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(t) => {
                    out.push(' ');
                    out.push_str(t);
                },
                XmlNode::Element(e) => e.collect_text(out),
            }
        }
    }

    /// All descendants matching a descendant selector, in document order.
    ///
    /// The selector is a whitespace-separated list of qualified names. An
    /// element matches when its name equals the last step and the preceding
    /// steps appear, in order, among its ancestors below `self`.
    #[must_use]
    pub fn select(&self, selector: &str) -> Vec<&XmlElement> {
        let steps: Vec<&str> = selector.split_whitespace().collect();
        let mut matches = Vec::new();
        if steps.is_empty() {
            return matches;
        }
        let mut ancestors = Vec::new();
        for child in self.children() {
            child.select_into(&steps, &mut ancestors, &mut matches);
        }
        matches
    }

    /// First descendant matching a selector, see [`select`](Self::select).
    #[must_use]
    pub fn select_first(&self, selector: &str) -> Option<&XmlElement> {
        // Small trees; a full walk keeps the matching rules in one place.
        self.select(selector).into_iter().next()
    }

    fn select_into<'a>(
        &'a self,
        steps: &[&str],
        ancestors: &mut Vec<&'a str>,
        matches: &mut Vec<&'a XmlElement>,
    ) {
        if let Some((last, preceding)) = steps.split_last() {
            if self.name == *last && ancestors_match(preceding, ancestors) {
                matches.push(self);
            }
        }
        ancestors.push(&self.name);
        for child in self.children() {
            child.select_into(steps, ancestors, matches);
        }
        ancestors.pop();
    }
}

/// Greedy subsequence test, innermost ancestor first.
fn ancestors_match(steps: &[&str], ancestors: &[&str]) -> bool {
    let mut remaining = steps.iter().rev().peekable();
    for ancestor in ancestors.iter().rev() {
        match remaining.peek() {
            Some(step) if *step == ancestor => {
                remaining.next();
            },
            Some(_) => {},
            None => break,
        }
    }
    remaining.peek().is_none()
}
