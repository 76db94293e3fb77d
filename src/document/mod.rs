//! Queryable, mutable HTML document
//!
//! This module wraps a parsed [`scraper::Html`] tree with the small set of
//! operations the rewriting passes need:
//! - CSS selector queries returning a materialized list in document order
//! - attribute reads and writes
//! - descendant text extraction
//! - element removal
//! - serialization back to HTML text
//!
//! Attribute writes and removals mutate the parsed tree directly, so later
//! selector queries and serialization both see the new values.
//!
//! A `Document` is not `Send` (the parser's string type is single-threaded):
//! parse, mutate and serialize it within one synchronous section.

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Node, Selector};
use thiserror::Error;

/// Errors raised by document queries
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Handle to an element inside a [`Document`]
///
/// Handles stay valid after mutations; a removed element simply reports
/// `false` from [`Document::is_attached`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(NodeId);

/// A parsed HTML document
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses a full HTML document
    ///
    /// Parsing never fails; malformed markup is repaired the way browsers do.
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Returns every attached element matching `selector`, in document order
    ///
    /// # Example
    ///
    /// ```
    /// use site_cloner::document::Document;
    ///
    /// let doc = Document::parse(r#"<a href="/a">A</a><a href="/b">B</a>"#);
    /// let links = doc.select("a[href]").unwrap();
    /// assert_eq!(links.len(), 2);
    /// assert_eq!(doc.attr(links[1], "href"), Some("/b"));
    /// ```
    pub fn select(&self, selector: &str) -> Result<Vec<ElementId>, DocumentError> {
        let parsed = parse_selector(selector)?;
        Ok(self.select_with(&parsed))
    }

    /// Same as [`Document::select`] with an already parsed selector
    pub fn select_with(&self, selector: &Selector) -> Vec<ElementId> {
        let root = self.html.root_element();
        let mut matches = Vec::new();

        if selector.matches(&root) {
            matches.push(ElementId(root.id()));
        }

        matches.extend(root.select(selector).map(|element| ElementId(element.id())));
        matches
    }

    /// Returns every attached element in document order
    pub fn elements(&self) -> Vec<ElementId> {
        self.html
            .tree
            .root()
            .descendants()
            .filter(|node| node.value().is_element())
            .map(|node| ElementId(node.id()))
            .collect()
    }

    /// Lower-case tag name of an element
    pub fn tag_name(&self, element: ElementId) -> Option<&str> {
        self.element_ref(element).map(|e| e.value().name())
    }

    /// Reads an attribute without namespace (`href`, not `xlink:href`)
    pub fn attr(&self, element: ElementId, name: &str) -> Option<&str> {
        self.element_ref(element)
            .and_then(|e| e.value().attr(name))
    }

    /// Replaces the value of an existing attribute without namespace
    ///
    /// Returns false, leaving the document unchanged, if the element does not
    /// carry the attribute.
    pub fn set_attr(&mut self, element: ElementId, name: &str, value: &str) -> bool {
        let Some(mut node) = self.html.tree.get_mut(element.0) else {
            return false;
        };
        let Node::Element(el) = node.value() else {
            return false;
        };

        match el
            .attrs
            .iter_mut()
            .find(|(key, _)| key.ns.is_empty() && &*key.local == name)
        {
            Some((_, existing)) => {
                *existing = value.into();
                true
            }
            None => false,
        }
    }

    /// Concatenation of every descendant text node
    pub fn text(&self, element: ElementId) -> String {
        self.element_ref(element)
            .map(|e| e.text().collect())
            .unwrap_or_default()
    }

    /// Trimmed text of the first `<title>` element, if non-empty
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.select_with(&selector)
            .into_iter()
            .map(|id| self.text(id).trim().to_string())
            .find(|t| !t.is_empty())
    }

    /// Detaches an element (and its subtree) from the document
    pub fn remove(&mut self, element: ElementId) {
        if let Some(mut node) = self.html.tree.get_mut(element.0) {
            node.detach();
        }
    }

    /// Returns true while the element is still reachable from the document root
    pub fn is_attached(&self, element: ElementId) -> bool {
        let root = self.html.tree.root().id();
        match self.html.tree.get(element.0) {
            Some(node) if node.id() == root => true,
            Some(node) => node.ancestors().last().map(|a| a.id()) == Some(root),
            None => false,
        }
    }

    /// Serializes the document back to HTML
    ///
    /// Attributes keep their source order, so an unchanged document
    /// serializes the same way every time.
    pub fn serialize(&self) -> String {
        self.html.html()
    }

    fn element_ref(&self, element: ElementId) -> Option<ElementRef<'_>> {
        self.html.tree.get(element.0).and_then(ElementRef::wrap)
    }
}

/// Parses a CSS selector into the matcher used by [`Document::select_with`]
pub fn parse_selector(selector: &str) -> Result<Selector, DocumentError> {
    Selector::parse(selector).map_err(|e| DocumentError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}
