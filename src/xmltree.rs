//! An owned, DOM-like XML tree used as the in-process representation behind
//! the [`crate::collaborators::XmlParser`] collaborator interface.
//!
//! The wire-level interface described in SPEC_FULL.md §6 ("a DOM-like tree
//! with line numbers, attribute-with-namespace access, and XPath-style
//! descendant queries") is modeled here as a fully owned tree rather than a
//! borrowed one: the default parser ([`crate::collaborators::DefaultXmlParser`])
//! walks a `roxmltree::Document` exactly once and copies it into this shape,
//! so no component downstream needs to juggle a borrow tied to the original
//! byte buffer's lifetime.

/// A single attribute, with its namespace URI resolved if the document
/// declared one for its prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: String,
    pub namespace_uri: Option<String>,
    pub prefix: Option<String>,
    pub value: String,
}

/// A child of an element: either a nested element or a text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An owned element node, with 1-based `line`/`column` recorded from the
/// source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub tag: String,
    pub namespace_uri: Option<String>,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlNode>,
    pub line: u32,
    pub column: u32,
}

impl XmlElement {
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name && a.prefix.is_none())
            .map(|a| a.value.as_str())
    }

    #[must_use]
    pub fn attr_ns(&self, namespace_uri: &str, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name && a.namespace_uri.as_deref() == Some(namespace_uri))
            .map(|a| a.value.as_str())
    }

    /// Any attribute named `name`, regardless of namespace — useful for
    /// attributes like `href` that callers query without caring which
    /// prefix (if any) was used in the source.
    #[must_use]
    pub fn attr_any_ns(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|a| a.name == name).map(|a| a.value.as_str())
    }

    /// Direct child elements, in document order.
    pub fn children_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// All descendant elements (not including `self`), depth-first,
    /// iterative — mirrors the non-recursive traversal style used elsewhere
    /// in this crate for unbounded-depth structures.
    #[must_use]
    pub fn descendants(&self) -> Vec<&XmlElement> {
        let mut result = Vec::new();
        let mut stack: Vec<&XmlElement> = self.children_elements().collect();
        stack.reverse();
        while let Some(element) = stack.pop() {
            let mut children: Vec<&XmlElement> = element.children_elements().collect();
            children.reverse();
            for child in children {
                stack.push(child);
            }
            result.push(element);
        }
        result
    }

    /// First descendant (including `self`) whose local tag name matches.
    #[must_use]
    pub fn find_first(&self, tag: &str) -> Option<&XmlElement> {
        if self.tag == tag {
            return Some(self);
        }
        self.descendants().into_iter().find(|e| e.tag == tag)
    }

    /// All descendants (including `self`) whose local tag name matches.
    #[must_use]
    pub fn find_all(&self, tag: &str) -> Vec<&XmlElement> {
        let mut result = Vec::new();
        if self.tag == tag {
            result.push(self);
        }
        result.extend(self.descendants().into_iter().filter(|e| e.tag == tag));
        result
    }

    /// Concatenated text content of all descendant text nodes, in document
    /// order, trimmed of leading/trailing whitespace.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut buffer = String::new();
        collect_text(self, &mut buffer);
        buffer.trim().to_string()
    }
}

fn collect_text(element: &XmlElement, buffer: &mut String) {
    for child in &element.children {
        match child {
            XmlNode::Text(text) => buffer.push_str(text),
            XmlNode::Element(nested) => collect_text(nested, buffer),
        }
    }
}

/// A parsed document: just its root element plus the declared XML version,
/// since HTM-001 depends on the latter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    pub root: XmlElement,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(tag: &str) -> XmlElement {
        XmlElement {
            tag: tag.to_string(),
            namespace_uri: None,
            attributes: Vec::new(),
            children: Vec::new(),
            line: 1,
            column: 1,
        }
    }

    #[test]
    fn attr_ignores_prefixed_attributes() {
        let mut element = leaf("a");
        element.attributes.push(XmlAttribute {
            name: "href".to_string(),
            namespace_uri: Some("http://www.w3.org/1999/xlink".to_string()),
            prefix: Some("xlink".to_string()),
            value: "cover.png".to_string(),
        });
        assert_eq!(element.attr("href"), None);
        assert_eq!(element.attr_ns("http://www.w3.org/1999/xlink", "href"), Some("cover.png"));
        assert_eq!(element.attr_any_ns("href"), Some("cover.png"));
    }

    #[test]
    fn descendants_are_depth_first_in_document_order() {
        let mut root = leaf("body");
        let mut section = leaf("section");
        section.children.push(XmlNode::Element(leaf("p")));
        root.children.push(XmlNode::Element(section));
        root.children.push(XmlNode::Element(leaf("footer")));

        let tags: Vec<&str> = root.descendants().into_iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["section", "p", "footer"]);
    }

    #[test]
    fn find_first_includes_self() {
        let root = leaf("nav");
        assert!(root.find_first("nav").is_some());
    }

    #[test]
    fn text_content_concatenates_and_trims() {
        let mut root = leaf("p");
        root.children.push(XmlNode::Text("  hello ".to_string()));
        let mut span = leaf("span");
        span.children.push(XmlNode::Text("world".to_string()));
        root.children.push(XmlNode::Element(span));
        assert_eq!(root.text_content(), "hello world");
    }
}
