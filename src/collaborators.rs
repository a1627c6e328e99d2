//! Collaborator interfaces (§6): the narrow traits the orchestrator consumes
//! instead of owning ZIP decompression, XML tokenizing, or CSS tokenizing
//! itself, plus the crate's default implementations of each.
//!
//! `epubcheck_core` does not reimplement these algorithms — it depends on
//! `zip`, `roxmltree`, and `cssparser` for them, the same way the rest of
//! this crate depends on well-established crates for concerns orthogonal to
//! the validation rules themselves. A caller embedding this crate in an
//! environment where those crates are unavailable (e.g. a WASM host with its
//! own XML parser) may supply a different implementation of any of these
//! traits; the orchestrator only ever calls through them.

use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;

use crate::diagnostic::Diagnostic;
use crate::xmltree::{XmlAttribute, XmlDocument, XmlElement, XmlNode};

// ---------------------------------------------------------------------
// ZIP reader
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflated,
    Other(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipEntryMeta {
    pub path: String,
    pub compression_method: CompressionMethod,
    pub extra_field_length: u16,
    pub is_first_entry: bool,
}

#[derive(Debug, Default)]
pub struct ZipContents {
    pub files: HashMap<String, Vec<u8>>,
    pub entries: Vec<ZipEntryMeta>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipReadError(pub String);

impl fmt::Display for ZipReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not read ZIP archive: {}", self.0)
    }
}

impl std::error::Error for ZipReadError {}

pub trait ZipReader {
    /// Reads every entry of a ZIP archive into an in-memory map, along with
    /// the per-entry metadata the OCF layer's mimetype rules (PKG-006/007/009)
    /// need.
    ///
    /// # Errors
    ///
    /// Returns `Err` only when the archive itself cannot be opened (corrupt
    /// central directory, truncated stream). A readable archive whose
    /// individual entries fail EPUB-specific rules is not an error here —
    /// that is reported later as a diagnostic.
    fn read(&self, bytes: &[u8]) -> Result<ZipContents, ZipReadError>;
}

#[derive(Debug, Default)]
pub struct DefaultZipReader;

impl ZipReader for DefaultZipReader {
    fn read(&self, bytes: &[u8]) -> Result<ZipContents, ZipReadError> {
        let mut archive =
            zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| ZipReadError(e.to_string()))?;
        let mut contents = ZipContents::default();
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(|e| ZipReadError(e.to_string()))?;
            let path = entry.name().to_string();
            let compression_method = match entry.compression() {
                zip::CompressionMethod::Stored => CompressionMethod::Stored,
                zip::CompressionMethod::Deflated => CompressionMethod::Deflated,
                _ => CompressionMethod::Other(u16::MAX),
            };
            let extra_field_length = entry.extra_data().len().min(u16::MAX as usize) as u16;
            let mut data = Vec::with_capacity(entry.size() as usize);
            std::io::Read::read_to_end(&mut entry, &mut data)
                .map_err(|e| ZipReadError(e.to_string()))?;
            contents.entries.push(ZipEntryMeta {
                path: path.clone(),
                compression_method,
                extra_field_length,
                is_first_entry: index == 0,
            });
            contents.files.insert(path, data);
        }
        Ok(contents)
    }
}

// ---------------------------------------------------------------------
// XML parser
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlParseError(pub String);

impl fmt::Display for XmlParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "XML is not well-formed: {}", self.0)
    }
}

impl std::error::Error for XmlParseError {}

pub trait XmlParser {
    /// Parses `bytes` into an owned DOM-like tree.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the bytes are not well-formed XML or not valid
    /// UTF-8 — the caller (the content scanner) converts this into a fatal
    /// HTM-001/RSC-016 diagnostic scoped to the one resource.
    fn parse(&self, bytes: &[u8]) -> Result<XmlDocument, XmlParseError>;
}

#[derive(Debug, Default)]
pub struct DefaultXmlParser;

impl XmlParser for DefaultXmlParser {
    fn parse(&self, bytes: &[u8]) -> Result<XmlDocument, XmlParseError> {
        let text = std::str::from_utf8(bytes).map_err(|e| XmlParseError(e.to_string()))?;
        let doc = roxmltree::Document::parse(text).map_err(|e| XmlParseError(e.to_string()))?;
        let version = detect_xml_version(text);
        let root = convert_root(&doc, doc.root_element());
        Ok(XmlDocument { root, version })
    }
}

/// Reads the `version` pseudo-attribute out of a leading `<?xml ... ?>`
/// declaration. Absent a declaration, XML 1.0 is assumed (the grammar
/// default) since the well-formedness parse itself already succeeded.
fn detect_xml_version(text: &str) -> String {
    let trimmed = text.trim_start();
    if let Some(rest) = trimmed.strip_prefix("<?xml") {
        if let Some(decl_end) = rest.find("?>") {
            let decl = &rest[..decl_end];
            if let Some(v_start) = decl.find("version") {
                let after = &decl[v_start + "version".len()..];
                let after = after.trim_start().trim_start_matches('=').trim_start();
                let quote = after.chars().next();
                if let Some(q) = quote {
                    if q == '"' || q == '\'' {
                        if let Some(end) = after[1..].find(q) {
                            return after[1..1 + end].to_string();
                        }
                    }
                }
            }
        }
    }
    "1.0".to_string()
}

struct ConversionFrame<'a> {
    node: roxmltree::Node<'a, 'a>,
    child_nodes: Vec<roxmltree::Node<'a, 'a>>,
    next_index: usize,
    children: Vec<XmlNode>,
}

impl<'a> ConversionFrame<'a> {
    fn new(node: roxmltree::Node<'a, 'a>) -> Self {
        ConversionFrame {
            node,
            child_nodes: node.children().collect(),
            next_index: 0,
            children: Vec::new(),
        }
    }
}

/// Converts a `roxmltree` element subtree into our owned [`XmlElement`]
/// shape using an explicit stack rather than recursion, so a pathologically
/// deep (attacker-controlled) document cannot blow the call stack.
fn convert_root<'a>(doc: &'a roxmltree::Document<'a>, root: roxmltree::Node<'a, 'a>) -> XmlElement {
    let mut stack = vec![ConversionFrame::new(root)];
    loop {
        let Some(top_index) = stack.len().checked_sub(1) else {
            unreachable!("conversion stack is seeded with one frame and only emptied via the final break");
        };
        if stack[top_index].next_index < stack[top_index].child_nodes.len() {
            let i = stack[top_index].next_index;
            let child = stack[top_index].child_nodes[i];
            stack[top_index].next_index += 1;
            if child.is_element() {
                stack.push(ConversionFrame::new(child));
            } else if child.is_text() {
                if let Some(text) = child.text() {
                    stack[top_index].children.push(XmlNode::Text(text.to_string()));
                }
            }
        } else if let Some(done) = stack.pop() {
            let element = build_element(doc, done.node, done.children);
            if let Some(parent) = stack.last_mut() {
                parent.children.push(XmlNode::Element(element));
            } else {
                break element;
            }
        }
    }
}

fn build_element(doc: &roxmltree::Document, node: roxmltree::Node, children: Vec<XmlNode>) -> XmlElement {
    let attributes = node
        .attributes()
        .map(|attribute| XmlAttribute {
            name: attribute.name().to_string(),
            namespace_uri: attribute.namespace().map(str::to_string),
            prefix: None,
            value: attribute.value().to_string(),
        })
        .collect();
    let pos = doc.text_pos_at(node.range().start);
    XmlElement {
        tag: node.tag_name().name().to_string(),
        namespace_uri: node.tag_name().namespace().map(str::to_string),
        attributes,
        children,
        line: pos.row,
        column: pos.col,
    }
}

// ---------------------------------------------------------------------
// CSS parser
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssReferenceType {
    Font,
    Image,
    Import,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssReference {
    pub reference_type: CssReferenceType,
    pub url: String,
    pub line: Option<u32>,
}

#[derive(Debug, Default)]
pub struct CssReferences {
    pub references: Vec<CssReference>,
}

pub trait CssParser {
    fn parse(&self, css: &str) -> CssReferences;
}

#[derive(Debug, Default)]
pub struct DefaultCssParser;

impl CssParser for DefaultCssParser {
    fn parse(&self, css: &str) -> CssReferences {
        crate::content::css::extract_css_references(css)
    }
}

// ---------------------------------------------------------------------
// Schema validator (optional)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    RelaxNg,
    Schematron,
    Xsd,
}

/// An optional, injected schema validator for RelaxNG/Schematron/XSD checks.
///
/// Schema compilation from source schemas is explicitly out of scope
/// (SPEC_FULL.md §1 Non-goals): the core never constructs one of these
/// itself. When the orchestrator is not given one (`None`), no schema-layer
/// diagnostics are produced; every other component of the pipeline behaves
/// identically either way.
pub trait SchemaValidator {
    fn validate(&self, kind: SchemaKind, bytes: &[u8]) -> Vec<Diagnostic>;
}

/// Bundles the collaborators the orchestrator needs for one validation run.
pub struct Collaborators<'a> {
    pub zip_reader: &'a dyn ZipReader,
    pub xml_parser: &'a dyn XmlParser,
    pub css_parser: &'a dyn CssParser,
    pub schema_validator: Option<&'a dyn SchemaValidator>,
}

impl<'a> Collaborators<'a> {
    #[must_use]
    pub fn new(
        zip_reader: &'a dyn ZipReader,
        xml_parser: &'a dyn XmlParser,
        css_parser: &'a dyn CssParser,
    ) -> Self {
        Collaborators {
            zip_reader,
            xml_parser,
            css_parser,
            schema_validator: None,
        }
    }

    #[must_use]
    pub fn with_schema_validator(mut self, validator: &'a dyn SchemaValidator) -> Self {
        self.schema_validator = Some(validator);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_xml_version_reads_declared_version() {
        let text = "<?xml version=\"1.1\" encoding=\"UTF-8\"?><root/>";
        assert_eq!(detect_xml_version(text), "1.1");
    }

    #[test]
    fn detect_xml_version_defaults_to_one_point_zero_without_declaration() {
        let text = "<root/>";
        assert_eq!(detect_xml_version(text), "1.0");
    }

    #[test]
    fn default_xml_parser_converts_nested_elements() {
        let parser = DefaultXmlParser;
        let doc = parser
            .parse(b"<html xmlns=\"http://www.w3.org/1999/xhtml\"><body><p>hi</p></body></html>")
            .expect("well-formed fixture must parse");
        assert_eq!(doc.version, "1.0");
        assert_eq!(doc.root.tag, "html");
        let body = doc.root.find_first("body").expect("body present");
        let p = body.find_first("p").expect("p present");
        assert_eq!(p.text_content(), "hi");
    }

    #[test]
    fn default_xml_parser_rejects_malformed_input() {
        let parser = DefaultXmlParser;
        assert!(parser.parse(b"<html><body></html>").is_err());
    }

    #[test]
    fn default_xml_parser_preserves_namespace_uri_on_attributes() {
        let parser = DefaultXmlParser;
        let doc = parser
            .parse(
                b"<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\">\
                  <use xlink:href=\"#sym\"/></svg>",
            )
            .expect("well-formed fixture must parse");
        let use_element = doc.root.find_first("use").expect("use present");
        assert_eq!(
            use_element.attr_ns("http://www.w3.org/1999/xlink", "href"),
            Some("#sym")
        );
    }
}
