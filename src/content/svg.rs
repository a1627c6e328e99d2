//! Standalone SVG content document scanning (§4.6.1): id/symbol collection
//! and the small slice of references SVG documents can carry on their own
//! (`use`, `image`, `a`, plus `@font-face`/`@import` inside an inline
//! `<style>` element, delegated to the CSS reference extractor).

use std::collections::HashSet;

use crate::collaborators::CssParser;
use crate::diagnostic::{Diagnostic, Location};
use crate::message_registry::emit;
use crate::reference::{Reference, ReferenceType};
use crate::registry::ResourceRegistry;
use crate::url::resolve_relative;
use crate::xmltree::XmlElement;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

pub struct SvgScanOutcome {
    pub references: Vec<Reference>,
}

pub fn scan_svg(
    root: &XmlElement,
    path: &str,
    doc_dir: &str,
    opf_dir: &str,
    registry: &mut ResourceRegistry,
    css_parser: &dyn CssParser,
    diagnostics: &mut Vec<Diagnostic>,
) -> SvgScanOutcome {
    if root.tag != "svg" {
        emit(diagnostics, "RSC-005", "SVG content document root element must be 'svg'", Some(Location::new(path)), None, None);
    }

    register_ids(root, path, registry, diagnostics);

    let mut references = Vec::new();
    for element in std::iter::once(root).chain(root.descendants()) {
        match element.tag.as_str() {
            "use" => {
                if let Some(href) = element.attr_any_ns("href") {
                    if !href.contains('#') {
                        emit(
                            diagnostics,
                            "RSC-015",
                            "svg 'use' reference is missing the required fragment",
                            Some(Location::at(path, element.line, element.column)),
                            None,
                            None,
                        );
                    }
                    push(&mut references, element, href, ReferenceType::SvgSymbol, path, doc_dir, opf_dir);
                }
            }
            "image" => {
                if let Some(href) = element.attr_any_ns("href") {
                    push(&mut references, element, href, ReferenceType::Image, path, doc_dir, opf_dir);
                }
            }
            "a" => {
                if let Some(href) = element.attr_any_ns("href") {
                    push(&mut references, element, href, ReferenceType::Hyperlink, path, doc_dir, opf_dir);
                }
            }
            "style" => {
                let css = element.text_content();
                for reference in css_parser.parse(&css).references {
                    let reference_type = match reference.reference_type {
                        crate::collaborators::CssReferenceType::Font => ReferenceType::Font,
                        crate::collaborators::CssReferenceType::Import => ReferenceType::Stylesheet,
                        crate::collaborators::CssReferenceType::Image => ReferenceType::Image,
                    };
                    push(&mut references, element, &reference.url, reference_type, path, doc_dir, opf_dir);
                }
            }
            _ => {}
        }
    }

    SvgScanOutcome { references }
}

fn register_ids(root: &XmlElement, path: &str, registry: &mut ResourceRegistry, diagnostics: &mut Vec<Diagnostic>) {
    let mut seen: HashSet<String> = HashSet::new();
    for element in std::iter::once(root).chain(root.descendants()) {
        if let Some(id) = element.attr("id") {
            if !seen.insert(id.to_string()) {
                emit(
                    diagnostics,
                    "RSC-005",
                    format!("duplicate id '{id}' within this resource"),
                    Some(Location::at(path, element.line, element.column)),
                    None,
                    None,
                );
            } else {
                registry.register_id(path, id);
                if element.tag == "symbol" && element.namespace_uri.as_deref() == Some(SVG_NS) {
                    registry.register_svg_symbol_id(path, id);
                }
            }
        }
    }
}

fn push(references: &mut Vec<Reference>, element: &XmlElement, href: &str, reference_type: ReferenceType, path: &str, doc_dir: &str, opf_dir: &str) {
    if href.contains("#epubcfi(") {
        return;
    }
    let resolved = resolve_relative(doc_dir, href, opf_dir);
    let (target_resource, fragment) = match resolved.split_once('#') {
        Some((target, frag)) => (target.to_string(), Some(frag.to_string())),
        None => (resolved, None),
    };
    let location = Location::at(path, element.line, element.column);
    let mut reference = Reference::new(href, target_resource, reference_type, location);
    if let Some(fragment) = fragment {
        reference = reference.with_fragment(fragment);
    }
    references.push(reference);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{DefaultCssParser, DefaultXmlParser, XmlParser};
    use crate::registry::Resource;

    fn parse(xml: &str) -> crate::xmltree::XmlDocument {
        DefaultXmlParser.parse(xml.as_bytes()).expect("well-formed fixture must parse")
    }

    #[test]
    fn symbol_id_is_registered() {
        let doc = parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><symbol id="icon-a"><path/></symbol></svg>"#,
        );
        let mut registry = ResourceRegistry::new();
        registry.register_resource(Resource::new("icons.svg", "image/svg+xml"));
        let mut diags = Vec::new();
        scan_svg(&doc.root, "icons.svg", "", "", &mut registry, &DefaultCssParser, &mut diags);
        assert!(registry.get_resource("icons.svg").unwrap().svg_symbol_ids.contains("icon-a"));
    }

    #[test]
    fn use_without_fragment_emits_rsc_015() {
        let doc = parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
               <use xlink:href="icons.svg"/></svg>"#,
        );
        let mut registry = ResourceRegistry::new();
        registry.register_resource(Resource::new("a.svg", "image/svg+xml"));
        let mut diags = Vec::new();
        scan_svg(&doc.root, "a.svg", "", "", &mut registry, &DefaultCssParser, &mut diags);
        assert!(diags.iter().any(|d| d.id == "RSC-015"));
    }

    #[test]
    fn inline_style_font_face_is_extracted_as_font_reference() {
        let doc = parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><style>@font-face { src: url(fonts/x.woff); }</style></svg>"#,
        );
        let mut registry = ResourceRegistry::new();
        registry.register_resource(Resource::new("a.svg", "image/svg+xml"));
        let mut diags = Vec::new();
        let outcome = scan_svg(&doc.root, "a.svg", "", "", &mut registry, &DefaultCssParser, &mut diags);
        assert!(outcome.references.iter().any(|r| r.reference_type == ReferenceType::Font));
    }
}
