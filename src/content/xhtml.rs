//! XHTML content document scanning (§4.6.1): well-formedness extras, id
//! collection, reference extraction, and feature detection.

use std::collections::HashSet;

use crate::diagnostic::{Diagnostic, Location};
use crate::message_registry::emit;
use crate::reference::{Reference, ReferenceType};
use crate::registry::ResourceRegistry;
use crate::url::{is_remote, resolve_relative};
use crate::xmltree::XmlElement;

const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";
const EPUB_OPS_NS: &str = "http://www.idpf.org/2007/ops";
const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";
const SVG_NS: &str = "http://www.w3.org/2000/svg";

const CORE_IMAGE_MIMES: [&str; 4] = ["image/gif", "image/jpeg", "image/png", "image/svg+xml"];
const CORE_AUDIO_MIMES: [&str; 3] = ["audio/mpeg", "audio/mp4", "audio/ogg"];
const CORE_VIDEO_MIMES: [&str; 2] = ["video/mp4", "video/webm"];

/// Features a content document's markup actually exhibits, compared against
/// the manifest item's declared `properties` to emit OPF-014/015/018.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DetectedFeatures {
    pub scripted: bool,
    pub mathml: bool,
    pub svg: bool,
    pub switch: bool,
    pub remote_resources: bool,
}

pub struct XhtmlScanOutcome {
    pub references: Vec<Reference>,
    pub features: DetectedFeatures,
}

/// Scans one XHTML content document: checks, extracts, classifies.
pub fn scan_xhtml(
    root: &XmlElement,
    xml_version: &str,
    path: &str,
    doc_dir: &str,
    opf_dir: &str,
    registry: &mut ResourceRegistry,
    diagnostics: &mut Vec<Diagnostic>,
) -> XhtmlScanOutcome {
    check_well_formedness_extras(root, xml_version, path, diagnostics);
    register_ids(root, path, registry, diagnostics);

    let mut references = Vec::new();
    let mut features = DetectedFeatures::default();
    walk(root, path, doc_dir, opf_dir, None, None, registry, &mut references, &mut features, diagnostics);
    check_pictures(root, path, doc_dir, opf_dir, registry, diagnostics);
    check_declared_type_attributes(root, path, doc_dir, opf_dir, registry, diagnostics);

    XhtmlScanOutcome { references, features }
}

fn check_well_formedness_extras(root: &XmlElement, xml_version: &str, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    if xml_version != "1.0" {
        emit(
            diagnostics,
            "HTM-001",
            format!("XML version '{xml_version}' is not supported; content documents must declare version 1.0"),
            Some(Location::new(path)),
            None,
            None,
        );
    }
    if root.tag != "html" {
        emit(
            diagnostics,
            "RSC-005",
            "content document root element must be 'html'",
            Some(Location::at(path, root.line, root.column)),
            None,
            None,
        );
        return;
    }
    if root.namespace_uri.as_deref() != Some(XHTML_NS) {
        emit(
            diagnostics,
            "RSC-005",
            "content document root element is not bound to the XHTML namespace",
            Some(Location::at(path, root.line, root.column)),
            None,
            None,
        );
    }
    if root.find_first("head").is_none() {
        emit(diagnostics, "RSC-005", "content document is missing a 'head' element", Some(Location::new(path)), None, None);
    }
    if root.find_first("title").is_none() {
        emit(diagnostics, "RSC-005", "content document 'head' is missing a 'title' element", Some(Location::new(path)), None, None);
    }
    if root.find_first("body").is_none() {
        emit(diagnostics, "RSC-005", "content document is missing a 'body' element", Some(Location::new(path)), None, None);
    }
}

fn register_ids(root: &XmlElement, path: &str, registry: &mut ResourceRegistry, diagnostics: &mut Vec<Diagnostic>) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut elements = vec![root];
    elements.extend(root.descendants());
    for element in elements {
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
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn walk<'a>(
    element: &'a XmlElement,
    path: &str,
    doc_dir: &str,
    opf_dir: &str,
    nav_type: Option<&str>,
    picture_ancestor: Option<&'a XmlElement>,
    registry: &ResourceRegistry,
    references: &mut Vec<Reference>,
    features: &mut DetectedFeatures,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let tag = element.tag.as_str();
    let in_svg = element.namespace_uri.as_deref() == Some(SVG_NS);
    let in_mathml = element.namespace_uri.as_deref() == Some(MATHML_NS);

    if in_svg && !matches!(tag, "a" | "use" | "image") {
        features.svg = true;
    }
    if in_mathml {
        features.mathml = true;
    }
    if tag == "switch" {
        features.switch = true;
    }
    if tag == "script" || has_inline_event_handler(element) {
        features.scripted = true;
    }

    let own_nav_type = if tag == "nav" {
        element.attr_ns(EPUB_OPS_NS, "type").or_else(|| element.attr_any_ns("type"))
    } else {
        nav_type
    };

    match tag {
        "a" | "area" if !in_svg => {
            if let Some(href) = element.attr("href") {
                let ref_type = match own_nav_type {
                    Some(t) if token_contains(t, "toc") => ReferenceType::NavTocLink,
                    Some(t) if token_contains(t, "page-list") => ReferenceType::NavPagelistLink,
                    _ => ReferenceType::Hyperlink,
                };
                push(references, features, element, href, ref_type, false, path, doc_dir, opf_dir);
            }
        }
        "a" if in_svg => {
            if let Some(href) = element.attr_any_ns("href") {
                push(references, features, element, href, ReferenceType::Hyperlink, false, path, doc_dir, opf_dir);
            }
        }
        "img" => {
            let has_intrinsic_fallback =
                picture_ancestor.is_some_and(|picture| picture_has_core_image_source(picture, doc_dir, opf_dir, registry));
            if let Some(src) = element.attr("src") {
                push(references, features, element, src, ReferenceType::Image, has_intrinsic_fallback, path, doc_dir, opf_dir);
            }
            if let Some(srcset) = element.attr("srcset") {
                for url in parse_srcset(srcset) {
                    push(references, features, element, &url, ReferenceType::Image, has_intrinsic_fallback, path, doc_dir, opf_dir);
                }
            }
        }
        "audio" | "video" => {
            let ref_type = if tag == "audio" { ReferenceType::Audio } else { ReferenceType::Video };
            let core_mimes: &[&str] = if tag == "audio" { &CORE_AUDIO_MIMES } else { &CORE_VIDEO_MIMES };
            let has_core_sibling = element.children_elements().filter(|c| c.tag == "source").any(|source| {
                source
                    .attr("src")
                    .map(|href| resolve_relative(doc_dir, href, opf_dir))
                    .and_then(|target| registry.get_resource(&target).map(|r| r.mime_type.clone()))
                    .is_some_and(|mime| core_mimes.contains(&mime.as_str()))
            });
            if let Some(src) = element.attr("src") {
                push(references, features, element, src, ref_type, has_core_sibling, path, doc_dir, opf_dir);
            }
            if tag == "video" {
                if let Some(poster) = element.attr("poster") {
                    push(references, features, element, poster, ReferenceType::Image, false, path, doc_dir, opf_dir);
                }
            }
            for source in element.children_elements().filter(|c| c.tag == "source") {
                if let Some(src) = source.attr("src") {
                    push(references, features, source, src, ref_type, has_core_sibling, path, doc_dir, opf_dir);
                }
            }
            for track in element.children_elements().filter(|c| c.tag == "track") {
                if let Some(src) = track.attr("src") {
                    push(references, features, track, src, ReferenceType::Track, false, path, doc_dir, opf_dir);
                }
            }
        }
        "link" => {
            if let Some(href) = element.attr("href") {
                let is_stylesheet = element.attr("rel").is_some_and(|rel| token_contains(rel, "stylesheet"));
                let ref_type = if is_stylesheet { ReferenceType::Stylesheet } else { ReferenceType::Link };
                push(references, features, element, href, ref_type, false, path, doc_dir, opf_dir);
            }
        }
        "script" | "iframe" | "embed" => {
            if let Some(src) = element.attr("src") {
                push(references, features, element, src, ReferenceType::Generic, false, path, doc_dir, opf_dir);
            }
        }
        "object" => {
            if let Some(data) = element.attr("data") {
                let has_fallback = element.children.iter().any(|c| match c {
                    crate::xmltree::XmlNode::Element(_) => true,
                    crate::xmltree::XmlNode::Text(t) => !t.trim().is_empty(),
                });
                push(references, features, element, data, ReferenceType::Generic, has_fallback, path, doc_dir, opf_dir);
            }
        }
        "input" if element.attr("type") == Some("image") => {
            if let Some(src) = element.attr("src") {
                push(references, features, element, src, ReferenceType::Generic, false, path, doc_dir, opf_dir);
            }
        }
        "blockquote" | "q" | "ins" | "del" => {
            if let Some(cite) = element.attr("cite") {
                push(references, features, element, cite, ReferenceType::Cite, false, path, doc_dir, opf_dir);
            }
        }
        "math" => {
            if let Some(altimg) = element.attr("altimg") {
                push(references, features, element, altimg, ReferenceType::Image, false, path, doc_dir, opf_dir);
            }
        }
        "use" if in_svg => {
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
                push(references, features, element, href, ReferenceType::SvgSymbol, false, path, doc_dir, opf_dir);
            }
        }
        "image" if in_svg => {
            if let Some(href) = element.attr_any_ns("href") {
                push(references, features, element, href, ReferenceType::Image, false, path, doc_dir, opf_dir);
            }
        }
        _ => {}
    }

    let child_picture_ancestor = if tag == "picture" { Some(element) } else { picture_ancestor };
    for child in element.children_elements() {
        walk(child, path, doc_dir, opf_dir, own_nav_type, child_picture_ancestor, registry, references, features, diagnostics);
    }
}

/// Whether a `<picture>` element has at least one `<source>` child resolving
/// to a core-image mime type (§4.6.1 `img[@src] hasIntrinsicFallback`).
fn picture_has_core_image_source(picture: &XmlElement, doc_dir: &str, opf_dir: &str, registry: &ResourceRegistry) -> bool {
    picture.children_elements().filter(|c| c.tag == "source").any(|source| {
        let href = source.attr("srcset").or_else(|| source.attr("src"));
        let Some(href) = href else { return false };
        let candidate = href.split(',').next().unwrap_or(href).trim().split_ascii_whitespace().next().unwrap_or(href);
        let target = resolve_relative(doc_dir, candidate, opf_dir);
        registry.get_resource(&target).is_some_and(|resource| CORE_IMAGE_MIMES.contains(&resource.mime_type.as_str()))
    })
}

fn has_inline_event_handler(element: &XmlElement) -> bool {
    element.attributes.iter().any(|a| a.prefix.is_none() && a.name.starts_with("on"))
}

fn token_contains(value: &str, token: &str) -> bool {
    value.split_ascii_whitespace().any(|t| t.eq_ignore_ascii_case(token))
}

fn parse_srcset(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter_map(|candidate| candidate.trim().split_ascii_whitespace().next())
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn push(
    references: &mut Vec<Reference>,
    features: &mut DetectedFeatures,
    element: &XmlElement,
    href: &str,
    reference_type: ReferenceType,
    has_intrinsic_fallback: bool,
    path: &str,
    doc_dir: &str,
    opf_dir: &str,
) {
    if href.contains("#epubcfi(") {
        return;
    }
    if is_remote(href) && reference_type.may_be_remote() {
        features.remote_resources = true;
    }
    let resolved = resolve_relative(doc_dir, href, opf_dir);
    let (target_resource, fragment) = match resolved.split_once('#') {
        Some((target, frag)) => (target.to_string(), Some(frag.to_string())),
        None => (resolved, None),
    };
    let location = Location::at(path, element.line, element.column);
    let mut reference = Reference::new(href, target_resource, reference_type, location).with_intrinsic_fallback(has_intrinsic_fallback);
    if let Some(fragment) = fragment {
        reference = reference.with_fragment(fragment);
    }
    references.push(reference);
}

/// MED-003/MED-007: every `<picture>` child must resolve to a core image
/// type, or (for `<source>`) carry an explicit `type` attribute.
fn check_pictures(root: &XmlElement, path: &str, doc_dir: &str, opf_dir: &str, registry: &ResourceRegistry, diagnostics: &mut Vec<Diagnostic>) {
    for picture in root.find_all("picture") {
        for child in picture.children_elements() {
            match child.tag.as_str() {
                "img" => {
                    if let Some(src) = child.attr("src") {
                        let target = resolve_relative(doc_dir, src, opf_dir);
                        let mime = registry.get_resource(&target).map(|r| r.mime_type.as_str());
                        if !mime.is_some_and(|m| CORE_IMAGE_MIMES.contains(&m)) {
                            emit(
                                diagnostics,
                                "MED-003",
                                "'picture' fallback 'img' does not resolve to a core image type",
                                Some(Location::at(path, child.line, child.column)),
                                None,
                                None,
                            );
                        }
                    }
                }
                "source" => {
                    let href = child.attr("srcset").or_else(|| child.attr("src"));
                    if let Some(href) = href {
                        let candidate = href.split(',').next().unwrap_or(href).trim().split_ascii_whitespace().next().unwrap_or(href);
                        let target = resolve_relative(doc_dir, candidate, opf_dir);
                        let mime = registry.get_resource(&target).map(|r| r.mime_type.as_str());
                        let is_core = mime.is_some_and(|m| CORE_IMAGE_MIMES.contains(&m));
                        if !is_core && child.attr("type").is_none() {
                            emit(
                                diagnostics,
                                "MED-007",
                                "'picture' source referencing a non-core image type must declare a 'type' attribute",
                                Some(Location::at(path, child.line, child.column)),
                                None,
                                None,
                            );
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

/// OPF-013: a `type` attribute on `<source>`/`<object>`/`<embed>` must match
/// the manifest media type of the resource its href/data/srcset resolves to.
fn check_declared_type_attributes(root: &XmlElement, path: &str, doc_dir: &str, opf_dir: &str, registry: &ResourceRegistry, diagnostics: &mut Vec<Diagnostic>) {
    let mut elements = vec![root];
    elements.extend(root.descendants());
    for element in elements {
        let tag = element.tag.as_str();
        if !matches!(tag, "source" | "object" | "embed") {
            continue;
        }
        let Some(declared_type) = element.attr("type") else { continue };
        let href = if tag == "object" {
            element.attr("data")
        } else {
            element.attr("src").or_else(|| element.attr("srcset"))
        };
        let Some(href) = href else { continue };
        let candidate = href.split(',').next().unwrap_or(href).trim().split_ascii_whitespace().next().unwrap_or(href);
        if is_remote(candidate) {
            continue;
        }
        let resolved = resolve_relative(doc_dir, candidate, opf_dir);
        let target = resolved.split_once('#').map_or(resolved.as_str(), |(t, _)| t);
        let declared = declared_type.split(';').next().unwrap_or(declared_type).trim();
        if let Some(resource) = registry.get_resource(target) {
            if !declared.eq_ignore_ascii_case(&resource.mime_type) {
                emit(
                    diagnostics,
                    "OPF-013",
                    format!("declared type '{declared}' does not match the manifest media type '{}' of '{target}'", resource.mime_type),
                    Some(Location::at(path, element.line, element.column)),
                    None,
                    None,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{DefaultXmlParser, XmlParser};
    use crate::registry::Resource;

    fn parse(xml: &str) -> crate::xmltree::XmlDocument {
        DefaultXmlParser.parse(xml.as_bytes()).expect("well-formed fixture must parse")
    }

    #[test]
    fn missing_title_emits_rsc_005() {
        let doc = parse(r#"<html xmlns="http://www.w3.org/1999/xhtml"><head></head><body></body></html>"#);
        let mut registry = ResourceRegistry::new();
        registry.register_resource(Resource::new("ch1.xhtml", "application/xhtml+xml"));
        let mut diags = Vec::new();
        scan_xhtml(&doc.root, &doc.version, "ch1.xhtml", "", "", &mut registry, &mut diags);
        assert!(diags.iter().any(|d| d.id == "RSC-005"));
    }

    #[test]
    fn duplicate_id_is_flagged() {
        let doc = parse(
            r#"<html xmlns="http://www.w3.org/1999/xhtml"><head><title>T</title></head>
               <body><p id="a">x</p><p id="a">y</p></body></html>"#,
        );
        let mut registry = ResourceRegistry::new();
        registry.register_resource(Resource::new("ch1.xhtml", "application/xhtml+xml"));
        let mut diags = Vec::new();
        scan_xhtml(&doc.root, &doc.version, "ch1.xhtml", "", "", &mut registry, &mut diags);
        assert!(diags.iter().any(|d| d.id == "RSC-005"));
    }

    #[test]
    fn hyperlink_reference_is_extracted_and_resolved() {
        let doc = parse(
            r#"<html xmlns="http://www.w3.org/1999/xhtml"><head><title>T</title></head>
               <body><a href="ch2.xhtml#sec1">next</a></body></html>"#,
        );
        let mut registry = ResourceRegistry::new();
        registry.register_resource(Resource::new("OEBPS/ch1.xhtml", "application/xhtml+xml"));
        let mut diags = Vec::new();
        let outcome = scan_xhtml(&doc.root, &doc.version, "OEBPS/ch1.xhtml", "OEBPS", "OEBPS", &mut registry, &mut diags);
        let reference = outcome.references.iter().find(|r| r.reference_type == ReferenceType::Hyperlink).expect("hyperlink present");
        assert_eq!(reference.target_resource, "OEBPS/ch2.xhtml");
        assert_eq!(reference.fragment.as_deref(), Some("sec1"));
    }

    #[test]
    fn script_element_sets_scripted_feature() {
        let doc = parse(
            r#"<html xmlns="http://www.w3.org/1999/xhtml"><head><title>T</title><script src="x.js"/></head><body/></html>"#,
        );
        let mut registry = ResourceRegistry::new();
        registry.register_resource(Resource::new("a.xhtml", "application/xhtml+xml"));
        let mut diags = Vec::new();
        let outcome = scan_xhtml(&doc.root, &doc.version, "a.xhtml", "", "", &mut registry, &mut diags);
        assert!(outcome.features.scripted);
    }

    #[test]
    fn nav_toc_anchor_is_classified_as_nav_toc_link() {
        let doc = parse(
            r#"<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
               <head><title>T</title></head>
               <body><nav epub:type="toc"><ol><li><a href="ch1.xhtml">Ch1</a></li></ol></nav></body></html>"#,
        );
        let mut registry = ResourceRegistry::new();
        registry.register_resource(Resource::new("nav.xhtml", "application/xhtml+xml"));
        let mut diags = Vec::new();
        let outcome = scan_xhtml(&doc.root, &doc.version, "nav.xhtml", "", "", &mut registry, &mut diags);
        assert!(outcome.references.iter().any(|r| r.reference_type == ReferenceType::NavTocLink));
    }

    #[test]
    fn svg_use_without_fragment_emits_rsc_015() {
        let doc = parse(
            r#"<html xmlns="http://www.w3.org/1999/xhtml"><head><title>T</title></head>
               <body><svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
               <use xlink:href="icons.svg"/></svg></body></html>"#,
        );
        let mut registry = ResourceRegistry::new();
        registry.register_resource(Resource::new("a.xhtml", "application/xhtml+xml"));
        let mut diags = Vec::new();
        scan_xhtml(&doc.root, &doc.version, "a.xhtml", "", "", &mut registry, &mut diags);
        assert!(diags.iter().any(|d| d.id == "RSC-015"));
    }

    #[test]
    fn picture_with_non_core_fallback_img_emits_med_003() {
        let doc = parse(
            r#"<html xmlns="http://www.w3.org/1999/xhtml"><head><title>T</title></head>
               <body><picture><source srcset="a.webp" type="image/webp"/><img src="a.bmp"/></picture></body></html>"#,
        );
        let mut registry = ResourceRegistry::new();
        registry.register_resource(Resource::new("a.xhtml", "application/xhtml+xml"));
        registry.register_resource(Resource::new("a.bmp", "image/bmp"));
        registry.register_resource(Resource::new("a.webp", "image/webp"));
        let mut diags = Vec::new();
        scan_xhtml(&doc.root, &doc.version, "a.xhtml", "", "", &mut registry, &mut diags);
        assert!(diags.iter().any(|d| d.id == "MED-003"));
        assert!(!diags.iter().any(|d| d.id == "MED-007"));
    }

    #[test]
    fn picture_img_with_core_source_sibling_gets_intrinsic_fallback() {
        let doc = parse(
            r#"<html xmlns="http://www.w3.org/1999/xhtml"><head><title>T</title></head>
               <body><picture><source srcset="a.png"/><img src="a.bmp"/></picture></body></html>"#,
        );
        let mut registry = ResourceRegistry::new();
        registry.register_resource(Resource::new("a.xhtml", "application/xhtml+xml"));
        registry.register_resource(Resource::new("a.png", "image/png"));
        registry.register_resource(Resource::new("a.bmp", "image/bmp"));
        let mut diags = Vec::new();
        let outcome = scan_xhtml(&doc.root, &doc.version, "a.xhtml", "", "", &mut registry, &mut diags);
        let image_ref = outcome.references.iter().find(|r| r.reference_type == ReferenceType::Image).expect("image reference present");
        assert!(image_ref.has_intrinsic_fallback);
    }

    #[test]
    fn video_with_core_mp4_source_sibling_gets_intrinsic_fallback() {
        let doc = parse(
            r#"<html xmlns="http://www.w3.org/1999/xhtml"><head><title>T</title></head>
               <body><video><source src="a.mp4"/><source src="a.ogv"/></video></body></html>"#,
        );
        let mut registry = ResourceRegistry::new();
        registry.register_resource(Resource::new("a.xhtml", "application/xhtml+xml"));
        registry.register_resource(Resource::new("a.mp4", "video/mp4"));
        registry.register_resource(Resource::new("a.ogv", "video/ogg"));
        let mut diags = Vec::new();
        let outcome = scan_xhtml(&doc.root, &doc.version, "a.xhtml", "", "", &mut registry, &mut diags);
        let video_ref = outcome.references.iter().find(|r| r.reference_type == ReferenceType::Video).expect("video reference present");
        assert!(video_ref.has_intrinsic_fallback);
    }

    #[test]
    fn audio_without_core_source_sibling_has_no_intrinsic_fallback() {
        let doc = parse(
            r#"<html xmlns="http://www.w3.org/1999/xhtml"><head><title>T</title></head>
               <body><audio><source src="a.flac"/></audio></body></html>"#,
        );
        let mut registry = ResourceRegistry::new();
        registry.register_resource(Resource::new("a.xhtml", "application/xhtml+xml"));
        registry.register_resource(Resource::new("a.flac", "audio/flac"));
        let mut diags = Vec::new();
        let outcome = scan_xhtml(&doc.root, &doc.version, "a.xhtml", "", "", &mut registry, &mut diags);
        let audio_ref = outcome.references.iter().find(|r| r.reference_type == ReferenceType::Audio).expect("audio reference present");
        assert!(!audio_ref.has_intrinsic_fallback);
    }

    #[test]
    fn source_type_mismatch_with_manifest_emits_opf_013() {
        let doc = parse(
            r#"<html xmlns="http://www.w3.org/1999/xhtml"><head><title>T</title></head>
               <body><video><source src="a.mp4" type="video/webm"/></video></body></html>"#,
        );
        let mut registry = ResourceRegistry::new();
        registry.register_resource(Resource::new("a.xhtml", "application/xhtml+xml"));
        registry.register_resource(Resource::new("a.mp4", "video/mp4"));
        let mut diags = Vec::new();
        scan_xhtml(&doc.root, &doc.version, "a.xhtml", "", "", &mut registry, &mut diags);
        assert!(diags.iter().any(|d| d.id == "OPF-013"));
    }

    #[test]
    fn source_type_matching_manifest_with_parameters_is_accepted() {
        let doc = parse(
            r#"<html xmlns="http://www.w3.org/1999/xhtml"><head><title>T</title></head>
               <body><object data="a.mp4" type="video/mp4; codecs=avc1"></object></body></html>"#,
        );
        let mut registry = ResourceRegistry::new();
        registry.register_resource(Resource::new("a.xhtml", "application/xhtml+xml"));
        registry.register_resource(Resource::new("a.mp4", "video/mp4"));
        let mut diags = Vec::new();
        scan_xhtml(&doc.root, &doc.version, "a.xhtml", "", "", &mut registry, &mut diags);
        assert!(!diags.iter().any(|d| d.id == "OPF-013"));
    }

    #[test]
    fn embed_type_mismatch_emits_opf_013() {
        let doc = parse(
            r#"<html xmlns="http://www.w3.org/1999/xhtml"><head><title>T</title></head>
               <body><embed src="a.swf" type="application/pdf"/></body></html>"#,
        );
        let mut registry = ResourceRegistry::new();
        registry.register_resource(Resource::new("a.xhtml", "application/xhtml+xml"));
        registry.register_resource(Resource::new("a.swf", "application/x-shockwave-flash"));
        let mut diags = Vec::new();
        scan_xhtml(&doc.root, &doc.version, "a.xhtml", "", "", &mut registry, &mut diags);
        assert!(diags.iter().any(|d| d.id == "OPF-013"));
    }
}
