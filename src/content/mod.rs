//! Content document scanner (C6): dispatches by media type to the XHTML,
//! SVG, or CSS scanner, then reconciles the XHTML/SVG scanners' detected
//! features against the manifest item's declared `properties` (§4.6.3).

pub mod css;
pub mod nav;
pub mod svg;
pub mod xhtml;

use std::collections::HashSet;

use crate::collaborators::CssParser;
use crate::diagnostic::{Diagnostic, Location};
use crate::message_registry::emit;
use crate::reference::{Reference, ReferenceType};
use crate::registry::ResourceRegistry;
use crate::report::ReadingOrderRecord;
use crate::url::resolve_relative;
use crate::xmltree::XmlDocument;

use xhtml::DetectedFeatures;

/// Everything a single content document's scan produced, folded into one
/// shape regardless of which sub-scanner ran.
#[derive(Default)]
pub struct ContentScanOutcome {
    pub references: Vec<Reference>,
    pub reading_order: Vec<ReadingOrderRecord>,
}

/// Scans an XHTML or SVG content document (`doc` is already parsed). `is_nav`
/// requests the additional §4.6.2 navigation-document checks; it is only
/// meaningful for XHTML documents.
#[allow(clippy::too_many_arguments)]
pub fn scan_xml_content_document(
    mime_type: &str,
    doc: &XmlDocument,
    path: &str,
    opf_dir: &str,
    is_nav: bool,
    declared_properties: &HashSet<String>,
    registry: &mut ResourceRegistry,
    css_parser: &dyn CssParser,
    diagnostics: &mut Vec<Diagnostic>,
) -> ContentScanOutcome {
    let doc_dir = dirname(path);
    match mime_type {
        "application/xhtml+xml" => {
            let outcome = xhtml::scan_xhtml(&doc.root, &doc.version, path, &doc_dir, opf_dir, registry, diagnostics);
            reconcile_features(outcome.features, declared_properties, path, diagnostics);
            let mut reading_order = Vec::new();
            if is_nav {
                let nav_outcome = nav::scan_nav(&doc.root, path, &doc_dir, opf_dir, diagnostics);
                reading_order = nav_outcome.reading_order;
            }
            ContentScanOutcome { references: outcome.references, reading_order }
        }
        "image/svg+xml" => {
            let outcome = svg::scan_svg(&doc.root, path, &doc_dir, opf_dir, registry, css_parser, diagnostics);
            ContentScanOutcome { references: outcome.references, reading_order: Vec::new() }
        }
        _ => ContentScanOutcome::default(),
    }
}

/// Scans a standalone CSS resource (not an XML document). The containing
/// stylesheet itself is never a hyperlink target, only a source of further
/// image/font/`@import` references.
pub fn scan_css_content_document(css_text: &str, path: &str, opf_dir: &str, css_parser: &dyn CssParser) -> Vec<Reference> {
    let doc_dir = dirname(path);
    css_parser
        .parse(css_text)
        .references
        .into_iter()
        .map(|reference| {
            let reference_type = match reference.reference_type {
                crate::collaborators::CssReferenceType::Font => ReferenceType::Font,
                crate::collaborators::CssReferenceType::Import => ReferenceType::Stylesheet,
                crate::collaborators::CssReferenceType::Image => ReferenceType::Image,
            };
            let resolved = resolve_relative(&doc_dir, &reference.url, opf_dir);
            let (target_resource, fragment) = match resolved.split_once('#') {
                Some((target, frag)) => (target.to_string(), Some(frag.to_string())),
                None => (resolved, None),
            };
            let mut built = Reference::new(reference.url.clone(), target_resource, reference_type, Location::new(path));
            if let Some(fragment) = fragment {
                built = built.with_fragment(fragment);
            }
            built
        })
        .collect()
}

/// OPF-014/OPF-015/OPF-018 (§4.6.3): a feature the markup exhibits but the
/// manifest does not declare is an error-severity-capable warning; a
/// declared-but-unused property is the informational mirror image.
fn reconcile_features(detected: DetectedFeatures, declared: &HashSet<String>, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    check_one(detected.scripted, declared.contains("scripted"), "scripted", path, diagnostics);
    check_one(detected.mathml, declared.contains("mathml"), "mathml", path, diagnostics);
    check_one(detected.svg, declared.contains("svg"), "svg", path, diagnostics);
    check_one(detected.switch, declared.contains("switch"), "switch", path, diagnostics);

    let declares_remote = declared.contains("remote-resources");
    if detected.remote_resources && !declares_remote {
        emit(
            diagnostics,
            "OPF-014",
            "content document uses a remote resource but the manifest item does not declare the 'remote-resources' property",
            Some(Location::new(path)),
            None,
            None,
        );
    } else if declares_remote && !detected.remote_resources {
        emit(
            diagnostics,
            "OPF-018",
            "manifest item declares 'remote-resources' but the content document uses no remote resource",
            Some(Location::new(path)),
            None,
            None,
        );
    }
}

fn check_one(exhibited: bool, declared: bool, property: &str, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    if exhibited && !declared {
        emit(
            diagnostics,
            "OPF-014",
            format!("content document exhibits the '{property}' feature but the manifest item does not declare it"),
            Some(Location::new(path)),
            None,
            None,
        );
    } else if declared && !exhibited {
        emit(
            diagnostics,
            "OPF-015",
            format!("manifest item declares the '{property}' property but the content document does not exhibit it"),
            Some(Location::new(path)),
            None,
            None,
        );
    }
}

fn dirname(path: &str) -> String {
    match path.rfind('/') {
        Some(index) => path[..index].to_string(),
        None => String::new(),
    }
}
