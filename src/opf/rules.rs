//! The OPF engine's rule groups (§4.5): version/root attributes, metadata,
//! link elements, manifest, spine, guide, collections, bindings.
//!
//! Every function here takes the already-parsed [`PackageDocument`] plus
//! whatever side tables it needs (the container file map, the resource
//! registry) and appends [`Diagnostic`]s; none of them stop the engine on
//! error (SPEC_FULL.md §7).

use std::collections::{HashMap, HashSet};

use regex::Regex;
use std::sync::LazyLock;

use crate::diagnostic::Location;
use crate::message_registry::emit;
use crate::opf::bcp47::is_valid_bcp47;
use crate::opf::date::{is_strict_modified_datetime, parse_w3c_date};
use crate::opf::fallback::FallbackResolver;
use crate::opf::marc::is_valid_marc_relator;
use crate::opf::refines::detect_refines_cycle;
use crate::opf::types::PackageDocument;
use crate::registry::{Resource, ResourceRegistry};
use crate::url::{container_leak, is_remote, resolve_relative};
use crate::Diagnostic;

const SUPPORTED_VERSIONS: &[&str] = &["2.0", "3.0", "3.1", "3.2", "3.3"];
const VALID_MANIFEST_PROPERTIES: &[&str] =
    &["cover-image", "mathml", "nav", "remote-resources", "scripted", "svg", "switch"];

static URN_UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^urn:uuid:[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .unwrap_or_else(|_| unreachable!("static regex literal must compile"))
});

/// The directory portion of a container path, with no trailing slash;
/// empty string for a root-level file.
#[must_use]
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Runs every OPF rule group over `doc`, registering accepted manifest items
/// into `registry` as it goes, and returns nothing — violations are
/// diagnostics, not a `Result`.
pub fn validate_package(
    doc: &PackageDocument,
    opf_path: &str,
    container_files: &HashMap<String, Vec<u8>>,
    registry: &mut ResourceRegistry,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let opf_dir = dirname(opf_path);
    let epub3 = doc.is_epub3();
    let opf_location = Location::new(opf_path);

    check_version(doc, &opf_location, diagnostics);
    check_unique_identifier(doc, &opf_location, diagnostics);
    check_metadata(doc, &opf_location, epub3, diagnostics);
    check_manifest(doc, opf_path, opf_dir, epub3, container_files, registry, diagnostics);
    check_links(doc, opf_dir, registry, diagnostics);
    check_spine(doc, epub3, diagnostics);
    mark_spine_membership(doc, opf_dir, registry);
    mark_fallback_resolution(doc, opf_dir, epub3, registry);
    if !epub3 {
        check_guide(doc, opf_dir, registry, diagnostics);
    } else {
        check_collections(doc, registry, diagnostics);
        if doc.bindings_present {
            emit(
                diagnostics,
                "RSC-017",
                "bindings element is a deprecated EPUB 3 construct",
                Some(opf_location.clone()),
                None,
                None,
            );
        }
    }
}

fn check_version(doc: &PackageDocument, location: &Location, diagnostics: &mut Vec<Diagnostic>) {
    if !SUPPORTED_VERSIONS.contains(&doc.version.as_str()) {
        emit(
            diagnostics,
            "OPF-001",
            format!("unsupported package version '{}'", doc.version),
            Some(location.clone()),
            None,
            None,
        );
    }
}

fn check_unique_identifier(doc: &PackageDocument, location: &Location, diagnostics: &mut Vec<Diagnostic>) {
    let Some(unique_id) = &doc.unique_identifier else {
        emit(diagnostics, "OPF-003", "package is missing unique-identifier", Some(location.clone()), None, None);
        return;
    };
    let matches = doc
        .dc_elements
        .iter()
        .any(|dc| dc.name == "identifier" && dc.id.as_deref() == Some(unique_id.as_str()));
    if !matches {
        emit(
            diagnostics,
            "OPF-030",
            format!("unique-identifier '{unique_id}' does not match any dc:identifier id"),
            Some(location.clone()),
            None,
            None,
        );
    }
}

fn check_metadata(doc: &PackageDocument, opf_location: &Location, epub3: bool, diagnostics: &mut Vec<Diagnostic>) {
    for (name, label) in [("identifier", "dc:identifier"), ("title", "dc:title"), ("language", "dc:language")] {
        if !doc.dc_elements.iter().any(|dc| dc.name == name) {
            emit(
                diagnostics,
                "OPF-003",
                format!("package metadata requires at least one {label} element"),
                Some(opf_location.clone()),
                None,
                None,
            );
        }
    }

    for dc in &doc.dc_elements {
        match dc.name.as_str() {
            "language" => {
                if !is_valid_bcp47(&dc.value) {
                    emit(
                        diagnostics,
                        "OPF-092",
                        format!("'{}' is not a valid BCP-47 language tag", dc.value),
                        Some(dc.location.clone()),
                        None,
                        None,
                    );
                }
            }
            "date" => {
                if parse_w3c_date(&dc.value).is_none() {
                    emit(
                        diagnostics,
                        "OPF-003",
                        format!("dc:date value '{}' is not a valid W3C date", dc.value),
                        Some(dc.location.clone()),
                        None,
                        None,
                    );
                }
            }
            "identifier" => {
                if dc.value.to_ascii_lowercase().starts_with("urn:uuid:") && !URN_UUID_RE.is_match(&dc.value) {
                    emit(
                        diagnostics,
                        "OPF-085",
                        format!("'{}' is not a valid urn:uuid identifier", dc.value),
                        Some(dc.location.clone()),
                        None,
                        None,
                    );
                }
            }
            "creator" | "contributor" => {
                if let Some((_, role)) = dc.attributes.iter().find(|(name, _)| name.ends_with("role")) {
                    if !is_valid_marc_relator(role) {
                        emit(
                            diagnostics,
                            "OPF-052",
                            format!("'{role}' is not a valid MARC relator code"),
                            Some(dc.location.clone()),
                            None,
                            None,
                        );
                    }
                }
            }
            _ => {}
        }
    }

    for (lang, location) in &doc.xml_lang_values {
        if !lang.is_empty() && !is_valid_bcp47(lang) {
            emit(
                diagnostics,
                "OPF-092",
                format!("xml:lang '{lang}' is not a valid BCP-47 language tag"),
                Some(location.clone()),
                None,
                None,
            );
        }
    }

    if epub3 {
        check_epub3_metadata(doc, opf_location, diagnostics);
    }
}

fn check_epub3_metadata(doc: &PackageDocument, opf_location: &Location, diagnostics: &mut Vec<Diagnostic>) {
    let modified: Vec<_> = doc
        .meta_elements
        .iter()
        .filter(|m| m.property.as_deref() == Some("dcterms:modified"))
        .collect();
    match modified.len() {
        0 => emit(
            diagnostics,
            "OPF-003",
            "EPUB 3 package requires exactly one dcterms:modified meta element",
            Some(opf_location.clone()),
            None,
            None,
        ),
        1 => {
            if !is_strict_modified_datetime(&modified[0].value) {
                emit(
                    diagnostics,
                    "OPF-003",
                    format!("dcterms:modified value '{}' must match CCYY-MM-DDThh:mm:ssZ", modified[0].value),
                    Some(modified[0].location.clone()),
                    None,
                    None,
                );
            }
        }
        _ => emit(
            diagnostics,
            "RSC-005",
            "more than one dcterms:modified meta element declared",
            Some(opf_location.clone()),
            None,
            None,
        ),
    }

    let mut seen_ids: HashSet<&str> = HashSet::new();
    for id in doc
        .meta_elements
        .iter()
        .filter_map(|m| m.id.as_deref())
        .chain(doc.dc_elements.iter().filter_map(|d| d.id.as_deref()))
    {
        if !seen_ids.insert(id) {
            emit(
                diagnostics,
                "RSC-005",
                format!("duplicate id '{id}' in package metadata"),
                Some(opf_location.clone()),
                None,
                None,
            );
        }
    }

    for meta in &doc.meta_elements {
        if let Some(refines) = &meta.refines {
            if !refines.starts_with('#') {
                emit(
                    diagnostics,
                    "RSC-017",
                    format!("refines value '{refines}' is not a relative fragment reference"),
                    Some(meta.location.clone()),
                    None,
                    None,
                );
            }
        }
        if let Some(property) = &meta.property {
            if property.is_empty() || property.contains(char::is_whitespace) {
                emit(
                    diagnostics,
                    "OPF-025",
                    format!("'{property}' is not a valid meta property token"),
                    Some(meta.location.clone()),
                    None,
                    None,
                );
            }
        }
        if let Some(scheme) = &meta.scheme {
            if scheme.is_empty() || scheme.contains(char::is_whitespace) {
                emit(
                    diagnostics,
                    "OPF-026",
                    format!("'{scheme}' is not a valid meta scheme token"),
                    Some(meta.location.clone()),
                    None,
                    None,
                );
            }
        }
    }

    detect_refines_cycle(&doc.meta_elements, opf_location, diagnostics);
}

fn check_links(doc: &PackageDocument, opf_dir: &str, registry: &ResourceRegistry, diagnostics: &mut Vec<Diagnostic>) {
    for link in &doc.link_elements {
        if let Some(lang) = &link.hreflang {
            if !is_valid_bcp47(lang) {
                emit(
                    diagnostics,
                    "OPF-092",
                    format!("link hreflang '{lang}' is not a valid BCP-47 language tag"),
                    Some(link.location.clone()),
                    None,
                    None,
                );
            }
        }
        if is_remote(&link.href) {
            continue;
        }
        let resolved = resolve_relative(opf_dir, &link.href, opf_dir);
        let (target, fragment) = split_fragment(&resolved);
        if fragment.is_some() {
            emit(
                diagnostics,
                "OPF-098",
                format!("link element must not target an in-package fragment ('{}')", link.href),
                Some(link.location.clone()),
                None,
                None,
            );
        }
        if registry.has_resource(&target) {
            if link.media_type.is_none() {
                emit(
                    diagnostics,
                    "OPF-093",
                    "link element targeting a local resource requires media-type",
                    Some(link.location.clone()),
                    None,
                    None,
                );
            }
        } else {
            emit(
                diagnostics,
                "RSC-007w",
                format!("link element target '{}' could not be found", link.href),
                Some(link.location.clone()),
                None,
                None,
            );
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn check_manifest(
    doc: &PackageDocument,
    opf_path: &str,
    opf_dir: &str,
    epub3: bool,
    container_files: &HashMap<String, Vec<u8>>,
    registry: &mut ResourceRegistry,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut seen_hrefs: HashMap<String, &str> = HashMap::new();
    let mut nav_count = 0;
    let mut cover_image_count = 0;

    for item in &doc.manifest {
        if !seen_ids.insert(item.id.as_str()) {
            emit(
                diagnostics,
                "OPF-074",
                format!("duplicate manifest id '{}'", item.id),
                Some(item.location.clone()),
                None,
                None,
            );
        }

        if item.href.is_empty() || resolve_relative(opf_dir, &item.href, opf_dir) == opf_path {
            emit(
                diagnostics,
                "OPF-099",
                "manifest item must not reference the package document itself",
                Some(item.location.clone()),
                None,
                None,
            );
        }

        if container_leak(&item.href) {
            emit(
                diagnostics,
                "RSC-026",
                format!("manifest href '{}' escapes the container", item.href),
                Some(item.location.clone()),
                None,
                None,
            );
        }

        let resolved = resolve_relative(opf_dir, &item.href, opf_dir);
        let (target, fragment) = split_fragment(&resolved);
        if fragment.is_some() {
            emit(
                diagnostics,
                "OPF-091",
                format!("manifest href '{}' must not contain a fragment identifier", item.href),
                Some(item.location.clone()),
                None,
                None,
            );
        }
        if seen_hrefs.insert(target.clone(), item.id.as_str()).is_some() {
            emit(
                diagnostics,
                "OPF-074",
                format!("duplicate manifest href '{}'", item.href),
                Some(item.location.clone()),
                None,
                None,
            );
        }

        if item.href.contains(' ') {
            emit(
                diagnostics,
                "RSC-020",
                format!("manifest href '{}' contains an unencoded space", item.href),
                Some(item.location.clone()),
                None,
                None,
            );
        }

        if target.starts_with("META-INF/") {
            emit(
                diagnostics,
                "PKG-025",
                format!("publication resource '{target}' must not be placed under META-INF"),
                Some(item.location.clone()),
                None,
                None,
            );
        }

        if is_remote(&item.href) {
            let allowed_mime = item.media_type.starts_with("audio/")
                || item.media_type.starts_with("video/")
                || item.media_type.starts_with("font/")
                || item.media_type.contains("font");
            if !allowed_mime || !item.properties.contains("remote-resources") {
                emit(
                    diagnostics,
                    "RSC-006",
                    format!("remote manifest item '{}' is not audio/video/font with remote-resources declared", item.href),
                    Some(item.location.clone()),
                    None,
                    None,
                );
            }
        } else if !container_files.contains_key(&target) {
            emit(
                diagnostics,
                "RSC-001",
                format!("manifest href '{}' does not resolve to a file in the container", item.href),
                Some(item.location.clone()),
                None,
                None,
            );
        }

        if item.media_type.starts_with("text/x-oeb1") {
            emit(
                diagnostics,
                "OPF-037",
                format!("'{}' is a deprecated OEB 1.x media type", item.media_type),
                Some(item.location.clone()),
                None,
                None,
            );
        }

        if epub3 {
            for property in &item.properties {
                if !VALID_MANIFEST_PROPERTIES.contains(&property.as_str()) {
                    emit(
                        diagnostics,
                        "OPF-027",
                        format!("'{property}' is not a valid manifest item property"),
                        Some(item.location.clone()),
                        None,
                        None,
                    );
                }
            }
            if item.properties.contains("nav") {
                nav_count += 1;
                if item.media_type != "application/xhtml+xml" {
                    emit(
                        diagnostics,
                        "RSC-005",
                        "nav item must declare media-type application/xhtml+xml",
                        Some(item.location.clone()),
                        None,
                        None,
                    );
                    emit(
                        diagnostics,
                        "OPF-012",
                        "nav item media-type must be application/xhtml+xml",
                        Some(item.location.clone()),
                        None,
                        None,
                    );
                }
            }
            if item.properties.contains("cover-image") {
                cover_image_count += 1;
                if !item.media_type.starts_with("image/") {
                    emit(
                        diagnostics,
                        "OPF-012",
                        "cover-image item must declare an image media-type",
                        Some(item.location.clone()),
                        None,
                        None,
                    );
                }
            }
        }

        if !is_remote(&item.href) && container_files.contains_key(&target) {
            let mut resource = Resource::new(target.clone(), item.media_type.clone());
            resource.in_spine = false; // refined in check_spine via registry lookup
            registry.register_resource(resource);
        }
    }

    if epub3 && nav_count != 1 {
        emit(
            diagnostics,
            "RSC-005",
            format!("package must declare exactly one nav manifest item, found {nav_count}"),
            Some(Location::new(opf_path)),
            None,
            None,
        );
    }
    if cover_image_count > 1 {
        emit(
            diagnostics,
            "RSC-005",
            format!("package must declare at most one cover-image manifest item, found {cover_image_count}"),
            Some(Location::new(opf_path)),
            None,
            None,
        );
    }
}

fn check_spine(doc: &PackageDocument, epub3: bool, diagnostics: &mut Vec<Diagnostic>) {
    let opf_location_for = |entry_loc: &Location| entry_loc.clone();
    if doc.spine.is_empty() || !doc.spine.iter().any(|e| e.linear) {
        let location = doc.spine.first().map_or_else(|| Location::new("."), |e| opf_location_for(&e.location));
        emit(diagnostics, "OPF-033", "spine must contain at least one linear itemref", Some(location), None, None);
    }

    if let Some(toc) = &doc.spine_toc {
        match doc.manifest_item_by_id(toc) {
            None => emit(
                diagnostics,
                "OPF-049",
                format!("spine toc '{toc}' does not resolve to a manifest item"),
                None,
                None,
                None,
            ),
            Some(item) if item.media_type != "application/x-dtbncx+xml" => emit(
                diagnostics,
                "OPF-050",
                format!("spine toc '{toc}' does not reference an NCX document"),
                None,
                None,
                None,
            ),
            Some(_) => {}
        }
    }

    let mut seen_idrefs: HashSet<&str> = HashSet::new();
    let mut resolver = FallbackResolver::new(&doc.manifest, !epub3);
    for entry in &doc.spine {
        if !seen_idrefs.insert(entry.idref.as_str()) {
            emit(
                diagnostics,
                "OPF-034",
                format!("duplicate spine idref '{}'", entry.idref),
                Some(entry.location.clone()),
                None,
                None,
            );
        }
        for property in &entry.properties {
            let valid = matches!(property.as_str(), "page-spread-left" | "page-spread-right")
                || property.starts_with("rendition:");
            if !valid {
                emit(
                    diagnostics,
                    "OPF-012",
                    format!("'{property}' is not a valid itemref property"),
                    Some(entry.location.clone()),
                    None,
                    None,
                );
            }
        }

        let Some(item) = doc.manifest_item_by_id(&entry.idref) else {
            emit(
                diagnostics,
                "OPF-049",
                format!("spine itemref '{}' does not resolve to a manifest item", entry.idref),
                Some(entry.location.clone()),
                None,
                None,
            );
            continue;
        };
        let is_core = crate::reference::is_core_media_type(&item.media_type, !epub3);
        if !is_core {
            if item.fallback.is_none() {
                emit(
                    diagnostics,
                    "OPF-043",
                    format!("spine item '{}' requires a fallback chain resolving to a content document", entry.idref),
                    Some(entry.location.clone()),
                    None,
                    None,
                );
            } else if !resolver.resolves_to_content_document(&entry.idref, &entry.location, diagnostics) {
                emit(
                    diagnostics,
                    "OPF-044",
                    format!("fallback chain for spine item '{}' does not resolve to a content document", entry.idref),
                    Some(entry.location.clone()),
                    None,
                    None,
                );
            }
        }
    }
}

/// Records, on every manifest item with a fallback chain, whether that chain
/// terminates at a core media type — [`crate::validator`] reads this flag
/// when a hyperlink targets a non-content-document resource (RSC-010).
/// Diagnostics for the chain walk itself (OPF-045/OPF-040) were already
/// emitted for spine items by [`check_spine`]; this pass reuses a fresh,
/// independently memoized resolver and discards its diagnostics rather than
/// duplicating them for every non-spine item that happens to share a chain.
fn mark_fallback_resolution(doc: &PackageDocument, opf_dir: &str, epub3: bool, registry: &mut ResourceRegistry) {
    let mut resolver = FallbackResolver::new(&doc.manifest, !epub3);
    let mut scratch = Vec::new();
    for item in &doc.manifest {
        if item.fallback.is_none() || is_remote(&item.href) {
            continue;
        }
        let resolved = resolve_relative(opf_dir, &item.href, opf_dir);
        let (target, _fragment) = split_fragment(&resolved);
        if resolver.resolves_to_content_document(&item.id, &item.location, &mut scratch) {
            if let Some(resource) = registry.get_resource_mut(&target) {
                resource.has_core_media_type_fallback = true;
            }
        }
    }
}

fn mark_spine_membership(doc: &PackageDocument, opf_dir: &str, registry: &mut ResourceRegistry) {
    for entry in &doc.spine {
        let Some(item) = doc.manifest_item_by_id(&entry.idref) else {
            continue;
        };
        if is_remote(&item.href) {
            continue;
        }
        let resolved = resolve_relative(opf_dir, &item.href, opf_dir);
        let (target, _fragment) = split_fragment(&resolved);
        if let Some(resource) = registry.get_resource_mut(&target) {
            resource.in_spine = true;
        }
    }
}

fn check_guide(doc: &PackageDocument, opf_dir: &str, registry: &ResourceRegistry, diagnostics: &mut Vec<Diagnostic>) {
    for reference in &doc.guide {
        let resolved = resolve_relative(opf_dir, &reference.href, opf_dir);
        let (target, _fragment) = split_fragment(&resolved);
        if !registry.has_resource(&target) {
            emit(
                diagnostics,
                "OPF-031",
                format!("guide reference '{}' does not resolve to a manifest item", reference.href),
                Some(reference.location.clone()),
                None,
                None,
            );
        }
    }
}

fn check_collections(doc: &PackageDocument, registry: &ResourceRegistry, diagnostics: &mut Vec<Diagnostic>) {
    for collection in &doc.collections {
        check_collection(collection, registry, diagnostics);
    }
}

fn check_collection(collection: &crate::opf::types::Collection, registry: &ResourceRegistry, diagnostics: &mut Vec<Diagnostic>) {
    if collection.role == "manifest" {
        emit(
            diagnostics,
            "RSC-005",
            "top-level collection must not use role 'manifest'",
            Some(collection.location.clone()),
            None,
            None,
        );
    }
    if collection.role.contains(':') && url::Url::parse(&collection.role).is_err() {
        emit(
            diagnostics,
            "OPF-070",
            format!("collection role '{}' looks like a URL but does not parse as one", collection.role),
            Some(collection.location.clone()),
            None,
            None,
        );
    }
    let requires_xhtml = matches!(collection.role.as_str(), "preview" | "index");
    for link in &collection.links {
        let (target, _fragment) = split_fragment(link);
        match registry.get_resource(target) {
            None => emit(
                diagnostics,
                "OPF-073",
                format!("collection link '{link}' does not resolve to a manifest item"),
                Some(collection.location.clone()),
                None,
                None,
            ),
            Some(resource) if requires_xhtml && resource.mime_type != "application/xhtml+xml" => emit(
                diagnostics,
                "OPF-075",
                format!("collection link '{link}' must reference an XHTML content document"),
                Some(collection.location.clone()),
                None,
                None,
            ),
            Some(_) => {}
        }
    }
    for child in &collection.children {
        check_collection(child, registry, diagnostics);
    }
}

fn split_fragment(resolved: &str) -> (String, Option<String>) {
    match resolved.split_once('#') {
        Some((target, fragment)) => (target.to_string(), Some(fragment.to_string())),
        None => (resolved.to_string(), None),
    }
}

/// A minimal RFC 3986 syntax check, used only to decide whether a collection
/// `role` that "looks like a URL" actually parses as one (OPF-070) — no
/// network or filesystem resolution is implied.
mod url {
    pub struct Url;
    impl Url {
        pub fn parse(s: &str) -> Result<(), ()> {
            if crate::url::is_remote(s) {
                Ok(())
            } else {
                Err(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opf::types::{Collection, ManifestItem, SpineEntry};
    use std::collections::HashSet as Set;

    fn manifest_item(id: &str, href: &str, mime: &str, properties: &[&str]) -> ManifestItem {
        ManifestItem {
            id: id.to_string(),
            href: href.to_string(),
            media_type: mime.to_string(),
            fallback: None,
            media_overlay: None,
            properties: properties.iter().map(|s| (*s).to_string()).collect(),
            location: Location::new("OEBPS/content.opf"),
        }
    }

    #[test]
    fn dirname_returns_empty_for_root_file() {
        assert_eq!(dirname("mimetype"), "");
        assert_eq!(dirname("OEBPS/content.opf"), "OEBPS");
    }

    #[test]
    fn rejects_unsupported_version() {
        let doc = PackageDocument { version: "9.9".to_string(), ..PackageDocument::default() };
        let mut diags = Vec::new();
        check_version(&doc, &Location::new("content.opf"), &mut diags);
        assert_eq!(diags[0].id, "OPF-001");
    }

    #[test]
    fn accepts_supported_version() {
        let doc = PackageDocument { version: "3.0".to_string(), ..PackageDocument::default() };
        let mut diags = Vec::new();
        check_version(&doc, &Location::new("content.opf"), &mut diags);
        assert!(diags.is_empty());
    }

    #[test]
    fn manifest_rejects_duplicate_ids() {
        let doc = PackageDocument {
            version: "3.0".to_string(),
            manifest: vec![
                manifest_item("a", "a.xhtml", "application/xhtml+xml", &["nav"]),
                manifest_item("a", "b.xhtml", "application/xhtml+xml", &[]),
            ],
            ..PackageDocument::default()
        };
        let mut files = HashMap::new();
        files.insert("a.xhtml".to_string(), Vec::new());
        files.insert("b.xhtml".to_string(), Vec::new());
        let mut registry = ResourceRegistry::new();
        let mut diags = Vec::new();
        check_manifest(&doc, "content.opf", "", true, &files, &mut registry, &mut diags);
        assert!(diags.iter().any(|d| d.id == "OPF-074"));
    }

    #[test]
    fn manifest_flags_missing_file() {
        let doc = PackageDocument {
            version: "3.0".to_string(),
            manifest: vec![manifest_item("a", "missing.xhtml", "application/xhtml+xml", &["nav"])],
            ..PackageDocument::default()
        };
        let files = HashMap::new();
        let mut registry = ResourceRegistry::new();
        let mut diags = Vec::new();
        check_manifest(&doc, "content.opf", "", true, &files, &mut registry, &mut diags);
        assert!(diags.iter().any(|d| d.id == "RSC-001"));
    }

    #[test]
    fn manifest_requires_exactly_one_nav_item() {
        let doc = PackageDocument {
            version: "3.0".to_string(),
            manifest: vec![manifest_item("a", "a.xhtml", "application/xhtml+xml", &[])],
            ..PackageDocument::default()
        };
        let mut files = HashMap::new();
        files.insert("a.xhtml".to_string(), Vec::new());
        let mut registry = ResourceRegistry::new();
        let mut diags = Vec::new();
        check_manifest(&doc, "content.opf", "", true, &files, &mut registry, &mut diags);
        assert!(diags.iter().any(|d| d.id == "RSC-005"));
    }

    #[test]
    fn spine_requires_linear_entry() {
        let doc = PackageDocument { version: "3.0".to_string(), ..PackageDocument::default() };
        let mut diags = Vec::new();
        check_spine(&doc, true, &mut diags);
        assert!(diags.iter().any(|d| d.id == "OPF-033"));
    }

    #[test]
    fn spine_detects_duplicate_idref() {
        let doc = PackageDocument {
            version: "3.0".to_string(),
            manifest: vec![manifest_item("a", "a.xhtml", "application/xhtml+xml", &[])],
            spine: vec![
                SpineEntry { idref: "a".to_string(), linear: true, properties: Set::new(), location: Location::new("content.opf") },
                SpineEntry { idref: "a".to_string(), linear: true, properties: Set::new(), location: Location::new("content.opf") },
            ],
            ..PackageDocument::default()
        };
        let mut diags = Vec::new();
        check_spine(&doc, true, &mut diags);
        assert!(diags.iter().any(|d| d.id == "OPF-034"));
    }

    #[test]
    fn spine_requires_fallback_for_non_core_mime() {
        let doc = PackageDocument {
            version: "3.0".to_string(),
            manifest: vec![manifest_item("a", "a.bin", "application/x-custom", &[])],
            spine: vec![SpineEntry {
                idref: "a".to_string(),
                linear: true,
                properties: Set::new(),
                location: Location::new("content.opf"),
            }],
            ..PackageDocument::default()
        };
        let mut diags = Vec::new();
        check_spine(&doc, true, &mut diags);
        assert!(diags.iter().any(|d| d.id == "OPF-043"));
    }

    #[test]
    fn collection_with_manifest_role_is_rejected() {
        let collection = Collection {
            role: "manifest".to_string(),
            links: Vec::new(),
            location: Location::new("content.opf"),
            children: Vec::new(),
        };
        let registry = ResourceRegistry::new();
        let mut diags = Vec::new();
        check_collection(&collection, &registry, &mut diags);
        assert!(diags.iter().any(|d| d.id == "RSC-005"));
    }
}
