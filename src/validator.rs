//! Reference validator (C7): consumes the `Reference` queue the content
//! scanner produced and validates each one against the resource registry
//! (§4.7). Every rule here dispatches on [`ReferenceType`] plus its two
//! boolean flags, never on a distinct Rust type per kind of link
//! (SPEC_FULL.md §9 Design Notes).

use std::collections::HashSet;

use crate::diagnostic::Diagnostic;
use crate::message_registry::emit;
use crate::reference::{is_blessed_content_document_mime, Reference, ReferenceType};
use crate::registry::ResourceRegistry;
use crate::url::{container_leak, has_absolute_path, has_parent_directory_reference, is_data_url, is_file_url, is_http, is_malformed_url, is_remote};

/// Validates every queued reference, returning the set of target container
/// paths that resolved to a real, manifest-declared resource — the
/// orchestrator folds this into the OPF-097 "unreferenced item" pass.
pub fn validate_references(
    references: &[Reference],
    registry: &ResourceRegistry,
    container_paths: &HashSet<String>,
    epub3: bool,
    diagnostics: &mut Vec<Diagnostic>,
) -> HashSet<String> {
    let mut touched = HashSet::new();
    for reference in references {
        if let Some(target) = validate_one(reference, registry, container_paths, epub3, diagnostics) {
            touched.insert(target);
        }
    }
    touched
}

fn validate_one(
    reference: &Reference,
    registry: &ResourceRegistry,
    container_paths: &HashSet<String>,
    epub3: bool,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<String> {
    let location = Some(reference.location.clone());

    if is_malformed_url(&reference.url) {
        emit(diagnostics, "RSC-020", format!("malformed URL '{}'", reference.url), location, None, None);
        return None;
    }

    if is_data_url(&reference.url) {
        if epub3 {
            emit(diagnostics, "RSC-029", "data: URL reference is not permitted in an EPUB 3 publication", location, None, None);
        }
        return None;
    }

    if is_file_url(&reference.url) {
        emit(diagnostics, "RSC-026", "file: scheme reference is not permitted", location, None, None);
        return None;
    }

    if is_remote(&reference.url) {
        if is_http(&reference.url) {
            emit(diagnostics, "RSC-031", format!("non-HTTPS remote reference '{}'", reference.url), location.clone(), None, None);
        }
        if !reference.reference_type.may_be_remote() {
            emit(
                diagnostics,
                "RSC-006",
                format!("remote resource used for a {:?} reference, where only audio/video/font may be remote", reference.reference_type),
                location,
                None,
                None,
            );
        }
        return None;
    }

    if has_absolute_path(&reference.url) {
        emit(diagnostics, "RSC-027", format!("absolute path reference '{}'", reference.url), location, None, None);
        return None;
    }

    if reference.reference_type.is_hyperlink_like() && has_parent_directory_reference(&reference.url) {
        emit(diagnostics, "RSC-028", format!("parent-directory reference '{}' in a hyperlink", reference.url), location.clone(), None, None);
    }

    if container_leak(&reference.url) {
        emit(diagnostics, "RSC-026", format!("reference '{}' escapes the container", reference.url), location, None, None);
        return None;
    }

    if !registry.has_resource(&reference.target_resource) {
        if container_paths.contains(&reference.target_resource) {
            emit(
                diagnostics,
                "RSC-008",
                format!("'{}' exists in the archive but is not declared in the manifest", reference.target_resource),
                location,
                None,
                None,
            );
        } else {
            let id = if reference.reference_type.is_hyperlink_like() { "RSC-007w" } else { "RSC-007" };
            emit(diagnostics, id, format!("referenced resource '{}' could not be found", reference.target_resource), location, None, None);
        }
        return None;
    }

    if reference.reference_type.is_hyperlink_like() {
        check_hyperlink_target(reference, registry, epub3, diagnostics);
    }

    validate_fragment(reference, registry, diagnostics);

    Some(reference.target_resource.clone())
}

fn check_hyperlink_target(reference: &Reference, registry: &ResourceRegistry, epub3: bool, diagnostics: &mut Vec<Diagnostic>) {
    let Some(target) = registry.get_resource(&reference.target_resource) else { return };
    let location = Some(reference.location.clone());
    if !target.in_spine {
        emit(
            diagnostics,
            "RSC-011",
            format!("hyperlink target '{}' is not part of the spine", reference.target_resource),
            location.clone(),
            None,
            None,
        );
    }
    if !is_blessed_content_document_mime(&target.mime_type, epub3) && !target.has_core_media_type_fallback {
        emit(
            diagnostics,
            "RSC-010",
            format!("hyperlink target '{}' is not a content document and has no core-media-type fallback", reference.target_resource),
            location,
            None,
            None,
        );
    }
}

fn validate_fragment(reference: &Reference, registry: &ResourceRegistry, diagnostics: &mut Vec<Diagnostic>) {
    let Some(fragment) = &reference.fragment else { return };
    let location = Some(reference.location.clone());

    if reference.reference_type == ReferenceType::Stylesheet {
        emit(diagnostics, "RSC-013", "stylesheet reference must not carry a fragment identifier", location, None, None);
        return;
    }

    if fragment.starts_with("svgView(") && reference.reference_type.is_hyperlink_like() {
        emit(diagnostics, "RSC-014", "SVG view fragment used on a hyperlink is not permitted", location, None, None);
        return;
    }

    let Some(target) = registry.get_resource(&reference.target_resource) else { return };
    let resolves = target.ids.contains(fragment)
        || (reference.reference_type == ReferenceType::SvgSymbol && target.svg_symbol_ids.contains(fragment));
    if !resolves {
        emit(
            diagnostics,
            "RSC-012",
            format!("fragment '#{fragment}' not found in '{}'", reference.target_resource),
            location,
            None,
            None,
        );
    }
}

/// The OPF-097 "unreferenced manifest item" pass (§4.7): every registered
/// resource not in the spine, not reached by any validated reference, and
/// whose path doesn't name one of the conventionally-standalone resource
/// kinds (nav document, NCX, cover image) the spec carves out.
#[must_use]
pub fn unreferenced_resources(registry: &ResourceRegistry, touched: &HashSet<String>) -> Vec<String> {
    registry
        .all_resources()
        .filter(|resource| !resource.in_spine && !touched.contains(&resource.url) && !is_conventionally_standalone(&resource.url))
        .map(|resource| resource.url.clone())
        .collect()
}

fn is_conventionally_standalone(path: &str) -> bool {
    path.contains("nav") || path.contains(".ncx") || path.contains("cover-image")
}
