//! Orchestrator (C8): the one place that sequences OCF → OPF → content
//! scanner → reference validator and turns the result into a [`Report`].
//!
//! No component above this module owns a `Vec<Diagnostic>` for longer than
//! one stage; the orchestrator is the single owner for the whole run.

use std::collections::HashSet;

use crate::collaborators::Collaborators;
use crate::content::{scan_css_content_document, scan_xml_content_document};
use crate::diagnostic::{Diagnostic, Location};
use crate::message_registry::emit;
use crate::ocf::run_ocf;
use crate::opf::{parse_package, validate_package};
use crate::options::ValidationOptions;
use crate::registry::ResourceRegistry;
use crate::report::{filter_by_options, Report};
use crate::validator::{unreferenced_resources, validate_references};

/// Runs the full pipeline over one EPUB archive's raw bytes.
#[must_use]
pub fn validate(bytes: &[u8], options: &ValidationOptions, collaborators: &Collaborators) -> Report {
    let mut diagnostics = Vec::new();

    let zip_contents = match collaborators.zip_reader.read(bytes) {
        Ok(contents) => contents,
        Err(error) => {
            emit(&mut diagnostics, "PKG-004", error.to_string(), None, None, None);
            return finish(&options.version, &mut diagnostics, options);
        }
    };

    let Some(opf_path) = run_ocf(&zip_contents.files, &zip_contents.entries, collaborators.xml_parser, &mut diagnostics) else {
        return finish(&options.version, &mut diagnostics, options);
    };

    let Some(opf_bytes) = zip_contents.files.get(&opf_path) else {
        emit(&mut diagnostics, "RSC-007", format!("declared rootfile '{opf_path}' is missing from the archive"), None, None, None);
        return finish(&options.version, &mut diagnostics, options);
    };

    let opf_document = match collaborators.xml_parser.parse(opf_bytes) {
        Ok(document) => document,
        Err(error) => {
            emit(&mut diagnostics, "RSC-016", format!("'{opf_path}' could not be parsed: {error}"), Some(Location::new(&opf_path)), None, None);
            return finish(&options.version, &mut diagnostics, options);
        }
    };

    let package = parse_package(&opf_document.root, &opf_path);
    let epub3 = if options.version == "detect" { package.is_epub3() } else { options.version.starts_with('3') };
    let version = if options.version == "detect" { package.version.clone() } else { options.version.clone() };
    let opf_dir = opf_dirname(&opf_path);

    let mut registry = ResourceRegistry::new();
    validate_package(&package, &opf_path, &zip_contents.files, &mut registry, &mut diagnostics);

    let mut references = Vec::new();
    let container_paths: HashSet<String> = zip_contents.files.keys().cloned().collect();

    let paths_to_scan: Vec<(String, String)> =
        registry.all_resources().map(|resource| (resource.url.clone(), resource.mime_type.clone())).collect();
    let nav_path = package.nav_item().map(|item| crate::url::resolve_relative(&opf_dir, &item.href, &opf_dir));

    for (path, mime_type) in paths_to_scan {
        let Some(bytes) = zip_contents.files.get(&path) else { continue };
        registry.mark_scanned(&path);

        match mime_type.as_str() {
            "application/xhtml+xml" | "image/svg+xml" => {
                let document = match collaborators.xml_parser.parse(bytes) {
                    Ok(document) => document,
                    Err(error) => {
                        emit(&mut diagnostics, "HTM-001", format!("'{path}' is not well-formed: {error}"), Some(Location::new(&path)), None, None);
                        continue;
                    }
                };
                let declared_properties =
                    package.manifest.iter().find(|item| crate::url::resolve_relative(&opf_dir, &item.href, &opf_dir) == path).map(|item| item.properties.clone()).unwrap_or_default();
                let is_nav = nav_path.as_deref() == Some(path.as_str());
                let outcome = scan_xml_content_document(
                    &mime_type,
                    &document,
                    &path,
                    &opf_dir,
                    is_nav,
                    &declared_properties,
                    &mut registry,
                    collaborators.css_parser,
                    &mut diagnostics,
                );
                references.extend(outcome.references);
            }
            "text/css" => {
                let Ok(text) = std::str::from_utf8(bytes) else {
                    emit(&mut diagnostics, "RSC-016", format!("'{path}' is not valid UTF-8"), Some(Location::new(&path)), None, None);
                    continue;
                };
                references.extend(scan_css_content_document(text, &path, &opf_dir, collaborators.css_parser));
            }
            _ => {}
        }
    }

    let touched = validate_references(&references, &registry, &container_paths, epub3, &mut diagnostics);
    for unreferenced in unreferenced_resources(&registry, &touched) {
        emit(
            &mut diagnostics,
            "OPF-097",
            format!("manifest item '{unreferenced}' is never referenced"),
            Some(Location::new(&unreferenced)),
            None,
            None,
        );
    }

    if let Some(schema_validator) = collaborators.schema_validator {
        for path in container_paths.iter().filter(|p| p.ends_with(".opf")) {
            if let Some(bytes) = zip_contents.files.get(path) {
                diagnostics.extend(schema_validator.validate(crate::collaborators::SchemaKind::Xsd, bytes));
            }
        }
    }

    finish_with_version(version, &mut diagnostics, options)
}

fn finish(version: &str, diagnostics: &mut Vec<Diagnostic>, options: &ValidationOptions) -> Report {
    finish_with_version(version.to_string(), diagnostics, options)
}

fn finish_with_version(version: String, diagnostics: &mut Vec<Diagnostic>, options: &ValidationOptions) -> Report {
    let mut diagnostics = std::mem::take(diagnostics);
    if let Some(max_errors) = options.max_errors {
        truncate_after_max_errors(&mut diagnostics, max_errors);
    }
    let filtered = filter_by_options(diagnostics, options.include_usage, options.include_info);
    Report::from_diagnostics(version, Some(options.profile.clone()), &filtered)
}

fn truncate_after_max_errors(diagnostics: &mut Vec<Diagnostic>, max_errors: usize) {
    let mut errors_seen = 0;
    let mut cutoff = diagnostics.len();
    for (index, diagnostic) in diagnostics.iter().enumerate() {
        if diagnostic.severity.fails_validation() {
            errors_seen += 1;
            if errors_seen >= max_errors {
                cutoff = index + 1;
                break;
            }
        }
    }
    diagnostics.truncate(cutoff);
}

fn opf_dirname(path: &str) -> String {
    match path.rfind('/') {
        Some(index) => path[..index].to_string(),
        None => String::new(),
    }
}
