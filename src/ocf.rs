//! OCF layer (C4): verifies the mimetype entry, locates rootfiles from
//! `META-INF/container.xml`, and selects `opfPath`.

use std::collections::HashMap;

use crate::collaborators::{CompressionMethod, XmlParser, ZipEntryMeta};
use crate::diagnostic::Location;
use crate::message_registry::emit;
use crate::Diagnostic;

const MIMETYPE_CONTENT: &[u8] = b"application/epub+zip";

/// Runs the mimetype and container.xml checks, returning the selected
/// `opfPath` on success. `None` means a fatal diagnostic was already
/// appended and the orchestrator should skip the remaining pipeline stages.
pub fn run_ocf(
    files: &HashMap<String, Vec<u8>>,
    zip_entries: &[ZipEntryMeta],
    xml_parser: &dyn XmlParser,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<String> {
    check_mimetype(files, zip_entries, diagnostics);
    check_non_ascii_filenames(files, diagnostics);

    let Some(container_bytes) = files.get("META-INF/container.xml") else {
        emit(diagnostics, "RSC-002", "META-INF/container.xml is missing", None, None, None);
        return None;
    };

    let document = match xml_parser.parse(container_bytes) {
        Ok(document) => document,
        Err(error) => {
            emit(
                diagnostics,
                "RSC-016",
                format!("META-INF/container.xml could not be parsed: {error}"),
                Some(Location::new("META-INF/container.xml")),
                None,
                None,
            );
            return None;
        }
    };

    let opf_path = document
        .root
        .find_all("rootfile")
        .into_iter()
        .find(|el| el.attr("media-type") == Some("application/oebps-package+xml"))
        .and_then(|el| el.attr("full-path"))
        .map(str::to_string);

    if opf_path.is_none() {
        emit(
            diagnostics,
            "RSC-003",
            "no usable rootfile declared in META-INF/container.xml",
            Some(Location::new("META-INF/container.xml")),
            None,
            None,
        );
    }
    opf_path
}

fn check_mimetype(files: &HashMap<String, Vec<u8>>, zip_entries: &[ZipEntryMeta], diagnostics: &mut Vec<Diagnostic>) {
    let Some(content) = files.get("mimetype") else {
        emit(diagnostics, "PKG-006", "mimetype entry is missing from the archive", None, None, None);
        return;
    };
    let entry = zip_entries.iter().find(|e| e.path == "mimetype");
    let is_first_and_stored = entry.is_some_and(|e| e.is_first_entry && e.compression_method == CompressionMethod::Stored);
    if !is_first_and_stored {
        emit(
            diagnostics,
            "PKG-006",
            "mimetype entry is not the first archive entry or is compressed",
            Some(Location::new("mimetype")),
            None,
            None,
        );
    }
    if content.len() < MIMETYPE_CONTENT.len() || &content[..MIMETYPE_CONTENT.len()] != MIMETYPE_CONTENT {
        emit(
            diagnostics,
            "PKG-007",
            "mimetype entry does not contain 'application/epub+zip'",
            Some(Location::new("mimetype")),
            None,
            None,
        );
    } else if content.len() > MIMETYPE_CONTENT.len() {
        emit(
            diagnostics,
            "PKG-009",
            "mimetype entry has trailing data after the declared content",
            Some(Location::new("mimetype")),
            None,
            None,
        );
    }
}

fn check_non_ascii_filenames(files: &HashMap<String, Vec<u8>>, diagnostics: &mut Vec<Diagnostic>) {
    let mut paths: Vec<&String> = files.keys().collect();
    paths.sort();
    for path in paths {
        if !path.is_ascii() {
            emit(
                diagnostics,
                "OPF-096",
                format!("'{path}' contains non-ASCII characters"),
                Some(Location::new(path.clone())),
                None,
                None,
            );
        }
    }
}
