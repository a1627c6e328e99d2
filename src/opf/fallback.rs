//! Fallback-chain resolution (§4.5.2): DFS with a visited-set from each
//! manifest item, memoized so a chain shared by several callers (a spine
//! item's own check, plus every hyperlink-fallback lookup during reference
//! validation) is only walked — and only diagnosed — once.

use std::collections::{HashMap, HashSet};

use crate::diagnostic::Location;
use crate::message_registry::emit;
use crate::opf::types::ManifestItem;
use crate::reference::is_core_media_type;
use crate::Diagnostic;

pub struct FallbackResolver<'a> {
    manifest_by_id: HashMap<&'a str, &'a ManifestItem>,
    epub2: bool,
    memo: HashMap<String, bool>,
}

impl<'a> FallbackResolver<'a> {
    #[must_use]
    pub fn new(manifest: &'a [ManifestItem], epub2: bool) -> Self {
        let manifest_by_id = manifest.iter().map(|item| (item.id.as_str(), item)).collect();
        FallbackResolver { manifest_by_id, epub2, memo: HashMap::new() }
    }

    /// `true` when the fallback chain starting at `start_id` terminates at a
    /// core-media-type manifest item (§9 "every fallback chain terminates").
    /// A cycle or a dangling link resolves to `false` and emits OPF-045 /
    /// OPF-040 respectively, exactly once per distinct `start_id`.
    pub fn resolves_to_content_document(
        &mut self,
        start_id: &str,
        location: &Location,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> bool {
        if let Some(&cached) = self.memo.get(start_id) {
            return cached;
        }
        let mut visited: HashSet<String> = HashSet::new();
        let mut current = start_id.to_string();
        let result = loop {
            if !visited.insert(current.clone()) {
                emit(
                    diagnostics,
                    "OPF-045",
                    format!("fallback chain starting at '{start_id}' contains a cycle"),
                    Some(location.clone()),
                    None,
                    None,
                );
                break false;
            }
            let Some(item) = self.manifest_by_id.get(current.as_str()) else {
                emit(
                    diagnostics,
                    "OPF-040",
                    format!("fallback reference '{current}' does not resolve to a manifest item"),
                    Some(location.clone()),
                    None,
                    None,
                );
                break false;
            };
            if is_core_media_type(&item.media_type, self.epub2) {
                break true;
            }
            match item.fallback.clone() {
                Some(next) => current = next,
                None => break false,
            }
        };
        self.memo.insert(start_id.to_string(), result);
        result
    }
}
