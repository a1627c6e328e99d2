//! Resource registry (C3): container-path → manifest metadata, plus the
//! per-resource declared-id sets used for fragment validation.
//!
//! Backed by a `HashMap` for dense lookup and a parallel insertion-order
//! `Vec` so [`ResourceRegistry::all_resources`] iterates in manifest order —
//! required by the "unreferenced manifest item" pass (§4.7), which must
//! produce OPF-097 diagnostics deterministically.

use std::collections::{HashMap, HashSet};

/// A single registered resource row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub url: String,
    pub mime_type: String,
    pub in_spine: bool,
    pub has_core_media_type_fallback: bool,
    pub ids: HashSet<String>,
    pub svg_symbol_ids: HashSet<String>,
    /// Transitions `false -> true` once the content scanner has processed
    /// this resource. Never re-scanned afterward.
    pub scanned: bool,
}

impl Resource {
    #[must_use]
    pub fn new(url: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Resource {
            url: url.into(),
            mime_type: mime_type.into(),
            in_spine: false,
            has_core_media_type_fallback: false,
            ids: HashSet::new(),
            svg_symbol_ids: HashSet::new(),
            scanned: false,
        }
    }
}

/// The C3 resource registry.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    order: Vec<String>,
    resources: HashMap<String, Resource>,
}

impl ResourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent by container path: a later call supplements `ids` (via
    /// [`ResourceRegistry::register_id`]) but never overwrites the mime/
    /// spine/fallback fields recorded on first registration.
    pub fn register_resource(&mut self, resource: Resource) {
        if !self.resources.contains_key(&resource.url) {
            self.order.push(resource.url.clone());
            self.resources.insert(resource.url.clone(), resource);
        }
    }

    /// Inserts `id` into the target resource's id set. Duplicate ids are
    /// silently ignored at this layer — the OPF and content-scanner layers
    /// are responsible for emitting their own duplicate-id diagnostics.
    pub fn register_id(&mut self, path: &str, id: impl Into<String>) {
        if let Some(resource) = self.resources.get_mut(path) {
            resource.ids.insert(id.into());
        }
    }

    pub fn register_svg_symbol_id(&mut self, path: &str, id: impl Into<String>) {
        if let Some(resource) = self.resources.get_mut(path) {
            resource.svg_symbol_ids.insert(id.into());
        }
    }

    #[must_use]
    pub fn has_resource(&self, path: &str) -> bool {
        self.resources.contains_key(path)
    }

    #[must_use]
    pub fn get_resource(&self, path: &str) -> Option<&Resource> {
        self.resources.get(path)
    }

    pub fn get_resource_mut(&mut self, path: &str) -> Option<&mut Resource> {
        self.resources.get_mut(path)
    }

    #[must_use]
    pub fn has_id(&self, path: &str, id: &str) -> bool {
        self.resources.get(path).is_some_and(|r| r.ids.contains(id))
    }

    /// Iterates resources in manifest insertion order.
    pub fn all_resources(&self) -> impl Iterator<Item = &Resource> {
        self.order.iter().filter_map(move |path| self.resources.get(path))
    }

    pub fn mark_scanned(&mut self, path: &str) {
        if let Some(resource) = self.resources.get_mut(path) {
            resource.scanned = true;
        }
    }

    #[must_use]
    pub fn is_scanned(&self, path: &str) -> bool {
        self.resources.get(path).is_some_and(|r| r.scanned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_resource_is_idempotent_by_path() {
        let mut registry = ResourceRegistry::new();
        registry.register_resource(Resource::new("a.xhtml", "application/xhtml+xml"));
        let mut replacement = Resource::new("a.xhtml", "text/html");
        replacement.in_spine = true;
        registry.register_resource(replacement);

        let stored = registry.get_resource("a.xhtml").unwrap();
        assert_eq!(stored.mime_type, "application/xhtml+xml");
        assert!(!stored.in_spine);
    }

    #[test]
    fn register_id_supplements_existing_resource() {
        let mut registry = ResourceRegistry::new();
        registry.register_resource(Resource::new("a.xhtml", "application/xhtml+xml"));
        registry.register_id("a.xhtml", "intro");
        registry.register_id("a.xhtml", "intro");
        assert!(registry.has_id("a.xhtml", "intro"));
        assert_eq!(registry.get_resource("a.xhtml").unwrap().ids.len(), 1);
    }

    #[test]
    fn register_id_on_unregistered_path_is_a_no_op() {
        let mut registry = ResourceRegistry::new();
        registry.register_id("missing.xhtml", "x");
        assert!(!registry.has_id("missing.xhtml", "x"));
    }

    #[test]
    fn all_resources_preserves_insertion_order() {
        let mut registry = ResourceRegistry::new();
        registry.register_resource(Resource::new("b.xhtml", "application/xhtml+xml"));
        registry.register_resource(Resource::new("a.xhtml", "application/xhtml+xml"));
        let order: Vec<&str> = registry.all_resources().map(|r| r.url.as_str()).collect();
        assert_eq!(order, vec!["b.xhtml", "a.xhtml"]);
    }

    #[test]
    fn scanned_flag_transitions_monotonically() {
        let mut registry = ResourceRegistry::new();
        registry.register_resource(Resource::new("a.xhtml", "application/xhtml+xml"));
        assert!(!registry.is_scanned("a.xhtml"));
        registry.mark_scanned("a.xhtml");
        assert!(registry.is_scanned("a.xhtml"));
    }
}
