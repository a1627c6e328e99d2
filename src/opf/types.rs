//! The Package Document (OPF) data model (§3).

use std::collections::HashSet;

use crate::diagnostic::Location;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    pub href: String,
    pub media_type: String,
    pub fallback: Option<String>,
    pub media_overlay: Option<String>,
    pub properties: HashSet<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineEntry {
    pub idref: String,
    pub linear: bool,
    pub properties: HashSet<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DcElement {
    pub name: String,
    pub value: String,
    pub id: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub location: Location,
}

/// Models both the EPUB 3 `property`/`refines`/`scheme` form and the legacy
/// EPUB 2 `name`/`content` form of `<meta>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaElement {
    pub property: Option<String>,
    pub scheme: Option<String>,
    pub refines: Option<String>,
    pub id: Option<String>,
    pub value: String,
    pub name: Option<String>,
    pub content: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkElement {
    pub href: String,
    pub rel: Option<String>,
    pub media_type: Option<String>,
    pub properties: HashSet<String>,
    pub hreflang: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideReference {
    pub ref_type: String,
    pub href: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub role: String,
    pub links: Vec<String>,
    pub location: Location,
    pub children: Vec<Collection>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDocument {
    pub version: String,
    pub unique_identifier: Option<String>,
    pub dc_elements: Vec<DcElement>,
    pub meta_elements: Vec<MetaElement>,
    pub link_elements: Vec<LinkElement>,
    pub manifest: Vec<ManifestItem>,
    pub spine: Vec<SpineEntry>,
    pub spine_toc: Option<String>,
    pub guide: Vec<GuideReference>,
    pub collections: Vec<Collection>,
    pub bindings_present: bool,
    pub xml_lang_values: Vec<(String, Location)>,
}

impl PackageDocument {
    #[must_use]
    pub fn is_epub3(&self) -> bool {
        self.version.starts_with('3')
    }

    #[must_use]
    pub fn manifest_item_by_id(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn nav_item(&self) -> Option<&ManifestItem> {
        self.manifest.iter().find(|item| item.properties.contains("nav"))
    }
}
