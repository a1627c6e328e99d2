//! Parses a `<package>` root element into the [`PackageDocument`] shape
//! (§3). Purely structural: no rule is applied here, so a malformed or
//! incomplete package document still produces a best-effort
//! [`PackageDocument`] for the rule engine to report against field by field.

use std::collections::HashSet;

use crate::diagnostic::Location;
use crate::opf::types::{
    Collection, DcElement, GuideReference, LinkElement, ManifestItem, MetaElement, PackageDocument,
    SpineEntry,
};
use crate::xmltree::XmlElement;

const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

#[must_use]
pub fn parse_package(package_el: &XmlElement, opf_path: &str) -> PackageDocument {
    let loc = |element: &XmlElement| Location::at(opf_path, element.line, element.column);

    let mut doc = PackageDocument {
        version: package_el.attr("version").unwrap_or_default().to_string(),
        unique_identifier: package_el.attr("unique-identifier").map(str::to_string),
        ..PackageDocument::default()
    };

    if let Some(metadata_el) = find_child(package_el, "metadata") {
        for child in metadata_el.children_elements() {
            if child.tag == "meta" {
                doc.meta_elements.push(parse_meta(child, opf_path));
            } else if child.tag == "link" {
                doc.link_elements.push(parse_link(child, opf_path));
            } else if child.namespace_uri.as_deref() == Some(DC_NS) {
                doc.dc_elements.push(parse_dc(child, opf_path));
            }
        }
    }

    if let Some(manifest_el) = find_child(package_el, "manifest") {
        for item_el in manifest_el.children_elements().filter(|e| e.tag == "item") {
            doc.manifest.push(ManifestItem {
                id: item_el.attr("id").unwrap_or_default().to_string(),
                href: item_el.attr("href").unwrap_or_default().to_string(),
                media_type: item_el.attr("media-type").unwrap_or_default().to_string(),
                fallback: item_el.attr("fallback").map(str::to_string),
                media_overlay: item_el.attr("media-overlay").map(str::to_string),
                properties: parse_token_set(item_el.attr("properties")),
                location: loc(item_el),
            });
        }
    }

    if let Some(spine_el) = find_child(package_el, "spine") {
        doc.spine_toc = spine_el.attr("toc").map(str::to_string);
        for itemref_el in spine_el.children_elements().filter(|e| e.tag == "itemref") {
            doc.spine.push(SpineEntry {
                idref: itemref_el.attr("idref").unwrap_or_default().to_string(),
                linear: itemref_el.attr("linear") != Some("no"),
                properties: parse_token_set(itemref_el.attr("properties")),
                location: loc(itemref_el),
            });
        }
    }

    if let Some(guide_el) = find_child(package_el, "guide") {
        for ref_el in guide_el.children_elements().filter(|e| e.tag == "reference") {
            doc.guide.push(GuideReference {
                ref_type: ref_el.attr("type").unwrap_or_default().to_string(),
                href: ref_el.attr("href").unwrap_or_default().to_string(),
                location: loc(ref_el),
            });
        }
    }

    doc.bindings_present = find_child(package_el, "bindings").is_some();

    for collection_el in package_el.children_elements().filter(|e| e.tag == "collection") {
        doc.collections.push(parse_collection(collection_el, opf_path));
    }

    doc.xml_lang_values = collect_xml_lang(package_el, opf_path);

    doc
}

fn find_child<'a>(element: &'a XmlElement, tag: &str) -> Option<&'a XmlElement> {
    element.children_elements().find(|e| e.tag == tag)
}

fn parse_token_set(value: Option<&str>) -> HashSet<String> {
    value
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn parse_dc(element: &XmlElement, opf_path: &str) -> DcElement {
    DcElement {
        name: element.tag.clone(),
        value: element.text_content(),
        id: element.attr("id").map(str::to_string),
        attributes: element
            .attributes
            .iter()
            .map(|a| (a.name.clone(), a.value.clone()))
            .collect(),
        location: Location::at(opf_path, element.line, element.column),
    }
}

fn parse_meta(element: &XmlElement, opf_path: &str) -> MetaElement {
    MetaElement {
        property: element.attr("property").map(str::to_string),
        scheme: element.attr("scheme").map(str::to_string),
        refines: element.attr("refines").map(str::to_string),
        id: element.attr("id").map(str::to_string),
        value: element.text_content(),
        name: element.attr("name").map(str::to_string),
        content: element.attr("content").map(str::to_string),
        location: Location::at(opf_path, element.line, element.column),
    }
}

fn parse_link(element: &XmlElement, opf_path: &str) -> LinkElement {
    LinkElement {
        href: element.attr("href").unwrap_or_default().to_string(),
        rel: element.attr("rel").map(str::to_string),
        media_type: element.attr("media-type").map(str::to_string),
        properties: parse_token_set(element.attr("properties")),
        hreflang: element.attr("hreflang").map(str::to_string),
        location: Location::at(opf_path, element.line, element.column),
    }
}

fn parse_collection(element: &XmlElement, opf_path: &str) -> Collection {
    let links = element
        .children_elements()
        .filter(|e| e.tag == "link")
        .filter_map(|e| e.attr("href").map(str::to_string))
        .collect();
    let children = element
        .children_elements()
        .filter(|e| e.tag == "collection")
        .map(|e| parse_collection(e, opf_path))
        .collect();
    Collection {
        role: element.attr("role").unwrap_or_default().to_string(),
        links,
        location: Location::at(opf_path, element.line, element.column),
        children,
    }
}

fn collect_xml_lang(root: &XmlElement, opf_path: &str) -> Vec<(String, Location)> {
    let mut values = Vec::new();
    if let Some(lang) = root.attr_ns(XML_NS, "lang") {
        values.push((lang.to_string(), Location::at(opf_path, root.line, root.column)));
    }
    for descendant in root.descendants() {
        if let Some(lang) = descendant.attr_ns(XML_NS, "lang") {
            values.push((lang.to_string(), Location::at(opf_path, descendant.line, descendant.column)));
        }
    }
    values
}
