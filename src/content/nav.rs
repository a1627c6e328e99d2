//! EPUB 3 navigation document checks (§4.6.2): `toc`/`landmarks`/`page-list`
//! nav cardinality, content model, accessible-label presence, and the
//! reading-order record gathered from the `toc` nav for potential future
//! analysis (never scored — see SPEC_FULL.md §9 Open Question (a)).

use std::collections::HashSet;

use crate::diagnostic::{Diagnostic, Location};
use crate::message_registry::emit;
use crate::report::ReadingOrderRecord;
use crate::url::{is_remote, resolve_relative};
use crate::xmltree::XmlElement;

const EPUB_OPS_NS: &str = "http://www.idpf.org/2007/ops";
const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

pub struct NavScanOutcome {
    pub reading_order: Vec<ReadingOrderRecord>,
}

pub fn scan_nav(root: &XmlElement, path: &str, doc_dir: &str, opf_dir: &str, diagnostics: &mut Vec<Diagnostic>) -> NavScanOutcome {
    let navs = root.find_all("nav");
    let toc_navs: Vec<&XmlElement> = navs.iter().copied().filter(|n| has_nav_type(n, "toc")).collect();
    let landmarks_navs: Vec<&XmlElement> = navs.iter().copied().filter(|n| has_nav_type(n, "landmarks")).collect();
    let page_list_navs: Vec<&XmlElement> = navs.iter().copied().filter(|n| has_nav_type(n, "page-list")).collect();

    if toc_navs.is_empty() {
        emit(diagnostics, "NAV-001", "navigation document has no 'toc' nav", Some(Location::new(path)), None, None);
    }
    if landmarks_navs.len() > 1 {
        emit(diagnostics, "RSC-005", "navigation document has more than one 'landmarks' nav", Some(Location::new(path)), None, None);
    }
    if page_list_navs.len() > 1 {
        emit(diagnostics, "RSC-005", "navigation document has more than one 'page-list' nav", Some(Location::new(path)), None, None);
    }

    for nav in navs.iter().copied() {
        check_content_model(nav, path, diagnostics);
        if !is_standard_type(nav) {
            check_heading_is_first_child(nav, path, diagnostics);
        }
        check_accessible_labels(nav, path, diagnostics);
    }
    check_hidden_attribute_values(root, path, diagnostics);

    let mut reading_order = Vec::new();
    for toc in &toc_navs {
        if toc.find_first("ol").is_none() {
            emit(diagnostics, "NAV-002", "'toc' nav has no 'ol' element", Some(Location::at(path, toc.line, toc.column)), None, None);
        }
        if !has_accessible_label(toc) {
            emit(
                diagnostics,
                "RSC-005",
                "'toc' nav has no accessible label (a heading child or an 'aria-label' attribute)",
                Some(Location::at(path, toc.line, toc.column)),
                None,
                None,
            );
        }
        for anchor in toc.find_all("a") {
            let Some(href) = anchor.attr("href") else { continue };
            if is_remote(href) {
                emit(
                    diagnostics,
                    "NAV-010",
                    "remote href used in a 'toc' nav",
                    Some(Location::at(path, anchor.line, anchor.column)),
                    None,
                    None,
                );
                continue;
            }
            let resolved = resolve_relative(doc_dir, href, opf_dir);
            let (target_resource, fragment) = match resolved.split_once('#') {
                Some((target, frag)) => (target.to_string(), Some(frag.to_string())),
                None => (resolved, None),
            };
            let location = Location::at(path, anchor.line, anchor.column);
            emit(diagnostics, "NAV-011", "reading-order record gathered for future analysis", Some(location.clone()), None, None);
            reading_order.push(ReadingOrderRecord { target_resource, fragment, location });
        }
    }

    for nav in landmarks_navs.iter().copied() {
        check_landmarks_entries(nav, path, diagnostics);
        for anchor in nav.find_all("a") {
            if let Some(href) = anchor.attr("href") {
                if is_remote(href) {
                    emit(diagnostics, "NAV-010", "remote href used in a 'landmarks' nav", Some(Location::at(path, anchor.line, anchor.column)), None, None);
                }
            }
        }
    }
    for nav in &page_list_navs {
        for anchor in nav.find_all("a") {
            if let Some(href) = anchor.attr("href") {
                if is_remote(href) {
                    emit(diagnostics, "NAV-010", "remote href used in a 'page-list' nav", Some(Location::at(path, anchor.line, anchor.column)), None, None);
                }
            }
        }
    }

    NavScanOutcome { reading_order }
}

fn has_nav_type(nav: &XmlElement, token: &str) -> bool {
    let value = nav.attr_ns(EPUB_OPS_NS, "type").or_else(|| nav.attr_any_ns("type"));
    value.is_some_and(|v| v.split_ascii_whitespace().any(|t| t.eq_ignore_ascii_case(token)))
}

fn is_standard_type(nav: &XmlElement) -> bool {
    has_nav_type(nav, "toc") || has_nav_type(nav, "landmarks") || has_nav_type(nav, "page-list")
}

fn has_accessible_label(nav: &XmlElement) -> bool {
    if nav.attr("aria-label").is_some_and(|v| !v.trim().is_empty()) {
        return true;
    }
    nav.children_elements().any(|child| HEADING_TAGS.contains(&child.tag.as_str()))
}

/// Non-standard-type navs (§4.6.2) must begin with a heading so a reading
/// system that doesn't recognize the `epub:type` still has a label to show.
fn check_heading_is_first_child(nav: &XmlElement, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let first_is_heading = nav.children_elements().next().is_some_and(|child| HEADING_TAGS.contains(&child.tag.as_str()));
    if !first_is_heading {
        emit(
            diagnostics,
            "RSC-005",
            "non-standard-type 'nav' must begin with a heading element",
            Some(Location::at(path, nav.line, nav.column)),
            None,
            None,
        );
    }
}

/// Content model (§4.6.2): `<nav>` children are restricted to headings,
/// `hgroup`, and `ol`; every `<ol>` needs ≥1 `<li>`; every `<li>` is either a
/// leaf (`<a>`) or a branch (`<span>` plus a nested `<ol>`).
fn check_content_model(nav: &XmlElement, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    for child in nav.children_elements() {
        let allowed = HEADING_TAGS.contains(&child.tag.as_str()) || matches!(child.tag.as_str(), "hgroup" | "ol");
        if !allowed {
            emit(
                diagnostics,
                "RSC-005",
                format!("'nav' may only contain a heading, 'hgroup', or 'ol', found '<{}>'", child.tag),
                Some(Location::at(path, child.line, child.column)),
                None,
                None,
            );
        }
    }
    for ol in nav.find_all("ol") {
        check_ol_content_model(ol, path, diagnostics);
    }
}

fn check_ol_content_model(ol: &XmlElement, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let items: Vec<&XmlElement> = ol.children_elements().filter(|c| c.tag == "li").collect();
    if items.is_empty() {
        emit(diagnostics, "RSC-005", "'ol' in a nav must contain at least one 'li'", Some(Location::at(path, ol.line, ol.column)), None, None);
        return;
    }
    for li in items {
        let has_leaf = li.children_elements().any(|c| c.tag == "a");
        let has_branch = li.children_elements().any(|c| c.tag == "span") && li.children_elements().any(|c| c.tag == "ol");
        if !has_leaf && !has_branch {
            emit(
                diagnostics,
                "RSC-005",
                "'li' in a nav 'ol' must contain either an 'a' (leaf) or a 'span' plus a nested 'ol' (branch)",
                Some(Location::at(path, li.line, li.column)),
                None,
                None,
            );
        }
    }
}

/// Every `<a>`/`<span>` inside a nav `<ol>` must have a non-empty accessible
/// label: text content, an `<img alt>`, or `aria-label` (§4.6.2).
fn check_accessible_labels(nav: &XmlElement, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    for ol in nav.find_all("ol") {
        for element in ol.descendants() {
            if matches!(element.tag.as_str(), "a" | "span") && !has_non_empty_label(element) {
                emit(
                    diagnostics,
                    "RSC-005",
                    format!("'<{}>' in a nav 'ol' has no non-empty accessible label", element.tag),
                    Some(Location::at(path, element.line, element.column)),
                    None,
                    None,
                );
            }
        }
    }
}

fn has_non_empty_label(element: &XmlElement) -> bool {
    if !element.text_content().is_empty() {
        return true;
    }
    if element.attr("aria-label").is_some_and(|v| !v.trim().is_empty()) {
        return true;
    }
    element.find_all("img").iter().any(|img| img.attr("alt").is_some_and(|alt| !alt.trim().is_empty()))
}

/// Landmarks anchors must declare `epub:type` (§4.6.2); the same
/// `(epub:type, href)` pair must not be repeated within one `landmarks` nav.
fn check_landmarks_entries(nav: &XmlElement, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    for anchor in nav.find_all("a") {
        let epub_type = anchor.attr_ns(EPUB_OPS_NS, "type").or_else(|| anchor.attr_any_ns("type"));
        let Some(epub_type) = epub_type else {
            emit(
                diagnostics,
                "RSC-005",
                "'landmarks' anchor is missing an 'epub:type' attribute",
                Some(Location::at(path, anchor.line, anchor.column)),
                None,
                None,
            );
            continue;
        };
        let href = anchor.attr("href").unwrap_or_default();
        if !seen.insert((epub_type.to_string(), href.to_string())) {
            emit(
                diagnostics,
                "RSC-005",
                format!("duplicate 'landmarks' entry for epub:type '{epub_type}' and href '{href}'"),
                Some(Location::at(path, anchor.line, anchor.column)),
                None,
                None,
            );
        }
    }
}

/// `hidden` is restricted to `""`, `hidden`, or `until-found` (§4.6.2).
fn check_hidden_attribute_values(root: &XmlElement, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let mut elements = vec![root];
    elements.extend(root.descendants());
    for element in elements {
        if let Some(value) = element.attr("hidden") {
            if !matches!(value, "" | "hidden" | "until-found") {
                emit(
                    diagnostics,
                    "RSC-005",
                    format!("'hidden' attribute value '{value}' is not permitted"),
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

    fn parse(xml: &str) -> crate::xmltree::XmlDocument {
        DefaultXmlParser.parse(xml.as_bytes()).expect("well-formed fixture must parse")
    }

    const NS: &str = r#"xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops""#;

    #[test]
    fn missing_toc_nav_emits_nav_001() {
        let doc = parse(&format!(r#"<html {NS}><body><nav epub:type="landmarks"><h1>L</h1><ol><li><a href="a.xhtml">a</a></li></ol></nav></body></html>"#));
        let mut diags = Vec::new();
        scan_nav(&doc.root, "nav.xhtml", "", "", &mut diags);
        assert!(diags.iter().any(|d| d.id == "NAV-001"));
    }

    #[test]
    fn toc_without_ol_emits_nav_002() {
        let doc = parse(&format!(r#"<html {NS}><body><nav epub:type="toc"><h1>Contents</h1></nav></body></html>"#));
        let mut diags = Vec::new();
        scan_nav(&doc.root, "nav.xhtml", "", "", &mut diags);
        assert!(diags.iter().any(|d| d.id == "NAV-002"));
    }

    #[test]
    fn toc_without_heading_or_aria_label_is_flagged() {
        let doc = parse(&format!(r#"<html {NS}><body><nav epub:type="toc"><ol><li><a href="a.xhtml">a</a></li></ol></nav></body></html>"#));
        let mut diags = Vec::new();
        scan_nav(&doc.root, "nav.xhtml", "", "", &mut diags);
        assert!(diags.iter().any(|d| d.id == "RSC-005"));
    }

    #[test]
    fn toc_entries_are_gathered_in_document_order() {
        let doc = parse(&format!(
            r#"<html {NS}><body><nav epub:type="toc"><h1>C</h1><ol>
               <li><a href="ch1.xhtml">1</a></li>
               <li><a href="ch2.xhtml#sec1">2</a></li>
               </ol></nav></body></html>"#
        ));
        let mut diags = Vec::new();
        let outcome = scan_nav(&doc.root, "nav.xhtml", "", "", &mut diags);
        assert_eq!(outcome.reading_order.len(), 2);
        assert_eq!(outcome.reading_order[0].target_resource, "ch1.xhtml");
        assert_eq!(outcome.reading_order[1].fragment.as_deref(), Some("sec1"));
    }

    #[test]
    fn remote_href_in_toc_emits_nav_010_and_is_not_recorded() {
        let doc = parse(&format!(
            r#"<html {NS}><body><nav epub:type="toc"><h1>C</h1><ol><li><a href="https://example.com/x">x</a></li></ol></nav></body></html>"#
        ));
        let mut diags = Vec::new();
        let outcome = scan_nav(&doc.root, "nav.xhtml", "", "", &mut diags);
        assert!(diags.iter().any(|d| d.id == "NAV-010"));
        assert!(outcome.reading_order.is_empty());
    }

    #[test]
    fn duplicate_landmarks_nav_emits_rsc_005() {
        let doc = parse(&format!(
            r#"<html {NS}><body>
               <nav epub:type="toc"><h1>C</h1><ol><li><a href="a.xhtml">a</a></li></ol></nav>
               <nav epub:type="landmarks"><h1>L1</h1><ol><li><a epub:type="bodymatter" href="a.xhtml">A</a></li></ol></nav>
               <nav epub:type="landmarks"><h1>L2</h1><ol><li><a epub:type="bodymatter" href="a.xhtml">A</a></li></ol></nav>
               </body></html>"#
        ));
        let mut diags = Vec::new();
        scan_nav(&doc.root, "nav.xhtml", "", "", &mut diags);
        assert!(diags.iter().any(|d| d.id == "RSC-005" && d.message.contains("landmarks")));
    }

    #[test]
    fn non_standard_nav_without_leading_heading_is_flagged() {
        let doc = parse(&format!(
            r#"<html {NS}><body>
               <nav epub:type="toc"><h1>C</h1><ol><li><a href="a.xhtml">a</a></li></ol></nav>
               <nav epub:type="region-nav"><ol><li><a href="a.xhtml">a</a></li></ol></nav>
               </body></html>"#
        ));
        let mut diags = Vec::new();
        scan_nav(&doc.root, "nav.xhtml", "", "", &mut diags);
        assert!(diags.iter().any(|d| d.id == "RSC-005" && d.message.contains("non-standard-type")));
    }

    #[test]
    fn nav_child_outside_heading_hgroup_ol_is_flagged() {
        let doc = parse(&format!(
            r#"<html {NS}><body><nav epub:type="toc"><h1>C</h1><p>intro</p><ol><li><a href="a.xhtml">a</a></li></ol></nav></body></html>"#
        ));
        let mut diags = Vec::new();
        scan_nav(&doc.root, "nav.xhtml", "", "", &mut diags);
        assert!(diags.iter().any(|d| d.id == "RSC-005" && d.message.contains("may only contain")));
    }

    #[test]
    fn ol_with_no_li_is_flagged() {
        let doc = parse(&format!(r#"<html {NS}><body><nav epub:type="toc"><h1>C</h1><ol/></nav></body></html>"#));
        let mut diags = Vec::new();
        scan_nav(&doc.root, "nav.xhtml", "", "", &mut diags);
        assert!(diags.iter().any(|d| d.id == "RSC-005" && d.message.contains("at least one 'li'")));
    }

    #[test]
    fn li_without_anchor_or_branch_is_flagged() {
        let doc = parse(&format!(r#"<html {NS}><body><nav epub:type="toc"><h1>C</h1><ol><li>plain text</li></ol></nav></body></html>"#));
        let mut diags = Vec::new();
        scan_nav(&doc.root, "nav.xhtml", "", "", &mut diags);
        assert!(diags.iter().any(|d| d.id == "RSC-005" && d.message.contains("leaf")));
    }

    #[test]
    fn branch_li_with_span_and_nested_ol_is_accepted() {
        let doc = parse(&format!(
            r#"<html {NS}><body><nav epub:type="toc"><h1>C</h1><ol>
               <li><span>Part One</span><ol><li><a href="a.xhtml">a</a></li></ol></li>
               </ol></nav></body></html>"#
        ));
        let mut diags = Vec::new();
        scan_nav(&doc.root, "nav.xhtml", "", "", &mut diags);
        assert!(!diags.iter().any(|d| d.id == "RSC-005" && d.message.contains("leaf")));
    }

    #[test]
    fn anchor_without_accessible_label_is_flagged() {
        let doc = parse(&format!(r#"<html {NS}><body><nav epub:type="toc"><h1>C</h1><ol><li><a href="a.xhtml"></a></li></ol></nav></body></html>"#));
        let mut diags = Vec::new();
        scan_nav(&doc.root, "nav.xhtml", "", "", &mut diags);
        assert!(diags.iter().any(|d| d.id == "RSC-005" && d.message.contains("accessible label")));
    }

    #[test]
    fn anchor_with_img_alt_has_accessible_label() {
        let doc = parse(&format!(
            r#"<html {NS}><body><nav epub:type="toc"><h1>C</h1><ol><li><a href="a.xhtml"><img src="i.png" alt="Chapter 1"/></a></li></ol></nav></body></html>"#
        ));
        let mut diags = Vec::new();
        scan_nav(&doc.root, "nav.xhtml", "", "", &mut diags);
        assert!(!diags.iter().any(|d| d.id == "RSC-005" && d.message.contains("accessible label")));
    }

    #[test]
    fn landmarks_anchor_without_epub_type_is_flagged() {
        let doc = parse(&format!(
            r#"<html {NS}><body>
               <nav epub:type="toc"><h1>C</h1><ol><li><a href="a.xhtml">a</a></li></ol></nav>
               <nav epub:type="landmarks"><h1>L</h1><ol><li><a href="a.xhtml">A</a></li></ol></nav>
               </body></html>"#
        ));
        let mut diags = Vec::new();
        scan_nav(&doc.root, "nav.xhtml", "", "", &mut diags);
        assert!(diags.iter().any(|d| d.id == "RSC-005" && d.message.contains("epub:type")));
    }

    #[test]
    fn duplicate_landmarks_epub_type_and_href_is_flagged() {
        let doc = parse(&format!(
            r#"<html {NS}><body>
               <nav epub:type="toc"><h1>C</h1><ol><li><a href="a.xhtml">a</a></li></ol></nav>
               <nav epub:type="landmarks"><h1>L</h1><ol>
               <li><a epub:type="bodymatter" href="a.xhtml">A</a></li>
               <li><a epub:type="bodymatter" href="a.xhtml">A again</a></li>
               </ol></nav>
               </body></html>"#
        ));
        let mut diags = Vec::new();
        scan_nav(&doc.root, "nav.xhtml", "", "", &mut diags);
        assert!(diags.iter().any(|d| d.id == "RSC-005" && d.message.contains("duplicate 'landmarks' entry")));
    }

    #[test]
    fn hidden_attribute_accepts_blessed_values() {
        let doc = parse(&format!(
            r#"<html {NS}><body>
               <nav epub:type="toc" hidden="until-found"><h1>C</h1><ol><li><a href="a.xhtml">a</a></li></ol></nav>
               </body></html>"#
        ));
        let mut diags = Vec::new();
        scan_nav(&doc.root, "nav.xhtml", "", "", &mut diags);
        assert!(!diags.iter().any(|d| d.id == "RSC-005" && d.message.contains("'hidden'")));
    }

    #[test]
    fn hidden_attribute_rejects_other_values() {
        let doc = parse(&format!(
            r#"<html {NS}><body>
               <nav epub:type="toc" hidden="true"><h1>C</h1><ol><li><a href="a.xhtml">a</a></li></ol></nav>
               </body></html>"#
        ));
        let mut diags = Vec::new();
        scan_nav(&doc.root, "nav.xhtml", "", "", &mut diags);
        assert!(diags.iter().any(|d| d.id == "RSC-005" && d.message.contains("'hidden'")));
    }
}
