//! The `Reference` record produced by the content scanner (C6) and consumed
//! by the reference validator (C7).
//!
//! `Reference` is a single record with a `type` tag, not a family of
//! subclasses (SPEC_FULL.md §9 Design Notes): every validation rule in
//! `crate::validator` dispatches on [`ReferenceType`] plus the two boolean
//! flags below, never on a distinct Rust type per kind of link.

use crate::diagnostic::Location;

/// The closed set of reference kinds the content scanner can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceType {
    Link,
    Generic,
    Stylesheet,
    MediaOverlay,
    Hyperlink,
    Font,
    Image,
    Audio,
    Video,
    Track,
    Cite,
    SvgPaint,
    SvgClipPath,
    SvgSymbol,
    RegionBasedNav,
    NavTocLink,
    NavPagelistLink,
    OverlayTextLink,
    SearchKey,
}

impl ReferenceType {
    /// `PUBLICATION-RESOURCE-CLASS`: the reference types for which only
    /// AUDIO/VIDEO/FONT may point at a remote resource (§4.7.1).
    #[must_use]
    pub fn is_publication_resource_class(self) -> bool {
        matches!(
            self,
            ReferenceType::Generic
                | ReferenceType::Stylesheet
                | ReferenceType::Font
                | ReferenceType::Image
                | ReferenceType::Audio
                | ReferenceType::Video
                | ReferenceType::Track
                | ReferenceType::MediaOverlay
        )
    }

    /// Within `PUBLICATION-RESOURCE-CLASS`, the subset allowed to be remote.
    #[must_use]
    pub fn may_be_remote(self) -> bool {
        matches!(self, ReferenceType::Audio | ReferenceType::Video | ReferenceType::Font)
    }

    #[must_use]
    pub fn is_hyperlink_like(self) -> bool {
        matches!(
            self,
            ReferenceType::Hyperlink | ReferenceType::NavTocLink | ReferenceType::NavPagelistLink
        )
    }
}

/// A queued reference: produced once by the content scanner, consumed once
/// by the reference validator, then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub url: String,
    pub target_resource: String,
    pub fragment: Option<String>,
    pub reference_type: ReferenceType,
    pub location: Location,
    pub has_intrinsic_fallback: bool,
}

impl Reference {
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        target_resource: impl Into<String>,
        reference_type: ReferenceType,
        location: Location,
    ) -> Self {
        Reference {
            url: url.into(),
            target_resource: target_resource.into(),
            fragment: None,
            reference_type,
            location,
            has_intrinsic_fallback: false,
        }
    }

    #[must_use]
    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    #[must_use]
    pub fn with_intrinsic_fallback(mut self, has_fallback: bool) -> Self {
        self.has_intrinsic_fallback = has_fallback;
        self
    }
}

/// Blessed content-document mime types by EPUB version, plus the
/// deprecated-but-still-blessed set (§4.7 "blessed content-document types").
#[must_use]
pub fn is_blessed_content_document_mime(mime: &str, epub3: bool) -> bool {
    if epub3 {
        matches!(mime, "application/xhtml+xml" | "image/svg+xml")
    } else {
        matches!(mime, "application/xhtml+xml" | "application/x-dtbook+xml")
    }
}

#[must_use]
pub fn is_deprecated_blessed_mime(mime: &str) -> bool {
    matches!(mime, "text/x-oeb1-document" | "text/html")
}

/// Core media types that may appear in the spine without a fallback chain.
#[must_use]
pub fn is_core_media_type(mime: &str, epub2: bool) -> bool {
    matches!(mime, "application/xhtml+xml" | "image/svg+xml") || (epub2 && mime == "application/x-dtbook+xml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publication_resource_class_matches_spec_set() {
        assert!(ReferenceType::Generic.is_publication_resource_class());
        assert!(ReferenceType::Stylesheet.is_publication_resource_class());
        assert!(ReferenceType::Font.is_publication_resource_class());
        assert!(ReferenceType::Image.is_publication_resource_class());
        assert!(ReferenceType::Audio.is_publication_resource_class());
        assert!(ReferenceType::Video.is_publication_resource_class());
        assert!(ReferenceType::Track.is_publication_resource_class());
        assert!(ReferenceType::MediaOverlay.is_publication_resource_class());
        assert!(!ReferenceType::Hyperlink.is_publication_resource_class());
        assert!(!ReferenceType::Cite.is_publication_resource_class());
    }

    #[test]
    fn only_audio_video_font_may_be_remote() {
        assert!(ReferenceType::Audio.may_be_remote());
        assert!(ReferenceType::Video.may_be_remote());
        assert!(ReferenceType::Font.may_be_remote());
        assert!(!ReferenceType::Image.may_be_remote());
        assert!(!ReferenceType::Stylesheet.may_be_remote());
    }

    #[test]
    fn blessed_content_document_mimes_differ_by_version() {
        assert!(is_blessed_content_document_mime("application/x-dtbook+xml", false));
        assert!(!is_blessed_content_document_mime("application/x-dtbook+xml", true));
        assert!(is_blessed_content_document_mime("image/svg+xml", true));
    }

    #[test]
    fn core_media_type_includes_dtbook_only_for_epub2() {
        assert!(is_core_media_type("application/x-dtbook+xml", true));
        assert!(!is_core_media_type("application/x-dtbook+xml", false));
        assert!(is_core_media_type("application/xhtml+xml", false));
    }
}
