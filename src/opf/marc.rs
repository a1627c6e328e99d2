//! MARC relator code validation for `dc:creator`/`dc:contributor` `opf:role`
//! attributes (OPF-052).
//!
//! The source list the Library of Congress publishes contains a handful of
//! duplicate codes across its historical revisions (SPEC_FULL.md / spec.md
//! §9 Design Notes, Open Question (b)) — this table is a `HashSet` rather
//! than an ordered list, so a duplicate entry is simply absorbed rather than
//! producing two rows.

use std::collections::HashSet;
use std::sync::LazyLock;

/// The closed set of three-letter MARC relator codes EPUBCheck accepts on
/// `opf:role`. Not exhaustive of the full MARC registry — this is the subset
/// the reference validator family has historically recognized.
static RELATOR_CODES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "adp", "ann", "arr", "art", "aui", "aut", "aqt", "aft", "aux", "bkp", "clb", "cmm", "cmp",
        "cmt", "cng", "com", "ctb", "cre", "crp", "ctg", "cwt", "drt", "dub", "edt", "egr", "etr",
        "fac", "fmo", "ill", "ins", "itr", "ive", "ivr", "lyr", "mdc", "mus", "nrt", "oth", "pbd",
        "pht", "prt", "red", "rev", "spk", "ths", "trc", "trl", "voc", "wam", "wdc", "wst",
    ]
    .into_iter()
    .collect()
});

/// `true` when `role` is a recognized MARC relator code (case-sensitive: the
/// registry is lowercase, and EPUB requires the exact case).
#[must_use]
pub fn is_valid_marc_relator(role: &str) -> bool {
    RELATOR_CODES.contains(role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_author_and_illustrator() {
        assert!(is_valid_marc_relator("aut"));
        assert!(is_valid_marc_relator("ill"));
    }

    #[test]
    fn rejects_unknown_code() {
        assert!(!is_valid_marc_relator("zzz"));
    }

    #[test]
    fn is_case_sensitive() {
        assert!(!is_valid_marc_relator("AUT"));
    }
}
