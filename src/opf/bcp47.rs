//! A pragmatic BCP-47 language tag shape check (OPF-092) for `dc:language`
//! and `xml:lang` values.
//!
//! This is not a full BCP-47/IANA subtag registry validator — that registry
//! is large and changes over time, and the reference validator family itself
//! only checks shape, not registry membership. We validate the grammar:
//! `language["-"script]["-"region]*("-"variant)*("-"extension)*["-"privateuse]`,
//! plus the standalone `"x-...."` private-use form.

/// `true` when `tag` has valid BCP-47 *syntax*. Subtag membership in IANA's
/// registry is not checked.
#[must_use]
pub fn is_valid_bcp47(tag: &str) -> bool {
    if tag.is_empty() {
        return false;
    }
    if let Some(private) = tag.strip_prefix("x-") {
        return is_private_use_tags(private);
    }
    let mut subtags = tag.split('-');
    let Some(language) = subtags.next() else {
        return false;
    };
    if !is_alpha(language) || !(2..=8).contains(&language.len()) {
        return false;
    }
    let mut rest: Vec<&str> = subtags.collect();
    // Extlang: up to 3 three-letter subtags immediately following language.
    while rest.first().is_some_and(|s| is_alpha(s) && s.len() == 3) {
        rest.remove(0);
        if rest.is_empty() {
            return true;
        }
    }
    if let Some(script) = rest.first() {
        if is_alpha(script) && script.len() == 4 {
            rest.remove(0);
        }
    }
    if let Some(region) = rest.first() {
        let is_region = (is_alpha(region) && region.len() == 2)
            || (region.len() == 3 && region.chars().all(|c| c.is_ascii_digit()));
        if is_region {
            rest.remove(0);
        }
    }
    while rest.first().is_some_and(|s| is_variant(s)) {
        rest.remove(0);
    }
    while rest.first().is_some_and(|s| s.len() == 1 && s.chars().next().is_some_and(|c| c != 'x')) {
        let singleton = rest.remove(0);
        if singleton.is_empty() {
            return false;
        }
        let mut consumed_any = false;
        while rest.first().is_some_and(|s| (2..=8).contains(&s.len()) && is_alphanumeric(s)) {
            rest.remove(0);
            consumed_any = true;
        }
        if !consumed_any {
            return false;
        }
    }
    if let Some(first) = rest.first() {
        if *first == "x" {
            let private: Vec<&str> = rest[1..].to_vec();
            return !private.is_empty() && private.iter().all(|s| is_alphanumeric(s) && (1..=8).contains(&s.len()));
        }
        return false;
    }
    true
}

fn is_private_use_tags(rest: &str) -> bool {
    rest.split('-').all(|s| !s.is_empty() && is_alphanumeric(s) && s.len() <= 8)
}

fn is_variant(s: &str) -> bool {
    ((5..=8).contains(&s.len()) && is_alphanumeric(s))
        || (s.len() == 4 && s.starts_with(|c: char| c.is_ascii_digit()) && is_alphanumeric(s))
}

fn is_alpha(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_alphanumeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}
