#![deny(clippy::print_stdout, clippy::print_stderr)]
//! EPUB 2.x/3.x structural validation: the OCF container, the Package
//! Document, and Content Document reference graph, emitting
//! EPUBCheck-compatible diagnostics.
//!
//! [`validate`] is the single entry point; everything else in this crate is
//! either a component it sequences ([`ocf`], [`opf`], [`content`],
//! [`validator`]) or a collaborator it depends on ([`collaborators`]).

pub mod collaborators;
pub mod content;
pub mod diagnostic;
pub mod message_registry;
pub mod ocf;
pub mod opf;
pub mod options;
pub mod orchestrator;
pub mod reference;
pub mod registry;
pub mod report;
pub mod url;
pub mod validator;
pub mod xmltree;

pub use collaborators::{Collaborators, DefaultCssParser, DefaultXmlParser, DefaultZipReader};
pub use diagnostic::{Diagnostic, Location, Severity};
pub use options::ValidationOptions;
pub use orchestrator::validate;
pub use report::Report;

/// Returns the current version of this crate.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn version_is_semver() {
        let v = version();
        let parts: Vec<&str> = v.split('.').collect();
        assert_eq!(parts.len(), 3, "version should have 3 parts: {v}");
        for part in parts {
            part.parse::<u32>().expect("each part should be a number");
        }
    }
}
