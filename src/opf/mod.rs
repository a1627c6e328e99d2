//! The Package Document engine (C5): parses the OPF into [`types::PackageDocument`]
//! and runs every rule group in §4.5 over it.

pub mod bcp47;
pub mod date;
pub mod fallback;
pub mod marc;
pub mod parse;
pub mod refines;
pub mod rules;
pub mod types;

pub use parse::parse_package;
pub use rules::validate_package;
pub use types::PackageDocument;
