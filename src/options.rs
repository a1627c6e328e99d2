//! Validation options (§6): the caller-tunable knobs the orchestrator reads
//! before and after running the pipeline. None of these change which rules
//! run — only which severities are surfaced and how many messages are kept.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    /// "detect" (read from the OPF `version` attribute) or an explicit
    /// override such as "3.0".
    pub version: String,
    pub profile: String,
    pub include_usage: bool,
    pub include_info: bool,
    pub max_errors: Option<usize>,
    pub locale: String,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            version: "detect".to_string(),
            profile: "default".to_string(),
            include_usage: false,
            include_info: false,
            max_errors: None,
            locale: "en".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_entry_contract() {
        let options = ValidationOptions::default();
        assert_eq!(options.version, "detect");
        assert_eq!(options.profile, "default");
        assert!(!options.include_usage);
        assert!(!options.include_info);
        assert_eq!(options.max_errors, None);
    }
}
