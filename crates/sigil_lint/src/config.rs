//! Lint run configuration.
//!
//! Deserializable with serde so hosts can feed JSON config straight in.
//! Field names follow the camelCase convention of the host tooling.

use compact_str::CompactString;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::diagnostic::Severity;

/// Options shared by the whole rule set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LintOptions {
    /// Naming-convention suffix for handle bindings
    pub suffix: CompactString,
    /// Base names of creator functions
    pub creator_names: Vec<CompactString>,
    /// Module specifiers that export creators
    pub modules: Vec<CompactString>,
    /// Callee names whose function argument is an effect callback
    pub effect_names: Vec<CompactString>,
    /// Pattern a function name must match to classify as a custom hook
    pub hook_pattern: CompactString,
    /// Accept handle names without the configured suffix
    pub allow_bare_names: bool,
    /// Enable suffix-based handle inference (gated on creator evidence)
    pub enable_suffix_heuristic: bool,
    /// Per-rule severity overrides; `off` disables evaluation entirely
    pub severity: FxHashMap<String, Severity>,
    /// Node budget; traversal stops cleanly when exceeded
    pub max_nodes: u32,
    /// Wall-clock budget in milliseconds; enforcement is carried by the
    /// node budget, which bounds work per file deterministically
    pub max_time: Option<u64>,
    /// Memory budget in bytes; accepted for host compatibility, bounded in
    /// practice by the node budget
    pub max_memory: Option<u64>,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            suffix: CompactString::new("Signal"),
            creator_names: vec![
                CompactString::new("signal"),
                CompactString::new("computed"),
                CompactString::new("effect"),
            ],
            modules: vec![
                CompactString::new("signals"),
                CompactString::new("@preact/signals"),
                CompactString::new("@preact/signals-core"),
                CompactString::new("@preact/signals-react"),
            ],
            effect_names: vec![
                CompactString::new("effect"),
                CompactString::new("useEffect"),
                CompactString::new("useSignalEffect"),
            ],
            hook_pattern: CompactString::new("^use[A-Z]"),
            allow_bare_names: false,
            enable_suffix_heuristic: true,
            severity: FxHashMap::default(),
            max_nodes: 100_000,
            max_time: None,
            max_memory: None,
        }
    }
}

impl LintOptions {
    /// Effective severity for a rule, with the config map taking precedence
    /// over the rule's default.
    #[inline]
    pub fn severity_for(&self, rule_name: &str, default: Severity) -> Severity {
        self.severity.get(rule_name).copied().unwrap_or(default)
    }

    /// Compile the hook-name pattern.
    ///
    /// An invalid user pattern is a recoverable configuration error: it is
    /// logged and degrades to a pattern that matches nothing (`None`).
    pub fn compile_hook_pattern(&self) -> Option<Regex> {
        match Regex::new(&self.hook_pattern) {
            Ok(re) => Some(re),
            Err(err) => {
                tracing::warn!(
                    pattern = %self.hook_pattern,
                    %err,
                    "invalid hookPattern; treating as never matching"
                );
                None
            }
        }
    }

    /// First configured module specifier, used when a fix needs to insert an
    /// import and no existing import pins the module down.
    #[inline]
    pub fn primary_module(&self) -> &str {
        self.modules
            .first()
            .map(CompactString::as_str)
            .unwrap_or("signals")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = LintOptions::default();
        assert_eq!(options.suffix.as_str(), "Signal");
        assert!(options.creator_names.iter().any(|n| n == "signal"));
        assert!(options.enable_suffix_heuristic);
        assert!(!options.allow_bare_names);
        assert!(options.compile_hook_pattern().is_some());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let options: LintOptions = serde_json::from_str(
            r#"{
                "suffix": "Sig",
                "creatorNames": ["signal"],
                "enableSuffixHeuristic": false,
                "severity": { "signals/no-render-mutation": "off" },
                "maxNodes": 500,
                "maxTime": 2000,
                "maxMemory": 67108864
            }"#,
        )
        .unwrap();
        assert_eq!(options.suffix.as_str(), "Sig");
        assert!(!options.enable_suffix_heuristic);
        assert_eq!(options.max_nodes, 500);
        assert_eq!(options.max_time, Some(2000));
        assert_eq!(options.max_memory, Some(67_108_864));
        assert_eq!(
            options.severity_for("signals/no-render-mutation", Severity::Error),
            Severity::Off
        );
        // Unlisted rules keep their default
        assert_eq!(
            options.severity_for("signals/no-render-creation", Severity::Error),
            Severity::Error
        );
    }

    #[test]
    fn test_invalid_hook_pattern_degrades() {
        let options = LintOptions {
            hook_pattern: CompactString::new("use[("),
            ..LintOptions::default()
        };
        assert!(options.compile_hook_pattern().is_none());
    }
}
