//! Diagnostic types.
//!
//! Uses `CompactString` for message storage - strings up to 24 bytes are
//! stored inline without heap allocation.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Diagnostic severity.
///
/// `Off` disables a rule entirely: the engine skips evaluation for that rule,
/// it does not merely suppress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warn,
    Off,
}

/// A single text replacement in the source code.
#[derive(Debug, Clone, Serialize)]
pub struct TextEdit {
    /// Start byte offset
    pub start: u32,
    /// End byte offset
    pub end: u32,
    /// Replacement text
    pub new_text: String,
}

impl TextEdit {
    /// Create a new text edit
    #[inline]
    pub fn new(start: u32, end: u32, new_text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            new_text: new_text.into(),
        }
    }

    /// Create an insertion edit
    #[inline]
    pub fn insert(offset: u32, text: impl Into<String>) -> Self {
        Self::new(offset, offset, text)
    }

    /// Create a deletion edit
    #[inline]
    pub fn delete(start: u32, end: u32) -> Self {
        Self::new(start, end, "")
    }

    /// Create a replacement edit
    #[inline]
    pub fn replace(start: u32, end: u32, text: impl Into<String>) -> Self {
        Self::new(start, end, text)
    }

    /// Whether two edits cover intersecting byte ranges.
    ///
    /// Pure insertions at the same offset do not count as overlapping.
    #[inline]
    pub fn overlaps(&self, other: &TextEdit) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A fix: an atomic group of text edits. All edits in a fix are applied
/// together or not at all.
#[derive(Debug, Clone, Serialize)]
pub struct Fix {
    /// Description of the fix
    pub message: String,
    /// Text edits to apply
    pub edits: Vec<TextEdit>,
}

impl Fix {
    /// Create a new fix with a single edit
    #[inline]
    pub fn new(message: impl Into<String>, edit: TextEdit) -> Self {
        Self {
            message: message.into(),
            edits: vec![edit],
        }
    }

    /// Create a new fix with multiple edits
    #[inline]
    pub fn with_edits(message: impl Into<String>, edits: Vec<TextEdit>) -> Self {
        Self {
            message: message.into(),
            edits,
        }
    }

    /// Apply the fix to a source string
    pub fn apply(&self, source: &str) -> String {
        let mut result = source.to_string();
        // Apply edits in reverse offset order to preserve earlier offsets
        let mut edits = self.edits.clone();
        edits.sort_by(|a, b| b.start.cmp(&a.start));

        for edit in edits {
            let start = edit.start as usize;
            let end = edit.end as usize;
            if start <= result.len() && end <= result.len() && start <= end {
                result.replace_range(start..end, &edit.new_text);
            }
        }
        result
    }
}

/// A reported finding with optional auto-fix and suggestions.
///
/// `fix` is the primary, automatically appliable rewrite. `suggestions` are
/// mutually exclusive alternatives that are never auto-applied; rules fall
/// back to them when a rewrite cannot be proven semantics-preserving.
#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    /// Rule that triggered this diagnostic
    pub rule_name: &'static str,
    /// Severity level
    pub severity: Severity,
    /// Primary message
    pub message: CompactString,
    /// Start byte offset in source
    pub start: u32,
    /// End byte offset in source
    pub end: u32,
    /// Help message for fixing (optional)
    pub help: Option<CompactString>,
    /// Auto-fix for this diagnostic (optional)
    pub fix: Option<Fix>,
    /// Mutually exclusive alternatives, never auto-applied
    pub suggestions: Vec<Fix>,
}

impl LintDiagnostic {
    /// Create a new diagnostic
    #[inline]
    pub fn new(
        rule_name: &'static str,
        severity: Severity,
        message: impl Into<CompactString>,
        start: u32,
        end: u32,
    ) -> Self {
        Self {
            rule_name,
            severity,
            message: message.into(),
            start,
            end,
            help: None,
            fix: None,
            suggestions: Vec::new(),
        }
    }

    /// Create a new error diagnostic
    #[inline]
    pub fn error(
        rule_name: &'static str,
        message: impl Into<CompactString>,
        start: u32,
        end: u32,
    ) -> Self {
        Self::new(rule_name, Severity::Error, message, start, end)
    }

    /// Create a new warning diagnostic
    #[inline]
    pub fn warn(
        rule_name: &'static str,
        message: impl Into<CompactString>,
        start: u32,
        end: u32,
    ) -> Self {
        Self::new(rule_name, Severity::Warn, message, start, end)
    }

    /// Add a help message
    #[inline]
    pub fn with_help(mut self, help: impl Into<CompactString>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Add a primary fix
    #[inline]
    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Add a suggestion (never auto-applied)
    #[inline]
    pub fn with_suggestion(mut self, fix: Fix) -> Self {
        self.suggestions.push(fix);
        self
    }

    /// Check if this diagnostic has a primary fix
    #[inline]
    pub fn has_fix(&self) -> bool {
        self.fix.is_some()
    }
}

/// Summary of lint results across files
#[derive(Debug, Clone, Default, Serialize)]
pub struct LintSummary {
    pub error_count: usize,
    pub warning_count: usize,
    pub file_count: usize,
}

impl LintSummary {
    #[inline]
    pub fn add(&mut self, diagnostic: &LintDiagnostic) {
        match diagnostic.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warn => self.warning_count += 1,
            Severity::Off => {}
        }
    }

    #[inline]
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_apply_reverse_order() {
        let fix = Fix::with_edits(
            "swap accessors",
            vec![
                TextEdit::replace(2, 7, "peek()"),
                TextEdit::replace(11, 16, "peek()"),
            ],
        );
        let result = fix.apply("a.value; b.value;");
        assert_eq!(result, "a.peek(); b.peek();");
    }

    #[test]
    fn test_edit_overlap() {
        let a = TextEdit::replace(5, 10, "x");
        let b = TextEdit::replace(8, 12, "y");
        let c = TextEdit::replace(10, 12, "z");
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        // Insertions at a shared boundary do not overlap
        let ins = TextEdit::insert(5, "w");
        assert!(!ins.overlaps(&a));
    }

    #[test]
    fn test_severity_serde_names() {
        assert_eq!(serde_json::to_string(&Severity::Warn).unwrap(), "\"warn\"");
        let parsed: Severity = serde_json::from_str("\"off\"").unwrap();
        assert_eq!(parsed, Severity::Off);
    }
}
