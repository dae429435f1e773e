//! Diagnostic rendering.
//!
//! Two formats: a compact human-readable text listing and a JSON document
//! for host tooling. Byte offsets are translated to 1-based line/column
//! pairs here, at the edge, so the analysis core stays offset-only.

use std::fmt::Write as _;

use serde::Serialize;

use crate::diagnostic::{Fix, Severity};
use crate::linter::LintResult;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Line/column lookup table for one source file.
pub struct LineIndex {
    /// Byte offset of each line start, first entry always 0
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        Self { line_starts }
    }

    /// 1-based line and column for a byte offset.
    pub fn line_col(&self, offset: u32) -> (usize, usize) {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let col = offset - self.line_starts[line];
        (line + 1, col as usize + 1)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonFileResult<'a> {
    file_path: &'a str,
    messages: Vec<JsonMessage<'a>>,
    error_count: usize,
    warning_count: usize,
    budget_exhausted: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonMessage<'a> {
    rule_id: &'a str,
    severity: Severity,
    message: &'a str,
    line: usize,
    column: usize,
    end_line: usize,
    end_column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fix: Option<&'a Fix>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    suggestions: Vec<&'a Fix>,
}

/// Render one file's result.
pub fn render(result: &LintResult, source: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => render_text(result, source),
        OutputFormat::Json => render_json(result, source),
    }
}

fn render_text(result: &LintResult, source: &str) -> String {
    let index = LineIndex::new(source);
    let mut out = String::new();

    for diag in &result.diagnostics {
        let (line, col) = index.line_col(diag.start);
        let severity = match diag.severity {
            Severity::Error => "error",
            Severity::Warn => "warning",
            Severity::Off => continue,
        };
        let _ = writeln!(
            out,
            "{}:{line}:{col} {severity} [{}] {}",
            result.filename, diag.rule_name, diag.message
        );
        if let Some(help) = &diag.help {
            let _ = writeln!(out, "  help: {help}");
        }
    }

    if result.budget_exhausted {
        let _ = writeln!(out, "{}: analysis stopped at the node budget", result.filename);
    }
    let _ = writeln!(
        out,
        "{} error(s), {} warning(s)",
        result.error_count, result.warning_count
    );
    out
}

fn render_json(result: &LintResult, source: &str) -> String {
    let index = LineIndex::new(source);
    let messages = result
        .diagnostics
        .iter()
        .map(|diag| {
            let (line, column) = index.line_col(diag.start);
            let (end_line, end_column) = index.line_col(diag.end);
            JsonMessage {
                rule_id: diag.rule_name,
                severity: diag.severity,
                message: &diag.message,
                line,
                column,
                end_line,
                end_column,
                help: diag.help.as_deref(),
                fix: diag.fix.as_ref(),
                suggestions: diag.suggestions.iter().collect(),
            }
        })
        .collect();

    let file = JsonFileResult {
        file_path: &result.filename,
        messages,
        error_count: result.error_count,
        warning_count: result.warning_count,
        budget_exhausted: result.budget_exhausted,
    };
    // Serialization of these derived structs cannot fail
    serde_json::to_string_pretty(&file).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linter::Linter;

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line_col(0), (1, 1));
        assert_eq!(index.line_col(4), (2, 2));
        assert_eq!(index.line_col(6), (3, 1));
        assert_eq!(index.line_col(7), (4, 1));
    }

    #[test]
    fn test_text_output() {
        let source = "const countSignal = signal(0);\n\
                      function Foo() { countSignal.value = 1; }";
        let result = Linter::new().lint_source(source, "foo.jsx").unwrap();
        let text = render(&result, source, OutputFormat::Text);
        assert!(text.contains("foo.jsx:2:18 error [signals/no-render-mutation]"));
        assert!(text.contains("error(s)"));
    }

    #[test]
    fn test_json_output_shape() {
        let source = "const countSignal = signal(0);\n\
                      function Foo() { countSignal.value = 1; }";
        let result = Linter::new().lint_source(source, "foo.jsx").unwrap();
        let json = render(&result, source, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["filePath"], "foo.jsx");
        assert_eq!(value["messages"][0]["ruleId"], "signals/no-render-mutation");
        assert_eq!(value["messages"][0]["severity"], "error");
        assert_eq!(value["messages"][0]["line"], 2);
    }
}
